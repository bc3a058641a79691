//! Bearer-token session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Built once by the application root from a [`PersistentStore`] and shared
//! by handle with the API facade (which sets and clears the token) and the
//! navigator (which only reads `is_authenticated`).
//!
//! TRADE-OFFS
//! ==========
//! Two logins racing each other resolve last-write-wins. There is a single
//! user per client, so no staleness check is made.

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::storage::PersistentStore;

/// Storage key holding the serialized [`Token`].
pub const TOKEN_KEY: &str = "token";

/// Credential issued by `/login/access-token`. Opaque to the client.
///
/// Written with the endpoint's snake_case names; camelCase copies are read
/// too.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    #[serde(alias = "tokenType")]
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), token_type: "bearer".to_owned() }
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

/// Handle to the process-wide session. Clones share state.
#[derive(Clone, Debug)]
pub struct Session {
    token: Arc<RwLock<Option<Token>>>,
    store: PersistentStore,
}

impl Session {
    /// Recover the session persisted in `store`.
    ///
    /// A missing entry, or a literal `null`, means logged out. An entry that
    /// does not decode as a [`Token`] also means logged out, and is deleted.
    pub fn restore(store: PersistentStore) -> Self {
        let token = match store.get(TOKEN_KEY) {
            None => None,
            Some(raw) => match serde_json::from_str::<Option<Token>>(&raw) {
                Ok(token) => token,
                Err(e) => {
                    warn!(error = %e, "persisted token corrupt; starting logged out");
                    store.remove(TOKEN_KEY);
                    None
                }
            },
        };
        debug!(authenticated = token.is_some(), "session restored");
        Self { token: Arc::new(RwLock::new(token)), store }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    pub fn token(&self) -> Option<Token> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Header fragment authorizing an outgoing request; empty when logged out.
    pub fn auth_header(&self) -> BTreeMap<String, String> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .as_ref()
            .map(|token| {
                BTreeMap::from([("Authorization".to_owned(), format!("Bearer {}", token.access_token))])
            })
            .unwrap_or_default()
    }

    /// Replace the held token. With `persist` the token survives a restart;
    /// without it any previously persisted copy is dropped.
    pub fn set_token(&self, token: Token, persist: bool) {
        if persist {
            self.store.save_json(TOKEN_KEY, &token);
        } else {
            self.store.remove(TOKEN_KEY);
        }
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
        info!(persist, "session token set");
    }

    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.store.remove(TOKEN_KEY);
        info!("session token cleared");
    }
}
