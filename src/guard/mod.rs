//! Navigation guard evaluated on every route transition.
//!
//! DESIGN
//! ======
//! Evaluation order for a destination:
//! 1. any record whose path is a prefix of the destination requires auth
//!    (so unlisted paths under a protected record are protected) and the
//!    session is anonymous: redirect to login, carrying the original full
//!    path in `redirect`;
//! 2. destination is `/` and the session is authenticated: redirect to the
//!    landing route;
//! 3. the route declares a required query parameter that is missing: cancel
//!    without moving anywhere;
//! 4. allow.
//!
//! The guard is synchronous and side-effect free apart from logging.

pub mod routes;

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

use tracing::info;

use crate::navigation::Location;
use crate::session::Session;

pub use routes::{RouteRecord, RouteTable};

pub const LOGIN_PATH: &str = "/auth/login";
pub const LANDING_PATH: &str = "/dashboard";
pub const REDIRECT_PARAM: &str = "redirect";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardRefusal {
    #[error("route {route} requires the `{param}` query parameter")]
    MissingParam { route: String, param: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Location),
    Cancel(GuardRefusal),
}

impl Decision {
    /// `false` only when the transition is refused outright.
    #[must_use]
    pub fn proceeds(&self) -> bool {
        !matches!(self, Self::Cancel(_))
    }
}

pub struct NavigationGuard {
    routes: RouteTable,
    session: Session,
}

impl NavigationGuard {
    /// Guard the application's own route table.
    pub fn new(session: Session) -> Self {
        Self::with_routes(session, RouteTable::cyclity())
    }

    pub fn with_routes(session: Session, routes: RouteTable) -> Self {
        Self { routes, session }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn evaluate(&self, to: &Location) -> Decision {
        let matched = self.routes.resolve(to.path());
        let authenticated = self.session.is_authenticated();

        if self.routes.requires_auth(to.path()) && !authenticated {
            info!(to = %to, "auth required; redirecting to login");
            return Decision::Redirect(Location::new(LOGIN_PATH).with_query(REDIRECT_PARAM, to.full_path()));
        }

        if to.path() == "/" && authenticated {
            return Decision::Redirect(Location::new(LANDING_PATH));
        }

        if let Some(record) = matched.last() {
            if let Some(param) = &record.required_query {
                let present = to.query(param).is_some_and(|value| !value.is_empty());
                if !present {
                    info!(to = %to, param = %param, "required query parameter missing; navigation refused");
                    return Decision::Cancel(GuardRefusal::MissingParam {
                        route: to.path().to_owned(),
                        param: param.clone(),
                    });
                }
            }
        }

        Decision::Allow
    }
}
