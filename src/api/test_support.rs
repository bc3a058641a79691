//! In-memory transport for facade tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::Api;
use crate::session::Session;
use crate::storage::PersistentStore;
use crate::transport::{Request, Response, Transport, TransportError};

/// Replays queued outcomes in order and records every request it sees.
#[derive(Default)]
pub struct StubTransport {
    replies: Mutex<VecDeque<Result<Response, TransportError>>>,
    sent: Mutex<Vec<Request>>,
}

impl StubTransport {
    pub fn replying(replies: impl IntoIterator<Item = Result<Response, TransportError>>) -> Arc<Self> {
        Arc::new(Self { replies: Mutex::new(replies.into_iter().collect()), sent: Mutex::default() })
    }

    pub fn ok(status: u16, data: Value) -> Arc<Self> {
        Self::replying([Ok(Response { status, data })])
    }

    pub fn failing(error: TransportError) -> Arc<Self> {
        Self::replying([Err(error)])
    }

    pub fn sent(&self) -> Vec<Request> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Request {
        self.sent().pop().expect("no request was sent")
    }
}

#[async_trait::async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        self.sent.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::NoResponse("stub has no reply queued".into())))
    }
}

/// Facade over `stub` with a fresh in-memory session. The store is returned
/// so tests can inspect what was persisted.
pub fn api_over(stub: &Arc<StubTransport>) -> (Api, PersistentStore) {
    let store = PersistentStore::in_memory();
    let session = Session::restore(store.clone());
    (Api::new(Arc::clone(stub) as Arc<dyn Transport>, session), store)
}
