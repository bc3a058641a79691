use super::*;

use std::sync::Mutex;

use serde_json::json;

use super::test_support::{StubTransport, api_over};
use crate::models::Msg;
use crate::normalize::{FailureReporter, GENERIC_CLIENT_MESSAGE, NO_RESPONSE_MESSAGE};
use crate::transport::Response;

#[derive(Default)]
struct RecordingReporter {
    seen: Mutex<Vec<(String, String)>>,
}

impl FailureReporter for RecordingReporter {
    fn report(&self, operation: &str, kind: &FailureKind) {
        self.seen.lock().unwrap().push((operation.to_owned(), kind.code().to_owned()));
    }
}

#[tokio::test]
async fn success_payload_is_wrapped_with_its_status() {
    let stub = StubTransport::ok(201, json!({ "msg": "created" }));
    let (api, _) = api_over(&stub);
    let envelope: Envelope<Msg> = api.call("op", Request::post("/x")).await;
    assert!(envelope.success());
    assert_eq!(envelope.status(), 201);
    assert_eq!(envelope.content(), Some(&Msg { msg: "created".into() }));
}

#[tokio::test]
async fn undecodable_success_payload_is_unknown_failure() {
    let stub = StubTransport::ok(200, json!({ "unexpected": true }));
    let (api, _) = api_over(&stub);
    let envelope: Envelope<Msg> = api.call("op", Request::post("/x")).await;
    assert!(!envelope.success());
    assert_eq!(envelope.status(), 500);
    assert_eq!(envelope.message(), GENERIC_CLIENT_MESSAGE);
}

#[tokio::test]
async fn non_success_response_is_server_rejection() {
    let stub = StubTransport::ok(302, json!({ "detail": "Moved" }));
    let (api, _) = api_over(&stub);
    let envelope: Envelope<Msg> = api.call("op", Request::post("/x")).await;
    assert!(!envelope.success());
    assert_eq!(envelope.status(), 302);
    assert_eq!(envelope.message(), "Moved");
}

#[tokio::test]
async fn transport_error_goes_through_normalizer() {
    let stub = StubTransport::failing(TransportError::NoResponse("timed out".into()));
    let reporter = Arc::new(RecordingReporter::default());
    let (api, _) = api_over(&stub);
    let api = api.with_normalizer(ErrorNormalizer::new(reporter.clone()));

    let envelope: Envelope<Msg> = api.call("op", Request::post("/x")).await;
    assert_eq!(envelope.status(), 0);
    assert_eq!(envelope.message(), NO_RESPONSE_MESSAGE);
    assert_eq!(reporter.seen.lock().unwrap().as_slice(), [("op".to_owned(), "E_NO_RESPONSE".to_owned())]);
}

#[tokio::test]
async fn empty_success_body_decodes_as_unit() {
    let stub = StubTransport::replying([Ok(Response { status: 204, data: serde_json::Value::Null })]);
    let (api, _) = api_over(&stub);
    let envelope: Envelope<()> = api.call("op", Request::post("/x")).await;
    assert!(envelope.success());
    assert_eq!(envelope.status(), 204);
}

#[test]
fn current_user_starts_empty() {
    let stub = Arc::new(StubTransport::default());
    let (api, _) = api_over(&stub);
    assert!(api.current_user().is_none());
    assert!(!api.session().is_authenticated());
}
