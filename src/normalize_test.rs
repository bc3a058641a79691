use super::*;

use std::sync::Mutex;

use serde_json::json;

/// Reporter that remembers what it was told.
#[derive(Default)]
struct RecordingReporter {
    seen: Mutex<Vec<(String, FailureKind)>>,
}

impl FailureReporter for RecordingReporter {
    fn report(&self, operation: &str, kind: &FailureKind) {
        self.seen.lock().unwrap().push((operation.to_owned(), kind.clone()));
    }
}

fn rejected(status: u16, data: Value) -> TransportError {
    TransportError::Response { status, data }
}

// =============================================================================
// classify
// =============================================================================

#[test]
fn server_detail_becomes_message() {
    let envelope: Envelope<()> =
        ErrorNormalizer::default().normalize("authenticate", &rejected(401, json!({ "detail": "Bad credentials" })));
    assert!(!envelope.success());
    assert_eq!(envelope.status(), 401);
    assert_eq!(envelope.message(), "Bad credentials");
    assert!(envelope.content().is_none());
}

#[test]
fn server_without_detail_uses_generic_message() {
    let kind = FailureKind::classify(&rejected(502, Value::String("Bad Gateway".into())));
    assert_eq!(kind, FailureKind::ServerRejected { status: 502, detail: None });
    assert_eq!(kind.message(), GENERIC_SERVER_MESSAGE);
    assert_eq!(kind.status(), 502);
}

#[test]
fn blank_detail_uses_generic_message() {
    let kind = FailureKind::classify(&rejected(400, json!({ "detail": "   " })));
    assert_eq!(kind.message(), GENERIC_SERVER_MESSAGE);
}

#[test]
fn validation_detail_list_is_joined() {
    let data = json!({
        "detail": [
            { "loc": ["body", "email"], "msg": "field required", "type": "value_error.missing" },
            { "loc": ["body", "nonce"], "msg": "field required", "type": "value_error.missing" }
        ]
    });
    let kind = FailureKind::classify(&rejected(422, data));
    assert_eq!(kind.message(), "field required; field required");
}

#[test]
fn missing_response_is_status_zero() {
    let envelope: Envelope<()> =
        ErrorNormalizer::default().normalize("get_current_user", &TransportError::NoResponse("timed out".into()));
    assert_eq!(envelope.status(), NO_RESPONSE_STATUS);
    assert_eq!(envelope.message(), NO_RESPONSE_MESSAGE);
}

#[test]
fn setup_failure_is_500_generic() {
    let kind = FailureKind::classify(&TransportError::Setup("bad header".into()));
    assert_eq!(kind, FailureKind::RequestSetupFailed { reason: "bad header".into() });
    assert_eq!(kind.status(), 500);
    assert_eq!(kind.message(), GENERIC_CLIENT_MESSAGE);
}

#[test]
fn unrecognized_failure_is_500_generic() {
    let envelope: Envelope<()> =
        ErrorNormalizer::default().normalize("create_user", &TransportError::Unrecognized("???".into()));
    assert_eq!(envelope.status(), 500);
    assert_eq!(envelope.message(), GENERIC_CLIENT_MESSAGE);
}

#[test]
fn success_status_inside_failure_is_unknown() {
    let kind = FailureKind::classify(&rejected(200, json!({ "detail": "fine" })));
    assert!(matches!(kind, FailureKind::Unknown { .. }));
    assert_eq!(kind.status(), 500);
}

#[test]
fn every_kind_has_non_empty_message_and_code() {
    let kinds = [
        FailureKind::ServerRejected { status: 404, detail: None },
        FailureKind::NoResponse,
        FailureKind::RequestSetupFailed { reason: String::new() },
        FailureKind::Unknown { reason: String::new() },
    ];
    for kind in kinds {
        assert!(!kind.message().is_empty(), "{kind:?}");
        assert!(kind.code().starts_with("E_"), "{kind:?}");
    }
}

// =============================================================================
// reporting
// =============================================================================

#[test]
fn each_failure_is_reported_once_with_operation() {
    let reporter = Arc::new(RecordingReporter::default());
    let normalizer = ErrorNormalizer::new(reporter.clone());

    let _: Envelope<()> = normalizer.normalize("activate", &TransportError::NoResponse("reset".into()));
    let _: Envelope<()> = normalizer.fail("link_external_provider", FailureKind::Unknown { reason: "x".into() });

    let seen = reporter.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], ("activate".to_owned(), FailureKind::NoResponse));
    assert_eq!(seen[1].0, "link_external_provider");
}
