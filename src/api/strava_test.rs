use std::collections::HashMap;
use std::sync::Arc;

use super::*;
use crate::api::test_support::{StubTransport, api_over};
use crate::normalize::GENERIC_CLIENT_MESSAGE;

fn config() -> StravaConfig {
    StravaConfig::new("4242", "http://localhost:8000/")
}

fn query(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

#[test]
fn authorize_url_carries_every_parameter() {
    let url = config().authorize_url("7").unwrap();
    assert_eq!(url.scheme(), "https");
    assert_eq!(url.host_str(), Some("www.strava.com"));
    assert_eq!(url.path(), "/oauth/authorize");

    let query = query(&url);
    assert_eq!(query["client_id"], "4242");
    assert_eq!(query["response_type"], "code");
    assert_eq!(query["redirect_uri"], "http://localhost:8000/strava/link");
    assert_eq!(query["approval_prompt"], "force");
    assert_eq!(query["scope"], SCOPES);
    assert_eq!(query["state"], "7");
}

#[test]
fn state_is_escaped() {
    let url = config().authorize_url("a&b=c").unwrap();
    assert_eq!(query(&url)["state"], "a&b=c");
}

#[test]
fn from_vars_trims_and_requires_both() {
    let vars = HashMap::from([("STRAVA_CLIENT_ID", " 4242 "), ("CYCLITY_BACKEND_URL", "https://api.cycliti.example/")]);
    let config = StravaConfig::from_vars(|key| vars.get(key).map(|v| (*v).to_owned())).unwrap();
    assert_eq!(config, StravaConfig::new("4242", "https://api.cycliti.example"));
    assert_eq!(config.redirect_uri(), "https://api.cycliti.example/strava/link");

    assert!(StravaConfig::from_vars(|key| (key == "STRAVA_CLIENT_ID").then(|| "4242".to_owned())).is_none());
    assert!(StravaConfig::from_vars(|_| Some(String::new())).is_none());
}

#[test]
fn link_returns_external_intent() {
    let stub = Arc::new(StubTransport::default());
    let (api, _) = api_over(&stub);
    let api = api.with_strava(Some(config()));

    let envelope = api.link_external_provider("7");

    assert!(envelope.success());
    let Some(NavigationIntent::External(url)) = envelope.into_content() else {
        panic!("expected external intent");
    };
    assert!(url.starts_with(AUTHORIZE_URL));
    assert!(stub.sent().is_empty());
}

#[test]
fn link_without_config_fails_as_setup_error() {
    let stub = Arc::new(StubTransport::default());
    let (api, _) = api_over(&stub);

    let envelope = api.link_external_provider("7");

    assert!(!envelope.success());
    assert_eq!(envelope.status(), 500);
    assert_eq!(envelope.message(), GENERIC_CLIENT_MESSAGE);
}
