use std::collections::HashMap;

use super::*;

fn from_map(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    ClientConfig::from_vars(|key| map.get(key).cloned())
}

#[test]
fn defaults_apply_when_nothing_is_set() {
    let config = from_map(&[]).unwrap();
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.timeouts, Timeouts::default());
    assert_eq!(config.store_path, FileMedium::default_path());
    assert!(config.strava.is_none());
}

#[test]
fn overrides_are_read() {
    let config = from_map(&[
        ("CYCLITY_API_URL", "https://api.cycliti.example/api/v1/"),
        ("CYCLITY_STORE_PATH", "/tmp/cyclity/session.json"),
        ("CYCLITY_REQUEST_TIMEOUT_SECS", "5"),
        ("CYCLITY_CONNECT_TIMEOUT_SECS", " 2 "),
    ])
    .unwrap();
    assert_eq!(config.api_url, "https://api.cycliti.example/api/v1");
    assert_eq!(config.store_path, Some(PathBuf::from("/tmp/cyclity/session.json")));
    assert_eq!(config.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
}

#[test]
fn unparsable_timeout_falls_back_to_default() {
    let config = from_map(&[("CYCLITY_REQUEST_TIMEOUT_SECS", "soon")]).unwrap();
    assert_eq!(config.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn blank_store_path_uses_default_location() {
    let config = from_map(&[("CYCLITY_STORE_PATH", "  ")]).unwrap();
    assert_eq!(config.store_path, FileMedium::default_path());
}

#[test]
fn malformed_api_url_is_rejected() {
    let err = from_map(&[("CYCLITY_API_URL", "not a url")]).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { var: "CYCLITY_API_URL", .. }));
}

#[test]
fn non_http_scheme_is_rejected() {
    let err = from_map(&[("CYCLITY_API_URL", "ftp://files.example/api")]).unwrap_err();
    assert_eq!(err.to_string(), "invalid URL in CYCLITY_API_URL: unsupported scheme 'ftp'");
}

#[test]
fn strava_requires_both_variables() {
    assert!(from_map(&[("STRAVA_CLIENT_ID", "4242")]).unwrap().strava.is_none());
    assert!(from_map(&[("CYCLITY_BACKEND_URL", "http://localhost:8000")]).unwrap().strava.is_none());

    let config =
        from_map(&[("STRAVA_CLIENT_ID", "4242"), ("CYCLITY_BACKEND_URL", "http://localhost:8000/")]).unwrap();
    let strava = config.strava.unwrap();
    assert_eq!(strava.client_id, "4242");
    assert_eq!(strava.backend_url, "http://localhost:8000");
}
