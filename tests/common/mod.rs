//! Shared fixtures: a wiremock OPNsense and canned operation responses.
#![allow(dead_code)]

use std::time::Duration;

use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unbound_overrides::endpoint::DomainFilter;
use unbound_overrides::opnsense::client::{
    ADD_OVERRIDE_PATH, OpnsenseClient, RECONFIGURE_PATH, SEARCH_OVERRIDES_PATH,
};
use unbound_overrides::unbound::Unbound;

pub const CREDS: &str = "key:secret";
pub const AUTH: &str = "Basic a2V5OnNlY3JldA==";

pub const CREATE_OK: &str = r#"{"result":"saved"}"#;
pub const CREATE_FAIL: &str = r#"{"result":"failure"}"#;
pub const DELETE_OK: &str = r#"{"result":"deleted"}"#;
pub const DELETE_FAIL: &str = r#"{"result":"failure"}"#;
pub const RECONFIGURE_OK: &str = r#"{"result":""}"#;

pub const DEL_PATH_RE: &str = r"^/api/unbound/settings/delHostOverride/.*$";

pub const HERITAGE: &str = "heritage=external-dns,external-dns/owner=default,external-dns/resource=ingress/jellybelly/jellybelly";

pub const SEARCH_BODY: &str = r#"{"Rows": [{
    "uuid": "some-uuid-here",
    "hostname": "foo",
    "domain": "example.domain",
    "rr": "A (Ipv4 Address)",
    "Server": "10.0.0.4",
    "Description": "Managed by K8s external-dns aGVyaXRhZ2U9ZXh0ZXJuYWwtZG5zLGV4dGVybmFsLWRucy9vd25lcj1kZWZhdWx0LGV4dGVybmFsLWRucy9yZXNvdXJjZT1pbmdyZXNzL2plbGx5YmVsbHkvamVsbHliZWxseQ=="
}]}"#;

pub fn provider_for(server: &MockServer) -> Unbound {
    let client = OpnsenseClient::new(server.uri(), CREDS, Duration::from_secs(5))
        .expect("client builds");
    Unbound::new(client, DomainFilter::default())
}

pub fn json(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "application/json")
}

pub async fn mount_search(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(SEARCH_OVERRIDES_PATH))
        .respond_with(json(body))
        .mount(server)
        .await;
}

pub async fn mount_add(server: &MockServer, body: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(ADD_OVERRIDE_PATH))
        .respond_with(json(body))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_del(server: &MockServer, body: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path_regex(DEL_PATH_RE))
        .respond_with(json(body))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn mount_reconfigure(server: &MockServer, body: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(RECONFIGURE_PATH))
        .respond_with(json(body))
        .expect(times)
        .mount(server)
        .await;
}

/// Paths of every request the mock server saw, in arrival order.
pub async fn request_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}
