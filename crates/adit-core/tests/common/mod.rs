//! Shared helpers for mock-server tests
#![allow(dead_code)]

use adit_common::RepositoryConfig;
use adit_core::client::RepositoryClient;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SESSION_TOKEN: &str = "test-session";

/// Mount the login endpoint every client test needs.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/users/admin/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"session": SESSION_TOKEN})),
        )
        .mount(server)
        .await;
}

/// Connect a client against the mock server with default settings.
pub async fn connect(server: &MockServer) -> RepositoryClient {
    RepositoryClient::connect(&RepositoryConfig::for_endpoint(
        server.uri(),
        "admin",
        "admin",
    ))
    .await
    .expect("failed to connect to mock repository")
}

/// A find_by_id response body carrying the given refs.
pub fn find_by_id_body(refs: &[&str]) -> Value {
    json!({
        "archival_objects": refs.iter().map(|r| json!({"ref": r})).collect::<Vec<_>>()
    })
}

/// A plausible fully resolved catalog record.
pub fn record_json(component_id: &str, uri: &str) -> Value {
    json!({
        "uri": uri,
        "component_id": component_id,
        "title": format!("Title for {component_id}"),
        "display_string": format!("Title for {component_id}, 1950"),
        "level": "file",
        "repository": {
            "ref": "/repositories/2",
            "_resolved": {"name": "University Archives", "repo_code": "UA"}
        },
        "ancestors": [{
            "ref": "/repositories/2/resources/1",
            "level": "collection",
            "_resolved": {"title": "Expedition Papers", "id_0": "RC0123"}
        }],
        "instances": [],
        "lock_version": 1
    })
}

/// Mount both halves of a component-id resolution: the find_by_id
/// lookup and the resolved record fetch.
pub async fn mount_record(server: &MockServer, component_id: &str, id_number: u64) {
    let uri = format!("/repositories/2/archival_objects/{id_number}");
    Mock::given(method("GET"))
        .and(path("/repositories/2/find_by_id/archival_objects"))
        .and(query_param("component_id[]", component_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(find_by_id_body(&[&uri])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(uri.as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(record_json(component_id, &uri)),
        )
        .mount(server)
        .await;
}

/// Mount a find_by_id lookup with zero matches.
pub async fn mount_missing(server: &MockServer, component_id: &str) {
    Mock::given(method("GET"))
        .and(path("/repositories/2/find_by_id/archival_objects"))
        .and(query_param("component_id[]", component_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(find_by_id_body(&[])))
        .mount(server)
        .await;
}
