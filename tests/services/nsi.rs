use async_std::task;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statsuite_client::nsi::NsiClient;
use statsuite_client::Error;

use crate::common;

#[test]
fn valid_put() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    task::block_on(
        Mock::given(method("POST"))
            .and(path("/rest/structure"))
            .and(header("Authorization", "Bearer testToken"))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .respond_with(ResponseTemplate::new(207).set_body_string("<Response/>"))
            .expect(1)
            .mount(&mock_server),
    );

    let client = NsiClient::new(&mock_server.uri(), keycloak);

    assert_eq!(
        client.put(b"<Structure/>".to_vec(), "/rest/structure", None).unwrap(),
        207
    );
}

#[test]
fn put_rejected() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    task::block_on(
        Mock::given(method("POST"))
            .and(path("/rest/structure"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server),
    );

    let client = NsiClient::new(&mock_server.uri(), keycloak);

    assert!(matches!(
        client.put(b"<Structure/>".to_vec(), "/rest/structure", None),
        Err(Error::Unauthorized)
    ));
}

#[test]
fn get_merges_headers() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    task::block_on(
        Mock::given(method("GET"))
            .and(path("/rest/dataflow/OECD/DF_TEST/1.0"))
            .and(header("Authorization", "Bearer testToken"))
            .and(header("Accept", "application/xml"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<Structure/>"))
            .expect(1)
            .mount(&mock_server),
    );

    let client = NsiClient::new(&mock_server.uri(), keycloak);

    let mut extra = HeaderMap::new();
    extra.insert(ACCEPT, HeaderValue::from_static("application/xml"));
    extra.insert("Authorization", HeaderValue::from_static("Bearer stale"));

    let response = client
        .get("/rest/dataflow/OECD/DF_TEST/1.0", Some(extra), None)
        .unwrap();

    assert_eq!(response.text().unwrap(), "<Structure/>");
}

#[test]
fn valid_delete() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    task::block_on(
        Mock::given(method("DELETE"))
            .and(path("/rest/dataflow/OECD/DF_TEST/1.0"))
            .and(header("Authorization", "Bearer testToken"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server),
    );

    let client = NsiClient::new(&mock_server.uri(), keycloak);

    assert_eq!(
        client
            .delete("/rest/dataflow/OECD/DF_TEST/1.0", None)
            .unwrap(),
        200
    );
}
