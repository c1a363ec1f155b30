use std::time::Duration;

use async_std::task;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statsuite_client::keycloak::KeycloakClient;
use statsuite_client::{Config, Error};

use crate::common;

#[test]
fn discovery_sets_endpoints() {
    let mock_server = task::block_on(MockServer::start());

    common::mount_discovery(&mock_server);
    common::mount_password_grant(&mock_server, common::token_body("T1", "R1", 300));

    let client = match KeycloakClient::new(&common::openid_url(&mock_server), "user", "secret") {
        Err(e) => {
            assert!(false, "Should not return error: '{}'", e);
            return;
        }
        Ok(s) => s,
    };

    assert_eq!(client.auth_endpoint(), format!("{}/auth", mock_server.uri()));
    assert_eq!(client.token_endpoint(), format!("{}/token", mock_server.uri()));
}

#[test]
fn discovery_unreachable() {
    let result = KeycloakClient::new(
        "http://127.0.0.1:1/realms/test/.well-known/openid-configuration",
        "user",
        "secret",
    );

    match result {
        Err(Error::Discovery(_)) => {}
        Err(e) => assert!(false, "Wrong error returned: {}", e),
        Ok(_) => assert!(false, "Should return an error"),
    }
}

#[test]
fn discovery_without_token_endpoint() {
    let mock_server = task::block_on(MockServer::start());

    task::block_on(
        Mock::given(method("GET"))
            .and(path(common::OPENID_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "authorization_endpoint": format!("{}/auth", mock_server.uri()),
            })))
            .mount(&mock_server),
    );

    let result = KeycloakClient::new(&common::openid_url(&mock_server), "user", "secret");

    assert!(matches!(result, Err(Error::Discovery(_))));
}

#[test]
fn discovery_not_found() {
    let mock_server = task::block_on(MockServer::start());

    let result = KeycloakClient::new(&common::openid_url(&mock_server), "user", "secret");

    assert!(matches!(result, Err(Error::Discovery(_))));
}

#[test]
fn config_timeout_applies_to_discovery() {
    let mock_server = task::block_on(MockServer::start());

    task::block_on(
        Mock::given(method("GET"))
            .and(path(common::OPENID_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(common::discovery_body(&mock_server))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&mock_server),
    );

    let conf = Config {
        openid_url: common::openid_url(&mock_server),
        username: "user".to_string(),
        password: "secret".to_string(),
        request_timeout: Some(1),
        ..Default::default()
    };

    match KeycloakClient::from_config(&conf) {
        Err(Error::Discovery(_)) => {}
        Err(e) => assert!(false, "Wrong error returned: {}", e),
        Ok(_) => assert!(false, "Should time out"),
    }
}

#[test]
fn config_timeout_allows_fast_responses() {
    let mock_server = task::block_on(MockServer::start());

    common::mount_discovery(&mock_server);
    common::mount_password_grant(&mock_server, common::token_body("T1", "R1", 300));

    let conf = Config {
        openid_url: common::openid_url(&mock_server),
        username: "user".to_string(),
        password: "secret".to_string(),
        request_timeout: Some(5),
        ..Default::default()
    };

    let client = KeycloakClient::from_config(&conf).unwrap();

    assert_eq!(client.access_token().unwrap(), "T1");
}
