use async_std::task;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statsuite_client::authz::{AuthzClient, Rule};
use statsuite_client::Error;

use crate::common;

#[test]
fn valid_add_rule() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    let rule = Rule {
        dataspace: "design".to_string(),
        ..Rule::new("admins", true, 2047)
    };

    task::block_on(
        Mock::given(method("POST"))
            .and(path("/1.1/AuthorizationRules"))
            .and(header("Authorization", "Bearer testToken"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({
                "userMask": "admins",
                "isGroup": true,
                "dataSpace": "design",
                "artefactType": 0,
                "artefactAgencyId": "*",
                "artefactId": "*",
                "artefactVersion": "*",
                "permission": 2047,
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 10})))
            .expect(1)
            .mount(&mock_server),
    );

    let client = AuthzClient::new(&mock_server.uri(), keycloak, "1.1");

    assert_eq!(client.add_rule(&rule).unwrap(), Some(json!({"id": 10})));
}

#[test]
fn duplicate_rule_is_ignored() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    task::block_on(
        Mock::given(method("POST"))
            .and(path("/1.1/AuthorizationRules"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "payload": {
                    "errors": ["Cannot insert duplicate key row in object 'AUTHORIZATIONRULES'"]
                }
            })))
            .mount(&mock_server),
    );

    let client = AuthzClient::new(&mock_server.uri(), keycloak, "1.1");

    assert_eq!(client.add_rule(&Rule::new("admins", true, 2047)).unwrap(), None);
}

#[test]
fn other_rule_errors_fail() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    task::block_on(
        Mock::given(method("POST"))
            .and(path("/1.1/AuthorizationRules"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "payload": {"errors": ["Invalid permission"]}
            })))
            .mount(&mock_server),
    );

    let client = AuthzClient::new(&mock_server.uri(), keycloak, "1.1");

    assert!(matches!(
        client.add_rule(&Rule::new("admins", true, 2047)),
        Err(Error::InvalidRequest)
    ));
}

#[test]
fn delete_rule() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    task::block_on(
        Mock::given(method("DELETE"))
            .and(path("/1.1/AuthorizationRules/10"))
            .and(header("Authorization", "Bearer testToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&mock_server),
    );
    task::block_on(
        Mock::given(method("DELETE"))
            .and(path("/1.1/AuthorizationRules/11"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "payload": {"errors": ["Rule not found"]}
            })))
            .mount(&mock_server),
    );
    task::block_on(
        Mock::given(method("DELETE"))
            .and(path("/1.1/AuthorizationRules/12"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server),
    );

    let client = AuthzClient::new(&mock_server.uri(), keycloak, "1.1");

    assert_eq!(client.delete_rule("10").unwrap(), Some(json!({"success": true})));
    assert_eq!(client.delete_rule("11").unwrap(), None);
    assert!(matches!(client.delete_rule("12"), Err(Error::Other(500))));
}
