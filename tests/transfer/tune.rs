use async_std::task;

use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statsuite_client::transfer::TransferClient;

use crate::common;

#[test]
fn valid_get_tune() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    let tune = json!({"dsd": "DSD_TEST", "indexType": "CLUSTERED_COLUMNSTORE"});
    task::block_on(
        Mock::given(method("POST"))
            .and(path("/3/tune/info"))
            .and(body_string_contains("dataspace=design"))
            .and(body_string_contains("dsd=DSD_TEST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&tune))
            .mount(&mock_server),
    );

    let client = TransferClient::new(&mock_server.uri(), keycloak, "3");

    assert_eq!(client.get_tune("design", "DSD_TEST").unwrap(), tune);
}

#[test]
fn valid_set_tune() {
    let mock_server = task::block_on(MockServer::start());
    let keycloak = common::keycloak_with_token(&mock_server, "testToken");

    task::block_on(
        Mock::given(method("POST"))
            .and(path("/3/tune/dsd"))
            .and(body_string_contains("indexType=1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&mock_server),
    );

    let client = TransferClient::new(&mock_server.uri(), keycloak, "3");

    assert_eq!(
        client.set_tune("design", "DSD_TEST", 1).unwrap(),
        json!({"success": true})
    );
}
