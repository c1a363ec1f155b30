use async_std::task;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statsuite_client::config_service::{ConfigClient, Space};
use statsuite_client::Error;

fn mount_tenants(mock_server: &MockServer) {
    task::block_on(
        Mock::given(method("GET"))
            .and(path("/configs/tenants.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "default": {
                    "id": "default",
                    "label": "Default",
                    "spaces": {
                        "design": {"id": "design", "url": "https://nsi-design/rest"},
                        "release": {"id": "release", "url": "https://nsi-release/rest"},
                    },
                },
            })))
            .mount(mock_server),
    );
}

#[test]
fn valid_get_tenants() {
    let mock_server = task::block_on(MockServer::start());
    mount_tenants(&mock_server);

    let client = ConfigClient::new(&mock_server.uri());
    let tenants = client.get_tenants().unwrap();

    let tenant = tenants.get("default").unwrap();
    assert_eq!(tenant.id, "default");
    assert_eq!(tenant.extra.get("label"), Some(&json!("Default")));
    assert_eq!(tenant.spaces.len(), 2);
}

#[test]
fn valid_get_dataspaces() {
    let mock_server = task::block_on(MockServer::start());
    mount_tenants(&mock_server);

    let client = ConfigClient::new(&mock_server.uri());

    assert_eq!(
        client.get_dataspaces("default").unwrap(),
        vec![
            Space {
                id: "design".to_string(),
                url: "https://nsi-design/rest".to_string(),
            },
            Space {
                id: "release".to_string(),
                url: "https://nsi-release/rest".to_string(),
            },
        ]
    );
}

#[test]
fn unknown_tenant() {
    let mock_server = task::block_on(MockServer::start());
    mount_tenants(&mock_server);

    let client = ConfigClient::new(&mock_server.uri());

    assert!(matches!(client.get_dataspaces("oecd"), Err(Error::NotFound)));
}
