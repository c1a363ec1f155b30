use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::internals::utils;
use crate::keycloak::KeycloakClient;
use crate::{Config, Error};

/// The api version used if none is given
pub const DEFAULT_API_VERSION: &str = "1.1";

const DUPLICATE_RULE: &str = "Cannot insert duplicate key";
const RULE_NOT_FOUND: &str = "Rule not found";

/// An authorization rule as accepted by the authorization service
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// The user or group the rule applies to
    pub user_mask: String,
    /// Whether `user_mask` names a group
    pub is_group: bool,
    /// The dataspace, `*` for all of them
    #[serde(rename = "dataSpace")]
    pub dataspace: String,
    /// The type of artefact
    pub artefact_type: u32,
    /// The agency of the artefact, `*` for any
    pub artefact_agency_id: String,
    /// The id of the artefact, `*` for any
    pub artefact_id: String,
    /// The version of the artefact, `*` for any
    pub artefact_version: String,
    /// The permission level that is granted
    pub permission: u64,
}

impl Rule {
    /// Creates a rule granting `permission` to `user_mask` on every artefact
    /// in every dataspace
    pub fn new(user_mask: &str, is_group: bool, permission: u64) -> Rule {
        Rule {
            user_mask: user_mask.to_string(),
            is_group,
            dataspace: "*".to_string(),
            artefact_type: 0,
            artefact_agency_id: "*".to_string(),
            artefact_id: "*".to_string(),
            artefact_version: "*".to_string(),
            permission,
        }
    }
}

#[derive(Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    payload: ErrorPayload,
}

/// Client for managing the authorization rules of the authorization service
pub struct AuthzClient {
    http: reqwest::blocking::Client,
    auth_url: String,
    keycloak: Arc<KeycloakClient>,
    timeout: Option<Duration>,
}

impl AuthzClient {
    /// Creates a new client for `{auth_url}/{api_version}`
    pub fn new(auth_url: &str, keycloak: Arc<KeycloakClient>, api_version: &str) -> AuthzClient {
        AuthzClient {
            http: reqwest::blocking::Client::new(),
            auth_url: format!("{}/{}", auth_url.trim_end_matches('/'), api_version),
            keycloak,
            timeout: None,
        }
    }

    /// Creates a new client from the authorization settings in the given config
    pub fn from_config(conf: &Config, keycloak: Arc<KeycloakClient>) -> AuthzClient {
        let mut client = AuthzClient::new(&conf.auth_url, keycloak, &conf.auth_api_version);
        client.timeout = conf.request_timeout();
        client
    }

    /// Uses the given http-client for all requests
    pub fn with_http_client(mut self, http: reqwest::blocking::Client) -> Self {
        self.http = http;
        self
    }

    /// Adds a new authorization rule.
    ///
    /// Returns `None` if the same rule already exists
    pub fn add_rule(&self, rule: &Rule) -> Result<Option<Value>, Error> {
        info!(user_mask = %rule.user_mask, permission = rule.permission, "Adding rule");
        let url = utils::service_url(&self.auth_url, "AuthorizationRules")?;
        let req = self.request(Method::POST, url)?.json(rule);

        self.handle_response(req.send()?, DUPLICATE_RULE)
    }

    /// Deletes the authorization rule with the given id.
    ///
    /// Returns `None` if there is no such rule
    pub fn delete_rule(&self, rule_id: &str) -> Result<Option<Value>, Error> {
        info!(rule_id, "Deleting rule");
        let url = utils::service_url(&self.auth_url, &format!("AuthorizationRules/{}", rule_id))?;
        let req = self.request(Method::DELETE, url)?;

        self.handle_response(req.send()?, RULE_NOT_FOUND)
    }

    fn request(
        &self,
        method: Method,
        url: url::Url,
    ) -> Result<reqwest::blocking::RequestBuilder, Error> {
        let mut req = self
            .http
            .request(method, url)
            .headers(self.keycloak.auth_header()?);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        Ok(req)
    }

    /// Errors whose first message starts with `tolerated` are not treated as
    /// a failure
    fn handle_response(
        &self,
        response: reqwest::blocking::Response,
        tolerated: &str,
    ) -> Result<Option<Value>, Error> {
        let status = response.status().as_u16();
        if status < 400 {
            return Ok(Some(response.json()?));
        }

        let body: ErrorResponse = response.json().unwrap_or_default();
        match body.payload.errors.first() {
            Some(first) if first.starts_with(tolerated) => {
                warn!(status, error = %first, "Ignoring error response");
                Ok(None)
            }
            _ => Err(Error::from_status_code(status)),
        }
    }
}
