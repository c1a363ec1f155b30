use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tracing::{info, warn};

use crate::errors::check_status;
use crate::keycloak::KeycloakClient;
use crate::{Config, Error};

/// Client for uploading, fetching and deleting SDMX artefacts through the
/// NSI web service
pub struct NsiClient {
    http: reqwest::blocking::Client,
    nsi_url: String,
    keycloak: Arc<KeycloakClient>,
    timeout: Option<Duration>,
}

impl NsiClient {
    /// Creates a new client for the service at `nsi_url`
    pub fn new(nsi_url: &str, keycloak: Arc<KeycloakClient>) -> NsiClient {
        NsiClient {
            http: reqwest::blocking::Client::new(),
            nsi_url: nsi_url.to_string(),
            keycloak,
            timeout: None,
        }
    }

    /// Creates a new client from the nsi settings in the given config
    pub fn from_config(conf: &Config, keycloak: Arc<KeycloakClient>) -> NsiClient {
        let mut client = NsiClient::new(&conf.nsi_url, keycloak);
        client.timeout = conf.request_timeout();
        client
    }

    /// Uses the given http-client for all requests
    pub fn with_http_client(mut self, http: reqwest::blocking::Client) -> Self {
        self.http = http;
        self
    }

    /// Uploads `body` to `path` and returns the status code of the response
    pub fn put(&self, body: Vec<u8>, path: &str, timeout: Option<Duration>) -> Result<u16, Error> {
        let mut headers = self.keycloak.auth_header()?;
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        info!(path, "Uploading to NSI");
        let response = self.send(Method::POST, path, headers, Some(body), timeout)?;

        let status = response.status().as_u16();
        if status != 207 {
            warn!(status, "NSI answered with an unexpected status");
        }

        Ok(check_status(response)?.status().as_u16())
    }

    /// Gets the resource at `path`. `headers` are sent along with the
    /// authorization header, which takes precedence
    pub fn get(
        &self,
        path: &str,
        headers: Option<HeaderMap>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, Error> {
        let mut merged = headers.unwrap_or_default();
        merged.extend(self.keycloak.auth_header()?);

        info!(path, "Getting from NSI");
        check_status(self.send(Method::GET, path, merged, None, timeout)?)
    }

    /// Deletes the resource at `path` and returns the status code of the response
    pub fn delete(&self, path: &str, timeout: Option<Duration>) -> Result<u16, Error> {
        let headers = self.keycloak.auth_header()?;

        info!(path, "Deleting from NSI");
        let response = self.send(Method::DELETE, path, headers, None, timeout)?;
        Ok(check_status(response)?.status().as_u16())
    }

    fn send(
        &self,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: Option<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Result<reqwest::blocking::Response, Error> {
        let url = url::Url::parse(&format!("{}{}", self.nsi_url, path))?;

        let mut req = self.http.request(method, url).headers(headers);
        if let Some(body) = body {
            req = req.body(body);
        }
        if let Some(timeout) = timeout.or(self.timeout) {
            req = req.timeout(timeout);
        }

        Ok(req.send()?)
    }
}
