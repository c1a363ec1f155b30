use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::{Config, Error};

/// The client-id used for the grants if none is configured
pub const DEFAULT_CLIENT_ID: &str = "stat-suite";

#[derive(Deserialize)]
struct OpenidConfiguration {
    authorization_endpoint: Option<String>,
    token_endpoint: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
}

#[derive(Clone, Debug, Default)]
struct TokenState {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_at: Option<Instant>,
}

impl TokenState {
    fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => expires_at < now,
        }
    }
}

/// Extra settings for a [`KeycloakClient`]
pub struct KeycloakOptions {
    /// The client-id sent with every grant
    pub client_id: String,
    /// The http-client used for the discovery and the grants
    pub http: reqwest::blocking::Client,
    /// The clock used to track the expiry of the access token
    pub clock: Arc<dyn Clock + Send + Sync>,
}

impl Default for KeycloakOptions {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            http: reqwest::blocking::Client::new(),
            clock: Arc::new(SystemClock),
        }
    }
}

/// Holds the access/refresh token pair obtained from Keycloak and refreshes
/// the access token once it has expired.
///
/// The token pair is kept behind a mutex which is also held while a refresh
/// is in flight, so a client shared between threads never issues two refresh
/// grants at the same time
pub struct KeycloakClient {
    http: reqwest::blocking::Client,
    client_id: String,
    auth_endpoint: String,
    token_endpoint: String,
    clock: Arc<dyn Clock + Send + Sync>,
    tokens: Mutex<TokenState>,
}

impl KeycloakClient {
    /// This function fetches the openid-configuration from `openid_url` and
    /// authenticates with the given username and password
    pub fn new(openid_url: &str, username: &str, password: &str) -> Result<KeycloakClient, Error> {
        Self::with_options(openid_url, username, password, KeycloakOptions::default())
    }

    /// Same as [`KeycloakClient::new`] but with custom [`KeycloakOptions`]
    pub fn with_options(
        openid_url: &str,
        username: &str,
        password: &str,
        opts: KeycloakOptions,
    ) -> Result<KeycloakClient, Error> {
        let (auth_endpoint, token_endpoint) = discover(&opts.http, openid_url)?;

        let client = KeycloakClient {
            http: opts.http,
            client_id: opts.client_id,
            auth_endpoint,
            token_endpoint,
            clock: opts.clock,
            tokens: Mutex::new(TokenState::default()),
        };

        info!(endpoint = %client.auth_endpoint, "Authenticating");
        let state = client.grant(&[
            ("grant_type", "password"),
            ("client_id", client.client_id.as_str()),
            ("username", username),
            ("password", password),
        ])?;
        *client.lock() = state;

        Ok(client)
    }

    /// Creates a new client from the keycloak settings in the given config,
    /// the configured request timeout also applies to discovery and grants
    pub fn from_config(conf: &Config) -> Result<KeycloakClient, Error> {
        let mut http = reqwest::blocking::Client::builder();
        if let Some(timeout) = conf.request_timeout() {
            http = http.timeout(timeout);
        }

        let opts = KeycloakOptions {
            client_id: conf.client_id.clone(),
            http: http.build()?,
            ..Default::default()
        };

        Self::with_options(&conf.openid_url, &conf.username, &conf.password, opts)
    }

    /// The authorization endpoint announced by the openid-configuration
    pub fn auth_endpoint(&self) -> &str {
        &self.auth_endpoint
    }

    /// The token endpoint announced by the openid-configuration
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// Checks if the current access token is expired.
    ///
    /// NOTE: This only checks the `expires_in` returned with the token and does
    /// not ask keycloak whether the token has been revoked
    pub fn is_expired(&self) -> bool {
        self.lock().is_expired(self.clock.now())
    }

    /// Returns a currently valid access token, refreshing it first if it has
    /// expired
    pub fn access_token(&self) -> Result<String, Error> {
        let mut tokens = self.lock();
        if tokens.is_expired(self.clock.now()) {
            *tokens = self.refresh_grant(&tokens)?;
        }

        tokens
            .access_token
            .clone()
            .ok_or_else(|| Error::Authentication("no access token available".to_string()))
    }

    /// Exchanges the refresh token for a new token pair, even if the current
    /// access token is still valid
    pub fn refresh(&self) -> Result<(), Error> {
        let mut tokens = self.lock();
        *tokens = self.refresh_grant(&tokens)?;
        Ok(())
    }

    /// Creates the `Authorization: Bearer <token>` header for a request
    pub fn auth_header(&self) -> Result<HeaderMap, Error> {
        bearer_header(&self.access_token()?)
    }

    fn refresh_grant(&self, current: &TokenState) -> Result<TokenState, Error> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or_else(|| Error::Authentication("no refresh token available".to_string()))?;

        info!("Triggering refresh token");
        self.grant(&[
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token),
        ])
    }

    fn grant(&self, form: &[(&str, &str)]) -> Result<TokenState, Error> {
        let response = self.http.post(&self.token_endpoint).form(form).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Authentication(format!(
                "token endpoint answered with status {}",
                status.as_u16()
            )));
        }

        let data: TokenResponse = response
            .json()
            .map_err(|e| Error::Authentication(format!("malformed token response: {}", e)))?;

        let access_token = data.access_token.ok_or_else(|| missing("access_token"))?;
        let refresh_token = data.refresh_token.ok_or_else(|| missing("refresh_token"))?;
        let expires_in = data.expires_in.ok_or_else(|| missing("expires_in"))?;
        let expires_at = self
            .clock
            .now()
            .checked_add(Duration::from_secs(expires_in))
            .ok_or_else(|| {
                Error::Authentication(format!("expires_in out of range: {}", expires_in))
            })?;
        debug!(expires_in, "Obtained new token pair");

        Ok(TokenState {
            access_token: Some(access_token),
            refresh_token: Some(refresh_token),
            expires_at: Some(expires_at),
        })
    }

    fn lock(&self) -> MutexGuard<'_, TokenState> {
        self.tokens
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Builds a header map containing only the bearer authorization for `token`
pub fn bearer_header(token: &str) -> Result<HeaderMap, Error> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|_| Error::Authentication("token is not a valid header value".to_string()))?;
    value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

fn missing(field: &str) -> Error {
    Error::Authentication(format!("token response is missing `{}`", field))
}

fn discover(http: &reqwest::blocking::Client, openid_url: &str) -> Result<(String, String), Error> {
    info!(url = openid_url, "Getting openid configuration");

    let response = http
        .get(openid_url)
        .send()
        .map_err(|e| Error::Discovery(format!("Failed to get openid configuration: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Discovery(format!(
            "openid configuration answered with status {}",
            status.as_u16()
        )));
    }

    let conf: OpenidConfiguration = response
        .json()
        .map_err(|e| Error::Discovery(format!("malformed openid configuration: {}", e)))?;

    match (conf.authorization_endpoint, conf.token_endpoint) {
        (Some(auth), Some(token)) => Ok((auth, token)),
        _ => Err(Error::Discovery(
            "openid configuration is missing the authorization or token endpoint".to_string(),
        )),
    }
}
