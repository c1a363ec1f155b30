mod models;
mod resolver;

pub use models::*;
pub use resolver::*;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tracing::{error, info};

use crate::clock::SystemClock;
use crate::errors::check_status;
use crate::internals::utils;
use crate::job::{JobHandle, JobStatusResolver};
use crate::keycloak::KeycloakClient;
use crate::poller::{PollConfig, PollOutcome};
use crate::{Config, Error};

/// The status code the logs endpoint intermittently answers with when a
/// single log is requested by id
const BAD_GATEWAY: u16 = 502;

/// Client for the admin endpoints of the SDMX faceted search service (SFS).
///
/// Requests are authenticated with the api-key, if a [`KeycloakClient`] is
/// attached they also carry its bearer token
pub struct SfsClient {
    http: reqwest::blocking::Client,
    sfs_url: String,
    api_key: String,
    keycloak: Option<Arc<KeycloakClient>>,
    timeout: Option<Duration>,
}

impl SfsClient {
    /// Creates a new client for the service at `sfs_url`
    pub fn new(sfs_url: &str, api_key: &str) -> SfsClient {
        SfsClient {
            http: reqwest::blocking::Client::new(),
            sfs_url: sfs_url.to_string(),
            api_key: api_key.to_string(),
            keycloak: None,
            timeout: None,
        }
    }

    /// Creates a new client from the sfs settings in the given config
    pub fn from_config(conf: &Config) -> SfsClient {
        let mut client = SfsClient::new(&conf.sfs_url, &conf.sfs_api_key);
        client.timeout = conf.request_timeout();
        client
    }

    /// Uses the given http-client for all requests
    pub fn with_http_client(mut self, http: reqwest::blocking::Client) -> Self {
        self.http = http;
        self
    }

    /// Stamps every request with the bearer token of `keycloak`
    pub fn with_keycloak(mut self, keycloak: Arc<KeycloakClient>) -> Self {
        self.keycloak = Some(keycloak);
        self
    }

    /// Applies `timeout` to every request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The resolver used to wait for indexing jobs of this service
    pub fn indexing_resolver(&self) -> IndexingJobResolver<'_> {
        IndexingJobResolver::new(self)
    }

    /// Triggers a new indexing task for `tenant` and returns its handle
    pub fn index(&self, tenant: &str) -> Result<JobHandle, Error> {
        info!(tenant, "Triggering indexing");
        let response = check_status(self.admin_request(
            Method::POST,
            "admin/dataflows",
            &[("tenant", tenant)],
        )?)?;

        let index: Index = response.json()?;
        Ok(JobHandle::new(index.loading_id, tenant))
    }

    /// Gets the log and status of a loading by its id.
    ///
    /// If fetching the log by id fails with a 502, all logs of the tenant are
    /// fetched instead and searched for `loading_id`. Returns `None` if the
    /// loading can't be found
    pub fn get_log(&self, tenant: &str, loading_id: &str) -> Result<Option<LoadingLog>, Error> {
        let response = self.admin_request(
            Method::GET,
            "admin/logs",
            &[("tenant", tenant), ("id", loading_id)],
        )?;

        match response.status().as_u16() {
            BAD_GATEWAY => {}
            404 => return Ok(None),
            _ => {
                let log: LoadingLog = check_status(response)?.json()?;
                return Ok(Some(log));
            }
        }

        error!(tenant, loading_id, "Error 502 getting loading log, using expensive query");
        let response = self.admin_request(Method::GET, "admin/logs", &[("tenant", tenant)])?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::TransientService(format!(
                "fallback lookup of loading {} answered with status {}",
                loading_id,
                status.as_u16()
            )));
        }

        let loadings: Vec<LoadingLog> = response.json()?;
        let found = loadings.into_iter().find(|l| l.id == loading_id);
        if found.is_none() {
            error!(tenant, loading_id, "Loading not found in the logs");
        }

        Ok(found)
    }

    /// Checks the status of a loading task
    pub fn check_status_loading(&self, tenant: &str, loading_id: &str) -> Result<PollOutcome, Error> {
        self.indexing_resolver()
            .resolve(&JobHandle::new(loading_id, tenant))
    }

    /// Periodically checks the status of the indexing task until it completes
    /// or `config.timeout` expires, see [`crate::poller::wait_until_terminal`]
    pub fn wait_for_index_to_finish(
        &self,
        job: &JobHandle,
        config: &PollConfig,
    ) -> Result<bool, Error> {
        self.indexing_resolver().wait_for(job, config, &SystemClock)
    }

    fn admin_request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::blocking::Response, Error> {
        let mut url = utils::service_url(&self.sfs_url, path)?;
        url.query_pairs_mut()
            .append_pair("api-key", &self.api_key)
            .extend_pairs(query);

        let mut req = self.http.request(method, url);
        if let Some(keycloak) = &self.keycloak {
            req = req.headers(keycloak.auth_header()?);
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        Ok(req.send()?)
    }
}
