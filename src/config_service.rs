use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::errors::check_status;
use crate::internals::utils;
use crate::{Config, Error};

/// One dataspace of a tenant
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Space {
    /// The id of the dataspace
    pub id: String,
    /// The url of the NSI web service backing the dataspace
    pub url: String,
}

/// The configuration of one tenant
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Tenant {
    /// The id of the tenant
    pub id: String,
    /// The dataspaces of the tenant by their key
    #[serde(default)]
    pub spaces: BTreeMap<String, Space>,
    /// Every other field of the tenant
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// All tenants by their key, as found in `tenants.json`
pub type Tenants = BTreeMap<String, Tenant>;

/// Client for the (unauthenticated) config service
pub struct ConfigClient {
    http: reqwest::blocking::Client,
    config_url: String,
    timeout: Option<Duration>,
}

impl ConfigClient {
    /// Creates a new client for the service at `config_url`
    pub fn new(config_url: &str) -> ConfigClient {
        ConfigClient {
            http: reqwest::blocking::Client::new(),
            config_url: config_url.to_string(),
            timeout: None,
        }
    }

    /// Creates a new client from the config-service settings in the given config
    pub fn from_config(conf: &Config) -> ConfigClient {
        let mut client = ConfigClient::new(&conf.config_url);
        client.timeout = conf.request_timeout();
        client
    }

    /// Uses the given http-client for all requests
    pub fn with_http_client(mut self, http: reqwest::blocking::Client) -> Self {
        self.http = http;
        self
    }

    /// Loads the configuration of all tenants
    pub fn get_tenants(&self) -> Result<Tenants, Error> {
        info!("Getting tenants configuration");
        let mut req = self
            .http
            .get(utils::service_url(&self.config_url, "configs/tenants.json")?);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        Ok(check_status(req.send()?)?.json()?)
    }

    /// Returns the dataspaces configured for `tenant`, ordered by their key
    pub fn get_dataspaces(&self, tenant: &str) -> Result<Vec<Space>, Error> {
        let mut tenants = self.get_tenants()?;
        let tenant = tenants.remove(tenant).ok_or(Error::NotFound)?;

        Ok(tenant.spaces.into_values().collect())
    }
}
