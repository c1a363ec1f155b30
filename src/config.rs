use std::time::Duration;

use serde::Deserialize;

use crate::keycloak::DEFAULT_CLIENT_ID;
use crate::Error;

/// The Configuration for all of the service clients
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The openid-configuration url of the keycloak realm
    pub openid_url: String,
    /// The username used for the password grant
    pub username: String,
    /// The password used for the password grant
    pub password: String,
    /// The client-id sent with every grant
    pub client_id: String,
    /// The base url of the search service
    pub sfs_url: String,
    /// The api-key for the admin endpoints of the search service
    pub sfs_api_key: String,
    /// The base url of the transfer service, without the api version
    pub transfer_url: String,
    /// The api version of the transfer service
    pub transfer_api_version: String,
    /// The base url of the authorization service, without the api version
    pub auth_url: String,
    /// The api version of the authorization service
    pub auth_api_version: String,
    /// The base url of the NSI web service
    pub nsi_url: String,
    /// The base url of the config service
    pub config_url: String,
    /// The base url of solr
    pub solr_url: String,
    /// Timeout in seconds applied to requests that don't get their own
    pub request_timeout: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openid_url: String::new(),
            username: String::new(),
            password: String::new(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            sfs_url: String::new(),
            sfs_api_key: String::new(),
            transfer_url: String::new(),
            transfer_api_version: "3".to_string(),
            auth_url: String::new(),
            auth_api_version: "1.1".to_string(),
            nsi_url: String::new(),
            config_url: String::new(),
            solr_url: "http://localhost:8983".to_string(),
            request_timeout: None,
        }
    }
}

impl Config {
    /// Loads the config from `STATSUITE_*` environment variables.
    ///
    /// Environment-Variables:
    /// * `STATSUITE_OPENID_URL`, `STATSUITE_USERNAME`, `STATSUITE_PASSWORD`: required
    /// * `STATSUITE_CLIENT_ID`, `STATSUITE_SFS_URL`, `STATSUITE_SFS_API_KEY`,
    ///   `STATSUITE_TRANSFER_URL`, `STATSUITE_TRANSFER_API_VERSION`,
    ///   `STATSUITE_AUTH_URL`, `STATSUITE_AUTH_API_VERSION`, `STATSUITE_NSI_URL`,
    ///   `STATSUITE_CONFIG_URL`, `STATSUITE_SOLR_URL`, `STATSUITE_REQUEST_TIMEOUT`:
    ///   optional, the defaults are kept if unset
    pub fn from_env() -> Result<Config, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads the values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key).ok_or_else(|| Error::Config(format!("missing environment variable {}", key)))
        };

        let mut conf = Config {
            openid_url: required("STATSUITE_OPENID_URL")?,
            username: required("STATSUITE_USERNAME")?,
            password: required("STATSUITE_PASSWORD")?,
            ..Default::default()
        };

        let optional = [
            ("STATSUITE_CLIENT_ID", &mut conf.client_id),
            ("STATSUITE_SFS_URL", &mut conf.sfs_url),
            ("STATSUITE_SFS_API_KEY", &mut conf.sfs_api_key),
            ("STATSUITE_TRANSFER_URL", &mut conf.transfer_url),
            ("STATSUITE_TRANSFER_API_VERSION", &mut conf.transfer_api_version),
            ("STATSUITE_AUTH_URL", &mut conf.auth_url),
            ("STATSUITE_AUTH_API_VERSION", &mut conf.auth_api_version),
            ("STATSUITE_NSI_URL", &mut conf.nsi_url),
            ("STATSUITE_CONFIG_URL", &mut conf.config_url),
            ("STATSUITE_SOLR_URL", &mut conf.solr_url),
        ];
        for (key, field) in optional {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }

        if let Some(raw) = lookup("STATSUITE_REQUEST_TIMEOUT") {
            let secs = raw.parse::<u64>().map_err(|_| {
                Error::Config(format!("STATSUITE_REQUEST_TIMEOUT is not a number: {}", raw))
            })?;
            conf.request_timeout = Some(secs);
        }

        Ok(conf)
    }

    /// The default request timeout as a [`Duration`]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }
}
