use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::check_status;
use crate::internals::utils;
use crate::{Config, Error};

/// Struct used for creating a collection, contains the options the
/// collections admin api accepts for the `CREATE` action
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CollectionOptions {
    /// The name of the collection
    pub name: String,
    /// The configset to use
    #[serde(rename = "collection.configName")]
    pub config_name: String,
    /// The number of shards
    #[serde(rename = "numShards")]
    pub num_shards: u32,
    /// The replication factor
    #[serde(rename = "replicationFactor")]
    pub replication_factor: u32,
    /// The router used to distribute documents over the shards
    #[serde(rename = "router.name")]
    pub router_name: String,
    /// The response format
    pub wt: String,
}

impl CollectionOptions {
    /// Options for a collection called `name` with solr's defaults
    pub fn new(name: &str) -> CollectionOptions {
        CollectionOptions {
            name: name.to_string(),
            config_name: "_default".to_string(),
            num_shards: 1,
            replication_factor: 1,
            router_name: "compositeId".to_string(),
            wt: "json".to_string(),
        }
    }
}

#[derive(Serialize)]
struct Action<'a, T: Serialize> {
    action: &'a str,
    #[serde(flatten)]
    params: T,
}

#[derive(Serialize)]
struct DeleteParams<'a> {
    name: &'a str,
    wt: &'a str,
}

/// Client for the collections admin api of solr
pub struct SolrClient {
    http: reqwest::blocking::Client,
    solr_url: String,
    timeout: Option<Duration>,
}

impl SolrClient {
    /// Creates a new client for the solr instance at `solr_url`
    pub fn new(solr_url: &str) -> SolrClient {
        SolrClient {
            http: reqwest::blocking::Client::new(),
            solr_url: solr_url.to_string(),
            timeout: None,
        }
    }

    /// Creates a new client from the solr settings in the given config
    pub fn from_config(conf: &Config) -> SolrClient {
        let mut client = SolrClient::new(&conf.solr_url);
        client.timeout = conf.request_timeout();
        client
    }

    /// Uses the given http-client for all requests
    pub fn with_http_client(mut self, http: reqwest::blocking::Client) -> Self {
        self.http = http;
        self
    }

    /// Creates a new collection
    pub fn create_collection(&self, opts: &CollectionOptions) -> Result<Value, Error> {
        info!(name = %opts.name, "Creating Solr collection");
        let result = self.collections_admin(&Action {
            action: "CREATE",
            params: opts,
        })?;

        info!(name = %opts.name, "Collection created");
        Ok(result)
    }

    /// Deletes the collection `name`
    pub fn delete_collection(&self, name: &str) -> Result<Value, Error> {
        info!(name, "Deleting Solr collection");
        let result = self.collections_admin(&Action {
            action: "DELETE",
            params: DeleteParams { name, wt: "json" },
        })?;

        info!(name, "Collection deleted");
        Ok(result)
    }

    fn collections_admin<T: Serialize>(&self, params: &T) -> Result<Value, Error> {
        let url = utils::service_url(&self.solr_url, "solr/admin/collections")?;

        let mut req = self.http.get(url).query(params);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        Ok(check_status(req.send()?)?.json()?)
    }
}
