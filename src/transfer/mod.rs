mod resolver;

pub use resolver::*;

use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::clock::SystemClock;
use crate::errors::check_status;
use crate::internals::utils;
use crate::job::{JobHandle, JobStatusResolver};
use crate::keycloak::KeycloakClient;
use crate::poller::PollConfig;
use crate::{Config, Error};

/// The api version used if none is given
pub const DEFAULT_API_VERSION: &str = "3";

/// Options for [`TransferClient::import_sdmx_file`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    /// The version the data is imported into
    pub target_version: u32,
    /// Whether a restoration point is required
    pub restoration_option_required: bool,
    /// The type of validation to perform
    pub validation_type: u32,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            target_version: 0,
            restoration_option_required: false,
            validation_type: 1,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusRequest<'a> {
    dataspace: &'a str,
    id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferRequest<'a> {
    source_dataspace: &'a str,
    destination_dataspace: &'a str,
    source_dataflow: &'a str,
    destination_dataflow: &'a str,
    transfer_content: u32,
    source_version: u32,
    target_version: u32,
    restoration_option_required: bool,
    validation_type: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TuneRequest<'a> {
    dataspace: &'a str,
    dsd: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_type: Option<u32>,
}

#[derive(Deserialize)]
struct MessageResponse {
    message: Option<String>,
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(rename = "executionStatus")]
    execution_status: Option<String>,
}

/// Client for the SDMX transfer service: file imports, dataflow transfers
/// and DSD tuning
pub struct TransferClient {
    http: reqwest::blocking::Client,
    transfer_url: String,
    keycloak: Arc<KeycloakClient>,
    timeout: Option<Duration>,
}

impl TransferClient {
    /// Creates a new client for `{transfer_url}/{api_version}`
    pub fn new(transfer_url: &str, keycloak: Arc<KeycloakClient>, api_version: &str) -> TransferClient {
        TransferClient {
            http: reqwest::blocking::Client::new(),
            transfer_url: format!("{}/{}", transfer_url.trim_end_matches('/'), api_version),
            keycloak,
            timeout: None,
        }
    }

    /// Creates a new client from the transfer settings in the given config
    pub fn from_config(conf: &Config, keycloak: Arc<KeycloakClient>) -> TransferClient {
        let mut client =
            TransferClient::new(&conf.transfer_url, keycloak, &conf.transfer_api_version);
        client.timeout = conf.request_timeout();
        client
    }

    /// Uses the given http-client for all requests
    pub fn with_http_client(mut self, http: reqwest::blocking::Client) -> Self {
        self.http = http;
        self
    }

    /// Applies `timeout` to every request that doesn't set its own
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The resolver used to wait for requests of this service
    pub fn transfer_resolver(&self) -> TransferJobResolver<'_> {
        TransferJobResolver::new(self)
    }

    /// Imports an SDMX file into `dataspace` and returns the handle of the
    /// import request
    pub fn import_sdmx_file(
        &self,
        file: Vec<u8>,
        file_name: &str,
        dataspace: &str,
        opts: &ImportOptions,
        timeout: Option<Duration>,
    ) -> Result<JobHandle, Error> {
        info!(dataspace, file_name, "Importing SDMX file");
        let form = Form::new()
            .text("dataspace", dataspace.to_string())
            .text("targetVersion", opts.target_version.to_string())
            .text(
                "restorationOptionRequired",
                opts.restoration_option_required.to_string(),
            )
            .text("validationType", opts.validation_type.to_string())
            .part("file", Part::bytes(file).file_name(file_name.to_string()));

        let req = self
            .http
            .post(utils::service_url(&self.transfer_url, "import/sdmxFile")?)
            .headers(self.keycloak.auth_header()?)
            .multipart(form);
        let response = check_status(self.with_request_timeout(req, timeout).send()?)?;

        let body: MessageResponse = response.json()?;
        Ok(JobHandle::new(request_id(body.message)?, dataspace))
    }

    /// Checks the status of the request `id` in `dataspace` and returns its
    /// `executionStatus`
    pub fn check_request_status(&self, dataspace: &str, id: &str) -> Result<Option<String>, Error> {
        info!(dataspace, id, "Checking request status");
        let response = self.post_form("status/request", &StatusRequest { dataspace, id })?;

        let body: StatusResponse = response.json()?;
        Ok(body.execution_status)
    }

    /// Waits for the request to complete, polling its status every
    /// `config.backoff_interval` until `config.timeout` expires.
    ///
    /// Returns `true` if the request completed in time
    pub fn wait_for_request(&self, job: &JobHandle, config: &PollConfig) -> Result<bool, Error> {
        self.transfer_resolver().wait_for(job, config, &SystemClock)
    }

    /// Transfers `dataflow` from the source dataspace to the destination
    /// dataspace. The returned handle is scoped to the destination
    pub fn transfer_dataflow(
        &self,
        source_dataspace: &str,
        destination_dataspace: &str,
        dataflow: &str,
    ) -> Result<JobHandle, Error> {
        info!(
            dataflow,
            source_dataspace, destination_dataspace, "Transferring dataflow"
        );
        let form = TransferRequest {
            source_dataspace,
            destination_dataspace,
            source_dataflow: dataflow,
            destination_dataflow: dataflow,
            transfer_content: 0,
            source_version: 0,
            target_version: 0,
            restoration_option_required: false,
            validation_type: 0,
        };
        let response = self.post_form("transfer/dataflow", &form)?;

        let body: MessageResponse = response.json()?;
        Ok(JobHandle::new(request_id(body.message)?, destination_dataspace))
    }

    /// Retrieves the tune information of a DSD
    pub fn get_tune(&self, dataspace: &str, dsd_id: &str) -> Result<Value, Error> {
        info!(dataspace, dsd_id, "Getting DSD tune information");
        let form = TuneRequest {
            dataspace,
            dsd: dsd_id,
            index_type: None,
        };

        Ok(self.post_form("tune/info", &form)?.json()?)
    }

    /// Sets the index type of a DSD
    pub fn set_tune(&self, dataspace: &str, dsd_id: &str, index_type: u32) -> Result<Value, Error> {
        info!(dataspace, dsd_id, index_type, "Setting DSD tune information");
        let form = TuneRequest {
            dataspace,
            dsd: dsd_id,
            index_type: Some(index_type),
        };

        Ok(self.post_form("tune/dsd", &form)?.json()?)
    }

    fn post_form<T: Serialize + ?Sized>(
        &self,
        path: &str,
        form: &T,
    ) -> Result<reqwest::blocking::Response, Error> {
        let req = self
            .http
            .post(utils::service_url(&self.transfer_url, path)?)
            .headers(self.keycloak.auth_header()?)
            .form(form);

        check_status(self.with_request_timeout(req, None).send()?)
    }

    fn with_request_timeout(
        &self,
        req: reqwest::blocking::RequestBuilder,
        timeout: Option<Duration>,
    ) -> reqwest::blocking::RequestBuilder {
        match timeout.or(self.timeout) {
            Some(t) => req.timeout(t),
            None => req,
        }
    }
}

/// The service answers with a sentence like `"The request with ID 123 was
/// successfully registered"`, the id is its first purely numeric word
fn request_id(message: Option<String>) -> Result<String, Error> {
    let message =
        message.ok_or_else(|| Error::UnexpectedResponse("response has no message".to_string()))?;

    message
        .split_whitespace()
        .map(|word| word.trim_end_matches(|c: char| c == '.' || c == ','))
        .find(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .ok_or_else(|| {
            Error::UnexpectedResponse(format!("no request id in message: {}", message))
        })
}
