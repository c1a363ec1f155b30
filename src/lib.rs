#![warn(missing_docs)]
//! A simple blocking library to interact with the .Stat Suite services,
//! authenticating through Keycloak and waiting for their asynchronous jobs

/// The authz module is used to manage the rules of the authorization service
pub mod authz;
/// The clock module abstracts over time, so waiting can be tested without sleeping
pub mod clock;
/// The config_service module reads the tenant configuration from the config service
pub mod config_service;
/// The job module describes triggered jobs and how their status is resolved
pub mod job;
/// The keycloak module holds the token cache used to authenticate every request
pub mod keycloak;
/// The nsi module is used to upload, fetch and delete artefacts on the NSI web service
pub mod nsi;
/// The poller module waits for asynchronous jobs to reach a terminal state
pub mod poller;
/// The sfs module is used for all interactions with the search service
pub mod sfs;
/// The solr module is used to administrate solr collections
pub mod solr;
/// The transfer module is used for all interactions with the transfer service
pub mod transfer;

mod config;
mod errors;
mod internals;

pub use config::Config;
pub use errors::{Error, Result};
pub use job::{JobHandle, JobStatusResolver};
pub use keycloak::KeycloakClient;
pub use poller::{wait_until_terminal, PollConfig, PollOutcome};
