//! HTTP client for the back-office business API.
//!
//! Implements the remote-API traits from `backoffice_core::api` on top of
//! [`reqwest`]: paginated list, create/update/delete and status toggles per
//! entity, plus the sales report endpoint. Every outgoing call carries
//! whatever credentials the configured [`CredentialProvider`] supplies.

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod report;
pub mod resource;
mod wire;

pub use config::ClientConfig;
pub use credentials::{Anonymous, BearerToken, CredentialProvider};
pub use error::ClientError;
pub use http::ApiClient;
pub use report::HttpReportApi;
pub use resource::HttpResourceApi;
