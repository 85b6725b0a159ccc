//! HTTP adapters for the hosted backend used by the FisioNet client.
//!
//! This crate knows nothing about clinic entities: it moves JSON rows in and
//! out of named tables and manages auth sessions. The [`TableBackend`] and
//! [`AuthBackend`] traits are the seams the core crate programs against.

pub mod auth;
pub mod backend;
pub mod error;
pub mod query;
pub mod rest;

pub use auth::{AuthClient, AuthUser, Session, UserUpdate};
pub use backend::{AuthBackend, TableBackend};
pub use error::{RemoteError, RemoteResult};
pub use query::{Direction, Filter, Order, Query};
pub use rest::RestClient;

use std::time::Duration;

use reqwest::blocking::Client;

/// HTTP client shared by the data and auth adapters. `reqwest` clients are
/// connection pools; clone this one rather than building another.
pub fn build_client(timeout_secs: u64) -> RemoteResult<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

