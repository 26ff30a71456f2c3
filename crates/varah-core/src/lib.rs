//! Core library for the Varah terminal client.
//!
//! Everything that talks to the Varah workforce service lives here:
//!
//! - `api`: the `ApiClient` chokepoint for all backend requests
//! - `auth`: in-memory `Session` token store and OS keychain access
//! - `models`: employee record types
//! - `config`: on-disk application settings

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{CredentialStore, Session};
pub use config::Config;
pub use models::Employee;
