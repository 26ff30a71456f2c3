//! Authentication module for session and credential management.
//!
//! This module provides:
//! - `Session`: the in-memory bearer token store shared with the API client
//! - `CredentialStore`: secure OS-level credential storage via keyring
//!
//! Sessions live only for the lifetime of the process; there is no
//! on-disk session state.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::Session;
