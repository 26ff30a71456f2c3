//! REST API client module for the Varah workforce service.
//!
//! This module provides the `ApiClient` through which every backend
//! call is made: authentication, employee roster management, and
//! account registration.
//!
//! The API uses bearer token authentication; the token is obtained
//! from the login endpoint and held by an injected [`crate::auth::Session`].

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
