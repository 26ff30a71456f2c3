//! Data models for Varah entities.
//!
//! Currently this is the employee roster; the service exposes activity
//! logs and kiosks as well, but has no read endpoints for them yet.

pub mod employee;

pub use employee::Employee;
