//! Networking modules for the auth gateway.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` issues credentialed HTTP calls to the gateway and `types` defines
//! the response schemas plus their narrowing into domain values.

pub mod api;
pub mod types;
