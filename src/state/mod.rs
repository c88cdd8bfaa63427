//! Client-side state modules.
//!
//! DESIGN
//! ======
//! `auth` holds the only shared mutable state in the crate: the viewer's
//! session as last reported by the gateway.

pub mod auth;
