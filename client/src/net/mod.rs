//! Networking modules for the remote REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` is the single egress point with the auth envelope, `transport` the
//! wire seam beneath it, `types` the shared wire schema. The remaining
//! modules are thin endpoint wrappers.

pub mod api;
pub mod auth;
pub mod meetings;
pub mod search;
pub mod transport;
pub mod types;
