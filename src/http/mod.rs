//! HTTP transport layer
//!
//! Routes for the Model Context Protocol endpoints and the informational
//! endpoints. The REST adapter lives in [`crate::api`].

pub mod handlers;
