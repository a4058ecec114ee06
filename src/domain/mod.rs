//! Mock listing data and the tools exposing it
//!
//! Shared by the REST adapter and the Model Context Protocol adapter.

pub mod listings;
pub mod params;
pub mod tools;
