//! HTTP API handlers.

pub mod orders;
