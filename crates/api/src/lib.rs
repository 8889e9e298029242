//! HTTP API of the translation status server.

pub mod app;
pub mod middleware;
