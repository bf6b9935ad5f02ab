//! HTTP API for the evaluation service

pub mod server;

pub use server::{ApiServer, ApiServerConfig};
