// Library modules for integration tests and the binary
pub mod auth;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod rate_limit;
pub mod server;
pub mod utils;
