//! Core module - server configuration, state, and errors
//!
//! # Module structure
//!
//! - [`Config`] - environment-driven server configuration
//! - [`ServerState`] - shared handles for handlers and background tasks
//! - [`Server`] - HTTP server lifecycle
//! - [`ServerError`] - startup/runtime errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
