//! Server module for finchat
//!
//! Contains the main server initialization and runtime logic.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures and provider credentials
//! - `loader`: Configuration loading from files and environment
//! - `providers`: Remote client construction and pipeline assembly
//! - `validation`: Production configuration validation
//! - `init`: Router construction and the main run loop

pub mod config;
mod init;
mod loader;
mod providers;
mod validation;

// Re-export public API
pub use init::{run, ServeOverrides};
#[cfg(test)]
pub(crate) use init::build_router;
pub use loader::load_config;
