//! Insurance CRM command-line front end
//!
//! Presents the CRM's client list, client detail, add-client, and add-policy
//! screens as subcommands. Commands talk to the service only through the
//! `ClientPort` and `PolicyPort` traits, so tests can run them against any
//! adapter.
//!
//! # Modules
//!
//! - `commands`: clap definitions and command execution
//! - `views`: text rendering and value formatting
//! - `config`: `CRM_*` environment configuration
//! - `error`: command error type

pub mod commands;
pub mod config;
pub mod error;
pub mod views;

pub use commands::{run, Cli, Services};
pub use config::AppConfig;
pub use error::CliError;
