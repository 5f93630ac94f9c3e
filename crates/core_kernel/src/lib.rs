//! Core Kernel - Foundational types shared by the insurance CRM crates
//!
//! This crate provides the building blocks used across the domain and
//! infrastructure crates:
//! - Strongly-typed identifiers for server-assigned records
//! - The port error taxonomy every service adapter reports through
//! - Operation metadata carried from the caller to the adapter

pub mod identifiers;
pub mod ports;
pub mod error;

pub use identifiers::{ClientId, PolicyId, ParseIdError};
pub use ports::{PortError, DomainPort, OperationMetadata, CircuitBreakerConfig};
pub use error::CoreError;
