//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! insurance CRM test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for clients and policy drafts
//! - `builders`: Builder patterns for test data construction
//! - `generators`: Property-based test data generators
//! - `server`: In-process stub of the CRM REST service

pub mod fixtures;
pub mod builders;
pub mod generators;
pub mod server;

pub use fixtures::*;
pub use builders::*;
pub use generators::*;
pub use server::{RecordedRequest, StubCrmServer, STUB_PREMIUM_RATE};
