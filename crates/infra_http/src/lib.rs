//! HTTP Infrastructure Layer
//!
//! This crate connects the domain ports to the CRM REST service:
//!
//! - [`CrmApiClient`]: reqwest adapter implementing `ClientPort` and `PolicyPort`
//! - [`ApiClientConfig`]: `CRM_*` environment configuration
//! - [`CircuitBreaker`]: fails fast while the service keeps failing
//!
//! Status codes and transport failures are translated into
//! `core_kernel::PortError`; see [`error`] for the mapping.

pub mod circuit_breaker;
pub mod client;
pub mod config;
pub mod error;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use client::{CrmApiClient, CORRELATION_HEADER};
pub use config::{ApiClientConfig, DEFAULT_BASE_URL, ENV_PREFIX};
