//! Client Domain
//!
//! This crate covers the client side of the insurance CRM: the client
//! records returned by the service, the add-client form with its validation,
//! and the [`ClientPort`] through which both are loaded and created.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_client::ClientForm;
//!
//! let mut form = ClientForm::new();
//! form.set_field("firstName", "Ada")?;
//! form.set_field("lastName", "Lovelace")?;
//! form.set_field("email", "ada@example.com")?;
//! form.set_field("dateOfBirth", "1985-12-10")?;
//! let client = form.submit(port.as_ref()).await?;
//! ```

pub mod client;
pub mod error;
pub mod form;
pub mod ports;
pub mod validation;

pub use client::{Client, ClientField, NewClient};
pub use error::{ClientFormError, CREATE_CLIENT_FAILED_MESSAGE, INVALID_RESPONSE_MESSAGE};
pub use form::ClientForm;
pub use ports::ClientPort;
pub use validation::{
    ClientValidationError, ClientValidationReport, ClientValidator, REQUIRED_FIELDS_MESSAGE,
};
