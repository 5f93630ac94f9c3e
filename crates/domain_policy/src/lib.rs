//! Policy Domain
//!
//! This crate implements the new-policy workflow of the insurance CRM:
//! choosing a life-insurance product, filling in the fields that product
//! needs, previewing the premium, and creating the policy through the
//! policy service.
//!
//! # Architecture
//!
//! - **Policy types**: [`PolicyType`] and the field applicability table
//! - **Draft**: [`PolicyDraft`], the raw user input, coerced leniently
//! - **Terms**: [`PolicyTerms`], a tagged union carrying exactly the fields of
//!   one policy type; every payload goes through it
//! - **Validation**: [`PolicyValidator`], collecting every rule violation
//! - **Controller**: [`PolicyFormController`], owning the draft, ordering
//!   premium estimates, and guarding submission
//! - **Port**: [`PolicyPort`], implemented by the HTTP adapter and the mock
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::PolicyFormController;
//!
//! let mut form = PolicyFormController::new(port);
//! form.bind_client("42")?;
//! form.set_field("policyType", "TERM_LIFE")?;
//! if let Some(request) = form.set_field("coverageAmount", "100000")? {
//!     let response = request.send().await;
//!     form.apply_estimate(response);
//! }
//! let policy = form.submit().await?;
//! ```

pub mod draft;
pub mod error;
pub mod form;
pub mod policy;
pub mod policy_type;
pub mod ports;
pub mod terms;
pub mod validation;

pub use draft::{PolicyDraft, PolicyField, DEFAULT_TERM_YEARS};
pub use error::{PolicyFormError, CREATE_FAILED_MESSAGE, ESTIMATE_FAILED_MESSAGE};
pub use form::{
    EstimateOutcome, EstimateRequest, EstimateResponse, PolicyFormController, SubmitRequest,
    SubmitResponse,
};
pub use policy::Policy;
pub use policy_type::{FieldApplicability, PolicyType, Requirement};
pub use ports::PolicyPort;
pub use terms::{PolicyRequest, PolicyTerms};
pub use validation::{PolicyValidationError, PolicyValidator, ValidationReport};
