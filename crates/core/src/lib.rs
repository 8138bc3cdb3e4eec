//! Core business logic for the survey services.
//!
//! Services own the business rules and the two transactional procedures:
//! participant submission and draft publishing. External collaborators
//! (mail, role assignment) sit behind traits so tests can replace them.

pub mod services;

pub use services::*;
