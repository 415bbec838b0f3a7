//! # Quill Core
//!
//! The domain layer of the Quill blogging API.
//! This crate contains the content lifecycle and ownership rules with zero
//! infrastructure dependencies; stores are reached through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::{DomainError, RepoError};
pub use validation::{FieldError, ValidationErrors};
