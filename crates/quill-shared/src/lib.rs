//! # Quill Shared
//!
//! Wire types for the Quill HTTP API: request bodies, small response bodies
//! and the problem-details error envelope.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, FieldProblem};
