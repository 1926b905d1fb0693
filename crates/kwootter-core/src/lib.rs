//! # Kwootter Core
//!
//! The domain layer of Kwootter.
//! Posts, authors and the operations the feed pages consume, with no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApiError, FieldErrors, RepoError};
