//! # Kwootter Shared
//!
//! Wire types of the RPC transport, used by the server endpoints and the HTTP client alike.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
