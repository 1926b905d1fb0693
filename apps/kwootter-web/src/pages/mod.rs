//! Pages - data loading plus rendering for each route.

pub mod home;
pub mod post;
pub mod profile;
mod static_props;

pub use static_props::StaticPropsStore;

use thiserror::Error;

use kwootter_core::ApiError;

/// Failure while building a page's static props.
#[derive(Debug, Error)]
pub enum PageBuildError {
    #[error("no slug")]
    MissingSlug,

    #[error("slug must be a single path segment")]
    InvalidSlug,

    #[error("prefetch failed: {0}")]
    Prefetch(#[from] ApiError),

    #[error("cached props unreadable: {0}")]
    Corrupt(String),
}
