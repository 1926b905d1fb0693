//! API clients consumed by the pages.

mod query;

#[cfg(feature = "http-client")]
mod http;

pub use query::{QueryClient, query_key};

#[cfg(feature = "http-client")]
pub use http::{HttpApiClient, HttpClientConfig};
