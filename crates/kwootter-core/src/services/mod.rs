//! Services - the server side of the API operations.

mod posts;

pub use posts::{DEFAULT_FEED_LIMIT, PostService};
