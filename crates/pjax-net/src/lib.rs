//! pjax Page Fetching
//!
//! Transitions issue plain `GET` requests and expect HTML back. Anything
//! else is a failure the engine answers with a native reload:
//! - status outside 2xx, transport error, abort, timeout → network failure
//! - non-HTML content type, undecodable body → unparsable response

mod error;
mod fetch;
mod page;

pub use error::{FailureKind, FetchError};
pub use fetch::{Fetch, HttpFetcher};
pub use page::{FetchedPage, Page};

pub type Result<T> = std::result::Result<T, FetchError>;
