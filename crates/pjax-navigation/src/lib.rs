//! pjax Navigation Descriptors
//!
//! Every navigation attempt is normalized into a [`NavigationConfig`] built
//! from one of three sources:
//! 1. A clicked link → [`Anchor`] with its `data-*` control attributes
//! 2. The current location → popstate and reload
//! 3. An explicit [`Overrides`] map → programmatic triggers
//!
//! Navigation-control attributes recognized on links:
//! - `data-noscroll`: keep the scroll position
//! - `data-force-reload`: fetch even if the target is the current page
//! - `data-scroll-to-id`: element id to scroll to after the swap
//! - `data-no-pjax`: leave the link to the browser

mod config;
mod error;
mod history;
mod link;

pub use config::{fragment_id, NavigationConfig, NavigationSource, Overrides};
pub use error::NavigationError;
pub use history::{HistoryEntry, PathMemory};
pub use link::{Anchor, ATTR_FORCE_RELOAD, ATTR_NO_PJAX, ATTR_NO_SCROLL, ATTR_SCROLL_TO_ID};

pub type Result<T> = std::result::Result<T, NavigationError>;
