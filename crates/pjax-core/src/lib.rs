//! pjax Core
//!
//! Turns full page loads into in-place transitions: a link click or history
//! traversal fetches the target page, swaps its title and body into the live
//! document, keeps session history in step and restores scroll.
//!
//! The [`Engine`] is a synchronous state machine over a [`Window`]; it never
//! performs I/O itself. [`Navigator`] drives it from async code with any
//! [`pjax_net::Fetch`] transport.

mod engine;
mod error;
mod indicator;
mod interception;
mod memory;
mod navigator;
mod scroll;
mod settings;
mod window;

#[cfg(test)]
mod testing;

pub use engine::{Completion, Engine, FetchRequest, RequestId, Transition};
pub use error::CoreError;
pub use indicator::{DimPage, LoadIndicator};
pub use interception::{ClickDisposition, ClickEvent, IgnoreReason, Modifiers, MouseButton};
pub use memory::MemoryWindow;
pub use navigator::{fetch_page, Navigator};
pub use scroll::{ScrollController, ScrollOutcome};
pub use settings::{Mitigations, Settings};
pub use window::{
    ElementBox, FrameHandle, FrameTask, Position, ScrollOffset, TransitionEvent, Window,
};

// Re-export the building blocks hosts need alongside the engine
pub use pjax_dom::{Document, NodeHandle};
pub use pjax_navigation::{HistoryEntry, NavigationConfig, NavigationSource, Overrides};
pub use pjax_net::{FailureKind, Fetch, FetchError, FetchedPage, HttpFetcher, Page};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
