//! pjax Document Model
//!
//! The live page is a single mutable [`Document`]. Everything except the
//! title and the body is assumed identical between pages, so the only writer
//! is [`swap_document`], which:
//! - copies the incoming title
//! - replaces the live `<body>` wholesale
//! - re-inserts inline scripts as fresh copies so they run exactly once
//!
//! External scripts and scripts that would wipe the document are never re-run.

mod document;
mod error;
mod script;
mod swap;

pub use document::{Document, NodeHandle};
pub use error::DomError;
pub use script::{destroys_document, InlineScript};
pub use swap::{swap_document, SwapOptions, SwapReport};

pub use scraper::{ElementRef, Node};
pub use ego_tree::NodeRef;

pub type Result<T> = std::result::Result<T, DomError>;
