//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Navigation error: {0}")]
    Navigation(#[from] pjax_navigation::NavigationError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] pjax_net::FetchError),
}
