//! History bookkeeping

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::search_of;

/// One session history entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: Url,
    pub title: String,
}

impl HistoryEntry {
    pub fn new(url: Url, title: impl Into<String>) -> Self {
        Self {
            url,
            title: title.into(),
        }
    }
}

/// The last committed pathname + search.
///
/// The hash is not part of it: popstate events caused by hash changes
/// compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMemory {
    pathname: String,
    search: String,
}

impl PathMemory {
    pub fn new(location: &Url) -> Self {
        let mut memory = Self::default();
        memory.remember(location);
        memory
    }

    pub fn remember(&mut self, location: &Url) {
        self.pathname = location.path().to_string();
        self.search = search_of(location);
    }

    pub fn is_unchanged(&self, location: &Url) -> bool {
        location.path() == self.pathname && search_of(location) == self.search
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn search(&self) -> &str {
        &self.search
    }
}
