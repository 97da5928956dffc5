//! Engine settings

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::Result;

/// Process-wide configuration surface. Adjust before the first navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Leave every click to the browser
    pub disabled: bool,
    /// How long a request may run before the load indicator starts; 0 disables it
    pub load_indicator_delay_ms: u64,
    /// Selector for a fixed header to compensate for when scrolling to an element
    pub scroll_offset_selector: Option<String>,
    /// Id used when a link carries an empty `data-scroll-to-id`
    pub default_main_id: Option<String>,
    /// Transport timeout for the HTTP fetcher
    pub request_timeout_secs: u64,
    pub mitigations: Mitigations,
}

/// Browser workarounds, each of which can be switched off once the
/// underlying platform bug is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Mitigations {
    /// Put the scroll position back on the next frame after popstate, so the
    /// browser's own restoration does not jump the old page around.
    pub restore_scroll_on_popstate: bool,
    /// Also scroll before the swap, not only after it; fixed elements
    /// otherwise jump on some engines.
    pub scroll_before_swap: bool,
    /// Never re-run inline scripts calling `document.write`/`document.open`.
    pub drop_destructive_scripts: bool,
}

impl Default for Mitigations {
    fn default() -> Self {
        Self {
            restore_scroll_on_popstate: true,
            scroll_before_swap: true,
            drop_destructive_scripts: true,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            disabled: false,
            load_indicator_delay_ms: 250,
            scroll_offset_selector: None,
            default_main_id: None,
            request_timeout_secs: 30,
            mitigations: Mitigations::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn load_indicator_delay(&self) -> Duration {
        Duration::from_millis(self.load_indicator_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The offset selector, ignoring a blank value
    pub fn scroll_offset_selector(&self) -> Option<&str> {
        non_blank(self.scroll_offset_selector.as_deref())
    }

    pub fn default_main_id(&self) -> Option<&str> {
        non_blank(self.default_main_id.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
