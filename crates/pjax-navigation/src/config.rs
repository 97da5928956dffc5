//! Navigation descriptors

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::NavigationError;
use crate::link::Anchor;
use crate::Result;

/// Explicit navigation settings for programmatic triggers.
///
/// Every field is optional; set fields win over whatever the source says.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Overrides {
    pub href: Option<String>,
    pub is_push: Option<bool>,
    pub force_reload: Option<bool>,
    pub no_scroll: Option<bool>,
    pub scroll_to_id: Option<String>,
}

/// Where a navigation comes from
#[derive(Debug, Clone)]
pub enum NavigationSource {
    /// A clicked link: URL parts and `data-*` control attributes
    Anchor(Anchor),
    /// The current location: URL parts only
    Location(Url),
    /// A programmatic trigger; `href` is required
    Explicit(Overrides),
}

#[derive(Debug, Clone, Default)]
struct Flags {
    is_push: bool,
    force_reload: bool,
    no_scroll: bool,
    scroll_to_id: Option<String>,
}

impl Flags {
    fn apply(&mut self, overrides: &Overrides) {
        if let Some(is_push) = overrides.is_push {
            self.is_push = is_push;
        }
        if let Some(force_reload) = overrides.force_reload {
            self.force_reload = force_reload;
        }
        if let Some(no_scroll) = overrides.no_scroll {
            self.no_scroll = no_scroll;
        }
        if let Some(id) = &overrides.scroll_to_id {
            self.scroll_to_id = Some(id.clone());
        }
    }
}

/// Canonical descriptor for one navigation attempt.
///
/// URL parts follow the browser's `Location` conventions: `protocol` ends in
/// `:`, `host` carries non-default ports, and `search`/`hash` are either
/// empty or start with `?`/`#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationConfig {
    url: Url,
    protocol: String,
    host: String,
    hash: String,
    search: String,
    path: String,
    is_push: bool,
    force_reload: bool,
    no_scroll: bool,
    scroll_to_id: Option<String>,
}

impl NavigationConfig {
    /// Build a descriptor. Precedence is overrides, then the source, then
    /// defaults (not a push, no scroll flags). Relative hrefs resolve
    /// against `base`.
    pub fn build(source: NavigationSource, overrides: Option<Overrides>, base: &Url) -> Result<Self> {
        let (url, mut flags) = match source {
            NavigationSource::Anchor(anchor) => (
                anchor.url,
                Flags {
                    is_push: false,
                    force_reload: anchor.force_reload,
                    no_scroll: anchor.no_scroll,
                    scroll_to_id: anchor.scroll_to_id,
                },
            ),
            NavigationSource::Location(url) => (url, Flags::default()),
            NavigationSource::Explicit(map) => {
                let href = map.href.as_deref().ok_or(NavigationError::MissingHref)?;
                let mut flags = Flags::default();
                flags.apply(&map);
                (resolve(href, base)?, flags)
            }
        };

        let url = match overrides.as_ref().and_then(|o| o.href.as_deref()) {
            Some(href) => resolve(href, base)?,
            None => url,
        };
        if let Some(overrides) = &overrides {
            flags.apply(overrides);
        }

        Ok(Self::from_parts(url, flags))
    }

    fn from_parts(url: Url, flags: Flags) -> Self {
        let protocol = format!("{}:", url.scheme());
        let host = host_of(&url);
        let path = format!("{}//{}{}", protocol, host, url.path());

        Self {
            protocol,
            host,
            hash: hash_of(&url),
            search: search_of(&url),
            path,
            url,
            is_push: flags.is_push,
            force_reload: flags.force_reload,
            no_scroll: flags.no_scroll,
            scroll_to_id: flags.scroll_to_id,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn href(&self) -> &str {
        self.url.as_str()
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn pathname(&self) -> &str {
        self.url.path()
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Origin plus pathname, without search or hash
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_push(&self) -> bool {
        self.is_push
    }

    pub fn force_reload(&self) -> bool {
        self.force_reload
    }

    pub fn no_scroll(&self) -> bool {
        self.no_scroll
    }

    pub fn scroll_to_id(&self) -> Option<&str> {
        self.scroll_to_id.as_deref()
    }

    /// The element id named by the hash, percent-decoded
    pub fn hash_id(&self) -> Option<String> {
        self.hash.strip_prefix('#').and_then(decode_fragment)
    }

    /// Same origin, pathname and search as `location`; the hash may differ.
    pub fn targets_same_page(&self, location: &Url) -> bool {
        self.url.origin() == location.origin()
            && self.url.path() == location.path()
            && self.search == search_of(location)
    }
}

fn resolve(href: &str, base: &Url) -> Result<Url> {
    base.join(href)
        .map_err(|e| NavigationError::InvalidUrl(format!("{href}: {e}")))
}

fn host_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    }
}

pub(crate) fn search_of(url: &Url) -> String {
    match url.query() {
        Some(query) if !query.is_empty() => format!("?{query}"),
        _ => String::new(),
    }
}

/// The element id named by `url`'s fragment, percent-decoded
pub fn fragment_id(url: &Url) -> Option<String> {
    url.fragment().and_then(decode_fragment)
}

fn decode_fragment(fragment: &str) -> Option<String> {
    if fragment.is_empty() {
        return None;
    }
    Some(percent_decode_str(fragment).decode_utf8_lossy().into_owned())
}

pub(crate) fn hash_of(url: &Url) -> String {
    match url.fragment() {
        Some(fragment) if !fragment.is_empty() => format!("#{fragment}"),
        _ => String::new(),
    }
}
