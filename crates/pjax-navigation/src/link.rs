//! Link (`<a>`) attributes relevant to interception

use url::Url;

pub const ATTR_NO_SCROLL: &str = "data-noscroll";
pub const ATTR_FORCE_RELOAD: &str = "data-force-reload";
pub const ATTR_SCROLL_TO_ID: &str = "data-scroll-to-id";
pub const ATTR_NO_PJAX: &str = "data-no-pjax";

/// A link as seen by the click handler: resolved URL plus the attributes
/// that decide eligibility and shape the navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// `href` resolved against the document base URL
    pub url: Url,
    /// Browsing context name from the `target` attribute
    pub target: Option<String>,
    pub download: bool,
    pub no_pjax: bool,
    pub no_scroll: bool,
    pub force_reload: bool,
    /// Present-but-empty means "use the configured default id"
    pub scroll_to_id: Option<String>,
}

impl Anchor {
    /// Read a link's attributes. Returns `None` when the link has no href
    /// or the href does not resolve to a URL.
    pub fn from_attributes<'a, I>(attrs: I, base: &Url) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut href = None;
        let mut anchor = Self {
            url: base.clone(),
            target: None,
            download: false,
            no_pjax: false,
            no_scroll: false,
            force_reload: false,
            scroll_to_id: None,
        };

        for (name, value) in attrs {
            match name {
                "href" => href = Some(value),
                "target" => anchor.target = Some(value.to_string()),
                "download" => anchor.download = true,
                ATTR_NO_PJAX => anchor.no_pjax = true,
                ATTR_NO_SCROLL => anchor.no_scroll = true,
                ATTR_FORCE_RELOAD => anchor.force_reload = true,
                ATTR_SCROLL_TO_ID => anchor.scroll_to_id = Some(value.trim().to_string()),
                _ => {}
            }
        }

        anchor.url = base.join(href?).ok()?;
        Some(anchor)
    }

    /// True if the link asks for a new tab or the top-level frame.
    pub fn opens_elsewhere(&self) -> bool {
        self.target
            .as_deref()
            .map(|t| t.eq_ignore_ascii_case("_blank") || t.eq_ignore_ascii_case("_top"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/index.html").unwrap()
    }

    #[test]
    fn test_relative_href_resolved() {
        let anchor = Anchor::from_attributes([("href", "guide.html#setup")], &base()).unwrap();
        assert_eq!(anchor.url.as_str(), "https://example.com/docs/guide.html#setup");
        assert!(!anchor.no_pjax);
        assert!(anchor.scroll_to_id.is_none());
    }

    #[test]
    fn test_missing_href() {
        assert!(Anchor::from_attributes([("id", "x")], &base()).is_none());
    }

    #[test]
    fn test_control_attributes() {
        let anchor = Anchor::from_attributes(
            [
                ("href", "/a"),
                (ATTR_NO_SCROLL, ""),
                (ATTR_FORCE_RELOAD, "false"),
                (ATTR_SCROLL_TO_ID, " main "),
                (ATTR_NO_PJAX, ""),
                ("download", ""),
            ],
            &base(),
        )
        .unwrap();

        assert!(anchor.no_scroll);
        // Boolean attributes: presence is what counts.
        assert!(anchor.force_reload);
        assert_eq!(anchor.scroll_to_id.as_deref(), Some("main"));
        assert!(anchor.no_pjax);
        assert!(anchor.download);
    }

    #[test]
    fn test_opens_elsewhere() {
        let blank = Anchor::from_attributes([("href", "/"), ("target", "_BLANK")], &base()).unwrap();
        assert!(blank.opens_elsewhere());

        let top = Anchor::from_attributes([("href", "/"), ("target", "_top")], &base()).unwrap();
        assert!(top.opens_elsewhere());

        let own = Anchor::from_attributes([("href", "/"), ("target", "_self")], &base()).unwrap();
        assert!(!own.opens_elsewhere());
    }
}
