//! Click and popstate interception
//!
//! A click is taken over only when the browser would otherwise perform a
//! plain same-origin navigation in the current tab. Everything else (modified
//! clicks, other windows, downloads, opted-out links) is left alone.

use pjax_dom::NodeHandle;
use pjax_navigation::{Anchor, NavigationConfig, NavigationSource, Overrides};

use crate::engine::{Engine, Transition};
use crate::window::{FrameTask, Window};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(u16),
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` value
    pub fn from_button(button: u16) -> Self {
        match button {
            0 => MouseButton::Primary,
            1 => MouseButton::Auxiliary,
            2 => MouseButton::Secondary,
            other => MouseButton::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.alt || self.ctrl || self.meta || self.shift
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickEvent {
    /// The node that received the click; may be nested inside the link
    pub target: NodeHandle,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl ClickEvent {
    /// A plain left click
    pub fn primary(target: NodeHandle) -> Self {
        Self {
            target,
            button: MouseButton::Primary,
            modifiers: Modifiers::default(),
        }
    }
}

/// Why a click was left to the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Disabled,
    NotALink,
    ModifiedClick,
    InvalidHref,
    CrossOrigin,
    OpensElsewhere,
    OptedOut,
    Download,
    /// Hash link to the current page; native anchor scrolling is exact
    /// when there is no header offset to compensate for.
    SamePageHash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickDisposition {
    Ignored(IgnoreReason),
    Intercepted(Transition),
}

impl ClickDisposition {
    /// Whether the host must cancel the browser's default action
    pub fn prevents_default(&self) -> bool {
        matches!(self, ClickDisposition::Intercepted(_))
    }
}

impl Engine {
    /// Decide what to do with a click anywhere in the document.
    pub fn handle_click<W: Window>(&mut self, window: &mut W, event: ClickEvent) -> ClickDisposition {
        let anchor = match self.eligible_anchor(window, &event) {
            Ok(anchor) => anchor,
            Err(reason) => {
                tracing::trace!(?reason, "Click left to the browser");
                return ClickDisposition::Ignored(reason);
            }
        };

        let base = window.document().base_url(window.location());
        let config = match NavigationConfig::build(
            NavigationSource::Anchor(anchor),
            Some(Overrides {
                is_push: Some(true),
                ..Overrides::default()
            }),
            &base,
        ) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Could not describe link navigation");
                return ClickDisposition::Ignored(IgnoreReason::InvalidHref);
            }
        };

        ClickDisposition::Intercepted(self.navigate(window, config))
    }

    fn eligible_anchor<W: Window>(
        &self,
        window: &W,
        event: &ClickEvent,
    ) -> Result<Anchor, IgnoreReason> {
        if self.settings.disabled {
            return Err(IgnoreReason::Disabled);
        }

        let document = window.document();
        let link = document
            .enclosing_link(event.target)
            .ok_or(IgnoreReason::NotALink)?;

        if event.button != MouseButton::Primary || event.modifiers.any() {
            return Err(IgnoreReason::ModifiedClick);
        }

        let location = window.location();
        let base = document.base_url(location);
        let anchor =
            Anchor::from_attributes(link.value().attrs(), &base).ok_or(IgnoreReason::InvalidHref)?;

        if anchor.url.origin() != location.origin() {
            return Err(IgnoreReason::CrossOrigin);
        }
        if anchor.opens_elsewhere() {
            return Err(IgnoreReason::OpensElsewhere);
        }
        if anchor.no_pjax {
            return Err(IgnoreReason::OptedOut);
        }
        if anchor.download {
            return Err(IgnoreReason::Download);
        }

        let same_page_hash = anchor.url.fragment().is_some_and(|f| !f.is_empty())
            && anchor.url.path() == location.path()
            && anchor.url.query() == location.query();
        if same_page_hash && self.settings.scroll_offset_selector().is_none() {
            return Err(IgnoreReason::SamePageHash);
        }

        Ok(anchor)
    }

    /// React to a history traversal. The window's location is already the
    /// traversed-to entry.
    ///
    /// Returns `None` when only the hash changed; the browser scrolls to the
    /// anchor itself.
    pub fn handle_popstate<W: Window>(&mut self, window: &mut W) -> Option<Transition> {
        let location = window.location().clone();

        if self.paths.is_unchanged(&location) {
            tracing::debug!(url = %location, "Hash-only popstate");
            return None;
        }
        self.paths.remember(&location);

        if self.settings.mitigations.restore_scroll_on_popstate {
            // Hold the old page still until the new one is swapped in.
            let offset = window.scroll_offset();
            if let Some(previous) = self.pending_scroll_restore.take() {
                window.cancel_frame(previous);
            }
            self.pending_scroll_restore = Some(window.request_frame(FrameTask::RestoreScroll(offset)));
        }

        let config = match NavigationConfig::build(
            NavigationSource::Location(location.clone()),
            None,
            &location,
        ) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Could not describe popstate navigation");
                return None;
            }
        };

        Some(self.navigate(window, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Completion, FetchRequest};
    use crate::memory::MemoryWindow;
    use crate::testing::{fetched, fixture, url};
    use crate::window::{ElementBox, ScrollOffset};

    fn node(w: &MemoryWindow, id: &str) -> NodeHandle {
        let document = w.document();
        document.handle(*document.element_by_id(id).unwrap())
    }

    fn click(engine: &mut Engine, w: &mut MemoryWindow, id: &str) -> ClickDisposition {
        let target = node(w, id);
        engine.handle_click(w, ClickEvent::primary(target))
    }

    fn fetch_of(disposition: ClickDisposition) -> FetchRequest {
        match disposition {
            ClickDisposition::Intercepted(Transition::Fetch(request)) => request,
            other => panic!("Expected an intercepted fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_plain_link_is_intercepted() {
        let (mut engine, mut w) = fixture();
        let disposition = click(&mut engine, &mut w, "to-about");

        assert!(disposition.prevents_default());
        assert_eq!(fetch_of(disposition).url, url("/about"));
    }

    #[test]
    fn test_click_inside_link_resolves_relative_href() {
        let (mut engine, mut w) = fixture();
        assert_eq!(
            fetch_of(click(&mut engine, &mut w, "team-label")).url,
            url("/team")
        );
    }

    #[test]
    fn test_base_href_is_honored() {
        let mut w = MemoryWindow::open(
            url("/blog/"),
            r#"<head><base href="/docs/"></head><body><a id="l" href="intro">Intro</a></body>"#,
        );
        let mut engine = Engine::new(Default::default(), w.location());
        assert_eq!(fetch_of(click(&mut engine, &mut w, "l")).url, url("/docs/intro"));
    }

    #[test]
    fn test_ineligible_clicks() {
        let (mut engine, mut w) = fixture();

        for (id, reason) in [
            ("intro", IgnoreReason::NotALink),
            ("no-href", IgnoreReason::InvalidHref),
            ("external", IgnoreReason::CrossOrigin),
            ("new-tab", IgnoreReason::OpensElsewhere),
            ("opt-out", IgnoreReason::OptedOut),
            ("report", IgnoreReason::Download),
            ("to-news", IgnoreReason::SamePageHash),
        ] {
            let disposition = click(&mut engine, &mut w, id);
            assert_eq!(disposition, ClickDisposition::Ignored(reason), "link #{id}");
            assert!(!disposition.prevents_default());
        }
        assert!(engine.is_idle());
        assert_eq!(w.history().len(), 1);
    }

    #[test]
    fn test_click_on_node_from_replaced_page_is_ignored() {
        let (mut engine, mut w) = fixture();
        let stale = node(&w, "to-about");

        let request = fetch_of(click(&mut engine, &mut w, "to-team"));
        engine.complete(
            &mut w,
            request.id,
            Ok(fetched("/team", r#"<title>Team</title><body><a id="to-about" href="/about">About</a></body>"#)),
        );
        assert_eq!(w.location(), &url("/team"));

        assert_eq!(
            engine.handle_click(&mut w, ClickEvent::primary(stale)),
            ClickDisposition::Ignored(IgnoreReason::NotALink)
        );
        assert!(engine.is_idle());
        assert!(click(&mut engine, &mut w, "to-about").prevents_default());
    }

    #[test]
    fn test_modified_and_non_primary_clicks() {
        let (mut engine, mut w) = fixture();
        let target = node(&w, "to-about");

        let mut event = ClickEvent::primary(target);
        event.modifiers.meta = true;
        assert_eq!(
            engine.handle_click(&mut w, event),
            ClickDisposition::Ignored(IgnoreReason::ModifiedClick)
        );

        let mut event = ClickEvent::primary(target);
        event.button = MouseButton::from_button(1);
        assert_eq!(event.button, MouseButton::Auxiliary);
        assert_eq!(
            engine.handle_click(&mut w, event),
            ClickDisposition::Ignored(IgnoreReason::ModifiedClick)
        );
    }

    #[test]
    fn test_disabled_engine_ignores_everything() {
        let (mut engine, mut w) = fixture();
        engine.settings_mut().disabled = true;
        assert_eq!(
            click(&mut engine, &mut w, "to-about"),
            ClickDisposition::Ignored(IgnoreReason::Disabled)
        );
    }

    #[test]
    fn test_same_page_hash_with_offset_selector_is_intercepted() {
        let (mut engine, mut w) = fixture();
        engine.settings_mut().scroll_offset_selector = Some("nav".to_string());
        w.set_layout("news", ElementBox::flow(500.0, 40.0));

        assert_eq!(
            click(&mut engine, &mut w, "to-news"),
            ClickDisposition::Intercepted(Transition::SamePage)
        );
        assert_eq!(w.location(), &url("/#news"));
        assert_eq!(w.scroll_offset().y, 500.0);
    }

    #[test]
    fn test_link_to_current_page_does_not_fetch() {
        let (mut engine, mut w) = fixture();
        assert_eq!(
            click(&mut engine, &mut w, "to-self"),
            ClickDisposition::Intercepted(Transition::SamePage)
        );
        assert!(engine.is_idle());
    }

    #[test]
    fn test_force_reload_link_fetches_current_page() {
        let (mut engine, mut w) = fixture();
        w.scroll_to(ScrollOffset::new(0.0, 320.0));

        let request = fetch_of(click(&mut engine, &mut w, "forced"));
        assert_eq!(request.url, url("/"));

        engine.complete(&mut w, request.id, Ok(fetched("/", "<title>Home</title>")));
        assert_eq!(w.scroll_offset().y, 320.0);
    }

    #[test]
    fn test_rapid_clicks_issue_one_fetch() {
        let (mut engine, mut w) = fixture();

        let first = fetch_of(click(&mut engine, &mut w, "to-about"));
        let second = click(&mut engine, &mut w, "to-team");
        assert_eq!(second, ClickDisposition::Intercepted(Transition::Dropped));
        assert!(second.prevents_default());

        engine.complete(&mut w, first.id, Ok(fetched("/about", "<title>About</title>")));
        assert_eq!(w.location(), &url("/about"));
        assert_eq!(w.history().len(), 2);
    }

    #[test]
    fn test_popstate_fetches_and_restores_scroll() {
        let (mut engine, mut w) = fixture();
        let request = fetch_of(click(&mut engine, &mut w, "to-about"));
        engine.complete(&mut w, request.id, Ok(fetched("/about", "<title>About</title>")));
        w.scroll_to(ScrollOffset::new(0.0, 400.0));

        assert!(w.back());
        let request = match engine.handle_popstate(&mut w) {
            Some(Transition::Fetch(request)) => request,
            other => panic!("Expected Fetch, got {:?}", other),
        };
        assert_eq!(request.url, url("/"));
        assert_eq!(w.pending_frames(), 1);
        assert_eq!(engine.last_known_path().pathname(), "/");

        // The browser's restore is overridden until the swap.
        w.run_frame();
        assert_eq!(w.scroll_offset().y, 400.0);

        assert_eq!(
            engine.complete(&mut w, request.id, Ok(fetched("/", "<title>Home</title>"))),
            Completion::Committed
        );
        assert_eq!(w.document().title(), "Home");
        assert_eq!(w.history().len(), 2);
        assert_eq!(w.scroll_offset().y, 0.0);
    }

    #[test]
    fn test_success_cancels_pending_restore() {
        let (mut engine, mut w) = fixture();
        let request = fetch_of(click(&mut engine, &mut w, "to-about"));
        engine.complete(&mut w, request.id, Ok(fetched("/about", "<title>About</title>")));

        w.back();
        let Some(Transition::Fetch(request)) = engine.handle_popstate(&mut w) else {
            panic!("Expected Fetch");
        };
        engine.complete(&mut w, request.id, Ok(fetched("/", "<title>Home</title>")));
        assert_eq!(w.pending_frames(), 0);
    }

    #[test]
    fn test_new_popstate_replaces_pending_restore() {
        let (mut engine, mut w) = fixture();
        for path in ["/a", "/b"] {
            let request = match engine.navigate(
                &mut w,
                NavigationConfig::build(
                    NavigationSource::Explicit(Overrides {
                        href: Some(path.to_string()),
                        is_push: Some(true),
                        ..Overrides::default()
                    }),
                    None,
                    &url("/"),
                )
                .unwrap(),
            ) {
                Transition::Fetch(request) => request,
                other => panic!("Expected Fetch, got {:?}", other),
            };
            engine.complete(&mut w, request.id, Ok(fetched(path, "<title>Page</title>")));
        }

        w.back();
        assert!(matches!(engine.handle_popstate(&mut w), Some(Transition::Fetch(_))));
        w.back();
        assert_eq!(engine.handle_popstate(&mut w), Some(Transition::Dropped));
        assert_eq!(w.pending_frames(), 1);
    }

    #[test]
    fn test_hash_only_popstate_is_left_to_browser() {
        let (mut engine, mut w) = fixture();
        engine.settings_mut().scroll_offset_selector = Some("nav".to_string());
        click(&mut engine, &mut w, "to-news");
        assert_eq!(w.history().len(), 2);

        assert!(w.back());
        assert_eq!(engine.handle_popstate(&mut w), None);
        assert_eq!(w.pending_frames(), 0);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_popstate_without_scroll_mitigation() {
        let (mut engine, mut w) = fixture();
        engine.settings_mut().mitigations.restore_scroll_on_popstate = false;
        let request = fetch_of(click(&mut engine, &mut w, "to-about"));
        engine.complete(&mut w, request.id, Ok(fetched("/about", "<title>About</title>")));

        w.back();
        assert!(engine.handle_popstate(&mut w).is_some());
        assert_eq!(w.pending_frames(), 0);
    }
}
