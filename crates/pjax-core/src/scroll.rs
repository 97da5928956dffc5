//! Scroll Controller

use crate::window::{Position, ScrollOffset, Window};

/// What a scroll step ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    Element,
    Top,
    Untouched,
}

/// Scrolls to elements or the top of the page, compensating for a fixed
/// header when one is configured.
///
/// Every step sets an absolute position before applying the relative offset,
/// so running the same step twice lands in the same place.
#[derive(Debug, Clone, Copy)]
pub struct ScrollController<'a> {
    offset_selector: Option<&'a str>,
}

impl<'a> ScrollController<'a> {
    pub fn new(offset_selector: Option<&'a str>) -> Self {
        Self { offset_selector }
    }

    /// Scroll to `target_id` if it exists; otherwise to the top unless
    /// `no_scroll` is set.
    pub fn scroll_to_target<W: Window + ?Sized>(
        &self,
        window: &mut W,
        target_id: Option<&str>,
        no_scroll: bool,
    ) -> ScrollOutcome {
        if let Some(id) = target_id {
            if self.scroll_to_element(window, id) {
                return ScrollOutcome::Element;
            }
        }

        if no_scroll {
            return ScrollOutcome::Untouched;
        }

        window.scroll_to(ScrollOffset::default());
        ScrollOutcome::Top
    }

    /// Bring the element into view and apply the header offset.
    /// Returns `false` if the element does not exist.
    pub fn scroll_to_element<W: Window + ?Sized>(&self, window: &mut W, id: &str) -> bool {
        if !window.scroll_into_view(id) {
            tracing::debug!(id, "Scroll target not found");
            return false;
        }
        self.offset_scroll(window);
        true
    }

    /// Scroll up by the height of the configured header, if it is currently
    /// `position: fixed` and pinned at `top: 0`.
    pub fn offset_scroll<W: Window + ?Sized>(&self, window: &mut W) {
        let Some(height) = self.fixed_header_height(window) else {
            return;
        };
        window.scroll_by(0.0, -height);
    }

    fn fixed_header_height<W: Window + ?Sized>(&self, window: &W) -> Option<f64> {
        let selector = self.offset_selector?;
        let header = match window.document().query_selector(selector) {
            Ok(found) => found?,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring scroll offset selector");
                return None;
            }
        };

        window
            .element_box(header)
            .filter(|b| b.position == Position::Fixed && b.top == Some(0.0))
            .map(|b| b.height)
    }
}
