//! The page environment the engine runs against

use pjax_dom::{Document, ElementRef, InlineScript};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollOffset {
    pub x: f64,
    pub y: f64,
}

impl ScrollOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Computed CSS `position`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

/// Layout facts about one element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementBox {
    pub position: Position,
    /// Computed `top` in px; `None` for `auto`
    pub top: Option<f64>,
    pub height: f64,
    /// Distance from the top of the document
    pub document_top: f64,
}

impl ElementBox {
    /// An in-flow element at `document_top`
    pub fn flow(document_top: f64, height: f64) -> Self {
        Self {
            position: Position::Static,
            top: None,
            height,
            document_top,
        }
    }

    /// A `position: fixed; top: 0` element, such as a sticky site header
    pub fn fixed_top(height: f64) -> Self {
        Self {
            position: Position::Fixed,
            top: Some(0.0),
            height,
            document_top: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Work deferred to the next animation frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameTask {
    RestoreScroll(ScrollOffset),
}

/// Document-level events fired around a swap, for independently loaded
/// scripts to tear down and re-initialize widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    Before,
    After,
}

impl TransitionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TransitionEvent::Before => "pjax-before-transition",
            TransitionEvent::After => "pjax-after-transition",
        }
    }
}

impl std::fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A browsing context as the engine sees it: location and session history,
/// the live document, the viewport and the event loop.
pub trait Window {
    fn location(&self) -> &Url;

    fn document(&self) -> &Document;

    fn document_mut(&mut self) -> &mut Document;

    /// `history.pushState`: add an entry and change the location without
    /// loading anything.
    fn push_state(&mut self, title: &str, url: &Url);

    /// Full, native reload of the current location.
    fn reload(&mut self);

    fn scroll_offset(&self) -> ScrollOffset;

    fn scroll_to(&mut self, offset: ScrollOffset);

    fn scroll_by(&mut self, dx: f64, dy: f64);

    /// Bring the element with this id to the top of the viewport.
    /// Returns `false` if there is no such element.
    fn scroll_into_view(&mut self, id: &str) -> bool;

    fn element_box(&self, element: ElementRef<'_>) -> Option<ElementBox>;

    fn request_frame(&mut self, task: FrameTask) -> FrameHandle;

    /// Cancelling a frame that already ran is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);

    fn dispatch_event(&mut self, event: TransitionEvent);

    /// Run freshly inserted inline scripts, once each, in order.
    fn execute_scripts(&mut self, scripts: &[InlineScript]);

    /// Set or clear an inline style property on the root element.
    fn set_root_style(&mut self, property: &str, value: Option<&str>);
}
