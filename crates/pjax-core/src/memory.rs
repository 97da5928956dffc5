//! In-memory window
//!
//! A headless stand-in for a browser tab. Layout is whatever the caller
//! declares per element id, frames run when [`MemoryWindow::run_frame`] is
//! called, and a native reload is only recorded for the host to perform.

use std::collections::{BTreeMap, HashMap};

use pjax_dom::{Document, ElementRef, InlineScript};
use pjax_navigation::HistoryEntry;
use url::Url;

use crate::window::{
    ElementBox, FrameHandle, FrameTask, ScrollOffset, TransitionEvent, Window,
};

#[derive(Debug, Clone)]
struct SessionEntry {
    entry: HistoryEntry,
    scroll: ScrollOffset,
}

#[derive(Debug)]
pub struct MemoryWindow {
    location: Url,
    document: Document,
    entries: Vec<SessionEntry>,
    index: usize,
    scroll: ScrollOffset,
    layout: HashMap<String, ElementBox>,
    frames: Vec<(FrameHandle, FrameTask)>,
    next_frame: u64,
    /// Scroll position the browser restores after a traversal
    restore_after_traversal: Option<ScrollOffset>,
    events: Vec<TransitionEvent>,
    executed: Vec<InlineScript>,
    root_style: BTreeMap<String, String>,
    pending_reload: Option<Url>,
    reloads: usize,
}

impl MemoryWindow {
    pub fn new(location: Url, document: Document) -> Self {
        let entry = HistoryEntry::new(location.clone(), document.title());
        Self {
            location,
            document,
            entries: vec![SessionEntry {
                entry,
                scroll: ScrollOffset::default(),
            }],
            index: 0,
            scroll: ScrollOffset::default(),
            layout: HashMap::new(),
            frames: Vec::new(),
            next_frame: 0,
            restore_after_traversal: None,
            events: Vec::new(),
            executed: Vec::new(),
            root_style: BTreeMap::new(),
            pending_reload: None,
            reloads: 0,
        }
    }

    /// Parse `html` and open it at `location`
    pub fn open(location: Url, html: &str) -> Self {
        Self::new(location, Document::parse(html))
    }

    /// A native page load replacing the current entry: new document, top
    /// of the page, nothing scheduled.
    pub fn load(&mut self, location: Url, document: Document) {
        self.entries[self.index] = SessionEntry {
            entry: HistoryEntry::new(location.clone(), document.title()),
            scroll: ScrollOffset::default(),
        };
        self.location = location;
        self.document = document;
        self.scroll = ScrollOffset::default();
        self.frames.clear();
        self.restore_after_traversal = None;
        self.root_style.clear();
        self.pending_reload = None;
    }

    /// Traverse session history by `delta` entries, the way the back and
    /// forward buttons do. Returns `false` if there is no such entry.
    pub fn go(&mut self, delta: isize) -> bool {
        let Some(target) = self.index.checked_add_signed(delta) else {
            return false;
        };
        if target >= self.entries.len() || delta == 0 {
            return false;
        }

        self.entries[self.index].scroll = self.scroll;
        self.index = target;
        self.location = self.entries[target].entry.url.clone();
        self.restore_after_traversal = Some(self.entries[target].scroll);
        true
    }

    pub fn back(&mut self) -> bool {
        self.go(-1)
    }

    pub fn forward(&mut self) -> bool {
        self.go(1)
    }

    /// Run one animation frame: first the browser's own scroll restoration
    /// after a traversal, then the scheduled tasks in order.
    pub fn run_frame(&mut self) {
        if let Some(offset) = self.restore_after_traversal.take() {
            self.scroll = offset;
        }
        for (_, task) in std::mem::take(&mut self.frames) {
            match task {
                FrameTask::RestoreScroll(offset) => self.scroll = offset,
            }
        }
    }

    pub fn set_layout(&mut self, id: impl Into<String>, element_box: ElementBox) {
        self.layout.insert(id.into(), element_box);
    }

    pub fn history(&self) -> Vec<&HistoryEntry> {
        self.entries.iter().map(|e| &e.entry).collect()
    }

    pub fn history_index(&self) -> usize {
        self.index
    }

    pub fn pending_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn events(&self) -> &[TransitionEvent] {
        &self.events
    }

    pub fn executed_scripts(&self) -> &[InlineScript] {
        &self.executed
    }

    pub fn root_style(&self, property: &str) -> Option<&str> {
        self.root_style.get(property).map(String::as_str)
    }

    pub fn reload_count(&self) -> usize {
        self.reloads
    }

    /// The location a native reload was requested for, if any. The host
    /// performs the load and hands the result to [`MemoryWindow::load`].
    pub fn take_pending_reload(&mut self) -> Option<Url> {
        self.pending_reload.take()
    }
}

impl Window for MemoryWindow {
    fn location(&self) -> &Url {
        &self.location
    }

    fn document(&self) -> &Document {
        &self.document
    }

    fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    fn push_state(&mut self, title: &str, url: &Url) {
        self.entries[self.index].scroll = self.scroll;
        self.entries.truncate(self.index + 1);
        self.entries.push(SessionEntry {
            entry: HistoryEntry::new(url.clone(), title),
            scroll: self.scroll,
        });
        self.index = self.entries.len() - 1;
        self.location = url.clone();
    }

    fn reload(&mut self) {
        self.reloads += 1;
        self.pending_reload = Some(self.location.clone());
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    fn scroll_to(&mut self, offset: ScrollOffset) {
        self.scroll = offset;
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll.x += dx;
        self.scroll.y += dy;
    }

    fn scroll_into_view(&mut self, id: &str) -> bool {
        if self.document.element_by_id(id).is_none() {
            return false;
        }
        let top = self.layout.get(id).map(|b| b.document_top).unwrap_or(0.0);
        self.scroll.y = top;
        true
    }

    fn element_box(&self, element: ElementRef<'_>) -> Option<ElementBox> {
        element
            .value()
            .id()
            .and_then(|id| self.layout.get(id))
            .copied()
    }

    fn request_frame(&mut self, task: FrameTask) -> FrameHandle {
        self.next_frame += 1;
        let handle = FrameHandle(self.next_frame);
        self.frames.push((handle, task));
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.frames.retain(|(h, _)| *h != handle);
    }

    fn dispatch_event(&mut self, event: TransitionEvent) {
        tracing::trace!(event = %event, "Dispatching document event");
        self.events.push(event);
    }

    fn execute_scripts(&mut self, scripts: &[InlineScript]) {
        self.executed.extend_from_slice(scripts);
    }

    fn set_root_style(&mut self, property: &str, value: Option<&str>) {
        match value {
            Some(value) => {
                self.root_style
                    .insert(property.to_string(), value.to_string());
            }
            None => {
                self.root_style.remove(property);
            }
        }
    }
}
