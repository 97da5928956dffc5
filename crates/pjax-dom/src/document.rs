//! HTML documents backed by a `scraper` tree

use std::sync::atomic::{AtomicU64, Ordering};

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

use crate::error::DomError;
use crate::Result;

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

fn next_generation() -> u64 {
    NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)
}

/// A reference to one node of one version of a [`Document`].
///
/// Handles go stale when the document is rebuilt (after every swap), and
/// never resolve in another document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    generation: u64,
    id: NodeId,
}

/// A parsed HTML document.
///
/// The same type is used for the live page and for freshly fetched pages.
/// Queries always walk down from the root element, so detached nodes are
/// never returned; [`Document::compact`] drops them from the arena.
pub struct Document {
    html: Html,
    generation: u64,
}

impl Document {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
            generation: next_generation(),
        }
    }

    /// The `<html>` element
    pub fn root(&self) -> ElementRef<'_> {
        self.html.root_element()
    }

    pub fn head(&self) -> Option<ElementRef<'_>> {
        self.child_of_root("head")
    }

    pub fn body(&self) -> Option<ElementRef<'_>> {
        self.child_of_root("body")
    }

    fn child_of_root(&self, name: &str) -> Option<ElementRef<'_>> {
        self.root()
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == name)
    }

    /// All attached elements in tree order
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.root().descendants().filter_map(ElementRef::wrap)
    }

    /// Text of the first `<title>`, with whitespace stripped and collapsed
    /// the way browsers report `document.title`.
    pub fn title(&self) -> String {
        self.title_element()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default()
    }

    pub(crate) fn title_element(&self) -> Option<ElementRef<'_>> {
        self.elements().find(|el| el.value().name() == "title")
    }

    pub fn element_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        if id.is_empty() {
            return None;
        }
        self.elements().find(|el| el.value().id() == Some(id))
    }

    /// First element matching a CSS selector list
    pub fn query_selector(&self, selectors: &str) -> Result<Option<ElementRef<'_>>> {
        let selector = Selector::parse(selectors).map_err(|e| DomError::InvalidSelector {
            selector: selectors.to_string(),
            reason: e.to_string(),
        })?;

        Ok(self.root().select(&selector).next())
    }

    /// All attached `<script>` elements
    pub fn scripts(&self) -> Vec<ElementRef<'_>> {
        self.elements()
            .filter(|el| el.value().name() == "script")
            .collect()
    }

    /// Look up any element by id, attached or not
    pub(crate) fn get(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Handle to a node of this document, e.g. an event target
    pub fn handle(&self, node: NodeRef<'_, Node>) -> NodeHandle {
        NodeHandle {
            generation: self.generation,
            id: node.id(),
        }
    }

    /// Walk up from the handle's node (inclusive) to the nearest `<a>`.
    /// Stale handles and detached nodes have no enclosing link.
    pub fn enclosing_link(&self, handle: NodeHandle) -> Option<ElementRef<'_>> {
        let start = self.resolve(handle)?;
        std::iter::once(start)
            .chain(start.ancestors())
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "a")
    }

    fn resolve(&self, handle: NodeHandle) -> Option<NodeRef<'_, Node>> {
        if handle.generation != self.generation {
            return None;
        }
        let node = self.html.tree.get(handle.id)?;
        let root = self.root().id();
        let attached = node.id() == root || node.ancestors().any(|a| a.id() == root);
        attached.then_some(node)
    }

    /// URL that relative links resolve against: the first `<base href>`,
    /// falling back to the page location.
    pub fn base_url(&self, location: &Url) -> Url {
        self.elements()
            .filter(|el| el.value().name() == "base")
            .find_map(|el| el.value().attr("href"))
            .and_then(|href| location.join(href).ok())
            .unwrap_or_else(|| location.clone())
    }

    /// Serialize the whole document
    pub fn to_html(&self) -> String {
        self.html.html()
    }

    pub(crate) fn tree_mut(&mut self) -> &mut Tree<Node> {
        &mut self.html.tree
    }

    pub(crate) fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Rebuild the arena from the attached tree only. Invalidates every
    /// outstanding [`NodeHandle`].
    pub(crate) fn compact(&mut self) {
        let source = self.html.tree.root();
        let mut tree = Tree::new(source.value().clone());
        let root = tree.root().id();
        for child in source.children() {
            graft(&mut tree, root, child);
        }
        self.html.tree = tree;
        self.generation = next_generation();
    }

    #[cfg(test)]
    pub(crate) fn arena_len(&self) -> usize {
        self.html.tree.nodes().count()
    }
}

/// Deep-copy `source` (from any tree) as the last child of `parent`.
pub(crate) fn graft(
    tree: &mut Tree<Node>,
    parent: NodeId,
    source: NodeRef<'_, Node>,
) -> Option<NodeId> {
    let id = tree.get_mut(parent)?.append(source.value().clone()).id();
    for child in source.children() {
        graft(tree, id, child);
    }
    Some(id)
}

impl Default for Document {
    fn default() -> Self {
        Self::parse("<!DOCTYPE html><html><head><title></title></head><body></body></html>")
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("title", &self.title())
            .finish_non_exhaustive()
    }
}

fn collapse_whitespace(input: &str) -> String {
    input.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}
