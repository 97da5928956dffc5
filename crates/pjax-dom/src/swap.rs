//! Title and body replacement

use ego_tree::{NodeId, NodeRef};
use scraper::{ElementRef, Html, Node};

use crate::document::{graft, Document};
use crate::script::{destroys_document, escape_attribute, InlineScript};

/// Toggles for the swap's platform workarounds
#[derive(Debug, Clone, Copy)]
pub struct SwapOptions {
    /// Drop inline scripts that call `document.write`/`document.open`
    /// instead of re-running them against the live page.
    pub drop_destructive_scripts: bool,
}

impl Default for SwapOptions {
    fn default() -> Self {
        Self {
            drop_destructive_scripts: true,
        }
    }
}

/// What a swap did with the incoming scripts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwapReport {
    /// Fresh copies appended to the live body, in document order.
    /// The host runs each of them exactly once.
    pub executed: Vec<InlineScript>,
    /// `src` scripts discarded from the incoming body
    pub dropped_external: usize,
    /// Inline scripts discarded because they would erase the document
    pub dropped_destructive: usize,
}

/// Replace the live title and body with those of `incoming`.
///
/// The live `<head>` is left alone apart from the title text. The live
/// document is rebuilt afterwards, so node handles taken before the swap
/// no longer resolve.
pub fn swap_document(live: &mut Document, mut incoming: Document, options: SwapOptions) -> SwapReport {
    replace_title(live, &incoming);

    let mut report = SwapReport::default();
    let mut discarded = Vec::new();
    let mut inline = Vec::new();

    for script in body_scripts(&incoming) {
        if script.value().attr("src").is_some() {
            report.dropped_external += 1;
            discarded.push(script.id());
        } else if options.drop_destructive_scripts
            && destroys_document(&script.text().collect::<String>())
        {
            report.dropped_destructive += 1;
            discarded.push(script.id());
        } else {
            inline.push(script.id());
        }
    }

    for id in discarded {
        incoming.detach(id);
    }

    let Some(body) = incoming.body() else {
        tracing::warn!("Incoming document has no body; keeping the live one");
        live.compact();
        return report;
    };
    replace_body(live, *body);

    for id in inline {
        let Some(script) = incoming.get(id) else {
            continue;
        };
        if let Some(copy) = append_script_copy(live, script) {
            report.executed.push(copy);
        }
    }

    live.compact();

    tracing::debug!(
        executed = report.executed.len(),
        dropped_external = report.dropped_external,
        dropped_destructive = report.dropped_destructive,
        "Swapped document body"
    );

    report
}

fn body_scripts(doc: &Document) -> Vec<ElementRef<'_>> {
    doc.body()
        .map(|body| {
            body.descendants()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "script")
                .collect()
        })
        .unwrap_or_default()
}

fn replace_title(live: &mut Document, incoming: &Document) {
    let source = incoming.title_element();

    match live.title_element().map(|el| el.id()) {
        Some(title) => {
            let stale: Vec<NodeId> = live
                .get(title)
                .map(|el| el.children().map(|child| child.id()).collect())
                .unwrap_or_default();
            for id in stale {
                live.detach(id);
            }
            if let Some(source) = source {
                for child in source.children() {
                    graft(live.tree_mut(), title, child);
                }
            }
        }
        None => {
            let head = live.head().map(|el| el.id());
            if let (Some(source), Some(head)) = (source, head) {
                graft(live.tree_mut(), head, *source);
            }
        }
    }
}

fn replace_body(live: &mut Document, body: NodeRef<'_, Node>) {
    let root = live.root().id();
    if let Some(old) = live.body().map(|el| el.id()) {
        live.detach(old);
    }
    graft(live.tree_mut(), root, body);
}

/// Append a copy of `source` carrying only its `type` and text, so the copy
/// runs while the original (and any `id` it has) stays where it was.
fn append_script_copy(live: &mut Document, source: ElementRef<'_>) -> Option<InlineScript> {
    let script_type = source.value().attr("type").map(str::to_string);
    let markup = match &script_type {
        Some(ty) => format!(r#"<script type="{}"></script>"#, escape_attribute(ty)),
        None => "<script></script>".to_string(),
    };

    let fragment = Html::parse_fragment(&markup);
    let shell = fragment
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "script")?;

    let body = live.body()?.id();
    let copy = graft(live.tree_mut(), body, *shell)?;
    for child in source.children() {
        graft(live.tree_mut(), copy, child);
    }

    Some(InlineScript {
        script_type,
        text: source.text().collect(),
    })
}
