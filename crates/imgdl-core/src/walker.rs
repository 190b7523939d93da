//! Breadth-first document walk that collects image references.
//!
//! Best-effort: an element whose extraction fails is logged and skipped, the
//! walk itself never fails.

use std::collections::VecDeque;

use scraper::{ElementRef, Html};

use crate::extract::{kind_for_tag, NormalizedContent};
use crate::url_model::resolve_url;

/// Parses `html` and walks it; see [`walk_document`].
pub fn extract_images(html: &str, base_url: &str) -> Vec<NormalizedContent> {
    let document = Html::parse_document(html);
    walk_document(&document, base_url)
}

/// Visits element nodes in breadth-first document order, dispatching each
/// tag to its extractor. Remote references are resolved against `base_url`;
/// one that cannot be resolved is kept as written.
pub fn walk_document(document: &Html, base_url: &str) -> Vec<NormalizedContent> {
    let mut queue = VecDeque::new();
    let mut found = Vec::new();
    queue.push_back(document.tree.root());

    while let Some(node) = queue.pop_front() {
        if let Some(element) = ElementRef::wrap(node) {
            visit(element, base_url, &mut found);
        }
        let mut child = node.first_child();
        while let Some(next) = child {
            if next.value().is_element() {
                queue.push_back(next);
            }
            child = next.next_sibling();
        }
    }

    tracing::debug!(count = found.len(), base_url, "document walk finished");
    found
}

fn visit(element: ElementRef<'_>, base_url: &str, found: &mut Vec<NormalizedContent>) {
    let Some(kind) = kind_for_tag(element.value().name()) else {
        return;
    };
    match kind.extract(element) {
        Ok(Some(mut content)) => {
            if content.is_remote() {
                match resolve_url(base_url, &content.data) {
                    Ok(absolute) => content.data = absolute,
                    Err(e) => tracing::debug!(%kind, error = %e, "keeping unresolved reference"),
                }
            }
            found.push(content);
        }
        Ok(None) => {}
        Err(e) => tracing::debug!(%kind, error = %e, "skipping element"),
    }
}
