//! Directory-listing link extraction.
//!
//! The distribution server renders every directory level as an HTML page
//! whose entries are `<li><a href="...">label</a></li>` items. Navigation
//! and footer anchors are not wrapped in list items, so only anchors whose
//! immediate parent is an `<li>` are treated as listing entries.

use scraper::{ElementRef, Html, Node};
use serde::Serialize;
use url::Url;

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LinkEntry {
    /// Display text of the anchor.
    pub name: String,
    /// Absolute URL the anchor points to.
    pub url: String,
}

/// Parses an HTML document and extracts its listing entries.
///
/// HTML parsing is error-tolerant: a malformed document yields whatever
/// entries could be recovered, possibly none.
#[must_use]
pub fn parse_links(base: &Url, document: &str) -> Vec<LinkEntry> {
    let html = Html::parse_document(document);
    parse_link_list(base, html.root_element())
}

/// Extracts listing entries below `root` in document order.
///
/// Relative `href`s are resolved against `base`. An anchor whose `href` is
/// missing or cannot be resolved is skipped.
#[must_use]
pub fn parse_link_list(base: &Url, root: ElementRef<'_>) -> Vec<LinkEntry> {
    let mut links = Vec::new();
    collect_links(base, root, &mut links);
    links
}

fn collect_links(base: &Url, parent: ElementRef<'_>, links: &mut Vec<LinkEntry>) {
    let parent_is_item = parent.value().name() == "li";

    for child in parent.children() {
        let Some(element) = ElementRef::wrap(child) else {
            continue;
        };

        if parent_is_item && element.value().name() == "a" {
            if let Some(link) = link_entry(base, element) {
                links.push(link);
            }
        } else if element.has_children() {
            collect_links(base, element, links);
        }
    }
}

fn link_entry(base: &Url, anchor: ElementRef<'_>) -> Option<LinkEntry> {
    let href = anchor.value().attr("href")?;
    let url = match base.join(href) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(href, error = %e, "skipping unresolvable link");
            return None;
        }
    };

    Some(LinkEntry {
        name: anchor_label(anchor),
        url: url.into(),
    })
}

/// Text of the anchor's first child node.
fn anchor_label(anchor: ElementRef<'_>) -> String {
    let Some(first) = anchor.first_child() else {
        return String::new();
    };

    match first.value() {
        Node::Text(text) => (**text).to_owned(),
        _ => ElementRef::wrap(first)
            .map(|element| element.text().collect())
            .unwrap_or_default(),
    }
}
