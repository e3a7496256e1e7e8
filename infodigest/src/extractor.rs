use common::LayoutConfig;
use tracing::{debug, warn};
use url::Url;

use crate::document::{DocumentNode, HtmlDocument, StructuredDocument};
use crate::models::ArticleStub;

/// Pulls the item cards out of one listing page.
///
/// Items are the direct children of the layout's container matching the item
/// signature. When the container is missing (markup drift) every matching
/// element of the document is taken instead. An empty result means the listing
/// has no more content pages.
pub fn extract_stubs<D: StructuredDocument>(
    doc: &D,
    layout: &LayoutConfig,
    page_url: &Url,
) -> Vec<ArticleStub> {
    let items = match doc.find_container(&layout.container) {
        Some(container) => container.children_matching(&layout.item),
        None => {
            warn!(
                container = %layout.container.tag,
                class = ?layout.container.class,
                %page_url,
                "listing container not found; scanning the whole document"
            );
            // innermost matches only: a wrapper item holding other items is not a card
            doc.root()
                .descendants_matching(&layout.item)
                .into_iter()
                .filter(|item| item.find_first(&layout.item).is_none())
                .collect::<Vec<_>>()
        }
    };

    let stubs: Vec<ArticleStub> = items
        .iter()
        .map(|item| stub_from_node(item, layout, page_url))
        .collect();
    debug!(count = stubs.len(), %page_url, "extracted listing stubs");
    stubs
}

/// Parses `body` as HTML and extracts its stubs.
pub fn extract_stubs_from_html(body: &str, layout: &LayoutConfig, page_url: &Url) -> Vec<ArticleStub> {
    let doc = HtmlDocument::parse(body);
    extract_stubs(&doc, layout, page_url)
}

fn stub_from_node<'a, N: DocumentNode<'a>>(item: &N, layout: &LayoutConfig, page_url: &Url) -> ArticleStub {
    let title = item
        .find_first(&layout.title)
        .map(|t| t.flat_text(""))
        .unwrap_or_default();

    let detail_link = item
        .find_first(&layout.read_more)
        .and_then(|a| a.attribute("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .and_then(|href| match page_url.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(%href, error = %e, "ignoring unparseable read-more link");
                None
            }
        });

    ArticleStub {
        title,
        raw_text: item.flat_text(" "),
        detail_link,
    }
}
