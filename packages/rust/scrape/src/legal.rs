//! Legal page extraction.
//!
//! Legal pages (imprint, privacy policy, terms) are plain prose. The main
//! content container is located with a selector fallback chain, then
//! headings and paragraphs are emitted as lightly formatted text.

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use storesync_shared::Result;

use crate::client::Fetcher;

/// Fetch a legal page and extract its content as formatted text.
pub async fn scrape_legal(fetcher: &Fetcher, url: &str) -> Result<String> {
    let html = fetcher.fetch_text(url).await?;
    Ok(extract_legal(&html))
}

/// Extract legal page content from HTML.
pub fn extract_legal(html: &str) -> String {
    debug!("extracting legal page content from HTML");
    let doc = Html::parse_document(html);

    let container = match find_container(&doc) {
        Some(el) => el,
        None => {
            warn!("could not find any content container");
            return String::new();
        }
    };

    let heading_sel = Selector::parse("h1, h2, h3, h4, h5, h6").unwrap();
    let para_sel = Selector::parse("p").unwrap();

    let mut out = String::new();

    // Major headings first, then paragraph prose.
    for heading in container.select(&heading_sel) {
        let text = element_text(&heading);
        if text.is_empty() {
            continue;
        }
        let marker = match heading.value().name() {
            "h1" => "#",
            "h2" => "##",
            _ => "###",
        };
        out.push_str(&format!("{marker} {text}\n\n"));
    }

    for para in container.select(&para_sel) {
        let text = element_text(&para).replace('\n', " ");
        if !text.is_empty() {
            out.push_str(&format!("{text}\n\n"));
        }
    }

    // No structured content at all: fall back to the container's raw text.
    if out.trim().is_empty() {
        warn!("no structured content found, extracting all text");
        out = element_text(&container);
    }

    let content = out.trim().to_string();
    info!(
        words = content.split_whitespace().count(),
        "extracted legal page content"
    );
    content
}

/// Locate the main content container: `main`, then `article`, then a
/// `page-content` div, then `body`.
fn find_container(doc: &Html) -> Option<ElementRef<'_>> {
    for sel_str in ["main", "article", "div.page-content", "body"] {
        let sel = Selector::parse(sel_str).unwrap();
        if let Some(el) = doc.select(&sel).next() {
            return Some(el);
        }
    }
    None
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}
