//! FAQ extraction from JSON-LD structured data.
//!
//! Storefront FAQ pages embed their questions as schema.org JSON-LD,
//! either as one `FAQPage` node with a `mainEntity` list or as standalone
//! `Question` nodes. Both shapes are handled; malformed script blocks are
//! skipped with a warning.

use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};

use storesync_shared::Result;

use crate::client::Fetcher;

/// Fetch a FAQ page and extract its content as Q/A text.
pub async fn scrape_faq(fetcher: &Fetcher, url: &str) -> Result<String> {
    let html = fetcher.fetch_text(url).await?;
    Ok(extract_faq(&html))
}

/// Extract FAQ content from HTML as `Q: …\nA: …` blocks.
pub fn extract_faq(html: &str) -> String {
    debug!("extracting FAQ content from HTML");
    let doc = Html::parse_document(html);
    let script_sel = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();

    let mut out = String::new();
    let mut items = 0usize;

    for script in doc.select(&script_sel) {
        let raw = script.inner_html();
        let data: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "skipping malformed JSON-LD block");
                continue;
            }
        };

        match data.get("@type").and_then(Value::as_str) {
            Some("FAQPage") => {
                if let Some(entities) = data.get("mainEntity").and_then(Value::as_array) {
                    for item in entities {
                        if item.get("@type").and_then(Value::as_str) == Some("Question") {
                            append_question(item, &mut out, &mut items);
                        }
                    }
                }
            }
            Some("Question") => append_question(&data, &mut out, &mut items),
            _ => {}
        }
    }

    info!(items, "extracted FAQ items");
    out.trim().to_string()
}

fn append_question(item: &Value, out: &mut String, items: &mut usize) {
    let question = item.get("name").and_then(Value::as_str).unwrap_or_default();
    let answer_raw = item
        .get("acceptedAnswer")
        .and_then(|a| a.get("text"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    // Answers arrive as HTML fragments; reduce to plain text.
    let answer = strip_html(answer_raw);

    out.push_str(&format!("Q: {question}\nA: {answer}\n\n"));
    *items += 1;
}

/// Reduce an HTML fragment to its text content.
fn strip_html(fragment: &str) -> String {
    let frag = Html::parse_fragment(fragment);
    frag.root_element()
        .text()
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAQ_PAGE: &str = r#"<html><head>
        <script type="application/ld+json">
        {
          "@context": "https://schema.org",
          "@type": "FAQPage",
          "mainEntity": [
            {
              "@type": "Question",
              "name": "How long does shipping take?",
              "acceptedAnswer": {"@type": "Answer", "text": "<p>Usually <b>2-3 days</b>.</p>"}
            },
            {
              "@type": "Question",
              "name": "Is the meat frozen?",
              "acceptedAnswer": {"@type": "Answer", "text": "No, it ships chilled."}
            }
          ]
        }
        </script>
        </head><body></body></html>"#;

    #[test]
    fn extracts_faq_page_entities() {
        let content = extract_faq(FAQ_PAGE);
        assert!(content.contains("Q: How long does shipping take?"));
        assert!(content.contains("A: Usually 2-3 days."));
        assert!(content.contains("Q: Is the meat frozen?"));
        assert!(content.contains("A: No, it ships chilled."));
        // Two Q/A blocks separated by a blank line, no trailing whitespace
        assert_eq!(content.matches("Q: ").count(), 2);
        assert!(!content.ends_with('\n'));
    }

    #[test]
    fn extracts_standalone_question_nodes() {
        let html = r#"<html><head>
            <script type="application/ld+json">
            {"@type": "Question", "name": "Do you deliver abroad?",
             "acceptedAnswer": {"text": "Only within Germany."}}
            </script>
            </head><body></body></html>"#;
        let content = extract_faq(html);
        assert_eq!(content, "Q: Do you deliver abroad?\nA: Only within Germany.");
    }

    #[test]
    fn malformed_json_ld_is_skipped() {
        let html = r#"<html><head>
            <script type="application/ld+json">{not valid json</script>
            <script type="application/ld+json">
            {"@type": "Question", "name": "Still works?",
             "acceptedAnswer": {"text": "Yes."}}
            </script>
            </head><body></body></html>"#;
        let content = extract_faq(html);
        assert_eq!(content, "Q: Still works?\nA: Yes.");
    }

    #[test]
    fn page_without_json_ld_yields_empty_content() {
        let content = extract_faq("<html><body><p>No structured data here.</p></body></html>");
        assert!(content.is_empty());
    }
}
