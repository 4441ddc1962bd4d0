//! Product page extraction and knowledge-base formatting.
//!
//! Product pages are scraped twice over: once for structured details
//! (name, price, description, badges) through selector fallback chains,
//! and once for the full visible text with scripts and styles stripped.
//! The formatted output keeps both, so the published document answers
//! detail questions as well as free-form ones.

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use storesync_shared::Result;

use crate::catalog::collect_product_urls;
use crate::client::Fetcher;

/// Structured details extracted from one product page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductDetails {
    /// Short base name, e.g. "Ribeye Steak".
    pub name: String,
    /// Full display name, e.g. "Ribeye Steak Black Angus Dry Aged".
    pub full_name: String,
    pub price: Option<String>,
    pub price_per_kilo: Option<String>,
    pub description: Option<String>,
    pub special_offer: Option<String>,
}

/// Walk the catalog and produce the flat-text product document.
pub async fn scrape_products(
    fetcher: &Fetcher,
    catalog_url: &Url,
    max_pages: u32,
) -> Result<String> {
    let urls = collect_product_urls(fetcher, catalog_url, max_pages).await?;
    let total = urls.len();

    let mut out = String::new();
    for (i, url) in urls.iter().enumerate() {
        info!(current = i + 1, total, %url, "scraping product");
        match fetcher.fetch_text(url).await {
            Ok(html) => {
                let details = extract_product(&html, url);
                let full_text = visible_text(&html);
                out.push_str(&format_product(&details, url, &full_text));
            }
            Err(e) => {
                warn!(%url, error = %e, "product fetch failed, skipping");
            }
        }
    }

    Ok(out.trim_end().to_string())
}

/// Extract structured product details from a product page.
pub fn extract_product(html: &str, url: &str) -> ProductDetails {
    let doc = Html::parse_document(html);
    let mut details = ProductDetails::default();

    // Name: title selector chain, then the URL slug.
    for sel_str in ["h1.product__title", "h1.product-single__title", "h1"] {
        let sel = Selector::parse(sel_str).unwrap();
        if let Some(el) = doc.select(&sel).next() {
            let full_name = el.text().collect::<String>().trim().to_string();
            if !full_name.is_empty() {
                details.name = base_name(&full_name);
                details.full_name = full_name;
                break;
            }
        }
    }
    if details.full_name.is_empty() {
        let full_name = name_from_url(url);
        details.name = base_name(&full_name);
        details.full_name = full_name;
    }

    // Price: page metadata first, visible price element second.
    details.price = price_from_metadata(&doc).or_else(|| {
        let sel = Selector::parse(".product__price").unwrap();
        doc.select(&sel)
            .next()
            .map(|el| clean_price(&el.text().collect::<String>()))
    });

    // Price per kilo from the unit-price element or its data attribute.
    let unit_sel = Selector::parse(".product__unit-price").unwrap();
    if let Some(el) = doc.select(&unit_sel).next() {
        let text = squeeze_whitespace(&el.text().collect::<String>());
        let per_kg_re = Regex::new(r"€(\d+[.,]\d+)\s*/\s*(?:pro\s+)?kg").unwrap();
        details.price_per_kilo = match per_kg_re.captures(&text) {
            Some(cap) => Some(format!("€{}/kg", &cap[1])),
            None if !text.is_empty() => Some(text),
            None => None,
        };
    }
    if details.price_per_kilo.is_none() {
        let data_sel = Selector::parse("[data-unit-price]").unwrap();
        if let Some(el) = doc.select(&data_sel).next() {
            if let Some(cents) = el
                .value()
                .attr("data-unit-price")
                .and_then(|v| v.parse::<f64>().ok())
            {
                details.price_per_kilo = Some(format!("€{:.2}/kg", cents / 100.0));
            }
        }
    }

    // Badges, then sale-price comparison as a fallback offer.
    for sel_str in [
        ".product-badge",
        ".badge",
        ".sale-tag",
        ".card-badges__badge",
        ".discount-badge",
    ] {
        let sel = Selector::parse(sel_str).unwrap();
        if let Some(el) = doc.select(&sel).next() {
            let text = el.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                details.special_offer = Some(text);
                break;
            }
        }
    }
    if details.special_offer.is_none() {
        let compare_sel = Selector::parse(".product__price--compare, .price--compare").unwrap();
        if let Some(el) = doc.select(&compare_sel).next() {
            let compare = clean_price(&el.text().collect::<String>());
            if let Some(current) = details.price.as_deref() {
                if compare != current {
                    details.special_offer = Some(format!("Sale: Was {compare} now {current}"));
                }
            }
        }
    }

    // Description: meta tag, then visible description containers.
    let meta_sel = Selector::parse(r#"meta[name="description"]"#).unwrap();
    if let Some(el) = doc.select(&meta_sel).next() {
        if let Some(content) = el.value().attr("content") {
            let description = squeeze_whitespace(content).replace("&amp;", "&");
            if !description.is_empty() {
                details.description = Some(truncate(&description, 500));
            }
        }
    }
    if details.description.is_none() {
        for sel_str in [".product__description", ".product-single__description", ".rte"] {
            let sel = Selector::parse(sel_str).unwrap();
            if let Some(el) = doc.select(&sel).next() {
                let description = squeeze_whitespace(&el.text().collect::<String>());
                if !description.is_empty() {
                    details.description = Some(truncate(&description, 500));
                    break;
                }
            }
        }
    }

    details
}

/// Format one product for the knowledge-base document.
pub fn format_product(details: &ProductDetails, url: &str, full_text: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("PRODUCT: {}\n", details.full_name));
    out.push_str(&format!("URL: {url}\n"));
    out.push_str(&format!(
        "PRICE: {}\n",
        details.price.as_deref().unwrap_or("Price not available")
    ));
    if let Some(per_kilo) = &details.price_per_kilo {
        out.push_str(&format!("PRICE PER KILO: {per_kilo}\n"));
    }
    if let Some(offer) = &details.special_offer {
        out.push_str(&format!("SPECIAL OFFER: {offer}\n"));
    }
    out.push_str(&format!(
        "DESCRIPTION: {}\n",
        details.description.as_deref().unwrap_or_default()
    ));
    out.push_str(&format!("\nFULL CONTENT:\n{full_text}\n\n"));
    out
}

/// All visible text of a page, scripts/styles stripped, whitespace collapsed.
pub fn visible_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let chrome_sel = Selector::parse("script, style, noscript").unwrap();

    let mut cleaned = html.to_string();
    for el in doc.select(&chrome_sel) {
        let outer = el.html();
        cleaned = cleaned.replace(&outer, "");
    }

    let doc = Html::parse_document(&cleaned);
    let text = doc.root_element().text().collect::<Vec<_>>().join(" ");
    squeeze_whitespace(&text)
}

/// Clean a raw price string down to a `€…` amount.
pub fn clean_price(price_text: &str) -> String {
    let squeezed = squeeze_whitespace(price_text);
    if squeezed.is_empty() {
        return "Price not available".into();
    }

    // "Von €X" ranges: keep the from-price.
    let von_re = Regex::new(r"Von (€[\d,.]+)").unwrap();
    if let Some(cap) = von_re.captures(&squeezed) {
        return cap[1].to_string();
    }

    let price_re = Regex::new(r"(€[\d,.]+)").unwrap();
    if let Some(cap) = price_re.captures(&squeezed) {
        return cap[1].to_string();
    }

    squeezed
}

/// Known product types, matched against the lowercased full name.
const PRODUCT_TYPES: &[(&str, &str)] = &[
    ("burger patties", "Burger Patties"),
    ("ribeye", "Ribeye Steak"),
    ("rump", "Rump Steak"),
    ("flank", "Flank Steak"),
    ("tomahawk", "Tomahawk Steak"),
    ("t-bone", "T-Bone Steak"),
    ("tbone", "T-Bone Steak"),
    ("filet", "Filet Steak"),
    ("sirloin", "Sirloin Steak"),
    ("short ribs", "Short Ribs"),
    ("tafelspitz", "Tafelspitz"),
    ("picanha", "Picanha"),
    ("porterhouse", "Porterhouse Steak"),
    ("flat iron", "Flat Iron Steak"),
    ("osso buco", "Osso Buco"),
    ("brisket", "Brisket"),
    ("rinderbrust", "Rinderbrust"),
    ("hackfleisch", "Hackfleisch"),
    ("smashburger", "Smashburger"),
    ("chuck eye", "Chuck Eye Steak"),
    ("chuckeye", "Chuck Eye Steak"),
];

/// Marketing qualifiers stripped when no product type matches.
const QUALIFIERS: &[&str] = &[
    "black angus",
    "dry aged",
    "freiland",
    "premium",
    "mutterkuhaufzucht",
    "farm direkt",
    "bbq",
    "beef",
    "steak",
];

/// Reduce a full product name to its base name, e.g.
/// "Ribeye Steak Black Angus Dry Aged" → "Ribeye Steak".
pub fn base_name(full_name: &str) -> String {
    let lower = full_name.to_lowercase();

    for (needle, name) in PRODUCT_TYPES {
        if lower.contains(needle) {
            return (*name).to_string();
        }
    }

    let words: Vec<&str> = full_name.split_whitespace().collect();
    if words.len() <= 3 {
        return full_name.to_string();
    }

    let clean_words: Vec<&str> = words
        .iter()
        .copied()
        .filter(|word| {
            let lower_word = word.to_lowercase();
            !QUALIFIERS.iter().any(|q| q.contains(lower_word.as_str()) || lower_word.contains(q))
        })
        .collect();

    if clean_words.is_empty() {
        words[..2].join(" ")
    } else {
        clean_words[..clean_words.len().min(3)].join(" ")
    }
}

/// Derive a display name from the product URL slug.
fn name_from_url(url: &str) -> String {
    let slug = url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .split('?')
        .next()
        .unwrap_or_default();

    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn price_from_metadata(doc: &Html) -> Option<String> {
    // Open Graph price meta.
    let og_sel = Selector::parse(r#"meta[property="og:price:amount"]"#).unwrap();
    if let Some(el) = doc.select(&og_sel).next() {
        if let Some(amount) = el.value().attr("content") {
            if !amount.is_empty() {
                return Some(format!("€{amount}"));
            }
        }
    }

    // Embedded product JSON carries the price in cents.
    let json_sel = Selector::parse(r#"script[type="application/json"]"#).unwrap();
    for script in doc.select(&json_sel) {
        let raw = script.inner_html();
        if !raw.contains("\"price\"") {
            continue;
        }
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&raw) {
            if let Some(cents) = map.get("price").and_then(Value::as_f64) {
                return Some(format!("€{:.2}", cents / 100.0));
            }
        }
    }

    // Last resort: a price literal in any inline script.
    let script_sel = Selector::parse("script").unwrap();
    let price_re = Regex::new(r#""price"\s*:\s*(\d+[.,]\d+)"#).unwrap();
    for script in doc.select(&script_sel) {
        if let Some(cap) = price_re.captures(&script.inner_html()) {
            return Some(format!("€{}", &cap[1]));
        }
    }

    None
}

fn squeeze_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{cut}...")
    }
}
