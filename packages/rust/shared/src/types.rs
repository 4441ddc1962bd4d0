//! Core domain types for Storesync content units.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ContentUnit
// ---------------------------------------------------------------------------

/// One named piece of publishable content, processed once per run.
///
/// The unit name keys the local cache files and the remote document name
/// (`{name}.txt`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentUnit {
    /// Stable unit name, e.g. `faq`, `legal_notice`, `products`, `orders`.
    pub name: String,
    /// Where the unit's content comes from.
    pub source: UnitSource,
}

impl ContentUnit {
    pub fn page(name: impl Into<String>, url: impl Into<String>, kind: PageKind) -> Self {
        Self {
            name: name.into(),
            source: UnitSource::Page {
                url: url.into(),
                kind,
            },
        }
    }

    pub fn catalog(url: impl Into<String>, max_pages: u32) -> Self {
        Self {
            name: "products".into(),
            source: UnitSource::Catalog {
                url: url.into(),
                max_pages,
            },
        }
    }

    pub fn orders(days: i64, limit: u32) -> Self {
        Self {
            name: "orders".into(),
            source: UnitSource::Orders { days, limit },
        }
    }
}

/// Source locator for a content unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitSource {
    /// A single storefront page.
    Page { url: String, kind: PageKind },
    /// The paginated product catalog.
    Catalog { url: String, max_pages: u32 },
    /// The commerce order feed.
    Orders { days: i64, limit: u32 },
}

/// Extraction strategy for a single storefront page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// FAQ page carrying JSON-LD question/answer data.
    Faq,
    /// Legal page (plain headings + paragraphs).
    Legal,
}

// ---------------------------------------------------------------------------
// RunSummary
// ---------------------------------------------------------------------------

/// Aggregate result of one full sync pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Units whose content changed and was republished.
    pub updated: usize,
    /// Units processed in total.
    pub total: usize,
    /// Per-unit failures (unit name, error message). Never aborts the run.
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    /// Record a processed unit outcome.
    pub fn record(&mut self, unit: &str, outcome: std::result::Result<bool, String>) {
        self.total += 1;
        match outcome {
            Ok(true) => self.updated += 1,
            Ok(false) => {}
            Err(message) => self.failures.push((unit.to_string(), message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_constructors() {
        let faq = ContentUnit::page("faq", "https://shop.example.com/pages/faq", PageKind::Faq);
        assert_eq!(faq.name, "faq");
        assert!(matches!(
            faq.source,
            UnitSource::Page {
                kind: PageKind::Faq,
                ..
            }
        ));

        let products = ContentUnit::catalog("https://shop.example.com/collections/all", 10);
        assert_eq!(products.name, "products");

        let orders = ContentUnit::orders(30, 50);
        assert!(matches!(
            orders.source,
            UnitSource::Orders { days: 30, limit: 50 }
        ));
    }

    #[test]
    fn summary_tallies_outcomes() {
        let mut summary = RunSummary::default();
        summary.record("faq", Ok(true));
        summary.record("legal_notice", Ok(false));
        summary.record("products", Err("fetch failed".into()));

        assert_eq!(summary.total, 3);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "products");
    }
}
