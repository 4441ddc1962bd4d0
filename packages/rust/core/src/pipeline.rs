//! End-to-end sync pass: extract → detect → publish → bind, one unit at
//! a time.
//!
//! Each unit is processed fully before the next begins, and each is
//! wrapped so one unit's failure never aborts the pass — the summary
//! carries the per-unit errors instead.

use tracing::{info, instrument, warn};
use url::Url;

use storesync_cache::ContentCache;
use storesync_commerce::{OrdersClient, format_orders};
use storesync_kb::{AgentBinder, KnowledgeBaseClient, Synchronizer};
use storesync_scrape::{Fetcher, scrape_faq, scrape_legal, scrape_products};
use storesync_shared::{
    AppConfig, ContentUnit, PageKind, Result, RunSummary, StoresyncError, SyncOptions, UnitSource,
};

/// Everything a sync pass needs. Constructed once at startup and reused
/// across scheduled passes; no component reads process-wide state.
pub struct SyncContext {
    pub config: AppConfig,
    pub options: SyncOptions,
    pub cache: ContentCache,
    pub fetcher: Fetcher,
    pub kb: KnowledgeBaseClient,
    /// Present only when the orders unit is enabled.
    pub orders: Option<OrdersClient>,
}

/// Build the configured content-unit list for one pass.
pub fn build_units(config: &AppConfig, options: &SyncOptions) -> Vec<ContentUnit> {
    let base = config.storefront.base_url.trim_end_matches('/');
    let mut units = Vec::new();

    if config.storefront.sync_faq {
        units.push(ContentUnit::page(
            "faq",
            format!("{base}{}", config.storefront.faq_path),
            PageKind::Faq,
        ));
    }

    for page in &config.storefront.legal_pages {
        units.push(ContentUnit::page(
            page.unit.clone(),
            format!("{base}{}", page.path),
            PageKind::Legal,
        ));
    }

    if config.storefront.sync_products {
        units.push(ContentUnit::catalog(
            format!("{base}{}", config.storefront.catalog_path),
            options.max_catalog_pages,
        ));
    }

    if config.commerce.enabled {
        units.push(ContentUnit::orders(options.order_days, options.order_limit));
    }

    units
}

/// Run one full sync pass over all configured units.
pub async fn run_once(ctx: &SyncContext) -> RunSummary {
    let units = build_units(&ctx.config, &ctx.options);
    info!(units = units.len(), "starting sync pass");

    let mut summary = RunSummary::default();
    for unit in &units {
        let outcome = process_unit(ctx, unit).await;
        if let Err(e) = &outcome {
            warn!(unit = %unit.name, error = %e, "unit failed");
        }
        summary.record(&unit.name, outcome.map_err(|e| e.to_string()));
    }

    info!(
        updated = summary.updated,
        total = summary.total,
        failures = summary.failures.len(),
        "sync pass completed"
    );
    summary
}

/// Process one unit. Returns whether it was republished.
#[instrument(skip_all, fields(unit = %unit.name))]
async fn process_unit(ctx: &SyncContext, unit: &ContentUnit) -> Result<bool> {
    let content = produce_content(ctx, unit).await?;

    if !ctx.cache.has_changed(&unit.name, &content) {
        info!("no changes detected, skipping publish");
        return Ok(false);
    }

    let outcome = Synchronizer::new(&ctx.kb)
        .sync(&unit.name, &content, ctx.options.force)
        .await?;

    if let Some(agent_id) = &ctx.config.knowledge_base.agent_id {
        // A failed bind leaves the fingerprint unpersisted: the published
        // document stays live, and the next pass re-publishes and
        // re-binds (delete + upload are idempotent, so the retry is safe).
        AgentBinder::new(&ctx.kb)
            .bind_document(agent_id, &outcome.document_id, &unit.name)
            .await?;
    }

    ctx.cache.persist(&unit.name, &content)?;
    info!(
        document_id = %outcome.document_id,
        replaced = outcome.replaced,
        "unit published"
    );
    Ok(true)
}

/// Extract a unit's fresh content from its source.
async fn produce_content(ctx: &SyncContext, unit: &ContentUnit) -> Result<String> {
    match &unit.source {
        UnitSource::Page {
            url,
            kind: PageKind::Faq,
        } => scrape_faq(&ctx.fetcher, url).await,
        UnitSource::Page {
            url,
            kind: PageKind::Legal,
        } => scrape_legal(&ctx.fetcher, url).await,
        UnitSource::Catalog { url, max_pages } => {
            let catalog = Url::parse(url).map_err(|e| {
                StoresyncError::validation(format!("invalid catalog URL {url}: {e}"))
            })?;
            scrape_products(&ctx.fetcher, &catalog, *max_pages).await
        }
        UnitSource::Orders { days, limit } => {
            let client = ctx.orders.as_ref().ok_or_else(|| {
                StoresyncError::Commerce(
                    "orders unit enabled but no commerce client configured".into(),
                )
            })?;
            let orders = client.list_orders(*limit, *days, "any").await?;
            Ok(format_orders(&orders))
        }
    }
}
