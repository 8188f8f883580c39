use crate::catalog_loader::{add_anime, CatalogLoadReport};
use crate::config::PipelineConfig;
use crate::errors::PipelineError;
use crate::jikan_client::HttpSession;
use crate::page_fetcher::{generate_anime_list, get_page_count};
use crate::promotion::{clear_staging, insert_anime_scores_and_stats, refresh_views};
use crate::stats_loader::{get_anime_ids, upload_anime_stats, StatsUploadReport};
use crate::warehouse::Warehouse;
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub page_count: u32,
    pub catalog: CatalogLoadReport,
    pub stats: StatsUploadReport,
}

/// One full load cycle: stage the catalog, stage stats for known ids,
/// promote, refresh. Each step is committed before the next starts.
pub async fn run_pipeline<S, W>(
    config: &PipelineConfig,
    session: &S,
    warehouse: &mut W,
) -> Result<RunSummary, PipelineError>
where
    S: HttpSession + ?Sized,
    W: Warehouse + ?Sized,
{
    clear_staging(warehouse).await?;
    warehouse.commit().await?;

    let page_count = get_page_count(&config.anime_url(), session).await?;
    info!("Catalog has {} pages", page_count);

    let mut pages =
        generate_anime_list(session, &config.base_url, page_count, config.request_delay);
    let catalog = add_anime(&mut pages, warehouse).await?;
    warehouse.commit().await?;

    let ids = get_anime_ids(warehouse).await?;
    let stats = upload_anime_stats(
        &ids,
        warehouse,
        session,
        &config.base_url,
        config.stats_batch_size,
        config.commit_mode,
    )
    .await?;
    warehouse.commit().await?;

    insert_anime_scores_and_stats(warehouse).await?;
    warehouse.commit().await?;

    refresh_views(warehouse).await?;
    warehouse.commit().await?;

    Ok(RunSummary {
        page_count,
        catalog,
        stats,
    })
}
