use crate::errors::PipelineError;
use crate::warehouse::Warehouse;
use log::info;

/// Empty the staging summary table.
pub async fn clear_staging<W: Warehouse + ?Sized>(warehouse: &mut W) -> Result<(), PipelineError> {
    warehouse
        .execute("TRUNCATE TABLE anime_stage.all_anime", &[])
        .await?;
    info!("Cleared anime_stage.all_anime");
    Ok(())
}

pub async fn refresh_views<W: Warehouse + ?Sized>(warehouse: &mut W) -> Result<(), PipelineError> {
    warehouse
        .execute("REFRESH MATERIALIZED VIEW anime.anime_stats_and_scores", &[])
        .await?;
    info!("Refreshed anime.anime_stats_and_scores");
    Ok(())
}

/// Move staged stats and scores into production via the stored procedures.
pub async fn insert_anime_scores_and_stats<W: Warehouse + ?Sized>(
    warehouse: &mut W,
) -> Result<(), PipelineError> {
    warehouse
        .execute("SELECT anime_stage.insert_anime_stats()", &[])
        .await?;
    warehouse
        .execute("SELECT anime_stage.insert_anime_scores()", &[])
        .await?;
    info!("Promoted staged stats and scores");
    Ok(())
}
