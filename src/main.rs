use anime_etl::config::PipelineConfig;
use anime_etl::errors::PipelineError;
use anime_etl::jikan_client::JikanClient;
use anime_etl::pipeline::run_pipeline;
use anime_etl::warehouse::PgWarehouse;
use log::info;

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = PipelineConfig::from_env()?;
    info!(
        "Loading from {} (delay {:?}, stats batch {}, {} commits)",
        config.base_url, config.request_delay, config.stats_batch_size, config.commit_mode
    );

    let jikan_client = JikanClient::new_http(config.http_timeout)?;
    let mut warehouse = PgWarehouse::connect(&config.database_url).await?;

    let result = run_pipeline(&config, &jikan_client, &mut warehouse).await;
    jikan_client.log_stats();

    let summary = result?;
    info!(
        "Done: {} pages, {} anime staged, {} stats rows ({} skipped, {} dropped)",
        summary.catalog.pages,
        summary.catalog.rows,
        summary.stats.inserted,
        summary.stats.skipped,
        summary.stats.dropped
    );

    Ok(())
}
