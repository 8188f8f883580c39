use crate::errors::PipelineError;
use crate::jikan_client::HttpSession;
use crate::models::AnimeRecord;
use crate::page_fetcher::AnimePages;
use crate::warehouse::{SqlValue, Warehouse};
use chrono::Utc;
use log::{error, info};

const INSERT_STAGED_ANIME: &str = "
    INSERT INTO anime_stage.all_anime
        (id, title, status, rating, score,
         favorites, load_date, airing,
         aired_from, aired_to)
    VALUES
        ($1::bigint, $2::text, $3::text, $4::text, $5::float8,
         $6::bigint, $7::timestamptz, $8::boolean,
         $9::timestamptz, $10::timestamptz)
";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLoadReport {
    pub pages: usize,
    pub rows: u64,
}

/// Stage every anime of every page. The first failure, whether fetching a
/// page or inserting a row, stops the load. Nothing is committed here.
pub async fn add_anime<S, W>(
    pages: &mut AnimePages<'_, S>,
    warehouse: &mut W,
) -> Result<CatalogLoadReport, PipelineError>
where
    S: HttpSession + ?Sized,
    W: Warehouse + ?Sized,
{
    let mut report = CatalogLoadReport::default();

    while let Some(page) = pages.next().await {
        let page = page?;
        for anime in &page.data {
            warehouse
                .execute(INSERT_STAGED_ANIME, &staged_row(anime))
                .await
                .inspect_err(|e| error!("Error with database connection: {}", e))?;
            report.rows += 1;
        }
        report.pages += 1;
    }

    info!("Staged {} anime from {} pages", report.rows, report.pages);
    Ok(report)
}

fn staged_row(anime: &AnimeRecord) -> [SqlValue; 10] {
    [
        SqlValue::BigInt(Some(anime.mal_id)),
        SqlValue::Text(Some(anime.title.clone())),
        SqlValue::Text(anime.status.clone()),
        SqlValue::Text(anime.rating.clone()),
        SqlValue::Double(anime.score),
        SqlValue::BigInt(anime.favorites),
        SqlValue::Timestamp(Some(Utc::now())),
        SqlValue::Bool(Some(anime.airing)),
        SqlValue::Timestamp(anime.aired.from_utc()),
        SqlValue::Timestamp(anime.aired.to_utc()),
    ]
}
