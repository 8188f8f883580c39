use crate::errors::PipelineError;
use crate::jikan_client::HttpSession;
use crate::models::StatsDocument;
use crate::warehouse::{SqlValue, Warehouse};
use chrono::Utc;
use log::{debug, error, info};
use std::fmt;
use std::str::FromStr;

const SELECT_ANIME_IDS: &str = "
    SELECT id::bigint
    FROM anime.all_anime
    GROUP BY id
";

const INSERT_STATS_SCORES: &str = "
    INSERT INTO anime_stage.anime_stats_scores
        (anime_id, scores, load_date)
    VALUES
        ($1::bigint, $2::jsonb, $3::timestamptz)
";

/// How the stats loader decides when to commit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BatchCommitMode {
    /// Commit and restart the window whenever an id comes back without
    /// stats, or when the position passes the batch size. The id sitting at
    /// the overflow position is not inserted.
    #[default]
    Legacy,
    /// Insert every id that has stats and commit after every `batch_size`
    /// processed ids, whether inserted or skipped.
    Strict,
}

impl FromStr for BatchCommitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown commit mode {other:?}, expected legacy or strict")),
        }
    }
}

impl fmt::Display for BatchCommitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => f.write_str("legacy"),
            Self::Strict => f.write_str("strict"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsUploadReport {
    pub processed: usize,
    pub inserted: usize,
    pub skipped: usize,
    /// Ids that had stats but landed on the overflow position.
    pub dropped: usize,
    pub commits: usize,
}

/// Fetch the statistics document for one anime. Any status other than 200
/// means there is nothing to load.
pub async fn get_anime_stats<S: HttpSession + ?Sized>(
    session: &S,
    base_url: &str,
    anime_id: i64,
) -> Result<Option<StatsDocument>, PipelineError> {
    let url = format!(
        "{}/anime/{}/statistics",
        base_url.trim_end_matches('/'),
        anime_id
    );
    let response = session.get(&url).await?;
    if !response.is_ok() {
        return Ok(None);
    }
    Ok(Some(response.json()?))
}

/// Every distinct anime id already promoted to production.
pub async fn get_anime_ids<W: Warehouse + ?Sized>(
    warehouse: &mut W,
) -> Result<Vec<i64>, PipelineError> {
    let ids = warehouse.read_ids(SELECT_ANIME_IDS).await?;
    debug!("Read {} anime ids", ids.len());
    Ok(ids)
}

/// Position counter for the commit window, starting at 1.
struct BatchWindow {
    next: usize,
    size: usize,
}

impl BatchWindow {
    fn new(size: usize) -> Self {
        Self { next: 1, size }
    }

    /// Take the next position.
    fn advance(&mut self) -> usize {
        let position = self.next;
        self.next += 1;
        position
    }

    fn contains(&self, position: usize) -> bool {
        (1..=self.size).contains(&position)
    }

    fn reset(&mut self) {
        self.next = 1;
    }
}

/// Fetch and stage statistics for each id. Inserts are committed in
/// windows according to `mode`; whatever is left in the last window is
/// the caller's to commit. An insert failure stops the upload.
pub async fn upload_anime_stats<S, W>(
    anime_ids: &[i64],
    warehouse: &mut W,
    session: &S,
    base_url: &str,
    batch_size: usize,
    mode: BatchCommitMode,
) -> Result<StatsUploadReport, PipelineError>
where
    S: HttpSession + ?Sized,
    W: Warehouse + ?Sized,
{
    let mut window = BatchWindow::new(batch_size);
    let mut report = StatsUploadReport::default();

    for &anime_id in anime_ids {
        let stats = get_anime_stats(session, base_url, anime_id).await?;
        let position = window.advance();
        report.processed += 1;

        match mode {
            BatchCommitMode::Legacy => match stats {
                Some(stats) if window.contains(position) => {
                    insert_stats(warehouse, anime_id, stats).await?;
                    report.inserted += 1;
                }
                stats => {
                    if stats.is_some() {
                        report.dropped += 1;
                    } else {
                        report.skipped += 1;
                    }
                    warehouse.commit().await?;
                    report.commits += 1;
                    window.reset();
                }
            },
            BatchCommitMode::Strict => {
                match stats {
                    Some(stats) => {
                        insert_stats(warehouse, anime_id, stats).await?;
                        report.inserted += 1;
                    }
                    None => report.skipped += 1,
                }
                if position >= window.size {
                    warehouse.commit().await?;
                    report.commits += 1;
                    window.reset();
                }
            }
        }
    }

    info!(
        "Stats upload ({}): processed {}, inserted {}, skipped {}, dropped {}, commits {}",
        mode, report.processed, report.inserted, report.skipped, report.dropped, report.commits
    );
    Ok(report)
}

async fn insert_stats<W: Warehouse + ?Sized>(
    warehouse: &mut W,
    anime_id: i64,
    stats: StatsDocument,
) -> Result<(), PipelineError> {
    let params = [
        SqlValue::BigInt(Some(anime_id)),
        SqlValue::Json(stats.data),
        SqlValue::Timestamp(Some(Utc::now())),
    ];
    warehouse
        .execute(INSERT_STATS_SCORES, &params)
        .await
        .inspect_err(|e| {
            error!(
                "Something happened with the connection, please check and try again: {}",
                e
            )
        })?;
    Ok(())
}
