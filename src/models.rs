use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;

/// One response from the paginated `/anime` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub data: Vec<AnimeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    pub last_visible_page: u32,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Only the pagination block, used when all that matters is the page count.
#[derive(Debug, Deserialize)]
pub(crate) struct PaginationEnvelope {
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimeRecord {
    pub mal_id: i64,
    pub title: String,
    pub status: Option<String>,
    pub rating: Option<String>,
    pub score: Option<f64>,
    pub favorites: Option<i64>,
    #[serde(default)]
    pub airing: bool,
    #[serde(default)]
    pub aired: Aired,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Aired {
    pub from: Option<DateTime<FixedOffset>>,
    pub to: Option<DateTime<FixedOffset>>,
}

impl Aired {
    pub fn from_utc(&self) -> Option<DateTime<Utc>> {
        self.from.map(|d| d.with_timezone(&Utc))
    }

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.to.map(|d| d.with_timezone(&Utc))
    }
}

/// Statistics for a single anime. The payload is stored as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsDocument {
    pub data: serde_json::Value,
}
