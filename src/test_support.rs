//! In-memory stand-ins for the HTTP session and the warehouse.

use crate::errors::PipelineError;
use crate::jikan_client::{HttpResponse, HttpSession};
use crate::warehouse::{SqlValue, Warehouse};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct ScriptedSession {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.responses.insert(
            url.into(),
            HttpResponse {
                status,
                body: body.into(),
            },
        );
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpSession for ScriptedSession {
    async fn get(&self, url: &str) -> Result<HttpResponse, PipelineError> {
        self.requests.lock().unwrap().push(url.to_string());
        Ok(self.responses.get(url).cloned().unwrap_or(HttpResponse {
            status: 404,
            body: r#"{"status": 404, "type": "BadResponseException"}"#.to_string(),
        }))
    }
}

/// A page body in the shape the `/anime` endpoint returns.
pub fn page_body(last_visible_page: u32, ids: &[i64]) -> String {
    let data: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "mal_id": id,
                "title": format!("Anime {id}"),
                "status": "Finished Airing",
                "rating": "PG-13 - Teens 13 or older",
                "score": 7.5,
                "favorites": id * 10,
                "airing": false,
                "aired": {"from": "2001-04-01T00:00:00+00:00", "to": null}
            })
        })
        .collect();

    serde_json::json!({
        "pagination": {"last_visible_page": last_visible_page, "has_next_page": false},
        "data": data
    })
    .to_string()
}

pub fn stats_body(id: i64) -> String {
    serde_json::json!({
        "data": {"watching": id, "completed": 2, "total": id + 2, "scores": []}
    })
    .to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Execute { sql: String, params: Vec<SqlValue> },
    Commit,
}

/// Records everything the pipeline asks of the database and keeps a row
/// count for the staging summary table.
#[derive(Default)]
pub struct RecordingWarehouse {
    pub events: Vec<Event>,
    pub staged_rows: usize,
    pub ids: Vec<i64>,
    fail_on_insert: Option<usize>,
    inserts: usize,
}

impl RecordingWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(ids: Vec<i64>) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    /// Fail the `n`th INSERT (1-based).
    pub fn failing_on_insert(n: usize) -> Self {
        Self {
            fail_on_insert: Some(n),
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Execute { sql, .. } => Some(sql.as_str()),
                Event::Commit => None,
            })
            .collect()
    }

    pub fn commits(&self) -> usize {
        self.events.iter().filter(|e| **e == Event::Commit).count()
    }

    /// The first parameter of every statement matching `prefix`, in order.
    pub fn inserted_ids(&self, prefix: &str) -> Vec<i64> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Execute { sql, params } if sql.trim_start().starts_with(prefix) => {
                    match params.first() {
                        Some(SqlValue::BigInt(Some(id))) => Some(*id),
                        _ => None,
                    }
                }
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl Warehouse for RecordingWarehouse {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, PipelineError> {
        let statement = sql.trim_start();
        if statement.starts_with("INSERT") {
            self.inserts += 1;
            if Some(self.inserts) == self.fail_on_insert {
                return Err(PipelineError::PersistenceError(
                    "duplicate key value violates unique constraint".into(),
                ));
            }
            if statement.starts_with("INSERT INTO anime_stage.all_anime") {
                self.staged_rows += 1;
            }
        } else if statement.starts_with("TRUNCATE TABLE anime_stage.all_anime") {
            self.staged_rows = 0;
        }

        self.events.push(Event::Execute {
            sql: statement.to_string(),
            params: params.to_vec(),
        });
        Ok(1)
    }

    async fn commit(&mut self) -> Result<(), PipelineError> {
        self.events.push(Event::Commit);
        Ok(())
    }

    async fn read_ids(&mut self, _sql: &str) -> Result<Vec<i64>, PipelineError> {
        Ok(self.ids.clone())
    }
}
