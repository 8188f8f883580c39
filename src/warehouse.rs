use crate::errors::PipelineError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};

/// A bound statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    BigInt(Option<i64>),
    Double(Option<f64>),
    Text(Option<String>),
    Bool(Option<bool>),
    Timestamp(Option<DateTime<Utc>>),
    Json(serde_json::Value),
}

impl SqlValue {
    fn as_sql(&self) -> &(dyn ToSql + Sync) {
        match self {
            SqlValue::BigInt(v) => v,
            SqlValue::Double(v) => v,
            SqlValue::Text(v) => v,
            SqlValue::Bool(v) => v,
            SqlValue::Timestamp(v) => v,
            SqlValue::Json(v) => v,
        }
    }
}

/// The database side of the pipeline.
///
/// Statements run inside an implicit transaction that stays open until
/// [`Warehouse::commit`] is called. Dropping the warehouse without committing
/// discards whatever was written since the last commit.
#[async_trait]
pub trait Warehouse: Send {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, PipelineError>;

    async fn commit(&mut self) -> Result<(), PipelineError>;

    /// Run a query returning a single integer column.
    async fn read_ids(&mut self, sql: &str) -> Result<Vec<i64>, PipelineError>;
}

/// Tracks whether a transaction is open on the connection, and which
/// control statement the next write or commit has to issue.
#[derive(Debug, Default)]
struct TransactionState {
    open: bool,
}

impl TransactionState {
    fn begin_sql(&self) -> Option<&'static str> {
        (!self.open).then_some("BEGIN")
    }

    fn commit_sql(&self) -> Option<&'static str> {
        self.open.then_some("COMMIT")
    }

    fn opened(&mut self) {
        self.open = true;
    }

    fn closed(&mut self) {
        self.open = false;
    }
}

pub struct PgWarehouse {
    client: Client,
    transaction: TransactionState,
}

impl PgWarehouse {
    pub async fn connect(database_url: &str) -> Result<Self, PipelineError> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("Postgres connection error: {}", e);
            }
        });
        info!("Connected to warehouse");

        Ok(Self {
            client,
            transaction: TransactionState::default(),
        })
    }

    async fn begin_if_needed(&mut self) -> Result<(), PipelineError> {
        if let Some(begin) = self.transaction.begin_sql() {
            self.client.batch_execute(begin).await?;
            self.transaction.opened();
        }
        Ok(())
    }
}

#[async_trait]
impl Warehouse for PgWarehouse {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, PipelineError> {
        self.begin_if_needed().await?;
        let bound: Vec<&(dyn ToSql + Sync)> = params.iter().map(SqlValue::as_sql).collect();
        Ok(self.client.execute(sql, &bound).await?)
    }

    async fn commit(&mut self) -> Result<(), PipelineError> {
        if let Some(commit) = self.transaction.commit_sql() {
            self.client.batch_execute(commit).await?;
            self.transaction.closed();
            debug!("Committed");
        }
        Ok(())
    }

    async fn read_ids(&mut self, sql: &str) -> Result<Vec<i64>, PipelineError> {
        self.begin_if_needed().await?;
        let rows = self.client.query(sql, &[]).await?;
        rows.iter()
            .map(|row| row.try_get::<_, i64>(0).map_err(PipelineError::from))
            .collect()
    }
}
