use thiserror::Error as ThisError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(ThisError, Debug)]
pub enum PipelineError {
    #[error("Fetch error: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("Unexpected status {status} from {url}")]
    StatusError { url: String, status: u16 },
    #[error("Decode error: {0}")]
    DecodeError(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    PersistenceError(BoxError),
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<tokio_postgres::Error> for PipelineError {
    fn from(err: tokio_postgres::Error) -> Self {
        PipelineError::PersistenceError(Box::new(err))
    }
}
