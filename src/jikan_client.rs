use crate::errors::PipelineError;
use async_trait::async_trait;
use log::info;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Status code and raw body of a single GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, PipelineError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// The HTTP side of the pipeline. Only transport failures are errors;
/// any status code comes back as a response.
#[async_trait]
pub trait HttpSession: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, PipelineError>;
}

pub struct JikanClient {
    client: Client,
    stats: JikanClientStats,
}

#[derive(Default)]
struct JikanClientStats {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
}

impl JikanClient {
    /// Build the client. With no `timeout`, requests wait as long as the
    /// server takes.
    pub fn new_http(timeout: Option<Duration>) -> Result<Self, PipelineError> {
        let mut builder = Client::builder().default_headers(Self::default_headers());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            stats: JikanClientStats::default(),
        })
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("anime-etl/0.1"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn record(&self, success: bool) {
        self.stats.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.stats.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.stats.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Log total, successful (HTTP 200) and failed requests so far.
    pub fn log_stats(&self) {
        info!(
            "Total Requests: {}, Successful: {}, Failed: {}",
            self.stats.total_requests.load(Ordering::Relaxed),
            self.stats.successful_requests.load(Ordering::Relaxed),
            self.stats.failed_requests.load(Ordering::Relaxed)
        );
    }
}

#[async_trait]
impl HttpSession for JikanClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, PipelineError> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                self.record(false);
                return Err(e.into());
            }
        };

        let status = response.status().as_u16();
        let body = response.text().await.inspect_err(|_| self.record(false))?;
        self.record(status == 200);
        Ok(HttpResponse { status, body })
    }
}
