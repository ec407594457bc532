//! Submission of campaign jobs to the external processing API.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use super::models::JobRequest;

/// Default per-request timeout.
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job API transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("job API returned status {status}")]
    Rejected { status: u16 },
}

/// Accepts jobs for asynchronous processing.
#[async_trait]
pub trait JobSubmitter: Send + Sync {
    /// `Ok(())` only if the job API accepted the job.
    async fn submit(&self, job: &JobRequest) -> Result<(), JobError>;
}

/// JSON-over-HTTP job API client.
#[derive(Debug, Clone)]
pub struct HttpJobClient {
    client: reqwest::Client,
    url: String,
}

impl HttpJobClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, JobError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl JobSubmitter for HttpJobClient {
    async fn submit(&self, job: &JobRequest) -> Result<(), JobError> {
        let response = self.client.post(&self.url).json(job).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(JobError::Rejected {
                status: status.as_u16(),
            })
        }
    }
}
