//! EBI Clustal Omega job client.
//!
//! Endpoint: https://www.ebi.ac.uk/Tools/services/rest/clustalo
//!
//! A job is submitted with `run`, polled with `status/{job}` and collected
//! from `result/{job}/aln-fasta` and `result/{job}/phylotree`.

use std::time::Duration;

use biostructx_common::HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{join_url, Result, SourceError};

const SERVICE: &str = "Clustal Omega";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Finished,
    Failed,
}

impl JobStatus {
    pub fn parse(text: &str) -> Self {
        match text.trim() {
            "FINISHED" => Self::Finished,
            "ERROR" | "FAILURE" | "NOT_FOUND" => Self::Failed,
            _ => Self::Running,
        }
    }
}

/// Outputs of a finished alignment job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignmentOutput {
    pub job_id: String,
    /// Aligned sequences in FASTA format.
    pub alignment: String,
    /// Guide tree in Newick format; may be empty.
    pub tree: String,
}

impl AlignmentOutput {
    /// Clustal Omega returns `""` or `"()"` when no tree could be built.
    pub fn tree_is_empty(&self) -> bool {
        matches!(self.tree.trim(), "" | "()" | "();")
    }
}

#[derive(Debug, Clone)]
pub struct ClustaloClient {
    http: HttpClient,
    base_url: String,
    email: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl ClustaloClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            email: email.into(),
            poll_interval: Duration::from_secs(3),
            max_polls: 100,
        }
    }

    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    /// Submit sequences and return the job id.
    #[instrument(skip(self, fasta))]
    pub async fn submit(&self, fasta: &str) -> Result<String> {
        let url = join_url(&self.base_url, "run");
        let resp = self
            .http
            .post(&url)?
            .form(&[
                ("email", self.email.as_str()),
                ("sequence", fasta),
                ("stype", "protein"),
                ("outfmt", "fa"),
                ("guidetreeout", "true"),
                ("dealign", "true"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(SourceError::Job {
                service: SERVICE,
                message: format!("submission rejected (HTTP {}): {}", status.as_u16(), body.trim()),
            });
        }
        let job_id = body.trim().to_string();
        info!(job_id = %job_id, "Submitted Clustal Omega job");
        Ok(job_id)
    }

    pub async fn status(&self, job_id: &str) -> Result<JobStatus> {
        let url = join_url(&self.base_url, &format!("status/{}", job_id));
        let resp = self.http.get(&url)?.send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status { service: SERVICE, status: resp.status().as_u16() });
        }
        Ok(JobStatus::parse(&resp.text().await?))
    }

    async fn result(&self, job_id: &str, kind: &str) -> Result<String> {
        let url = join_url(&self.base_url, &format!("result/{}/{}", job_id, kind));
        let resp = self.http.get(&url)?.send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status { service: SERVICE, status: resp.status().as_u16() });
        }
        Ok(resp.text().await?)
    }

    /// Submit, poll until finished, and collect alignment and tree.
    #[instrument(skip(self, fasta))]
    pub async fn align(&self, fasta: &str) -> Result<AlignmentOutput> {
        let job_id = self.submit(fasta).await?;

        let mut polls = 0;
        loop {
            match self.status(&job_id).await? {
                JobStatus::Finished => break,
                JobStatus::Failed => {
                    return Err(SourceError::Job {
                        service: SERVICE,
                        message: format!("job {} failed", job_id),
                    });
                }
                JobStatus::Running => {
                    polls += 1;
                    if polls >= self.max_polls {
                        return Err(SourceError::Job {
                            service: SERVICE,
                            message: format!("job {} did not finish after {} polls", job_id, polls),
                        });
                    }
                    debug!(job_id = %job_id, polls, "Job still running");
                    tokio::time::sleep(self.poll_interval).await;
                }
            }
        }

        let alignment = self.result(&job_id, "aln-fasta").await?;
        let tree = self.result(&job_id, "phylotree").await.unwrap_or_else(|e| {
            warn!(job_id = %job_id, error = %e, "Guide tree unavailable");
            String::new()
        });

        Ok(AlignmentOutput { job_id, alignment, tree })
    }
}
