//! Workflow Client: the single point of entry for calls to the external
//! shift-generation workflow service.
//!
//! No other module talks to the workflow API directly. The pipeline only sees
//! the [`ShiftGenerator`] trait.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

pub mod stream;

use stream::EventAccumulator;

const RESPONSE_MODE: &str = "streaming";

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Stream read error: {0}")]
    Stream(reqwest::Error),
}

/// Inputs of the generation workflow. Every field is plain text: lists are
/// pre-serialized JSON blocks and the calendar is one date per line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowInputs {
    pub target_month: String,
    pub calendar: String,
    pub employees: String,
    pub leave_requests: String,
    pub shift_patterns: String,
    pub constraints: String,
}

#[derive(Debug, Serialize)]
struct WorkflowRunRequest<'a> {
    inputs: &'a WorkflowInputs,
    response_mode: &'a str,
    user: &'a str,
}

/// Produces the raw generator text for a set of workflow inputs.
#[async_trait]
pub trait ShiftGenerator: Send + Sync {
    /// Fails fast when the generator cannot be called at all.
    fn ensure_configured(&self) -> Result<(), WorkflowError> {
        Ok(())
    }

    async fn generate(&self, inputs: &WorkflowInputs) -> Result<String, WorkflowError>;
}

/// HTTP client for the workflow service's streaming `workflows/run` endpoint.
#[derive(Clone)]
pub struct WorkflowClient {
    client: Client,
    api_url: Option<String>,
    api_key: Option<String>,
    user: String,
    generation_node_type: String,
}

impl WorkflowClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.workflow_timeout_secs))
                .build()
                .context("Failed to build HTTP client")?,
            api_url: config.workflow_api_url.clone(),
            api_key: config.workflow_api_key.clone(),
            user: config.workflow_user.clone(),
            generation_node_type: config.generation_node_type.clone(),
        })
    }

    fn endpoint(&self) -> Result<(String, &str), WorkflowError> {
        let url = self
            .api_url
            .as_deref()
            .ok_or(WorkflowError::NotConfigured("WORKFLOW_API_URL"))?;
        let key = self
            .api_key
            .as_deref()
            .ok_or(WorkflowError::NotConfigured("WORKFLOW_API_KEY"))?;
        Ok((format!("{url}/workflows/run"), key))
    }

    /// Runs the workflow in streaming mode and returns the accumulated text.
    /// Non-success statuses are returned as [`WorkflowError::Api`] with the body attached.
    pub async fn run_streaming(&self, inputs: &WorkflowInputs) -> Result<String, WorkflowError> {
        let (url, api_key) = self.endpoint()?;

        let request_body = WorkflowRunRequest {
            inputs,
            response_mode: RESPONSE_MODE,
            user: &self.user,
        };

        info!("Calling workflow API: {url}");
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!("Failed to read workflow error body: {e}");
                    String::new()
                }
            };
            warn!("Workflow API returned {}: {}", status, body);
            return Err(WorkflowError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let mut body = response.bytes_stream();
        let mut accumulator = EventAccumulator::new(self.generation_node_type.as_str());
        while let Some(chunk) = body.next().await {
            let chunk: Bytes = chunk.map_err(WorkflowError::Stream)?;
            accumulator.feed(&chunk);
        }

        debug!("Workflow stream finished after {} events", accumulator.events_seen());
        Ok(accumulator.finish())
    }
}

#[async_trait]
impl ShiftGenerator for WorkflowClient {
    fn ensure_configured(&self) -> Result<(), WorkflowError> {
        self.endpoint().map(|_| ())
    }

    async fn generate(&self, inputs: &WorkflowInputs) -> Result<String, WorkflowError> {
        self.run_streaming(inputs).await
    }
}
