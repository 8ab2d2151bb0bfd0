//! HTTP client for the analysis backend.
//!
//! Owns the configured `reqwest::Client` and exposes the two calls the client needs:
//! the statement upload and the sample statement download.

mod sample;
mod upload;

use crate::error::AnalysisError;
use crate::model::{AnalysisConfig, AnalysisRequest, AnalysisResult};
use anyhow::{Context, Result};

pub(crate) use sample::download_sample;

#[derive(Clone)]
pub struct BackendClient {
    pub(crate) http: reqwest::Client,
    cfg: AnalysisConfig,
}

impl BackendClient {
    pub fn new(cfg: &AnalysisConfig) -> Result<Self> {
        reqwest::Url::parse(&cfg.upload_url())
            .with_context(|| format!("invalid api url: {}", cfg.api_url))?;

        // A whole-request timeout; expiry surfaces as a transport failure.
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            http,
            cfg: cfg.clone(),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.cfg
    }

    /// Upload one statement and return the validated analysis. Exactly one request is
    /// issued; there is no retry.
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> std::result::Result<AnalysisResult, AnalysisError> {
        upload::submit_statement(self, request).await
    }
}
