//! Audit record export.

use crate::model::{AnalysisConfig, AnalysisResult, Language, Sector};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// JSON snapshot of one successful analysis and the parameters that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp_utc: String,
    pub api_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub file_name: String,
    pub sector: Sector,
    pub language: Language,
    pub result: AnalysisResult,
}

impl AuditRecord {
    pub fn new(
        cfg: &AnalysisConfig,
        file_name: &str,
        sector: Sector,
        language: Language,
        result: AnalysisResult,
    ) -> Self {
        Self {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            api_url: cfg.api_url.clone(),
            timeout: cfg.timeout,
            file_name: file_name.to_string(),
            sector,
            language,
            result,
        }
    }

    /// File name used when exporting without an explicit path.
    pub fn default_file_name(&self) -> String {
        let stem = self
            .file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.file_name);
        format!(
            "sme-audit-{}-{}.json",
            stem,
            self.timestamp_utc.replace(':', "-").replace('T', "_")
        )
    }
}

pub fn export_json(path: &Path, record: &AuditRecord) -> Result<()> {
    let out = serde_json::to_string_pretty(record).context("serialize audit record")?;
    std::fs::write(path, out).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
