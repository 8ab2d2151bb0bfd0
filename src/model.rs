use crate::error::AnalysisError;
use anyhow::{Context, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Resolved client configuration, injected into the backend client at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub api_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl AnalysisConfig {
    /// Strip trailing slashes so endpoint paths can be appended verbatim.
    fn base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn upload_url(&self) -> String {
        format!("{}/upload", self.base())
    }

    pub fn sample_csv_url(&self) -> String {
        format!("{}/sample-csv", self.base())
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Sector {
    #[default]
    General,
    Manufacturing,
    Retail,
    Services,
    Logistics,
}

impl Sector {
    pub const ALL: [Sector; 5] = [
        Sector::General,
        Sector::Manufacturing,
        Sector::Retail,
        Sector::Services,
        Sector::Logistics,
    ];

    /// Value sent in the `industry` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Sector::General => "General",
            Sector::Manufacturing => "Manufacturing",
            Sector::Retail => "Retail",
            Sector::Services => "Services",
            Sector::Logistics => "Logistics",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sector::General => "General Business",
            Sector::Manufacturing => "Manufacturing",
            Sector::Retail => "Retail & Trade",
            Sector::Services => "Professional Services",
            Sector::Logistics => "Logistics & Supply Chain",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// Value sent in the `lang` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Language::En => "English (Global)",
            Language::Hi => "Hindi (Regional)",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Hi,
            Language::Hi => Language::En,
        }
    }
}

/// A user-chosen statement file: original name plus its full content.
#[derive(Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    pub bytes: Bytes,
}

impl FileBlob {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk, keeping only its file name for the upload.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .with_context(|| format!("{} has no usable file name", path.display()))?;
        Ok(Self::new(name, bytes))
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

// Content can be megabytes; keep Debug output readable.
impl fmt::Debug for FileBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileBlob")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Snapshot of the selection taken when a submission starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub file: FileBlob,
    pub sector: Sector,
    pub language: Language,
}

/// A benchmarking figure; the backend sends either a formatted string ("40%") or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Figure {
    Text(String),
    Number(f64),
}

impl fmt::Display for Figure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Figure::Text(s) => f.write_str(s),
            Figure::Number(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmarking {
    pub status: String,
    pub current: Figure,
    pub industry: String,
    pub industry_avg: Figure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_profit: f64,
    pub benchmarking: Benchmarking,
    pub alerts: Vec<String>,
}

/// Payload returned by a successful `/upload`. Every field the views read is required,
/// so a body that deserializes is safe to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub metrics: Metrics,
    pub multilingual_summary: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Idle,
    Submitting,
}

/// The single outcome slot of a submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Outcome {
    #[default]
    Empty,
    // Box to keep the enum small next to the error variant.
    Analysed(Box<AnalysisResult>),
    Failed(AnalysisError),
}

/// Which screen the workflow is on, derived from status and outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    ViewingResult,
    ViewingError,
}

/// Events posted from the controller back to the presentation layer.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    AnalysisCompleted {
        outcome: std::result::Result<Box<AnalysisResult>, AnalysisError>,
    },
    Info(String),
}
