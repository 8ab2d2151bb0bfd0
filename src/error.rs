use thiserror::Error;

/// Shown whenever the backend gives no usable explanation of its own.
pub const FALLBACK_MESSAGE: &str = "Analysis failed. Please check your file format.";

/// Shown when `submit` is attempted with no statement selected.
pub const NO_FILE_MESSAGE: &str = "Please select a file first.";

/// Failures a submission can end in. All of them are shown to the user as a single
/// message; the variant only matters for logging and for deciding which screen to show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// Detected locally before any request is built.
    #[error("{message}")]
    Validation { message: String },
    /// The backend answered with a non-success status.
    #[error("{message}")]
    Request { status: u16, message: String },
    /// The request did not complete or its body could not be used.
    #[error("{}", FALLBACK_MESSAGE)]
    Transport { cause: String },
}

impl AnalysisError {
    pub fn no_file_selected() -> Self {
        AnalysisError::Validation {
            message: NO_FILE_MESSAGE.to_string(),
        }
    }

    pub fn transport(cause: impl std::fmt::Display) -> Self {
        AnalysisError::Transport {
            cause: cause.to_string(),
        }
    }

    /// Build a request error from a failure body, preferring its `detail` string.
    pub fn from_failure_body(status: u16, body: &[u8]) -> Self {
        let detail = serde_json::from_slice::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("detail")
                    .and_then(|d| d.as_str())
                    .map(|s| s.trim().to_string())
            })
            .filter(|s| !s.is_empty());
        AnalysisError::Request {
            status,
            message: detail.unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        }
    }

    /// The text the presentation layer displays.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, AnalysisError::Validation { .. })
    }
}

/// A workflow operation attempted in a state that does not allow it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("an analysis is already in progress")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] AnalysisError),
}
