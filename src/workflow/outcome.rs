use crate::error::AnalysisError;
use crate::model::{AnalysisResult, Outcome};

impl Outcome {
    pub fn result(&self) -> Option<&AnalysisResult> {
        match self {
            Outcome::Analysed(r) => Some(r),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match self {
            Outcome::Failed(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    /// Replace whatever is stored; the other variant is dropped with it.
    pub(super) fn store(&mut self, value: Result<Box<AnalysisResult>, AnalysisError>) {
        *self = match value {
            Ok(r) => Outcome::Analysed(r),
            Err(e) => Outcome::Failed(e),
        };
    }

    /// Drop a stored error, leaving a stored result untouched.
    pub(super) fn clear_error(&mut self) {
        if matches!(self, Outcome::Failed(_)) {
            *self = Outcome::Empty;
        }
    }

    pub(super) fn clear(&mut self) {
        *self = Outcome::Empty;
    }
}
