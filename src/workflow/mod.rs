//! The upload/analysis state machine.
//!
//! `Workflow` owns the selection, the request status and the outcome slot, and enforces
//! which transitions are legal:
//!
//! ```text
//! Editing --submit(file)----> Submitting --ok----> ViewingResult
//! Editing --submit(no file)-> Editing (error)      \--err---> ViewingError
//! Viewing* --reset--> Editing          ViewingError --select_file--> Editing
//! ```
//!
//! It is owned by a single thread; the only suspension point is the request inside
//! [`Workflow::submit`], which can also be driven in two halves
//! ([`Workflow::begin_submit`] / [`Workflow::complete`]) when the request runs elsewhere.

mod dispatcher;
mod outcome;
mod selection;

pub use selection::SelectionState;

use crate::error::WorkflowError;
use crate::model::{FileBlob, Language, Outcome, Phase, RequestStatus, Sector};

#[derive(Debug)]
pub struct Workflow {
    selection: SelectionState,
    status: RequestStatus,
    outcome: Outcome,
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            selection: SelectionState::default(),
            status: RequestStatus::Idle,
            outcome: Outcome::Empty,
        }
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn is_submitting(&self) -> bool {
        self.status == RequestStatus::Submitting
    }

    pub fn phase(&self) -> Phase {
        if self.is_submitting() {
            return Phase::Submitting;
        }
        match &self.outcome {
            Outcome::Analysed(_) => Phase::ViewingResult,
            Outcome::Failed(e) if !e.is_validation() => Phase::ViewingError,
            _ => Phase::Editing,
        }
    }

    /// Replace the chosen file and clear any error. The file is frozen while a request
    /// is in flight.
    pub fn select_file(&mut self, blob: FileBlob) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        tracing::debug!(file = %blob.name, bytes = blob.size_bytes(), "file selected");
        self.selection.select_file(blob);
        self.outcome.clear_error();
        Ok(())
    }

    /// Always legal; an in-flight request already carries its own snapshot.
    pub fn set_sector(&mut self, sector: Sector) {
        self.selection.set_sector(sector);
    }

    pub fn set_language(&mut self, language: Language) {
        self.selection.set_language(language);
    }

    pub fn clear_file(&mut self) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.selection.clear_file();
        Ok(())
    }

    /// "New Audit": selection back to defaults and the outcome slot emptied.
    pub fn reset(&mut self) -> Result<(), WorkflowError> {
        self.ensure_idle()?;
        self.selection.reset();
        self.outcome.clear();
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), WorkflowError> {
        if self.is_submitting() {
            Err(WorkflowError::Busy)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendClient;
    use crate::error::{AnalysisError, FALLBACK_MESSAGE, NO_FILE_MESSAGE};
    use crate::test_support::{test_config, unreachable_base_url, StubBackend, HEALTHY_ANALYSIS_BODY};

    fn report() -> FileBlob {
        FileBlob::new("report.csv", &b"Type,Amount\nRevenue,500000\n"[..])
    }

    fn client_for(stub: &StubBackend) -> BackendClient {
        BackendClient::new(&test_config(&stub.base_url())).unwrap()
    }

    #[test]
    fn starts_editing_with_defaults() {
        let wf = Workflow::new();
        assert_eq!(wf.phase(), Phase::Editing);
        assert_eq!(wf.status(), RequestStatus::Idle);
        assert!(wf.outcome().is_empty());
        assert_eq!(wf.selection(), &SelectionState::default());
    }

    #[tokio::test]
    async fn submit_without_file_fails_locally() {
        let stub = StubBackend::start(200, HEALTHY_ANALYSIS_BODY).await;
        let mut wf = Workflow::new();

        let err = wf.submit(&client_for(&stub)).await.unwrap_err();

        assert_eq!(
            err,
            WorkflowError::Invalid(AnalysisError::no_file_selected())
        );
        assert_eq!(wf.status(), RequestStatus::Idle);
        assert_eq!(wf.phase(), Phase::Editing);
        assert_eq!(wf.outcome().error().unwrap().message(), NO_FILE_MESSAGE);
        assert_eq!(stub.hits(), 0);
    }

    #[tokio::test]
    async fn success_is_stored_without_error() {
        let stub = StubBackend::start(200, HEALTHY_ANALYSIS_BODY).await;
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();
        wf.set_sector(Sector::Manufacturing);
        wf.set_language(Language::En);

        wf.submit(&client_for(&stub)).await.unwrap();

        assert_eq!(stub.hits(), 1);
        assert_eq!(wf.phase(), Phase::ViewingResult);
        assert_eq!(wf.status(), RequestStatus::Idle);
        assert!(wf.outcome().error().is_none());
        let result = wf.outcome().result().unwrap();
        assert!(result.metrics.alerts.is_empty());
        assert_eq!(result.multilingual_summary, "Strong performance.");
        assert_eq!(
            stub.uploads()[0].industry.as_deref(),
            Some("Manufacturing")
        );
    }

    #[tokio::test]
    async fn rejection_stores_backend_detail() {
        let stub = StubBackend::start(400, r#"{"detail":"Unsupported file format"}"#).await;
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();

        wf.submit(&client_for(&stub)).await.unwrap();

        assert_eq!(wf.phase(), Phase::ViewingError);
        assert_eq!(wf.status(), RequestStatus::Idle);
        assert!(wf.outcome().result().is_none());
        assert_eq!(
            wf.outcome().error().unwrap().message(),
            "Unsupported file format"
        );
    }

    #[tokio::test]
    async fn unreachable_backend_stores_fallback() {
        let client = BackendClient::new(&test_config(&unreachable_base_url().await)).unwrap();
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();

        wf.submit(&client).await.unwrap();

        assert_eq!(wf.phase(), Phase::ViewingError);
        assert_eq!(wf.outcome().error().unwrap().message(), FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn timeout_ends_in_error_view_and_idle() {
        let stub = StubBackend::start_held(200, HEALTHY_ANALYSIS_BODY).await;
        let mut cfg = test_config(&stub.base_url());
        cfg.timeout = std::time::Duration::from_millis(300);
        let client = BackendClient::new(&cfg).unwrap();
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();

        wf.submit(&client).await.unwrap();

        assert_eq!(wf.phase(), Phase::ViewingError);
        assert_eq!(wf.status(), RequestStatus::Idle);
        assert!(matches!(
            wf.outcome().error(),
            Some(AnalysisError::Transport { .. })
        ));
        assert_eq!(wf.outcome().error().unwrap().message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn second_submit_is_rejected_while_in_flight() {
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();

        let request = wf.begin_submit().unwrap();
        assert_eq!(request.file.name, "report.csv");
        assert_eq!(wf.phase(), Phase::Submitting);

        assert_eq!(wf.begin_submit().unwrap_err(), WorkflowError::Busy);
        assert_eq!(wf.status(), RequestStatus::Submitting);
    }

    #[test]
    fn file_is_frozen_while_submitting() {
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();
        wf.begin_submit().unwrap();

        assert_eq!(
            wf.select_file(FileBlob::new("other.csv", &b""[..])),
            Err(WorkflowError::Busy)
        );
        assert_eq!(wf.clear_file(), Err(WorkflowError::Busy));
        assert_eq!(wf.reset(), Err(WorkflowError::Busy));
        assert_eq!(wf.selection().file_name(), Some("report.csv"));
    }

    #[test]
    fn parameter_changes_do_not_touch_the_in_flight_snapshot() {
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();
        wf.set_sector(Sector::Retail);
        let request = wf.begin_submit().unwrap();

        wf.set_sector(Sector::Logistics);
        wf.set_language(Language::Hi);

        assert_eq!(request.sector, Sector::Retail);
        assert_eq!(request.language, Language::En);
        assert_eq!(wf.selection().sector, Sector::Logistics);
    }

    #[test]
    fn new_submission_clears_the_previous_outcome() {
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();
        wf.begin_submit().unwrap();
        wf.complete(Err(AnalysisError::transport("boom")));
        assert_eq!(wf.phase(), Phase::ViewingError);

        wf.begin_submit().unwrap();
        assert!(wf.outcome().is_empty());
    }

    #[test]
    fn stray_completion_is_dropped() {
        let mut wf = Workflow::new();
        assert!(!wf.complete(Err(AnalysisError::transport("late"))));
        assert!(wf.outcome().is_empty());
    }

    #[test]
    fn reset_is_idempotent_from_viewing() {
        let result: crate::model::AnalysisResult =
            serde_json::from_str(HEALTHY_ANALYSIS_BODY).unwrap();
        for outcome in [Ok(Box::new(result)), Err(AnalysisError::transport("x"))] {
            let mut wf = Workflow::new();
            wf.select_file(report()).unwrap();
            wf.set_sector(Sector::Services);
            wf.set_language(Language::Hi);
            wf.begin_submit().unwrap();
            wf.complete(outcome);
            assert_ne!(wf.phase(), Phase::Editing);

            wf.reset().unwrap();
            let once = (wf.selection().clone(), wf.outcome().clone(), wf.phase());
            wf.reset().unwrap();
            let twice = (wf.selection().clone(), wf.outcome().clone(), wf.phase());

            assert_eq!(once, twice);
            assert_eq!(once.0, SelectionState::default());
            assert!(once.1.is_empty());
            assert_eq!(once.2, Phase::Editing);
        }
    }

    #[test]
    fn reselecting_a_file_clears_the_error() {
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();
        wf.begin_submit().unwrap();
        wf.complete(Err(AnalysisError::Request {
            status: 400,
            message: "Unsupported file format".into(),
        }));
        assert_eq!(wf.phase(), Phase::ViewingError);

        wf.select_file(FileBlob::new("fixed.xlsx", &b"PK"[..])).unwrap();

        assert_eq!(wf.phase(), Phase::Editing);
        assert!(wf.outcome().is_empty());
        assert_eq!(wf.selection().file_name(), Some("fixed.xlsx"));
    }

    #[test]
    fn reselecting_after_validation_error_clears_it() {
        let mut wf = Workflow::new();
        assert!(wf.begin_submit().is_err());
        assert!(wf.outcome().error().is_some());

        wf.select_file(report()).unwrap();
        assert!(wf.outcome().error().is_none());
    }

    #[test]
    fn clear_file_returns_to_no_selection() {
        let mut wf = Workflow::new();
        wf.select_file(report()).unwrap();
        wf.clear_file().unwrap();
        assert_eq!(wf.selection().file_name(), None);
        assert!(matches!(
            wf.begin_submit(),
            Err(WorkflowError::Invalid(AnalysisError::Validation { .. }))
        ));
    }
}
