use super::Workflow;
use crate::backend::BackendClient;
use crate::error::{AnalysisError, WorkflowError};
use crate::model::{AnalysisRequest, AnalysisResult, RequestStatus};

impl Workflow {
    /// Synchronous half of a submission: validate, enter `Submitting`, clear the previous
    /// outcome and snapshot the request to send.
    ///
    /// With no file selected the validation error is stored and returned, and the status
    /// stays `Idle`. While a request is in flight the call is rejected with
    /// [`WorkflowError::Busy`] and nothing changes.
    pub fn begin_submit(&mut self) -> Result<AnalysisRequest, WorkflowError> {
        if self.status == RequestStatus::Submitting {
            tracing::debug!("submission ignored, a request is already in flight");
            return Err(WorkflowError::Busy);
        }

        let Some(file) = self.selection.file.clone() else {
            let err = AnalysisError::no_file_selected();
            self.outcome.store(Err(err.clone()));
            return Err(err.into());
        };

        self.status = RequestStatus::Submitting;
        self.outcome.clear();
        Ok(AnalysisRequest {
            file,
            sector: self.selection.sector,
            language: self.selection.language,
        })
    }

    /// Apply the outcome of the request started by [`Workflow::begin_submit`].
    /// Returns false when no request was in flight and the outcome was dropped.
    pub fn complete(&mut self, outcome: Result<Box<AnalysisResult>, AnalysisError>) -> bool {
        if self.status != RequestStatus::Submitting {
            tracing::warn!("dropping analysis outcome with no submission in flight");
            return false;
        }
        match &outcome {
            Ok(_) => tracing::debug!("submission completed"),
            Err(e) => tracing::debug!(error = ?e, "submission failed"),
        }
        self.outcome.store(outcome);
        self.status = RequestStatus::Idle;
        true
    }

    /// Run a whole submission against `client`. Backend and transport failures end up in
    /// the outcome slot; only a rejected start is returned as an error.
    pub async fn submit(&mut self, client: &BackendClient) -> Result<(), WorkflowError> {
        let request = self.begin_submit()?;
        let outcome = client.analyze(&request).await.map(Box::new);
        self.complete(outcome);
        Ok(())
    }
}
