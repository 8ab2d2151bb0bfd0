//! Request lifecycle controller.
//!
//! Owns the backend client and runs at most one analysis request at a time, posting each
//! outcome back to the presentation layer as a [`WorkflowEvent`].

use crate::backend::BackendClient;
use crate::error::AnalysisError;
use crate::model::{AnalysisRequest, AnalysisResult, WorkflowEvent};
use anyhow::Result;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Submit(AnalysisRequest),
    Quit,
}

type InFlight = JoinHandle<std::result::Result<AnalysisResult, AnalysisError>>;

fn start_request(client: &BackendClient, request: AnalysisRequest) -> InFlight {
    let client = client.clone();
    tokio::spawn(async move { client.analyze(&request).await })
}

/// Serve UI commands until `Quit` or until the command channel closes.
pub(crate) async fn run_controller(
    client: BackendClient,
    event_tx: UnboundedSender<WorkflowEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut in_flight: Option<InFlight> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Submit(request)) => {
                        if in_flight.is_some() {
                            // The UI gates submission on the workflow status; this only
                            // triggers if that gate is bypassed.
                            tracing::warn!("submit received while a request is in flight, ignoring");
                            let _ = event_tx.send(WorkflowEvent::Info(
                                "Analysis already in progress".into(),
                            ));
                            continue;
                        }
                        tracing::debug!(file = %request.file.name, "starting analysis request");
                        in_flight = Some(start_request(&client, request));
                    }
                    Some(UiCommand::Quit) | None => {
                        if in_flight.is_some() {
                            tracing::debug!("exiting with an analysis request still outstanding");
                        }
                        break;
                    }
                }
            }
            // Borrow the handle rather than taking it so a losing branch does not drop it.
            joined = async {
                match in_flight.as_mut() {
                    Some(h) => h.await,
                    None => futures::future::pending().await,
                }
            } => {
                in_flight = None;
                let outcome = match joined {
                    Ok(res) => res.map(Box::new),
                    Err(e) => {
                        tracing::warn!(error = %e, "analysis task failed");
                        Err(AnalysisError::transport(format!("analysis task failed: {e}")))
                    }
                };
                let _ = event_tx.send(WorkflowEvent::AnalysisCompleted { outcome });
            }
        }
    }

    Ok(())
}
