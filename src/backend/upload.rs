use super::BackendClient;
use crate::error::AnalysisError;
use crate::model::{AnalysisRequest, AnalysisResult};
use reqwest::multipart::{Form, Part};

/// Content type for the file part, guessed from the extension the way a browser would.
fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => "text/csv",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

/// Build the `file` / `industry` / `lang` multipart body.
fn build_form(request: &AnalysisRequest) -> Result<Form, AnalysisError> {
    let file = Part::bytes(request.file.bytes.to_vec())
        .file_name(request.file.name.clone())
        .mime_str(mime_for(&request.file.name))
        .map_err(AnalysisError::transport)?;

    Ok(Form::new()
        .part("file", file)
        .text("industry", request.sector.as_str())
        .text("lang", request.language.as_str()))
}

pub(super) async fn submit_statement(
    client: &BackendClient,
    request: &AnalysisRequest,
) -> Result<AnalysisResult, AnalysisError> {
    let url = client.config().upload_url();
    let form = build_form(request)?;

    tracing::info!(
        file = %request.file.name,
        bytes = request.file.size_bytes(),
        industry = request.sector.as_str(),
        lang = request.language.as_str(),
        "submitting statement for analysis"
    );

    let resp = client
        .http
        .post(&url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, %url, "analysis request did not complete");
            AnalysisError::transport(e)
        })?;

    let status = resp.status();
    if !status.is_success() {
        // The body is only a hint here; an unreadable one still yields a request error.
        let body = resp.bytes().await.unwrap_or_default();
        let err = AnalysisError::from_failure_body(status.as_u16(), &body);
        tracing::warn!(status = status.as_u16(), reason = %err, "analysis rejected by backend");
        return Err(err);
    }

    let body = resp.bytes().await.map_err(|e| {
        tracing::warn!(error = %e, "failed to read analysis response body");
        AnalysisError::transport(e)
    })?;

    let result: AnalysisResult = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "analysis response does not match the expected shape");
        AnalysisError::transport(format!("invalid response body: {e}"))
    })?;

    tracing::info!(
        net_profit = result.metrics.net_profit,
        alerts = result.metrics.alerts.len(),
        benchmark = %result.metrics.benchmarking.status,
        "analysis received"
    );
    Ok(result)
}
