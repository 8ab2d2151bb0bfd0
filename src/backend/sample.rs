use super::BackendClient;
use anyhow::{Context, Result};
use std::path::Path;

/// Fetch the backend's sample statement and write it to `dest`. Returns the byte count.
pub(crate) async fn download_sample(client: &BackendClient, dest: &Path) -> Result<u64> {
    let url = client.config().sample_csv_url();
    tracing::info!(%url, "downloading sample statement");

    let resp = client
        .http
        .get(&url)
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .context("sample statement request rejected")?;
    let body = resp.bytes().await.context("read sample statement")?;

    std::fs::write(dest, &body).with_context(|| format!("write {}", dest.display()))?;
    Ok(body.len() as u64)
}
