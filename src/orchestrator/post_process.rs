//! Post-analysis processing: builds the audit record and runs configured exports.

use crate::export::{self, AuditRecord};
use crate::model::{AnalysisConfig, AnalysisResult, Language, Sector};
use std::path::Path;

/// Result of post-analysis processing, ready for presentation layers.
pub(crate) struct ProcessedAnalysis {
    pub record: AuditRecord,
    pub export_messages: Vec<String>,
}

/// Build the audit record for a completed analysis and write it to `export_json` if set.
/// Export failures are reported as messages, never as errors.
pub(crate) fn process_analysis(
    cfg: &AnalysisConfig,
    export_json: Option<&Path>,
    file_name: &str,
    sector: Sector,
    language: Language,
    result: &AnalysisResult,
) -> ProcessedAnalysis {
    let record = AuditRecord::new(cfg, file_name, sector, language, result.clone());

    let mut export_messages = Vec::new();
    if let Some(path) = export_json {
        match export::export_json(path, &record) {
            Ok(()) => export_messages.push(format!("Exported JSON: {}", path.display())),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "audit export failed");
                export_messages.push(format!("Export JSON failed: {e:#}"));
            }
        }
    }

    ProcessedAnalysis {
        record,
        export_messages,
    }
}
