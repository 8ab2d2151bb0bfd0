use crate::error::WorkflowError;
use crate::export::{self, AuditRecord};
use crate::model::{AnalysisConfig, AnalysisRequest, FileBlob, Phase, WorkflowEvent};
use crate::orchestrator::{self, UiCommand};
use crate::workflow::Workflow;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything the UI thread owns. No other thread touches it.
pub struct UiState {
    pub workflow: Workflow,
    pub info: String,
    /// File path being typed, when the path prompt is open.
    pub path_input: Option<String>,
    pub show_help: bool,
    pub config: AnalysisConfig,
    pub export_json: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub last_request: Option<AnalysisRequest>,
    pub last_record: Option<AuditRecord>,
    pub submitted_at: Option<Instant>,
    pub tick: usize,
}

impl UiState {
    pub fn new(config: AnalysisConfig, export_json: Option<PathBuf>, export_dir: PathBuf) -> Self {
        Self {
            workflow: Workflow::new(),
            info: "Press o to choose a financial statement".into(),
            path_input: None,
            show_help: false,
            config,
            export_json,
            export_dir,
            last_request: None,
            last_record: None,
            submitted_at: None,
            tick: 0,
        }
    }

    pub fn sample_url(&self) -> String {
        self.config.sample_csv_url()
    }

    /// Load `path` from disk and make it the selected file.
    pub fn load_file(&mut self, path: &Path) {
        let blob = match FileBlob::from_path(path) {
            Ok(b) => b,
            Err(e) => {
                self.info = format!("Could not open file: {e:#}");
                return;
            }
        };
        let (name, size) = (blob.name.clone(), blob.size_bytes());
        match self.workflow.select_file(blob) {
            Ok(()) => self.info = format!("Selected {name} ({size} bytes)"),
            Err(e) => self.info = e.to_string(),
        }
    }

    /// Map one key press to state changes, returning a command for the controller if
    /// the key produced one.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(UiCommand::Quit);
        }

        if self.path_input.is_some() {
            self.handle_path_key(key);
            return None;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.show_help = false;
            } else if key.code == KeyCode::Char('q') {
                return Some(UiCommand::Quit);
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') => return Some(UiCommand::Quit),
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Right | KeyCode::Char('s') => {
                let next = self.workflow.selection().sector.next();
                self.workflow.set_sector(next);
            }
            KeyCode::Left | KeyCode::Char('S') => {
                let prev = self.workflow.selection().sector.prev();
                self.workflow.set_sector(prev);
            }
            KeyCode::Char('l') => {
                let lang = self.workflow.selection().language.toggle();
                self.workflow.set_language(lang);
            }
            _ => return self.handle_phase_key(key),
        }
        None
    }

    fn handle_phase_key(&mut self, key: KeyEvent) -> Option<UiCommand> {
        match (self.workflow.phase(), key.code) {
            (Phase::Submitting, KeyCode::Enter) => {
                self.info = "Analysis in progress…".into();
            }
            (Phase::Submitting, KeyCode::Char('o' | 'x' | 'n')) => {
                self.info = WorkflowError::Busy.to_string();
            }
            (Phase::Editing | Phase::ViewingError, KeyCode::Char('o')) => {
                self.path_input = Some(String::new());
                self.info = "Type a path, Enter to load, Esc to cancel".into();
            }
            (Phase::Editing | Phase::ViewingError, KeyCode::Char('x')) => {
                if self.workflow.clear_file().is_ok() {
                    self.info = "File cleared".into();
                }
            }
            (Phase::Editing | Phase::ViewingError, KeyCode::Enter) => return self.submit(),
            (_, KeyCode::Char('n')) => match self.workflow.reset() {
                Ok(()) => {
                    self.last_request = None;
                    self.last_record = None;
                    self.info = "New audit".into();
                }
                Err(e) => self.info = e.to_string(),
            },
            (Phase::ViewingResult, KeyCode::Char('e')) => self.export_current(),
            _ => {}
        }
        None
    }

    fn handle_path_key(&mut self, key: KeyEvent) {
        let Some(input) = self.path_input.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => {
                self.path_input = None;
                self.info = "Cancelled".into();
            }
            KeyCode::Enter => {
                let raw = self.path_input.take().unwrap_or_default();
                let raw = raw.trim();
                if raw.is_empty() {
                    self.info = "No path entered".into();
                } else {
                    self.load_file(Path::new(raw));
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self) -> Option<UiCommand> {
        match self.workflow.begin_submit() {
            Ok(request) => {
                self.last_request = Some(request.clone());
                self.last_record = None;
                self.submitted_at = Some(Instant::now());
                self.info = "Performing AI audit…".into();
                Some(UiCommand::Submit(request))
            }
            Err(e) => {
                self.info = e.to_string();
                None
            }
        }
    }

    fn export_current(&mut self) {
        let Some(record) = self.last_record.as_ref() else {
            self.info = "No completed analysis to export yet.".into();
            return;
        };
        let path = self.export_dir.join(record.default_file_name());
        self.info = match export::export_json(&path, record) {
            Ok(()) => format!("Exported JSON: {}", path.display()),
            Err(e) => format!("JSON export failed: {e:#}"),
        };
    }

    pub fn apply_event(&mut self, ev: WorkflowEvent) {
        match ev {
            WorkflowEvent::Info(msg) => self.info = msg,
            WorkflowEvent::AnalysisCompleted { outcome } => {
                if !self.workflow.complete(outcome) {
                    return;
                }
                let elapsed = self
                    .submitted_at
                    .take()
                    .map(|t| t.elapsed().as_secs_f64())
                    .unwrap_or_default();
                self.handle_completed(elapsed);
            }
        }
    }

    fn handle_completed(&mut self, elapsed_secs: f64) {
        let (Some(result), Some(req)) = (
            self.workflow.outcome().result(),
            self.last_request.as_ref(),
        ) else {
            if let Some(e) = self.workflow.outcome().error() {
                self.info = format!("Analysis failed: {}", e.message());
            }
            return;
        };

        let processed = orchestrator::process_analysis(
            &self.config,
            self.export_json.as_deref(),
            &req.file.name,
            req.sector,
            req.language,
            result,
        );
        self.last_record = Some(processed.record);
        self.info = if processed.export_messages.is_empty() {
            format!("Analysis complete ({elapsed_secs:.1}s)")
        } else {
            processed.export_messages.join("; ")
        };
    }
}
