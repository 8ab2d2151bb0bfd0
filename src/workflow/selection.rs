use crate::model::{FileBlob, Language, Sector};

/// What the user has chosen so far. Guards against mutation during a submission live in
/// [`super::Workflow`], which knows the request status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub file: Option<FileBlob>,
    pub sector: Sector,
    pub language: Language,
}

impl SelectionState {
    pub(super) fn select_file(&mut self, blob: FileBlob) {
        self.file = Some(blob);
    }

    pub(super) fn set_sector(&mut self, sector: Sector) {
        self.sector = sector;
    }

    pub(super) fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub(super) fn clear_file(&mut self) {
        self.file = None;
    }

    pub(super) fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.name.as_str())
    }
}
