//! Practice sheet: the question table shown after generation.
//!
//! Rows are keyed by practice number. A sheet built from freshly generated
//! questions is editable; a sheet loaded back from the server is read-only.
//! Export only runs with a non-empty selection.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use super::FlowError;
use crate::api::ApiClient;
use crate::api::types::{NoteId, PracticeItem, PracticeUpdate};
use crate::export::PracticeExporter;
use crate::notify::{Notice, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeField {
    Content,
    Result,
}

#[derive(Debug, Clone, Default)]
struct Edit {
    content: String,
    result: String,
}

#[derive(Debug, Clone)]
pub struct PracticeSheet {
    note_id: NoteId,
    items: Vec<PracticeItem>,
    editable: bool,
    selected: BTreeSet<u32>,
    editing: BTreeMap<u32, Edit>,
}

impl PracticeSheet {
    /// Sheet over questions that were just generated.
    #[must_use]
    pub fn from_generated(note_id: NoteId, items: Vec<PracticeItem>) -> Self {
        Self::build(note_id, items, true)
    }

    /// Load a note's saved questions. Failure is reported through `notifier`.
    ///
    /// # Errors
    ///
    /// Returns an error if the questions cannot be fetched.
    pub async fn load(api: &ApiClient, note_id: NoteId, notifier: &dyn Notifier) -> Result<Self, FlowError> {
        match api.fetch_practice(note_id).await {
            Ok(set) => Ok(Self::build(note_id, set.items, false)),
            Err(e) => {
                tracing::error!(error = %e, note_id, "practice fetch failed");
                notifier.notify(Notice::error("Failed to load the questions."));
                Err(e.into())
            }
        }
    }

    fn build(note_id: NoteId, items: Vec<PracticeItem>, editable: bool) -> Self {
        Self { note_id, items, editable, selected: BTreeSet::new(), editing: BTreeMap::new() }
    }

    #[must_use]
    pub fn note_id(&self) -> NoteId {
        self.note_id
    }

    #[must_use]
    pub fn items(&self) -> &[PracticeItem] {
        &self.items
    }

    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    fn position(&self, number: u32) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.practice_number == number)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn is_selected(&self, number: u32) -> bool {
        self.selected.contains(&number)
    }

    /// True when there is at least one row and every row is selected.
    #[must_use]
    pub fn is_all_selected(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|item| self.selected.contains(&item.practice_number))
    }

    /// # Errors
    ///
    /// Returns an error if no row has this practice number.
    pub fn toggle_select(&mut self, number: u32) -> Result<bool, FlowError> {
        if self.position(number).is_none() {
            return Err(FlowError::NoSuchQuestion(number));
        }
        if self.selected.remove(&number) {
            return Ok(false);
        }
        self.selected.insert(number);
        Ok(true)
    }

    /// Mark one row selected; selecting it again leaves it selected.
    ///
    /// # Errors
    ///
    /// Returns an error if no row has this practice number.
    pub fn select(&mut self, number: u32) -> Result<(), FlowError> {
        if self.position(number).is_none() {
            return Err(FlowError::NoSuchQuestion(number));
        }
        self.selected.insert(number);
        Ok(())
    }

    /// Select every row, or clear the selection when every row is already selected.
    pub fn select_all(&mut self) {
        if self.is_all_selected() {
            self.selected.clear();
        } else {
            self.selected = self
                .items
                .iter()
                .map(|item| item.practice_number)
                .collect();
        }
    }

    /// Selected rows in table order.
    #[must_use]
    pub fn selected_items(&self) -> Vec<PracticeItem> {
        self.items
            .iter()
            .filter(|item| self.selected.contains(&item.practice_number))
            .cloned()
            .collect()
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn is_editing(&self, number: u32) -> bool {
        self.editing.contains_key(&number)
    }

    /// Enter edit mode for one row, seeding the edit with its current values.
    ///
    /// # Errors
    ///
    /// Returns an error if the sheet is read-only or the row does not exist.
    pub fn begin_edit(&mut self, number: u32) -> Result<(), FlowError> {
        if !self.editable {
            return Err(FlowError::ReadOnly);
        }
        let index = self
            .position(number)
            .ok_or(FlowError::NoSuchQuestion(number))?;
        let item = &self.items[index];
        self.editing.insert(
            number,
            Edit { content: item.content.clone(), result: item.result.clone() },
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the row is not in edit mode.
    pub fn set_field(&mut self, number: u32, field: PracticeField, value: impl Into<String>) -> Result<(), FlowError> {
        let edit = self
            .editing
            .get_mut(&number)
            .ok_or(FlowError::NotEditing(number))?;
        match field {
            PracticeField::Content => edit.content = value.into(),
            PracticeField::Result => edit.result = value.into(),
        }
        Ok(())
    }

    /// Send the edit and leave edit mode. Blank fields keep the original value.
    /// On failure the row stays in edit mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the row is not being edited or the update fails.
    pub async fn commit_edit(&mut self, api: &ApiClient, number: u32) -> Result<(), FlowError> {
        let edit = self
            .editing
            .get(&number)
            .cloned()
            .ok_or(FlowError::NotEditing(number))?;
        let index = self
            .position(number)
            .ok_or(FlowError::NoSuchQuestion(number))?;
        let original = &self.items[index];

        let update = PracticeUpdate {
            practice_number: number,
            content: or_original(edit.content, &original.content),
            additional_results: Vec::new(),
            result: or_original(edit.result, &original.result),
            solution: original.solution.clone(),
            practice_type: original.practice_type.clone(),
        };
        api.update_practice(self.note_id, original.practice_id, &update)
            .await?;

        let item = &mut self.items[index];
        item.content = update.content;
        item.result = update.result;
        self.editing.remove(&number);
        tracing::debug!(note_id = self.note_id, practice_number = number, "practice item updated");
        Ok(())
    }

    /// Abandon an edit without sending anything.
    pub fn cancel_edit(&mut self, number: u32) {
        self.editing.remove(&number);
    }

    // -------------------------------------------------------------------------
    // Export
    // -------------------------------------------------------------------------

    /// Export the selected rows. An empty selection is reported and the
    /// exporter is not called.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing is selected or the export fails.
    pub fn export(&self, exporter: &dyn PracticeExporter, notifier: &dyn Notifier) -> Result<PathBuf, FlowError> {
        let selected = self.selected_items();
        if selected.is_empty() {
            notifier.notify(Notice::error(FlowError::NothingSelected.to_string()));
            return Err(FlowError::NothingSelected);
        }
        match exporter.export(self.note_id, &selected) {
            Ok(path) => {
                notifier.notify(Notice::success(format!("Saved to {}.", path.display())));
                Ok(path)
            }
            Err(e) => {
                tracing::error!(error = %e, note_id = self.note_id, "practice export failed");
                notifier.notify(Notice::error("Export failed."));
                Err(e.into())
            }
        }
    }
}

fn or_original(edited: String, original: &str) -> String {
    if edited.is_empty() { original.to_owned() } else { edited }
}

#[cfg(test)]
#[path = "practice_test.rs"]
mod tests;
