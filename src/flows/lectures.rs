//! New lecture pipeline: create the note, upload its audio for
//! speech-to-text, then ask for a summary.

use std::path::PathBuf;

use super::FlowError;
use crate::api::ApiClient;
use crate::api::types::{FolderId, GenerationHints, NoteId};
use crate::notify::{Notice, Notifier};

#[derive(Debug, Clone)]
pub struct NewLecture {
    pub folder_id: FolderId,
    pub title: String,
    pub audio: PathBuf,
    pub hints: GenerationHints,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LectureOutcome {
    pub note_id: NoteId,
}

impl NewLecture {
    /// Run all three steps, stopping at the first failure. The failing step
    /// is reported through `notifier`.
    ///
    /// # Errors
    ///
    /// Returns the error of the step that failed.
    pub async fn submit(&self, api: &ApiClient, notifier: &dyn Notifier) -> Result<LectureOutcome, FlowError> {
        let title = self.title.trim();
        if title.is_empty() {
            notifier.notify(Notice::error(FlowError::MissingTitle.to_string()));
            return Err(FlowError::MissingTitle);
        }

        let note_id = match self.create_note(api, title).await {
            Ok(id) => id,
            Err(e) => return Err(report(notifier, "Failed to create the lecture note.", e)),
        };

        if let Err(e) = api.upload_audio(self.folder_id, note_id, &self.audio).await {
            return Err(report(notifier, "Failed to upload the lecture file.", e.into()));
        }

        if let Err(e) = api
            .generate_summary(self.folder_id, note_id, &self.hints)
            .await
        {
            return Err(report(notifier, "Failed to request the summary.", e.into()));
        }

        tracing::info!(folder_id = self.folder_id, note_id, "lecture submitted");
        notifier.notify(Notice::success("Lecture uploaded. The summary is being generated."));
        Ok(LectureOutcome { note_id })
    }

    /// Older backends do not return the new id; fall back to the newest note
    /// with the same title.
    async fn create_note(&self, api: &ApiClient, title: &str) -> Result<NoteId, FlowError> {
        let created = api.create_note(self.folder_id, title).await?;
        if let Some(id) = created.note_id {
            return Ok(id);
        }
        let list = api.list_notes(self.folder_id).await?;
        list.notes
            .iter()
            .filter(|note| note.title == title)
            .map(|note| note.note_id)
            .max()
            .ok_or(FlowError::MissingNoteId)
    }
}

fn report(notifier: &dyn Notifier, message: &str, error: FlowError) -> FlowError {
    tracing::error!(error = %error, notice = message, "lecture pipeline step failed");
    notifier.notify(Notice::error(message));
    error
}

#[cfg(test)]
#[path = "lectures_test.rs"]
mod tests;
