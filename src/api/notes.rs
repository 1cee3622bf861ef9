//! Note endpoints, including the speech-to-text upload.

use std::path::Path;

use serde_json::Value;

use super::types::{Ack, CreatedNote, FolderId, FolderInfo, NoteDraft, NoteId, NoteList};
use super::{ApiClient, ApiError, ApiRequest, Upload};

pub(crate) fn notes_path(folder_id: FolderId) -> String {
    format!("/api/v1/folders/{folder_id}/notes")
}

pub(crate) fn note_path(folder_id: FolderId, note_id: NoteId) -> String {
    format!("/api/v1/folders/{folder_id}/notes/{note_id}")
}

impl ApiClient {
    /// Notes of a folder, tagged with the folder id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn list_notes(&self, folder_id: FolderId) -> Result<NoteList, ApiError> {
        let mut list: NoteList = self
            .send(ApiRequest::get(notes_path(folder_id)))
            .await?;
        list.folder_id = folder_id;
        Ok(list)
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_note(&self, folder_id: FolderId, title: &str) -> Result<CreatedNote, ApiError> {
        let draft = NoteDraft { title: title.to_owned() };
        let value = self
            .send_value(ApiRequest::post(notes_path(folder_id)).json(&draft)?)
            .await?;
        if value.is_null() {
            return Ok(CreatedNote::default());
        }
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_note(&self, folder_id: FolderId, note_id: NoteId) -> Result<Ack, ApiError> {
        let value = self
            .send_value(ApiRequest::delete(note_path(folder_id, note_id)))
            .await?;
        if value.is_null() {
            return Ok(Ack::default());
        }
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET /api/v1/professor/note/{folderId}/info`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn folder_info(&self, folder_id: FolderId) -> Result<FolderInfo, ApiError> {
        self.send(ApiRequest::get(format!("/api/v1/professor/note/{folder_id}/info")))
            .await
    }

    /// Upload lecture audio for speech-to-text as multipart field `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
    pub async fn upload_audio(&self, folder_id: FolderId, note_id: NoteId, audio: &Path) -> Result<Value, ApiError> {
        let upload = Upload::from_path(audio).await?;
        tracing::info!(folder_id, note_id, file = %upload.file_name, bytes = upload.bytes.len(), "uploading lecture audio");
        let request = ApiRequest::post(format!("{}/stt", note_path(folder_id, note_id))).upload(upload);
        self.send_value(request).await
    }
}

#[cfg(test)]
#[path = "notes_test.rs"]
mod tests;
