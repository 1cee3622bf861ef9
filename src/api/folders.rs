//! Folder endpoints.

use serde_json::Value;

use super::types::{Folder, FolderDraft, FolderId, FolderTree};
use super::{ApiClient, ApiError, ApiRequest};

pub const FOLDERS_PATH: &str = "/api/v1/folders";
pub const FOLDER_TREE_PATH: &str = "/api/v1/folders/sidebar";

/// Why a folder form cannot be submitted. Messages are shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FolderDraftError {
    #[error("Please enter a subject name.")]
    MissingSubject,
    #[error("Please enter the professor's name.")]
    MissingProfessor,
}

impl FolderDraft {
    #[must_use]
    pub fn new(subject: impl Into<String>, professor: impl Into<String>) -> Self {
        Self { folder_name: subject.into(), professor_name: professor.into() }
    }

    /// Subject is checked before professor.
    ///
    /// # Errors
    ///
    /// Returns the first blank field.
    pub fn validate(&self) -> Result<(), FolderDraftError> {
        if self.folder_name.trim().is_empty() {
            return Err(FolderDraftError::MissingSubject);
        }
        if self.professor_name.trim().is_empty() {
            return Err(FolderDraftError::MissingProfessor);
        }
        Ok(())
    }
}

fn folder_path(folder_id: FolderId) -> String {
    format!("{FOLDERS_PATH}/{folder_id}")
}

impl ApiClient {
    /// `GET /api/v1/folders`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a folder list.
    pub async fn list_folders(&self) -> Result<Vec<Folder>, ApiError> {
        self.send(ApiRequest::get(FOLDERS_PATH)).await
    }

    /// `POST /api/v1/folders`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_folder(&self, draft: &FolderDraft) -> Result<Value, ApiError> {
        self.send_value(ApiRequest::post(FOLDERS_PATH).json(draft)?)
            .await
    }

    /// `PATCH /api/v1/folders/{folderId}`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_folder(&self, folder_id: FolderId, draft: &FolderDraft) -> Result<Value, ApiError> {
        self.send_value(ApiRequest::patch(folder_path(folder_id)).json(draft)?)
            .await
    }

    /// `DELETE /api/v1/folders/{folderId}`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_folder(&self, folder_id: FolderId) -> Result<Value, ApiError> {
        self.send_value(ApiRequest::delete(folder_path(folder_id)))
            .await
    }

    /// Folders with their note titles, for navigation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn folder_tree(&self) -> Result<FolderTree, ApiError> {
        self.send(ApiRequest::get(FOLDER_TREE_PATH)).await
    }
}

#[cfg(test)]
#[path = "folders_test.rs"]
mod tests;
