//! Folder shelf: the home page's folder list and its create/rename/delete
//! actions. Every successful mutation is followed by a list refetch.

use std::sync::Arc;

use super::FlowError;
use crate::api::ApiClient;
use crate::api::types::{Folder, FolderDraft, FolderId};
use crate::notify::{Notice, Notifier};

pub struct FolderShelf {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    folders: Vec<Folder>,
}

impl FolderShelf {
    #[must_use]
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self { api, notifier, folders: Vec::new() }
    }

    /// Folders as of the last successful fetch.
    #[must_use]
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    /// # Errors
    ///
    /// Returns an error if the list cannot be fetched; the previous list is kept.
    pub async fn refresh(&mut self) -> Result<&[Folder], FlowError> {
        match self.api.list_folders().await {
            Ok(folders) => {
                self.folders = folders;
                Ok(&self.folders)
            }
            Err(e) => {
                tracing::error!(error = %e, "folder list fetch failed");
                self.notifier
                    .notify(Notice::error("Failed to load folders."));
                Err(e.into())
            }
        }
    }

    /// Validate, create, then refetch. An invalid draft is reported without
    /// contacting the backend.
    ///
    /// # Errors
    ///
    /// Returns the validation or request error that was reported.
    pub async fn create(&mut self, draft: &FolderDraft) -> Result<(), FlowError> {
        self.check(draft)?;
        if let Err(e) = self.api.create_folder(draft).await {
            return Err(self.failed("Failed to create the folder.", e));
        }
        self.notifier.notify(Notice::success("Folder created."));
        self.refresh().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the validation or request error that was reported.
    pub async fn rename(&mut self, folder_id: FolderId, draft: &FolderDraft) -> Result<(), FlowError> {
        self.check(draft)?;
        if let Err(e) = self.api.update_folder(folder_id, draft).await {
            return Err(self.failed("Failed to update the folder.", e));
        }
        self.notifier.notify(Notice::success("Folder updated."));
        self.refresh().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the request error that was reported.
    pub async fn delete(&mut self, folder_id: FolderId) -> Result<(), FlowError> {
        if let Err(e) = self.api.delete_folder(folder_id).await {
            return Err(self.failed("Failed to delete the folder.", e));
        }
        self.notifier.notify(Notice::success("Folder deleted."));
        self.refresh().await?;
        Ok(())
    }

    fn check(&self, draft: &FolderDraft) -> Result<(), FlowError> {
        draft.validate().map_err(|e| {
            self.notifier.notify(Notice::error(e.to_string()));
            FlowError::from(e)
        })
    }

    fn failed(&self, message: &str, error: crate::api::ApiError) -> FlowError {
        tracing::error!(error = %error, notice = message, "folder request failed");
        self.notifier.notify(Notice::error(message));
        error.into()
    }
}

#[cfg(test)]
#[path = "folders_test.rs"]
mod tests;
