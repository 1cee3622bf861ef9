//! Summary generation and retrieval.

use serde_json::Value;

use super::notes::note_path;
use super::types::{FolderId, GenerationHints, NoteId, Summary, SummaryEnvelope};
use super::{ApiClient, ApiError, ApiRequest};

fn summaries_path(folder_id: FolderId, note_id: NoteId) -> String {
    format!("{}/summaries", note_path(folder_id, note_id))
}

impl ApiClient {
    /// Ask the backend to summarise a note's transcript. Blank hints are not sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn generate_summary(
        &self,
        folder_id: FolderId,
        note_id: NoteId,
        hints: &GenerationHints,
    ) -> Result<Value, ApiError> {
        let request = ApiRequest::post(summaries_path(folder_id, note_id))
            .json(&serde_json::json!({}))?
            .query(hints.query());
        self.send_value(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the body has no summary.
    pub async fn fetch_summary(&self, folder_id: FolderId, note_id: NoteId) -> Result<Summary, ApiError> {
        let envelope: SummaryEnvelope = self
            .send(ApiRequest::get(summaries_path(folder_id, note_id)))
            .await?;
        Ok(Summary { text: envelope.information.summary })
    }
}

#[cfg(test)]
#[path = "summaries_test.rs"]
mod tests;
