//! Practice question endpoints.

use serde_json::Value;

use super::types::{
    NoteId, PracticeEnvelope, PracticeGeneration, PracticeId, PracticeSet, PracticeSubmission, PracticeUpdate,
};
use super::{ApiClient, ApiError, ApiRequest};

fn practice_path(note_id: NoteId) -> String {
    format!("/api/v1/professor/practice/{note_id}")
}

impl ApiClient {
    /// Practice questions of a note, normalised to a flat item list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload does not decode.
    pub async fn fetch_practice(&self, note_id: NoteId) -> Result<PracticeSet, ApiError> {
        let envelope: PracticeEnvelope = self.send(ApiRequest::get(practice_path(note_id))).await?;
        envelope
            .into_set()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_practice(
        &self,
        note_id: NoteId,
        practice_id: PracticeId,
        update: &PracticeUpdate,
    ) -> Result<Value, ApiError> {
        let path = format!("{}/{practice_id}", practice_path(note_id));
        self.send_value(ApiRequest::put(path).json(update)?).await
    }

    /// Ask the backend to generate questions for a note.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn generate_practice(&self, note_id: NoteId, request: &PracticeGeneration) -> Result<Value, ApiError> {
        let path = format!("{}/generate", practice_path(note_id));
        self.send_value(ApiRequest::post(path).json(request)?)
            .await
    }

    /// Save an edited practice set with its time limit and deadline.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn save_practice(&self, note_id: NoteId, submission: &PracticeSubmission) -> Result<Value, ApiError> {
        self.send_value(ApiRequest::post(practice_path(note_id)).json(submission)?)
            .await
    }
}

#[cfg(test)]
#[path = "practice_test.rs"]
mod tests;
