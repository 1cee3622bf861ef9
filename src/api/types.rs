//! Wire types mirrored from backend responses.
//!
//! Records are kept as the backend sends them (camelCase JSON). The only
//! client-side shaping is normalisation of the few payloads that arrive in
//! more than one form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type FolderId = i64;
pub type NoteId = i64;
pub type PracticeId = i64;

// =============================================================================
// FOLDERS
// =============================================================================

/// A professor's subject folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub folder_id: FolderId,
    pub folder_name: String,
    #[serde(default, alias = "professorName")]
    pub professor: String,
    #[serde(default)]
    pub note_count: u32,
}

/// Body for folder create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDraft {
    pub folder_name: String,
    pub professor_name: String,
}

/// Sidebar tree: every folder with the titles of the notes it holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderTree {
    #[serde(default)]
    pub folder_note_detail_list: Vec<FolderBranch>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderBranch {
    pub folder_id: FolderId,
    pub folder_name: String,
    #[serde(default)]
    pub note_count: u32,
    #[serde(default)]
    pub notes_in_folder_res: Vec<NoteLeaf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteLeaf {
    pub note_id: NoteId,
    pub note_name: String,
}

// =============================================================================
// NOTES
// =============================================================================

/// One lecture note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub note_id: NoteId,
    pub title: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub practice_size: u32,
    #[serde(default)]
    pub code: Option<String>,
}

/// Notes of one folder together with the folder they belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteList {
    /// Filled in from the request path; the backend does not echo it.
    #[serde(default)]
    pub folder_id: FolderId,
    #[serde(default)]
    pub folder_name: String,
    #[serde(default)]
    pub professor: String,
    #[serde(default, rename = "noteListDetailRes")]
    pub notes: Vec<Note>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
}

/// Response to note creation. Older backends only send `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedNote {
    #[serde(default)]
    pub note_id: Option<NoteId>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderInfo {
    #[serde(default)]
    pub folder_name: String,
    #[serde(default)]
    pub professor: String,
    #[serde(default)]
    pub information: Value,
}

/// Generic `{ "message": ... }` acknowledgement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// SUMMARIES
// =============================================================================

/// Generated digest of a note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryEnvelope {
    pub information: SummaryBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryBody {
    #[serde(default)]
    pub summary: String,
}

/// Optional steering for summary and practice generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationHints {
    pub keywords: Option<String>,
    pub requirement: Option<String>,
}

impl GenerationHints {
    /// Query pairs, omitting blank hints. Values are sent as given.
    #[must_use]
    pub fn query(&self) -> Vec<(&'static str, String)> {
        [("keywords", &self.keywords), ("requirement", &self.requirement)]
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (key, v.to_owned()))
            })
            .collect()
    }
}

// =============================================================================
// PRACTICE
// =============================================================================

/// Question style: binary choice or short answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PracticeType {
    Ox,
    Short,
    Other(String),
}

impl From<String> for PracticeType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "OX" => Self::Ox,
            "SHORT" => Self::Short,
            _ => Self::Other(raw),
        }
    }
}

impl From<PracticeType> for String {
    fn from(kind: PracticeType) -> Self {
        match kind {
            PracticeType::Ox => "OX".to_owned(),
            PracticeType::Short => "SHORT".to_owned(),
            PracticeType::Other(raw) => raw,
        }
    }
}

impl std::fmt::Display for PracticeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ox => f.write_str("OX"),
            Self::Short => f.write_str("SHORT"),
            Self::Other(raw) => f.write_str(raw),
        }
    }
}

/// A generated quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeItem {
    #[serde(alias = "praticeId")]
    pub practice_id: PracticeId,
    pub practice_number: u32,
    pub content: String,
    #[serde(default)]
    pub additional_results: Option<Vec<String>>,
    /// Accepted answer.
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub solution: String,
    pub practice_type: PracticeType,
}

/// Practice questions of one note.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSet {
    pub check: bool,
    pub note_id: Option<NoteId>,
    pub note_title: Option<String>,
    pub professor_id: Option<i64>,
    pub professor_name: Option<String>,
    pub items: Vec<PracticeItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PracticeEnvelope {
    #[serde(default)]
    pub check: bool,
    #[serde(default)]
    pub information: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PracticeInformation {
    note_id: Option<NoteId>,
    note_title: Option<String>,
    professor_id: Option<i64>,
    professor_name: Option<String>,
    #[serde(default)]
    req_list: Vec<PracticeItem>,
}

impl PracticeEnvelope {
    /// Accepts `information` as the documented object, a bare item, or an
    /// array of items.
    pub(crate) fn into_set(self) -> Result<PracticeSet, serde_json::Error> {
        let Self { check, information } = self;
        if information.is_null() {
            return Ok(PracticeSet { check, ..PracticeSet::default() });
        }
        if information.is_array() {
            let items: Vec<PracticeItem> = serde_json::from_value(information)?;
            return Ok(PracticeSet { check, items, ..PracticeSet::default() });
        }
        if information.get("reqList").is_some() {
            let info: PracticeInformation = serde_json::from_value(information)?;
            return Ok(PracticeSet {
                check,
                note_id: info.note_id,
                note_title: info.note_title,
                professor_id: info.professor_id,
                professor_name: info.professor_name,
                items: info.req_list,
            });
        }
        let item: PracticeItem = serde_json::from_value(information)?;
        Ok(PracticeSet { check, items: vec![item], ..PracticeSet::default() })
    }
}

/// Body for updating one practice item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeUpdate {
    pub practice_number: u32,
    pub content: String,
    pub additional_results: Vec<String>,
    pub result: String,
    pub solution: String,
    pub practice_type: PracticeType,
}

/// Request to generate practice questions for a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeGeneration {
    pub practice_size: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub keywords: String,
    pub requirement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeDraft {
    pub practice_number: u32,
    pub content: String,
    pub result: String,
    pub solution: String,
    pub practice_type: PracticeType,
}

/// Saves a practice set together with its time limit and deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSubmission {
    pub minute: u32,
    pub second: u32,
    pub end_date: String,
    pub req_list: Vec<PracticeDraft>,
}

impl From<&PracticeItem> for PracticeDraft {
    fn from(item: &PracticeItem) -> Self {
        Self {
            practice_number: item.practice_number,
            content: item.content.clone(),
            result: item.result.clone(),
            solution: item.solution.clone(),
            practice_type: item.practice_type.clone(),
        }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
