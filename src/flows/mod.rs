//! Page-level behaviour that is logic rather than rendering.
//!
//! Each flow owns a cloned [`ApiClient`](crate::api::ApiClient) and reports
//! outcomes to the user through a [`Notifier`](crate::notify::Notifier), then
//! hands the error back so front ends can pick an exit status.

pub mod folders;
pub mod lectures;
pub mod practice;

pub use folders::FolderShelf;
pub use lectures::{LectureOutcome, NewLecture};
pub use practice::{PracticeField, PracticeSheet};

use crate::api::ApiError;
use crate::api::folders::FolderDraftError;
use crate::export::ExportError;

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    InvalidFolder(#[from] FolderDraftError),

    #[error("Please enter a lecture name.")]
    MissingTitle,

    #[error("created note id could not be determined")]
    MissingNoteId,

    #[error("No questions selected.")]
    NothingSelected,

    #[error("question {0} does not exist")]
    NoSuchQuestion(u32),

    #[error("question {0} is not being edited")]
    NotEditing(u32),

    #[error("questions loaded from the server are read-only")]
    ReadOnly,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Export(#[from] ExportError),
}
