//! Practice and summary export.
//!
//! Practice sheets are written as JSON Lines: one `practice_export_meta`
//! header line followed by one `practice` line per selected question.
//! Summaries are written as plain Markdown.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::{Value, json};

use crate::api::types::{NoteId, PracticeItem, Summary};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export write failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("export encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for a selected set of practice questions.
pub trait PracticeExporter {
    /// # Errors
    ///
    /// Returns an error if the export cannot be written.
    fn export(&self, note_id: NoteId, items: &[PracticeItem]) -> Result<PathBuf, ExportError>;
}

/// Writes `practice_{noteId}.jsonl` into a directory.
#[derive(Debug, Clone)]
pub struct JsonlExporter {
    dir: PathBuf,
}

impl JsonlExporter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ExportError + '_ {
    move |source| ExportError::Io { path: path.to_path_buf(), source }
}

impl PracticeExporter for JsonlExporter {
    fn export(&self, note_id: NoteId, items: &[PracticeItem]) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let path = self.dir.join(format!("practice_{note_id}.jsonl"));
        let file = File::create(&path).map_err(io_error(&path))?;
        let mut out = BufWriter::new(file);

        let meta = json!({ "type": "practice_export_meta", "noteId": note_id, "count": items.len() });
        writeln!(out, "{meta}").map_err(io_error(&path))?;
        for item in items {
            let mut line = serde_json::to_value(item)?;
            if let Value::Object(map) = &mut line {
                map.insert("type".to_owned(), Value::String("practice".to_owned()));
            }
            writeln!(out, "{line}").map_err(io_error(&path))?;
        }
        out.flush().map_err(io_error(&path))?;

        tracing::info!(note_id, count = items.len(), path = %path.display(), "exported practice sheet");
        Ok(path)
    }
}

/// Write `summary_{noteId}.md` into `dir`.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_summary(dir: &Path, note_id: NoteId, summary: &Summary) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(io_error(dir))?;
    let path = dir.join(format!("summary_{note_id}.md"));
    let rendered = format!("# Summary Document\n\n{}\n", summary.text.trim_end());
    std::fs::write(&path, rendered).map_err(io_error(&path))?;
    Ok(path)
}

#[cfg(test)]
#[path = "export_test.rs"]
mod tests;
