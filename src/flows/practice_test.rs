use std::cell::RefCell;

use super::*;
use crate::api::test_support::{Stub, client};
use crate::api::types::PracticeType;
use crate::export::ExportError;
use crate::notify::RecordingNotifier;
use serde_json::json;

fn item(number: u32) -> PracticeItem {
    PracticeItem {
        practice_id: i64::from(number) * 100,
        practice_number: number,
        content: format!("Question {number}"),
        additional_results: None,
        result: "O".into(),
        solution: "Because.".into(),
        practice_type: PracticeType::Ox,
    }
}

fn sheet() -> PracticeSheet {
    PracticeSheet::from_generated(12, vec![item(1), item(2), item(3)])
}

#[derive(Default)]
struct FakeExporter {
    calls: RefCell<Vec<Vec<u32>>>,
    fail: bool,
}

impl PracticeExporter for FakeExporter {
    fn export(&self, note_id: NoteId, items: &[PracticeItem]) -> Result<PathBuf, ExportError> {
        self.calls
            .borrow_mut()
            .push(items.iter().map(|i| i.practice_number).collect());
        if self.fail {
            return Err(ExportError::Io {
                path: PathBuf::from("/nowhere"),
                source: std::io::Error::other("disk full"),
            });
        }
        Ok(PathBuf::from(format!("practice_{note_id}.jsonl")))
    }
}

#[test]
fn toggle_select_flips_one_row() {
    let mut sheet = sheet();
    assert!(sheet.toggle_select(2).unwrap());
    assert!(sheet.is_selected(2));
    assert!(!sheet.toggle_select(2).unwrap());
    assert!(!sheet.is_selected(2));
    assert!(matches!(sheet.toggle_select(9), Err(FlowError::NoSuchQuestion(9))));
}

#[test]
fn repeated_select_keeps_row_selected() {
    let mut sheet = sheet();
    sheet.select(2).unwrap();
    sheet.select(2).unwrap();
    assert!(sheet.is_selected(2));
    assert_eq!(
        sheet.selected_items().iter().map(|i| i.practice_number).collect::<Vec<_>>(),
        vec![2]
    );
    assert!(matches!(sheet.select(9), Err(FlowError::NoSuchQuestion(9))));
}

#[test]
fn select_all_selects_every_row_then_clears() {
    let mut sheet = sheet();
    sheet.toggle_select(1).unwrap();

    sheet.select_all();
    assert!(sheet.is_all_selected());
    assert!((1..=3).all(|n| sheet.is_selected(n)));

    sheet.select_all();
    assert!(!sheet.is_all_selected());
    assert!((1..=3).all(|n| !sheet.is_selected(n)));
}

#[test]
fn empty_sheet_is_never_all_selected() {
    let mut sheet = PracticeSheet::from_generated(12, Vec::new());
    sheet.select_all();
    assert!(!sheet.is_all_selected());
}

#[test]
fn export_without_selection_reports_and_skips_exporter() {
    let sheet = sheet();
    let exporter = FakeExporter::default();
    let notifier = RecordingNotifier::new();

    let err = sheet.export(&exporter, &notifier).unwrap_err();

    assert!(matches!(err, FlowError::NothingSelected));
    assert!(exporter.calls.borrow().is_empty());
    assert_eq!(notifier.errors(), vec!["No questions selected.".to_owned()]);
}

#[test]
fn export_passes_selected_rows_in_table_order() {
    let mut sheet = sheet();
    sheet.toggle_select(3).unwrap();
    sheet.toggle_select(1).unwrap();
    let exporter = FakeExporter::default();
    let notifier = RecordingNotifier::new();

    let path = sheet.export(&exporter, &notifier).unwrap();

    assert_eq!(path, PathBuf::from("practice_12.jsonl"));
    assert_eq!(*exporter.calls.borrow(), vec![vec![1, 3]]);
    assert!(notifier.errors().is_empty());
    assert_eq!(notifier.notices().len(), 1);
}

#[test]
fn export_failure_is_reported() {
    let mut sheet = sheet();
    sheet.select_all();
    let exporter = FakeExporter { fail: true, ..FakeExporter::default() };
    let notifier = RecordingNotifier::new();

    let err = sheet.export(&exporter, &notifier).unwrap_err();
    assert!(matches!(err, FlowError::Export(_)));
    assert_eq!(notifier.errors(), vec!["Export failed.".to_owned()]);
}

#[test]
fn set_field_requires_edit_mode() {
    let mut sheet = sheet();
    let err = sheet
        .set_field(1, PracticeField::Content, "x")
        .unwrap_err();
    assert!(matches!(err, FlowError::NotEditing(1)));
}

#[tokio::test]
async fn commit_edit_falls_back_to_original_for_blank_fields() {
    let stub = Stub::new();
    stub.respond("PUT", "/api/v1/professor/practice/12/200", 200, json!({ "message": "ok" }));
    let api = client(&stub.serve().await);
    let mut sheet = sheet();

    sheet.begin_edit(2).unwrap();
    sheet.set_field(2, PracticeField::Content, "").unwrap();
    sheet.set_field(2, PracticeField::Result, "X").unwrap();
    sheet.commit_edit(&api, 2).await.unwrap();

    let body = stub.hits()[0].json();
    assert_eq!(body["content"], "Question 2");
    assert_eq!(body["result"], "X");
    assert_eq!(body["additionalResults"], json!([]));
    assert_eq!(body["solution"], "Because.");
    assert_eq!(body["practiceNumber"], 2);

    assert!(!sheet.is_editing(2));
    assert_eq!(sheet.items()[1].result, "X");
    assert_eq!(sheet.items()[1].content, "Question 2");
}

#[tokio::test]
async fn failed_commit_stays_in_edit_mode() {
    let stub = Stub::new();
    stub.respond("PUT", "/api/v1/professor/practice/12/100", 500, json!({ "message": "nope" }));
    let api = client(&stub.serve().await);
    let mut sheet = sheet();

    sheet.begin_edit(1).unwrap();
    sheet.set_field(1, PracticeField::Content, "Edited").unwrap();
    assert!(sheet.commit_edit(&api, 1).await.is_err());

    assert!(sheet.is_editing(1));
    assert_eq!(sheet.items()[0].content, "Question 1");
}

#[tokio::test]
async fn loaded_sheet_is_read_only() {
    let stub = Stub::new();
    stub.respond(
        "GET",
        "/api/v1/professor/practice/12",
        200,
        json!({
            "check": true,
            "information": [{
                "praticeId": 7,
                "practiceNumber": 1,
                "content": "Is paging contiguous?",
                "result": "X",
                "solution": "Frames are scattered.",
                "practiceType": "OX"
            }]
        }),
    );
    let api = client(&stub.serve().await);

    let mut sheet = PracticeSheet::load(&api, 12, &RecordingNotifier::new())
        .await
        .unwrap();

    assert!(!sheet.is_editable());
    assert_eq!(sheet.items()[0].practice_id, 7);
    assert!(matches!(sheet.begin_edit(1), Err(FlowError::ReadOnly)));
}

#[tokio::test]
async fn load_failure_is_reported() {
    let stub = Stub::new();
    stub.respond("GET", "/api/v1/professor/practice/12", 500, json!({ "message": "down" }));
    let api = client(&stub.serve().await);
    let notifier = RecordingNotifier::new();

    assert!(PracticeSheet::load(&api, 12, &notifier).await.is_err());
    assert_eq!(notifier.errors(), vec!["Failed to load the questions.".to_owned()]);
}
