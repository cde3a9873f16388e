use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use textdoc_core::{
    Document, DocumentError, DocumentEvent, DocumentOptions, FoldMarker, LineEnding, MarkerKind,
    TextLocation, TextMarker,
};

fn recording(document: &mut Document) -> Arc<Mutex<Vec<DocumentEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    document.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    events
}

#[test]
fn test_undo_redo_single_edits() {
    let mut document = Document::new("");
    document.insert(0, "a").unwrap();
    document.insert(1, "b").unwrap();
    assert_eq!(document.undo_depth(), 2);

    document.undo().unwrap();
    assert_eq!(document.text(), "a");
    assert!(document.can_redo());
    document.undo().unwrap();
    assert_eq!(document.text(), "");
    assert_eq!(document.undo(), Err(DocumentError::NothingToUndo));

    document.redo().unwrap();
    document.redo().unwrap();
    assert_eq!(document.text(), "ab");
    assert!(!document.can_redo());
}

#[test]
fn test_nested_undo_groups_collapse() {
    let mut document = Document::new("hello world");
    document.start_undo_group();
    document.replace(0, 5, "HELLO").unwrap();
    document.start_undo_group();
    document.insert(11, "!").unwrap();
    document.end_undo_group();
    document.remove(5, 1).unwrap();
    document.end_undo_group();
    assert_eq!(document.text(), "HELLOworld!");
    assert_eq!(document.undo_depth(), 1);

    document.undo().unwrap();
    assert_eq!(document.text(), "hello world");
    document.redo().unwrap();
    assert_eq!(document.text(), "HELLOworld!");
}

#[test]
fn test_new_edit_clears_redo() {
    let mut document = Document::new("abc");
    document.remove(0, 1).unwrap();
    document.undo().unwrap();
    assert!(document.can_redo());
    document.insert(3, "d").unwrap();
    assert!(!document.can_redo());
}

#[test]
fn test_undo_commits_once() {
    let mut document = Document::new("one\ntwo\nthree");
    document.start_undo_group();
    document.insert(0, "1 ").unwrap();
    document.insert(10, "3 ").unwrap();
    document.end_undo_group();

    let events = recording(&mut document);
    document.undo().unwrap();

    let events = events.lock().unwrap();
    let commits = events
        .iter()
        .filter(|e| matches!(e, DocumentEvent::UpdateCommitted { .. }))
        .count();
    let changes = events
        .iter()
        .filter(|e| matches!(e, DocumentEvent::DocumentChanged { .. }))
        .count();
    assert_eq!((changes, commits), (2, 1));
    assert_eq!(
        events.last(),
        Some(&DocumentEvent::UpdateCommitted { lines: Some(0..=2) })
    );
}

#[test]
fn test_undo_restores_markers_positions() {
    let mut document = Document::new("0123456789");
    let id = document
        .add_marker(TextMarker::new(5, 2, MarkerKind::Underlined))
        .unwrap();
    document.insert(0, "abc").unwrap();
    assert_eq!(document.markers().get(id).unwrap().offset, 8);
    document.undo().unwrap();
    assert_eq!(document.markers().get(id).unwrap().offset, 5);
    assert_eq!(document.get_text_of_marker(id).unwrap(), "56");
}

#[test]
fn test_out_of_range_edits_change_nothing() {
    let mut document = Document::new("abc\ndef");
    let events = recording(&mut document);

    assert_eq!(
        document.insert(8, "x"),
        Err(DocumentError::OffsetOutOfRange {
            offset: 8,
            text_length: 7
        })
    );
    assert_eq!(
        document.remove(5, 3),
        Err(DocumentError::RangeOutOfRange {
            offset: 5,
            length: 3,
            text_length: 7
        })
    );
    assert!(document.get_line(2).unwrap_err().is_out_of_range());
    assert!(
        document
            .position_to_offset(TextLocation::new(0, 4))
            .is_err()
    );
    assert_eq!(document.text(), "abc\ndef");
    assert!(!document.can_undo());
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_read_only_document_rejects_everything() {
    let mut document = Document::with_options(
        "text",
        DocumentOptions {
            read_only: true,
            ..DocumentOptions::default()
        },
    );
    let events = recording(&mut document);

    assert!(matches!(
        document.insert(0, "x"),
        Err(DocumentError::ReadOnlyViolation { .. })
    ));
    assert!(document.set_text_content("other").is_err());
    assert_eq!(document.text(), "text");
    assert!(
        events
            .lock()
            .unwrap()
            .iter()
            .all(|e| !matches!(e, DocumentEvent::DocumentChanging { .. }))
    );

    document.set_read_only(false);
    document.insert(0, "x").unwrap();
    assert_eq!(document.text(), "xtext");
}

#[test]
fn test_read_only_marker_violation_leaves_state_untouched() {
    let mut document = Document::new("keep this\nedit here");
    document
        .update_foldings(vec![FoldMarker::new(0, 4, 1, 4)])
        .unwrap();
    let guard = document
        .add_marker(TextMarker::new(0, 9, MarkerKind::SolidBlock).read_only())
        .unwrap();
    let events = recording(&mut document);

    assert_eq!(
        document.replace(2, 10, "zz"),
        Err(DocumentError::ReadOnlyViolation {
            offset: 2,
            length: 10
        })
    );
    assert_eq!(document.text(), "keep this\nedit here");
    assert_eq!(document.get_text_of_marker(guard).unwrap(), "keep this");
    assert_eq!(document.folding().len(), 1);
    assert!(events.lock().unwrap().is_empty());
    assert!(document.is_read_only_at(3));
    assert!(!document.is_read_only_at(9));
    assert!(!document.is_read_only_range(10, 4));

    document.insert(10, ">> ").unwrap();
    assert_eq!(document.line_text(1).unwrap(), ">> edit here");
}

#[test]
fn test_crlf_documents() {
    let mut document = Document::new("a\r\nb\r\nc");
    assert_eq!(document.line_ending(), LineEnding::Crlf);
    assert_eq!(document.line_count(), 3);
    assert_eq!(document.get_line(1).unwrap().offset, 3);
    assert_eq!(document.line_number_for_offset(2).unwrap(), 0);

    // split the terminator, then join it again
    document.insert(2, "x").unwrap();
    assert_eq!(document.line_count(), 4);
    document.remove(2, 1).unwrap();
    assert_eq!(document.line_count(), 3);
    assert!(document.line_index().is_consistent());
}

#[test]
fn test_marker_events() {
    let mut document = Document::new("0123456789");
    let events = recording(&mut document);
    let a = document
        .add_marker(TextMarker::new(0, 2, MarkerKind::Invisible))
        .unwrap();
    let b = document
        .add_marker(TextMarker::new(4, 2, MarkerKind::WaveLine))
        .unwrap();
    let removed = document.remove_markers(|m| m.kind == MarkerKind::WaveLine);
    assert_eq!(removed, vec![b]);
    document.remove_marker(a).unwrap();
    assert_eq!(
        document.remove_marker(a),
        Err(DocumentError::UnknownMarker(a.0))
    );

    assert_eq!(
        *events.lock().unwrap(),
        vec![
            DocumentEvent::MarkerAdded(a),
            DocumentEvent::MarkerAdded(b),
            DocumentEvent::MarkerRemoved(b),
            DocumentEvent::MarkerRemoved(a),
        ]
    );
}

#[test]
fn test_options_from_yaml() {
    let options: DocumentOptions =
        serde_yaml::from_str("enable_folding: false\nmax_undo_steps: 1\n").unwrap();
    let mut document = Document::with_options("", options);
    document.insert(0, "a").unwrap();
    document.insert(1, "b").unwrap();
    assert_eq!(document.undo_depth(), 1);
    assert!(!document.folding().is_folding_enabled());
}
