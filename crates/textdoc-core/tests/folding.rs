use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use textdoc_core::{Document, DocumentEvent, FoldMarker, IndentFoldingStrategy, TextLocation};

fn fifty_lines() -> Document {
    let text: Vec<String> = (0..50).map(|i| format!("line {i:02} of the document")).collect();
    Document::new(&text.join("\n"))
}

const CONTAINMENT_FOLDS: [(usize, usize, usize, usize); 7] = [
    (1, 6, 5, 2),
    (2, 1, 2, 3),
    (3, 7, 4, 1),
    (10, 1, 14, 1),
    (10, 3, 10, 3),
    (11, 1, 15, 1),
    (12, 1, 16, 1),
];

fn containment_folds() -> Vec<FoldMarker> {
    CONTAINMENT_FOLDS
        .into_iter()
        .map(|(sl, sc, el, ec)| FoldMarker::new(sl, sc, el, ec).folded())
        .collect()
}

/// Positions in `CONTAINMENT_FOLDS` of the returned folds.
fn fold_numbers<'a>(
    folds: impl IntoIterator<Item = (textdoc_core::FoldId, &'a FoldMarker)>,
) -> Vec<usize> {
    let mut numbers: Vec<usize> = folds
        .into_iter()
        .map(|(_, f)| {
            let range = (f.start_line, f.start_column, f.end_line, f.end_column);
            CONTAINMENT_FOLDS
                .iter()
                .position(|fold| *fold == range)
                .unwrap()
        })
        .collect();
    numbers.sort_unstable();
    numbers
}

fn ranges<'a>(
    folds: impl IntoIterator<Item = (textdoc_core::FoldId, &'a FoldMarker)>,
) -> Vec<(usize, usize, usize, usize)> {
    folds
        .into_iter()
        .map(|(_, f)| (f.start_line, f.start_column, f.end_line, f.end_column))
        .collect()
}

#[test]
fn test_foldings_containing_line() {
    let mut document = fifty_lines();
    document.update_foldings(containment_folds()).unwrap();

    assert_eq!(
        ranges(document.folding().foldings_containing_line(11)),
        vec![(10, 1, 14, 1)]
    );
    assert_eq!(
        ranges(document.folding().foldings_containing_line(13)),
        vec![(10, 1, 14, 1), (11, 1, 15, 1), (12, 1, 16, 1)]
    );
}

#[test]
fn test_foldings_with_start() {
    let mut document = fifty_lines();
    document.update_foldings(containment_folds()).unwrap();
    let folding = document.folding();

    let cases: [(usize, &[usize]); 9] = [
        (1, &[0]),
        (2, &[1]),
        (3, &[2]),
        (4, &[]),
        (10, &[3, 4]),
        (11, &[5]),
        (12, &[6]),
        (13, &[]),
        (14, &[]),
    ];
    for (line, expected) in cases {
        assert_eq!(
            fold_numbers(folding.foldings_with_start(line)),
            expected,
            "line {line}"
        );
    }
}

#[test]
fn test_folded_foldings_with_start_after_column() {
    let mut document = fifty_lines();
    let ids = document.update_foldings(containment_folds()).unwrap();

    let cases: [(usize, &[usize]); 5] = [
        (0, &[3, 4]),
        (1, &[4]),
        (2, &[4]),
        // a fold starting exactly at the column is not after it
        (3, &[]),
        (4, &[]),
    ];
    for (column, expected) in cases {
        assert_eq!(
            fold_numbers(document.folding().folded_foldings_with_start_after_column(10, column)),
            expected,
            "column {column}"
        );
    }

    document.set_folded(ids[4], false).unwrap();
    assert_eq!(
        fold_numbers(document.folding().folded_foldings_with_start_after_column(10, 0)),
        vec![3]
    );
}

#[test]
fn test_foldings_from_overlapping_positions() {
    let mut document = fifty_lines();
    document.update_foldings(containment_folds()).unwrap();
    let folding = document.folding();

    let cases: [((usize, usize), &[usize]); 14] = [
        ((10, 1), &[]),
        ((10, 2), &[3]),
        // the empty fold at (10, 3) never contains a position
        ((10, 3), &[3]),
        ((10, 4), &[3]),
        ((11, 1), &[3]),
        ((11, 2), &[3, 5]),
        ((12, 1), &[3, 5]),
        ((12, 2), &[3, 5, 6]),
        ((14, 0), &[3, 5, 6]),
        ((14, 1), &[5, 6]),
        ((15, 0), &[5, 6]),
        ((15, 1), &[6]),
        ((16, 0), &[6]),
        ((16, 1), &[]),
    ];
    for ((line, column), expected) in cases {
        assert_eq!(
            fold_numbers(folding.foldings_from_position(line, column)),
            expected,
            "position ({line}, {column})"
        );
    }
}

#[test]
fn test_foldings_from_nested_positions() {
    let mut document = fifty_lines();
    document.update_foldings(containment_folds()).unwrap();
    let folding = document.folding();

    let cases: [((usize, usize), &[usize]); 14] = [
        ((1, 5), &[]),
        // exactly at the start is not inside
        ((1, 6), &[]),
        ((1, 7), &[0]),
        ((5, 0), &[0]),
        ((5, 1), &[0]),
        ((5, 2), &[]),
        ((5, 3), &[]),
        ((3, 8), &[0, 2]),
        // past the end of the line text
        ((3, 30), &[0, 2]),
        ((4, 0), &[0, 2]),
        ((4, 1), &[0]),
        ((2, 1), &[0]),
        ((2, 2), &[0, 1]),
        ((2, 3), &[0]),
    ];
    for ((line, column), expected) in cases {
        assert_eq!(
            fold_numbers(folding.foldings_from_position(line, column)),
            expected,
            "position ({line}, {column})"
        );
    }
}

#[test]
fn test_top_level_folded_foldings() {
    let mut document = fifty_lines();
    document.update_foldings(containment_folds()).unwrap();

    assert_eq!(
        ranges(document.folding().top_level_folded_foldings()),
        vec![(1, 6, 5, 2), (10, 1, 14, 1)]
    );
}

#[test]
fn test_update_with_same_ranges_keeps_state() {
    let mut document = fifty_lines();
    let ids = document.update_foldings(containment_folds()).unwrap();
    document.set_folded(ids[1], false).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    document.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    let unfolded: Vec<FoldMarker> = containment_folds()
        .into_iter()
        .map(|mut f| {
            f.is_folded = false;
            f
        })
        .collect();
    let again = document.update_foldings(unfolded).unwrap();

    assert_eq!(again, ids);
    let states: Vec<bool> = document.folding().iter().map(|(_, f)| f.is_folded).collect();
    assert_eq!(states, vec![true, false, true, true, true, true, true]);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn test_visible_lines_skip_folded_regions() {
    let mut document = fifty_lines();
    document.update_foldings(containment_folds()).unwrap();
    let folding = document.folding();

    assert!(folding.is_line_visible(1));
    assert!(!folding.is_line_visible(3));
    assert!(folding.is_line_visible(5));
    assert!(!folding.is_line_visible(13));
    // nested in [10,1]-[14,1] for row mapping, but it still hides line 14
    assert!(!folding.is_line_visible(14));
    assert!(folding.is_line_visible(16));

    // rows: 0, 1..5, 6..9, 10..14, 15, 16, ...
    assert_eq!(folding.visible_line(0), 0);
    assert_eq!(folding.visible_line(1), 1);
    assert_eq!(folding.visible_line(3), 1);
    assert_eq!(folding.visible_line(6), 2);
    assert_eq!(folding.visible_line(10), 6);
    assert_eq!(folding.visible_line(15), 7);
    assert_eq!(folding.visible_line(49), 41);
    assert_eq!(folding.visible_line_count(document.line_count()), 42);

    assert_eq!(folding.first_logical_line(1), 1);
    assert_eq!(folding.first_logical_line(2), 6);
    assert_eq!(folding.first_logical_line(7), 15);
}

#[test]
fn test_disabled_folding_is_identity() {
    let mut document = Document::with_options(
        "a\nb\nc\nd",
        textdoc_core::DocumentOptions {
            enable_folding: false,
            ..Default::default()
        },
    );
    document
        .update_foldings(vec![FoldMarker::new(0, 1, 3, 1).folded()])
        .unwrap();
    assert!(document.folding().is_line_visible(2));
    assert_eq!(document.folding().visible_line(3), 3);
}

#[test]
fn test_folds_follow_edits() {
    let mut document = fifty_lines();
    let ids = document
        .update_foldings(vec![FoldMarker::new(10, 1, 14, 1).folded()])
        .unwrap();

    document.insert(0, "header\n\n").unwrap();
    let fold = document.folding().get(ids[0]).unwrap();
    assert_eq!(fold.start(), TextLocation::new(12, 1));
    assert_eq!(fold.end(), TextLocation::new(16, 1));
    assert!(fold.is_folded);

    let start = document.position_to_offset(TextLocation::new(11, 0)).unwrap();
    let end = document.position_to_offset(TextLocation::new(17, 0)).unwrap();
    document.remove(start, end - start).unwrap();
    assert!(document.folding().is_empty());
}

#[test]
fn test_unfold_at_reports_expanded_folds() {
    let mut document = fifty_lines();
    document.update_foldings(containment_folds()).unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    document.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    let expanded = document.unfold_at(TextLocation::new(13, 0));
    assert_eq!(expanded.len(), 3);
    assert!(document.folding().is_line_visible(13));
    assert_eq!(
        *events.lock().unwrap(),
        vec![
            DocumentEvent::FoldsExpanded(expanded.clone()),
            DocumentEvent::FoldingsChanged
        ]
    );
}

#[test]
fn test_folding_strategy_feeds_the_document() {
    let mut document = Document::new("class A\n    fn a\n        body\n    fn b\n        body\n");
    let ids = document
        .update_folding_from(&mut IndentFoldingStrategy::default())
        .unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(
        ranges(document.folding().foldings_with_start(1)),
        vec![(1, 8, 2, 12)]
    );
}
