mod common;

use std::sync::{Arc, Mutex};

use common::{group, other_parts_only, range};
use kispec::{
    BuildOutcome, BuildState, Builder, Column, Document, Row, RowHeights, Settings, SpecDocument,
    SpecRowHeights, StaticSource, clean,
};

fn builder(settings: Settings, source: StaticSource, state: &BuildState) -> Builder {
    Builder::new(
        settings,
        Box::new(source),
        Box::new(common::char_meter()),
        Box::new(SpecRowHeights::new(1)),
    )
    .with_state(state.clone())
}

fn resistors() -> StaticSource {
    StaticSource::new(vec![group(
        "Резистор",
        &["Резисторы"],
        vec![range(&["R5"], "10 кОм", "", "")],
    )])
}

/// Document holding some unrelated rows.
fn dirty_document() -> SpecDocument {
    let mut doc = SpecDocument::new(1);
    doc.insert_rows(1, 2);
    doc.write_row(1, &Row::new(["", "", "", "", "Старая строка", "", ""]));
    doc
}

#[test]
fn builds_other_parts_table() {
    common::init_logging();
    let state = BuildState::new();
    let mut doc = SpecDocument::new(1);

    let outcome = builder(other_parts_only(), resistors(), &state).build(&mut doc);

    assert_eq!(outcome, BuildOutcome::Built { rows: 4, pages: 1 });
    assert_eq!(
        doc.to_text(),
        "||||||\n||||Прочие изделия||\n||||||\n||1||Резистор 10 кОм|1|R5\n"
    );
    assert!(!doc.is_locked());
    assert!(!state.is_building());
}

#[test]
fn long_values_spill_into_continuation_rows() {
    let state = BuildState::new();
    let source = StaticSource::new(vec![group(
        "Микросхема",
        &["Микросхемы"],
        vec![range(&["DA1"], "стабилизатора напряжения LDO", "", "")],
    )]);
    let mut doc = SpecDocument::new(1);

    let outcome = builder(other_parts_only(), source, &state).build(&mut doc);

    assert_eq!(outcome, BuildOutcome::Built { rows: 5, pages: 1 });
    assert_eq!(
        common::names(&doc)[3..],
        ["Микросхема стабилизатора", "напряжения LDO"]
    );
    assert_eq!(doc.positions()[4], Some(1));
    assert_eq!(doc.positions()[5], None);
}

#[test]
fn no_data_leaves_document_untouched() {
    let state = BuildState::new();
    let mut doc = dirty_document();

    let outcome = builder(Settings::default(), StaticSource::empty(), &state).build(&mut doc);

    assert_eq!(outcome, BuildOutcome::NoData);
    assert_eq!(doc.row_count(), 4);
    assert_eq!(doc.cell_text(Column::Name, 1), "Старая строка");
    assert!(!state.is_building());
}

#[test]
fn empty_group_list_counts_as_no_data() {
    let state = BuildState::new();
    let mut doc = dirty_document();

    let outcome = builder(other_parts_only(), StaticSource::new(Vec::new()), &state).build(&mut doc);

    assert_eq!(outcome, BuildOutcome::NoData);
    assert_eq!(doc.row_count(), 4);
    assert_eq!(doc.cell_text(Column::Name, 1), "Старая строка");
    assert!(!state.is_building());
}

#[test]
fn request_during_build_is_ignored() {
    let state = BuildState::new();
    let ticket = state.try_begin().expect("state starts idle");
    let mut doc = dirty_document();

    let outcome = builder(other_parts_only(), resistors(), &state).build(&mut doc);
    assert_eq!(outcome, BuildOutcome::Busy);
    assert_eq!(doc.cell_text(Column::Name, 1), "Старая строка");

    drop(ticket);
    let outcome = builder(other_parts_only(), resistors(), &state).build(&mut doc);
    assert!(matches!(outcome, BuildOutcome::Built { .. }));
}

#[test]
fn second_spawn_while_building_is_dropped() {
    let state = BuildState::new();
    let doc = Arc::new(Mutex::new(SpecDocument::new(1)));

    // Holding the document keeps the first build waiting inside its thread.
    let guard = doc.lock().unwrap();
    let first = builder(other_parts_only(), resistors(), &state)
        .spawn(Arc::clone(&doc))
        .expect("first build starts");
    assert!(state.is_building());
    assert!(
        builder(other_parts_only(), resistors(), &state)
            .spawn(Arc::clone(&doc))
            .is_none()
    );
    drop(guard);

    assert_eq!(
        first.join().unwrap(),
        BuildOutcome::Built { rows: 4, pages: 1 }
    );
    assert!(!state.is_building());
    assert_eq!(doc.lock().unwrap().row_count(), 5);
}

#[test]
fn worker_thread_is_named() {
    let state = BuildState::new();
    let doc = Arc::new(Mutex::new(SpecDocument::new(1)));
    let handle = builder(other_parts_only(), resistors(), &state)
        .spawn(doc)
        .unwrap();
    assert_eq!(handle.thread().name(), Some("SpecBuildingThread"));
    handle.join().unwrap();
}

#[test]
fn clean_respects_running_build() {
    let state = BuildState::new();
    let mut doc = dirty_document();

    let ticket = state.try_begin().unwrap();
    assert!(!clean(&mut doc, &state, false));
    assert_eq!(doc.row_count(), 4);

    assert!(clean(&mut doc, &state, true));
    assert_eq!(doc.row_count(), 2);
    assert!(doc.row_is_empty(1));
    drop(ticket);

    let mut doc = dirty_document();
    assert!(clean(&mut doc, &state, false));
    assert_eq!(doc.row_count(), 2);
}

#[test]
fn rebuild_replaces_previous_content() {
    let state = BuildState::new();
    let mut doc = dirty_document();

    builder(other_parts_only(), resistors(), &state).build(&mut doc);
    let first = doc.to_text();
    builder(other_parts_only(), resistors(), &state).build(&mut doc);

    assert_eq!(doc.to_text(), first);
    assert!(!first.contains("Старая строка"));
}

fn many_groups(count: usize) -> StaticSource {
    StaticSource::new(
        (1..=count)
            .map(|i| {
                let reference = format!("X{i}");
                group(
                    "Соединитель",
                    &["Соединители"],
                    vec![range(&[reference.as_str()], &format!("Разъём {i}"), "", "")],
                )
            })
            .collect(),
    )
}

#[test]
fn revision_table_added_past_page_threshold() {
    let state = BuildState::new();
    let mut settings = other_parts_only();
    settings.spec.append_rev_table = true;
    settings.spec.pages_rev_table = 1;

    // 3 lead rows, then 2 rows per group after the first: 42 rows on two
    // sheets plus the revision sheet.
    let mut doc = SpecDocument::new(1);
    let outcome = builder(settings.clone(), many_groups(20), &state).build(&mut doc);
    assert_eq!(outcome, BuildOutcome::Built { rows: 42, pages: 3 });
    assert!(doc.has_revision_table());

    let mut small = SpecDocument::new(1);
    let outcome = builder(settings, resistors(), &state).build(&mut small);
    assert_eq!(outcome, BuildOutcome::Built { rows: 4, pages: 1 });
    assert!(!small.has_revision_table());
}

#[test]
fn page_repairs_run_when_enabled() {
    let state = BuildState::new();
    let mut settings = other_parts_only();
    settings.spec.prohibit_empty_rows_at_top = true;

    // Group k (k > 1) sits on rows 2k+1 (blank) and 2k+2, so the second
    // sheet would open with the blank in front of group 14.
    let mut doc = SpecDocument::new(1);
    let outcome = builder(settings, many_groups(20), &state).build(&mut doc);

    assert_eq!(outcome, BuildOutcome::Built { rows: 41, pages: 2 });
    assert_eq!(doc.cell_text(Column::Name, 29), "Соединитель Разъём 14");
    assert!(doc.row_is_empty(30));
}

#[test]
fn row_heights_follow_page_layout() {
    let heights = SpecRowHeights::new(1);
    assert_eq!(heights.spec_row_height(1), 810);
    assert_eq!(heights.spec_row_height(28), 810);
    assert_eq!(heights.spec_row_height(29), 813);
    assert_eq!(heights.spec_row_height(60), 817);

    let customer = SpecRowHeights::new(3);
    assert_eq!(customer.spec_row_height(1), 827);
    assert_eq!(customer.spec_row_height(26), 833);
    assert_eq!(customer.spec_row_height(58), 817);
}

#[test]
fn built_rows_get_their_heights() {
    let state = BuildState::new();
    let mut doc = SpecDocument::new(1);
    builder(other_parts_only(), resistors(), &state).build(&mut doc);

    assert_eq!(doc.row_height(0), 1500);
    assert!((1..doc.row_count()).all(|r| doc.row_height(r) == 810));
}

#[test]
fn library_entry_point_builds_on_a_worker() {
    let (doc, outcome) = kispec::build_specification(
        Box::new(resistors()),
        Box::new(common::roomy_meter()),
        &other_parts_only(),
    )
    .unwrap();

    assert_eq!(outcome, BuildOutcome::Built { rows: 4, pages: 1 });
    assert_eq!(common::names(&doc)[3], "Резистор 10 кОм");
    assert!(!BuildState::global().is_building());
}
