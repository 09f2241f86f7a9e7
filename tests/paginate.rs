mod common;

use kispec::spec::paginate::{PageLayout, forbid_leading_blanks, forbid_trailing_titles};
use kispec::{Column, Document, Row, RowStyle, SpecDocument};

/// Document whose content rows are `rows`, row 1 being the first.
fn document(variant: u8, rows: &[Row]) -> SpecDocument {
    let mut doc = SpecDocument::new(variant);
    doc.insert_rows(1, rows.len());
    for (i, row) in rows.iter().enumerate() {
        doc.write_row(i + 1, row);
    }
    doc.remove_rows(rows.len() + 1, 1);
    doc
}

fn part(n: usize) -> Row {
    Row::new(["", "", "", "", format!("Деталь {n}").as_str(), "1", ""]).with_increment(1)
}

/// `count` part rows with the row at each `(index, row)` replaced.
fn table(count: usize, overrides: Vec<(usize, Row)>) -> Vec<Row> {
    let mut rows: Vec<Row> = (1..=count).map(part).collect();
    for (index, row) in overrides {
        rows[index - 1] = row;
    }
    rows
}

fn section_title(text: &str) -> Row {
    Row::new(["", "", "", "", text, "", ""]).with_style(RowStyle::SectionTitle)
}

fn group_title(text: &str) -> Row {
    Row::new(["", "", "", "", text, "", ""]).with_style(RowStyle::GroupTitle)
}

#[test]
fn layouts_follow_sheet_capacity() {
    assert_eq!(
        PageLayout::last_rows(1),
        PageLayout {
            first_rows: 28,
            other_rows: 32
        }
    );
    assert_eq!(PageLayout::last_rows(3).first_rows, 26);
    assert_eq!(PageLayout::first_rows(2).first_rows, 29);
    assert_eq!(PageLayout::first_rows(4).first_rows, 27);
}

#[test]
fn title_on_last_row_moves_to_next_page() {
    let mut doc = document(1, &table(40, vec![(28, section_title("Прочие изделия"))]));

    let inserted = forbid_trailing_titles(&mut doc, PageLayout::last_rows(1));

    assert_eq!(inserted, 1);
    assert_eq!(doc.row_count(), 42);
    assert!(doc.row_is_empty(28));
    assert_eq!(doc.cell_text(Column::Name, 29), "Прочие изделия");
    assert_eq!(doc.row_style(29), RowStyle::SectionTitle);
    assert_eq!(doc.cell_text(Column::Name, 27), "Деталь 27");
    assert!(!doc.is_locked());
}

#[test]
fn chain_of_titles_moves_together() {
    let mut doc = document(
        1,
        &table(
            40,
            vec![
                (27, section_title("Прочие изделия")),
                (28, group_title("Резисторы")),
            ],
        ),
    );

    let inserted = forbid_trailing_titles(&mut doc, PageLayout::last_rows(1));

    assert_eq!(inserted, 2);
    assert!(doc.row_is_empty(27));
    assert!(doc.row_is_empty(28));
    assert_eq!(doc.cell_text(Column::Name, 29), "Прочие изделия");
    assert_eq!(doc.cell_text(Column::Name, 30), "Резисторы");
    assert_eq!(doc.cell_text(Column::Name, 31), "Деталь 29");
}

#[test]
fn titles_elsewhere_are_left_alone() {
    let rows = table(40, vec![(27, section_title("Прочие изделия"))]);
    let mut doc = document(1, &rows);

    assert_eq!(forbid_trailing_titles(&mut doc, PageLayout::last_rows(1)), 0);
    assert_eq!(doc.row_count(), 41);
}

#[test]
fn empty_title_row_is_not_a_title() {
    let rows = table(40, vec![(28, section_title(""))]);
    let mut doc = document(1, &rows);

    assert_eq!(forbid_trailing_titles(&mut doc, PageLayout::last_rows(1)), 0);
}

#[test]
fn later_page_boundaries_are_checked() {
    let mut doc = document(1, &table(70, vec![(60, group_title("Диоды"))]));

    assert_eq!(forbid_trailing_titles(&mut doc, PageLayout::last_rows(1)), 1);
    assert_eq!(doc.cell_text(Column::Name, 61), "Диоды");
}

#[test]
fn first_page_variant_shifts_boundary() {
    let mut doc = document(3, &table(40, vec![(26, group_title("Диоды"))]));

    assert_eq!(forbid_trailing_titles(&mut doc, PageLayout::last_rows(3)), 1);
    assert_eq!(doc.cell_text(Column::Name, 27), "Диоды");
}

#[test]
fn blank_rows_at_page_top_are_removed() {
    let mut doc = document(
        1,
        &table(40, vec![(29, Row::blank()), (30, Row::blank())]),
    );

    let removed = forbid_leading_blanks(&mut doc, PageLayout::first_rows(1));

    assert_eq!(removed, 2);
    assert_eq!(doc.row_count(), 39);
    assert_eq!(doc.cell_text(Column::Name, 28), "Деталь 28");
    assert_eq!(doc.cell_text(Column::Name, 29), "Деталь 31");
    assert!(!doc.is_locked());
}

#[test]
fn reserved_position_row_is_kept() {
    let mut doc = document(
        1,
        &table(40, vec![(29, Row::blank().with_increment(1))]),
    );

    assert_eq!(forbid_leading_blanks(&mut doc, PageLayout::first_rows(1)), 0);
    assert_eq!(doc.row_count(), 41);
}

#[test]
fn blank_rows_before_the_boundary_stay() {
    let mut doc = document(1, &table(40, vec![(28, Row::blank())]));

    assert_eq!(forbid_leading_blanks(&mut doc, PageLayout::first_rows(1)), 0);
    assert!(doc.row_is_empty(28));
}

#[test]
fn trailing_blanks_at_table_end_are_removed() {
    let mut doc = document(
        1,
        &table(30, vec![(29, Row::blank()), (30, Row::blank())]),
    );

    assert_eq!(forbid_leading_blanks(&mut doc, PageLayout::first_rows(1)), 2);
    assert_eq!(doc.row_count(), 29);
}
