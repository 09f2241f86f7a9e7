//! Page-boundary repairs of a finished table.

use crate::document::{Batch, Document, sheet_capacity};
use crate::model::Column;

/// Table row indices that sit on a page boundary.
///
/// Row 0 is the header, so with `first_rows` content rows on the first sheet
/// the last row of that sheet has index `first_rows`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageLayout {
    pub first_rows: usize,
    pub other_rows: usize,
}

impl PageLayout {
    /// Boundaries at the last row of every sheet.
    pub fn last_rows(first_page_variant: u8) -> Self {
        let (first_rows, other_rows) = sheet_capacity(first_page_variant);
        Self {
            first_rows,
            other_rows,
        }
    }

    /// Boundaries at the first row of every sheet after the first.
    pub fn first_rows(first_page_variant: u8) -> Self {
        let (first_rows, other_rows) = sheet_capacity(first_page_variant);
        Self {
            first_rows: first_rows + 1,
            other_rows,
        }
    }
}

fn is_title<D: Document + ?Sized>(doc: &D, row: usize) -> bool {
    doc.row_style(row).is_title() && !doc.cell_text(Column::Name, row).is_empty()
}

/// Pushes section and group titles that would end a page onto the next one.
///
/// For each boundary row holding a title, the chain of titles ending there
/// is moved down by inserting as many empty rows directly before it. Returns
/// the number of rows inserted.
pub fn forbid_trailing_titles<D: Document + ?Sized>(doc: &mut D, layout: PageLayout) -> usize {
    let mut inserted = 0;
    let mut pos = layout.first_rows;
    while pos < doc.row_count() {
        if is_title(doc, pos) {
            let mut offset = 1;
            while pos > offset {
                if !is_title(doc, pos - offset) {
                    let mut batch = Batch::new(doc);
                    batch.insert_rows(pos - offset + 1, offset);
                    inserted += offset;
                    log::debug!("Title at row {pos} moved down by {offset} rows");
                    break;
                }
                offset += 1;
            }
        }
        pos += layout.other_rows.max(1);
    }
    inserted
}

/// Removes empty rows that would open a page. Returns the number of rows
/// removed.
pub fn forbid_leading_blanks<D: Document + ?Sized>(doc: &mut D, layout: PageLayout) -> usize {
    let mut removed = 0;
    let mut pos = layout.first_rows;
    while pos < doc.row_count() {
        let mut batch = Batch::new(doc);
        while pos < batch.row_count() && batch.row_is_empty(pos) {
            batch.remove_rows(pos, 1);
            removed += 1;
        }
        drop(batch);
        pos += layout.other_rows.max(1);
    }
    if removed > 0 {
        log::debug!("Removed {removed} empty rows at page tops");
    }
    removed
}
