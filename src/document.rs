//! Specification table inside a document.
//!
//! The builder edits the table only through [`Document`]. [`SpecDocument`]
//! is the in-memory implementation that the PDF renderer prints.

use crate::model::{COLUMN_COUNT, Cell, Column, Row, RowStyle};

/// Structural and text edits the builder performs on the table.
///
/// Row 0 is the header row; content rows follow it.
pub trait Document: Send {
    fn row_count(&self) -> usize;

    /// Drops every row and leaves the header plus one empty row. Anything
    /// appended after the table is removed as well.
    fn reset(&mut self);

    /// Inserts `count` empty rows so that the first of them gets `index`.
    fn insert_rows(&mut self, index: usize, count: usize);
    fn remove_rows(&mut self, index: usize, count: usize);

    fn cell_text(&self, column: Column, row: usize) -> &str;
    fn set_cell(&mut self, column: Column, row: usize, cell: Cell);

    fn row_style(&self, row: usize) -> RowStyle;
    fn set_row_style(&mut self, row: usize, style: RowStyle);

    fn position_increment(&self, row: usize) -> u32;
    fn set_position_increment(&mut self, row: usize, increment: u32);

    fn row_height(&self, row: usize) -> u32;
    /// Height in 1/100 mm.
    fn set_row_height(&mut self, row: usize, height: u32);

    /// Freezes rendering until the matching [`unlock`](Document::unlock).
    fn lock(&mut self);
    fn unlock(&mut self);

    fn first_page_variant(&self) -> u8;
    fn page_count(&self) -> usize;
    fn append_revision_table(&mut self);

    /// True when every cell of the row is empty and it shows no position number.
    fn row_is_empty(&self, row: usize) -> bool {
        self.position_increment(row) == 0
            && Column::ALL.iter().all(|&c| self.cell_text(c, row).is_empty())
    }
}

/// Keeps the document frozen for as long as it lives.
pub struct Batch<'a, D: Document + ?Sized> {
    doc: &'a mut D,
}

impl<'a, D: Document + ?Sized> Batch<'a, D> {
    pub fn new(doc: &'a mut D) -> Self {
        doc.lock();
        Self { doc }
    }
}

impl<D: Document + ?Sized> std::ops::Deref for Batch<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.doc
    }
}

impl<D: Document + ?Sized> std::ops::DerefMut for Batch<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.doc
    }
}

impl<D: Document + ?Sized> Drop for Batch<'_, D> {
    fn drop(&mut self) {
        self.doc.unlock();
    }
}

pub const HEADER_HEIGHT: u32 = 1500;
pub const DEFAULT_ROW_HEIGHT: u32 = 800;

#[derive(Clone, Debug)]
pub struct TableRow {
    pub cells: [Cell; COLUMN_COUNT],
    pub style: RowStyle,
    pub increment: u32,
    pub height: u32, // 1/100 mm
}

impl Default for TableRow {
    fn default() -> Self {
        Self {
            cells: Default::default(),
            style: RowStyle::Normal,
            increment: 0,
            height: DEFAULT_ROW_HEIGHT,
        }
    }
}

impl TableRow {
    fn header() -> Self {
        Self {
            cells: Column::ALL.map(|c| Cell {
                text: c.caption().to_string(),
                scale: 100,
            }),
            height: HEADER_HEIGHT,
            ..Self::default()
        }
    }
}

/// Content rows that fit on the first sheet and on every following one.
/// The header row is repeated on each sheet and is not counted.
pub fn sheet_capacity(first_page_variant: u8) -> (usize, usize) {
    if matches!(first_page_variant, 3 | 4) {
        (26, 32)
    } else {
        (28, 32)
    }
}

/// In-memory specification table.
#[derive(Clone, Debug)]
pub struct SpecDocument {
    rows: Vec<TableRow>,
    first_page_variant: u8,
    lock_depth: u32,
    revision_table: bool,
}

impl SpecDocument {
    pub fn new(first_page_variant: u8) -> Self {
        let mut doc = Self {
            rows: Vec::new(),
            first_page_variant,
            lock_depth: 0,
            revision_table: false,
        };
        doc.reset();
        doc
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn is_locked(&self) -> bool {
        self.lock_depth > 0
    }

    pub fn has_revision_table(&self) -> bool {
        self.revision_table
    }

    /// Writes a whole row at `index`, replacing cell contents, style and increment.
    pub fn write_row(&mut self, index: usize, row: &Row) {
        for column in Column::ALL {
            self.set_cell(
                column,
                index,
                Cell {
                    text: row.value(column).to_string(),
                    scale: 100,
                },
            );
        }
        self.set_row_style(index, row.style);
        self.set_position_increment(index, row.increment);
    }

    /// Running position number shown on each row, `None` where the row
    /// carries no increment.
    pub fn positions(&self) -> Vec<Option<u32>> {
        let mut counter = 0u32;
        self.rows
            .iter()
            .map(|row| {
                if row.increment == 0 {
                    None
                } else {
                    counter += row.increment;
                    Some(counter)
                }
            })
            .collect()
    }

    /// Plain-text dump of the content rows, one line per row with cells
    /// separated by `|`.
    pub fn to_text(&self) -> String {
        let positions = self.positions();
        let mut out = String::new();
        for (i, row) in self.rows.iter().enumerate().skip(1) {
            let cells: Vec<String> = Column::ALL
                .iter()
                .map(|&c| match (c, positions[i]) {
                    (Column::Position, Some(n)) => n.to_string(),
                    _ => row.cells[c.index()].text.clone(),
                })
                .collect();
            out.push_str(&cells.join("|"));
            out.push('\n');
        }
        out
    }
}

impl Document for SpecDocument {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn reset(&mut self) {
        self.revision_table = false;
        self.rows.clear();
        self.rows.push(TableRow::header());
        self.rows.push(TableRow::default());
    }

    fn insert_rows(&mut self, index: usize, count: usize) {
        let index = index.min(self.rows.len());
        self.rows
            .splice(index..index, std::iter::repeat_n(TableRow::default(), count));
    }

    fn remove_rows(&mut self, index: usize, count: usize) {
        let start = index.min(self.rows.len());
        let end = index.saturating_add(count).min(self.rows.len());
        self.rows.drain(start..end);
    }

    fn cell_text(&self, column: Column, row: usize) -> &str {
        self.rows
            .get(row)
            .map(|r| r.cells[column.index()].text.as_str())
            .unwrap_or("")
    }

    fn set_cell(&mut self, column: Column, row: usize, cell: Cell) {
        if let Some(r) = self.rows.get_mut(row) {
            r.cells[column.index()] = cell;
        }
    }

    fn row_style(&self, row: usize) -> RowStyle {
        self.rows.get(row).map(|r| r.style).unwrap_or_default()
    }

    fn set_row_style(&mut self, row: usize, style: RowStyle) {
        if let Some(r) = self.rows.get_mut(row) {
            r.style = style;
        }
    }

    fn position_increment(&self, row: usize) -> u32 {
        self.rows.get(row).map_or(0, |r| r.increment)
    }

    fn set_position_increment(&mut self, row: usize, increment: u32) {
        if let Some(r) = self.rows.get_mut(row) {
            r.increment = increment;
        }
    }

    fn row_height(&self, row: usize) -> u32 {
        self.rows.get(row).map_or(0, |r| r.height)
    }

    fn set_row_height(&mut self, row: usize, height: u32) {
        if let Some(r) = self.rows.get_mut(row) {
            r.height = height;
        }
    }

    fn lock(&mut self) {
        self.lock_depth += 1;
    }

    fn unlock(&mut self) {
        self.lock_depth = self.lock_depth.saturating_sub(1);
    }

    fn first_page_variant(&self) -> u8 {
        self.first_page_variant
    }

    fn page_count(&self) -> usize {
        let (first, other) = sheet_capacity(self.first_page_variant);
        let content = self.rows.len().saturating_sub(1);
        let table_pages = if content <= first {
            1
        } else {
            1 + (content - first).div_ceil(other)
        };
        table_pages + usize::from(self.revision_table)
    }

    fn append_revision_table(&mut self) {
        self.revision_table = true;
    }
}
