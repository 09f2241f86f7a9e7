use pdf_writer::{Content, Name, Str};

use crate::document::TableRow;
use crate::fonts::{EmbeddedFont, Font};
use crate::measure::CELL_PADDING_MM;
use crate::model::{Column, RowStyle};

use super::mm;

/// Border line width (0.5 mm).
const LINE_WIDTH: f32 = 1.417;

pub(super) struct TableStyle<'a> {
    pub(super) font: &'a Font,
    pub(super) embedded: &'a EmbeddedFont,
    pub(super) font_size: f32,
    pub(super) left: f32,
}

impl TableStyle<'_> {
    fn text_width(&self, text: &str, scale: u32) -> f32 {
        self.font.text_width_1000(text) * self.font_size / 1000.0 * scale as f32 / 100.0
    }

    fn column_left(&self, column: Column) -> f32 {
        self.left
            + Column::ALL[..column.index()]
                .iter()
                .map(|c| mm(c.width_mm()))
                .sum::<f32>()
    }

    fn table_width(&self) -> f32 {
        Column::ALL.iter().map(|c| mm(c.width_mm())).sum()
    }
}

fn is_narrow(column: Column) -> bool {
    matches!(
        column,
        Column::Format | Column::Zone | Column::Position | Column::Quantity
    )
}

fn show(content: &mut Content, style: &TableStyle, text: &str, scale: u32, x: f32, y: f32) {
    content.begin_text();
    content.set_font(Name(style.embedded.pdf_name.as_bytes()), style.font_size);
    content.set_horizontal_scaling(scale as f32);
    content.next_line(x, y);
    content.show(Str(&style.embedded.encode(text)));
    content.end_text();
}

fn draw_grid(content: &mut Content, style: &TableStyle, top: f32, bottom: f32) {
    content.save_state();
    content.set_line_width(LINE_WIDTH);
    for column in Column::ALL.iter().skip(1) {
        let x = style.column_left(*column);
        content.move_to(x, top);
        content.line_to(x, bottom);
    }
    content.move_to(style.left, bottom);
    content.line_to(style.left + style.table_width(), bottom);
    content.stroke();
    content.restore_state();
}

/// Draws the header row with its top edge at `top`. Returns its bottom edge.
pub(super) fn draw_header(content: &mut Content, style: &TableStyle, header: &TableRow, top: f32) -> f32 {
    let height = header.height as f32 / 100.0;
    let bottom = top - mm(height);
    let ascent = style.font_size * style.font.ascender_ratio();

    for column in Column::ALL {
        let text = &header.cells[column.index()].text;
        let x0 = style.column_left(column);
        let width = mm(column.width_mm());
        if is_narrow(column) {
            // Narrow columns carry their caption rotated by 90 degrees.
            let w = style.text_width(text, 100);
            let x = x0 + (width + ascent * 0.7) / 2.0;
            let y = bottom + (mm(height) - w) / 2.0;
            content.begin_text();
            content.set_font(Name(style.embedded.pdf_name.as_bytes()), style.font_size);
            content.set_text_matrix([0.0, 1.0, -1.0, 0.0, x, y]);
            content.show(Str(&style.embedded.encode(text)));
            content.end_text();
            continue;
        }
        let lines: Vec<&str> = text.lines().collect();
        let line_h = style.font_size * 1.2;
        let block_h = line_h * lines.len() as f32;
        let mut y = top - (mm(height) - block_h) / 2.0 - ascent;
        for line in lines {
            let x = x0 + (width - style.text_width(line, 100)) / 2.0;
            show(content, style, line, 100, x, y);
            y -= line_h;
        }
    }

    content.save_state();
    content.set_line_width(LINE_WIDTH);
    content.rect(style.left, bottom, style.table_width(), mm(height));
    content.stroke();
    content.restore_state();
    draw_grid(content, style, top, bottom);
    bottom
}

/// Draws content rows from `top` downwards. `positions` holds the running
/// position number of each row. Returns the bottom edge of the last row.
pub(super) fn draw_rows(
    content: &mut Content,
    style: &TableStyle,
    rows: &[TableRow],
    positions: &[Option<u32>],
    top: f32,
) -> f32 {
    let mut row_top = top;
    let ascent = style.font_size * style.font.ascender_ratio();
    let padding = mm(CELL_PADDING_MM);

    for (row, position) in rows.iter().zip(positions) {
        let row_h = mm(row.height as f32 / 100.0);
        let row_bottom = row_top - row_h;
        let baseline = row_bottom + (row_h - ascent) / 2.0;

        for column in Column::ALL {
            let cell = &row.cells[column.index()];
            let number;
            let (text, scale) = match (column, position) {
                (Column::Position, Some(n)) => {
                    number = n.to_string();
                    (number.as_str(), 100)
                }
                _ => (cell.text.as_str(), cell.scale.max(1)),
            };
            if text.is_empty() {
                continue;
            }
            let x0 = style.column_left(column);
            let width = mm(column.width_mm());
            let text_w = style.text_width(text, scale);
            let centred = is_narrow(column) || (column == Column::Name && row.style.is_title());
            let x = if centred {
                x0 + (width - text_w) / 2.0
            } else {
                x0 + padding
            };
            show(content, style, text, scale, x, baseline);

            if column == Column::Name && row.style == RowStyle::SectionTitle {
                content.save_state();
                content.set_line_width(0.5);
                content.move_to(x, baseline - 1.5);
                content.line_to(x + text_w, baseline - 1.5);
                content.stroke();
                content.restore_state();
            }
        }

        draw_grid(content, style, row_top, row_bottom);
        row_top = row_bottom;
    }

    row_top
}
