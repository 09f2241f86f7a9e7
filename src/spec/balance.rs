//! Fitting cell text into column widths.
//!
//! A value that would need more horizontal compression than the configured
//! extreme factor is cut at a word boundary; the rest moves to a
//! continuation row below.

use std::collections::VecDeque;

use crate::measure::WidthMeter;
use crate::model::{COLUMN_COUNT, Cell, Column, Row};

/// Result of fitting one value into a cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Balanced {
    pub value: String,
    /// Text for the continuation row, empty when everything fits.
    pub residual: String,
    /// Horizontal scale (percent) the value is printed with.
    pub scale: u32,
}

fn is_break(column: Column, ch: char) -> bool {
    match column {
        Column::Comment => ch == ' ' || ch == '-',
        _ => ch == ' ',
    }
}

/// Character index of the break to cut `chars` at, preferring the last one
/// before `extreme` and falling back to the first one at or after it.
fn find_break(column: Column, chars: &[char], extreme: usize) -> Option<usize> {
    let extreme = extreme.min(chars.len());
    chars[..extreme]
        .iter()
        .rposition(|&c| is_break(column, c))
        .or_else(|| {
            chars[extreme..]
                .iter()
                .position(|&c| is_break(column, c))
                .map(|p| p + extreme)
        })
}

fn join_lines(head: String, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (_, true) => head,
        (true, false) => tail.to_string(),
        (false, false) => format!("{head}\n{tail}"),
    }
}

/// Fits `text` into `column`.
///
/// Only the first line of `text` is placed; later lines always go to the
/// residual. Designator, name and comment values that need a scale below
/// `extreme` are additionally cut at a space (or, in the comment column, a
/// hyphen, which stays on the first row).
pub fn balance(meter: &dyn WidthMeter, column: Column, text: &str, extreme: u32) -> Balanced {
    let (head, continuation) = match text.split_once('\n') {
        Some((head, rest)) => (head, rest),
        None => (text, ""),
    };

    let factor = meter.width_factor(column, head);
    let splittable = matches!(column, Column::Designator | Column::Name | Column::Comment);
    if factor >= extreme || !splittable {
        return Balanced {
            value: head.to_string(),
            residual: continuation.to_string(),
            scale: factor.min(100),
        };
    }

    let chars: Vec<char> = head.chars().collect();
    let extreme_pos = (chars.len() as u64 * u64::from(factor) / u64::from(extreme.max(1))) as usize;

    let Some(pos) = find_break(column, &chars, extreme_pos) else {
        log::debug!("{column:?}: no break in {head:?}, kept at scale {factor}");
        return Balanced {
            value: head.to_string(),
            residual: continuation.to_string(),
            scale: factor.min(100),
        };
    };

    let keep = if chars[pos] == '-' { pos + 1 } else { pos };
    let value: String = chars[..keep].iter().collect();
    let rest: String = chars[pos + 1..].iter().collect();
    let scale = meter.width_factor(column, &value).min(100);
    log::debug!("{column:?}: split {head:?} at {pos} (extreme {extreme_pos}, factor {factor})");

    Balanced {
        value,
        residual: join_lines(rest, continuation),
        scale,
    }
}

/// A row with every cell fitted, ready to be written to the document.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedRow {
    pub cells: [Cell; COLUMN_COUNT],
    pub style: crate::model::RowStyle,
    pub increment: u32,
}

/// Expands `row` into itself plus as many continuation rows as its cells
/// need. Continuations keep the style of the row but carry no position
/// increment.
pub fn expand_row(meter: &dyn WidthMeter, row: Row, extreme: u32) -> Vec<FittedRow> {
    let mut fitted = Vec::new();
    let mut queue = VecDeque::from([row]);

    while let Some(row) = queue.pop_front() {
        let mut residual: [String; COLUMN_COUNT] = Default::default();
        let cells = Column::ALL.map(|column| {
            let b = balance(meter, column, row.value(column), extreme);
            residual[column.index()] = b.residual;
            Cell {
                text: b.value,
                scale: b.scale,
            }
        });

        if residual.iter().any(|r| !r.is_empty()) {
            queue.push_back(Row {
                values: residual,
                style: row.style,
                increment: 0,
            });
        }

        fitted.push(FittedRow {
            cells,
            style: row.style,
            increment: row.increment,
        });
    }

    fitted
}
