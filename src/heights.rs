use crate::document::sheet_capacity;

/// Height of each table row, chosen so that the last row of every sheet
/// ends exactly on the title block frame.
pub trait RowHeights: Send {
    /// Height of content row `row` (1-based, row 0 is the header) in 1/100 mm.
    fn spec_row_height(&self, row: usize) -> u32;
}

#[derive(Clone, Copy, Debug)]
pub struct SpecRowHeights {
    first_page_variant: u8,
}

impl SpecRowHeights {
    pub fn new(first_page_variant: u8) -> Self {
        Self { first_page_variant }
    }
}

impl RowHeights for SpecRowHeights {
    fn spec_row_height(&self, row: usize) -> u32 {
        let (first_rows, other_rows) = sheet_capacity(self.first_page_variant);
        let customer_columns = matches!(self.first_page_variant, 3 | 4);
        if row <= first_rows {
            match (customer_columns, row == first_rows) {
                (false, _) => 810,
                (true, true) => 833,
                (true, false) => 827,
            }
        } else if (row - first_rows) % other_rows == 0 {
            817
        } else {
            813
        }
    }
}
