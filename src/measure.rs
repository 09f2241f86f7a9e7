use crate::fonts::Font;
use crate::model::Column;

/// Horizontal padding inside a cell on each side, in millimetres.
pub const CELL_PADDING_MM: f32 = 0.5;

const PT_PER_MM: f32 = 72.0 / 25.4;

/// Reports how much a text would have to be compressed to fit one line of a
/// column.
pub trait WidthMeter: Send {
    /// Horizontal scale in percent that makes `text` exactly fill one line of
    /// `column`. Text that already fits reports 100.
    fn width_factor(&self, column: Column, text: &str) -> u32;
}

impl<F> WidthMeter for F
where
    F: Fn(Column, &str) -> u32 + Send,
{
    fn width_factor(&self, column: Column, text: &str) -> u32 {
        self(column, text)
    }
}

/// Measures text with real glyph advances at the printed font size.
pub struct FontMeter {
    font: Font,
    font_size: f32,
}

impl FontMeter {
    pub fn new(font: Font, font_size: f32) -> Self {
        Self { font, font_size }
    }

    /// Usable text width of a column in points.
    pub fn capacity_pt(column: Column) -> f32 {
        (column.width_mm() - 2.0 * CELL_PADDING_MM).max(0.0) * PT_PER_MM
    }

    pub fn text_width_pt(&self, text: &str) -> f32 {
        self.font.text_width_1000(text) * self.font_size / 1000.0
    }
}

impl WidthMeter for FontMeter {
    fn width_factor(&self, column: Column, text: &str) -> u32 {
        let width = self.text_width_pt(text);
        let capacity = Self::capacity_pt(column);
        if width <= capacity {
            return 100;
        }
        // Truncation keeps the factor on the "does not fit" side.
        (capacity / width * 100.0) as u32
    }
}
