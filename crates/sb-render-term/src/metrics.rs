use sb_core::{FragmentKind, GlyphMetrics};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Glyph widths measured in terminal columns.
///
/// Chords and text share one cell grid, so the style is ignored. Control
/// characters take no space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminalMetrics;

impl GlyphMetrics for TerminalMetrics {
    fn char_width(&self, _kind: FragmentKind, c: char) -> f32 {
        columns_to_width(c.width().unwrap_or(0))
    }

    fn text_width(&self, _kind: FragmentKind, text: &str) -> f32 {
        columns_to_width(text.width())
    }
}

#[allow(clippy::cast_precision_loss)]
fn columns_to_width(columns: usize) -> f32 {
    columns as f32
}
