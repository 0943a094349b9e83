//! Terminal renderer configuration types.

use serde::{Deserialize, Serialize};

use crate::glyphs::{DiagramGlyphs, GlyphMode, LyricsGlyphs};

/// Configuration for painting lyrics and diagrams to a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TermRenderConfig {
    /// Glyph mode (Unicode vs ASCII fallback).
    pub glyph_mode: GlyphMode,
    /// Emphasize chords with ANSI bold.
    pub bold_chords: bool,
    /// Strip trailing spaces from painted rows.
    pub trim_trailing: bool,
}

impl Default for TermRenderConfig {
    fn default() -> Self {
        Self {
            glyph_mode: GlyphMode::Unicode,
            bold_chords: false,
            trim_trailing: true,
        }
    }
}

impl TermRenderConfig {
    /// Plain ASCII output, e.g. for piping into files.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            glyph_mode: GlyphMode::Ascii,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn lyrics_glyphs(&self) -> LyricsGlyphs {
        LyricsGlyphs::for_mode(self.glyph_mode)
    }

    #[must_use]
    pub const fn diagram_glyphs(&self) -> DiagramGlyphs {
        DiagramGlyphs::for_mode(self.glyph_mode)
    }
}
