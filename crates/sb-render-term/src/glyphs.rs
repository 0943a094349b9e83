//! Unicode and ASCII fallback glyphs.

use std::str::FromStr;

use sb_core::{LINE_WRAPPER_CHAR, ParseSettingError};
use serde::{Deserialize, Serialize};

/// Whether output may use non-ASCII glyphs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GlyphMode {
    #[default]
    Unicode,
    Ascii,
}

impl GlyphMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unicode => "unicode",
            Self::Ascii => "ascii",
        }
    }
}

impl FromStr for GlyphMode {
    type Err = ParseSettingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unicode" | "utf8" | "utf-8" => Ok(Self::Unicode),
            "ascii" => Ok(Self::Ascii),
            _ => Err(ParseSettingError::new("glyph mode", value)),
        }
    }
}

/// Characters used by the lyrics painter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LyricsGlyphs {
    pub line_wrapper: char,
}

impl LyricsGlyphs {
    pub const UNICODE: Self = Self {
        line_wrapper: LINE_WRAPPER_CHAR,
    };

    pub const ASCII: Self = Self { line_wrapper: '\\' };

    /// Get the appropriate glyph set for the mode.
    #[must_use]
    pub const fn for_mode(mode: GlyphMode) -> Self {
        match mode {
            GlyphMode::Unicode => Self::UNICODE,
            GlyphMode::Ascii => Self::ASCII,
        }
    }
}

/// Characters used by chord diagrams.
///
/// Every glyph is one column wide so rows of a diagram stay aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramGlyphs {
    pub muted: char,
    pub open: char,
    /// Sign of fretted strings when the diagram does not start at fret 1.
    pub ellipsis: char,
    pub fret_bar: char,
    pub empty_cell: char,
}

impl DiagramGlyphs {
    pub const UNICODE: Self = Self {
        muted: 'x',
        open: '0',
        ellipsis: '\u{2026}',
        fret_bar: '|',
        empty_cell: '-',
    };

    pub const ASCII: Self = Self {
        ellipsis: ':',
        ..Self::UNICODE
    };

    /// Get the appropriate diagram glyphs for the mode.
    #[must_use]
    pub const fn for_mode(mode: GlyphMode) -> Self {
        match mode {
            GlyphMode::Unicode => Self::UNICODE,
            GlyphMode::Ascii => Self::ASCII,
        }
    }
}
