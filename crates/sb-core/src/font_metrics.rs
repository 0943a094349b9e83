//! Glyph width lookup consumed by the layout engine.
//!
//! The engine never shapes text. It asks a [`GlyphMetrics`] implementation
//! for the width of each character in a given style and sums the answers.
//! Two implementations live here: [`LengthMapper`], an explicit table of
//! widths, and [`FontMetrics`], a deterministic estimate based on character
//! width classes.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::lyrics::FragmentKind;

/// Width of a single glyph rendered in a given style.
///
/// Implementations must be pure: the same `(kind, c)` always yields the
/// same width.
pub trait GlyphMetrics {
    fn char_width(&self, kind: FragmentKind, c: char) -> f32;

    fn text_width(&self, kind: FragmentKind, text: &str) -> f32 {
        text.chars().map(|c| self.char_width(kind, c)).sum()
    }

    fn space_width(&self, kind: FragmentKind) -> f32 {
        self.char_width(kind, ' ')
    }
}

impl<T: GlyphMetrics + ?Sized> GlyphMetrics for &T {
    fn char_width(&self, kind: FragmentKind, c: char) -> f32 {
        (**self).char_width(kind, c)
    }
}

/// Explicit character width table.
///
/// Chord-styled lookups fall back to the text table, then to the default
/// width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LengthMapper {
    text: FxHashMap<char, f32>,
    chords: FxHashMap<char, f32>,
    default_width: f32,
}

impl LengthMapper {
    #[must_use]
    pub fn new(default_width: f32) -> Self {
        Self {
            default_width,
            ..Self::default()
        }
    }

    /// Every glyph one unit wide, in both styles.
    #[must_use]
    pub fn monospace() -> Self {
        Self::new(1.0)
    }

    #[must_use]
    pub fn from_pairs(pairs: impl IntoIterator<Item = (char, f32)>, default_width: f32) -> Self {
        let mut mapper = Self::new(default_width);
        mapper.text.extend(pairs);
        mapper
    }

    #[must_use]
    pub fn with_char(mut self, c: char, width: f32) -> Self {
        self.text.insert(c, width);
        self
    }

    #[must_use]
    pub fn with_chord_char(mut self, c: char, width: f32) -> Self {
        self.chords.insert(c, width);
        self
    }
}

impl GlyphMetrics for LengthMapper {
    fn char_width(&self, kind: FragmentKind, c: char) -> f32 {
        let styled = match kind {
            FragmentKind::Chord => self.chords.get(&c),
            FragmentKind::Text | FragmentKind::LineWrapper => None,
        };
        styled
            .or_else(|| self.text.get(&c))
            .copied()
            .unwrap_or(self.default_width)
    }
}

/// Font metrics preset for known font families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontPreset {
    #[default]
    SansSerif,
    Monospace,
    Serif,
    Condensed,
}

impl FontPreset {
    #[must_use]
    pub fn from_family(family: &str) -> Self {
        let lower = family.to_lowercase();
        if lower.contains("mono") || lower.contains("courier") || lower.contains("consolas") {
            Self::Monospace
        } else if lower.contains("condensed") || lower.contains("narrow") {
            Self::Condensed
        } else if lower.contains("times") || (lower.contains("serif") && !lower.contains("sans")) {
            Self::Serif
        } else {
            Self::SansSerif
        }
    }

    /// Average glyph width relative to the em size.
    #[must_use]
    pub const fn avg_char_ratio(self) -> f32 {
        match self {
            Self::SansSerif => 0.55,
            Self::Monospace => 0.60,
            Self::Serif => 0.52,
            Self::Condensed => 0.45,
        }
    }

    #[must_use]
    pub const fn is_fixed_width(self) -> bool {
        matches!(self, Self::Monospace)
    }
}

/// Character width class for proportional fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharWidthClass {
    VeryNarrow,
    Narrow,
    Half,
    Normal,
    Wide,
    VeryWide,
}

impl CharWidthClass {
    #[must_use]
    pub fn classify(c: char) -> Self {
        match c {
            'i' | 'l' | '|' | '!' | '\'' | '.' | ',' | ':' | ';' => Self::VeryNarrow,
            'I' | 'j' | 't' | 'f' | 'r' | '(' | ')' | '/' | '-' => Self::Narrow,
            ' ' => Self::Half,
            'w' | 'm' | '#' => Self::Wide,
            'W' | 'M' | '@' | '%' | crate::LINE_WRAPPER_CHAR => Self::VeryWide,
            _ => Self::Normal,
        }
    }

    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::VeryNarrow => 0.4,
            Self::Narrow => 0.6,
            Self::Half => 0.5,
            Self::Normal => 1.0,
            Self::Wide => 1.2,
            Self::VeryWide => 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontMetricsConfig {
    pub preset: FontPreset,
    /// Font size in pixels.
    pub font_size: f32,
    /// Chords are drawn bold; their glyphs are this much wider than text.
    pub chord_weight: f32,
}

impl Default for FontMetricsConfig {
    fn default() -> Self {
        Self {
            preset: FontPreset::SansSerif,
            font_size: 15.0,
            chord_weight: 1.1,
        }
    }
}

/// Width estimate from character classes, deterministic across platforms.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    config: FontMetricsConfig,
    avg_char_width: f32,
}

impl FontMetrics {
    #[must_use]
    pub fn new(config: FontMetricsConfig) -> Self {
        let avg_char_width = config.font_size * config.preset.avg_char_ratio();
        Self {
            config,
            avg_char_width,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &FontMetricsConfig {
        &self.config
    }

    #[must_use]
    pub const fn avg_char_width(&self) -> f32 {
        self.avg_char_width
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::new(FontMetricsConfig::default())
    }
}

impl GlyphMetrics for FontMetrics {
    fn char_width(&self, kind: FragmentKind, c: char) -> f32 {
        let multiplier = if self.config.preset.is_fixed_width() {
            1.0
        } else {
            CharWidthClass::classify(c).multiplier()
        };
        let weight = match kind {
            FragmentKind::Chord => self.config.chord_weight,
            FragmentKind::Text | FragmentKind::LineWrapper => 1.0,
        };
        self.avg_char_width * multiplier * weight
    }
}
