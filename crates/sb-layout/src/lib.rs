#![forbid(unsafe_code)]

mod arranger;
mod overlap;
mod parser;
mod wrapper;

pub use arranger::LyricsArranger;
pub use overlap::resolve_chord_overlaps;
pub use parser::parse_lyrics;
pub use wrapper::LineWrapper;

use sb_core::{DisplayStyle, FragmentKind, GlyphMetrics, LyricsModel};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub display_style: DisplayStyle,
    /// Render width, in the same units the glyph metrics report.
    pub screen_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            display_style: DisplayStyle::ChordsInline,
            screen_width: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ArrangeStats {
    pub logical_lines: usize,
    pub physical_lines: usize,
    pub wrapped_lines: usize,
    pub chord_fragments: usize,
    pub text_fragments: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrangedLyrics {
    pub model: LyricsModel,
    pub stats: ArrangeStats,
}

/// Arrange a logical model with `config`.
#[must_use]
pub fn arrange<M: GlyphMetrics + ?Sized>(
    model: &LyricsModel,
    config: LayoutConfig,
    metrics: &M,
) -> LyricsModel {
    LyricsArranger::new(config, metrics).arrange_model(model)
}

/// Arrange a logical model and collect counts about the result.
#[must_use]
pub fn arrange_with_stats<M: GlyphMetrics + ?Sized>(
    model: &LyricsModel,
    config: LayoutConfig,
    metrics: &M,
) -> ArrangedLyrics {
    let arranged = arrange(model, config, metrics);
    let stats = arrange_stats_from(model, &arranged);
    ArrangedLyrics {
        model: arranged,
        stats,
    }
}

#[must_use]
pub fn arrange_stats_from(logical: &LyricsModel, physical: &LyricsModel) -> ArrangeStats {
    let count = |kind: FragmentKind| {
        physical
            .fragments()
            .filter(|fragment| fragment.kind == kind)
            .count()
    };
    ArrangeStats {
        logical_lines: logical.lines.len(),
        physical_lines: physical.lines.len(),
        wrapped_lines: count(FragmentKind::LineWrapper),
        chord_fragments: count(FragmentKind::Chord),
        text_fragments: count(FragmentKind::Text),
    }
}
