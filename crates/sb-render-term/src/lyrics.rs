//! Paints an arranged lyrics model as plain terminal rows.

use sb_core::{FragmentKind, LyricsFragment, LyricsLine, LyricsModel};
use tracing::trace;
use unicode_width::UnicodeWidthStr;

use crate::config::TermRenderConfig;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Paint a physical model, one row per line.
///
/// Each fragment starts at column `round(x)`. A fragment that would start
/// inside the previous one is written right after it instead.
#[must_use]
pub fn render_lyrics(model: &LyricsModel, config: &TermRenderConfig) -> String {
    let rows: Vec<String> = model
        .lines
        .iter()
        .map(|line| render_line(line, config))
        .collect();
    rows.join("\n")
}

fn render_line(line: &LyricsLine, config: &TermRenderConfig) -> String {
    let mut fragments: Vec<&LyricsFragment> = line.fragments.iter().collect();
    fragments.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut row = String::new();
    let mut column = 0usize;
    for fragment in fragments {
        let target = start_column(fragment.x);
        if target > column {
            row.extend(std::iter::repeat_n(' ', target - column));
            column = target;
        } else if target < column {
            trace!(text = %fragment.text, target, column, "fragment overlaps previous");
        }
        let painted = paint_fragment(fragment, config);
        column += painted.width();
        match fragment.kind {
            FragmentKind::Chord if config.bold_chords => {
                row.push_str(BOLD);
                row.push_str(&painted);
                row.push_str(RESET);
            }
            _ => row.push_str(&painted),
        }
    }
    if config.trim_trailing {
        row.truncate(row.trim_end().len());
    }
    row
}

fn paint_fragment(fragment: &LyricsFragment, config: &TermRenderConfig) -> String {
    match fragment.kind {
        FragmentKind::LineWrapper => config.lyrics_glyphs().line_wrapper.to_string(),
        FragmentKind::Text | FragmentKind::Chord => fragment.text.clone(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn start_column(x: f32) -> usize {
    if x.is_finite() && x > 0.0 {
        x.round() as usize
    } else {
        0
    }
}
