use sb_core::{FragmentKind, GlyphMetrics, LyricsFragment, LyricsLine, LyricsModel};
use tracing::debug;

/// Parse `[chord]`-annotated text into a logical model, one line per text
/// line, with fragment widths taken from `metrics`.
///
/// An unclosed `[` turns the rest of its line into a chord; a stray `]` is
/// dropped. Empty groups produce no fragment.
#[must_use]
pub fn parse_lyrics<M: GlyphMetrics + ?Sized>(text: &str, metrics: &M) -> LyricsModel {
    let lines: Vec<LyricsLine> = text
        .lines()
        .map(|line| parse_line(line, metrics))
        .collect();
    debug!(lines = lines.len(), "parsed lyrics");
    LyricsModel::new(lines)
}

fn parse_line<M: GlyphMetrics + ?Sized>(line: &str, metrics: &M) -> LyricsLine {
    let mut fragments = Vec::new();
    let mut buffer = String::new();
    let mut in_chord = false;
    for c in line.chars() {
        match (c, in_chord) {
            ('[', false) => {
                push_fragment(&mut fragments, FragmentKind::Text, &mut buffer, metrics);
                in_chord = true;
            }
            (']', true) => {
                push_fragment(&mut fragments, FragmentKind::Chord, &mut buffer, metrics);
                in_chord = false;
            }
            (']', false) | ('[', true) => {}
            _ => buffer.push(c),
        }
    }
    let kind = if in_chord {
        FragmentKind::Chord
    } else {
        FragmentKind::Text
    };
    push_fragment(&mut fragments, kind, &mut buffer, metrics);
    LyricsLine::new(fragments)
}

fn push_fragment<M: GlyphMetrics + ?Sized>(
    fragments: &mut Vec<LyricsFragment>,
    kind: FragmentKind,
    buffer: &mut String,
    metrics: &M,
) {
    if buffer.is_empty() {
        return;
    }
    let text = std::mem::take(buffer);
    let width = metrics.text_width(kind, &text);
    fragments.push(LyricsFragment::new(kind, text, width));
}
