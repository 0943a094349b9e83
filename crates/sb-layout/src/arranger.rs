use sb_core::{DisplayStyle, FragmentKind, GlyphMetrics, LyricsFragment, LyricsLine, LyricsModel};
use tracing::debug;

use crate::LayoutConfig;
use crate::overlap::resolve_chord_overlaps;
use crate::wrapper::{LineWrapper, Piece, WrappedLine};

const CHORD_TRACK: usize = 0;
const TEXT_TRACK: usize = 1;

/// Turns logical lines into physical lines for one display style.
pub struct LyricsArranger<'a, M: ?Sized> {
    config: LayoutConfig,
    metrics: &'a M,
}

impl<'a, M: GlyphMetrics + ?Sized> LyricsArranger<'a, M> {
    #[must_use]
    pub fn new(config: LayoutConfig, metrics: &'a M) -> Self {
        Self { config, metrics }
    }

    #[must_use]
    pub const fn config(&self) -> &LayoutConfig {
        &self.config
    }

    #[must_use]
    pub fn arrange_model(&self, model: &LyricsModel) -> LyricsModel {
        let lines: Vec<LyricsLine> = model
            .lines
            .iter()
            .flat_map(|line| self.arrange_line(line))
            .collect();
        debug!(
            style = self.config.display_style.as_str(),
            logical = model.lines.len(),
            physical = lines.len(),
            "arranged lyrics"
        );
        LyricsModel::new(lines)
    }

    /// Arrange one logical line. An empty (or blank) line gives one empty
    /// physical line; a line whose content the style hides gives none.
    #[must_use]
    pub fn arrange_line(&self, line: &LyricsLine) -> Vec<LyricsLine> {
        let fragments: Vec<&LyricsFragment> = line
            .fragments
            .iter()
            .filter(|fragment| fragment.kind != FragmentKind::LineWrapper)
            .collect();
        let arranged = match self.config.display_style {
            DisplayStyle::ChordsInline => self.arrange_chords_inline(&fragments),
            DisplayStyle::ChordsAbove => self.arrange_chords_above(&fragments),
            DisplayStyle::ChordsOnly => self.arrange_chords_only(&fragments),
            DisplayStyle::LyricsOnly => self.arrange_lyrics_only(&fragments),
            DisplayStyle::ChordsAlignedRight => self.arrange_chords_aligned_right(&fragments),
        };
        if arranged.is_empty() && fragments.iter().all(|fragment| fragment.is_blank()) {
            return vec![LyricsLine::default()];
        }
        arranged
    }

    fn wrapper(&self) -> LineWrapper<'a, M> {
        LineWrapper::new(self.config.screen_width, self.metrics)
    }

    fn space_width(&self, kind: FragmentKind) -> f32 {
        self.metrics.space_width(kind)
    }

    fn placed(&self, kind: FragmentKind, text: String, x: f32) -> LyricsFragment {
        let width = self.metrics.text_width(kind, &text);
        LyricsFragment::new(kind, text, width).at(x)
    }

    fn arrange_chords_inline(&self, fragments: &[&LyricsFragment]) -> Vec<LyricsLine> {
        let joined = join_adjacent_chords(fragments);
        let wrapper = self.wrapper();
        let mut x = 0.0;
        let mut pieces = Vec::new();
        for (source, fragment) in joined.iter().enumerate() {
            let mut text = fragment.text.clone();
            if fragment.is_text() {
                let after_chord = source > 0 && joined[source - 1].is_chord();
                let before_chord = joined.get(source + 1).is_some_and(|next| next.is_chord());
                if after_chord && !text.starts_with(char::is_whitespace) {
                    text.insert(0, ' ');
                }
                if before_chord && !text.ends_with(char::is_whitespace) {
                    text.push(' ');
                }
            }
            let placed = self.placed(fragment.kind, text, x);
            x = placed.right();
            pieces.extend(wrapper.pieces(&placed, source, placed.is_text()));
        }
        single_row_lines(wrapper.wrap(vec![pieces], 0))
    }

    fn arrange_chords_above(&self, fragments: &[&LyricsFragment]) -> Vec<LyricsLine> {
        let mut x = 0.0;
        let mut chords = Vec::new();
        let mut texts = Vec::new();
        for fragment in fragments {
            let placed = self.placed(fragment.kind, fragment.text.clone(), x);
            if placed.is_text() {
                x = placed.right();
                texts.push(placed);
            } else {
                chords.push(placed);
            }
        }
        let shifts =
            resolve_chord_overlaps(&mut chords, &mut texts, self.space_width(FragmentKind::Chord));
        if shifts > 0 {
            debug!(shifts, "resolved overlapping chords");
        }

        let wrapper = self.wrapper();
        let chord_pieces: Vec<Piece> = chords
            .iter()
            .enumerate()
            .flat_map(|(source, chord)| wrapper.pieces(chord, source, true))
            .collect();
        let text_pieces: Vec<Piece> = texts
            .iter()
            .enumerate()
            .flat_map(|(source, text)| wrapper.pieces(text, chords.len() + source, true))
            .collect();

        wrapper
            .wrap(vec![chord_pieces, text_pieces], TEXT_TRACK)
            .into_iter()
            .flat_map(|line| line.rows)
            .filter(|row| !row.is_empty())
            .map(LyricsLine::new)
            .collect()
    }

    fn arrange_chords_only(&self, fragments: &[&LyricsFragment]) -> Vec<LyricsLine> {
        let wrapper = self.wrapper();
        let gap = self.space_width(FragmentKind::Chord);
        let mut x = 0.0;
        let mut pieces = Vec::new();
        for (source, fragment) in fragments.iter().filter(|fragment| fragment.is_chord()).enumerate() {
            let placed = self.placed(FragmentKind::Chord, fragment.text.clone(), x);
            x = placed.right() + gap;
            pieces.extend(wrapper.pieces(&placed, source, true));
        }
        single_row_lines(wrapper.wrap(vec![pieces], CHORD_TRACK))
    }

    fn arrange_lyrics_only(&self, fragments: &[&LyricsFragment]) -> Vec<LyricsLine> {
        let wrapper = self.wrapper();
        single_row_lines(wrapper.wrap(vec![self.text_pieces(&wrapper, fragments).0], 0))
    }

    fn arrange_chords_aligned_right(&self, fragments: &[&LyricsFragment]) -> Vec<LyricsLine> {
        let wrapper = self.wrapper();
        let (pieces, chords) = self.text_pieces(&wrapper, fragments);
        let mut wrapped = wrapper.wrap(vec![pieces], 0);
        if wrapped.is_empty() {
            if chords.is_empty() {
                return Vec::new();
            }
            wrapped.push(WrappedLine {
                boundary: None,
                rows: vec![Vec::new()],
            });
        }

        let mut remaining = chords.as_slice();
        wrapped
            .into_iter()
            .map(|line| {
                let taken = match line.boundary {
                    Some(boundary) => remaining.iter().take_while(|chord| chord.x < boundary).count(),
                    None => remaining.len(),
                };
                let (on_line, rest) = remaining.split_at(taken);
                remaining = rest;
                let mut fragments: Vec<LyricsFragment> = line.rows.into_iter().flatten().collect();
                fragments.extend(self.right_aligned(on_line));
                LyricsLine::new(fragments)
            })
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Text pieces positioned by accumulated text width, plus the chords
    /// placed at the text position they annotate.
    fn text_pieces(
        &self,
        wrapper: &LineWrapper<'a, M>,
        fragments: &[&LyricsFragment],
    ) -> (Vec<Piece>, Vec<LyricsFragment>) {
        let mut x = 0.0;
        let mut pieces = Vec::new();
        let mut chords = Vec::new();
        for (source, fragment) in fragments.iter().enumerate() {
            let placed = self.placed(fragment.kind, fragment.text.clone(), x);
            if placed.is_text() {
                x = placed.right();
                pieces.extend(wrapper.pieces(&placed, source, true));
            } else {
                chords.push(placed);
            }
        }
        (pieces, chords)
    }

    /// Concatenate chords with single spaces, ending at the screen's right edge.
    fn right_aligned(&self, chords: &[LyricsFragment]) -> Vec<LyricsFragment> {
        let spelled: Vec<LyricsFragment> = chords
            .iter()
            .enumerate()
            .map(|(index, chord)| {
                let text = if index == 0 {
                    chord.text.clone()
                } else {
                    format!(" {}", chord.text)
                };
                self.placed(FragmentKind::Chord, text, 0.0)
            })
            .collect();
        let total: f32 = spelled.iter().map(|chord| chord.width).sum();
        let mut x = (self.config.screen_width - total).max(0.0);
        spelled
            .into_iter()
            .map(|chord| {
                let chord = chord.at(x);
                x = chord.right();
                chord
            })
            .collect()
    }
}

fn join_adjacent_chords(fragments: &[&LyricsFragment]) -> Vec<LyricsFragment> {
    let mut joined: Vec<LyricsFragment> = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        if fragment.is_chord()
            && let Some(previous) = joined.last_mut()
            && previous.is_chord()
        {
            previous.text.push(' ');
            previous.text.push_str(&fragment.text);
            continue;
        }
        joined.push((*fragment).clone());
    }
    joined
}

fn single_row_lines(wrapped: Vec<WrappedLine>) -> Vec<LyricsLine> {
    wrapped
        .into_iter()
        .filter_map(|line| line.rows.into_iter().next())
        .filter(|row| !row.is_empty())
        .map(LyricsLine::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::{LINE_WRAPPER_CHAR, LengthMapper};

    fn text(value: &str) -> LyricsFragment {
        LyricsFragment::text(value, value.chars().count() as f32)
    }

    fn chord(value: &str) -> LyricsFragment {
        LyricsFragment::chord(value, value.chars().count() as f32)
    }

    fn arrange(style: DisplayStyle, width: f32, line: Vec<LyricsFragment>) -> Vec<LyricsLine> {
        let metrics = LengthMapper::monospace();
        let arranger = LyricsArranger::new(
            LayoutConfig {
                display_style: style,
                screen_width: width,
            },
            &metrics,
        );
        arranger
            .arrange_model(&LyricsModel::new(vec![LyricsLine::new(line)]))
            .lines
    }

    #[test]
    fn chords_inline_untouched() {
        let lines = arrange(
            DisplayStyle::ChordsInline,
            100.0,
            vec![
                LyricsFragment::text("baba ab ", 8.0),
                LyricsFragment::chord("a F", 3.0).at(8.0),
                LyricsFragment::text(" baobab", 7.0).at(11.0),
            ],
        );
        assert_eq!(
            lines,
            vec![LyricsLine::new(vec![
                LyricsFragment::text("baba ab", 8.0),
                LyricsFragment::chord("a F", 3.0).at(8.0),
                LyricsFragment::text(" baobab", 7.0).at(11.0),
            ])]
        );
    }

    #[test]
    fn chords_inline_adds_padding_around_chords() {
        let lines = arrange(
            DisplayStyle::ChordsInline,
            100.0,
            vec![text("bb"), chord("a"), text("bb")],
        );
        assert_eq!(
            lines,
            vec![LyricsLine::new(vec![
                LyricsFragment::text("bb", 3.0),
                LyricsFragment::chord("a", 1.0).at(3.0),
                LyricsFragment::text(" bb", 3.0).at(4.0),
            ])]
        );
    }

    #[test]
    fn chords_only_drops_text() {
        let lines = arrange(
            DisplayStyle::ChordsOnly,
            100.0,
            vec![text("bb"), chord("a"), text("bb")],
        );
        assert_eq!(lines, vec![LyricsLine::new(vec![chord("a")])]);
    }

    #[test]
    fn chords_only_repacks_groups_with_a_space() {
        let lines = arrange(
            DisplayStyle::ChordsOnly,
            100.0,
            vec![chord("a F"), text("long text here"), chord("C")],
        );
        assert_eq!(
            lines,
            vec![LyricsLine::new(vec![chord("a F"), chord("C").at(4.0)])]
        );
    }

    #[test]
    fn lyrics_only_drops_chords() {
        let lines = arrange(
            DisplayStyle::LyricsOnly,
            100.0,
            vec![text("bb"), chord("a"), text("bb")],
        );
        assert_eq!(
            lines,
            vec![LyricsLine::new(vec![text("bb"), text("bb").at(2.0)])]
        );
    }

    #[test]
    fn chords_above_splits_rows() {
        let lines = arrange(
            DisplayStyle::ChordsAbove,
            100.0,
            vec![
                text("here"),
                chord("a F"),
                text("goes"),
                chord("C"),
                text("accent"),
            ],
        );
        assert_eq!(
            lines,
            vec![
                LyricsLine::new(vec![chord("a F").at(4.0), chord("C").at(8.0)]),
                LyricsLine::new(vec![
                    text("here"),
                    text("goes").at(4.0),
                    text("accent").at(8.0),
                ]),
            ]
        );
    }

    #[test]
    fn chords_above_resolves_overlaps() {
        let lines = arrange(
            DisplayStyle::ChordsAbove,
            100.0,
            vec![chord("Cmaj7"), text("a"), chord("G"), text("men")],
        );
        assert_eq!(
            lines,
            vec![
                LyricsLine::new(vec![chord("Cmaj7"), chord("G").at(6.0)]),
                LyricsLine::new(vec![text("a"), text("men").at(6.0)]),
            ]
        );
    }

    #[test]
    fn chords_above_without_text_has_a_single_row() {
        let lines = arrange(
            DisplayStyle::ChordsAbove,
            100.0,
            vec![chord("a"), chord("F")],
        );
        assert_eq!(lines, vec![LyricsLine::new(vec![chord("a"), chord("F").at(2.0)])]);
    }

    #[test]
    fn chords_aligned_right_puts_chords_at_the_edge() {
        let lines = arrange(
            DisplayStyle::ChordsAlignedRight,
            100.0,
            vec![text("bb"), chord("a F"), text(" "), chord("C"), text("bb")],
        );
        assert_eq!(
            lines,
            vec![LyricsLine::new(vec![
                text("bb"),
                text("bb").at(3.0),
                chord("a F").at(95.0),
                chord(" C").at(98.0),
            ])]
        );
    }

    #[test]
    fn chords_aligned_right_without_text() {
        let lines = arrange(DisplayStyle::ChordsAlignedRight, 10.0, vec![chord("G")]);
        assert_eq!(lines, vec![LyricsLine::new(vec![chord("G").at(9.0)])]);
    }

    #[test]
    fn wrapping_joins_chord_groups() {
        let lines = arrange(
            DisplayStyle::ChordsInline,
            33.0,
            vec![
                chord("G"),
                text("mrs robinson"),
                chord("e"),
                text("know"),
                chord("a7"),
                chord("D"),
                text("wo wo wo"),
            ],
        );
        assert_eq!(
            lines,
            vec![
                LyricsLine::new(vec![
                    chord("G"),
                    LyricsFragment::text(" mrs robinson", 14.0).at(1.0),
                    chord("e").at(15.0),
                    LyricsFragment::text(" know", 6.0).at(16.0),
                    chord("a7 D").at(22.0),
                    LyricsFragment::text(" wo wo", 7.0).at(26.0),
                    LyricsFragment::line_wrapper(1.0).at(32.0),
                ]),
                LyricsLine::new(vec![text("wo")]),
            ]
        );
        assert_eq!(lines[0].fragments[6].text, LINE_WRAPPER_CHAR.to_string());
    }

    #[test]
    fn chords_above_wraps_both_rows_together() {
        let lines = arrange(
            DisplayStyle::ChordsAbove,
            10.0,
            vec![
                text("first "),
                chord("a"),
                text("second "),
                chord("F"),
                text("third"),
            ],
        );
        assert_eq!(
            lines,
            vec![
                LyricsLine::new(vec![
                    LyricsFragment::text("first", 6.0),
                    LyricsFragment::line_wrapper(1.0).at(5.0),
                ]),
                LyricsLine::new(vec![chord("a")]),
                LyricsLine::new(vec![
                    LyricsFragment::text("second", 7.0),
                    LyricsFragment::line_wrapper(1.0).at(6.0),
                ]),
                LyricsLine::new(vec![chord("F")]),
                LyricsLine::new(vec![text("third")]),
            ]
        );
    }

    #[test]
    fn chords_above_hard_cuts_stay_on_screen() {
        let metrics = "F#m7a".chars().fold(
            LengthMapper::monospace().with_char(' ', 0.327),
            |metrics, c| metrics.with_chord_char(c, 1.234),
        );
        let placed = |kind, value: &str| {
            LyricsFragment::new(kind, value, metrics.text_width(kind, value))
        };
        let line = LyricsLine::new(vec![
            placed(FragmentKind::Chord, "F#m7"),
            placed(FragmentKind::Text, "aaaaaaaaaaa"),
            placed(FragmentKind::Text, "aaaaaaaaaaaa"),
            placed(FragmentKind::Chord, "a"),
            placed(FragmentKind::Text, "aaaaaaaa  "),
            placed(FragmentKind::Chord, "a"),
            placed(FragmentKind::Text, "a"),
        ]);
        let arranger = LyricsArranger::new(
            LayoutConfig {
                display_style: DisplayStyle::ChordsAbove,
                screen_width: 3.0,
            },
            &metrics,
        );

        let lines = arranger.arrange_line(&line);
        let mut chords = String::new();
        let mut texts = String::new();
        for fragment in lines.iter().flat_map(|line| line.fragments.iter()) {
            let visible = metrics.text_width(fragment.kind, fragment.text.trim_end());
            assert!(
                fragment.x + visible <= 3.0 + 1e-3,
                "{fragment:?} ends past the screen"
            );
            match fragment.kind {
                FragmentKind::Chord => chords.push_str(fragment.text.trim()),
                FragmentKind::Text => texts.push_str(fragment.text.trim()),
                FragmentKind::LineWrapper => {}
            }
        }
        assert_eq!(chords, "F#m7aa");
        assert_eq!(texts, "a".repeat(32));
    }

    #[test]
    fn empty_line_stays_empty() {
        let lines = arrange(DisplayStyle::ChordsAbove, 20.0, Vec::new());
        assert_eq!(lines, vec![LyricsLine::default()]);
    }

    #[test]
    fn hidden_content_drops_the_line() {
        assert!(arrange(DisplayStyle::ChordsOnly, 20.0, vec![text("only words")]).is_empty());
        assert!(arrange(DisplayStyle::LyricsOnly, 20.0, vec![chord("a F")]).is_empty());
    }
}
