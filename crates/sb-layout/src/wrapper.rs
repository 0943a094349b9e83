//! Cuts positioned fragments into physical lines that fit the render width.
//!
//! Fragments are first split into [`Piece`]s: a word with its trailing
//! spaces for breakable fragments, the whole fragment otherwise. Pieces are
//! grouped in tracks (one per displayed row: chords, text) sharing one
//! horizontal axis. A cut at `B` is valid when every piece before `B` fits
//! the budget and no piece of any track straddles `B`.

use sb_core::{FragmentKind, GlyphMetrics, LINE_WRAPPER_CHAR, LyricsFragment};
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

pub(crate) const EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Piece {
    pub source: usize,
    pub kind: FragmentKind,
    pub text: String,
    pub x: f32,
    pub width: f32,
    pub visible_width: f32,
}

impl Piece {
    fn measured<M: GlyphMetrics + ?Sized>(
        metrics: &M,
        source: usize,
        kind: FragmentKind,
        text: &str,
        x: f32,
    ) -> Self {
        Self {
            source,
            kind,
            text: text.to_string(),
            x,
            width: metrics.text_width(kind, text),
            visible_width: metrics.text_width(kind, text.trim_end()),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn visible_end(&self) -> f32 {
        self.x + self.visible_width
    }

    fn straddles(&self, boundary: f32) -> bool {
        self.x + EPSILON < boundary && boundary + EPSILON < self.visible_end()
    }

    /// Split at the last grapheme boundary whose prefix ends at or before
    /// `max_right`. With `at_least_one` the first grapheme is always kept.
    /// `None` when there is nothing to split off.
    fn cut<M: GlyphMetrics + ?Sized>(
        &self,
        metrics: &M,
        max_right: f32,
        at_least_one: bool,
    ) -> Option<(Self, Self)> {
        let mut head_width = 0.0;
        let mut cut_at = None;
        for (index, grapheme) in self.text.grapheme_indices(true) {
            let width = metrics.text_width(self.kind, grapheme);
            if self.x + head_width + width > max_right + EPSILON {
                if cut_at.is_none() && at_least_one {
                    head_width += width;
                    cut_at = Some(index + grapheme.len());
                }
                break;
            }
            head_width += width;
            cut_at = Some(index + grapheme.len());
        }
        let cut_at = cut_at.filter(|&at| at < self.text.len())?;
        let (head, tail) = self.text.split_at(cut_at);
        Some((
            Self::measured(metrics, self.source, self.kind, head, self.x),
            Self::measured(metrics, self.source, self.kind, tail, self.x + head_width),
        ))
    }
}

/// One physical line: a row of fragments per track, rebased to `x = 0`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WrappedLine {
    /// Cut position on the logical axis; `None` for the last line.
    pub boundary: Option<f32>,
    pub rows: Vec<Vec<LyricsFragment>>,
}

pub struct LineWrapper<'a, M: ?Sized> {
    screen_width: f32,
    metrics: &'a M,
}

impl<'a, M: GlyphMetrics + ?Sized> LineWrapper<'a, M> {
    #[must_use]
    pub fn new(screen_width: f32, metrics: &'a M) -> Self {
        Self {
            screen_width,
            metrics,
        }
    }

    #[must_use]
    pub fn wrapper_width(&self) -> f32 {
        self.metrics
            .char_width(FragmentKind::LineWrapper, LINE_WRAPPER_CHAR)
    }

    /// Split a positioned fragment into pieces. Breakable fragments break
    /// after each run of whitespace; leading whitespace stays with the
    /// first word.
    pub(crate) fn pieces(
        &self,
        fragment: &LyricsFragment,
        source: usize,
        breakable: bool,
    ) -> Vec<Piece> {
        let kind = fragment.kind;
        if !breakable {
            return vec![Piece::measured(
                self.metrics,
                source,
                kind,
                &fragment.text,
                fragment.x,
            )];
        }

        let text = fragment.text.as_str();
        let mut pieces = Vec::new();
        let mut x = fragment.x;
        let mut start = 0;
        let mut seen_word = false;
        let mut after_space = false;
        for (index, c) in text.char_indices() {
            if c.is_whitespace() {
                after_space = true;
                continue;
            }
            if seen_word && after_space {
                let piece = Piece::measured(self.metrics, source, kind, &text[start..index], x);
                x = piece.right();
                pieces.push(piece);
                start = index;
            }
            seen_word = true;
            after_space = false;
        }
        if start < text.len() {
            pieces.push(Piece::measured(self.metrics, source, kind, &text[start..], x));
        }
        pieces
    }

    /// Cut the tracks into physical lines. Every line except the last gets
    /// a line-wrapper mark in `wrapper_track`, or in the first non-empty
    /// row when that track is empty on the line.
    pub(crate) fn wrap(&self, mut tracks: Vec<Vec<Piece>>, wrapper_track: usize) -> Vec<WrappedLine> {
        let mut cursors = vec![0; tracks.len()];
        let mut lines = Vec::new();
        while let Some(offset) = remaining(&tracks, &cursors).map(|piece| piece.x).reduce(f32::min)
        {
            let end = remaining(&tracks, &cursors)
                .map(Piece::visible_end)
                .fold(offset, f32::max);
            if end - offset <= self.screen_width + EPSILON {
                lines.push(self.emit(&tracks, &mut cursors, offset, f32::INFINITY, None));
                break;
            }

            let limit = offset + (self.screen_width - self.wrapper_width()).max(0.0);
            let boundary = match find_boundary(&tracks, &cursors, offset, limit) {
                Some(boundary) => boundary,
                None => self.hard_cut(&mut tracks, &cursors, offset, limit),
            };
            trace!(offset, boundary, "wrapping line");
            lines.push(self.emit(
                &tracks,
                &mut cursors,
                offset,
                boundary,
                Some(wrapper_track),
            ));
        }
        lines
    }

    /// Cut at or before `limit` through the earliest overflowing piece, then
    /// make every piece straddling the cut start at it. Only a piece that
    /// starts the line may push the cut past `limit`, by one grapheme or as
    /// a whole.
    fn hard_cut(
        &self,
        tracks: &mut [Vec<Piece>],
        cursors: &[usize],
        offset: f32,
        limit: f32,
    ) -> f32 {
        let overflowing = tracks
            .iter()
            .enumerate()
            .flat_map(|(track, pieces)| {
                pieces
                    .iter()
                    .enumerate()
                    .skip(cursors[track])
                    .map(move |(index, piece)| (track, index, piece))
            })
            .filter(|(_, _, piece)| piece.visible_end() > limit + EPSILON)
            .min_by(|a, b| a.2.x.total_cmp(&b.2.x))
            .map(|(track, index, _)| (track, index));
        let Some((track, index)) = overflowing else {
            return f32::INFINITY;
        };

        let piece = &tracks[track][index];
        let forced = piece.x <= offset + EPSILON || limit <= offset + EPSILON;
        let split = if forced || piece.kind != FragmentKind::Chord {
            piece.cut(self.metrics, limit, forced)
        } else {
            None
        };
        let boundary = match split {
            Some((head, tail)) => {
                let boundary = tail.x;
                tracks[track][index] = head;
                tracks[track].insert(index + 1, tail);
                boundary
            }
            // the piece moves to the next line whole
            None if !forced => piece.x.min(limit),
            None => piece.right().max(piece.x + 2.0 * EPSILON),
        };
        trace!(track, boundary, "hard cut");

        for (track_index, pieces) in tracks.iter_mut().enumerate() {
            let mut index = cursors[track_index];
            while index < pieces.len() {
                if pieces[index].straddles(boundary) {
                    let straddling = &pieces[index];
                    let split = (straddling.kind != FragmentKind::Chord)
                        .then(|| straddling.cut(self.metrics, boundary, false))
                        .flatten();
                    match split {
                        Some((head, mut tail)) => {
                            tail.x = boundary;
                            pieces[index] = head;
                            pieces.insert(index + 1, tail);
                            index += 1;
                        }
                        None => pieces[index].x = boundary,
                    }
                    self.cascade(pieces, index + 1);
                }
                index += 1;
            }
        }
        boundary
    }

    /// Keep pieces of a track in order after one of them moved right.
    fn cascade(&self, pieces: &mut [Piece], from: usize) {
        for index in from.max(1)..pieces.len() {
            let previous = &pieces[index - 1];
            let gap = if previous.kind == FragmentKind::Chord && previous.source != pieces[index].source {
                self.metrics.space_width(FragmentKind::Chord)
            } else {
                0.0
            };
            let min_x = previous.right() + gap;
            if pieces[index].x + EPSILON >= min_x {
                break;
            }
            pieces[index].x = min_x;
        }
    }

    fn emit(
        &self,
        tracks: &[Vec<Piece>],
        cursors: &mut [usize],
        offset: f32,
        boundary: f32,
        wrapper_track: Option<usize>,
    ) -> WrappedLine {
        let mut rows = Vec::with_capacity(tracks.len());
        let mut visible_ends = Vec::with_capacity(tracks.len());
        for (pieces, cursor) in tracks.iter().zip(cursors.iter_mut()) {
            let start = *cursor;
            let mut end = start;
            while end < pieces.len() && pieces[end].x < boundary {
                end += 1;
            }
            *cursor = end;
            let taken = &pieces[start..end];
            visible_ends.push(
                taken
                    .iter()
                    .filter(|piece| piece.visible_width > 0.0)
                    .map(|piece| piece.visible_end() - offset)
                    .fold(0.0, f32::max),
            );
            rows.push(merge_pieces(taken, offset));
        }

        if let Some(preferred) = wrapper_track.filter(|&track| track < rows.len()) {
            let target = if rows[preferred].is_empty() {
                rows.iter()
                    .position(|row| !row.is_empty())
                    .unwrap_or(preferred)
            } else {
                preferred
            };
            rows[target]
                .push(LyricsFragment::line_wrapper(self.wrapper_width()).at(visible_ends[target]));
        }

        WrappedLine {
            boundary: boundary.is_finite().then_some(boundary),
            rows,
        }
    }
}

fn remaining<'p>(tracks: &'p [Vec<Piece>], cursors: &'p [usize]) -> impl Iterator<Item = &'p Piece> {
    tracks
        .iter()
        .zip(cursors)
        .flat_map(|(pieces, &cursor)| pieces[cursor..].iter())
}

fn find_boundary(
    tracks: &[Vec<Piece>],
    cursors: &[usize],
    offset: f32,
    limit: f32,
) -> Option<f32> {
    let mut candidates: Vec<f32> = remaining(tracks, cursors)
        .map(|piece| piece.x)
        .filter(|&x| x > offset + EPSILON)
        .collect();
    candidates.sort_by(f32::total_cmp);
    candidates.dedup();
    candidates.into_iter().rev().find(|&boundary| {
        remaining(tracks, cursors)
            .filter(|piece| piece.x < boundary)
            .all(|piece| piece.visible_end() <= limit + EPSILON && !piece.straddles(boundary))
    })
}

/// Rebase pieces to the line start, rejoin pieces of the same fragment,
/// trim trailing whitespace (keeping the width) and drop blank fragments.
fn merge_pieces(pieces: &[Piece], offset: f32) -> Vec<LyricsFragment> {
    let mut fragments: Vec<LyricsFragment> = Vec::with_capacity(pieces.len());
    let mut last_source = None;
    for piece in pieces {
        if last_source == Some(piece.source)
            && let Some(last) = fragments.last_mut()
        {
            last.text.push_str(&piece.text);
            last.width += piece.width;
            continue;
        }
        fragments.push(
            LyricsFragment::new(piece.kind, piece.text.clone(), piece.width).at(piece.x - offset),
        );
        last_source = Some(piece.source);
    }
    fragments
        .into_iter()
        .map(|mut fragment| {
            let trimmed = fragment.text.trim_end().len();
            fragment.text.truncate(trimmed);
            fragment
        })
        .filter(|fragment| !fragment.is_blank())
        .collect()
}
