use sb_core::{Chord, Notation};
use tracing::debug;

use crate::detector::ChordsDetector;
use crate::grammar::{GroupPiece, map_chord_groups, split_keeping_delimiters};

/// Spell `chord` in `notation`.
#[must_use]
pub fn format_chord(chord: &Chord, notation: Notation) -> String {
    let name = notation.note_names()[usize::from(chord.note_index())];
    let mut formatted = String::with_capacity(name.len() + chord.suffix().len() + 1);
    if chord.is_minor() && notation.minor_by_lowercase() {
        formatted.push_str(&name.to_lowercase());
    } else {
        formatted.push_str(name);
        if chord.is_minor() {
            formatted.push('m');
        }
    }
    formatted.push_str(chord.suffix());
    formatted
}

/// Re-spells chords from one notation into another.
#[derive(Debug, Clone)]
pub struct ChordsConverter {
    detector: ChordsDetector,
    to: Notation,
}

impl ChordsConverter {
    #[must_use]
    pub fn new(from: Notation, to: Notation) -> Self {
        Self {
            detector: ChordsDetector::new(from),
            to,
        }
    }

    #[must_use]
    pub const fn target(&self) -> Notation {
        self.to
    }

    /// Convert every chord inside `[...]` groups; text outside is untouched.
    #[must_use]
    pub fn convert_lyrics(&self, text: &str) -> String {
        self.convert_lyrics_reporting(text).0
    }

    /// Like [`Self::convert_lyrics`], also returning every token that was
    /// left unconverted.
    #[must_use]
    pub fn convert_lyrics_reporting(&self, text: &str) -> (String, Vec<String>) {
        let mut skipped = Vec::new();
        let converted = map_chord_groups(text, |group| {
            let (converted, unrecognized) = self.convert_chords_group(group);
            if !unrecognized.is_empty() {
                debug!(?unrecognized, group, "chords left unconverted");
                skipped.extend(unrecognized);
            }
            converted
        });
        (converted, skipped)
    }

    /// Convert one chord group, returning the new text and the tokens that
    /// were not recognized (and were passed through unchanged).
    #[must_use]
    pub fn convert_chords_group(&self, group: &str) -> (String, Vec<String>) {
        rewrite_group(group, |token| {
            self.detector
                .recognize_single_chord(token)
                .map(|chord| format_chord(&chord, self.to))
        })
    }
}

/// Apply `rewrite` to every token of a group, keeping delimiters in place.
pub(crate) fn rewrite_group(
    group: &str,
    mut rewrite: impl FnMut(&str) -> Option<String>,
) -> (String, Vec<String>) {
    let mut converted = String::with_capacity(group.len());
    let mut unrecognized = Vec::new();
    for piece in split_keeping_delimiters(group) {
        match piece {
            GroupPiece::Delimiter(delimiter) => converted.push_str(delimiter),
            GroupPiece::Token(token) => match rewrite(token) {
                Some(rewritten) => converted.push_str(&rewritten),
                None => {
                    converted.push_str(token);
                    unrecognized.push(token.to_string());
                }
            },
        }
    }
    (converted, unrecognized)
}
