use sb_core::{Notation, SEMITONES};
use tracing::debug;

use crate::converter::{format_chord, rewrite_group};
use crate::detector::ChordsDetector;
use crate::grammar::map_chord_groups;

/// Shifts bracketed chords by a number of semitones within one notation.
#[derive(Debug, Clone)]
pub struct ChordsTransposer {
    detector: ChordsDetector,
    notation: Notation,
    semitones: i32,
}

impl ChordsTransposer {
    #[must_use]
    pub fn new(notation: Notation, semitones: i32) -> Self {
        Self {
            detector: ChordsDetector::new(notation),
            notation,
            semitones,
        }
    }

    #[must_use]
    pub const fn semitones(&self) -> i32 {
        self.semitones
    }

    #[must_use]
    pub fn transpose_lyrics(&self, text: &str) -> String {
        self.transpose_lyrics_reporting(text).0
    }

    /// Like [`Self::transpose_lyrics`], also returning every token that was
    /// left untransposed.
    #[must_use]
    pub fn transpose_lyrics_reporting(&self, text: &str) -> (String, Vec<String>) {
        if self.semitones.rem_euclid(i32::from(SEMITONES)) == 0 {
            return (text.to_string(), Vec::new());
        }
        let mut skipped = Vec::new();
        let transposed = map_chord_groups(text, |group| {
            let (transposed, unrecognized) = self.transpose_chords_group(group);
            if !unrecognized.is_empty() {
                debug!(?unrecognized, group, "chords left untransposed");
                skipped.extend(unrecognized);
            }
            transposed
        });
        (transposed, skipped)
    }

    #[must_use]
    pub fn transpose_chords_group(&self, group: &str) -> (String, Vec<String>) {
        rewrite_group(group, |token| {
            self.detector
                .recognize_single_chord(token)
                .map(|chord| format_chord(&chord.transposed(self.semitones), self.notation))
        })
    }
}

/// Human-readable transposition amount, e.g. `+1 semitone`.
#[must_use]
pub fn transposed_by_label(semitones: i32) -> String {
    let unit = if semitones.abs() == 1 {
        "semitone"
    } else {
        "semitones"
    };
    if semitones > 0 {
        format!("+{semitones} {unit}")
    } else {
        format!("{semitones} {unit}")
    }
}
