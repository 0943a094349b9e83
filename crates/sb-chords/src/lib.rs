#![forbid(unsafe_code)]

mod converter;
mod detector;
mod editor;
pub mod grammar;
mod transposer;

pub use converter::{ChordsConverter, format_chord};
pub use detector::ChordsDetector;
pub use editor::{
    chords_fis_to_sharp, move_chords_above_to_inline, move_chords_above_to_right,
    reformat_and_trim, unique_chords, validate_brackets, validate_chords,
};
pub use transposer::{ChordsTransposer, transposed_by_label};

use sb_core::{Chord, Notation};
use serde::Serialize;

/// A chord found in text together with its spelling in a target notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordReport {
    pub token: String,
    pub chord: Chord,
    pub spelled: String,
}

/// Recognize every distinct chord of `text` in `from` and spell it in `to`.
#[must_use]
pub fn chord_report(text: &str, from: Notation, to: Notation) -> Vec<ChordReport> {
    let detector = ChordsDetector::new(from);
    unique_chords(text, from)
        .into_iter()
        .filter_map(|token| {
            let chord = detector.recognize_single_chord(&token)?;
            let spelled = format_chord(&chord, to);
            Some(ChordReport {
                token,
                chord,
                spelled,
            })
        })
        .collect()
}
