#![forbid(unsafe_code)]

mod font_metrics;
mod lyrics;

pub use font_metrics::{
    CharWidthClass, FontMetrics, FontMetricsConfig, FontPreset, GlyphMetrics, LengthMapper,
};
pub use lyrics::{FragmentKind, LINE_WRAPPER_CHAR, LyricsFragment, LyricsLine, LyricsModel};

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of semitones in an octave; every note index is taken modulo this.
pub const SEMITONES: u8 = 12;

/// Chord naming convention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Notation {
    /// `C C# D ... A B H`, minor chords written lower-case.
    German,
    /// `C Cis D ... A B H`, minor chords written lower-case.
    GermanIs,
    /// `C C# D ... A Bb B`, minor chords marked with `m`.
    English,
}

impl Notation {
    pub const ALL: [Self; 3] = [Self::German, Self::GermanIs, Self::English];

    #[must_use]
    pub const fn id(self) -> u8 {
        match self {
            Self::German => 1,
            Self::GermanIs => 2,
            Self::English => 3,
        }
    }

    #[must_use]
    pub fn parse_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|notation| notation.id() == id)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::German => "german",
            Self::GermanIs => "german-is",
            Self::English => "english",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::German => "German: C C# d B H",
            Self::GermanIs => "German (-is): C Cis d B H",
            Self::English => "English: C C# Dm Bb B",
        }
    }

    /// Canonical spelling of the 12 chromatic notes, indexed by semitone offset from C.
    #[must_use]
    pub const fn note_names(self) -> &'static [&'static str; 12] {
        match self {
            Self::German => &[
                "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "B", "H",
            ],
            Self::GermanIs => &[
                "C", "Cis", "D", "Dis", "E", "F", "Fis", "G", "Gis", "A", "B", "H",
            ],
            Self::English => &[
                "C", "C#", "D", "Eb", "E", "F", "F#", "G", "G#", "A", "Bb", "B",
            ],
        }
    }

    /// Whether a minor chord is written by lower-casing its note name.
    /// Otherwise the minor marker `m` follows the note name.
    #[must_use]
    pub const fn minor_by_lowercase(self) -> bool {
        matches!(self, Self::German | Self::GermanIs)
    }
}

impl FromStr for Notation {
    type Err = ParseSettingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "german" | "de" | "1" => Ok(Self::German),
            "german-is" | "german_is" | "germanis" | "2" => Ok(Self::GermanIs),
            "english" | "en" | "3" => Ok(Self::English),
            _ => Err(ParseSettingError::new("notation", value)),
        }
    }
}

/// A recognized chord: root note, minor flag and quality suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chord {
    note_index: u8,
    minor: bool,
    suffix: String,
}

impl Chord {
    /// Build a chord; `note_index` is reduced modulo 12.
    #[must_use]
    pub fn new(note_index: i32, minor: bool, suffix: impl Into<String>) -> Self {
        Self {
            note_index: note_index.rem_euclid(i32::from(SEMITONES)) as u8,
            minor,
            suffix: suffix.into(),
        }
    }

    #[must_use]
    pub const fn note_index(&self) -> u8 {
        self.note_index
    }

    #[must_use]
    pub const fn is_minor(&self) -> bool {
        self.minor
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    #[must_use]
    pub fn transposed(&self, semitones: i32) -> Self {
        Self::new(
            i32::from(self.note_index) + semitones,
            self.minor,
            self.suffix.clone(),
        )
    }
}

/// Instrument used for chord diagrams.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Instrument {
    Guitar,
    Ukulele,
    Mandolin,
}

impl Instrument {
    pub const ALL: [Self; 3] = [Self::Guitar, Self::Ukulele, Self::Mandolin];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Guitar => "guitar",
            Self::Ukulele => "ukulele",
            Self::Mandolin => "mandolin",
        }
    }

    /// String names ordered from the lowest to the highest pitch, in
    /// English note names (`B`, never the German `H`) whatever notation the
    /// chords are written in.
    #[must_use]
    pub const fn string_names(self) -> &'static [&'static str] {
        match self {
            Self::Guitar => &["E", "A", "D", "G", "B", "E"],
            Self::Ukulele => &["G", "C", "E", "A"],
            Self::Mandolin => &["G", "D", "A", "E"],
        }
    }

    #[must_use]
    pub const fn strings_count(self) -> usize {
        self.string_names().len()
    }
}

impl FromStr for Instrument {
    type Err = ParseSettingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "guitar" => Ok(Self::Guitar),
            "ukulele" | "uke" => Ok(Self::Ukulele),
            "mandolin" => Ok(Self::Mandolin),
            _ => Err(ParseSettingError::new("instrument", value)),
        }
    }
}

/// How chords and lyrics are interleaved on screen.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayStyle {
    ChordsInline,
    ChordsAbove,
    ChordsOnly,
    LyricsOnly,
    ChordsAlignedRight,
}

impl DisplayStyle {
    pub const ALL: [Self; 5] = [
        Self::ChordsInline,
        Self::ChordsAbove,
        Self::ChordsOnly,
        Self::LyricsOnly,
        Self::ChordsAlignedRight,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChordsInline => "chords-inline",
            Self::ChordsAbove => "chords-above",
            Self::ChordsOnly => "chords-only",
            Self::LyricsOnly => "lyrics-only",
            Self::ChordsAlignedRight => "chords-aligned-right",
        }
    }
}

impl FromStr for DisplayStyle {
    type Err = ParseSettingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "chords-inline" | "inline" => Ok(Self::ChordsInline),
            "chords-above" | "above" => Ok(Self::ChordsAbove),
            "chords-only" => Ok(Self::ChordsOnly),
            "lyrics-only" => Ok(Self::LyricsOnly),
            "chords-aligned-right" | "aligned-right" | "right" => Ok(Self::ChordsAlignedRight),
            _ => Err(ParseSettingError::new("display style", value)),
        }
    }
}

/// Unknown value for one of the closed setting enumerations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {setting}: {value}")]
pub struct ParseSettingError {
    pub setting: &'static str,
    pub value: String,
}

impl ParseSettingError {
    #[must_use]
    pub fn new(setting: &'static str, value: &str) -> Self {
        Self {
            setting,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChordsErrorCode {
    MissingOpeningBracket,
    MissingClosingBracket,
    UnknownChord,
}

impl ChordsErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingOpeningBracket => "chords/error/missing-opening-bracket",
            Self::MissingClosingBracket => "chords/error/missing-closing-bracket",
            Self::UnknownChord => "chords/error/unknown-chord",
        }
    }

    /// Short kind name without the namespace prefix.
    #[must_use]
    pub const fn kind(self) -> &'static str {
        match self {
            Self::MissingOpeningBracket => "missing-opening-bracket",
            Self::MissingClosingBracket => "missing-closing-bracket",
            Self::UnknownChord => "unknown-chord",
        }
    }
}

/// Validation failure of chord-annotated text.
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
pub enum ChordsError {
    #[error("missing opening bracket before ']' at byte {offset}")]
    MissingOpeningBracket { offset: usize },
    #[error("missing closing bracket after '[' at byte {offset}")]
    MissingClosingBracket { offset: usize },
    #[error("unknown chord: {chord}")]
    UnknownChord { chord: String },
}

impl ChordsError {
    #[must_use]
    pub const fn code(&self) -> ChordsErrorCode {
        match self {
            Self::MissingOpeningBracket { .. } => ChordsErrorCode::MissingOpeningBracket,
            Self::MissingClosingBracket { .. } => ChordsErrorCode::MissingClosingBracket,
            Self::UnknownChord { .. } => ChordsErrorCode::UnknownChord,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Chord, ChordsError, ChordsErrorCode, DisplayStyle, Instrument, Notation,
        ParseSettingError,
    };
    use proptest::prelude::*;

    #[test]
    fn chord_note_index_wraps_modulo_twelve() {
        assert_eq!(Chord::new(12, false, "").note_index(), 0);
        assert_eq!(Chord::new(-1, true, "7").note_index(), 11);
        assert_eq!(Chord::new(25, false, "").note_index(), 1);
    }

    #[test]
    fn transposition_keeps_quality() {
        let chord = Chord::new(9, true, "7").transposed(5);
        assert_eq!(chord, Chord::new(2, true, "7"));
    }

    #[test]
    fn notation_ids_round_trip() {
        for notation in Notation::ALL {
            assert_eq!(Notation::parse_id(notation.id()), Some(notation));
        }
        assert_eq!(Notation::parse_id(0), None);
    }

    #[test]
    fn notation_string_mapping_is_stable() {
        for notation in Notation::ALL {
            assert_eq!(notation.as_str().parse::<Notation>(), Ok(notation));
        }
        assert_eq!(
            "klingon".parse::<Notation>(),
            Err(ParseSettingError {
                setting: "notation",
                value: "klingon".to_string(),
            })
        );
    }

    #[test]
    fn note_tables_cover_every_semitone() {
        for notation in Notation::ALL {
            let names = notation.note_names();
            assert_eq!(names.len(), 12);
            assert_eq!(names[0], "C");
            assert_eq!(names[9], "A");
        }
        assert_eq!(Notation::German.note_names()[11], "H");
        assert_eq!(Notation::English.note_names()[11], "B");
    }

    #[test]
    fn display_styles_parse_from_their_names() {
        for style in DisplayStyle::ALL {
            assert_eq!(style.as_str().parse::<DisplayStyle>(), Ok(style));
        }
        assert_eq!(
            "chords_above".parse::<DisplayStyle>(),
            Ok(DisplayStyle::ChordsAbove)
        );
    }

    #[test]
    fn instruments_have_expected_string_counts() {
        assert_eq!(Instrument::Guitar.strings_count(), 6);
        assert_eq!(Instrument::Ukulele.strings_count(), 4);
        assert_eq!(Instrument::Mandolin.strings_count(), 4);
    }

    #[test]
    fn error_codes_are_namespaced() {
        let err = ChordsError::MissingClosingBracket { offset: 3 };
        assert_eq!(err.code(), ChordsErrorCode::MissingClosingBracket);
        assert_eq!(err.code().kind(), "missing-closing-bracket");
        assert_eq!(
            err.code().as_str(),
            "chords/error/missing-closing-bracket"
        );
        assert!(err.to_string().contains("byte 3"));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_transposition_is_modular(
            note in -48i32..48,
            minor in any::<bool>(),
            a in -30i32..30,
            b in -30i32..30,
        ) {
            let chord = Chord::new(note, minor, "7");
            prop_assert!(chord.note_index() < 12);
            prop_assert_eq!(chord.transposed(a).transposed(b), chord.transposed(a + b));
            prop_assert_eq!(chord.transposed(12), chord.clone());
            prop_assert_eq!(chord.transposed(a).is_minor(), minor);
        }
    }

    #[test]
    fn settings_serialize_as_kebab_case() {
        let json = serde_json::to_string(&DisplayStyle::ChordsAlignedRight).expect("serialize");
        assert_eq!(json, "\"chords-aligned-right\"");
        let notation: Notation = serde_json::from_str("\"german-is\"").expect("deserialize");
        assert_eq!(notation, Notation::GermanIs);
    }
}
