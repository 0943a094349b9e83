//! Text fretboard diagrams built from comma-separated fret definitions.
//!
//! Rows run from the highest string down and are labelled with
//! [`Instrument::string_names`], which always use English names.

use sb_chords::{ChordsDetector, format_chord};
use sb_core::{Instrument, Notation};
use thiserror::Error;
use tracing::debug;

use crate::glyphs::DiagramGlyphs;
use crate::library::chord_diagrams;

const MINIMUM_FRETS_SHOWN: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagramError {
    #[error("expected {expected} frets, got {actual}")]
    InvalidFretsCount { expected: usize, actual: usize },
    #[error("invalid fret: {0:?}")]
    InvalidFret(String),
    #[error("unknown chord: {0}")]
    UnknownChord(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringFret {
    Muted,
    Open,
    Fretted(u8),
}

impl StringFret {
    fn parse(token: &str) -> Result<Self, DiagramError> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("x") {
            return Ok(Self::Muted);
        }
        match token.parse::<u8>() {
            Ok(0) => Ok(Self::Open),
            Ok(fret) => Ok(Self::Fretted(fret)),
            Err(_) => Err(DiagramError::InvalidFret(token.to_string())),
        }
    }

    const fn fretted(self) -> Option<u8> {
        match self {
            Self::Fretted(fret) => Some(fret),
            Self::Muted | Self::Open => None,
        }
    }
}

/// Draws fret definitions as one text row per string.
#[derive(Debug, Clone, Copy)]
pub struct ChordDiagramBuilder {
    instrument: Instrument,
    glyphs: DiagramGlyphs,
}

impl ChordDiagramBuilder {
    #[must_use]
    pub const fn new(instrument: Instrument, glyphs: DiagramGlyphs) -> Self {
        Self { instrument, glyphs }
    }

    #[must_use]
    pub const fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Build a diagram from a definition such as `x,3,2,0,1,0`, listed from
    /// the lowest-pitched string to the highest.
    ///
    /// Rows are emitted highest-pitched string first.
    pub fn build_diagram(&self, definition: &str) -> Result<String, DiagramError> {
        let tokens: Vec<&str> = definition.split(',').collect();
        let expected = self.instrument.strings_count();
        if tokens.len() != expected {
            return Err(DiagramError::InvalidFretsCount {
                expected,
                actual: tokens.len(),
            });
        }
        let frets = tokens
            .into_iter()
            .map(StringFret::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.render(&frets))
    }

    fn render(&self, frets: &[StringFret]) -> String {
        let lowest = frets.iter().filter_map(|f| f.fretted()).min().unwrap_or(0);
        let highest = frets.iter().filter_map(|f| f.fretted()).max().unwrap_or(0);
        let shown = (highest - lowest + 1).max(MINIMUM_FRETS_SHOWN);
        let shifted = highest > MINIMUM_FRETS_SHOWN;
        let digits = if highest >= 10 { 2 } else { 1 };
        let hidden = if shifted { lowest - 1 } else { 0 };

        let rows: Vec<String> = self
            .instrument
            .string_names()
            .iter()
            .zip(frets)
            .rev()
            .map(|(name, fret)| self.render_row(name, *fret, shown, hidden, digits, shifted))
            .collect();
        rows.join("\n")
    }

    fn render_row(
        &self,
        name: &str,
        fret: StringFret,
        shown: u8,
        hidden: u8,
        digits: usize,
        shifted: bool,
    ) -> String {
        let sign = match fret {
            StringFret::Muted => self.glyphs.muted,
            StringFret::Open => self.glyphs.open,
            StringFret::Fretted(_) if shifted => self.glyphs.ellipsis,
            StringFret::Fretted(_) => ' ',
        };
        let finger = fret.fretted().map(|value| (value - hidden - 1, value));

        let mut row = format!("{name} {sign}");
        for column in 0..shown {
            row.push(self.glyphs.fret_bar);
            match finger {
                Some((position, value)) if position == column => {
                    row.push_str(&value.to_string());
                    if value < 10 && digits == 2 {
                        row.push(self.glyphs.empty_cell);
                    }
                }
                _ => row.extend(std::iter::repeat_n(self.glyphs.empty_cell, digits)),
            }
        }
        row.push(self.glyphs.fret_bar);
        row
    }

    /// Diagrams of every built-in fingering for `chord`, written in `notation`.
    pub fn diagrams_for_chord(
        &self,
        chord: &str,
        notation: Notation,
    ) -> Result<Vec<String>, DiagramError> {
        let recognized = ChordsDetector::new(notation)
            .recognize_single_chord(chord)
            .ok_or_else(|| DiagramError::UnknownChord(chord.to_string()))?;
        let english = format_chord(&recognized, Notation::English);
        let definitions = chord_diagrams(self.instrument, &english);
        debug!(
            chord,
            english = %english,
            count = definitions.len(),
            "looked up chord diagrams"
        );
        definitions
            .iter()
            .map(|definition| self.build_diagram(definition))
            .collect()
    }
}

/// Diagrams of `chord` written in `notation`, for `instrument`.
pub fn diagrams_for_chord(
    chord: &str,
    notation: Notation,
    instrument: Instrument,
    glyphs: DiagramGlyphs,
) -> Result<Vec<String>, DiagramError> {
    ChordDiagramBuilder::new(instrument, glyphs).diagrams_for_chord(chord, notation)
}
