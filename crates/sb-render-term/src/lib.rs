#![forbid(unsafe_code)]

//! Terminal output for arranged lyrics and chord diagrams.

pub mod config;
pub mod diagram;
pub mod glyphs;
pub mod library;
mod lyrics;
mod metrics;

pub use config::TermRenderConfig;
pub use diagram::{ChordDiagramBuilder, DiagramError, diagrams_for_chord};
pub use glyphs::{DiagramGlyphs, GlyphMode, LyricsGlyphs};
pub use library::{chord_diagrams, known_chords};
pub use lyrics::render_lyrics;
pub use metrics::TerminalMetrics;

/// Separator between alternative diagrams of one chord.
pub const DIAGRAM_SEPARATOR: &str = "\n\n";

/// Draw every built-in fingering of `chord` under a title line.
pub fn render_chord_sheet(
    chord: &str,
    notation: sb_core::Notation,
    instrument: sb_core::Instrument,
    config: &TermRenderConfig,
) -> Result<String, DiagramError> {
    let diagrams = diagrams_for_chord(chord, notation, instrument, config.diagram_glyphs())?;
    let mut sheet = format!("{chord} ({})", instrument.as_str());
    if diagrams.is_empty() {
        sheet.push_str("\nno diagrams");
        return Ok(sheet);
    }
    for diagram in diagrams {
        sheet.push_str(DIAGRAM_SEPARATOR);
        sheet.push_str(&diagram);
    }
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::{Instrument, Notation};

    #[test]
    fn chord_sheet_lists_every_fingering() {
        let sheet = render_chord_sheet(
            "a",
            Notation::German,
            Instrument::Guitar,
            &TermRenderConfig::default(),
        )
        .expect("known chord");
        assert!(sheet.starts_with("a (guitar)\n\n"));
        assert_eq!(sheet.matches("\n\n").count(), 2);
        assert!(sheet.ends_with("E …|5|-|-|"));
    }

    #[test]
    fn chord_sheet_without_fingerings() {
        let sheet = render_chord_sheet(
            "Bb",
            Notation::English,
            Instrument::Mandolin,
            &TermRenderConfig::default(),
        )
        .expect("recognized chord");
        assert_eq!(sheet, "Bb (mandolin)\nno diagrams");
    }
}
