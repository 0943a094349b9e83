//! Built-in fingerings of common chords, keyed by English chord name.
//!
//! Definitions list frets from the lowest-pitched string to the highest.

use sb_core::Instrument;

type ChordTable = &'static [(&'static str, &'static [&'static str])];

const GUITAR: ChordTable = &[
    ("C", &["x,3,2,0,1,0", "x,3,5,5,5,3"]),
    ("Cm", &["x,3,5,5,4,3"]),
    ("C7", &["x,3,2,3,1,0"]),
    ("Cmaj7", &["x,3,2,0,0,0"]),
    ("D", &["x,x,0,2,3,2", "x,5,7,7,7,5"]),
    ("Dm", &["x,x,0,2,3,1", "x,5,7,7,6,5"]),
    ("D7", &["x,x,0,2,1,2"]),
    ("Dm7", &["x,x,0,2,1,1"]),
    ("Dsus4", &["x,x,0,2,3,3"]),
    ("E", &["0,2,2,1,0,0"]),
    ("Em", &["0,2,2,0,0,0"]),
    ("E7", &["0,2,0,1,0,0"]),
    ("Em7", &["0,2,0,0,0,0"]),
    ("F", &["1,3,3,2,1,1"]),
    ("Fm", &["1,3,3,1,1,1"]),
    ("F#m", &["2,4,4,2,2,2"]),
    ("G", &["3,2,0,0,0,3", "3,5,5,4,3,3"]),
    ("Gm", &["3,5,5,3,3,3"]),
    ("G7", &["3,2,0,0,0,1"]),
    ("A", &["x,0,2,2,2,0", "5,7,7,6,5,5"]),
    ("Am", &["x,0,2,2,1,0", "5,7,7,5,5,5"]),
    ("A7", &["x,0,2,0,2,0"]),
    ("Am7", &["x,0,2,0,1,0"]),
    ("Asus4", &["x,0,2,2,3,0"]),
    ("Bb", &["x,1,3,3,3,1"]),
    ("B", &["x,2,4,4,4,2"]),
    ("Bm", &["x,2,4,4,3,2"]),
    ("B7", &["x,2,1,2,0,2"]),
];

const UKULELE: ChordTable = &[
    ("C", &["0,0,0,3"]),
    ("Cm", &["0,3,3,3"]),
    ("C7", &["0,0,0,1"]),
    ("D", &["2,2,2,0"]),
    ("Dm", &["2,2,1,0"]),
    ("D7", &["2,2,2,3"]),
    ("E", &["1,4,0,2"]),
    ("Em", &["0,4,3,2"]),
    ("E7", &["1,2,0,2"]),
    ("F", &["2,0,1,0"]),
    ("Fm", &["1,0,1,3"]),
    ("G", &["0,2,3,2"]),
    ("Gm", &["0,2,3,1"]),
    ("G7", &["0,2,1,2"]),
    ("A", &["2,1,0,0"]),
    ("Am", &["2,0,0,0"]),
    ("A7", &["0,1,0,0"]),
    ("Bb", &["3,2,1,1"]),
    ("B", &["4,3,2,2"]),
    ("Bm", &["4,2,2,2"]),
    ("B7", &["2,3,2,2"]),
];

const MANDOLIN: ChordTable = &[
    ("C", &["0,2,3,0"]),
    ("D", &["2,0,0,2"]),
    ("Dm", &["2,0,0,1"]),
    ("D7", &["2,0,3,2"]),
    ("E", &["1,2,2,0"]),
    ("Em", &["0,2,2,0"]),
    ("F", &["5,3,0,1"]),
    ("G", &["0,0,2,3"]),
    ("G7", &["0,0,2,1"]),
    ("A", &["2,2,4,5"]),
    ("Am", &["2,2,3,0"]),
    ("Bm", &["4,4,2,2"]),
];

const fn table(instrument: Instrument) -> ChordTable {
    match instrument {
        Instrument::Guitar => GUITAR,
        Instrument::Ukulele => UKULELE,
        Instrument::Mandolin => MANDOLIN,
    }
}

/// Fret definitions for `english_chord` on `instrument`; empty when none
/// are known.
#[must_use]
pub fn chord_diagrams(instrument: Instrument, english_chord: &str) -> &'static [&'static str] {
    table(instrument)
        .iter()
        .find(|(name, _)| *name == english_chord)
        .map(|(_, definitions)| *definitions)
        .unwrap_or_default()
}

/// English names of every chord with a built-in fingering on `instrument`.
pub fn known_chords(instrument: Instrument) -> impl Iterator<Item = &'static str> {
    table(instrument).iter().map(|(name, _)| *name)
}
