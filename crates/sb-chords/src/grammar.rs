//! Lexical rules of chord markup shared by detection, conversion and
//! transposition.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;
use sb_core::Notation;

/// Characters that always separate chord words.
pub const PRIMARY_DELIMITERS: [char; 3] = [' ', ',', '\n'];

/// Characters that may separate chords or be part of a chord suffix.
pub const SECONDARY_DELIMITERS: [char; 4] = ['(', ')', '-', '/'];

/// Closed vocabulary of chord quality suffixes.
pub const CHORD_SUFFIXES: [&str; 78] = [
    "+", "-", "-5", "-dur", "-moll", "0", "11", "11b9", "13", "13#11", "13b9", "2", "4", "4-3",
    "5", "5+", "6", "6+", "6-", "6-4", "6add9", "6add11", "7", "7#5", "7#9", "7(#5,#9)",
    "7(#5,b9)", "7(b5,#9)", "7(b5,b9)", "7+", "7/5+", "7/5-", "7b5", "7b9", "7sus2", "7sus4",
    "9", "9#5", "9b5", "9sus4", "add11", "add2", "add9", "aug", "b", "dim", "dim7", "m", "m+",
    "m11", "m13", "m5+", "m6", "m6+", "m6add9", "m7", "M7", "m7#5", "m7+", "m7/5-", "m7b5", "m9",
    "madd2", "madd9", "maj11", "maj13", "maj13#11", "maj7", "maj7#5", "maj7b5", "maj9",
    "maj9#11", "mmaj7", "mmaj9", "o", "sus2", "sus2sus4", "sus4",
];

/// Non-greedy `[...]` group, allowed to span lines.
pub(crate) static BRACKET_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[((?s:.)+?)\]").expect("valid regex: BRACKET_GROUP_RE"));

const GERMAN_SPELLINGS: [(&str, u8); 22] = [
    ("C", 0),
    ("C#", 1),
    ("Cis", 1),
    ("Des", 1),
    ("D", 2),
    ("D#", 3),
    ("Dis", 3),
    ("Es", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Fis", 6),
    ("Ges", 6),
    ("G", 7),
    ("G#", 8),
    ("Gis", 8),
    ("As", 8),
    ("A", 9),
    ("A#", 10),
    ("Ais", 10),
    ("B", 10),
    ("H", 11),
];

const ENGLISH_SPELLINGS: [(&str, u8); 17] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
];

/// A note spelling accepted on input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSpelling {
    pub name: String,
    pub note_index: u8,
    pub minor: bool,
}

static GERMAN_TABLE: LazyLock<Vec<NoteSpelling>> = LazyLock::new(|| {
    let upper = GERMAN_SPELLINGS
        .iter()
        .map(|&(name, note_index)| NoteSpelling {
            name: name.to_string(),
            note_index,
            minor: false,
        });
    let lower = upper.clone().map(|spelling| NoteSpelling {
        name: lowercase_initial(&spelling.name),
        minor: true,
        ..spelling
    });
    sorted_spellings(upper.chain(lower).collect())
});

static ENGLISH_TABLE: LazyLock<Vec<NoteSpelling>> = LazyLock::new(|| {
    sorted_spellings(
        ENGLISH_SPELLINGS
            .iter()
            .map(|&(name, note_index)| NoteSpelling {
                name: name.to_string(),
                note_index,
                minor: false,
            })
            .collect(),
    )
});

fn lowercase_initial(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

fn sorted_spellings(mut spellings: Vec<NoteSpelling>) -> Vec<NoteSpelling> {
    spellings.sort_by(|a, b| longest_chord_comparator(&a.name, &b.name));
    spellings
}

/// Input spellings of a notation, longest first.
#[must_use]
pub fn note_spellings(notation: Notation) -> &'static [NoteSpelling] {
    match notation {
        Notation::German | Notation::GermanIs => &GERMAN_TABLE,
        Notation::English => &ENGLISH_TABLE,
    }
}

/// Orders longer names first, then lexicographically.
#[must_use]
pub fn longest_chord_comparator(a: &str, b: &str) -> Ordering {
    b.chars()
        .count()
        .cmp(&a.chars().count())
        .then_with(|| a.cmp(b))
}

#[must_use]
pub fn is_chord_suffix(value: &str) -> bool {
    CHORD_SUFFIXES.contains(&value)
}

/// The suffix vocabulary in matching order.
#[must_use]
pub fn sorted_suffixes() -> Vec<&'static str> {
    let mut suffixes = CHORD_SUFFIXES.to_vec();
    suffixes.sort_by(|a, b| longest_chord_comparator(a, b));
    suffixes
}

#[must_use]
pub fn is_primary_delimiter(c: char) -> bool {
    PRIMARY_DELIMITERS.contains(&c)
}

#[must_use]
pub fn is_secondary_delimiter(c: char) -> bool {
    SECONDARY_DELIMITERS.contains(&c)
}

#[must_use]
pub fn is_delimiter(c: char) -> bool {
    is_primary_delimiter(c) || is_secondary_delimiter(c)
}

/// Piece of a chord group: either a token or a single delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupPiece<'a> {
    Token(&'a str),
    Delimiter(&'a str),
}

/// Split `group` on every delimiter, keeping the delimiters as pieces.
#[must_use]
pub fn split_keeping_delimiters(group: &str) -> Vec<GroupPiece<'_>> {
    let mut pieces = Vec::new();
    let mut token_start = 0;
    for (offset, c) in group.char_indices() {
        if is_delimiter(c) {
            if token_start < offset {
                pieces.push(GroupPiece::Token(&group[token_start..offset]));
            }
            let end = offset + c.len_utf8();
            pieces.push(GroupPiece::Delimiter(&group[offset..end]));
            token_start = end;
        }
    }
    if token_start < group.len() {
        pieces.push(GroupPiece::Token(&group[token_start..]));
    }
    pieces
}

/// Rewrite the inner text of every `[...]` group, leaving the rest intact.
pub(crate) fn map_chord_groups(text: &str, mut map: impl FnMut(&str) -> String) -> String {
    BRACKET_GROUP_RE
        .replace_all(text, |captures: &regex::Captures<'_>| {
            format!("[{}]", map(&captures[1]))
        })
        .into_owned()
}
