//! Whole-text transforms and validation for chord-annotated lyrics.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::FxHashSet;
use sb_core::{ChordsError, Notation};
use tracing::debug;

use crate::detector::ChordsDetector;
use crate::grammar::{BRACKET_GROUP_RE, GroupPiece, split_keeping_delimiters};

static INLINE_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(.*?)\]").expect("valid regex: INLINE_GROUP_RE"));

static FIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)is").expect("valid regex: FIS_RE"));

static CHORDS_ABOVE_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\[(.+)\]\n(\w.+)\n").expect("valid regex: CHORDS_ABOVE_TEXT_RE")
});

static LINE_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\[+", "["),
        (r"\]+", "]"),
        (r"\[ +", "["),
        (r" +\]", "]"),
        // adjacent groups become one
        (r"\] ?\[", " "),
        (r"\[\]", ""),
        (r" +", " "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid regex: LINE_RULES"),
            replacement,
        )
    })
    .collect()
});

static BLANK_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("valid regex: BLANK_RUN_RE"));

/// Check that brackets alternate `[`, `]` and are never nested.
pub fn validate_brackets(text: &str) -> Result<(), ChordsError> {
    let mut open_at: Option<usize> = None;
    for (offset, c) in text.char_indices() {
        match (c, open_at) {
            ('[', Some(previous)) => {
                return Err(ChordsError::MissingClosingBracket { offset: previous });
            }
            ('[', None) => open_at = Some(offset),
            (']', None) => return Err(ChordsError::MissingOpeningBracket { offset }),
            (']', Some(_)) => open_at = None,
            _ => {}
        }
    }
    match open_at {
        Some(offset) => Err(ChordsError::MissingClosingBracket { offset }),
        None => Ok(()),
    }
}

/// Check brackets, then that every word in every group is a chord of `notation`.
pub fn validate_chords(text: &str, notation: Notation) -> Result<(), ChordsError> {
    validate_brackets(text)?;
    let detector = ChordsDetector::new(notation);
    for captures in BRACKET_GROUP_RE.captures_iter(text) {
        let group = &captures[1];
        if let Some(word) = group
            .split([' ', '\n', '(', ')'])
            .filter(|word| !word.is_empty())
            .find(|word| !detector.is_word_a_chord(word))
        {
            return Err(ChordsError::UnknownChord {
                chord: word.to_string(),
            });
        }
    }
    Ok(())
}

/// Distinct chords in order of first appearance inside brackets.
#[must_use]
pub fn unique_chords(text: &str, notation: Notation) -> Vec<String> {
    let detector = ChordsDetector::new(notation);
    let mut seen = FxHashSet::default();
    let mut chords = Vec::new();
    for captures in BRACKET_GROUP_RE.captures_iter(text) {
        let Some(group) = captures.get(1) else {
            continue;
        };
        for piece in split_keeping_delimiters(group.as_str()) {
            if let GroupPiece::Token(token) = piece
                && detector.recognize_single_chord(token).is_some()
                && seen.insert(token)
            {
                chords.push(token.to_string());
            }
        }
    }
    chords
}

/// Rewrite `Fis`-style sharps inside chord groups as `F#`.
#[must_use]
pub fn chords_fis_to_sharp(text: &str) -> String {
    INLINE_GROUP_RE
        .replace_all(text, |captures: &regex::Captures<'_>| {
            format!("[{}]", FIS_RE.replace_all(&captures[1], "${1}#"))
        })
        .into_owned()
}

/// Normalize whitespace and bracket noise line by line, then squeeze blank lines.
#[must_use]
pub fn reformat_and_trim(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<String> = normalized
        .split('\n')
        .map(|line| {
            let mut line = line.trim().replace(['\t', '\u{00A0}'], " ");
            for (rule, replacement) in LINE_RULES.iter() {
                line = rule.replace_all(&line, *replacement).into_owned();
            }
            line
        })
        .collect();
    let joined = lines.join("\n");
    let squeezed = BLANK_RUN_RE.replace_all(&joined, "\n\n");
    squeezed.trim_matches('\n').to_string()
}

/// Append a chord-only line to the end of the text line that follows it.
#[must_use]
pub fn move_chords_above_to_right(text: &str) -> String {
    let padded = format!("\n{}\n", reformat_and_trim(text));
    let moved = CHORDS_ABOVE_TEXT_RE.replace_all(&padded, "\n${2} [${1}]\n");
    let moved = moved.strip_prefix('\n').unwrap_or(&moved);
    moved.strip_suffix('\n').unwrap_or(moved).to_string()
}

/// Merge each chord-only line into the text line below it, keeping every
/// group at the column it had above the text.
#[must_use]
pub fn move_chords_above_to_inline(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut merged = Vec::with_capacity(lines.len());
    let mut index = 0;
    let mut moved = 0usize;
    while index < lines.len() {
        let line = lines[index];
        if let Some(next) = lines.get(index + 1)
            && is_chords_only_line(line)
            && !next.trim().is_empty()
            && !next.contains('[')
        {
            merged.push(insert_groups_at_columns(line, next));
            moved += 1;
            index += 2;
            continue;
        }
        merged.push(line.to_string());
        index += 1;
    }
    debug!(moved, "moved chord lines inline");
    merged.join("\n")
}

fn is_chords_only_line(line: &str) -> bool {
    INLINE_GROUP_RE.is_match(line) && INLINE_GROUP_RE.replace_all(line, "").trim().is_empty()
}

fn insert_groups_at_columns(chord_line: &str, text_line: &str) -> String {
    let text: Vec<char> = text_line.chars().collect();
    let mut out = String::with_capacity(chord_line.len() + text_line.len());
    let mut text_column = 0;
    for group in INLINE_GROUP_RE.find_iter(chord_line) {
        let column = chord_line[..group.start()].chars().count();
        while text_column < column {
            out.push(text.get(text_column).copied().unwrap_or(' '));
            text_column += 1;
        }
        out.push_str(group.as_str());
    }
    out.extend(text.iter().skip(text_column));
    out
}
