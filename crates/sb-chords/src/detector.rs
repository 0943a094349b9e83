use sb_core::{Chord, Notation};
use tracing::{debug, trace};

use crate::grammar::{
    BRACKET_GROUP_RE, is_chord_suffix, is_primary_delimiter, is_secondary_delimiter,
    note_spellings,
};

/// Recognizes chord tokens in one notation, or in any of them.
#[derive(Debug, Clone)]
pub struct ChordsDetector {
    notations: Vec<Notation>,
    detected_chords: Vec<String>,
}

impl ChordsDetector {
    #[must_use]
    pub fn new(notation: Notation) -> Self {
        Self {
            notations: vec![notation],
            detected_chords: Vec::new(),
        }
    }

    /// Detector trying German, German (-is) and English in that order.
    #[must_use]
    pub fn any_notation() -> Self {
        Self {
            notations: Notation::ALL.to_vec(),
            detected_chords: Vec::new(),
        }
    }

    #[must_use]
    pub fn notations(&self) -> &[Notation] {
        &self.notations
    }

    /// Chord spans marked by [`Self::detect_and_mark_chords`] so far.
    #[must_use]
    pub fn detected_chords(&self) -> &[String] {
        &self.detected_chords
    }

    /// Parse a single chord spanning the whole word.
    #[must_use]
    pub fn recognize_single_chord(&self, word: &str) -> Option<Chord> {
        if word.trim().is_empty() {
            return None;
        }
        self.notations
            .iter()
            .find_map(|&notation| recognize_in_notation(notation, word))
    }

    /// Whether `word` is a chord, a parenthesized chord or a sequence of
    /// chords joined by secondary delimiters (`C/H`, `Am-G-C`, `D(C-h)`).
    #[must_use]
    pub fn is_word_a_chord(&self, word: &str) -> bool {
        if word.trim().is_empty() {
            return false;
        }
        let unwrapped = word.strip_prefix('(').unwrap_or(word);
        let unwrapped = unwrapped.strip_suffix(')').unwrap_or(unwrapped);
        if self.recognize_single_chord(unwrapped).is_some() {
            return true;
        }
        if !unwrapped.contains(is_secondary_delimiter) {
            return false;
        }
        // Parentheses only group; every `/` and `-` needs a chord on both sides.
        let mut groups = unwrapped
            .split(['(', ')'])
            .filter(|group| !group.is_empty())
            .peekable();
        groups.peek().is_some()
            && groups.all(|group| group.split('/').all(|side| self.is_chord_sequence(side)))
    }

    /// A chord, or chords joined by `-` with no empty part.
    fn is_chord_sequence(&self, side: &str) -> bool {
        self.recognize_single_chord(side).is_some()
            || side
                .split('-')
                .all(|part| self.recognize_single_chord(part).is_some())
    }

    /// Wrap runs of chord words in brackets, leaving bracketed regions as
    /// they are.
    pub fn detect_and_mark_chords(&mut self, text: &str) -> String {
        let mut marked = String::with_capacity(text.len() + 8);
        let mut cursor = 0;
        for group in BRACKET_GROUP_RE.find_iter(text) {
            self.mark_segment(&text[cursor..group.start()], &mut marked);
            marked.push_str(group.as_str());
            cursor = group.end();
        }
        self.mark_segment(&text[cursor..], &mut marked);
        debug!(
            spans = self.detected_chords.len(),
            "chord detection finished"
        );
        marked
    }

    fn mark_segment(&mut self, segment: &str, out: &mut String) {
        let tokens = tokenize(segment);
        let mut index = 0;
        while index < tokens.len() {
            let token = tokens[index];
            if !self.is_chord_token(token) {
                out.push_str(token.text());
                index += 1;
                continue;
            }

            // Extend the run over spaces followed by another chord word.
            let mut run_end = index;
            let mut next_index = index + 1;
            while next_index < tokens.len() {
                match tokens[next_index] {
                    Token::Delimiter(" ") => next_index += 1,
                    next if self.is_chord_token(next) => {
                        run_end = next_index;
                        next_index += 1;
                    }
                    _ => break,
                }
            }

            let span: String = tokens[index..=run_end].iter().map(|t| t.text()).collect();
            trace!(span = %span, "marking chord span");
            out.push('[');
            out.push_str(&span);
            out.push(']');
            self.detected_chords.push(span);
            index = run_end + 1;
        }
    }

    fn is_chord_token(&self, token: Token<'_>) -> bool {
        matches!(token, Token::Word(word) if self.is_word_a_chord(word))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Delimiter(&'a str),
}

impl<'a> Token<'a> {
    const fn text(self) -> &'a str {
        match self {
            Self::Word(text) | Self::Delimiter(text) => text,
        }
    }
}

fn tokenize(segment: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut word_start = 0;
    for (offset, c) in segment.char_indices() {
        if is_primary_delimiter(c) {
            if word_start < offset {
                tokens.push(Token::Word(&segment[word_start..offset]));
            }
            let end = offset + c.len_utf8();
            tokens.push(Token::Delimiter(&segment[offset..end]));
            word_start = end;
        }
    }
    if word_start < segment.len() {
        tokens.push(Token::Word(&segment[word_start..]));
    }
    tokens
}

fn recognize_in_notation(notation: Notation, word: &str) -> Option<Chord> {
    note_spellings(notation).iter().find_map(|spelling| {
        let rest = word.strip_prefix(spelling.name.as_str())?;
        let note_index = i32::from(spelling.note_index);
        if !spelling.minor
            && let Some(suffix) = rest.strip_prefix('m')
            && (suffix.is_empty() || is_chord_suffix(suffix))
        {
            return Some(flatten_suffix(note_index, true, suffix));
        }
        (rest.is_empty() || is_chord_suffix(rest))
            .then(|| flatten_suffix(note_index, spelling.minor, rest))
    })
}

/// A bare `b` suffix lowers the note a semitone: German `Hb` is `B`, `Ab` is `As`.
fn flatten_suffix(note_index: i32, minor: bool, suffix: &str) -> Chord {
    if suffix == "b" {
        Chord::new(note_index - 1, minor, "")
    } else {
        Chord::new(note_index, minor, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn german() -> ChordsDetector {
        ChordsDetector::new(Notation::German)
    }

    fn english() -> ChordsDetector {
        ChordsDetector::new(Notation::English)
    }

    #[test]
    fn recognizes_major_chords() {
        let detector = german();
        assert_eq!(detector.recognize_single_chord("C"), Some(Chord::new(0, false, "")));
        assert_eq!(detector.recognize_single_chord("C#"), Some(Chord::new(1, false, "")));
        assert_eq!(detector.recognize_single_chord("D"), Some(Chord::new(2, false, "")));
        assert_eq!(
            detector.recognize_single_chord("Csus4"),
            Some(Chord::new(0, false, "sus4"))
        );
        assert_eq!(
            detector.recognize_single_chord("C#sus4"),
            Some(Chord::new(1, false, "sus4"))
        );
    }

    #[test]
    fn recognizes_lower_case_minor_chords() {
        let detector = german();
        assert_eq!(detector.recognize_single_chord("c"), Some(Chord::new(0, true, "")));
        assert_eq!(detector.recognize_single_chord("c#"), Some(Chord::new(1, true, "")));
        assert_eq!(
            detector.recognize_single_chord("dsus4"),
            Some(Chord::new(2, true, "sus4"))
        );
        assert_eq!(detector.recognize_single_chord("dis"), Some(Chord::new(3, true, "")));
        assert_eq!(detector.recognize_single_chord("es"), Some(Chord::new(3, true, "")));
        assert_eq!(detector.recognize_single_chord("dupa"), None);
    }

    #[test]
    fn lower_case_minor_keeps_m_as_suffix() {
        let detector = german();
        assert_eq!(detector.recognize_single_chord("cm"), Some(Chord::new(0, true, "m")));
        assert_eq!(detector.recognize_single_chord("Cm"), Some(Chord::new(0, true, "")));
    }

    #[test]
    fn recognizes_english_minor_marker() {
        let detector = english();
        assert_eq!(detector.recognize_single_chord("Dm"), Some(Chord::new(2, true, "")));
        assert_eq!(
            detector.recognize_single_chord("Dmmaj7"),
            Some(Chord::new(2, true, "maj7"))
        );
        assert_eq!(
            detector.recognize_single_chord("Dmaj7"),
            Some(Chord::new(2, false, "maj7"))
        );
        assert_eq!(detector.recognize_single_chord("D"), Some(Chord::new(2, false, "")));
        assert_eq!(detector.recognize_single_chord("Dmupa"), None);
        assert_eq!(detector.recognize_single_chord("am"), None);
    }

    #[test]
    fn recognizes_flat_spellings_in_english() {
        let detector = english();
        assert_eq!(detector.recognize_single_chord("Bb"), Some(Chord::new(10, false, "")));
        assert_eq!(detector.recognize_single_chord("Ebm7"), Some(Chord::new(3, true, "7")));
        assert_eq!(detector.recognize_single_chord("B"), Some(Chord::new(11, false, "")));
    }

    #[test]
    fn bare_flat_suffix_lowers_the_note() {
        let detector = german();
        assert_eq!(detector.recognize_single_chord("Hb"), Some(Chord::new(10, false, "")));
        assert_eq!(detector.recognize_single_chord("Ab"), Some(Chord::new(8, false, "")));
        assert_eq!(detector.recognize_single_chord("ab"), Some(Chord::new(8, true, "")));
        assert_eq!(detector.recognize_single_chord("Cb"), Some(Chord::new(11, false, "")));
        assert_eq!(
            english().recognize_single_chord("Ab"),
            Some(Chord::new(8, false, ""))
        );
    }

    #[test]
    fn recognizes_plus_minus_and_long_suffixes() {
        let detector = german();
        assert_eq!(detector.recognize_single_chord("C+"), Some(Chord::new(0, false, "+")));
        assert_eq!(detector.recognize_single_chord("C-"), Some(Chord::new(0, false, "-")));
        assert_eq!(
            detector.recognize_single_chord("G6add11"),
            Some(Chord::new(7, false, "6add11"))
        );
        assert!(detector.is_word_a_chord("C+"));
        assert!(detector.is_word_a_chord("C-"));
    }

    #[test]
    fn accepts_parenthesized_and_joined_chords() {
        let detector = german();
        assert!(detector.is_word_a_chord("C"));
        assert!(detector.is_word_a_chord("C-h"));
        assert!(detector.is_word_a_chord("C-h)"));
        assert!(detector.is_word_a_chord("(C-h)"));
        assert!(detector.is_word_a_chord("D(C-h)"));
        assert!(detector.is_word_a_chord("G#maj7-F"));
    }

    #[test]
    fn rejects_words_that_are_not_chords() {
        let detector = german();
        assert!(!detector.is_word_a_chord("Dupa"));
        assert!(!detector.is_word_a_chord("Cmaj7blahblahblah"));
        assert!(!detector.is_word_a_chord("Dsus888"));
        assert!(!detector.is_word_a_chord(" "));
        assert!(!detector.is_word_a_chord(""));
        assert!(!detector.is_word_a_chord("()"));
        assert!(!detector.is_word_a_chord("-"));
    }

    #[test]
    fn slash_chords_need_both_sides() {
        let detector = german();
        assert!(detector.is_word_a_chord("C/H"));
        assert!(!detector.is_word_a_chord("C/Y"));
        assert!(detector.is_word_a_chord("a/G"));
        assert!(!detector.is_word_a_chord("C/"));
        assert!(!detector.is_word_a_chord("/C"));
        assert!(!detector.is_word_a_chord("C//"));
        assert!(!detector.is_word_a_chord("C//G"));
        assert!(!detector.is_word_a_chord("C-/"));
        assert!(!detector.is_word_a_chord("D(-C)"));
        assert!(detector.is_word_a_chord("C-/G"));
    }

    #[test]
    fn dangling_slashes_are_left_as_lyrics() {
        let mut detector = english();
        assert_eq!(
            detector.detect_and_mark_chords("and/or A/ B/"),
            "and/or A/ B/"
        );
        assert_eq!(detector.detect_and_mark_chords("A/E B"), "[A/E B]");
        assert!(detector.detected_chords().iter().all(|span| !span.ends_with('/')));
    }

    #[test]
    fn minor_suffixes_in_german_variants() {
        assert!(german().is_word_a_chord("cmaj7"));
        assert!(ChordsDetector::new(Notation::GermanIs).is_word_a_chord("cismaj7"));
    }

    #[test]
    fn any_notation_accepts_every_convention() {
        let detector = ChordsDetector::any_notation();
        assert!(detector.is_word_a_chord("cismaj7"));
        assert!(detector.is_word_a_chord("Cm"));
        assert!(detector.is_word_a_chord("C#"));
        assert!(detector.is_word_a_chord("C#add9"));
        assert!(detector.is_word_a_chord("Bbm"));
    }

    #[test]
    fn marks_single_chords() {
        let mut detector = english();
        assert_eq!(detector.detect_and_mark_chords("Fmaj7"), "[Fmaj7]");
        assert_eq!(detector.detect_and_mark_chords("Fm"), "[Fm]");
        assert_eq!(detector.detected_chords(), ["Fmaj7", "Fm"]);
    }

    #[test]
    fn merges_space_separated_chords() {
        let mut detector = english();
        assert_eq!(
            detector.detect_and_mark_chords("Am    Fm   G"),
            "[Am    Fm   G]"
        );
        assert_eq!(detector.detected_chords().len(), 1);
    }

    #[test]
    fn marks_dashed_chords_as_one_span() {
        let mut detector = english();
        assert_eq!(detector.detect_and_mark_chords("Am-G-C"), "[Am-G-C]");
    }

    #[test]
    fn leaves_lyrics_and_existing_groups_alone() {
        let mut detector = english();
        let marked = detector.detect_and_mark_chords("Hello [G] world, Am C\nE");
        assert_eq!(marked, "Hello [G] world, [Am C]\n[E]");
        assert_eq!(detector.detected_chords(), ["Am C", "E"]);
    }

    #[test]
    fn comma_breaks_a_run() {
        let mut detector = english();
        assert_eq!(detector.detect_and_mark_chords("Am, C"), "[Am], [C]");
    }

    #[test]
    fn whitespace_only_words_are_never_chords() {
        let detector = ChordsDetector::any_notation();
        assert_eq!(detector.recognize_single_chord("   "), None);
        assert_eq!(detector.recognize_single_chord(""), None);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_marking_only_adds_brackets(text in "[A-Ha-h#/ ,()\n-]{0,40}") {
            let marked = ChordsDetector::any_notation().detect_and_mark_chords(&text);
            let stripped: String = marked.chars().filter(|c| !matches!(c, '[' | ']')).collect();
            prop_assert_eq!(stripped, text);
        }
    }
}
