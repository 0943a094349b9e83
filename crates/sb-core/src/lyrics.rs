//! Lyrics model shared by the parser, the arranger and the renderers.
//!
//! A *logical* model holds lines as authored. A *physical* model is the
//! arranger's output: every line fits the render width and every fragment
//! carries its final `x` position.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Glyph drawn where a logical line was wrapped.
pub const LINE_WRAPPER_CHAR: char = '\u{21B5}';

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FragmentKind {
    Text,
    Chord,
    LineWrapper,
}

/// A positioned run of text, chords or a line-wrap marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsFragment {
    pub kind: FragmentKind,
    pub text: String,
    pub width: f32,
    /// Horizontal position; meaningful only after layout.
    pub x: f32,
}

impl LyricsFragment {
    #[must_use]
    pub fn new(kind: FragmentKind, text: impl Into<String>, width: f32) -> Self {
        Self {
            kind,
            text: text.into(),
            width,
            x: 0.0,
        }
    }

    #[must_use]
    pub fn text(text: impl Into<String>, width: f32) -> Self {
        Self::new(FragmentKind::Text, text, width)
    }

    #[must_use]
    pub fn chord(text: impl Into<String>, width: f32) -> Self {
        Self::new(FragmentKind::Chord, text, width)
    }

    #[must_use]
    pub fn line_wrapper(width: f32) -> Self {
        Self::new(FragmentKind::LineWrapper, LINE_WRAPPER_CHAR.to_string(), width)
    }

    #[must_use]
    pub fn at(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    #[must_use]
    pub fn is_chord(&self) -> bool {
        self.kind == FragmentKind::Chord
    }

    #[must_use]
    pub fn is_text(&self) -> bool {
        self.kind == FragmentKind::Text
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// True when the content is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl fmt::Display for LyricsFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FragmentKind::Text => write!(f, "{}", self.text),
            FragmentKind::Chord => write!(f, "[{}]", self.text),
            FragmentKind::LineWrapper => write!(f, "{LINE_WRAPPER_CHAR}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LyricsLine {
    pub fragments: Vec<LyricsFragment>,
}

impl LyricsLine {
    #[must_use]
    pub fn new(fragments: Vec<LyricsFragment>) -> Self {
        Self { fragments }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn chords(&self) -> impl Iterator<Item = &LyricsFragment> {
        self.fragments.iter().filter(|fragment| fragment.is_chord())
    }

    pub fn texts(&self) -> impl Iterator<Item = &LyricsFragment> {
        self.fragments.iter().filter(|fragment| fragment.is_text())
    }

    #[must_use]
    pub fn has_chords(&self) -> bool {
        self.chords().next().is_some()
    }
}

impl fmt::Display for LyricsLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            write!(f, "{fragment}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LyricsModel {
    pub lines: Vec<LyricsLine>,
}

impl LyricsModel {
    #[must_use]
    pub fn new(lines: Vec<LyricsLine>) -> Self {
        Self { lines }
    }

    pub fn fragments(&self) -> impl Iterator<Item = &LyricsFragment> {
        self.lines.iter().flat_map(|line| line.fragments.iter())
    }
}

impl fmt::Display for LyricsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_display_with_markup() {
        let line = LyricsLine::new(vec![
            LyricsFragment::text("here ", 5.0),
            LyricsFragment::chord("a F", 3.0),
            LyricsFragment::text("goes", 4.0),
            LyricsFragment::line_wrapper(1.0),
        ]);
        assert_eq!(line.to_string(), "here [a F]goes\u{21B5}");
    }

    #[test]
    fn blank_detection_ignores_whitespace() {
        assert!(LyricsFragment::text("   ", 3.0).is_blank());
        assert!(LyricsFragment::text("", 0.0).is_blank());
        assert!(!LyricsFragment::chord("a", 1.0).is_blank());
        assert!(!LyricsFragment::line_wrapper(1.0).is_blank());
    }

    #[test]
    fn model_joins_lines_with_newlines() {
        let model = LyricsModel::new(vec![
            LyricsLine::new(vec![LyricsFragment::chord("C", 1.0)]),
            LyricsLine::default(),
            LyricsLine::new(vec![LyricsFragment::text("la", 2.0)]),
        ]);
        assert_eq!(model.to_string(), "[C]\n\nla");
        assert_eq!(model.fragments().count(), 2);
    }

    #[test]
    fn model_serializes_to_json() {
        let model = LyricsModel::new(vec![LyricsLine::new(vec![
            LyricsFragment::chord("G", 1.0).at(4.0),
        ])]);
        let json = serde_json::to_string(&model).expect("serialize model");
        assert!(json.contains("\"kind\":\"chord\""));
        let decoded: LyricsModel = serde_json::from_str(&json).expect("deserialize model");
        assert_eq!(decoded, model);
    }
}
