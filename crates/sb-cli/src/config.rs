//! Settings read from an optional TOML file. Command-line flags override
//! whatever the file says.

use std::path::Path;

use anyhow::{Context, Result};
use sb_core::{DisplayStyle, Instrument, Notation};
use sb_layout::LayoutConfig;
use sb_render_term::{GlyphMode, TermRenderConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "songbook.toml";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub notation: Notation,
    pub display_style: DisplayStyle,
    /// Render width in terminal columns.
    pub width: f32,
    pub instrument: Instrument,
    pub glyph_mode: GlyphMode,
    /// Bold chords with ANSI escapes.
    pub color: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            notation: Notation::English,
            display_style: DisplayStyle::ChordsAbove,
            width: 80.0,
            instrument: Instrument::Guitar,
            glyph_mode: GlyphMode::Unicode,
            color: false,
        }
    }
}

/// Values given on the command line; `None` keeps the file's value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub notation: Option<Notation>,
    pub display_style: Option<DisplayStyle>,
    pub width: Option<f32>,
    pub instrument: Option<Instrument>,
    pub glyph_mode: Option<GlyphMode>,
    pub color: Option<bool>,
}

impl CliConfig {
    /// Load `path`, or [`DEFAULT_CONFIG_FILE`] when it exists, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config = Self::from_toml(&source)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        debug!(path = %path.display(), ?config, "loaded config");
        Ok(config)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validated()
    }

    /// Apply command-line values, checking the result like a file.
    pub fn with_overrides(self, overrides: Overrides) -> Result<Self> {
        Self {
            notation: overrides.notation.unwrap_or(self.notation),
            display_style: overrides.display_style.unwrap_or(self.display_style),
            width: overrides.width.unwrap_or(self.width),
            instrument: overrides.instrument.unwrap_or(self.instrument),
            glyph_mode: overrides.glyph_mode.unwrap_or(self.glyph_mode),
            color: overrides.color.unwrap_or(self.color),
        }
        .validated()
    }

    fn validated(self) -> Result<Self> {
        if !(self.width.is_finite() && self.width > 0.0) {
            anyhow::bail!("width must be a positive number, got {}", self.width);
        }
        Ok(self)
    }

    #[must_use]
    pub const fn layout(&self) -> LayoutConfig {
        LayoutConfig {
            display_style: self.display_style,
            screen_width: self.width,
        }
    }

    #[must_use]
    pub fn render(&self) -> TermRenderConfig {
        TermRenderConfig {
            glyph_mode: self.glyph_mode,
            bold_chords: self.color,
            ..TermRenderConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = CliConfig::from_toml("notation = \"german\"\n").expect("valid config");
        assert_eq!(config.notation, Notation::German);
        assert_eq!(config.display_style, DisplayStyle::ChordsAbove);
        assert_eq!(config.width, 80.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::from_toml("colour = true\n").is_err());
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(CliConfig::from_toml("width = 0.0\n").is_err());
    }

    #[test]
    fn reads_every_field_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "notation = \"german-is\"\n\
             display_style = \"chords-aligned-right\"\n\
             width = 42.0\n\
             instrument = \"ukulele\"\n\
             glyph_mode = \"ascii\"\n\
             color = true"
        )
        .expect("write config");

        let config = CliConfig::load(Some(file.path())).expect("load config");
        assert_eq!(
            config,
            CliConfig {
                notation: Notation::GermanIs,
                display_style: DisplayStyle::ChordsAlignedRight,
                width: 42.0,
                instrument: Instrument::Ukulele,
                glyph_mode: GlyphMode::Ascii,
                color: true,
            }
        );
        assert!(config.render().bold_chords);
        assert_eq!(config.layout().screen_width, 42.0);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = CliConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(error.to_string().contains("Failed to read config"));
    }

    #[test]
    fn flags_override_file_values() {
        let config = CliConfig::default()
            .with_overrides(Overrides {
                notation: Some(Notation::German),
                width: Some(30.0),
                ..Overrides::default()
            })
            .expect("valid overrides");
        assert_eq!(config.notation, Notation::German);
        assert_eq!(config.width, 30.0);
        assert_eq!(config.instrument, Instrument::Guitar);
    }

    #[test]
    fn width_flag_is_checked_like_the_file() {
        for width in [0.0, -4.0, f32::NAN, f32::INFINITY] {
            let result = CliConfig::default().with_overrides(Overrides {
                width: Some(width),
                ..Overrides::default()
            });
            assert!(result.is_err(), "width {width} was accepted");
        }
    }
}
