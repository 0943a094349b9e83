#![forbid(unsafe_code)]

//! Songbook CLI - work with chord-annotated lyrics.
//!
//! # Commands
//!
//! - `detect`: Wrap chord-only words in brackets
//! - `convert`: Re-spell bracketed chords in another notation
//! - `transpose`: Shift bracketed chords by semitones
//! - `validate`: Check brackets and chord names
//! - `transform`: Apply an editor transform (move chords, reformat, ...)
//! - `arrange`: Lay lyrics out for a terminal in one of the display styles
//! - `diagram`: Draw fretboard diagrams for a chord or a fret definition
//! - `chords`: List the distinct chords of a song

mod config;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sb_chords::{
    ChordsConverter, ChordsDetector, ChordsTransposer, chord_report, chords_fis_to_sharp,
    move_chords_above_to_inline, move_chords_above_to_right, reformat_and_trim,
    transposed_by_label, validate_chords,
};
use sb_core::{
    ChordsError, DisplayStyle, FontMetrics, FontMetricsConfig, FontPreset, Instrument, Notation,
};
use sb_layout::{arrange_with_stats, parse_lyrics};
use sb_render_term::{
    ChordDiagramBuilder, DIAGRAM_SEPARATOR, GlyphMode, TerminalMetrics, render_chord_sheet,
    render_lyrics,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{CliConfig, Overrides};

/// Songbook CLI - detect, convert, transpose and lay out chord-annotated lyrics.
#[derive(Debug, Parser)]
#[command(
    name = "songbook",
    version,
    about = "Songbook CLI - detect, convert, transpose and lay out chord-annotated lyrics",
    long_about = "Chords are written in square brackets inside the lyrics, e.g. \
        \"[a F]Hello darkness\".\n\n\
        Input is a file path, \"-\" for stdin, or the text itself."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Settings file (defaults to ./songbook.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Chord notation of the input (german, german-is, english)
    #[arg(short, long, global = true)]
    notation: Option<Notation>,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Wrap lines and runs of chord words in brackets.
    Detect {
        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Accept chords written in any notation
        #[arg(long)]
        any_notation: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Re-spell bracketed chords in another notation.
    Convert {
        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Target notation
        #[arg(short, long)]
        to: Notation,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Shift bracketed chords by a number of semitones.
    Transpose {
        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Semitones to shift by; negative values shift down
        #[arg(short, long, allow_negative_numbers = true)]
        semitones: i32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check brackets and chord names.
    Validate {
        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON (structured diagnostics)
        #[arg(long)]
        json: bool,
    },

    /// Apply an editor transform to the whole text.
    Transform {
        /// Transform to apply
        #[arg(value_enum)]
        operation: TransformOp,

        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,
    },

    /// Lay lyrics out for the terminal.
    Arrange {
        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Display style (chords-inline, chords-above, chords-only, lyrics-only, chords-aligned-right)
        #[arg(short, long)]
        style: Option<DisplayStyle>,

        /// Render width in columns
        #[arg(short, long)]
        width: Option<f32>,

        /// ASCII-only output
        #[arg(long)]
        ascii: bool,

        /// Bold chords with ANSI escapes
        #[arg(long)]
        color: bool,

        /// Output the arranged model and statistics as JSON
        #[arg(long)]
        json: bool,

        /// Measure with an estimated proportional font instead of terminal
        /// columns; the width is then in pixels (JSON output only)
        #[arg(long, value_name = "FAMILY", requires = "json")]
        font: Option<String>,

        /// Font size in pixels for --font
        #[arg(long, default_value_t = 15.0, requires = "font")]
        font_size: f32,
    },

    /// Draw fretboard diagrams.
    Diagram {
        /// Chord name, or a fret definition such as "x,3,2,0,1,0" with --frets
        chord: String,

        /// Treat the argument as a fret definition
        #[arg(long)]
        frets: bool,

        /// Instrument (guitar, ukulele, mandolin)
        #[arg(short, long)]
        instrument: Option<Instrument>,

        /// ASCII-only output
        #[arg(long)]
        ascii: bool,
    },

    /// List the distinct chords of a song.
    Chords {
        /// Input file path, "-" for stdin, or inline text.
        #[arg(default_value = "-")]
        input: String,

        /// Also spell every chord in this notation
        #[arg(short, long)]
        to: Option<Notation>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum TransformOp {
    /// Merge chord-only lines into the text line below them
    MoveInline,
    /// Append chord-only lines to the end of the text line below them
    MoveRight,
    /// Rewrite "Fis"-style chords as "F#"
    FisToSharp,
    /// Normalize whitespace and bracket noise
    Reformat,
}

#[derive(Debug, Serialize)]
struct DetectResult {
    notations: Vec<&'static str>,
    detected_chords: Vec<String>,
    text: String,
}

#[derive(Debug, Serialize)]
struct RewriteResult {
    from: &'static str,
    to: &'static str,
    text: String,
    unrecognized: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    notation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ValidationError>,
}

#[derive(Debug, Serialize)]
struct ValidationError {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<usize>,
}

impl From<&ChordsError> for ValidationError {
    fn from(error: &ChordsError) -> Self {
        let offset = match error {
            ChordsError::MissingOpeningBracket { offset }
            | ChordsError::MissingClosingBracket { offset } => Some(*offset),
            ChordsError::UnknownChord { .. } => None,
        };
        Self {
            code: error.code().as_str(),
            message: error.to_string(),
            offset,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let settings = CliConfig::load(cli.config.as_deref())?.with_overrides(Overrides {
        notation: cli.notation,
        ..Overrides::default()
    })?;
    debug!(?settings, "effective settings");

    match cli.command {
        Command::Detect {
            input,
            any_notation,
            json,
        } => cmd_detect(&input, &settings, any_notation, json),

        Command::Convert { input, to, json } => cmd_convert(&input, &settings, to, json),

        Command::Transpose {
            input,
            semitones,
            json,
        } => cmd_transpose(&input, &settings, semitones, json),

        Command::Validate { input, json } => cmd_validate(&input, &settings, json),

        Command::Transform { operation, input } => cmd_transform(&input, operation),

        Command::Arrange {
            input,
            style,
            width,
            ascii,
            color,
            json,
            font,
            font_size,
        } => {
            let settings = settings.with_overrides(Overrides {
                display_style: style,
                width,
                glyph_mode: ascii.then_some(GlyphMode::Ascii),
                color: color.then_some(true),
                ..Overrides::default()
            })?;
            let font = font.map(|family| font_metrics(&family, font_size)).transpose()?;
            cmd_arrange(&input, &settings, json, font.as_ref())
        }

        Command::Diagram {
            chord,
            frets,
            instrument,
            ascii,
        } => {
            let settings = settings.with_overrides(Overrides {
                instrument,
                glyph_mode: ascii.then_some(GlyphMode::Ascii),
                ..Overrides::default()
            })?;
            cmd_diagram(&chord, &settings, frets)
        }

        Command::Chords { input, to, json } => cmd_chords(&input, &settings, to, json),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else if Path::new(input).is_file() {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    } else {
        // Treat as inline lyrics
        Ok(input.to_string())
    }
}

fn write_output(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        stdout.write_all(b"\n").context("Failed to write to stdout")?;
    }
    Ok(())
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    write_output(&serde_json::to_string_pretty(value)?)
}

// =============================================================================
// Command: detect
// =============================================================================

fn cmd_detect(
    input: &str,
    settings: &CliConfig,
    any_notation: bool,
    json_output: bool,
) -> Result<()> {
    let source = load_input(input)?;
    let mut detector = if any_notation {
        ChordsDetector::any_notation()
    } else {
        ChordsDetector::new(settings.notation)
    };
    let marked = detector.detect_and_mark_chords(&source);
    info!(chords = detector.detected_chords().len(), "detected chords");

    if json_output {
        write_json(&DetectResult {
            notations: detector.notations().iter().map(|n| n.as_str()).collect(),
            detected_chords: detector.detected_chords().to_vec(),
            text: marked,
        })
    } else {
        write_output(&marked)
    }
}

// =============================================================================
// Command: convert
// =============================================================================

fn cmd_convert(input: &str, settings: &CliConfig, to: Notation, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let converter = ChordsConverter::new(settings.notation, to);
    let (text, unrecognized) = converter.convert_lyrics_reporting(&source);
    report_unrecognized(&unrecognized);

    if json_output {
        write_json(&RewriteResult {
            from: settings.notation.as_str(),
            to: to.as_str(),
            text,
            unrecognized,
        })
    } else {
        write_output(&text)
    }
}

fn report_unrecognized(unrecognized: &[String]) {
    if !unrecognized.is_empty() {
        warn!(
            count = unrecognized.len(),
            tokens = %unrecognized.join(", "),
            "unrecognized chords left unchanged"
        );
    }
}

// =============================================================================
// Command: transpose
// =============================================================================

fn cmd_transpose(
    input: &str,
    settings: &CliConfig,
    semitones: i32,
    json_output: bool,
) -> Result<()> {
    let source = load_input(input)?;
    let transposer = ChordsTransposer::new(settings.notation, semitones);
    let (text, unrecognized) = transposer.transpose_lyrics_reporting(&source);
    info!(by = %transposed_by_label(semitones), "transposed");
    report_unrecognized(&unrecognized);

    if json_output {
        write_json(&RewriteResult {
            from: settings.notation.as_str(),
            to: settings.notation.as_str(),
            text,
            unrecognized,
        })
    } else {
        write_output(&text)
    }
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(input: &str, settings: &CliConfig, json_output: bool) -> Result<()> {
    let source = load_input(input)?;
    let outcome = validate_chords(&source, settings.notation);
    let result = ValidateResult {
        valid: outcome.is_ok(),
        notation: settings.notation.as_str(),
        error: outcome.as_ref().err().map(ValidationError::from),
    };

    if json_output {
        write_json(&result)?;
    } else if let Some(error) = &result.error {
        let location = error
            .offset
            .map(|offset| format!(" (offset {offset})"))
            .unwrap_or_default();
        write_output(&format!(
            "✗ Invalid\n  [{}] {}{location}",
            error.code, error.message
        ))?;
    } else {
        write_output(&format!("✓ Valid ({})", settings.notation.display_name()))?;
    }

    if !result.valid {
        std::process::exit(1);
    }
    Ok(())
}

// =============================================================================
// Command: transform
// =============================================================================

fn cmd_transform(input: &str, operation: TransformOp) -> Result<()> {
    let source = load_input(input)?;
    let transformed = match operation {
        TransformOp::MoveInline => move_chords_above_to_inline(&source),
        TransformOp::MoveRight => move_chords_above_to_right(&source),
        TransformOp::FisToSharp => chords_fis_to_sharp(&source),
        TransformOp::Reformat => reformat_and_trim(&source),
    };
    write_output(&transformed)
}

// =============================================================================
// Command: arrange
// =============================================================================

fn font_metrics(family: &str, font_size: f32) -> Result<FontMetrics> {
    if !(font_size.is_finite() && font_size > 0.0) {
        anyhow::bail!("font size must be a positive number, got {font_size}");
    }
    let preset = FontPreset::from_family(family);
    debug!(family, preset = ?preset, font_size, "using estimated font metrics");
    Ok(FontMetrics::new(FontMetricsConfig {
        preset,
        font_size,
        ..FontMetricsConfig::default()
    }))
}

fn cmd_arrange(
    input: &str,
    settings: &CliConfig,
    json_output: bool,
    font: Option<&FontMetrics>,
) -> Result<()> {
    let source = load_input(input)?;
    let arranged = match font {
        Some(metrics) => {
            arrange_with_stats(&parse_lyrics(&source, metrics), settings.layout(), metrics)
        }
        None => arrange_with_stats(
            &parse_lyrics(&source, &TerminalMetrics),
            settings.layout(),
            &TerminalMetrics,
        ),
    };
    info!(
        style = settings.display_style.as_str(),
        width = settings.width,
        physical_lines = arranged.stats.physical_lines,
        wrapped_lines = arranged.stats.wrapped_lines,
        "arranged lyrics"
    );

    if json_output {
        write_json(&arranged)
    } else {
        write_output(&render_lyrics(&arranged.model, &settings.render()))
    }
}

// =============================================================================
// Command: diagram
// =============================================================================

fn cmd_diagram(chord: &str, settings: &CliConfig, frets: bool) -> Result<()> {
    let render = settings.render();
    let output = if frets {
        ChordDiagramBuilder::new(settings.instrument, render.diagram_glyphs())
            .build_diagram(chord)
            .context(format!("Invalid fret definition: {chord}"))?
    } else {
        let chords: Vec<&str> = chord.split_whitespace().collect();
        let sheets = chords
            .iter()
            .map(|name| render_chord_sheet(name, settings.notation, settings.instrument, &render))
            .collect::<Result<Vec<_>, _>>()
            .context(format!(
                "Cannot draw {chord} in {} notation",
                settings.notation.as_str()
            ))?;
        sheets.join(format!("{DIAGRAM_SEPARATOR}\n").as_str())
    };
    write_output(&output)
}

// =============================================================================
// Command: chords
// =============================================================================

fn cmd_chords(
    input: &str,
    settings: &CliConfig,
    to: Option<Notation>,
    json_output: bool,
) -> Result<()> {
    let source = load_input(input)?;
    let target = to.unwrap_or(settings.notation);
    let report = chord_report(&source, settings.notation, target);

    if json_output {
        return write_json(&report);
    }
    let lines: Vec<String> = report
        .iter()
        .map(|entry| {
            if to.is_some() {
                format!("{} -> {}", entry.token, entry.spelled)
            } else {
                entry.token.clone()
            }
        })
        .collect();
    write_output(&lines.join("\n"))
}
