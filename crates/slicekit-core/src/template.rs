//! Output filename templates.
//!
//! A template is plain text with `{field}` or `{field:spec}` substitutions,
//! where `spec` is `[0][width]`. Numbers are right-aligned (zero-filled
//! with the `0` flag), text is left-aligned. `{{` and `}}` are literal
//! braces.
//!
//! | Field | Value |
//! |---|---|
//! | `basename` | source file name without extension |
//! | `slice` | 1-based slice index in processing order |
//! | `timestamp` | region start in frames |
//! | `timestamp_seconds` | region start in seconds, `0001.500000` style |
//! | `ext` | output file extension |
//! | `samplerate` | output sample rate in Hz |

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Default template: `input_01.wav`, `input_02.wav`, ...
pub const DEFAULT_TEMPLATE: &str = "{basename}_{slice:02}.{ext}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Basename,
    Slice,
    Timestamp,
    TimestampSeconds,
    Ext,
    SampleRate,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "basename" => Some(Field::Basename),
            "slice" => Some(Field::Slice),
            "timestamp" => Some(Field::Timestamp),
            "timestamp_seconds" => Some(Field::TimestampSeconds),
            "ext" => Some(Field::Ext),
            "samplerate" => Some(Field::SampleRate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct FieldSpec {
    zero_pad: bool,
    width: usize,
}

impl FieldSpec {
    fn parse(spec: &str) -> Option<Self> {
        if spec.is_empty() {
            return Some(Self::default());
        }
        let (zero_pad, digits) = match spec.strip_prefix('0') {
            Some(rest) => (true, rest),
            None => (false, spec),
        };
        let width = if digits.is_empty() {
            0
        } else {
            digits.parse().ok()?
        };
        Some(Self { zero_pad, width })
    }

    fn number(&self, value: u64, out: &mut String) {
        let width = self.width;
        if self.zero_pad {
            out.push_str(&format!("{value:0width$}"));
        } else {
            out.push_str(&format!("{value:>width$}"));
        }
    }

    fn text(&self, value: &str, out: &mut String) {
        let width = self.width;
        out.push_str(&format!("{value:<width$}"));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field, FieldSpec),
}

/// Values substituted into a template for one slice.
#[derive(Debug, Clone, Copy)]
pub struct SliceName<'a> {
    pub basename: &'a str,
    /// 1-based slice index
    pub slice: usize,
    /// Region start in frames
    pub start_frame: u64,
    pub sample_rate: u32,
    pub ext: &'a str,
}

impl SliceName<'_> {
    /// Region start in seconds.
    pub fn timestamp_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.start_frame as f64 / self.sample_rate as f64
    }
}

/// A parsed filename template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl FilenameTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(Error::invalid(format!(
                        "unmatched '}}' in filename template {template:?}"
                    )));
                }
                '{' => {
                    let mut body = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        body.push(c);
                    }
                    if !closed {
                        return Err(Error::invalid(format!(
                            "unterminated field in filename template {template:?}"
                        )));
                    }

                    let (name, spec) = body.split_once(':').unwrap_or((body.as_str(), ""));
                    let field = Field::parse(name).ok_or_else(|| {
                        Error::invalid(format!("unknown filename template field {{{name}}}"))
                    })?;
                    let spec = FieldSpec::parse(spec).ok_or_else(|| {
                        Error::invalid(format!("invalid format spec in {{{body}}}"))
                    })?;

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field, spec));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render the file name for one slice.
    pub fn render(&self, name: &SliceName<'_>) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field, spec) => match field {
                    Field::Basename => spec.text(name.basename, &mut out),
                    Field::Slice => spec.number(name.slice as u64, &mut out),
                    Field::Timestamp => spec.number(name.start_frame, &mut out),
                    Field::TimestampSeconds => {
                        let seconds = format!("{:011.6}", name.timestamp_seconds());
                        spec.text(&seconds, &mut out);
                    }
                    Field::Ext => spec.text(name.ext, &mut out),
                    Field::SampleRate => spec.number(name.sample_rate as u64, &mut out),
                },
            }
        }
        out
    }
}

impl Default for FilenameTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
            segments: vec![
                Segment::Field(Field::Basename, FieldSpec::default()),
                Segment::Literal("_".into()),
                Segment::Field(
                    Field::Slice,
                    FieldSpec {
                        zero_pad: true,
                        width: 2,
                    },
                ),
                Segment::Literal(".".into()),
                Segment::Field(Field::Ext, FieldSpec::default()),
            ],
        }
    }
}

impl FromStr for FilenameTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(slice: usize, start_frame: u64) -> SliceName<'static> {
        SliceName {
            basename: "loop",
            slice,
            start_frame,
            sample_rate: 44100,
            ext: "wav",
        }
    }

    #[test]
    fn test_default_template() {
        let template = FilenameTemplate::default();
        assert_eq!(template.render(&name(1, 0)), "loop_01.wav");
        assert_eq!(template.render(&name(12, 0)), "loop_12.wav");
        assert_eq!(template.render(&name(123, 0)), "loop_123.wav");
        assert_eq!(template, FilenameTemplate::parse(DEFAULT_TEMPLATE).unwrap());
    }

    #[test]
    fn test_timestamp_fields() {
        let template =
            FilenameTemplate::parse("{basename}-{timestamp}-{timestamp_seconds}.{ext}").unwrap();
        assert_eq!(
            template.render(&name(1, 66150)),
            "loop-66150-0001.500000.wav"
        );
    }

    #[test]
    fn test_samplerate_and_padding() {
        let template = FilenameTemplate::parse("{slice:4}_{samplerate}_{timestamp:08}").unwrap();
        assert_eq!(template.render(&name(7, 42)), "   7_44100_00000042");
    }

    #[test]
    fn test_text_width_left_aligns() {
        let template = FilenameTemplate::parse("[{basename:6}]").unwrap();
        assert_eq!(template.render(&name(1, 0)), "[loop  ]");
    }

    #[test]
    fn test_escaped_braces() {
        let template = FilenameTemplate::parse("{{{slice}}}").unwrap();
        assert_eq!(template.render(&name(3, 0)), "{3}");
    }

    #[test]
    fn test_rejects_unknown_field() {
        assert!(matches!(
            FilenameTemplate::parse("{name}.wav"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_bad_braces_and_specs() {
        assert!(FilenameTemplate::parse("{slice").is_err());
        assert!(FilenameTemplate::parse("slice}").is_err());
        assert!(FilenameTemplate::parse("{slice:x2}").is_err());
        assert!(FilenameTemplate::parse("{slice:02d}").is_err());
    }
}
