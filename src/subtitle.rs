use crate::error::{check_factor, SubsError};

use chrono::Duration;
use once_cell::sync::Lazy;
use regex::Regex;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());

// {\an8}, {\a6}, {\pos(10,20)}, {\i1}...
static CONTROL_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\\[^}]*\}").unwrap());

static HI_ANNOTATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]|\([^)]*\)").unwrap());

// Speaker labels such as `JOE:` or `- MR. SMITH:` at the start of a line.
// At most three words and no digits, so `MEET ME AT 10:30.` is left alone.
static SPEAKER_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\s*-\s*)?[A-Z][A-Z'.]*( [A-Z][A-Z'.]*){0,2}:\s+").unwrap()
});

/// Screen position of a subtitle, laid out like a numeric keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pos {
    #[default]
    NotSpecified,
    BottomLeft,
    Bottom,
    BottomRight,
    Left,
    Center,
    Right,
    TopLeft,
    Top,
    TopRight,
}

impl Pos {
    /// The SSA `{\anN}` alignment code, if a position is set.
    pub fn an_code(self) -> Option<u8> {
        match self {
            Pos::NotSpecified => None,
            Pos::BottomLeft => Some(1),
            Pos::Bottom => Some(2),
            Pos::BottomRight => Some(3),
            Pos::Left => Some(4),
            Pos::Center => Some(5),
            Pos::Right => Some(6),
            Pos::TopLeft => Some(7),
            Pos::Top => Some(8),
            Pos::TopRight => Some(9),
        }
    }
}

impl std::str::FromStr for Pos {
    type Err = SubsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pos = match s.to_ascii_lowercase().as_str() {
            "bottomleft" | "bl" | "1" => Pos::BottomLeft,
            "bottom" | "b" | "2" => Pos::Bottom,
            "bottomright" | "br" | "3" => Pos::BottomRight,
            "left" | "l" | "4" => Pos::Left,
            "center" | "c" | "5" => Pos::Center,
            "right" | "r" | "6" => Pos::Right,
            "topleft" | "tl" | "7" => Pos::TopLeft,
            "top" | "t" | "8" => Pos::Top,
            "topright" | "tr" | "9" => Pos::TopRight,
            _ => {
                return Err(SubsError::InvalidArgument(format!(
                    "unknown position: '{}'",
                    s
                )))
            }
        };
        Ok(pos)
    }
}

/// A single timed subtitle entry.
///
/// Timestamps are signed offsets from the start of the movie, so an entry
/// may temporarily sit before zero after a negative shift.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtitle {
    pub time_in: Duration,
    pub time_out: Duration,
    pub lines: Vec<String>,
    pub pos: Pos,
    pub color: String,
}

impl Subtitle {
    pub fn new(time_in: Duration, time_out: Duration, lines: Vec<String>) -> Self {
        Self {
            time_in,
            time_out,
            lines,
            pos: Pos::NotSpecified,
            color: String::new(),
        }
    }

    pub fn display_duration(&self) -> Duration {
        self.time_out - self.time_in
    }

    /// Moves both timestamps by `delta`. Fails without touching the
    /// subtitle if either timestamp would overflow.
    pub fn shift(&mut self, delta: Duration) -> Result<(), SubsError> {
        let (time_in, time_out) = self.shifted(delta)?;
        self.time_in = time_in;
        self.time_out = time_out;
        Ok(())
    }

    pub(crate) fn shifted(&self, delta: Duration) -> Result<(Duration, Duration), SubsError> {
        match (
            self.time_in.checked_add(&delta),
            self.time_out.checked_add(&delta),
        ) {
            (Some(time_in), Some(time_out)) => Ok((time_in, time_out)),
            _ => Err(SubsError::InvalidArgument(format!(
                "shifting by {}ms overflows the timeline",
                delta.num_milliseconds()
            ))),
        }
    }

    /// Multiplies both timestamps by `factor`, so the display duration is
    /// scaled as well. Used to correct frame rate mismatches.
    pub fn scale(&mut self, factor: f64) -> Result<(), SubsError> {
        check_factor("scale", factor)?;
        self.time_in = scale_duration(self.time_in, factor);
        self.time_out = scale_duration(self.time_out, factor);
        Ok(())
    }

    /// Multiplies the display duration by `factor`, keeping `time_in` fixed.
    pub fn lengthen(&mut self, factor: f64) -> Result<(), SubsError> {
        check_factor("lengthen", factor)?;
        self.time_out = self.time_in + scale_duration(self.display_duration(), factor);
        Ok(())
    }

    /// Removes HTML formatting such as `<i>` or `<font color="red">`.
    pub fn remove_html(&mut self) -> bool {
        replace_in_lines(&mut self.lines, &HTML_TAG)
    }

    /// Removes inline controls such as `{\an8}` or `{\pos(10,20)}`.
    pub fn remove_control(&mut self) -> bool {
        replace_in_lines(&mut self.lines, &CONTROL_TAG)
    }

    /// Removes hearing impaired content: `[PHONE RINGING]`, `(sighs)` and
    /// speaker labels. Lines left without any speech are dropped, which may
    /// leave the subtitle with no lines at all.
    ///
    /// Returns whether anything was removed.
    pub fn remove_hi(&mut self) -> bool {
        let mut changed = false;
        let mut kept = Vec::with_capacity(self.lines.len());
        for line in self.lines.drain(..) {
            let stripped = {
                let no_notes = HI_ANNOTATION.replace_all(&line, "");
                SPEAKER_LABEL.replace(&no_notes, "$1").into_owned()
            };
            if stripped == line {
                kept.push(line);
                continue;
            }
            changed = true;
            if !is_blank_speech(&stripped) {
                kept.push(stripped.trim().to_string());
            }
        }
        self.lines = kept;
        changed
    }
}

fn scale_duration(d: Duration, factor: f64) -> Duration {
    Duration::milliseconds((d.num_milliseconds() as f64 * factor).round() as i64)
}

fn replace_in_lines(lines: &mut [String], pattern: &Regex) -> bool {
    let mut changed = false;
    for line in lines.iter_mut() {
        if pattern.is_match(line) {
            *line = pattern.replace_all(line, "").into_owned();
            changed = true;
        }
    }
    changed
}

// What is left of a line like `- [LAUGHS]` or `♪ (humming) ♪`.
fn is_blank_speech(line: &str) -> bool {
    line.chars()
        .all(|c| c.is_whitespace() || matches!(c, '-' | '♪' | '♫' | '#'))
}
