//! Statistics gathered from a subtitle pack.
//!
//! Gathering statistics strips HTML, control tags and hearing impaired
//! content from the subtitles while counting, so a pack should not be
//! saved after [`SubsPack::stats`] has been called on it.

use crate::pack::SubsPack;

use std::fmt;

use chrono::Duration;
use tracing::debug;

/// Averages whose denominator is zero are reported as `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubsStats {
    /// Total number of subtitles.
    pub subs: usize,
    pub lines: usize,
    pub avg_lines_per_sub: f64,
    /// Characters including spaces, counted after HTML and controls were stripped.
    pub chars: usize,
    pub chars_no_space: usize,
    /// Average non-space characters per line.
    pub avg_chars_per_line: f64,
    pub words: usize,
    pub avg_words_per_line: f64,
    pub avg_chars_per_word: f64,
    pub total_disp_dur: Duration,
    /// Total display duration compared to the end of the last subtitle.
    pub sub_visib_ratio: f64,
    pub avg_disp_dur_per_non_space_char: Duration,
    /// Number of subtitles having HTML formatting.
    pub htmls: usize,
    /// Number of subtitles having control tags.
    pub controls: usize,
    /// Number of subtitles having hearing impaired content.
    pub his: usize,
}

impl Default for SubsStats {
    fn default() -> Self {
        Self {
            subs: 0,
            lines: 0,
            avg_lines_per_sub: 0.0,
            chars: 0,
            chars_no_space: 0,
            avg_chars_per_line: 0.0,
            words: 0,
            avg_words_per_line: 0.0,
            avg_chars_per_word: 0.0,
            total_disp_dur: Duration::zero(),
            sub_visib_ratio: 0.0,
            avg_disp_dur_per_non_space_char: Duration::zero(),
            htmls: 0,
            controls: 0,
            his: 0,
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl SubsPack {
    /// Analyzes the pack and returns various statistics.
    ///
    /// The subtitles are modified in the process: controls, HTML and
    /// hearing impaired lines are removed from every subtitle. Subtitles
    /// are never removed from the pack itself, even if they end up empty.
    /// Call [`SubsPack::sort`] first, `sub_visib_ratio` relies on the last
    /// subtitle being the last one shown.
    pub fn stats(&mut self) -> SubsStats {
        let mut ss = SubsStats {
            subs: self.subs.len(),
            ..SubsStats::default()
        };

        for s in self.subs.iter_mut() {
            ss.total_disp_dur = ss.total_disp_dur + s.display_duration();
            ss.lines += s.lines.len();

            if s.remove_control() {
                ss.controls += 1;
            }
            if s.remove_html() {
                ss.htmls += 1;
            }

            for line in &s.lines {
                ss.chars += line.chars().count();
                for word in line.split_whitespace() {
                    ss.words += 1;
                    ss.chars_no_space += word.chars().count();
                }
            }

            if s.remove_hi() {
                ss.his += 1;
            }
        }

        if let Some(last) = self.subs.last() {
            let last_ms = last.time_out.num_milliseconds();
            if last_ms != 0 {
                ss.sub_visib_ratio = ss.total_disp_dur.num_milliseconds() as f64 / last_ms as f64;
            }
        }

        ss.avg_lines_per_sub = ratio(ss.lines, ss.subs);
        ss.avg_chars_per_line = ratio(ss.chars_no_space, ss.lines);
        ss.avg_words_per_line = ratio(ss.words, ss.lines);
        ss.avg_chars_per_word = ratio(ss.chars_no_space, ss.words);
        if ss.chars_no_space > 0 {
            ss.avg_disp_dur_per_non_space_char =
                ss.total_disp_dur / i32::try_from(ss.chars_no_space).unwrap_or(i32::MAX);
        }

        debug!("Gathered stats over {} subtitles", ss.subs);
        ss
    }
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.num_milliseconds();
    let sign = if ms < 0 { "-" } else { "" };
    let ms = ms.unsigned_abs();
    format!(
        "{}{}:{:02}:{:02}.{:03}",
        sign,
        ms / 3_600_000,
        (ms % 3_600_000) / 60_000,
        (ms % 60_000) / 1000,
        ms % 1000
    )
}

impl fmt::Display for SubsStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitles:                      {:>12}", self.subs)?;
        writeln!(f, "Lines:                          {:>12}", self.lines)?;
        writeln!(f, "Avg lines per sub:              {:>12.2}", self.avg_lines_per_sub)?;
        writeln!(f, "Chars:                          {:>12}", self.chars)?;
        writeln!(f, "Chars without spaces:           {:>12}", self.chars_no_space)?;
        writeln!(f, "Avg chars per line:             {:>12.2}", self.avg_chars_per_line)?;
        writeln!(f, "Words:                          {:>12}", self.words)?;
        writeln!(f, "Avg words per line:             {:>12.2}", self.avg_words_per_line)?;
        writeln!(f, "Avg chars per word:             {:>12.2}", self.avg_chars_per_word)?;
        writeln!(f, "Total display duration:         {:>12}", fmt_dur(self.total_disp_dur))?;
        writeln!(f, "Subtitle visible ratio:         {:>11.2}%", self.sub_visib_ratio * 100.0)?;
        writeln!(
            f,
            "Avg disp dur per non-space char:{:>12}",
            fmt_dur(self.avg_disp_dur_per_non_space_char)
        )?;
        writeln!(f, "Subs with HTML formatting:      {:>12}", self.htmls)?;
        writeln!(f, "Subs with controls:             {:>12}", self.controls)?;
        write!(f, "Subs with hearing impaired:     {:>12}", self.his)
    }
}
