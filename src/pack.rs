use crate::error::{check_factor, SubsError};
use crate::subtitle::{Pos, Subtitle};

use chrono::Duration;
use tracing::debug;

/// The subtitles of a movie.
///
/// Operations that combine packs (`concatenate`, `merge`) take the other
/// pack by value and move its subtitles over, so no subtitle content is
/// ever copied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubsPack {
    pub subs: Vec<Subtitle>,
}

impl From<Vec<Subtitle>> for SubsPack {
    fn from(subs: Vec<Subtitle>) -> Self {
        Self { subs }
    }
}

impl SubsPack {
    pub fn new(subs: Vec<Subtitle>) -> Self {
        Self { subs }
    }

    pub fn subs(&self) -> &[Subtitle] {
        &self.subs
    }

    pub fn into_subs(self) -> Vec<Subtitle> {
        self.subs
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Sorts the subtitles by appearance time. The sort is stable.
    pub fn sort(&mut self) {
        debug!("Sorting {} subtitles", self.subs.len());
        self.subs.sort_by_key(|s| s.time_in);
    }

    /// Shifts all subtitles by `delta`. If any timestamp would overflow,
    /// nothing is shifted.
    pub fn shift(&mut self, delta: Duration) -> Result<(), SubsError> {
        check_shift(&self.subs, delta)?;
        debug!("Shifting {} subtitles by {}ms", self.subs.len(), delta.num_milliseconds());
        for s in self.subs.iter_mut() {
            s.shift(delta)?;
        }
        Ok(())
    }

    /// Scales all timestamps by `factor`. Display durations scale with them.
    pub fn scale(&mut self, factor: f64) -> Result<(), SubsError> {
        check_factor("scale", factor)?;
        if factor == 1.0 {
            return Ok(());
        }
        debug!("Scaling {} subtitles by {}", self.subs.len(), factor);
        for s in self.subs.iter_mut() {
            s.scale(factor)?;
        }
        Ok(())
    }

    /// Multiplies the display duration of every subtitle by `factor`.
    pub fn lengthen(&mut self, factor: f64) -> Result<(), SubsError> {
        check_factor("lengthen", factor)?;
        if factor == 1.0 {
            return Ok(());
        }
        debug!("Lengthening {} subtitles by {}", self.subs.len(), factor);
        for s in self.subs.iter_mut() {
            s.lengthen(factor)?;
        }
        Ok(())
    }

    pub fn set_pos(&mut self, pos: Pos) {
        debug!("Setting position of {} subtitles to {:?}", self.subs.len(), pos);
        for s in self.subs.iter_mut() {
            s.pos = pos;
        }
    }

    pub fn set_color(&mut self, color: &str) {
        debug!("Setting color of {} subtitles to '{}'", self.subs.len(), color);
        for s in self.subs.iter_mut() {
            s.color = color.to_string();
        }
    }

    pub fn remove_html(&mut self) {
        let mut changed = 0;
        for s in self.subs.iter_mut() {
            if s.remove_html() {
                changed += 1;
            }
        }
        debug!("Removed HTML formatting from {} subtitles", changed);
    }

    pub fn remove_control(&mut self) {
        let mut changed = 0;
        for s in self.subs.iter_mut() {
            if s.remove_control() {
                changed += 1;
            }
        }
        debug!("Removed controls from {} subtitles", changed);
    }

    /// Removes hearing impaired lines. Subtitles that end up without any
    /// lines are removed from the pack altogether.
    pub fn remove_hi(&mut self) {
        let before = self.subs.len();
        self.subs.retain_mut(|s| {
            s.remove_hi();
            !s.lines.is_empty()
        });
        debug!("Removed {} hearing impaired subtitles", before - self.subs.len());
    }

    /// Appends the subtitles of the second part of a movie.
    ///
    /// `sec_part_start` is where the second part starts in the joined movie,
    /// usually the length of the first part. The parts may overlap, so the
    /// result is sorted again. Fails, leaving this pack untouched, if
    /// shifting the second part overflows.
    pub fn concatenate(
        &mut self,
        mut other: SubsPack,
        sec_part_start: Duration,
    ) -> Result<(), SubsError> {
        debug!(
            "Concatenating {} subtitles at {}ms",
            other.subs.len(),
            sec_part_start.num_milliseconds()
        );
        other.shift(sec_part_start)?;
        self.subs.append(&mut other.subs);
        self.sort();
        Ok(())
    }

    /// Merges another pack into this one to create a "dual subtitle".
    ///
    /// Both packs are sorted, then interleaved by appearance time. On equal
    /// timestamps our subtitles come before the other pack's.
    pub fn merge(&mut self, mut other: SubsPack) {
        self.sort();
        other.sort();

        let mut merged = Vec::with_capacity(self.subs.len() + other.subs.len());
        let mut left = std::mem::take(&mut self.subs).into_iter().peekable();
        let mut right = other.subs.into_iter().peekable();

        loop {
            let take_left = match (left.peek(), right.peek()) {
                (Some(l), Some(r)) => l.time_in <= r.time_in,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            let next = if take_left { left.next() } else { right.next() };
            merged.extend(next);
        }

        debug!("Merged into {} subtitles", merged.len());
        self.subs = merged;
    }

    /// Splits the pack in two at `at`.
    ///
    /// Subtitles appearing before `at` stay here, the rest are moved to the
    /// returned pack, shifted so that it starts at zero. Fails, keeping all
    /// subtitles here, if that shift overflows.
    pub fn split(&mut self, at: Duration) -> Result<SubsPack, SubsError> {
        self.sort();
        let idx = self.subs.partition_point(|s| s.time_in < at);
        check_shift(&self.subs[idx..], -at)?;
        let mut second = SubsPack::new(self.subs.split_off(idx));
        second.shift(-at)?;
        debug!(
            "Split at {}ms: {} + {} subtitles",
            at.num_milliseconds(),
            self.subs.len(),
            second.subs.len()
        );
        Ok(second)
    }
}

fn check_shift(subs: &[Subtitle], delta: Duration) -> Result<(), SubsError> {
    for s in subs {
        s.shifted(delta)?;
    }
    Ok(())
}
