// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host time and durations.
//!
//! [`HostTime`] is a point on the host's monotonic clock and [`Duration`] a
//! span on the same clock. Both count whole milliseconds, which is the
//! resolution of `setTimeout` and of CSS `transition-duration` values once
//! they are normalized.
//!
//! [`Duration`] also understands CSS time syntax (`"250ms"`, `"0.5s"`, and
//! bare numbers, which are seconds) and renders back to it with
//! [`as_css`](Duration::as_css).

use alloc::format;
use alloc::string::{String, ToString};
use core::fmt;
use core::ops::{Add, Sub};
use core::str::FromStr;

use crate::error::ParseError;

/// A point in time on the host's monotonic clock, in milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Returns the duration between `self` and an earlier time, or zero if
    /// `earlier` is after `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Checked addition of a duration.
    #[inline]
    #[must_use]
    pub const fn checked_add(self, duration: Duration) -> Option<Self> {
        match self.0.checked_add(duration.0) {
            Some(t) => Some(Self(t)),
            None => None,
        }
    }
}

impl Add<Duration> for HostTime {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for HostTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Self) -> Duration {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({}ms)", self.0)
    }
}

/// A span of time in milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Creates a duration from whole milliseconds.
    #[inline]
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Creates a duration from fractional seconds, rounded to the nearest
    /// millisecond.
    ///
    /// Returns `None` for negative, NaN, or infinite input.
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        millis_from_f64(secs * 1000.0).map(Self)
    }

    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Saturating addition.
    #[inline]
    #[must_use]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    /// Saturating subtraction.
    #[inline]
    #[must_use]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Parses a CSS time value.
    ///
    /// - `"250ms"` is 250 milliseconds.
    /// - `"0.5s"` is 500 milliseconds.
    /// - `"2"` has no unit and is read as seconds.
    pub fn from_css(value: &str) -> Result<Self, ParseError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(ParseError::Empty);
        }
        let (number, scale) = if let Some(ms) = value.strip_suffix("ms") {
            (ms, 1.0)
        } else if let Some(s) = value.strip_suffix('s') {
            (s, 1000.0)
        } else {
            (value, 1000.0)
        };
        let parsed: f64 = number
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidNumber(value.to_string()))?;
        if parsed < 0.0 {
            return Err(ParseError::Negative(value.to_string()));
        }
        millis_from_f64(parsed * scale)
            .map(Self)
            .ok_or_else(|| ParseError::InvalidNumber(value.to_string()))
    }

    /// Renders this duration as a CSS time value, e.g. `"500ms"`.
    #[must_use]
    pub fn as_css(self) -> String {
        format!("{}ms", self.0)
    }
}

impl FromStr for Duration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_css(s)
    }
}

impl Add for Duration {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Duration {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({}ms)", self.0)
    }
}

// Rounds to the nearest millisecond without `f64::round`, which is not
// available in `core`.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "input is checked to be finite and non-negative; saturating cast is fine"
)]
fn millis_from_f64(ms: f64) -> Option<u64> {
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    Some((ms + 0.5) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_time_units() {
        assert_eq!(Duration::from_css("250ms"), Ok(Duration(250)));
        assert_eq!(Duration::from_css("0.5s"), Ok(Duration(500)));
        assert_eq!(Duration::from_css(" 1.25s "), Ok(Duration(1250)));
        // A bare number is seconds.
        assert_eq!(Duration::from_css("2"), Ok(Duration(2000)));
        assert_eq!(Duration::from_css("0"), Ok(Duration::ZERO));
    }

    #[test]
    fn css_time_rejects_garbage() {
        assert_eq!(Duration::from_css(""), Err(ParseError::Empty));
        assert!(matches!(
            Duration::from_css("fast"),
            Err(ParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            Duration::from_css("-1s"),
            Err(ParseError::Negative(_))
        ));
    }

    #[test]
    fn from_secs_rounds_to_nearest_ms() {
        assert_eq!(Duration::from_secs_f64(0.0004), Some(Duration(0)));
        assert_eq!(Duration::from_secs_f64(0.0006), Some(Duration(1)));
        assert_eq!(Duration::from_secs_f64(-1.0), None);
        assert_eq!(Duration::from_secs_f64(f64::NAN), None);
    }

    #[test]
    fn css_rendering_uses_milliseconds() {
        assert_eq!(Duration(500).as_css(), "500ms");
        assert_eq!("1s".parse::<Duration>().map(Duration::as_css), Ok("1000ms".into()));
    }

    #[test]
    fn host_time_duration_ops() {
        let t = HostTime(1000);
        let d = Duration(200);
        assert_eq!((t + d).millis(), 1200);
        assert_eq!(HostTime(1200) - t, d);
        assert_eq!(t.saturating_duration_since(HostTime(1500)), Duration::ZERO);
        assert_eq!(t.checked_add(Duration(u64::MAX)), None);
    }

    #[test]
    fn operators_saturate_at_the_ends_of_the_clock() {
        let huge = Duration::from_css("1e300s").unwrap();
        assert_eq!(huge, Duration(u64::MAX));
        assert_eq!(HostTime(1) + huge, HostTime(u64::MAX));
        assert_eq!(huge + Duration(1), Duration(u64::MAX));
        assert_eq!(HostTime(1) - HostTime(5), Duration::ZERO);
        assert_eq!(Duration(1) - Duration(5), Duration::ZERO);
    }
}
