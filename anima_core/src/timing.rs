// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition timing: duration, delay, and easing.

use alloc::format;
use alloc::string::{String, ToString};
use core::str::FromStr;

use crate::error::ParseError;
use crate::time::Duration;

/// Extra time the fallback timer waits past `duration + delay`.
///
/// Transition-end notifications can land slightly after the nominal end (or
/// never, in some engines); the fallback timer covers both.
pub const FALLBACK_MARGIN: Duration = Duration(100);

/// A CSS easing curve.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Easing {
    /// `ease`
    #[default]
    Ease,
    /// `linear`
    Linear,
    /// `ease-in`
    EaseIn,
    /// `ease-out`
    EaseOut,
    /// `ease-in-out`
    EaseInOut,
    /// `step-start`
    StepStart,
    /// `step-end`
    StepEnd,
    /// `cubic-bezier(x1, y1, x2, y2)`
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Renders the easing as a `transition-timing-function` value.
    #[must_use]
    pub fn as_css(&self) -> String {
        match *self {
            Self::Ease => "ease".to_string(),
            Self::Linear => "linear".to_string(),
            Self::EaseIn => "ease-in".to_string(),
            Self::EaseOut => "ease-out".to_string(),
            Self::EaseInOut => "ease-in-out".to_string(),
            Self::StepStart => "step-start".to_string(),
            Self::StepEnd => "step-end".to_string(),
            Self::CubicBezier(x1, y1, x2, y2) => format!("cubic-bezier({x1}, {y1}, {x2}, {y2})"),
        }
    }

    /// Parses a keyword or a `cubic-bezier(...)` function.
    pub fn from_css(value: &str) -> Result<Self, ParseError> {
        let value = value.trim();
        match value {
            "" => Err(ParseError::Empty),
            "ease" => Ok(Self::Ease),
            "linear" => Ok(Self::Linear),
            "ease-in" => Ok(Self::EaseIn),
            "ease-out" => Ok(Self::EaseOut),
            "ease-in-out" => Ok(Self::EaseInOut),
            "step-start" => Ok(Self::StepStart),
            "step-end" => Ok(Self::StepEnd),
            _ => parse_cubic_bezier(value),
        }
    }
}

impl FromStr for Easing {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_css(s)
    }
}

fn parse_cubic_bezier(value: &str) -> Result<Easing, ParseError> {
    let unknown = || ParseError::UnknownEasing(value.to_string());
    let args = value
        .strip_prefix("cubic-bezier(")
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(unknown)?;
    let mut points = [0.0_f32; 4];
    let mut parts = args.split(',');
    for slot in &mut points {
        let part = parts.next().ok_or_else(unknown)?.trim();
        *slot = part
            .parse()
            .map_err(|_| ParseError::InvalidNumber(part.to_string()))?;
    }
    if parts.next().is_some() {
        return Err(unknown());
    }
    let [x1, y1, x2, y2] = points;
    Ok(Easing::CubicBezier(x1, y1, x2, y2))
}

/// Duration, delay, and easing for one transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timing {
    /// How long the transition runs.
    pub duration: Duration,
    /// How long the host waits before starting the transition.
    pub delay: Duration,
    /// The easing curve.
    pub easing: Easing,
}

impl Timing {
    /// Half a second, no delay, `ease`.
    pub const DEFAULT: Self = Self {
        duration: Duration(500),
        delay: Duration::ZERO,
        easing: Easing::Ease,
    };

    /// Creates a timing with the given duration and default delay and easing.
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            ..Self::DEFAULT
        }
    }

    /// Sets the delay.
    #[must_use]
    pub const fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the easing.
    #[must_use]
    pub const fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// How long to wait before giving up on the transition-end notification.
    #[must_use]
    pub const fn fallback_after(&self) -> Duration {
        self.duration
            .saturating_add(self.delay)
            .saturating_add(FALLBACK_MARGIN)
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_keywords_round_trip_through_css() {
        for easing in [
            Easing::Ease,
            Easing::Linear,
            Easing::EaseIn,
            Easing::EaseOut,
            Easing::EaseInOut,
            Easing::StepStart,
            Easing::StepEnd,
        ] {
            assert_eq!(Easing::from_css(&easing.as_css()), Ok(easing));
        }
    }

    #[test]
    fn cubic_bezier_parses_four_numbers() {
        assert_eq!(
            "cubic-bezier(0.1, 0.7, 1.0, 0.1)".parse::<Easing>(),
            Ok(Easing::CubicBezier(0.1, 0.7, 1.0, 0.1))
        );
        assert!(matches!(
            Easing::from_css("cubic-bezier(0.1, 0.7, 1.0)"),
            Err(ParseError::UnknownEasing(_))
        ));
        assert!(matches!(
            Easing::from_css("cubic-bezier(a, 0.7, 1.0, 0.1)"),
            Err(ParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            Easing::from_css("bouncy"),
            Err(ParseError::UnknownEasing(_))
        ));
    }

    #[test]
    fn fallback_covers_duration_delay_and_margin() {
        let timing = Timing::new(Duration(300)).delay(Duration(50));
        assert_eq!(timing.fallback_after(), Duration(450));
        assert_eq!(Timing::DEFAULT.fallback_after(), Duration(600));
    }
}
