// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parse errors for typed CSS values.
//!
//! The animation paths themselves never fail: unsupported property names are
//! skipped and missing targets simply produce no animation. [`ParseError`] is
//! only returned when a caller explicitly asks for a typed value, e.g.
//! `"250ms".parse::<Duration>()`.

use alloc::string::String;
use core::fmt;

/// Failure to turn a CSS string into a typed value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// The input was empty or only whitespace.
    Empty,
    /// The numeric part could not be parsed.
    InvalidNumber(String),
    /// The value is negative where only non-negative values are accepted.
    Negative(String),
    /// The property name is not one the resolver knows how to animate.
    UnsupportedProperty(String),
    /// The easing keyword or function is not recognized.
    UnknownEasing(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty value"),
            Self::InvalidNumber(s) => write!(f, "invalid number `{s}`"),
            Self::Negative(s) => write!(f, "negative value `{s}`"),
            Self::UnsupportedProperty(s) => write!(f, "unsupported property `{s}`"),
            Self::UnknownEasing(s) => write!(f, "unknown easing `{s}`"),
        }
    }
}

impl core::error::Error for ParseError {}
