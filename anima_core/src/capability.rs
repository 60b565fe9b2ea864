// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host capability descriptor.
//!
//! Browsers shipped CSS transitions behind vendor prefixes for years, and some
//! environments have no transition support at all. Instead of probing ambient
//! globals at load time, a backend probes once (see
//! `anima_backend_web::probe`) and hands the resulting [`Capabilities`] to
//! the scheduler. Every vendor-specific name the core writes comes from here.

use alloc::format;
use alloc::string::String;

/// The vendor prefix under which the host exposes CSS transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum VendorPrefix {
    /// Unprefixed, standard property names.
    #[default]
    Standard,
    /// `-webkit-`
    Webkit,
    /// `-moz-`
    Moz,
    /// `-o-`
    O,
    /// `-ms-`
    Ms,
}

impl VendorPrefix {
    /// All prefixes, in the order a probe should try them.
    pub const ALL: [Self; 5] = [Self::Standard, Self::Webkit, Self::Moz, Self::O, Self::Ms];

    /// Returns the CSS property prefix, e.g. `"-webkit-"`, or `""`.
    #[must_use]
    pub const fn css_prefix(self) -> &'static str {
        match self {
            Self::Standard => "",
            Self::Webkit => "-webkit-",
            Self::Moz => "-moz-",
            Self::O => "-o-",
            Self::Ms => "-ms-",
        }
    }

    /// Returns the name of the transition-end DOM event under this prefix.
    #[must_use]
    pub const fn transition_end_event(self) -> &'static str {
        match self {
            // Gecko never shipped a prefixed event name.
            Self::Standard | Self::Moz => "transitionend",
            Self::Webkit => "webkitTransitionEnd",
            Self::O => "oTransitionEnd",
            Self::Ms => "MSTransitionEnd",
        }
    }

    fn prefixed(self, name: &str) -> String {
        format!("{}{name}", self.css_prefix())
    }
}

/// What the host can do, and under which names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Whether the host runs CSS transitions at all. When `false`, every
    /// animation applies its styles immediately.
    pub transitions: bool,
    /// Prefix for transition and transform property names.
    pub prefix: VendorPrefix,
}

impl Capabilities {
    /// Standard, unprefixed CSS transitions.
    pub const STANDARD: Self = Self {
        transitions: true,
        prefix: VendorPrefix::Standard,
    };

    /// No transition support; styles are applied without animating.
    pub const NONE: Self = Self {
        transitions: false,
        prefix: VendorPrefix::Standard,
    };

    /// Transitions available under the given prefix.
    #[must_use]
    pub const fn prefixed(prefix: VendorPrefix) -> Self {
        Self {
            transitions: true,
            prefix,
        }
    }

    /// `transition-property` under the host's prefix.
    #[must_use]
    pub fn transition_property(&self) -> String {
        self.prefix.prefixed("transition-property")
    }

    /// `transition-duration` under the host's prefix.
    #[must_use]
    pub fn transition_duration(&self) -> String {
        self.prefix.prefixed("transition-duration")
    }

    /// `transition-delay` under the host's prefix.
    #[must_use]
    pub fn transition_delay(&self) -> String {
        self.prefix.prefixed("transition-delay")
    }

    /// `transition-timing-function` under the host's prefix.
    #[must_use]
    pub fn transition_timing_function(&self) -> String {
        self.prefix.prefixed("transition-timing-function")
    }

    /// `transform` under the host's prefix.
    #[must_use]
    pub fn transform(&self) -> String {
        self.prefix.prefixed("transform")
    }

    /// Name of the transition-end event.
    #[must_use]
    pub const fn transition_end_event(&self) -> &'static str {
        self.prefix.transition_end_event()
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::STANDARD
    }
}
