// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The unit a [`Runner`](crate::runner::Runner) sequences.

use core::fmt;

use crate::animation::Animation;
use crate::frame::Frame;
use crate::host::Host;
use crate::request::Callback;

/// Something that can be run, aborted and finished: a lone animation or a
/// frame of concurrent ones.
pub enum Step<H: Host> {
    /// A single animation.
    Animation(Animation<H>),
    /// A group of animations started together.
    Frame(Frame<H>),
}

impl<H: Host> Step<H> {
    /// Starts the step. `continuation` runs on a later turn after it
    /// completes.
    pub fn run(&self, continuation: Option<Callback>) {
        match self {
            Self::Animation(animation) => animation.run(continuation),
            Self::Frame(frame) => frame.run(continuation),
        }
    }

    /// Cancels the step without running any callback.
    pub fn abort(&self) {
        match self {
            Self::Animation(animation) => animation.abort(),
            Self::Frame(frame) => frame.abort(),
        }
    }

    /// Jumps the step to its end state.
    pub fn finish(&self, perform: bool) {
        match self {
            Self::Animation(animation) => animation.finish(perform),
            Self::Frame(frame) => frame.finish(perform),
        }
    }
}

impl<H: Host> Clone for Step<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Animation(animation) => Self::Animation(animation.clone()),
            Self::Frame(frame) => Self::Frame(frame.clone()),
        }
    }
}

impl<H: Host> fmt::Debug for Step<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Animation(animation) => f.debug_tuple("Animation").field(animation).finish(),
            Self::Frame(frame) => f.debug_tuple("Frame").field(frame).finish(),
        }
    }
}

impl<H: Host> From<Animation<H>> for Step<H> {
    fn from(animation: Animation<H>) -> Self {
        Self::Animation(animation)
    }
}

impl<H: Host> From<Frame<H>> for Step<H> {
    fn from(frame: Frame<H>) -> Self {
        Self::Frame(frame)
    }
}
