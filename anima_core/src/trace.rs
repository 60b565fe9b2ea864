// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for animation lifecycles.
//!
//! This module provides a [`TraceSink`] trait with one method per lifecycle
//! event. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] is a cheap, cloneable handle to an optional shared sink; every
//! [`Animation`](crate::animation::Animation), [`Frame`](crate::frame::Frame)
//! and [`Runner`](crate::runner::Runner) of a context reports through the
//! same one. When the `trace` feature is **off**, every `Tracer` method
//! compiles to nothing. When **on**, each method performs a single `Option`
//! branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies.

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::id::{AnimationId, FrameId, RunnerId};
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// What brought an animation to completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompletionCause {
    /// The host's transition-end notification fired first.
    TransitionEnd,
    /// The fallback timer fired before any notification.
    Fallback,
    /// [`finish`](crate::animation::Animation::finish) was called.
    Finished,
    /// The host has no transition support; styles were applied at once.
    Immediate,
}

/// How a runner left the active state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunnerOutcome {
    /// Every step completed.
    Drained,
    /// [`abort`](crate::runner::Runner::abort) was called.
    Aborted,
    /// [`finish`](crate::runner::Runner::finish) was called.
    Finished,
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an animation starts running.
#[derive(Clone, Copy, Debug)]
pub struct AnimationStartEvent {
    /// Which animation.
    pub animation: AnimationId,
    /// Host time of the `run` call.
    pub at: HostTime,
    /// Number of concrete CSS keys the transition covers.
    pub keys: u32,
    /// Transition duration.
    pub duration: Duration,
    /// Transition delay.
    pub delay: Duration,
    /// `false` when the host has no transition support.
    pub transition: bool,
}

/// Emitted when an animation writes its target values.
#[derive(Clone, Copy, Debug)]
pub struct AnimationApplyEvent {
    /// Which animation.
    pub animation: AnimationId,
    /// Host time of the write.
    pub at: HostTime,
}

/// Emitted exactly once per completed animation.
#[derive(Clone, Copy, Debug)]
pub struct AnimationCompleteEvent {
    /// Which animation.
    pub animation: AnimationId,
    /// Host time of completion.
    pub at: HostTime,
    /// Which path completed it.
    pub cause: CompletionCause,
}

/// Emitted when a running animation is aborted.
#[derive(Clone, Copy, Debug)]
pub struct AnimationAbortEvent {
    /// Which animation.
    pub animation: AnimationId,
    /// Host time of the abort.
    pub at: HostTime,
}

/// Emitted when a frame starts its members.
#[derive(Clone, Copy, Debug)]
pub struct FrameStartEvent {
    /// Which frame.
    pub frame: FrameId,
    /// Host time of the `run` call.
    pub at: HostTime,
    /// Number of member animations.
    pub members: u32,
}

/// Emitted once when a frame's last member completes or the frame is
/// finished.
#[derive(Clone, Copy, Debug)]
pub struct FrameCompleteEvent {
    /// Which frame.
    pub frame: FrameId,
    /// Host time of completion.
    pub at: HostTime,
    /// `true` if completion was forced by `finish`.
    pub forced: bool,
}

/// Emitted when a runner starts.
#[derive(Clone, Copy, Debug)]
pub struct RunnerStartEvent {
    /// Which runner.
    pub runner: RunnerId,
    /// Host time of the `run` call.
    pub at: HostTime,
    /// Number of queued steps.
    pub steps: u32,
}

/// Emitted each time a runner moves on to its next step.
#[derive(Clone, Copy, Debug)]
pub struct RunnerAdvanceEvent {
    /// Which runner.
    pub runner: RunnerId,
    /// Host time of the advance.
    pub at: HostTime,
    /// Steps still queued behind the one being started.
    pub remaining: u32,
}

/// Emitted once when a runner leaves the active state.
#[derive(Clone, Copy, Debug)]
pub struct RunnerEndEvent {
    /// Which runner.
    pub runner: RunnerId,
    /// Host time of the transition.
    pub at: HostTime,
    /// How it ended.
    pub outcome: RunnerOutcome,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives lifecycle events.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about. Sinks must not call back into the
/// scheduler.
pub trait TraceSink {
    /// Called when an animation starts.
    fn on_animation_start(&mut self, e: &AnimationStartEvent) {
        _ = e;
    }

    /// Called when an animation writes its target values.
    fn on_animation_apply(&mut self, e: &AnimationApplyEvent) {
        _ = e;
    }

    /// Called when an animation completes.
    fn on_animation_complete(&mut self, e: &AnimationCompleteEvent) {
        _ = e;
    }

    /// Called when an animation is aborted.
    fn on_animation_abort(&mut self, e: &AnimationAbortEvent) {
        _ = e;
    }

    /// Called when a frame starts.
    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        _ = e;
    }

    /// Called when a frame completes.
    fn on_frame_complete(&mut self, e: &FrameCompleteEvent) {
        _ = e;
    }

    /// Called when a runner starts.
    fn on_runner_start(&mut self, e: &RunnerStartEvent) {
        _ = e;
    }

    /// Called when a runner starts its next step.
    fn on_runner_advance(&mut self, e: &RunnerAdvanceEvent) {
        _ = e;
    }

    /// Called when a runner ends.
    fn on_runner_end(&mut self, e: &RunnerEndEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer handle
// ---------------------------------------------------------------------------

/// Shared handle to an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing.
/// A sink that is already borrowed (because it is dispatching) drops the
/// nested event rather than panicking.
#[derive(Clone, Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Rc<RefCell<dyn TraceSink>>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident, $event:ident) => {{
        #[cfg(feature = "trace")]
        if let Some(sink) = &$self.sink
            && let Ok(mut sink) = sink.try_borrow_mut()
        {
            sink.$method($event);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = $event;
        }
    }};
}

impl Tracer {
    /// Creates a tracer that dispatches to the given shared sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Rc<RefCell<dyn TraceSink>>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Emits an [`AnimationStartEvent`].
    #[inline]
    pub fn animation_start(&self, e: &AnimationStartEvent) {
        dispatch!(self, on_animation_start, e);
    }

    /// Emits an [`AnimationApplyEvent`].
    #[inline]
    pub fn animation_apply(&self, e: &AnimationApplyEvent) {
        dispatch!(self, on_animation_apply, e);
    }

    /// Emits an [`AnimationCompleteEvent`].
    #[inline]
    pub fn animation_complete(&self, e: &AnimationCompleteEvent) {
        dispatch!(self, on_animation_complete, e);
    }

    /// Emits an [`AnimationAbortEvent`].
    #[inline]
    pub fn animation_abort(&self, e: &AnimationAbortEvent) {
        dispatch!(self, on_animation_abort, e);
    }

    /// Emits a [`FrameStartEvent`].
    #[inline]
    pub fn frame_start(&self, e: &FrameStartEvent) {
        dispatch!(self, on_frame_start, e);
    }

    /// Emits a [`FrameCompleteEvent`].
    #[inline]
    pub fn frame_complete(&self, e: &FrameCompleteEvent) {
        dispatch!(self, on_frame_complete, e);
    }

    /// Emits a [`RunnerStartEvent`].
    #[inline]
    pub fn runner_start(&self, e: &RunnerStartEvent) {
        dispatch!(self, on_runner_start, e);
    }

    /// Emits a [`RunnerAdvanceEvent`].
    #[inline]
    pub fn runner_advance(&self, e: &RunnerAdvanceEvent) {
        dispatch!(self, on_runner_advance, e);
    }

    /// Emits a [`RunnerEndEvent`].
    #[inline]
    pub fn runner_end(&self, e: &RunnerEndEvent) {
        dispatch!(self, on_runner_end, e);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_complete() -> AnimationCompleteEvent {
        AnimationCompleteEvent {
            animation: AnimationId(3),
            at: HostTime(600),
            cause: CompletionCause::TransitionEnd,
        }
    }

    #[test]
    fn noop_sink_compiles() {
        let mut sink = NoopSink;
        sink.on_animation_complete(&sample_complete());
        sink.on_runner_end(&RunnerEndEvent {
            runner: RunnerId(0),
            at: HostTime(0),
            outcome: RunnerOutcome::Drained,
        });
    }

    #[test]
    fn tracer_none_does_nothing() {
        let tracer = Tracer::none();
        tracer.animation_complete(&sample_complete());
        tracer.frame_start(&FrameStartEvent {
            frame: FrameId(1),
            at: HostTime(0),
            members: 2,
        });
    }

    #[cfg(feature = "trace")]
    #[test]
    fn tracer_dispatches_to_shared_sink() {
        use alloc::vec::Vec;

        #[derive(Default)]
        struct RecordingSink {
            completed: Vec<(AnimationId, CompletionCause)>,
        }
        impl TraceSink for RecordingSink {
            fn on_animation_complete(&mut self, e: &AnimationCompleteEvent) {
                self.completed.push((e.animation, e.cause));
            }
        }

        let sink = Rc::new(RefCell::new(RecordingSink::default()));
        let tracer = Tracer::new(sink.clone());
        let clone = tracer.clone();
        tracer.animation_complete(&sample_complete());
        clone.animation_complete(&AnimationCompleteEvent {
            cause: CompletionCause::Fallback,
            ..sample_complete()
        });
        assert_eq!(
            sink.borrow().completed,
            [
                (AnimationId(3), CompletionCause::TransitionEnd),
                (AnimationId(3), CompletionCause::Fallback),
            ]
        );
    }
}
