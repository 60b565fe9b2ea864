// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary recording of lifecycle events.
//!
//! [`RecorderSink`] appends each event to an in-memory buffer as a one-byte
//! tag followed by little-endian fields. [`decode`] turns the buffer back
//! into [`RecordedEvent`]s, stopping at the first unknown tag or truncated
//! record.

use anima_core::id::{AnimationId, FrameId, RunnerId};
use anima_core::time::{Duration, HostTime};
use anima_core::trace::{
    AnimationAbortEvent, AnimationApplyEvent, AnimationCompleteEvent, AnimationStartEvent,
    CompletionCause, FrameCompleteEvent, FrameStartEvent, RunnerAdvanceEvent, RunnerEndEvent,
    RunnerOutcome, RunnerStartEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

const TAG_ANIMATION_START: u8 = 1;
const TAG_ANIMATION_APPLY: u8 = 2;
const TAG_ANIMATION_COMPLETE: u8 = 3;
const TAG_ANIMATION_ABORT: u8 = 4;
const TAG_FRAME_START: u8 = 5;
const TAG_FRAME_COMPLETE: u8 = 6;
const TAG_RUNNER_START: u8 = 7;
const TAG_RUNNER_ADVANCE: u8 = 8;
const TAG_RUNNER_END: u8 = 9;

fn cause_to_u8(cause: CompletionCause) -> u8 {
    match cause {
        CompletionCause::TransitionEnd => 0,
        CompletionCause::Fallback => 1,
        CompletionCause::Finished => 2,
        CompletionCause::Immediate => 3,
    }
}

fn outcome_to_u8(outcome: RunnerOutcome) -> u8 {
    match outcome {
        RunnerOutcome::Drained => 0,
        RunnerOutcome::Aborted => 1,
        RunnerOutcome::Finished => 2,
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that records events into a binary buffer.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded bytes so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns its bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }
}

impl TraceSink for RecorderSink {
    fn on_animation_start(&mut self, e: &AnimationStartEvent) {
        self.write_u8(TAG_ANIMATION_START);
        self.write_u32(e.animation.0);
        self.write_u64(e.at.0);
        self.write_u32(e.keys);
        self.write_u64(e.duration.0);
        self.write_u64(e.delay.0);
        self.write_u8(u8::from(e.transition));
    }

    fn on_animation_apply(&mut self, e: &AnimationApplyEvent) {
        self.write_u8(TAG_ANIMATION_APPLY);
        self.write_u32(e.animation.0);
        self.write_u64(e.at.0);
    }

    fn on_animation_complete(&mut self, e: &AnimationCompleteEvent) {
        self.write_u8(TAG_ANIMATION_COMPLETE);
        self.write_u32(e.animation.0);
        self.write_u64(e.at.0);
        self.write_u8(cause_to_u8(e.cause));
    }

    fn on_animation_abort(&mut self, e: &AnimationAbortEvent) {
        self.write_u8(TAG_ANIMATION_ABORT);
        self.write_u32(e.animation.0);
        self.write_u64(e.at.0);
    }

    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        self.write_u8(TAG_FRAME_START);
        self.write_u32(e.frame.0);
        self.write_u64(e.at.0);
        self.write_u32(e.members);
    }

    fn on_frame_complete(&mut self, e: &FrameCompleteEvent) {
        self.write_u8(TAG_FRAME_COMPLETE);
        self.write_u32(e.frame.0);
        self.write_u64(e.at.0);
        self.write_u8(u8::from(e.forced));
    }

    fn on_runner_start(&mut self, e: &RunnerStartEvent) {
        self.write_u8(TAG_RUNNER_START);
        self.write_u32(e.runner.0);
        self.write_u64(e.at.0);
        self.write_u32(e.steps);
    }

    fn on_runner_advance(&mut self, e: &RunnerAdvanceEvent) {
        self.write_u8(TAG_RUNNER_ADVANCE);
        self.write_u32(e.runner.0);
        self.write_u64(e.at.0);
        self.write_u32(e.remaining);
    }

    fn on_runner_end(&mut self, e: &RunnerEndEvent) {
        self.write_u8(TAG_RUNNER_END);
        self.write_u32(e.runner.0);
        self.write_u64(e.at.0);
        self.write_u8(outcome_to_u8(e.outcome));
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug)]
pub enum RecordedEvent {
    /// An [`AnimationStartEvent`].
    AnimationStart(AnimationStartEvent),
    /// An [`AnimationApplyEvent`].
    AnimationApply(AnimationApplyEvent),
    /// An [`AnimationCompleteEvent`].
    AnimationComplete(AnimationCompleteEvent),
    /// An [`AnimationAbortEvent`].
    AnimationAbort(AnimationAbortEvent),
    /// A [`FrameStartEvent`].
    FrameStart(FrameStartEvent),
    /// A [`FrameCompleteEvent`].
    FrameComplete(FrameCompleteEvent),
    /// A [`RunnerStartEvent`].
    RunnerStart(RunnerStartEvent),
    /// A [`RunnerAdvanceEvent`].
    RunnerAdvance(RunnerAdvanceEvent),
    /// A [`RunnerEndEvent`].
    RunnerEnd(RunnerEndEvent),
}

impl RecordedEvent {
    /// Host time the event was emitted at.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::AnimationStart(e) => e.at,
            Self::AnimationApply(e) => e.at,
            Self::AnimationComplete(e) => e.at,
            Self::AnimationAbort(e) => e.at,
            Self::FrameStart(e) => e.at,
            Self::FrameComplete(e) => e.at,
            Self::RunnerStart(e) => e.at,
            Self::RunnerAdvance(e) => e.at,
            Self::RunnerEnd(e) => e.at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?;
        self.pos += N;
        bytes.try_into().ok()
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.read_u8().map(|v| v != 0)
    }

    fn read_cause(&mut self) -> Option<CompletionCause> {
        Some(match self.read_u8()? {
            0 => CompletionCause::TransitionEnd,
            1 => CompletionCause::Fallback,
            2 => CompletionCause::Finished,
            _ => CompletionCause::Immediate,
        })
    }

    fn read_outcome(&mut self) -> Option<RunnerOutcome> {
        Some(match self.read_u8()? {
            0 => RunnerOutcome::Drained,
            1 => RunnerOutcome::Aborted,
            _ => RunnerOutcome::Finished,
        })
    }

    fn decode_animation_start(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationStart(AnimationStartEvent {
            animation: AnimationId(self.read_u32()?),
            at: self.read_time()?,
            keys: self.read_u32()?,
            duration: Duration(self.read_u64()?),
            delay: Duration(self.read_u64()?),
            transition: self.read_bool()?,
        }))
    }

    fn decode_animation_apply(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationApply(AnimationApplyEvent {
            animation: AnimationId(self.read_u32()?),
            at: self.read_time()?,
        }))
    }

    fn decode_animation_complete(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationComplete(AnimationCompleteEvent {
            animation: AnimationId(self.read_u32()?),
            at: self.read_time()?,
            cause: self.read_cause()?,
        }))
    }

    fn decode_animation_abort(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationAbort(AnimationAbortEvent {
            animation: AnimationId(self.read_u32()?),
            at: self.read_time()?,
        }))
    }

    fn decode_frame_start(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameStart(FrameStartEvent {
            frame: FrameId(self.read_u32()?),
            at: self.read_time()?,
            members: self.read_u32()?,
        }))
    }

    fn decode_frame_complete(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FrameComplete(FrameCompleteEvent {
            frame: FrameId(self.read_u32()?),
            at: self.read_time()?,
            forced: self.read_bool()?,
        }))
    }

    fn decode_runner_start(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RunnerStart(RunnerStartEvent {
            runner: RunnerId(self.read_u32()?),
            at: self.read_time()?,
            steps: self.read_u32()?,
        }))
    }

    fn decode_runner_advance(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RunnerAdvance(RunnerAdvanceEvent {
            runner: RunnerId(self.read_u32()?),
            at: self.read_time()?,
            remaining: self.read_u32()?,
        }))
    }

    fn decode_runner_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RunnerEnd(RunnerEndEvent {
            runner: RunnerId(self.read_u32()?),
            at: self.read_time()?,
            outcome: self.read_outcome()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_ANIMATION_START => self.decode_animation_start(),
            TAG_ANIMATION_APPLY => self.decode_animation_apply(),
            TAG_ANIMATION_COMPLETE => self.decode_animation_complete(),
            TAG_ANIMATION_ABORT => self.decode_animation_abort(),
            TAG_FRAME_START => self.decode_frame_start(),
            TAG_FRAME_COMPLETE => self.decode_frame_complete(),
            TAG_RUNNER_START => self.decode_runner_start(),
            TAG_RUNNER_ADVANCE => self.decode_runner_advance(),
            TAG_RUNNER_END => self.decode_runner_end(),
            _ => None, // unknown tag: stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
