// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Times are
//! host milliseconds.

use std::io::Write;

use anima_core::trace::{
    AnimationAbortEvent, AnimationApplyEvent, AnimationCompleteEvent, AnimationStartEvent,
    FrameCompleteEvent, FrameStartEvent, RunnerAdvanceEvent, RunnerEndEvent, RunnerStartEvent,
    TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink").finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self {
            writer: Box::new(std::io::stderr()),
        }
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self { writer }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_animation_start(&mut self, e: &AnimationStartEvent) {
        let _ = writeln!(
            self.writer,
            "[anim:start] id={} at={}ms keys={} duration={}ms delay={}ms transition={}",
            e.animation.0, e.at.0, e.keys, e.duration.0, e.delay.0, e.transition,
        );
    }

    fn on_animation_apply(&mut self, e: &AnimationApplyEvent) {
        let _ = writeln!(
            self.writer,
            "[anim:apply] id={} at={}ms",
            e.animation.0, e.at.0,
        );
    }

    fn on_animation_complete(&mut self, e: &AnimationCompleteEvent) {
        let _ = writeln!(
            self.writer,
            "[anim:done]  id={} at={}ms cause={:?}",
            e.animation.0, e.at.0, e.cause,
        );
    }

    fn on_animation_abort(&mut self, e: &AnimationAbortEvent) {
        let _ = writeln!(
            self.writer,
            "[anim:abort] id={} at={}ms",
            e.animation.0, e.at.0,
        );
    }

    fn on_frame_start(&mut self, e: &FrameStartEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:start] id={} at={}ms members={}",
            e.frame.0, e.at.0, e.members,
        );
    }

    fn on_frame_complete(&mut self, e: &FrameCompleteEvent) {
        let _ = writeln!(
            self.writer,
            "[frame:done]  id={} at={}ms{}",
            e.frame.0,
            e.at.0,
            if e.forced { " FORCED" } else { "" },
        );
    }

    fn on_runner_start(&mut self, e: &RunnerStartEvent) {
        let _ = writeln!(
            self.writer,
            "[runner:start] id={} at={}ms steps={}",
            e.runner.0, e.at.0, e.steps,
        );
    }

    fn on_runner_advance(&mut self, e: &RunnerAdvanceEvent) {
        let _ = writeln!(
            self.writer,
            "[runner:next]  id={} at={}ms remaining={}",
            e.runner.0, e.at.0, e.remaining,
        );
    }

    fn on_runner_end(&mut self, e: &RunnerEndEvent) {
        let _ = writeln!(
            self.writer,
            "[runner:end]   id={} at={}ms outcome={:?}",
            e.runner.0, e.at.0, e.outcome,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anima_core::id::{AnimationId, FrameId, RunnerId};
    use anima_core::time::{Duration, HostTime};
    use anima_core::trace::{CompletionCause, RunnerOutcome};

    fn output_of(f: impl FnOnce(&mut PrettyPrintSink<Vec<u8>>)) -> String {
        let mut sink = PrettyPrintSink::with_writer(Vec::new());
        f(&mut sink);
        String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn animation_lines() {
        let output = output_of(|sink| {
            sink.on_animation_start(&AnimationStartEvent {
                animation: AnimationId(4),
                at: HostTime(100),
                keys: 2,
                duration: Duration(300),
                delay: Duration(0),
                transition: true,
            });
            sink.on_animation_complete(&AnimationCompleteEvent {
                animation: AnimationId(4),
                at: HostTime(400),
                cause: CompletionCause::Fallback,
            });
        });

        assert!(output.contains("[anim:start]"), "got: {output}");
        assert!(output.contains("id=4"), "got: {output}");
        assert!(output.contains("duration=300ms"), "got: {output}");
        assert!(output.contains("cause=Fallback"), "got: {output}");
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn forced_frame_is_marked() {
        let output = output_of(|sink| {
            sink.on_frame_start(&FrameStartEvent {
                frame: FrameId(1),
                at: HostTime(0),
                members: 3,
            });
            sink.on_frame_complete(&FrameCompleteEvent {
                frame: FrameId(1),
                at: HostTime(50),
                forced: true,
            });
        });

        assert!(output.contains("members=3"), "got: {output}");
        assert!(output.contains("FORCED"), "got: {output}");
    }

    #[test]
    fn runner_lines() {
        let output = output_of(|sink| {
            sink.on_runner_start(&RunnerStartEvent {
                runner: RunnerId(0),
                at: HostTime(0),
                steps: 2,
            });
            sink.on_runner_advance(&RunnerAdvanceEvent {
                runner: RunnerId(0),
                at: HostTime(1),
                remaining: 1,
            });
            sink.on_runner_end(&RunnerEndEvent {
                runner: RunnerId(0),
                at: HostTime(900),
                outcome: RunnerOutcome::Aborted,
            });
        });

        assert!(output.contains("steps=2"), "got: {output}");
        assert!(output.contains("remaining=1"), "got: {output}");
        assert!(output.contains("outcome=Aborted"), "got: {output}");
    }
}
