// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Animations, frames and runners each get their own track (`tid` 1, 2 and
//! 3). Starts and completions become async begin/end pairs keyed by id, so
//! overlapping animations show up as separate bars.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use anima_core::time::HostTime;

use crate::recorder::{RecordedEvent, decode};

const TID_ANIMATION: u32 = 1;
const TID_FRAME: u32 = 2;
const TID_RUNNER: u32 = 3;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Host milliseconds are converted to microseconds.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        let ts = ms_to_us(recorded.at());
        match recorded {
            RecordedEvent::AnimationStart(e) => {
                events.push(json!({
                    "ph": "b",
                    "name": "Animation",
                    "cat": "Animation",
                    "id": e.animation.0,
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_ANIMATION,
                    "args": {
                        "keys": e.keys,
                        "duration_ms": e.duration.0,
                        "delay_ms": e.delay.0,
                        "transition": e.transition,
                    }
                }));
            }
            RecordedEvent::AnimationApply(e) => {
                events.push(json!({
                    "ph": "n",
                    "name": "Apply",
                    "cat": "Animation",
                    "id": e.animation.0,
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_ANIMATION,
                }));
            }
            RecordedEvent::AnimationComplete(e) => {
                events.push(json!({
                    "ph": "e",
                    "name": "Animation",
                    "cat": "Animation",
                    "id": e.animation.0,
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_ANIMATION,
                    "args": {
                        "cause": format!("{:?}", e.cause),
                    }
                }));
            }
            RecordedEvent::AnimationAbort(e) => {
                events.push(json!({
                    "ph": "e",
                    "name": "Animation",
                    "cat": "Animation",
                    "id": e.animation.0,
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_ANIMATION,
                    "args": {
                        "cause": "Aborted",
                    }
                }));
            }
            RecordedEvent::FrameStart(e) => {
                events.push(json!({
                    "ph": "b",
                    "name": "Frame",
                    "cat": "Frame",
                    "id": e.frame.0,
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_FRAME,
                    "args": {
                        "members": e.members,
                    }
                }));
            }
            RecordedEvent::FrameComplete(e) => {
                events.push(json!({
                    "ph": "e",
                    "name": "Frame",
                    "cat": "Frame",
                    "id": e.frame.0,
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_FRAME,
                    "args": {
                        "forced": e.forced,
                    }
                }));
            }
            RecordedEvent::RunnerStart(e) => {
                events.push(json!({
                    "ph": "b",
                    "name": "Runner",
                    "cat": "Runner",
                    "id": e.runner.0,
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_RUNNER,
                    "args": {
                        "steps": e.steps,
                    }
                }));
            }
            RecordedEvent::RunnerAdvance(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Advance",
                    "cat": "Runner",
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_RUNNER,
                    "s": "t",
                    "args": {
                        "runner": e.runner.0,
                        "remaining": e.remaining,
                    }
                }));
            }
            RecordedEvent::RunnerEnd(e) => {
                events.push(json!({
                    "ph": "e",
                    "name": "Runner",
                    "cat": "Runner",
                    "id": e.runner.0,
                    "ts": ts,
                    "pid": 0,
                    "tid": TID_RUNNER,
                    "args": {
                        "outcome": format!("{:?}", e.outcome),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn ms_to_us(t: HostTime) -> u64 {
    t.0.saturating_mul(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use anima_core::id::{AnimationId, RunnerId};
    use anima_core::time::Duration;
    use anima_core::trace::{
        AnimationCompleteEvent, AnimationStartEvent, CompletionCause, RunnerAdvanceEvent,
        TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut rec = RecorderSink::new();
        rec.on_animation_start(&AnimationStartEvent {
            animation: AnimationId(0),
            at: HostTime(2),
            keys: 1,
            duration: Duration(500),
            delay: Duration(0),
            transition: true,
        });
        rec.on_runner_advance(&RunnerAdvanceEvent {
            runner: RunnerId(0),
            at: HostTime(2),
            remaining: 0,
        });
        rec.on_animation_complete(&AnimationCompleteEvent {
            animation: AnimationId(0),
            at: HostTime(502),
            cause: CompletionCause::TransitionEnd,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 3);

        assert_eq!(parsed[0]["ph"], "b");
        assert_eq!(parsed[0]["name"], "Animation");
        assert_eq!(parsed[0]["ts"], 2000);

        assert_eq!(parsed[1]["ph"], "i");
        assert_eq!(parsed[1]["name"], "Advance");

        assert_eq!(parsed[2]["ph"], "e");
        assert_eq!(parsed[2]["id"], 0);
        assert_eq!(parsed[2]["ts"], 502_000);
        assert_eq!(parsed[2]["args"]["cause"], "TransitionEnd");
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
