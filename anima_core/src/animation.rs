// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single style transition on one target.
//!
//! An [`Animation`] moves through [`Phase::Idle`] → [`Phase::Running`] →
//! [`Phase::Completed`], or ends early in [`Phase::Aborted`].
//!
//! # Completion protocol
//!
//! When the host supports transitions, [`run`](Animation::run) writes the
//! transition timing styles, defers the target values by one turn (so the
//! host sees the starting values first), and arms two signals:
//!
//! 1. a one-shot transition-end listener on the target, and
//! 2. a fallback timer of `duration + delay + FALLBACK_MARGIN`.
//!
//! Whichever signal arrives first completes the animation; the phase check
//! makes the second a no-op. Completion cancels the other signal, clears the
//! timing styles, runs the completion callback, and schedules the
//! continuation handed to `run` on a later turn.
//!
//! Without transition support the target values are written synchronously
//! and the animation completes on the spot. The continuation is still
//! deferred by one turn, so a runner never recurses through its queue.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::context::Context;
use crate::host::Host;
use crate::id::{AnimationId, ListenerId, TimerId};
use crate::request::{AnimationSpec, Callback, TargetCallback, chain};
use crate::style::{self, Properties, ResolvedStyle};
use crate::timing::Timing;
use crate::trace::{
    AnimationAbortEvent, AnimationApplyEvent, AnimationCompleteEvent, AnimationStartEvent,
    CompletionCause,
};

/// Lifecycle state of an [`Animation`] or [`Frame`](crate::frame::Frame).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Built but not started.
    Idle,
    /// Started and waiting for a completion signal.
    Running,
    /// Completed, either naturally or through `finish`.
    Completed,
    /// Cancelled by `abort`. Terminal.
    Aborted,
}

impl Phase {
    /// Returns `true` for [`Completed`](Self::Completed) and
    /// [`Aborted`](Self::Aborted).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// One target transitioning to new style values.
///
/// `Animation` is a shared handle: clones refer to the same animation.
pub struct Animation<H: Host> {
    inner: Rc<Inner<H>>,
}

struct Inner<H: Host> {
    id: AnimationId,
    cx: Context<H>,
    target: H::Target,
    properties: Properties,
    timing: Timing,
    keys: Vec<String>,
    state: RefCell<State<H::Target>>,
}

struct State<T> {
    phase: Phase,
    /// Values last written, kept so `finish` can reapply them.
    resolved: Option<ResolvedStyle>,
    /// Timing style keys written by `run`, cleared on completion.
    timing_keys: Vec<String>,
    listener: Option<ListenerId>,
    fallback: Option<TimerId>,
    /// The deferred write of the target values.
    apply: Option<TimerId>,
    on_complete: Option<TargetCallback<T>>,
    continuation: Option<Callback>,
}

/// Everything `run` armed, taken out of the state in one borrow.
struct Armed {
    listener: Option<ListenerId>,
    fallback: Option<TimerId>,
    apply: Option<TimerId>,
    timing_keys: Vec<String>,
}

impl<T> State<T> {
    fn disarm(&mut self) -> Armed {
        Armed {
            listener: self.listener.take(),
            fallback: self.fallback.take(),
            apply: self.apply.take(),
            timing_keys: core::mem::take(&mut self.timing_keys),
        }
    }
}

impl<H: Host> Animation<H> {
    /// Builds an animation from `spec`.
    ///
    /// Every concrete CSS key the properties touch gets an explicit inline
    /// starting value: if the target has no inline value for a key, its
    /// computed value is copied inline. Nothing else is written until
    /// [`run`](Self::run).
    #[must_use]
    pub fn new(cx: &Context<H>, spec: AnimationSpec<H::Target>) -> Self {
        let AnimationSpec {
            target,
            properties,
            timing,
            on_complete,
        } = spec;
        let keys = style::keys(&properties, cx.capabilities());
        let host = cx.host();
        for key in &keys {
            if host.inline_style(&target, key).is_none()
                && let Some(computed) = host.computed_style(&target, key)
            {
                host.set_style(&target, key, &computed);
            }
        }
        Self {
            inner: Rc::new(Inner {
                id: AnimationId(cx.next_id()),
                cx: cx.clone(),
                target,
                properties,
                timing,
                keys,
                state: RefCell::new(State {
                    phase: Phase::Idle,
                    resolved: None,
                    timing_keys: Vec::new(),
                    listener: None,
                    fallback: None,
                    apply: None,
                    on_complete,
                    continuation: None,
                }),
            }),
        }
    }

    /// This animation's id.
    #[must_use]
    pub fn id(&self) -> AnimationId {
        self.inner.id
    }

    /// The animated target.
    #[must_use]
    pub fn target(&self) -> &H::Target {
        &self.inner.target
    }

    /// The requested properties.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.inner.properties
    }

    /// Duration, delay and easing.
    #[must_use]
    pub fn timing(&self) -> Timing {
        self.inner.timing
    }

    /// The concrete CSS keys this animation transitions.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.inner.keys
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase
    }

    /// Returns `true` once the animation completed, naturally or through
    /// [`finish`](Self::finish).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase() == Phase::Completed
    }

    /// Starts the animation.
    ///
    /// `continuation` is scheduled on a later turn once the animation
    /// completes through a transition-end notification or the fallback timer.
    /// It is dropped without running if the animation is aborted or
    /// finished.
    ///
    /// An animation runs at most once. Running it again while it is
    /// [`Running`](Phase::Running) only adds `continuation` behind the one
    /// already waiting; once it is completed or aborted, `continuation` is
    /// scheduled on the next turn and nothing is written.
    pub fn run(&self, continuation: Option<Callback>) {
        let settled = {
            let mut state = self.inner.state.borrow_mut();
            match state.phase {
                Phase::Idle => {
                    state.phase = Phase::Running;
                    state.continuation = continuation;
                    None
                }
                Phase::Running => {
                    if let Some(next) = continuation {
                        let first = state.continuation.take();
                        state.continuation = Some(chain(first, next));
                    }
                    return;
                }
                Phase::Completed | Phase::Aborted => Some(continuation),
            }
        };
        if let Some(continuation) = settled {
            if let Some(continuation) = continuation {
                self.inner.cx.defer(continuation);
            }
            return;
        }

        let cx = &self.inner.cx;
        let caps = cx.capabilities();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "an animation touches a handful of properties"
        )]
        let keys = self.inner.keys.len() as u32;
        cx.tracer().animation_start(&AnimationStartEvent {
            animation: self.inner.id,
            at: cx.now(),
            keys,
            duration: self.inner.timing.duration,
            delay: self.inner.timing.delay,
            transition: caps.transitions,
        });

        if !caps.transitions {
            self.apply_values();
            self.complete(CompletionCause::Immediate);
            return;
        }

        let host = cx.host();
        let target = &self.inner.target;
        let timing = &self.inner.timing;
        let timing_styles = [
            (caps.transition_property(), self.inner.keys.join(", ")),
            (caps.transition_duration(), timing.duration.as_css()),
            (caps.transition_delay(), timing.delay.as_css()),
            (caps.transition_timing_function(), timing.easing.as_css()),
        ];
        for (key, value) in &timing_styles {
            host.set_style(target, key, value);
        }

        let this = self.clone();
        let listener = host.listen_transition_end(
            target,
            caps.transition_end_event(),
            Box::new(move || this.complete(CompletionCause::TransitionEnd)),
        );
        let this = self.clone();
        let fallback = host.set_timeout(
            timing.fallback_after(),
            Box::new(move || this.complete(CompletionCause::Fallback)),
        );
        let this = self.clone();
        let apply = cx.defer(move || this.apply_deferred());

        let mut state = self.inner.state.borrow_mut();
        state.timing_keys = timing_styles.into_iter().map(|(key, _)| key).collect();
        state.listener = Some(listener);
        state.fallback = Some(fallback);
        state.apply = Some(apply);
    }

    /// Cancels the animation.
    ///
    /// Timers and the listener are removed, the continuation is dropped, and
    /// no callback runs. Style values already written stay where they are.
    /// Aborting a completed or aborted animation does nothing.
    pub fn abort(&self) {
        let (armed, was_running) = {
            let mut state = self.inner.state.borrow_mut();
            if state.phase.is_terminal() {
                return;
            }
            let was_running = state.phase == Phase::Running;
            state.phase = Phase::Aborted;
            state.continuation = None;
            (state.disarm(), was_running)
        };
        self.release(armed, false);
        if was_running {
            let cx = &self.inner.cx;
            cx.tracer().animation_abort(&AnimationAbortEvent {
                animation: self.inner.id,
                at: cx.now(),
            });
        }
    }

    /// Jumps to the end state.
    ///
    /// Signals are cancelled, the timing styles are cleared, and the target
    /// values are written immediately (reapplied if they were already
    /// written). With `perform`, the completion callback runs if it has not
    /// run yet. The continuation handed to [`run`](Self::run) never runs.
    pub fn finish(&self, perform: bool) {
        let (armed, on_complete, was) = {
            let mut state = self.inner.state.borrow_mut();
            let was = state.phase;
            state.phase = Phase::Completed;
            state.continuation = None;
            (state.disarm(), state.on_complete.take(), was)
        };
        self.release(armed, false);
        self.write_values();
        if was != Phase::Completed {
            let cx = &self.inner.cx;
            cx.tracer().animation_complete(&AnimationCompleteEvent {
                animation: self.inner.id,
                at: cx.now(),
                cause: CompletionCause::Finished,
            });
        }
        if perform && let Some(f) = on_complete {
            f(&self.inner.target);
        }
    }

    /// Completion entry point shared by both signals and the no-transition
    /// path. Only the first call while running has any effect.
    fn complete(&self, cause: CompletionCause) {
        let (armed, on_complete, continuation) = {
            let mut state = self.inner.state.borrow_mut();
            if state.phase != Phase::Running {
                return;
            }
            state.phase = Phase::Completed;
            (
                state.disarm(),
                state.on_complete.take(),
                state.continuation.take(),
            )
        };
        self.release(armed, true);

        let cx = &self.inner.cx;
        cx.tracer().animation_complete(&AnimationCompleteEvent {
            animation: self.inner.id,
            at: cx.now(),
            cause,
        });
        if let Some(f) = on_complete {
            f(&self.inner.target);
        }
        if let Some(continuation) = continuation {
            cx.defer(continuation);
        }
    }

    /// Removes whatever `run` armed and clears the timing styles. When
    /// `flush` is set and the target values were never written, they are
    /// written now.
    fn release(&self, armed: Armed, flush: bool) {
        let host = self.inner.cx.host();
        let target = &self.inner.target;
        if let Some(listener) = armed.listener {
            host.unlisten(target, listener);
        }
        if let Some(fallback) = armed.fallback {
            host.clear_timeout(fallback);
        }
        if let Some(apply) = armed.apply {
            host.clear_timeout(apply);
            if flush {
                self.apply_values();
            }
        }
        for key in &armed.timing_keys {
            host.set_style(target, key, "");
        }
    }

    fn apply_deferred(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.phase != Phase::Running {
                return;
            }
            state.apply = None;
        }
        self.apply_values();
    }

    /// Resolves the properties against the target's current styles and
    /// writes them.
    fn apply_values(&self) {
        let resolved = self.resolve();
        self.write(&resolved);
        self.inner.state.borrow_mut().resolved = Some(resolved);
        let cx = &self.inner.cx;
        cx.tracer().animation_apply(&AnimationApplyEvent {
            animation: self.inner.id,
            at: cx.now(),
        });
    }

    /// Writes the stored values, resolving them first if they were never
    /// written.
    fn write_values(&self) {
        let stored = self.inner.state.borrow().resolved.clone();
        match stored {
            Some(resolved) => self.write(&resolved),
            None => self.apply_values(),
        }
    }

    fn resolve(&self) -> ResolvedStyle {
        let host = self.inner.cx.host();
        let target = &self.inner.target;
        style::resolve(
            &self.inner.properties,
            self.inner.cx.capabilities(),
            |key| host.current_style(target, key),
        )
    }

    fn write(&self, resolved: &ResolvedStyle) {
        let host = self.inner.cx.host();
        for (key, value) in &resolved.values {
            host.set_style(&self.inner.target, key, value);
        }
    }
}

impl<H: Host> Clone for Animation<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host> PartialEq for Animation<H> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<H: Host> fmt::Debug for Animation<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("id", &self.inner.id)
            .field("target", &self.inner.target)
            .field("keys", &self.inner.keys)
            .field("timing", &self.inner.timing)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use core::cell::Cell;

    use super::*;
    use crate::capability::Capabilities;
    use crate::sim::{SimHost, SimTarget};
    use crate::time::Duration;

    const T: SimTarget = SimTarget(1);

    fn cx() -> Context<SimHost> {
        Context::new(SimHost::new(), Capabilities::STANDARD)
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce(&SimTarget) + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, move |_: &SimTarget| inner.set(inner.get() + 1))
    }

    fn continuation(count: &Rc<Cell<u32>>) -> Option<Callback> {
        let count = Rc::clone(count);
        Some(Box::new(move || count.set(count.get() + 1)))
    }

    fn fade(cx: &Context<SimHost>) -> (Animation<SimHost>, Rc<Cell<u32>>) {
        let (count, on_complete) = counter();
        let spec = AnimationSpec::new(T, Properties::new().opacity(0.0))
            .duration(Duration(300))
            .on_complete(on_complete);
        (Animation::new(cx, spec), count)
    }

    #[test]
    fn new_copies_computed_start_values_inline() {
        let cx = cx();
        cx.host().set_computed(T, "opacity", "1");
        cx.host().set_computed(T, "left", "5px");
        cx.host().set_style(&T, "left", "8px");
        let anim = Animation::new(
            &cx,
            AnimationSpec::new(T, Properties::new().opacity(0.5).left(20)),
        );
        assert_eq!(cx.host().style(T, "opacity").as_deref(), Some("1"));
        assert_eq!(cx.host().style(T, "left").as_deref(), Some("8px"));
        assert_eq!(anim.keys(), ["opacity", "left"]);
        assert_eq!(anim.phase(), Phase::Idle);
    }

    #[test]
    fn run_writes_timing_now_and_values_a_turn_later() {
        let cx = cx();
        let (anim, _) = fade(&cx);
        anim.run(None);
        let host = cx.host();
        assert_eq!(host.style(T, "transition-property").as_deref(), Some("opacity"));
        assert_eq!(host.style(T, "transition-duration").as_deref(), Some("300ms"));
        assert_eq!(host.style(T, "transition-delay").as_deref(), Some("0ms"));
        assert_eq!(
            host.style(T, "transition-timing-function").as_deref(),
            Some("ease")
        );
        assert_eq!(host.style(T, "opacity"), None);

        host.run_due();
        let writes = host.writes_of(T, "opacity");
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].value, "0");
        assert!(writes[0].turn > 0);
        assert_eq!(anim.phase(), Phase::Running);
    }

    #[test]
    fn transition_end_completes_exactly_once() {
        let cx = cx();
        let (anim, completed) = fade(&cx);
        let continued = Rc::new(Cell::new(0));
        anim.run(continuation(&continued));
        let host = cx.host();
        host.run_due();

        assert_eq!(host.fire_transition_end(T), 1);
        assert_eq!(anim.phase(), Phase::Completed);
        assert_eq!(completed.get(), 1);
        assert_eq!(continued.get(), 0);

        host.run_until_idle();
        assert_eq!(completed.get(), 1);
        assert_eq!(continued.get(), 1);
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.style(T, "transition-property"), None);
        assert_eq!(host.style(T, "opacity").as_deref(), Some("0"));
    }

    #[test]
    fn fallback_completes_when_no_notification_arrives() {
        let cx = cx();
        let (anim, completed) = fade(&cx);
        let continued = Rc::new(Cell::new(0));
        anim.run(continuation(&continued));
        let host = cx.host();

        host.advance(Duration(399));
        assert_eq!(completed.get(), 0);
        host.advance(Duration(1));
        assert_eq!(completed.get(), 1);
        assert_eq!(host.listener_count(T), 0);
        assert_eq!(host.fire_transition_end(T), 0);
        host.run_until_idle();
        assert_eq!(completed.get(), 1);
        assert_eq!(continued.get(), 1);
    }

    #[test]
    fn fallback_accounts_for_delay() {
        let cx = cx();
        let (count, on_complete) = counter();
        let anim = Animation::new(
            &cx,
            AnimationSpec::new(T, Properties::new().width(10))
                .duration(Duration(200))
                .delay(Duration(50))
                .on_complete(on_complete),
        );
        anim.run(None);
        cx.host().advance(Duration(349));
        assert_eq!(count.get(), 0);
        cx.host().advance(Duration(1));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn early_notification_still_applies_values() {
        let cx = cx();
        let (anim, completed) = fade(&cx);
        anim.run(None);
        cx.host().fire_transition_end(T);
        assert_eq!(completed.get(), 1);
        assert_eq!(cx.host().style(T, "opacity").as_deref(), Some("0"));
        assert_eq!(cx.host().pending_timers(), 0);
    }

    #[test]
    fn abort_cancels_everything_silently() {
        let cx = cx();
        let (anim, completed) = fade(&cx);
        let continued = Rc::new(Cell::new(0));
        anim.run(continuation(&continued));
        anim.abort();
        anim.abort();
        let host = cx.host();
        assert_eq!(anim.phase(), Phase::Aborted);
        assert_eq!(host.pending_timers(), 0);
        assert_eq!(host.listener_count(T), 0);
        host.fire_transition_end(T);
        host.run_until_idle();
        assert_eq!(completed.get(), 0);
        assert_eq!(continued.get(), 0);
    }

    #[test]
    fn running_a_settled_animation_only_passes_the_continuation_on() {
        let cx = cx();
        let (anim, completed) = fade(&cx);
        let continued = Rc::new(Cell::new(0));
        anim.run(None);
        anim.abort();
        cx.host().clear_writes();

        anim.run(continuation(&continued));
        assert_eq!(continued.get(), 0);
        cx.host().run_until_idle();
        assert_eq!(continued.get(), 1);
        assert_eq!(completed.get(), 0);
        assert_eq!(anim.phase(), Phase::Aborted);
        assert!(cx.host().writes().is_empty());

        let (done, done_count) = fade(&cx);
        done.finish(true);
        done.run(continuation(&continued));
        cx.host().run_until_idle();
        assert_eq!(continued.get(), 2);
        assert_eq!(done_count.get(), 1);
    }

    #[test]
    fn running_twice_waits_for_the_same_completion() {
        let cx = cx();
        let (anim, completed) = fade(&cx);
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        anim.run(continuation(&first));
        anim.run(continuation(&second));
        let host = cx.host();
        host.run_due();
        assert_eq!(host.writes_of(T, "transition-property").len(), 1);
        assert_eq!(second.get(), 0);

        host.fire_transition_end(T);
        host.run_until_idle();
        assert_eq!(completed.get(), 1);
        assert_eq!((first.get(), second.get()), (1, 1));
    }

    #[test]
    fn huge_durations_do_not_overflow_the_clock() {
        let cx = cx();
        cx.host().advance(Duration(1));
        let (count, on_complete) = counter();
        let anim = Animation::new(
            &cx,
            AnimationSpec::new(T, Properties::new().width(10))
                .duration(Duration::from_css("1e300s").unwrap())
                .on_complete(on_complete),
        );
        anim.run(None);
        cx.host().advance(Duration(1_000_000));
        assert_eq!(count.get(), 0);
        cx.host().fire_transition_end(T);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn finish_applies_values_and_optionally_calls_back() {
        let cx = cx();
        let (anim, completed) = fade(&cx);
        let continued = Rc::new(Cell::new(0));
        anim.run(continuation(&continued));
        anim.finish(true);
        let host = cx.host();
        assert_eq!(anim.phase(), Phase::Completed);
        assert_eq!(completed.get(), 1);
        assert_eq!(host.style(T, "opacity").as_deref(), Some("0"));
        assert_eq!(host.style(T, "transition-duration"), None);
        host.run_until_idle();
        assert_eq!(continued.get(), 0);

        anim.finish(true);
        assert_eq!(completed.get(), 1);

        let (quiet, quiet_count) = fade(&cx);
        quiet.finish(false);
        assert_eq!(quiet_count.get(), 0);
        assert_eq!(quiet.phase(), Phase::Completed);
        quiet.finish(true);
        assert_eq!(quiet_count.get(), 0);
    }

    #[test]
    fn without_transitions_completes_synchronously() {
        let cx = Context::new(SimHost::new(), Capabilities::NONE);
        let (anim, completed) = fade(&cx);
        let continued = Rc::new(Cell::new(0));
        anim.run(continuation(&continued));
        let host = cx.host();
        assert_eq!(completed.get(), 1);
        assert_eq!(anim.phase(), Phase::Completed);
        assert_eq!(host.style(T, "opacity").as_deref(), Some("0"));
        assert_eq!(host.style(T, "transition-property"), None);
        assert_eq!(host.listener_count(T), 0);
        assert_eq!(continued.get(), 0);
        host.run_due();
        assert_eq!(continued.get(), 1);
    }

    #[test]
    fn relative_values_resolve_when_applied() {
        let cx = cx();
        cx.host().set_computed(T, "left", "10px");
        let anim = Animation::new(&cx, AnimationSpec::new(T, Properties::new().left("+=15")));
        cx.host().set_style(&T, "left", "20px");
        anim.run(None);
        cx.host().run_due();
        assert_eq!(cx.host().style(T, "left").as_deref(), Some("35px"));
    }

    #[test]
    fn scale_uses_the_prefixed_transform_key() {
        let cx = Context::new(
            SimHost::new(),
            Capabilities::prefixed(crate::capability::VendorPrefix::Webkit),
        );
        let anim = Animation::new(&cx, AnimationSpec::new(T, Properties::new().scale(2)));
        anim.run(None);
        let host = cx.host();
        assert_eq!(
            host.style(T, "-webkit-transition-property").as_deref(),
            Some("-webkit-transform")
        );
        host.run_due();
        assert_eq!(
            host.style(T, "-webkit-transform").as_deref(),
            Some("scale(2)")
        );
    }
}
