// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sequential execution of steps.
//!
//! A [`Runner`] owns a FIFO of [`Step`]s and runs them strictly one after
//! another: a step starts only after the previous one completed. The first
//! step starts on the turn after [`run`](Runner::run); each later step
//! starts from its predecessor's continuation, which the steps themselves
//! already defer by a turn.
//!
//! While running, a runner registered with an
//! [`Anima`](crate::scheduler::Anima) scheduler appears in its active set,
//! so scheduler-wide [`abort`](crate::scheduler::Anima::abort) and
//! [`finish`](crate::scheduler::Anima::finish) reach it. It leaves the set
//! when it drains, is aborted, or is finished.

use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::context::Context;
use crate::host::Host;
use crate::id::{RunnerId, TimerId};
use crate::request::Callback;
use crate::step::Step;
use crate::trace::{RunnerAdvanceEvent, RunnerEndEvent, RunnerOutcome, RunnerStartEvent};

/// The set of active runners a scheduler broadcasts to.
pub(crate) type Registry<H> = RefCell<Vec<Runner<H>>>;

/// Lifecycle state of a [`Runner`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RunnerState {
    /// Built but not started.
    Idle,
    /// Working through its queue.
    Running,
    /// Every step completed and the callback ran.
    Drained,
    /// Cancelled by `abort`.
    Aborted,
    /// Jumped to the end by `finish`.
    Finished,
}

impl RunnerState {
    /// Returns `true` while the runner can still make progress.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Idle | Self::Running)
    }
}

/// Runs a queue of steps one after another.
///
/// `Runner` is a shared handle: clones refer to the same runner.
pub struct Runner<H: Host> {
    inner: Rc<Inner<H>>,
}

struct Inner<H: Host> {
    id: RunnerId,
    cx: Context<H>,
    registry: Option<Weak<Registry<H>>>,
    state: RefCell<State<H>>,
}

struct State<H: Host> {
    status: RunnerState,
    queue: VecDeque<Step<H>>,
    active: Option<Step<H>>,
    /// The deferred start of the first step.
    start: Option<TimerId>,
    callback: Option<Callback>,
}

impl<H: Host> Runner<H> {
    /// Creates a detached runner over `steps`.
    #[must_use]
    pub fn new(cx: &Context<H>, steps: impl IntoIterator<Item = Step<H>>) -> Self {
        Self::build(cx, steps, None)
    }

    /// Creates a runner that registers itself in `registry` while running.
    pub(crate) fn attached(
        cx: &Context<H>,
        steps: impl IntoIterator<Item = Step<H>>,
        registry: &Rc<Registry<H>>,
    ) -> Self {
        Self::build(cx, steps, Some(Rc::downgrade(registry)))
    }

    fn build(
        cx: &Context<H>,
        steps: impl IntoIterator<Item = Step<H>>,
        registry: Option<Weak<Registry<H>>>,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: RunnerId(cx.next_id()),
                cx: cx.clone(),
                registry,
                state: RefCell::new(State {
                    status: RunnerState::Idle,
                    queue: steps.into_iter().collect(),
                    active: None,
                    start: None,
                    callback: None,
                }),
            }),
        }
    }

    /// This runner's id.
    #[must_use]
    pub fn id(&self) -> RunnerId {
        self.inner.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.inner.state.borrow().status
    }

    /// Steps queued behind the active one.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.inner.state.borrow().queue.len()
    }

    /// The step currently running, if any.
    #[must_use]
    pub fn active(&self) -> Option<Step<H>> {
        self.inner.state.borrow().active.clone()
    }

    /// Starts working through the queue.
    ///
    /// `callback` runs once after the last step completed. With an empty
    /// queue the runner drains at once and runs `callback` before returning.
    /// Calling `run` on a runner that is not [`Idle`](RunnerState::Idle)
    /// does nothing.
    pub fn run(&self, callback: Option<Callback>) {
        let cx = &self.inner.cx;
        let started = {
            let mut state = self.inner.state.borrow_mut();
            if state.status != RunnerState::Idle {
                return;
            }
            if state.queue.is_empty() {
                state.status = RunnerState::Drained;
                Err(callback)
            } else {
                state.status = RunnerState::Running;
                state.callback = callback;
                let first = state.queue.pop_front();
                state.active = first;
                Ok(state.queue.len() + 1)
            }
        };
        let steps = match started {
            Ok(steps) => steps,
            Err(callback) => {
                self.end(RunnerOutcome::Drained);
                if let Some(callback) = callback {
                    callback();
                }
                return;
            }
        };

        self.register();
        #[expect(
            clippy::cast_possible_truncation,
            reason = "queues hold far fewer than u32::MAX steps"
        )]
        let steps = steps as u32;
        cx.tracer().runner_start(&RunnerStartEvent {
            runner: self.inner.id,
            at: cx.now(),
            steps,
        });
        let this = self.clone();
        let start = cx.defer(move || this.start_active());
        self.inner.state.borrow_mut().start = Some(start);
    }

    /// Cancels the runner.
    ///
    /// The queue is cleared, a pending start is cancelled, and the active
    /// step is aborted. The callback never runs.
    pub fn abort(&self) {
        let (start, active) = {
            let mut state = self.inner.state.borrow_mut();
            if !state.status.is_active() {
                return;
            }
            state.status = RunnerState::Aborted;
            state.queue.clear();
            state.callback = None;
            (state.start.take(), state.active.take())
        };
        if let Some(start) = start {
            self.inner.cx.host().clear_timeout(start);
        }
        if let Some(active) = active {
            active.abort();
        }
        self.end(RunnerOutcome::Aborted);
    }

    /// Jumps every step to its end state.
    ///
    /// The active step is finished first, then every queued step in order.
    /// With `perform`, their completion callbacks run and then the runner's
    /// own callback, while the runner is still in the scheduler's active set.
    /// It leaves the set afterwards.
    pub fn finish(&self, perform: bool) {
        let (start, active, queued, callback) = {
            let mut state = self.inner.state.borrow_mut();
            if !state.status.is_active() {
                return;
            }
            state.status = RunnerState::Finished;
            (
                state.start.take(),
                state.active.take(),
                core::mem::take(&mut state.queue),
                state.callback.take(),
            )
        };
        if let Some(start) = start {
            self.inner.cx.host().clear_timeout(start);
        }
        if let Some(active) = active {
            active.finish(perform);
        }
        for step in queued {
            step.finish(perform);
        }
        if perform && let Some(callback) = callback {
            callback();
        }
        self.end(RunnerOutcome::Finished);
    }

    fn start_active(&self) {
        let active = {
            let mut state = self.inner.state.borrow_mut();
            state.start = None;
            if state.status != RunnerState::Running {
                return;
            }
            state.active.clone()
        };
        if let Some(step) = active {
            step.run(Some(self.continuation()));
        }
    }

    /// Called after the active step completed.
    fn advance(&self) {
        let next = {
            let mut state = self.inner.state.borrow_mut();
            if state.status != RunnerState::Running {
                return;
            }
            match state.queue.pop_front() {
                Some(next) => {
                    state.active = Some(next.clone());
                    Ok((next, state.queue.len()))
                }
                None => {
                    state.status = RunnerState::Drained;
                    state.active = None;
                    Err(state.callback.take())
                }
            }
        };
        match next {
            Ok((step, remaining)) => {
                let cx = &self.inner.cx;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "queues hold far fewer than u32::MAX steps"
                )]
                let remaining = remaining as u32;
                cx.tracer().runner_advance(&RunnerAdvanceEvent {
                    runner: self.inner.id,
                    at: cx.now(),
                    remaining,
                });
                step.run(Some(self.continuation()));
            }
            Err(callback) => {
                self.end(RunnerOutcome::Drained);
                if let Some(callback) = callback {
                    callback();
                }
            }
        }
    }

    fn continuation(&self) -> Callback {
        let this = self.clone();
        Box::new(move || this.advance())
    }

    fn register(&self) {
        if let Some(registry) = self.inner.registry.as_ref().and_then(Weak::upgrade) {
            registry.borrow_mut().push(self.clone());
        }
    }

    /// Leaves the scheduler's active set and reports the outcome.
    fn end(&self, outcome: RunnerOutcome) {
        if let Some(registry) = self.inner.registry.as_ref().and_then(Weak::upgrade) {
            registry.borrow_mut().retain(|r| r != self);
        }
        let cx = &self.inner.cx;
        cx.tracer().runner_end(&RunnerEndEvent {
            runner: self.inner.id,
            at: cx.now(),
            outcome,
        });
    }
}

impl<H: Host> Clone for Runner<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host> PartialEq for Runner<H> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<H: Host> fmt::Debug for Runner<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Runner")
            .field("id", &self.inner.id)
            .field("state", &state.status)
            .field("remaining", &state.queue.len())
            .field("active", &state.active)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::Rc;
    use alloc::vec::Vec;

    use super::*;
    use crate::animation::{Animation, Phase};
    use crate::capability::Capabilities;
    use crate::request::AnimationSpec;
    use crate::sim::{SimHost, SimTarget};
    use crate::style::Properties;
    use crate::time::Duration;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    fn cx() -> Context<SimHost> {
        Context::new(SimHost::new(), Capabilities::STANDARD)
    }

    fn step(cx: &Context<SimHost>, n: u32, name: &'static str, log: &Log) -> Step<SimHost> {
        let log = Rc::clone(log);
        let spec = AnimationSpec::new(SimTarget(n), Properties::new().left(n * 10))
            .duration(Duration(100))
            .on_complete(move |_| log.borrow_mut().push(name));
        Step::Animation(Animation::new(cx, spec))
    }

    fn note(log: &Log, what: &'static str) -> Callback {
        let log = Rc::clone(log);
        Box::new(move || log.borrow_mut().push(what))
    }

    #[test]
    fn steps_run_strictly_in_order() {
        let cx = cx();
        let log = Log::default();
        let runner = Runner::new(&cx, [step(&cx, 1, "a", &log), step(&cx, 2, "b", &log)]);
        runner.run(Some(note(&log, "done")));
        let host = cx.host();
        assert_eq!(host.style(SimTarget(1), "transition-property"), None);

        host.run_due();
        assert_eq!(
            host.style(SimTarget(1), "transition-property").as_deref(),
            Some("left")
        );
        assert_eq!(host.style(SimTarget(1), "left").as_deref(), Some("10px"));
        assert_eq!(host.style(SimTarget(2), "left"), None);
        assert_eq!(runner.remaining(), 1);

        host.fire_transition_end(SimTarget(1));
        assert_eq!(host.style(SimTarget(2), "left"), None);
        host.run_due();
        assert_eq!(host.style(SimTarget(2), "left").as_deref(), Some("20px"));

        host.fire_transition_end(SimTarget(2));
        host.run_until_idle();
        assert_eq!(*log.borrow(), ["a", "b", "done"]);
        assert_eq!(runner.state(), RunnerState::Drained);
    }

    #[test]
    fn empty_runner_drains_synchronously() {
        let cx = cx();
        let log = Log::default();
        let runner = Runner::new(&cx, []);
        runner.run(Some(note(&log, "done")));
        assert_eq!(*log.borrow(), ["done"]);
        assert_eq!(runner.state(), RunnerState::Drained);
        assert_eq!(cx.host().pending_timers(), 0);
    }

    #[test]
    fn abort_before_first_step_starts() {
        let cx = cx();
        let log = Log::default();
        let runner = Runner::new(&cx, [step(&cx, 1, "a", &log)]);
        runner.run(Some(note(&log, "done")));
        runner.abort();
        cx.host().run_until_idle();
        assert!(log.borrow().is_empty());
        assert!(cx.host().writes_of(SimTarget(1), "left").is_empty());
        assert_eq!(runner.state(), RunnerState::Aborted);
    }

    #[test]
    fn abort_mid_step_drops_the_rest() {
        let cx = cx();
        let log = Log::default();
        let first = step(&cx, 1, "a", &log);
        let runner = Runner::new(
            &cx,
            [first.clone(), step(&cx, 2, "b", &log), step(&cx, 3, "c", &log)],
        );
        runner.run(Some(note(&log, "done")));
        cx.host().run_due();
        runner.abort();
        assert_eq!(runner.remaining(), 0);
        let Step::Animation(first) = first else {
            unreachable!()
        };
        assert_eq!(first.phase(), Phase::Aborted);
        cx.host().fire_transition_end(SimTarget(1));
        cx.host().run_until_idle();
        assert!(log.borrow().is_empty());
        assert!(cx.host().writes_of(SimTarget(2), "left").is_empty());
    }

    #[test]
    fn finish_completes_active_then_queued() {
        let cx = cx();
        let log = Log::default();
        let runner = Runner::new(
            &cx,
            [step(&cx, 1, "a", &log), step(&cx, 2, "b", &log), step(&cx, 3, "c", &log)],
        );
        runner.run(Some(note(&log, "done")));
        cx.host().run_due();
        runner.finish(true);
        assert_eq!(*log.borrow(), ["a", "b", "c", "done"]);
        for n in 1..=3 {
            let expected = alloc::format!("{}px", n * 10);
            assert_eq!(
                cx.host().style(SimTarget(n), "left").as_deref(),
                Some(expected.as_str())
            );
        }
        cx.host().run_until_idle();
        assert_eq!(log.borrow().len(), 4);
        assert_eq!(runner.state(), RunnerState::Finished);
    }

    #[test]
    fn finish_without_perform_still_applies_values() {
        let cx = cx();
        let log = Log::default();
        let runner = Runner::new(&cx, [step(&cx, 1, "a", &log), step(&cx, 2, "b", &log)]);
        runner.run(Some(note(&log, "done")));
        runner.finish(false);
        cx.host().run_until_idle();
        assert!(log.borrow().is_empty());
        assert_eq!(cx.host().style(SimTarget(2), "left").as_deref(), Some("20px"));
    }

    #[test]
    fn attached_runner_leaves_registry_when_done() {
        let cx = cx();
        let log = Log::default();
        let registry: Rc<Registry<SimHost>> = Rc::default();
        let runner = Runner::attached(&cx, [step(&cx, 1, "a", &log)], &registry);
        assert!(registry.borrow().is_empty());
        runner.run(None);
        assert_eq!(*registry.borrow(), [runner.clone()]);
        cx.host().run_until_idle();
        assert!(registry.borrow().is_empty());
        assert_eq!(*log.borrow(), ["a"]);
    }

    #[test]
    fn finish_calls_back_before_leaving_registry() {
        let cx = cx();
        let log = Log::default();
        let registry: Rc<Registry<SimHost>> = Rc::default();
        let runner = Runner::attached(&cx, [step(&cx, 1, "a", &log)], &registry);
        let seen = Rc::new(core::cell::Cell::new(0));
        let watched = Rc::clone(&registry);
        let count = Rc::clone(&seen);
        runner.run(Some(Box::new(move || count.set(watched.borrow().len()))));
        runner.finish(true);
        assert_eq!(seen.get(), 1);
        assert!(registry.borrow().is_empty());
    }

    #[test]
    fn steps_that_already_ran_do_not_stall_the_queue() {
        let cx = cx();
        let log = Log::default();
        let registry: Rc<Registry<SimHost>> = Rc::default();
        let first = step(&cx, 1, "a", &log);
        Runner::attached(&cx, [first.clone()], &registry).run(None);
        cx.host().run_until_idle();
        assert_eq!(*log.borrow(), ["a"]);

        let again = Runner::attached(&cx, [first, step(&cx, 2, "b", &log)], &registry);
        again.run(Some(note(&log, "done")));
        cx.host().run_until_idle();
        assert_eq!(*log.borrow(), ["a", "b", "done"]);
        assert_eq!(again.state(), RunnerState::Drained);
        assert!(registry.borrow().is_empty());
        assert!(cx.host().writes_of(SimTarget(1), "left").len() == 1);
    }
}
