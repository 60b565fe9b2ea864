// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scheduler facade.
//!
//! [`Anima`] accumulates steps in a pending list, wraps them in
//! [`Runner`]s on [`play`](Anima::play) or [`step`](Anima::step), and keeps
//! track of every runner still active so [`abort`](Anima::abort) and
//! [`finish`](Anima::finish) can reach all of them at once.
//!
//! ```text
//!   queue / enqueue / frame ──► pending list
//!                                   │ play (all) / step (first)
//!                                   ▼
//!                               Runner ──► active set
//!                                   │ one step at a time
//!                                   ▼
//!                  Animation  or  Frame ──► member Animations
//! ```
//!
//! Each `Anima` owns its own pending list and active set; two instances
//! never see each other's runners.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::animation::Animation;
use crate::capability::Capabilities;
use crate::context::Context;
use crate::frame::Frame;
use crate::host::Host;
use crate::request::{AnimationSpec, Callback, Request, TargetCallback};
use crate::runner::{Registry, Runner};
use crate::step::Step;
use crate::style::{self, Properties};
use crate::trace::Tracer;

/// Queues, sequences and controls animations on one host.
pub struct Anima<H: Host> {
    cx: Context<H>,
    pending: RefCell<Vec<Step<H>>>,
    runners: Rc<Registry<H>>,
}

impl<H: Host> Anima<H> {
    /// Creates a scheduler without tracing.
    #[must_use]
    pub fn new(host: H, capabilities: Capabilities) -> Self {
        Self::from_context(Context::new(host, capabilities))
    }

    /// Creates a scheduler that reports lifecycle events to `tracer`.
    #[must_use]
    pub fn with_tracer(host: H, capabilities: Capabilities, tracer: Tracer) -> Self {
        Self::from_context(Context::with_tracer(host, capabilities, tracer))
    }

    /// Creates a scheduler over an existing context.
    #[must_use]
    pub fn from_context(cx: Context<H>) -> Self {
        Self {
            cx,
            pending: RefCell::new(Vec::new()),
            runners: Rc::default(),
        }
    }

    /// The shared context animations are built against.
    #[must_use]
    pub fn context(&self) -> &Context<H> {
        &self.cx
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        self.cx.host()
    }

    /// The host's capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        self.cx.capabilities()
    }

    /// Number of steps waiting for `play` or `step`.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Runners started by this scheduler that have not drained, been
    /// aborted, or been finished.
    #[must_use]
    pub fn active_runners(&self) -> Vec<Runner<H>> {
        self.runners.borrow().clone()
    }

    /// Appends a request to the pending list.
    ///
    /// A single spec becomes one animation. A group with several targets
    /// becomes one frame; a group with exactly one target becomes a lone
    /// animation that runs the group callback on completion; an empty group
    /// queues nothing.
    pub fn queue(&self, request: impl Into<Request<H::Target>>) -> &Self {
        let step = match request.into() {
            Request::One(spec) => Some(Step::Animation(Animation::new(&self.cx, spec))),
            Request::Many(group) => match group.targets.len() {
                0 => None,
                1 => {
                    let (mut specs, callback) = group.split();
                    specs.pop().map(|mut spec| {
                        spec.on_complete = callback.map(|f| -> TargetCallback<H::Target> {
                            Box::new(move |_: &H::Target| f())
                        });
                        Step::Animation(Animation::new(&self.cx, spec))
                    })
                }
                _ => {
                    let frame = Frame::new(&self.cx);
                    frame.queue(group);
                    Some(Step::Frame(frame))
                }
            },
        };
        if let Some(step) = step {
            self.pending.borrow_mut().push(step);
        }
        self
    }

    /// Appends an already-built animation or frame to the pending list.
    pub fn enqueue(&self, step: impl Into<Step<H>>) -> &Self {
        self.pending.borrow_mut().push(step.into());
        self
    }

    /// Builds a frame from `specs`, appends it to the pending list, and
    /// returns it.
    pub fn frame(&self, specs: impl IntoIterator<Item = AnimationSpec<H::Target>>) -> Frame<H> {
        self.push_frame(Frame::from_specs(&self.cx, specs, None))
    }

    /// Like [`frame`](Self::frame), with a group callback.
    pub fn frame_with(
        &self,
        specs: impl IntoIterator<Item = AnimationSpec<H::Target>>,
        callback: impl FnOnce() + 'static,
    ) -> Frame<H> {
        self.push_frame(Frame::from_specs(&self.cx, specs, Some(Box::new(callback))))
    }

    fn push_frame(&self, frame: Frame<H>) -> Frame<H> {
        self.pending.borrow_mut().push(Step::Frame(frame.clone()));
        frame
    }

    /// Runs every pending step in order in a new runner.
    pub fn play(&self) -> Runner<H> {
        let steps = core::mem::take(&mut *self.pending.borrow_mut());
        self.start(steps, None)
    }

    /// Like [`play`](Self::play), running `callback` after the last step.
    pub fn play_with(&self, callback: impl FnOnce() + 'static) -> Runner<H> {
        let steps = core::mem::take(&mut *self.pending.borrow_mut());
        self.start(steps, Some(Box::new(callback)))
    }

    /// Runs only the first pending step in a new runner.
    pub fn step(&self) -> Runner<H> {
        let first = self.take_first();
        self.start(first, None)
    }

    /// Like [`step`](Self::step), running `callback` after the step.
    pub fn step_with(&self, callback: impl FnOnce() + 'static) -> Runner<H> {
        let first = self.take_first();
        self.start(first, Some(Box::new(callback)))
    }

    /// Queues `request`, then runs the first pending step.
    ///
    /// If other steps were already pending, the oldest of them runs and
    /// `request` stays queued behind it.
    pub fn animate(&self, request: impl Into<Request<H::Target>>) -> Runner<H> {
        self.queue(request);
        self.step()
    }

    /// Aborts every active runner.
    pub fn abort(&self) {
        for runner in self.active_runners() {
            runner.abort();
        }
    }

    /// Finishes every active runner.
    pub fn finish(&self, perform: bool) {
        for runner in self.active_runners() {
            runner.finish(perform);
        }
    }

    /// Resolves `properties` and writes them to `target` at once, without a
    /// transition.
    pub fn css(&self, target: &H::Target, properties: &Properties) {
        let host = self.cx.host();
        let resolved = style::resolve(properties, self.cx.capabilities(), |key| {
            host.current_style(target, key)
        });
        for (key, value) in &resolved.values {
            host.set_style(target, key, value);
        }
    }

    fn take_first(&self) -> Option<Step<H>> {
        let mut pending = self.pending.borrow_mut();
        (!pending.is_empty()).then(|| pending.remove(0))
    }

    fn start(
        &self,
        steps: impl IntoIterator<Item = Step<H>>,
        callback: Option<Callback>,
    ) -> Runner<H> {
        let runner = Runner::attached(&self.cx, steps, &self.runners);
        runner.run(callback);
        runner
    }
}

impl<H: Host> fmt::Debug for Anima<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Anima")
            .field("capabilities", self.cx.capabilities())
            .field("pending", &self.pending.borrow().len())
            .field("runners", &self.runners.borrow().len())
            .finish_non_exhaustive()
    }
}
