// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concurrent groups of animations.
//!
//! A [`Frame`] starts all of its member animations together and completes
//! once every member has completed, in whatever order that happens. On
//! completion it runs its own group callback first, then the continuation
//! handed to [`run`](Frame::run). Both run at most once.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::animation::{Animation, Phase};
use crate::context::Context;
use crate::host::Host;
use crate::id::FrameId;
use crate::request::{AnimationSpec, Callback, Request, chain};
use crate::trace::{FrameCompleteEvent, FrameStartEvent};

/// A set of animations run concurrently.
///
/// `Frame` is a shared handle: clones refer to the same frame.
pub struct Frame<H: Host> {
    inner: Rc<Inner<H>>,
}

struct Inner<H: Host> {
    id: FrameId,
    cx: Context<H>,
    state: RefCell<State<H>>,
}

struct State<H: Host> {
    phase: Phase,
    members: Vec<Animation<H>>,
    /// Members still running.
    remaining: usize,
    callback: Option<Callback>,
    continuation: Option<Callback>,
}

impl<H: Host> Frame<H> {
    /// Creates an empty frame.
    #[must_use]
    pub fn new(cx: &Context<H>) -> Self {
        Self {
            inner: Rc::new(Inner {
                id: FrameId(cx.next_id()),
                cx: cx.clone(),
                state: RefCell::new(State {
                    phase: Phase::Idle,
                    members: Vec::new(),
                    remaining: 0,
                    callback: None,
                    continuation: None,
                }),
            }),
        }
    }

    /// Creates an empty frame with a group callback.
    #[must_use]
    pub fn with_callback(cx: &Context<H>, callback: impl FnOnce() + 'static) -> Self {
        let frame = Self::new(cx);
        frame.set_callback(callback);
        frame
    }

    /// Creates a frame from `specs` with an optional group callback.
    #[must_use]
    pub fn from_specs(
        cx: &Context<H>,
        specs: impl IntoIterator<Item = AnimationSpec<H::Target>>,
        callback: Option<Callback>,
    ) -> Self {
        let frame = Self::new(cx);
        for spec in specs {
            frame.queue(spec);
        }
        frame.inner.state.borrow_mut().callback = callback;
        frame
    }

    /// Replaces the group callback.
    pub fn set_callback(&self, callback: impl FnOnce() + 'static) -> &Self {
        self.inner.state.borrow_mut().callback = Some(Box::new(callback));
        self
    }

    /// This frame's id.
    #[must_use]
    pub fn id(&self) -> FrameId {
        self.inner.id
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase
    }

    /// Number of member animations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.borrow().members.len()
    }

    /// Returns `true` if the frame has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The member animations, in the order they were added.
    #[must_use]
    pub fn members(&self) -> Vec<Animation<H>> {
        self.inner.state.borrow().members.clone()
    }

    /// Adds members.
    ///
    /// A single spec adds one animation. A group adds one animation per
    /// target, and its callback, if it has one, becomes this frame's group
    /// callback. Members added after the frame started are not run.
    pub fn queue(&self, request: impl Into<Request<H::Target>>) -> &Self {
        let cx = &self.inner.cx;
        let (animations, callback) = match request.into() {
            Request::One(spec) => (alloc::vec![Animation::new(cx, spec)], None),
            Request::Many(group) => {
                let (specs, callback) = group.split();
                let animations = specs
                    .into_iter()
                    .map(|spec| Animation::new(cx, spec))
                    .collect();
                (animations, callback)
            }
        };
        let mut state = self.inner.state.borrow_mut();
        state.members.extend(animations);
        if callback.is_some() {
            state.callback = callback;
        }
        self
    }

    /// Adds an already-built animation.
    pub fn push(&self, animation: Animation<H>) -> &Self {
        self.inner.state.borrow_mut().members.push(animation);
        self
    }

    /// Starts every member.
    ///
    /// An empty frame completes on the next turn. Members that already ran
    /// elsewhere count as done once their own completion comes through.
    ///
    /// A frame runs at most once: running it again while it is
    /// [`Running`](Phase::Running) adds `continuation` behind the one already
    /// waiting, and running a settled frame schedules `continuation` on the
    /// next turn.
    pub fn run(&self, continuation: Option<Callback>) {
        let members = {
            let mut state = self.inner.state.borrow_mut();
            let phase = state.phase;
            match phase {
                Phase::Idle => {}
                Phase::Running => {
                    if let Some(next) = continuation {
                        let first = state.continuation.take();
                        state.continuation = Some(chain(first, next));
                    }
                    return;
                }
                Phase::Completed | Phase::Aborted => {
                    drop(state);
                    if let Some(continuation) = continuation {
                        self.inner.cx.defer(continuation);
                    }
                    return;
                }
            }
            state.phase = Phase::Running;
            state.continuation = continuation;
            state.remaining = state.members.len();
            state.members.clone()
        };

        let cx = &self.inner.cx;
        #[expect(
            clippy::cast_possible_truncation,
            reason = "frames hold far fewer than u32::MAX members"
        )]
        let count = members.len() as u32;
        cx.tracer().frame_start(&FrameStartEvent {
            frame: self.inner.id,
            at: cx.now(),
            members: count,
        });

        if members.is_empty() {
            let this = self.clone();
            cx.defer(move || this.settle(false, true));
            return;
        }
        for member in members {
            let this = self.clone();
            member.run(Some(Box::new(move || this.member_done())));
        }
    }

    /// Cancels every member. Neither callback runs.
    pub fn abort(&self) {
        let members = {
            let mut state = self.inner.state.borrow_mut();
            if state.phase.is_terminal() {
                return;
            }
            state.phase = Phase::Aborted;
            state.callback = None;
            state.continuation = None;
            state.members.clone()
        };
        for member in members {
            member.abort();
        }
    }

    /// Finishes every member, then completes the frame.
    ///
    /// With `perform`, member completion callbacks run, followed by the
    /// group callback and the continuation. Without it, none of them run.
    pub fn finish(&self, perform: bool) {
        let members = self.members();
        for member in &members {
            member.finish(perform);
        }
        self.settle(true, perform);
    }

    fn member_done(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.phase != Phase::Running {
                return;
            }
            state.remaining = state.remaining.saturating_sub(1);
            if state.remaining > 0 {
                return;
            }
        }
        self.settle(false, true);
    }

    /// Moves the frame to [`Completed`](Phase::Completed) and, with
    /// `perform`, runs the group callback then the continuation. A frame
    /// settles at most once.
    fn settle(&self, forced: bool, perform: bool) {
        let (callback, continuation) = {
            let mut state = self.inner.state.borrow_mut();
            if state.phase.is_terminal() {
                return;
            }
            state.phase = Phase::Completed;
            (state.callback.take(), state.continuation.take())
        };
        let cx = &self.inner.cx;
        cx.tracer().frame_complete(&FrameCompleteEvent {
            frame: self.inner.id,
            at: cx.now(),
            forced,
        });
        if !perform {
            return;
        }
        if let Some(callback) = callback {
            callback();
        }
        if let Some(continuation) = continuation {
            continuation();
        }
    }
}

impl<H: Host> Clone for Frame<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host> PartialEq for Frame<H> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<H: Host> fmt::Debug for Frame<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Frame")
            .field("id", &self.inner.id)
            .field("phase", &state.phase)
            .field("members", &state.members.len())
            .field("remaining", &state.remaining)
            .finish_non_exhaustive()
    }
}
