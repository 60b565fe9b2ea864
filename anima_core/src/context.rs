// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared environment for animations, frames and runners.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::Cell;
use core::fmt;

use crate::capability::Capabilities;
use crate::host::Host;
use crate::id::TimerId;
use crate::time::{Duration, HostTime};
use crate::trace::Tracer;

/// A cheap, cloneable handle to a [`Host`], its [`Capabilities`], and a
/// [`Tracer`].
///
/// Every [`Animation`](crate::animation::Animation),
/// [`Frame`](crate::frame::Frame) and [`Runner`](crate::runner::Runner) is
/// built against a context. The [`Anima`](crate::scheduler::Anima) facade
/// owns one; advanced callers can create their own and drive the units
/// directly.
pub struct Context<H: Host> {
    inner: Rc<ContextInner<H>>,
}

struct ContextInner<H> {
    host: H,
    capabilities: Capabilities,
    tracer: Tracer,
    next_id: Cell<u32>,
}

impl<H: Host> Context<H> {
    /// Creates a context without tracing.
    #[must_use]
    pub fn new(host: H, capabilities: Capabilities) -> Self {
        Self::with_tracer(host, capabilities, Tracer::none())
    }

    /// Creates a context that reports lifecycle events to `tracer`.
    #[must_use]
    pub fn with_tracer(host: H, capabilities: Capabilities, tracer: Tracer) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                host,
                capabilities,
                tracer,
                next_id: Cell::new(0),
            }),
        }
    }

    /// The host.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.inner.host
    }

    /// The host's capabilities.
    #[must_use]
    pub fn capabilities(&self) -> &Capabilities {
        &self.inner.capabilities
    }

    /// The tracer lifecycle events are reported to.
    #[must_use]
    pub fn tracer(&self) -> &Tracer {
        &self.inner.tracer
    }

    /// The host's current time.
    #[must_use]
    pub fn now(&self) -> HostTime {
        self.inner.host.now()
    }

    /// Hands out the next id. Ids are shared across animations, frames and
    /// runners, so they are unique within a context.
    pub(crate) fn next_id(&self) -> u32 {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id.wrapping_add(1));
        id
    }

    /// Runs `f` on the next turn of the host's task queue.
    pub(crate) fn defer(&self, f: impl FnOnce() + 'static) -> TimerId {
        self.inner.host.set_timeout(Duration::ZERO, Box::new(f))
    }
}

impl<H: Host> Clone for Context<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: Host> fmt::Debug for Context<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("capabilities", &self.inner.capabilities)
            .field("next_id", &self.inner.next_id.get())
            .finish_non_exhaustive()
    }
}
