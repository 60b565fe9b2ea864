// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host contract for platform integrations.
//!
//! The core never touches the DOM directly. Everything it needs from the
//! environment goes through [`Host`]:
//!
//! - **Styles**: write an inline style property, read it back, and read the
//!   computed value (used to give a transition a defined starting point).
//! - **Transition-end notification**: register and remove a one-shot
//!   listener for the target's transition-end event.
//! - **Timers**: schedule a callback after a delay, and cancel it. A zero
//!   delay means "on a later turn of the task queue", never synchronously.
//! - **Clock**: the current [`HostTime`], used for trace timestamps.
//!
//! # Crate boundaries
//!
//! `anima_core` owns sequencing, completion tracking and style resolution.
//! Backend crates (e.g. `anima_backend_web`) implement [`Host`] and probe
//! [`Capabilities`](crate::capability::Capabilities). The deterministic
//! [`SimHost`](crate::sim::SimHost) implements it for tests.
//!
//! # Re-entrancy
//!
//! Implementations must never invoke a callback from inside the call that
//! registered it. The core relies on this: it registers listeners and timers
//! while holding internal state and expects them to fire on a later turn.

use alloc::boxed::Box;
use alloc::string::String;

use crate::id::{ListenerId, TimerId};
use crate::time::{Duration, HostTime};

/// A callback run by the host on a later turn.
pub type HostCallback = Box<dyn FnOnce()>;

/// Environment primitives the animation engine runs on.
///
/// Methods take `&self`: hosts are shared between every animation of a
/// scheduler and are expected to use interior mutability where they keep
/// state. Hosts live as long as the animations that capture them in their
/// callbacks, hence the `'static` bound.
pub trait Host: 'static {
    /// The visual object whose styles are animated (e.g. an `HtmlElement`).
    type Target: Clone + PartialEq + core::fmt::Debug + 'static;

    /// Sets an inline style property. An empty `value` removes it.
    fn set_style(&self, target: &Self::Target, key: &str, value: &str);

    /// Returns the inline style value for `key`, or `None` if it is unset.
    fn inline_style(&self, target: &Self::Target, key: &str) -> Option<String>;

    /// Returns the computed (cascaded or inherited) value for `key`.
    fn computed_style(&self, target: &Self::Target, key: &str) -> Option<String>;

    /// Registers `callback` to run the first time `event` fires on `target`.
    fn listen_transition_end(
        &self,
        target: &Self::Target,
        event: &str,
        callback: HostCallback,
    ) -> ListenerId;

    /// Removes a listener. Removing an unknown or already-fired listener is a
    /// no-op.
    fn unlisten(&self, target: &Self::Target, listener: ListenerId);

    /// Runs `callback` after `delay` on a later turn.
    fn set_timeout(&self, delay: Duration, callback: HostCallback) -> TimerId;

    /// Cancels a timer. Cancelling a fired or unknown timer is a no-op.
    fn clear_timeout(&self, timer: TimerId);

    /// The host's current time.
    fn now(&self) -> HostTime;

    /// Returns the inline value for `key`, falling back to the computed
    /// value.
    fn current_style(&self, target: &Self::Target, key: &str) -> Option<String> {
        self.inline_style(target, key)
            .or_else(|| self.computed_style(target, key))
    }
}
