// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for anima.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomHost`]: inline and computed styles, `transitionend` listeners,
//!   and `setTimeout` timers over [`HtmlElement`](web_sys::HtmlElement)
//!   targets
//! - [`probe`]: vendor-prefix detection producing
//!   [`Capabilities`](anima_core::Capabilities)
//! - [`anima`]: a ready-to-use scheduler for the current page

#![no_std]

extern crate alloc;

mod host;
mod probe;

pub use anima_core::host::Host;
pub use host::DomHost;
pub use probe::probe;

use anima_core::Anima;
use anima_core::time::{Duration, HostTime};

/// Creates a scheduler for the current page, probing the document for
/// transition support.
///
/// Returns `None` outside a browser main thread.
#[must_use]
pub fn anima() -> Option<Anima<DomHost>> {
    let host = DomHost::new()?;
    let document = host.window().document()?;
    let capabilities = probe(&document);
    Some(Anima::new(host, capabilities))
}

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    host_time_from_millis(host::performance_now())
}

/// Converts a `DOMHighResTimeStamp` to whole milliseconds.
fn host_time_from_millis(ms: f64) -> HostTime {
    if ms.is_nan() || ms <= 0.0 {
        return HostTime(0);
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() returns a small positive f64"
    )]
    let ms = ms as u64;
    HostTime(ms)
}

/// The `setTimeout` delay for `delay`, saturated to what the API accepts.
fn timeout_millis(delay: Duration) -> i32 {
    i32::try_from(delay.millis()).unwrap_or(i32::MAX)
}
