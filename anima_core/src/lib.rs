// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sequencing of CSS-transition animations.
//!
//! `anima_core` turns style changes on visual targets into animations that
//! the host renders with its own transition engine, and lets callers run them
//! one after another or side by side. It is `no_std` compatible (with
//! `alloc`) and never touches a DOM directly; backends implement
//! [`Host`](host::Host).
//!
//! # Architecture
//!
//! ```text
//!   Anima::queue ──► pending list ──► Anima::play ──► Runner
//!                                                       │ FIFO
//!                                        ┌──────────────┴───────────┐
//!                                        ▼                          ▼
//!                                    Animation                    Frame
//!                                        │                          │ all members
//!                                        ▼                          ▼
//!                  transition-end listener  or  fallback timer (first wins)
//! ```
//!
//! **[`scheduler`]**: the [`Anima`](scheduler::Anima) facade. Owns the
//! pending list and the set of active runners; `queue`, `frame`, `play`,
//! `step`, `animate`, `abort`, `finish`, `css`.
//!
//! **[`animation`]**: one target, one style change, one completion
//! callback. Completes exactly once, from whichever of the transition-end
//! notification and the fallback timer arrives first.
//!
//! **[`frame`]**: animations started together; the group callback runs once
//! every member completed.
//!
//! **[`runner`]**: a FIFO of [`Step`](step::Step)s run strictly one at a
//! time.
//!
//! **[`style`]**: resolves property maps into concrete CSS keys and values.
//!
//! **[`capability`]** and **[`host`]**: the contract a platform backend
//! fulfils.
//!
//! **[`sim`]**: a deterministic host with a virtual clock, for tests.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and lifecycle events,
//! with a zero-overhead [`Tracer`](trace::Tracer) handle.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod capability;
pub mod context;
pub mod error;
pub mod frame;
pub mod host;
pub mod id;
pub mod request;
pub mod runner;
pub mod scheduler;
pub mod sim;
pub mod step;
pub mod style;
pub mod time;
pub mod timing;
pub mod trace;

pub use animation::{Animation, Phase};
pub use capability::{Capabilities, VendorPrefix};
pub use context::Context;
pub use error::ParseError;
pub use frame::Frame;
pub use host::Host;
pub use request::{AnimationSpec, GroupSpec, Request};
pub use runner::{Runner, RunnerState};
pub use scheduler::Anima;
pub use step::Step;
pub use style::Properties;
pub use time::{Duration, HostTime};
pub use timing::{Easing, Timing};
