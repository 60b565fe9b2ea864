// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation requests.
//!
//! Callers describe what to animate with one of two explicit variants:
//!
//! - [`AnimationSpec`]: one target, with a per-target completion callback.
//! - [`GroupSpec`]: several targets sharing properties and timing, with one
//!   group-level callback.
//!
//! Both convert into [`Request`], which is what
//! [`Anima::queue`](crate::scheduler::Anima::queue) and
//! [`Frame::queue`](crate::frame::Frame::queue) accept. Already-built
//! animations and frames are queued through
//! [`Anima::enqueue`](crate::scheduler::Anima::enqueue) instead.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::style::Properties;
use crate::time::Duration;
use crate::timing::{Easing, Timing};

/// A callback with no arguments, run once.
pub type Callback = Box<dyn FnOnce()>;

/// A per-target completion callback, run once with the animated target.
pub type TargetCallback<T> = Box<dyn FnOnce(&T)>;

/// Appends `next` to an optional pending callback.
pub(crate) fn chain(first: Option<Callback>, next: Callback) -> Callback {
    match first {
        Some(first) => Box::new(move || {
            first();
            next();
        }),
        None => next,
    }
}

/// One target, one style change.
pub struct AnimationSpec<T> {
    /// What to animate.
    pub target: T,
    /// Where to animate it to.
    pub properties: Properties,
    /// Duration, delay and easing.
    pub timing: Timing,
    /// Run once with the target when the animation completes.
    pub on_complete: Option<TargetCallback<T>>,
}

impl<T> AnimationSpec<T> {
    /// Creates a spec with [`Timing::DEFAULT`] and no callback.
    #[must_use]
    pub fn new(target: T, properties: Properties) -> Self {
        Self {
            target,
            properties,
            timing: Timing::DEFAULT,
            on_complete: None,
        }
    }

    /// Replaces the whole timing.
    #[must_use]
    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.timing.duration = duration;
        self
    }

    /// Sets the delay.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.timing.delay = delay;
        self
    }

    /// Sets the easing.
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.timing.easing = easing;
        self
    }

    /// Sets the completion callback.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnOnce(&T) + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }
}

impl<T: fmt::Debug> fmt::Debug for AnimationSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationSpec")
            .field("target", &self.target)
            .field("properties", &self.properties)
            .field("timing", &self.timing)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Several targets animated with the same properties and timing.
pub struct GroupSpec<T> {
    /// What to animate. May be empty, in which case nothing is queued.
    pub targets: Vec<T>,
    /// Where to animate them to.
    pub properties: Properties,
    /// Duration, delay and easing, shared by every target.
    pub timing: Timing,
    /// Run once after every target completed.
    pub on_complete: Option<Callback>,
}

impl<T> GroupSpec<T> {
    /// Creates a group spec with [`Timing::DEFAULT`] and no callback.
    #[must_use]
    pub fn new(targets: impl IntoIterator<Item = T>, properties: Properties) -> Self {
        Self {
            targets: targets.into_iter().collect(),
            properties,
            timing: Timing::DEFAULT,
            on_complete: None,
        }
    }

    /// Replaces the whole timing.
    #[must_use]
    pub fn timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.timing.duration = duration;
        self
    }

    /// Sets the delay.
    #[must_use]
    pub fn delay(mut self, delay: Duration) -> Self {
        self.timing.delay = delay;
        self
    }

    /// Sets the easing.
    #[must_use]
    pub fn easing(mut self, easing: Easing) -> Self {
        self.timing.easing = easing;
        self
    }

    /// Sets the group completion callback.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    /// Splits the group into one callback-less spec per target plus the
    /// group callback.
    #[must_use]
    pub fn split(self) -> (Vec<AnimationSpec<T>>, Option<Callback>) {
        let Self {
            targets,
            properties,
            timing,
            on_complete,
        } = self;
        let specs = targets
            .into_iter()
            .map(|target| AnimationSpec {
                target,
                properties: properties.clone(),
                timing,
                on_complete: None,
            })
            .collect();
        (specs, on_complete)
    }
}

impl<T: fmt::Debug> fmt::Debug for GroupSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupSpec")
            .field("targets", &self.targets)
            .field("properties", &self.properties)
            .field("timing", &self.timing)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// Input accepted by the queueing entry points.
#[derive(Debug)]
pub enum Request<T> {
    /// A single target.
    One(AnimationSpec<T>),
    /// Several targets with a group callback.
    Many(GroupSpec<T>),
}

impl<T> From<AnimationSpec<T>> for Request<T> {
    fn from(spec: AnimationSpec<T>) -> Self {
        Self::One(spec)
    }
}

impl<T> From<GroupSpec<T>> for Request<T> {
    fn from(spec: GroupSpec<T>) -> Self {
        Self::Many(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_split_copies_properties_and_timing() {
        let group = GroupSpec::new([1_u32, 2, 3], Properties::new().opacity(0.5))
            .duration(Duration(200))
            .on_complete(|| {});
        let (specs, callback) = group.split();
        assert_eq!(specs.len(), 3);
        assert!(callback.is_some());
        for (spec, target) in specs.iter().zip([1, 2, 3]) {
            assert_eq!(spec.target, target);
            assert_eq!(spec.timing.duration, Duration(200));
            assert_eq!(spec.properties, Properties::new().opacity(0.5));
            assert!(spec.on_complete.is_none());
        }
    }

    #[test]
    fn builders_fill_timing() {
        let spec = AnimationSpec::new(7_u32, Properties::new())
            .delay(Duration(40))
            .easing(Easing::Linear);
        assert_eq!(spec.timing.delay, Duration(40));
        assert_eq!(spec.timing.easing, Easing::Linear);
        assert_eq!(spec.timing.duration, Timing::DEFAULT.duration);
    }
}
