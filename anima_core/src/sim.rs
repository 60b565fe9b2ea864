// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic in-memory [`Host`].
//!
//! [`SimHost`] keeps a virtual clock, an ordered timer queue, inline and
//! computed style maps, and a log of every style write. Nothing happens until
//! the caller drives it with [`advance`](SimHost::advance),
//! [`run_due`](SimHost::run_due), [`run_until_idle`](SimHost::run_until_idle)
//! or [`fire_transition_end`](SimHost::fire_transition_end), which makes
//! completion races reproducible in tests.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::host::{Host, HostCallback};
use crate::id::{ListenerId, TimerId};
use crate::time::{Duration, HostTime};

/// Upper bound on callbacks [`SimHost::run_until_idle`] runs before giving
/// up, so a self-rescheduling timer cannot hang a test.
const RUN_LIMIT: usize = 10_000;

/// A simulated visual object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTarget(pub u32);

/// One recorded inline style write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StyleWrite {
    /// Virtual time of the write.
    pub at: HostTime,
    /// Index of the task-queue turn the write happened in. Turn 0 is
    /// everything before the first timer ran.
    pub turn: u64,
    /// Which target.
    pub target: SimTarget,
    /// CSS key.
    pub key: String,
    /// Written value. Empty means the property was removed.
    pub value: String,
}

struct SimTimer {
    id: TimerId,
    due: HostTime,
    callback: HostCallback,
}

struct SimListener {
    id: ListenerId,
    target: SimTarget,
    event: String,
    callback: HostCallback,
}

#[derive(Default)]
struct SimState {
    now: HostTime,
    turn: u64,
    next_id: u32,
    timers: Vec<SimTimer>,
    listeners: Vec<SimListener>,
    inline: BTreeMap<(SimTarget, String), String>,
    computed: BTreeMap<(SimTarget, String), String>,
    writes: Vec<StyleWrite>,
}

impl SimState {
    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Index of the earliest timer due at or before `limit`. Ties go to the
    /// timer registered first.
    fn earliest_due(&self, limit: HostTime) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= limit)
            .min_by_key(|(_, t)| (t.due, t.id.0))
            .map(|(i, _)| i)
    }
}

/// A deterministic [`Host`] for tests and headless runs.
#[derive(Default)]
pub struct SimHost {
    state: RefCell<SimState>,
}

impl SimHost {
    /// Creates a host at time zero with no styles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the computed value `target` reports for `key` when it has no
    /// inline value.
    pub fn set_computed(&self, target: SimTarget, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .computed
            .insert((target, key.to_string()), value.to_string());
    }

    /// The inline value of `key` on `target`.
    #[must_use]
    pub fn style(&self, target: SimTarget, key: &str) -> Option<String> {
        self.state
            .borrow()
            .inline
            .get(&(target, key.to_string()))
            .cloned()
    }

    /// Every style write so far, in order.
    #[must_use]
    pub fn writes(&self) -> Vec<StyleWrite> {
        self.state.borrow().writes.clone()
    }

    /// Writes of `key` on `target`, in order.
    #[must_use]
    pub fn writes_of(&self, target: SimTarget, key: &str) -> Vec<StyleWrite> {
        self.state
            .borrow()
            .writes
            .iter()
            .filter(|w| w.target == target && w.key == key)
            .cloned()
            .collect()
    }

    /// Forgets the write log.
    pub fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }

    /// Number of timers that have not fired or been cleared.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Number of live transition-end listeners on `target`.
    #[must_use]
    pub fn listener_count(&self, target: SimTarget) -> usize {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.target == target)
            .count()
    }

    /// Index of the current task-queue turn.
    #[must_use]
    pub fn turn(&self) -> u64 {
        self.state.borrow().turn
    }

    /// Fires the transition-end event on `target`.
    ///
    /// Every listener registered on `target` runs once and is removed.
    /// Returns the number of listeners that ran.
    pub fn fire_transition_end(&self, target: SimTarget) -> usize {
        let fired: Vec<SimListener> = {
            let mut state = self.state.borrow_mut();
            state.turn += 1;
            let (fired, kept): (Vec<_>, Vec<_>) = core::mem::take(&mut state.listeners)
                .into_iter()
                .partition(|l| l.target == target);
            state.listeners = kept;
            fired
        };
        let count = fired.len();
        for listener in fired {
            (listener.callback)();
        }
        count
    }

    /// Runs the earliest timer due by `limit`, moving the clock to its due
    /// time. Returns `false` if none is due.
    fn run_one(&self, limit: HostTime) -> bool {
        let timer = {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.earliest_due(limit) else {
                return false;
            };
            let timer = state.timers.swap_remove(index);
            if timer.due > state.now {
                state.now = timer.due;
            }
            state.turn += 1;
            timer
        };
        (timer.callback)();
        true
    }

    /// Runs every timer due at the current time, including zero-delay timers
    /// scheduled by the ones that ran. Returns how many ran.
    pub fn run_due(&self) -> usize {
        let now = self.now();
        let mut ran = 0;
        while ran < RUN_LIMIT && self.run_one(now) {
            ran += 1;
        }
        ran
    }

    /// Moves the clock forward by `by`, running timers in due order as their
    /// time comes. Returns how many ran.
    pub fn advance(&self, by: Duration) -> usize {
        let until = self.now() + by;
        let mut ran = 0;
        while ran < RUN_LIMIT && self.run_one(until) {
            ran += 1;
        }
        let mut state = self.state.borrow_mut();
        if state.now < until {
            state.now = until;
        }
        ran
    }

    /// Runs timers in due order until none remain. Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while ran < RUN_LIMIT && self.run_one(HostTime(u64::MAX)) {
            ran += 1;
        }
        ran
    }
}

impl Host for SimHost {
    type Target = SimTarget;

    fn set_style(&self, target: &SimTarget, key: &str, value: &str) {
        let mut state = self.state.borrow_mut();
        let slot = (*target, key.to_string());
        if value.is_empty() {
            state.inline.remove(&slot);
        } else {
            state.inline.insert(slot, value.to_string());
        }
        let write = StyleWrite {
            at: state.now,
            turn: state.turn,
            target: *target,
            key: key.to_string(),
            value: value.to_string(),
        };
        state.writes.push(write);
    }

    fn inline_style(&self, target: &SimTarget, key: &str) -> Option<String> {
        self.style(*target, key)
    }

    fn computed_style(&self, target: &SimTarget, key: &str) -> Option<String> {
        self.state
            .borrow()
            .computed
            .get(&(*target, key.to_string()))
            .cloned()
    }

    fn listen_transition_end(
        &self,
        target: &SimTarget,
        event: &str,
        callback: HostCallback,
    ) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_id());
        state.listeners.push(SimListener {
            id,
            target: *target,
            event: event.to_string(),
            callback,
        });
        id
    }

    fn unlisten(&self, _target: &SimTarget, listener: ListenerId) {
        self.state
            .borrow_mut()
            .listeners
            .retain(|l| l.id != listener);
    }

    fn set_timeout(&self, delay: Duration, callback: HostCallback) -> TimerId {
        let mut state = self.state.borrow_mut();
        let id = TimerId(state.next_id());
        let due = state.now + delay;
        state.timers.push(SimTimer { id, due, callback });
        id
    }

    fn clear_timeout(&self, timer: TimerId) {
        self.state.borrow_mut().timers.retain(|t| t.id != timer);
    }

    fn now(&self) -> HostTime {
        self.state.borrow().now
    }
}

impl fmt::Debug for SimHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("SimHost")
            .field("now", &state.now)
            .field("turn", &state.turn)
            .field("timers", &state.timers.len())
            .field(
                "listeners",
                &state
                    .listeners
                    .iter()
                    .map(|l| (l.target, l.event.as_str()))
                    .collect::<Vec<_>>(),
            )
            .field("inline", &state.inline)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::Cell;

    use super::*;

    fn log_into(log: &Rc<RefCell<Vec<u32>>>, n: u32) -> HostCallback {
        let log = Rc::clone(log);
        Box::new(move || log.borrow_mut().push(n))
    }

    #[test]
    fn timers_run_in_due_then_registration_order() {
        let host = SimHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        host.set_timeout(Duration(20), log_into(&log, 1));
        host.set_timeout(Duration(10), log_into(&log, 2));
        host.set_timeout(Duration(10), log_into(&log, 3));
        host.set_timeout(Duration::ZERO, log_into(&log, 4));

        assert_eq!(host.run_due(), 1);
        assert_eq!(*log.borrow(), [4]);
        assert_eq!(host.advance(Duration(15)), 2);
        assert_eq!(host.now(), HostTime(15));
        assert_eq!(host.run_until_idle(), 1);
        assert_eq!(*log.borrow(), [4, 2, 3, 1]);
        assert_eq!(host.now(), HostTime(20));
    }

    #[test]
    fn cleared_timer_never_runs() {
        let host = SimHost::new();
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let id = host.set_timeout(Duration(5), Box::new(move || flag.set(true)));
        host.clear_timeout(id);
        host.clear_timeout(id);
        host.run_until_idle();
        assert!(!ran.get());
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn listeners_are_one_shot_and_per_target() {
        let host = SimHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        host.listen_transition_end(&SimTarget(1), "transitionend", log_into(&log, 1));
        let removed =
            host.listen_transition_end(&SimTarget(1), "transitionend", log_into(&log, 2));
        host.listen_transition_end(&SimTarget(2), "transitionend", log_into(&log, 3));
        host.unlisten(&SimTarget(1), removed);

        assert_eq!(host.fire_transition_end(SimTarget(1)), 1);
        assert_eq!(host.fire_transition_end(SimTarget(1)), 0);
        assert_eq!(*log.borrow(), [1]);
        assert_eq!(host.listener_count(SimTarget(2)), 1);
    }

    #[test]
    fn styles_fall_back_to_computed() {
        let host = SimHost::new();
        let t = SimTarget(0);
        host.set_computed(t, "left", "10px");
        assert_eq!(host.current_style(&t, "left").as_deref(), Some("10px"));
        host.set_style(&t, "left", "20px");
        assert_eq!(host.current_style(&t, "left").as_deref(), Some("20px"));
        host.set_style(&t, "left", "");
        assert_eq!(host.inline_style(&t, "left"), None);
        assert_eq!(
            host.writes_of(t, "left")
                .into_iter()
                .map(|w| w.value)
                .collect::<Vec<_>>(),
            vec![String::from("20px"), String::new()]
        );
    }

    #[test]
    fn zero_delay_timers_scheduled_while_running_run_on_a_later_turn() {
        let host = Rc::new(SimHost::new());
        let log = Rc::new(RefCell::new(Vec::new()));
        let inner_host = Rc::clone(&host);
        let inner_log = Rc::clone(&log);
        host.set_timeout(
            Duration::ZERO,
            Box::new(move || {
                let turn = inner_host.turn();
                inner_log.borrow_mut().push(1);
                let log = Rc::clone(&inner_log);
                let h = Rc::clone(&inner_host);
                inner_host.set_timeout(
                    Duration::ZERO,
                    Box::new(move || {
                        assert!(h.turn() > turn);
                        log.borrow_mut().push(2);
                    }),
                );
            }),
        );
        assert_eq!(host.run_due(), 2);
        assert_eq!(*log.borrow(), [1, 2]);
    }
}
