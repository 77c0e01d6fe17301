//! Countdown that decides when a view's caches are fetched again
//!
//! Each view owns a countdown. The front end calls [`RefreshScheduler::tick`]
//! from a fixed-rate timer for the view that is on screen; when the countdown
//! runs out the scheduler hands out a [`RefreshTicket`] and refuses to start
//! another cycle for that view until the ticket comes back through
//! [`RefreshScheduler::complete`].

use std::collections::HashMap;
use std::time::Duration;

use log::debug;

use super::view::View;

/// Where a view's countdown stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Counting down, time left is non-zero
    Idle,
    /// Countdown reached zero; the next unobscured tick starts a cycle
    Due,
    /// A cycle is running; further due signals are ignored
    Fetching,
}

/// Proof that a refresh cycle was started; hand it back when the cycle ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub view: View,
    cycle: u64,
}

#[derive(Debug, Clone, Copy)]
struct RefreshState {
    remaining: Duration,
    in_flight: Option<u64>,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    interval: Duration,
    states: HashMap<View, RefreshState>,
    next_cycle: u64,
}

impl RefreshScheduler {
    /// Every view starts due, so the first tick on a view fetches it
    pub fn new(interval: Duration) -> Self {
        let states = View::ALL
            .iter()
            .map(|view| {
                (
                    *view,
                    RefreshState {
                        remaining: Duration::ZERO,
                        in_flight: None,
                    },
                )
            })
            .collect();
        Self {
            interval,
            states,
            next_cycle: 1,
        }
    }

    fn state_mut(&mut self, view: View) -> &mut RefreshState {
        self.states.entry(view).or_insert(RefreshState {
            remaining: Duration::ZERO,
            in_flight: None,
        })
    }

    pub fn phase(&self, view: View) -> Phase {
        match self.states.get(&view) {
            Some(state) if state.in_flight.is_some() => Phase::Fetching,
            Some(state) if !state.remaining.is_zero() => Phase::Idle,
            _ => Phase::Due,
        }
    }

    /// Time left before the view is due
    pub fn remaining(&self, view: View) -> Duration {
        self.states
            .get(&view)
            .map(|s| s.remaining)
            .unwrap_or(Duration::ZERO)
    }

    pub fn is_fetching(&self, view: View) -> bool {
        self.phase(view) == Phase::Fetching
    }

    /// Advance the active view's countdown by `elapsed`.
    ///
    /// While `obscured` (a modal input form is open) the countdown is frozen and
    /// no cycle starts. Returns a ticket when a cycle must start now.
    pub fn tick(&mut self, view: View, elapsed: Duration, obscured: bool) -> Option<RefreshTicket> {
        let cycle = self.next_cycle;
        let state = self.state_mut(view);

        if state.in_flight.is_some() || obscured {
            return None;
        }

        state.remaining = state.remaining.saturating_sub(elapsed);
        if !state.remaining.is_zero() {
            return None;
        }

        state.in_flight = Some(cycle);
        self.next_cycle += 1;
        debug!("Refresh cycle {} started for {}", cycle, view);
        Some(RefreshTicket { view, cycle })
    }

    /// Make the view due on its next tick.
    ///
    /// Ignored while a cycle for the view is running; repeated calls before the
    /// next tick still produce a single cycle.
    pub fn force(&mut self, view: View) {
        let state = self.state_mut(view);
        if state.in_flight.is_none() {
            state.remaining = Duration::ZERO;
        }
    }

    pub fn force_all(&mut self) {
        for view in View::ALL {
            self.force(view);
        }
    }

    /// Forget every running cycle and make all views due.
    ///
    /// Used when the backend changes underneath the caches: tickets handed out
    /// before the reset no longer complete, so their results are discarded.
    pub fn reset(&mut self) {
        for state in self.states.values_mut() {
            state.in_flight = None;
            state.remaining = Duration::ZERO;
        }
        debug!("Refresh state reset, every view is due");
    }

    /// Finish a cycle and restart the countdown from the full interval.
    ///
    /// Returns false (and changes nothing) for a ticket that is not the running one.
    pub fn complete(&mut self, ticket: RefreshTicket) -> bool {
        let interval = self.interval;
        let state = self.state_mut(ticket.view);
        if state.in_flight != Some(ticket.cycle) {
            return false;
        }
        state.in_flight = None;
        state.remaining = interval;
        debug!("Refresh cycle {} finished for {}", ticket.cycle, ticket.view);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_secs(10);
    const TICK: Duration = Duration::from_millis(250);

    fn settled() -> (RefreshScheduler, RefreshTicket) {
        let mut scheduler = RefreshScheduler::new(INTERVAL);
        let ticket = scheduler.tick(View::Devices, TICK, false).unwrap();
        assert!(scheduler.complete(ticket));
        (scheduler, ticket)
    }

    #[test]
    fn test_reset_discards_running_cycle() {
        let mut scheduler = RefreshScheduler::new(INTERVAL);
        let running = scheduler.tick(View::IpAddresses, TICK, false).unwrap();
        scheduler.tick(View::Vlans, TICK, false).unwrap();

        scheduler.reset();
        assert_eq!(scheduler.phase(View::IpAddresses), Phase::Due);
        assert_eq!(scheduler.phase(View::Vlans), Phase::Due);
        assert!(!scheduler.complete(running));

        let fresh = scheduler.tick(View::IpAddresses, TICK, false).unwrap();
        assert_ne!(fresh, running);
        assert!(scheduler.complete(fresh));
        assert_eq!(scheduler.remaining(View::IpAddresses), INTERVAL);
    }

    #[test]
    fn test_first_tick_is_due() {
        let mut scheduler = RefreshScheduler::new(INTERVAL);
        assert_eq!(scheduler.phase(View::IpAddresses), Phase::Due);
        assert!(scheduler.tick(View::IpAddresses, TICK, false).is_some());
        assert_eq!(scheduler.phase(View::IpAddresses), Phase::Fetching);
    }

    #[test]
    fn test_countdown_decreases_then_fires_once() {
        let (mut scheduler, _) = settled();
        assert_eq!(scheduler.remaining(View::Devices), INTERVAL);

        let mut tickets = 0;
        for _ in 0..(INTERVAL.as_millis() / TICK.as_millis()) {
            let before = scheduler.remaining(View::Devices);
            if scheduler.tick(View::Devices, TICK, false).is_some() {
                tickets += 1;
            } else {
                assert!(scheduler.remaining(View::Devices) < before);
            }
        }
        assert_eq!(tickets, 1);
        assert!(scheduler.is_fetching(View::Devices));
    }

    #[test]
    fn test_obscured_view_freezes_countdown() {
        let (mut scheduler, _) = settled();
        for _ in 0..1000 {
            assert!(scheduler.tick(View::Devices, TICK, true).is_none());
        }
        assert_eq!(scheduler.remaining(View::Devices), INTERVAL);

        // A forced refresh also waits for the modal to close
        scheduler.force(View::Devices);
        assert!(scheduler.tick(View::Devices, TICK, true).is_none());
        assert!(scheduler.tick(View::Devices, TICK, false).is_some());
    }

    #[test]
    fn test_force_fires_on_next_tick_only_once() {
        let (mut scheduler, _) = settled();
        scheduler.force(View::Devices);
        scheduler.force(View::Devices);
        assert_eq!(scheduler.phase(View::Devices), Phase::Due);

        assert!(scheduler.tick(View::Devices, TICK, false).is_some());
        assert!(scheduler.tick(View::Devices, TICK, false).is_none());
    }

    #[test]
    fn test_no_overlapping_cycles() {
        let mut scheduler = RefreshScheduler::new(INTERVAL);
        let first = scheduler.tick(View::Devices, TICK, false).unwrap();

        // Two more due signals while the first cycle is still running
        scheduler.force(View::Devices);
        assert!(scheduler.tick(View::Devices, INTERVAL, false).is_none());
        scheduler.force(View::Devices);
        assert!(scheduler.tick(View::Devices, INTERVAL, false).is_none());

        assert!(scheduler.complete(first));
        // The coalesced signals do not leave a pending cycle behind
        assert_eq!(scheduler.phase(View::Devices), Phase::Idle);
        assert!(scheduler.tick(View::Devices, TICK, false).is_none());
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let (mut scheduler, stale) = settled();
        scheduler.force(View::Devices);
        let current = scheduler.tick(View::Devices, TICK, false).unwrap();

        assert!(!scheduler.complete(stale));
        assert!(scheduler.is_fetching(View::Devices));
        assert!(scheduler.complete(current));
    }

    #[test]
    fn test_views_count_down_independently() {
        let (mut scheduler, _) = settled();
        assert_eq!(scheduler.phase(View::Vlans), Phase::Due);
        assert_eq!(scheduler.phase(View::Devices), Phase::Idle);
        let vlan = scheduler.tick(View::Vlans, TICK, false).unwrap();
        assert_eq!(vlan.view, View::Vlans);
        assert_eq!(scheduler.phase(View::Devices), Phase::Idle);
    }
}
