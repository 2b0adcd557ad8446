//! Frame-batched layout recomputation.
//!
//! Any number of invalidations between two display frames collapse into a
//! single pass. The scheduler is either idle (nothing queued, no frame
//! requested) or pending (flags queued, exactly one frame requested).

use derive_more::{Display, From, Into};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, From, Into)]
pub struct FrameTicket(u64);

/// What a layout pass needs to recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Invalidation {
    pub wheel: bool,
    pub panel: bool,
}

impl Invalidation {
    pub const NONE: Self = Self {
        wheel: false,
        panel: false,
    };
    pub const WHEEL: Self = Self {
        wheel: true,
        panel: false,
    };
    pub const PANEL: Self = Self {
        wheel: false,
        panel: true,
    };
    pub const ALL: Self = Self {
        wheel: true,
        panel: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.wheel && !self.panel
    }
}

impl BitOr for Invalidation {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            wheel: self.wheel || rhs.wheel,
            panel: self.panel || rhs.panel,
        }
    }
}

impl BitOrAssign for Invalidation {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

/// Source of "run on the next display frame" callbacks.
///
/// The host delivers a requested frame by handing its ticket back to the
/// engine; a cancelled ticket may still be delivered and is then ignored.
pub trait FrameClock {
    fn request_frame(&mut self) -> FrameTicket;
    fn cancel_frame(&mut self, ticket: FrameTicket);
}

#[derive(Debug, Default)]
pub struct LayoutScheduler {
    pending: Invalidation,
    ticket: Option<FrameTicket>,
}

impl LayoutScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.ticket.is_some()
    }

    /// Queues `what` for the next frame, requesting one only when idle.
    pub fn invalidate(&mut self, clock: &mut impl FrameClock, what: Invalidation) {
        if what.is_empty() {
            return;
        }
        self.pending |= what;
        if self.ticket.is_none() {
            self.ticket = Some(clock.request_frame());
        }
    }

    /// Called when a frame arrives. Returns the work to run, or `None` if the
    /// ticket is not the one currently pending.
    pub fn take_frame(&mut self, ticket: FrameTicket) -> Option<Invalidation> {
        if self.ticket != Some(ticket) {
            return None;
        }
        self.ticket = None;
        Some(std::mem::take(&mut self.pending))
    }

    /// Drops the pending frame and returns everything owed, merged with `what`,
    /// for the caller to run synchronously.
    pub fn flush_now(&mut self, clock: &mut impl FrameClock, what: Invalidation) -> Invalidation {
        self.cancel_pending(clock) | what
    }

    /// Cancels the pending frame, returning the flags it would have run.
    pub fn cancel_pending(&mut self, clock: &mut impl FrameClock) -> Invalidation {
        if let Some(ticket) = self.ticket.take() {
            clock.cancel_frame(ticket);
        }
        std::mem::take(&mut self.pending)
    }
}

#[derive(Debug, Default)]
struct ClockState {
    next: u64,
    due: VecDeque<FrameTicket>,
}

/// Frame clock driven by the host: it records requests and the host drains
/// them with [`ManualClock::take_due`] on every display tick. Clones share
/// state, so the host keeps one handle while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ClockState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_due(&self) -> Option<FrameTicket> {
        self.state.lock().due.pop_front()
    }

    pub fn peek_due(&self) -> Option<FrameTicket> {
        self.state.lock().due.front().copied()
    }

    pub fn has_due(&self) -> bool {
        !self.state.lock().due.is_empty()
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) -> FrameTicket {
        let mut state = self.state.lock();
        state.next += 1;
        let ticket = FrameTicket(state.next);
        state.due.push_back(ticket);
        ticket
    }

    fn cancel_frame(&mut self, ticket: FrameTicket) {
        self.state.lock().due.retain(|t| *t != ticket);
    }
}
