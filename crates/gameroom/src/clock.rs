use arena_core::Position;
use std::time::Duration;
use tokio::time::Instant;

/// How the decision clock treats a disconnected actor.
///
/// Wall-clock is simpler and fair on latency: the countdown runs no matter
/// what, so a crashed bot times out like a slow one. Pause-on-disconnect is
/// fair on crashes: the hand waits for the seat to come back (or for an
/// operator override), which is what a curated tournament wants. The
/// operator-controlled default therefore pauses; `auto` timeout mode runs
/// on the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPolicy {
    WallClock,
    PauseOnDisconnect,
}

impl std::str::FromStr for ClockPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wall" => Ok(Self::WallClock),
            "pause" => Ok(Self::PauseOnDisconnect),
            other => Err(format!("unknown clock policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockState {
    Idle,
    Running { seat: Position, deadline: Instant },
    Paused { seat: Position, remaining: Duration },
}

/// Per-turn decision countdown.
///
/// One logical timer exists per active turn. A zero budget disables the
/// clock entirely: turns then wait for an action or an operator skip.
#[derive(Debug)]
pub struct Clock {
    budget: Duration,
    policy: ClockPolicy,
    state: ClockState,
}

impl Clock {
    pub fn new(move_time_ms: u64, policy: ClockPolicy) -> Self {
        Self {
            budget: Duration::from_millis(move_time_ms),
            policy,
            state: ClockState::Idle,
        }
    }
    pub fn enabled(&self) -> bool {
        !self.budget.is_zero()
    }
    pub fn policy(&self) -> ClockPolicy {
        self.policy
    }
    /// Starts a fresh countdown for the acting seat.
    pub fn arm(&mut self, seat: Position) {
        self.arm_with(seat, self.budget);
    }
    /// Starts a countdown with an explicit budget (reconnect resume).
    pub fn arm_with(&mut self, seat: Position, remaining: Duration) {
        if self.enabled() {
            self.state = ClockState::Running {
                seat,
                deadline: Instant::now() + remaining,
            };
        }
    }
    pub fn cancel(&mut self) {
        self.state = ClockState::Idle;
    }
    /// Freezes the countdown when the acting seat drops, keeping the
    /// remaining time. No-op under the wall-clock policy.
    pub fn pause(&mut self, seat: Position) {
        if self.policy != ClockPolicy::PauseOnDisconnect {
            return;
        }
        if let ClockState::Running {
            seat: acting,
            deadline,
        } = self.state
        {
            if acting == seat {
                self.state = ClockState::Paused {
                    seat,
                    remaining: deadline.saturating_duration_since(Instant::now()),
                };
                log::info!("[clock] paused for P{}", seat);
            }
        }
    }
    /// Resumes a paused countdown with its remaining milliseconds.
    pub fn resume(&mut self, seat: Position) {
        if let ClockState::Paused {
            seat: paused,
            remaining,
        } = self.state
        {
            if paused == seat {
                self.state = ClockState::Running {
                    seat,
                    deadline: Instant::now() + remaining,
                };
                log::info!("[clock] resumed for P{}", seat);
            }
        }
    }
    /// Seat currently on the clock, running or paused.
    pub fn seat(&self) -> Option<Position> {
        match self.state {
            ClockState::Idle => None,
            ClockState::Running { seat, .. } | ClockState::Paused { seat, .. } => Some(seat),
        }
    }
    /// Deadline to sleep on; `None` while idle or paused.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            ClockState::Running { deadline, .. } => Some(deadline),
            _ => None,
        }
    }
    /// Milliseconds left on the current turn, or the full budget when no
    /// turn is armed.
    pub fn remaining_ms(&self) -> u64 {
        match self.state {
            ClockState::Idle => self.budget.as_millis() as u64,
            ClockState::Running { deadline, .. } => {
                deadline.saturating_duration_since(Instant::now()).as_millis() as u64
            }
            ClockState::Paused { remaining, .. } => remaining.as_millis() as u64,
        }
    }
}
