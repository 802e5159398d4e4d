//! Per-question countdown and the pre-game tick-down.
//!
//! Neither type owns a timer; the play engine feeds them ticks from a single
//! interval so ticks and player input never interleave.

/// Seconds of the priming tick-down before the first question.
pub const COUNTDOWN_SECS: u32 = 3;

/// What a single tick did to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Counted down; carries the new remaining value.
    Ticked(u32),
    /// Reached zero on this tick.
    Expired,
    /// Frozen or stopped, nothing changed.
    Idle,
}

/// Countdown for one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClock {
    remaining: u32,
    frozen: bool,
    stopped: bool,
}

impl SessionClock {
    pub fn start(question_time: u32) -> Self {
        Self {
            remaining: question_time,
            frozen: false,
            stopped: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn tick(&mut self) -> ClockTick {
        if self.stopped || self.frozen {
            return ClockTick::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.stopped = true;
            ClockTick::Expired
        } else {
            ClockTick::Ticked(self.remaining)
        }
    }

    /// Halt the countdown at its current value for the rest of the question.
    /// Returns `false` if the clock had already stopped.
    pub fn freeze(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        self.frozen = true;
        true
    }

    /// Stop for good; later ticks are ignored.
    pub fn stop(&mut self) {
        self.stopped = true;
    }
}

/// The 3-2-1 tick-down before question one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
}

impl Countdown {
    pub fn new(secs: u32) -> Self {
        Self { remaining: secs }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Count down one step and return the new value.
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_to_expiry() {
        let mut clock = SessionClock::start(3);
        assert_eq!(clock.tick(), ClockTick::Ticked(2));
        assert_eq!(clock.tick(), ClockTick::Ticked(1));
        assert_eq!(clock.tick(), ClockTick::Expired);
        assert!(clock.is_stopped());
        assert_eq!(clock.tick(), ClockTick::Idle);
        assert_eq!(clock.remaining(), 0);
    }

    #[test]
    fn stopped_clock_ignores_ticks() {
        let mut clock = SessionClock::start(20);
        clock.tick();
        clock.stop();
        assert_eq!(clock.tick(), ClockTick::Idle);
        assert_eq!(clock.remaining(), 19);
    }

    #[test]
    fn freeze_holds_value_without_refund() {
        let mut clock = SessionClock::start(20);
        for _ in 0..5 {
            clock.tick();
        }
        assert!(clock.freeze());
        for _ in 0..100 {
            assert_eq!(clock.tick(), ClockTick::Idle);
        }
        assert_eq!(clock.remaining(), 15);
    }

    #[test]
    fn freeze_after_stop_is_rejected() {
        let mut clock = SessionClock::start(20);
        clock.stop();
        assert!(!clock.freeze());
        assert!(!clock.is_frozen());
    }

    #[test]
    fn countdown_reaches_zero_in_three_ticks() {
        let mut c = Countdown::new(COUNTDOWN_SECS);
        assert_eq!(c.tick(), 2);
        assert_eq!(c.tick(), 1);
        assert!(!c.is_done());
        assert_eq!(c.tick(), 0);
        assert!(c.is_done());
        assert_eq!(c.tick(), 0);
    }
}
