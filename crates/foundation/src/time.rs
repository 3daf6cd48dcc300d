/// Time primitives
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct Time(pub f64); // seconds

impl Time {
    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Seconds elapsed since `earlier` (negative if `earlier` is in the future).
    pub fn since(self, earlier: Time) -> f64 {
        self.0 - earlier.0
    }

    pub fn offset(self, seconds: f64) -> Time {
        Time(self.0 + seconds)
    }
}

/// Monotonic time source supplied by the host.
pub trait Clock {
    fn now(&self) -> Time;
}

/// Clock driven by hand, for tests and headless simulation.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ManualClock {
    now: Time,
}

impl ManualClock {
    pub fn new(start: Time) -> Self {
        Self { now: start }
    }

    pub fn advance(&mut self, seconds: f64) {
        self.now = self.now.offset(seconds.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock, Time};

    #[test]
    fn manual_clock_only_moves_forward() {
        let mut clock = ManualClock::new(Time(1.0));
        clock.advance(0.5);
        clock.advance(-3.0);
        assert_eq!(clock.now(), Time(1.5));
        assert_eq!(clock.now().since(Time(1.0)), 0.5);
    }
}
