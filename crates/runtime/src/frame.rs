use foundation::time::Time;

/// Frame metadata handed to every per-frame step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time for this frame (seconds).
    pub dt_s: f64,
    /// Accumulated running time at the start of the frame (seconds).
    pub time: Time,
}

/// Stoppable frame clock.
///
/// While stopped no frames are produced and no time accumulates. The first
/// frame after `start` carries a zero delta so the gap spent stopped is never
/// replayed into animations.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameClock {
    running: bool,
    skip_next_delta: bool,
    next_index: u64,
    elapsed_s: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            running: true,
            skip_next_delta: false,
            next_index: 0,
            elapsed_s: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn start(&mut self) {
        if !self.running {
            self.running = true;
            self.skip_next_delta = true;
        }
    }

    /// Index the next produced frame will carry.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    pub fn advance(&mut self, dt_s: f64) -> Option<Frame> {
        if !self.running {
            return None;
        }
        let mut dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        if self.skip_next_delta {
            self.skip_next_delta = false;
            dt_s = 0.0;
        }
        let frame = Frame {
            index: self.next_index,
            dt_s,
            time: Time(self.elapsed_s),
        };
        self.next_index += 1;
        self.elapsed_s += dt_s;
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::FrameClock;
    use foundation::time::Time;

    #[test]
    fn frames_accumulate_time() {
        let mut clock = FrameClock::new();
        let f0 = clock.advance(0.5).expect("running");
        let f1 = clock.advance(0.25).expect("running");
        assert_eq!(f0.index, 0);
        assert_eq!(f1.index, 1);
        assert_eq!(f1.time, Time(0.5));
    }

    #[test]
    fn stopped_clock_produces_nothing_and_resumes_with_zero_delta() {
        let mut clock = FrameClock::new();
        clock.advance(0.1);
        clock.stop();
        assert!(clock.advance(10.0).is_none());
        clock.start();
        let f = clock.advance(10.0).expect("running");
        assert_eq!(f.dt_s, 0.0);
        assert_eq!(f.index, 1);
        assert_eq!(clock.advance(0.1).expect("running").dt_s, 0.1);
    }

    #[test]
    fn garbage_deltas_are_zeroed() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(f64::NAN).expect("running").dt_s, 0.0);
        assert_eq!(clock.advance(-1.0).expect("running").dt_s, 0.0);
    }
}
