use foundation::time::Time;

/// Quiet period before a resize is applied.
pub const RESIZE_DEBOUNCE_S: f64 = 0.15;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }
}

/// Coalesces bursts of resize signals into one.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeDebouncer {
    delay_s: f64,
    pending: Option<(Time, ViewportSize)>,
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE_S)
    }
}

impl ResizeDebouncer {
    pub fn new(delay_s: f64) -> Self {
        Self {
            delay_s,
            pending: None,
        }
    }

    /// Records a resize; restarts the quiet period.
    pub fn signal(&mut self, now: Time, size: ViewportSize) {
        self.pending = Some((now, size));
    }

    /// Returns the latest size once the quiet period has elapsed.
    pub fn poll(&mut self, now: Time) -> Option<ViewportSize> {
        let (at, size) = self.pending?;
        if now.since(at) < self.delay_s {
            return None;
        }
        self.pending = None;
        Some(size)
    }
}

#[cfg(test)]
mod tests {
    use super::{ResizeDebouncer, ViewportSize};
    use foundation::time::Time;

    #[test]
    fn burst_collapses_to_last_size() {
        let mut d = ResizeDebouncer::new(0.15);
        d.signal(Time(0.0), ViewportSize::new(100.0, 100.0));
        d.signal(Time(0.1), ViewportSize::new(200.0, 150.0));
        assert_eq!(d.poll(Time(0.2)), None);
        assert_eq!(d.poll(Time(0.3)), Some(ViewportSize::new(200.0, 150.0)));
        assert_eq!(d.poll(Time(1.0)), None);
    }
}
