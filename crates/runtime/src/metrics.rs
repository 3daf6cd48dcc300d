use std::collections::BTreeMap;

use serde::Serialize;

/// Things the frame loop counts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Frames,
    Spawned,
    /// Index had no visual (filtered record, arc too short).
    SpawnSkippedNoVisual,
    /// Index was still animating from a previous pass.
    SpawnSkippedBusy,
    /// Pool had no free slot.
    SpawnSkippedPoolFull,
    Retired,
    PicksCast,
    PicksThrottled,
    PickHits,
    QualityStepDowns,
}

/// Deterministic frame-loop metrics.
///
/// Counters are keyed in a `BTreeMap` so snapshots have a stable order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Metrics {
    counters: BTreeMap<Counter, u64>,
    fps: Histogram,
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct Histogram {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl Histogram {
    pub fn record(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        self.sum += value;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub counters: Vec<(Counter, u64)>,
    pub fps: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.counters.clear();
        self.fps = Histogram::default();
    }

    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    pub fn inc(&mut self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&mut self, counter: Counter, by: u64) {
        *self.counters.entry(counter).or_insert(0) += by;
    }

    pub fn record_fps(&mut self, fps: f64) {
        self.fps.record(fps);
    }

    pub fn fps(&self) -> Histogram {
        self.fps
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self.counters.iter().map(|(k, v)| (*k, *v)).collect(),
            fps: self.fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Counter, Histogram, Metrics};
    use pretty_assertions::assert_eq;

    #[test]
    fn counters_accumulate() {
        let mut m = Metrics::new();
        m.inc(Counter::Spawned);
        m.add(Counter::Spawned, 2);
        assert_eq!(m.counter(Counter::Spawned), 3);
        assert_eq!(m.counter(Counter::Retired), 0);
    }

    #[test]
    fn histogram_tracks_min_max_mean() {
        let mut h = Histogram::default();
        assert_eq!(h.mean(), None);
        h.record(60.0);
        h.record(30.0);
        h.record(45.0);
        assert_eq!(h.count, 3);
        assert_eq!(h.min, 30.0);
        assert_eq!(h.max, 60.0);
        assert_eq!(h.mean(), Some(45.0));
    }

    #[test]
    fn snapshot_is_stably_sorted() {
        let mut m = Metrics::new();
        m.inc(Counter::PickHits);
        m.inc(Counter::Frames);
        m.inc(Counter::Spawned);
        let snap = m.snapshot();
        assert_eq!(
            snap.counters,
            vec![
                (Counter::Frames, 1),
                (Counter::Spawned, 1),
                (Counter::PickHits, 1)
            ]
        );
    }
}
