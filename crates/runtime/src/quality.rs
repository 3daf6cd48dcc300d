//! Frame-rate monitoring and the discrete quality ladder.
//!
//! Tiers only ever step down during a session. The single way back to
//! `Regular` is constructing a fresh controller, which happens at session start.

use std::collections::VecDeque;

use foundation::time::Time;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    Lowest = 1,
    Low = 2,
    Medium = 3,
    Regular = 4,
}

impl QualityTier {
    pub fn level(self) -> u8 {
        self as u8
    }

    /// Next tier down; `Lowest` is the floor.
    pub fn lower(self) -> QualityTier {
        match self {
            QualityTier::Regular => QualityTier::Medium,
            QualityTier::Medium => QualityTier::Low,
            QualityTier::Low | QualityTier::Lowest => QualityTier::Lowest,
        }
    }

    pub fn settings(self, config: &QualityConfig) -> QualitySettings {
        let speed = config.base_advance_speed;
        let pick = config.base_pick_frequency.max(1);
        match self {
            QualityTier::Regular => QualitySettings {
                tier: self,
                pixel_ratio: PixelRatio::Device,
                advance_speed: speed,
                pick_frequency: pick,
                world_dots: None,
            },
            QualityTier::Medium => QualitySettings {
                tier: self,
                pixel_ratio: PixelRatio::AtMost(1.85),
                advance_speed: speed * 13.0 / 15.0,
                pick_frequency: pick + 2,
                world_dots: None,
            },
            QualityTier::Low => QualitySettings {
                tier: self,
                pixel_ratio: PixelRatio::AtMost(1.5),
                advance_speed: speed / 3.0 * 2.0,
                pick_frequency: pick + 4,
                world_dots: Some(WorldDots {
                    rows: config.world_dot_rows.saturating_sub(20),
                    dot_size: 0.1,
                }),
            },
            QualityTier::Lowest => QualitySettings {
                tier: self,
                pixel_ratio: PixelRatio::Fixed(1.0),
                advance_speed: speed / 3.0,
                pick_frequency: pick + 6,
                world_dots: Some(WorldDots {
                    rows: config.world_dot_rows.saturating_sub(60),
                    dot_size: 0.1,
                }),
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub enum PixelRatio {
    Device,
    AtMost(f64),
    Fixed(f64),
}

impl PixelRatio {
    pub fn resolve(self, device_ratio: f64) -> f64 {
        match self {
            PixelRatio::Device => device_ratio,
            PixelRatio::AtMost(cap) => device_ratio.min(cap),
            PixelRatio::Fixed(ratio) => ratio,
        }
    }
}

/// Rebuilt world-dot mesh density for the low tiers.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct WorldDots {
    pub rows: u32,
    pub dot_size: f64,
}

/// Everything a tier reconfigures.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct QualitySettings {
    pub tier: QualityTier,
    pub pixel_ratio: PixelRatio,
    /// Sliding-window advance in indices per second.
    pub advance_speed: f64,
    /// Pick on every Nth frame.
    pub pick_frequency: u32,
    /// `None` keeps the default world map.
    pub world_dots: Option<WorldDots>,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub target_fps: f64,
    /// Fraction of the target still considered on-target (60 * 0.875 = 52.5).
    pub sensitivity: f64,
    /// Consecutive below-target frames before stepping down.
    pub warning_threshold: u32,
    pub emergency_fps: f64,
    /// Rolling window length, in frames.
    pub sample_window: usize,
    pub base_advance_speed: f64,
    pub base_pick_frequency: u32,
    pub world_dot_rows: u32,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            sensitivity: 0.875,
            warning_threshold: 50,
            emergency_fps: 12.0,
            sample_window: 10,
            base_advance_speed: 15.0,
            base_pick_frequency: 10,
            world_dot_rows: 200,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum QualityEvent {
    StepDown {
        from: QualityTier,
        to: QualityTier,
        settings: QualitySettings,
    },
    /// Fatal. The controller stops sampling.
    Emergency { average_fps: f64 },
}

#[derive(Debug, Clone)]
pub struct QualityController {
    config: QualityConfig,
    tier: QualityTier,
    samples: VecDeque<f64>,
    last: Option<Time>,
    streak: u32,
    halted: bool,
}

impl QualityController {
    pub fn new(config: QualityConfig) -> Self {
        let window = config.sample_window.max(1);
        Self {
            config,
            tier: QualityTier::Regular,
            samples: VecDeque::with_capacity(window),
            last: None,
            streak: 0,
            halted: false,
        }
    }

    pub fn tier(&self) -> QualityTier {
        self.tier
    }

    pub fn settings(&self) -> QualitySettings {
        self.tier.settings(&self.config)
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Current below-target streak length.
    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn rolling_average(&self) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }
        Some(self.samples.iter().sum::<f64>() / self.samples.len() as f64)
    }

    /// Takes one frame timestamp. The first call after construction or
    /// `suspend` only arms the timer.
    pub fn sample(&mut self, now: Time) -> Option<QualityEvent> {
        if self.halted {
            return None;
        }
        let Some(last) = self.last.replace(now) else {
            return None;
        };
        let elapsed = now.since(last);
        if elapsed <= 0.0 || !elapsed.is_finite() {
            return None;
        }
        self.observe_fps((1.0 / elapsed).round())
    }

    /// Feeds one instantaneous frame-rate sample.
    pub fn observe_fps(&mut self, fps: f64) -> Option<QualityEvent> {
        if self.halted {
            return None;
        }
        let window = self.config.sample_window.max(1);
        if self.samples.len() == window {
            self.samples.pop_front();
        }
        self.samples.push_back(fps);
        if self.samples.len() < window {
            return None;
        }

        let average = self.rolling_average().unwrap_or(fps);
        if average < self.config.emergency_fps {
            self.halted = true;
            tracing::error!(average, "frame rate below emergency floor");
            return Some(QualityEvent::Emergency {
                average_fps: average,
            });
        }

        if average >= self.config.target_fps * self.config.sensitivity {
            self.streak = 0;
            return None;
        }

        self.streak += 1;
        if self.streak < self.config.warning_threshold {
            return None;
        }

        self.streak = 0;
        self.samples.clear();
        let from = self.tier;
        let to = from.lower();
        if to == from {
            return None;
        }
        self.tier = to;
        let settings = self.settings();
        tracing::info!(?from, ?to, average, "stepping render quality down");
        Some(QualityEvent::StepDown { from, to, settings })
    }

    /// Forgets timing state so a pause gap is never read as a slow frame.
    pub fn suspend(&mut self) {
        self.last = None;
        self.samples.clear();
        self.streak = 0;
    }
}
