use std::ops::Range;

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Indices visible on each side of the center.
    pub half_width: usize,
    /// Starting center; `None` starts at `half_width`.
    pub start_center: Option<f64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            half_width: 60,
            start_center: None,
        }
    }
}

/// Result of one window step.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowAdvance {
    pub center: f64,
    /// Indices the leading edge passed during this step.
    ///
    /// On wrap the range is expressed after the jump back: it ends at the new
    /// leading edge and starts where the old edge would sit, shifted by the
    /// same amount.
    pub crossed: Range<usize>,
    pub wrapped: bool,
}

/// A moving `[center - hw, center + hw]` band over a padded, ordered dataset.
///
/// Invariant: `0 <= center < max_index` for any non-empty dataset. The center
/// wraps back to `half_width` when it would reach `max_index - half_width`.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingWindow {
    center: f64,
    max_index: usize,
    half_width: usize,
    advance_speed: f64,
}

impl SlidingWindow {
    pub fn new(max_index: usize, half_width: usize, advance_speed: f64, start_center: f64) -> Self {
        let half_width = clamp_half_width(max_index, half_width);
        let limit = max_index.saturating_sub(half_width) as f64;
        let center = if start_center.is_finite() && start_center >= 0.0 && start_center < limit {
            start_center
        } else {
            half_width as f64
        };
        Self {
            center,
            max_index,
            half_width,
            advance_speed,
        }
    }

    pub fn from_config(max_index: usize, config: &WindowConfig, advance_speed: f64) -> Self {
        let start = config.start_center.unwrap_or(config.half_width as f64);
        Self::new(max_index, config.half_width, advance_speed, start)
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn max_index(&self) -> usize {
        self.max_index
    }

    pub fn half_width(&self) -> usize {
        self.half_width
    }

    pub fn advance_speed(&self) -> f64 {
        self.advance_speed
    }

    pub fn set_advance_speed(&mut self, speed: f64) {
        if speed.is_finite() && speed >= 0.0 {
            self.advance_speed = speed;
        }
    }

    /// Index the leading edge currently sits on.
    pub fn leading_edge(&self) -> usize {
        self.center.floor() as usize + self.half_width
    }

    pub fn advance(&mut self, delta_s: f64) -> WindowAdvance {
        let step = if delta_s.is_finite() && delta_s > 0.0 {
            delta_s * self.advance_speed
        } else {
            0.0
        };
        let old_edge = self.leading_edge();
        self.center += step;

        let limit = self.max_index.saturating_sub(self.half_width) as f64;
        if self.center >= limit {
            self.center = self.half_width as f64;
            let shift = self.max_index - 2 * self.half_width;
            let new_edge = self.leading_edge();
            let start = (old_edge + 1).saturating_sub(shift).min(new_edge);
            return WindowAdvance {
                center: self.center,
                crossed: start..(new_edge + 1).min(self.max_index),
                wrapped: true,
            };
        }

        let new_edge = self.leading_edge();
        let start = (old_edge + 1).min(self.max_index);
        let end = (new_edge + 1).min(self.max_index).max(start);
        WindowAdvance {
            center: self.center,
            crossed: start..end,
            wrapped: false,
        }
    }

    pub fn is_index_visible(&self, index: usize) -> bool {
        let i = index as f64;
        let hw = self.half_width as f64;
        self.center - hw <= i && i <= self.center + hw
    }

    /// Integer indices currently inside the window, clipped to the dataset.
    pub fn visible_range(&self) -> Range<usize> {
        let hw = self.half_width as f64;
        let start = (self.center - hw).ceil().max(0.0) as usize;
        let end = ((self.center + hw).floor() as usize + 1).min(self.max_index);
        start.min(end)..end
    }

    /// Instance range a renderer should draw: `2 * hw` items from the trailing edge.
    pub fn draw_range(&self) -> Range<usize> {
        let start = (self.center - self.half_width as f64)
            .max(0.0)
            .min(self.max_index as f64) as usize;
        let end = (start + 2 * self.half_width).min(self.max_index);
        start..end
    }
}

fn clamp_half_width(max_index: usize, half_width: usize) -> usize {
    // Keeps `half_width < max_index - half_width` so the wrap target is reachable.
    half_width.min(max_index.saturating_sub(1) / 2)
}
