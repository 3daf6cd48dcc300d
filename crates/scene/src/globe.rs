//! Lighting parameters for the globe surface shader.

use foundation::math::Vec3;

/// Viewport height the scene is authored for.
pub const BASE_HEIGHT: f64 = 850.0;
pub const GLOBE_RADIUS: f64 = 25.0;

/// Scale applied to the globe container for a viewport of `height` pixels.
pub fn container_scale(height: f64) -> f64 {
    if height.is_finite() && height >= 1.0 {
        BASE_HEIGHT / height
    } else {
        BASE_HEIGHT
    }
}

/// Uniform block for the globe material. Setters mark the block dirty; the
/// renderer uploads and calls `take_dirty`.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobeParams {
    shadow_point: Vec3,
    highlight_point: Vec3,
    front_point: Vec3,
    shadow_dist: f64,
    highlight_dist: f64,
    pub highlight_color: u32,
    pub front_highlight_color: u32,
    pub water_color: u32,
    pub land_color: u32,
    dirty: bool,
}

impl GlobeParams {
    pub fn new(radius: f64) -> Self {
        let mut params = Self {
            shadow_point: Vec3::ZERO,
            highlight_point: Vec3::ZERO,
            front_point: Vec3::ZERO,
            shadow_dist: 0.0,
            highlight_dist: 0.0,
            highlight_color: 0x517966,
            front_highlight_color: 0x27367d,
            water_color: 0x171634,
            land_color: 0xffffff,
            dirty: true,
        };
        params.layout(Vec3::ZERO, radius, 1.0);
        params
    }

    /// Recomputes the light points around the container after a resize.
    pub fn layout(&mut self, container_center: Vec3, radius: f64, container_scale: f64) {
        let r = radius * container_scale;
        self.set_shadow_point(container_center + Vec3::new(r * 0.7, -r * 0.3, r));
        self.set_highlight_point(container_center + Vec3::new(-r * 1.5, -r * 1.5, 0.0));
        self.set_front_point(container_center + Vec3::new(0.0, 0.0, r));
        self.set_shadow_dist(r * 1.5);
        self.set_highlight_dist(5.0 * container_scale);
    }

    pub fn shadow_point(&self) -> Vec3 {
        self.shadow_point
    }

    pub fn highlight_point(&self) -> Vec3 {
        self.highlight_point
    }

    pub fn front_point(&self) -> Vec3 {
        self.front_point
    }

    pub fn shadow_dist(&self) -> f64 {
        self.shadow_dist
    }

    pub fn highlight_dist(&self) -> f64 {
        self.highlight_dist
    }

    pub fn set_shadow_point(&mut self, p: Vec3) {
        self.dirty |= self.shadow_point != p;
        self.shadow_point = p;
    }

    pub fn set_highlight_point(&mut self, p: Vec3) {
        self.dirty |= self.highlight_point != p;
        self.highlight_point = p;
    }

    pub fn set_front_point(&mut self, p: Vec3) {
        self.dirty |= self.front_point != p;
        self.front_point = p;
    }

    pub fn set_shadow_dist(&mut self, d: f64) {
        self.dirty |= self.shadow_dist != d;
        self.shadow_dist = d;
    }

    pub fn set_highlight_dist(&mut self, d: f64) {
        self.dirty |= self.highlight_dist != d;
        self.highlight_dist = d;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether an upload is needed and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }
}
