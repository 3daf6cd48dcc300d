use foundation::math::{Vec2, Vec3, stable_total_cmp_f64};
use serde::{Deserialize, Serialize};

use crate::EntityKind;
use crate::window::SlidingWindow;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub kind: PointerKind,
}

impl Pointer {
    /// Sentinel for "no pointer over the canvas".
    pub const OFF_SCREEN: Pointer = Pointer {
        x: -9999.0,
        y: -9999.0,
        kind: PointerKind::Mouse,
    };

    pub fn new(x: f64, y: f64, kind: PointerKind) -> Self {
        Self { x, y, kind }
    }

    pub fn is_off_screen(&self) -> bool {
        self.x == Self::OFF_SCREEN.x && self.y == Self::OFF_SCREEN.y
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

impl Default for Pointer {
    fn default() -> Self {
        Self::OFF_SCREEN
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// What a backend intersection landed on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PickTarget {
    /// The globe surface. Occludes everything behind it.
    Globe,
    Spike(usize),
    Arc(usize),
    Landmark,
}

impl PickTarget {
    /// Tie-break at equal distance; the globe sorts after anything touching it.
    fn tie_rank(self) -> u8 {
        match self {
            PickTarget::Arc(_) => 0,
            PickTarget::Spike(_) => 1,
            PickTarget::Landmark => 2,
            PickTarget::Globe => 3,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Intersection {
    pub target: PickTarget,
    /// Distance along the ray.
    pub distance: f64,
    pub point: Vec3,
}

/// What the renderer may report hits for this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickCandidates {
    pub arcs: Vec<usize>,
    pub spikes: Vec<usize>,
    pub landmark: bool,
}

impl PickCandidates {
    pub fn clear(&mut self) {
        self.arcs.clear();
        self.spikes.clear();
        self.landmark = false;
    }
}

/// Renderer-side hit testing.
pub trait PickBackend {
    /// Ray through the pointer, or `None` if the pointer maps to no ray.
    fn screen_ray(&self, pointer: &Pointer) -> Option<Ray>;

    /// Appends every intersection of `ray` with the globe and `candidates`.
    /// Order does not matter.
    fn intersect(&self, ray: &Ray, candidates: &PickCandidates, out: &mut Vec<Intersection>);
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct PickResult {
    pub kind: EntityKind,
    /// `None` for the landmark.
    pub data_index: Option<usize>,
    /// Pointer position the popup anchors to.
    pub screen_anchor: ScreenPoint,
}

/// Serializable screen position.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl From<Vec2> for ScreenPoint {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PickOutcome {
    /// Not a pick frame; the previous result stands.
    Skipped,
    Resolved(Option<PickResult>),
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickConfig {
    /// Intersections farther than this are ignored.
    pub max_distance: f64,
    pub landmark_enabled: bool,
}

impl Default for PickConfig {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
            landmark_enabled: true,
        }
    }
}

/// Throttled pointer picking against the animated set.
///
/// Ordering contract:
/// - Intersections are ordered nearest first with a total float ordering;
///   equal distances keep `Arc < Spike < Landmark < Globe`.
/// - Everything at or behind the first globe hit is occluded.
/// - Among the rest, an arc inside the window beats a spike inside the
///   window, which beats the landmark.
#[derive(Debug)]
pub struct PickController {
    config: PickConfig,
    frequency: u32,
    hits: Vec<Intersection>,
}

impl PickController {
    pub fn new(config: PickConfig, frequency: u32) -> Self {
        Self {
            config,
            frequency: frequency.max(1),
            hits: Vec::new(),
        }
    }

    pub fn frequency(&self) -> u32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: u32) {
        self.frequency = frequency.max(1);
    }

    pub fn config(&self) -> &PickConfig {
        &self.config
    }

    pub fn is_pick_frame(&self, frame_index: u64) -> bool {
        frame_index % u64::from(self.frequency) == 0
    }

    pub fn maybe_pick<B: PickBackend + ?Sized>(
        &mut self,
        frame_index: u64,
        pointer: &Pointer,
        window: &SlidingWindow,
        candidates: &PickCandidates,
        backend: &B,
    ) -> PickOutcome {
        if !self.is_pick_frame(frame_index) {
            return PickOutcome::Skipped;
        }
        if pointer.is_off_screen() {
            return PickOutcome::Resolved(None);
        }
        let Some(ray) = backend.screen_ray(pointer) else {
            return PickOutcome::Resolved(None);
        };

        self.hits.clear();
        backend.intersect(&ray, candidates, &mut self.hits);
        PickOutcome::Resolved(resolve_hits(
            &mut self.hits,
            window,
            pointer.position(),
            &self.config,
        ))
    }
}

pub fn resolve_hits(
    hits: &mut Vec<Intersection>,
    window: &SlidingWindow,
    anchor: Vec2,
    config: &PickConfig,
) -> Option<PickResult> {
    hits.retain(|h| h.distance >= 0.0 && h.distance <= config.max_distance);
    hits.sort_by(|a, b| {
        stable_total_cmp_f64(a.distance, b.distance)
            .then_with(|| a.target.tie_rank().cmp(&b.target.tie_rank()))
    });

    let front = hits
        .iter()
        .position(|h| h.target == PickTarget::Globe)
        .unwrap_or(hits.len());
    let front = &hits[..front];

    let in_window = |target: PickTarget| match target {
        PickTarget::Arc(i) | PickTarget::Spike(i) => window.is_index_visible(i),
        PickTarget::Landmark => config.landmark_enabled,
        PickTarget::Globe => false,
    };
    let first = |want: fn(PickTarget) -> bool| {
        front
            .iter()
            .map(|h| h.target)
            .find(|&t| want(t) && in_window(t))
    };

    let target = first(|t| matches!(t, PickTarget::Arc(_)))
        .or_else(|| first(|t| matches!(t, PickTarget::Spike(_))))
        .or_else(|| first(|t| t == PickTarget::Landmark))?;

    let (kind, data_index) = match target {
        PickTarget::Arc(i) => (EntityKind::Arc, Some(i)),
        PickTarget::Spike(i) => (EntityKind::Spike, Some(i)),
        PickTarget::Landmark | PickTarget::Globe => (EntityKind::Landmark, None),
    };
    Some(PickResult {
        kind,
        data_index,
        screen_anchor: anchor.into(),
    })
}
