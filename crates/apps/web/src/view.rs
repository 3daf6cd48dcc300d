//! JSON shapes exchanged with the page.
//!
//! Everything here is plain data so it can be exercised without a browser.

use foundation::math::{Vec3, project_latlon};
use runtime::event_bus::{Event, FallbackReason, HostEvent};
use runtime::quality::{QualitySettings, QualityTier};
use scene::animator::{EntityAnimator, RenderVariant, Renderable};
use scene::picking::{Intersection, PickCandidates, PickTarget};
use scene::shapes::EntityShape;
use scene::window::SlidingWindow;
use serde::{Deserialize, Serialize};
use session::GlobeSession;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EventView {
    Ready {
        frame: u64,
        records: usize,
    },
    QualityChanged {
        frame: u64,
        tier: QualityTier,
        settings: QualitySettings,
    },
    Paused {
        frame: u64,
    },
    Resumed {
        frame: u64,
    },
    Fallback {
        frame: u64,
        reason: String,
    },
    Disposed {
        frame: u64,
    },
}

impl From<&Event> for EventView {
    fn from(e: &Event) -> Self {
        let frame = e.frame_index;
        match &e.event {
            HostEvent::Ready { records } => EventView::Ready {
                frame,
                records: *records,
            },
            HostEvent::QualityChanged { tier, settings } => EventView::QualityChanged {
                frame,
                tier: *tier,
                settings: *settings,
            },
            HostEvent::Paused => EventView::Paused { frame },
            HostEvent::Resumed => EventView::Resumed { frame },
            HostEvent::Fallback(reason) => EventView::Fallback {
                frame,
                reason: fallback_code(reason).to_string(),
            },
            HostEvent::Disposed => EventView::Disposed { frame },
        }
    }
}

fn fallback_code(reason: &FallbackReason) -> &'static str {
    match reason {
        FallbackReason::LowFrameRate { .. } => "low_frame_rate",
        FallbackReason::ContextLost => "context_lost",
        FallbackReason::DataUnavailable(_) => "data_unavailable",
    }
}

/// One drawable instance as the renderer wants it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceView {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub highlight: bool,
}

impl From<Renderable> for InstanceView {
    fn from(r: Renderable) -> Self {
        Self {
            index: r.data_index,
            start: r.draw_start,
            end: r.draw_end,
            highlight: r.variant == RenderVariant::Highlight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingView {
    pub index: usize,
    pub scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowView {
    pub center: f64,
    pub half_width: usize,
    pub draw_start: usize,
    pub draw_end: usize,
}

impl From<&SlidingWindow> for WindowView {
    fn from(w: &SlidingWindow) -> Self {
        let draw = w.draw_range();
        Self {
            center: w.center(),
            half_width: w.half_width(),
            draw_start: draw.start,
            draw_end: draw.end,
        }
    }
}

/// Per-frame draw state.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FrameView {
    pub window: Option<WindowView>,
    pub arcs: Vec<InstanceView>,
    pub spikes: Vec<InstanceView>,
    /// Landing rings under retracted arcs.
    pub arc_rings: Vec<RingView>,
    /// Shrinking bases of retiring spikes.
    pub spike_rings: Vec<RingView>,
    pub landmark: LandmarkView,
}

/// World position of the landmark marker.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LandmarkView {
    pub position: [f64; 3],
    pub highlighted: bool,
}

fn rings<S: EntityShape>(animator: &EntityAnimator<S>) -> Vec<RingView> {
    animator
        .fade_rings()
        .map(|r| RingView {
            index: r.data_index,
            scale: r.scale,
        })
        .collect()
}

impl FrameView {
    pub fn capture<H>(session: &GlobeSession<H>) -> Self
    where
        H: scene::picking::PickBackend + foundation::time::Clock,
    {
        let config = session.config();
        let position = project_latlon(config.landmark.location(), config.radius);
        let mut view = FrameView {
            window: session.window().map(WindowView::from),
            landmark: LandmarkView {
                position: [position.x, position.y, position.z],
                highlighted: session.landmark_highlighted(),
            },
            ..FrameView::default()
        };
        if let Some(arcs) = session.arcs() {
            view.arcs = arcs.renderables().map(InstanceView::from).collect();
            view.arc_rings = rings(arcs);
        }
        if let Some(spikes) = session.spikes() {
            view.spikes = spikes.renderables().map(InstanceView::from).collect();
            view.spike_rings = rings(spikes);
        }
        view
    }
}

/// Candidate set handed to the page's ray caster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidatesView<'a> {
    pub x: f64,
    pub y: f64,
    pub arcs: &'a [usize],
    pub spikes: &'a [usize],
    pub landmark: bool,
}

impl<'a> CandidatesView<'a> {
    pub fn new(x: f64, y: f64, candidates: &'a PickCandidates) -> Self {
        Self {
            x,
            y,
            arcs: &candidates.arcs,
            spikes: &candidates.spikes,
            landmark: candidates.landmark,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitTarget {
    Globe,
    Arc,
    Spike,
    Landmark,
}

/// One intersection reported back by the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HitView {
    pub target: HitTarget,
    #[serde(default)]
    pub index: Option<usize>,
    pub distance: f64,
}

impl HitView {
    /// Arc and spike hits without an index are dropped.
    pub fn into_intersection(self) -> Option<Intersection> {
        let target = match (self.target, self.index) {
            (HitTarget::Globe, _) => PickTarget::Globe,
            (HitTarget::Landmark, _) => PickTarget::Landmark,
            (HitTarget::Arc, Some(i)) => PickTarget::Arc(i),
            (HitTarget::Spike, Some(i)) => PickTarget::Spike(i),
            _ => return None,
        };
        Some(Intersection {
            target,
            distance: self.distance,
            point: Vec3::default(),
        })
    }
}

/// Parses the ray caster's reply. Malformed replies count as no hits.
pub fn parse_hits(json: &str) -> Vec<Intersection> {
    match serde_json::from_str::<Vec<HitView>>(json) {
        Ok(hits) => hits
            .into_iter()
            .filter_map(HitView::into_intersection)
            .collect(),
        Err(err) => {
            tracing::warn!(%err, "ignoring malformed pick reply");
            Vec::new()
        }
    }
}
