use foundation::Handle;

/// Lifecycle of one animated record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Inactive,
    Entering,
    Holding,
    Reversing,
    Exiting,
    Retiring,
}

impl Phase {
    /// Phases that own a handle from the primary pool.
    pub fn holds_primary(self) -> bool {
        matches!(
            self,
            Phase::Entering | Phase::Holding | Phase::Reversing | Phase::Exiting
        )
    }
}

/// Per-record animation state. Identity is the dataset index it is stored at.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimatedEntity {
    pub phase: Phase,
    /// Fraction of geometry drawn: rises while entering, falls while reversing.
    pub progress: f64,
    pub hold_remaining: f64,
    /// Seconds spent retiring.
    pub fade_elapsed: f64,
    pub enter_s: f64,
    pub hold_s: f64,
    /// Primary handle in Entering..=Exiting, fade handle while Retiring.
    pub(crate) handle: Option<Handle>,
}

impl AnimatedEntity {
    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn is_inactive(&self) -> bool {
        self.phase == Phase::Inactive
    }

    /// Drawn span of the geometry as `(start, end)` fractions.
    pub fn draw_span(&self) -> (f64, f64) {
        match self.phase {
            Phase::Entering => (0.0, self.progress),
            Phase::Holding => (0.0, 1.0),
            Phase::Reversing => (1.0 - self.progress, 1.0),
            _ => (0.0, 0.0),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderVariant {
    Normal,
    Highlight,
}

/// One drawable instance backed by a primary pool slot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Renderable {
    pub handle: Handle,
    pub data_index: usize,
    pub draw_start: f64,
    pub draw_end: f64,
    pub variant: RenderVariant,
}

/// Landing ring left behind after the geometry retracts.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FadeRing {
    pub handle: Handle,
    pub data_index: usize,
    /// Shrinks from 1 to 0 over the fade.
    pub scale: f64,
}
