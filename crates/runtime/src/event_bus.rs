use crate::quality::{QualitySettings, QualityTier};

/// Why the host should replace the globe with its static fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// Rolling frame-rate average fell under the emergency floor.
    LowFrameRate { average_fps: f64 },
    /// The renderer lost its context.
    ContextLost,
    /// Neither the primary nor the fallback dataset could be used.
    DataUnavailable(String),
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FallbackReason::LowFrameRate { average_fps } => {
                write!(f, "frame rate collapsed (average {average_fps:.1} fps)")
            }
            FallbackReason::ContextLost => write!(f, "rendering context lost"),
            FallbackReason::DataUnavailable(msg) => write!(f, "no usable dataset: {msg}"),
        }
    }
}

/// Signals the core raises for its host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Ready { records: usize },
    QualityChanged {
        tier: QualityTier,
        settings: QualitySettings,
    },
    Paused,
    Resumed,
    /// Terminal: show the static fallback. Nothing ticks after this.
    Fallback(FallbackReason),
    Disposed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub frame_index: u64,
    pub event: HostEvent,
}

/// Ordered queue of host events, drained by the host once per frame.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, frame_index: u64, event: HostEvent) {
        self.events.push(Event { frame_index, event });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
