pub mod animator;
pub mod density;
pub mod globe;
pub mod picking;
pub mod shapes;
pub mod window;

use serde::Serialize;

pub use animator::*;
pub use globe::*;
pub use picking::*;
pub use shapes::*;
pub use window::*;

/// Kinds of pickable thing on the globe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Spike,
    Arc,
    Landmark,
}
