pub mod event_bus;
pub mod frame;
pub mod lifecycle;
pub mod metrics;
pub mod quality;
pub mod resize;

pub use event_bus::*;
pub use frame::*;
pub use lifecycle::*;
pub use quality::*;
pub use resize::*;
