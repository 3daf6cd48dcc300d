pub mod handles;
pub mod math;
pub mod pool;
pub mod time;

// Foundation crate: small, well-tested primitives only.
pub use handles::*;
pub use pool::*;
pub use time::*;
