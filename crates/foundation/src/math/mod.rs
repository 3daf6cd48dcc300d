pub mod curve;
pub mod geodesy;
pub mod scalar;
pub mod vec;

pub use curve::*;
pub use geodesy::*;
pub use scalar::*;
pub use vec::*;
