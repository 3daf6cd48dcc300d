pub mod config;
pub mod globe_session;
pub mod loading;
pub mod popup;

pub use config::*;
pub use globe_session::*;
pub use loading::*;
pub use popup::*;
