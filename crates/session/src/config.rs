use runtime::quality::QualityConfig;
use scene::animator::AnimationConfig;
use scene::globe::GLOBE_RADIUS;
use scene::picking::PickConfig;
use scene::window::WindowConfig;
use serde::{Deserialize, Serialize};

use crate::popup::LandmarkCard;

/// Everything tunable about a globe session. Missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub radius: f64,
    /// Records duplicated at each end of the sequence.
    pub padding: usize,
    /// Seed for the record shuffle; random when absent.
    pub shuffle_seed: Option<u64>,
    pub window: WindowConfig,
    pub quality: QualityConfig,
    pub animation: AnimationConfig,
    pub pick: PickConfig,
    pub landmark: LandmarkCard,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radius: GLOBE_RADIUS,
            padding: formats::VISIBLE_COUNT,
            shuffle_seed: None,
            window: WindowConfig::default(),
            quality: QualityConfig::default(),
            animation: AnimationConfig::default(),
            pick: PickConfig::default(),
            landmark: LandmarkCard::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "invalid config JSON: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl GlobeConfig {
    pub fn from_json(payload: &str) -> Result<Self, ConfigError> {
        let config: GlobeConfig = serde_json::from_str(payload).map_err(ConfigError::Json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return invalid("radius must be positive");
        }
        if self.quality.sample_window == 0 {
            return invalid("quality.sample_window must be at least 1");
        }
        if !(self.quality.target_fps > 0.0) {
            return invalid("quality.target_fps must be positive");
        }
        for (name, a) in [
            ("animation.arcs", &self.animation.arcs),
            ("animation.spikes", &self.animation.spikes),
        ] {
            if a.capacity == 0 {
                return Err(ConfigError::Invalid(format!("{name}.capacity must be at least 1")));
            }
            if !(a.draw_rate > 0.0) {
                return Err(ConfigError::Invalid(format!("{name}.draw_rate must be positive")));
            }
        }
        Ok(())
    }
}
