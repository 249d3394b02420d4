//! Tunables for the globe. Every constant that shapes the feel of the scene
//! lives here and can be overridden from a JSON file.

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Parse(String),
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "config malformed: {msg}"),
            ConfigError::Invalid { field, reason } => write!(f, "config `{field}` {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {value}")))
    }
}

fn require_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, "must be finite"))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera position at session start.
    pub initial_position: [f64; 3],
    /// Distance from the center when framing a selected location.
    ///
    /// Product revisions disagree here (zoom in vs. keep the orbit distance);
    /// set this equal to `orbit_distance` for the latter.
    pub focus_distance: f64,
    /// Default world-view orbit distance.
    pub orbit_distance: f64,
    /// With nothing selected, the camera is pulled back out only while it is
    /// closer than this.
    pub close_threshold: f64,
    /// Time to halve the remaining distance to the target (seconds).
    pub halflife_s: f64,
    /// Once this close to a location target, stop adjusting.
    pub arrival_epsilon: f64,
}

impl CameraConfig {
    pub fn initial_position(&self) -> Vec3 {
        let [x, y, z] = self.initial_position;
        Vec3::new(x, y, z)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_position().is_finite() {
            return Err(ConfigError::invalid(
                "camera.initial_position",
                "must be finite",
            ));
        }
        require_positive("camera.focus_distance", self.focus_distance)?;
        require_positive("camera.orbit_distance", self.orbit_distance)?;
        require_positive("camera.close_threshold", self.close_threshold)?;
        require_positive("camera.halflife_s", self.halflife_s)?;
        require_finite("camera.arrival_epsilon", self.arrival_epsilon)?;
        if self.arrival_epsilon < 0.0 {
            return Err(ConfigError::invalid(
                "camera.arrival_epsilon",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            initial_position: [0.0, 0.0, 3.5],
            focus_distance: 2.0,
            orbit_distance: 3.5,
            close_threshold: 3.4,
            halflife_s: 0.5,
            arrival_epsilon: 0.01,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Dot product above which a marker is fully opaque.
    pub visible_cutoff: f64,
    /// Dot product below which a marker is fully hidden.
    pub hidden_cutoff: f64,
    /// Markers at or below this opacity ignore the pointer.
    pub interaction_threshold: f64,
}

impl VisibilityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("visibility.visible_cutoff", self.visible_cutoff)?;
        require_finite("visibility.hidden_cutoff", self.hidden_cutoff)?;
        if self.visible_cutoff <= self.hidden_cutoff {
            return Err(ConfigError::invalid(
                "visibility.visible_cutoff",
                format!(
                    "must exceed hidden_cutoff ({} <= {})",
                    self.visible_cutoff, self.hidden_cutoff
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.interaction_threshold) {
            return Err(ConfigError::invalid(
                "visibility.interaction_threshold",
                "must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            visible_cutoff: 0.2,
            hidden_cutoff: -0.1,
            interaction_threshold: 0.1,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub rotate_speed: f64,
    pub auto_rotate: bool,
    /// 1.0 is one full turn per minute.
    pub auto_rotate_speed: f64,
    /// Keeps the camera off the poles, where azimuth is undefined (degrees).
    pub polar_margin_deg: f64,
    /// Decay rate of drag inertia (1/s).
    pub inertia_damping: f64,
    /// Angular speed (rad/s) below which inertia stops.
    pub inertia_threshold: f64,
}

impl OrbitConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_finite("orbit.rotate_speed", self.rotate_speed)?;
        require_finite("orbit.auto_rotate_speed", self.auto_rotate_speed)?;
        if !(0.0..90.0).contains(&self.polar_margin_deg) {
            return Err(ConfigError::invalid(
                "orbit.polar_margin_deg",
                "must be within [0, 90)",
            ));
        }
        require_positive("orbit.inertia_damping", self.inertia_damping)?;
        require_finite("orbit.inertia_threshold", self.inertia_threshold)?;
        Ok(())
    }
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            rotate_speed: 0.5,
            auto_rotate: true,
            auto_rotate_speed: 0.5,
            polar_margin_deg: 1.0,
            inertia_damping: 4.0,
            inertia_threshold: 0.001,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub sphere_radius: f64,
    /// Markers float just above the surface so they never z-fight the mesh.
    pub marker_radius: f64,
    pub camera: CameraConfig,
    pub visibility: VisibilityConfig,
    pub orbit: OrbitConfig,
}

impl GlobeConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("sphere_radius", self.sphere_radius)?;
        require_positive("marker_radius", self.marker_radius)?;
        self.camera.validate()?;
        if self.camera.orbit_distance <= self.sphere_radius {
            return Err(ConfigError::invalid(
                "camera.orbit_distance",
                "must lie outside the sphere",
            ));
        }
        self.visibility.validate()?;
        self.orbit.validate()
    }
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            sphere_radius: 1.0,
            marker_radius: 1.001,
            camera: CameraConfig::default(),
            visibility: VisibilityConfig::default(),
            orbit: OrbitConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GlobeConfig};

    #[test]
    fn defaults_are_valid() {
        assert_eq!(GlobeConfig::default().validate(), Ok(()));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            GlobeConfig::from_json(r#"{"camera":{"focus_distance":3.5},"marker_radius":1.02}"#)
                .unwrap();
        assert_eq!(config.camera.focus_distance, 3.5);
        assert_eq!(config.camera.orbit_distance, 3.5);
        assert_eq!(config.marker_radius, 1.02);
        assert_eq!(config.visibility.visible_cutoff, 0.2);
    }

    #[test]
    fn inverted_cutoffs_are_rejected() {
        let err = GlobeConfig::from_json(
            r#"{"visibility":{"visible_cutoff":-0.2,"hidden_cutoff":0.1}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "visibility.visible_cutoff",
                ..
            }
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            GlobeConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            GlobeConfig::from_json(r#"{"camera":{"halflife_s":0}}"#),
            Err(ConfigError::Invalid {
                field: "camera.halflife_s",
                ..
            })
        ));
    }
}
