use std::fmt;

use runtime::SpringConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum CarouselError {
    Parse(String),
    InvalidConfig {
        field: &'static str,
        reason: String,
    },
}

impl fmt::Display for CarouselError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarouselError::Parse(msg) => write!(f, "carousel config parse error: {msg}"),
            CarouselError::InvalidConfig { field, reason } => {
                write!(f, "invalid carousel config `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for CarouselError {}

/// Layout and feel of a carousel. Angles are in degrees, lengths in pixels.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    pub item_width: f64,
    pub gap: f64,
    pub arc_radius: f64,
    /// Items rendered on each side of the center.
    pub visible_window: u32,
    /// Angle at which an item has faded out completely.
    pub fade_window: f64,
    /// Angle at which the scale boost has dropped to zero.
    pub scale_window: f64,
    pub scale_boost: f64,
    pub drag_sensitivity: f64,
    /// Items closer than this to the front are drawn highlighted.
    pub highlight_window: f64,
    /// Largest rotation a single drag event may apply.
    pub max_drag_step_deg: f64,
    /// Cap on the drag speed handed to the settle spring (degrees/s).
    pub max_release_speed_deg: f64,
    /// Spring used after a drag, a click or a step button.
    pub settle_spring: SpringConfig,
    /// Spring used when the value changes from outside.
    pub sync_spring: SpringConfig,
}

impl CarouselConfig {
    pub fn from_json(json: &str) -> Result<Self, CarouselError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| CarouselError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Angle between neighbouring items: arc length `item_width + gap` on a
    /// circle of `arc_radius`.
    pub fn angle_step_deg(&self) -> f64 {
        ((self.item_width + self.gap) / self.arc_radius).to_degrees()
    }

    pub fn validate(&self) -> Result<(), CarouselError> {
        let positive = [
            ("item_width", self.item_width),
            ("arc_radius", self.arc_radius),
            ("fade_window", self.fade_window),
            ("scale_window", self.scale_window),
            ("drag_sensitivity", self.drag_sensitivity),
            ("max_drag_step_deg", self.max_drag_step_deg),
            ("max_release_speed_deg", self.max_release_speed_deg),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(invalid(field, "must be positive and finite"));
            }
        }
        for (field, value) in [
            ("gap", self.gap),
            ("scale_boost", self.scale_boost),
            ("highlight_window", self.highlight_window),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be non-negative and finite"));
            }
        }
        if !self.settle_spring.is_valid() {
            return Err(invalid("settle_spring", "invalid spring parameters"));
        }
        if !self.sync_spring.is_valid() {
            return Err(invalid("sync_spring", "invalid spring parameters"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> CarouselError {
    CarouselError::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            item_width: 200.0,
            gap: 60.0,
            arc_radius: 800.0,
            visible_window: 5,
            fade_window: 25.0,
            scale_window: 20.0,
            scale_boost: 0.4,
            drag_sensitivity: 2.0,
            highlight_window: 3.0,
            max_drag_step_deg: 45.0,
            max_release_speed_deg: 1500.0,
            settle_spring: SpringConfig::new(200.0, 30.0),
            sync_spring: SpringConfig::new(300.0, 30.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CarouselConfig, CarouselError};
    use pretty_assertions::assert_eq;

    #[test]
    fn default_step_is_arc_length_angle() {
        let config = CarouselConfig::default();
        let expected = (260.0_f64 / 800.0).to_degrees();
        assert!((config.angle_step_deg() - expected).abs() < 1e-12);
        assert!((config.angle_step_deg() - 18.621).abs() < 1e-3);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = CarouselConfig::from_json(r#"{ "arc_radius": 400, "gap": 0 }"#).unwrap();
        assert_eq!(config.arc_radius, 400.0);
        assert_eq!(config.gap, 0.0);
        assert_eq!(config.item_width, 200.0);
        assert_eq!(config.settle_spring.stiffness, 200.0);
    }

    #[test]
    fn rejects_zero_radius() {
        let err = CarouselConfig::from_json(r#"{ "arc_radius": 0 }"#).unwrap_err();
        assert!(matches!(
            err,
            CarouselError::InvalidConfig {
                field: "arc_radius",
                ..
            }
        ));
    }
}
