use foundation::math::Vec3;

use crate::config::VisibilityConfig;

/// Per-marker result of the horizon test.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerVisibility {
    /// In `[0, 1]`.
    pub opacity: f64,
    /// Whether the marker may receive pointer input.
    pub interactive: bool,
}

impl MarkerVisibility {
    pub const HIDDEN: Self = Self {
        opacity: 0.0,
        interactive: false,
    };
}

/// Horizon fade for markers on a sphere centered at the origin.
///
/// Uses the cosine between the camera direction and the marker direction as a
/// cheap occlusion proxy: no ray casts against the globe mesh. The fade is a
/// soft band rather than a hard cut at the horizon so markers don't pop as
/// the globe turns.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VisibilityEvaluator {
    config: VisibilityConfig,
}

impl VisibilityEvaluator {
    pub fn new(config: VisibilityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    /// Opacity for unit vectors `camera_dir` and `marker_dir`.
    pub fn opacity(&self, camera_dir: Vec3, marker_dir: Vec3) -> f64 {
        self.opacity_for_dot(camera_dir.dot(marker_dir))
    }

    /// Piecewise-linear ramp from `hidden_cutoff` (0) to `visible_cutoff` (1).
    /// Monotonic non-decreasing in `dot`.
    pub fn opacity_for_dot(&self, dot: f64) -> f64 {
        let VisibilityConfig {
            visible_cutoff,
            hidden_cutoff,
            ..
        } = self.config;

        if dot.is_nan() {
            0.0
        } else if dot > visible_cutoff {
            1.0
        } else if dot < hidden_cutoff {
            0.0
        } else {
            ((dot - hidden_cutoff) / (visible_cutoff - hidden_cutoff)).clamp(0.0, 1.0)
        }
    }

    pub fn is_interactive(&self, opacity: f64) -> bool {
        opacity > self.config.interaction_threshold
    }

    pub fn evaluate(&self, camera_dir: Vec3, marker_dir: Vec3) -> MarkerVisibility {
        let opacity = self.opacity(camera_dir, marker_dir);
        MarkerVisibility {
            opacity,
            interactive: self.is_interactive(opacity),
        }
    }
}

impl Default for VisibilityEvaluator {
    fn default() -> Self {
        Self::new(VisibilityConfig::default())
    }
}
