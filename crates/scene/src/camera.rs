//! Camera transition controller.
//!
//! Every frame the controller picks a target from the current selection and
//! closes part of the gap with exponential damping. The fraction covered per
//! step is `1 - exp(-k * dt)`, so the motion depends on elapsed time only,
//! never on how that time was sliced into frames.

use foundation::math::{GeoPoint, Vec3};
use runtime::{damp_vec3, rate_from_halflife};

use crate::config::CameraConfig;

/// Point the camera always looks at.
pub const ORIGIN: Vec3 = Vec3::ZERO;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            look_at: ORIGIN,
        }
    }

    pub fn distance(&self) -> f64 {
        self.position.length()
    }
}

/// Outcome of a single controller step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CameraUpdate {
    /// No target engaged; the pose was left alone.
    Idle,
    /// Moved toward `target`.
    Tracking { target: Vec3 },
    /// Already within the arrival epsilon of the location target.
    Arrived,
}

#[derive(Debug, Clone)]
pub struct CameraTransitionController {
    pose: CameraPose,
    config: CameraConfig,
    rate: f64,
}

impl CameraTransitionController {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            pose: CameraPose::new(config.initial_position()),
            rate: rate_from_halflife(config.halflife_s),
            config,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Direct pose access for orbit controls running earlier in the frame.
    pub fn pose_mut(&mut self) -> &mut CameraPose {
        &mut self.pose
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Where the camera should head for the given selection, if anywhere.
    ///
    /// With nothing selected the camera is pushed back out to the orbit
    /// distance along its current direction, but only while it sits inside
    /// `close_threshold`. Beyond that the orbit controls own the pose.
    pub fn target_for(&self, selected: Option<&GeoPoint>) -> Option<Vec3> {
        match selected {
            Some(geo) => Some(geo.to_sphere(self.config.focus_distance)),
            None => {
                if self.pose.distance() >= self.config.close_threshold {
                    return None;
                }
                let dir = self.pose.position.try_normalize().unwrap_or(Vec3::Z);
                Some(dir * self.config.orbit_distance)
            }
        }
    }

    pub fn update(&mut self, dt_s: f64, selected: Option<GeoPoint>) -> CameraUpdate {
        let outcome = match self.target_for(selected.as_ref()) {
            None => CameraUpdate::Idle,
            Some(target)
                if selected.is_some()
                    && self.pose.position.distance(target) <= self.config.arrival_epsilon =>
            {
                CameraUpdate::Arrived
            }
            Some(target) => {
                self.pose.position = damp_vec3(self.pose.position, target, self.rate, dt_s);
                CameraUpdate::Tracking { target }
            }
        };
        self.pose.look_at = ORIGIN;
        outcome
    }
}
