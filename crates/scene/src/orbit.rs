//! Free orbit controls for the world view.
//!
//! The camera position is kept in spherical form around the origin: azimuth
//! `theta` measured from +Z toward +X and polar angle `phi` from +Y. Drags,
//! release inertia and auto-rotation all feed angle deltas; the distance is
//! never touched here.

use std::f64::consts::{PI, TAU};

use foundation::math::{Vec2, Vec3};

use crate::config::OrbitConfig;

const DEFAULT_VIEWPORT: Vec2 = Vec2 {
    x: 1280.0,
    y: 720.0,
};

#[derive(Debug, Clone)]
pub struct OrbitControls {
    config: OrbitConfig,
    viewport: Vec2,
    enabled: bool,
    dragging: bool,
    last_pos_px: Vec2,
    /// Drag rotation accumulated since the last update (radians).
    pending: Vec2,
    /// Angular velocity carried after release (rad/s).
    velocity: Vec2,
    inertia_active: bool,
}

impl OrbitControls {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            config,
            viewport: DEFAULT_VIEWPORT,
            enabled: true,
            dragging: false,
            last_pos_px: Vec2::ZERO,
            pending: Vec2::ZERO,
            velocity: Vec2::ZERO,
            inertia_active: false,
        }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    /// Disabling also drops any drag or inertia in progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.stop();
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_inertia_active(&self) -> bool {
        self.inertia_active
    }

    /// Returns `false` when the controls are disabled and ignore the press.
    pub fn on_pointer_down(&mut self, pos_px: Vec2) -> bool {
        if !self.enabled {
            return false;
        }
        self.inertia_active = false;
        self.velocity = Vec2::ZERO;
        self.dragging = true;
        self.last_pos_px = pos_px;
        true
    }

    pub fn on_pointer_move(&mut self, pos_px: Vec2) {
        if !self.dragging {
            return;
        }
        let delta = pos_px - self.last_pos_px;
        self.last_pos_px = pos_px;

        let per_px = TAU / self.viewport.y * self.config.rotate_speed;
        self.pending = self.pending - Vec2::new(delta.x * per_px, delta.y * per_px);
    }

    pub fn on_pointer_up(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.inertia_active = speed(self.velocity) > self.config.inertia_threshold;
        if !self.inertia_active {
            self.velocity = Vec2::ZERO;
        }
    }

    /// Cancel drag, inertia and any unapplied rotation.
    pub fn stop(&mut self) {
        self.dragging = false;
        self.inertia_active = false;
        self.velocity = Vec2::ZERO;
        self.pending = Vec2::ZERO;
    }

    /// Advance by `dt_s` and return the rotated camera position.
    pub fn update(&mut self, dt_s: f64, position: Vec3) -> Vec3 {
        if !self.enabled {
            return position;
        }

        let mut delta = std::mem::replace(&mut self.pending, Vec2::ZERO);
        if self.dragging {
            if dt_s > 0.0 {
                self.velocity = Vec2::new(delta.x / dt_s, delta.y / dt_s);
            }
        } else {
            if self.inertia_active {
                delta = delta + Vec2::new(self.velocity.x * dt_s, self.velocity.y * dt_s);
                let decay = (-self.config.inertia_damping * dt_s).exp();
                self.velocity = Vec2::new(self.velocity.x * decay, self.velocity.y * decay);
                if speed(self.velocity) < self.config.inertia_threshold {
                    self.inertia_active = false;
                    self.velocity = Vec2::ZERO;
                }
            }
            if self.config.auto_rotate {
                delta.x -= TAU / 60.0 * self.config.auto_rotate_speed * dt_s;
            }
        }

        if delta == Vec2::ZERO {
            return position;
        }
        self.rotate(position, delta)
    }

    fn rotate(&self, position: Vec3, delta: Vec2) -> Vec3 {
        let radius = position.length();
        if radius <= 1e-12 || !radius.is_finite() {
            return position;
        }
        let theta = position.x.atan2(position.z) + delta.x;
        let margin = self.config.polar_margin_deg.to_radians();
        let phi = ((position.y / radius).clamp(-1.0, 1.0).acos() + delta.y)
            .clamp(margin, PI - margin);

        Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        )
    }
}

fn speed(v: Vec2) -> f64 {
    v.x.hypot(v.y)
}

#[cfg(test)]
mod tests {
    use super::OrbitControls;
    use crate::config::OrbitConfig;
    use foundation::math::{Vec2, Vec3};

    fn still() -> OrbitConfig {
        OrbitConfig {
            auto_rotate: false,
            ..OrbitConfig::default()
        }
    }

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} vs {b} (eps {eps})");
    }

    #[test]
    fn auto_rotate_full_turn_per_minute() {
        let mut controls = OrbitControls::new(OrbitConfig {
            auto_rotate_speed: 1.0,
            ..OrbitConfig::default()
        });
        let start = Vec3::new(0.0, 0.0, 3.5);
        let mut pos = start;
        for _ in 0..600 {
            pos = controls.update(0.1, pos);
        }
        assert!(pos.distance(start) < 1e-9, "{pos:?}");

        // A quarter turn in 15 s swings +Z toward -X.
        let mut pos = start;
        for _ in 0..150 {
            pos = controls.update(0.1, pos);
        }
        assert_close(pos.x, -3.5, 1e-9);
        assert_close(pos.z, 0.0, 1e-9);
    }

    #[test]
    fn drag_rotates_and_keeps_distance() {
        let mut controls = OrbitControls::new(still());
        controls.set_viewport(1280.0, 720.0);
        assert!(controls.on_pointer_down(Vec2::new(100.0, 100.0)));
        controls.on_pointer_move(Vec2::new(200.0, 100.0));

        let pos = controls.update(1.0 / 60.0, Vec3::new(0.0, 0.0, 3.5));
        let expected = -std::f64::consts::TAU * 100.0 / 720.0 * 0.5;
        assert_close(pos.x.atan2(pos.z), expected, 1e-12);
        assert_close(pos.length(), 3.5, 1e-12);
        assert_close(pos.y, 0.0, 1e-12);
    }

    #[test]
    fn polar_angle_stays_off_the_poles() {
        let mut controls = OrbitControls::new(still());
        controls.on_pointer_down(Vec2::new(0.0, 0.0));
        controls.on_pointer_move(Vec2::new(0.0, 5000.0));
        let pos = controls.update(0.016, Vec3::new(0.0, 0.0, 3.5));
        assert_close(pos.y, 3.5 * 1f64.to_radians().cos(), 1e-12);
    }

    #[test]
    fn release_carries_inertia_until_it_decays() {
        let mut controls = OrbitControls::new(still());
        let mut pos = Vec3::new(0.0, 0.0, 3.5);
        controls.on_pointer_down(Vec2::new(0.0, 360.0));
        controls.on_pointer_move(Vec2::new(20.0, 360.0));
        pos = controls.update(1.0 / 60.0, pos);
        controls.on_pointer_up();
        assert!(controls.is_inertia_active());

        let released = pos;
        pos = controls.update(1.0 / 60.0, pos);
        assert!(pos.x < released.x, "keeps turning the same way");

        for _ in 0..1200 {
            pos = controls.update(1.0 / 60.0, pos);
        }
        assert!(!controls.is_inertia_active());
        let rest = pos;
        assert_eq!(controls.update(1.0 / 60.0, pos), rest);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut controls = OrbitControls::new(OrbitConfig::default());
        controls.on_pointer_down(Vec2::new(0.0, 0.0));
        controls.set_enabled(false);
        assert!(!controls.is_dragging());
        assert!(!controls.on_pointer_down(Vec2::new(0.0, 0.0)));

        let pos = Vec3::new(1.0, 2.0, 2.0);
        assert_eq!(controls.update(1.0, pos), pos);
    }

    #[test]
    fn stop_clears_inertia() {
        let mut controls = OrbitControls::new(still());
        controls.on_pointer_down(Vec2::new(0.0, 0.0));
        controls.on_pointer_move(Vec2::new(50.0, 0.0));
        controls.update(0.016, Vec3::new(0.0, 0.0, 3.5));
        controls.on_pointer_up();
        assert!(controls.is_inertia_active());
        controls.stop();
        assert!(!controls.is_inertia_active());
    }
}
