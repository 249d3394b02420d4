//! Explicit per-value animation state.
//!
//! Every animated quantity is a small state machine that the owner steps from
//! its frame callback: an exponential damper for camera-style smoothing and
//! an analytic spring for snap/settle motion. There is no implicit
//! subscription graph; whoever owns the value decides when it advances.

use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

/// Fraction of the remaining distance covered in `dt_s` at `rate` (1/s).
///
/// `1 - exp(-rate * dt)`. Composes exactly across frames:
/// two steps of `dt` cover the same distance as one step of `2 * dt`.
#[inline]
pub fn exp_damp_factor(rate: f64, dt_s: f64) -> f64 {
    if dt_s <= 0.0 {
        return 0.0;
    }
    1.0 - (-rate * dt_s).exp()
}

/// Decay rate that halves the remaining distance every `halflife_s` seconds.
///
/// A non-positive half-life snaps immediately.
#[inline]
pub fn rate_from_halflife(halflife_s: f64) -> f64 {
    if halflife_s > 0.0 {
        std::f64::consts::LN_2 / halflife_s
    } else {
        f64::INFINITY
    }
}

#[inline]
pub fn damp(current: f64, target: f64, rate: f64, dt_s: f64) -> f64 {
    current + (target - current) * exp_damp_factor(rate, dt_s)
}

#[inline]
pub fn damp_vec3(current: Vec3, target: Vec3, rate: f64, dt_s: f64) -> Vec3 {
    current.lerp(target, exp_damp_factor(rate, dt_s))
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    /// Distance from target under which the spring may come to rest.
    pub rest_delta: f64,
    /// Speed under which the spring may come to rest.
    pub rest_speed: f64,
}

impl SpringConfig {
    pub fn new(stiffness: f64, damping: f64) -> Self {
        Self {
            stiffness,
            damping,
            ..Self::default()
        }
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping / (2.0 * (self.stiffness * self.mass).sqrt())
    }

    pub fn is_valid(&self) -> bool {
        self.stiffness > 0.0
            && self.damping >= 0.0
            && self.mass > 0.0
            && self.rest_delta >= 0.0
            && self.rest_speed >= 0.0
            && [
                self.stiffness,
                self.damping,
                self.mass,
                self.rest_delta,
                self.rest_speed,
            ]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 200.0,
            damping: 30.0,
            mass: 1.0,
            rest_delta: 0.01,
            rest_speed: 0.05,
        }
    }
}

/// Damped harmonic oscillator driving one scalar toward a target.
///
/// Integrated in closed form, so the result after a given amount of time does
/// not depend on how that time was split into frames. Retargeting keeps the
/// current velocity; the new animation simply replaces the old one.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    value: f64,
    target: f64,
    velocity: f64,
    config: SpringConfig,
    animating: bool,
}

impl Spring {
    pub fn new(value: f64, config: SpringConfig) -> Self {
        Self {
            value,
            target: value,
            velocity: 0.0,
            config,
            animating: false,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Jump to `value` and stop.
    pub fn set_immediate(&mut self, value: f64) {
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
        self.animating = false;
    }

    /// Freeze at the current value. Used when a gesture takes over.
    pub fn stop(&mut self) {
        let value = self.value;
        self.set_immediate(value);
    }

    pub fn animate_to(&mut self, target: f64) {
        self.target = target;
        self.animating = true;
    }

    pub fn animate_to_with(&mut self, target: f64, config: SpringConfig) {
        self.config = config;
        self.animate_to(target);
    }

    /// Retarget and replace the current velocity, e.g. with the speed of a
    /// gesture that just released the value.
    pub fn animate_to_with_velocity(&mut self, target: f64, velocity: f64, config: SpringConfig) {
        self.velocity = if velocity.is_finite() { velocity } else { 0.0 };
        self.animate_to_with(target, config);
    }

    /// Advance by `dt_s`. Returns the new value.
    pub fn step(&mut self, dt_s: f64) -> f64 {
        if !self.animating || dt_s <= 0.0 {
            return self.value;
        }

        let (x, v) = spring_solution(self.value - self.target, self.velocity, &self.config, dt_s);
        self.value = self.target + x;
        self.velocity = v;

        if x.abs() <= self.config.rest_delta && v.abs() <= self.config.rest_speed {
            self.value = self.target;
            self.velocity = 0.0;
            self.animating = false;
        }
        self.value
    }
}

/// Displacement and velocity after `t` seconds for a spring released at
/// displacement `x0` with velocity `v0`.
fn spring_solution(x0: f64, v0: f64, config: &SpringConfig, t: f64) -> (f64, f64) {
    let omega = (config.stiffness / config.mass).sqrt();
    let zeta = config.damping_ratio();

    if (zeta - 1.0).abs() < 1e-6 {
        // Critically damped.
        let b = v0 + omega * x0;
        let e = (-omega * t).exp();
        (e * (x0 + b * t), e * (v0 - omega * b * t))
    } else if zeta < 1.0 {
        let omega_d = omega * (1.0 - zeta * zeta).sqrt();
        let e = (-zeta * omega * t).exp();
        let (s, c) = (omega_d * t).sin_cos();
        let x = e * (x0 * c + (v0 + zeta * omega * x0) / omega_d * s);
        let v = e * (v0 * c - (omega * omega * x0 + zeta * omega * v0) / omega_d * s);
        (x, v)
    } else {
        let root = (zeta * zeta - 1.0).sqrt();
        let r1 = -omega * (zeta - root);
        let r2 = -omega * (zeta + root);
        let c2 = (v0 - r1 * x0) / (r2 - r1);
        let c1 = x0 - c2;
        let (e1, e2) = ((r1 * t).exp(), (r2 * t).exp());
        (c1 * e1 + c2 * e2, r1 * c1 * e1 + r2 * c2 * e2)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Spring, SpringConfig, damp, damp_vec3, exp_damp_factor, rate_from_halflife,
    };
    use foundation::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn run(spring: &mut Spring, seconds: f64, steps: usize) {
        let dt = seconds / steps as f64;
        for _ in 0..steps {
            spring.step(dt);
        }
    }

    #[test]
    fn halflife_halves_the_gap() {
        let rate = rate_from_halflife(0.5);
        assert_close(damp(0.0, 10.0, rate, 0.5), 5.0, 1e-12);
        assert_close(damp(0.0, 10.0, rate, 1.0), 7.5, 1e-12);
    }

    #[test]
    fn damping_composes_across_frames() {
        let rate = rate_from_halflife(0.7);
        let one = damp_vec3(Vec3::ZERO, Vec3::new(3.0, -1.0, 2.0), rate, 0.3);
        let mut many = Vec3::ZERO;
        for _ in 0..30 {
            many = damp_vec3(many, Vec3::new(3.0, -1.0, 2.0), rate, 0.01);
        }
        assert!(one.distance(many) < 1e-12);
    }

    #[test]
    fn zero_dt_and_zero_halflife() {
        assert_eq!(exp_damp_factor(5.0, 0.0), 0.0);
        assert_eq!(exp_damp_factor(rate_from_halflife(0.0), 0.016), 1.0);
    }

    #[test]
    fn spring_settles_on_target() {
        for config in [
            SpringConfig::new(200.0, 30.0),
            SpringConfig::new(300.0, 30.0),
            SpringConfig::new(100.0, 20.0),
            SpringConfig::new(100.0, 25.0),
        ] {
            let mut spring = Spring::new(0.0, config);
            spring.animate_to(-55.8);
            run(&mut spring, 3.0, 180);
            assert!(!spring.is_animating(), "{config:?} still moving");
            assert_eq!(spring.value(), -55.8);
            assert_eq!(spring.velocity(), 0.0);
        }
    }

    #[test]
    fn spring_is_frame_rate_independent() {
        let config = SpringConfig::new(200.0, 30.0);
        let mut coarse = Spring::new(10.0, config);
        let mut fine = Spring::new(10.0, config);
        coarse.animate_to(0.0);
        fine.animate_to(0.0);
        run(&mut coarse, 0.12, 3);
        run(&mut fine, 0.12, 48);
        assert_close(coarse.value(), fine.value(), 1e-9);
        assert_close(coarse.velocity(), fine.velocity(), 1e-9);
    }

    #[test]
    fn underdamped_spring_overshoots() {
        let mut spring = Spring::new(0.0, SpringConfig::new(300.0, 10.0));
        spring.animate_to(1.0);
        let mut max = f64::MIN;
        for _ in 0..120 {
            max = max.max(spring.step(1.0 / 60.0));
        }
        assert!(max > 1.0);
    }

    #[test]
    fn retarget_keeps_velocity() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.animate_to(100.0);
        spring.step(0.05);
        let v = spring.velocity();
        assert!(v > 0.0);
        spring.animate_to(-100.0);
        assert_eq!(spring.velocity(), v);
        assert_eq!(spring.target(), -100.0);
    }

    #[test]
    fn release_velocity_carries_past_target() {
        let mut flung = Spring::new(-20.0, SpringConfig::default());
        flung.animate_to_with_velocity(-30.0, -1200.0, SpringConfig::default());
        let mut dropped = Spring::new(-20.0, SpringConfig::default());
        dropped.animate_to_with_velocity(-30.0, 0.0, SpringConfig::default());

        flung.step(1.0 / 60.0);
        dropped.step(1.0 / 60.0);
        assert!(flung.value() < -30.0, "{}", flung.value());
        assert!(dropped.value() > -30.0, "{}", dropped.value());

        run(&mut flung, 3.0, 180);
        assert_eq!(flung.value(), -30.0);
        assert!(!flung.is_animating());

        let mut bad = Spring::new(0.0, SpringConfig::default());
        bad.animate_to_with_velocity(1.0, f64::NAN, SpringConfig::default());
        assert_eq!(bad.velocity(), 0.0);
    }

    #[test]
    fn stop_freezes_in_place() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        spring.animate_to(10.0);
        spring.step(0.05);
        let here = spring.value();
        spring.stop();
        assert!(!spring.is_animating());
        assert_eq!(spring.step(1.0), here);
        assert_eq!(spring.target(), here);
    }
}
