use std::fmt;

use runtime::{Spring, SpringConfig};
use tracing::debug;

use crate::config::{CarouselConfig, CarouselError};
use crate::geometry::{ItemTransform, nearest_index, rest_rotation, wrap_index};

#[derive(Debug, Clone, PartialEq)]
pub struct CarouselItem<V> {
    pub label: String,
    pub value: V,
}

impl<V> CarouselItem<V> {
    pub fn new(label: impl Into<String>, value: V) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

type ChangeCallback<V> = Box<dyn FnMut(&V)>;

/// Circular picker over `items`.
///
/// `virtual_index` is the committed position and may run past either end of
/// the list; the active item is `items[wrap(virtual_index)]`. `rotation`
/// follows `-virtual_index * angle_step` through a spring, except while a
/// drag is in progress, when it tracks the pointer directly. The angular
/// speed of the drag carries into the release spring.
///
/// With fewer than two items the carousel is static and every interaction
/// is a no-op.
pub struct Carousel<V> {
    items: Vec<CarouselItem<V>>,
    config: CarouselConfig,
    angle_step: f64,
    virtual_index: i64,
    rotation: Spring,
    dragging: bool,
    /// Drag rotation since the last `update` (degrees).
    drag_pending: f64,
    /// Drag speed measured over the last frame (degrees/s).
    drag_velocity: f64,
    on_change: ChangeCallback<V>,
}

impl<V: fmt::Debug> fmt::Debug for Carousel<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Carousel")
            .field("items", &self.items)
            .field("virtual_index", &self.virtual_index)
            .field("rotation", &self.rotation.value())
            .field("dragging", &self.dragging)
            .finish_non_exhaustive()
    }
}

impl<V: PartialEq> Carousel<V> {
    /// Starts at the first item equal to `value`, or at the first item.
    pub fn new(
        items: Vec<CarouselItem<V>>,
        value: &V,
        config: CarouselConfig,
        on_change: impl FnMut(&V) + 'static,
    ) -> Result<Self, CarouselError> {
        config.validate()?;
        let angle_step = config.angle_step_deg();
        let virtual_index = items
            .iter()
            .position(|item| item.value == *value)
            .unwrap_or(0) as i64;
        Ok(Self {
            rotation: Spring::new(
                rest_rotation(virtual_index, angle_step),
                config.settle_spring,
            ),
            items,
            config,
            angle_step,
            virtual_index,
            dragging: false,
            drag_pending: 0.0,
            drag_velocity: 0.0,
            on_change: Box::new(on_change),
        })
    }

    pub fn items(&self) -> &[CarouselItem<V>] {
        &self.items
    }

    pub fn config(&self) -> &CarouselConfig {
        &self.config
    }

    pub fn angle_step(&self) -> f64 {
        self.angle_step
    }

    pub fn virtual_index(&self) -> i64 {
        self.virtual_index
    }

    /// Live rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation.value()
    }

    pub fn is_interactive(&self) -> bool {
        self.items.len() > 1
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_settling(&self) -> bool {
        self.rotation.is_animating()
    }

    pub fn current(&self) -> Option<&CarouselItem<V>> {
        if self.items.is_empty() {
            return None;
        }
        self.items.get(wrap_index(self.virtual_index, self.items.len()))
    }

    /// The committed value.
    pub fn value(&self) -> Option<&V> {
        self.current().map(|item| &item.value)
    }

    /// Take over the rotation for a drag. Any settle in flight is frozen where
    /// it is.
    pub fn begin_drag(&mut self) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.rotation.stop();
        self.dragging = true;
        self.drag_pending = 0.0;
        self.drag_velocity = 0.0;
        true
    }

    pub fn drag_by_pixels(&mut self, dx_px: f64) {
        let degrees =
            (dx_px / self.config.arc_radius).to_degrees() * self.config.drag_sensitivity;
        self.drag_by_degrees(degrees);
    }

    /// Spikes beyond `max_drag_step_deg` per event are clamped.
    pub fn drag_by_degrees(&mut self, degrees: f64) {
        if !self.dragging || !degrees.is_finite() {
            return;
        }
        let max = self.config.max_drag_step_deg;
        let step = degrees.clamp(-max, max);
        self.drag_pending += step;
        self.rotation.set_immediate(self.rotation.value() + step);
    }

    /// Release: snap to the nearest item, commit it and report it. The
    /// settle spring starts with the drag's last measured speed, clamped to
    /// `max_release_speed_deg`.
    pub fn end_drag(&mut self) -> Option<i64> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        let max = self.config.max_release_speed_deg;
        let velocity = self.drag_velocity.clamp(-max, max);
        self.drag_pending = 0.0;
        self.drag_velocity = 0.0;

        let nearest = nearest_index(self.rotation.value(), self.angle_step);
        self.rotation.animate_to_with_velocity(
            rest_rotation(nearest, self.angle_step),
            velocity,
            self.config.settle_spring,
        );
        self.emit(nearest);
        Some(nearest)
    }

    /// The drag lost pointer capture. Spring back to the committed item
    /// without reporting anything.
    pub fn cancel_drag(&mut self) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.settle_to(self.virtual_index, self.config.settle_spring);
    }

    pub fn next(&mut self) {
        self.jump_to(self.virtual_index + 1);
    }

    pub fn prev(&mut self) {
        self.jump_to(self.virtual_index - 1);
    }

    /// Click on a rendered item.
    pub fn jump_to(&mut self, virtual_index: i64) {
        if !self.is_interactive() {
            return;
        }
        self.dragging = false;
        self.commit(virtual_index);
    }

    /// Follow a value changed elsewhere, taking the short way round. Never
    /// reports back through `on_change`. Returns `true` if the carousel moved.
    ///
    /// Does nothing when the current item already holds `value`, even if an
    /// earlier duplicate also matches. Otherwise moves to the first item
    /// equal to `value`.
    pub fn sync_external(&mut self, value: &V) -> bool {
        if !self.is_interactive() || self.value() == Some(value) {
            return false;
        }
        let Some(target) = self
            .items
            .iter()
            .position(|item| item.value == *value)
            .map(|i| i as i64)
        else {
            return false;
        };

        let n = self.items.len() as i64;
        let current = wrap_index(self.virtual_index, self.items.len()) as i64;
        let mut diff = target - current;
        if 2 * diff > n {
            diff -= n;
        } else if 2 * diff <= -n {
            diff += n;
        }

        self.dragging = false;
        self.virtual_index += diff;
        debug!(virtual_index = self.virtual_index, diff, "carousel synced");
        self.settle_to(self.virtual_index, self.config.sync_spring);
        true
    }

    /// Advance the settle animation, or sample the drag speed while a drag
    /// is in progress. Returns the live rotation.
    pub fn update(&mut self, dt_s: f64) -> f64 {
        if self.dragging {
            if dt_s > 0.0 {
                self.drag_velocity = self.drag_pending / dt_s;
                self.drag_pending = 0.0;
            }
            return self.rotation.value();
        }
        self.rotation.step(dt_s)
    }

    /// Items to render, centered on the index nearest the live rotation.
    pub fn visible_items(&self) -> Vec<ItemTransform> {
        let len = self.items.len();
        match len {
            0 => Vec::new(),
            1 => vec![ItemTransform::compute(&self.config, 0.0, 0, 0, 0.0)],
            _ => {
                let rotation = self.rotation.value();
                let center = nearest_index(rotation, self.angle_step);
                let window = i64::from(self.config.visible_window);
                (center - window..=center + window)
                    .map(|vi| {
                        ItemTransform::compute(
                            &self.config,
                            self.angle_step,
                            vi,
                            wrap_index(vi, len),
                            rotation,
                        )
                    })
                    .collect()
            }
        }
    }

    fn settle_to(&mut self, virtual_index: i64, spring: SpringConfig) {
        self.rotation
            .animate_to_with(rest_rotation(virtual_index, self.angle_step), spring);
    }

    fn commit(&mut self, virtual_index: i64) {
        self.settle_to(virtual_index, self.config.settle_spring);
        self.emit(virtual_index);
    }

    fn emit(&mut self, virtual_index: i64) {
        self.virtual_index = virtual_index;
        let item = wrap_index(virtual_index, self.items.len());
        debug!(virtual_index, item, "carousel committed");
        (self.on_change)(&self.items[item].value);
    }
}
