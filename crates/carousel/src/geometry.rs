use crate::config::CarouselConfig;

/// Wrap an unbounded virtual index into `0..len`. `len` must be non-zero.
pub fn wrap_index(virtual_index: i64, len: usize) -> usize {
    virtual_index.rem_euclid(len as i64) as usize
}

/// Nearest virtual index for a rotation angle (degrees).
pub fn nearest_index(rotation: f64, angle_step: f64) -> i64 {
    (-rotation / angle_step).round() as i64
}

/// Rotation at which `virtual_index` sits at the front.
pub fn rest_rotation(virtual_index: i64, angle_step: f64) -> f64 {
    -(virtual_index as f64) * angle_step
}

/// Render parameters of one item for the current rotation.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ItemTransform {
    pub virtual_index: i64,
    /// Index into the item list.
    pub item_index: usize,
    /// Placement on the arc (degrees), before the carousel rotation.
    pub arc_angle: f64,
    /// Angle from the front after rotation (degrees).
    pub world_angle: f64,
    pub opacity: f64,
    pub scale: f64,
    /// Larger draws on top.
    pub z_order: i32,
    pub highlighted: bool,
}

impl ItemTransform {
    pub fn compute(
        config: &CarouselConfig,
        angle_step: f64,
        virtual_index: i64,
        item_index: usize,
        rotation: f64,
    ) -> Self {
        let arc_angle = virtual_index as f64 * angle_step;
        let world_angle = arc_angle + rotation;
        let dist = world_angle.abs();
        Self {
            virtual_index,
            item_index,
            arc_angle,
            world_angle,
            opacity: (1.0 - dist / config.fade_window).clamp(0.0, 1.0),
            scale: 1.0 + (1.0 - dist / config.scale_window).clamp(0.0, 1.0) * config.scale_boost,
            z_order: (100.0 - dist).round() as i32,
            highlighted: dist < config.highlight_window,
        }
    }
}
