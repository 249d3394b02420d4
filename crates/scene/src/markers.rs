use catalog::{LocationCatalog, LocationId};
use foundation::math::{GeoPoint, Vec3};

use crate::visibility::{MarkerVisibility, VisibilityEvaluator};

/// Render-facing state of a marker, rewritten in place every frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerStyle {
    pub opacity: f64,
    pub interactive: bool,
    pub selected: bool,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            interactive: true,
            selected: false,
        }
    }
}

/// A location pinned to the globe.
///
/// The surface position is derived from `geo` and `radius` once and cached;
/// it is only recomputed when either input changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    id: LocationId,
    label: String,
    geo: GeoPoint,
    radius: f64,
    position: Vec3,
    direction: Vec3,
    style: MarkerStyle,
}

impl Marker {
    pub fn new(id: LocationId, label: impl Into<String>, geo: GeoPoint, radius: f64) -> Self {
        let position = geo.to_sphere(radius);
        Self {
            id,
            label: label.into(),
            geo,
            radius,
            position,
            direction: position.normalize_or_zero(),
            style: MarkerStyle::default(),
        }
    }

    pub fn id(&self) -> &LocationId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn geo(&self) -> GeoPoint {
        self.geo
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Unit direction from the globe center.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn style(&self) -> MarkerStyle {
        self.style
    }

    /// Move the marker. Returns `true` if the cached position changed.
    pub fn set_geo(&mut self, geo: GeoPoint, radius: f64) -> bool {
        if geo == self.geo && radius == self.radius {
            return false;
        }
        self.geo = geo;
        self.radius = radius;
        self.position = geo.to_sphere(radius);
        self.direction = self.position.normalize_or_zero();
        true
    }

    fn apply(&mut self, visibility: MarkerVisibility, selected: bool) {
        self.style.opacity = visibility.opacity;
        self.style.interactive = visibility.interactive;
        self.style.selected = selected;
    }
}

/// All markers of the scene, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(catalog: &LocationCatalog, radius: f64) -> Self {
        let markers = catalog
            .iter()
            .map(|entry| {
                Marker::new(
                    entry.location.id.clone(),
                    entry.location.name.clone(),
                    entry.geo,
                    radius,
                )
            })
            .collect();
        Self { markers }
    }

    pub fn push(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.markers.iter()
    }

    pub fn get(&self, id: &LocationId) -> Option<&Marker> {
        self.markers.iter().find(|m| &m.id == id)
    }

    pub fn get_mut(&mut self, id: &LocationId) -> Option<&mut Marker> {
        self.markers.iter_mut().find(|m| &m.id == id)
    }

    /// Per-frame style pass. Only touches each marker's style fields; the
    /// layer itself is never rebuilt.
    pub fn update_styles(
        &mut self,
        camera_position: Vec3,
        evaluator: &VisibilityEvaluator,
        selected: Option<&LocationId>,
    ) {
        let Some(camera_dir) = camera_position.try_normalize() else {
            for marker in &mut self.markers {
                let is_selected = selected == Some(&marker.id);
                marker.apply(MarkerVisibility::HIDDEN, is_selected);
            }
            return;
        };

        for marker in &mut self.markers {
            let visibility = evaluator.evaluate(camera_dir, marker.direction);
            let is_selected = selected == Some(&marker.id);
            marker.apply(visibility, is_selected);
        }
    }

    /// The marker under a pointer tap, if it currently accepts input.
    pub fn pick(&self, id: &LocationId) -> Option<&Marker> {
        self.get(id).filter(|m| m.style.interactive)
    }

    pub fn interactive_count(&self) -> usize {
        self.markers.iter().filter(|m| m.style.interactive).count()
    }
}
