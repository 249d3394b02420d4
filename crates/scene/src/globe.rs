//! The globe scene: state container, camera, orbit controls and markers
//! wired into a frame loop.

use std::fmt;

use catalog::{LocationCatalog, LocationId};
use foundation::math::Vec2;
use runtime::{CallbackHandle, Frame, FrameLoop};
use tracing::{debug, info};

use crate::camera::{CameraPose, CameraTransitionController, CameraUpdate};
use crate::config::{ConfigError, GlobeConfig};
use crate::markers::MarkerLayer;
use crate::orbit::OrbitControls;
use crate::store::GlobeStore;
use crate::view_state::{Transition, ViewMode};
use crate::visibility::VisibilityEvaluator;

/// Frame-loop priorities. Orbit input lands first, the transition controller
/// then overrides the pose if it has a target, and markers read the result.
pub const ORBIT_PRIORITY: i32 = 0;
pub const CAMERA_PRIORITY: i32 = 10;
pub const MARKER_PRIORITY: i32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    UnknownLocation(LocationId),
    /// The marker is facing away from the camera and ignores input.
    NotInteractive(LocationId),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::UnknownLocation(id) => write!(f, "unknown location: {id}"),
            SceneError::NotInteractive(id) => write!(f, "marker not interactive: {id}"),
        }
    }
}

impl std::error::Error for SceneError {}

/// Handles for the callbacks installed by [`GlobeScene::install`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct GlobeCallbacks {
    pub orbit: CallbackHandle,
    pub camera: CallbackHandle,
    pub markers: CallbackHandle,
}

#[derive(Debug)]
pub struct GlobeScene {
    catalog: LocationCatalog,
    config: GlobeConfig,
    store: GlobeStore,
    markers: MarkerLayer,
    camera: CameraTransitionController,
    last_camera_update: CameraUpdate,
    orbit: OrbitControls,
    evaluator: VisibilityEvaluator,
}

impl GlobeScene {
    pub fn new(catalog: LocationCatalog, config: GlobeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let markers = MarkerLayer::from_catalog(&catalog, config.marker_radius);
        info!(
            locations = catalog.len(),
            rejected = catalog.rejected().len(),
            "globe scene ready"
        );
        Ok(Self {
            catalog,
            store: GlobeStore::new(),
            markers,
            camera: CameraTransitionController::new(config.camera),
            last_camera_update: CameraUpdate::Idle,
            orbit: OrbitControls::new(config.orbit),
            evaluator: VisibilityEvaluator::new(config.visibility),
            config,
        })
    }

    /// Register the per-frame steps. Keep the returned handles for
    /// [`GlobeScene::uninstall`].
    pub fn install(frame_loop: &mut FrameLoop<GlobeScene>) -> GlobeCallbacks {
        GlobeCallbacks {
            orbit: frame_loop.register("globe.orbit", ORBIT_PRIORITY, |frame, scene| {
                scene.step_orbit(frame)
            }),
            camera: frame_loop.register("globe.camera", CAMERA_PRIORITY, |frame, scene| {
                scene.step_camera(frame)
            }),
            markers: frame_loop.register("globe.markers", MARKER_PRIORITY, |frame, scene| {
                scene.step_markers(frame)
            }),
        }
    }

    pub fn uninstall(frame_loop: &mut FrameLoop<GlobeScene>, callbacks: GlobeCallbacks) {
        frame_loop.deregister(callbacks.orbit);
        frame_loop.deregister(callbacks.camera);
        frame_loop.deregister(callbacks.markers);
    }

    /// All three steps in frame-loop order, for hosts without a loop.
    pub fn advance(&mut self, frame: Frame) {
        self.step_orbit(frame);
        self.step_camera(frame);
        self.step_markers(frame);
    }

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn store(&self) -> &GlobeStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut GlobeStore {
        &mut self.store
    }

    pub fn markers(&self) -> &MarkerLayer {
        &self.markers
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }

    pub fn orbit(&self) -> &OrbitControls {
        &self.orbit
    }

    pub fn mode(&self) -> ViewMode {
        self.store.mode()
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.orbit.set_viewport(width, height);
    }

    pub fn select_location(&mut self, id: &LocationId) -> Result<Transition, SceneError> {
        let location = self
            .catalog
            .get(id)
            .ok_or_else(|| SceneError::UnknownLocation(id.clone()))?;
        let transition = self.store.select_location(location);
        self.sync_orbit();
        Ok(transition)
    }

    /// A tap on a marker. Only markers currently facing the camera respond.
    pub fn pick_marker(&mut self, id: &LocationId) -> Result<Transition, SceneError> {
        if self.markers.get(id).is_none() {
            return Err(SceneError::UnknownLocation(id.clone()));
        }
        if self.markers.pick(id).is_none() {
            debug!(%id, "ignored pick on hidden marker");
            return Err(SceneError::NotInteractive(id.clone()));
        }
        self.select_location(id)
    }

    pub fn clear_selection(&mut self) -> Transition {
        let transition = self.store.clear_selection();
        self.sync_orbit();
        transition
    }

    /// Start a globe drag. Refused while a location is focused.
    pub fn pointer_down(&mut self, pos_px: Vec2) -> bool {
        self.orbit.on_pointer_down(pos_px)
    }

    pub fn pointer_move(&mut self, pos_px: Vec2) {
        self.orbit.on_pointer_move(pos_px);
    }

    pub fn pointer_up(&mut self) {
        self.orbit.on_pointer_up();
    }

    /// Drop a drag whose pointer capture was taken by another gesture.
    pub fn cancel_drag(&mut self) {
        self.orbit.stop();
    }

    fn sync_orbit(&mut self) {
        let enabled = self.store.view().free_rotation_enabled();
        if self.orbit.is_enabled() != enabled {
            debug!(enabled, "orbit controls toggled");
            self.orbit.set_enabled(enabled);
        }
    }

    fn step_orbit(&mut self, frame: Frame) {
        self.store.begin_frame(frame);
        if self.mode() != ViewMode::World {
            return;
        }
        let pose = self.camera.pose_mut();
        pose.position = self.orbit.update(frame.dt_s, pose.position);
    }

    fn step_camera(&mut self, frame: Frame) {
        let update = self
            .camera
            .update(frame.dt_s, self.store.view().selected_geo());
        if update == CameraUpdate::Arrived && self.last_camera_update != CameraUpdate::Arrived {
            debug!(frame = frame.index, "camera arrived at location");
        }
        self.last_camera_update = update;
    }

    fn step_markers(&mut self, _frame: Frame) {
        self.markers.update_styles(
            self.camera.pose().position,
            &self.evaluator,
            self.store.view().selected_id(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{GlobeScene, SceneError};
    use crate::config::{GlobeConfig, OrbitConfig};
    use crate::store::GlobeEvent;
    use crate::view_state::{Transition, ViewMode};
    use catalog::{LocationCatalog, LocationId};
    use foundation::math::Vec2;
    use pretty_assertions::assert_eq;
    use runtime::{Frame, FrameLoop, GestureOwner, PointerCapture};

    fn still_config() -> GlobeConfig {
        GlobeConfig {
            orbit: OrbitConfig {
                auto_rotate: false,
                ..OrbitConfig::default()
            },
            ..GlobeConfig::default()
        }
    }

    fn scene() -> GlobeScene {
        GlobeScene::new(LocationCatalog::sample().unwrap(), still_config()).unwrap()
    }

    fn run(frame_loop: &mut FrameLoop<GlobeScene>, scene: &mut GlobeScene, frames: u64) {
        for i in 0..frames {
            frame_loop.run_frame(Frame::fixed(i, 1.0 / 60.0), scene);
        }
    }

    #[test]
    fn rejects_invalid_config() {
        let mut config = GlobeConfig::default();
        config.camera.orbit_distance = 0.5;
        assert!(GlobeScene::new(LocationCatalog::sample().unwrap(), config).is_err());
    }

    #[test]
    fn selecting_flies_camera_to_location_and_locks_orbit() {
        let mut scene = scene();
        let mut frame_loop = FrameLoop::new();
        GlobeScene::install(&mut frame_loop);

        let iceland = LocationId::new("loc-iceland");
        assert_eq!(
            scene.select_location(&iceland),
            Ok(Transition::Entered(iceland.clone()))
        );
        assert_eq!(scene.mode(), ViewMode::Location);
        assert!(!scene.orbit().is_enabled());
        assert!(!scene.pointer_down(Vec2::new(10.0, 10.0)));

        run(&mut frame_loop, &mut scene, 600);

        let geo = scene.catalog().get(&iceland).unwrap().geo;
        let target = geo.to_sphere(scene.config().camera.focus_distance);
        assert!(scene.camera_pose().position.distance(target) <= 0.01);

        let marker = scene.markers().get(&iceland).unwrap();
        assert!(marker.style().selected);
        assert!(marker.style().interactive);
    }

    #[test]
    fn far_side_markers_cannot_be_picked() {
        let mut scene = scene();
        scene.advance(Frame::fixed(0, 1.0 / 60.0));

        let japan = LocationId::new("loc-japan");
        assert_eq!(
            scene.pick_marker(&japan),
            Err(SceneError::NotInteractive(japan.clone()))
        );
        assert_eq!(scene.mode(), ViewMode::World);

        let iceland = LocationId::new("loc-iceland");
        assert_eq!(
            scene.pick_marker(&iceland),
            Ok(Transition::Entered(iceland))
        );

        let nowhere = LocationId::new("loc-atlantis");
        assert_eq!(
            scene.pick_marker(&nowhere),
            Err(SceneError::UnknownLocation(nowhere.clone()))
        );
    }

    #[test]
    fn clearing_returns_to_world_orbit() {
        let mut scene = scene();
        let mut frame_loop = FrameLoop::new();
        GlobeScene::install(&mut frame_loop);

        scene
            .select_location(&LocationId::new("loc-nepal"))
            .unwrap();
        run(&mut frame_loop, &mut scene, 300);
        let close = scene.camera_pose().position;
        assert!(close.length() < scene.config().camera.close_threshold);

        scene.clear_selection();
        assert!(scene.orbit().is_enabled());
        run(&mut frame_loop, &mut scene, 600);

        let far = scene.camera_pose().position;
        assert!(far.length() >= scene.config().camera.close_threshold);
        // Pulled straight out along the same direction.
        let a = close.normalize_or_zero();
        let b = far.normalize_or_zero();
        assert!(a.distance(b) < 1e-9);

        let events: Vec<_> = scene
            .store_mut()
            .drain_events()
            .into_iter()
            .map(|e| e.payload)
            .collect();
        assert!(matches!(events[0], GlobeEvent::LocationSelected(_)));
        assert_eq!(events[1], GlobeEvent::SelectionCleared);
    }

    #[test]
    fn uninstall_stops_all_steps() {
        let mut scene = scene();
        let mut frame_loop = FrameLoop::new();
        let callbacks = GlobeScene::install(&mut frame_loop);
        assert_eq!(frame_loop.callback_count(), 3);

        GlobeScene::uninstall(&mut frame_loop, callbacks);
        assert_eq!(frame_loop.callback_count(), 0);

        scene
            .select_location(&LocationId::new("loc-iceland"))
            .unwrap();
        let before = scene.camera_pose();
        run(&mut frame_loop, &mut scene, 60);
        assert_eq!(scene.camera_pose(), before);
    }

    #[test]
    fn globe_drag_yields_to_newer_gesture() {
        let mut scene = scene();
        let mut capture = PointerCapture::new();

        assert!(scene.pointer_down(Vec2::new(0.0, 0.0)));
        capture.claim(GestureOwner::Globe);
        assert_eq!(
            capture.claim(GestureOwner::Carousel(1)),
            Some(GestureOwner::Globe)
        );
        scene.cancel_drag();
        assert!(!scene.orbit().is_dragging());

        // A late release from the displaced globe drag changes nothing.
        assert!(!capture.release(GestureOwner::Globe));
        assert!(capture.is_owned_by(GestureOwner::Carousel(1)));
    }
}
