//! Scripted interaction session.
//!
//! Plays a fixed storyboard against a [`GlobeScene`]: a short globe drag, a
//! location selection, a filter carousel fling while the camera is still
//! flying, a level step and finally a return to the world view.

use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

use carousel::{Carousel, CarouselConfig, CarouselItem};
use catalog::{FilterChoice, FilterOption, LocationId, ProductFilter, level_filter_options};
use foundation::math::Vec2;
use runtime::{Event, FrameClock, FrameClockConfig, FrameLoop, GestureOwner, PointerCapture};
use scene::{CameraPose, GlobeEvent, GlobeScene, ViewMode};
use tracing::{info, warn};

const LOCATION_CAROUSEL: GestureOwner = GestureOwner::Carousel(0);
const GLOBE_DRAG_FRAMES: u64 = 10;
const CAROUSEL_DRAG_FRAMES: u64 = 10;
const CAROUSEL_DRAG_PX: f64 = -40.0;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub fps: f64,
    pub seconds: f64,
    pub select: LocationId,
    pub clock: FrameClockConfig,
    pub carousel: CarouselConfig,
}

#[derive(Debug)]
pub struct SessionReport {
    pub frames: u64,
    pub final_mode: ViewMode,
    pub final_pose: CameraPose,
    pub location_filter: FilterChoice<String>,
    pub level_filter: FilterChoice<u8>,
    pub listed_products: usize,
    pub cart_items: usize,
    pub cart_total: f64,
    pub events: Vec<Event<GlobeEvent>>,
}

type Commits<T> = Rc<RefCell<Vec<FilterChoice<T>>>>;

fn filter_carousel<T: Clone + PartialEq + 'static>(
    options: Vec<FilterOption<T>>,
    config: CarouselConfig,
) -> Result<(Carousel<FilterChoice<T>>, Commits<T>), Box<dyn Error>> {
    let commits: Commits<T> = Rc::default();
    let sink = Rc::clone(&commits);
    let items = options
        .into_iter()
        .map(|option| CarouselItem::new(option.label, option.value))
        .collect();
    let carousel = Carousel::new(items, &FilterChoice::All, config, move |value| {
        sink.borrow_mut().push(value.clone())
    })?;
    Ok((carousel, commits))
}

/// Frame at which a storyboard beat happens, as a fraction of the session.
fn beat(total: u64, fraction: f64) -> u64 {
    (total as f64 * fraction).round() as u64
}

/// Frame `step` of a scripted carousel fling that began at step 0. Moves
/// only while `owner` holds the pointer and releases on the frame after the
/// last move. A drag whose capture was taken over is cancelled.
fn continue_fling<T: PartialEq>(
    carousel: &mut Carousel<T>,
    capture: &mut PointerCapture,
    owner: GestureOwner,
    step: u64,
) {
    if !carousel.is_dragging() {
        return;
    }
    if !capture.is_owned_by(owner) {
        carousel.cancel_drag();
    } else if step <= CAROUSEL_DRAG_FRAMES {
        carousel.drag_by_pixels(CAROUSEL_DRAG_PX);
    } else if capture.release(owner) {
        carousel.end_drag();
    }
}

pub fn run_session(
    mut scene: GlobeScene,
    options: &SessionOptions,
) -> Result<SessionReport, Box<dyn Error>> {
    let total = ((options.seconds * options.fps).round() as u64).max(1);
    let raw_dt = 1.0 / options.fps;

    let (mut locations, location_commits) =
        filter_carousel(scene.catalog().location_filter_options(), options.carousel)?;
    let (mut levels, level_commits) = filter_carousel(level_filter_options(), options.carousel)?;

    let mut clock = FrameClock::new(options.clock);
    let mut frame_loop = FrameLoop::new();
    let callbacks = GlobeScene::install(&mut frame_loop);
    let mut capture = PointerCapture::new();
    let mut filter = ProductFilter::default();
    let mut events = Vec::new();

    let select_at = beat(total, 0.25);
    let fling_at = beat(total, 0.3);
    let step_at = beat(total, 0.45);
    let clear_at = beat(total, 0.6);

    for _ in 0..total {
        let frame = clock.tick(raw_dt);
        let i = frame.index;

        // Globe drag at the start of the session.
        if i == 0 && scene.pointer_down(Vec2::new(640.0, 360.0)) {
            capture.claim(GestureOwner::Globe);
        } else if (1..=GLOBE_DRAG_FRAMES).contains(&i) && capture.is_owned_by(GestureOwner::Globe) {
            scene.pointer_move(Vec2::new(640.0 + 8.0 * i as f64, 360.0));
        } else if i == GLOBE_DRAG_FRAMES + 1 && capture.release(GestureOwner::Globe) {
            scene.pointer_up();
        }

        if i == select_at {
            match scene.select_location(&options.select) {
                Ok(transition) => info!(?transition, "scripted selection"),
                Err(err) => warn!("scripted selection failed: {err}"),
            }
        }

        if i == fling_at && locations.begin_drag() {
            if capture.claim(LOCATION_CAROUSEL) == Some(GestureOwner::Globe) {
                scene.cancel_drag();
            }
        } else if i > fling_at {
            continue_fling(&mut locations, &mut capture, LOCATION_CAROUSEL, i - fling_at);
        }

        if i == step_at {
            levels.next();
        }

        if i == clear_at {
            scene.clear_selection();
        }

        frame_loop.run_frame(frame, &mut scene);
        locations.update(frame.dt_s);
        levels.update(frame.dt_s);

        for choice in location_commits.borrow_mut().drain(..) {
            filter.location = choice;
            info!(location = ?filter.location, "location filter committed");
        }
        for choice in level_commits.borrow_mut().drain(..) {
            filter.level = choice;
            info!(level = ?filter.level, "level filter committed");
        }

        for event in scene.store_mut().drain_events() {
            match &event.payload {
                GlobeEvent::LocationSelected(location) => {
                    info!(id = %location.id, "location selected");
                    locations.sync_external(&FilterChoice::Only(location.name.clone()));
                    if let Some(product) = location.products.first() {
                        scene.store_mut().add_to_cart(product.clone());
                    }
                }
                GlobeEvent::SelectionCleared => info!("back to world view"),
                GlobeEvent::CartChanged { items } => info!(items, "cart changed"),
            }
            events.push(event);
        }
    }

    GlobeScene::uninstall(&mut frame_loop, callbacks);
    // Cart events raised while handling the last frame's selection.
    events.extend(scene.store_mut().drain_events());

    let listed_products = scene.catalog().filter_products(&filter).len();
    Ok(SessionReport {
        frames: clock.frames_elapsed(),
        final_mode: scene.mode(),
        final_pose: scene.camera_pose(),
        location_filter: filter.location,
        level_filter: filter.level,
        listed_products,
        cart_items: scene.store().cart().len(),
        cart_total: scene.store().cart_total(),
        events,
    })
}
