use std::error::Error;
use std::fs;
use std::path::PathBuf;

use carousel::CarouselConfig;
use catalog::{LoadPolicy, LocationCatalog, LocationId};
use clap::Parser;
use runtime::FrameClockConfig;
use scene::{GlobeConfig, GlobeScene};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod session;

use session::{SessionOptions, run_session};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the globe interaction engine")]
struct Args {
    /// Locations JSON (same shape as /api/locations). Defaults to the bundled sample.
    #[arg(long)]
    locations: Option<PathBuf>,

    /// Viewer config JSON; missing sections fall back to defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip malformed locations instead of refusing to start.
    #[arg(long)]
    skip_invalid: bool,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Length of the scripted session (seconds).
    #[arg(long, default_value_t = 12.0)]
    seconds: f64,

    /// Location to fly to during the session.
    #[arg(long, default_value = "loc-iceland")]
    select: String,
}

/// On-disk viewer configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ViewerConfig {
    globe: GlobeConfig,
    carousel: CarouselConfig,
    clock: FrameClockConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<ViewerConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(ViewerConfig::default());
    };
    let config: ViewerConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
    config.globe.validate()?;
    config.carousel.validate()?;
    Ok(config)
}

fn load_catalog(path: Option<&PathBuf>, policy: LoadPolicy) -> Result<LocationCatalog, Box<dyn Error>> {
    match path {
        Some(path) => Ok(LocationCatalog::from_json_with(
            &fs::read_to_string(path)?,
            policy,
        )?),
        None => Ok(LocationCatalog::sample()?),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    if !(args.fps.is_finite() && args.fps > 0.0) {
        return Err(format!("--fps must be positive, got {}", args.fps).into());
    }

    let policy = if args.skip_invalid {
        LoadPolicy::SkipInvalid
    } else {
        LoadPolicy::Strict
    };
    let catalog = load_catalog(args.locations.as_ref(), policy)?;
    let config = load_config(args.config.as_ref())?;
    info!(locations = catalog.len(), "catalog loaded");

    let scene = GlobeScene::new(catalog, config.globe)?;
    let options = SessionOptions {
        fps: args.fps,
        seconds: args.seconds.max(0.0),
        select: LocationId::new(args.select),
        clock: config.clock,
        carousel: config.carousel,
    };
    let report = run_session(scene, &options)?;

    let pose = report.final_pose;
    println!("frames: {}", report.frames);
    println!("mode: {:?}", report.final_mode);
    println!(
        "camera: ({:.4}, {:.4}, {:.4}) distance {:.4}",
        pose.position.x,
        pose.position.y,
        pose.position.z,
        pose.distance()
    );
    println!("location filter: {:?}", report.location_filter);
    println!("level filter: {:?}", report.level_filter);
    println!("listed products: {}", report.listed_products);
    println!("cart: {} item(s), total {:.2}", report.cart_items, report.cart_total);
    for event in &report.events {
        println!("event @{}: {:?}", event.frame_index, event.payload);
    }
    Ok(())
}
