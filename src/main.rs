use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use kiss3d::window::Window;

use rust_solar::director::FreeRoamStyle;
use rust_solar::focus::{FocusDispatcher, ScrollTrack};
use rust_solar::gui::SolarApp;
use rust_solar::model::decorations::{BeltConfig, StarfieldConfig};
use rust_solar::model::{SceneConfig, SceneState};
use rust_solar::SceneError;

#[derive(Debug, Parser)]
#[command(about = "Scroll through the solar system")]
struct Args {
    /// JSON catalog to load instead of the built-in one
    #[arg(long)]
    catalog: Option<PathBuf>,
    #[arg(long, default_value_t = 800)]
    stars: usize,
    #[arg(long, default_value_t = 1500)]
    asteroids: usize,
    /// Seed for star and asteroid placement
    #[arg(long)]
    seed: Option<u64>,
    /// "orbit" follows the pointer, "auto-rotate" circles on its own
    #[arg(long, default_value_t = FreeRoamStyle::PointerOrbit)]
    free_roam_style: FreeRoamStyle,
    /// Start in free-roam instead of following the scroll position
    #[arg(long)]
    free_roam: bool,
    /// Skip the fly-in
    #[arg(long)]
    no_intro: bool,
    #[arg(long, default_value_t = 1280)]
    width: u32,
    #[arg(long, default_value_t = 720)]
    height: u32,
}

impl Args {
    fn scene_config(&self) -> SceneConfig {
        let defaults = SceneConfig::default();
        SceneConfig {
            stars: StarfieldConfig {
                count: self.stars,
                ..defaults.stars
            },
            belt: BeltConfig {
                count: self.asteroids,
                ..BeltConfig::for_distance_scale(defaults.scale.distance_scale)
            },
            seed: self.seed,
            free_roam_style: self.free_roam_style,
            intro: !self.no_intro,
            width: self.width,
            height: self.height,
            ..defaults
        }
    }
}

fn open_window(width: u32, height: u32) -> Result<Window, SceneError> {
    // Window creation panics when there's no display or GL context to be had
    let opened = panic::catch_unwind(|| Window::new_with_size("Solar System", width, height));
    opened.map_err(|cause| {
        let reason = cause
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| cause.downcast_ref::<&str>().map(|s| s.to_string()))
            .unwrap_or_else(|| String::from("window creation failed"));
        SceneError::GraphicsUnavailable(reason)
    })
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = args.scene_config();
    let scene = match SceneState::load(args.catalog.as_deref(), &config) {
        Ok(scene) => scene,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    let mut window = match open_window(args.width, args.height) {
        Ok(window) => window,
        Err(err) => {
            // Still useful without a screen
            log::error!("{}", err);
            print!("{}", scene.catalog().summary_table(&config.scale));
            return ExitCode::SUCCESS;
        }
    };
    window.set_framerate_limit(Some(60));

    let dispatcher = FocusDispatcher::new(ScrollTrack::for_catalog(scene.catalog()));
    let mut app = SolarApp::new(&mut window, scene, dispatcher);
    if args.free_roam {
        app.session_mut().set_free_roam(true);
    }
    window.render_loop(app);
    ExitCode::SUCCESS
}
