use std::path::Path;

use nalgebra::{Point2, Point3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::director::{
    goal_pose, CameraDirector, CameraState, DirectorState, FocusKind, FreeRoamController,
    FreeRoamStyle, Projection,
};
use crate::error::{SceneError, SceneResult};

use self::catalog::{BodyDefinition, Catalog, ScaleConstants};
use self::clock::FrameStep;
use self::decorations::{AsteroidBelt, BeltConfig, Starfield, StarfieldConfig};
use self::factory::{create_body, create_central_body, BodyInstance, CentralBody};
use self::graph::SceneGraph;

pub mod catalog;
pub mod clock;
pub mod decorations;
pub mod factory;
pub mod graph;

pub const INTRO_SECONDS: f32 = 3.0;

/// Where the camera starts when the scene opens with a fly-in.
pub fn intro_start() -> CameraState {
    CameraState::new(Point3::new(0.0, 80.0, 250.0), Point3::origin())
}

/// The overview pose the fly-in ends at.
pub fn intro_end() -> CameraState {
    CameraState::new(Point3::new(0.0, 20.0, 100.0), Point3::origin())
}

const ORBIT_GUIDE_BRIGHTNESS: f32 = 0.1;

/// Knobs for building a scene. Everything has a sensible default.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub scale: ScaleConstants,
    pub stars: StarfieldConfig,
    pub belt: BeltConfig,
    /// Fixed seed for the decorations; `None` scatters them differently every run
    pub seed: Option<u64>,
    pub free_roam_style: FreeRoamStyle,
    /// Fly in from far away before focusing anything
    pub intro: bool,
    pub width: u32,
    pub height: u32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let scale = ScaleConstants::default();
        SceneConfig {
            belt: BeltConfig::for_distance_scale(scale.distance_scale),
            scale,
            stars: StarfieldConfig::default(),
            seed: None,
            free_roam_style: FreeRoamStyle::PointerOrbit,
            intro: true,
            width: 1280,
            height: 720,
        }
    }
}

/// Which controller is currently allowed to move the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraOwner {
    Director,
    FreeRoam,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitGuide {
    pub radius: f32,
    pub color: Point3<f32>,
}

/// Everything that moves on its own: bodies, their scene graph, and the
/// decorations.
#[derive(Debug, Clone)]
pub struct World {
    pub graph: SceneGraph,
    pub central: CentralBody,
    pub bodies: Vec<BodyInstance>,
    pub starfield: Starfield,
    pub belt: AsteroidBelt,
    pub orbit_guides: Vec<OrbitGuide>,
}

impl World {
    pub fn build(catalog: &Catalog, config: &SceneConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut graph = SceneGraph::new();
        let central = create_central_body(&mut graph, catalog.central(), &config.scale);
        let bodies: Vec<_> = catalog
            .orbiting()
            .map(|def| create_body(&mut graph, def, &config.scale))
            .collect();

        let guide_color = Point3::new(
            ORBIT_GUIDE_BRIGHTNESS,
            ORBIT_GUIDE_BRIGHTNESS,
            ORBIT_GUIDE_BRIGHTNESS,
        );
        let orbit_guides = bodies
            .iter()
            .filter(|b| b.params.orbit_radius > 0.0)
            .map(|b| OrbitGuide {
                radius: b.params.orbit_radius,
                color: guide_color,
            })
            .collect();

        World {
            graph,
            central,
            bodies,
            starfield: Starfield::generate(&config.stars, &mut rng),
            belt: AsteroidBelt::generate(&config.belt, &mut rng),
            orbit_guides,
        }
    }

    pub fn body(&self, name: &str) -> Option<&BodyInstance> {
        self.bodies
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Current world-space center of the named body.
    pub fn position_of(&self, name: &str) -> Option<Point3<f32>> {
        if self.central.name.eq_ignore_ascii_case(name) {
            return Some(self.graph.world_position(self.central.mesh));
        }
        self.body(name).map(|b| self.graph.world_position(b.mesh))
    }

    fn focus_kind(&self, name: &str) -> Option<FocusKind> {
        if self.central.name.eq_ignore_ascii_case(name) {
            return Some(FocusKind::Central);
        }
        self.body(name).map(|b| FocusKind::Orbiting {
            render_size: b.params.render_size,
        })
    }

    /// Every body as (name, world center, radius), the central body first.
    pub fn pickables(&self) -> impl Iterator<Item = (&str, Point3<f32>, f32)> + '_ {
        let central = std::iter::once((
            self.central.name.as_str(),
            self.graph.world_position(self.central.mesh),
            self.central.params.render_size,
        ));
        let orbiting = self.bodies.iter().map(move |b| {
            (
                b.name.as_str(),
                self.graph.world_position(b.mesh),
                b.params.render_size,
            )
        });
        central.chain(orbiting)
    }
}

/// The whole running scene: the world plus the camera and whoever is steering it.
pub struct SceneState {
    catalog: Catalog,
    world: World,
    camera: CameraState,
    projection: Projection,
    director: CameraDirector,
    free_roam: FreeRoamController,
    owner: CameraOwner,
    // Real seconds since the scene started, the director's clock
    elapsed: f32,
    intro_pending: bool,
}

impl SceneState {
    /// Builds a scene from the catalog file at `path`, or the built-in catalog.
    pub fn load(path: Option<&Path>, config: &SceneConfig) -> SceneResult<Self> {
        let catalog = match path {
            Some(path) => Catalog::from_file(path)?,
            None => Catalog::builtin(),
        };
        Ok(SceneState::assemble(catalog, config))
    }

    pub fn assemble(catalog: Catalog, config: &SceneConfig) -> Self {
        let world = World::build(&catalog, config);
        log::info!(
            "Assembled scene with {} bodies, {} stars, {} asteroids",
            world.bodies.len() + 1,
            world.starfield.len(),
            world.belt.len()
        );

        let mut director = CameraDirector::new();
        let camera = if config.intro {
            director.fly_to(&intro_start(), intro_end(), INTRO_SECONDS, 0.0);
            intro_start()
        } else {
            intro_end()
        };

        SceneState {
            catalog,
            world,
            camera,
            projection: Projection::new(config.width, config.height),
            director,
            free_roam: FreeRoamController::new(config.free_roam_style),
            owner: CameraOwner::Director,
            elapsed: 0.0,
            intro_pending: config.intro,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn owner(&self) -> CameraOwner {
        self.owner
    }

    pub fn director_state(&self) -> DirectorState {
        self.director.state()
    }

    pub fn director_goal(&self) -> Option<CameraState> {
        self.director.goal()
    }

    pub fn free_roam(&self) -> &FreeRoamController {
        &self.free_roam
    }

    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed
    }

    pub fn intro_pending(&self) -> bool {
        self.intro_pending
    }

    /// Where the scene's only light sits.
    pub fn light_position(&self) -> Point3<f32> {
        self.world.graph.world_position(self.world.central.mesh)
    }

    /// Frames the named body. Under the director this starts a transition to a pose
    /// computed from where the body is right now; under free-roam it re-centers the
    /// orbit on the body instead.
    pub fn focus_body(&mut self, name: &str) -> SceneResult<&BodyDefinition> {
        let def = self
            .catalog
            .get(name)
            .ok_or_else(|| SceneError::UnknownBody(name.to_owned()))?;
        let (position, kind) = match (self.world.position_of(&def.name), self.world.focus_kind(&def.name)) {
            (Some(position), Some(kind)) => (position, kind),
            _ => return Err(SceneError::UnknownBody(name.to_owned())),
        };

        // An explicit focus supersedes whatever the intro was going to do
        self.intro_pending = false;
        match self.owner {
            CameraOwner::Director => {
                let goal = goal_pose(position, kind);
                self.director.focus(&self.camera, goal, self.elapsed);
            }
            CameraOwner::FreeRoam => self.free_roam.engage(position, &self.camera),
        }
        log::info!("Focusing on {}", def.name);
        Ok(def)
    }

    /// The body under the given point on screen, if any. The closest hit wins.
    pub fn pick(&self, ndc: &Point2<f32>) -> Option<&str> {
        let ray = self.projection.ray_through(&self.camera, ndc)?;
        self.world
            .pickables()
            .filter_map(|(name, center, radius)| {
                ray.intersect_sphere(&center, radius).map(|t| (name, t))
            })
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(name, _)| name)
    }

    /// Hands the camera to the free-roam controller, orbiting `center_body` (or the
    /// origin if there isn't one). Any director transition is dropped on the spot.
    pub fn engage_free_roam(&mut self, center_body: Option<&str>) {
        let center = center_body
            .and_then(|name| self.world.position_of(name))
            .unwrap_or_else(Point3::origin);
        self.director.cancel();
        self.intro_pending = false;
        self.free_roam.engage(center, &self.camera);
        self.owner = CameraOwner::FreeRoam;
        log::info!("Free-roam on, orbiting {:?}", center);
    }

    /// Gives the camera back to the director. It stays put until the next focus.
    pub fn release_free_roam(&mut self) {
        self.owner = CameraOwner::Director;
        log::info!("Free-roam off");
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.free_roam.set_pointer(x, y);
    }

    pub fn zoom(&mut self, factor: f32) {
        self.free_roam.zoom(factor);
    }

    pub fn pulse_stars(&mut self) {
        self.world.starfield.pulse();
    }

    /// Applies a new viewport size; zero-area sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.projection.resize(width, height)
    }

    /// Advances the scene by `dt` nominal frames, taking exactly as long as they
    /// should. Returns true on the tick the intro flight lands.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.step(FrameStep::nominal(dt))
    }

    /// Advances the scene by one measured frame and moves the camera with whichever
    /// controller owns it. Transitions run on real seconds, so a slow host doesn't
    /// stretch them out. Returns true on the tick the intro flight lands.
    pub fn step(&mut self, step: FrameStep) -> bool {
        let dt = if step.units.is_finite() { step.units.max(0.0) } else { 0.0 };
        let seconds = if step.seconds.is_finite() { step.seconds.max(0.0) } else { 0.0 };
        clock::advance(&mut self.world, dt);
        self.elapsed += seconds;

        match self.owner {
            CameraOwner::Director => {
                let finished = self.director.update(&mut self.camera, self.elapsed);
                if finished && self.intro_pending {
                    self.intro_pending = false;
                    return true;
                }
            }
            CameraOwner::FreeRoam => self.free_roam.update(&mut self.camera, dt),
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(intro: bool) -> SceneState {
        let config = SceneConfig {
            seed: Some(1),
            intro,
            ..SceneConfig::default()
        };
        SceneState::assemble(Catalog::builtin(), &config)
    }

    fn run(scene: &mut SceneState, frames: usize) {
        for _ in 0..frames {
            scene.tick(1.0);
        }
    }

    #[test]
    fn test_world_layout() {
        let scene = scene(false);
        let world = scene.world();
        assert_eq!(world.bodies.len(), 6);
        assert_eq!(world.orbit_guides.len(), 6);
        assert_eq!(world.starfield.len(), 800);
        assert_eq!(world.belt.len(), 1500);
        approx::assert_relative_eq!(
            world.position_of("earth").unwrap(),
            Point3::new(30.0, 0.0, 0.0)
        );
        assert_eq!(scene.light_position(), Point3::origin());
    }

    #[test]
    fn test_focus_sun_goal() {
        let mut scene = scene(false);
        let def = scene.focus_body("sun").unwrap();
        assert_eq!(def.name, "Sun");
        let goal = scene.director_goal().unwrap();
        approx::assert_relative_eq!(goal.eye, Point3::new(50.0, 12.5, 50.0));

        run(&mut scene, 100);
        assert_eq!(scene.director_state(), DirectorState::Idle);
        assert_eq!(*scene.camera(), goal);
    }

    #[test]
    fn test_goal_fixed_at_focus_time() {
        let mut scene = scene(false);
        run(&mut scene, 10);
        let earth_then = scene.world().position_of("Earth").unwrap();
        scene.focus_body("Earth").unwrap();
        run(&mut scene, 100);

        assert_eq!(scene.camera().target, earth_then);
        let earth_now = scene.world().position_of("Earth").unwrap();
        assert!((earth_now - earth_then).norm() > 1e-3);
    }

    #[test]
    fn test_unknown_body() {
        let mut scene = scene(false);
        assert!(matches!(
            scene.focus_body("Pluto"),
            Err(SceneError::UnknownBody(_))
        ));
        assert_eq!(scene.director_state(), DirectorState::Idle);
    }

    #[test]
    fn test_intro_lands_then_reports_once() {
        let mut scene = scene(true);
        assert_eq!(*scene.camera(), intro_start());

        let mut landed = 0;
        for _ in 0..300 {
            if scene.tick(1.0) {
                landed += 1;
            }
        }
        assert_eq!(landed, 1);
        assert_eq!(*scene.camera(), intro_end());
        assert!(!scene.intro_pending());
    }

    #[test]
    fn test_focus_during_intro_wins() {
        let mut scene = scene(true);
        run(&mut scene, 30);
        scene.focus_body("Mars").unwrap();
        let mut landed = false;
        for _ in 0..300 {
            landed |= scene.tick(1.0);
        }
        assert!(!landed);
        approx::assert_abs_diff_eq!(scene.camera().target.y, 0.0, epsilon = 1e-5);
        assert!(scene.camera().target.coords.norm() > 40.0);
    }

    #[test]
    fn test_pick_what_the_camera_frames() {
        let mut scene = scene(false);
        let earth = scene.world().position_of("Earth").unwrap();
        scene.camera = goal_pose(earth, FocusKind::Orbiting { render_size: 1.4 });

        // Straight down the view axis
        assert_eq!(scene.pick(&Point2::origin()), Some("Earth"));
        // Top corner sees nothing but stars
        assert_eq!(scene.pick(&Point2::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_pick_prefers_closer_body() {
        let mut scene = scene(false);
        // Every planet starts on the +x axis, so from out here Earth hides Venus,
        // Mercury and the Sun behind it
        scene.camera = CameraState::new(Point3::new(40.0, 0.0, 0.0), Point3::origin());
        assert_eq!(scene.pick(&Point2::origin()), Some("Earth"));

        // From the side nothing is in the way
        scene.camera = CameraState::new(Point3::new(0.0, 0.0, 40.0), Point3::origin());
        assert_eq!(scene.pick(&Point2::origin()), Some("Sun"));
    }

    #[test]
    fn test_free_roam_owns_camera_exclusively() {
        let mut scene = scene(false);
        scene.focus_body("Jupiter").unwrap();
        run(&mut scene, 10);

        scene.engage_free_roam(Some("Jupiter"));
        assert_eq!(scene.owner(), CameraOwner::FreeRoam);
        assert_eq!(scene.director_state(), DirectorState::Idle);
        assert!(scene.director_goal().is_none());

        // A focus request re-centers the free-roam orbit instead
        scene.focus_body("Saturn").unwrap();
        assert_eq!(scene.director_state(), DirectorState::Idle);
        let saturn = scene.world().position_of("Saturn").unwrap();
        assert_eq!(scene.free_roam().center(), saturn);

        run(&mut scene, 5);
        assert_eq!(scene.camera().target, saturn);

        scene.release_free_roam();
        assert_eq!(scene.owner(), CameraOwner::Director);
        let before = *scene.camera();
        run(&mut scene, 5);
        assert_eq!(*scene.camera(), before);
    }

    #[test]
    fn test_load_reports_catalog_errors() {
        let config = SceneConfig::default();
        let missing = Path::new("/nonexistent/catalog.json");
        assert!(matches!(
            SceneState::load(Some(missing), &config),
            Err(SceneError::Catalog(_))
        ));
        assert!(SceneState::load(None, &config).is_ok());
    }

    #[test]
    fn test_slow_frames_keep_transition_duration() {
        let mut scene = scene(false);
        scene.focus_body("Earth").unwrap();

        // 10 fps: every frame hits the stutter clamp
        let slow = FrameStep::measured(Some(std::time::Duration::from_millis(100)));
        for _ in 0..11 {
            scene.step(slow);
        }
        assert_eq!(scene.director_state(), DirectorState::Transitioning);
        scene.step(slow);
        assert_eq!(scene.director_state(), DirectorState::Idle);
        approx::assert_relative_eq!(scene.elapsed_seconds(), 1.2, max_relative = 1e-4);

        // Orbits still only moved by the clamped amount
        let earth = scene.world().body("Earth").unwrap().clone();
        approx::assert_abs_diff_eq!(
            scene.world().graph.get(earth.pivot).spin(),
            12.0 * clock::MAX_DT_UNITS * earth.params.angular_speed,
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_zero_area_resize() {
        let mut scene = scene(false);
        scene.resize(1000, 500);
        assert!(!scene.resize(0, 500));
        assert!(!scene.resize(1000, 0));
        approx::assert_relative_eq!(scene.projection().aspect(), 2.0);
    }
}
