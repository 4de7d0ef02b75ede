use nalgebra::{Point3, Vector3};

use crate::math::easing::{lerp_point, Easing};

mod free_roam;
mod pose;

pub use free_roam::{FreeRoamController, FreeRoamStyle};
pub use pose::{CameraState, Projection};

/// How long a focus transition takes, in seconds.
pub const TRANSITION_SECONDS: f32 = 1.2;
pub const CENTRAL_FOCUS_OFFSET: f32 = 50.0;
pub const FOCUS_RADIUS_MULTIPLIER: f32 = 6.0;
pub const MIN_FOCUS_OFFSET: f32 = 4.0;

const TRANSITION_EASING: Easing = Easing::CubicInOut;

/// What kind of body the camera is being pointed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusKind {
    Central,
    Orbiting { render_size: f32 },
}

pub fn focus_offset(kind: FocusKind) -> f32 {
    match kind {
        FocusKind::Central => CENTRAL_FOCUS_OFFSET,
        FocusKind::Orbiting { render_size } => {
            let offset = render_size * FOCUS_RADIUS_MULTIPLIER;
            if offset.is_finite() {
                offset.max(MIN_FOCUS_OFFSET)
            } else {
                MIN_FOCUS_OFFSET
            }
        }
    }
}

/// The pose that frames a body at `position`: up and off to one side, looking
/// straight at it.
pub fn goal_pose(position: Point3<f32>, kind: FocusKind) -> CameraState {
    let offset = focus_offset(kind);
    CameraState::new(
        position + Vector3::new(offset, offset / 4.0, offset),
        position,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorState {
    Idle,
    Transitioning,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: CameraState,
    to: CameraState,
    started_at: f32,
    duration: f32,
}

impl Transition {
    fn progress(&self, now: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        nalgebra::clamp((now - self.started_at) / self.duration, 0.0, 1.0)
    }
}

/// Moves the camera between poses. At most one move is in flight; starting a new
/// one replaces the old one, continuing from wherever the camera currently is.
///
/// The goal is fixed when the move starts. A body that keeps orbiting during the
/// move is not chased; the next focus request samples its position again.
#[derive(Debug, Clone, Default)]
pub struct CameraDirector {
    transition: Option<Transition>,
}

impl CameraDirector {
    pub fn new() -> Self {
        CameraDirector { transition: None }
    }

    pub fn state(&self) -> DirectorState {
        match self.transition {
            None => DirectorState::Idle,
            Some(_) => DirectorState::Transitioning,
        }
    }

    /// The pose the in-flight move ends at.
    pub fn goal(&self) -> Option<CameraState> {
        self.transition.map(|t| t.to)
    }

    pub fn focus(&mut self, camera: &CameraState, goal: CameraState, now: f32) {
        self.fly_to(camera, goal, TRANSITION_SECONDS, now);
    }

    pub fn fly_to(&mut self, camera: &CameraState, goal: CameraState, duration: f32, now: f32) {
        self.transition = Some(Transition {
            from: *camera,
            to: goal,
            started_at: now,
            duration,
        });
    }

    pub fn cancel(&mut self) {
        self.transition = None;
    }

    /// Moves the camera along the current transition. Returns true on the tick the
    /// transition completes.
    pub fn update(&mut self, camera: &mut CameraState, now: f32) -> bool {
        let transition = match self.transition {
            Some(t) => t,
            None => return false,
        };

        let t = transition.progress(now);
        if t >= 1.0 {
            *camera = transition.to;
            self.transition = None;
            return true;
        }

        let u = TRANSITION_EASING.apply(t);
        camera.eye = lerp_point(&transition.from.eye, &transition.to.eye, u);
        camera.target = lerp_point(&transition.from.target, &transition.to.target, u);
        false
    }
}
