use std::time::{Duration, Instant};

use super::World;

/// Frames per second the per-frame rates are tuned for.
pub const NOMINAL_FPS: f32 = 60.0;
/// Longest step a single frame may take, so a stutter doesn't teleport anything.
pub const MAX_DT_UNITS: f32 = 4.0;

// Radians per nominal frame
pub const BODY_SPIN_RATE: f32 = 0.4 / NOMINAL_FPS;
pub const MOON_ORBIT_RATE: f32 = 0.8 / NOMINAL_FPS;
pub const CENTRAL_SPIN_RATE: f32 = 0.1 / NOMINAL_FPS;

/// Converts a measured frame time into nominal frames. Without a measurement, a
/// frame counts as exactly one.
pub fn dt_units(elapsed: Option<Duration>) -> f32 {
    match elapsed {
        Some(elapsed) => {
            let units = elapsed.as_secs_f32() * NOMINAL_FPS;
            if units.is_finite() {
                nalgebra::clamp(units, 0.0, MAX_DT_UNITS)
            } else {
                1.0
            }
        }
        None => 1.0,
    }
}

/// How far one frame moves things along. Motion uses the stutter-clamped `units`;
/// timed camera moves use the real `seconds`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStep {
    pub units: f32,
    pub seconds: f32,
}

impl FrameStep {
    /// A step of `units` nominal frames that took exactly as long as it should.
    pub fn nominal(units: f32) -> Self {
        FrameStep {
            units,
            seconds: units / NOMINAL_FPS,
        }
    }

    /// A step from a measured frame time. Without a measurement it's one nominal frame.
    pub fn measured(elapsed: Option<Duration>) -> Self {
        let seconds = elapsed
            .map(|elapsed| elapsed.as_secs_f32())
            .filter(|seconds| seconds.is_finite())
            .unwrap_or(1.0 / NOMINAL_FPS);
        FrameStep {
            units: dt_units(elapsed),
            seconds,
        }
    }
}

/// Measures wall-clock time between frames.
#[derive(Debug, Default)]
pub struct FrameClock {
    last_frame: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        FrameClock { last_frame: None }
    }

    /// The step since the previous call. The first call is one nominal frame.
    pub fn tick(&mut self) -> FrameStep {
        let now = Instant::now();
        let elapsed = self.last_frame.map(|last| now.duration_since(last));
        self.last_frame = Some(now);
        FrameStep::measured(elapsed)
    }
}

/// Moves every body along by `dt` nominal frames. Advancing by `a + b` lands in
/// the same place as advancing by `a` and then by `b`.
pub fn advance(world: &mut World, dt: f32) {
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }

    for body in world.bodies.iter() {
        world
            .graph
            .get_mut(body.pivot)
            .rotate_by(body.params.angular_speed * dt);
        world.graph.get_mut(body.mesh).rotate_by(BODY_SPIN_RATE * dt);
        if let Some(moon_pivot) = body.moon_pivot {
            world.graph.get_mut(moon_pivot).rotate_by(MOON_ORBIT_RATE * dt);
        }
    }
    world
        .graph
        .get_mut(world.central.mesh)
        .rotate_by(CENTRAL_SPIN_RATE * dt);

    world.starfield.advance(dt);
    world.belt.advance(dt);
}
