use std::f32::consts::PI;

use nalgebra::Point3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Slow start and end, used for camera flights.
    CubicInOut,
    /// Gentle in and out, used for the starfield pulse.
    SineInOut,
}

impl Easing {
    /// Maps normalized time `t` to eased progress. Inputs outside [0, 1] are clamped.
    pub fn apply(self, t: f32) -> f32 {
        let t = nalgebra::clamp(t, 0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

pub fn lerp_point(start: &Point3<f32>, end: &Point3<f32>, u: f32) -> Point3<f32> {
    start + (end - start) * u
}
