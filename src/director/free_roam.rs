use nalgebra::{Point3, Vector2, Vector3};

use std::f32::consts::TAU;
use std::fmt;
use std::str::FromStr;

use super::pose::CameraState;
use crate::math::geometry::wrap_angle;

const DEFAULT_RADIUS: f32 = 50.0;
const RADIUS_LIMITS: (f32, f32) = (20.0, 400.0);
/// Fraction of the remaining distance covered per nominal frame
const DAMPING: f32 = 0.08;
/// Radians per nominal frame
const AUTO_ROTATE_RATE: f32 = 0.004;
const AUTO_ROTATE_ELEVATION: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreeRoamStyle {
    /// The pointer position picks a point on a sphere around the focus
    PointerOrbit,
    /// The camera slowly circles the focus on its own
    AutoRotate,
}

impl FromStr for FreeRoamStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "orbit" | "pointer" | "pointer-orbit" => Ok(FreeRoamStyle::PointerOrbit),
            "auto" | "auto-rotate" => Ok(FreeRoamStyle::AutoRotate),
            other => Err(format!(
                "unknown free-roam style {:?}, expected \"orbit\" or \"auto-rotate\"",
                other
            )),
        }
    }
}

impl fmt::Display for FreeRoamStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FreeRoamStyle::PointerOrbit => write!(f, "orbit"),
            FreeRoamStyle::AutoRotate => write!(f, "auto-rotate"),
        }
    }
}

/// Drives the camera directly while free-roam is on.
#[derive(Debug, Clone)]
pub struct FreeRoamController {
    style: FreeRoamStyle,
    center: Point3<f32>,
    // Both in [-0.5, 0.5], relative to the middle of the window
    pointer: Vector2<f32>,
    radius: f32,
    auto_angle: f32,
}

impl FreeRoamController {
    pub fn new(style: FreeRoamStyle) -> Self {
        FreeRoamController {
            style,
            center: Point3::origin(),
            pointer: Vector2::zeros(),
            radius: DEFAULT_RADIUS,
            auto_angle: 0.0,
        }
    }

    pub fn style(&self) -> FreeRoamStyle {
        self.style
    }

    pub fn center(&self) -> Point3<f32> {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Takes over around `center`, continuing from wherever the camera is now.
    pub fn engage(&mut self, center: Point3<f32>, camera: &CameraState) {
        self.center = center;
        let offset = camera.eye - center;
        self.auto_angle = wrap_angle(offset.x.atan2(offset.z));
    }

    pub fn set_pointer(&mut self, x: f32, y: f32) {
        let clamp = |v: f32| {
            if v.is_finite() {
                nalgebra::clamp(v, -0.5, 0.5)
            } else {
                0.0
            }
        };
        self.pointer = Vector2::new(clamp(x), clamp(y));
    }

    pub fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.radius = nalgebra::clamp(self.radius * factor, RADIUS_LIMITS.0, RADIUS_LIMITS.1);
    }

    pub fn desired_eye(&self) -> Point3<f32> {
        let offset = match self.style {
            FreeRoamStyle::PointerOrbit => {
                let theta = self.pointer.x * TAU;
                Vector3::new(theta.sin(), -self.pointer.y, theta.cos()) * self.radius
            }
            FreeRoamStyle::AutoRotate => Vector3::new(
                self.auto_angle.sin(),
                AUTO_ROTATE_ELEVATION,
                self.auto_angle.cos(),
            ) * self.radius,
        };
        self.center + offset
    }

    pub fn update(&mut self, camera: &mut CameraState, dt: f32) {
        if self.style == FreeRoamStyle::AutoRotate {
            self.auto_angle = wrap_angle(self.auto_angle + AUTO_ROTATE_RATE * dt);
        }

        // Same damping no matter how the frame time is sliced up
        let blend = 1.0 - (1.0 - DAMPING).powf(dt.max(0.0));
        let desired = self.desired_eye();
        camera.eye += (desired - camera.eye) * blend;
        camera.target = self.center;
    }
}
