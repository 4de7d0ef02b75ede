use nalgebra::{Isometry3, Matrix4, Perspective3, Point2, Point3, Vector3};

use std::f32::consts::PI;

use crate::math::geometry::Ray;

const DEFAULT_FOVY: f32 = PI / 3.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 5000.0;

/// Where the camera sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
}

impl CameraState {
    pub fn new(eye: Point3<f32>, target: Point3<f32>) -> Self {
        CameraState { eye, target }
    }

    pub fn distance(&self) -> f32 {
        (self.eye - self.target).norm()
    }

    pub fn view_transform(&self) -> Isometry3<f32> {
        // look_at_rh is undefined when the eye sits on the target, or straight above it
        let mut eye = self.eye;
        if (eye - self.target).norm() < 1e-4 {
            eye.z += 1e-3;
        }
        let dir = (self.target - eye).normalize();
        let up = if dir.cross(&Vector3::y()).norm() < 1e-4 {
            Vector3::z()
        } else {
            Vector3::y()
        };
        Isometry3::look_at_rh(&eye, &self.target, &up)
    }
}

/// Perspective parameters, plus the last viewport size that had a non-zero area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    width: u32,
    height: u32,
    aspect: f32,
    fovy: f32,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32) -> Self {
        let mut projection = Projection {
            width: 1280,
            height: 720,
            aspect: 1280.0 / 720.0,
            fovy: DEFAULT_FOVY,
            znear: Z_NEAR,
            zfar: Z_FAR,
        };
        projection.resize(width, height);
        projection
    }

    /// Applies a new viewport size. Zero-area sizes are ignored and leave the last
    /// valid aspect ratio in place; returns whether anything was applied.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring resize to {}x{}", width, height);
            return false;
        }
        self.width = width;
        self.height = height;
        self.aspect = width as f32 / height as f32;
        true
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    pub fn clip_planes(&self) -> (f32, f32) {
        (self.znear, self.zfar)
    }

    pub fn perspective(&self) -> Perspective3<f32> {
        Perspective3::new(self.aspect, self.fovy, self.znear, self.zfar)
    }

    /// Projection * view for the given camera.
    pub fn transformation(&self, camera: &CameraState) -> Matrix4<f32> {
        self.perspective().into_inner() * camera.view_transform().to_homogeneous()
    }

    /// Converts a window position in pixels (origin top-left) to normalized device
    /// coordinates.
    pub fn pixel_to_ndc(&self, x: f64, y: f64) -> Point2<f32> {
        Point2::new(
            (x as f32 / self.width as f32) * 2.0 - 1.0,
            1.0 - (y as f32 / self.height as f32) * 2.0,
        )
    }

    pub fn ray_through(&self, camera: &CameraState, ndc: &Point2<f32>) -> Option<Ray> {
        let inverse = self.transformation(camera).try_inverse()?;
        Ray::from_ndc(ndc, &inverse)
    }
}
