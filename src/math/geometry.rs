use nalgebra::{Matrix4, Point2, Point3, Unit, Vector3};

use std::f32::consts::TAU;

/// Wraps an angle into [0, 2pi).
pub fn wrap_angle(theta: f32) -> f32 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Option<Self> {
        let direction = Unit::try_new(direction, f32::EPSILON)?;
        Some(Ray { origin, direction })
    }

    /// Builds the ray that passes through the given normalized device coordinates
    /// (x right, y up, both in [-1, 1]), by unprojecting the near and far planes
    /// with the inverse of projection * view.
    pub fn from_ndc(ndc: &Point2<f32>, inverse_transformation: &Matrix4<f32>) -> Option<Self> {
        let near = inverse_transformation.transform_point(&Point3::new(ndc.x, ndc.y, -1.0));
        let far = inverse_transformation.transform_point(&Point3::new(ndc.x, ndc.y, 1.0));
        Ray::new(near, far - near)
    }

    pub fn at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction.into_inner() * t
    }

    /// Distance along the ray to the first hit with the sphere, if any.
    /// A ray starting inside the sphere hits its far side.
    pub fn intersect_sphere(&self, center: &Point3<f32>, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let b = oc.dot(&self.direction);
        let c = oc.norm_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let (t_near, t_far) = (-b - root, -b + root);
        if t_near >= 0.0 {
            Some(t_near)
        } else if t_far >= 0.0 {
            Some(t_far)
        } else {
            None
        }
    }
}
