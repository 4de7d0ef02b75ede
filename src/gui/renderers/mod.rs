use std::f32::consts::TAU;

use kiss3d::camera::Camera;
use kiss3d::renderer::{LineRenderer, PointRenderer, Renderer};
use nalgebra::Point3;

use self::utils::{closed_loop, draw_polyline};

mod utils;

const ORBIT_GUIDE_SEGMENTS: usize = 128;
const STAR_POINT_SIZE: f32 = 2.0;

/// Immediate-mode lines and points. Everything drawn here has to be drawn again
/// next frame.
pub struct CompoundRenderer {
    line_renderer: LineRenderer,
    point_renderer: PointRenderer,
}

impl CompoundRenderer {
    pub fn new() -> Self {
        let mut point_renderer = PointRenderer::new();
        point_renderer.set_point_size(STAR_POINT_SIZE);
        CompoundRenderer {
            line_renderer: LineRenderer::new(),
            point_renderer,
        }
    }

    /// A flat circle around the origin in the orbital (xz) plane.
    pub fn draw_orbit_guide(&mut self, radius: f32, color: Point3<f32>) {
        let points = closed_loop(
            |theta: f32| Point3::new(radius * theta.cos(), 0.0, radius * theta.sin()),
            TAU,
            ORBIT_GUIDE_SEGMENTS,
        );
        draw_polyline(&mut self.line_renderer, points, &color);
    }

    pub fn draw_points<I: Iterator<Item = Point3<f32>>>(&mut self, points: I, color: Point3<f32>) {
        for pt in points {
            self.point_renderer.draw_point(pt, color);
        }
    }
}

impl Renderer for CompoundRenderer {
    fn render(&mut self, pass: usize, camera: &mut dyn Camera) {
        self.line_renderer.render(pass, camera);
        self.point_renderer.render(pass, camera);
    }
}
