use kiss3d::camera::Camera;
use kiss3d::event::WindowEvent;
use kiss3d::resource::ShaderUniform;
use kiss3d::window::Canvas;
use nalgebra::{Isometry3, Matrix4, Point3};

use crate::director::{CameraState, Projection};

// The scene decides where the camera goes; this camera only shows kiss3d the
// latest pose. Input goes through the controller, never through here.
pub struct SceneCamera {
    pose: CameraState,
    projection: Projection,
}

impl SceneCamera {
    pub fn new(pose: CameraState, projection: Projection) -> Self {
        SceneCamera { pose, projection }
    }

    pub fn sync(&mut self, pose: &CameraState, projection: &Projection) {
        self.pose = *pose;
        self.projection = *projection;
    }

    fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection.perspective().into_inner()
    }

    fn view_matrix(&self) -> Matrix4<f32> {
        self.pose.view_transform().to_homogeneous()
    }
}

impl Camera for SceneCamera {
    fn handle_event(&mut self, _canvas: &Canvas, _event: &WindowEvent) {}

    fn eye(&self) -> Point3<f32> {
        self.pose.eye
    }

    fn view_transform(&self) -> Isometry3<f32> {
        self.pose.view_transform()
    }

    fn transformation(&self) -> Matrix4<f32> {
        self.projection.transformation(&self.pose)
    }

    fn inverse_transformation(&self) -> Matrix4<f32> {
        self.transformation()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity)
    }

    fn clip_planes(&self) -> (f32, f32) {
        self.projection.clip_planes()
    }

    fn update(&mut self, _canvas: &Canvas) {}

    fn upload(
        &self,
        _: usize,
        proj: &mut ShaderUniform<Matrix4<f32>>,
        view: &mut ShaderUniform<Matrix4<f32>>,
    ) {
        proj.upload(&self.projection_matrix());
        view.upload(&self.view_matrix());
    }
}
