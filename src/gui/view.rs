use std::cell::RefCell;
use std::rc::Rc;

use kiss3d::camera::Camera;
use kiss3d::light::Light;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::resource::Mesh;
use kiss3d::scene::SceneNode;
use kiss3d::window::Window;
use nalgebra::{Point2, Point3, Vector3};

use super::camera::SceneCamera;
use super::renderers::CompoundRenderer;
use crate::focus::FocusTarget;
use crate::math::mesh::{double_sided_annulus, uv_sphere};
use crate::model::graph::{Node, Shape};
use crate::model::{CameraOwner, SceneState};
use crate::session::RenderSurface;

const STAR_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const ROCK_COLOR: [f32; 3] = [0.53, 0.53, 0.53];
const TEXT_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
const DIM_TEXT_COLOR: [f32; 3] = [0.6, 0.6, 0.6];
const STATUS_TEXT_WIDTH: f32 = 400.0;
const HINT_TEXT_HEIGHT: f32 = 60.0;

/// Where the status block (top right) and the key hint (bottom left) start, for a
/// window of the given size.
fn overlay_anchors(width: u32, height: u32) -> (Point2<f32>, Point2<f32>) {
    // kiss3d text coordinates are twice the window size
    let status = Point2::new(f32::max(width as f32 * 2.0 - STATUS_TEXT_WIDTH, 0.0), 0.0);
    let hint = Point2::new(0.0, f32::max(height as f32 * 2.0 - HINT_TEXT_HEIGHT, 0.0));
    (status, hint)
}

/// The latest focused body, shared with the focus listener.
pub type FocusLabel = Rc<RefCell<Option<FocusTarget>>>;

/// Mirrors a scene's node arena into kiss3d scene nodes and draws the overlays.
pub struct View {
    // Same indices as the scene graph
    nodes: Vec<SceneNode>,
    roots: Vec<SceneNode>,
    camera: SceneCamera,
    renderer: CompoundRenderer,
    label: FocusLabel,
    released: bool,
}

impl View {
    pub fn new(window: &mut Window, scene: &SceneState, label: FocusLabel) -> Self {
        window.set_background_color(0.0, 0.0, 0.0);
        window.set_light(Light::Absolute(scene.light_position()));

        let mut nodes: Vec<SceneNode> = Vec::with_capacity(scene.world().graph.len());
        let mut roots = vec![];
        for (_, node) in scene.world().graph.nodes() {
            // Parents always come first, so they're already in `nodes`
            let mut group = match node.parent() {
                None => {
                    let group = window.add_group();
                    roots.push(group.clone());
                    group
                }
                Some(parent) => nodes[parent.0].add_group(),
            };
            Self::attach_mesh(&mut group, node);
            group.set_local_transformation(node.local_transform());
            nodes.push(group);
        }

        View {
            nodes,
            roots,
            camera: SceneCamera::new(*scene.camera(), *scene.projection()),
            renderer: CompoundRenderer::new(),
            label,
            released: false,
        }
    }

    fn attach_mesh(group: &mut SceneNode, node: &Node) {
        let (data, normals) = match node.shape {
            Shape::Pivot => return,
            Shape::Sphere {
                radius,
                width_segments,
                height_segments,
            } => {
                let data = uv_sphere(radius, width_segments, height_segments);
                // The light sits at the center of an emissive sphere, so pointing
                // its normals inward lights the whole surface
                let normals = if node.material.emissive {
                    Some(
                        data.coords
                            .iter()
                            .map(|pt| -pt.coords.try_normalize(1e-6).unwrap_or_else(Vector3::y))
                            .collect(),
                    )
                } else {
                    None
                };
                (data, normals)
            }
            Shape::Ring {
                inner_radius,
                outer_radius,
                segments,
            } => {
                // Both windings share vertices, so computed normals would cancel out
                let data = double_sided_annulus(inner_radius, outer_radius, segments);
                let normals = vec![Vector3::z(); data.coords.len()];
                (data, Some(normals))
            }
        };

        let mesh = Rc::new(RefCell::new(Mesh::new(
            data.coords,
            data.faces,
            normals,
            None,
            false,
        )));
        let mut object = group.add_mesh(mesh, Vector3::new(1.0, 1.0, 1.0));

        // No blending here, so translucency fades toward the black background
        let material = &node.material;
        let color = material.color * material.opacity;
        object.set_color(color.x, color.y, color.z);
    }

    /// Copies the scene's current transforms and camera over, and queues up this
    /// frame's lines and points.
    pub fn prerender_scene(&mut self, window: &mut Window, scene: &SceneState, fps: f64) {
        if self.released {
            return;
        }

        let world = scene.world();
        for (id, node) in world.graph.nodes() {
            self.nodes[id.0].set_local_transformation(node.local_transform());
        }
        self.camera.sync(scene.camera(), scene.projection());

        for guide in world.orbit_guides.iter() {
            self.renderer.draw_orbit_guide(guide.radius, guide.color);
        }
        self.renderer.draw_points(world.starfield.world_points(), Point3::from(STAR_COLOR));
        self.renderer.draw_points(world.belt.world_points(), Point3::from(ROCK_COLOR));

        self.draw_text(window, scene, fps);
    }

    fn draw_text(&self, window: &mut Window, scene: &SceneState, fps: f64) {
        let font = kiss3d::text::Font::default();

        if let Some(target) = self.label.borrow().as_ref() {
            window.draw_text(
                &format!("{}\n{}", target.body_name, target.description),
                &Point2::origin(),
                60.0,
                &font,
                &Point3::from(TEXT_COLOR),
            );
        }

        let (status_at, hint_at) = overlay_anchors(window.width(), window.height());
        let mode = match scene.owner() {
            CameraOwner::Director => "scroll",
            CameraOwner::FreeRoam => "free-roam",
        };
        window.draw_text(
            &format!("Mode: {}\nFPS: {:.0}", mode, fps),
            &status_at,
            40.0,
            &font,
            &Point3::from(DIM_TEXT_COLOR),
        );
        window.draw_text(
            "Scroll or Q/E: next body    Click: focus    F: free-roam",
            &hint_at,
            40.0,
            &font,
            &Point3::from(DIM_TEXT_COLOR),
        );
    }

    pub fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        (Some(&mut self.camera), None, Some(&mut self.renderer), None)
    }
}

impl RenderSurface for View {
    fn resize(&mut self, width: u32, height: u32) {
        // kiss3d resizes its own framebuffer; the overlay reads the window size
        log::debug!("Viewport now {}x{}", width, height);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        for root in self.roots.iter_mut() {
            root.unlink();
        }
        self.roots.clear();
        self.nodes.clear();
        self.released = true;
        log::debug!("Released scene nodes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_stays_on_screen() {
        let (status, hint) = overlay_anchors(1280, 720);
        approx::assert_relative_eq!(status, Point2::new(2160.0, 0.0));
        approx::assert_relative_eq!(hint, Point2::new(0.0, 1380.0));

        // Same window after a resize to twice the size
        let (status, hint) = overlay_anchors(2560, 1440);
        assert!(status.x < 2.0 * 2560.0 && status.x > 2.0 * 1280.0);
        assert!(hint.y < 2.0 * 1440.0 && hint.y > 2.0 * 720.0);
    }

    #[test]
    fn test_overlay_in_tiny_window() {
        let (status, hint) = overlay_anchors(100, 20);
        assert_eq!(status, Point2::new(0.0, 0.0));
        assert_eq!(hint, Point2::new(0.0, 0.0));
    }
}
