use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};

use crate::math::geometry::wrap_angle;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Invisible frame, only carries its children around
    Pivot,
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Flat annulus in the node's local xy-plane
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        segments: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Point3<f32>,
    pub opacity: f32,
    /// Glows on its own instead of being lit
    pub emissive: bool,
}

impl Material {
    pub fn solid(color: Point3<f32>) -> Self {
        Material {
            color: clamp_color(color),
            opacity: 1.0,
            emissive: false,
        }
    }

    pub fn translucent(color: Point3<f32>, opacity: f32) -> Self {
        Material {
            opacity: clamp_unit(opacity),
            ..Material::solid(color)
        }
    }

    pub fn emissive(color: Point3<f32>) -> Self {
        Material {
            emissive: true,
            ..Material::solid(color)
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub shape: Shape,
    pub material: Material,
    pub translation: Vector3<f32>,
    /// Fixed orientation, applied before the spin
    pub tilt: UnitQuaternion<f32>,
    parent: Option<NodeId>,
    spin: f32,
}

impl Node {
    pub fn new(shape: Shape, material: Material) -> Self {
        Node {
            shape,
            material,
            translation: Vector3::zeros(),
            tilt: UnitQuaternion::identity(),
            parent: None,
            spin: 0.0,
        }
    }

    pub fn pivot() -> Self {
        Node::new(Shape::Pivot, Material::solid(Point3::new(1.0, 1.0, 1.0)))
    }

    pub fn at(mut self, translation: Vector3<f32>) -> Self {
        self.translation = translation;
        self
    }

    pub fn tilted(mut self, tilt: UnitQuaternion<f32>) -> Self {
        self.tilt = tilt;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Rotation about the local y-axis, in [0, 2pi).
    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn rotate_by(&mut self, angle: f32) {
        self.spin = wrap_angle(self.spin + angle);
    }

    pub fn local_transform(&self) -> Isometry3<f32> {
        let spin = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.spin);
        Isometry3::from_parts(Translation3::from(self.translation), self.tilt * spin)
    }
}

/// Arena of nodes. Parents always come before their children, so iterating in
/// order visits every parent first.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        SceneGraph { nodes: vec![] }
    }

    pub fn add(&mut self, parent: Option<NodeId>, mut node: Node) -> NodeId {
        if let Some(parent) = parent {
            assert!(parent.0 < self.nodes.len(), "Unknown parent {:?}", parent);
        }
        node.parent = parent;

        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn world_transform(&self, id: NodeId) -> Isometry3<f32> {
        let node = self.get(id);
        match node.parent {
            None => node.local_transform(),
            Some(parent) => self.world_transform(parent) * node.local_transform(),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Point3<f32> {
        self.world_transform(id) * Point3::origin()
    }
}

fn clamp_unit(x: f32) -> f32 {
    if x.is_nan() {
        return 1.0;
    }
    nalgebra::clamp(x, 0.0, 1.0)
}

fn clamp_color(color: Point3<f32>) -> Point3<f32> {
    color.map(clamp_unit)
}
