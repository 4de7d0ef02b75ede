use nalgebra::{UnitQuaternion, Vector3};

use std::f32::consts::PI;

use super::catalog::{color_from_u32, BodyDefinition, DerivedParams, ScaleConstants};
use super::graph::{Material, Node, NodeId, SceneGraph, Shape};

// Sphere resolution grows with size, within these bounds
const SEGMENTS_PER_UNIT: f32 = 8.0;
const MIN_WIDTH_SEGMENTS: u32 = 16;
const MAX_WIDTH_SEGMENTS: u32 = 48;
const HEIGHT_SEGMENTS: u32 = 32;
const CENTRAL_SEGMENTS: u32 = 64;

const RING_INNER_RATIO: f32 = 1.2;
const RING_OUTER_RATIO: f32 = 2.2;
const RING_SEGMENTS: u32 = 96;
const RING_INCLINATION: f32 = -0.4 * PI;
const RING_OPACITY: f32 = 0.6;

const MOON_RADIUS_RATIO: f32 = 0.27;
const MOON_MIN_RADIUS: f32 = 0.3;
const MOON_OFFSET_RATIO: f32 = 3.0;
const MOON_MIN_OFFSET: f32 = 2.0;
const MOON_SEGMENTS: u32 = 16;

const SATELLITE_COLOR: u32 = 0xcccccc;

/// The scene nodes making up one orbiting body.
#[derive(Debug, Clone)]
pub struct BodyInstance {
    pub name: String,
    pub params: DerivedParams,
    /// Rotation of this node is the orbital phase
    pub pivot: NodeId,
    /// Rotation of this node is the axial spin
    pub mesh: NodeId,
    pub ring: Option<NodeId>,
    pub moon_pivot: Option<NodeId>,
}

/// The body everything else orbits. It spins but never moves.
#[derive(Debug, Clone)]
pub struct CentralBody {
    pub name: String,
    pub params: DerivedParams,
    pub mesh: NodeId,
}

pub fn sphere_width_segments(size: f32) -> u32 {
    let segments = (size * SEGMENTS_PER_UNIT).floor();
    if !segments.is_finite() || segments < MIN_WIDTH_SEGMENTS as f32 {
        return MIN_WIDTH_SEGMENTS;
    }
    (segments as u32).min(MAX_WIDTH_SEGMENTS)
}

pub fn create_body(
    graph: &mut SceneGraph,
    def: &BodyDefinition,
    scale: &ScaleConstants,
) -> BodyInstance {
    let params = def.derive(scale);
    let size = params.render_size;

    let pivot = graph.add(None, Node::pivot());
    let mesh = graph.add(
        Some(pivot),
        Node::new(
            Shape::Sphere {
                radius: size,
                width_segments: sphere_width_segments(size),
                height_segments: HEIGHT_SEGMENTS,
            },
            Material::solid(def.color),
        )
        .at(Vector3::new(params.orbit_radius, 0.0, 0.0)),
    );

    let ring = if def.has_rings {
        let ring = Node::new(
            Shape::Ring {
                inner_radius: size * RING_INNER_RATIO,
                outer_radius: size * RING_OUTER_RATIO,
                segments: RING_SEGMENTS,
            },
            Material::translucent(color_from_u32(SATELLITE_COLOR), RING_OPACITY),
        )
        .tilted(UnitQuaternion::from_axis_angle(
            &Vector3::x_axis(),
            RING_INCLINATION,
        ));
        Some(graph.add(Some(mesh), ring))
    } else {
        None
    };

    let moon_pivot = if def.has_moon {
        let moon_pivot = graph.add(Some(mesh), Node::pivot());
        let moon_radius = f32::max(size * MOON_RADIUS_RATIO, MOON_MIN_RADIUS);
        let moon_offset = f32::max(size * MOON_OFFSET_RATIO, MOON_MIN_OFFSET);
        graph.add(
            Some(moon_pivot),
            Node::new(
                Shape::Sphere {
                    radius: moon_radius,
                    width_segments: MOON_SEGMENTS,
                    height_segments: MOON_SEGMENTS,
                },
                Material::solid(color_from_u32(SATELLITE_COLOR)),
            )
            .at(Vector3::new(moon_offset, 0.0, 0.0)),
        );
        Some(moon_pivot)
    } else {
        None
    };

    BodyInstance {
        name: def.name.clone(),
        params,
        pivot,
        mesh,
        ring,
        moon_pivot,
    }
}

pub fn create_central_body(
    graph: &mut SceneGraph,
    def: &BodyDefinition,
    scale: &ScaleConstants,
) -> CentralBody {
    let params = def.derive(scale);
    let mesh = graph.add(
        None,
        Node::new(
            Shape::Sphere {
                radius: params.render_size,
                width_segments: CENTRAL_SEGMENTS,
                height_segments: CENTRAL_SEGMENTS,
            },
            Material::emissive(def.color),
        ),
    );

    CentralBody {
        name: def.name.clone(),
        params,
        mesh,
    }
}
