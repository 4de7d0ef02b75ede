use nalgebra::Point3;

use std::f32::consts::{PI, TAU};

/// Raw triangle data, ready to hand to a renderer.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub coords: Vec<Point3<f32>>,
    pub faces: Vec<Point3<u16>>,
}

/// A UV sphere, poles on the y-axis, counter-clockwise faces pointing out.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);

    let mut coords = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            coords.push(Point3::new(
                -radius * (u * TAU).cos() * (v * PI).sin(),
                radius * (v * PI).cos(),
                radius * (u * TAU).sin() * (v * PI).sin(),
            ));
        }
    }

    let index = |ix: u32, iy: u32| (iy * (w + 1) + ix) as u16;
    let mut faces = vec![];
    for iy in 0..h {
        for ix in 0..w {
            let a = index(ix + 1, iy);
            let b = index(ix, iy);
            let c = index(ix, iy + 1);
            let d = index(ix + 1, iy + 1);
            // The first and last rows would otherwise contain zero-area triangles
            if iy != 0 {
                faces.push(Point3::new(a, b, d));
            }
            if iy != h - 1 {
                faces.push(Point3::new(b, c, d));
            }
        }
    }

    MeshData { coords, faces }
}

/// A flat annulus in the xy-plane. Every face is emitted with both windings so it
/// is visible from either side.
pub fn double_sided_annulus(inner_radius: f32, outer_radius: f32, segments: u32) -> MeshData {
    let segments = segments.max(3);

    let mut coords = Vec::with_capacity(2 * (segments + 1) as usize);
    for radius in [inner_radius, outer_radius].iter() {
        for i in 0..=segments {
            let theta = i as f32 / segments as f32 * TAU;
            coords.push(Point3::new(radius * theta.cos(), radius * theta.sin(), 0.0));
        }
    }

    let mut faces = vec![];
    let row = segments + 1;
    for i in 0..segments {
        let a = i as u16;
        let b = (i + row) as u16;
        let c = (i + row + 1) as u16;
        let d = (i + 1) as u16;
        faces.push(Point3::new(a, b, d));
        faces.push(Point3::new(b, c, d));
        faces.push(Point3::new(a, d, b));
        faces.push(Point3::new(b, d, c));
    }

    MeshData { coords, faces }
}
