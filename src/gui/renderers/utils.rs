use kiss3d::renderer::LineRenderer;

use nalgebra::Point3;

/// Samples a periodic curve `f` over one full period `[0, period]`. The first
/// point is repeated at the end so the path closes.
pub fn closed_loop<F, S>(f: F, period: S, num_segments: usize) -> impl Iterator<Item = Point3<f32>>
where
    F: Fn(S) -> Point3<f32>,
    S: nalgebra::RealField + simba::scalar::SupersetOf<usize> + Copy,
{
    let num_segments = num_segments.max(3);
    let convert = nalgebra::convert::<usize, S>;
    (0..=num_segments)
        .map(move |i| {
            // Wrap the last sample onto the first, so rounding can't leave a gap
            let i = if i == num_segments { 0 } else { i };
            period * convert(i) / convert(num_segments)
        })
        .map(f)
}

pub fn draw_polyline<I: Iterator<Item = Point3<f32>>>(
    line_renderer: &mut LineRenderer,
    points: I,
    color: &Point3<f32>,
) {
    let mut prev_pt = None;
    for pt in points {
        if let Some(prev_pt) = prev_pt {
            line_renderer.draw_line(prev_pt, pt, *color);
        }
        prev_pt = Some(pt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f32::consts::TAU;

    #[test]
    fn test_loop_closes() {
        let points: Vec<_> = closed_loop(
            |t: f32| Point3::new(t.cos(), 0.0, t.sin()),
            TAU,
            8,
        )
        .collect();
        assert_eq!(points.len(), 9);
        assert_eq!(points[0], points[8]);
        approx::assert_relative_eq!(points[2], Point3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_segment_count() {
        assert_eq!(closed_loop(|_: f32| Point3::origin(), TAU, 0).count(), 4);
    }
}
