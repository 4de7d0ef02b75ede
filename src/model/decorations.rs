use nalgebra::{Point3, UnitQuaternion, Vector3};
use rand::Rng;

use std::f32::consts::TAU;

use crate::math::easing::Easing;
use crate::math::geometry::wrap_angle;

/// Radians per nominal frame. Slow enough that the sky never looks static but
/// never draws attention either.
pub const DECORATION_SPIN_RATE: f32 = 0.0001;

const PULSE_FRAMES: f32 = 30.0;
const PULSE_AMPLITUDE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarfieldConfig {
    pub count: usize,
    /// Edge length of the cube the stars are scattered in
    pub extent: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        StarfieldConfig {
            count: 800,
            extent: 2000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeltConfig {
    pub count: usize,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub thickness: f32,
}

impl BeltConfig {
    /// A belt between Mars and Jupiter, 2.2 to 3.2 AU out.
    pub fn for_distance_scale(distance_scale: f32) -> Self {
        BeltConfig {
            count: 1500,
            inner_radius: 2.2 * distance_scale,
            outer_radius: 3.2 * distance_scale,
            thickness: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Pulse {
    elapsed: f32,
}

#[derive(Debug, Clone)]
pub struct Starfield {
    points: Vec<Point3<f32>>,
    rotation: f32,
    pulse: Option<Pulse>,
}

impl Starfield {
    pub fn generate<R: Rng>(config: &StarfieldConfig, rng: &mut R) -> Self {
        let half = config.extent.abs() / 2.0;
        let mut coord = || {
            if half > 0.0 {
                rng.gen_range(-half..half)
            } else {
                0.0
            }
        };
        let points = (0..config.count)
            .map(|_| Point3::new(coord(), coord(), coord()))
            .collect();

        Starfield {
            points,
            rotation: 0.0,
            pulse: None,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn advance(&mut self, dt: f32) {
        self.rotation = wrap_angle(self.rotation + DECORATION_SPIN_RATE * dt);
        if let Some(pulse) = self.pulse.as_mut() {
            pulse.elapsed += dt;
            if pulse.elapsed >= PULSE_FRAMES {
                self.pulse = None;
            }
        }
    }

    /// Starts a short swell of the whole field, restarting any pulse in progress.
    pub fn pulse(&mut self) {
        self.pulse = Some(Pulse { elapsed: 0.0 });
    }

    pub fn scale(&self) -> f32 {
        match self.pulse {
            None => 1.0,
            Some(pulse) => {
                // Up and back down again, easing at both ends
                let progress = nalgebra::clamp(pulse.elapsed / PULSE_FRAMES, 0.0, 1.0);
                let swell = if progress < 0.5 {
                    2.0 * progress
                } else {
                    2.0 * (1.0 - progress)
                };
                1.0 + PULSE_AMPLITUDE * Easing::SineInOut.apply(swell)
            }
        }
    }

    pub fn world_points(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.rotation);
        let scale = self.scale();
        self.points
            .iter()
            .map(move |pt| Point3::from(rotation * (pt.coords * scale)))
    }
}

#[derive(Debug, Clone)]
pub struct AsteroidBelt {
    rocks: Vec<Point3<f32>>,
    rotation: f32,
}

impl AsteroidBelt {
    pub fn generate<R: Rng>(config: &BeltConfig, rng: &mut R) -> Self {
        let inner = config.inner_radius.min(config.outer_radius);
        let outer = config.inner_radius.max(config.outer_radius);
        let half_thickness = config.thickness.abs() / 2.0;

        let rocks = (0..config.count)
            .map(|_| {
                let angle = rng.gen_range(0.0..TAU);
                let radius = if outer > inner {
                    rng.gen_range(inner..outer)
                } else {
                    inner
                };
                let height = if half_thickness > 0.0 {
                    rng.gen_range(-half_thickness..half_thickness)
                } else {
                    0.0
                };
                Point3::new(angle.cos() * radius, height, angle.sin() * radius)
            })
            .collect();

        AsteroidBelt {
            rocks,
            rotation: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.rocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rocks.is_empty()
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn advance(&mut self, dt: f32) {
        self.rotation = wrap_angle(self.rotation + DECORATION_SPIN_RATE * dt);
    }

    pub fn world_points(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        let rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.rotation);
        self.rocks
            .iter()
            .map(move |pt| Point3::from(rotation * pt.coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_starfield_bounds() {
        let config = StarfieldConfig {
            count: 500,
            extent: 100.0,
        };
        let stars = Starfield::generate(&config, &mut StdRng::seed_from_u64(7));
        assert_eq!(stars.len(), 500);
        for pt in stars.world_points() {
            assert!(pt.x.abs() <= 50.0 && pt.y.abs() <= 50.0 && pt.z.abs() <= 50.0);
        }
    }

    #[test]
    fn test_generation_is_seeded() {
        let config = StarfieldConfig::default();
        let a = Starfield::generate(&config, &mut StdRng::seed_from_u64(3));
        let b = Starfield::generate(&config, &mut StdRng::seed_from_u64(3));
        assert!(a.world_points().eq(b.world_points()));
    }

    #[test]
    fn test_belt_stays_in_annulus() {
        let config = BeltConfig::for_distance_scale(30.0);
        let belt = AsteroidBelt::generate(&config, &mut StdRng::seed_from_u64(11));
        assert_eq!(belt.len(), 1500);
        for pt in belt.world_points() {
            let r = (pt.x * pt.x + pt.z * pt.z).sqrt();
            assert!(r >= 66.0 - 1e-3 && r <= 96.0 + 1e-3, "radius {}", r);
            assert!(pt.y.abs() <= 1.0);
        }

        let empty = AsteroidBelt::generate(
            &BeltConfig {
                count: 0,
                ..config
            },
            &mut StdRng::seed_from_u64(11),
        );
        assert!(empty.is_empty());
    }

    #[test]
    fn test_slow_rotation() {
        let mut belt = AsteroidBelt::generate(
            &BeltConfig::for_distance_scale(30.0),
            &mut StdRng::seed_from_u64(1),
        );
        for _ in 0..600 {
            belt.advance(1.0);
        }
        approx::assert_relative_eq!(belt.rotation(), 0.06, max_relative = 1e-3);
    }

    #[test]
    fn test_pulse_swells_then_settles() {
        let mut stars = Starfield::generate(&StarfieldConfig::default(), &mut StdRng::seed_from_u64(0));
        assert_eq!(stars.scale(), 1.0);

        stars.pulse();
        stars.advance(15.0);
        approx::assert_relative_eq!(stars.scale(), 1.1, max_relative = 1e-5);

        stars.advance(15.0);
        assert_eq!(stars.scale(), 1.0);
    }
}
