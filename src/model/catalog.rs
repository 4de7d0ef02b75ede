use std::collections::HashSet;
use std::fs;
use std::path::Path;

use nalgebra::Point3;
use serde::{Deserialize, Deserializer};

use crate::error::CatalogError;

/// Fixed constants turning catalog units (AU, years, Earth radii) into scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleConstants {
    /// Scene units per AU
    pub distance_scale: f32,
    /// Scene units per Earth radius
    pub radius_scale: f32,
    /// Smallest size an orbiting body is drawn at
    pub min_render_size: f32,
    /// Radians per nominal frame for a one-year orbit
    pub base_angular_speed: f32,
    // The real Sun would swallow the inner planets, so it gets its own scale
    pub central_radius_factor: f32,
    pub central_min_size: f32,
}

impl Default for ScaleConstants {
    fn default() -> Self {
        ScaleConstants {
            distance_scale: 30.0,
            radius_scale: 1.4,
            min_render_size: 0.6,
            base_angular_speed: 0.0012,
            central_radius_factor: 0.05,
            central_min_size: 8.0,
        }
    }
}

// All the immutable info about a body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BodyDefinition {
    pub name: String,
    pub radius_relative: f32,
    pub orbit_distance_unit: f32,
    /// Zero means the body doesn't orbit anything
    pub orbit_period_unit: f32,
    #[serde(deserialize_with = "deserialize_color")]
    pub color: Point3<f32>,
    pub description: String,
    #[serde(default)]
    pub has_rings: bool,
    #[serde(default)]
    pub has_moon: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedParams {
    pub render_size: f32,
    pub orbit_radius: f32,
    /// Radians per nominal frame, zero for the central body
    pub angular_speed: f32,
}

impl BodyDefinition {
    pub fn is_central(&self) -> bool {
        self.orbit_period_unit == 0.0
    }

    pub fn derive(&self, scale: &ScaleConstants) -> DerivedParams {
        // Cosmetic values get clamped instead of rejected
        let radius = if self.radius_relative.is_finite() {
            self.radius_relative.max(0.0)
        } else {
            0.0
        };

        if self.is_central() {
            return DerivedParams {
                render_size: f32::max(
                    scale.central_min_size,
                    scale.central_radius_factor * scale.radius_scale * radius,
                ),
                orbit_radius: 0.0,
                angular_speed: 0.0,
            };
        }

        let distance = if self.orbit_distance_unit.is_finite() {
            self.orbit_distance_unit.max(0.0)
        } else {
            0.0
        };
        let angular_speed = if self.orbit_period_unit.is_finite() && self.orbit_period_unit > 0.0 {
            scale.base_angular_speed / self.orbit_period_unit
        } else {
            0.0
        };

        DerivedParams {
            render_size: f32::max(scale.min_render_size, scale.radius_scale * radius),
            orbit_radius: distance * scale.distance_scale,
            angular_speed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    bodies: Vec<BodyDefinition>,
    central_idx: usize,
}

impl Catalog {
    pub fn new(bodies: Vec<BodyDefinition>) -> Result<Self, CatalogError> {
        if bodies.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for body in bodies.iter() {
            if !seen.insert(body.name.to_lowercase()) {
                return Err(CatalogError::DuplicateName(body.name.clone()));
            }

            let fields = [
                ("orbit distance", body.orbit_distance_unit),
                ("orbit period", body.orbit_period_unit),
            ];
            for (field, value) in fields.iter() {
                if !value.is_finite() || *value < 0.0 {
                    return Err(CatalogError::InvalidOrbit {
                        name: body.name.clone(),
                        field: *field,
                        value: *value as f64,
                    });
                }
            }
        }

        let central: Vec<usize> = (0..bodies.len())
            .filter(|i| bodies[*i].is_central())
            .collect();
        if central.len() != 1 {
            return Err(CatalogError::CentralBodyCount(central.len()));
        }

        Ok(Catalog {
            central_idx: central[0],
            bodies,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let bodies: Vec<BodyDefinition> = serde_json::from_str(json)?;
        Catalog::new(bodies)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Catalog::from_json_str(&contents)
    }

    /// The Sun and the six classical planets out to Saturn.
    pub fn builtin() -> Self {
        fn body(
            name: &str,
            radius: f32,
            distance: f32,
            period: f32,
            color: u32,
            description: &str,
        ) -> BodyDefinition {
            BodyDefinition {
                name: name.to_owned(),
                radius_relative: radius,
                orbit_distance_unit: distance,
                orbit_period_unit: period,
                color: color_from_u32(color),
                description: description.to_owned(),
                has_rings: false,
                has_moon: false,
            }
        }

        let bodies = vec![
            body("Sun", 109.0, 0.0, 0.0, 0xffcc33, "The star at the center of our solar system."),
            body("Mercury", 0.383, 0.39, 0.241, 0x8c8c8c, "The smallest and innermost planet."),
            body("Venus", 0.949, 0.72, 0.615, 0xffa500, "A hot world with a thick atmosphere."),
            BodyDefinition {
                has_moon: true,
                ..body("Earth", 1.0, 1.0, 1.0, 0x4f94cd, "Our home, teeming with life.")
            },
            body("Mars", 0.532, 1.52, 1.881, 0xcd5c5c, "The red planet."),
            body("Jupiter", 11.21, 5.20, 11.86, 0xdaa520, "A massive gas giant with storms."),
            BodyDefinition {
                has_rings: true,
                ..body("Saturn", 9.45, 9.58, 29.46, 0xfad5a5, "Famous for its rings.")
            },
        ];

        Catalog {
            bodies,
            central_idx: 0,
        }
    }

    pub fn bodies(&self) -> impl Iterator<Item = &BodyDefinition> + '_ {
        self.bodies.iter()
    }

    pub fn orbiting(&self) -> impl Iterator<Item = &BodyDefinition> + '_ {
        self.bodies.iter().filter(|b| !b.is_central())
    }

    pub fn central(&self) -> &BodyDefinition {
        &self.bodies[self.central_idx]
    }

    /// Looks a body up by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&BodyDefinition> {
        self.bodies
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Plain-text table of every body and its scene-space parameters.
    pub fn summary_table(&self, scale: &ScaleConstants) -> String {
        let mut table = format!(
            "{:<10} {:>8} {:>8} {:>10}  {}\n",
            "Body", "Size", "Orbit", "Speed", "Description"
        );
        for body in self.bodies.iter() {
            let params = body.derive(scale);
            table.push_str(&format!(
                "{:<10} {:>8.2} {:>8.1} {:>10.6}  {}\n",
                body.name,
                params.render_size,
                params.orbit_radius,
                params.angular_speed,
                body.description
            ));
        }
        table
    }
}

pub fn color_from_u32(rgb: u32) -> Point3<f32> {
    let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
    Point3::new(channel(16), channel(8), channel(0))
}

pub fn parse_color(s: &str) -> Result<Point3<f32>, CatalogError> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 {
        return Err(CatalogError::BadColor(s.to_owned()));
    }
    let rgb = u32::from_str_radix(hex, 16).map_err(|_| CatalogError::BadColor(s.to_owned()))?;
    Ok(color_from_u32(rgb))
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Point3<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_color(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_earth_reference_values() {
        let catalog = Catalog::builtin();
        let earth = catalog.get("Earth").unwrap().derive(&ScaleConstants::default());
        approx::assert_relative_eq!(earth.orbit_radius, 30.0);
        approx::assert_relative_eq!(earth.angular_speed, 0.0012);
        approx::assert_relative_eq!(earth.render_size, 1.4);
    }

    #[test]
    fn test_angular_speed_decreases_with_period() {
        let scale = ScaleConstants::default();
        let catalog = Catalog::builtin();
        let mut orbiting: Vec<_> = catalog.orbiting().collect();
        orbiting.sort_by(|a, b| a.orbit_period_unit.partial_cmp(&b.orbit_period_unit).unwrap());

        for pair in orbiting.windows(2) {
            let (inner, outer) = (pair[0].derive(&scale), pair[1].derive(&scale));
            assert!(inner.angular_speed > outer.angular_speed);
        }
        for body in orbiting {
            approx::assert_relative_eq!(
                body.derive(&scale).angular_speed,
                scale.base_angular_speed / body.orbit_period_unit
            );
        }
    }

    #[test]
    fn test_size_floors() {
        let scale = ScaleConstants::default();
        let catalog = Catalog::builtin();

        // 1.4 * 0.383 is below the floor
        let mercury = catalog.get("mercury").unwrap().derive(&scale);
        approx::assert_relative_eq!(mercury.render_size, 0.6);

        let sun = catalog.central().derive(&scale);
        approx::assert_relative_eq!(sun.render_size, 8.0);
        assert_eq!(sun.angular_speed, 0.0);
        assert_eq!(sun.orbit_radius, 0.0);

        let mut broken = catalog.get("Mars").unwrap().clone();
        broken.radius_relative = f32::NAN;
        approx::assert_relative_eq!(broken.derive(&scale).render_size, 0.6);
        broken.radius_relative = -3.0;
        approx::assert_relative_eq!(broken.derive(&scale).render_size, 0.6);
    }

    #[test]
    fn test_lookup_ignores_case() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.get("SATURN").unwrap().name, "Saturn");
        assert!(catalog.get("saturn").unwrap().has_rings);
        assert!(catalog.get("Pluto").is_none());
        assert_eq!(catalog.central().name, "Sun");
        assert_eq!(catalog.orbiting().count(), 6);
    }

    #[test]
    fn test_summary_table() {
        let table = Catalog::builtin().summary_table(&ScaleConstants::default());
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 8);
        assert!(lines[0].starts_with("Body"));
        assert!(lines[4].starts_with("Earth"));
        assert!(lines[4].contains("30.0"));
    }

    #[test]
    fn test_parse_color() {
        approx::assert_relative_eq!(parse_color("ff0000").unwrap(), Point3::new(1.0, 0.0, 0.0));
        approx::assert_relative_eq!(parse_color("#0000ff").unwrap(), Point3::new(0.0, 0.0, 1.0));
        assert!(matches!(parse_color("fff"), Err(CatalogError::BadColor(_))));
        assert!(matches!(parse_color("zzzzzz"), Err(CatalogError::BadColor(_))));
    }

    #[test]
    fn test_json_catalog() {
        let json = r##"[
            {"name": "Star", "radius_relative": 50, "orbit_distance_unit": 0,
             "orbit_period_unit": 0, "color": "#ffffff", "description": "A star."},
            {"name": "Rock", "radius_relative": 0.5, "orbit_distance_unit": 2,
             "orbit_period_unit": 4, "color": "888888", "description": "A rock.",
             "has_moon": true}
        ]"##;
        let catalog = Catalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.central().name, "Star");
        let rock = catalog.get("rock").unwrap();
        assert!(rock.has_moon);
        assert!(!rock.has_rings);
        approx::assert_relative_eq!(rock.derive(&ScaleConstants::default()).orbit_radius, 60.0);
    }

    #[test]
    fn test_json_catalog_errors() {
        let no_central = r#"[{"name": "Rock", "radius_relative": 1, "orbit_distance_unit": 1,
            "orbit_period_unit": 1, "color": "888888", "description": ""}]"#;
        assert!(matches!(
            Catalog::from_json_str(no_central),
            Err(CatalogError::CentralBodyCount(0))
        ));

        let duplicate = r#"[
            {"name": "Sun", "radius_relative": 1, "orbit_distance_unit": 0,
             "orbit_period_unit": 0, "color": "888888", "description": ""},
            {"name": "sun", "radius_relative": 1, "orbit_distance_unit": 1,
             "orbit_period_unit": 1, "color": "888888", "description": ""}
        ]"#;
        assert!(matches!(
            Catalog::from_json_str(duplicate),
            Err(CatalogError::DuplicateName(_))
        ));

        let negative = r#"[
            {"name": "Sun", "radius_relative": 1, "orbit_distance_unit": 0,
             "orbit_period_unit": 0, "color": "888888", "description": ""},
            {"name": "Rock", "radius_relative": 1, "orbit_distance_unit": 1,
             "orbit_period_unit": -2, "color": "888888", "description": ""}
        ]"#;
        assert!(matches!(
            Catalog::from_json_str(negative),
            Err(CatalogError::InvalidOrbit { .. })
        ));

        assert!(matches!(Catalog::from_json_str("[]"), Err(CatalogError::Empty)));
        assert!(matches!(Catalog::from_json_str("{"), Err(CatalogError::Json(_))));
    }
}
