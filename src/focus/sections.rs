use crate::error::{SceneError, SceneResult};
use crate::model::catalog::Catalog;

/// One screen's worth of scrolled content, tied to the body it talks about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub body: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
}

impl Section {
    pub fn new(body: &str, title: &str, subtitle: &str, description: &str) -> Self {
        Section {
            body: body.to_owned(),
            title: title.to_owned(),
            subtitle: subtitle.to_owned(),
            description: description.to_owned(),
        }
    }
}

/// Which way the reader crossed into a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    Enter,
    EnterBack,
}

/// A scroll position over an ordered list of sections, measured in sections.
#[derive(Debug, Clone)]
pub struct ScrollTrack {
    sections: Vec<Section>,
    position: f32,
}

impl ScrollTrack {
    pub fn new(sections: Vec<Section>) -> SceneResult<Self> {
        if sections.is_empty() {
            return Err(SceneError::NoSections);
        }
        Ok(ScrollTrack {
            sections,
            position: 0.0,
        })
    }

    /// The tour from the Sun out to Saturn.
    pub fn builtin() -> Self {
        let sections = vec![
            Section::new(
                "sun",
                "Cosmic Journey",
                "Scroll down or use Free-Roam to explore.",
                "The star at the center of our solar system.",
            ),
            Section::new(
                "mercury",
                "Mercury",
                "The swift messenger of the gods",
                "The smallest and innermost planet.",
            ),
            Section::new(
                "venus",
                "Venus",
                "The morning and evening star",
                "Earth's 'sister planet' due to their similar size.",
            ),
            Section::new(
                "earth",
                "Earth",
                "The pale blue dot",
                "Our home, the only place known to harbor life.",
            ),
            Section::new(
                "mars",
                "Mars",
                "The red frontier",
                "The 'Red Planet,' known for its iron oxide surface.",
            ),
            Section::new(
                "jupiter",
                "Jupiter",
                "The king of planets",
                "The largest planet, a gas giant with a Great Red Spot.",
            ),
            Section::new(
                "saturn",
                "Saturn",
                "The jewel of the solar system",
                "Known for its extensive and beautiful ring system.",
            ),
        ];
        ScrollTrack {
            sections,
            position: 0.0,
        }
    }

    /// One section per catalog body, central body first and then outward. Bodies
    /// the built-in tour knows keep its text; the rest get their catalog description.
    pub fn for_catalog(catalog: &Catalog) -> Self {
        let tour = ScrollTrack::builtin().sections;

        let mut bodies: Vec<_> = catalog.orbiting().collect();
        bodies.sort_by(|a, b| {
            a.orbit_distance_unit
                .partial_cmp(&b.orbit_distance_unit)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        bodies.insert(0, catalog.central());

        let sections = bodies
            .into_iter()
            .map(|def| {
                tour.iter()
                    .find(|section| section.body.eq_ignore_ascii_case(&def.name))
                    .cloned()
                    .unwrap_or_else(|| Section::new(&def.name, &def.name, "", &def.description))
            })
            .collect();
        ScrollTrack {
            sections,
            position: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn get(&self, idx: usize) -> Option<&Section> {
        self.sections.get(idx)
    }

    pub fn nearest_index(&self) -> usize {
        self.position.round() as usize
    }

    /// Moves by `delta` sections. Returns the section that became current, and
    /// from which side, if the move crossed into a new one.
    pub fn scroll_by(&mut self, delta: f32) -> Option<(usize, Crossing)> {
        if !delta.is_finite() {
            return None;
        }
        let max = (self.sections.len() - 1) as f32;
        self.move_to(nalgebra::clamp(self.position + delta, 0.0, max))
    }

    /// Snaps to the start of section `idx`, as if the reader scrolled there.
    pub fn jump_to(&mut self, idx: usize) -> Option<(usize, Crossing)> {
        let idx = idx.min(self.sections.len() - 1);
        self.move_to(idx as f32)
    }

    fn move_to(&mut self, position: f32) -> Option<(usize, Crossing)> {
        let before = self.nearest_index();
        self.position = position;
        let after = self.nearest_index();

        match after.cmp(&before) {
            std::cmp::Ordering::Greater => Some((after, Crossing::Enter)),
            std::cmp::Ordering::Less => Some((after, Crossing::EnterBack)),
            std::cmp::Ordering::Equal => None,
        }
    }
}
