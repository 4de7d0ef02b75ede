use std::panic::{self, AssertUnwindSafe};

use nalgebra::Point2;

use crate::model::SceneState;

mod sections;

pub use sections::{Crossing, ScrollTrack, Section};

/// What the info panel needs to know about a freshly focused body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTarget {
    pub body_name: String,
    pub description: String,
}

pub type FocusListener = Box<dyn FnMut(&FocusTarget)>;

/// Turns picks, scrolling and the free-roam toggle into focus requests against a
/// scene, and tells one listener about every body that ends up focused.
pub struct FocusDispatcher {
    track: ScrollTrack,
    listener: Option<FocusListener>,
    last_focused: Option<String>,
    free_roam: bool,
}

impl FocusDispatcher {
    pub fn new(track: ScrollTrack) -> Self {
        FocusDispatcher {
            track,
            listener: None,
            last_focused: None,
            free_roam: false,
        }
    }

    /// Replaces any previous listener.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&FocusTarget) + 'static,
    {
        if self.listener.is_some() {
            log::debug!("Replacing focus listener");
        }
        self.listener = Some(Box::new(listener));
    }

    pub fn unsubscribe(&mut self) -> bool {
        self.listener.take().is_some()
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    pub fn track(&self) -> &ScrollTrack {
        &self.track
    }

    pub fn last_focused(&self) -> Option<&str> {
        self.last_focused.as_deref()
    }

    pub fn is_free_roam(&self) -> bool {
        self.free_roam
    }

    /// Focuses whatever body is under the pointer. Allowed in every mode.
    pub fn on_pick(&mut self, scene: &mut SceneState, ndc: &Point2<f32>) -> Option<FocusTarget> {
        let name = scene.pick(ndc)?.to_owned();
        scene.pulse_stars();
        self.focus(scene, &name, None)
    }

    /// Focuses a body by name, the same way a pick would.
    pub fn focus_body(&mut self, scene: &mut SceneState, name: &str) -> Option<FocusTarget> {
        self.focus(scene, name, None)
    }

    pub fn on_scroll(&mut self, scene: &mut SceneState, delta: f32) -> Option<FocusTarget> {
        if self.free_roam {
            log::debug!("Ignoring scroll while free-roaming");
            return None;
        }
        let (idx, crossing) = self.track.scroll_by(delta)?;
        log::debug!("Scroll {:?} section {}", crossing, idx);
        self.focus_section(scene, idx)
    }

    /// Jumps the scroll track to section `idx` and focuses its body.
    pub fn enter_section(&mut self, scene: &mut SceneState, idx: usize) -> Option<FocusTarget> {
        if self.free_roam {
            log::debug!("Ignoring section {} while free-roaming", idx);
            return None;
        }
        self.track.jump_to(idx);
        self.focus_section(scene, self.track.nearest_index())
    }

    /// Focuses the section the track currently sits on, e.g. once the intro lands.
    pub fn focus_current_section(&mut self, scene: &mut SceneState) -> Option<FocusTarget> {
        if self.free_roam {
            return None;
        }
        self.focus_section(scene, self.track.nearest_index())
    }

    /// Switches free-roam on or off. Turning it off hands the camera back to the
    /// director and refocuses on the nearest section, or failing that on the body
    /// that was focused last.
    pub fn set_free_roam(&mut self, scene: &mut SceneState, on: bool) -> Option<FocusTarget> {
        if on == self.free_roam {
            return None;
        }
        self.free_roam = on;

        if on {
            scene.engage_free_roam(self.last_focused.as_deref());
            return None;
        }

        scene.release_free_roam();
        let nearest = self.track.nearest_index();
        if let Some(target) = self.focus_section(scene, nearest) {
            return Some(target);
        }
        match self.last_focused.clone() {
            Some(name) => self.focus(scene, &name, None),
            None => None,
        }
    }

    pub fn toggle_free_roam(&mut self, scene: &mut SceneState) -> Option<FocusTarget> {
        let on = !self.free_roam;
        self.set_free_roam(scene, on)
    }

    fn focus_section(&mut self, scene: &mut SceneState, idx: usize) -> Option<FocusTarget> {
        let section = self.track.get(idx)?;
        let (body, description) = (section.body.clone(), section.description.clone());
        self.focus(scene, &body, Some(description))
    }

    fn focus(
        &mut self,
        scene: &mut SceneState,
        name: &str,
        description: Option<String>,
    ) -> Option<FocusTarget> {
        let def = match scene.focus_body(name) {
            Ok(def) => def,
            Err(err) => {
                log::warn!("Ignoring focus request: {}", err);
                return None;
            }
        };

        let target = FocusTarget {
            body_name: def.name.clone(),
            description: description.unwrap_or_else(|| def.description.clone()),
        };
        self.last_focused = Some(target.body_name.clone());
        self.emit(&target);
        Some(target)
    }

    fn emit(&mut self, target: &FocusTarget) {
        let listener = match self.listener.as_mut() {
            Some(listener) => listener,
            None => return,
        };
        let result = panic::catch_unwind(AssertUnwindSafe(|| listener(target)));
        if result.is_err() {
            log::error!("Focus listener panicked while handling {}", target.body_name);
        }
    }
}

impl Default for FocusDispatcher {
    fn default() -> Self {
        FocusDispatcher::new(ScrollTrack::builtin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::director::DirectorState;
    use crate::model::catalog::Catalog;
    use crate::model::{CameraOwner, SceneConfig};

    fn scene() -> SceneState {
        let config = SceneConfig {
            seed: Some(5),
            intro: false,
            ..SceneConfig::default()
        };
        SceneState::assemble(Catalog::builtin(), &config)
    }

    fn recording(dispatcher: &mut FocusDispatcher) -> Rc<RefCell<Vec<FocusTarget>>> {
        let seen = Rc::new(RefCell::new(vec![]));
        let sink = seen.clone();
        dispatcher.subscribe(move |target| sink.borrow_mut().push(target.clone()));
        seen
    }

    #[test]
    fn test_section_uses_section_description() {
        let mut scene = scene();
        let mut dispatcher = FocusDispatcher::default();
        let seen = recording(&mut dispatcher);

        let target = dispatcher.on_scroll(&mut scene, 1.0).unwrap();
        assert_eq!(target.body_name, "Mercury");
        assert_eq!(target.description, "The smallest and innermost planet.");
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(dispatcher.last_focused(), Some("Mercury"));

        // No crossing, no focus
        assert!(dispatcher.on_scroll(&mut scene, 0.2).is_none());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_named_focus_uses_catalog() {
        let mut scene = scene();
        let mut dispatcher = FocusDispatcher::default();
        let target = dispatcher.focus_body(&mut scene, "earth").unwrap();
        assert_eq!(target.body_name, "Earth");
        assert_eq!(target.description, "Our home, teeming with life.");
    }

    #[test]
    fn test_unknown_body_is_a_no_op() {
        let mut scene = scene();
        let mut dispatcher = FocusDispatcher::default();
        let seen = recording(&mut dispatcher);

        assert!(dispatcher.focus_body(&mut scene, "Vulcan").is_none());
        assert!(seen.borrow().is_empty());
        assert!(dispatcher.last_focused().is_none());
        assert_eq!(scene.director_state(), DirectorState::Idle);
    }

    #[test]
    fn test_last_subscription_wins() {
        let mut scene = scene();
        let mut dispatcher = FocusDispatcher::default();
        let first = recording(&mut dispatcher);
        let second = recording(&mut dispatcher);

        dispatcher.focus_body(&mut scene, "Mars");
        assert!(first.borrow().is_empty());
        assert_eq!(second.borrow().len(), 1);

        assert!(dispatcher.unsubscribe());
        assert!(!dispatcher.unsubscribe());
        dispatcher.focus_body(&mut scene, "Venus");
        assert_eq!(second.borrow().len(), 1);
    }

    #[test]
    fn test_listener_panic_is_contained() {
        let mut scene = scene();
        let mut dispatcher = FocusDispatcher::default();
        dispatcher.subscribe(|_| panic!("listener blew up"));

        let target = dispatcher.focus_body(&mut scene, "Jupiter");
        assert!(target.is_some());
        assert_eq!(scene.director_state(), DirectorState::Transitioning);
        assert!(dispatcher.focus_body(&mut scene, "Saturn").is_some());
    }

    #[test]
    fn test_scroll_suppressed_in_free_roam() {
        let mut scene = scene();
        let mut dispatcher = FocusDispatcher::default();
        dispatcher.set_free_roam(&mut scene, true);

        assert!(dispatcher.on_scroll(&mut scene, 3.0).is_none());
        assert!(dispatcher.enter_section(&mut scene, 3).is_none());
        assert_eq!(dispatcher.track().position(), 0.0);
        assert_eq!(scene.owner(), CameraOwner::FreeRoam);
    }

    #[test]
    fn test_pick_allowed_in_free_roam() {
        let mut scene = scene();
        let mut dispatcher = FocusDispatcher::default();
        dispatcher.set_free_roam(&mut scene, true);

        // The default overview looks straight at the Sun
        let target = dispatcher.on_pick(&mut scene, &Point2::origin()).unwrap();
        assert_eq!(target.body_name, "Sun");
        assert!(scene.world().starfield.scale() >= 1.0);
        assert_eq!(scene.owner(), CameraOwner::FreeRoam);
    }

    #[test]
    fn test_free_roam_round_trip_refocuses() {
        let mut scene = scene();
        let mut dispatcher = FocusDispatcher::default();
        let seen = recording(&mut dispatcher);
        dispatcher.enter_section(&mut scene, 4);
        assert_eq!(seen.borrow().last().unwrap().body_name, "Mars");

        assert!(dispatcher.set_free_roam(&mut scene, true).is_none());
        assert_eq!(scene.director_state(), DirectorState::Idle);
        // Turning it on twice changes nothing
        assert!(dispatcher.set_free_roam(&mut scene, true).is_none());

        let target = dispatcher.set_free_roam(&mut scene, false).unwrap();
        assert_eq!(target.body_name, "Mars");
        assert_eq!(scene.owner(), CameraOwner::Director);
        assert_eq!(scene.director_state(), DirectorState::Transitioning);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_free_roam_off_follows_nearest_section() {
        let mut scene = scene();
        let mut dispatcher = FocusDispatcher::default();
        dispatcher.enter_section(&mut scene, 2);
        // A pick moves the focus away from the section the track sits on
        dispatcher.focus_body(&mut scene, "Saturn");

        dispatcher.toggle_free_roam(&mut scene);
        let target = dispatcher.toggle_free_roam(&mut scene).unwrap();
        assert_eq!(target.body_name, "Venus");
    }

    #[test]
    fn test_free_roam_off_falls_back_to_last_focused() {
        let mut scene = scene();
        let track = ScrollTrack::new(vec![Section::new("Pluto", "Pluto", "", "Not here.")]).unwrap();
        let mut dispatcher = FocusDispatcher::new(track);
        let seen = recording(&mut dispatcher);
        dispatcher.focus_body(&mut scene, "Jupiter");

        dispatcher.set_free_roam(&mut scene, true);
        let target = dispatcher.set_free_roam(&mut scene, false).unwrap();
        assert_eq!(target.body_name, "Jupiter");
        assert_eq!(target.description, "A massive gas giant with storms.");
        assert_eq!(scene.director_state(), DirectorState::Transitioning);
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_free_roam_off_with_nothing_to_focus() {
        let mut scene = scene();
        let track = ScrollTrack::new(vec![Section::new("Pluto", "Pluto", "", "Not here.")]).unwrap();
        let mut dispatcher = FocusDispatcher::new(track);

        dispatcher.set_free_roam(&mut scene, true);
        assert!(dispatcher.set_free_roam(&mut scene, false).is_none());
        assert_eq!(scene.owner(), CameraOwner::Director);
        assert_eq!(scene.director_state(), DirectorState::Idle);
    }
}
