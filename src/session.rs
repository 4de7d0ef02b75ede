use nalgebra::Point2;

use crate::focus::{FocusDispatcher, FocusTarget};
use crate::model::clock::FrameStep;
use crate::model::SceneState;

/// Whatever actually puts the scene on screen.
pub trait RenderSurface {
    fn resize(&mut self, width: u32, height: u32);
    /// Frees every graphics resource the surface holds. Called exactly once.
    fn release(&mut self);
}

/// A mounted scene: the scene state, the dispatcher feeding it, and the surface
/// drawing it. Unmounting (or dropping) releases the surface and the listener.
pub struct Session<S: RenderSurface> {
    scene: SceneState,
    dispatcher: FocusDispatcher,
    surface: Option<S>,
}

impl<S: RenderSurface> Session<S> {
    /// Starts a session. Without an intro flight the first section is focused
    /// right away; otherwise that waits until the flight lands.
    pub fn mount(scene: SceneState, dispatcher: FocusDispatcher, mut surface: S) -> Self {
        let (width, height) = (scene.projection().width(), scene.projection().height());
        surface.resize(width, height);

        let mut session = Session {
            scene,
            dispatcher,
            surface: Some(surface),
        };
        if !session.scene.intro_pending() {
            session.dispatcher.focus_current_section(&mut session.scene);
        }
        log::info!("Scene mounted");
        session
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    pub fn dispatcher(&self) -> &FocusDispatcher {
        &self.dispatcher
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// The surface along with the scene it should draw, while mounted.
    pub fn surface_and_scene(&mut self) -> Option<(&mut S, &SceneState)> {
        let scene = &self.scene;
        self.surface.as_mut().map(|surface| (surface, scene))
    }

    /// Advances everything by `dt` nominal frames. Does nothing once unmounted.
    pub fn tick(&mut self, dt: f32) {
        self.step(FrameStep::nominal(dt));
    }

    /// Advances everything by one measured frame. Does nothing once unmounted.
    pub fn step(&mut self, step: FrameStep) {
        if !self.is_mounted() {
            return;
        }
        if self.scene.step(step) {
            self.dispatcher.focus_current_section(&mut self.scene);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.scene.resize(width, height) {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
    }

    pub fn pick(&mut self, ndc: &Point2<f32>) -> Option<FocusTarget> {
        self.dispatcher.on_pick(&mut self.scene, ndc)
    }

    pub fn scroll(&mut self, delta: f32) -> Option<FocusTarget> {
        self.dispatcher.on_scroll(&mut self.scene, delta)
    }

    pub fn enter_section(&mut self, idx: usize) -> Option<FocusTarget> {
        self.dispatcher.enter_section(&mut self.scene, idx)
    }

    pub fn toggle_free_roam(&mut self) -> Option<FocusTarget> {
        self.dispatcher.toggle_free_roam(&mut self.scene)
    }

    pub fn set_free_roam(&mut self, on: bool) -> Option<FocusTarget> {
        self.dispatcher.set_free_roam(&mut self.scene, on)
    }

    /// Pointer position relative to the window center, each axis in [-0.5, 0.5].
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.scene.set_pointer(x, y);
    }

    pub fn zoom(&mut self, factor: f32) {
        self.scene.zoom(factor);
    }

    /// Releases the surface and drops the listener. Safe to call more than once.
    pub fn unmount(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.release();
            self.dispatcher.unsubscribe();
            log::info!("Scene unmounted");
        }
    }
}

impl<S: RenderSurface> Drop for Session<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
