use std::cell::RefCell;
use std::rc::Rc;

use kiss3d::camera::Camera;
use kiss3d::event::EventManager;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::window::{State, Window};

use self::controller::Controller;
use self::view::{FocusLabel, View};
use crate::focus::FocusDispatcher;
use crate::model::clock::FrameClock;
use crate::model::SceneState;
use crate::session::Session;

mod camera;
mod controller;
mod renderers;
mod view;

pub struct SolarApp {
    session: Session<View>,
    controller: Controller,
    clock: FrameClock,
}

impl SolarApp {
    pub fn new(window: &mut Window, scene: SceneState, mut dispatcher: FocusDispatcher) -> Self {
        let label: FocusLabel = Rc::new(RefCell::new(None));
        let sink = label.clone();
        dispatcher.subscribe(move |target| {
            log::info!("Now showing {}: {}", target.body_name, target.description);
            *sink.borrow_mut() = Some(target.clone());
        });

        let view = View::new(window, &scene, label);
        let mut session = Session::mount(scene, dispatcher, view);
        // Cursor and framebuffer events arrive in the window's pixels, which can
        // differ from the size that was asked for
        session.resize(window.width(), window.height());
        SolarApp {
            session,
            controller: Controller::new(),
            clock: FrameClock::new(),
        }
    }

    pub fn session_mut(&mut self) -> &mut Session<View> {
        &mut self.session
    }

    fn process_user_input(&mut self, mut events: EventManager) {
        for event in events.iter() {
            self.controller.process_event(event, &mut self.session);
        }
    }
}

impl State for SolarApp {
    fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        match self.session.surface_mut() {
            Some(view) => view.cameras_and_effect_and_renderer(),
            None => (None, None, None, None),
        }
    }

    fn step(&mut self, window: &mut Window) {
        self.process_user_input(window.events());
        self.session.step(self.clock.tick());

        let fps = self.controller.fps();
        if let Some((view, scene)) = self.session.surface_and_scene() {
            view.prerender_scene(window, scene, fps);
        }
        self.controller.increment_frame_counter();
    }
}
