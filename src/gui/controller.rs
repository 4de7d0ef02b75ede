use std::time::Instant;

use kiss3d::event::{Action, Event, Key, MouseButton, WindowEvent};

use super::view::View;
use crate::session::Session;

// Key config, all in one place
const KEY_PREV_SECTION: Key = Key::Q;
const KEY_NEXT_SECTION: Key = Key::E;
const KEY_PAGE_UP: Key = Key::PageUp;
const KEY_PAGE_DOWN: Key = Key::PageDown;
const KEY_TOGGLE_FREE_ROAM: Key = Key::F;

/// Sections moved per wheel notch
const SCROLL_STEP: f32 = 0.35;
const ZOOM_STEP: f32 = 1.1;

pub struct Controller {
    cursor: Option<(f64, f64)>,
    fps_counter: FpsCounter,
}

pub struct FpsCounter {
    instant: Instant,
    counter: usize,
    window_size_millis: u128,
    previous_fps: f64,
}

impl FpsCounter {
    pub fn new(window_size_millis: u128) -> Self {
        FpsCounter {
            instant: Instant::now(),
            counter: 0,
            window_size_millis,
            previous_fps: 0.0,
        }
    }

    pub fn value(&self) -> f64 {
        self.previous_fps
    }

    pub fn increment(&mut self) {
        self.counter += 1;

        let elapsed = self.instant.elapsed().as_millis();
        if elapsed > self.window_size_millis {
            self.previous_fps = (1000 * self.counter) as f64 / elapsed as f64;
            self.instant = Instant::now();
            self.counter = 0;
        }
    }
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            cursor: None,
            fps_counter: FpsCounter::new(1000),
        }
    }

    pub fn process_event(&mut self, event: Event, session: &mut Session<View>) {
        match event.value {
            WindowEvent::Key(KEY_NEXT_SECTION, Action::Press, _)
            | WindowEvent::Key(KEY_PAGE_DOWN, Action::Press, _) => {
                let next = session.dispatcher().track().nearest_index() + 1;
                session.enter_section(next);
            }
            WindowEvent::Key(KEY_PREV_SECTION, Action::Press, _)
            | WindowEvent::Key(KEY_PAGE_UP, Action::Press, _) => {
                let prev = session.dispatcher().track().nearest_index().saturating_sub(1);
                session.enter_section(prev);
            }
            WindowEvent::Key(KEY_TOGGLE_FREE_ROAM, Action::Press, _) => {
                session.toggle_free_roam();
            }
            WindowEvent::CursorPos(x, y, _) => {
                self.cursor = Some((x, y));
                let projection = session.scene().projection();
                let (w, h) = (projection.width() as f64, projection.height() as f64);
                session.set_pointer((x / w - 0.5) as f32, (y / h - 0.5) as f32);
            }
            WindowEvent::MouseButton(MouseButton::Button1, Action::Press, _) => {
                if let Some((x, y)) = self.cursor {
                    let ndc = session.scene().projection().pixel_to_ndc(x, y);
                    if session.pick(&ndc).is_none() {
                        log::debug!("Nothing under the cursor at {:?}", ndc);
                    }
                }
            }
            WindowEvent::Scroll(_, off, _) => {
                // Scrolling up moves back up the page, or zooms in while free-roaming
                if session.dispatcher().is_free_roam() {
                    if off > 0.0 {
                        session.zoom(ZOOM_STEP.recip());
                    } else if off < 0.0 {
                        session.zoom(ZOOM_STEP);
                    }
                } else {
                    session.scroll(-off as f32 * SCROLL_STEP);
                }
            }
            WindowEvent::FramebufferSize(w, h) => session.resize(w, h),
            _ => {}
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps_counter.value()
    }

    pub fn increment_frame_counter(&mut self) {
        self.fps_counter.increment()
    }
}
