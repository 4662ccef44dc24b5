use std::time::Instant;

use kiss3d::event::{Action, Event, Key, WindowEvent};
use tracing::{debug, info};

// Key config, all in one place
const KEY_SPEED_UP: Key = Key::Period;
const KEY_SLOW_DOWN: Key = Key::Comma;
const KEY_RESTART: Key = Key::R;
const KEY_TOP_VIEW: Key = Key::T;
const KEY_TOGGLE_PAUSE: Key = Key::Space;
const KEY_QUIT: Key = Key::Escape;

const MAX_TICKS_PER_FRAME: u32 = 64;

/// What the viewer should do in response to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Restart,
    TopView,
    Quit,
}

pub struct Controller {
    /// Window refreshes per animation frame; smaller is faster
    ticks_per_frame: u32,
    ticks: u32,
    paused: bool,
    fps_counter: FpsCounter,
}

pub struct FpsCounter {
    instant: Instant,
    counter: usize,
    window_size_millis: usize,
    previous_fps: f64,
}

impl FpsCounter {
    pub fn new(window_size_millis: usize) -> Self {
        FpsCounter {
            instant: Instant::now(),
            counter: 0,
            previous_fps: 0.0,
            window_size_millis,
        }
    }

    pub fn reset(&mut self) {
        self.instant = Instant::now();
        self.counter = 0;
    }

    pub fn value(&self) -> f64 {
        self.previous_fps
    }

    pub fn increment(&mut self) {
        self.counter += 1;

        let elapsed = self.instant.elapsed();
        if elapsed.as_millis() > self.window_size_millis as u128 {
            self.previous_fps = (1000 * self.counter) as f64 / elapsed.as_millis() as f64;
            debug!(fps = self.previous_fps, "frame rate");
            self.reset();
        }
    }
}

impl Controller {
    pub fn new() -> Self {
        Controller {
            ticks_per_frame: 1,
            ticks: 0,
            paused: false,
            fps_counter: FpsCounter::new(1000),
        }
    }

    pub fn process_event(&mut self, event: &Event) -> Option<Command> {
        match event.value {
            WindowEvent::Key(KEY_SPEED_UP, Action::Press, _) => {
                self.ticks_per_frame = (self.ticks_per_frame / 2).max(1);
                info!(ticks_per_frame = self.ticks_per_frame, "speed changed");
            }
            WindowEvent::Key(KEY_SLOW_DOWN, Action::Press, _) => {
                self.ticks_per_frame = (self.ticks_per_frame * 2).min(MAX_TICKS_PER_FRAME);
                info!(ticks_per_frame = self.ticks_per_frame, "speed changed");
            }
            WindowEvent::Key(KEY_TOGGLE_PAUSE, Action::Press, _) => {
                self.paused = !self.paused;
            }
            WindowEvent::Key(KEY_RESTART, Action::Press, _) => return Some(Command::Restart),
            WindowEvent::Key(KEY_TOP_VIEW, Action::Press, _) => return Some(Command::TopView),
            WindowEvent::Key(KEY_QUIT, Action::Press, _) | WindowEvent::Close => {
                return Some(Command::Quit)
            }
            _ => {}
        }
        None
    }

    /// Counts a window refresh; true when the animation should advance.
    pub fn tick(&mut self) -> bool {
        self.fps_counter.increment();
        if self.paused {
            return false;
        }
        self.ticks += 1;
        if self.ticks >= self.ticks_per_frame {
            self.ticks = 0;
            true
        } else {
            false
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn ticks_per_frame(&self) -> u32 {
        self.ticks_per_frame
    }

    pub fn fps(&self) -> f64 {
        self.fps_counter.value()
    }
}
