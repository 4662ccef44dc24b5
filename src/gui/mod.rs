//! The interactive viewer: a kiss3d window replaying each frame the scene
//! driver renders.

use kiss3d::camera::{ArcBall, Camera};
use kiss3d::event::EventManager;
use kiss3d::light::Light;
use kiss3d::planar_camera::PlanarCamera;
use kiss3d::post_processing::PostProcessingEffect;
use kiss3d::renderer::Renderer;
use kiss3d::window::{State, Window};
use nalgebra::{Point2, Point3};
use tracing::{error, info};

use self::controller::{Command, Controller};
use self::renderers::CompoundRenderer;
use crate::scene::SceneDriver;

mod camera;
mod controller;
mod renderers;

const WINDOW_TITLE: &str = "dark-side";
const INITIAL_CAMERA_DISTANCE: f32 = 6.0;

pub struct Viewer {
    scene: SceneDriver,
    camera: ArcBall,
    renderer: CompoundRenderer,
    controller: Controller,
    quit: bool,
}

impl Viewer {
    pub fn new(scene: SceneDriver) -> Self {
        Viewer {
            scene,
            camera: camera::orbit_camera(INITIAL_CAMERA_DISTANCE),
            renderer: CompoundRenderer::new(),
            controller: Controller::new(),
            quit: false,
        }
    }

    fn process_user_input(&mut self, mut events: EventManager) {
        for event in events.iter() {
            match self.controller.process_event(&event) {
                Some(Command::Quit) => self.quit = true,
                Some(Command::Restart) => self.scene.rewind(),
                Some(Command::TopView) => camera::show_top_view(&mut self.camera),
                None => {}
            }
        }
    }

    fn advance(&mut self) {
        match self.scene.render_frame() {
            Ok(Some(_)) => {}
            // Finished: keep showing the last frame
            Ok(None) => {}
            Err(err) => {
                error!("stopping animation: {}", err);
                self.quit = true;
            }
        }
    }

    fn draw_overlay(&self, window: &mut Window) {
        let label = self
            .scene
            .time_label()
            .unwrap_or_else(|| "not started".to_owned());
        let status = if self.controller.is_paused() {
            "paused"
        } else if self.scene.is_finished() {
            "finished"
        } else {
            "running"
        };
        let text = format!(
            "{}\n{} ({} ticks/frame)\nFPS: {:.0}",
            label,
            status,
            self.controller.ticks_per_frame(),
            self.controller.fps()
        );
        window.draw_text(
            &text,
            &Point2::origin(),
            50.0,
            &kiss3d::text::Font::default(),
            &Point3::new(1.0, 1.0, 1.0),
        );
    }
}

impl State for Viewer {
    fn cameras_and_effect_and_renderer(
        &mut self,
    ) -> (
        Option<&mut dyn Camera>,
        Option<&mut dyn PlanarCamera>,
        Option<&mut dyn Renderer>,
        Option<&mut dyn PostProcessingEffect>,
    ) {
        (Some(&mut self.camera), None, Some(&mut self.renderer), None)
    }

    fn step(&mut self, window: &mut Window) {
        // Cancellation is checked before any geometry work
        self.process_user_input(window.events());
        if self.quit || window.should_close() {
            window.close();
            return;
        }

        if self.controller.tick() {
            self.advance();
        }
        // The renderers drop their buffers after every draw, so the current
        // frame is replayed even while paused
        self.scene.recording().replay(&mut self.renderer);
        self.draw_overlay(window);
    }
}

/// Opens the window and runs until it is closed.
pub fn run(scene: SceneDriver) {
    let mut window = Window::new(WINDOW_TITLE);
    window.set_light(Light::StickToCamera);
    window.set_background_color(0.0, 0.0, 0.0);

    info!("opening viewer");
    let viewer = Viewer::new(scene);
    window.render_loop(viewer);
}
