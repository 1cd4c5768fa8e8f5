//! Fixed-order frame loop
//!
//! Each frame runs, in order:
//!
//! 1. input: drain the scene's input queue into [`Game::handle_input`]
//! 2. collisions: one engine pass, reported to [`Game::on_collisions`]
//! 3. despawns queued during the pass are applied
//! 4. movement: [`Game::update`], then velocities are integrated
//! 5. clear the frame, then render every remaining shape
//!
//! Collision state for a frame therefore reflects positions at the end of
//! the previous frame.

use log::trace;

use crate::error::EngineResult;
use crate::events::KeyEvent;
use crate::foundation::time::Timer;
use crate::physics::CollisionReport;
use crate::render::{GraphicsBackend, OrthoCamera, ProgramHandle, ShaderBindings};
use crate::scene::Scene;

/// Game logic driven by a [`FrameRunner`]
pub trait Game {
    /// React to one key transition
    fn handle_input(&mut self, scene: &mut Scene, event: KeyEvent) -> EngineResult<()>;

    /// Inspect the contacts that began or ended this frame
    fn on_collisions(&mut self, _scene: &mut Scene, _report: &CollisionReport) -> EngineResult<()> {
        Ok(())
    }

    /// Per-frame logic before velocities are applied
    fn update(&mut self, _scene: &mut Scene, _delta_time: f32) -> EngineResult<()> {
        Ok(())
    }
}

/// What happened during one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 1
    pub frame: u64,
    /// Scaled time step
    pub delta_time: f32,
    /// Key events handled
    pub input_events: usize,
    /// Collision changes
    pub collisions: CollisionReport,
    /// Objects removed after the collision pass
    pub despawned: usize,
    /// Shapes drawn
    pub drawn: usize,
}

/// Drives a [`Game`] and a [`Scene`] one frame at a time
#[derive(Debug)]
pub struct FrameRunner {
    timer: Timer,
    program: ProgramHandle,
    bindings: ShaderBindings,
    clear_color: [f32; 4],
    clear_depth: f32,
}

impl FrameRunner {
    /// Runner drawing with `program`, scaling elapsed time by `time_scale`
    ///
    /// Frames are cleared to opaque black at depth 1.0 until
    /// [`with_clear`](Self::with_clear) says otherwise.
    pub fn new(program: ProgramHandle, bindings: ShaderBindings, time_scale: f32) -> Self {
        Self {
            timer: Timer::with_time_scale(time_scale),
            program,
            bindings,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            clear_depth: 1.0,
        }
    }

    /// Clear every frame to `color` and `depth`
    #[must_use]
    pub fn with_clear(mut self, color: [f32; 4], depth: f32) -> Self {
        self.clear_color = color;
        self.clear_depth = depth;
        self
    }

    /// Upload the camera once before the first frame
    pub fn configure_camera(
        &self,
        backend: &mut dyn GraphicsBackend,
        camera: &OrthoCamera,
        view_uniform: &str,
        projection_uniform: &str,
    ) {
        camera.upload(backend, self.program, view_uniform, projection_uniform);
    }

    /// The frame timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Run one frame after `elapsed` unscaled time
    pub fn run_frame<G: Game + ?Sized>(
        &mut self,
        game: &mut G,
        scene: &mut Scene,
        backend: &mut dyn GraphicsBackend,
        elapsed: f32,
    ) -> EngineResult<FrameStats> {
        let delta_time = self.timer.advance(elapsed);

        let events = scene.input_mut().drain(f64::from(self.timer.total_time()));
        for event in &events {
            game.handle_input(scene, *event)?;
        }

        let collisions = scene.check_collisions()?;
        if !collisions.is_empty() {
            game.on_collisions(scene, &collisions)?;
        }

        let despawned = scene.apply_despawns();

        game.update(scene, delta_time)?;
        scene.apply_movement(delta_time)?;

        backend.clear(self.clear_color, self.clear_depth);
        let drawn = scene.render(backend, self.program, &self.bindings)?;

        let stats = FrameStats {
            frame: self.timer.frame_count(),
            delta_time,
            input_events: events.len(),
            collisions,
            despawned,
            drawn,
        };
        trace!("{:?}", stats);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeyAction, KeyCode};
    use crate::foundation::math::Vec3;
    use crate::geometry::Transformable;
    use crate::physics::ColliderShape;
    use crate::render::{BackendCommand, HeadlessBackend, RenderableShape};
    use crate::scene::{GameObject, GameObjectKey};
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder {
        log: Vec<String>,
        mover: Option<GameObjectKey>,
    }

    impl Game for Recorder {
        fn handle_input(&mut self, scene: &mut Scene, event: KeyEvent) -> EngineResult<()> {
            self.log.push(format!("input {:?}", event.key));
            if let (Some(key), KeyAction::Press) = (self.mover, event.action) {
                if let Some(object) = scene.get_mut(key) {
                    object.set_velocity(Vec3::new(1.0, 0.0, 0.0));
                }
            }
            Ok(())
        }

        fn on_collisions(&mut self, scene: &mut Scene, report: &CollisionReport) -> EngineResult<()> {
            self.log.push(format!("collisions {} {}", report.began.len(), scene.len()));
            Ok(())
        }

        fn update(&mut self, scene: &mut Scene, _delta_time: f32) -> EngineResult<()> {
            self.log.push(format!("update {}", scene.len()));
            Ok(())
        }
    }

    fn setup() -> (HeadlessBackend, FrameRunner) {
        let mut backend = HeadlessBackend::new();
        let program = backend.register_program(&["aVertexPosition", "aVertexColor"], &["uModelMatrix"]);
        (backend, FrameRunner::new(program, ShaderBindings::default(), 0.1))
    }

    fn square(scene: &mut Scene, backend: &mut HeadlessBackend, x: f32) -> GameObject {
        let mut collider = scene.create_collider(ColliderShape::Square);
        collider.set_callback(|| {});
        let mut object = GameObject::new("square")
            .with_shape(RenderableShape::square(backend).unwrap())
            .with_collider(collider);
        object.set_scale(Vec3::new(20.0, 20.0, 1.0)).unwrap();
        object.set_translation(Vec3::new(x, 0.0, 0.0)).unwrap();
        object
    }

    #[test]
    fn test_frame_order() {
        let (mut backend, mut runner) = setup();
        let mut scene = Scene::new();
        let a = square(&mut scene, &mut backend, 0.0);
        scene.spawn(a);
        let b = square(&mut scene, &mut backend, 5.0);
        let b = scene.spawn(b);

        let queue = scene.despawn_queue();
        scene
            .get_mut(b)
            .and_then(GameObject::collider_mut)
            .unwrap()
            .add_callback(move || queue.push(b));
        scene.input_mut().send(KeyEvent::press(KeyCode::D));

        let mut game = Recorder::default();
        let stats = runner.run_frame(&mut game, &mut scene, &mut backend, 16.0).unwrap();

        // the collision callback saw both objects, the despawn landed before update
        assert_eq!(game.log, vec!["input D", "collisions 1 2", "update 1"]);
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.input_events, 1);
        assert_eq!(stats.despawned, 1);
        assert_eq!(stats.drawn, 1);
        assert_relative_eq!(stats.delta_time, 1.6, epsilon = 1e-5);
        assert_eq!(backend.draw_count(), 1);
    }

    #[test]
    fn test_movement_after_collisions() {
        let (mut backend, mut runner) = setup();
        let mut scene = Scene::new();
        let object = square(&mut scene, &mut backend, 0.0);
        let key = scene.spawn(object);

        let mut game = Recorder {
            mover: Some(key),
            ..Recorder::default()
        };
        scene.input_mut().send(KeyEvent::press(KeyCode::A));
        runner.run_frame(&mut game, &mut scene, &mut backend, 10.0).unwrap();

        // velocity 1 over one scaled unit
        let shape = scene.get(key).and_then(GameObject::shape).unwrap();
        assert_relative_eq!(shape.entity().translation().x, 1.0, epsilon = 1e-5);

        let stats = runner.run_frame(&mut game, &mut scene, &mut backend, 10.0).unwrap();
        assert_eq!(stats.frame, 2);
        assert_eq!(stats.input_events, 0);
        assert!(stats.collisions.is_empty());
        assert_relative_eq!(runner.timer().total_time(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_clear_precedes_draws() {
        let (mut backend, runner) = setup();
        let mut runner = runner.with_clear([0.2, 0.3, 0.4, 1.0], 0.5);
        let mut scene = Scene::new();
        let object = square(&mut scene, &mut backend, 0.0);
        scene.spawn(object);
        backend.clear_commands();

        runner.run_frame(&mut Recorder::default(), &mut scene, &mut backend, 16.0).unwrap();

        let commands = backend.commands();
        let clear = commands
            .iter()
            .position(|c| matches!(c, BackendCommand::Clear { .. }))
            .unwrap();
        let first_draw = commands
            .iter()
            .position(|c| matches!(c, BackendCommand::DrawElements { .. }))
            .unwrap();
        assert!(clear < first_draw);
        assert_eq!(
            commands[clear],
            BackendCommand::Clear {
                color: [0.2, 0.3, 0.4, 1.0],
                depth: 0.5,
            }
        );
    }

    #[test]
    fn test_empty_scene_still_clears() {
        let (mut backend, mut runner) = setup();
        let mut scene = Scene::new();
        runner.run_frame(&mut Recorder::default(), &mut scene, &mut backend, 16.0).unwrap();
        assert_eq!(
            backend.commands(),
            &[BackendCommand::Clear {
                color: [0.0, 0.0, 0.0, 1.0],
                depth: 1.0,
            }]
        );
    }

    #[test]
    fn test_camera_upload() {
        let mut backend = HeadlessBackend::new();
        let program = backend.register_program(&[], &["uViewMatrix", "uProjectionMatrix"]);
        let runner = FrameRunner::new(program, ShaderBindings::default(), 1.0);
        runner.configure_camera(&mut backend, &OrthoCamera::for_canvas(720, 960), "uViewMatrix", "uProjectionMatrix");
        assert_eq!(backend.commands().len(), 2);
    }
}
