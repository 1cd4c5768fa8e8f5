//! Arena gameplay: a player square steered with A/D and an enemy that
//! disappears on contact

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use shape_engine::geometry::primitives::SQUARE_DEFAULT_TEX_COORDS;
use shape_engine::prelude::*;

use crate::config::{ActorConfig, ArenaConfig};
use crate::ArenaError;

/// Horizontal movement toggles driven by key transitions
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Steering {
    /// A is held
    pub left: bool,
    /// D is held
    pub right: bool,
}

impl Steering {
    /// Apply a key transition
    pub fn apply(&mut self, event: KeyEvent) {
        let pressed = event.action == KeyAction::Press;
        match event.key {
            KeyCode::A => self.left = pressed,
            KeyCode::D => self.right = pressed,
            _ => {}
        }
    }

    /// -1, 0 or 1; left wins when both are held
    pub fn direction(&self) -> f32 {
        if self.left {
            -1.0
        } else if self.right {
            1.0
        } else {
            0.0
        }
    }
}

/// Arena game state
#[derive(Debug)]
pub struct Arena {
    player: GameObjectKey,
    enemy: GameObjectKey,
    speed: f32,
    steering: Steering,
    enemy_removed_on: Option<u64>,
    frame: u64,
}

impl Arena {
    /// Spawn the player and the enemy into `scene`
    pub fn setup(
        config: &ArenaConfig,
        scene: &mut Scene,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<Self, ArenaError> {
        let tex_attribute = config.engine.shader.tex_coord_attribute.clone();

        let mut player_collider = scene.create_collider(ColliderShape::Square);
        player_collider.set_callback(|| info!("Player detected a collision"));
        let player = spawn_actor(scene, backend, "player", &config.player, player_collider, &tex_attribute)?;

        let enemy_collider = scene.create_collider(ColliderShape::Square);
        let enemy = spawn_actor(scene, backend, "enemy", &config.enemy, enemy_collider, &tex_attribute)?;
        let queue = scene.despawn_queue();
        scene
            .get_mut(enemy)
            .and_then(GameObject::collider_mut)
            .ok_or_else(|| ArenaError::Setup("enemy has no collider".to_string()))?
            .set_callback(move || queue.push(enemy));

        Ok(Self {
            player,
            enemy,
            speed: config.player_speed,
            steering: Steering::default(),
            enemy_removed_on: None,
            frame: 0,
        })
    }

    /// Player object key
    pub fn player(&self) -> GameObjectKey {
        self.player
    }

    /// Frame on which the enemy was removed, if it was
    pub fn enemy_removed_on(&self) -> Option<u64> {
        self.enemy_removed_on
    }
}

impl Game for Arena {
    fn handle_input(&mut self, _scene: &mut Scene, event: KeyEvent) -> EngineResult<()> {
        self.steering.apply(event);
        Ok(())
    }

    fn on_collisions(&mut self, _scene: &mut Scene, report: &CollisionReport) -> EngineResult<()> {
        for pair in &report.began {
            log::debug!("Contact began between {} and {}", pair.collider_a, pair.collider_b);
        }
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene, _delta_time: f32) -> EngineResult<()> {
        self.frame += 1;
        if self.enemy_removed_on.is_none() && !scene.contains(self.enemy) {
            info!("Enemy removed on frame {}", self.frame);
            self.enemy_removed_on = Some(self.frame);
        }
        if let Some(player) = scene.get_mut(self.player) {
            player.set_velocity(Vec3::new(self.steering.direction() * self.speed, 0.0, 0.0));
        }
        Ok(())
    }
}

fn spawn_actor(
    scene: &mut Scene,
    backend: &mut dyn GraphicsBackend,
    name: &str,
    actor: &ActorConfig,
    collider: AreaCollider,
    tex_attribute: &str,
) -> Result<GameObjectKey, ArenaError> {
    let mut shape = RenderableShape::square(backend)?;
    if actor.sprite_rotation != 0.0 {
        turn_about_center(&mut shape, actor.sprite_rotation)?;
    }
    let image = match &actor.texture {
        Some(path) => TextureImage::from_file_or_placeholder(path),
        None => TextureImage::placeholder(),
    };
    shape.set_texture(backend, &image, SQUARE_DEFAULT_TEX_COORDS.to_vec(), tex_attribute)?;

    let half = actor.size / 2.0;
    let mut object = GameObject::new(name).with_shape(shape).with_collider(collider);
    object.set_scale(Vec3::new(actor.size, actor.size, 1.0))?;
    object.set_translation(Vec3::from(actor.spawn) - Vec3::new(half, half, 0.0))?;
    Ok(scene.spawn(object))
}

/// Bake a Z rotation about the center of the unit square
fn turn_about_center(shape: &mut RenderableShape, degrees: f32) -> EngineResult<()> {
    let center = Vec3::new(0.5, 0.5, 0.0);
    shape.translate_local(&-center)?;
    shape.rotate_local(degrees, &Vec3::z())?;
    shape.translate_local(&center)
}

/// Outcome of a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Frames simulated
    pub frames: u64,
    /// Frame on which the enemy was removed
    pub enemy_removed_on: Option<u64>,
    /// Player center after the last frame
    pub player_position: Vec3,
    /// Draw calls over the whole run
    pub draw_calls: usize,
    /// Scripted events still queued when the run ended
    pub undelivered_input: usize,
}

/// Simulate `config.frame_count` frames against `backend`
pub fn run(config: &ArenaConfig, backend: &mut HeadlessBackend) -> Result<RunSummary, ArenaError> {
    let names = &config.engine.shader;
    let program = backend.register_program(
        &[
            names.position_attribute.as_str(),
            names.color_attribute.as_str(),
            names.tex_coord_attribute.as_str(),
        ],
        &[
            names.model_matrix_uniform.as_str(),
            names.view_matrix_uniform.as_str(),
            names.projection_matrix_uniform.as_str(),
        ],
    );

    let mut scene = Scene::new();
    let mut arena = Arena::setup(config, &mut scene, backend)?;
    let mut runner = FrameRunner::new(program, config.engine.shader_bindings(), config.time_scale)
        .with_clear(config.engine.background_color, config.engine.clear_depth);
    runner.configure_camera(
        backend,
        &config.engine.camera(),
        &names.view_matrix_uniform,
        &names.projection_matrix_uniform,
    );

    for scripted in &config.script {
        let due = scripted.delivery_time(config.frame_ms, config.time_scale);
        scene.input_mut().post(due, scripted.event());
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut draw_calls = 0;
    for _ in 0..config.frame_count {
        let jitter = if config.frame_jitter_ms > 0.0 {
            rng.gen_range(-config.frame_jitter_ms..=config.frame_jitter_ms)
        } else {
            0.0
        };
        let stats = runner.run_frame(&mut arena, &mut scene, backend, config.frame_ms + jitter)?;
        draw_calls += stats.drawn;
    }

    let player_position = scene
        .get(arena.player())
        .and_then(GameObject::origin)
        .ok_or_else(|| ArenaError::Setup("player vanished".to_string()))?;
    let undelivered_input = scene.input().pending();
    if undelivered_input > 0 {
        info!("{} scripted key events were due after the last frame", undelivered_input);
    }

    Ok(RunSummary {
        frames: runner.timer().frame_count(),
        enemy_removed_on: arena.enemy_removed_on(),
        player_position,
        draw_calls,
        undelivered_input,
    })
}
