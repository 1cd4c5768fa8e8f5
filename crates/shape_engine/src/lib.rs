//! # Shape Engine
//!
//! Textured 2D/3D polygons with edge-triggered collision detection.
//!
//! ## Features
//!
//! - **Transformable entities**: destructive local bakes and non-destructive
//!   translate/rotate/scale placement composed into a model matrix
//! - **Renderable shapes**: per-vertex colors, index buffers and optional
//!   textures, drawn through a pluggable [`render::GraphicsBackend`]
//! - **Area colliders**: square and triangle colliders reporting a contact
//!   once when it begins and forgetting it when it ends
//! - **Scene and frame loop**: game objects, deferred despawns and a fixed
//!   input → collisions → despawns → movement → render order
//!
//! ## Quick Start
//!
//! ```rust
//! use shape_engine::prelude::*;
//!
//! let mut ids = ColliderIdAllocator::new();
//! let mut a = AreaCollider::new(ColliderShape::Square, &mut ids);
//! let mut b = AreaCollider::new(ColliderShape::Square, &mut ids);
//! a.set_callback(|| println!("a was hit"));
//! b.set_callback(|| println!("b was hit"));
//! b.translate(&Vec3::new(0.5, 0.0, 0.0)).unwrap();
//!
//! let mut colliders = [a, b];
//! let report = CollisionEngine::check_collisions(&mut colliders).unwrap();
//! assert_eq!(report.began.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod error;
pub mod events;
pub mod foundation;
pub mod geometry;
pub mod physics;
pub mod render;
pub mod scene;


pub use error::{EngineError, EngineResult};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EngineConfig},
        error::{EngineError, EngineResult},
        events::{InputQueue, KeyAction, KeyCode, KeyEvent},
        foundation::{
            math::{Mat4, Vec3, Vec4},
            time::Timer,
        },
        geometry::{Transformable, TransformableEntity, VertexArity, VertexBuffer},
        physics::{
            AreaCollider, ColliderId, ColliderIdAllocator, ColliderShape, CollisionEngine, CollisionPair,
            CollisionReport,
        },
        render::{
            GraphicsBackend, HeadlessBackend, OrthoCamera, ProgramHandle, RenderError, RenderableShape,
            ShaderBindings, TextureImage,
        },
        scene::{DespawnQueue, FrameRunner, FrameStats, Game, GameObject, GameObjectKey, Scene},
    };
}
