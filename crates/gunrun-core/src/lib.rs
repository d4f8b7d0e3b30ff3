//! Core data model for the gunrun simulation.
//!
//! This crate holds the plain-data building blocks the engine crate drives
//! each tick:
//!
//! - [`clock`]: wrapping interval [`Timer`](clock::Timer) and the
//!   frame-cycling [`Animation`](clock::Animation) clock.
//! - [`rect`]: the axis-aligned [`Rect`](rect::Rect) used for colliders,
//!   probes, the viewport, and sprite frames.
//! - [`entity`]: the tagged-union [`Entity`](entity::Entity) with one
//!   archetype payload per kind of game object.
//! - [`resources`]: opaque asset handles and the read-only
//!   [`ResourceTable`](resources::ResourceTable) of sheets, sounds, and
//!   animation templates.
//!
//! Everything here is deterministic and side-effect free: no global state,
//! no wall-clock reads, no hidden randomness. Simulation time only advances
//! when the caller hands a delta to an `advance` method.

#![deny(unsafe_code)]

pub mod clock;
pub mod entity;
pub mod rect;
pub mod resources;

use thiserror::Error;

// ---------------------------------------------------------------------------
// ClockError
// ---------------------------------------------------------------------------

/// Errors from constructing or advancing the clocks in [`clock`].
///
/// Construction errors are programming mistakes surfaced at the call site;
/// [`NegativeDelta`](ClockError::NegativeDelta) guards against a frame timer
/// running backwards. All are fatal to the call, never to the process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClockError {
    /// A timer or animation was constructed with a non-positive length.
    #[error("clock length must be positive, got {length}")]
    NonPositiveLength { length: f32 },

    /// An animation was constructed with zero frames.
    #[error("animation frame count must be at least 1")]
    ZeroFrameCount,

    /// A clock was advanced by a negative time delta.
    #[error("time delta must be non-negative, got {dt}")]
    NegativeDelta { dt: f32 },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for downstream crates.
pub mod prelude {
    pub use crate::clock::{Animation, Timer};
    pub use crate::entity::{
        BulletData, BulletPhase, EnemyData, EnemyState, Entity, Facing, Payload, PlayerData,
        PlayerState,
    };
    pub use crate::rect::Rect;
    pub use crate::resources::{
        BulletSheets, EnemySheets, PlayerSheets, ResourceTable, SoundBank, SoundId, SpriteSheet,
        TextureId, TileSheets, ANIM_BULLET_HIT, ANIM_BULLET_MOVING, ANIM_ENEMY_DIE,
        ANIM_ENEMY_HIT, ANIM_ENEMY_WALK, ANIM_PLAYER_IDLE, ANIM_PLAYER_RUN, ANIM_PLAYER_RUN_SHOOT,
        ANIM_PLAYER_SHOOT, ANIM_PLAYER_SLIDE, ANIM_PLAYER_SLIDE_SHOOT,
    };
    pub use crate::ClockError;
}
