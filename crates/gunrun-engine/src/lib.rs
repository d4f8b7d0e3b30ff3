//! Deterministic per-tick simulation for a side-scrolling run-and-gun.
//!
//! The engine owns no window, device, or clock. A host shell constructs a
//! [`World`](world::World) from a [`WorldConfig`](config::WorldConfig) and a
//! [`ResourceTable`](gunrun_core::resources::ResourceTable), then each frame:
//!
//! 1. forwards discrete key events via [`World::key_event`](world::World::key_event),
//! 2. calls [`World::update`](world::World::update) with the frame delta and
//!    its [`InputSource`](interfaces::InputSource) / [`AudioPlayer`](interfaces::AudioPlayer),
//! 3. calls [`World::render`](world::World::render) with its
//!    [`Renderer`](interfaces::Renderer).
//!
//! Given the same config (seed included) and the same inputs, two worlds
//! evolve identically: all randomness flows through one seeded RNG and the
//! update phases run in a fixed order.

#![deny(unsafe_code)]

pub mod ai;
pub mod config;
pub mod interfaces;
pub mod levelgen;
pub mod physics;
pub mod world;

/// Convenience re-exports for host shells.
pub mod prelude {
    pub use crate::config::WorldConfig;
    pub use crate::interfaces::{AudioPlayer, Color, DrawError, InputSource, Key, Renderer};
    pub use crate::levelgen::{ChunkGrid, TileMarker, CHUNK_COLS, MAP_ROWS};
    pub use crate::world::World;
    pub use gunrun_core::prelude::*;
}
