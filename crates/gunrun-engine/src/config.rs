//! World configuration.

use serde::{Deserialize, Serialize};

/// Static parameters for a [`World`](crate::world::World).
///
/// The viewport is in logical units, not pixels; the host scales however it
/// likes. The seed fully determines level generation and bullet jitter, so
/// two worlds built from equal configs and fed equal inputs stay in
/// lockstep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Visible width in logical units.
    pub viewport_w: f32,
    /// Visible height in logical units. Also fixes the vertical placement
    /// of generated chunks, which are anchored to the viewport bottom.
    pub viewport_h: f32,
    /// Edge length of one terrain tile.
    pub tile_size: f32,
    /// Downward acceleration applied to airborne dynamic entities, in
    /// units per second squared.
    pub gravity: f32,
    /// Seed for the world's RNG.
    pub seed: u64,
}

impl Default for WorldConfig {
    /// A 640x320 viewport of 32-unit tiles, matching a 20x10 tile screen.
    fn default() -> Self {
        Self {
            viewport_w: 640.0,
            viewport_h: 320.0,
            tile_size: 32.0,
            gravity: 500.0,
            seed: 0,
        }
    }
}
