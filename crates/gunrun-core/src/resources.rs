//! Asset handles and the read-only resource table.
//!
//! The simulation never touches files, textures, or audio devices. It deals
//! in opaque handles ([`TextureId`], [`SoundId`]) that the host maps to real
//! assets, plus per-sheet frame metrics so sprite source rectangles can be
//! computed without knowing anything about pixels on disk.
//!
//! A [`ResourceTable`] is built once at startup and passed by shared
//! reference from then on. It also carries the animation templates: entities
//! clone these at spawn so every entity owns its playback position.

use serde::{Deserialize, Serialize};

use crate::clock::Animation;
use crate::ClockError;

// ---------------------------------------------------------------------------
// Handles
// ---------------------------------------------------------------------------

/// Opaque handle to a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u32);

/// Opaque handle to a loaded sound or music track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundId(pub u32);

/// A horizontal strip of equally sized sprite frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteSheet {
    pub texture: TextureId,
    pub frame_w: f32,
    pub frame_h: f32,
}

// ---------------------------------------------------------------------------
// Animation indices
// ---------------------------------------------------------------------------

// Indices into an entity's cloned animation vector. Each archetype has its
// own numbering.

pub const ANIM_PLAYER_IDLE: usize = 0;
pub const ANIM_PLAYER_RUN: usize = 1;
pub const ANIM_PLAYER_SLIDE: usize = 2;
pub const ANIM_PLAYER_SHOOT: usize = 3;
pub const ANIM_PLAYER_RUN_SHOOT: usize = 4;
pub const ANIM_PLAYER_SLIDE_SHOOT: usize = 5;

pub const ANIM_BULLET_MOVING: usize = 0;
pub const ANIM_BULLET_HIT: usize = 1;

pub const ANIM_ENEMY_WALK: usize = 0;
pub const ANIM_ENEMY_HIT: usize = 1;
pub const ANIM_ENEMY_DIE: usize = 2;

// ---------------------------------------------------------------------------
// Sheet groups
// ---------------------------------------------------------------------------

/// Player sheets, one per locomotion/shoot variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSheets {
    pub idle: SpriteSheet,
    pub run: SpriteSheet,
    pub slide: SpriteSheet,
    pub shoot: SpriteSheet,
    pub run_shoot: SpriteSheet,
    pub slide_shoot: SpriteSheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletSheets {
    pub moving: SpriteSheet,
    pub hit: SpriteSheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySheets {
    pub walk: SpriteSheet,
    pub hit: SpriteSheet,
    pub die: SpriteSheet,
}

/// Terrain and decoration sheets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileSheets {
    /// Solid ground along the chunk floor.
    pub ground: SpriteSheet,
    /// Floating platform segments.
    pub panel: SpriteSheet,
    /// Foreground grass decoration.
    pub grass: SpriteSheet,
    /// Background brick decoration.
    pub brick: SpriteSheet,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundBank {
    pub shoot: SoundId,
    pub wall_hit: SoundId,
    pub enemy_hit: SoundId,
    pub enemy_die: SoundId,
    pub music: SoundId,
}

// ---------------------------------------------------------------------------
// ResourceTable
// ---------------------------------------------------------------------------

/// Every handle and template the simulation needs, bundled into one
/// read-only table.
#[derive(Debug, Clone)]
pub struct ResourceTable {
    pub player_sheets: PlayerSheets,
    pub bullet_sheets: BulletSheets,
    pub enemy_sheets: EnemySheets,
    pub tile_sheets: TileSheets,
    pub sounds: SoundBank,
    /// Templates cloned into each spawned player, indexed by `ANIM_PLAYER_*`.
    pub player_anims: Vec<Animation>,
    /// Templates cloned into each spawned bullet, indexed by `ANIM_BULLET_*`.
    pub bullet_anims: Vec<Animation>,
    /// Templates cloned into each spawned enemy, indexed by `ANIM_ENEMY_*`.
    pub enemy_anims: Vec<Animation>,
}

impl ResourceTable {
    /// Assemble the table from host-provided handles and build the fixed
    /// animation templates.
    pub fn new(
        player_sheets: PlayerSheets,
        bullet_sheets: BulletSheets,
        enemy_sheets: EnemySheets,
        tile_sheets: TileSheets,
        sounds: SoundBank,
    ) -> Result<Self, ClockError> {
        let player_anims = vec![
            Animation::new(8, 1.6)?, // idle
            Animation::new(4, 0.5)?, // run
            Animation::new(2, 1.0)?, // slide
            Animation::new(4, 0.5)?, // shoot
            Animation::new(4, 0.5)?, // run + shoot
            Animation::new(4, 0.5)?, // slide + shoot
        ];
        let bullet_anims = vec![
            Animation::new(4, 0.05)?, // moving
            Animation::new(4, 0.15)?, // hit
        ];
        let enemy_anims = vec![
            Animation::new(8, 1.0)?,  // walk
            Animation::new(8, 1.0)?,  // hit
            Animation::new(18, 2.0)?, // die
        ];
        Ok(Self {
            player_sheets,
            bullet_sheets,
            enemy_sheets,
            tile_sheets,
            sounds,
            player_anims,
            bullet_anims,
            enemy_anims,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(id: u32) -> SpriteSheet {
        SpriteSheet {
            texture: TextureId(id),
            frame_w: 32.0,
            frame_h: 32.0,
        }
    }

    fn table() -> ResourceTable {
        ResourceTable::new(
            PlayerSheets {
                idle: sheet(0),
                run: sheet(1),
                slide: sheet(2),
                shoot: sheet(3),
                run_shoot: sheet(4),
                slide_shoot: sheet(5),
            },
            BulletSheets {
                moving: sheet(6),
                hit: sheet(7),
            },
            EnemySheets {
                walk: sheet(8),
                hit: sheet(9),
                die: sheet(10),
            },
            TileSheets {
                ground: sheet(11),
                panel: sheet(12),
                grass: sheet(13),
                brick: sheet(14),
            },
            SoundBank {
                shoot: SoundId(0),
                wall_hit: SoundId(1),
                enemy_hit: SoundId(2),
                enemy_die: SoundId(3),
                music: SoundId(4),
            },
        )
        .unwrap()
    }

    #[test]
    fn template_vectors_match_index_constants() {
        let table = table();
        assert_eq!(table.player_anims.len(), ANIM_PLAYER_SLIDE_SHOOT + 1);
        assert_eq!(table.bullet_anims.len(), ANIM_BULLET_HIT + 1);
        assert_eq!(table.enemy_anims.len(), ANIM_ENEMY_DIE + 1);
    }

    #[test]
    fn template_timings() {
        let table = table();

        let idle = &table.player_anims[ANIM_PLAYER_IDLE];
        assert_eq!(idle.frame_count(), 8);
        assert_eq!(idle.length(), 1.6);

        let hit = &table.bullet_anims[ANIM_BULLET_HIT];
        assert_eq!(hit.frame_count(), 4);
        assert_eq!(hit.length(), 0.15);

        let die = &table.enemy_anims[ANIM_ENEMY_DIE];
        assert_eq!(die.frame_count(), 18);
        assert_eq!(die.length(), 2.0);
    }

    #[test]
    fn cloned_templates_advance_independently() {
        let table = table();
        let mut a = table.player_anims[ANIM_PLAYER_RUN].clone();
        let mut b = table.player_anims[ANIM_PLAYER_RUN].clone();

        a.advance(0.25).unwrap();
        b.advance(0.125).unwrap();

        assert_eq!(a.current_frame(), 2);
        assert_eq!(b.current_frame(), 1);
        // The table's template is untouched.
        assert_eq!(table.player_anims[ANIM_PLAYER_RUN].current_frame(), 0);
    }
}
