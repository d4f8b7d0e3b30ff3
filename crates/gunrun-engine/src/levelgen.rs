//! Procedural chunk generation.
//!
//! Levels are an endless run of fixed-size chunks. Generation happens in two
//! stages: [`ChunkGrid::generate`] rolls a marker grid from the world RNG
//! (so layout is a pure function of seed and call order), and
//! [`materialize`] turns a grid into positioned entities for the world's
//! layers. Keeping the stages apart makes layout testable without touching
//! resources or coordinates.

use rand::Rng;

use gunrun_core::entity::{Entity, EnemyData, Payload, PlayerData};
use gunrun_core::rect::Rect;
use gunrun_core::resources::{ResourceTable, ANIM_ENEMY_WALK, ANIM_PLAYER_IDLE};
use glam::Vec2;
use tracing::debug;

use crate::ai::set_visual;
use crate::config::WorldConfig;

/// Grid height of a chunk, in tile rows. The bottom row is always ground.
pub const MAP_ROWS: usize = 5;
/// Grid width of a chunk, in tile columns.
pub const CHUNK_COLS: usize = 20;

/// Chance per column that a platform run starts there.
const PLATFORM_CHANCE: f64 = 0.7;
/// Chance that a platform of length > 2 carries an enemy.
const ENEMY_CHANCE: f64 = 0.4;
/// Per-column chance of grass on an empty cell just above the ground.
const GRASS_CHANCE: f64 = 0.2;
/// Per-even-column chance of a background brick.
const BRICK_CHANCE: f64 = 0.1;

/// Platform rows with their run-length ranges. Higher platforms are longer
/// so they stay reachable as stepping stones.
const PLATFORM_BANDS: [(usize, usize, usize); 3] = [(1, 4, 6), (2, 3, 5), (3, 2, 4)];

/// The cell the player spawns in, when a chunk hosts the spawn.
const PLAYER_SPAWN_ROW: usize = 3;
const PLAYER_SPAWN_COL: usize = 1;

/// What a grid cell will become when materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileMarker {
    #[default]
    Empty,
    /// Solid ground, bottom row only.
    Ground,
    /// A solid floating platform tile.
    Platform,
    /// An enemy stands here, on top of the platform below.
    EnemySpawn,
    /// The player stands here. At most one per world.
    PlayerSpawn,
}

/// One chunk's layout before placement: solid markers plus the two
/// decoration layers (grass in front of the action, bricks behind it).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkGrid {
    pub tiles: [[TileMarker; CHUNK_COLS]; MAP_ROWS],
    pub grass: [bool; CHUNK_COLS],
    pub bricks: [[bool; CHUNK_COLS]; MAP_ROWS],
}

impl ChunkGrid {
    /// Roll a chunk layout from the RNG.
    ///
    /// The bottom row is solid ground. A left-to-right walk drops platform
    /// runs into the three upper bands, sometimes with an enemy on top,
    /// then each column rolls its decorations. When `spawn_player` is set
    /// the spawn marker lands last, so it always survives the walk.
    pub fn generate(rng: &mut impl Rng, spawn_player: bool) -> ChunkGrid {
        let mut grid = ChunkGrid {
            tiles: [[TileMarker::Empty; CHUNK_COLS]; MAP_ROWS],
            grass: [false; CHUNK_COLS],
            bricks: [[false; CHUNK_COLS]; MAP_ROWS],
        };

        for cell in grid.tiles[MAP_ROWS - 1].iter_mut() {
            *cell = TileMarker::Ground;
        }

        let mut x = 0;
        while x < CHUNK_COLS {
            if rng.gen::<f64>() < PLATFORM_CHANCE && x < CHUNK_COLS - 3 {
                let (row, min_len, max_len) = PLATFORM_BANDS[rng.gen_range(0..PLATFORM_BANDS.len())];
                let mut len = rng.gen_range(min_len..=max_len);
                if x + len >= CHUNK_COLS {
                    len = CHUNK_COLS - x - 1;
                }
                for cell in grid.tiles[row][x..x + len].iter_mut() {
                    *cell = TileMarker::Platform;
                }
                if rng.gen::<f64>() < ENEMY_CHANCE && len > 2 {
                    let offset = rng.gen_range(1..len);
                    grid.tiles[row - 1][x + offset] = TileMarker::EnemySpawn;
                }
                x += len + rng.gen_range(1..=3);
            } else {
                x += 1;
            }
        }

        for c in 0..CHUNK_COLS {
            if rng.gen::<f64>() < GRASS_CHANCE && grid.tiles[MAP_ROWS - 2][c] == TileMarker::Empty {
                grid.grass[c] = true;
            }
            if rng.gen::<f64>() < BRICK_CHANCE && c % 2 == 0 {
                grid.bricks[rng.gen_range(0..MAP_ROWS - 2)][c] = true;
            }
        }

        if spawn_player {
            grid.tiles[PLAYER_SPAWN_ROW][PLAYER_SPAWN_COL] = TileMarker::PlayerSpawn;
        }

        grid
    }
}

// ---------------------------------------------------------------------------
// Materialization
// ---------------------------------------------------------------------------

/// Entities produced from one chunk, ready to extend the world's layers.
#[derive(Debug, Default)]
pub struct ChunkBatch {
    /// Solid terrain tiles.
    pub level: Vec<Entity>,
    /// Background bricks, drawn behind everything.
    pub background: Vec<Entity>,
    /// Foreground grass, drawn in front of everything.
    pub foreground: Vec<Entity>,
    /// Enemies standing on their spawn markers.
    pub enemies: Vec<Entity>,
    /// The player, when this chunk hosted the spawn marker.
    pub player: Option<Entity>,
}

/// World-space y of a grid row. Chunks are anchored to the viewport bottom,
/// so the last row sits one tile above it.
fn row_y(row: usize, config: &WorldConfig) -> f32 {
    config.viewport_h - (MAP_ROWS - row) as f32 * config.tile_size
}

/// Place a grid's markers into world space starting at `start_x`.
pub fn materialize(
    grid: &ChunkGrid,
    start_x: f32,
    config: &WorldConfig,
    resources: &ResourceTable,
) -> ChunkBatch {
    let tile = config.tile_size;
    let mut batch = ChunkBatch::default();

    for (r, row) in grid.tiles.iter().enumerate() {
        for (c, marker) in row.iter().enumerate() {
            let pos = Vec2::new(start_x + c as f32 * tile, row_y(r, config));
            match marker {
                TileMarker::Empty => {}
                TileMarker::Ground => {
                    batch
                        .level
                        .push(solid_tile(pos, tile, resources, /* ground */ true));
                }
                TileMarker::Platform => {
                    batch
                        .level
                        .push(solid_tile(pos, tile, resources, /* ground */ false));
                }
                TileMarker::EnemySpawn => batch.enemies.push(spawn_enemy(pos, resources)),
                TileMarker::PlayerSpawn => batch.player = Some(spawn_player(pos, resources)),
            }
        }
    }

    for (c, &grass) in grid.grass.iter().enumerate() {
        if grass {
            let pos = Vec2::new(start_x + c as f32 * tile, row_y(MAP_ROWS - 2, config));
            batch
                .foreground
                .push(decor_tile(pos, tile, resources.tile_sheets.grass));
        }
    }
    for (r, row) in grid.bricks.iter().enumerate() {
        for (c, &brick) in row.iter().enumerate() {
            if brick {
                let pos = Vec2::new(start_x + c as f32 * tile, row_y(r, config));
                batch
                    .background
                    .push(decor_tile(pos, tile, resources.tile_sheets.brick));
            }
        }
    }

    debug!(
        start_x,
        tiles = batch.level.len(),
        enemies = batch.enemies.len(),
        "materialized chunk"
    );
    batch
}

fn solid_tile(pos: Vec2, tile: f32, resources: &ResourceTable, ground: bool) -> Entity {
    let mut entity = Entity::new(Payload::Level);
    entity.position = pos;
    entity.collider = Rect::new(0.0, 0.0, tile, tile);
    entity.sheet = Some(if ground {
        resources.tile_sheets.ground
    } else {
        resources.tile_sheets.panel
    });
    entity
}

fn decor_tile(pos: Vec2, tile: f32, sheet: gunrun_core::resources::SpriteSheet) -> Entity {
    let mut entity = Entity::new(Payload::Level);
    entity.position = pos;
    entity.collider = Rect::new(0.0, 0.0, tile, tile);
    entity.sheet = Some(sheet);
    entity
}

fn spawn_enemy(pos: Vec2, resources: &ResourceTable) -> Entity {
    let mut enemy = Entity::new(Payload::Enemy(EnemyData::new(30)));
    enemy.position = pos;
    enemy.collider = Rect::new(10.0, 4.0, 12.0, 20.0);
    enemy.dynamic = true;
    enemy.animations = resources.enemy_anims.clone();
    set_visual(&mut enemy, resources.enemy_sheets.walk, ANIM_ENEMY_WALK);
    enemy
}

fn spawn_player(pos: Vec2, resources: &ResourceTable) -> Entity {
    let mut player = Entity::new(Payload::Player(PlayerData::new(100)));
    player.position = pos;
    player.collider = Rect::new(11.0, 6.0, 10.0, 26.0);
    player.acceleration = Vec2::new(300.0, 0.0);
    player.max_speed_x = Some(100.0);
    player.dynamic = true;
    player.animations = resources.player_anims.clone();
    set_visual(&mut player, resources.player_sheets.idle, ANIM_PLAYER_IDLE);
    player
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
