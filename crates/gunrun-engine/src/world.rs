//! The world: entity layers, the per-tick update pipeline, and rendering.
//!
//! Each [`World::update`] runs a fixed pipeline:
//!
//! 1. stream new chunks ahead of the player,
//! 2. per character: advance timers and animations, apply gravity, run the
//!    archetype behavior, integrate against a fresh obstacle snapshot,
//!    apply contact damage, refresh the grounded flag,
//! 3. per bullet: advance, integrate, hand contacts to gameplay,
//! 4. scroll the viewport and drop everything left far behind it.
//!
//! All randomness flows through the world's seeded RNG, so equal configs
//! and equal inputs give equal worlds tick for tick.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::{info, warn};

use gunrun_core::entity::{BulletPhase, Entity, Facing, Payload, PlayerState};
use gunrun_core::rect::Rect;
use gunrun_core::resources::{ResourceTable, ANIM_PLAYER_RUN};
use gunrun_core::ClockError;

use crate::ai::{self, set_visual, JUMP_VELOCITY};
use crate::config::WorldConfig;
use crate::interfaces::{AudioPlayer, Color, InputSource, Key, Renderer, DEFAULT_VOLUME};
use crate::levelgen::{materialize, ChunkGrid, CHUNK_COLS};
use crate::physics::{
    apply_contact_damage, apply_gravity, collect_obstacles, integrate_and_collide,
    refresh_grounded, ObstacleKind,
};

/// New terrain is generated whenever the player is within this many
/// viewport widths of the last chunk's end.
const STREAM_AHEAD_VIEWPORTS: f32 = 1.5;
/// Entities this many viewport widths behind the player are dropped.
const CLEANUP_BEHIND_VIEWPORTS: f32 = 2.0;
/// Bullets this many viewport widths ahead of the player are dropped.
const BULLET_AHEAD_VIEWPORTS: f32 = 15.0;

/// Tint used while an entity's hit flash is up.
const FLASH_TINT: Color = Color::rgb(180, 180, 255);
/// Fill for debug collider overlays.
const DEBUG_COLLIDER: Color = Color::rgba(255, 0, 0, 100);

/// The whole simulation state.
pub struct World {
    config: WorldConfig,
    resources: ResourceTable,
    /// Solid terrain tiles.
    level: Vec<Entity>,
    /// Player and enemies. The player's slot is tracked separately.
    characters: Vec<Entity>,
    /// The bullet pool, including inactive slots awaiting reuse.
    bullets: Vec<Entity>,
    background_tiles: Vec<Entity>,
    foreground_tiles: Vec<Entity>,
    viewport: Rect,
    player_index: Option<usize>,
    debug_mode: bool,
    /// World-space x where generated terrain currently ends.
    last_chunk_end: f32,
    rng: Pcg32,
}

impl World {
    /// An empty world. Call [`start`](World::start) to lay terrain and
    /// place the player.
    pub fn new(config: WorldConfig, resources: ResourceTable) -> World {
        let viewport = Rect::new(0.0, 0.0, config.viewport_w, config.viewport_h);
        let rng = Pcg32::seed_from_u64(config.seed);
        World {
            config,
            resources,
            level: Vec::new(),
            characters: Vec::new(),
            bullets: Vec::new(),
            background_tiles: Vec::new(),
            foreground_tiles: Vec::new(),
            viewport,
            player_index: None,
            debug_mode: false,
            last_chunk_end: 0.0,
            rng,
        }
    }

    /// Generate the opening terrain, place the player, and start the music.
    pub fn start(&mut self, audio: &mut dyn AudioPlayer) {
        self.generate_chunk(true);
        debug_assert!(
            self.player_index.is_some(),
            "spawn chunk must place the player"
        );
        self.generate_chunk(false);
        self.generate_chunk(false);
        audio.play_loop(self.resources.sounds.music, DEFAULT_VOLUME);
        info!(seed = self.config.seed, "world started");
    }

    fn generate_chunk(&mut self, spawn_player: bool) {
        let grid = ChunkGrid::generate(&mut self.rng, spawn_player);
        let batch = materialize(&grid, self.last_chunk_end, &self.config, &self.resources);
        self.last_chunk_end += CHUNK_COLS as f32 * self.config.tile_size;

        self.level.extend(batch.level);
        self.background_tiles.extend(batch.background);
        self.foreground_tiles.extend(batch.foreground);
        if let Some(player) = batch.player {
            // A second spawn marker is host misuse; keep the existing player.
            if self.player_index.is_none() {
                self.player_index = Some(self.characters.len());
                self.characters.push(player);
            } else {
                warn!("duplicate player spawn ignored");
            }
        }
        self.characters.extend(batch.enemies);
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn player(&self) -> Option<&Entity> {
        self.player_index.and_then(|i| self.characters.get(i))
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.player_index.and_then(|i| self.characters.get_mut(i))
    }

    /// Whether the run has ended with the player's death.
    pub fn game_over(&self) -> bool {
        self.player()
            .and_then(|p| p.as_player())
            .map(|data| data.state == PlayerState::Dead)
            .unwrap_or(false)
    }

    pub fn characters(&self) -> &[Entity] {
        &self.characters
    }

    pub fn bullets(&self) -> &[Entity] {
        &self.bullets
    }

    pub fn active_bullets(&self) -> usize {
        self.bullets
            .iter()
            .filter(|b| {
                b.as_bullet()
                    .map(|data| data.phase != BulletPhase::Inactive)
                    .unwrap_or(false)
            })
            .count()
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn set_debug_mode(&mut self, on: bool) {
        self.debug_mode = on;
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Handle a discrete key transition. Only the jump is edge-triggered;
    /// movement and fire are polled from the [`InputSource`] during
    /// [`update`](World::update).
    pub fn key_event(&mut self, key: Key, pressed: bool) {
        if key != Key::Jump || !pressed {
            return;
        }
        let Some(index) = self.player_index else {
            return;
        };
        let run = self.resources.player_sheets.run;
        let player = &mut self.characters[index];

        let state = player.as_player().map(|data| data.state);
        let can_jump = player.grounded
            && !matches!(state, Some(PlayerState::Jumping) | Some(PlayerState::Dead));
        if can_jump {
            if let Some(data) = player.as_player_mut() {
                data.state = PlayerState::Jumping;
            }
            player.velocity.y = JUMP_VELOCITY;
            player.grounded = false;
            set_visual(player, run, ANIM_PLAYER_RUN);
        }
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds.
    pub fn update(
        &mut self,
        dt: f32,
        input: &dyn InputSource,
        audio: &mut dyn AudioPlayer,
    ) -> Result<(), ClockError> {
        if dt < 0.0 {
            return Err(ClockError::NegativeDelta { dt });
        }
        let tile = self.config.tile_size;
        let gravity = self.config.gravity;

        // Terrain streaming.
        if let Some(px) = self.player().map(|p| p.position.x) {
            while px > self.last_chunk_end - STREAM_AHEAD_VIEWPORTS * self.config.viewport_w {
                self.generate_chunk(false);
            }
        }

        // Characters. Each mover resolves against a snapshot taken just
        // before it runs, so order within the tick stays well-defined.
        for i in 0..self.characters.len() {
            let player_pos = self.player().map(|p| p.position);
            let snapshot = collect_obstacles(&self.level, &self.characters, Some(i));

            let character = &mut self.characters[i];
            if character.should_flash && character.flash_timer.advance(dt)? {
                character.should_flash = false;
            }
            character.advance_animation(dt)?;
            apply_gravity(character, gravity, dt);

            if character.payload.is_player() {
                ai::update_player(
                    character,
                    input,
                    &mut self.bullets,
                    &self.resources,
                    audio,
                    &mut self.rng,
                    tile,
                    dt,
                )?;
            } else if character.payload.is_enemy() {
                ai::update_enemy(character, player_pos, &snapshot, &self.resources, dt)?;
            }

            integrate_and_collide(character, dt, &snapshot);
            if character.payload.is_player() {
                apply_contact_damage(character, &snapshot);
            }
            refresh_grounded(character, &snapshot);
        }

        // Bullets. A hit is applied to the struck enemy after the bullet's
        // own borrow ends.
        for i in 0..self.bullets.len() {
            let snapshot = collect_obstacles(&self.level, &self.characters, None);
            let bullet = &mut self.bullets[i];
            bullet.advance_animation(dt)?;

            let moving = matches!(
                bullet.as_bullet().map(|data| data.phase),
                Some(BulletPhase::Moving)
            );
            let mut struck_enemy: Option<(usize, Facing)> = None;
            if moving {
                let contacts = integrate_and_collide(bullet, dt, &snapshot);
                if let Some(contact) = contacts.first() {
                    ai::on_bullet_impact(bullet, &self.resources);
                    match contact.kind {
                        ObstacleKind::Tile => {
                            audio.play_once(self.resources.sounds.wall_hit, DEFAULT_VOLUME);
                        }
                        ObstacleKind::Enemy => {
                            struck_enemy = Some((contact.index, bullet.facing));
                        }
                    }
                }
            }
            ai::update_bullet(bullet, &self.viewport, tile);

            if let Some((index, facing)) = struck_enemy {
                ai::apply_bullet_hit(&mut self.characters[index], facing, &self.resources, audio);
            }
        }

        // Scroll and cleanup.
        if let Some(px) = self.player().map(|p| p.position.x) {
            let vw = self.config.viewport_w;
            let behind = px - CLEANUP_BEHIND_VIEWPORTS * vw;
            let ahead = px + BULLET_AHEAD_VIEWPORTS * vw;

            self.viewport.x = px + tile / 2.0 - vw / 2.0;

            self.bullets
                .retain(|b| b.position.x > behind && b.position.x < ahead);
            self.level.retain(|t| t.position.x + t.collider.w >= behind);
            self.background_tiles
                .retain(|t| t.position.x + t.collider.w >= behind);
            self.foreground_tiles
                .retain(|t| t.position.x + t.collider.w >= behind);

            // Corpses leave once their death animation has finished.
            self.characters.retain(|c| {
                if c.payload.is_player() {
                    return true;
                }
                if c.payload.is_enemy() {
                    let hp = c.as_enemy().map(|data| data.hit_points).unwrap_or(0);
                    if hp <= 0 && c.current_animation.is_none() {
                        return false;
                    }
                }
                c.position.x + c.collider.w >= behind
            });
            self.player_index = self.characters.iter().position(|c| c.payload.is_player());
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// Draw one frame. Draw failures are logged and skipped; a bad sprite
    /// never takes the frame down.
    pub fn render(&self, renderer: &mut dyn Renderer) {
        for tile in &self.background_tiles {
            self.draw_entity(renderer, tile);
        }
        for tile in &self.level {
            self.draw_entity(renderer, tile);
        }
        for character in &self.characters {
            self.draw_entity(renderer, character);
            self.draw_overhead_health_bar(renderer, character);
        }
        for bullet in &self.bullets {
            let active = bullet
                .as_bullet()
                .map(|data| data.phase != BulletPhase::Inactive)
                .unwrap_or(false);
            if active {
                self.draw_entity(renderer, bullet);
            }
        }
        for tile in &self.foreground_tiles {
            self.draw_entity(renderer, tile);
        }
        self.draw_player_hud(renderer);
        if self.debug_mode {
            self.draw_debug_overlays(renderer);
        }
    }

    fn draw_entity(&self, renderer: &mut dyn Renderer, entity: &Entity) {
        let Some(sheet) = entity.sheet else {
            return;
        };
        let frame = entity.current_frame();
        let src = Rect::new(
            frame as f32 * sheet.frame_w,
            0.0,
            sheet.frame_w,
            sheet.frame_h,
        );
        let dst = Rect::new(
            entity.position.x - self.viewport.x,
            entity.position.y - self.viewport.y,
            sheet.frame_w,
            sheet.frame_h,
        );
        let flip = entity.facing == Facing::Left;

        let result = if entity.should_flash {
            renderer.draw_sprite_tinted(sheet.texture, src, dst, flip, FLASH_TINT)
        } else {
            renderer.draw_sprite(sheet.texture, src, dst, flip)
        };
        if let Err(err) = result {
            warn!(%err, "sprite draw failed");
        }
    }

    /// A small bar above a wounded character, player or enemy. Untouched
    /// and dead characters get none.
    fn draw_overhead_health_bar(&self, renderer: &mut dyn Renderer, entity: &Entity) {
        let stats = match &entity.payload {
            Payload::Player(data) => Some((data.hit_points, data.max_hit_points)),
            Payload::Enemy(data) => Some((data.hit_points, data.max_hit_points)),
            _ => None,
        };
        let Some((hit_points, max_hit_points)) = stats else {
            return;
        };
        if hit_points >= max_hit_points || hit_points <= 0 {
            return;
        }
        let ratio = hit_points as f32 / max_hit_points as f32;
        let rect = entity.collider_rect();
        let x = rect.x - self.viewport.x;
        let y = rect.y - self.viewport.y - 8.0;
        renderer.draw_rect(Rect::new(x, y, rect.w, 4.0), Color::RED, true);
        renderer.draw_rect(Rect::new(x, y, rect.w * ratio, 4.0), health_color(ratio), true);
    }

    fn draw_player_hud(&self, renderer: &mut dyn Renderer) {
        let Some(data) = self.player().and_then(|p| p.as_player()) else {
            return;
        };
        let ratio = data.hit_points.max(0) as f32 / data.max_hit_points as f32;
        let bar = Rect::new(10.0, 10.0, 100.0, 8.0);
        renderer.draw_rect(bar, Color::GRAY, true);
        renderer.draw_rect(
            Rect::new(bar.x, bar.y, bar.w * ratio, bar.h),
            health_color(ratio),
            true,
        );
    }

    fn draw_debug_overlays(&self, renderer: &mut dyn Renderer) {
        let mut draw = |entity: &Entity| {
            let rect = entity.collider_rect();
            renderer.draw_rect(
                Rect::new(
                    rect.x - self.viewport.x,
                    rect.y - self.viewport.y,
                    rect.w,
                    rect.h,
                ),
                DEBUG_COLLIDER,
                true,
            );
        };
        for character in &self.characters {
            draw(character);
        }
        for bullet in &self.bullets {
            let active = bullet
                .as_bullet()
                .map(|data| data.phase != BulletPhase::Inactive)
                .unwrap_or(false);
            if active {
                draw(bullet);
            }
        }
    }
}

fn health_color(ratio: f32) -> Color {
    if ratio > 0.6 {
        Color::GREEN
    } else if ratio > 0.3 {
        Color::ORANGE
    } else {
        Color::RED
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
