//! Per-archetype behavior: the player, enemy, and bullet state machines.
//!
//! These run after gravity and before integration each tick. They only
//! touch the entity they are given (plus the bullet pool when the player
//! fires); collision consequences such as bullet hits are applied by the
//! world after the physics pass, through [`apply_bullet_hit`].

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use gunrun_core::entity::{
    BulletData, BulletPhase, Entity, EnemyState, Facing, Payload, PlayerState,
};
use gunrun_core::rect::Rect;
use gunrun_core::resources::{
    ResourceTable, SpriteSheet, ANIM_BULLET_HIT, ANIM_BULLET_MOVING, ANIM_ENEMY_DIE,
    ANIM_ENEMY_HIT, ANIM_ENEMY_WALK, ANIM_PLAYER_IDLE, ANIM_PLAYER_RUN, ANIM_PLAYER_RUN_SHOOT,
    ANIM_PLAYER_SHOOT, ANIM_PLAYER_SLIDE, ANIM_PLAYER_SLIDE_SHOOT,
};
use gunrun_core::ClockError;

use crate::interfaces::{AudioPlayer, InputSource, Key, DEFAULT_VOLUME};
use crate::physics::{Obstacle, ObstacleKind};

/// Upward velocity applied when a jump starts.
pub const JUMP_VELOCITY: f32 = -200.0;
/// Horizontal bullet speed, signed by the shooter's facing.
pub const BULLET_SPEED: f32 = 600.0;
/// Vertical bullet spread: an integer jitter in [-20, 20).
pub const BULLET_JITTER: i32 = 40;
/// Pool cap on simultaneously active bullets.
pub const MAX_ACTIVE_BULLETS: usize = 6;
/// Damage per bullet hit.
pub const BULLET_DAMAGE: i32 = 1;
/// Enemy walk speed while the player is noticed, in units per second.
pub const ENEMY_WALK_SPEED: f32 = 50.0;
/// Enemies ignore a player closer than this.
pub const ENEMY_NOTICE_NEAR: f32 = 50.0;
/// Enemies ignore a player farther than this.
pub const ENEMY_NOTICE_FAR: f32 = 200.0;
/// Terminal frame of the death sheet, shown after the animation completes.
pub const ENEMY_DEATH_FRAME: usize = 17;
/// Idle deceleration, as a multiple of the player's own acceleration.
pub const IDLE_DECEL_FACTOR: f32 = 1.5;
/// Muzzle x offset within the player sprite when facing left / right.
pub const BULLET_MUZZLE_LEFT: f32 = 4.0;
pub const BULLET_MUZZLE_RIGHT: f32 = 24.0;

/// Point an entity's visuals at a sheet/animation pair.
pub(crate) fn set_visual(entity: &mut Entity, sheet: SpriteSheet, anim: usize) {
    entity.sheet = Some(sheet);
    entity.current_animation = Some(anim);
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

fn player_state(player: &Entity) -> PlayerState {
    player
        .as_player()
        .map(|data| data.state)
        .unwrap_or(PlayerState::Idle)
}

fn set_player_state(player: &mut Entity, state: PlayerState) {
    if let Some(data) = player.as_player_mut() {
        data.state = state;
    }
}

/// Run the player's locomotion and shooting for one tick.
///
/// A dead player only holds still; everyone else reads the level-triggered
/// movement keys, walks the state machine, and fires through the bullet
/// pool. Jumping starts elsewhere, in
/// [`World::key_event`](crate::world::World::key_event).
#[allow(clippy::too_many_arguments)]
pub fn update_player(
    player: &mut Entity,
    input: &dyn InputSource,
    bullets: &mut Vec<Entity>,
    resources: &ResourceTable,
    audio: &mut dyn AudioPlayer,
    rng: &mut impl Rng,
    tile_size: f32,
    dt: f32,
) -> Result<(), ClockError> {
    {
        let Some(data) = player.as_player_mut() else {
            return Ok(());
        };
        data.weapon_timer.advance(dt)?;
        data.damage_cooldown = (data.damage_cooldown - dt).max(0.0);
    }

    if player_state(player) == PlayerState::Dead {
        player.velocity = Vec2::ZERO;
        return Ok(());
    }

    let mut dir = 0.0f32;
    if input.is_key_down(Key::MoveLeft) {
        dir -= 1.0;
        player.facing = Facing::Left;
    }
    if input.is_key_down(Key::MoveRight) {
        dir += 1.0;
        player.facing = Facing::Right;
    }

    // Landing resolves a jump into idle or running.
    if player.grounded && player_state(player) == PlayerState::Jumping {
        if dir != 0.0 {
            set_player_state(player, PlayerState::Running);
            set_visual(player, resources.player_sheets.run, ANIM_PLAYER_RUN);
        } else {
            set_player_state(player, PlayerState::Idle);
            set_visual(player, resources.player_sheets.idle, ANIM_PLAYER_IDLE);
        }
    }

    match player_state(player) {
        PlayerState::Idle => {
            if dir != 0.0 {
                set_player_state(player, PlayerState::Running);
                set_visual(player, resources.player_sheets.run, ANIM_PLAYER_RUN);
            } else {
                set_visual(player, resources.player_sheets.idle, ANIM_PLAYER_IDLE);
                if player.velocity.x != 0.0 {
                    // Decelerate toward rest, clamping at the zero crossing
                    // so the player never jitters around standstill.
                    let factor = if player.velocity.x > 0.0 {
                        -IDLE_DECEL_FACTOR
                    } else {
                        IDLE_DECEL_FACTOR
                    };
                    let amount = factor * player.acceleration.x * dt;
                    if player.velocity.x.abs() < amount.abs() {
                        player.velocity.x = 0.0;
                    } else {
                        player.velocity.x += amount;
                    }
                }
            }
            handle_shooting(
                player,
                bullets,
                resources,
                audio,
                rng,
                input,
                tile_size,
                (resources.player_sheets.idle, ANIM_PLAYER_IDLE),
                (resources.player_sheets.shoot, ANIM_PLAYER_SHOOT),
            );
        }
        PlayerState::Running | PlayerState::Sliding => {
            if dir == 0.0 {
                set_player_state(player, PlayerState::Idle);
                set_visual(player, resources.player_sheets.idle, ANIM_PLAYER_IDLE);
            } else {
                player.velocity.x += dir * player.acceleration.x * dt;
                // Momentum against facing while grounded shows the slide.
                let sliding = player.velocity.x * player.facing.sign() < 0.0 && player.grounded;
                set_player_state(
                    player,
                    if sliding {
                        PlayerState::Sliding
                    } else {
                        PlayerState::Running
                    },
                );
            }
            if player_state(player) == PlayerState::Sliding {
                handle_shooting(
                    player,
                    bullets,
                    resources,
                    audio,
                    rng,
                    input,
                    tile_size,
                    (resources.player_sheets.slide, ANIM_PLAYER_SLIDE),
                    (resources.player_sheets.slide_shoot, ANIM_PLAYER_SLIDE_SHOOT),
                );
            } else if player_state(player) != PlayerState::Idle {
                handle_shooting(
                    player,
                    bullets,
                    resources,
                    audio,
                    rng,
                    input,
                    tile_size,
                    (resources.player_sheets.run, ANIM_PLAYER_RUN),
                    (resources.player_sheets.run_shoot, ANIM_PLAYER_RUN_SHOOT),
                );
            }
        }
        PlayerState::Jumping => {
            handle_shooting(
                player,
                bullets,
                resources,
                audio,
                rng,
                input,
                tile_size,
                (resources.player_sheets.run, ANIM_PLAYER_RUN),
                (resources.player_sheets.run_shoot, ANIM_PLAYER_RUN_SHOOT),
            );
            if dir != 0.0 {
                player.velocity.x += dir * player.acceleration.x * dt;
            }
        }
        PlayerState::Dead => {}
    }

    Ok(())
}

/// Shared shooting logic for every locomotion state. Picks between the
/// normal and firing visuals, and spawns into the bullet pool when the fire
/// key is held, the weapon timer has pulsed, and the pool has room.
#[allow(clippy::too_many_arguments)]
fn handle_shooting(
    player: &mut Entity,
    bullets: &mut Vec<Entity>,
    resources: &ResourceTable,
    audio: &mut dyn AudioPlayer,
    rng: &mut impl Rng,
    input: &dyn InputSource,
    tile_size: f32,
    normal: (SpriteSheet, usize),
    firing: (SpriteSheet, usize),
) {
    let ready = player
        .as_player()
        .map(|data| data.weapon_timer.timed_out())
        .unwrap_or(false);

    if input.is_key_down(Key::Fire) && ready {
        set_visual(player, firing.0, firing.1);

        let active = bullets
            .iter()
            .filter(|b| {
                b.as_bullet()
                    .map(|data| data.phase != BulletPhase::Inactive)
                    .unwrap_or(false)
            })
            .count();
        if active < MAX_ACTIVE_BULLETS {
            if let Some(data) = player.as_player_mut() {
                data.weapon_timer.reset();
            }
            let bullet = spawn_bullet(player, resources, rng, tile_size);
            let free_slot = bullets.iter().position(|b| {
                b.as_bullet()
                    .map(|data| data.phase == BulletPhase::Inactive)
                    .unwrap_or(false)
            });
            match free_slot {
                Some(slot) => bullets[slot] = bullet,
                None => bullets.push(bullet),
            }
            audio.play_once(resources.sounds.shoot, DEFAULT_VOLUME);
        }
    } else {
        set_visual(player, normal.0, normal.1);
    }
}

/// Build a fresh bullet at the shooter's muzzle.
pub fn spawn_bullet(
    shooter: &Entity,
    resources: &ResourceTable,
    rng: &mut impl Rng,
    tile_size: f32,
) -> Entity {
    let sheet = resources.bullet_sheets.moving;

    let mut bullet = Entity::new(Payload::Bullet(BulletData {
        phase: BulletPhase::Moving,
    }));
    bullet.facing = shooter.facing;
    bullet.sheet = Some(sheet);
    bullet.animations = resources.bullet_anims.clone();
    bullet.current_animation = Some(ANIM_BULLET_MOVING);
    bullet.collider = Rect::new(0.0, 0.0, sheet.frame_w, sheet.frame_h);

    let jitter = rng.gen_range(0..BULLET_JITTER) as f32 - BULLET_JITTER as f32 / 2.0;
    bullet.velocity = Vec2::new(BULLET_SPEED * shooter.facing.sign(), jitter);

    // Muzzle sits at a different x within the sprite depending on facing.
    let t = (shooter.facing.sign() + 1.0) / 2.0;
    let x_offset = BULLET_MUZZLE_LEFT + (BULLET_MUZZLE_RIGHT - BULLET_MUZZLE_LEFT) * t;
    bullet.position = Vec2::new(
        shooter.position.x + x_offset,
        shooter.position.y + tile_size / 2.0,
    );
    bullet
}

// ---------------------------------------------------------------------------
// Enemy
// ---------------------------------------------------------------------------

/// Run one enemy's state machine for one tick.
///
/// Shambling enemies notice a player between [`ENEMY_NOTICE_NEAR`] and
/// [`ENEMY_NOTICE_FAR`] away and walk toward them, turning around at ledges.
/// Damaged enemies stagger until their recovery timer pulses. Dead enemies
/// hold still, and once the death animation completes they freeze on the
/// terminal frame and zero their hit points, which marks them for removal.
pub fn update_enemy(
    enemy: &mut Entity,
    player_pos: Option<Vec2>,
    obstacles: &[Obstacle],
    resources: &ResourceTable,
    dt: f32,
) -> Result<(), ClockError> {
    let state = match enemy.as_enemy() {
        Some(data) => data.state,
        None => return Ok(()),
    };

    match state {
        EnemyState::Shambling => match player_pos {
            Some(player_pos) => {
                let delta = player_pos - enemy.position;
                let distance = delta.length();
                if distance > ENEMY_NOTICE_NEAR && distance < ENEMY_NOTICE_FAR {
                    if ledge_ahead(enemy, obstacles) {
                        enemy.facing = enemy.facing.flipped();
                    } else {
                        enemy.facing = Facing::from_dx(delta.x);
                    }
                    enemy.velocity.x = ENEMY_WALK_SPEED * enemy.facing.sign();
                } else {
                    enemy.velocity.x = 0.0;
                }
            }
            None => enemy.velocity.x = 0.0,
        },
        EnemyState::Damaged => {
            let recovered = enemy
                .as_enemy_mut()
                .map(|data| data.recover_timer.advance(dt))
                .transpose()?
                .unwrap_or(false);
            if recovered {
                if let Some(data) = enemy.as_enemy_mut() {
                    data.state = EnemyState::Shambling;
                }
                set_visual(enemy, resources.enemy_sheets.walk, ANIM_ENEMY_WALK);
            }
        }
        EnemyState::Dead => {
            enemy.velocity.x = 0.0;
            let finished = enemy
                .current_animation
                .and_then(|idx| enemy.animations.get(idx))
                .map(|anim| anim.timed_out())
                .unwrap_or(false);
            if finished {
                enemy.current_animation = None;
                enemy.sprite_frame = ENEMY_DEATH_FRAME;
                if let Some(data) = enemy.as_enemy_mut() {
                    data.hit_points = 0;
                }
            }
        }
    }
    Ok(())
}

/// Whether the 1x1 sensor half a collider-width ahead of the enemy's feet
/// finds no ground to walk onto.
fn ledge_ahead(enemy: &Entity, obstacles: &[Obstacle]) -> bool {
    let sensor_x =
        enemy.position.x + enemy.collider.x + (enemy.collider.w / 2.0) * enemy.facing.sign();
    let sensor = Rect::new(
        sensor_x,
        enemy.position.y + enemy.collider.y + enemy.collider.h + 1.0,
        1.0,
        1.0,
    );
    !obstacles
        .iter()
        .any(|o| o.kind == ObstacleKind::Tile && sensor.intersects(&o.rect))
}

/// Apply a bullet strike to an enemy: damage, stagger, flash, and the turn
/// away from the shot. Kills switch straight to the death visuals.
pub fn apply_bullet_hit(
    enemy: &mut Entity,
    bullet_facing: Facing,
    resources: &ResourceTable,
    audio: &mut dyn AudioPlayer,
) {
    if enemy.is_dead_enemy() {
        return;
    }
    let killed = {
        let Some(data) = enemy.as_enemy_mut() else {
            return;
        };
        data.hit_points -= BULLET_DAMAGE;
        data.recover_timer.reset();
        let killed = data.hit_points <= 0;
        data.state = if killed {
            EnemyState::Dead
        } else {
            EnemyState::Damaged
        };
        killed
    };

    enemy.facing = bullet_facing.flipped();
    enemy.should_flash = true;
    enemy.flash_timer.reset();

    if killed {
        set_visual(enemy, resources.enemy_sheets.die, ANIM_ENEMY_DIE);
        audio.play_once(resources.sounds.enemy_die, DEFAULT_VOLUME);
        debug!(x = enemy.position.x, "enemy killed");
    } else {
        set_visual(enemy, resources.enemy_sheets.hit, ANIM_ENEMY_HIT);
        audio.play_once(resources.sounds.enemy_hit, DEFAULT_VOLUME);
    }
}

// ---------------------------------------------------------------------------
// Bullet
// ---------------------------------------------------------------------------

/// Walk a bullet's lifecycle: moving bullets deactivate once they leave a
/// one-tile margin around the viewport, colliding bullets deactivate when
/// their impact animation completes.
pub fn update_bullet(bullet: &mut Entity, viewport: &Rect, tile_size: f32) {
    let phase = match bullet.as_bullet() {
        Some(data) => data.phase,
        None => return,
    };
    match phase {
        BulletPhase::Moving => {
            if !viewport.inflated(tile_size).contains_point(bullet.position) {
                if let Some(data) = bullet.as_bullet_mut() {
                    data.phase = BulletPhase::Inactive;
                }
            }
        }
        BulletPhase::Colliding => {
            let finished = bullet
                .current_animation
                .and_then(|idx| bullet.animations.get(idx))
                .map(|anim| anim.timed_out())
                .unwrap_or(false);
            if finished {
                if let Some(data) = bullet.as_bullet_mut() {
                    data.phase = BulletPhase::Inactive;
                }
            }
        }
        BulletPhase::Inactive => {}
    }
}

/// Switch a just-stopped bullet to its impact visuals.
pub fn on_bullet_impact(bullet: &mut Entity, resources: &ResourceTable) {
    set_visual(bullet, resources.bullet_sheets.hit, ANIM_BULLET_HIT);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
