//! Movement integration and AABB collision resolution.
//!
//! Each tick the world resolves movers one at a time against an obstacle
//! snapshot taken just before that mover runs:
//!
//! 1. clamp horizontal speed, integrate velocity into position,
//! 2. push the mover out of overlapping solids along the minimum
//!    translation axis (recomputing overlap after each correction),
//! 3. report non-solid contacts (bullet strikes, player/enemy touches) so
//!    the caller can apply gameplay effects after the pass.
//!
//! Resolving against a snapshot keeps every mover's pass independent of
//! mutations made earlier in the same tick, so iteration order never feeds
//! back into collision results mid-pass.

use glam::Vec2;
use tracing::info;

use gunrun_core::entity::{BulletPhase, Entity, Payload, PlayerState};
use gunrun_core::rect::Rect;

/// Damage taken from touching an enemy.
pub const CONTACT_DAMAGE: i32 = 10;
/// Grace period between contact-damage applications, in seconds.
pub const DAMAGE_COOLDOWN_SECS: f32 = 1.0;
/// Horizontal speed imparted to the player when bumping an enemy.
pub const KNOCKBACK_SPEED: f32 = 100.0;

// ---------------------------------------------------------------------------
// Obstacle snapshot
// ---------------------------------------------------------------------------

/// What kind of solid an obstacle is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    /// A terrain tile: movers are pushed out of these.
    Tile,
    /// A live enemy: stops bullets and hurts the player, never pushes.
    Enemy,
}

/// One entry in a mover's obstacle snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Index into the source collection: the level layer for tiles, the
    /// character layer for enemies.
    pub index: usize,
    pub rect: Rect,
}

/// A contact reported back to the caller for gameplay handling.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub kind: ObstacleKind,
    pub index: usize,
}

/// Snapshot every solid the given mover can collide with: all terrain tiles
/// plus every live enemy. Dead enemies are ghosts; `skip_character` excludes
/// the mover itself when it lives in the character layer.
pub fn collect_obstacles(
    level: &[Entity],
    characters: &[Entity],
    skip_character: Option<usize>,
) -> Vec<Obstacle> {
    let mut obstacles = Vec::with_capacity(level.len() + characters.len());
    for (index, tile) in level.iter().enumerate() {
        if tile.payload.is_level() {
            obstacles.push(Obstacle {
                kind: ObstacleKind::Tile,
                index,
                rect: tile.collider_rect(),
            });
        }
    }
    for (index, character) in characters.iter().enumerate() {
        if skip_character == Some(index) {
            continue;
        }
        if character.payload.is_enemy() && !character.is_dead_enemy() {
            obstacles.push(Obstacle {
                kind: ObstacleKind::Enemy,
                index,
                rect: character.collider_rect(),
            });
        }
    }
    obstacles
}

// ---------------------------------------------------------------------------
// Integration
// ---------------------------------------------------------------------------

/// Apply gravity to an airborne dynamic entity.
pub fn apply_gravity(entity: &mut Entity, gravity: f32, dt: f32) {
    if entity.dynamic && !entity.grounded {
        entity.velocity.y += gravity * dt;
    }
}

#[derive(Clone, Copy, PartialEq)]
enum MoverKind {
    Player,
    Enemy,
    MovingBullet,
    Inert,
}

fn mover_kind(entity: &Entity) -> MoverKind {
    match &entity.payload {
        Payload::Player(_) => MoverKind::Player,
        Payload::Enemy(_) => MoverKind::Enemy,
        Payload::Bullet(data) if data.phase == BulletPhase::Moving => MoverKind::MovingBullet,
        _ => MoverKind::Inert,
    }
}

/// Clamp, integrate, and resolve one mover against the obstacle snapshot.
///
/// Solid overlaps (tiles) are resolved by minimum translation; gameplay
/// contacts come back in resolution order for the caller to act on. A
/// moving bullet stops dead on its first contact and reports exactly one.
pub fn integrate_and_collide(mover: &mut Entity, dt: f32, obstacles: &[Obstacle]) -> Vec<Contact> {
    if let Some(max) = mover.max_speed_x {
        mover.velocity.x = mover.velocity.x.clamp(-max, max);
    }
    mover.position += mover.velocity * dt;

    let kind = mover_kind(mover);
    let mut contacts = Vec::new();
    if kind == MoverKind::Inert || (!mover.dynamic && kind != MoverKind::MovingBullet) {
        return contacts;
    }

    for obstacle in obstacles {
        // Recompute against the corrected position each iteration.
        let Some(overlap) = mover.collider_rect().intersection(&obstacle.rect) else {
            continue;
        };
        match (kind, obstacle.kind) {
            (MoverKind::Player | MoverKind::Enemy, ObstacleKind::Tile) => {
                resolve_mtv(mover, &overlap);
            }
            (MoverKind::Player, ObstacleKind::Enemy) => {
                // Shoved back the way the player is facing; damage is
                // handled separately under the cooldown.
                mover.velocity = Vec2::new(KNOCKBACK_SPEED * -mover.facing.sign(), 0.0);
                contacts.push(Contact {
                    kind: obstacle.kind,
                    index: obstacle.index,
                });
            }
            (MoverKind::MovingBullet, _) => {
                mover.velocity = Vec2::ZERO;
                if let Some(data) = mover.as_bullet_mut() {
                    data.phase = BulletPhase::Colliding;
                }
                contacts.push(Contact {
                    kind: obstacle.kind,
                    index: obstacle.index,
                });
                break;
            }
            // Enemies walk through each other.
            (MoverKind::Enemy, ObstacleKind::Enemy) => {}
            _ => {}
        }
    }
    contacts
}

/// Push the mover out along the axis of least overlap, opposite its motion,
/// and kill the velocity component along that axis. A downward push grounds
/// the player on the spot; everything else waits for the probe pass.
fn resolve_mtv(mover: &mut Entity, overlap: &Rect) {
    if overlap.w < overlap.h {
        if mover.velocity.x > 0.0 {
            mover.position.x -= overlap.w;
        } else if mover.velocity.x < 0.0 {
            mover.position.x += overlap.w;
        }
        mover.velocity.x = 0.0;
    } else {
        if mover.velocity.y > 0.0 {
            mover.position.y -= overlap.h;
            if mover.payload.is_player() {
                mover.grounded = true;
            }
        } else if mover.velocity.y < 0.0 {
            mover.position.y += overlap.h;
        }
        mover.velocity.y = 0.0;
    }
}

// ---------------------------------------------------------------------------
// Grounded probe
// ---------------------------------------------------------------------------

/// A 1-unit-tall strip directly under the collider.
pub fn ground_probe(entity: &Entity) -> Rect {
    let rect = entity.collider_rect();
    Rect::new(rect.x, rect.bottom(), rect.w, 1.0)
}

/// Recompute `grounded` from the probe. On the airborne-to-grounded
/// transition the entity snaps flush onto the tile top, but only when the
/// landing is shallow: a probe brushing a neighboring tile mid-fall must
/// not teleport the entity upward.
pub fn refresh_grounded(entity: &mut Entity, obstacles: &[Obstacle]) {
    if !entity.dynamic {
        return;
    }
    let probe = ground_probe(entity);
    let ground_top = obstacles
        .iter()
        .find(|o| o.kind == ObstacleKind::Tile && probe.intersects(&o.rect))
        .map(|o| o.rect.y);

    let was_grounded = entity.grounded;
    match ground_top {
        Some(top) => {
            entity.grounded = true;
            if !was_grounded && entity.collider_rect().bottom() <= top + 1.0 {
                entity.position.y = top - entity.collider.y - entity.collider.h;
                entity.velocity.y = 0.0;
            }
        }
        None => entity.grounded = false,
    }
}

// ---------------------------------------------------------------------------
// Contact damage
// ---------------------------------------------------------------------------

/// Apply enemy-touch damage to the player under the damage cooldown.
/// Returns whether the player died on this call.
pub fn apply_contact_damage(player: &mut Entity, obstacles: &[Obstacle]) -> bool {
    let rect = player.collider_rect();
    let touching = obstacles
        .iter()
        .any(|o| o.kind == ObstacleKind::Enemy && o.rect.intersects(&rect));

    let mut died = false;
    if let Some(data) = player.as_player_mut() {
        if data.state != PlayerState::Dead && touching && data.damage_cooldown <= 0.0 {
            data.hit_points -= CONTACT_DAMAGE;
            data.damage_cooldown = DAMAGE_COOLDOWN_SECS;
            if data.hit_points <= 0 {
                data.state = PlayerState::Dead;
                died = true;
            }
        }
    }
    if died {
        player.velocity = Vec2::ZERO;
        info!(x = player.position.x, "player killed by enemy contact");
    }
    died
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
