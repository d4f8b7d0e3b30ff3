//! The tagged-union entity model.
//!
//! Every game object is one [`Entity`]: a bundle of shared spatial and
//! visual fields plus a [`Payload`] carrying the per-archetype state. The
//! payload tag is what the engine matches on to dispatch behavior, so there
//! are no stringly-typed states and no boolean flag soup: each archetype's
//! lifecycle is an explicit enum and illegal combinations are
//! unrepresentable.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::clock::{Animation, Timer};
use crate::rect::Rect;
use crate::resources::SpriteSheet;

/// Interval between permitted shots while the fire key is held, in seconds.
pub const WEAPON_COOLDOWN_SECS: f32 = 0.1;
/// How long an enemy staggers after taking a bullet, in seconds.
pub const ENEMY_RECOVER_SECS: f32 = 0.5;
/// Duration of the white hit flash, in seconds.
pub const FLASH_SECS: f32 = 0.05;

/// Build a timer from a positive compile-time constant.
fn fixed_timer(length: f32) -> Timer {
    match Timer::new(length) {
        Ok(timer) => timer,
        Err(_) => unreachable!("fixed timer lengths are positive constants"),
    }
}

// ---------------------------------------------------------------------------
// Facing
// ---------------------------------------------------------------------------

/// Horizontal orientation of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// `-1.0` for left, `+1.0` for right.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }

    /// The facing that looks along a horizontal delta. A zero delta faces
    /// left, matching the tie-break used when an enemy sits exactly on the
    /// player's x coordinate.
    pub fn from_dx(dx: f32) -> Facing {
        if dx > 0.0 {
            Facing::Right
        } else {
            Facing::Left
        }
    }
}

// ---------------------------------------------------------------------------
// Archetype state enums
// ---------------------------------------------------------------------------

/// Player locomotion states.
///
/// `Sliding` is entered from `Running` when the player is grounded and
/// still moving against the way they face; it only changes which animation
/// and shoot variant are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Idle,
    Running,
    Sliding,
    Jumping,
    Dead,
}

/// Enemy lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyState {
    /// Walking toward the player when they are in the notice band.
    Shambling,
    /// Staggered after a bullet hit; recovers on a timer.
    Damaged,
    /// Playing the death animation; removed once it completes.
    Dead,
}

/// Bullet lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulletPhase {
    /// In flight.
    Moving,
    /// Stopped on an obstacle, playing the impact animation.
    Colliding,
    /// Pool slot free for reuse.
    Inactive,
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Player-only state.
#[derive(Debug, Clone)]
pub struct PlayerData {
    pub state: PlayerState,
    pub hit_points: i32,
    pub max_hit_points: i32,
    /// Pulses when the next shot is permitted; reset on fire.
    pub weapon_timer: Timer,
    /// Seconds until contact damage can be taken again.
    pub damage_cooldown: f32,
}

impl PlayerData {
    pub fn new(max_hit_points: i32) -> Self {
        Self {
            state: PlayerState::Idle,
            hit_points: max_hit_points,
            max_hit_points,
            weapon_timer: fixed_timer(WEAPON_COOLDOWN_SECS),
            damage_cooldown: 0.0,
        }
    }
}

/// Enemy-only state.
#[derive(Debug, Clone)]
pub struct EnemyData {
    pub state: EnemyState,
    pub hit_points: i32,
    pub max_hit_points: i32,
    /// Runs while `Damaged`; its pulse returns the enemy to `Shambling`.
    pub recover_timer: Timer,
}

impl EnemyData {
    pub fn new(max_hit_points: i32) -> Self {
        Self {
            state: EnemyState::Shambling,
            hit_points: max_hit_points,
            max_hit_points,
            recover_timer: fixed_timer(ENEMY_RECOVER_SECS),
        }
    }
}

/// Bullet-only state.
#[derive(Debug, Clone)]
pub struct BulletData {
    pub phase: BulletPhase,
}

/// The archetype tag plus per-archetype state.
#[derive(Debug, Clone)]
pub enum Payload {
    /// Static terrain. Solid, never moves, never takes damage.
    Level,
    Player(PlayerData),
    Enemy(EnemyData),
    Bullet(BulletData),
}

impl Payload {
    pub fn is_level(&self) -> bool {
        matches!(self, Payload::Level)
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Payload::Player(_))
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self, Payload::Enemy(_))
    }

    pub fn is_bullet(&self) -> bool {
        matches!(self, Payload::Bullet(_))
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// One game object.
///
/// Shared fields cover position, motion, collision, and drawing; the
/// [`Payload`] carries everything archetype-specific. Animations are cloned
/// from the resource templates at spawn so each entity owns its playback
/// position.
#[derive(Debug, Clone)]
pub struct Entity {
    /// World position of the sprite's top-left corner.
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub facing: Facing,
    /// Horizontal speed clamp applied before integration, if any.
    pub max_speed_x: Option<f32>,
    /// Collider bounds relative to `position`.
    pub collider: Rect,
    /// Whether gravity and collision resolution apply.
    pub dynamic: bool,
    pub grounded: bool,
    /// This entity's own animation clocks, indexed by the `ANIM_*` constants
    /// for its archetype.
    pub animations: Vec<Animation>,
    /// Index into `animations`, or `None` to show `sprite_frame` statically.
    pub current_animation: Option<usize>,
    /// Sprite sheet to draw from, or `None` for invisible entities.
    pub sheet: Option<SpriteSheet>,
    /// Static frame shown when no animation is selected.
    pub sprite_frame: usize,
    /// Hit flash: drawn tinted while set, cleared by `flash_timer`.
    pub should_flash: bool,
    pub flash_timer: Timer,
    pub payload: Payload,
}

impl Entity {
    /// An entity with neutral defaults for every shared field. Spawn
    /// helpers fill in archetype specifics.
    pub fn new(payload: Payload) -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            facing: Facing::Right,
            max_speed_x: None,
            collider: Rect::default(),
            dynamic: false,
            grounded: false,
            animations: Vec::new(),
            current_animation: None,
            sheet: None,
            sprite_frame: 0,
            should_flash: false,
            flash_timer: fixed_timer(FLASH_SECS),
            payload,
        }
    }

    /// The collider in world space.
    pub fn collider_rect(&self) -> Rect {
        self.collider.translated(self.position)
    }

    /// The sprite frame to draw right now: the selected animation's frame,
    /// or the static `sprite_frame` when no animation is active.
    pub fn current_frame(&self) -> usize {
        self.current_animation
            .and_then(|idx| self.animations.get(idx))
            .map(|anim| anim.current_frame())
            .unwrap_or(self.sprite_frame)
    }

    /// Advance the selected animation, if any.
    pub fn advance_animation(&mut self, dt: f32) -> Result<(), crate::ClockError> {
        if let Some(anim) = self
            .current_animation
            .and_then(|idx| self.animations.get_mut(idx))
        {
            anim.advance(dt)?;
        }
        Ok(())
    }

    // -- payload accessors ---------------------------------------------------

    pub fn as_player(&self) -> Option<&PlayerData> {
        match &self.payload {
            Payload::Player(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.payload {
            Payload::Player(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyData> {
        match &self.payload {
            Payload::Enemy(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyData> {
        match &mut self.payload {
            Payload::Enemy(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_bullet(&self) -> Option<&BulletData> {
        match &self.payload {
            Payload::Bullet(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_bullet_mut(&mut self) -> Option<&mut BulletData> {
        match &mut self.payload {
            Payload::Bullet(data) => Some(data),
            _ => None,
        }
    }

    /// Whether this is an enemy in its `Dead` state. Dead enemies stop
    /// colliding with everything while their death animation plays out.
    pub fn is_dead_enemy(&self) -> bool {
        matches!(
            &self.payload,
            Payload::Enemy(EnemyData {
                state: EnemyState::Dead,
                ..
            })
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::TextureId;

    #[test]
    fn facing_sign_and_flip() {
        assert_eq!(Facing::Right.sign(), 1.0);
        assert_eq!(Facing::Left.sign(), -1.0);
        assert_eq!(Facing::Right.flipped(), Facing::Left);
        assert_eq!(Facing::Left.flipped(), Facing::Right);
    }

    #[test]
    fn facing_from_dx_ties_left() {
        assert_eq!(Facing::from_dx(3.0), Facing::Right);
        assert_eq!(Facing::from_dx(-3.0), Facing::Left);
        assert_eq!(Facing::from_dx(0.0), Facing::Left);
    }

    #[test]
    fn new_entity_defaults() {
        let entity = Entity::new(Payload::Level);
        assert_eq!(entity.position, Vec2::ZERO);
        assert_eq!(entity.velocity, Vec2::ZERO);
        assert!(!entity.dynamic);
        assert!(!entity.grounded);
        assert!(entity.current_animation.is_none());
        assert!(entity.sheet.is_none());
        assert!(entity.payload.is_level());
    }

    #[test]
    fn payload_accessors_match_tags() {
        let mut player = Entity::new(Payload::Player(PlayerData::new(100)));
        assert!(player.as_player().is_some());
        assert!(player.as_enemy().is_none());
        assert!(player.as_bullet().is_none());
        assert!(player.as_player_mut().is_some());

        let enemy = Entity::new(Payload::Enemy(EnemyData::new(30)));
        assert!(enemy.as_enemy().is_some());
        assert!(!enemy.is_dead_enemy());
    }

    #[test]
    fn dead_enemy_detection() {
        let mut enemy = Entity::new(Payload::Enemy(EnemyData::new(30)));
        enemy.as_enemy_mut().unwrap().state = EnemyState::Dead;
        assert!(enemy.is_dead_enemy());

        let player = Entity::new(Payload::Player(PlayerData::new(100)));
        assert!(!player.is_dead_enemy());
    }

    #[test]
    fn collider_rect_is_world_space() {
        let mut entity = Entity::new(Payload::Level);
        entity.position = Vec2::new(100.0, 50.0);
        entity.collider = Rect::new(11.0, 6.0, 10.0, 26.0);
        assert_eq!(entity.collider_rect(), Rect::new(111.0, 56.0, 10.0, 26.0));
    }

    #[test]
    fn current_frame_prefers_active_animation() {
        let mut entity = Entity::new(Payload::Level);
        entity.sheet = Some(SpriteSheet {
            texture: TextureId(0),
            frame_w: 32.0,
            frame_h: 32.0,
        });
        entity.sprite_frame = 7;
        assert_eq!(entity.current_frame(), 7);

        entity.animations = vec![Animation::new(4, 1.0).unwrap()];
        entity.current_animation = Some(0);
        entity.advance_animation(0.5).unwrap();
        assert_eq!(entity.current_frame(), 2);
    }

    #[test]
    fn out_of_range_animation_index_falls_back_to_static_frame() {
        let mut entity = Entity::new(Payload::Level);
        entity.sprite_frame = 3;
        entity.current_animation = Some(9);
        assert_eq!(entity.current_frame(), 3);
        // Advancing must not panic either.
        entity.advance_animation(0.1).unwrap();
    }

    #[test]
    fn fresh_player_data() {
        let data = PlayerData::new(100);
        assert_eq!(data.state, PlayerState::Idle);
        assert_eq!(data.hit_points, 100);
        assert_eq!(data.damage_cooldown, 0.0);
        assert_eq!(data.weapon_timer.length(), WEAPON_COOLDOWN_SECS);
    }

    #[test]
    fn fresh_enemy_data() {
        let data = EnemyData::new(30);
        assert_eq!(data.state, EnemyState::Shambling);
        assert_eq!(data.hit_points, 30);
        assert_eq!(data.recover_timer.length(), ENEMY_RECOVER_SECS);
    }
}
