/// All simulation entity types: data, construction and accessors.
///
/// An entity is one concrete record (`Body` + `Contacts`) plus a closed set
/// of behaviour variants in `EntityKind`.  Behaviour lives elsewhere:
/// `physics` (per-frame update), `movement` (input and patrol), `collision`
/// (contact response).

use std::fmt;
use std::str::FromStr;

use glam::Vec2;

use crate::collision::Rect;
use crate::error::EntityError;
use crate::physics::DEFAULT_JUMP_FORCE;

/// Upper bound of player health.
pub const MAX_HEALTH: u32 = 3;

/// Defaults used by `Entity::spawn` for variants that carry parameters.
pub const DEFAULT_BOOST_DURATION: u32 = 300;
pub const DEFAULT_BOUNCE: f32 = 2500.0;
pub const DEFAULT_ENEMY_SPEED: f32 = 50.0;
pub const DEFAULT_TRAVEL_DISTANCE: f32 = 100.0;

// ── Category ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Platform,
    Player,
    GroundEnemy,
    FlyingEnemy,
    HealthPickup,
    SpeedPickup,
    JumpPad,
    EndGoal,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Platform,
        Category::Player,
        Category::GroundEnemy,
        Category::FlyingEnemy,
        Category::HealthPickup,
        Category::SpeedPickup,
        Category::JumpPad,
        Category::EndGoal,
    ];

    /// Tag used by level data.
    pub fn tag(self) -> &'static str {
        match self {
            Category::Platform => "Platform",
            Category::Player => "Player",
            Category::GroundEnemy => "Ground Enemy",
            Category::FlyingEnemy => "Flying Enemy",
            Category::HealthPickup => "Health Pickup",
            Category::SpeedPickup => "Speed Pickup",
            Category::JumpPad => "Jump Pad",
            Category::EndGoal => "End Goal",
        }
    }

    pub fn is_enemy(self) -> bool {
        matches!(self, Category::GroundEnemy | Category::FlyingEnemy)
    }

    /// Actors move on their own and take part in collision resolution.
    pub fn is_actor(self) -> bool {
        self == Category::Player || self.is_enemy()
    }

    pub fn is_pickup(self) -> bool {
        matches!(self, Category::HealthPickup | Category::SpeedPickup)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Category {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.tag() == s.trim())
            .ok_or_else(|| EntityError::UnknownCategory(s.to_string()))
    }
}

// ── Visual state ──────────────────────────────────────────────────────────────

/// Content key handed to whatever loads and draws sprites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteKey {
    Platform,
    HealthPickup,
    SpeedPickup,
    JumpPad,
    EndGoal,
    PlayerFullHealth,
    PlayerMidHealth,
    PlayerLowHealth,
    GroundEnemy,
    InvincibleGroundEnemy,
    FlyingEnemy,
    InvincibleFlyingEnemy,
}

impl SpriteKey {
    pub fn asset_name(self) -> &'static str {
        match self {
            SpriteKey::Platform => "platform.png",
            SpriteKey::HealthPickup => "health_pickup.png",
            SpriteKey::SpeedPickup => "speed_pickup.png",
            SpriteKey::JumpPad => "jump_pad.png",
            SpriteKey::EndGoal => "end_goal.png",
            SpriteKey::PlayerFullHealth => "full_health_player.png",
            SpriteKey::PlayerMidHealth => "mid_health_player.png",
            SpriteKey::PlayerLowHealth => "low_health_player.png",
            SpriteKey::GroundEnemy => "ground_enemy.png",
            SpriteKey::InvincibleGroundEnemy => "invincible_ground_enemy.png",
            SpriteKey::FlyingEnemy => "flying_enemy.png",
            SpriteKey::InvincibleFlyingEnemy => "invincible_flying_enemy.png",
        }
    }

    /// Player sprite for a given health value.
    pub fn for_health(health: u32) -> SpriteKey {
        match health {
            0 | 1 => SpriteKey::PlayerLowHealth,
            2 => SpriteKey::PlayerMidHealth,
            _ => SpriteKey::PlayerFullHealth,
        }
    }
}

/// Where and what to draw.  Opaque to the simulation; only kept in sync.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visual {
    pub position: Vec2,
    pub key: SpriteKey,
}

// ── Common record ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    initial_position: Vec2,
    position: Vec2,
    size: Vec2,
    visual: Visual,
}

impl Body {
    pub fn new(position: Vec2, size: Vec2, key: SpriteKey) -> Result<Self, EntityError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(size.x) || !valid(size.y) {
            return Err(EntityError::InvalidSize {
                width: size.x,
                height: size.y,
            });
        }
        if !position.is_finite() {
            return Err(EntityError::InvalidParameter("position must be finite"));
        }
        Ok(Self {
            initial_position: position,
            position,
            size,
            visual: Visual { position, key },
        })
    }

    pub fn initial_position(&self) -> Vec2 {
        self.initial_position
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn visual(&self) -> Visual {
        self.visual
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position, self.size)
    }

    pub(crate) fn translate(&mut self, by: Vec2) {
        self.position += by;
    }

    pub(crate) fn reset_position(&mut self) {
        self.position = self.initial_position;
    }

    pub(crate) fn sync_visual(&mut self) {
        self.visual.position = self.position;
    }

    pub(crate) fn set_sprite(&mut self, key: SpriteKey) {
        self.visual.key = key;
    }
}

/// Per-direction count of obstacles touched this frame.
///
/// Named from the entity's own point of view: `right_wall` counts walls
/// pressing on its right side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contacts {
    floor: u32,
    ceiling: u32,
    left_wall: u32,
    right_wall: u32,
}

impl Contacts {
    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    pub fn left_wall(&self) -> u32 {
        self.left_wall
    }

    pub fn right_wall(&self) -> u32 {
        self.right_wall
    }

    pub fn is_clear(&self) -> bool {
        *self == Contacts::default()
    }

    pub(crate) fn touch_floor(&mut self) {
        self.floor = self.floor.saturating_add(1);
    }

    pub(crate) fn touch_left_wall(&mut self) {
        self.left_wall = self.left_wall.saturating_add(1);
    }

    pub(crate) fn touch_right_wall(&mut self) {
        self.right_wall = self.right_wall.saturating_add(1);
    }

    pub(crate) fn reset(&mut self) {
        *self = Contacts::default();
    }
}

// ── Variant state ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveSpeed {
    Slowed,
    Normal,
    Boosted,
}

impl MoveSpeed {
    /// Horizontal speed in world units per second.
    pub fn units(self) -> f32 {
        match self {
            MoveSpeed::Slowed => 150.0,
            MoveSpeed::Normal => 300.0,
            MoveSpeed::Boosted => 600.0,
        }
    }
}

/// Directional input for one frame, produced by whatever polls the keyboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    health: u32,
    move_speed: MoveSpeed,
    pub(crate) y_velocity: f32,
    jump_force: f32,
    down_pressed: bool,
    force_bounce: bool,
    powerup_duration: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            health: MAX_HEALTH,
            move_speed: MoveSpeed::Normal,
            y_velocity: 0.0,
            jump_force: DEFAULT_JUMP_FORCE,
            down_pressed: false,
            force_bounce: false,
            powerup_duration: 0,
        }
    }
}

impl PlayerState {
    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn move_speed(&self) -> MoveSpeed {
        self.move_speed
    }

    pub fn y_velocity(&self) -> f32 {
        self.y_velocity
    }

    pub fn jump_force(&self) -> f32 {
        self.jump_force
    }

    pub fn down_pressed(&self) -> bool {
        self.down_pressed
    }

    pub fn force_bounce(&self) -> bool {
        self.force_bounce
    }

    pub fn powerup_duration(&self) -> u32 {
        self.powerup_duration
    }

    pub(crate) fn set_health(&mut self, health: u32) {
        self.health = health.min(MAX_HEALTH);
    }

    pub(crate) fn set_move_speed(&mut self, speed: MoveSpeed) {
        self.move_speed = speed;
    }

    pub(crate) fn set_jump_force(&mut self, force: f32) {
        self.jump_force = force;
    }

    pub(crate) fn set_down_pressed(&mut self, pressed: bool) {
        self.down_pressed = pressed;
    }

    pub(crate) fn set_force_bounce(&mut self, bounce: bool) {
        self.force_bounce = bounce;
    }

    /// Zero is rejected, so pickups can never end a running boost early.
    pub(crate) fn set_powerup_duration(&mut self, duration: u32) {
        if duration > 0 {
            self.powerup_duration = duration;
        }
    }

    pub(crate) fn tick_powerup(&mut self) {
        self.powerup_duration = self.powerup_duration.saturating_sub(1);
    }
}

/// Horizontal patrol shared by both enemy kinds.
#[derive(Clone, Debug, PartialEq)]
pub struct Patrol {
    move_speed: f32,
    initial_move_speed: f32,
    travel_distance: f32,
    invincible: bool,
    defeated: bool,
}

impl Patrol {
    pub fn new(move_speed: f32, travel_distance: f32, invincible: bool) -> Result<Self, EntityError> {
        if !move_speed.is_finite() {
            return Err(EntityError::InvalidParameter("enemy move speed must be finite"));
        }
        if !travel_distance.is_finite() || travel_distance < 0.0 {
            return Err(EntityError::InvalidParameter(
                "enemy travel distance must be non-negative",
            ));
        }
        Ok(Self {
            move_speed,
            initial_move_speed: move_speed,
            travel_distance,
            invincible,
            defeated: false,
        })
    }

    /// Signed speed; the sign is the current direction.
    pub fn move_speed(&self) -> f32 {
        self.move_speed
    }

    pub fn initial_move_speed(&self) -> f32 {
        self.initial_move_speed
    }

    pub fn travel_distance(&self) -> f32 {
        self.travel_distance
    }

    pub fn invincible(&self) -> bool {
        self.invincible
    }

    /// Knocked off-stage by a stomp; cleared when the level resets.
    pub fn defeated(&self) -> bool {
        self.defeated
    }

    pub(crate) fn set_defeated(&mut self, defeated: bool) {
        self.defeated = defeated;
    }

    pub(crate) fn change_direction(&mut self) {
        self.move_speed = -self.move_speed;
    }

    pub(crate) fn reset_move_speed(&mut self) {
        self.move_speed = self.initial_move_speed;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Platform,
    HealthPickup,
    SpeedPickup { duration: u32 },
    JumpPad { bounce: f32 },
    EndGoal { level: u32 },
    Player(PlayerState),
    GroundEnemy { patrol: Patrol, y_velocity: f32 },
    FlyingEnemy { patrol: Patrol },
}

// ── Entity ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub(crate) body: Body,
    pub(crate) contacts: Contacts,
    pub(crate) kind: EntityKind,
}

impl Entity {
    fn build(position: Vec2, size: Vec2, key: SpriteKey, kind: EntityKind) -> Result<Self, EntityError> {
        Ok(Self {
            body: Body::new(position, size, key)?,
            contacts: Contacts::default(),
            kind,
        })
    }

    pub fn platform(position: Vec2, size: Vec2) -> Result<Self, EntityError> {
        Self::build(position, size, SpriteKey::Platform, EntityKind::Platform)
    }

    pub fn health_pickup(position: Vec2, size: Vec2) -> Result<Self, EntityError> {
        Self::build(position, size, SpriteKey::HealthPickup, EntityKind::HealthPickup)
    }

    pub fn speed_pickup(position: Vec2, size: Vec2, duration: u32) -> Result<Self, EntityError> {
        if duration == 0 {
            return Err(EntityError::InvalidParameter("speed pickup duration must be positive"));
        }
        Self::build(
            position,
            size,
            SpriteKey::SpeedPickup,
            EntityKind::SpeedPickup { duration },
        )
    }

    pub fn jump_pad(position: Vec2, size: Vec2, bounce: f32) -> Result<Self, EntityError> {
        if !bounce.is_finite() || bounce <= 0.0 {
            return Err(EntityError::InvalidParameter("jump pad bounce must be positive"));
        }
        Self::build(position, size, SpriteKey::JumpPad, EntityKind::JumpPad { bounce })
    }

    pub fn end_goal(position: Vec2, size: Vec2, level: u32) -> Result<Self, EntityError> {
        Self::build(position, size, SpriteKey::EndGoal, EntityKind::EndGoal { level })
    }

    pub fn player(position: Vec2, size: Vec2) -> Result<Self, EntityError> {
        Self::build(
            position,
            size,
            SpriteKey::PlayerFullHealth,
            EntityKind::Player(PlayerState::default()),
        )
    }

    pub fn ground_enemy(
        position: Vec2,
        size: Vec2,
        move_speed: f32,
        travel_distance: f32,
        invincible: bool,
    ) -> Result<Self, EntityError> {
        let key = if invincible {
            SpriteKey::InvincibleGroundEnemy
        } else {
            SpriteKey::GroundEnemy
        };
        let patrol = Patrol::new(move_speed, travel_distance, invincible)?;
        Self::build(
            position,
            size,
            key,
            EntityKind::GroundEnemy {
                patrol,
                y_velocity: 0.0,
            },
        )
    }

    pub fn flying_enemy(
        position: Vec2,
        size: Vec2,
        move_speed: f32,
        travel_distance: f32,
        invincible: bool,
    ) -> Result<Self, EntityError> {
        let key = if invincible {
            SpriteKey::InvincibleFlyingEnemy
        } else {
            SpriteKey::FlyingEnemy
        };
        let patrol = Patrol::new(move_speed, travel_distance, invincible)?;
        Self::build(position, size, key, EntityKind::FlyingEnemy { patrol })
    }

    /// Build any category with default variant parameters.
    pub fn spawn(category: Category, position: Vec2, size: Vec2) -> Result<Self, EntityError> {
        match category {
            Category::Platform => Self::platform(position, size),
            Category::Player => Self::player(position, size),
            Category::GroundEnemy => Self::ground_enemy(
                position,
                size,
                DEFAULT_ENEMY_SPEED,
                DEFAULT_TRAVEL_DISTANCE,
                false,
            ),
            Category::FlyingEnemy => Self::flying_enemy(
                position,
                size,
                DEFAULT_ENEMY_SPEED,
                DEFAULT_TRAVEL_DISTANCE,
                false,
            ),
            Category::HealthPickup => Self::health_pickup(position, size),
            Category::SpeedPickup => Self::speed_pickup(position, size, DEFAULT_BOOST_DURATION),
            Category::JumpPad => Self::jump_pad(position, size, DEFAULT_BOUNCE),
            Category::EndGoal => Self::end_goal(position, size, 1),
        }
    }

    /// Like `spawn`, from a level data tag such as `"Ground Enemy"`.
    pub fn spawn_tagged(tag: &str, position: Vec2, size: Vec2) -> Result<Self, EntityError> {
        Self::spawn(tag.parse()?, position, size)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn category(&self) -> Category {
        match self.kind {
            EntityKind::Platform => Category::Platform,
            EntityKind::HealthPickup => Category::HealthPickup,
            EntityKind::SpeedPickup { .. } => Category::SpeedPickup,
            EntityKind::JumpPad { .. } => Category::JumpPad,
            EntityKind::EndGoal { .. } => Category::EndGoal,
            EntityKind::Player(_) => Category::Player,
            EntityKind::GroundEnemy { .. } => Category::GroundEnemy,
            EntityKind::FlyingEnemy { .. } => Category::FlyingEnemy,
        }
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    pub fn initial_position(&self) -> Vec2 {
        self.body.initial_position()
    }

    pub fn size(&self) -> Vec2 {
        self.body.size()
    }

    pub fn visual(&self) -> Visual {
        self.body.visual()
    }

    pub fn contacts(&self) -> &Contacts {
        &self.contacts
    }

    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.kind {
            EntityKind::Player(state) => Some(state),
            _ => None,
        }
    }

    pub fn patrol(&self) -> Option<&Patrol> {
        match &self.kind {
            EntityKind::GroundEnemy { patrol, .. } | EntityKind::FlyingEnemy { patrol } => Some(patrol),
            _ => None,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.patrol().is_some_and(Patrol::defeated)
    }

    /// Vertical velocity of entities that have one (player, ground enemy).
    pub fn y_velocity(&self) -> Option<f32> {
        match &self.kind {
            EntityKind::Player(state) => Some(state.y_velocity),
            EntityKind::GroundEnemy { y_velocity, .. } => Some(*y_velocity),
            _ => None,
        }
    }

    pub fn bounce(&self) -> Option<f32> {
        match self.kind {
            EntityKind::JumpPad { bounce } => Some(bounce),
            _ => None,
        }
    }

    pub fn boost_duration(&self) -> Option<u32> {
        match self.kind {
            EntityKind::SpeedPickup { duration } => Some(duration),
            _ => None,
        }
    }

    pub fn level_to_load(&self) -> Option<u32> {
        match self.kind {
            EntityKind::EndGoal { level } => Some(level),
            _ => None,
        }
    }

    // ── Shared mutators ──────────────────────────────────────────────────────

    pub fn reset_position(&mut self) {
        self.body.reset_position();
    }

    pub fn reset_collision_counts(&mut self) {
        self.contacts.reset();
    }
}
