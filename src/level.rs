/// The level stage: owns the entities of the active level, drives the
/// per-frame passes and turns collision signals into level-wide effects
/// (damage, pickups, bounces, resets, level changes).

use glam::{vec2, Vec2};
use log::{error, info, warn};

use crate::collision::{self, CollisionEvent, Signal};
use crate::entities::{Category, Entity, Intent, PlayerState, MAX_HEALTH};
use crate::error::StageError;
use crate::movement::PlayerMut;
use crate::physics::MAX_STEP;

/// A player falling below this depth has left the level.
pub const FALL_LIMIT: f32 = 2000.0;

/// Goal target meaning "last level finished".
pub const FINAL_GOAL: u32 = 0;

// ── Level content ─────────────────────────────────────────────────────────────

/// Supplies the entities of a level.  Level files and their formats live
/// behind this seam.
pub trait LevelSource {
    fn level_count(&self) -> u32;

    /// Build level `level` (1-based).  Must contain exactly one player.
    fn build(&self, level: u32) -> Result<Vec<Entity>, StageError>;
}

/// The levels that ship with the game.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinLevels;

const PLAYER_SIZE: Vec2 = Vec2::new(50.0, 50.0);
const ENEMY_SIZE: Vec2 = Vec2::new(50.0, 50.0);
const PICKUP_SIZE: Vec2 = Vec2::new(30.0, 30.0);
const GOAL_SIZE: Vec2 = Vec2::new(50.0, 100.0);

impl BuiltinLevels {
    fn level_one() -> Result<Vec<Entity>, StageError> {
        Ok(vec![
            Entity::platform(vec2(0.0, 700.0), vec2(1200.0, 100.0))?,
            Entity::platform(vec2(1300.0, 700.0), vec2(900.0, 100.0))?,
            Entity::platform(vec2(550.0, 580.0), vec2(200.0, 40.0))?,
            Entity::platform(vec2(1500.0, 420.0), vec2(300.0, 40.0))?,
            Entity::jump_pad(vec2(1350.0, 700.0), vec2(100.0, 20.0), 2600.0)?,
            Entity::health_pickup(vec2(635.0, 530.0), PICKUP_SIZE)?,
            Entity::ground_enemy(vec2(900.0, 650.0), ENEMY_SIZE, 60.0, 150.0, false)?,
            Entity::end_goal(vec2(1700.0, 320.0), GOAL_SIZE, 2)?,
            Entity::player(vec2(100.0, 640.0), PLAYER_SIZE)?,
        ])
    }

    fn level_two() -> Result<Vec<Entity>, StageError> {
        Ok(vec![
            Entity::platform(vec2(0.0, 700.0), vec2(700.0, 100.0))?,
            Entity::platform(vec2(850.0, 620.0), vec2(250.0, 40.0))?,
            Entity::platform(vec2(1250.0, 700.0), vec2(1000.0, 100.0))?,
            Entity::platform(vec2(1600.0, 560.0), vec2(40.0, 140.0))?,
            Entity::speed_pickup(vec2(300.0, 650.0), PICKUP_SIZE, 240)?,
            Entity::health_pickup(vec2(960.0, 570.0), PICKUP_SIZE)?,
            Entity::flying_enemy(vec2(900.0, 450.0), ENEMY_SIZE, 80.0, 200.0, false)?,
            Entity::ground_enemy(vec2(1400.0, 650.0), ENEMY_SIZE, 70.0, 120.0, false)?,
            Entity::end_goal(vec2(2100.0, 600.0), GOAL_SIZE, 3)?,
            Entity::player(vec2(80.0, 640.0), PLAYER_SIZE)?,
        ])
    }

    fn level_three() -> Result<Vec<Entity>, StageError> {
        Ok(vec![
            Entity::platform(vec2(0.0, 700.0), vec2(2400.0, 100.0))?,
            Entity::platform(vec2(700.0, 480.0), vec2(300.0, 40.0))?,
            Entity::platform(vec2(1300.0, 360.0), vec2(300.0, 40.0))?,
            Entity::jump_pad(vec2(500.0, 700.0), vec2(100.0, 20.0), 2400.0)?,
            Entity::jump_pad(vec2(1100.0, 700.0), vec2(100.0, 20.0), 3000.0)?,
            Entity::health_pickup(vec2(1435.0, 310.0), PICKUP_SIZE)?,
            Entity::ground_enemy(vec2(800.0, 650.0), ENEMY_SIZE, 90.0, 200.0, true)?,
            Entity::flying_enemy(vec2(1400.0, 230.0), ENEMY_SIZE, 120.0, 250.0, true)?,
            Entity::ground_enemy(vec2(1800.0, 650.0), ENEMY_SIZE, 100.0, 150.0, false)?,
            Entity::end_goal(vec2(2250.0, 600.0), GOAL_SIZE, FINAL_GOAL)?,
            Entity::player(vec2(80.0, 640.0), PLAYER_SIZE)?,
        ])
    }
}

impl LevelSource for BuiltinLevels {
    fn level_count(&self) -> u32 {
        3
    }

    fn build(&self, level: u32) -> Result<Vec<Entity>, StageError> {
        match level {
            1 => Self::level_one(),
            2 => Self::level_two(),
            3 => Self::level_three(),
            other => Err(StageError::UnknownLevel(other)),
        }
    }
}

// ── Stage ─────────────────────────────────────────────────────────────────────

/// Level-wide effects of one frame, in the order they happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageEvent {
    Bounced,
    EnemyDefeated,
    Damaged { health: u32 },
    HealthPickedUp,
    SpeedBoosted { duration: u32 },
    LevelReset,
    LevelChanged(u32),
    GameOver,
    Completed,
}

pub struct Stage<S: LevelSource> {
    source: S,
    level: u32,
    entities: Vec<Entity>,
    player: usize,
}

fn locate_player(entities: &[Entity]) -> Option<usize> {
    let mut players = entities
        .iter()
        .enumerate()
        .filter(|(_, e)| e.category() == Category::Player)
        .map(|(i, _)| i);
    match (players.next(), players.next()) {
        (Some(index), None) => Some(index),
        _ => None,
    }
}

impl<S: LevelSource> Stage<S> {
    pub fn new(source: S, level: u32) -> Result<Self, StageError> {
        let entities = source.build(level)?;
        let player = locate_player(&entities).ok_or(StageError::MissingPlayer(level))?;
        info!("Loaded level {} ({} entities)", level, entities.len());
        Ok(Self {
            source,
            level,
            entities,
            player,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_count(&self) -> u32 {
        self.source.level_count()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn player(&self) -> &Entity {
        &self.entities[self.player]
    }

    pub fn player_state(&self) -> Option<&PlayerState> {
        self.player().as_player()
    }

    pub fn player_mut(&mut self) -> Option<PlayerMut<'_>> {
        self.entities[self.player].as_player_mut()
    }

    fn with_player<R>(&mut self, f: impl FnOnce(&mut PlayerMut<'_>) -> R) -> Option<R> {
        let mut player = self.player_mut()?;
        Some(f(&mut player))
    }

    // ── Level lifecycle ──────────────────────────────────────────────────────

    /// Switch to `level`, keeping the player's health.
    pub fn load(&mut self, level: u32) -> Result<(), StageError> {
        let health = self.player_state().map(PlayerState::health);
        self.install(level, health)
    }

    /// Rebuild the current level from scratch with a fresh player.
    pub fn restart(&mut self) -> Result<(), StageError> {
        self.install(self.level, None)
    }

    fn install(&mut self, level: u32, health: Option<u32>) -> Result<(), StageError> {
        let mut entities = self.source.build(level)?;
        let player = locate_player(&entities).ok_or(StageError::MissingPlayer(level))?;

        if let Some(health) = health {
            if let Some(mut handle) = entities[player].as_player_mut() {
                handle.set_health(health);
            }
        }

        info!("Loaded level {} ({} entities)", level, entities.len());
        self.level = level;
        self.entities = entities;
        self.player = player;
        Ok(())
    }

    /// Put every entity back where the level started it.  Consumed pickups
    /// stay consumed and the player keeps its health.
    pub fn reset_level(&mut self) {
        for entity in &mut self.entities {
            entity.reset_position();
            entity.reset_collision_counts();

            match entity.category() {
                Category::Player => {
                    if let Some(mut player) = entity.as_player_mut() {
                        player.halt();
                    }
                }
                Category::GroundEnemy | Category::FlyingEnemy => {
                    if let Some(mut enemy) = entity.as_enemy_mut() {
                        enemy.reset_move_speed();
                        enemy.revive();
                        enemy.halt();
                    }
                }
                _ => {}
            }
        }
        info!("Level {} reset", self.level);
    }

    // ── Frame ────────────────────────────────────────────────────────────────

    /// Run one frame: physics update, movement, collision pass, then the
    /// level-wide reaction to what collided.
    ///
    /// `delta` is capped at `MAX_STEP`.
    pub fn step(&mut self, delta: f32, intent: Intent) -> Vec<StageEvent> {
        let delta = delta.min(MAX_STEP).max(0.0);

        for entity in &mut self.entities {
            entity.update(delta);
        }

        for entity in &mut self.entities {
            match entity.category() {
                Category::Player => {
                    if let Some(mut player) = entity.as_player_mut() {
                        player.update_movement(delta, intent);
                        player.update_powerups();
                    }
                }
                Category::GroundEnemy | Category::FlyingEnemy => {
                    if let Some(mut enemy) = entity.as_enemy_mut() {
                        enemy.update_movement(delta);
                    }
                }
                _ => {}
            }
        }

        collision::reset_contacts(&mut self.entities);
        let collisions = collision::resolve(&mut self.entities);
        self.interpret(&collisions)
    }

    fn interpret(&mut self, collisions: &[CollisionEvent]) -> Vec<StageEvent> {
        let mut events = Vec::new();
        let mut damaged = self.player().position().y > FALL_LIMIT;
        let mut goal = None;
        let mut consumed: Vec<usize> = Vec::new();

        for collision in collisions {
            let Some((own, other, other_signal)) = collision.involving(self.player) else {
                continue;
            };
            let target = &self.entities[other];

            match target.category() {
                Category::JumpPad => {
                    if let Signal::Bounce(magnitude) = own {
                        self.with_player(|p| p.set_jump_force(-magnitude));
                    }
                }
                Category::GroundEnemy | Category::FlyingEnemy => {
                    if other_signal == Signal::Damage {
                        damaged = true;
                    } else {
                        events.push(StageEvent::EnemyDefeated);
                    }
                }
                Category::HealthPickup if !consumed.contains(&other) => {
                    consumed.push(other);
                    self.with_player(|p| p.add_health(1));
                    events.push(StageEvent::HealthPickedUp);
                }
                Category::SpeedPickup if !consumed.contains(&other) => {
                    if let Some(duration) = target.boost_duration() {
                        consumed.push(other);
                        self.with_player(|p| p.apply_speed_boost(duration));
                        events.push(StageEvent::SpeedBoosted { duration });
                    }
                }
                Category::EndGoal => {
                    goal = goal.or(target.level_to_load());
                }
                _ => {}
            }
        }

        self.remove(&consumed);

        if damaged {
            self.take_damage(&mut events);
            return events;
        }

        if let Some(level) = goal {
            self.reach_goal(level, &mut events);
            return events;
        }

        if self.with_player(|p| p.launch()).unwrap_or(false) {
            events.push(StageEvent::Bounced);
        }

        events
    }

    fn remove(&mut self, consumed: &[usize]) {
        if consumed.is_empty() {
            return;
        }
        let shift = consumed.iter().filter(|&&i| i < self.player).count();
        let mut index = 0;
        self.entities.retain(|_| {
            let keep = !consumed.contains(&index);
            index += 1;
            keep
        });
        self.player -= shift;
    }

    fn take_damage(&mut self, events: &mut Vec<StageEvent>) {
        let health = self
            .with_player(|p| {
                p.loose_heart();
                p.state().health()
            })
            .unwrap_or(0);
        info!("Player hit, health {}", health);
        events.push(StageEvent::Damaged { health });

        if health > 0 {
            self.reset_level();
            events.push(StageEvent::LevelReset);
            return;
        }

        events.push(StageEvent::GameOver);
        if let Err(err) = self.restart() {
            error!("Could not restart level {}: {}", self.level, err);
            self.reset_level();
            self.with_player(|p| p.set_health(MAX_HEALTH));
        }
    }

    fn reach_goal(&mut self, level: u32, events: &mut Vec<StageEvent>) {
        if level == FINAL_GOAL {
            info!("Final goal reached");
            events.push(StageEvent::Completed);
            return;
        }
        match self.load(level) {
            Ok(()) => events.push(StageEvent::LevelChanged(level)),
            Err(err) => warn!("Goal points at a level that cannot be loaded: {}", err),
        }
    }
}
