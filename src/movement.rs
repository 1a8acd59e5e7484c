/// Input-driven player movement, power-up and health bookkeeping, and enemy
/// patrols.
///
/// These operate through short-lived mutable handles so the variant state
/// and the shared body can be borrowed together.

use glam::Vec2;

use crate::entities::{Body, Contacts, Entity, EntityKind, Intent, MoveSpeed, Patrol, PlayerState, SpriteKey};
use crate::physics::DEFAULT_JUMP_FORCE;

// ── Player ────────────────────────────────────────────────────────────────────

pub struct PlayerMut<'a> {
    body: &'a mut Body,
    contacts: &'a Contacts,
    state: &'a mut PlayerState,
}

impl Entity {
    pub fn as_player_mut(&mut self) -> Option<PlayerMut<'_>> {
        match &mut self.kind {
            EntityKind::Player(state) => Some(PlayerMut {
                body: &mut self.body,
                contacts: &self.contacts,
                state,
            }),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<EnemyMut<'_>> {
        match &mut self.kind {
            EntityKind::GroundEnemy { patrol, y_velocity } => Some(EnemyMut {
                body: &mut self.body,
                patrol,
                y_velocity: Some(y_velocity),
            }),
            EntityKind::FlyingEnemy { patrol } => Some(EnemyMut {
                body: &mut self.body,
                patrol,
                y_velocity: None,
            }),
            _ => None,
        }
    }
}

impl PlayerMut<'_> {
    pub fn state(&self) -> &PlayerState {
        self.state
    }

    /// Apply one frame of input.  A wall blocks movement toward it, not away
    /// from it; jumping needs at least one floor contact.
    pub fn update_movement(&mut self, delta: f32, intent: Intent) {
        let speed = self.state.move_speed().units();

        if intent.left && self.contacts.left_wall() < 1 {
            self.body.translate(Vec2::new(-speed * delta, 0.0));
        }
        if intent.right && self.contacts.right_wall() < 1 {
            self.body.translate(Vec2::new(speed * delta, 0.0));
        }
        if intent.up && self.contacts.floor() >= 1 {
            self.state.y_velocity = self.state.jump_force();
        }

        self.state.set_down_pressed(intent.down);
    }

    /// One power-up tick.  Speed returns to normal once the timer runs out.
    pub fn update_powerups(&mut self) {
        if self.state.powerup_duration() > 0 {
            self.state.tick_powerup();
        }
        if self.state.powerup_duration() == 0 {
            self.state.set_move_speed(MoveSpeed::Normal);
        }
    }

    pub fn apply_speed_boost(&mut self, duration: u32) {
        self.state.set_move_speed(MoveSpeed::Boosted);
        self.state.set_powerup_duration(duration);
    }

    pub fn boost_move_speed(&mut self) {
        self.state.set_move_speed(MoveSpeed::Boosted);
    }

    pub fn normal_move_speed(&mut self) {
        self.state.set_move_speed(MoveSpeed::Normal);
    }

    pub fn slow_move_speed(&mut self) {
        self.state.set_move_speed(MoveSpeed::Slowed);
    }

    pub fn loose_heart(&mut self) {
        let health = self.state.health().saturating_sub(1);
        self.set_health(health);
    }

    pub fn add_health(&mut self, amount: u32) {
        let health = self.state.health().saturating_add(amount);
        self.set_health(health);
    }

    /// Clamped to `[0, MAX_HEALTH]`.
    pub fn set_health(&mut self, health: u32) {
        self.state.set_health(health);
        self.body.set_sprite(SpriteKey::for_health(self.state.health()));
    }

    pub fn set_jump_force(&mut self, force: f32) {
        self.state.set_jump_force(force);
    }

    pub fn reset_jump_force(&mut self) {
        self.state.set_jump_force(DEFAULT_JUMP_FORCE);
    }

    /// Consume a pending forced bounce by jumping with the current jump
    /// force.  Returns whether a bounce happened.
    pub fn launch(&mut self) -> bool {
        if !self.state.force_bounce() {
            return false;
        }
        self.state.y_velocity = self.state.jump_force();
        self.state.set_force_bounce(false);
        true
    }

    /// Drop vertical motion and any pending bounce.
    pub fn halt(&mut self) {
        self.state.y_velocity = 0.0;
        self.state.set_force_bounce(false);
        self.reset_jump_force();
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

pub struct EnemyMut<'a> {
    body: &'a mut Body,
    patrol: &'a mut Patrol,
    y_velocity: Option<&'a mut f32>,
}

impl EnemyMut<'_> {
    pub fn patrol(&self) -> &Patrol {
        self.patrol
    }

    /// Patrol step: turn around after `travel_distance` from the start in
    /// the current direction, then advance.
    pub fn update_movement(&mut self, delta: f32) {
        let offset = self.body.position().x - self.body.initial_position().x;
        let speed = self.patrol.move_speed();
        let travel = self.patrol.travel_distance();

        if (speed < 0.0 && -offset >= travel) || (speed > 0.0 && offset >= travel) {
            self.patrol.change_direction();
        }

        self.body
            .translate(Vec2::new(self.patrol.move_speed() * delta, 0.0));
    }

    pub fn change_direction(&mut self) {
        self.patrol.change_direction();
    }

    pub fn reset_move_speed(&mut self) {
        self.patrol.reset_move_speed();
    }

    pub fn revive(&mut self) {
        self.patrol.set_defeated(false);
    }

    pub fn halt(&mut self) {
        if let Some(vy) = self.y_velocity.as_deref_mut() {
            *vy = 0.0;
        }
    }
}
