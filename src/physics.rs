/// Vertical physics for the player and ground enemies.
///
/// A jump is a strong upward impulse that decays at `RISE_DECAY`; once the
/// velocity is no longer negative it is forced to zero.  Falling comes only
/// from gravity, applied while the entity has no floor contact.

use glam::Vec2;

use crate::entities::{Body, Entity, EntityKind, SpriteKey};

/// Fall speed while unsupported, in world units per second.
pub const GRAVITY: f32 = 9.8 * 50.0;

/// Decay of upward velocity, world units per second squared.  Equivalent to
/// 98 units per frame at 60 frames per second.
pub const RISE_DECAY: f32 = 98.0 * 60.0;

pub const DEFAULT_JUMP_FORCE: f32 = -1950.0;

/// Longest time step integrated at once.  One step of gravity (9.8 units)
/// must stay inside `CONTACT_TOLERANCE`, or a landing reads as unclassified
/// and the body sinks through the floor.
pub const MAX_STEP: f32 = 0.02;

/// Advance one body with vertical velocity by `delta` seconds.
pub fn integrate_vertical(body: &mut Body, y_velocity: &mut f32, supported: bool, delta: f32) {
    body.translate(Vec2::new(0.0, *y_velocity * delta));

    if *y_velocity < 0.0 {
        *y_velocity += RISE_DECAY * delta;
    } else {
        *y_velocity = 0.0;
    }

    if !supported {
        fall(body, delta);
    }
}

/// Move a body down by one step of gravity.
pub fn fall(body: &mut Body, delta: f32) {
    body.translate(Vec2::new(0.0, GRAVITY * delta));
}

impl Entity {
    /// Per-frame update.  Floor contacts from the previous collision pass
    /// decide whether gravity applies.
    pub fn update(&mut self, delta: f32) {
        let supported = self.contacts.floor() >= 1;

        match &mut self.kind {
            EntityKind::Player(state) => {
                integrate_vertical(&mut self.body, &mut state.y_velocity, supported, delta);
                self.body.set_sprite(SpriteKey::for_health(state.health()));
            }
            EntityKind::GroundEnemy { y_velocity, .. } => {
                integrate_vertical(&mut self.body, y_velocity, supported, delta);
            }
            _ => {}
        }

        self.body.sync_visual();
    }

    pub fn apply_gravity(&mut self, delta: f32) {
        fall(&mut self.body, delta);
    }
}
