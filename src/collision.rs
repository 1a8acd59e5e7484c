/// Contact-based collision resolution.
///
/// Overlaps are found with axis-aligned rectangles.  Each side of an
/// overlapping pair reacts to a value snapshot of the other, so resolution
/// order never exposes half-updated state.  Which contact an overlap counts
/// as (wall, floor, ceiling) is decided by `classify` in a fixed priority.

use glam::Vec2;
use log::debug;

use crate::entities::{Body, Category, Contacts, Entity, EntityKind, Patrol, PlayerState, DEFAULT_BOUNCE};
use crate::physics::DEFAULT_JUMP_FORCE;

/// How far (world units) an overlap may reach into the other rectangle and
/// still count as landing on it rather than hitting its side.
pub const CONTACT_TOLERANCE: f32 = 10.0;

/// Defeated enemies are moved this far away instead of being removed.
pub const KNOCK_OFF: Vec2 = Vec2::new(2000.0, 1000.0);

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle, `position` is the top-left corner (y grows down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub position: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.y
    }

    /// Strict overlap: rectangles that only share an edge do not touch.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// Which side of `own` an overlap with another rectangle is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Contact {
    WallOnRight,
    WallOnLeft,
    Floor,
    Ceiling,
    Unclassified,
}

pub fn classify(own: &Rect, other: &Rect) -> Contact {
    // Low enough that the other rectangle is beside us, not underfoot.
    let beside = own.top() > other.top() - (own.size.y - CONTACT_TOLERANCE);

    if own.left() < other.left() && beside {
        Contact::WallOnRight
    } else if own.right() > other.right() && beside {
        Contact::WallOnLeft
    } else if own.bottom() < other.top() + CONTACT_TOLERANCE {
        Contact::Floor
    } else if own.top() > other.top() {
        Contact::Ceiling
    } else {
        Contact::Unclassified
    }
}

// ── Snapshots and signals ─────────────────────────────────────────────────────

/// What one side of a collision gets to know about the other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    pub category: Category,
    pub rect: Rect,
    /// Jump pads only.
    pub bounce: Option<f32>,
}

impl Snapshot {
    pub fn new(category: Category, position: Vec2, size: Vec2) -> Self {
        Self {
            category,
            rect: Rect::new(position, size),
            bounce: None,
        }
    }

    pub fn with_bounce(mut self, bounce: f32) -> Self {
        self.bounce = Some(bounce);
        self
    }
}

/// Outcome of one collision callback, read by the level stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Signal {
    /// Nothing for the stage to do.
    None,
    /// The player should take damage.
    Damage,
    /// The reporting entity is resting against the other.
    Support,
    /// Landed on a jump pad with this bounce magnitude.
    Bounce(f32),
}

// ── Per-variant response ──────────────────────────────────────────────────────

impl Entity {
    pub fn snapshot(&self) -> Snapshot {
        let snapshot = Snapshot::new(self.category(), self.position(), self.size());
        match self.bounce() {
            Some(bounce) => snapshot.with_bounce(bounce),
            None => snapshot,
        }
    }

    /// React to an overlap with `other`.  Only this entity's own state
    /// changes; effects on others are expressed through the signal.
    pub fn on_collision(&mut self, other: &Snapshot) -> Signal {
        let own = self.body.rect();

        match &mut self.kind {
            EntityKind::Player(state) => player_contact(state, &mut self.contacts, &own, other),
            EntityKind::GroundEnemy { patrol, y_velocity } => ground_enemy_contact(
                &mut self.body,
                &mut self.contacts,
                patrol,
                y_velocity,
                other,
            ),
            EntityKind::FlyingEnemy { patrol } => {
                flying_enemy_contact(&mut self.body, &mut self.contacts, patrol, other)
            }
            _ => Signal::None,
        }
    }
}

fn player_contact(state: &mut PlayerState, contacts: &mut Contacts, own: &Rect, other: &Snapshot) -> Signal {
    match other.category {
        Category::Platform | Category::JumpPad => match classify(own, &other.rect) {
            Contact::WallOnRight => {
                contacts.touch_right_wall();
                Signal::Support
            }
            Contact::WallOnLeft => {
                contacts.touch_left_wall();
                Signal::Support
            }
            Contact::Floor => {
                contacts.touch_floor();
                if other.category == Category::JumpPad {
                    state.set_force_bounce(true);
                    return Signal::Bounce(other.bounce.unwrap_or(DEFAULT_BOUNCE));
                }
                state.set_jump_force(DEFAULT_JUMP_FORCE);
                Signal::Support
            }
            Contact::Ceiling => {
                state.y_velocity = 0.0;
                Signal::Support
            }
            Contact::Unclassified => Signal::Support,
        },
        Category::GroundEnemy | Category::FlyingEnemy => match classify(own, &other.rect) {
            Contact::Floor => {
                // Landed on top: the enemy side decides whether it was a stomp.
                state.set_jump_force(DEFAULT_JUMP_FORCE);
                contacts.touch_floor();
                state.set_force_bounce(true);
                Signal::Support
            }
            _ => Signal::None,
        },
        _ => Signal::None,
    }
}

/// The player landed on the enemy: the player's side of the pair sees a
/// floor contact.
fn stomped_by(player: &Rect, enemy: &Rect) -> bool {
    classify(player, enemy) == Contact::Floor
}

fn knock_off(body: &mut Body, patrol: &mut Patrol) {
    body.translate(KNOCK_OFF);
    patrol.set_defeated(true);
}

/// Wall contacts for an enemy: count them and turn around.
fn bounce_off_walls(contacts: &mut Contacts, patrol: &mut Patrol, contact: Contact) {
    match contact {
        Contact::WallOnRight => {
            contacts.touch_right_wall();
            patrol.change_direction();
        }
        Contact::WallOnLeft => {
            contacts.touch_left_wall();
            patrol.change_direction();
        }
        _ => {}
    }
}

fn ground_enemy_contact(
    body: &mut Body,
    contacts: &mut Contacts,
    patrol: &mut Patrol,
    y_velocity: &mut f32,
    other: &Snapshot,
) -> Signal {
    let own = body.rect();

    match other.category {
        Category::Platform | Category::JumpPad | Category::HealthPickup | Category::SpeedPickup => {
            match classify(&own, &other.rect) {
                Contact::Floor => contacts.touch_floor(),
                Contact::Ceiling => *y_velocity = 0.0,
                contact => bounce_off_walls(contacts, patrol, contact),
            }
            Signal::None
        }
        Category::Player => {
            if stomped_by(&other.rect, &own) {
                if patrol.invincible() {
                    return Signal::Damage;
                }
                knock_off(body, patrol);
                Signal::None
            } else {
                body.reset_position();
                Signal::Damage
            }
        }
        _ => Signal::None,
    }
}

fn flying_enemy_contact(body: &mut Body, contacts: &mut Contacts, patrol: &mut Patrol, other: &Snapshot) -> Signal {
    match other.category {
        Category::Platform | Category::JumpPad | Category::HealthPickup => {
            bounce_off_walls(contacts, patrol, classify(&body.rect(), &other.rect));
            Signal::None
        }
        Category::Player => {
            if patrol.invincible() {
                Signal::Damage
            } else if stomped_by(&other.rect, &body.rect()) {
                knock_off(body, patrol);
                Signal::None
            } else {
                Signal::Damage
            }
        }
        _ => Signal::None,
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

/// One overlapping pair and what each side signalled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent {
    pub first: usize,
    pub second: usize,
    pub first_signal: Signal,
    pub second_signal: Signal,
}

impl CollisionEvent {
    /// `(own signal, other index, other signal)` if `index` took part.
    pub fn involving(&self, index: usize) -> Option<(Signal, usize, Signal)> {
        if self.first == index {
            Some((self.first_signal, self.second, self.second_signal))
        } else if self.second == index {
            Some((self.second_signal, self.first, self.first_signal))
        } else {
            None
        }
    }
}

/// Zero every contact counter.  Call once per frame before `resolve`.
pub fn reset_contacts(entities: &mut [Entity]) {
    for entity in entities.iter_mut() {
        entity.reset_collision_counts();
    }
}

/// Test every pair that involves at least one actor and dispatch
/// `on_collision` to both members of each overlapping pair.
pub fn resolve(entities: &mut [Entity]) -> Vec<CollisionEvent> {
    let snapshots: Vec<Snapshot> = entities.iter().map(Entity::snapshot).collect();
    let mut events = Vec::new();

    for (i, a) in snapshots.iter().enumerate() {
        for (j, b) in snapshots.iter().enumerate().skip(i + 1) {
            if !(a.category.is_actor() || b.category.is_actor()) {
                continue;
            }
            if !a.rect.overlaps(&b.rect) {
                continue;
            }

            let first_signal = entities[i].on_collision(b);
            let second_signal = entities[j].on_collision(a);
            debug!(
                "collision {} #{} -> {:?}, {} #{} -> {:?}",
                a.category, i, first_signal, b.category, j, second_signal
            );

            events.push(CollisionEvent {
                first: i,
                second: j,
                first_signal,
                second_signal,
            });
        }
    }

    events
}
