use glam::vec2;
use platformer::collision::Snapshot;
use platformer::entities::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAME: f32 = 1.0 / 60.0;

fn make_player(x: f32, y: f32) -> Entity {
    Entity::player(vec2(x, y), vec2(50.0, 50.0)).unwrap()
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(0x5eed)
}

fn right() -> Intent {
    Intent {
        right: true,
        ..Intent::default()
    }
}

fn left() -> Intent {
    Intent {
        left: true,
        ..Intent::default()
    }
}

fn up() -> Intent {
    Intent {
        up: true,
        ..Intent::default()
    }
}

// ── Player input ──────────────────────────────────────────────────────────────

#[test]
fn free_player_walks_both_ways() {
    let mut player = make_player(100.0, 100.0);
    player.as_player_mut().unwrap().update_movement(0.5, right());
    assert_eq!(player.position().x, 250.0);

    player.as_player_mut().unwrap().update_movement(0.5, left());
    assert_eq!(player.position().x, 100.0);
}

#[test]
fn wall_on_right_blocks_only_rightward_movement() {
    let mut player = make_player(100.0, 50.0);
    let wall = Snapshot::new(Category::Platform, vec2(140.0, 0.0), vec2(100.0, 200.0));
    player.on_collision(&wall);
    assert_eq!(player.contacts().right_wall(), 1);

    player.as_player_mut().unwrap().update_movement(FRAME, right());
    assert_eq!(player.position().x, 100.0);

    player.as_player_mut().unwrap().update_movement(0.1, left());
    assert_eq!(player.position().x, 70.0);
}

#[test]
fn wall_on_left_blocks_only_leftward_movement() {
    let mut player = make_player(100.0, 50.0);
    let wall = Snapshot::new(Category::Platform, vec2(0.0, 0.0), vec2(110.0, 200.0));
    player.on_collision(&wall);
    assert_eq!(player.contacts().left_wall(), 1);

    player.as_player_mut().unwrap().update_movement(FRAME, left());
    assert_eq!(player.position().x, 100.0);

    player.as_player_mut().unwrap().update_movement(0.1, right());
    assert_eq!(player.position().x, 130.0);
}

#[test]
fn jump_requires_floor_contact() {
    let mut player = make_player(100.0, 100.0);
    player.as_player_mut().unwrap().update_movement(FRAME, up());
    assert_eq!(player.y_velocity(), Some(0.0));

    let floor = Snapshot::new(Category::Platform, vec2(0.0, 148.0), vec2(500.0, 50.0));
    player.on_collision(&floor);
    player.as_player_mut().unwrap().update_movement(FRAME, up());
    assert_eq!(player.y_velocity(), Some(-1950.0));
}

#[test]
fn jump_uses_current_jump_force() {
    let mut player = make_player(100.0, 100.0);
    let floor = Snapshot::new(Category::Platform, vec2(0.0, 148.0), vec2(500.0, 50.0));
    player.on_collision(&floor);

    let mut handle = player.as_player_mut().unwrap();
    handle.set_jump_force(-2600.0);
    handle.update_movement(FRAME, up());
    assert_eq!(handle.state().y_velocity(), -2600.0);

    handle.reset_jump_force();
    assert_eq!(handle.state().jump_force(), -1950.0);
}

#[test]
fn down_key_is_recorded() {
    let mut player = make_player(0.0, 0.0);
    let mut handle = player.as_player_mut().unwrap();
    handle.update_movement(
        FRAME,
        Intent {
            down: true,
            ..Intent::default()
        },
    );
    assert!(handle.state().down_pressed());
    handle.update_movement(FRAME, Intent::default());
    assert!(!handle.state().down_pressed());
}

#[test]
fn speed_modes_change_walking_distance() {
    let mut player = make_player(0.0, 0.0);
    player.as_player_mut().unwrap().boost_move_speed();
    player.as_player_mut().unwrap().update_movement(0.5, right());
    assert_eq!(player.position().x, 300.0);

    player.as_player_mut().unwrap().slow_move_speed();
    player.as_player_mut().unwrap().update_movement(0.5, right());
    assert_eq!(player.position().x, 375.0);

    player.as_player_mut().unwrap().normal_move_speed();
    assert_eq!(player.as_player().unwrap().move_speed(), MoveSpeed::Normal);
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[test]
fn speed_boost_expires_after_its_duration() {
    let mut player = make_player(0.0, 0.0);
    let mut handle = player.as_player_mut().unwrap();
    handle.apply_speed_boost(3);
    assert_eq!(handle.state().move_speed(), MoveSpeed::Boosted);
    assert_eq!(handle.state().powerup_duration(), 3);

    handle.update_powerups();
    handle.update_powerups();
    assert_eq!(handle.state().move_speed(), MoveSpeed::Boosted);
    assert_eq!(handle.state().powerup_duration(), 1);

    handle.update_powerups();
    assert_eq!(handle.state().powerup_duration(), 0);
    assert_eq!(handle.state().move_speed(), MoveSpeed::Normal);
}

#[test]
fn second_boost_restarts_the_timer() {
    let mut player = make_player(0.0, 0.0);
    let mut handle = player.as_player_mut().unwrap();
    handle.apply_speed_boost(3);
    handle.update_powerups();
    handle.apply_speed_boost(5);
    assert_eq!(handle.state().powerup_duration(), 5);
}

#[test]
fn zero_duration_is_ignored() {
    let mut player = make_player(0.0, 0.0);
    let mut handle = player.as_player_mut().unwrap();
    handle.apply_speed_boost(4);
    handle.apply_speed_boost(0);
    assert_eq!(handle.state().powerup_duration(), 4);
}

#[test]
fn speed_without_timer_reverts_on_tick() {
    let mut player = make_player(0.0, 0.0);
    let mut handle = player.as_player_mut().unwrap();
    handle.slow_move_speed();
    handle.update_powerups();
    assert_eq!(handle.state().move_speed(), MoveSpeed::Normal);
}

// ── Health ────────────────────────────────────────────────────────────────────

#[test]
fn health_is_clamped() {
    let mut player = make_player(0.0, 0.0);
    let mut handle = player.as_player_mut().unwrap();
    for _ in 0..5 {
        handle.loose_heart();
    }
    assert_eq!(handle.state().health(), 0);

    handle.add_health(10);
    assert_eq!(handle.state().health(), MAX_HEALTH);

    handle.set_health(7);
    assert_eq!(handle.state().health(), MAX_HEALTH);
}

#[test]
fn health_stays_in_range_under_random_changes() {
    let mut rng = seeded_rng();
    let mut player = make_player(0.0, 0.0);
    let mut handle = player.as_player_mut().unwrap();

    for _ in 0..500 {
        match rng.gen_range(0..3) {
            0 => handle.loose_heart(),
            1 => handle.add_health(rng.gen_range(0..5)),
            _ => handle.set_health(rng.gen_range(0..10)),
        }
        assert!(handle.state().health() <= MAX_HEALTH);
    }
}

#[test]
fn sprite_follows_health() {
    let mut player = make_player(0.0, 0.0);
    player.as_player_mut().unwrap().loose_heart();
    assert_eq!(player.visual().key, SpriteKey::PlayerMidHealth);
    player.as_player_mut().unwrap().loose_heart();
    assert_eq!(player.visual().key, SpriteKey::PlayerLowHealth);
    player.as_player_mut().unwrap().add_health(2);
    assert_eq!(player.visual().key, SpriteKey::PlayerFullHealth);
}

#[test]
fn launch_consumes_pending_bounce() {
    let mut player = make_player(100.0, 100.0);
    let pad = Snapshot::new(Category::JumpPad, vec2(0.0, 148.0), vec2(500.0, 20.0)).with_bounce(2200.0);
    player.on_collision(&pad);

    let mut handle = player.as_player_mut().unwrap();
    handle.set_jump_force(-2200.0);
    assert!(handle.launch());
    assert_eq!(handle.state().y_velocity(), -2200.0);
    assert!(!handle.state().force_bounce());
    assert!(!handle.launch());
}

#[test]
fn halt_clears_motion() {
    let mut player = make_player(100.0, 100.0);
    let pad = Snapshot::new(Category::JumpPad, vec2(0.0, 148.0), vec2(500.0, 20.0));
    player.on_collision(&pad);

    let mut handle = player.as_player_mut().unwrap();
    handle.set_jump_force(-3000.0);
    handle.launch();
    handle.halt();
    assert_eq!(handle.state().y_velocity(), 0.0);
    assert_eq!(handle.state().jump_force(), -1950.0);
    assert!(!handle.state().force_bounce());
}

#[test]
fn non_players_have_no_player_handle() {
    let mut platform = Entity::platform(vec2(0.0, 0.0), vec2(10.0, 10.0)).unwrap();
    assert!(platform.as_player_mut().is_none());
    assert!(platform.as_enemy_mut().is_none());
}

// ── Enemy patrol ──────────────────────────────────────────────────────────────

#[test]
fn patrol_turns_around_after_travel_distance() {
    let mut enemy = Entity::flying_enemy(vec2(0.0, 0.0), vec2(50.0, 50.0), 50.0, 100.0, false).unwrap();

    for _ in 0..4 {
        enemy.as_enemy_mut().unwrap().update_movement(0.5);
    }
    assert_eq!(enemy.position().x, 100.0);
    assert_eq!(enemy.patrol().unwrap().move_speed(), 50.0);

    enemy.as_enemy_mut().unwrap().update_movement(0.5);
    assert_eq!(enemy.patrol().unwrap().move_speed(), -50.0);
    assert_eq!(enemy.position().x, 75.0);
}

#[test]
fn patrol_turns_around_on_the_far_side() {
    let mut enemy = Entity::flying_enemy(vec2(0.0, 0.0), vec2(50.0, 50.0), -50.0, 100.0, false).unwrap();

    for _ in 0..4 {
        enemy.as_enemy_mut().unwrap().update_movement(0.5);
    }
    assert_eq!(enemy.position().x, -100.0);

    enemy.as_enemy_mut().unwrap().update_movement(0.5);
    assert_eq!(enemy.patrol().unwrap().move_speed(), 50.0);
    assert_eq!(enemy.position().x, -75.0);
}

#[test]
fn patrol_stays_within_travel_distance() {
    let mut rng = seeded_rng();
    let mut enemy = Entity::ground_enemy(vec2(500.0, 0.0), vec2(50.0, 50.0), 60.0, 150.0, false).unwrap();

    for _ in 0..1000 {
        let delta = rng.gen_range(0.001..0.02);
        enemy.as_enemy_mut().unwrap().update_movement(delta);
        let offset = (enemy.position().x - 500.0).abs();
        // At most one step past the turning point.
        assert!(offset <= 150.0 + 60.0 * 0.02 + 1e-3, "offset {offset}");
    }
}

#[test]
fn reset_move_speed_restores_direction() {
    let mut enemy = Entity::ground_enemy(vec2(0.0, 0.0), vec2(50.0, 50.0), 40.0, 100.0, false).unwrap();
    let mut handle = enemy.as_enemy_mut().unwrap();
    handle.change_direction();
    assert_eq!(handle.patrol().move_speed(), -40.0);
    handle.reset_move_speed();
    assert_eq!(handle.patrol().move_speed(), 40.0);
    assert_eq!(handle.patrol().initial_move_speed(), 40.0);
}
