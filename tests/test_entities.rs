use glam::vec2;
use platformer::collision::Snapshot;
use platformer::entities::*;
use platformer::error::EntityError;

fn make_player() -> Entity {
    Entity::player(vec2(100.0, 100.0), vec2(50.0, 50.0)).unwrap()
}

#[test]
fn category_tags_round_trip() {
    for category in Category::ALL {
        let parsed: Category = category.tag().parse().unwrap();
        assert_eq!(parsed, category);
        assert_eq!(category.to_string(), category.tag());
    }
    assert_eq!(" Jump Pad ".parse::<Category>().unwrap(), Category::JumpPad);
}

#[test]
fn unknown_category_tag_is_rejected() {
    let err = "Boss".parse::<Category>().unwrap_err();
    assert_eq!(err, EntityError::UnknownCategory("Boss".to_string()));
    assert!(Entity::spawn_tagged("Ladder", vec2(0.0, 0.0), vec2(10.0, 10.0)).is_err());
}

#[test]
fn category_groups() {
    assert!(Category::Player.is_actor());
    assert!(Category::GroundEnemy.is_actor());
    assert!(Category::FlyingEnemy.is_enemy());
    assert!(!Category::Platform.is_actor());
    assert!(!Category::EndGoal.is_actor());
    assert!(Category::HealthPickup.is_pickup());
    assert!(Category::SpeedPickup.is_pickup());
    assert!(!Category::JumpPad.is_pickup());
}

#[test]
fn spawn_builds_every_category() {
    for category in Category::ALL {
        let entity = Entity::spawn(category, vec2(10.0, 20.0), vec2(30.0, 40.0)).unwrap();
        assert_eq!(entity.category(), category);
        assert_eq!(entity.position(), vec2(10.0, 20.0));
        assert_eq!(entity.size(), vec2(30.0, 40.0));
        assert!(entity.contacts().is_clear());
    }
}

#[test]
fn spawn_tagged_uses_default_parameters() {
    let enemy = Entity::spawn_tagged("Ground Enemy", vec2(0.0, 0.0), vec2(50.0, 50.0)).unwrap();
    let patrol = enemy.patrol().unwrap();
    assert_eq!(patrol.move_speed(), DEFAULT_ENEMY_SPEED);
    assert_eq!(patrol.travel_distance(), DEFAULT_TRAVEL_DISTANCE);
    assert!(!patrol.invincible());

    let pad = Entity::spawn_tagged("Jump Pad", vec2(0.0, 0.0), vec2(50.0, 10.0)).unwrap();
    assert_eq!(pad.bounce(), Some(DEFAULT_BOUNCE));

    let pickup = Entity::spawn_tagged("Speed Pickup", vec2(0.0, 0.0), vec2(10.0, 10.0)).unwrap();
    assert_eq!(pickup.boost_duration(), Some(DEFAULT_BOOST_DURATION));
}

#[test]
fn invalid_sizes_are_rejected() {
    assert!(matches!(
        Entity::platform(vec2(0.0, 0.0), vec2(0.0, 10.0)),
        Err(EntityError::InvalidSize { .. })
    ));
    assert!(matches!(
        Entity::player(vec2(0.0, 0.0), vec2(10.0, -5.0)),
        Err(EntityError::InvalidSize { .. })
    ));
    assert!(matches!(
        Entity::health_pickup(vec2(0.0, 0.0), vec2(f32::NAN, 10.0)),
        Err(EntityError::InvalidSize { .. })
    ));
    assert!(matches!(
        Entity::platform(vec2(f32::INFINITY, 0.0), vec2(10.0, 10.0)),
        Err(EntityError::InvalidParameter(_))
    ));
}

#[test]
fn invalid_variant_parameters_are_rejected() {
    let size = vec2(20.0, 20.0);
    assert!(Entity::speed_pickup(vec2(0.0, 0.0), size, 0).is_err());
    assert!(Entity::jump_pad(vec2(0.0, 0.0), size, 0.0).is_err());
    assert!(Entity::jump_pad(vec2(0.0, 0.0), size, -100.0).is_err());
    assert!(Entity::ground_enemy(vec2(0.0, 0.0), size, 50.0, -1.0, false).is_err());
    assert!(Entity::flying_enemy(vec2(0.0, 0.0), size, f32::NAN, 10.0, false).is_err());
    // A stationary enemy is allowed.
    assert!(Entity::ground_enemy(vec2(0.0, 0.0), size, 0.0, 0.0, false).is_ok());
}

#[test]
fn variant_accessors_only_answer_for_their_variant() {
    let pad = Entity::jump_pad(vec2(0.0, 0.0), vec2(50.0, 10.0), 1800.0).unwrap();
    let goal = Entity::end_goal(vec2(0.0, 0.0), vec2(50.0, 100.0), 4).unwrap();
    let platform = Entity::platform(vec2(0.0, 0.0), vec2(50.0, 10.0)).unwrap();

    assert_eq!(pad.bounce(), Some(1800.0));
    assert_eq!(goal.level_to_load(), Some(4));
    assert_eq!(platform.bounce(), None);
    assert_eq!(platform.level_to_load(), None);
    assert_eq!(platform.boost_duration(), None);
    assert!(platform.as_player().is_none());
    assert!(platform.patrol().is_none());
    assert!(platform.y_velocity().is_none());
}

#[test]
fn new_player_defaults() {
    let player = make_player();
    let state = player.as_player().unwrap();
    assert_eq!(state.health(), MAX_HEALTH);
    assert_eq!(state.move_speed(), MoveSpeed::Normal);
    assert_eq!(state.y_velocity(), 0.0);
    assert_eq!(state.jump_force(), -1950.0);
    assert!(!state.force_bounce());
    assert!(!state.down_pressed());
    assert_eq!(state.powerup_duration(), 0);
    assert_eq!(player.initial_position(), player.position());
    assert_eq!(player.visual().key, SpriteKey::PlayerFullHealth);
}

#[test]
fn reset_position_restores_initial_position() {
    let mut player = make_player();
    player.update(0.1);
    player.apply_gravity(0.1);
    assert_ne!(player.position(), player.initial_position());

    player.reset_position();
    assert_eq!(player.position(), vec2(100.0, 100.0));
}

#[test]
fn reset_collision_counts_is_idempotent() {
    let mut player = make_player();
    let floor = Snapshot::new(Category::Platform, vec2(0.0, 148.0), vec2(500.0, 50.0));
    player.on_collision(&floor);
    player.on_collision(&floor);
    assert_eq!(player.contacts().floor(), 2);

    player.reset_collision_counts();
    let once = *player.contacts();
    player.reset_collision_counts();
    assert_eq!(*player.contacts(), once);
    assert!(once.is_clear());
}

#[test]
fn enemy_sprite_reflects_invincibility() {
    let size = vec2(50.0, 50.0);
    let plain = Entity::ground_enemy(vec2(0.0, 0.0), size, 50.0, 100.0, false).unwrap();
    let tough = Entity::ground_enemy(vec2(0.0, 0.0), size, 50.0, 100.0, true).unwrap();
    let flyer = Entity::flying_enemy(vec2(0.0, 0.0), size, 50.0, 100.0, true).unwrap();

    assert_eq!(plain.visual().key, SpriteKey::GroundEnemy);
    assert_eq!(tough.visual().key, SpriteKey::InvincibleGroundEnemy);
    assert_eq!(flyer.visual().key, SpriteKey::InvincibleFlyingEnemy);
    assert_eq!(tough.visual().key.asset_name(), "invincible_ground_enemy.png");
}

#[test]
fn player_sprite_for_health() {
    assert_eq!(SpriteKey::for_health(3), SpriteKey::PlayerFullHealth);
    assert_eq!(SpriteKey::for_health(2), SpriteKey::PlayerMidHealth);
    assert_eq!(SpriteKey::for_health(1), SpriteKey::PlayerLowHealth);
    assert_eq!(SpriteKey::for_health(0), SpriteKey::PlayerLowHealth);
}

#[test]
fn move_speed_units() {
    assert_eq!(MoveSpeed::Slowed.units(), 150.0);
    assert_eq!(MoveSpeed::Normal.units(), 300.0);
    assert_eq!(MoveSpeed::Boosted.units(), 600.0);
}

#[test]
fn entity_clone_is_independent() {
    let original = make_player();
    let mut cloned = original.clone();

    cloned.update(0.5);
    cloned.as_player_mut().unwrap().loose_heart();

    assert_eq!(original.position(), vec2(100.0, 100.0));
    assert_eq!(original.as_player().unwrap().health(), MAX_HEALTH);
    assert_ne!(original, cloned);
}
