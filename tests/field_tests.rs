//! Integration tests for the stone field.
//!
//! These drive `StoneField` through its public API only, the way the viewer
//! does: spawn, move the attractor, tick, read stones back.

use stonefield::{FieldConfig, ForceConfig, SpawnBounds, SpawnContext, Stone, StoneField, Vec3};

fn seeded(count: u32, seed: u64) -> StoneField {
    let mut ctx = SpawnContext::seeded(count, seed);
    StoneField::spawn(&mut ctx, SpawnBounds::default(), 0.0, ForceConfig::default())
}

fn single(stone: Stone, floor_y: f32) -> StoneField {
    StoneField::from_stones(vec![stone], floor_y, ForceConfig::default())
}

// ============================================================================
// Initialization
// ============================================================================

#[test]
fn test_spawn_inside_bounds() {
    let bounds = SpawnBounds::default();
    let floor_y = 0.0;
    for seed in 0..20 {
        let field = seeded(30, seed);
        for stone in field.stones() {
            let p = stone.position;
            assert!(bounds.contains(p), "{p:?} outside spawn box");
            assert!(p.y >= floor_y);
            assert!(p.y <= bounds.max.y);
            assert!(p.x.abs() <= 10.0 && p.z.abs() <= 10.0);
        }
    }
}

#[test]
fn test_initial_velocity_is_small() {
    let field = seeded(200, 4);
    for stone in field.stones() {
        assert!(stone.velocity.abs().max_element() <= 0.25);
    }
}

#[test]
fn test_initialize_uses_count() {
    let field = StoneField::initialize(30, SpawnBounds::default(), 0.0);
    assert_eq!(field.len(), 30);
    assert!(!field.is_empty());
    assert_eq!(field.attractor(), Vec3::ZERO);
}

#[test]
fn test_empty_field_ticks() {
    let mut field = StoneField::initialize(0, SpawnBounds::default(), 0.0);
    field.tick();
    assert!(field.is_empty());
    assert_eq!(field.tick_count(), 1);
}

// ============================================================================
// Population
// ============================================================================

#[test]
fn test_population_is_constant() {
    let mut field = StoneField::initialize(30, SpawnBounds::default(), 0.0);
    for i in 0..500 {
        field.set_attractor(Vec3::new((i as f32 * 0.1).sin() * 10.0, 8.0, 0.0));
        field.tick();
        assert_eq!(field.len(), 30);
    }
}

// ============================================================================
// Damping
// ============================================================================

#[test]
fn test_damping_only_never_speeds_up() {
    let mut field = seeded(30, 8);
    // Far from every stone.
    field.set_attractor(Vec3::new(1000.0, 1000.0, 1000.0));
    for _ in 0..200 {
        let before: Vec<_> = field.stones().iter().map(|s| (s.speed(), s.position.y)).collect();
        field.tick();
        for ((speed, y), stone) in before.iter().zip(field.stones()) {
            if *y >= field.floor_y() {
                assert!(stone.speed() <= *speed, "{} > {}", stone.speed(), speed);
            }
        }
    }
}

#[test]
fn test_energy_stays_bounded_under_constant_push() {
    let mut field = seeded(30, 12);
    field.set_attractor(Vec3::new(0.0, 10.0, 0.0));
    for _ in 0..5_000 {
        field.tick();
    }
    // Repulsion ends at the radius, so stones coast to a stop outside it.
    for stone in field.stones() {
        assert!(stone.speed() < 1.0);
        assert!(stone.is_finite());
    }
}

// ============================================================================
// Repulsion
// ============================================================================

#[test]
fn test_zero_distance_stays_finite() {
    let mut field = single(Stone::at_rest(Vec3::new(2.0, 6.0, -3.0)), 0.0);
    field.set_attractor(Vec3::new(2.0, 6.0, -3.0));
    for _ in 0..10 {
        field.tick();
    }
    let stone = field.stones()[0];
    assert!(stone.is_finite());
}

#[test]
fn test_attractor_on_every_stone_stays_finite() {
    let mut field = seeded(30, 21);
    let positions: Vec<_> = field.stones().iter().map(|s| s.position).collect();
    for p in positions {
        field.set_attractor(p);
        field.tick();
    }
    assert!(field.stones().iter().all(Stone::is_finite));
}

#[test]
fn test_repulsion_pushes_positive_x() {
    let position = Vec3::new(3.0, 7.0, 1.0);
    let mut field = single(Stone::at_rest(position), 0.0);
    field.set_attractor(position - Vec3::new(5.0, 0.0, 0.0));
    let before = field.stones()[0].velocity.x;
    field.tick();
    assert!(field.stones()[0].velocity.x > before);
}

#[test]
fn test_closer_pushes_harder() {
    let forces = ForceConfig::default();
    let mut near = Stone::at_rest(Vec3::new(2.0, 5.0, 0.0));
    let mut far = Stone::at_rest(Vec3::new(6.0, 5.0, 0.0));
    let attractor = Vec3::new(0.0, 5.0, 0.0);
    stonefield::step(&mut near, attractor, 0.0, &forces);
    stonefield::step(&mut far, attractor, 0.0, &forces);
    assert!(near.velocity.x > far.velocity.x);
    assert!(far.velocity.x > 0.0);
}

// ============================================================================
// Floor rule
// ============================================================================

#[test]
fn test_below_floor_rises() {
    let floor_y = 2.0;
    let mut field = single(Stone::at_rest(Vec3::new(100.0, floor_y - 1.0, 0.0)), floor_y);
    field.set_attractor(Vec3::new(-100.0, 0.0, 0.0));
    let before = field.stones()[0].velocity.y;
    field.tick();
    assert!(field.stones()[0].velocity.y > before);
}

#[test]
fn test_above_floor_settles() {
    let floor_y = 2.0;
    let stone = Stone::new(Vec3::new(100.0, floor_y + 1.0, 0.0), Vec3::new(0.0, -0.3, 0.0), Vec3::ZERO);
    let mut field = single(stone, floor_y);
    field.set_attractor(Vec3::new(-100.0, 0.0, 0.0));
    field.tick();
    let vy = field.stones()[0].velocity.y;
    assert!(vy.abs() < 0.3);
    assert!(vy < 0.0, "settling should not flip direction");
}

#[test]
fn test_sunk_stone_returns_to_floor() {
    let mut field = single(Stone::at_rest(Vec3::new(100.0, -5.0, 0.0)), 0.0);
    field.set_attractor(Vec3::new(-100.0, 0.0, 0.0));
    for _ in 0..2_000 {
        field.tick();
    }
    assert!(field.stones()[0].position.y >= -0.5);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_from_default_config() {
    let config = FieldConfig {
        seed: Some(3),
        ..Default::default()
    };
    let field = StoneField::from_config(&config).unwrap();
    assert_eq!(field.len(), stonefield::STONE_COUNT as usize);
    assert_eq!(field.forces().mouse_radius, stonefield::MOUSE_RADIUS);
}

#[test]
fn test_independent_fields() {
    let mut a = seeded(10, 1);
    let mut b = seeded(10, 1);
    a.set_attractor(a.stones()[0].position + Vec3::X);
    a.advance(20);
    b.advance(20);
    assert_ne!(a.stones(), b.stones());
}

#[test]
fn test_demo_config_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/fixed_rate.json");
    let config = FieldConfig::load(path).unwrap();
    assert_eq!(config.stone_count, 60);
    assert_eq!(config.forces.damping, 0.98);
    let field = StoneField::from_config(&config).unwrap();
    assert_eq!(field.len(), 60);
}
