use crate::encoder::{encode, FEATURE_LEN};
use crate::game::{
    Asteroid, AsteroidSize, GameState, PowerUp, PowerUpKind, Ufo, Vec2, POWERUP_LIFETIME,
    POWERUP_RADIUS, UFO_HEALTH, UFO_RADIUS,
};

fn asteroid_at(x: f32, y: f32, size: AsteroidSize) -> Asteroid {
    Asteroid {
        pos: Vec2::new(x, y),
        vel: Vec2::ZERO,
        radius: size.radius(),
        size,
    }
}

#[test]
fn test_empty_world_is_fully_padded() {
    let state = GameState::new();
    let features = encode(&state);
    assert_eq!(features.len(), FEATURE_LEN);

    // Three empty threat slots: max distance, zero velocity, not a UFO
    for slot in 0..3 {
        let base = 13 + slot * 6;
        assert_eq!(features[base], 1.0);
        for offset in 1..6 {
            assert_eq!(features[base + offset], 0.0);
        }
    }
    // Power-up pad: max distance and zero presence flag
    assert_eq!(features[31], 1.0);
    assert_eq!(features[34], 0.0);
    assert_eq!(features[35], 0.0);
}

#[test]
fn test_ship_block_normalization() {
    let mut state = GameState::new();
    state.ship.pos = Vec2::new(200.0, 150.0);
    state.ship.vel = Vec2::new(2.5, -5.0);
    state.ship.shields = 3;

    let features = encode(&state);
    assert!((features[0] - 0.25).abs() < 1e-6);
    assert!((features[1] - 0.25).abs() < 1e-6);
    assert!((features[2] - 0.5).abs() < 1e-6);
    assert!((features[3] + 1.0).abs() < 1e-6);
    assert!((features[6] - 1.0).abs() < 1e-6);

    // Edge distances: left/right/top/bottom
    assert!((features[9] - 0.25).abs() < 1e-6);
    assert!((features[10] - 0.75).abs() < 1e-6);
    assert!((features[11] - 0.25).abs() < 1e-6);
    assert!((features[12] - 0.75).abs() < 1e-6);
}

#[test]
fn test_threats_sorted_by_distance() {
    let mut state = GameState::new();
    // Ship starts at (400, 300); push the farther asteroid first
    state.asteroids.push(asteroid_at(500.0, 300.0, AsteroidSize::Small));
    state.asteroids.push(asteroid_at(450.0, 300.0, AsteroidSize::Small));

    let features = encode(&state);
    // Nearest threat in slot 0, distance 50 / 1000
    assert!((features[13] - 0.05).abs() < 1e-6);
    assert!((features[19] - 0.10).abs() < 1e-6);
    // Third slot stays padded
    assert_eq!(features[25], 1.0);
}

#[test]
fn test_ufo_flag_in_threat_slot() {
    let mut state = GameState::new();
    state.asteroids.push(asteroid_at(700.0, 300.0, AsteroidSize::Large));
    state.ufo = Some(Ufo {
        pos: Vec2::new(410.0, 300.0),
        vel: Vec2::ZERO,
        radius: UFO_RADIUS,
        health: UFO_HEALTH,
        last_shot_tick: 0,
    });

    let features = encode(&state);
    // The UFO is the nearest threat, so slot 0 carries the UFO flag
    assert!((features[13] - 0.01).abs() < 1e-6);
    assert_eq!(features[18], 1.0);
    // The asteroid in slot 1 does not
    assert_eq!(features[24], 0.0);
}

#[test]
fn test_relative_angle_encoding() {
    let mut state = GameState::new();
    state.ship.rotation = 0.0;
    // Directly "below" the ship in screen coordinates: relative angle pi/2
    state.asteroids.push(asteroid_at(400.0, 400.0, AsteroidSize::Small));

    let features = encode(&state);
    assert!((features[13] - 0.1).abs() < 1e-6);
    assert!((features[14] - 1.0).abs() < 1e-5); // sin
    assert!(features[15].abs() < 1e-5); // cos
}

#[test]
fn test_nearest_power_up_block() {
    let mut state = GameState::new();
    for (x, kind) in [(500.0, PowerUpKind::SlowTime), (450.0, PowerUpKind::Shield)] {
        state.power_ups.push(PowerUp {
            pos: Vec2::new(x, 300.0),
            kind,
            radius: POWERUP_RADIUS,
            lifetime: POWERUP_LIFETIME,
        });
    }

    let features = encode(&state);
    assert!((features[31] - 0.05).abs() < 1e-6);
    assert_eq!(features[34], 1.0);
    assert_eq!(features[35], PowerUpKind::Shield.type_code());
}

#[test]
fn test_game_block_clamps() {
    let mut state = GameState::new();
    state.wave = 25;
    let features = encode(&state);
    assert_eq!(features[38], 1.0);

    state.wave = 4;
    let features = encode(&state);
    assert!((features[38] - 0.4).abs() < 1e-6);
}

#[test]
fn test_power_up_type_codes_are_distinct() {
    let codes = [
        PowerUpKind::Shield.type_code(),
        PowerUpKind::RapidFire.type_code(),
        PowerUpKind::MultiShot.type_code(),
        PowerUpKind::SlowTime.type_code(),
    ];
    assert_eq!(codes, [0.25, 0.5, 0.75, 1.0]);
}
