//! Fixed-length feature encoding of the world state.
//!
//! The policy network consumes exactly [`FEATURE_LEN`] values regardless of
//! how many threats or power-ups exist; missing slots are padded with
//! sentinels so the layout never shifts.

use ndarray::Array1;
use std::f32::consts::{PI, TAU};

use crate::game::{GameState, MAX_PLAYER_BULLETS, WORLD_DIAGONAL, WORLD_HEIGHT, WORLD_WIDTH};

pub const FEATURE_LEN: usize = 39;
const THREAT_SLOTS: usize = 3;
/// Sentinel for an empty threat slot: maximum distance, no velocity, not a UFO.
const THREAT_PAD: [f32; 6] = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
/// Sentinel for no power-up in play.
const POWERUP_PAD: [f32; 5] = [1.0, 0.0, 0.0, 0.0, 0.0];

/// Wrap an angle into [-pi, pi].
fn wrap_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

fn normalized_distance(distance: f32) -> f32 {
    (distance / WORLD_DIAGONAL).min(1.0)
}

/// Encode the world into the policy's 39-element feature vector.
///
/// Layout: ship block (9), edge distances (4), three nearest-threat slots
/// (6 each), nearest power-up (5), game-state block (3). Threats are
/// asteroids and the UFO, sorted ascending by distance to the ship. Relative
/// angles are always encoded as a sin/cos pair to avoid the discontinuity
/// at +/-pi.
pub fn encode(state: &GameState) -> Array1<f32> {
    let mut features = Vec::with_capacity(FEATURE_LEN);
    let ship = &state.ship;

    // Ship block
    features.push(ship.pos.x / WORLD_WIDTH);
    features.push(ship.pos.y / WORLD_HEIGHT);
    features.push(ship.vel.x / 5.0);
    features.push(ship.vel.y / 5.0);
    features.push(ship.rotation.cos());
    features.push(ship.rotation.sin());
    features.push(ship.shields as f32 / 3.0);
    features.push(if ship.rapid_fire_active() { 1.0 } else { 0.0 });
    features.push(if ship.multi_shot_active() { 1.0 } else { 0.0 });

    // Distance to each boundary
    features.push(ship.pos.x / WORLD_WIDTH);
    features.push((WORLD_WIDTH - ship.pos.x) / WORLD_WIDTH);
    features.push(ship.pos.y / WORLD_HEIGHT);
    features.push((WORLD_HEIGHT - ship.pos.y) / WORLD_HEIGHT);

    // Threats: asteroids plus the UFO, nearest first
    struct Threat {
        distance: f32,
        dx: f32,
        dy: f32,
        vx: f32,
        vy: f32,
        is_ufo: bool,
    }

    let mut threats: Vec<Threat> = state
        .asteroids
        .iter()
        .map(|a| Threat {
            distance: ship.pos.distance(a.pos),
            dx: a.pos.x - ship.pos.x,
            dy: a.pos.y - ship.pos.y,
            vx: a.vel.x,
            vy: a.vel.y,
            is_ufo: false,
        })
        .collect();
    if let Some(ufo) = &state.ufo {
        threats.push(Threat {
            distance: ship.pos.distance(ufo.pos),
            dx: ufo.pos.x - ship.pos.x,
            dy: ufo.pos.y - ship.pos.y,
            vx: ufo.vel.x,
            vy: ufo.vel.y,
            is_ufo: true,
        });
    }
    threats.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    for slot in 0..THREAT_SLOTS {
        match threats.get(slot) {
            Some(threat) => {
                let relative = wrap_angle(threat.dy.atan2(threat.dx) - ship.rotation);
                features.push(normalized_distance(threat.distance));
                features.push(relative.sin());
                features.push(relative.cos());
                features.push(threat.vx / 5.0);
                features.push(threat.vy / 5.0);
                features.push(if threat.is_ufo { 1.0 } else { 0.0 });
            }
            None => features.extend_from_slice(&THREAT_PAD),
        }
    }

    // Nearest power-up
    let nearest = state.power_ups.iter().min_by(|a, b| {
        ship.pos
            .distance(a.pos)
            .partial_cmp(&ship.pos.distance(b.pos))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    match nearest {
        Some(power_up) => {
            let dx = power_up.pos.x - ship.pos.x;
            let dy = power_up.pos.y - ship.pos.y;
            let relative = wrap_angle(dy.atan2(dx) - ship.rotation);
            features.push(normalized_distance(ship.pos.distance(power_up.pos)));
            features.push(relative.sin());
            features.push(relative.cos());
            features.push(1.0);
            features.push(power_up.kind.type_code());
        }
        None => features.extend_from_slice(&POWERUP_PAD),
    }

    // Game-state block
    features.push(state.bullets.len() as f32 / MAX_PLAYER_BULLETS as f32);
    features.push((state.enemy_bullets.len() as f32 / 10.0).min(1.0));
    features.push((state.wave as f32 / 10.0).min(1.0));

    debug_assert_eq!(features.len(), FEATURE_LEN);
    Array1::from_vec(features)
}
