//! Scalar reward for one state transition.

use crate::game::GameState;

const SURVIVAL_REWARD: f32 = 0.1;
const SCORE_SCALE: f32 = 10.0;
const MOTION_BONUS: f32 = 0.01;
const STILLNESS_PENALTY: f32 = 0.01;
const AIMED_SHOT_BONUS: f32 = 0.02;
const SPRAY_PENALTY: f32 = 0.01;
const NEAR_TARGET_RANGE: f32 = 250.0;
const CLOSE_CALL_PENALTY: f32 = 0.3;
const PROXIMITY_PENALTY: f32 = 0.1;
const STANDOFF_BONUS: f32 = 0.05;
const TERMINAL_PENALTY: f32 = 10.0;

/// Computes the shaped reward for a (previous, next) pair of game states.
/// The terms are additive and intentionally ad hoc; swapping in a different
/// shaping lives here without touching the buffer or encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardShaper;

impl RewardShaper {
    pub fn new() -> Self {
        RewardShaper
    }

    pub fn shape(&self, prev: &GameState, next: &GameState) -> f32 {
        let mut reward = SURVIVAL_REWARD;

        if next.score > prev.score {
            reward += (next.score - prev.score) as f32 / SCORE_SCALE;
        }

        let speed = next.ship.vel.length();
        if speed > 0.3 {
            reward += MOTION_BONUS;
        } else if speed < 0.1 {
            reward -= STILLNESS_PENALTY;
        }

        let ship_pos = next.ship.pos;
        let fired = next.bullets.len() > prev.bullets.len();
        let threat_in_range = next
            .asteroids
            .iter()
            .any(|a| ship_pos.distance(a.pos) < NEAR_TARGET_RANGE);
        if fired && threat_in_range {
            reward += AIMED_SHOT_BONUS;
        }
        if next.bullets.len() >= 3 {
            let any_near_target = next.bullets.iter().any(|b| {
                next.asteroids
                    .iter()
                    .any(|a| b.pos.distance(a.pos) < NEAR_TARGET_RANGE)
            });
            if !any_near_target {
                reward -= SPRAY_PENALTY;
            }
        }

        let mut closest = f32::INFINITY;
        for asteroid in &next.asteroids {
            let distance = ship_pos.distance(asteroid.pos);
            if distance < asteroid.radius + 30.0 {
                reward -= CLOSE_CALL_PENALTY;
            } else if distance < asteroid.radius + 60.0 {
                reward -= PROXIMITY_PENALTY;
            }
            if distance < closest {
                closest = distance;
            }
        }
        if closest > 100.0 && closest < 200.0 {
            reward += STANDOFF_BONUS;
        }

        // Exactly once, on the transition into game over
        if next.game_over && !prev.game_over {
            reward -= TERMINAL_PENALTY;
        }

        reward
    }
}
