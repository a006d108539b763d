//! One-tick world advance: input integration, movement with edge wrapping,
//! circle collision resolution, asteroid break products, UFO behavior,
//! power-ups, and wave scaling.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::f32::consts::TAU;

use super::entities::*;

/// What happened during a single physics tick. The coordinator uses these to
/// shape rewards and schedule episode resets out of band.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepEvents {
    pub fired: bool,
    pub asteroids_destroyed: u32,
    pub wave_cleared: bool,
    pub ship_destroyed: bool,
}

pub fn asteroid_count_for_wave(wave: u32) -> usize {
    (5 + wave / 2).min(10) as usize
}

pub fn wave_speed_factor(wave: u32) -> f32 {
    1.0 + wave as f32 * 0.1
}

/// Circle collision test. Touching exactly (equal distance) is not a hit.
pub fn check_collision(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    pos_a.distance(pos_b) < radius_a + radius_b
}

/// Replace an asteroid with its break products: two children at half radius,
/// inheriting 50% of the parent velocity plus a fresh random heading at the
/// child size's base speed. Small asteroids are terminal and yield nothing.
pub fn break_asteroid<R: Rng>(asteroid: &Asteroid, speed_factor: f32, rng: &mut R) -> Vec<Asteroid> {
    let child_size = match asteroid.size.smaller() {
        Some(size) => size,
        None => return Vec::new(),
    };

    (0..2)
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let speed = child_size.base_speed() * speed_factor;
            Asteroid {
                pos: asteroid.pos,
                vel: asteroid.vel * 0.5 + Vec2::new(angle.cos(), angle.sin()) * speed,
                radius: asteroid.radius / 2.0,
                size: child_size,
            }
        })
        .collect()
}

/// Populate the current wave's asteroids, keeping spawns clear of the ship.
pub fn spawn_wave<R: Rng>(state: &mut GameState, rng: &mut R) {
    let count = asteroid_count_for_wave(state.wave);
    let speed_factor = wave_speed_factor(state.wave);

    state.asteroids.clear();
    while state.asteroids.len() < count {
        let pos = Vec2::new(
            rng.gen_range(0.0..WORLD_WIDTH),
            rng.gen_range(0.0..WORLD_HEIGHT),
        );
        if pos.distance(state.ship.pos) < SAFE_SPAWN_DISTANCE {
            continue;
        }
        let angle = rng.gen_range(0.0..TAU);
        let speed = AsteroidSize::Large.base_speed() * speed_factor;
        state.asteroids.push(Asteroid {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            radius: AsteroidSize::Large.radius(),
            size: AsteroidSize::Large,
        });
    }
}

/// Reset the world for a new episode. A score-preserving reset keeps score
/// and wave (used after a wave clear); a full reset returns to wave 1.
pub fn initialize<R: Rng>(state: &mut GameState, keep_score: bool, rng: &mut R) {
    if !keep_score {
        state.score = 0;
        state.wave = 1;
    }
    state.ship = Ship::new();
    state.bullets.clear();
    state.enemy_bullets.clear();
    state.ufo = None;
    state.power_ups.clear();
    state.particles.clear();
    state.game_over = false;
    state.slow_time_ticks = 0;
    spawn_wave(state, rng);
}

fn destroy_ship(state: &mut GameState) {
    state.deaths += 1;
    state.generation += 1;
    if state.score > state.high_score {
        state.high_score = state.score;
    }
    state.score = 0;
    state.game_over = true;
}

fn apply_powerup(state: &mut GameState, kind: PowerUpKind) {
    match kind {
        PowerUpKind::Shield => {
            state.ship.shields = (state.ship.shields + 1).min(MAX_SHIELDS);
        }
        PowerUpKind::RapidFire => state.ship.rapid_fire_ticks = RAPID_FIRE_TICKS,
        PowerUpKind::MultiShot => state.ship.multi_shot_ticks = MULTI_SHOT_TICKS,
        PowerUpKind::SlowTime => state.slow_time_ticks = SLOW_TIME_TICKS,
    }
}

fn spawn_break_particles<R: Rng>(state: &mut GameState, pos: Vec2, rng: &mut R) {
    for _ in 0..8 {
        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(0.5..2.5);
        state.particles.push(Particle {
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            life: 1.0,
        });
    }
}

fn maybe_drop_powerup<R: Rng>(state: &mut GameState, pos: Vec2, rng: &mut R) {
    if !rng.gen_bool(POWERUP_DROP_CHANCE) {
        return;
    }
    let kind = match rng.gen_range(0..4) {
        0 => PowerUpKind::Shield,
        1 => PowerUpKind::RapidFire,
        2 => PowerUpKind::MultiShot,
        _ => PowerUpKind::SlowTime,
    };
    state.power_ups.push(PowerUp {
        pos,
        kind,
        radius: POWERUP_RADIUS,
        lifetime: POWERUP_LIFETIME,
    });
}

fn fire_bullets(state: &mut GameState) -> bool {
    if state.ship.fire_cooldown > 0 || state.bullets.len() >= MAX_PLAYER_BULLETS {
        return false;
    }

    let headings = if state.ship.multi_shot_active() {
        vec![
            state.ship.rotation - MULTI_SHOT_SPREAD,
            state.ship.rotation,
            state.ship.rotation + MULTI_SHOT_SPREAD,
        ]
    } else {
        vec![state.ship.rotation]
    };

    let mut fired = false;
    for heading in headings {
        if state.bullets.len() >= MAX_PLAYER_BULLETS {
            break;
        }
        state.bullets.push(Bullet {
            pos: state.ship.pos,
            vel: state.ship.vel + Vec2::new(heading.cos(), heading.sin()) * BULLET_SPEED,
            radius: BULLET_RADIUS,
            lifetime: BULLET_LIFETIME,
        });
        fired = true;
    }

    if fired {
        state.ship.fire_cooldown = if state.ship.rapid_fire_active() {
            RAPID_FIRE_COOLDOWN
        } else {
            FIRE_COOLDOWN
        };
    }
    fired
}

fn advance_ufo<R: Rng>(state: &mut GameState, time_scale: f32, rng: &mut R) {
    if state.ufo.is_none()
        && state.wave >= 2
        && !state.asteroids.is_empty()
        && rng.gen_bool(UFO_SPAWN_CHANCE)
    {
        let from_left = rng.gen_bool(0.5);
        state.ufo = Some(Ufo {
            pos: Vec2::new(
                if from_left { 0.0 } else { WORLD_WIDTH - 1.0 },
                rng.gen_range(50.0..WORLD_HEIGHT - 50.0),
            ),
            vel: Vec2::new(if from_left { 1.5 } else { -1.5 }, 0.0),
            radius: UFO_RADIUS,
            health: UFO_HEALTH,
            last_shot_tick: state.tick,
        });
    }

    let ship_pos = state.ship.pos;
    let tick = state.tick;
    let mut shot: Option<EnemyBullet> = None;

    if let Some(ufo) = state.ufo.as_mut() {
        let wander = Normal::new(0.0f32, 0.02).expect("valid wander distribution");
        ufo.vel.y = (ufo.vel.y + wander.sample(rng)).clamp(-1.0, 1.0);
        ufo.pos = (ufo.pos + ufo.vel * time_scale).wrapped();

        if tick.saturating_sub(ufo.last_shot_tick) >= UFO_SHOT_INTERVAL {
            ufo.last_shot_tick = tick;
            let dx = ship_pos.x - ufo.pos.x;
            let dy = ship_pos.y - ufo.pos.y;
            let angle = dy.atan2(dx);
            shot = Some(EnemyBullet {
                pos: ufo.pos,
                vel: Vec2::new(angle.cos(), angle.sin()) * ENEMY_BULLET_SPEED,
                radius: ENEMY_BULLET_RADIUS,
                lifetime: ENEMY_BULLET_LIFETIME,
            });
        }
    }

    if let Some(bullet) = shot {
        state.enemy_bullets.push(bullet);
    }
}

/// Advance the world by one tick under the given control input.
pub fn step<R: Rng>(state: &mut GameState, input: &ShipInput, rng: &mut R) -> StepEvents {
    let mut events = StepEvents::default();
    if state.game_over {
        return events;
    }

    state.tick += 1;
    let speed_factor = wave_speed_factor(state.wave);
    let time_scale = if state.slow_time_active() {
        SLOW_TIME_FACTOR
    } else {
        1.0
    };

    // Ship control integration
    if input.turn_left {
        state.ship.rotation -= SHIP_TURN_RATE;
    }
    if input.turn_right {
        state.ship.rotation += SHIP_TURN_RATE;
    }
    state.ship.thrusting = input.thrust;
    if input.thrust {
        let rotation = state.ship.rotation;
        state.ship.vel = state.ship.vel + Vec2::new(rotation.cos(), rotation.sin()) * SHIP_THRUST;
    }
    state.ship.vel = state.ship.vel * SHIP_DRAG;
    if state.ship.fire_cooldown > 0 {
        state.ship.fire_cooldown -= 1;
    }
    if input.fire {
        events.fired = fire_bullets(state);
    }

    // Movement and wrapping
    state.ship.pos = (state.ship.pos + state.ship.vel).wrapped();
    for bullet in &mut state.bullets {
        bullet.pos = (bullet.pos + bullet.vel).wrapped();
        bullet.lifetime -= 1;
    }
    state.bullets.retain(|b| b.lifetime > 0);
    for asteroid in &mut state.asteroids {
        asteroid.pos = (asteroid.pos + asteroid.vel * time_scale).wrapped();
    }
    for bullet in &mut state.enemy_bullets {
        bullet.pos = (bullet.pos + bullet.vel * time_scale).wrapped();
        bullet.lifetime -= 1;
    }
    state.enemy_bullets.retain(|b| b.lifetime > 0);

    advance_ufo(state, time_scale, rng);

    // Player bullets vs asteroids
    let mut b = 0;
    while b < state.bullets.len() {
        let bullet = state.bullets[b].clone();
        let hit = state
            .asteroids
            .iter()
            .position(|a| check_collision(bullet.pos, bullet.radius, a.pos, a.radius));
        if let Some(idx) = hit {
            let asteroid = state.asteroids.swap_remove(idx);
            state.bullets.swap_remove(b);
            state.score += asteroid.size.score();
            events.asteroids_destroyed += 1;
            let children = break_asteroid(&asteroid, speed_factor, rng);
            state.asteroids.extend(children);
            spawn_break_particles(state, asteroid.pos, rng);
            maybe_drop_powerup(state, asteroid.pos, rng);
        } else {
            b += 1;
        }
    }

    // Player bullets vs UFO
    if let Some(ufo) = state.ufo.clone() {
        let mut health = ufo.health;
        state.bullets.retain(|bullet| {
            if health > 0 && check_collision(bullet.pos, bullet.radius, ufo.pos, ufo.radius) {
                health -= 1;
                false
            } else {
                true
            }
        });
        if health == 0 {
            state.score += UFO_SCORE;
            spawn_break_particles(state, ufo.pos, rng);
            maybe_drop_powerup(state, ufo.pos, rng);
            state.ufo = None;
        } else if let Some(live) = state.ufo.as_mut() {
            live.health = health;
        }
    }

    // Ship vs asteroids. A shield absorbs the hit and shatters the asteroid
    // without score; an unshielded hit ends the episode.
    let ship_pos = state.ship.pos;
    let ship_radius = state.ship.radius;
    if let Some(idx) = state
        .asteroids
        .iter()
        .position(|a| check_collision(ship_pos, ship_radius, a.pos, a.radius))
    {
        if state.ship.shields > 0 {
            state.ship.shields -= 1;
            let asteroid = state.asteroids.swap_remove(idx);
            let children = break_asteroid(&asteroid, speed_factor, rng);
            state.asteroids.extend(children);
            spawn_break_particles(state, asteroid.pos, rng);
        } else {
            destroy_ship(state);
            events.ship_destroyed = true;
            return events;
        }
    }

    // Ship vs enemy bullets
    let mut ship_hit = false;
    let shields = state.ship.shields;
    state.enemy_bullets.retain(|bullet| {
        if !ship_hit && check_collision(ship_pos, ship_radius, bullet.pos, bullet.radius) {
            ship_hit = true;
            false
        } else {
            true
        }
    });
    if ship_hit {
        if shields > 0 {
            state.ship.shields -= 1;
        } else {
            destroy_ship(state);
            events.ship_destroyed = true;
            return events;
        }
    }

    // Ship vs power-ups
    let mut collected = Vec::new();
    state.power_ups.retain(|p| {
        if check_collision(ship_pos, ship_radius, p.pos, p.radius) {
            collected.push(p.kind);
            false
        } else {
            true
        }
    });
    for kind in collected {
        apply_powerup(state, kind);
    }

    // Lifetimes and timers
    for p in &mut state.power_ups {
        p.lifetime -= 1;
    }
    state.power_ups.retain(|p| p.lifetime > 0);
    for particle in &mut state.particles {
        particle.pos = (particle.pos + particle.vel).wrapped();
        particle.life -= 0.02;
    }
    state.particles.retain(|p| p.life > 0.0);
    state.ship.rapid_fire_ticks = state.ship.rapid_fire_ticks.saturating_sub(1);
    state.ship.multi_shot_ticks = state.ship.multi_shot_ticks.saturating_sub(1);
    state.slow_time_ticks = state.slow_time_ticks.saturating_sub(1);

    if state.asteroids.is_empty() {
        state.wave += 1;
        events.wave_cleared = true;
    }

    events
}
