use crate::game::{Asteroid, AsteroidSize, Bullet, ShipInput, Vec2, BULLET_RADIUS};
use crate::policy::NEUTRAL_ACTION;
use crate::session::AgentSession;

fn asteroid_on_ship(session: &AgentSession) -> Asteroid {
    let pos = session.game_state().ship.pos;
    Asteroid {
        pos,
        vel: Vec2::ZERO,
        radius: AsteroidSize::Small.radius(),
        size: AsteroidSize::Small,
    }
}

#[test]
fn test_new_session_starts_a_live_episode() {
    let session = AgentSession::new();
    let state = session.game_state();
    assert_eq!(state.wave, 1);
    assert_eq!(state.asteroids.len(), 5);
    assert!(!state.game_over);
    assert!(session.episode_active());
    assert_eq!(session.last_action(), NEUTRAL_ACTION);
    assert!(session.training_history().is_empty());
}

#[test]
fn test_tick_advances_world() {
    let mut session = AgentSession::new();
    session.tick();
    assert_eq!(session.game_state().tick, 1);
    session.tick();
    assert_eq!(session.game_state().tick, 2);
}

#[test]
fn test_first_tick_runs_on_neutral_action() {
    let mut session = AgentSession::new();
    // No inference has completed before the first tick
    session.tick();
    assert_eq!(session.game_state().ship.rotation, 0.0);
}

#[test]
fn test_manual_input_steers_ship() {
    let mut session = AgentSession::new();
    let input = ShipInput {
        turn_left: true,
        ..Default::default()
    };
    session.tick_manual(input);
    assert!(session.game_state().ship.rotation < 0.0);
    assert_eq!(session.last_action(), [true, false, false, false]);
}

#[test]
fn test_ai_off_uses_default_input() {
    let mut session = AgentSession::new();
    session.set_ai_mode(false);
    assert!(!session.ai_mode());
    for _ in 0..5 {
        session.tick();
    }
    assert_eq!(session.game_state().ship.rotation, 0.0);
    assert_eq!(session.last_action(), NEUTRAL_ACTION);
}

#[test]
fn test_death_is_processed_exactly_once() {
    let mut session = AgentSession::new();
    let hit = asteroid_on_ship(&session);
    session.state_mut().asteroids.push(hit);

    session.tick();
    assert!(!session.episode_active());
    assert!(session.game_state().game_over);
    assert_eq!(session.training_history().len(), 1);

    // The next tick applies the scheduled reset and nothing else
    session.tick();
    assert!(session.episode_active());
    assert!(!session.game_state().game_over);
    assert_eq!(session.game_state().wave, 1);
    assert_eq!(session.training_history().len(), 1);
    assert_eq!(session.last_action(), NEUTRAL_ACTION);
}

#[test]
fn test_wave_clear_keeps_score() {
    let mut session = AgentSession::new();
    {
        let state = session.state_mut();
        state.score = 500;
        state.asteroids.clear();
        state.asteroids.push(Asteroid {
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::ZERO,
            radius: AsteroidSize::Small.radius(),
            size: AsteroidSize::Small,
        });
        state.bullets.push(Bullet {
            pos: Vec2::new(100.0, 100.0),
            vel: Vec2::ZERO,
            radius: BULLET_RADIUS,
            lifetime: 10,
        });
    }

    session.tick();
    assert!(!session.episode_active());
    assert_eq!(session.training_history().len(), 1);

    session.tick();
    assert!(session.episode_active());
    let state = session.game_state();
    // Score survives the wave-clear reset; the new wave is denser
    assert_eq!(state.score, 600);
    assert_eq!(state.wave, 2);
    assert_eq!(state.asteroids.len(), 6);
}

#[test]
fn test_training_mode_accumulates_experience() {
    let mut session = AgentSession::new();
    session.set_training(true);
    assert!(session.training());

    for _ in 0..5 {
        session.tick();
    }
    assert!(session.episode_active());
    // The first tick has no pre-action features yet
    assert_eq!(session.experience_len(), 4);
}

#[test]
fn test_disabling_training_drops_experience() {
    let mut session = AgentSession::new();
    session.set_training(true);
    for _ in 0..5 {
        session.tick();
    }
    session.set_training(false);
    assert_eq!(session.experience_len(), 0);
}

#[test]
fn test_short_episode_keeps_buffer_across_boundary() {
    let mut session = AgentSession::new();
    session.set_training(true);
    for _ in 0..3 {
        session.tick();
    }

    let hit = asteroid_on_ship(&session);
    session.state_mut().asteroids.push(hit);
    session.tick();
    // Below the training minimum: the episode's few samples survive the
    // boundary so the next episode can extend them
    assert_eq!(session.experience_len(), 3);
    assert_eq!(session.training_history().len(), 1);
}

#[test]
fn test_training_at_death_with_enough_samples() {
    let mut session = AgentSession::new();
    session.set_training(true);
    // Keep the ship safe while experience accumulates
    session.state_mut().asteroids.clear();
    session.state_mut().asteroids.push(Asteroid {
        pos: Vec2::new(100.0, 100.0),
        vel: Vec2::ZERO,
        radius: AsteroidSize::Small.radius(),
        size: AsteroidSize::Small,
    });
    for _ in 0..30 {
        session.tick();
        if !session.episode_active() {
            break;
        }
    }
    assert!(session.episode_active());
    assert!(session.experience_len() >= 10);

    let hit = asteroid_on_ship(&session);
    session.state_mut().asteroids.push(hit);
    session.tick();

    // Episode trained and buffer consumed
    assert_eq!(session.experience_len(), 0);
    assert_eq!(session.training_history().len(), 1);
}

#[test]
fn test_initialize_game_restarts_episode() {
    let mut session = AgentSession::new();
    for _ in 0..10 {
        session.tick();
    }
    session.state_mut().score = 250;
    session.initialize_game(false);
    let state = session.game_state();
    assert_eq!(state.score, 0);
    assert_eq!(state.wave, 1);
    assert!(session.episode_active());
    assert_eq!(session.last_action(), NEUTRAL_ACTION);
}

#[test]
fn test_restart_discards_partial_episode_from_history() {
    let mut session = AgentSession::new();
    // Accrue some reward, then abort the episode from the UI
    for _ in 0..10 {
        session.tick();
    }
    session.initialize_game(false);
    assert!(session.training_history().is_empty());

    // Run the fresh episode straight to its end
    let hit = asteroid_on_ship(&session);
    session.state_mut().asteroids.push(hit);
    session.tick();

    assert_eq!(session.training_history().len(), 1);
    // The recorded total is exactly what this episode accrued; nothing
    // carries over from the aborted one
    assert!(
        (session.training_history()[0] - session.episode_reward()).abs() < 1e-4,
        "history {} != episode reward {}",
        session.training_history()[0],
        session.episode_reward()
    );
}

#[test]
fn test_session_survives_policy_disposal() {
    let mut session = AgentSession::new();
    session.dispose_policy();
    for _ in 0..10 {
        session.tick();
    }
    // Inference degrades to neutral and the loop keeps running
    assert_eq!(session.last_action(), NEUTRAL_ACTION);
    assert_eq!(session.game_state().tick, 10);
    assert!(session.network_activations().is_none());
}

#[test]
fn test_network_activations_populated_after_inference() {
    let mut session = AgentSession::new();
    session.tick();
    let snapshot = session.network_activations().expect("inference ran");
    assert_eq!(snapshot.inputs.len(), 39);
}
