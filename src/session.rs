//! Session coordinator: owns the world, the policy engine, the experience
//! buffer, and the cached action, and serializes every mutation behind its
//! methods.
//!
//! Per tick, physics advances under the action computed by the previous
//! tick's inference (one-tick-stale by design), reward is shaped from the
//! state transition, experience is appended, and a fresh inference is issued
//! for the next tick unless training is in flight. Episode endings are
//! scheduled out of the synchronous update and applied at the start of the
//! following tick.

use ndarray::Array1;
use rand::rngs::ThreadRng;

use crate::encoder;
use crate::experience::ExperienceBuffer;
use crate::game::{self, GameState, ShipInput};
use crate::metrics::EpisodeTracker;
use crate::policy::{NetworkActivations, PolicyEngine, ACTION_COUNT, NEUTRAL_ACTION};
use crate::reward::RewardShaper;
use crate::trainer::EpisodeTrainer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResetKind {
    Death,
    WaveClear,
}

pub struct AgentSession {
    state: GameState,
    policy: PolicyEngine,
    trainer: EpisodeTrainer,
    buffer: ExperienceBuffer,
    shaper: RewardShaper,
    tracker: EpisodeTracker,
    /// Action driving the current tick; refreshed from `pending_action`.
    cached_action: [bool; ACTION_COUNT],
    /// Result of the most recent inference, promoted at the next tick.
    /// Last-writer-wins: an unconsumed result is simply overwritten.
    pending_action: Option<[bool; ACTION_COUNT]>,
    /// Features the cached action was computed from (the pre-action state).
    last_features: Option<Array1<f32>>,
    ai_mode: bool,
    training_mode: bool,
    /// Explicit episode-boundary guard: an episode is processed exactly once.
    episode_active: bool,
    episode_reward: f32,
    reset_pending: Option<ResetKind>,
    rng: ThreadRng,
}

impl AgentSession {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        let mut state = GameState::new();
        game::initialize(&mut state, false, &mut rng);

        AgentSession {
            state,
            policy: PolicyEngine::new(),
            trainer: EpisodeTrainer::new(),
            buffer: ExperienceBuffer::new(),
            shaper: RewardShaper::new(),
            tracker: EpisodeTracker::new(),
            cached_action: NEUTRAL_ACTION,
            pending_action: None,
            last_features: None,
            ai_mode: true,
            training_mode: false,
            episode_active: true,
            episode_reward: 0.0,
            reset_pending: None,
            rng,
        }
    }

    /// Restart the world from the UI. Keeps the policy, history, and modes.
    pub fn initialize_game(&mut self, keep_score: bool) {
        game::initialize(&mut self.state, keep_score, &mut self.rng);
        self.restart_episode();
    }

    pub fn set_ai_mode(&mut self, enabled: bool) {
        self.ai_mode = enabled;
        if !enabled {
            self.pending_action = None;
            self.cached_action = NEUTRAL_ACTION;
        }
    }

    pub fn ai_mode(&self) -> bool {
        self.ai_mode
    }

    pub fn set_training(&mut self, enabled: bool) {
        self.training_mode = enabled;
        if !enabled {
            self.buffer.clear();
        }
    }

    pub fn training(&self) -> bool {
        self.training_mode
    }

    /// Advance one frame under AI control.
    pub fn tick(&mut self) {
        if self.apply_scheduled_reset() {
            return;
        }
        // Promote the previous tick's inference result; this tick runs on a
        // one-tick-stale action.
        if let Some(action) = self.pending_action.take() {
            self.cached_action = action;
        }
        let input = if self.ai_mode {
            ShipInput::from_action(self.cached_action)
        } else {
            ShipInput::default()
        };
        self.advance(input);
    }

    /// Advance one frame under manual control.
    pub fn tick_manual(&mut self, input: ShipInput) {
        if self.apply_scheduled_reset() {
            return;
        }
        self.cached_action = [input.turn_left, input.turn_right, input.thrust, input.fire];
        self.advance(input);
    }

    fn apply_scheduled_reset(&mut self) -> bool {
        let Some(kind) = self.reset_pending.take() else {
            return false;
        };
        match kind {
            ResetKind::Death => game::initialize(&mut self.state, false, &mut self.rng),
            ResetKind::WaveClear => game::initialize(&mut self.state, true, &mut self.rng),
        }
        self.restart_episode();
        true
    }

    fn restart_episode(&mut self) {
        self.episode_active = true;
        self.episode_reward = 0.0;
        // Keep the tracker in lockstep with the episode-reward accumulator:
        // an aborted episode must not leak into the next history entry.
        self.tracker.discard_current();
        self.cached_action = NEUTRAL_ACTION;
        self.pending_action = None;
        self.last_features = None;
    }

    fn advance(&mut self, input: ShipInput) {
        // Append the pre-action state with the action now being taken; the
        // matching reward follows once the new state exists.
        if self.training_mode && self.episode_active {
            if let Some(pre_action_state) = self.last_features.take() {
                self.buffer
                    .push_transition(pre_action_state, self.cached_action);
            }
        }

        let prev = self.state.clone();
        let events = game::step(&mut self.state, &input, &mut self.rng);
        let reward = self.shaper.shape(&prev, &self.state);

        if self.episode_active {
            self.episode_reward += reward;
            self.tracker.step(reward);
            if self.training_mode && self.buffer.pending_rewards() > 0 {
                self.buffer.push_reward(reward);
            }
        }

        let features = encoder::encode(&self.state);

        if events.ship_destroyed {
            self.finish_episode(ResetKind::Death);
        } else if events.wave_cleared {
            self.finish_episode(ResetKind::WaveClear);
        } else {
            self.last_features = Some(features.clone());
            if self.ai_mode && !self.policy.training_in_flight() {
                // Non-blocking from the tick's perspective: the result only
                // takes effect next tick.
                let exploration = self.exploration_rate();
                self.pending_action =
                    Some(self.policy
                        .select_action(features.view(), self.training_mode, exploration));
            }
        }
    }

    /// Episode-boundary handling, guarded so each episode is processed once.
    fn finish_episode(&mut self, kind: ResetKind) {
        if !self.episode_active {
            return;
        }
        self.episode_active = false;
        self.tracker.end_episode();

        if self.training_mode {
            match self.trainer.train(&mut self.policy, &mut self.buffer) {
                Ok(Some(report)) => {
                    log::debug!(
                        "trained on {} samples, loss {:.6}, weight delta {:.6}",
                        report.samples,
                        report.loss,
                        report.weight_delta
                    );
                }
                Ok(None) => {
                    // Too few samples; keep accumulating across the boundary.
                    log::debug!("skipped training, {} samples buffered", self.buffer.len());
                }
                Err(err) => {
                    // No retry; the buffer is retained for the next boundary.
                    log::warn!("training failed: {}", err);
                }
            }
        } else {
            self.buffer.clear();
        }

        self.reset_pending = Some(kind);
    }

    /// Exploration decays as the running episode reward improves. The scale
    /// is tied to the reward shaping; retuning one silently shifts the other.
    pub fn exploration_rate(&self) -> f32 {
        (0.5 - self.episode_reward / 100.0).max(0.1)
    }

    pub fn game_state(&self) -> &GameState {
        &self.state
    }

    /// Completed-episode total rewards, most recent last.
    pub fn training_history(&self) -> &[f32] {
        self.tracker.episode_rewards()
    }

    pub fn weight_changes(&self) -> f32 {
        self.policy.weight_changes()
    }

    pub fn last_action(&self) -> [bool; ACTION_COUNT] {
        self.cached_action
    }

    pub fn network_activations(&self) -> Option<NetworkActivations> {
        self.policy.network_activations()
    }

    pub fn episode_reward(&self) -> f32 {
        self.episode_reward
    }

    pub fn episode_active(&self) -> bool {
        self.episode_active
    }

    pub fn experience_len(&self) -> usize {
        self.buffer.len()
    }

    /// Tear down the policy engine; the session keeps ticking with the
    /// neutral action.
    pub fn dispose_policy(&mut self) {
        self.policy.dispose();
    }

    #[cfg(test)]
    pub(crate) fn policy_mut(&mut self) -> &mut PolicyEngine {
        &mut self.policy
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

impl Default for AgentSession {
    fn default() -> Self {
        Self::new()
    }
}
