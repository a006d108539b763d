use serde::{Serialize, Deserialize};

/// Tracks completed-episode totals for the training history surface.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EpisodeTracker {
    episode_rewards: Vec<f32>,
    episode_lengths: Vec<usize>,
    current_reward: f32,
    current_length: usize,
}

impl EpisodeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick's reward within the running episode.
    pub fn step(&mut self, reward: f32) {
        self.current_reward += reward;
        self.current_length += 1;
    }

    /// Close the running episode, appending its totals to the history.
    pub fn end_episode(&mut self) {
        self.episode_rewards.push(self.current_reward);
        self.episode_lengths.push(self.current_length);
        self.current_reward = 0.0;
        self.current_length = 0;
    }

    /// Drop the running episode without recording it. Used when an episode
    /// is aborted rather than completed.
    pub fn discard_current(&mut self) {
        self.current_reward = 0.0;
        self.current_length = 0;
    }

    /// Completed-episode total rewards, most recent last.
    pub fn episode_rewards(&self) -> &[f32] {
        &self.episode_rewards
    }

    pub fn episode_lengths(&self) -> &[usize] {
        &self.episode_lengths
    }

    pub fn episode_count(&self) -> usize {
        self.episode_rewards.len()
    }

    pub fn current_reward(&self) -> f32 {
        self.current_reward
    }

    /// Recent average episode reward over a trailing window.
    pub fn avg_episode_reward(&self, window: usize) -> Option<f32> {
        if self.episode_rewards.is_empty() {
            return None;
        }
        let n = window.min(self.episode_rewards.len());
        let sum: f32 = self.episode_rewards.iter().rev().take(n).sum();
        Some(sum / n as f32)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
