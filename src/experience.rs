use ndarray::Array1;

/// On-policy experience for one training episode: three parallel sequences
/// of states, 0/1 action vectors, and scalar rewards.
///
/// The reward for transition `t` is only known once state `t+1` exists, so
/// `rewards` may transiently run one element short; [`trim`](Self::trim)
/// cuts all three sequences to a common length before training.
#[derive(Clone, Default)]
pub struct ExperienceBuffer {
    states: Vec<Array1<f32>>,
    actions: Vec<[f32; 4]>,
    rewards: Vec<f32>,
}

impl ExperienceBuffer {
    pub fn new() -> Self {
        ExperienceBuffer {
            states: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
        }
    }

    /// Append the pre-action state and the action taken from it.
    pub fn push_transition(&mut self, state: Array1<f32>, action: [bool; 4]) {
        self.states.push(state);
        self.actions
            .push(action.map(|a| if a { 1.0 } else { 0.0 }));
    }

    /// Append the reward for the oldest transition that lacks one.
    pub fn push_reward(&mut self, reward: f32) {
        self.rewards.push(reward);
    }

    /// Number of complete (state, action, reward) transitions.
    pub fn len(&self) -> usize {
        self.states
            .len()
            .min(self.actions.len())
            .min(self.rewards.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn pending_rewards(&self) -> usize {
        self.states.len().saturating_sub(self.rewards.len())
    }

    /// Cut all three sequences to their common minimum length.
    pub fn trim(&mut self) {
        let len = self.len();
        self.states.truncate(len);
        self.actions.truncate(len);
        self.rewards.truncate(len);
    }

    pub fn states(&self) -> &[Array1<f32>] {
        &self.states
    }

    pub fn actions(&self) -> &[[f32; 4]] {
        &self.actions
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.actions.clear();
        self.rewards.clear();
    }
}
