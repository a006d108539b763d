//! Embedded reinforcement-learning agent for an arcade asteroids simulation.
//!
//! The crate couples a small physics/collision engine with an on-policy
//! learning loop: each tick the world advances under the agent's cached
//! action, the resulting state is encoded into a fixed 39-element feature
//! vector, a shaped scalar reward is computed from the transition, and the
//! experience is buffered. At every episode boundary (ship destroyed or wave
//! cleared) the accumulated episode is turned into a supervised fit of the
//! policy network via discounted, normalized returns and reward-weighted
//! regression targets.
//!
//! ## Module organization
//!
//! - [`game`] - entities and the per-tick physics/collision engine
//! - [`encoder`] - fixed-length feature encoding of the world state
//! - [`network`] - feed-forward network with minibatch training
//! - [`activations`] - activation functions
//! - [`optimizer`] - SGD and Adam with per-layer state
//! - [`policy`] - policy engine: inference, exploration, diagnostics
//! - [`reward`] - reward shaping over state transitions
//! - [`experience`] - per-episode experience buffer
//! - [`trainer`] - episode-boundary training recipe
//! - [`session`] - the owning coordinator and external surface
//! - [`scratch`] - pooled scratch buffers with RAII leases
//! - [`metrics`] - per-episode reward/length history
//! - [`error`] - error types and result handling

pub mod activations;
pub mod encoder;
pub mod error;
pub mod experience;
pub mod game;
pub mod metrics;
pub mod network;
pub mod optimizer;
pub mod policy;
pub mod reward;
pub mod scratch;
pub mod session;
pub mod trainer;

#[cfg(test)]
mod tests;
