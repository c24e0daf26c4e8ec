//! Agent hyperparameters.

use serde::{Deserialize, Serialize};

/// Configuration for the TD3 agent
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Td3Config {
    /// Actor learning rate
    pub actor_lr: f64,
    /// Critic learning rate (shared by both critics)
    pub critic_lr: f64,
    /// Discount factor
    pub gamma: f64,
    /// Soft-update rate for the target networks
    pub tau: f64,
    /// Minibatch size; learning is skipped until this many transitions exist
    pub batch_size: usize,
    /// First hidden-layer width (shared between actor and critics)
    pub layer1_size: i64,
    /// Second hidden-layer width (shared between actor and critics)
    pub layer2_size: i64,
    /// Steps of pure random exploration before the policy is consulted
    pub warmup: usize,
    /// Update the actor (and targets) every N critic updates
    pub update_actor_interval: usize,
    /// Std of the Gaussian exploration noise added to every action
    pub exploration_noise: f64,
    /// Std of the smoothing noise added to target actions
    pub target_noise: f64,
    /// Clip bound for the target smoothing noise
    pub target_noise_clip: f64,
    /// Replay memory capacity
    pub buffer_capacity: usize,
    /// Seed for action noise, replay sampling, and network init
    pub seed: Option<u64>,
}

impl Default for Td3Config {
    fn default() -> Self {
        Self {
            actor_lr: 1e-3,
            critic_lr: 1e-3,
            gamma: 0.99,
            tau: 0.005,
            batch_size: 100,
            layer1_size: 400,
            layer2_size: 300,
            warmup: 300,
            update_actor_interval: 2,
            exploration_noise: 0.1,
            target_noise: 0.2,
            target_noise_clip: 0.5,
            buffer_capacity: 1_000_000,
            seed: None,
        }
    }
}

impl Td3Config {
    /// Set both learning rates
    pub fn with_lr(mut self, actor_lr: f64, critic_lr: f64) -> Self {
        self.actor_lr = actor_lr;
        self.critic_lr = critic_lr;
        self
    }

    /// Set the minibatch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Disable all action noise (greedy policy, no warmup); used for
    /// evaluation rollouts.
    pub fn deterministic(mut self) -> Self {
        self.warmup = 0;
        self.exploration_noise = 0.0;
        self
    }
}
