//! Twin Delayed Deep Deterministic Policy Gradient.
//!
//! Provides:
//! - `ReplayBuffer` - circular transition store with uniform sampling
//! - `Td3Agent` - action selection, experience ingestion, learning updates
//! - `Td3Config` - agent hyperparameters
//!
//! Reference: "Addressing Function Approximation Error in Actor-Critic
//! Methods" (Fujimoto et al., 2018).

mod agent;
mod buffer;
mod config;

pub use agent::{LearnMetrics, Td3Agent};
pub use buffer::{ReplayBuffer, TransitionBatch};
pub use config::Td3Config;
