//! # Cultivar
//!
//! Reinforcement-learning control for simulated growth environments.
//!
//! ## Overview
//!
//! Cultivar provides:
//! - The `ControlEnv` trait for step/reset simulators with continuous actions
//! - A TD3 agent (twin critics, delayed actor updates, target smoothing)
//! - A replay memory with uniform minibatch sampling
//! - A training session with checkpoint-on-improvement and plateau stopping
//! - Pluggable metric sinks (console, TensorBoard behind the `tensorboard`
//!   feature)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cultivar::prelude::*;
//! use cultivar_envs::Setpoint;
//! use tch::Device;
//!
//! let env = Setpoint::new(4);
//! let config = TrainConfig::default().with_episodes(500);
//! let sink = ConsoleSink;
//! let mut session = TrainSession::new(env, config, &sink, Device::Cpu)?;
//! let report = session.run()?;
//! ```

pub mod checkpoint;
pub mod env;
pub mod log;
pub mod net;
pub mod td3;
pub mod training;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::checkpoint::CheckpointStore;
    pub use crate::env::{ControlEnv, EnvInfo, StepResult};
    #[cfg(feature = "tensorboard")]
    pub use crate::log::TensorBoardSink;
    pub use crate::log::{ConsoleSink, MetricSink, MultiSink, NullSink};
    pub use crate::net::{ActorNetwork, CriticNetwork, HasVarStore};
    pub use crate::td3::{LearnMetrics, ReplayBuffer, Td3Agent, Td3Config, TransitionBatch};
    pub use crate::training::{has_plateaued, TrainConfig, TrainReport, TrainSession};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum CultivarError {
    #[error("Environment error: {0}")]
    Env(String),

    #[error("Tensor error: {0}")]
    Tensor(#[from] tch::TchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CultivarError>;
