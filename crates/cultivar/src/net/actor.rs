//! Deterministic policy network.

use tch::{nn, nn::OptimizerConfig, Device, Tensor};

use super::HasVarStore;
use crate::Result;

/// Policy function approximator.
///
/// Two ReLU hidden layers followed by a tanh head, so the output is
/// componentwise in `[-1, 1]` before any caller-side rescaling. The network
/// owns its parameter store and Adam optimizer.
pub struct ActorNetwork {
    vs: nn::VarStore,
    fc1: nn::Linear,
    fc2: nn::Linear,
    mu: nn::Linear,
    pub(crate) optimizer: nn::Optimizer,
}

impl ActorNetwork {
    pub fn new(
        obs_dim: i64,
        action_dim: i64,
        fc1_dim: i64,
        fc2_dim: i64,
        learning_rate: f64,
        device: Device,
    ) -> Result<Self> {
        let vs = nn::VarStore::new(device);
        let root = vs.root();

        let fc1 = nn::linear(&root / "fc1", obs_dim, fc1_dim, Default::default());
        let fc2 = nn::linear(&root / "fc2", fc1_dim, fc2_dim, Default::default());
        let mu = nn::linear(&root / "mu", fc2_dim, action_dim, Default::default());

        let optimizer = nn::Adam::default().build(&vs, learning_rate)?;

        Ok(Self {
            vs,
            fc1,
            fc2,
            mu,
            optimizer,
        })
    }

    /// Forward pass: `[batch, obs_dim] -> [batch, action_dim]` in `[-1, 1]`.
    pub fn forward(&self, states: &Tensor) -> Tensor {
        states
            .apply(&self.fc1)
            .relu()
            .apply(&self.fc2)
            .relu()
            .apply(&self.mu)
            .tanh()
    }
}

impl HasVarStore for ActorNetwork {
    fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    fn var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.vs
    }
}
