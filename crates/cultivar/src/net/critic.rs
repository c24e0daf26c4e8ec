//! Q-value network.

use tch::{nn, nn::OptimizerConfig, Device, Tensor};

use super::HasVarStore;
use crate::Result;

/// Value function approximator over (state, action) pairs.
///
/// The state and action vectors are concatenated and passed through two
/// ReLU hidden layers into a single linear output with no bounding
/// activation. The twin and target critics used by TD3 are independent
/// instances of this one type.
pub struct CriticNetwork {
    vs: nn::VarStore,
    fc1: nn::Linear,
    fc2: nn::Linear,
    q: nn::Linear,
    pub(crate) optimizer: nn::Optimizer,
}

impl CriticNetwork {
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

        let fc1 = nn::linear(&root / "fc1", obs_dim + action_dim, fc1_dim, Default::default());
        let fc2 = nn::linear(&root / "fc2", fc1_dim, fc2_dim, Default::default());
        let q = nn::linear(&root / "q", fc2_dim, 1, Default::default());

        let optimizer = nn::Adam::default().build(&vs, learning_rate)?;

        Ok(Self {
            vs,
            fc1,
            fc2,
            q,
            optimizer,
        })
    }

    /// Forward pass: `([batch, obs_dim], [batch, action_dim]) -> [batch, 1]`.
    pub fn forward(&self, states: &Tensor, actions: &Tensor) -> Tensor {
        Tensor::cat(&[states, actions], 1)
            .apply(&self.fc1)
            .relu()
            .apply(&self.fc2)
            .relu()
            .apply(&self.q)
    }
}

impl HasVarStore for CriticNetwork {
    fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }

    fn var_store_mut(&mut self) -> &mut nn::VarStore {
        &mut self.vs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Kind;

    #[test]
    fn test_critic_scalar_output() {
        let critic = CriticNetwork::new(6, 3, 32, 32, 1e-3, Device::Cpu).unwrap();
        let states = Tensor::randn([8, 6], (Kind::Float, Device::Cpu));
        let actions = Tensor::randn([8, 3], (Kind::Float, Device::Cpu));

        let q = critic.forward(&states, &actions);
        assert_eq!(q.size(), [8, 1]);
    }

    #[test]
    fn test_twin_critics_are_independent() {
        let c1 = CriticNetwork::new(4, 2, 16, 16, 1e-3, Device::Cpu).unwrap();
        let c2 = CriticNetwork::new(4, 2, 16, 16, 1e-3, Device::Cpu).unwrap();

        let vars1 = c1.var_store().variables();
        let vars2 = c2.var_store().variables();
        // Independent random initializations: same names, different values.
        assert_eq!(vars1.len(), vars2.len());
        assert!(vars1.iter().any(|(k, v)| !v.equal(vars2.get(k).unwrap())));
    }
}
