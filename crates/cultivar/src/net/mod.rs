//! Function approximators for the TD3 agent.
//!
//! Provides:
//! - `ActorNetwork` - deterministic policy with bounded outputs
//! - `CriticNetwork` - scalar Q-value estimator over (state, action)

mod actor;
mod critic;

pub use actor::ActorNetwork;
pub use critic::CriticNetwork;

use tch::nn;

/// Trait for networks that expose their parameter store.
///
/// The store is the seam for soft target updates and checkpoint
/// persistence: parameters are addressed as a mapping from name to tensor.
pub trait HasVarStore {
    /// Get reference to the VarStore
    fn var_store(&self) -> &nn::VarStore;

    /// Get mutable reference to the VarStore
    fn var_store_mut(&mut self) -> &mut nn::VarStore;
}

/// In-place exponential blend of target parameters toward their source:
/// `target ← tau·source + (1 - tau)·target`, per named tensor.
///
/// `tau = 1.0` degenerates to a full copy; source and target must have been
/// built with identical layer shapes.
pub fn soft_update<N: HasVarStore>(source: &N, target: &N, tau: f64) {
    let src = source.var_store().variables();
    tch::no_grad(|| {
        for (name, mut dst) in target.var_store().variables() {
            let s = src
                .get(&name)
                .expect("source and target parameter sets must match");
            let blended = tau * s + (1.0 - tau) * &dst;
            dst.copy_(&blended);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::Device;

    fn params_equal<N: HasVarStore>(a: &N, b: &N) -> bool {
        let left = a.var_store().variables();
        let right = b.var_store().variables();
        left.len() == right.len()
            && left.iter().all(|(name, t)| match right.get(name) {
                Some(other) => t.equal(other),
                None => false,
            })
    }

    #[test]
    fn test_soft_update_full_copy() {
        let a = ActorNetwork::new(3, 2, 16, 16, 1e-3, Device::Cpu).unwrap();
        let b = ActorNetwork::new(3, 2, 16, 16, 1e-3, Device::Cpu).unwrap();
        assert!(!params_equal(&a, &b));

        soft_update(&a, &b, 1.0);
        assert!(params_equal(&a, &b));
    }

    #[test]
    fn test_soft_update_blend() {
        let a = CriticNetwork::new(3, 2, 16, 16, 1e-3, Device::Cpu).unwrap();
        let b = CriticNetwork::new(3, 2, 16, 16, 1e-3, Device::Cpu).unwrap();

        let before: Vec<(String, tch::Tensor)> = b
            .var_store()
            .variables()
            .iter()
            .map(|(k, v)| (k.clone(), v.copy()))
            .collect();

        soft_update(&a, &b, 0.25);

        let src = a.var_store().variables();
        let after = b.var_store().variables();
        for (name, old) in before {
            let expected = 0.25 * src.get(&name).unwrap() + 0.75 * &old;
            assert!(after.get(&name).unwrap().allclose(&expected, 1e-6, 1e-6, false));
        }
    }
}
