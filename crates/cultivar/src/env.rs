//! Core environment trait definition.
//!
//! Simulators plug into the training stack by implementing `ControlEnv`:
//! a reset/step interface over flat observation vectors and bounded
//! continuous action vectors.

use ndarray::Array1;

/// Auxiliary metrics attached to a step by the environment.
///
/// Whatever the terminal step of an episode carries is forwarded by the
/// training session to the metric sink under that episode's index, so a
/// simulator can surface domain readings (episode length, stress indices,
/// yield proxies) without widening the trait.
#[derive(Clone, Debug, Default)]
pub struct EnvInfo {
    metrics: smallvec::SmallVec<[(&'static str, f32); 4]>,
}

impl EnvInfo {
    /// Create empty info
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one named metric.
    pub fn with_metric(mut self, key: &'static str, value: f32) -> Self {
        self.metrics.push((key, value));
        self
    }

    /// Iterate the attached metrics in insertion order.
    pub fn metrics(&self) -> impl Iterator<Item = (&'static str, f32)> + '_ {
        self.metrics.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

/// Result from a single environment step
#[derive(Clone, Debug)]
pub struct StepResult {
    /// Observation after the step
    pub observation: Array1<f32>,
    /// Reward received
    pub reward: f32,
    /// Whether the episode is over
    pub done: bool,
    /// Additional info
    pub info: EnvInfo,
}

/// Core trait for environments driven by the training session.
///
/// Observations are flat `f32` vectors; actions are continuous vectors with
/// one shared scalar bound across dimensions.
///
/// # Example
///
/// ```rust,ignore
/// use cultivar::env::{ControlEnv, EnvInfo, StepResult};
/// use ndarray::Array1;
///
/// struct MyEnv {
///     state: f32,
/// }
///
/// impl ControlEnv for MyEnv {
///     fn observation_dim(&self) -> usize { 1 }
///     fn action_dim(&self) -> usize { 1 }
///     fn action_low(&self) -> f32 { -1.0 }
///     fn action_high(&self) -> f32 { 1.0 }
///
///     fn reset(&mut self) -> Array1<f32> {
///         self.state = 0.0;
///         Array1::from(vec![self.state])
///     }
///
///     fn step(&mut self, action: &Array1<f32>) -> StepResult {
///         // ... implement step logic
///     }
/// }
/// ```
pub trait ControlEnv {
    /// Width of the observation vector
    fn observation_dim(&self) -> usize;

    /// Width of the action vector
    fn action_dim(&self) -> usize;

    /// Lower action bound, uniform across dimensions
    fn action_low(&self) -> f32;

    /// Upper action bound, uniform across dimensions
    fn action_high(&self) -> f32;

    /// Reward range `(low, high)`. Only the lower bound is consumed, as the
    /// initial best-score threshold for checkpointing.
    fn reward_range(&self) -> (f32, f32) {
        (f32::NEG_INFINITY, f32::INFINITY)
    }

    /// Reset the environment and return the initial observation
    fn reset(&mut self) -> Array1<f32>;

    /// Take a single step in the environment
    fn step(&mut self, action: &Array1<f32>) -> StepResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_info_metrics_keep_insertion_order() {
        let info = EnvInfo::new()
            .with_metric("episode_length", 40.0)
            .with_metric("stress", 0.3);

        let collected: Vec<_> = info.metrics().collect();
        assert_eq!(collected, vec![("episode_length", 40.0), ("stress", 0.3)]);
        assert!(!info.is_empty());
        assert!(EnvInfo::new().is_empty());
    }
}
