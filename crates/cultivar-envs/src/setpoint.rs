//! Setpoint-tracking environment.

use cultivar::env::{ControlEnv, EnvInfo, StepResult};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Setpoint-tracking environment
///
/// An internal level vector starts at zero and moves by a fraction of the
/// commanded adjustment each step. The reward is the negative squared
/// distance between the levels and a setpoint drawn at reset, so an
/// optimal policy steers the levels onto the setpoint and holds them
/// there. Episodes end after a fixed horizon.
///
/// Observation: `[levels..., setpoint...]`
/// Action: adjustment per level, in `[-1, 1]`
pub struct Setpoint {
    size: usize,
    gain: f32,
    max_steps: u32,

    level: Vec<f32>,
    target: Vec<f32>,
    steps: u32,
    rng: StdRng,
}

impl Setpoint {
    /// Create a new environment with `size` independent levels.
    pub fn new(size: usize) -> Self {
        Self::build(size, StdRng::from_entropy())
    }

    /// Create an environment with a deterministic setpoint sequence.
    pub fn seeded(size: usize, seed: u64) -> Self {
        Self::build(size, StdRng::seed_from_u64(seed))
    }

    fn build(size: usize, rng: StdRng) -> Self {
        Self {
            size,
            gain: 0.1,
            max_steps: 200,
            level: vec![0.0; size],
            target: vec![0.0; size],
            steps: 0,
            rng,
        }
    }

    fn observation(&self) -> Array1<f32> {
        let mut obs = Vec::with_capacity(self.size * 2);
        obs.extend_from_slice(&self.level);
        obs.extend_from_slice(&self.target);
        Array1::from(obs)
    }

    fn distance_sq(&self) -> f32 {
        self.level
            .iter()
            .zip(self.target.iter())
            .map(|(l, t)| (l - t).powi(2))
            .sum()
    }
}

impl ControlEnv for Setpoint {
    fn observation_dim(&self) -> usize {
        self.size * 2
    }

    fn action_dim(&self) -> usize {
        self.size
    }

    fn action_low(&self) -> f32 {
        -1.0
    }

    fn action_high(&self) -> f32 {
        1.0
    }

    fn reward_range(&self) -> (f32, f32) {
        // Worst case per step: every level at one bound, target at the other.
        let worst = -(self.size as f32) * 4.0 * self.max_steps as f32;
        (worst, 0.0)
    }

    fn reset(&mut self) -> Array1<f32> {
        self.level = vec![0.0; self.size];
        self.target = (0..self.size)
            .map(|_| self.rng.gen::<f32>() * 2.0 - 1.0)
            .collect();
        self.steps = 0;

        self.observation()
    }

    fn step(&mut self, action: &Array1<f32>) -> StepResult {
        for (level, &a) in self.level.iter_mut().zip(action.iter()) {
            *level = (*level + self.gain * a.clamp(-1.0, 1.0)).clamp(-2.0, 2.0);
        }
        self.steps += 1;

        let reward = -self.distance_sq();
        let done = self.steps >= self.max_steps;

        let mut info = EnvInfo::new();
        if done {
            info = info
                .with_metric("episode_length", self.steps as f32)
                .with_metric("final_distance_sq", self.distance_sq());
        }

        StepResult {
            observation: self.observation(),
            reward,
            done,
            info,
        }
    }
}
