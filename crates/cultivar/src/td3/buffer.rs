//! Replay memory for off-policy learning.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fixed-capacity circular store of past transitions.
///
/// Transitions are held in parallel arrays indexed identically: row `i`
/// of every array describes the same transition. The write cursor is a
/// monotonic counter taken modulo the capacity, so once full the oldest
/// entries are overwritten in FIFO order. Storage is allocated once at
/// construction and never shrinks.
pub struct ReplayBuffer {
    states: Array2<f32>,
    actions: Array2<f32>,
    rewards: Array1<f32>,
    next_states: Array2<f32>,
    dones: Vec<bool>,
    capacity: usize,
    counter: usize,
    rng: StdRng,
}

/// A minibatch of transitions as parallel arrays.
pub struct TransitionBatch {
    pub states: Array2<f32>,
    pub actions: Array2<f32>,
    pub rewards: Array1<f32>,
    pub next_states: Array2<f32>,
    pub dones: Vec<bool>,
}

impl ReplayBuffer {
    /// Create a buffer for `capacity` transitions of the given widths.
    pub fn new(capacity: usize, obs_dim: usize, action_dim: usize) -> Self {
        Self::build(capacity, obs_dim, action_dim, StdRng::from_entropy())
    }

    /// Create a buffer with a deterministic sampling sequence.
    pub fn with_seed(capacity: usize, obs_dim: usize, action_dim: usize, seed: u64) -> Self {
        Self::build(capacity, obs_dim, action_dim, StdRng::seed_from_u64(seed))
    }

    fn build(capacity: usize, obs_dim: usize, action_dim: usize, rng: StdRng) -> Self {
        assert!(capacity > 0, "replay capacity must be positive");
        Self {
            states: Array2::zeros((capacity, obs_dim)),
            actions: Array2::zeros((capacity, action_dim)),
            rewards: Array1::zeros(capacity),
            next_states: Array2::zeros((capacity, obs_dim)),
            dones: vec![false; capacity],
            capacity,
            counter: 0,
            rng,
        }
    }

    /// Write one transition at the cursor position, overwriting whatever
    /// was there. The counter increments unconditionally; overflow is not
    /// an error.
    pub fn store(
        &mut self,
        state: ArrayView1<f32>,
        action: ArrayView1<f32>,
        reward: f32,
        next_state: ArrayView1<f32>,
        done: bool,
    ) {
        let index = self.counter % self.capacity;
        self.states.row_mut(index).assign(&state);
        self.actions.row_mut(index).assign(&action);
        self.rewards[index] = reward;
        self.next_states.row_mut(index).assign(&next_state);
        self.dones[index] = done;

        self.counter += 1;
    }

    /// Number of transitions currently stored.
    pub fn len(&self) -> usize {
        self.counter.min(self.capacity)
    }

    pub fn is_empty(&self) -> bool {
        self.counter == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Draw `batch_size` transitions uniformly at random with replacement
    /// from the stored range.
    ///
    /// Callers must ensure at least one transition is stored; the agent
    /// guards by skipping learning until `len() >= batch_size`.
    pub fn sample(&mut self, batch_size: usize) -> TransitionBatch {
        let filled = self.len();
        let indices: Vec<usize> = (0..batch_size)
            .map(|_| self.rng.gen_range(0..filled))
            .collect();

        TransitionBatch {
            states: self.states.select(Axis(0), &indices),
            actions: self.actions.select(Axis(0), &indices),
            rewards: self.rewards.select(Axis(0), &indices),
            next_states: self.next_states.select(Axis(0), &indices),
            dones: indices.iter().map(|&i| self.dones[i]).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fill(buffer: &mut ReplayBuffer, tag: f32) {
        let state = array![tag, tag];
        let action = array![tag * 2.0];
        let next = array![tag + 0.5, tag + 0.5];
        buffer.store(state.view(), action.view(), tag, next.view(), false);
    }

    #[test]
    fn test_sample_draws_only_stored_entries() {
        let mut buffer = ReplayBuffer::with_seed(8, 2, 1, 42);
        for i in 0..3 {
            fill(&mut buffer, i as f32);
        }
        assert_eq!(buffer.len(), 3);

        let batch = buffer.sample(64);
        for row in batch.states.rows() {
            assert!(row[0] >= 0.0 && row[0] <= 2.0);
            assert_eq!(row[0].fract(), 0.0);
        }
    }

    #[test]
    fn test_wraparound_overwrites_oldest() {
        let mut buffer = ReplayBuffer::with_seed(4, 2, 1, 42);
        for i in 0..6 {
            fill(&mut buffer, i as f32);
        }
        // Entries 0 and 1 were overwritten by 4 and 5.
        assert_eq!(buffer.len(), 4);

        let batch = buffer.sample(128);
        for row in batch.states.rows() {
            assert!(row[0] >= 2.0, "stale entry {} still observable", row[0]);
        }
    }

    #[test]
    fn test_parallel_arrays_stay_aligned() {
        let mut buffer = ReplayBuffer::with_seed(16, 2, 1, 7);
        for i in 0..10 {
            fill(&mut buffer, i as f32);
        }

        let batch = buffer.sample(32);
        for (i, row) in batch.states.rows().into_iter().enumerate() {
            let tag = row[0];
            assert_eq!(batch.actions[[i, 0]], tag * 2.0);
            assert_eq!(batch.rewards[i], tag);
            assert_eq!(batch.next_states[[i, 0]], tag + 0.5);
            assert!(!batch.dones[i]);
        }
    }

    #[test]
    fn test_counter_is_monotonic_across_wrap() {
        let mut buffer = ReplayBuffer::with_seed(2, 1, 1, 0);
        let s = array![0.0];
        for _ in 0..5 {
            buffer.store(s.view(), s.view(), 0.0, s.view(), true);
        }
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.capacity(), 2);
        assert!(!buffer.is_empty());
    }
}
