//! Training-session configuration.

use serde::{Deserialize, Serialize};

use crate::td3::Td3Config;

/// Configuration for a training run
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Agent hyperparameters
    pub agent: Td3Config,
    /// Total episode budget
    pub episodes: usize,
    /// Plateau patience window, in episodes
    pub patience: usize,
    /// Free-form label attached to the run
    pub run_label: String,
    /// Directory for the best-model parameter blobs
    pub checkpoint_dir: String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            agent: Td3Config::default(),
            episodes: 10_000,
            patience: 1_000,
            run_label: String::new(),
            checkpoint_dir: "checkpoints".to_string(),
        }
    }
}

impl TrainConfig {
    /// Set the episode budget
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    /// Set the plateau patience window
    pub fn with_patience(mut self, patience: usize) -> Self {
        self.patience = patience;
        self
    }

    /// Set the run label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.run_label = label.into();
        self
    }
}
