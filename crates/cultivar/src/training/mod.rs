//! Training loop for the TD3 agent.
//!
//! Provides:
//! - `TrainSession` - episode loop with checkpoint-on-improvement
//! - `TrainConfig` - session configuration
//! - `has_plateaued` - early-stopping criterion on trailing averages

mod config;
mod plateau;
mod session;

pub use config::TrainConfig;
pub use plateau::has_plateaued;
pub use session::{TrainReport, TrainSession};
