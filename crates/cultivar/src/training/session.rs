//! Episode-driven training loop.

use indicatif::{ProgressBar, ProgressStyle};
use tch::Device;

use super::config::TrainConfig;
use super::plateau::has_plateaued;
use crate::checkpoint::CheckpointStore;
use crate::env::{ControlEnv, EnvInfo};
use crate::log::MetricSink;
use crate::td3::Td3Agent;
use crate::Result;

/// Trailing window for the reward moving average.
const REWARD_WINDOW: usize = 100;

/// Outcome of a completed training run.
#[derive(Clone, Debug)]
pub struct TrainReport {
    /// Episodes actually run (≤ the configured budget)
    pub episodes: usize,
    /// Best trailing average seen
    pub best_score: f64,
    /// Whether the run ended on a reward plateau rather than the budget
    pub plateaued: bool,
}

/// Drives episodes against one environment and owns the run-scoped state:
/// the reward history, its trailing averages, and the best score used as
/// the checkpoint-triggering threshold.
///
/// A checkpoint of all six networks is written whenever the trailing
/// average improves on the best seen so far (checkpoint-on-improvement,
/// not periodic). The run stops early once the trailing averages plateau.
pub struct TrainSession<'a, E: ControlEnv> {
    env: E,
    agent: Td3Agent,
    config: TrainConfig,
    sink: &'a dyn MetricSink,
    checkpoints: CheckpointStore,
    reward_history: Vec<f32>,
    mean_history: Vec<f32>,
    best_score: f64,
}

impl<'a, E: ControlEnv> TrainSession<'a, E> {
    pub fn new(
        env: E,
        config: TrainConfig,
        sink: &'a dyn MetricSink,
        device: Device,
    ) -> Result<Self> {
        let agent = Td3Agent::new(config.agent.clone(), &env, device)?;
        let checkpoints = CheckpointStore::new(&config.checkpoint_dir)?;
        // The environment's worst case seeds the improvement threshold.
        let best_score = env.reward_range().0 as f64;

        Ok(Self {
            env,
            agent,
            config,
            sink,
            checkpoints,
            reward_history: Vec::new(),
            mean_history: Vec::new(),
            best_score,
        })
    }

    /// Run until the episode budget is exhausted or the reward plateaus.
    pub fn run(&mut self) -> Result<TrainReport> {
        let progress = ProgressBar::new(self.config.episodes as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut plateaued = false;
        let mut episodes_run = 0;

        for episode in 0..self.config.episodes {
            let outcome = self.run_episode();
            episodes_run = episode + 1;

            self.reward_history.push(outcome.reward_sum);
            let avg = trailing_mean(&self.reward_history, REWARD_WINDOW);
            self.mean_history.push(avg as f32);

            let step = episode as u64;
            self.sink.scalar("episode_reward", outcome.reward_sum as f64, step);
            self.sink.scalar("trailing_100_avg", avg, step);
            if let Some(loss) = outcome.critic_loss {
                self.sink.scalar("critic_loss", loss, step);
            }
            if let Some(loss) = outcome.actor_loss {
                self.sink.scalar("actor_loss", loss, step);
            }
            // Domain readings the simulator attached to the terminal step.
            for (key, value) in outcome.terminal_info.metrics() {
                self.sink.scalar(key, value as f64, step);
            }

            if avg > self.best_score {
                self.best_score = avg;
                self.agent.save_models(&self.checkpoints)?;
                tracing::info!(
                    episode,
                    best_score = self.best_score,
                    "New best trailing average; checkpointed"
                );
            }
            self.sink.scalar("best_score_so_far", self.best_score, step);

            progress.set_position(episodes_run as u64);
            progress.set_message(format!("score {:.2} avg {:.2}", outcome.reward_sum, avg));

            if has_plateaued(&self.mean_history, self.config.patience) {
                tracing::info!(
                    episode,
                    patience = self.config.patience,
                    "Reward plateau reached; stopping"
                );
                plateaued = true;
                break;
            }
        }

        progress.finish_with_message(if plateaued {
            "plateaued"
        } else {
            "episode budget exhausted"
        });
        self.sink.flush();

        Ok(TrainReport {
            episodes: episodes_run,
            best_score: self.best_score,
            plateaued,
        })
    }

    /// One RESET → (STEP)* → DONE cycle. Every step selects an action,
    /// advances the environment, stores the transition, and invokes a
    /// learning update.
    fn run_episode(&mut self) -> EpisodeOutcome {
        let mut obs = self.env.reset();
        let mut reward_sum = 0.0f32;
        let mut critic_losses = MeanAcc::default();
        let mut actor_losses = MeanAcc::default();

        let terminal_info = loop {
            let action = self.agent.choose_action(&obs);
            let step = self.env.step(&action);

            self.agent
                .remember(&obs, &action, step.reward, &step.observation, step.done);
            if let Some(metrics) = self.agent.learn() {
                critic_losses.push(metrics.critic_loss);
                if let Some(loss) = metrics.actor_loss {
                    actor_losses.push(loss);
                }
            }

            reward_sum += step.reward;
            let done = step.done;
            obs = step.observation;

            if done {
                break step.info;
            }
        };

        EpisodeOutcome {
            reward_sum,
            terminal_info,
            critic_loss: critic_losses.mean(),
            actor_loss: actor_losses.mean(),
        }
    }

    /// Agent trained by this session.
    pub fn agent(&self) -> &Td3Agent {
        &self.agent
    }

    /// Per-episode returns recorded so far.
    pub fn reward_history(&self) -> &[f32] {
        &self.reward_history
    }
}

/// What one episode produced: its return, the info attached to its
/// terminal step, and the mean losses over the learn calls that ran.
struct EpisodeOutcome {
    reward_sum: f32,
    terminal_info: EnvInfo,
    critic_loss: Option<f64>,
    actor_loss: Option<f64>,
}

fn trailing_mean(history: &[f32], window: usize) -> f64 {
    let tail = &history[history.len().saturating_sub(window)..];
    tail.iter().map(|&r| r as f64).sum::<f64>() / tail.len() as f64
}

#[derive(Default)]
struct MeanAcc {
    sum: f64,
    count: u64,
}

impl MeanAcc {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}
