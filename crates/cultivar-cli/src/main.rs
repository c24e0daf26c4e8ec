//! Cultivar CLI
//!
//! Command-line interface for training and evaluating TD3 agents.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tch::Device;
use tracing_subscriber::EnvFilter;

use cultivar::prelude::*;
use cultivar_envs::Setpoint;

#[derive(Parser)]
#[command(name = "cultivar")]
#[command(version, about = "TD3 training for simulated control environments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TrainArgs {
    /// Environment name
    #[arg(default_value = "setpoint")]
    env: String,

    /// Learning rate for the actor
    #[arg(long, default_value = "0.001")]
    alpha: f64,

    /// Learning rate for the critics
    #[arg(long, default_value = "0.001")]
    beta: f64,

    /// Soft-update rate for the target networks
    #[arg(long, default_value = "0.005")]
    tau: f64,

    /// Update the actor every N critic updates
    #[arg(long, default_value = "2")]
    update_actor_interval: usize,

    /// Batch size for actor & critic training
    #[arg(long, default_value = "100")]
    batch_size: usize,

    /// Layer 1 size (same for actor & critics)
    #[arg(long, default_value = "400")]
    layer1_size: i64,

    /// Layer 2 size (same for actor & critics)
    #[arg(long, default_value = "300")]
    layer2_size: i64,

    /// Total number of episodes
    #[arg(long, default_value = "10000")]
    episodes: usize,

    /// Patience for plateau checking
    #[arg(long, default_value = "1000")]
    patience: usize,

    /// Free-form note appended to the run name
    #[arg(long, default_value = "")]
    note: String,

    /// Directory for best-model checkpoints
    #[arg(long, default_value = "checkpoints")]
    checkpoint_dir: String,

    /// Root directory for TensorBoard event files
    #[arg(long, default_value = "runs")]
    log_dir: String,

    /// JSON file with a full training configuration; hyperparameter flags
    /// are ignored when given
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train an agent
    Train(TrainArgs),

    /// Evaluate a trained agent from its checkpoints
    Eval {
        /// Environment name
        #[arg(default_value = "setpoint")]
        env: String,

        /// Directory holding the six parameter blobs
        #[arg(long, default_value = "checkpoints")]
        checkpoint_dir: String,

        /// Number of episodes
        #[arg(long, default_value = "10")]
        episodes: usize,
    },

    /// List available environments
    List,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => train(args),
        Commands::Eval {
            env,
            checkpoint_dir,
            episodes,
        } => eval(&env, &checkpoint_dir, episodes),
        Commands::List => {
            list_envs();
            Ok(())
        }
    }
}

fn make_env(name: &str) -> Result<Setpoint> {
    match name {
        "setpoint" => Ok(Setpoint::new(4)),
        other => bail!("unknown environment: {}", other),
    }
}

fn list_envs() {
    println!("Available environments:");
    println!("  setpoint - drive a level vector onto a random setpoint");
}

fn train_config(args: &TrainArgs) -> Result<TrainConfig> {
    if let Some(path) = &args.config {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: TrainConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        tracing::warn!("--config given; hyperparameter flags are ignored");
        return Ok(config);
    }

    let agent = Td3Config::default()
        .with_lr(args.alpha, args.beta)
        .with_batch_size(args.batch_size);
    let agent = Td3Config {
        tau: args.tau,
        update_actor_interval: args.update_actor_interval,
        layer1_size: args.layer1_size,
        layer2_size: args.layer2_size,
        ..agent
    };

    Ok(TrainConfig {
        agent,
        episodes: args.episodes,
        patience: args.patience,
        run_label: args.note.clone(),
        checkpoint_dir: args.checkpoint_dir.clone(),
    })
}

/// Compose the per-run directory name from the environment, the
/// hyperparameters, and a timestamp, plus the free-form label if any.
fn run_name(env: &str, config: &TrainConfig, timestamp: &str) -> String {
    let mut name = format!(
        "td3_{}_alpha_{}_beta_{}_tau_{}_interval_{}_batch_{}_l1_{}_l2_{}_episodes_{}_patience_{}_{}",
        env,
        config.agent.actor_lr,
        config.agent.critic_lr,
        config.agent.tau,
        config.agent.update_actor_interval,
        config.agent.batch_size,
        config.agent.layer1_size,
        config.agent.layer2_size,
        config.episodes,
        config.patience,
        timestamp,
    );

    if !config.run_label.is_empty() {
        name.push('_');
        name.push_str(&config.run_label);
    }

    name
}

fn train(args: TrainArgs) -> Result<()> {
    let env = make_env(&args.env)?;
    let config = train_config(&args)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M").to_string();
    let run = run_name(&args.env, &config, &timestamp);
    let event_dir = Path::new(&args.log_dir).join(&run);
    tracing::info!(run = %run, "Starting training");

    let mut sink = MultiSink::new(vec![Box::new(ConsoleSink)]);
    sink.push(Box::new(TensorBoardSink::new(&event_dir)));

    let mut session = TrainSession::new(env, config, &sink, Device::Cpu)?;
    let report = session.run()?;

    tracing::info!(
        episodes = report.episodes,
        best_score = report.best_score,
        plateaued = report.plateaued,
        "Training finished"
    );
    tracing::info!(events = %event_dir.display(), "TensorBoard events written");

    Ok(())
}

fn eval(env_name: &str, checkpoint_dir: &str, episodes: usize) -> Result<()> {
    let mut env = make_env(env_name)?;
    let store = CheckpointStore::new(checkpoint_dir)?;
    if !store.contains("actor") {
        bail!("no actor checkpoint found in {}", checkpoint_dir);
    }

    let config = Td3Config::default().deterministic();
    let mut agent = Td3Agent::new(config, &env, Device::Cpu)?;
    agent.load_models(&store)?;

    let mut returns = Vec::with_capacity(episodes);
    for episode in 0..episodes {
        let mut obs = env.reset();
        let mut reward_sum = 0.0f32;
        loop {
            let action = agent.policy_action(&obs);
            let step = env.step(&action);
            reward_sum += step.reward;
            obs = step.observation;
            if step.done {
                break;
            }
        }
        tracing::info!(episode, score = reward_sum, "Evaluation episode");
        returns.push(reward_sum as f64);
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    tracing::info!(episodes, mean_return = mean, "Evaluation complete");

    Ok(())
}
