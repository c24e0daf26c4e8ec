//! TD3 agent: action selection, experience ingestion, learning updates.

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tch::{Device, Kind, Reduction, Tensor};

use super::buffer::ReplayBuffer;
use super::config::Td3Config;
use crate::checkpoint::CheckpointStore;
use crate::env::ControlEnv;
use crate::net::{soft_update, ActorNetwork, CriticNetwork};
use crate::Result;

/// Loss values from one learning update.
///
/// `actor_loss` is present only on the delayed steps where the actor was
/// updated.
#[derive(Clone, Copy, Debug)]
pub struct LearnMetrics {
    pub critic_loss: f64,
    pub actor_loss: Option<f64>,
}

/// Off-policy actor-critic agent with twin critics, delayed actor updates
/// and target policy smoothing.
///
/// The agent owns six networks: the trained actor and twin critics plus a
/// target copy of each. Target parameters are never touched by gradient
/// descent; they only track their source through exponential smoothing
/// (`update_network_parameters`). Action bounds are read once from the
/// environment at construction.
pub struct Td3Agent {
    actor: ActorNetwork,
    critic_1: CriticNetwork,
    critic_2: CriticNetwork,
    target_actor: ActorNetwork,
    target_critic_1: CriticNetwork,
    target_critic_2: CriticNetwork,

    memory: ReplayBuffer,
    config: Td3Config,

    min_action: f32,
    max_action: f32,
    action_dim: usize,

    time_step: usize,
    learn_step_counter: usize,

    device: Device,
    rng: StdRng,
}

impl Td3Agent {
    /// Build the six networks and the replay memory, then hard-sync every
    /// target network to its source (`tau = 1`).
    pub fn new(config: Td3Config, env: &dyn ControlEnv, device: Device) -> Result<Self> {
        if let Some(seed) = config.seed {
            tch::manual_seed(seed as i64);
        }

        let obs_dim = env.observation_dim() as i64;
        let action_dim = env.action_dim();
        let (fc1, fc2) = (config.layer1_size, config.layer2_size);

        let actor = ActorNetwork::new(obs_dim, action_dim as i64, fc1, fc2, config.actor_lr, device)?;
        let critic_1 =
            CriticNetwork::new(obs_dim, action_dim as i64, fc1, fc2, config.critic_lr, device)?;
        let critic_2 =
            CriticNetwork::new(obs_dim, action_dim as i64, fc1, fc2, config.critic_lr, device)?;
        let target_actor =
            ActorNetwork::new(obs_dim, action_dim as i64, fc1, fc2, config.actor_lr, device)?;
        let target_critic_1 =
            CriticNetwork::new(obs_dim, action_dim as i64, fc1, fc2, config.critic_lr, device)?;
        let target_critic_2 =
            CriticNetwork::new(obs_dim, action_dim as i64, fc1, fc2, config.critic_lr, device)?;

        let memory = match config.seed {
            Some(seed) => ReplayBuffer::with_seed(
                config.buffer_capacity,
                obs_dim as usize,
                action_dim,
                seed,
            ),
            None => ReplayBuffer::new(config.buffer_capacity, obs_dim as usize, action_dim),
        };

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut agent = Self {
            actor,
            critic_1,
            critic_2,
            target_actor,
            target_critic_1,
            target_critic_2,
            memory,
            min_action: env.action_low(),
            max_action: env.action_high(),
            action_dim,
            time_step: 0,
            learn_step_counter: 0,
            device,
            rng,
            config,
        };

        // The only hard sync; afterwards targets move by smoothing alone.
        agent.update_network_parameters(1.0);

        Ok(agent)
    }

    /// Select an action for `observation`.
    ///
    /// During the warmup phase the policy is ignored entirely and the
    /// action is pure Gaussian exploration. In both phases independent
    /// Gaussian noise is added per component and the result is clamped to
    /// the environment's action bounds, so the returned vector is always
    /// in range. The internal step counter advances unconditionally.
    pub fn choose_action(&mut self, observation: &Array1<f32>) -> Array1<f32> {
        let noise = Normal::new(0.0f32, self.config.exploration_noise as f32)
            .expect("exploration noise std must be non-negative");

        let mut action: Vec<f32> = if self.time_step < self.config.warmup {
            let n = self.action_dim;
            (0..n).map(|_| noise.sample(&mut self.rng)).collect()
        } else {
            let obs = Tensor::from_slice(observation.as_slice().unwrap())
                .to_device(self.device)
                .unsqueeze(0);
            let mu = tch::no_grad(|| self.actor.forward(&obs)).squeeze_dim(0);
            Vec::<f32>::try_from(&mu).expect("action tensor must be rank 1")
        };

        for a in action.iter_mut() {
            *a = (*a + noise.sample(&mut self.rng)).clamp(self.min_action, self.max_action);
        }

        self.time_step += 1;

        Array1::from(action)
    }

    /// Greedy policy output clamped to the action bounds: no exploration
    /// noise, no step-counter side effects. Used for evaluation rollouts.
    pub fn policy_action(&self, observation: &Array1<f32>) -> Array1<f32> {
        let obs = Tensor::from_slice(observation.as_slice().unwrap())
            .to_device(self.device)
            .unsqueeze(0);
        let mu = tch::no_grad(|| self.actor.forward(&obs)).squeeze_dim(0);
        let action: Vec<f32> = Vec::<f32>::try_from(&mu).expect("action tensor must be rank 1");

        Array1::from(
            action
                .into_iter()
                .map(|a| a.clamp(self.min_action, self.max_action))
                .collect::<Vec<_>>(),
        )
    }

    /// Record one transition in the replay memory.
    pub fn remember(
        &mut self,
        state: &Array1<f32>,
        action: &Array1<f32>,
        reward: f32,
        next_state: &Array1<f32>,
        done: bool,
    ) {
        self.memory
            .store(state.view(), action.view(), reward, next_state.view(), done);
    }

    /// Number of transitions currently in the replay memory.
    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Run one learning update, or nothing at all if fewer than
    /// `batch_size` transitions are stored (a silent no-op, not an error).
    ///
    /// Every call that proceeds updates both critics against a shared
    /// stop-gradient target; the actor and the three target networks move
    /// only every `update_actor_interval`-th call.
    pub fn learn(&mut self) -> Option<LearnMetrics> {
        if self.memory.len() < self.config.batch_size {
            return None;
        }

        let batch = self.memory.sample(self.config.batch_size);
        let states = self.to_tensor(&batch.states);
        let actions = self.to_tensor(&batch.actions);
        let next_states = self.to_tensor(&batch.next_states);
        let rewards =
            Tensor::from_slice(batch.rewards.as_slice().unwrap()).to_device(self.device);
        let not_done: Vec<f32> = batch
            .dones
            .iter()
            .map(|&d| if d { 0.0 } else { 1.0 })
            .collect();
        let not_done = Tensor::from_slice(&not_done).to_device(self.device);

        let target = self.critic_targets(&rewards, &next_states, &not_done);

        self.critic_1.optimizer.zero_grad();
        self.critic_2.optimizer.zero_grad();

        let q1 = self.critic_1.forward(&states, &actions);
        let q2 = self.critic_2.forward(&states, &actions);

        // Both critics regress on the shared target through one summed
        // loss and one backward pass, then step their own optimizers.
        let critic_loss =
            q1.mse_loss(&target, Reduction::Mean) + q2.mse_loss(&target, Reduction::Mean);
        critic_loss.backward();
        self.critic_1.optimizer.step();
        self.critic_2.optimizer.step();
        let critic_loss_val = critic_loss.double_value(&[]);

        self.learn_step_counter += 1;

        let mut actor_loss_val = None;
        if self.learn_step_counter % self.config.update_actor_interval == 0 {
            self.actor.optimizer.zero_grad();
            // Ascend critic_1's estimate of the actor's own actions. The
            // pass leaves gradients in critic_1 as well; they are cleared
            // by the next critic zero_grad and never stepped.
            let q = self.critic_1.forward(&states, &self.actor.forward(&states));
            let actor_loss = -q.mean(Kind::Float);
            actor_loss.backward();
            self.actor.optimizer.step();
            actor_loss_val = Some(actor_loss.double_value(&[]));

            self.update_network_parameters(self.config.tau);
        }

        Some(LearnMetrics {
            critic_loss: critic_loss_val,
            actor_loss: actor_loss_val,
        })
    }

    /// Regression targets `r + γ·min(Q'₁, Q'₂)(s', a'_smoothed)`, with the
    /// continuation value forced to zero on terminal transitions.
    ///
    /// Target actions come from the target actor perturbed by clipped
    /// Gaussian smoothing noise and clamped to the action bounds. The whole
    /// computation runs with gradients disabled, so target-network outputs
    /// are never backpropagated through.
    fn critic_targets(&self, rewards: &Tensor, next_states: &Tensor, not_done: &Tensor) -> Tensor {
        tch::no_grad(|| {
            let target_actions = self.target_actor.forward(next_states);
            let smoothing = (Tensor::randn_like(&target_actions) * self.config.target_noise)
                .clamp(-self.config.target_noise_clip, self.config.target_noise_clip);
            let target_actions = (target_actions + smoothing)
                .clamp(self.min_action as f64, self.max_action as f64);

            let q1 = self
                .target_critic_1
                .forward(next_states, &target_actions)
                .squeeze_dim(-1);
            let q2 = self
                .target_critic_2
                .forward(next_states, &target_actions)
                .squeeze_dim(-1);
            let min_q = q1.minimum(&q2) * not_done;

            (rewards + min_q * self.config.gamma).reshape([-1, 1])
        })
    }

    /// Blend every target parameter toward its source:
    /// `θ' ← τ·θ + (1 - τ)·θ'`, applied independently to the actor and
    /// both critics. `tau = 1.0` is the hard copy used once at
    /// construction.
    pub fn update_network_parameters(&mut self, tau: f64) {
        soft_update(&self.actor, &self.target_actor, tau);
        soft_update(&self.critic_1, &self.target_critic_1, tau);
        soft_update(&self.critic_2, &self.target_critic_2, tau);
    }

    /// Persist all six parameter sets under their fixed names.
    pub fn save_models(&self, store: &CheckpointStore) -> Result<()> {
        store.save("actor", &self.actor)?;
        store.save("critic_1", &self.critic_1)?;
        store.save("critic_2", &self.critic_2)?;
        store.save("target_actor", &self.target_actor)?;
        store.save("target_critic_1", &self.target_critic_1)?;
        store.save("target_critic_2", &self.target_critic_2)?;
        Ok(())
    }

    /// Restore all six parameter sets from their fixed names.
    pub fn load_models(&mut self, store: &CheckpointStore) -> Result<()> {
        store.load("actor", &mut self.actor)?;
        store.load("critic_1", &mut self.critic_1)?;
        store.load("critic_2", &mut self.critic_2)?;
        store.load("target_actor", &mut self.target_actor)?;
        store.load("target_critic_1", &mut self.target_critic_1)?;
        store.load("target_critic_2", &mut self.target_critic_2)?;
        Ok(())
    }

    fn to_tensor(&self, array: &Array2<f32>) -> Tensor {
        Tensor::from_slice(array.as_slice().unwrap())
            .reshape([array.nrows() as i64, array.ncols() as i64])
            .to_device(self.device)
    }
}
