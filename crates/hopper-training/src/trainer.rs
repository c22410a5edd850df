//! The generation loop.
//!
//! For every generation each agent plays one episode in the environment, in population
//! order. An episode runs until the environment reports a collision or the agent's score
//! reaches [`SCORE_CAP`]:
//!
//! ```text
//! observation ─▶ normalize ─▶ genome.predict ─▶ argmax ─▶ environment.step ─▶ score
//!      ▲                                                          │
//!      └──────────────────────────────────────────────────────────┘
//! ```
//!
//! When the episode ends the edge-alignment bonus is added, fitness is computed and the agent
//! is marked solved if it reached the cap. After the last agent the population reproduces,
//! except after the final generation, so the returned population matches the last report
//! entry.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use hopper_engine::{Action, Environment, Observation};
use rand::Rng;

use crate::{
    agent::{Agent, SCORE_CAP},
    config::{ConfigError, TrainConfig},
    genome::{Genome, GenomeError, Prediction},
    policy,
    population::Population,
    report::{AgentRecord, GenerationRecord, TrainingReport},
};

/// Lifecycle of a [`Trainer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::IsVariant)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Cooperative cancellation flag shared between a [`Trainer`] and whoever wants to stop it.
///
/// Checked once per tick.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Snapshot handed to the [`Visualizer`] before each action is applied.
#[derive(Debug, Clone, Copy)]
pub struct TickFrame<'a> {
    /// 1-based generation number.
    pub generation: usize,
    pub agent_index: usize,
    /// Ticks elapsed in the current episode.
    pub tick: u64,
    pub genome: &'a Genome,
    /// Normalized network input.
    pub observation: Observation,
    pub prediction: Prediction,
    pub action: Action,
    /// Score before this tick.
    pub score: u32,
}

/// Sink for training progress. Implementations must not influence the run.
pub trait Visualizer {
    fn on_tick(&mut self, frame: &TickFrame<'_>);

    fn on_episode_end(&mut self, generation: usize, record: &AgentRecord) {
        let _ = (generation, record);
    }

    fn on_generation_end(&mut self, record: &GenerationRecord) {
        let _ = record;
    }
}

impl<V> Visualizer for &mut V
where
    V: Visualizer + ?Sized,
{
    fn on_tick(&mut self, frame: &TickFrame<'_>) {
        (**self).on_tick(frame);
    }

    fn on_episode_end(&mut self, generation: usize, record: &AgentRecord) {
        (**self).on_episode_end(generation, record);
    }

    fn on_generation_end(&mut self, record: &GenerationRecord) {
        (**self).on_generation_end(record);
    }
}

/// A [`Visualizer`] that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVisualizer;

impl Visualizer for NullVisualizer {
    fn on_tick(&mut self, _frame: &TickFrame<'_>) {}
}

/// Errors that abort a training run.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum TrainError {
    #[display("reproduction failed: {_0}")]
    Genome(#[error(source)] GenomeError),
    #[display("training stopped")]
    Stopped,
}

impl From<GenomeError> for TrainError {
    fn from(err: GenomeError) -> Self {
        Self::Genome(err)
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// The final generation, with the scores of its last episodes.
    pub population: Population,
    pub report: TrainingReport,
}

/// Drives the generation loop over an [`Environment`].
#[derive(Debug)]
pub struct Trainer<E, V> {
    config: TrainConfig,
    environment: E,
    visualizer: V,
    stop: StopSignal,
    state: RunState,
}

impl<E, V> Trainer<E, V>
where
    E: Environment,
    V: Visualizer,
{
    /// Creates a trainer after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any field of `config` is out of range.
    pub fn new(config: TrainConfig, environment: E, visualizer: V) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            environment,
            visualizer,
            stop: StopSignal::new(),
            state: RunState::Idle,
        })
    }

    #[must_use]
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    #[must_use]
    pub fn environment(&self) -> &E {
        &self.environment
    }

    #[must_use]
    pub fn visualizer(&self) -> &V {
        &self.visualizer
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Returns a handle that stops the run when raised.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Runs every configured generation.
    ///
    /// # Errors
    ///
    /// - [`TrainError::Stopped`] if the stop signal was raised; the population is discarded
    /// - [`TrainError::Genome`] if reproduction combined incompatible genomes
    pub fn run<R>(&mut self, rng: &mut R) -> Result<TrainingOutcome, TrainError>
    where
        R: Rng + ?Sized,
    {
        self.state = RunState::Running;
        let result = self.run_generations(rng);
        self.state = match result {
            Err(TrainError::Stopped) => RunState::Stopped,
            _ => RunState::Idle,
        };
        result
    }

    fn run_generations<R>(&mut self, rng: &mut R) -> Result<TrainingOutcome, TrainError>
    where
        R: Rng + ?Sized,
    {
        let mut population = Population::random(
            self.config.population_size,
            self.config.reproduction_params(),
            rng,
        );
        let mut generations = Vec::with_capacity(self.config.generations);

        for generation in 1..=self.config.generations {
            let mut agents = Vec::with_capacity(population.len());
            for (index, agent) in population.agents_mut().iter_mut().enumerate() {
                self.run_episode(generation, index, agent)?;
                let record = AgentRecord::new(index, agent);
                log::debug!(
                    "generation {generation} agent {index}: score {}, fitness {:.3}{}",
                    record.score,
                    record.fitness,
                    if record.solved { " (solved)" } else { "" },
                );
                self.visualizer.on_episode_end(generation, &record);
                agents.push(record);
            }

            let record = GenerationRecord { generation, agents };
            log::info!(
                "generation {generation}/{}: best {}, mean {:.2}, solved {}/{}",
                self.config.generations,
                record.best_score(),
                record.mean_score(),
                record.solved_count(),
                record.agents.len(),
            );
            self.visualizer.on_generation_end(&record);
            generations.push(record);

            if generation < self.config.generations {
                population.reproduce(rng)?;
            }
        }

        Ok(TrainingOutcome {
            population,
            report: TrainingReport {
                config: self.config.clone(),
                generations,
            },
        })
    }

    fn run_episode(
        &mut self,
        generation: usize,
        agent_index: usize,
        agent: &mut Agent,
    ) -> Result<(), TrainError> {
        agent.reset_episode();
        let mut observation = self.environment.reset();
        let mut tick = 0;

        loop {
            if self.stop.is_raised() {
                return Err(TrainError::Stopped);
            }
            if agent.reached_cap() {
                break;
            }
            let normalized = policy::normalize_observation(&observation);
            let prediction = agent.genome().predict(&normalized);
            let action = policy::select_action(&prediction);
            self.visualizer.on_tick(&TickFrame {
                generation,
                agent_index,
                tick,
                genome: agent.genome(),
                observation: normalized,
                prediction,
                action,
                score: agent.score(),
            });

            let outcome = self.environment.step(action);
            agent.add_score(outcome.score_delta);
            observation = outcome.observation;
            tick += 1;
            if outcome.terminated {
                break;
            }
        }

        agent.add_score(self.environment.edge_alignment_bonus());
        agent.calculate_fitness();
        if agent.score() >= SCORE_CAP {
            agent.mark_solved();
        }
        Ok(())
    }
}
