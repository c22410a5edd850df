use std::{path::PathBuf, thread, time::Duration};

use anyhow::Context as _;
use hopper_engine::{ObstacleCourse, Seed};
use hopper_training::{
    config::TrainConfig,
    population::{ElitePolicy, ReproductionMode},
    report::{AgentRecord, GenerationRecord},
    trainer::{TickFrame, TrainError, Trainer, Visualizer},
};
use rand::Rng as _;

use crate::{
    schema::run_summary::RunSummary,
    util::{self, Output},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum ModeArg {
    Generational,
    Elitist,
}

impl From<ModeArg> for ReproductionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Generational => Self::Generational,
            ModeArg::Elitist => Self::ElitistCrossover,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum EliteArg {
    Cloned,
    Shared,
}

impl From<EliteArg> for ElitePolicy {
    fn from(elite: EliteArg) -> Self {
        match elite {
            EliteArg::Cloned => Self::Cloned,
            EliteArg::Shared => Self::Shared,
        }
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Training config file (JSON); flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of generations [1-100]
    #[arg(long)]
    generations: Option<usize>,
    /// Number of agents per generation [1-50]
    #[arg(long)]
    population: Option<usize>,
    /// Hidden layer size [4-10]
    #[arg(long)]
    hidden: Option<usize>,
    /// Per-weight mutation probability [0.00-0.99]
    #[arg(long)]
    mutation_rate: Option<f32>,
    /// Reproduction strategy: generational or elitist
    #[arg(long)]
    mode: Option<ModeArg>,
    /// Elite handling under elitist crossover: cloned or shared
    #[arg(long)]
    elite: Option<EliteArg>,
    /// Run seed (32 hex digits); random if omitted
    #[arg(long)]
    seed: Option<Seed>,
    /// Stop training after this many seconds
    #[arg(long)]
    time_limit: Option<u64>,
    /// Output file path
    #[arg(long)]
    output: Option<PathBuf>,
}

impl TrainArg {
    fn resolve_config(&self) -> anyhow::Result<TrainConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_config_file(path)?,
            None => TrainConfig::default(),
        };
        if let Some(generations) = self.generations {
            config.generations = generations;
        }
        if let Some(population) = self.population {
            config.population_size = population;
        }
        if let Some(hidden) = self.hidden {
            config.hidden_dim = hidden;
        }
        if let Some(mutation_rate) = self.mutation_rate {
            config.mutation_rate = mutation_rate;
        }
        if let Some(mode) = self.mode {
            config.mode = mode.into();
        }
        if let Some(elite) = self.elite {
            config.elite_policy = elite.into();
        }
        Ok(config)
    }
}

/// Prints a table per generation to stderr.
#[derive(Debug, Default)]
struct ProgressPrinter {
    episode_ticks: u64,
    rows: Vec<(AgentRecord, u64)>,
}

impl Visualizer for ProgressPrinter {
    fn on_tick(&mut self, frame: &TickFrame<'_>) {
        self.episode_ticks = frame.tick + 1;
    }

    fn on_episode_end(&mut self, _generation: usize, record: &AgentRecord) {
        self.rows.push((record.clone(), self.episode_ticks));
        self.episode_ticks = 0;
    }

    fn on_generation_end(&mut self, record: &GenerationRecord) {
        eprintln!("Generation #{}:", record.generation);
        eprintln!("  Agents:");
        for (agent, ticks) in self.rows.drain(..) {
            eprintln!(
                "  {:2}: score {:2} fitness {:.3} ticks {ticks:5} lineage {:3}{}",
                agent.agent,
                agent.score,
                agent.fitness,
                agent.lineage_generation,
                if agent.solved { " solved" } else { "" },
            );
        }
        eprintln!("  Best:   {}", record.best_score());
        eprintln!("  Mean:   {:.2}", record.mean_score());
        eprintln!("  Solved: {}/{}", record.solved_count(), record.agents.len());
    }
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let config = arg.resolve_config()?;
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    let mut seeds = seed.rng();
    let course = ObstacleCourse::with_seed(seeds.random());
    let mut rng = seeds.random::<Seed>().rng();

    let mut trainer = Trainer::new(config, course, ProgressPrinter::default())
        .context("Invalid training configuration")?;
    if let Some(secs) = arg.time_limit {
        let stop = trainer.stop_signal();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(secs));
            stop.raise();
        });
    }

    log::info!("training with seed {seed}: {:?}", trainer.config());
    let outcome = match trainer.run(&mut rng) {
        Ok(outcome) => outcome,
        Err(TrainError::Stopped) => {
            anyhow::bail!(
                "Training stopped by time limit ({}s); rerun with --seed {seed} to reproduce",
                arg.time_limit.unwrap_or_default()
            );
        }
        Err(err) => return Err(err).context("Training failed"),
    };

    let summary = RunSummary::new(seed, outcome.report);
    eprintln!("Training completed.");
    eprintln!("  Seed: {}", summary.seed);
    eprintln!("  Best score: {}", summary.best_score);
    match summary.first_solved_generation {
        Some(generation) => eprintln!("  First solved in generation #{generation}"),
        None => eprintln!("  No agent reached the score cap"),
    }

    Output::save_json(&summary, arg.output.clone())?;
    if let Some(path) = &arg.output {
        eprintln!("  Report saved to {}", path.display());
    }
    Ok(())
}
