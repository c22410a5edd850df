//! Fixed-size populations of agents and the two reproduction strategies.
//!
//! # Reproduction Strategies
//!
//! ## Generational (fitness-proportionate)
//!
//! 1. **Carry Over** - Solved agents keep their slot (score reset, generation + 1)
//! 2. **Normalize** - Unsolved agents get `fitness = score² / Σ score²`
//! 3. **Pool Selection** - Every free slot is filled by drawing a parent from the unsolved
//!    agents, weighted by [`selection_weight`], and reproducing it
//!
//! ## Elitist Crossover
//!
//! 1. **Elite** - The agent with strictly maximal fitness (first one on ties)
//! 2. **Carry Over** - Solved agents stay unchanged apart from generation + 1
//! 3. **Crossover** - Every other agent swaps each weight with the elite's with probability 0.5
//! 4. **Mutation** - The crossed-over agent is replaced by its mutated child
//!
//! # Elite Policy
//!
//! Under elitist crossover the elite genome is either cloned for every pairing
//! ([`ElitePolicy::Cloned`]), leaving it intact for all partners, or shared between all
//! pairings ([`ElitePolicy::Shared`]), where each crossover also writes the partner's genes
//! back into the elite so later partners see a progressively diluted elite.
//!
//! Both strategies keep the population size unchanged.

use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};

use crate::{
    agent::Agent,
    genome::{Genome, GenomeError},
};

/// Swap probability used when crossing an agent with the elite.
pub const ELITE_SWAP_PROBABILITY: f32 = 0.5;

/// How the next generation is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReproductionMode {
    /// Fitness-proportionate regeneration from the unsolved agents.
    #[default]
    Generational,
    /// Crossover of every unsolved agent with the elite.
    ElitistCrossover,
}

/// How the elite genome takes part in elitist crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElitePolicy {
    /// Every pairing crosses with a fresh copy of the elite.
    #[default]
    Cloned,
    /// All pairings cross with the same elite genome, which degrades along the way.
    Shared,
}

/// Settings every reproduction step needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReproductionParams {
    pub mutation_rate: f32,
    pub hidden_dim: usize,
    pub mode: ReproductionMode,
    pub elite_policy: ElitePolicy,
}

/// Ordered collection of agents whose size stays fixed across the run.
#[derive(Debug, Clone)]
pub struct Population {
    agents: Vec<Agent>,
    params: ReproductionParams,
}

impl Population {
    /// Creates `size` first-generation agents with random genomes.
    ///
    /// # Panics
    ///
    /// Panics if `params.hidden_dim` is outside [`crate::genome::HIDDEN_DIM_RANGE`].
    pub fn random<R>(size: usize, params: ReproductionParams, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let agents = (0..size)
            .map(|_| Agent::new(Genome::random(params.hidden_dim, rng)))
            .collect();
        Self { agents, params }
    }

    #[must_use]
    pub fn from_agents(agents: Vec<Agent>, params: ReproductionParams) -> Self {
        Self { agents, params }
    }

    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    #[must_use]
    pub fn params(&self) -> &ReproductionParams {
        &self.params
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Replaces the agents with the next generation using the configured strategy.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::ShapeMismatch`] if an agent's genome does not match the
    /// configured hidden size or the elite's shape.
    pub fn reproduce<R>(&mut self, rng: &mut R) -> Result<(), GenomeError>
    where
        R: Rng + ?Sized,
    {
        match self.params.mode {
            ReproductionMode::Generational => self.reproduce_generational(rng),
            ReproductionMode::ElitistCrossover => self.reproduce_elitist_crossover(rng),
        }
    }

    /// Fitness-proportionate regeneration.
    ///
    /// Solved agents are carried over with their score reset; the remaining slots are
    /// filled with mutated children of agents drawn from the unsolved ones.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::ShapeMismatch`] if a drawn parent has a foreign hidden size.
    pub fn reproduce_generational<R>(&mut self, rng: &mut R) -> Result<(), GenomeError>
    where
        R: Rng + ?Sized,
    {
        let size = self.agents.len();
        let (solved, mut unsolved): (Vec<_>, Vec<_>) =
            self.agents.drain(..).partition(Agent::is_solved);
        normalize_fitness(&mut unsolved);

        let mut next = Vec::with_capacity(size);
        next.extend(solved.iter().map(|agent| {
            let mut agent = agent.carry_over();
            agent.set_score(0);
            agent
        }));
        while next.len() < size {
            let Some(parent) = pool_selection(&unsolved, rng) else {
                break;
            };
            next.push(parent.reproduce(self.params.mutation_rate, self.params.hidden_dim, rng)?);
        }
        debug_assert_eq!(next.len(), size);
        self.agents = next;
        Ok(())
    }

    /// Crossover of every unsolved agent with the elite, followed by mutation.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::ShapeMismatch`] if an agent's genome differs in shape from the
    /// elite's or from the configured hidden size. Agents processed before the failing one
    /// have already been replaced.
    pub fn reproduce_elitist_crossover<R>(&mut self, rng: &mut R) -> Result<(), GenomeError>
    where
        R: Rng + ?Sized,
    {
        let Some(elite_index) = elite_index(&self.agents) else {
            return Ok(());
        };
        let mut elite = self.agents[elite_index].genome().clone();
        let ReproductionParams {
            mutation_rate,
            hidden_dim,
            elite_policy,
            ..
        } = self.params;

        for (index, agent) in self.agents.iter_mut().enumerate() {
            if agent.is_solved() {
                *agent = agent.carry_over();
                continue;
            }
            if index == elite_index && elite_policy == ElitePolicy::Shared {
                // the elite carries every swap made so far
                *agent.genome_mut() = elite.clone();
            }
            match elite_policy {
                ElitePolicy::Cloned => {
                    let mut partner = elite.clone();
                    agent
                        .genome_mut()
                        .crossover(&mut partner, ELITE_SWAP_PROBABILITY, rng)?;
                }
                ElitePolicy::Shared if index != elite_index => {
                    agent
                        .genome_mut()
                        .crossover(&mut elite, ELITE_SWAP_PROBABILITY, rng)?;
                }
                ElitePolicy::Shared => {}
            }
            *agent = agent.reproduce(mutation_rate, hidden_dim, rng)?;
        }
        Ok(())
    }
}

/// Index of the agent with strictly maximal fitness; the first one wins ties.
fn elite_index(agents: &[Agent]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (index, agent) in agents.iter().enumerate() {
        if best.is_none_or(|b| agent.fitness() > agents[b].fitness()) {
            best = Some(index);
        }
    }
    best
}

/// Number of pool entries an agent contributes: `max(1, floor(fitness * 100))`.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn selection_weight(agent: &Agent) -> usize {
    ((agent.fitness() * 100.0).floor() as usize).max(1)
}

/// Draws one agent with probability proportional to [`selection_weight`].
///
/// Returns `None` if `candidates` is empty.
pub fn pool_selection<'a, R>(candidates: &'a [Agent], rng: &mut R) -> Option<&'a Agent>
where
    R: Rng + ?Sized,
{
    candidates.choose_weighted(rng, selection_weight).ok()
}

/// Sets `fitness = score² / Σ score²` for every unsolved agent of `subset`.
///
/// Solved agents are left untouched. If every unsolved score is zero, their fitness is 0.
#[expect(clippy::cast_precision_loss)]
pub fn normalize_fitness(subset: &mut [Agent]) {
    let squared = |agent: &Agent| {
        let score = agent.score() as f32;
        score * score
    };
    let sum: f32 = subset
        .iter()
        .filter(|agent| !agent.is_solved())
        .map(squared)
        .sum();
    for agent in subset.iter_mut().filter(|agent| !agent.is_solved()) {
        let fitness = if sum > 0.0 { squared(agent) / sum } else { 0.0 };
        agent.set_fitness(fitness);
    }
}
