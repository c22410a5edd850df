use rand::Rng;

use crate::genome::{Genome, GenomeError};

/// Score at which an episode stops and the agent counts as solved.
pub const SCORE_CAP: u32 = 30;
/// Divisor turning a raw score into fitness.
pub const FITNESS_SCALE: f32 = 30.0;

/// A single individual: one genome plus the bookkeeping of its latest episode.
///
/// Each agent exclusively owns its genome; nothing else holds a reference to it between
/// reproduction steps.
#[derive(Debug, Clone)]
pub struct Agent {
    genome: Genome,
    score: u32,
    fitness: f32,
    solved: bool,
    generation: u32,
}

impl Agent {
    /// Creates a first-generation agent.
    #[must_use]
    pub fn new(genome: Genome) -> Self {
        Self {
            genome,
            score: 0,
            fitness: 0.0,
            solved: false,
            generation: 1,
        }
    }

    #[must_use]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    pub fn genome_mut(&mut self) -> &mut Genome {
        &mut self.genome
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub fn add_score(&mut self, delta: u32) {
        self.score = self.score.saturating_add(delta);
    }

    #[must_use]
    pub fn fitness(&self) -> f32 {
        self.fitness
    }

    pub(crate) fn set_fitness(&mut self, fitness: f32) {
        self.fitness = fitness;
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.solved
    }

    /// Flags the agent as solved. Set by the trainer once the raw score reaches [`SCORE_CAP`].
    pub fn mark_solved(&mut self) {
        self.solved = true;
    }

    /// Position along the lineage; first-generation agents are `1`.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn reached_cap(&self) -> bool {
        self.score >= SCORE_CAP
    }

    /// Clears score, fitness and the solved flag before a new episode.
    pub fn reset_episode(&mut self) {
        self.score = 0;
        self.fitness = 0.0;
        self.solved = false;
    }

    /// `fitness = score / FITNESS_SCALE`, unclamped.
    #[expect(clippy::cast_precision_loss)]
    pub fn calculate_fitness(&mut self) {
        self.fitness = self.score as f32 / FITNESS_SCALE;
    }

    /// Copies a solved agent into the next generation: only the generation counter advances.
    #[must_use]
    pub fn carry_over(&self) -> Self {
        Self {
            generation: self.generation + 1,
            ..self.clone()
        }
    }

    /// Creates a child: cloned genome, mutated with `mutation_rate`, next generation, fresh
    /// episode state.
    ///
    /// # Errors
    ///
    /// Returns [`GenomeError::ShapeMismatch`] if this agent's genome does not have
    /// `hidden_dim` hidden units.
    pub fn reproduce<R>(
        &self,
        mutation_rate: f32,
        hidden_dim: usize,
        rng: &mut R,
    ) -> Result<Self, GenomeError>
    where
        R: Rng + ?Sized,
    {
        if self.genome.hidden_dim() != hidden_dim {
            let left = self.genome.shape();
            return Err(GenomeError::ShapeMismatch {
                left,
                right: crate::genome::Shape {
                    hidden: hidden_dim,
                    ..left
                },
            });
        }
        let mut genome = self.genome.clone();
        genome.mutate(mutation_rate, rng);
        Ok(Self {
            genome,
            score: 0,
            fitness: 0.0,
            solved: false,
            generation: self.generation + 1,
        })
    }
}
