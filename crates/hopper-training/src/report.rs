use serde::{Deserialize, Serialize};

use crate::{agent::Agent, config::TrainConfig};

/// Episode result of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Position of the agent in the population.
    pub agent: usize,
    pub score: u32,
    pub fitness: f32,
    pub solved: bool,
    /// Generation counter of the agent's lineage.
    pub lineage_generation: u32,
}

impl AgentRecord {
    #[must_use]
    pub fn new(index: usize, agent: &Agent) -> Self {
        Self {
            agent: index,
            score: agent.score(),
            fitness: agent.fitness(),
            solved: agent.is_solved(),
            lineage_generation: agent.generation(),
        }
    }
}

/// Results of every agent in one generation, in population order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRecord {
    /// 1-based generation number.
    pub generation: usize,
    pub agents: Vec<AgentRecord>,
}

impl GenerationRecord {
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.agents.iter().map(|a| a.score).max().unwrap_or(0)
    }

    #[must_use]
    pub fn solved_count(&self) -> usize {
        self.agents.iter().filter(|a| a.solved).count()
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn mean_score(&self) -> f32 {
        if self.agents.is_empty() {
            return 0.0;
        }
        let total: u32 = self.agents.iter().map(|a| a.score).sum();
        total as f32 / self.agents.len() as f32
    }
}

/// Everything a run produced, ready to be serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub config: TrainConfig,
    pub generations: Vec<GenerationRecord>,
}

impl TrainingReport {
    #[must_use]
    pub fn best_score(&self) -> u32 {
        self.generations
            .iter()
            .map(GenerationRecord::best_score)
            .max()
            .unwrap_or(0)
    }

    /// First generation in which some agent was solved.
    #[must_use]
    pub fn first_solved_generation(&self) -> Option<usize> {
        self.generations
            .iter()
            .find(|g| g.solved_count() > 0)
            .map(|g| g.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(agent: usize, score: u32, solved: bool) -> AgentRecord {
        AgentRecord {
            agent,
            score,
            fitness: 0.0,
            solved,
            lineage_generation: 1,
        }
    }

    #[test]
    fn test_generation_summary() {
        let generation = GenerationRecord {
            generation: 1,
            agents: vec![record(0, 4, false), record(1, 30, true), record(2, 2, false)],
        };
        assert_eq!(generation.best_score(), 30);
        assert_eq!(generation.solved_count(), 1);
        assert!((generation.mean_score() - 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_report_summary() {
        let report = TrainingReport {
            config: TrainConfig::default(),
            generations: vec![
                GenerationRecord {
                    generation: 1,
                    agents: vec![record(0, 6, false)],
                },
                GenerationRecord {
                    generation: 2,
                    agents: vec![record(0, 30, true)],
                },
            ],
        };
        assert_eq!(report.best_score(), 30);
        assert_eq!(report.first_solved_generation(), Some(2));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["generations"][1]["agents"][0]["solved"], true);
        assert_eq!(json["config"]["mode"], "generational");
    }
}
