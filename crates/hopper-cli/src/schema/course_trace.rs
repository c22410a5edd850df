use hopper_engine::{Obstacle, ObstacleKind, Observation, Seed};
use serde::{Deserialize, Serialize};

/// Output of `hopper inspect-course`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CourseTrace {
    pub seed: Seed,
    /// Obstacles right after the reset.
    pub layout: Vec<ObstacleSnapshot>,
    /// Ticks in which something happened.
    pub events: Vec<CourseEvent>,
    pub ticks: u64,
    pub score: u32,
    pub alignment_bonus: u32,
    pub collided: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObstacleSnapshot {
    pub kind: ObstacleKind,
    pub x: f32,
}

impl From<&Obstacle> for ObstacleSnapshot {
    fn from(obstacle: &Obstacle) -> Self {
        Self {
            kind: obstacle.kind(),
            x: obstacle.x(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CourseEvent {
    pub tick: u64,
    pub observation: Observation,
    pub score_delta: u32,
    pub terminated: bool,
}
