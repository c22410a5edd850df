use std::collections::VecDeque;

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::{Action, Environment, Observation, Runner, SCROLL_SPEED, Seed, StepOutcome};

/// Number of obstacles on the course at any time.
pub const OBSTACLE_COUNT: usize = 3;
/// Horizontal position of the first obstacle after a reset.
pub const FIRST_OBSTACLE_X: f32 = 900.0;
/// Horizontal distance between consecutive obstacles after a reset.
pub const OBSTACLE_SPACING: f32 = 500.0;
/// Horizontal position where replacement obstacles spawn.
pub const SPAWN_X: f32 = 1400.0;
/// Points awarded when an obstacle scrolls fully off-screen.
pub const OBSTACLE_CLEARED_POINTS: u32 = 2;
/// Inset from each obstacle edge used by the edge-alignment bonus.
pub const ALIGNMENT_MARGIN: f32 = 5.0;

/// The shapes an obstacle can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObstacleKind {
    /// Full-height block standing on the floor. Clear it by jumping.
    LowBlock,
    /// Half-height block standing on the floor. Clear it by jumping.
    ShortBlock,
    /// Bar hanging from the ceiling. Clear it by crouching.
    OverheadBar,
}

impl Distribution<ObstacleKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ObstacleKind {
        match rng.random_range(0..3) {
            0 => ObstacleKind::LowBlock,
            1 => ObstacleKind::ShortBlock,
            _ => ObstacleKind::OverheadBar,
        }
    }
}

impl ObstacleKind {
    #[must_use]
    pub const fn y(self) -> f32 {
        match self {
            Self::LowBlock => 300.0,
            Self::ShortBlock => 350.0,
            Self::OverheadBar => 0.0,
        }
    }

    #[must_use]
    pub const fn width(self) -> f32 {
        50.0
    }

    #[must_use]
    pub const fn height(self) -> f32 {
        match self {
            Self::LowBlock => 100.0,
            Self::ShortBlock => 50.0,
            Self::OverheadBar => 330.0,
        }
    }
}

/// An obstacle scrolling towards the runner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    kind: ObstacleKind,
    x: f32,
}

impl Obstacle {
    #[must_use]
    pub const fn new(kind: ObstacleKind, x: f32) -> Self {
        Self { kind, x }
    }

    #[must_use]
    pub const fn kind(&self) -> ObstacleKind {
        self.kind
    }

    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    #[must_use]
    pub const fn y(&self) -> f32 {
        self.kind.y()
    }

    #[must_use]
    pub const fn width(&self) -> f32 {
        self.kind.width()
    }

    #[must_use]
    pub const fn height(&self) -> f32 {
        self.kind.height()
    }

    /// Raw features a policy sees: `[x, y, width, height]`.
    #[must_use]
    pub const fn observation(&self) -> Observation {
        [self.x, self.y(), self.width(), self.height()]
    }

    fn is_off_screen(&self) -> bool {
        self.x + self.width() < 0.0
    }
}

/// The obstacle course a runner plays through.
///
/// Obstacle kinds are drawn from a [`Pcg32`] seeded by [`Seed`]; the generator keeps running
/// across resets, so successive episodes see different courses while the whole sequence stays
/// reproducible from the seed.
///
/// # Example
///
/// ```
/// use hopper_engine::{Action, Environment, ObstacleCourse, Seed};
///
/// let mut course = ObstacleCourse::with_seed(Seed::from_bytes([1; 16]));
/// course.reset();
/// let mut ticks = 0;
/// while !course.step(Action::Stand).terminated {
///     ticks += 1;
/// }
/// // the first obstacle reaches a passive runner well before it could be cleared
/// assert!(ticks < 500);
/// ```
#[derive(Debug, Clone)]
pub struct ObstacleCourse {
    rng: Pcg32,
    obstacles: VecDeque<Obstacle>,
    runner: Runner,
    ticks: u64,
}

impl Default for ObstacleCourse {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleCourse {
    /// Creates a course with a random seed.
    ///
    /// For deterministic courses use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: Seed) -> Self {
        let mut this = Self {
            rng: seed.rng(),
            obstacles: VecDeque::with_capacity(OBSTACLE_COUNT),
            runner: Runner::new(),
            ticks: 0,
        };
        this.lay_out();
        this
    }

    #[must_use]
    pub fn runner(&self) -> &Runner {
        &self.runner
    }

    pub fn obstacles(&self) -> impl Iterator<Item = &Obstacle> + '_ {
        self.obstacles.iter()
    }

    /// Ticks elapsed since the last reset.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The obstacle nearest to the runner.
    ///
    /// # Panics
    ///
    /// Never in practice: the course always holds [`OBSTACLE_COUNT`] obstacles.
    #[must_use]
    pub fn front(&self) -> &Obstacle {
        self.obstacles
            .front()
            .expect("obstacle course should never be empty")
    }

    fn lay_out(&mut self) {
        self.obstacles.clear();
        let mut x = FIRST_OBSTACLE_X;
        for _ in 0..OBSTACLE_COUNT {
            let kind = self.rng.random();
            self.obstacles.push_back(Obstacle::new(kind, x));
            x += OBSTACLE_SPACING;
        }
    }

    /// Retires the front obstacle once it has left the screen.
    ///
    /// Returns the points earned.
    fn retire_cleared(&mut self) -> u32 {
        if !self.front().is_off_screen() {
            return 0;
        }
        self.obstacles.pop_front();
        let kind = self.rng.random();
        self.obstacles.push_back(Obstacle::new(kind, SPAWN_X));
        OBSTACLE_CLEARED_POINTS
    }

    fn has_collided(&self) -> bool {
        self.obstacles.iter().any(|o| self.runner.collides(o))
    }
}

impl Environment for ObstacleCourse {
    fn reset(&mut self) -> Observation {
        self.runner = Runner::new();
        self.ticks = 0;
        self.lay_out();
        self.front().observation()
    }

    fn step(&mut self, action: Action) -> StepOutcome {
        self.runner.apply(action);
        let score_delta = self.retire_cleared();
        self.runner.advance();
        for obstacle in &mut self.obstacles {
            obstacle.x -= SCROLL_SPEED;
        }
        self.ticks += 1;
        StepOutcome {
            observation: self.front().observation(),
            score_delta,
            terminated: self.has_collided(),
        }
    }

    fn edge_alignment_bonus(&self) -> u32 {
        let front = self.front();
        let lower = front.x() + ALIGNMENT_MARGIN;
        let upper = front.x() + front.width() - ALIGNMENT_MARGIN;
        let left = self.runner.x();
        let right = left + self.runner.width();
        u32::from((lower..=upper).contains(&left)) + u32::from((lower..=upper).contains(&right))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RUNNER_WIDTH, RUNNER_X};

    fn course() -> ObstacleCourse {
        ObstacleCourse::with_seed(Seed::from_bytes([3; 16]))
    }

    #[test]
    fn test_reset_lays_out_three_obstacles() {
        let mut course = course();
        let observation = course.reset();
        let xs: Vec<f32> = course.obstacles().map(Obstacle::x).collect();
        assert_eq!(xs, [900.0, 1400.0, 1900.0]);
        assert_eq!(observation, course.front().observation());
        assert_eq!(course.ticks(), 0);
    }

    #[test]
    fn test_obstacles_scroll_each_tick() {
        let mut course = course();
        course.reset();
        let outcome = course.step(Action::Stand);
        assert_eq!(outcome.observation[0], FIRST_OBSTACLE_X - SCROLL_SPEED);
        assert_eq!(outcome.score_delta, 0);
        assert!(!outcome.terminated);
    }

    #[test]
    fn test_same_seed_same_course() {
        let mut a = course();
        let mut b = course();
        for _ in 0..3 {
            assert_eq!(a.reset(), b.reset());
            let kinds_a: Vec<_> = a.obstacles().map(Obstacle::kind).collect();
            let kinds_b: Vec<_> = b.obstacles().map(Obstacle::kind).collect();
            assert_eq!(kinds_a, kinds_b);
        }
    }

    #[test]
    fn test_cleared_obstacle_scores_and_respawns() {
        let mut course = course();
        course.reset();
        // put the front obstacle just past the left edge of the screen
        course.obstacles[0] = Obstacle::new(ObstacleKind::ShortBlock, -51.0);
        let outcome = course.step(Action::Stand);
        assert_eq!(outcome.score_delta, OBSTACLE_CLEARED_POINTS);
        assert_eq!(course.obstacles().count(), OBSTACLE_COUNT);
        assert_eq!(course.obstacles().last().map(Obstacle::x), Some(SPAWN_X - SCROLL_SPEED));
    }

    #[test]
    fn test_passive_runner_collides_with_ground_obstacle() {
        let mut course = course();
        course.reset();
        course.obstacles[0] = Obstacle::new(ObstacleKind::LowBlock, RUNNER_X + RUNNER_WIDTH + 4.0);
        assert!(!course.step(Action::Stand).terminated);
        assert!(course.step(Action::Stand).terminated);
    }

    #[test]
    fn test_edge_alignment_bonus() {
        let mut course = course();
        course.reset();
        course.obstacles[0] = Obstacle::new(ObstacleKind::LowBlock, 500.0);
        assert_eq!(course.edge_alignment_bonus(), 0);

        // right edge (150) inside [ox + 5, ox + 45]
        course.obstacles[0] = Obstacle::new(ObstacleKind::LowBlock, 120.0);
        assert_eq!(course.edge_alignment_bonus(), 1);

        // left edge (100) inside [100, 140]; the 40-wide window cannot hold both edges
        course.obstacles[0] = Obstacle::new(ObstacleKind::LowBlock, 95.0);
        assert_eq!(course.edge_alignment_bonus(), 1);
    }
}
