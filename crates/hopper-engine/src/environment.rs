use crate::Action;

/// Number of raw features in an observation.
pub const OBSERVATION_LEN: usize = 4;

/// Raw features describing the obstacle nearest to the runner.
pub type Observation = [f32; OBSERVATION_LEN];

/// Result of advancing an [`Environment`] by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    /// Features after the tick.
    pub observation: Observation,
    /// Points earned during the tick.
    pub score_delta: u32,
    /// Whether the episode ended (the runner collided).
    pub terminated: bool,
}

/// An episodic game a policy can be evaluated in.
///
/// Termination is ordinary control flow, not an error: the caller simply starts the next
/// episode with [`Environment::reset`].
pub trait Environment {
    /// Restores the initial state and returns the first observation.
    fn reset(&mut self) -> Observation;

    /// Applies `action` and advances the game by one tick.
    fn step(&mut self, action: Action) -> StepOutcome;

    /// Extra points (0 to 2) awarded at episode end for precise alignment with the nearest
    /// obstacle.
    fn edge_alignment_bonus(&self) -> u32;
}

impl<E> Environment for &mut E
where
    E: Environment + ?Sized,
{
    fn reset(&mut self) -> Observation {
        (**self).reset()
    }

    fn step(&mut self, action: Action) -> StepOutcome {
        (**self).step(action)
    }

    fn edge_alignment_bonus(&self) -> u32 {
        (**self).edge_alignment_bonus()
    }
}
