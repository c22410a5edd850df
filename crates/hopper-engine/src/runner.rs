use crate::{Action, FLOOR_Y, GRAVITY, JUMP_FORCE, Obstacle};

/// Horizontal position of the runner's left edge. The runner never moves sideways.
pub const RUNNER_X: f32 = 100.0;
/// Width of the runner.
pub const RUNNER_WIDTH: f32 = 50.0;
/// Height of the runner while standing or jumping.
pub const STANDING_HEIGHT: f32 = 100.0;
/// Height of the runner while crouching.
pub const CROUCHING_HEIGHT: f32 = STANDING_HEIGHT / 2.0;

/// Current posture of the [`Runner`].
///
/// ```text
///            Jump (grounded, not crouching)
///   Standing ───────────────────────────▶ Jumping
///     │  ▲                                   │
///     │  │ Stand (grounded)      lands on    │
///     ▼  │                       the floor   │
///   Crouching ◀─── Crouch (grounded)         │
///                                            ▼
///                                         Standing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum Stance {
    Standing,
    Jumping,
    Crouching,
}

/// The body controlled by a policy.
///
/// The runner owns the action state machine: an [`Action`] is a request, and
/// [`Runner::apply`] decides whether the current stance allows it.
///
/// - `Jump` is ignored while airborne or crouched
/// - `Crouch` and `Stand` are ignored while airborne
#[derive(Debug, Clone, PartialEq)]
pub struct Runner {
    y: f32,
    height: f32,
    velocity: f32,
    stance: Stance,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Creates a runner standing on the floor.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            y: FLOOR_Y - STANDING_HEIGHT,
            height: STANDING_HEIGHT,
            velocity: 0.0,
            stance: Stance::Standing,
        }
    }

    #[must_use]
    pub const fn x(&self) -> f32 {
        RUNNER_X
    }

    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    #[must_use]
    pub const fn width(&self) -> f32 {
        RUNNER_WIDTH
    }

    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    #[must_use]
    pub const fn stance(&self) -> Stance {
        self.stance
    }

    /// Returns `true` unless the runner is in the air.
    #[must_use]
    pub const fn is_grounded(&self) -> bool {
        !self.stance.is_jumping()
    }

    /// Feeds an action into the stance state machine.
    ///
    /// Returns `true` if the action changed the runner's state.
    pub fn apply(&mut self, action: Action) -> bool {
        if !self.is_grounded() {
            return false;
        }
        match action {
            Action::Jump => {
                if self.stance.is_crouching() {
                    return false;
                }
                self.stance = Stance::Jumping;
                self.velocity = -JUMP_FORCE;
                self.y += self.velocity;
            }
            Action::Crouch => {
                if self.stance.is_crouching() {
                    return false;
                }
                self.stance = Stance::Crouching;
                self.height = CROUCHING_HEIGHT;
                self.y = FLOOR_Y - self.height;
            }
            Action::Stand => {
                if self.stance.is_standing() {
                    return false;
                }
                self.stance = Stance::Standing;
                self.height = STANDING_HEIGHT;
                self.y = FLOOR_Y - self.height;
            }
        }
        true
    }

    /// Advances the jump arc by one tick. Grounded runners are unaffected.
    pub fn advance(&mut self) {
        if !self.stance.is_jumping() {
            return;
        }
        self.y += self.velocity;
        self.velocity += GRAVITY;
        if self.y + self.height >= FLOOR_Y {
            self.stance = Stance::Standing;
            self.height = STANDING_HEIGHT;
            self.y = FLOOR_Y - self.height;
            self.velocity = 0.0;
        }
    }

    /// Axis-aligned overlap test, edges inclusive.
    #[must_use]
    pub fn collides(&self, obstacle: &Obstacle) -> bool {
        let horizontal =
            self.x() + self.width() >= obstacle.x() && self.x() <= obstacle.x() + obstacle.width();
        let vertical =
            self.y + self.height >= obstacle.y() && self.y <= obstacle.y() + obstacle.height();
        horizontal && vertical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObstacleKind;

    #[test]
    fn test_jump_then_land() {
        let mut runner = Runner::new();
        assert!(runner.apply(Action::Jump));
        assert!(runner.stance().is_jumping());
        assert!(runner.y() < FLOOR_Y - STANDING_HEIGHT);

        let mut ticks = 0;
        while !runner.is_grounded() {
            runner.advance();
            ticks += 1;
            assert!(ticks < 1000, "runner never landed");
        }
        assert!(runner.stance().is_standing());
        assert_eq!(runner.y() + runner.height(), FLOOR_Y);
    }

    #[test]
    fn test_jump_blocked_while_airborne() {
        let mut runner = Runner::new();
        runner.apply(Action::Jump);
        runner.advance();
        let before = runner.clone();
        assert!(!runner.apply(Action::Jump));
        assert!(!runner.apply(Action::Crouch));
        assert!(!runner.apply(Action::Stand));
        assert_eq!(runner, before);
    }

    #[test]
    fn test_jump_blocked_while_crouching() {
        let mut runner = Runner::new();
        assert!(runner.apply(Action::Crouch));
        assert!(!runner.apply(Action::Jump));
        assert!(runner.stance().is_crouching());
        assert_eq!(runner.height(), CROUCHING_HEIGHT);
    }

    #[test]
    fn test_crouch_and_stand_toggle() {
        let mut runner = Runner::new();
        assert!(runner.apply(Action::Crouch));
        assert_eq!(runner.y(), FLOOR_Y - CROUCHING_HEIGHT);
        assert!(runner.apply(Action::Stand));
        assert_eq!(runner.y(), FLOOR_Y - STANDING_HEIGHT);
        assert!(!runner.apply(Action::Stand));
    }

    #[test]
    fn test_collision_with_low_block() {
        let runner = Runner::new();
        let touching = Obstacle::new(ObstacleKind::LowBlock, RUNNER_X + RUNNER_WIDTH);
        let far = Obstacle::new(ObstacleKind::LowBlock, RUNNER_X + RUNNER_WIDTH + 1.0);
        assert!(runner.collides(&touching));
        assert!(!runner.collides(&far));
    }

    #[test]
    fn test_crouch_clears_overhead_bar() {
        let mut runner = Runner::new();
        let bar = Obstacle::new(ObstacleKind::OverheadBar, RUNNER_X);
        assert!(runner.collides(&bar));
        runner.apply(Action::Crouch);
        assert!(!runner.collides(&bar));
    }
}
