use serde::{Deserialize, Serialize};

/// A choice the policy makes every tick.
///
/// The discriminant is the index of the matching entry in a policy's output vector,
/// so `Action::from_index(argmax)` maps a prediction back to an action.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Return to full height (only while grounded).
    #[display("stand")]
    Stand = 0,
    /// Leave the ground (only while grounded and not crouching).
    #[display("jump")]
    Jump = 1,
    /// Lower to half height (only while grounded).
    #[display("crouch")]
    Crouch = 2,
}

impl Action {
    /// Number of actions (3).
    pub const LEN: usize = 3;

    /// All actions, ordered by index.
    pub const ALL: [Self; Self::LEN] = [Self::Stand, Self::Jump, Self::Crouch];

    /// Returns the action at `index`, or `None` when out of range.
    ///
    /// # Examples
    ///
    /// ```
    /// use hopper_engine::Action;
    ///
    /// assert_eq!(Action::from_index(1), Some(Action::Jump));
    /// assert_eq!(Action::from_index(3), None);
    /// ```
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Stand),
            1 => Some(Self::Jump),
            2 => Some(Self::Crouch),
            _ => None,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_position_in_all() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
    }

    #[test]
    fn test_display_labels() {
        let labels = Action::ALL.map(|a| a.to_string());
        assert_eq!(labels, ["stand", "jump", "crouch"]);
    }
}
