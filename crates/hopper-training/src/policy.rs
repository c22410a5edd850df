//! Turning raw observations into network inputs and predictions into actions.

use hopper_engine::{Action, OBSERVATION_LEN, Observation};

use crate::genome::Prediction;

/// Joint min-max normalization: every feature is scaled with the same min/max pair.
///
/// If all features are equal the result is all zeros.
#[must_use]
pub fn normalize_observation(observation: &Observation) -> Observation {
    let min = observation.iter().copied().fold(f32::INFINITY, f32::min);
    let max = observation.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if range == 0.0 {
        return [0.0; OBSERVATION_LEN];
    }
    observation.map(|v| (v - min) / range)
}

/// Picks the action with the highest preference. Ties go to the lowest index.
#[must_use]
pub fn select_action(prediction: &Prediction) -> Action {
    let mut best = 0;
    for (index, p) in prediction.iter().enumerate().skip(1) {
        if *p > prediction[best] {
            best = index;
        }
    }
    Action::ALL[best]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_constant_observation_is_zero() {
        assert_eq!(normalize_observation(&[5.0; 4]), [0.0; 4]);
    }

    #[test]
    fn test_normalize_uses_joint_range() {
        let normalized = normalize_observation(&[900.0, 300.0, 50.0, 100.0]);
        assert_eq!(normalized[0], 1.0);
        assert_eq!(normalized[2], 0.0);
        assert!((normalized[1] - 250.0 / 850.0).abs() < 1e-6);
        assert!((normalized[3] - 50.0 / 850.0).abs() < 1e-6);
    }

    #[test]
    fn test_select_action_argmax() {
        assert_eq!(select_action(&[0.2, 0.5, 0.3]), Action::Jump);
        assert_eq!(select_action(&[0.1, 0.1, 0.8]), Action::Crouch);
    }

    #[test]
    fn test_select_action_ties_go_to_lowest_index() {
        let third = 1.0 / 3.0;
        assert_eq!(select_action(&[third; 3]), Action::Stand);
        assert_eq!(select_action(&[0.2, 0.4, 0.4]), Action::Jump);
    }
}
