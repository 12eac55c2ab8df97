//! Coefficients of the linear board score.

use serde::{Deserialize, Serialize};

use crate::board_analysis::BoardFeatures;

/// One weight per board feature.
///
/// The defaults penalize tall stacks, holes and an uneven surface, and reward
/// completed lines. Missing fields in a JSON weights file fall back to the
/// default value of that field.
///
/// ```
/// use gbtris_evaluator::weights::HeuristicWeights;
///
/// let weights: HeuristicWeights = serde_json::from_str(r#"{"holes": -1.0}"#).unwrap();
/// assert_eq!(weights.holes, -1.0);
/// assert_eq!(weights.bumpiness, HeuristicWeights::DEFAULT.bumpiness);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeuristicWeights {
    pub aggregate_height: f64,
    pub complete_lines: f64,
    pub holes: f64,
    pub bumpiness: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl HeuristicWeights {
    pub const DEFAULT: Self = Self {
        aggregate_height: -0.510_066,
        complete_lines: 0.760_666,
        holes: -0.356_63,
        bumpiness: -0.184_483,
    };

    /// Computes `Σ(wᵢ × featureᵢ)`.
    #[must_use]
    pub fn score(&self, features: &BoardFeatures) -> f64 {
        self.aggregate_height * f64::from(features.aggregate_height)
            + self.complete_lines * f64::from(features.complete_lines)
            + self.holes * f64::from(features.holes)
            + self.bumpiness * f64::from(features.bumpiness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_weighted_sum() {
        let features = BoardFeatures {
            aggregate_height: 10,
            complete_lines: 1,
            holes: 2,
            bumpiness: 3,
        };
        let expected = -0.510_066 * 10.0 + 0.760_666 - 0.356_63 * 2.0 - 0.184_483 * 3.0;
        let score = HeuristicWeights::DEFAULT.score(&features);
        assert!((score - expected).abs() < 1e-12, "{score} != {expected}");
    }

    #[test]
    fn test_zero_features_score_zero() {
        assert_eq!(HeuristicWeights::DEFAULT.score(&BoardFeatures::default()), 0.0);
    }

    #[test]
    fn test_weights_file_round_trip() {
        let json = serde_json::to_string(&HeuristicWeights::DEFAULT).unwrap();
        let parsed: HeuristicWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, HeuristicWeights::DEFAULT);

        assert!(serde_json::from_str::<HeuristicWeights>(r#"{"height": 1.0}"#).is_err());
    }
}
