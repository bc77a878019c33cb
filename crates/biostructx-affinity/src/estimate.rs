use std::fmt;

use serde::{Deserialize, Serialize};

use crate::feature::FeatureVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindingStrength {
    Strong,
    Good,
    Moderate,
    Poor,
}

impl BindingStrength {
    /// Bands are closed on the more negative side: -10.0 is strong, -8.0 good.
    pub fn from_energy(kcal_per_mol: f64) -> Self {
        if kcal_per_mol <= -10.0 {
            BindingStrength::Strong
        } else if kcal_per_mol <= -8.0 {
            BindingStrength::Good
        } else if kcal_per_mol <= -6.0 {
            BindingStrength::Moderate
        } else {
            BindingStrength::Poor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BindingStrength::Strong => "strong",
            BindingStrength::Good => "good",
            BindingStrength::Moderate => "weak/moderate",
            BindingStrength::Poor => "poor",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            BindingStrength::Strong => "Strong binding — very likely to interact effectively.",
            BindingStrength::Good => "Good binding — possibly a viable binder.",
            BindingStrength::Moderate => "Weak binding — may need optimization.",
            BindingStrength::Poor => "Poor binding — unlikely to interact.",
        }
    }

    /// Colour of the matching band on the range chart.
    pub fn colour(&self) -> &'static str {
        match self {
            BindingStrength::Strong => "#ff5733",
            BindingStrength::Good => "#33c4ff",
            BindingStrength::Moderate => "#f4d03f",
            BindingStrength::Poor => "#e74c3c",
        }
    }
}

/// Reported affinity in kcal/mol (more negative binds tighter).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffinityEstimate {
    pub energy: f64,
    pub strength: BindingStrength,
    pub features: FeatureVector,
}

impl AffinityEstimate {
    /// Wraps a raw model output; the reported energy is its negation.
    pub fn from_prediction(prediction: f64, features: FeatureVector) -> Self {
        let energy = -prediction;
        Self { energy, strength: BindingStrength::from_energy(energy), features }
    }
}

impl fmt::Display for AffinityEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicted Binding Affinity: {:.2} kcal/mol", self.energy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FEATURE_COUNT;

    #[test]
    fn test_band_boundaries() {
        let cases = [
            (-12.0, BindingStrength::Strong),
            (-10.0, BindingStrength::Strong),
            (-9.99, BindingStrength::Good),
            (-8.0, BindingStrength::Good),
            (-7.99, BindingStrength::Moderate),
            (-6.0, BindingStrength::Moderate),
            (-5.99, BindingStrength::Poor),
            (0.0, BindingStrength::Poor),
        ];
        for (energy, expected) in cases {
            assert_eq!(BindingStrength::from_energy(energy), expected, "energy {}", energy);
        }
    }

    #[test]
    fn test_estimate_negates_prediction() {
        let est = AffinityEstimate::from_prediction(8.4567, FeatureVector([0.0; FEATURE_COUNT]));
        assert_eq!(est.energy, -8.4567);
        assert_eq!(est.strength, BindingStrength::Good);
        assert_eq!(est.to_string(), "Predicted Binding Affinity: -8.46 kcal/mol");
        assert_eq!(est.strength.label(), "good");
    }
}
