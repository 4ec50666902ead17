use serde::{Deserialize, Serialize};

/// Load metrics for a whole workout
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkoutMetrics {
    /// Root-mean-square of normalized power over time, 3 decimals
    pub intensity_factor: f64,
    /// Training Stress Score, 1 decimal (100 = one hour at IF 1.0)
    pub training_stress_score: f64,
}

impl WorkoutMetrics {
    pub fn as_tuple(&self) -> (f64, f64) {
        (self.intensity_factor, self.training_stress_score)
    }
}
