use crate::models::{Segment, Workout, WorkoutMetrics};
use crate::rounding::RoundTo;

/// Compute Intensity Factor and Training Stress Score for a workout.
///
/// Squared power is integrated exactly over each segment: `T·a²` for a steady
/// segment and `T·(a² + a·b + b²)/3` for a linear ramp from `a` to `b`.
/// An empty or zero-length timeline yields zero for both metrics.
pub fn compute(workout: &Workout) -> WorkoutMetrics {
    let total_seconds = workout.total_duration_seconds() as f64;
    if total_seconds <= 0.0 {
        return WorkoutMetrics::default();
    }

    let accumulated: f64 = workout.segments.iter().map(squared_power_integral).sum();
    let mean_square = accumulated / total_seconds;
    let intensity_factor = mean_square.sqrt();
    let training_stress_score = total_seconds * mean_square / 3600.0 * 100.0;

    WorkoutMetrics {
        intensity_factor: intensity_factor.round_to(3),
        training_stress_score: training_stress_score.round_to(1),
    }
}

fn squared_power_integral(segment: &Segment) -> f64 {
    let duration = f64::from(segment.duration_seconds);
    let a = segment.power_start;
    match segment.power_end {
        Some(b) => duration * (a * a + a * b + b * b) / 3.0,
        None => duration * a * a,
    }
}
