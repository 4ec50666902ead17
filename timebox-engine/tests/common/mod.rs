#![allow(dead_code)]

use std::sync::Once;
use timebox_engine::models::{Segment, SegmentKind, Workout};

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .init();
    });
}

/// Focus labels the engine recognizes, plus one it does not
pub const FOCUS_LABELS: [&str; 6] = ["Recovery", "Endurance", "SweetSpot", "Threshold", "VO2", "Tempo"];

/// Hand-built timeline touching every segment kind, cadence and notes
pub fn mixed_workout() -> Workout {
    Workout::new(
        "Mixed & matched",
        "VO2",
        vec![
            Segment::ramp(SegmentKind::Warmup, 600, 0.5, 0.8).with_note("Warmup"),
            Segment::ramp(SegmentKind::Ramp, 240, 0.8, 1.05),
            Segment::steady(180, 1.15).with_cadence(105).with_note("Work <hard>"),
            Segment::steady(120, 0.55).with_note("Recover"),
            Segment::steady(45, 2.5).with_cadence(120),
            Segment::ramp(SegmentKind::Cooldown, 300, 0.65, 0.5).with_note("Cooldown"),
        ],
    )
    .with_description("Every element type")
}
