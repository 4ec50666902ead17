mod common;

use common::{mixed_workout, FOCUS_LABELS};
use pretty_assertions::assert_eq;
use timebox_engine::{build_workout, decode_structured, encode_structured, Workout};

fn rendered(workout: &Workout) -> Vec<(String, u32, f64, Option<f64>, Option<u32>, Option<String>)> {
    workout
        .segments
        .iter()
        .map(|s| {
            let kind = s.rendered_kind();
            let end = if kind.is_ramp_capable() { s.power_end } else { None };
            (
                kind.to_string(),
                s.duration_seconds,
                s.power_start,
                end,
                s.cadence,
                s.note.clone(),
            )
        })
        .collect()
}

#[test]
fn test_mixed_workout_round_trips() {
    let workout = mixed_workout();
    let bytes = encode_structured(&workout, Some("Coach"), None).unwrap();
    let document = decode_structured(&bytes).unwrap();

    assert_eq!(document.name, "Mixed & matched");
    assert_eq!(document.author.as_deref(), Some("Coach"));
    assert_eq!(document.description.as_deref(), Some("Every element type"));
    assert_eq!(rendered(&document.into_workout("VO2")), rendered(&workout));
}

#[test]
fn test_generated_workouts_round_trip() {
    for focus in FOCUS_LABELS {
        for seed in 0..5 {
            let workout = build_workout(60, focus, true, Some(seed)).unwrap();
            let bytes = encode_structured(&workout, None, None).unwrap();
            let decoded = decode_structured(&bytes).unwrap().into_workout(focus);

            assert_eq!(decoded.total_duration_seconds(), workout.total_duration_seconds());
            assert_eq!(rendered(&decoded), rendered(&workout));
        }
    }
}

#[test]
fn test_reencoding_is_byte_identical() {
    let workout = build_workout(45, "Threshold", false, None).unwrap();
    let first = encode_structured(&workout, Some("A"), Some("B")).unwrap();
    let decoded = decode_structured(&first).unwrap();
    let second = encode_structured(
        &decoded.into_workout("Threshold"),
        Some("A"),
        Some("B"),
    )
    .unwrap();

    assert_eq!(String::from_utf8(first).unwrap(), String::from_utf8(second).unwrap());
}
