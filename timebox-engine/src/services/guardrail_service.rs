use tracing::debug;

use crate::models::{
    Segment, Workout, MAX_POWER_FRACTION, MIN_POWER_FRACTION, MIN_SEGMENT_SECONDS,
};

/// Normalize a workout so every segment satisfies the timeline bounds.
///
/// Total over any well-typed input: values are clamped, never rejected.
/// Rules run per segment in this order:
/// 1. duration floored to [`MIN_SEGMENT_SECONDS`]
/// 2. start power clamped to [`MIN_POWER_FRACTION`, `MAX_POWER_FRACTION`]
/// 3. end power dropped unless the segment is a warmup or cooldown
/// 4. a remaining end power clamped to the same range
///
/// No smoothing is applied between neighbouring segments.
pub fn sanitize(workout: Workout) -> Workout {
    let Workout {
        name,
        focus,
        description,
        segments,
    } = workout;

    let segments = segments
        .into_iter()
        .enumerate()
        .map(|(index, segment)| sanitize_segment(index, segment))
        .collect();

    Workout {
        name,
        focus,
        description,
        segments,
    }
}

fn sanitize_segment(index: usize, mut segment: Segment) -> Segment {
    if segment.duration_seconds < MIN_SEGMENT_SECONDS {
        debug!(
            index,
            duration = segment.duration_seconds,
            "Raising segment duration to minimum"
        );
        segment.duration_seconds = MIN_SEGMENT_SECONDS;
    }

    segment.power_start = clamp_power(segment.power_start);

    if !segment.kind.may_ramp() {
        if segment.power_end.take().is_some() {
            debug!(index, kind = %segment.kind, "Flattening ramp on non-warmup/cooldown segment");
        }
    } else if let Some(end) = segment.power_end {
        segment.power_end = Some(clamp_power(end));
    }

    segment
}

/// Clamp a power fraction into the allowed range. NaN maps to the floor.
pub fn clamp_power(value: f64) -> f64 {
    if value.is_nan() {
        MIN_POWER_FRACTION
    } else {
        value.clamp(MIN_POWER_FRACTION, MAX_POWER_FRACTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SegmentKind;
    use proptest::prelude::*;

    fn workout_of(segments: Vec<Segment>) -> Workout {
        Workout::new("Guarded", "VO2", segments)
    }

    #[test]
    fn test_floors_short_durations() {
        let out = sanitize(workout_of(vec![Segment::steady(0, 1.0), Segment::steady(3, 1.0)]));
        assert!(out.segments.iter().all(|s| s.duration_seconds == 5));
    }

    #[test]
    fn test_clamps_start_power() {
        let out = sanitize(workout_of(vec![
            Segment::steady(60, 0.1),
            Segment::steady(60, 4.5),
            Segment::steady(60, f64::NAN),
        ]));
        assert_eq!(out.segments[0].power_start, 0.50);
        assert_eq!(out.segments[1].power_start, 3.00);
        assert_eq!(out.segments[2].power_start, 0.50);
    }

    #[test]
    fn test_drops_end_power_outside_warmup_and_cooldown() {
        let out = sanitize(workout_of(vec![
            Segment::ramp(SegmentKind::Ramp, 300, 0.65, 0.72),
            Segment {
                power_end: Some(1.2),
                ..Segment::steady(60, 0.9)
            },
        ]));
        assert_eq!(out.segments[0].power_end, None);
        assert_eq!(out.segments[0].kind, SegmentKind::Ramp);
        assert_eq!(out.segments[1].power_end, None);
    }

    #[test]
    fn test_clamps_end_power_independently() {
        let out = sanitize(workout_of(vec![
            Segment::ramp(SegmentKind::Warmup, 300, 0.2, 0.75),
            Segment::ramp(SegmentKind::Cooldown, 300, 0.6, 0.1),
        ]));
        assert_eq!(out.segments[0].power_start, 0.50);
        assert_eq!(out.segments[0].power_end, Some(0.75));
        assert_eq!(out.segments[1].power_start, 0.60);
        assert_eq!(out.segments[1].power_end, Some(0.50));
    }

    #[test]
    fn test_keeps_large_jumps_and_passthrough_fields() {
        let out = sanitize(workout_of(vec![
            Segment::steady(30, 0.5).with_cadence(85).with_note("Spin"),
            Segment::steady(30, 2.5),
        ]));
        assert_eq!(out.segments[0].cadence, Some(85));
        assert_eq!(out.segments[0].note.as_deref(), Some("Spin"));
        assert_eq!(out.segments[1].power_start, 2.5);
    }

    fn any_kind() -> impl Strategy<Value = SegmentKind> {
        prop_oneof![
            Just(SegmentKind::Steady),
            Just(SegmentKind::Ramp),
            Just(SegmentKind::Warmup),
            Just(SegmentKind::Cooldown),
        ]
    }

    fn any_segment() -> impl Strategy<Value = Segment> {
        (
            0u32..4000,
            -1.0f64..5.0,
            proptest::option::of(-1.0f64..5.0),
            any_kind(),
        )
            .prop_map(|(duration_seconds, power_start, power_end, kind)| Segment {
                duration_seconds,
                power_start,
                power_end,
                kind,
                cadence: None,
                note: None,
            })
    }

    proptest! {
        #[test]
        fn prop_sanitize_is_idempotent(segments in proptest::collection::vec(any_segment(), 0..20)) {
            let once = sanitize(workout_of(segments));
            let twice = sanitize(once.clone());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_sanitized_segments_are_within_bounds(segments in proptest::collection::vec(any_segment(), 0..20)) {
            let out = sanitize(workout_of(segments));
            for s in &out.segments {
                prop_assert!(s.duration_seconds >= MIN_SEGMENT_SECONDS);
                prop_assert!((MIN_POWER_FRACTION..=MAX_POWER_FRACTION).contains(&s.power_start));
                if let Some(end) = s.power_end {
                    prop_assert!(s.kind.may_ramp());
                    prop_assert!((MIN_POWER_FRACTION..=MAX_POWER_FRACTION).contains(&end));
                }
            }
        }
    }
}
