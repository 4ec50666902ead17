use crate::models::Workout;

/// Encode a workout as a line-oriented breakpoint (`.mrc`) course.
///
/// Each segment becomes two `offset<TAB>percent` lines, one at its start and
/// one at its end, both at `100 × power_start`. Ramps are flattened to their
/// starting power because a breakpoint pair has no slope of its own.
pub fn encode_breakpoints(workout: &Workout) -> String {
    let description = workout.name.replace(['\r', '\n'], " ");
    let mut lines = vec![
        "[COURSE HEADER]".to_string(),
        "VERSION = 2".to_string(),
        "UNITS = ENGLISH".to_string(),
        format!("DESCRIPTION = {description}"),
        "[END COURSE HEADER]".to_string(),
        "[COURSE DATA]".to_string(),
    ];

    let mut offset: u64 = 0;
    for segment in &workout.segments {
        let percent = 100.0 * segment.power_start;
        lines.push(format!("{offset}\t{percent:.1}"));
        offset += u64::from(segment.duration_seconds);
        lines.push(format!("{offset}\t{percent:.1}"));
    }

    lines.push("[END COURSE DATA]".to_string());

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
