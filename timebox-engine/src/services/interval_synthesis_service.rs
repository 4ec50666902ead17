use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{EngineError, EngineResult};
use crate::models::{Focus, Segment, SegmentKind, Workout, MIN_SEGMENT_SECONDS};
use crate::rounding::RoundTo;
use crate::services::guardrail_service::sanitize;

/// Shortest session the engine will build
pub const MIN_DURATION_MINUTES: u32 = 20;

/// Longest session the engine will build (24 hours)
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Largest total-time mismatch absorbed into the last segment
pub const SNAP_TOLERANCE_SECONDS: i64 = 60;

const MIN_RAMP_WINDOW_SECONDS: u32 = 5 * 60;
const WARMUP_PERCENT: u32 = 12;
const COOLDOWN_PERCENT: u32 = 8;

const WARMUP_LOW: f64 = 0.60;
const WARMUP_HIGH: f64 = 0.75;
const COOLDOWN_HIGH: f64 = 0.60;
const COOLDOWN_LOW: f64 = 0.50;
const RECOVERY_POWER: f64 = 0.55;
const FILL_POWER: f64 = 0.65;
const JITTER: f64 = 0.03;

/// How intervals in a repeated main set draw their targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityPolicy {
    /// Every work/recovery pair draws its own durations and powers
    #[default]
    PerRepetition,
    /// One draw is reused for every pair of the session
    PerSession,
}

/// Request for a time-boxed interval workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub duration_minutes: u32,
    pub focus: String,
    #[serde(default)]
    pub vary: bool,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub intensity_policy: IntensityPolicy,
}

impl BuildRequest {
    pub fn new(duration_minutes: u32, focus: impl Into<String>) -> Self {
        Self {
            duration_minutes,
            focus: focus.into(),
            vary: false,
            seed: None,
            intensity_policy: IntensityPolicy::default(),
        }
    }

    pub fn with_vary(mut self, vary: bool) -> Self {
        self.vary = vary;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_policy(mut self, policy: IntensityPolicy) -> Self {
        self.intensity_policy = policy;
        self
    }
}

/// Ranges for one repeated-block main set
#[derive(Debug, Clone, Copy)]
struct BlockTemplate {
    work_seconds: (u32, u32),
    work_power: (f64, f64),
    recovery_seconds: (u32, u32),
}

const SWEET_SPOT_BLOCKS: BlockTemplate = BlockTemplate {
    work_seconds: (8 * 60, 12 * 60),
    work_power: (0.88, 0.94),
    recovery_seconds: (2 * 60, 4 * 60),
};

const THRESHOLD_BLOCKS: BlockTemplate = BlockTemplate {
    work_seconds: (12 * 60, 20 * 60),
    work_power: (0.95, 1.02),
    recovery_seconds: (3 * 60, 5 * 60),
};

const VO2_BLOCKS: BlockTemplate = BlockTemplate {
    work_seconds: (2 * 60, 4 * 60),
    work_power: (1.10, 1.18),
    recovery_seconds: (2 * 60, 4 * 60),
};

/// Build a workout from positional arguments.
///
/// A `seed` makes the result reproducible; without one the generator is
/// seeded from system entropy. Either way the generator belongs to this call.
pub fn build_workout(
    duration_minutes: u32,
    focus: &str,
    vary: bool,
    seed: Option<u64>,
) -> EngineResult<Workout> {
    build(&BuildRequest::new(duration_minutes, focus).with_vary(vary).with_seed(seed))
}

/// Build a workout, seeding a private generator from `request.seed`.
pub fn build(request: &BuildRequest) -> EngineResult<Workout> {
    let mut rng = match request.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    build_with_rng(request, &mut rng)
}

/// Build a workout drawing randomness from a caller-owned generator.
/// `request.seed` is ignored here.
pub fn build_with_rng<R: Rng + ?Sized>(
    request: &BuildRequest,
    rng: &mut R,
) -> EngineResult<Workout> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&request.duration_minutes) {
        return Err(EngineError::InvalidDuration {
            minutes: request.duration_minutes,
            minimum: MIN_DURATION_MINUTES,
            maximum: MAX_DURATION_MINUTES,
        });
    }

    // Bounded by MAX_DURATION_MINUTES, so every window fits in u32 seconds.

    let total_seconds = request.duration_minutes * 60;
    let warmup_seconds = (total_seconds * WARMUP_PERCENT / 100).max(MIN_RAMP_WINDOW_SECONDS);
    let cooldown_seconds = (total_seconds * COOLDOWN_PERCENT / 100).max(MIN_RAMP_WINDOW_SECONDS);
    let work_seconds = total_seconds.saturating_sub(warmup_seconds + cooldown_seconds);
    let template = Focus::from_label(&request.focus);

    debug!(
        focus = %request.focus,
        template = %template,
        total_seconds,
        warmup_seconds,
        work_seconds,
        cooldown_seconds,
        vary = request.vary,
        "Allocating workout windows"
    );

    let mut sampler = Sampler {
        rng,
        vary: request.vary,
    };

    let mut segments = Vec::new();

    let warmup_high = if request.vary {
        (WARMUP_HIGH + sampler.jitter(JITTER)).round_to(3)
    } else {
        WARMUP_HIGH
    };
    segments.push(
        Segment::ramp(SegmentKind::Warmup, warmup_seconds, WARMUP_LOW, warmup_high)
            .with_note("Warmup"),
    );

    match template {
        Focus::Endurance => segments.extend(endurance_main_set(work_seconds, &mut sampler)),
        Focus::SweetSpot => segments.extend(repeated_blocks(
            work_seconds,
            &SWEET_SPOT_BLOCKS,
            request.intensity_policy,
            &mut sampler,
        )),
        Focus::Threshold => segments.extend(repeated_blocks(
            work_seconds,
            &THRESHOLD_BLOCKS,
            request.intensity_policy,
            &mut sampler,
        )),
        // Recovery has no main set of its own and shares the short-interval template.
        Focus::Vo2 | Focus::Recovery => segments.extend(repeated_blocks(
            work_seconds,
            &VO2_BLOCKS,
            request.intensity_policy,
            &mut sampler,
        )),
    }

    segments.push(
        Segment::ramp(SegmentKind::Cooldown, cooldown_seconds, COOLDOWN_HIGH, COOLDOWN_LOW)
            .with_note("Cooldown"),
    );

    snap_total(&mut segments, total_seconds);

    let name = format!("{} {}m", request.focus, request.duration_minutes);
    Ok(sanitize(Workout::new(name, request.focus.clone(), segments)))
}

fn endurance_main_set<R: Rng + ?Sized>(work_seconds: u32, sampler: &mut Sampler<'_, R>) -> Vec<Segment> {
    if sampler.vary && work_seconds >= 10 * 60 {
        let half = work_seconds / 2;
        return vec![
            Segment::ramp(SegmentKind::Ramp, half, 0.65, 0.72).with_note("Endurance ramp up"),
            Segment::ramp(SegmentKind::Ramp, work_seconds - half, 0.72, 0.64)
                .with_note("Endurance ramp down"),
        ];
    }

    let power = if sampler.vary {
        (0.63 + sampler.jitter(JITTER)).round_to(3)
    } else {
        FILL_POWER
    };
    vec![Segment::steady(work_seconds, power).with_note("Endurance steady")]
}

/// Work/recovery pairs that never overshoot `window_seconds`; any remainder
/// becomes one steady fill segment.
fn repeated_blocks<R: Rng + ?Sized>(
    window_seconds: u32,
    template: &BlockTemplate,
    policy: IntensityPolicy,
    sampler: &mut Sampler<'_, R>,
) -> Vec<Segment> {
    let session_draw = match policy {
        IntensityPolicy::PerSession => {
            let durations = sampler.block_durations(template);
            let powers = sampler.block_powers(template);
            Some((durations, powers))
        }
        IntensityPolicy::PerRepetition => None,
    };

    let mut segments = Vec::new();
    let mut elapsed = 0u32;

    loop {
        let (work, recovery) = match session_draw {
            Some((durations, _)) => durations,
            None => sampler.block_durations(template),
        };
        if elapsed + work + recovery > window_seconds {
            break;
        }

        let (work_power, recovery_power) = match session_draw {
            Some((_, powers)) => powers,
            None => sampler.block_powers(template),
        };

        segments.push(Segment::steady(work, work_power).with_note("Work"));
        segments.push(Segment::steady(recovery, recovery_power).with_note("Recover"));
        elapsed += work + recovery;
    }

    let leftover = window_seconds - elapsed;
    if leftover > 0 {
        segments.push(Segment::steady(leftover, FILL_POWER).with_note("Steady fill"));
    }

    debug!(
        pairs = segments.len() / 2,
        leftover, "Laid out repeated blocks"
    );

    segments
}

/// Absorb a small total-time mismatch into the last segment.
fn snap_total(segments: &mut [Segment], target_seconds: u32) {
    let current: i64 = segments.iter().map(|s| i64::from(s.duration_seconds)).sum();
    let diff = i64::from(target_seconds) - current;

    if diff == 0 {
        return;
    }
    if diff.abs() > SNAP_TOLERANCE_SECONDS {
        warn!(diff, "Total duration mismatch exceeds snap tolerance; leaving as is");
        return;
    }
    if let Some(last) = segments.last_mut() {
        let adjusted = (i64::from(last.duration_seconds) + diff).max(i64::from(MIN_SEGMENT_SECONDS));
        last.duration_seconds = u32::try_from(adjusted).unwrap_or(u32::MAX);
    }
}

/// Random draws for one build; deterministic draws when `vary` is off.
struct Sampler<'a, R: Rng + ?Sized> {
    rng: &'a mut R,
    vary: bool,
}

impl<R: Rng + ?Sized> Sampler<'_, R> {
    /// Uniform offset in [-amplitude, +amplitude]
    fn jitter(&mut self, amplitude: f64) -> f64 {
        self.rng.gen_range(-amplitude..=amplitude)
    }

    /// Low end of the range, or a uniform draw rounded down to 5 seconds.
    fn pick_seconds(&mut self, (lo, hi): (u32, u32)) -> u32 {
        if !self.vary || lo == hi {
            return lo;
        }
        let value = self.rng.gen_range(lo..=hi);
        (value / 5) * 5
    }

    /// Midpoint of the range, or a uniform draw; both to 3 decimals.
    fn pick_power(&mut self, (lo, hi): (f64, f64)) -> f64 {
        if !self.vary || (hi - lo).abs() < f64::EPSILON {
            return ((lo + hi) / 2.0).round_to(3);
        }
        (lo + self.rng.gen::<f64>() * (hi - lo)).round_to(3)
    }

    fn block_durations(&mut self, template: &BlockTemplate) -> (u32, u32) {
        let work = self.pick_seconds(template.work_seconds);
        let recovery = self.pick_seconds(template.recovery_seconds);
        (work, recovery)
    }

    fn block_powers(&mut self, template: &BlockTemplate) -> (f64, f64) {
        let work = self.pick_power(template.work_power);
        let recovery = if self.vary {
            (RECOVERY_POWER + self.jitter(JITTER)).round_to(3)
        } else {
            RECOVERY_POWER
        };
        (work, recovery)
    }
}
