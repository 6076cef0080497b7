use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::super::domain::{CaseId, Grade, PriorityTier, ScoringFactorResult};
use crate::config::MAX_EXPLORATION_SPREAD;

/// Normalized outcome of one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregation {
    pub total_score: f64,
    pub grade: Grade,
    pub priority: PriorityTier,
    pub conversion_probability: f64,
}

/// Exploratory nudge applied on top of the normalized score for the conversion estimate.
///
/// The nudge is drawn from a generator seeded by the policy seed and the case id, so a case always
/// receives the same adjustment under the same policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum ExplorationPolicy {
    #[default]
    Disabled,
    Seeded { seed: u64, spread: f64 },
}

impl ExplorationPolicy {
    pub fn seeded(seed: u64, spread: f64) -> Self {
        if !spread.is_finite() || spread <= 0.0 {
            return Self::Disabled;
        }
        Self::Seeded {
            seed,
            spread: spread.min(MAX_EXPLORATION_SPREAD),
        }
    }

    /// Nudge for `case_id`; zero when disabled or when the spread is not a positive finite value.
    pub fn adjustment(&self, case_id: &CaseId) -> f64 {
        match *self {
            ExplorationPolicy::Seeded { seed, spread } if spread.is_finite() && spread > 0.0 => {
                let spread = spread.min(MAX_EXPLORATION_SPREAD);
                let mut rng = StdRng::seed_from_u64(seed ^ stable_hash(case_id.as_str()));
                rng.gen_range(-spread..=spread)
            }
            _ => 0.0,
        }
    }
}

// FNV-1a; must stay stable across builds so adjustments are reproducible.
fn stable_hash(value: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    value.bytes().fold(OFFSET, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(PRIME)
    })
}

/// Normalize evaluated factors against the weight actually evaluated.
pub fn aggregate(
    case_id: &CaseId,
    results: &[ScoringFactorResult],
    exploration: &ExplorationPolicy,
) -> Aggregation {
    let raw_total: f64 = results.iter().map(|result| result.score).sum();
    let max_possible: f64 = results.iter().map(|result| result.weight).sum();

    let normalized = if max_possible > 0.0 {
        (raw_total / max_possible * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    let conversion_probability =
        round_tenths((normalized + exploration.adjustment(case_id)).clamp(0.0, 100.0));

    Aggregation {
        total_score: round_tenths(normalized),
        grade: grade_for(normalized),
        priority: priority_for(normalized),
        conversion_probability,
    }
}

// Absorbs float noise such as 88/110*100 landing a hair under 80.
const BAND_TOLERANCE: f64 = 1e-9;

fn reaches(score: f64, cutoff: f64) -> bool {
    score + BAND_TOLERANCE >= cutoff
}

pub fn grade_for(score: f64) -> Grade {
    if reaches(score, 90.0) {
        Grade::APlus
    } else if reaches(score, 80.0) {
        Grade::A
    } else if reaches(score, 70.0) {
        Grade::BPlus
    } else if reaches(score, 60.0) {
        Grade::B
    } else if reaches(score, 50.0) {
        Grade::CPlus
    } else if reaches(score, 40.0) {
        Grade::C
    } else {
        Grade::D
    }
}

pub fn priority_for(score: f64) -> PriorityTier {
    if reaches(score, 80.0) {
        PriorityTier::Urgent
    } else if reaches(score, 65.0) {
        PriorityTier::High
    } else if reaches(score, 45.0) {
        PriorityTier::Medium
    } else {
        PriorityTier::Low
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
