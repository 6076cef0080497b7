use serde::Serialize;

use super::domain::{Grade, LeadScore, PriorityTier};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeCount {
    pub grade: Grade,
    pub grade_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriorityCount {
    pub priority: PriorityTier,
    pub priority_label: &'static str,
    pub count: usize,
}

/// Portfolio-level view over the current scores.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreboardSummary {
    pub total_cases: usize,
    pub average_score: f64,
    pub average_conversion_probability: f64,
    pub urgent_cases: usize,
    pub by_grade: Vec<GradeCount>,
    pub by_priority: Vec<PriorityCount>,
}

impl ScoreboardSummary {
    pub fn from_scores(scores: &[LeadScore]) -> Self {
        let total_cases = scores.len();
        let mean = |value: fn(&LeadScore) -> f64| {
            if total_cases == 0 {
                0.0
            } else {
                let sum: f64 = scores.iter().map(value).sum();
                (sum / total_cases as f64 * 10.0).round() / 10.0
            }
        };

        let by_grade = Grade::ordered()
            .into_iter()
            .map(|grade| GradeCount {
                grade,
                grade_label: grade.label(),
                count: scores.iter().filter(|score| score.grade == grade).count(),
            })
            .collect();

        let by_priority: Vec<PriorityCount> = PriorityTier::ordered()
            .into_iter()
            .map(|priority| PriorityCount {
                priority,
                priority_label: priority.label(),
                count: scores
                    .iter()
                    .filter(|score| score.priority == priority)
                    .count(),
            })
            .collect();

        let urgent_cases = by_priority
            .iter()
            .find(|entry| entry.priority == PriorityTier::Urgent)
            .map(|entry| entry.count)
            .unwrap_or(0);

        Self {
            total_cases,
            average_score: mean(|score| score.total_score),
            average_conversion_probability: mean(|score| score.conversion_probability),
            urgent_cases,
            by_grade,
            by_priority,
        }
    }
}
