mod aggregate;
pub mod predicates;
mod recommend;

pub use aggregate::{aggregate, grade_for, priority_for, Aggregation, ExplorationPolicy};
pub use recommend::{
    recommend, remediation_for, FOLLOW_UP_24H, IMMEDIATE_OUTREACH, MAX_RECOMMENDATIONS, NURTURE,
};

use chrono::{DateTime, Utc};
use tracing::warn;

use super::domain::{Impact, LeadScore, ScoringFactorResult, ScoringRule};
use super::features::CaseFeatures;
use super::rules::RuleSet;

/// Apply one rule to one feature set.
///
/// Disabled rules and rules without a built-in predicate yield `None` and take no part in
/// normalization.
pub fn evaluate(rule: &ScoringRule, features: &CaseFeatures) -> Option<ScoringFactorResult> {
    if !rule.enabled {
        return None;
    }

    let Some(predicate) = predicates::lookup(&rule.id) else {
        warn!(
            rule_id = %rule.id,
            case_id = %features.case_id,
            "no predicate registered for rule; contributing nothing"
        );
        return None;
    };

    let attainment = (predicate.attainment)(features).clamp(0.0, 1.0);
    let impact = if attainment >= predicate.positive_at {
        Impact::Positive
    } else if attainment < predicate.negative_below {
        Impact::Negative
    } else {
        Impact::Neutral
    };

    Some(ScoringFactorResult {
        rule_id: rule.id.clone(),
        category: rule.category,
        factor_name: predicate.factor_name.to_string(),
        weight: rule.weight,
        score: rule.weight * attainment,
        impact,
    })
}

/// Stateless pipeline from features to a complete `LeadScore`.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    exploration: ExplorationPolicy,
}

impl ScoringEngine {
    pub fn new(exploration: ExplorationPolicy) -> Self {
        Self { exploration }
    }

    pub fn evaluate_rules(&self, rules: &RuleSet, features: &CaseFeatures) -> Vec<ScoringFactorResult> {
        rules
            .rules()
            .iter()
            .filter_map(|rule| evaluate(rule, features))
            .collect()
    }

    pub fn score(
        &self,
        rules: &RuleSet,
        features: &CaseFeatures,
        computed_at: DateTime<Utc>,
    ) -> LeadScore {
        let factors = self.evaluate_rules(rules, features);
        let aggregation = aggregate(&features.case_id, &factors, &self.exploration);
        let recommended_actions = recommend(&factors, aggregation.total_score);

        LeadScore {
            case_id: features.case_id.clone(),
            total_score: aggregation.total_score,
            grade: aggregation.grade,
            priority: aggregation.priority,
            factors,
            conversion_probability: aggregation.conversion_probability,
            recommended_actions,
            computed_at,
        }
    }
}
