use super::super::domain::{Impact, RuleCategory, ScoringFactorResult};

pub const MAX_RECOMMENDATIONS: usize = 4;

pub const IMMEDIATE_OUTREACH: &str = "Prioritize immediate outreach";
pub const FOLLOW_UP_24H: &str = "Follow up within 24 hours";
pub const NURTURE: &str = "Nurture lead and address profile gaps";

/// Factors earning less than this share of their weight get a remediation.
const UNDERPERFORMING_SHARE: f64 = 0.5;

pub fn remediation_for(category: RuleCategory) -> &'static str {
    match category {
        RuleCategory::Financial => "Discuss a structured payment plan",
        RuleCategory::Documents => "Offer document preparation assistance",
        RuleCategory::Timeline => "Review timeline expectations with the client",
        RuleCategory::Engagement => "Increase contact cadence",
        RuleCategory::Demographic => "Schedule an eligibility consultation",
        RuleCategory::Referral => "Request a referral or partner introduction",
    }
}

fn base_for(total_score: f64) -> &'static str {
    if total_score >= 80.0 {
        IMMEDIATE_OUTREACH
    } else if total_score >= 60.0 {
        FOLLOW_UP_24H
    } else {
        NURTURE
    }
}

/// Band action first, then one remediation per underperforming factor, unique and capped.
pub fn recommend(results: &[ScoringFactorResult], total_score: f64) -> Vec<String> {
    let mut actions: Vec<String> = vec![base_for(total_score).to_string()];

    let remediations = results
        .iter()
        .filter(|result| {
            result.impact == Impact::Negative
                || result.score < result.weight * UNDERPERFORMING_SHARE
        })
        .map(|result| remediation_for(result.category));

    for action in remediations {
        if actions.len() == MAX_RECOMMENDATIONS {
            break;
        }
        if !actions.iter().any(|existing| existing == action) {
            actions.push(action.to_string());
        }
    }

    actions
}
