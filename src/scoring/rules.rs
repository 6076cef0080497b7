use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::domain::{RuleCategory, ScoringRule};
use super::evaluation::predicates;

pub const MAX_RULE_WEIGHT: f64 = 100.0;

/// Rejections raised before a rule change reaches the store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuleConfigError {
    #[error("rule id must not be empty")]
    EmptyRuleId,
    #[error("rule {rule_id} weight {weight} outside 0..=100")]
    InvalidWeight { rule_id: String, weight: f64 },
    #[error("rule {0} is defined more than once")]
    DuplicateRule(String),
    #[error("rule {0} does not exist")]
    UnknownRule(String),
}

/// Partial change to one rule's configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleUpdate {
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// Validated, ordered rule collection. Used as an immutable snapshot for a scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    rules: Vec<ScoringRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ScoringRule>) -> Result<Self, RuleConfigError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            validate_rule(rule)?;
            if !seen.insert(rule.id.as_str()) {
                return Err(RuleConfigError::DuplicateRule(rule.id.clone()));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[ScoringRule] {
        &self.rules
    }

    pub fn enabled(&self) -> impl Iterator<Item = &ScoringRule> {
        self.rules.iter().filter(|rule| rule.enabled)
    }

    pub fn get(&self, rule_id: &str) -> Option<&ScoringRule> {
        self.rules.iter().find(|rule| rule.id == rule_id)
    }

    /// Sum of enabled weights; the normalization denominator when every rule evaluates.
    pub fn enabled_weight(&self) -> f64 {
        self.enabled().map(|rule| rule.weight).sum()
    }

    /// Rule with `update` applied, validated but not yet stored.
    pub fn updated_rule(
        &self,
        rule_id: &str,
        update: &RuleUpdate,
    ) -> Result<ScoringRule, RuleConfigError> {
        let mut rule = self
            .get(rule_id)
            .cloned()
            .ok_or_else(|| RuleConfigError::UnknownRule(rule_id.to_string()))?;
        if let Some(weight) = update.weight {
            rule.weight = weight;
        }
        if let Some(enabled) = update.enabled {
            rule.enabled = enabled;
        }
        validate_rule(&rule)?;
        Ok(rule)
    }

    /// Copy of the set with `rule` replacing the entry sharing its id, or appended.
    pub fn with_rule(&self, rule: ScoringRule) -> Result<Self, RuleConfigError> {
        validate_rule(&rule)?;
        let mut rules = self.rules.clone();
        match rules.iter_mut().find(|existing| existing.id == rule.id) {
            Some(existing) => *existing = rule,
            None => rules.push(rule),
        }
        Ok(Self { rules })
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

pub(crate) fn validate_rule(rule: &ScoringRule) -> Result<(), RuleConfigError> {
    if rule.id.trim().is_empty() {
        return Err(RuleConfigError::EmptyRuleId);
    }
    if !rule.weight.is_finite() || !(0.0..=MAX_RULE_WEIGHT).contains(&rule.weight) {
        return Err(RuleConfigError::InvalidWeight {
            rule_id: rule.id.clone(),
            weight: rule.weight,
        });
    }
    Ok(())
}

/// Stock rule set covering every built-in predicate.
pub fn default_rules() -> Vec<ScoringRule> {
    vec![
        ScoringRule::new(
            predicates::AGE_PROFILE,
            RuleCategory::Demographic,
            10.0,
            "Applicant age within the preferred program window",
        ),
        ScoringRule::new(
            predicates::EDUCATION_LEVEL,
            RuleCategory::Demographic,
            10.0,
            "Highest completed education level",
        ),
        ScoringRule::new(
            predicates::LANGUAGE_PROFICIENCY,
            RuleCategory::Demographic,
            15.0,
            "Language test band meets the admission threshold",
        ),
        ScoringRule::new(
            predicates::FINANCIAL_CAPACITY,
            RuleCategory::Financial,
            25.0,
            "Share of total fees already paid",
        ),
        ScoringRule::new(
            predicates::DEADLINE_RUNWAY,
            RuleCategory::Timeline,
            15.0,
            "Days left before the case deadline",
        ),
        ScoringRule::new(
            predicates::DOCUMENT_COMPLETENESS,
            RuleCategory::Documents,
            15.0,
            "Share of required documents submitted",
        ),
        ScoringRule::new(
            predicates::RESPONSIVENESS,
            RuleCategory::Engagement,
            10.0,
            "Hours between case creation and first contact",
        ),
        ScoringRule::new(
            predicates::REFERRAL_SOURCE,
            RuleCategory::Referral,
            10.0,
            "Quality of the referral channel",
        ),
    ]
}
