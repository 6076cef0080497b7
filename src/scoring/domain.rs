use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for customer cases.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseId(pub String);

impl CaseId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authoritative case record as handed over by the case store.
///
/// The typed core carries what every case has; domain-specific extras travel in
/// `custom_fields` and are parsed by the feature extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    #[serde(default)]
    pub id: Option<CaseId>,
    #[serde(default)]
    pub full_name: String,
    pub total_fees: f64,
    pub paid_amount: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub documents_required: u32,
    #[serde(default)]
    pub documents_submitted: u32,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
}

impl CaseRecord {
    pub fn custom_field(&self, key: &str) -> Option<&str> {
        self.custom_fields
            .get(key)
            .map(String::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Scoring factor families. Recommendations are keyed on these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Demographic,
    Financial,
    Timeline,
    Documents,
    Engagement,
    Referral,
}

impl RuleCategory {
    pub const fn label(self) -> &'static str {
        match self {
            RuleCategory::Demographic => "demographic",
            RuleCategory::Financial => "financial",
            RuleCategory::Timeline => "timeline",
            RuleCategory::Documents => "documents",
            RuleCategory::Engagement => "engagement",
            RuleCategory::Referral => "referral",
        }
    }
}

/// Declarative description of one weighted scoring factor.
///
/// `weight` is the maximum sub-score the rule can contribute. The predicate is referenced by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringRule {
    pub id: String,
    pub category: RuleCategory,
    pub weight: f64,
    pub enabled: bool,
    pub description: String,
}

impl ScoringRule {
    pub fn new(
        id: impl Into<String>,
        category: RuleCategory,
        weight: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            weight,
            enabled: true,
            description: description.into(),
        }
    }
}

/// Qualitative reading of a factor result against the rule's own thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Positive,
    Neutral,
    Negative,
}

/// Contribution of one enabled rule to a lead score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringFactorResult {
    pub rule_id: String,
    pub category: RuleCategory,
    pub factor_name: String,
    pub weight: f64,
    pub score: f64,
    pub impact: Impact,
}

/// Letter bucket derived from the normalized score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
}

impl Grade {
    pub const fn label(self) -> &'static str {
        match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::D => "D",
        }
    }

    pub const fn ordered() -> [Grade; 7] {
        [
            Grade::APlus,
            Grade::A,
            Grade::BPlus,
            Grade::B,
            Grade::CPlus,
            Grade::C,
            Grade::D,
        ]
    }
}

/// Triage tier; declaration order is most to least pressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    Urgent,
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub const fn label(self) -> &'static str {
        match self {
            PriorityTier::Urgent => "urgent",
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
        }
    }

    pub const fn ordered() -> [PriorityTier; 4] {
        [
            PriorityTier::Urgent,
            PriorityTier::High,
            PriorityTier::Medium,
            PriorityTier::Low,
        ]
    }
}

/// Scoring snapshot for one case. Always replaced wholesale on recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadScore {
    pub case_id: CaseId,
    pub total_score: f64,
    pub grade: Grade,
    pub priority: PriorityTier,
    pub factors: Vec<ScoringFactorResult>,
    /// Heuristic estimate, not a calibrated probability.
    pub conversion_probability: f64,
    pub recommended_actions: Vec<String>,
    pub computed_at: DateTime<Utc>,
}
