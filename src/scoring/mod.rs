//! Case scoring pipeline: feature extraction, weighted rule evaluation, normalization into grade
//! and priority tier, and next-action recommendations.
//!
//! Case records flow `CaseStore -> extract -> evaluate (per enabled rule) -> aggregate ->
//! recommend`, and the resulting `LeadScore` replaces the stored snapshot for that case.

pub mod clock;
pub mod domain;
pub mod evaluation;
pub mod features;
pub mod report;
pub mod repository;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    CaseId, CaseRecord, Grade, Impact, LeadScore, PriorityTier, RuleCategory, ScoringFactorResult,
    ScoringRule,
};
pub use evaluation::{ExplorationPolicy, ScoringEngine};
pub use features::{CaseFeatures, EducationLevel, MalformedCase, ReferralClass};
pub use report::ScoreboardSummary;
pub use repository::{
    CaseStore, EventError, LeadRescoredEvent, NoopPublisher, RepositoryError, RuleStore,
    ScoreEventPublisher, ScoreStore,
};
pub use rules::{default_rules, RuleConfigError, RuleSet, RuleUpdate};
pub use service::{
    BatchCancellation, BatchFailure, BatchOutcome, BatchReport, LeadScoringService, ScoringError,
    ScoringOptions,
};
