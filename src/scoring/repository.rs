use serde::{Deserialize, Serialize};

use super::domain::{CaseId, CaseRecord, Grade, LeadScore, PriorityTier, ScoringRule};

pub const LEAD_RESCORED: &str = "lead.rescored";

/// Read access to the authoritative case records.
pub trait CaseStore: Send + Sync {
    fn fetch(&self, id: &CaseId) -> Result<Option<CaseRecord>, RepositoryError>;
    fn list(&self) -> Result<Vec<CaseRecord>, RepositoryError>;
}

/// Persistence for rule configuration. Only validated rules are ever saved.
pub trait RuleStore: Send + Sync {
    fn load(&self) -> Result<Vec<ScoringRule>, RepositoryError>;
    /// Insert or replace the rule sharing `rule.id`.
    fn save(&self, rule: ScoringRule) -> Result<(), RepositoryError>;
    /// Insert a new rule; `RepositoryError::Conflict` when the id is already stored.
    fn insert(&self, rule: ScoringRule) -> Result<(), RepositoryError>;
}

/// Latest score per case with replace semantics.
pub trait ScoreStore: Send + Sync {
    /// Store `score`, returning the snapshot it replaced.
    fn upsert(&self, score: LeadScore) -> Result<Option<LeadScore>, RepositoryError>;
    fn fetch(&self, id: &CaseId) -> Result<Option<LeadScore>, RepositoryError>;
    fn all(&self) -> Result<Vec<LeadScore>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook for the notification and assignment side.
pub trait ScoreEventPublisher: Send + Sync {
    fn publish(&self, event: LeadRescoredEvent) -> Result<(), EventError>;
}

/// Payload emitted after a case's score has been replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadRescoredEvent {
    pub event: String,
    pub case_id: CaseId,
    pub total_score: f64,
    pub grade: Grade,
    pub priority: PriorityTier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_priority: Option<PriorityTier>,
    pub priority_changed: bool,
}

impl LeadRescoredEvent {
    pub fn new(score: &LeadScore, previous: Option<&LeadScore>) -> Self {
        let previous_priority = previous.map(|previous| previous.priority);
        Self {
            event: LEAD_RESCORED.to_string(),
            case_id: score.case_id.clone(),
            total_score: score.total_score,
            grade: score.grade,
            priority: score.priority,
            previous_priority,
            priority_changed: previous_priority != Some(score.priority),
        }
    }
}

/// Event dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("event transport unavailable: {0}")]
    Transport(String),
}

/// Publisher for deployments without a notification consumer.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopPublisher;

impl ScoreEventPublisher for NoopPublisher {
    fn publish(&self, _event: LeadRescoredEvent) -> Result<(), EventError> {
        Ok(())
    }
}
