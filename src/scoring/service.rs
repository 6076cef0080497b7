use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use super::clock::{Clock, SystemClock};
use super::domain::{CaseId, CaseRecord, LeadScore, ScoringRule};
use super::evaluation::{predicates, ExplorationPolicy, ScoringEngine};
use super::features::{extract, MalformedCase};
use super::report::ScoreboardSummary;
use super::repository::{
    CaseStore, LeadRescoredEvent, RepositoryError, RuleStore, ScoreEventPublisher, ScoreStore,
};
use super::rules::{validate_rule, RuleConfigError, RuleSet, RuleUpdate};
use crate::config::{AppConfig, DEFAULT_BATCH_CONCURRENCY};

/// Runtime knobs for the orchestrator.
#[derive(Debug, Clone)]
pub struct ScoringOptions {
    pub batch_concurrency: usize,
    pub exploration: ExplorationPolicy,
    pub emit_events: bool,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            exploration: ExplorationPolicy::Disabled,
            emit_events: true,
        }
    }
}

impl From<&AppConfig> for ScoringOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            batch_concurrency: config.scoring.batch_concurrency,
            exploration: ExplorationPolicy::seeded(
                config.scoring.exploration_seed,
                config.effective_exploration_spread(),
            ),
            emit_events: config.scoring.emit_events,
        }
    }
}

/// Cooperative stop signal for batch passes. Cases already running finish.
#[derive(Debug, Clone, Default)]
pub struct BatchCancellation {
    cancelled: Arc<AtomicBool>,
}

impl BatchCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// One case that could not be scored during a batch.
#[derive(Debug)]
pub struct BatchFailure {
    pub case_id: Option<CaseId>,
    pub error: ScoringError,
}

/// Structured result of a batch pass; scores keep input order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub scores: Vec<LeadScore>,
    pub failures: Vec<BatchFailure>,
    pub skipped: Vec<Option<CaseId>>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }

    pub fn report(&self) -> BatchReport {
        BatchReport {
            scored: self.scores.len(),
            failed: self.failures.len(),
            skipped: self.skipped.len(),
            failures: self
                .failures
                .iter()
                .map(|failure| BatchFailureView {
                    case_id: failure.case_id.clone(),
                    error: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable digest of a batch pass.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub scored: usize,
    pub failed: usize,
    pub skipped: usize,
    pub failures: Vec<BatchFailureView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailureView {
    pub case_id: Option<CaseId>,
    pub error: String,
}

/// Error raised by the scoring orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("case {0} not found")]
    CaseNotFound(CaseId),
    #[error(transparent)]
    Malformed(#[from] MalformedCase),
    #[error(transparent)]
    RuleConfig(#[from] RuleConfigError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("scoring worker failed: {0}")]
    Worker(String),
}

/// Per-case work shared by single and batch passes; cheap to clone into worker tasks.
struct CasePipeline<S, E> {
    scores: Arc<S>,
    events: Arc<E>,
    engine: Arc<ScoringEngine>,
    clock: Arc<dyn Clock>,
    emit_events: bool,
}

impl<S, E> Clone for CasePipeline<S, E> {
    fn clone(&self) -> Self {
        Self {
            scores: self.scores.clone(),
            events: self.events.clone(),
            engine: self.engine.clone(),
            clock: self.clock.clone(),
            emit_events: self.emit_events,
        }
    }
}

impl<S, E> CasePipeline<S, E>
where
    S: ScoreStore,
    E: ScoreEventPublisher,
{
    fn run(&self, rules: &RuleSet, record: &CaseRecord) -> Result<LeadScore, ScoringError> {
        let as_of = self.clock.now();
        let features = extract(record, as_of)?;
        let score = self.engine.score(rules, &features, as_of);

        let previous = self.scores.upsert(score.clone())?;
        debug!(
            case_id = %score.case_id,
            total_score = score.total_score,
            grade = score.grade.label(),
            priority = score.priority.label(),
            "case rescored"
        );

        if self.emit_events {
            let event = LeadRescoredEvent::new(&score, previous.as_ref());
            if let Err(err) = self.events.publish(event) {
                warn!(case_id = %score.case_id, error = %err, "failed to publish rescore event");
            }
        }

        Ok(score)
    }
}

/// Orchestrator composing the case, rule and score stores with the scoring engine.
pub struct LeadScoringService<C, R, S, E> {
    cases: Arc<C>,
    rules: Arc<R>,
    pipeline: CasePipeline<S, E>,
    batch_concurrency: usize,
}

impl<C, R, S, E> LeadScoringService<C, R, S, E>
where
    C: CaseStore + 'static,
    R: RuleStore + 'static,
    S: ScoreStore + 'static,
    E: ScoreEventPublisher + 'static,
{
    pub fn new(
        cases: Arc<C>,
        rules: Arc<R>,
        scores: Arc<S>,
        events: Arc<E>,
        options: ScoringOptions,
    ) -> Self {
        Self::with_clock(cases, rules, scores, events, options, Arc::new(SystemClock))
    }

    pub fn with_clock(
        cases: Arc<C>,
        rules: Arc<R>,
        scores: Arc<S>,
        events: Arc<E>,
        options: ScoringOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            cases,
            rules,
            pipeline: CasePipeline {
                scores,
                events,
                engine: Arc::new(ScoringEngine::new(options.exploration)),
                clock,
                emit_events: options.emit_events,
            },
            batch_concurrency: options.batch_concurrency.clamp(1, Semaphore::MAX_PERMITS),
        }
    }

    /// Read and validate the current rule configuration.
    pub fn rule_snapshot(&self) -> Result<RuleSet, ScoringError> {
        let rules = self.rules.load()?;
        Ok(RuleSet::new(rules)?)
    }

    /// Recompute and replace the score for one stored case.
    pub fn score_one(&self, case_id: &CaseId) -> Result<LeadScore, ScoringError> {
        let record = self
            .cases
            .fetch(case_id)?
            .ok_or_else(|| ScoringError::CaseNotFound(case_id.clone()))?;
        let rules = self.rule_snapshot()?;
        self.pipeline.run(&rules, &record)
    }

    /// Score every record independently against one rule snapshot.
    pub async fn score_all(&self, cases: Vec<CaseRecord>) -> Result<BatchOutcome, ScoringError> {
        self.score_all_cancellable(cases, &BatchCancellation::new())
            .await
    }

    /// Batch pass that stops admitting cases once `cancellation` fires.
    ///
    /// Only a rule configuration that cannot be read fails the whole pass; per-case errors are
    /// collected in the outcome.
    pub async fn score_all_cancellable(
        &self,
        cases: Vec<CaseRecord>,
        cancellation: &BatchCancellation,
    ) -> Result<BatchOutcome, ScoringError> {
        let rules = Arc::new(self.rule_snapshot()?);
        let semaphore = Arc::new(Semaphore::new(self.batch_concurrency));
        let mut outcome = BatchOutcome::default();
        let mut handles = Vec::with_capacity(cases.len());

        for record in cases {
            let case_id = record.id.clone();
            if cancellation.is_cancelled() {
                outcome.skipped.push(case_id);
                continue;
            }

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|err| ScoringError::Worker(err.to_string()))?;
            if cancellation.is_cancelled() {
                outcome.skipped.push(case_id);
                continue;
            }

            let pipeline = self.pipeline.clone();
            let rules = rules.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                pipeline.run(&rules, &record)
            });
            handles.push((case_id, handle));
        }

        for (case_id, handle) in handles {
            let result = handle
                .await
                .unwrap_or_else(|err| Err(ScoringError::Worker(err.to_string())));
            match result {
                Ok(score) => outcome.scores.push(score),
                Err(error) => {
                    warn!(
                        case_id = case_id.as_ref().map(CaseId::as_str).unwrap_or("<missing>"),
                        error = %error,
                        "case excluded from batch"
                    );
                    outcome.failures.push(BatchFailure { case_id, error });
                }
            }
        }

        info!(
            scored = outcome.scores.len(),
            failed = outcome.failures.len(),
            skipped = outcome.skipped.len(),
            "batch scoring finished"
        );
        Ok(outcome)
    }

    /// Batch recompute over every case the store knows about.
    pub async fn rescore_store(&self) -> Result<BatchOutcome, ScoringError> {
        let cases = self.cases.list()?;
        self.score_all(cases).await
    }

    /// Change a rule's weight or enabled flag. Stored scores are left untouched until the caller
    /// requests a rescore.
    pub fn update_rule(
        &self,
        rule_id: &str,
        update: RuleUpdate,
    ) -> Result<ScoringRule, ScoringError> {
        let current = self.rule_snapshot()?;
        let rule = current.updated_rule(rule_id, &update)?;
        self.rules.save(rule.clone())?;
        info!(
            rule_id,
            weight = rule.weight,
            enabled = rule.enabled,
            "scoring rule updated"
        );
        Ok(rule)
    }

    /// Add a new rule to the configuration.
    pub fn register_rule(&self, rule: ScoringRule) -> Result<(), ScoringError> {
        let current = self.rule_snapshot()?;
        if current.get(&rule.id).is_some() {
            return Err(RuleConfigError::DuplicateRule(rule.id).into());
        }
        validate_rule(&rule)?;
        if !predicates::is_builtin(&rule.id) {
            warn!(rule_id = %rule.id, "registered rule has no predicate and will score nothing");
        }

        let (rule_id, weight) = (rule.id.clone(), rule.weight);
        match self.rules.insert(rule) {
            Ok(()) => {}
            // another registration won the race after the snapshot was read
            Err(RepositoryError::Conflict) => {
                return Err(RuleConfigError::DuplicateRule(rule_id).into())
            }
            Err(err) => return Err(err.into()),
        }
        info!(rule_id = %rule_id, weight, "scoring rule registered");
        Ok(())
    }

    pub fn get_score(&self, case_id: &CaseId) -> Result<Option<LeadScore>, ScoringError> {
        Ok(self.pipeline.scores.fetch(case_id)?)
    }

    /// Stored scores ordered for triage: priority tier, then score descending, then case id.
    pub fn triage_queue(&self, limit: usize) -> Result<Vec<LeadScore>, ScoringError> {
        let mut scores = self.pipeline.scores.all()?;
        scores.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| b.total_score.total_cmp(&a.total_score))
                .then_with(|| a.case_id.cmp(&b.case_id))
        });
        scores.truncate(limit);
        Ok(scores)
    }

    pub fn summary(&self) -> Result<ScoreboardSummary, ScoringError> {
        let scores = self.pipeline.scores.all()?;
        Ok(ScoreboardSummary::from_scores(&scores))
    }
}
