use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::scoring::clock::FixedClock;
use crate::scoring::domain::{CaseId, CaseRecord, LeadScore, ScoringRule};
use crate::scoring::features::{
    CaseFeatures, EducationLevel, ReferralClass, FIELD_AGE, FIELD_EDUCATION_LEVEL,
    FIELD_LANGUAGE_SCORE, FIELD_REFERRAL_SOURCE, FIELD_RESPONSE_TIME_HOURS,
};
use crate::scoring::repository::{
    CaseStore, EventError, LeadRescoredEvent, RepositoryError, RuleStore, ScoreEventPublisher,
    ScoreStore,
};
use crate::scoring::rules::{default_rules, RuleSet};
use crate::scoring::service::{LeadScoringService, ScoringOptions};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn id(value: &str) -> CaseId {
    CaseId(value.to_string())
}

/// Case that earns full marks on every default rule.
pub(super) fn strong_case(case_id: &str) -> CaseRecord {
    let mut custom_fields = BTreeMap::new();
    custom_fields.insert(FIELD_AGE.to_string(), "26".to_string());
    custom_fields.insert(FIELD_EDUCATION_LEVEL.to_string(), "Master".to_string());
    custom_fields.insert(FIELD_LANGUAGE_SCORE.to_string(), "7.5".to_string());
    custom_fields.insert(FIELD_RESPONSE_TIME_HOURS.to_string(), "2".to_string());
    custom_fields.insert(FIELD_REFERRAL_SOURCE.to_string(), "Partner".to_string());

    CaseRecord {
        id: Some(id(case_id)),
        full_name: "Amira Haddad".to_string(),
        total_fees: 8500.0,
        paid_amount: 6000.0,
        created_at: Utc
            .with_ymd_and_hms(2025, 5, 20, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
        deadline: Some(NaiveDate::from_ymd_opt(2025, 10, 1).expect("valid date")),
        documents_required: 10,
        documents_submitted: 10,
        custom_fields,
    }
}

/// Lands on exactly 88 of 110 default points: a normalized 80.0.
pub(super) fn boundary_case(case_id: &str) -> CaseRecord {
    let mut record = strong_case(case_id);
    record.custom_fields.remove(FIELD_AGE);
    record.custom_fields.remove(FIELD_RESPONSE_TIME_HOURS);
    record
        .custom_fields
        .insert(FIELD_EDUCATION_LEVEL.to_string(), "Bachelor".to_string());
    record
}

/// Case missing most optional data and behind on every measurable factor.
pub(super) fn weak_case(case_id: &str) -> CaseRecord {
    CaseRecord {
        id: Some(id(case_id)),
        full_name: "Jonas Berg".to_string(),
        total_fees: 12000.0,
        paid_amount: 0.0,
        created_at: Utc
            .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp"),
        deadline: Some(NaiveDate::from_ymd_opt(2025, 5, 31).expect("valid date")),
        documents_required: 10,
        documents_submitted: 1,
        custom_fields: BTreeMap::new(),
    }
}

pub(super) fn malformed_case() -> CaseRecord {
    let mut record = strong_case("ignored");
    record.id = None;
    record
}

pub(super) fn features(case_id: &str) -> CaseFeatures {
    CaseFeatures {
        case_id: id(case_id),
        age: Some(26),
        education_level: Some(EducationLevel::Master),
        payment_ratio: 1.0,
        language_score: Some(7.5),
        days_until_deadline: Some(120),
        response_time_hours: Some(2.0),
        document_submission_rate: Some(1.0),
        referral_class: ReferralClass::Partner,
    }
}

pub(super) fn rule(rules: &RuleSet, rule_id: &str) -> ScoringRule {
    rules.get(rule_id).cloned().expect("rule present")
}

#[derive(Default)]
pub(super) struct MemoryCaseStore {
    records: Mutex<Vec<CaseRecord>>,
}

impl MemoryCaseStore {
    pub(super) fn with_cases(records: Vec<CaseRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl CaseStore for MemoryCaseStore {
    fn fetch(&self, id: &CaseId) -> Result<Option<CaseRecord>, RepositoryError> {
        let guard = self.records.lock().expect("case mutex poisoned");
        Ok(guard
            .iter()
            .find(|record| record.id.as_ref() == Some(id))
            .cloned())
    }

    fn list(&self) -> Result<Vec<CaseRecord>, RepositoryError> {
        Ok(self.records.lock().expect("case mutex poisoned").clone())
    }
}

pub(super) struct MemoryRuleStore {
    rules: Mutex<Vec<ScoringRule>>,
}

impl Default for MemoryRuleStore {
    fn default() -> Self {
        Self {
            rules: Mutex::new(default_rules()),
        }
    }
}

impl MemoryRuleStore {
    pub(super) fn rules(&self) -> Vec<ScoringRule> {
        self.rules.lock().expect("rule mutex poisoned").clone()
    }
}

impl RuleStore for MemoryRuleStore {
    fn load(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        Ok(self.rules())
    }

    fn save(&self, rule: ScoringRule) -> Result<(), RepositoryError> {
        let mut guard = self.rules.lock().expect("rule mutex poisoned");
        match guard.iter_mut().find(|existing| existing.id == rule.id) {
            Some(existing) => *existing = rule,
            None => guard.push(rule),
        }
        Ok(())
    }

    fn insert(&self, rule: ScoringRule) -> Result<(), RepositoryError> {
        let mut guard = self.rules.lock().expect("rule mutex poisoned");
        if guard.iter().any(|existing| existing.id == rule.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(rule);
        Ok(())
    }
}

pub(super) struct UnavailableRuleStore;

impl RuleStore for UnavailableRuleStore {
    fn load(&self) -> Result<Vec<ScoringRule>, RepositoryError> {
        Err(RepositoryError::Unavailable("config database offline".to_string()))
    }

    fn save(&self, _rule: ScoringRule) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("config database offline".to_string()))
    }

    fn insert(&self, _rule: ScoringRule) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("config database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryScoreStore {
    scores: Mutex<HashMap<CaseId, LeadScore>>,
}

impl ScoreStore for MemoryScoreStore {
    fn upsert(&self, score: LeadScore) -> Result<Option<LeadScore>, RepositoryError> {
        let mut guard = self.scores.lock().expect("score mutex poisoned");
        Ok(guard.insert(score.case_id.clone(), score))
    }

    fn fetch(&self, id: &CaseId) -> Result<Option<LeadScore>, RepositoryError> {
        let guard = self.scores.lock().expect("score mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn all(&self) -> Result<Vec<LeadScore>, RepositoryError> {
        let guard = self.scores.lock().expect("score mutex poisoned");
        let mut scores: Vec<LeadScore> = guard.values().cloned().collect();
        scores.sort_by(|a, b| a.case_id.cmp(&b.case_id));
        Ok(scores)
    }
}

#[derive(Default)]
pub(super) struct RecordingPublisher {
    events: Mutex<Vec<LeadRescoredEvent>>,
}

impl RecordingPublisher {
    pub(super) fn events(&self) -> Vec<LeadRescoredEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

impl ScoreEventPublisher for RecordingPublisher {
    fn publish(&self, event: LeadRescoredEvent) -> Result<(), EventError> {
        self.events
            .lock()
            .expect("event mutex poisoned")
            .push(event);
        Ok(())
    }
}

pub(super) struct FailingPublisher;

impl ScoreEventPublisher for FailingPublisher {
    fn publish(&self, _event: LeadRescoredEvent) -> Result<(), EventError> {
        Err(EventError::Transport("broker offline".to_string()))
    }
}

pub(super) type TestService =
    LeadScoringService<MemoryCaseStore, MemoryRuleStore, MemoryScoreStore, RecordingPublisher>;

pub(super) struct Harness {
    pub(super) service: TestService,
    pub(super) rules: Arc<MemoryRuleStore>,
    pub(super) scores: Arc<MemoryScoreStore>,
    pub(super) events: Arc<RecordingPublisher>,
}

pub(super) fn harness(cases: Vec<CaseRecord>) -> Harness {
    harness_with_options(cases, ScoringOptions::default())
}

pub(super) fn harness_with_options(cases: Vec<CaseRecord>, options: ScoringOptions) -> Harness {
    let rules = Arc::new(MemoryRuleStore::default());
    let scores = Arc::new(MemoryScoreStore::default());
    let events = Arc::new(RecordingPublisher::default());
    let service = LeadScoringService::with_clock(
        Arc::new(MemoryCaseStore::with_cases(cases)),
        rules.clone(),
        scores.clone(),
        events.clone(),
        options,
        Arc::new(FixedClock(now())),
    );
    Harness {
        service,
        rules,
        scores,
        events,
    }
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
