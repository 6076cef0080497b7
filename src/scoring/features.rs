use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{CaseId, CaseRecord};

pub const FIELD_AGE: &str = "age";
pub const FIELD_DATE_OF_BIRTH: &str = "date_of_birth";
pub const FIELD_EDUCATION_LEVEL: &str = "education_level";
pub const FIELD_LANGUAGE_SCORE: &str = "language_score";
pub const FIELD_RESPONSE_TIME_HOURS: &str = "response_time_hours";
pub const FIELD_LAST_CONTACT_AT: &str = "last_contact_at";
pub const FIELD_REFERRAL_SOURCE: &str = "referral_source";

/// Language test bands run from 0 to 9.
const MAX_LANGUAGE_SCORE: f64 = 9.0;

/// Structural defects that make a case unscoreable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MalformedCase {
    #[error("case record has no identifier")]
    MissingCaseId,
    #[error("case {case_id} has invalid {field}: {value}")]
    InvalidAmount {
        case_id: CaseId,
        field: &'static str,
        value: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    Secondary,
    Diploma,
    Bachelor,
    Master,
    Doctorate,
}

impl FromStr for EducationLevel {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace(['\'', '-', '_'], " ").as_str() {
            "high school" | "secondary" | "highschool" => Ok(Self::Secondary),
            "diploma" | "associate" | "certificate" => Ok(Self::Diploma),
            "bachelor" | "bachelors" | "bachelor s" | "undergraduate" => Ok(Self::Bachelor),
            "master" | "masters" | "master s" | "postgraduate" | "mba" => Ok(Self::Master),
            "doctorate" | "phd" | "doctoral" => Ok(Self::Doctorate),
            _ => Err(()),
        }
    }
}

/// How the case reached us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferralClass {
    Partner,
    Alumni,
    Agent,
    Organic,
    Paid,
    #[default]
    Unknown,
}

impl ReferralClass {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "partner" | "partner referral" | "university partner" => Self::Partner,
            "alumni" | "alumni referral" | "client referral" | "referral" => Self::Alumni,
            "agent" | "sub agent" | "sub-agent" => Self::Agent,
            "organic" | "website" | "walk-in" | "walk in" | "social media" => Self::Organic,
            "paid" | "advertisement" | "ads" | "paid ads" => Self::Paid,
            _ => Self::Unknown,
        }
    }
}

/// Primitive values rules consume. Rebuilt from the case record on every pass.
///
/// `None` means the value is not available for this case; rules score it as below threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFeatures {
    pub case_id: CaseId,
    pub age: Option<u32>,
    pub education_level: Option<EducationLevel>,
    pub payment_ratio: f64,
    pub language_score: Option<f64>,
    pub days_until_deadline: Option<i64>,
    pub response_time_hours: Option<f64>,
    pub document_submission_rate: Option<f64>,
    pub referral_class: ReferralClass,
}

impl CaseFeatures {
    /// Optional features this case does not supply, in field order.
    pub fn absent(&self) -> Vec<&'static str> {
        [
            ("age", self.age.is_none()),
            ("education_level", self.education_level.is_none()),
            ("language_score", self.language_score.is_none()),
            ("days_until_deadline", self.days_until_deadline.is_none()),
            ("response_time_hours", self.response_time_hours.is_none()),
            ("document_submission_rate", self.document_submission_rate.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }
}

/// Derive the feature set for one case as of the given instant.
pub fn extract(record: &CaseRecord, as_of: DateTime<Utc>) -> Result<CaseFeatures, MalformedCase> {
    let case_id = record
        .id
        .as_ref()
        .filter(|id| !id.0.trim().is_empty())
        .cloned()
        .ok_or(MalformedCase::MissingCaseId)?;

    let total_fees = checked_amount(&case_id, "total_fees", record.total_fees)?;
    let paid_amount = checked_amount(&case_id, "paid_amount", record.paid_amount)?;
    let payment_ratio = if total_fees > 0.0 {
        (paid_amount / total_fees).min(1.0)
    } else {
        0.0
    };

    let today = as_of.date_naive();

    let age = parse_custom::<u32>(record, &case_id, FIELD_AGE).or_else(|| {
        parse_custom_with(record, &case_id, FIELD_DATE_OF_BIRTH, |raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
        })
        .and_then(|dob| years_between(dob, today))
    });

    let education_level = parse_custom::<EducationLevel>(record, &case_id, FIELD_EDUCATION_LEVEL);

    let language_score = parse_custom::<f64>(record, &case_id, FIELD_LANGUAGE_SCORE).and_then(
        |score| {
            if score.is_finite() && (0.0..=MAX_LANGUAGE_SCORE).contains(&score) {
                Some(score)
            } else {
                warn!(case_id = %case_id, score, "language score outside 0-9 band ignored");
                None
            }
        },
    );

    let days_until_deadline = record
        .deadline
        .map(|deadline| deadline.signed_duration_since(today).num_days());

    let response_time_hours = parse_custom::<f64>(record, &case_id, FIELD_RESPONSE_TIME_HOURS)
        .filter(|hours| hours.is_finite() && *hours >= 0.0)
        .or_else(|| {
            parse_custom_with(record, &case_id, FIELD_LAST_CONTACT_AT, |raw| {
                DateTime::parse_from_rfc3339(raw).ok()
            })
            .map(|contact| contact.with_timezone(&Utc) - record.created_at)
            .filter(|elapsed| elapsed.num_seconds() >= 0)
            .map(|elapsed| elapsed.num_minutes() as f64 / 60.0)
        });

    let document_submission_rate = match (record.documents_required, record.documents_submitted) {
        (0, 0) => None,
        (0, _) => Some(1.0),
        (required, submitted) => Some((submitted as f64 / required as f64).min(1.0)),
    };

    let referral_class = record
        .custom_field(FIELD_REFERRAL_SOURCE)
        .map(ReferralClass::parse)
        .unwrap_or_default();

    let features = CaseFeatures {
        case_id,
        age,
        education_level,
        payment_ratio,
        language_score,
        days_until_deadline,
        response_time_hours,
        document_submission_rate,
        referral_class,
    };
    for feature in features.absent() {
        debug!(case_id = %features.case_id, feature, "feature missing; scored below threshold");
    }
    Ok(features)
}

fn checked_amount(case_id: &CaseId, field: &'static str, value: f64) -> Result<f64, MalformedCase> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MalformedCase::InvalidAmount {
            case_id: case_id.clone(),
            field,
            value,
        })
    }
}

fn parse_custom<T: FromStr>(record: &CaseRecord, case_id: &CaseId, key: &str) -> Option<T> {
    parse_custom_with(record, case_id, key, |raw| raw.parse::<T>().ok())
}

fn parse_custom_with<T>(
    record: &CaseRecord,
    case_id: &CaseId,
    key: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let raw = record.custom_field(key)?;
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!(case_id = %case_id, field = key, value = raw, "unparsable custom field treated as absent");
    }
    parsed
}

fn years_between(born: NaiveDate, today: NaiveDate) -> Option<u32> {
    let mut years = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}
