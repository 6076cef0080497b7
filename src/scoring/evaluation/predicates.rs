use super::super::features::{CaseFeatures, EducationLevel, ReferralClass};

pub const AGE_PROFILE: &str = "age_profile";
pub const EDUCATION_LEVEL: &str = "education_level";
pub const LANGUAGE_PROFICIENCY: &str = "language_proficiency";
pub const FINANCIAL_CAPACITY: &str = "financial_capacity";
pub const DEADLINE_RUNWAY: &str = "deadline_runway";
pub const DOCUMENT_COMPLETENESS: &str = "document_completeness";
pub const RESPONSIVENESS: &str = "responsiveness";
pub const REFERRAL_SOURCE: &str = "referral_source";

/// Built-in predicate backing a rule id.
///
/// `attainment` maps features to the earned share of the rule weight. Impact is read against the
/// predicate's own thresholds: at or above `positive_at` is positive, below `negative_below` is
/// negative.
pub(crate) struct Predicate {
    pub id: &'static str,
    pub factor_name: &'static str,
    pub positive_at: f64,
    pub negative_below: f64,
    pub attainment: fn(&CaseFeatures) -> f64,
}

static PREDICATES: [Predicate; 8] = [
    Predicate {
        id: AGE_PROFILE,
        factor_name: "Age Profile",
        positive_at: 0.7,
        negative_below: 0.4,
        attainment: age_profile,
    },
    Predicate {
        id: EDUCATION_LEVEL,
        factor_name: "Education Level",
        positive_at: 0.8,
        negative_below: 0.5,
        attainment: education_level,
    },
    Predicate {
        id: LANGUAGE_PROFICIENCY,
        factor_name: "Language Proficiency",
        positive_at: 1.0,
        negative_below: 0.6,
        attainment: language_proficiency,
    },
    Predicate {
        id: FINANCIAL_CAPACITY,
        factor_name: "Financial Capacity",
        positive_at: 1.0,
        negative_below: 0.5,
        attainment: financial_capacity,
    },
    Predicate {
        id: DEADLINE_RUNWAY,
        factor_name: "Deadline Runway",
        positive_at: 0.6,
        negative_below: 0.3,
        attainment: deadline_runway,
    },
    Predicate {
        id: DOCUMENT_COMPLETENESS,
        factor_name: "Document Completeness",
        positive_at: 0.9,
        negative_below: 0.5,
        attainment: document_completeness,
    },
    Predicate {
        id: RESPONSIVENESS,
        factor_name: "Responsiveness",
        positive_at: 0.7,
        negative_below: 0.4,
        attainment: responsiveness,
    },
    Predicate {
        id: REFERRAL_SOURCE,
        factor_name: "Referral Source",
        positive_at: 0.7,
        negative_below: 0.3,
        attainment: referral_source,
    },
];

pub(crate) fn lookup(rule_id: &str) -> Option<&'static Predicate> {
    PREDICATES.iter().find(|predicate| predicate.id == rule_id)
}

pub(crate) fn is_builtin(rule_id: &str) -> bool {
    lookup(rule_id).is_some()
}

fn age_profile(features: &CaseFeatures) -> f64 {
    match features.age {
        Some(18..=30) => 1.0,
        Some(31..=40) => 0.7,
        Some(age) if age > 40 => 0.4,
        _ => 0.0,
    }
}

fn education_level(features: &CaseFeatures) -> f64 {
    match features.education_level {
        Some(EducationLevel::Master | EducationLevel::Doctorate) => 1.0,
        Some(EducationLevel::Bachelor) => 0.8,
        Some(EducationLevel::Diploma) => 0.5,
        Some(EducationLevel::Secondary) => 0.3,
        None => 0.0,
    }
}

fn language_proficiency(features: &CaseFeatures) -> f64 {
    match features.language_score {
        Some(score) if score >= 7.0 => 1.0,
        Some(score) if score >= 6.0 => 0.6,
        _ => 0.0,
    }
}

fn financial_capacity(features: &CaseFeatures) -> f64 {
    let ratio = features.payment_ratio;
    if ratio >= 0.5 {
        1.0
    } else if ratio >= 0.25 {
        0.6
    } else if ratio > 0.0 {
        0.3
    } else {
        0.0
    }
}

fn deadline_runway(features: &CaseFeatures) -> f64 {
    match features.days_until_deadline {
        Some(days) if days >= 90 => 1.0,
        Some(days) if days >= 30 => 0.6,
        Some(days) if days >= 0 => 0.3,
        _ => 0.0,
    }
}

fn document_completeness(features: &CaseFeatures) -> f64 {
    match features.document_submission_rate {
        Some(rate) if rate >= 0.9 => 1.0,
        Some(rate) => rate.max(0.0),
        None => 0.0,
    }
}

fn responsiveness(features: &CaseFeatures) -> f64 {
    match features.response_time_hours {
        Some(hours) if hours <= 4.0 => 1.0,
        Some(hours) if hours <= 24.0 => 0.7,
        Some(hours) if hours <= 72.0 => 0.4,
        Some(_) => 0.1,
        None => 0.0,
    }
}

fn referral_source(features: &CaseFeatures) -> f64 {
    match features.referral_class {
        ReferralClass::Partner | ReferralClass::Alumni => 1.0,
        ReferralClass::Agent => 0.7,
        ReferralClass::Organic => 0.5,
        ReferralClass::Paid => 0.3,
        ReferralClass::Unknown => 0.2,
    }
}
