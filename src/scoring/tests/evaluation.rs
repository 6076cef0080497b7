use super::common::*;
use crate::scoring::domain::{Impact, RuleCategory, ScoringRule};
use crate::scoring::evaluation::{evaluate, predicates, ScoringEngine};
use crate::scoring::features::{extract, ReferralClass};
use crate::scoring::rules::RuleSet;

#[test]
fn financial_capacity_awards_full_weight_above_half_paid() {
    let rules = RuleSet::default();
    let features = extract(&strong_case("case-fin"), now()).expect("well formed case");

    let result = evaluate(&rule(&rules, predicates::FINANCIAL_CAPACITY), &features)
        .expect("enabled rule evaluates");

    assert_eq!(result.category, RuleCategory::Financial);
    assert_eq!(result.weight, 25.0);
    assert_eq!(result.score, 25.0);
    assert_eq!(result.impact, Impact::Positive);
}

#[test]
fn financial_capacity_steps_down_with_payment_ratio() {
    let rules = RuleSet::default();
    let financial = rule(&rules, predicates::FINANCIAL_CAPACITY);
    let mut features = features("case-steps");

    features.payment_ratio = 0.3;
    let partial = evaluate(&financial, &features).expect("evaluates");
    assert_close(partial.score, 15.0);
    assert_eq!(partial.impact, Impact::Neutral);

    features.payment_ratio = 0.0;
    let nothing = evaluate(&financial, &features).expect("evaluates");
    assert_eq!(nothing.score, 0.0);
    assert_eq!(nothing.impact, Impact::Negative);
}

#[test]
fn disabled_rules_are_skipped() {
    let rules = RuleSet::default();
    let mut language = rule(&rules, predicates::LANGUAGE_PROFICIENCY);
    language.enabled = false;

    assert!(evaluate(&language, &features("case-off")).is_none());
}

#[test]
fn unknown_rule_ids_are_noops() {
    let custom = ScoringRule::new(
        "scholarship_eligibility",
        RuleCategory::Financial,
        20.0,
        "No predicate exists for this rule",
    );

    assert!(evaluate(&custom, &features("case-unknown")).is_none());
}

#[test]
fn absent_language_score_contributes_nothing() {
    let rules = RuleSet::default();
    let mut features = features("case-lang");
    features.language_score = None;

    let result = evaluate(&rule(&rules, predicates::LANGUAGE_PROFICIENCY), &features)
        .expect("enabled rule evaluates");

    assert_eq!(result.score, 0.0);
    assert_eq!(result.impact, Impact::Negative);
}

#[test]
fn impact_uses_each_rules_own_thresholds() {
    let rules = RuleSet::default();
    let mut features = features("case-thresholds");
    features.referral_class = ReferralClass::Agent;
    features.days_until_deadline = Some(45);

    let referral = evaluate(&rule(&rules, predicates::REFERRAL_SOURCE), &features)
        .expect("evaluates");
    assert_close(referral.score, 7.0);
    assert_eq!(referral.impact, Impact::Positive);

    let deadline = evaluate(&rule(&rules, predicates::DEADLINE_RUNWAY), &features)
        .expect("evaluates");
    assert_close(deadline.score, 9.0);
    assert_eq!(deadline.impact, Impact::Positive);

    features.days_until_deadline = Some(10);
    let tight = evaluate(&rule(&rules, predicates::DEADLINE_RUNWAY), &features)
        .expect("evaluates");
    assert_close(tight.score, 4.5);
    assert_eq!(tight.impact, Impact::Neutral);
}

#[test]
fn results_follow_rule_order_and_never_exceed_weight() {
    let rules = RuleSet::default();
    let engine = ScoringEngine::default();

    let results = engine.evaluate_rules(&rules, &features("case-order"));

    let ids: Vec<&str> = results.iter().map(|result| result.rule_id.as_str()).collect();
    let expected: Vec<&str> = rules.rules().iter().map(|rule| rule.id.as_str()).collect();
    assert_eq!(ids, expected);
    assert!(results
        .iter()
        .all(|result| result.score >= 0.0 && result.score <= result.weight));
}

#[test]
fn engine_scores_are_reproducible() {
    let rules = RuleSet::default();
    let engine = ScoringEngine::default();
    let features = extract(&boundary_case("case-repeat"), now()).expect("well formed case");

    let first = engine.score(&rules, &features, now());
    let second = engine.score(&rules, &features, now());

    assert_eq!(first, second);
}
