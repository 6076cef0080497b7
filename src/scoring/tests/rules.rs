use crate::scoring::domain::{RuleCategory, ScoringRule};
use crate::scoring::evaluation::predicates;
use crate::scoring::rules::{default_rules, RuleConfigError, RuleSet, RuleUpdate};

#[test]
fn default_rules_cover_every_category_and_validate() {
    let rules = RuleSet::new(default_rules()).expect("defaults are valid");

    for category in [
        RuleCategory::Demographic,
        RuleCategory::Financial,
        RuleCategory::Timeline,
        RuleCategory::Documents,
        RuleCategory::Engagement,
        RuleCategory::Referral,
    ] {
        assert!(rules.enabled().any(|rule| rule.category == category));
    }
    assert!(rules
        .rules()
        .iter()
        .all(|rule| predicates::is_builtin(&rule.id)));
    assert_eq!(rules.enabled_weight(), 110.0);
}

#[test]
fn rejects_duplicate_rule_ids() {
    let mut rules = default_rules();
    rules.push(rules[0].clone());

    match RuleSet::new(rules) {
        Err(RuleConfigError::DuplicateRule(id)) => assert_eq!(id, predicates::AGE_PROFILE),
        other => panic!("expected duplicate rule, got {other:?}"),
    }
}

#[test]
fn rejects_weights_outside_range() {
    for weight in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
        let rule = ScoringRule::new("bad", RuleCategory::Referral, weight, "bad weight");
        assert!(matches!(
            RuleSet::new(vec![rule]),
            Err(RuleConfigError::InvalidWeight { .. })
        ));
    }

    let blank = ScoringRule::new(" ", RuleCategory::Referral, 10.0, "no id");
    assert_eq!(RuleSet::new(vec![blank]), Err(RuleConfigError::EmptyRuleId));
}

#[test]
fn updated_rule_applies_partial_changes() {
    let rules = RuleSet::default();

    let disabled = rules
        .updated_rule(
            predicates::RESPONSIVENESS,
            &RuleUpdate {
                weight: None,
                enabled: Some(false),
            },
        )
        .expect("valid update");
    assert!(!disabled.enabled);
    assert_eq!(disabled.weight, 10.0);

    let reweighted = rules
        .updated_rule(
            predicates::RESPONSIVENESS,
            &RuleUpdate {
                weight: Some(30.0),
                enabled: None,
            },
        )
        .expect("valid update");
    assert!(reweighted.enabled);
    assert_eq!(reweighted.weight, 30.0);

    let next = rules.with_rule(disabled).expect("valid set");
    assert_eq!(next.enabled_weight(), 100.0);
    assert_eq!(rules.enabled_weight(), 110.0);
}

#[test]
fn updated_rule_rejects_unknown_ids_and_bad_weights() {
    let rules = RuleSet::default();

    assert_eq!(
        rules.updated_rule("missing", &RuleUpdate::default()),
        Err(RuleConfigError::UnknownRule("missing".to_string()))
    );
    assert!(matches!(
        rules.updated_rule(
            predicates::REFERRAL_SOURCE,
            &RuleUpdate {
                weight: Some(150.0),
                enabled: None,
            }
        ),
        Err(RuleConfigError::InvalidWeight { .. })
    ));
}
