//! Validation scoring: deterministic weighted completeness of an extracted
//! record.
//!
//! Each field contributes all of its weight or nothing. The weights sum to
//! 1.0, so a fully populated, fully valid record scores exactly 1.0 and an
//! empty one scores 0.0. The result is rounded to two decimals.
//!
//! The scoring instant is a parameter, not `Utc::now()`, so the end-date
//! rule stays testable with a fixed calendar.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::InsuranceRecord;

pub const WEIGHT_POLICY_NUMBER: f64 = 0.25;
pub const WEIGHT_PROVIDER: f64 = 0.15;
pub const WEIGHT_START_DATE: f64 = 0.20;
pub const WEIGHT_END_DATE: f64 = 0.20;
pub const WEIGHT_COVERAGE_AMOUNT: f64 = 0.15;
pub const WEIGHT_IS_VALID: f64 = 0.05;

static RE_ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Strict `YYYY-MM-DD` parse: shape check first, then calendar validity.
///
/// chrono's `%Y-%m-%d` accepts non-padded components ("2024-1-5"), so the
/// shape regex must run before the calendar parse.
fn parse_strict_date(value: &str) -> Option<NaiveDate> {
    if !RE_ISO_DATE.is_match(value) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Compute the validation score for an extracted record.
///
/// Per-field rules:
/// * `policyNumber`, `provider`: present and non-empty.
/// * `startDate`: strict valid calendar date.
/// * `endDate`: strict valid calendar date, `today` or later.
/// * `coverageAmount`: present and strictly positive.
/// * `isValid`: the model's own judgment is `true`.
pub fn validation_score(record: &InsuranceRecord, today: NaiveDate) -> f64 {
    let mut score = 0.0;

    if record
        .policy_number
        .as_deref()
        .is_some_and(|v| !v.is_empty())
    {
        score += WEIGHT_POLICY_NUMBER;
    }
    if record.provider.as_deref().is_some_and(|v| !v.is_empty()) {
        score += WEIGHT_PROVIDER;
    }
    if record
        .start_date
        .as_deref()
        .is_some_and(|v| parse_strict_date(v).is_some())
    {
        score += WEIGHT_START_DATE;
    }
    if record
        .end_date
        .as_deref()
        .and_then(parse_strict_date)
        .is_some_and(|date| date >= today)
    {
        score += WEIGHT_END_DATE;
    }
    if record.coverage_amount.is_some_and(|v| v > 0.0) {
        score += WEIGHT_COVERAGE_AMOUNT;
    }
    if record.is_valid {
        score += WEIGHT_IS_VALID;
    }

    round2(score)
}

/// Round to 2 decimal places, half away from zero.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn full_record() -> InsuranceRecord {
        InsuranceRecord {
            policy_number: Some("POL-12345".into()),
            provider: Some("Acme Insurance".into()),
            start_date: Some("2025-01-01".into()),
            end_date: Some("2026-01-01".into()),
            coverage_amount: Some(50_000.0),
            is_valid: true,
            validation_notes: "Looks complete".into(),
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let total = WEIGHT_POLICY_NUMBER
            + WEIGHT_PROVIDER
            + WEIGHT_START_DATE
            + WEIGHT_END_DATE
            + WEIGHT_COVERAGE_AMOUNT
            + WEIGHT_IS_VALID;
        assert!((total - 1.0).abs() < 1e-9, "got: {total}");
    }

    #[test]
    fn full_record_scores_exactly_one() {
        assert_eq!(validation_score(&full_record(), fixed_today()), 1.0);
    }

    #[test]
    fn empty_record_scores_exactly_zero() {
        assert_eq!(
            validation_score(&InsuranceRecord::default(), fixed_today()),
            0.0
        );
    }

    #[test]
    fn impossible_calendar_date_scores_nothing() {
        let record = InsuranceRecord {
            start_date: Some("2024-13-40".into()),
            ..InsuranceRecord::default()
        };
        assert_eq!(validation_score(&record, fixed_today()), 0.0);
    }

    #[test]
    fn non_padded_date_fails_the_shape_check() {
        // Calendar-parseable by lenient parsers, wrong shape here.
        let record = InsuranceRecord {
            start_date: Some("2024-1-5".into()),
            ..InsuranceRecord::default()
        };
        assert_eq!(validation_score(&record, fixed_today()), 0.0);
    }

    #[test]
    fn leap_day_is_calendar_checked() {
        assert!(parse_strict_date("2024-02-29").is_some());
        assert!(parse_strict_date("2023-02-29").is_none());
    }

    #[test]
    fn end_date_today_earns_full_weight() {
        let record = InsuranceRecord {
            end_date: Some("2025-06-01".into()),
            ..InsuranceRecord::default()
        };
        assert_eq!(validation_score(&record, fixed_today()), WEIGHT_END_DATE);
    }

    #[test]
    fn end_date_in_the_past_scores_nothing() {
        let record = InsuranceRecord {
            end_date: Some("2025-05-31".into()),
            ..InsuranceRecord::default()
        };
        assert_eq!(validation_score(&record, fixed_today()), 0.0);
    }

    #[test]
    fn empty_strings_do_not_count_as_present() {
        let record = InsuranceRecord {
            policy_number: Some("".into()),
            provider: Some("".into()),
            ..InsuranceRecord::default()
        };
        assert_eq!(validation_score(&record, fixed_today()), 0.0);
    }

    #[test]
    fn coverage_must_be_strictly_positive() {
        let zero = InsuranceRecord {
            coverage_amount: Some(0.0),
            ..InsuranceRecord::default()
        };
        assert_eq!(validation_score(&zero, fixed_today()), 0.0);

        let negative = InsuranceRecord {
            coverage_amount: Some(-10.0),
            ..InsuranceRecord::default()
        };
        assert_eq!(validation_score(&negative, fixed_today()), 0.0);
    }

    #[test]
    fn partial_records_round_to_two_decimals() {
        // policyNumber + provider + startDate accumulates float error
        // before rounding.
        let record = InsuranceRecord {
            policy_number: Some("POL-1".into()),
            provider: Some("Acme".into()),
            start_date: Some("2025-01-01".into()),
            ..InsuranceRecord::default()
        };
        assert_eq!(validation_score(&record, fixed_today()), 0.6);
    }

    #[test]
    fn model_self_assessment_is_worth_its_weight_alone() {
        let record = InsuranceRecord {
            is_valid: true,
            ..InsuranceRecord::default()
        };
        assert_eq!(validation_score(&record, fixed_today()), WEIGHT_IS_VALID);
    }
}
