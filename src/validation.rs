//! Client-side form checks.
//!
//! Each form is validated field by field in display order; the first failure
//! is returned so the UI can show it next to the offending field.

use std::sync::OnceLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::error::ValidationError;
use crate::models::{DateRange, HealthRecord, Mood, DATE_FORMAT, TIME_FORMAT};

pub const WEIGHT_RANGE: (f64, f64) = (10.0, 300.0);
pub const HEIGHT_RANGE: (f64, f64) = (50.0, 250.0);
pub const BLOOD_GLUCOSE_RANGE: (f64, f64) = (2.0, 30.0);
pub const SYSTOLIC_RANGE: (f64, f64) = (70.0, 220.0);
pub const DIASTOLIC_RANGE: (f64, f64) = (40.0, 140.0);
pub const HEART_RATE_RANGE: (f64, f64) = (40.0, 200.0);

/// Labels of [`Mood::ALL`], in order
pub const MOOD_CHOICES: &str = "Happy, Calm, Tired, Anxious, Stressed, Sad, Excited, Irritable";

pub const MIN_USERNAME_LEN: usize = 4;
pub const MIN_PASSWORD_LEN: usize = 8;

/// Raw text of the record form
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordInput<'a> {
    pub date: &'a str,
    pub time: &'a str,
    pub weight: &'a str,
    pub height: &'a str,
    pub systolic: &'a str,
    pub diastolic: &'a str,
    pub heart_rate: &'a str,
    pub blood_glucose: &'a str,
    pub mood: &'a str,
    pub notes: &'a str,
}

/// Build a record from the form, checking formats and ranges.
///
/// Measurements are optional; an empty field becomes `None`.
pub fn record_from_input(input: &RecordInput) -> Result<HealthRecord, ValidationError> {
    let date = parse_date(input.date, "Date")?;
    let time = parse_time(input.time, "Time")?;

    let mut record = HealthRecord::new(date.and_time(time));
    record.weight = parse_decimal(input.weight, "Weight", WEIGHT_RANGE, "kg")?;
    record.height = parse_decimal(input.height, "Height", HEIGHT_RANGE, "cm")?;
    record.systolic_pressure = parse_measurement(input.systolic, "Systolic pressure", SYSTOLIC_RANGE, "mmHg")?;
    record.diastolic_pressure = parse_measurement(input.diastolic, "Diastolic pressure", DIASTOLIC_RANGE, "mmHg")?;
    record.heart_rate = parse_measurement(input.heart_rate, "Heart rate", HEART_RATE_RANGE, "bpm")?;
    record.blood_glucose =
        parse_decimal(input.blood_glucose, "Blood glucose", BLOOD_GLUCOSE_RANGE, "mmol/L")?;
    record.mood = parse_mood(input.mood)?.map(|m| m.wire_value().to_string());

    let notes = input.notes.trim();
    record.notes = (!notes.is_empty()).then(|| notes.to_string());
    Ok(record)
}

pub fn validate_login(username: &str, password: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::Required { field: "Username" });
    }
    if password.is_empty() {
        return Err(ValidationError::Required { field: "Password" });
    }
    Ok(())
}

pub fn validate_registration(
    username: &str,
    email: &str,
    password: &str,
    confirmation: &str,
) -> Result<(), ValidationError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ValidationError::Required { field: "Username" });
    }
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::TooShort {
            field: "Username",
            min: MIN_USERNAME_LEN,
        });
    }
    validate_email(email)?;
    if password.is_empty() {
        return Err(ValidationError::Required { field: "Password" });
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "Password",
            min: MIN_PASSWORD_LEN,
        });
    }
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();

    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required { field: "Email" });
    }
    let pattern = EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());
    match pattern {
        Some(re) if re.is_match(email) => Ok(()),
        _ => Err(ValidationError::InvalidEmail),
    }
}

/// Parse the date-range filter. Both fields empty means no filter.
pub fn parse_date_range(start: &str, end: &str) -> Result<Option<DateRange>, ValidationError> {
    if start.trim().is_empty() && end.trim().is_empty() {
        return Ok(None);
    }
    let start = parse_date(start, "Start date")?;
    let end = parse_date(end, "End date")?;
    if start > end {
        return Err(ValidationError::InvertedRange);
    }
    Ok(Some(DateRange::new(start, end)))
}

fn parse_date(raw: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Required { field });
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| ValidationError::InvalidFormat {
        field,
        expected: "YYYY-MM-DD",
    })
}

fn parse_time(raw: &str, field: &'static str) -> Result<NaiveTime, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::Required { field });
    }
    NaiveTime::parse_from_str(raw, TIME_FORMAT).map_err(|_| ValidationError::InvalidFormat {
        field,
        expected: "HH:mm",
    })
}

/// One-decimal measurement; the range applies to the rounded value
fn parse_decimal(
    raw: &str,
    field: &'static str,
    range: (f64, f64),
    unit: &'static str,
) -> Result<Option<f64>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: f64 = raw
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or(ValidationError::NotANumber { field })?;
    let value = (value * 10.0).round() / 10.0;
    check_range(value, field, range, unit)?;
    Ok(Some(value))
}

fn parse_mood(raw: &str) -> Result<Option<Mood>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Mood::parse(raw).map(Some).ok_or(ValidationError::InvalidChoice {
        field: "Mood",
        choices: MOOD_CHOICES,
    })
}

fn parse_measurement(
    raw: &str,
    field: &'static str,
    range: (f64, f64),
    unit: &'static str,
) -> Result<Option<i32>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let value: i32 = raw
        .parse()
        .map_err(|_| ValidationError::NotANumber { field })?;
    check_range(f64::from(value), field, range, unit)?;
    Ok(Some(value))
}

fn check_range(
    value: f64,
    field: &'static str,
    (min, max): (f64, f64),
    unit: &'static str,
) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange { field, min, max, unit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>() -> RecordInput<'a> {
        RecordInput {
            date: "2024-03-01",
            time: "07:45",
            weight: "72.46",
            height: "175.04",
            systolic: "120",
            diastolic: "80",
            heart_rate: "64",
            blood_glucose: "5.56",
            mood: "calm",
            notes: "  after run ",
        }
    }

    #[test]
    fn test_valid_record() {
        let record = record_from_input(&input()).unwrap();
        assert_eq!(record.date_string(), "2024-03-01");
        assert_eq!(record.time_string(), "07:45");
        assert_eq!(record.weight, Some(72.5));
        assert_eq!(record.systolic_pressure, Some(120));
        assert_eq!(record.diastolic_pressure, Some(80));
        assert_eq!(record.heart_rate, Some(64));
        assert_eq!(record.height, Some(175.0));
        assert_eq!(record.blood_glucose, Some(5.6));
        assert_eq!(record.mood.as_deref(), Some(Mood::Calm.wire_value()));
        assert_eq!(record.notes.as_deref(), Some("after run"));
        assert_eq!(record.id, None);
    }

    #[test]
    fn test_measurements_are_optional() {
        let record = record_from_input(&RecordInput {
            date: "2024-03-01",
            time: "07:45",
            ..Default::default()
        })
        .unwrap();
        assert_eq!(record.weight, None);
        assert_eq!(record.heart_rate, None);
        assert_eq!(record.height, None);
        assert_eq!(record.blood_glucose, None);
        assert_eq!(record.mood, None);
        assert_eq!(record.notes, None);
    }

    #[test]
    fn test_date_and_time_required() {
        let err = record_from_input(&RecordInput { date: "", ..input() }).unwrap_err();
        assert_eq!(err, ValidationError::Required { field: "Date" });

        let err = record_from_input(&RecordInput { time: "7pm", ..input() }).unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidFormat {
                field: "Time",
                expected: "HH:mm"
            }
        );
    }

    #[test]
    fn test_range_boundaries() {
        assert!(record_from_input(&RecordInput { weight: "10", ..input() }).is_ok());
        assert!(record_from_input(&RecordInput { weight: "300", ..input() }).is_ok());
        assert!(matches!(
            record_from_input(&RecordInput { weight: "9.9", ..input() }),
            Err(ValidationError::OutOfRange { field: "Weight", .. })
        ));
        assert!(matches!(
            record_from_input(&RecordInput { height: "49.9", ..input() }),
            Err(ValidationError::OutOfRange { field: "Height", .. })
        ));
        assert!(record_from_input(&RecordInput { height: "250", ..input() }).is_ok());
        assert!(matches!(
            record_from_input(&RecordInput { height: "250.1", ..input() }),
            Err(ValidationError::OutOfRange { field: "Height", .. })
        ));
        assert!(record_from_input(&RecordInput { blood_glucose: "2", ..input() }).is_ok());
        assert!(matches!(
            record_from_input(&RecordInput { blood_glucose: "30.5", ..input() }),
            Err(ValidationError::OutOfRange { field: "Blood glucose", .. })
        ));
        assert!(matches!(
            record_from_input(&RecordInput { systolic: "221", ..input() }),
            Err(ValidationError::OutOfRange { field: "Systolic pressure", .. })
        ));
        assert!(matches!(
            record_from_input(&RecordInput { diastolic: "39", ..input() }),
            Err(ValidationError::OutOfRange { field: "Diastolic pressure", .. })
        ));
        assert!(matches!(
            record_from_input(&RecordInput { heart_rate: "201", ..input() }),
            Err(ValidationError::OutOfRange { field: "Heart rate", .. })
        ));
    }

    #[test]
    fn test_decimals_are_rounded_before_range_check() {
        let record = record_from_input(&RecordInput { weight: "9.96", ..input() }).unwrap();
        assert_eq!(record.weight, Some(10.0));

        let record = record_from_input(&RecordInput { blood_glucose: "30.04", ..input() }).unwrap();
        assert_eq!(record.blood_glucose, Some(30.0));

        assert!(matches!(
            record_from_input(&RecordInput { weight: "300.06", ..input() }),
            Err(ValidationError::OutOfRange { field: "Weight", .. })
        ));
    }

    #[test]
    fn test_mood_accepts_labels_and_stored_values() {
        let record = record_from_input(&RecordInput { mood: "STRESSED", ..input() }).unwrap();
        assert_eq!(record.mood.as_deref(), Some("压力大"));

        let record = record_from_input(&RecordInput { mood: "烦躁", ..input() }).unwrap();
        assert_eq!(record.mood.as_deref(), Some(Mood::Irritable.wire_value()));

        let err = record_from_input(&RecordInput { mood: "grumpy", ..input() }).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Mood must be one of: Happy, Calm, Tired, Anxious, Stressed, Sad, Excited, Irritable"
        );
    }

    #[test]
    fn test_mood_choices_match_labels() {
        let labels: Vec<_> = Mood::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(labels.join(", "), MOOD_CHOICES);
    }

    #[test]
    fn test_integer_fields_reject_decimals() {
        let err = record_from_input(&RecordInput { heart_rate: "64.5", ..input() }).unwrap_err();
        assert_eq!(err, ValidationError::NotANumber { field: "Heart rate" });
    }

    #[test]
    fn test_out_of_range_message() {
        let err = record_from_input(&RecordInput { weight: "400", ..input() }).unwrap_err();
        assert_eq!(err.to_string(), "Weight must be between 10 and 300 kg");
    }

    #[test]
    fn test_login_requires_both_fields() {
        assert!(validate_login("alice", "secret").is_ok());
        assert_eq!(
            validate_login(" ", "secret"),
            Err(ValidationError::Required { field: "Username" })
        );
        assert_eq!(
            validate_login("alice", ""),
            Err(ValidationError::Required { field: "Password" })
        );
    }

    #[test]
    fn test_registration_rules() {
        assert!(validate_registration("alice", "a@b.io", "password1", "password1").is_ok());
        assert_eq!(
            validate_registration("bob", "a@b.io", "password1", "password1"),
            Err(ValidationError::TooShort { field: "Username", min: 4 })
        );
        assert_eq!(
            validate_registration("alice", "not-an-email", "password1", "password1"),
            Err(ValidationError::InvalidEmail)
        );
        assert_eq!(
            validate_registration("alice", "a@b.io", "short", "short"),
            Err(ValidationError::TooShort { field: "Password", min: 8 })
        );
        assert_eq!(
            validate_registration("alice", "a@b.io", "password1", "password2"),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn test_date_range_filter() {
        assert_eq!(parse_date_range("", "  "), Ok(None));

        let range = parse_date_range("2024-01-01", "2024-01-31").unwrap().unwrap();
        assert_eq!(range.query_pairs()[0].1, "2024-01-01");

        assert_eq!(
            parse_date_range("2024-02-01", "2024-01-01"),
            Err(ValidationError::InvertedRange)
        );
        assert_eq!(
            parse_date_range("2024-01-01", ""),
            Err(ValidationError::Required { field: "End date" })
        );
    }
}
