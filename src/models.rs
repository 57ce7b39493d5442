use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Wire format used when sending `record_time`
pub const RECORD_TIME_WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Display format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Display format for times of day
pub const TIME_FORMAT: &str = "%H:%M";

/// A single health measurement entry, owned by the remote API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<i64>,
    #[serde(with = "record_time")]
    pub record_time: NaiveDateTime,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub weight: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub height: Option<f64>,
    #[serde(default)]
    pub systolic_pressure: Option<i32>,
    #[serde(default)]
    pub diastolic_pressure: Option<i32>,
    #[serde(default)]
    pub heart_rate: Option<i32>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub blood_glucose: Option<f64>,
    /// Stored as the server-side value, see [`Mood::wire_value`]
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl HealthRecord {
    pub fn new(record_time: NaiveDateTime) -> Self {
        HealthRecord {
            id: None,
            user: None,
            record_time,
            weight: None,
            height: None,
            systolic_pressure: None,
            diastolic_pressure: None,
            heart_rate: None,
            blood_glucose: None,
            mood: None,
            notes: None,
        }
    }

    pub fn date_string(&self) -> String {
        self.record_time.format(DATE_FORMAT).to_string()
    }

    pub fn time_string(&self) -> String {
        self.record_time.format(TIME_FORMAT).to_string()
    }

    /// "120/80", "120/-" or "-"
    pub fn blood_pressure_display(&self) -> String {
        match (self.systolic_pressure, self.diastolic_pressure) {
            (None, None) => "-".to_string(),
            (s, d) => format!(
                "{}/{}",
                s.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
                d.map(|v| v.to_string()).unwrap_or_else(|| "-".into()),
            ),
        }
    }

    pub fn weight_display(&self) -> String {
        self.weight
            .map(|w| format!("{:.1}", w))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn heart_rate_display(&self) -> String {
        self.heart_rate
            .map(|h| h.to_string())
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn height_display(&self) -> String {
        self.height
            .map(|h| format!("{:.1}", h))
            .unwrap_or_else(|| "-".to_string())
    }

    pub fn blood_glucose_display(&self) -> String {
        self.blood_glucose
            .map(|g| format!("{:.1}", g))
            .unwrap_or_else(|| "-".to_string())
    }

    /// English label for known moods, the raw value otherwise
    pub fn mood_display(&self) -> String {
        match self.mood.as_deref() {
            None | Some("") => "-".to_string(),
            Some(raw) => Mood::from_wire(raw)
                .map(|m| m.label().to_string())
                .unwrap_or_else(|| raw.to_string()),
        }
    }
}

/// The fixed set of moods a record can carry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mood {
    Happy,
    Calm,
    Tired,
    Anxious,
    Stressed,
    Sad,
    Excited,
    Irritable,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Tired,
        Mood::Anxious,
        Mood::Stressed,
        Mood::Sad,
        Mood::Excited,
        Mood::Irritable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Calm => "Calm",
            Mood::Tired => "Tired",
            Mood::Anxious => "Anxious",
            Mood::Stressed => "Stressed",
            Mood::Sad => "Sad",
            Mood::Excited => "Excited",
            Mood::Irritable => "Irritable",
        }
    }

    /// Value the API stores for this mood
    pub fn wire_value(self) -> &'static str {
        match self {
            Mood::Happy => "愉快",
            Mood::Calm => "平静",
            Mood::Tired => "疲劳",
            Mood::Anxious => "焦虑",
            Mood::Stressed => "压力大",
            Mood::Sad => "悲伤",
            Mood::Excited => "兴奋",
            Mood::Irritable => "烦躁",
        }
    }

    pub fn from_wire(raw: &str) -> Option<Mood> {
        Mood::ALL.into_iter().find(|m| m.wire_value() == raw.trim())
    }

    /// Accepts the English label (any case) or the stored value
    pub fn parse(input: &str) -> Option<Mood> {
        let input = input.trim();
        Mood::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(input) || m.wire_value() == input)
    }
}

/// Parse the timestamp shapes the API is known to return.
///
/// Offsets are dropped in favour of the wall-clock time they carry.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(value) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(value);
        }
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn into_decimal<E: serde::de::Error>(self) -> Result<Option<f64>, E> {
        match self {
            NumberOrText::Number(n) => Ok(Some(n)),
            NumberOrText::Text(t) if t.trim().is_empty() => Ok(None),
            NumberOrText::Text(t) => t
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid decimal: {}", t))),
        }
    }
}

/// Decimal fields may arrive as JSON numbers or as strings such as "70.50".
fn lenient_decimal<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(d)? {
        None => Ok(None),
        Some(value) => value.into_decimal(),
    }
}

/// Like [`lenient_decimal`] for values that must be present
fn lenient_number<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    NumberOrText::deserialize(d)?
        .into_decimal::<D::Error>()?
        .ok_or_else(|| serde::de::Error::custom("expected a number"))
}

mod record_time {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{parse_timestamp, RECORD_TIME_WIRE_FORMAT};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(RECORD_TIME_WIRE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid record_time: {}", raw)))
    }
}

mod trend_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{parse_timestamp, DATE_FORMAT};

    pub fn serialize<S: Serializer>(value: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&value.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        parse_timestamp(&raw)
            .map(|t| t.date())
            .ok_or_else(|| de::Error::custom(format!("invalid trend date: {}", raw)))
    }
}

/// Inclusive date window used by the list filter and the statistics view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// The `days` days leading up to and including `today`
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        DateRange {
            start: today - Duration::days(days),
            end: today,
        }
    }

    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("start_date", self.start.format(DATE_FORMAT).to_string()),
            ("end_date", self.end.format(DATE_FORMAT).to_string()),
        ]
    }

    pub fn label(&self) -> String {
        format!(
            "{} .. {}",
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }
}

/// One point of a single-valued trend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(with = "trend_date")]
    pub date: NaiveDate,
    #[serde(deserialize_with = "lenient_number")]
    pub value: f64,
}

/// One point of the blood-pressure trend
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PressurePoint {
    #[serde(with = "trend_date")]
    pub date: NaiveDate,
    #[serde(deserialize_with = "lenient_number")]
    pub systolic: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub diastolic: f64,
}

/// Averages and trends over a query window
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawStatistics")]
pub struct HealthStatistics {
    pub weight_avg: f64,
    pub systolic_pressure_avg: f64,
    pub diastolic_pressure_avg: f64,
    pub heart_rate_avg: f64,
    pub weight_trend: Vec<TrendPoint>,
    pub blood_pressure_trend: Vec<PressurePoint>,
    pub heart_rate_trend: Vec<TrendPoint>,
}

#[derive(Deserialize)]
struct LegacyAverage {
    #[serde(default, deserialize_with = "lenient_decimal")]
    avg: Option<f64>,
}

/// Accepts both the current flat payload and the older `{weight: {avg}}` shape.
#[derive(Deserialize)]
struct RawStatistics {
    #[serde(default, deserialize_with = "lenient_decimal")]
    weight_avg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    systolic_pressure_avg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    diastolic_pressure_avg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    heart_rate_avg: Option<f64>,
    #[serde(default)]
    weight: Option<LegacyAverage>,
    #[serde(default)]
    systolic_pressure: Option<LegacyAverage>,
    #[serde(default)]
    diastolic_pressure: Option<LegacyAverage>,
    #[serde(default)]
    heart_rate: Option<LegacyAverage>,
    #[serde(default)]
    weight_trend: Option<Vec<TrendPoint>>,
    #[serde(default)]
    blood_pressure_trend: Option<Vec<PressurePoint>>,
    #[serde(default)]
    heart_rate_trend: Option<Vec<TrendPoint>>,
}

impl From<RawStatistics> for HealthStatistics {
    fn from(raw: RawStatistics) -> Self {
        let pick = |flat: Option<f64>, legacy: Option<LegacyAverage>| {
            flat.or_else(|| legacy.and_then(|l| l.avg)).unwrap_or(0.0)
        };
        HealthStatistics {
            weight_avg: pick(raw.weight_avg, raw.weight),
            systolic_pressure_avg: pick(raw.systolic_pressure_avg, raw.systolic_pressure),
            diastolic_pressure_avg: pick(raw.diastolic_pressure_avg, raw.diastolic_pressure),
            heart_rate_avg: pick(raw.heart_rate_avg, raw.heart_rate),
            weight_trend: raw.weight_trend.unwrap_or_default(),
            blood_pressure_trend: raw.blood_pressure_trend.unwrap_or_default(),
            heart_rate_trend: raw.heart_rate_trend.unwrap_or_default(),
        }
    }
}

/// Trend values of one day, merged across the three sequences
#[derive(Clone, Debug, PartialEq)]
pub struct ChartRow {
    pub date: NaiveDate,
    pub weight: Option<f64>,
    pub systolic: Option<f64>,
    pub diastolic: Option<f64>,
    pub heart_rate: Option<f64>,
}

impl ChartRow {
    fn new(date: NaiveDate) -> Self {
        ChartRow {
            date,
            weight: None,
            systolic: None,
            diastolic: None,
            heart_rate: None,
        }
    }
}

impl HealthStatistics {
    /// No trend data at all in the window
    pub fn is_empty(&self) -> bool {
        self.weight_trend.is_empty()
            && self.blood_pressure_trend.is_empty()
            && self.heart_rate_trend.is_empty()
    }

    /// Merge the trends into one row per date, oldest first
    pub fn chart_rows(&self) -> Vec<ChartRow> {
        let mut rows: BTreeMap<NaiveDate, ChartRow> = BTreeMap::new();

        for point in &self.weight_trend {
            rows.entry(point.date)
                .or_insert_with(|| ChartRow::new(point.date))
                .weight = Some(point.value);
        }
        for point in &self.blood_pressure_trend {
            let entry = rows
                .entry(point.date)
                .or_insert_with(|| ChartRow::new(point.date));
            entry.systolic = Some(point.systolic);
            entry.diastolic = Some(point.diastolic);
        }
        for point in &self.heart_rate_trend {
            rows.entry(point.date)
                .or_insert_with(|| ChartRow::new(point.date))
                .heart_rate = Some(point.value);
        }
        rows.into_values().collect()
    }
}

/// Body of `POST /auth/login/`
#[derive(Clone, Debug, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /users/`
#[derive(Clone, Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/refresh/` and `POST /auth/logout/`
#[derive(Clone, Debug, Serialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Body of `POST /users/request_password_reset/`
#[derive(Clone, Debug, Serialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Token pair returned by the login and refresh endpoints.
///
/// Refresh responses may leave out `refresh` when rotation is disabled.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_record_time_accepts_server_shapes() {
        let expected = date("2024-01-05").and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-05T08:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-05T08:30:00+08:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-05T08:30:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-05 08:30"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-05"),
            date("2024-01-05").and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_record_serialization() {
        let mut record = HealthRecord::new(date("2024-03-01").and_hms_opt(7, 45, 0).unwrap());
        record.weight = Some(70.5);
        record.systolic_pressure = Some(120);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["record_time"], "2024-03-01T07:45:00");
        assert_eq!(json["weight"], 70.5);
        assert!(json.get("id").is_none());
        assert!(json["heart_rate"].is_null());
    }

    #[test]
    fn test_record_deserialization_with_missing_measurements() {
        let record: HealthRecord = serde_json::from_str(
            r#"{"id": 7, "user": 2, "record_time": "2024-03-01T07:45:00Z", "heart_rate": 64}"#,
        )
        .unwrap();
        assert_eq!(record.id, Some(7));
        assert_eq!(record.date_string(), "2024-03-01");
        assert_eq!(record.time_string(), "07:45");
        assert_eq!(record.heart_rate_display(), "64");
        assert_eq!(record.weight_display(), "-");
        assert_eq!(record.blood_pressure_display(), "-");
    }

    #[test]
    fn test_weight_as_decimal_string() {
        let record: HealthRecord = serde_json::from_str(
            r#"{"record_time": "2024-03-01T07:45:00", "weight": "70.50"}"#,
        )
        .unwrap();
        assert_eq!(record.weight, Some(70.5));
        assert_eq!(record.weight_display(), "70.5");
    }

    #[test]
    fn test_extended_measurements() {
        let record: HealthRecord = serde_json::from_str(
            r#"{"record_time": "2024-03-01T07:45:00", "height": "175.50", "blood_glucose": 5.6, "mood": "疲劳"}"#,
        )
        .unwrap();
        assert_eq!(record.height, Some(175.5));
        assert_eq!(record.blood_glucose_display(), "5.6");
        assert_eq!(record.mood_display(), "Tired");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["height"], 175.5);
        assert_eq!(json["mood"], "疲劳");
    }

    #[test]
    fn test_mood_lookup() {
        assert_eq!(Mood::parse(" excited "), Some(Mood::Excited));
        assert_eq!(Mood::parse("悲伤"), Some(Mood::Sad));
        assert_eq!(Mood::parse("meh"), None);

        let mut record = HealthRecord::new(date("2024-03-01").and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(record.mood_display(), "-");
        record.mood = Some("custom".into());
        assert_eq!(record.mood_display(), "custom");
    }

    #[test]
    fn test_blood_pressure_display() {
        let mut record = HealthRecord::new(date("2024-03-01").and_hms_opt(0, 0, 0).unwrap());
        record.systolic_pressure = Some(118);
        assert_eq!(record.blood_pressure_display(), "118/-");
        record.diastolic_pressure = Some(76);
        assert_eq!(record.blood_pressure_display(), "118/76");
    }

    #[test]
    fn test_statistics_defaults_when_fields_missing() {
        let stats: HealthStatistics = serde_json::from_str("{}").unwrap();
        assert_eq!(stats, HealthStatistics::default());
        assert!(stats.is_empty());
        assert!(stats.chart_rows().is_empty());
    }

    #[test]
    fn test_statistics_legacy_shape() {
        let stats: HealthStatistics = serde_json::from_str(
            r#"{"weight": {"avg": 71.2}, "heart_rate": {"avg": 66}, "systolic_pressure": {}}"#,
        )
        .unwrap();
        assert_eq!(stats.weight_avg, 71.2);
        assert_eq!(stats.heart_rate_avg, 66.0);
        assert_eq!(stats.systolic_pressure_avg, 0.0);
    }

    #[test]
    fn test_statistics_accept_decimal_strings() {
        let stats: HealthStatistics = serde_json::from_str(
            r#"{
                "weight_avg": "70.25",
                "heart_rate_avg": null,
                "systolic_pressure": {"avg": "118.5"},
                "weight_trend": [{"date": "2024-01-01", "value": "70.50"}],
                "blood_pressure_trend": [{"date": "2024-01-01", "systolic": "121", "diastolic": 79}]
            }"#,
        )
        .unwrap();
        assert_eq!(stats.weight_avg, 70.25);
        assert_eq!(stats.heart_rate_avg, 0.0);
        assert_eq!(stats.systolic_pressure_avg, 118.5);
        assert_eq!(stats.weight_trend[0].value, 70.5);
        assert_eq!(stats.blood_pressure_trend[0].systolic, 121.0);

        let bad = serde_json::from_str::<HealthStatistics>(
            r#"{"weight_trend": [{"date": "2024-01-01", "value": "heavy"}]}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_chart_rows_merge_and_sort() {
        let stats: HealthStatistics = serde_json::from_str(
            r#"{
                "weight_trend": [{"date": "2024-01-03", "value": 70.1}, {"date": "2023-12-30", "value": 70.9}],
                "blood_pressure_trend": [{"date": "2024-01-03", "systolic": 121, "diastolic": 79}],
                "heart_rate_trend": [{"date": "2024-01-01", "value": 62}]
            }"#,
        )
        .unwrap();

        let rows = stats.chart_rows();
        let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date("2023-12-30"), date("2024-01-01"), date("2024-01-03")]);
        assert_eq!(rows[2].weight, Some(70.1));
        assert_eq!(rows[2].systolic, Some(121.0));
        assert_eq!(rows[1].heart_rate, Some(62.0));
        assert_eq!(rows[1].weight, None);
    }

    #[test]
    fn test_date_range_query_pairs() {
        let range = DateRange::new(date("2024-01-01"), date("2024-01-31"));
        let pairs = range.query_pairs();
        assert_eq!(pairs[0], ("start_date", "2024-01-01".to_string()));
        assert_eq!(pairs[1], ("end_date", "2024-01-31".to_string()));
    }

    #[test]
    fn test_last_days_window() {
        let range = DateRange::last_days(date("2024-03-31"), 30);
        assert_eq!(range.start, date("2024-03-01"));
        assert_eq!(range.end, date("2024-03-31"));
    }

    #[test]
    fn test_token_pair_without_refresh() {
        let pair: TokenPair = serde_json::from_str(r#"{"access": "abc"}"#).unwrap();
        assert_eq!(pair.access, "abc");
        assert!(pair.refresh.is_none());
    }
}
