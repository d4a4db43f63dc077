use crate::error::AppError;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// 日次集計のキー（UTC の "YYYY-MM-DD"）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn today() -> Self {
        Self(Utc::now().date_naive())
    }

    /// UTC からのオフセット（秒）で見た今日。不正なオフセットは UTC 扱い
    pub fn today_at_offset(offset_seconds: i32) -> Self {
        Self::at_offset(Utc::now(), offset_seconds)
    }

    pub fn at_offset(now: DateTime<Utc>, offset_seconds: i32) -> Self {
        match FixedOffset::east_opt(offset_seconds) {
            Some(offset) => Self(now.with_timezone(&offset).date_naive()),
            None => Self(now.date_naive()),
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn parse(value: &str) -> Result<Self, AppError> {
        // chrono は桁数に寛容なので長さも確認する
        if value.len() != 10 {
            return Err(invalid_date_key(value));
        }
        NaiveDate::parse_from_str(value, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| invalid_date_key(value))
    }

    /// その日の 00:00:00 (UTC)
    pub fn start_of_day(&self) -> DateTime<Utc> {
        self.0.and_time(NaiveTime::MIN).and_utc()
    }

    /// その日の 23:59:59.999 (UTC)
    pub fn end_of_day(&self) -> DateTime<Utc> {
        self.start_of_day() + Duration::days(1) - Duration::milliseconds(1)
    }

    pub fn days_before(&self, days: i64) -> Self {
        Self(self.0 - Duration::days(days))
    }

    pub fn days_after(&self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    pub fn as_string(&self) -> String {
        self.0.format(DATE_KEY_FORMAT).to_string()
    }
}

fn invalid_date_key(value: &str) -> AppError {
    AppError::ValidationError(format!(
        "Invalid date '{}': expected YYYY-MM-DD",
        value
    ))
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl Serialize for DateKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(serde::de::Error::custom)
    }
}
