// carwash-backend/src/service/weather_service.rs

//! Open-Meteo の日次予報と来店数の突き合わせ

use crate::config::WeatherConfig;
use crate::error::{AppError, AppResult};
use crate::log_with_context;
use crate::service::visit_service::VisitService;
use crate::types::DateKey;
use crate::utils::error_helper::external_service_error;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// 来店数と比較する過去日数
pub const CORRELATION_DAYS: i64 = 30;

const DAILY_FIELDS: &str = "weather_code,temperature_2m_max,temperature_2m_min,precipitation_sum";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherSeverity {
    Good,
    Neutral,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherDescription {
    pub label: String,
    pub severity: WeatherSeverity,
}

/// WMO 天気コードをラベルと良し悪しに変換
pub fn describe_weather_code(code: i64) -> WeatherDescription {
    use WeatherSeverity::*;

    let known = match code {
        0 => Some(("Clear sky", Good)),
        1 => Some(("Mainly clear", Good)),
        2 => Some(("Partly cloudy", Good)),
        3 => Some(("Overcast", Neutral)),
        45 => Some(("Fog", Poor)),
        48 => Some(("Depositing rime fog", Poor)),
        51 => Some(("Light drizzle", Poor)),
        53 => Some(("Moderate drizzle", Poor)),
        55 => Some(("Dense drizzle", Poor)),
        56 => Some(("Freezing drizzle", Poor)),
        57 => Some(("Dense freezing drizzle", Poor)),
        61 => Some(("Slight rain", Poor)),
        63 => Some(("Moderate rain", Poor)),
        65 => Some(("Heavy rain", Poor)),
        66 => Some(("Freezing rain", Poor)),
        67 => Some(("Heavy freezing rain", Poor)),
        71 => Some(("Slight snow", Poor)),
        73 => Some(("Moderate snow", Poor)),
        75 => Some(("Heavy snow", Poor)),
        77 => Some(("Snow grains", Poor)),
        80 => Some(("Slight rain showers", Poor)),
        81 => Some(("Moderate rain showers", Poor)),
        82 => Some(("Violent rain showers", Poor)),
        85 => Some(("Slight snow showers", Poor)),
        86 => Some(("Heavy snow showers", Poor)),
        95 => Some(("Thunderstorm", Poor)),
        96 => Some(("Thunderstorm with hail", Poor)),
        99 => Some(("Thunderstorm with heavy hail", Poor)),
        _ => None,
    };

    match known {
        Some((label, severity)) => WeatherDescription {
            label: label.to_string(),
            severity,
        },
        None => WeatherDescription {
            label: format!("Unknown ({})", code),
            severity: Neutral,
        },
    }
}

/// Open-Meteo の daily ブロック（配列は time と同じ長さ）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OpenMeteoDaily {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub weather_code: Vec<Option<i64>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenMeteoResponse {
    /// 要求した timezone の UTC オフセット
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub daily: Option<OpenMeteoDaily>,
}

/// 日次予報（日付は要求した timezone のローカル日付）
#[derive(Debug, Clone)]
pub struct DailyForecast {
    pub utc_offset_seconds: i32,
    pub daily: OpenMeteoDaily,
}

impl DailyForecast {
    /// 予報側のタイムゾーンで見た今日
    pub fn local_today(&self) -> DateKey {
        DateKey::today_at_offset(self.utc_offset_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherDay {
    pub date: String,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub precipitation: Option<f64>,
    pub weather_code: Option<i64>,
    pub weather_label: String,
    pub weather_severity: WeatherSeverity,
    /// 過去日のみ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visits: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorrelationStats {
    pub avg_visits_good_weather: i64,
    pub avg_visits_poor_weather: i64,
    pub total_days: usize,
    pub good_weather_days: usize,
    pub poor_weather_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub historical: Vec<WeatherDay>,
    pub forecast: Vec<WeatherDay>,
    pub stats: CorrelationStats,
}

fn rounded_average(values: &[i64]) -> i64 {
    if values.is_empty() {
        0
    } else {
        (values.iter().sum::<i64>() as f64 / values.len() as f64).round() as i64
    }
}

/// 天気と来店数を日付キーで結合する
///
/// today 以前は過去（来店数つき、なければ 0）、それより後は予報。
pub fn build_weather_report(
    today: &str,
    daily: &OpenMeteoDaily,
    visits_by_date: &HashMap<String, i64>,
) -> WeatherReport {
    let mut historical = Vec::new();
    let mut forecast = Vec::new();

    for (i, date) in daily.time.iter().enumerate() {
        let code = daily.weather_code.get(i).copied().flatten();
        let description = code.map_or_else(
            || WeatherDescription {
                label: "Unknown".to_string(),
                severity: WeatherSeverity::Neutral,
            },
            describe_weather_code,
        );
        let is_past = date.as_str() <= today;

        let day = WeatherDay {
            date: date.clone(),
            temp_max: daily.temperature_2m_max.get(i).copied().flatten(),
            temp_min: daily.temperature_2m_min.get(i).copied().flatten(),
            precipitation: daily.precipitation_sum.get(i).copied().flatten(),
            weather_code: code,
            weather_label: description.label,
            weather_severity: description.severity,
            visits: is_past.then(|| visits_by_date.get(date).copied().unwrap_or(0)),
        };

        if is_past {
            historical.push(day);
        } else {
            forecast.push(day);
        }
    }
    historical.sort_by(|a, b| a.date.cmp(&b.date));

    let visits_with = |severity: WeatherSeverity| -> Vec<i64> {
        historical
            .iter()
            .filter(|d| d.weather_severity == severity)
            .filter_map(|d| d.visits)
            .collect()
    };
    let good = visits_with(WeatherSeverity::Good);
    let poor = visits_with(WeatherSeverity::Poor);

    let stats = CorrelationStats {
        avg_visits_good_weather: rounded_average(&good),
        avg_visits_poor_weather: rounded_average(&poor),
        total_days: historical.len(),
        good_weather_days: good.len(),
        poor_weather_days: poor.len(),
    };

    WeatherReport {
        historical,
        forecast,
        stats,
    }
}

/// Open-Meteo クライアント
#[derive(Clone)]
pub struct WeatherClient {
    http: reqwest::Client,
    config: WeatherConfig,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| external_service_error(e, "WeatherClient::new"))?;
        Ok(Self { http, config })
    }

    pub async fn fetch_daily_forecast(&self) -> AppResult<DailyForecast> {
        let response = self
            .http
            .get(&self.config.api_url)
            .query(&[
                ("latitude", self.config.latitude.to_string()),
                ("longitude", self.config.longitude.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("timezone", self.config.timezone.clone()),
                ("past_days", self.config.past_days.to_string()),
                ("forecast_days", self.config.forecast_days.to_string()),
                ("temperature_unit", "fahrenheit".to_string()),
            ])
            .send()
            .await
            .map_err(|e| external_service_error(e, "WeatherClient::fetch_daily_forecast"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = if body.is_empty() {
                status.canonical_reason().unwrap_or_default().to_string()
            } else {
                body
            };
            return Err(external_service_error(
                format!("Open-Meteo API error {}: {}", status.as_u16(), detail),
                "WeatherClient::fetch_daily_forecast",
            ));
        }

        let payload: OpenMeteoResponse = response
            .json()
            .await
            .map_err(|e| external_service_error(e, "WeatherClient::fetch_daily_forecast"))?;

        let daily = payload.daily.ok_or_else(|| {
            AppError::ExternalServiceError("Invalid weather data received from API".to_string())
        })?;

        Ok(DailyForecast {
            utc_offset_seconds: payload.utc_offset_seconds,
            daily,
        })
    }
}

pub struct WeatherService {
    client: WeatherClient,
    visits: Arc<VisitService>,
}

impl WeatherService {
    pub fn new(client: WeatherClient, visits: Arc<VisitService>) -> Self {
        Self { client, visits }
    }

    /// 過去30日の天気と来店数、および今後の予報
    ///
    /// 過去と予報の境目は予報側のタイムゾーンの今日。来店集計は日付キーの
    /// 文字列で突き合わせる。
    pub async fn weather_report(&self) -> AppResult<WeatherReport> {
        let forecast = self.client.fetch_daily_forecast().await?;

        let today = forecast.local_today();
        let start = today.days_before(CORRELATION_DAYS);
        let visits_by_date: HashMap<String, i64> = self
            .visits
            .get_range(&start.as_string(), &today.as_string())
            .await?
            .into_iter()
            .map(|row| (row.date_key, row.count))
            .collect();

        let report = build_weather_report(&today.as_string(), &forecast.daily, &visits_by_date);

        log_with_context!(
            tracing::Level::DEBUG,
            "Weather report built",
            "historical_days" => report.historical.len(),
            "forecast_days" => report.forecast.len()
        );

        Ok(report)
    }
}
