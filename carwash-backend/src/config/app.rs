use std::env;

/// 保持日数の上限（約10年）
pub const MAX_RETENTION_DAYS: i64 = 3650;

/// 来店集計の設定
#[derive(Clone, Debug)]
pub struct VisitConfig {
    /// purge で残す日数
    pub retention_days: i64,
    /// 楽観的ロック競合時の最大試行回数
    pub max_retry_attempts: u32,
    /// purge の同時削除数
    pub purge_concurrency: usize,
}

impl Default for VisitConfig {
    fn default() -> Self {
        Self {
            retention_days: 365,
            max_retry_attempts: 10,
            purge_concurrency: 8,
        }
    }
}

impl VisitConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retry_attempts == 0 {
            return Err("VISIT_MAX_RETRY_ATTEMPTS must be at least 1".to_string());
        }
        if self.purge_concurrency == 0 {
            return Err("PURGE_CONCURRENCY must be at least 1".to_string());
        }
        if !(0..=MAX_RETENTION_DAYS).contains(&self.retention_days) {
            return Err(format!(
                "VISIT_RETENTION_DAYS must be between 0 and {}",
                MAX_RETENTION_DAYS
            ));
        }
        Ok(())
    }
}

/// Open-Meteo の設定
#[derive(Clone, Debug)]
pub struct WeatherConfig {
    pub api_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
    pub past_days: u32,
    pub forecast_days: u32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            latitude: 46.08,
            longitude: -118.31,
            timezone: "America/Los_Angeles".to_string(),
            past_days: 30,
            forecast_days: 7,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub database_url: String,
    pub visit: VisitConfig,
    pub weather: WeatherConfig,
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, String> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| format!("Invalid {} value", name)),
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let visit_defaults = VisitConfig::default();
        let weather_defaults = WeatherConfig::default();

        let visit = VisitConfig {
            retention_days: parse_var("VISIT_RETENTION_DAYS", visit_defaults.retention_days)?,
            max_retry_attempts: parse_var(
                "VISIT_MAX_RETRY_ATTEMPTS",
                visit_defaults.max_retry_attempts,
            )?,
            purge_concurrency: parse_var("PURGE_CONCURRENCY", visit_defaults.purge_concurrency)?,
        };
        visit.validate()?;

        Ok(Self {
            environment,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| "Invalid PORT value")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3001".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            database_url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            visit,
            weather: WeatherConfig {
                api_url: env::var("WEATHER_API_URL").unwrap_or(weather_defaults.api_url),
                latitude: parse_var("WEATHER_LATITUDE", weather_defaults.latitude)?,
                longitude: parse_var("WEATHER_LONGITUDE", weather_defaults.longitude)?,
                timezone: env::var("WEATHER_TIMEZONE").unwrap_or(weather_defaults.timezone),
                ..weather_defaults
            },
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_test(&self) -> bool {
        self.environment == "test"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// テスト用の設定を作成
    pub fn for_testing() -> Self {
        Self {
            environment: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors_allowed_origins: vec!["http://localhost:3001".to_string()],
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite::memory:".to_string()),
            visit: VisitConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}
