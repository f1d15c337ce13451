use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Artificial latency of the simulated collaborators.
    pub analysis_delay: Duration,
    pub question_delay: Duration,
    pub scoring_delay: Duration,
    pub evaluation_delay: Duration,
    /// Upper bound on any single collaborator call.
    pub collaborator_timeout: Duration,
    pub technical_score_weight: f64,
    pub demo_score_min: u8,
    pub demo_score_max: u8,
    /// Sessions untouched for longer than this are dropped.
    pub session_idle_timeout: Duration,
    pub session_sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            analysis_delay: Duration::from_millis(2000),
            question_delay: Duration::from_millis(2000),
            scoring_delay: Duration::from_millis(1500),
            evaluation_delay: Duration::from_millis(2000),
            collaborator_timeout: Duration::from_secs(30),
            technical_score_weight: 0.6,
            demo_score_min: 7,
            demo_score_max: 10,
            session_idle_timeout: Duration::from_secs(3600),
            session_sweep_interval: Duration::from_secs(60),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let millis = |key: &str, default: Duration| -> Result<Duration> {
            Ok(Duration::from_millis(parse_var(
                key,
                lookup(key),
                default.as_millis() as u64,
            )?))
        };
        let secs = |key: &str, default: Duration| -> Result<Duration> {
            Ok(Duration::from_secs(parse_var(
                key,
                lookup(key),
                default.as_secs(),
            )?))
        };

        let config = Config {
            port: parse_var("PORT", lookup("PORT"), defaults.port)?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            analysis_delay: millis("ANALYSIS_DELAY_MS", defaults.analysis_delay)?,
            question_delay: millis("QUESTION_DELAY_MS", defaults.question_delay)?,
            scoring_delay: millis("SCORING_DELAY_MS", defaults.scoring_delay)?,
            evaluation_delay: millis("EVALUATION_DELAY_MS", defaults.evaluation_delay)?,
            collaborator_timeout: secs("COLLABORATOR_TIMEOUT_SECS", defaults.collaborator_timeout)?,
            technical_score_weight: parse_var(
                "TECHNICAL_SCORE_WEIGHT",
                lookup("TECHNICAL_SCORE_WEIGHT"),
                defaults.technical_score_weight,
            )?,
            demo_score_min: parse_var(
                "DEMO_SCORE_MIN",
                lookup("DEMO_SCORE_MIN"),
                defaults.demo_score_min,
            )?,
            demo_score_max: parse_var(
                "DEMO_SCORE_MAX",
                lookup("DEMO_SCORE_MAX"),
                defaults.demo_score_max,
            )?,
            session_idle_timeout: secs("SESSION_IDLE_TIMEOUT_SECS", defaults.session_idle_timeout)?,
            session_sweep_interval: secs(
                "SESSION_SWEEP_INTERVAL_SECS",
                defaults.session_sweep_interval,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.technical_score_weight) {
            bail!(
                "TECHNICAL_SCORE_WEIGHT must be between 0 and 1, got {}",
                self.technical_score_weight
            );
        }
        if self.demo_score_max > 10 {
            bail!("DEMO_SCORE_MAX must be at most 10, got {}", self.demo_score_max);
        }
        if self.demo_score_min > self.demo_score_max {
            bail!(
                "DEMO_SCORE_MIN ({}) must not exceed DEMO_SCORE_MAX ({})",
                self.demo_score_min,
                self.demo_score_max
            );
        }
        if self.collaborator_timeout.is_zero() {
            bail!("COLLABORATOR_TIMEOUT_SECS must be greater than 0");
        }
        if self.session_idle_timeout.is_zero() {
            bail!("SESSION_IDLE_TIMEOUT_SECS must be greater than 0");
        }
        if self.session_sweep_interval.is_zero() {
            bail!("SESSION_SWEEP_INTERVAL_SECS must be greater than 0");
        }
        Ok(())
    }
}

/// Parses `value` if present, falling back to `default` when the variable is unset.
fn parse_var<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
