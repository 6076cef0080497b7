use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;
/// Upper bound for `SCORING_BATCH_CONCURRENCY`; one worker slot per permit.
pub const MAX_BATCH_CONCURRENCY: usize = tokio::sync::Semaphore::MAX_PERMITS;
const DEFAULT_EXPLORATION_SPREAD: f64 = 10.0;
pub const MAX_EXPLORATION_SPREAD: f64 = 25.0;

/// Top-level configuration for the scoring engine.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub scoring: ScoringSettings,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("SCORING_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let batch_concurrency = env::var("SCORING_BATCH_CONCURRENCY")
            .unwrap_or_else(|_| DEFAULT_BATCH_CONCURRENCY.to_string())
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|value| (1..=MAX_BATCH_CONCURRENCY).contains(value))
            .ok_or(ConfigError::InvalidConcurrency)?;

        let exploration_spread = match env::var("SCORING_EXPLORATION_SPREAD") {
            Ok(raw) => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite() && (0.0..=MAX_EXPLORATION_SPREAD).contains(value))
                .ok_or(ConfigError::InvalidExplorationSpread)?,
            Err(_) => DEFAULT_EXPLORATION_SPREAD,
        };

        let exploration_seed = env::var("SCORING_EXPLORATION_SEED")
            .unwrap_or_else(|_| "0".to_string())
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidExplorationSeed)?;

        let emit_events = match env::var("SCORING_EMIT_EVENTS") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                variable: "SCORING_EMIT_EVENTS",
            })?,
            Err(_) => true,
        };

        let log_level = env::var("SCORING_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            scoring: ScoringSettings {
                batch_concurrency,
                exploration_spread,
                exploration_seed,
                emit_events,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }

    /// Exploration spread actually applied; the test stage always scores deterministically.
    pub fn effective_exploration_spread(&self) -> f64 {
        match self.environment {
            AppEnvironment::Test => 0.0,
            _ => self.scoring.exploration_spread,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Knobs for the scoring orchestrator.
#[derive(Debug, Clone)]
pub struct ScoringSettings {
    pub batch_concurrency: usize,
    pub exploration_spread: f64,
    pub exploration_seed: u64,
    pub emit_events: bool,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidConcurrency,
    InvalidExplorationSpread,
    InvalidExplorationSeed,
    InvalidFlag { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidConcurrency => {
                write!(
                    f,
                    "SCORING_BATCH_CONCURRENCY must be an integer between 1 and {MAX_BATCH_CONCURRENCY}"
                )
            }
            ConfigError::InvalidExplorationSpread => write!(
                f,
                "SCORING_EXPLORATION_SPREAD must be a number between 0 and {MAX_EXPLORATION_SPREAD}"
            ),
            ConfigError::InvalidExplorationSeed => {
                write!(f, "SCORING_EXPLORATION_SEED must be a valid u64")
            }
            ConfigError::InvalidFlag { variable } => {
                write!(f, "{variable} must be true or false")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
