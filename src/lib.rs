//! Lead and case scoring engine.
//!
//! Turns case records into a normalized priority score, letter grade, conversion estimate and a
//! short list of next actions, driven by a configurable weighted rule set.

pub mod config;
pub mod error;
pub mod scoring;
pub mod telemetry;

use config::AppConfig;
use error::AppError;
use scoring::ScoringOptions;

/// Load configuration, install the tracing subscriber and derive the orchestrator options.
///
/// Embedding processes call this once at startup before wiring their store adapters into
/// `scoring::LeadScoringService`.
pub fn bootstrap() -> Result<(AppConfig, ScoringOptions), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let options = ScoringOptions::from(&config);
    tracing::info!(
        environment = ?config.environment,
        batch_concurrency = options.batch_concurrency,
        exploration = ?options.exploration,
        emit_events = options.emit_events,
        "lead scoring engine configured"
    );
    Ok((config, options))
}
