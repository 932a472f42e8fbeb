use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::combat::rng::entropy_seed;
use crate::combat::{ShipType, SimulationError};
use crate::data::scenario::ScenarioConfig;
use crate::data::validate::{ValidationReport, ValidationSeverity};
use crate::server::ServerConfig;
use crate::simulator::{simulate_parallel, SimulationResult};

/// Upper bound on iterations a single request may ask for.
pub const MAX_ITERATIONS: u32 = 100_000;

#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub context: String,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationErrorResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub errors: Vec<ValidationIssue>,
}

impl From<&ValidationReport> for ValidationErrorResponse {
    fn from(report: &ValidationReport) -> Self {
        let mut errors: Vec<ValidationIssue> = Vec::new();
        for diag in report
            .diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
        {
            match errors.iter_mut().find(|issue| issue.context == diag.context) {
                Some(issue) => issue.messages.push(diag.message.clone()),
                None => errors.push(ValidationIssue {
                    context: diag.context.clone(),
                    messages: vec![diag.message.clone()],
                }),
            }
        }
        Self {
            status: "error",
            message: "Validation failed",
            errors,
        }
    }
}

#[derive(Debug, Error)]
pub enum SimulateError {
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid scenario")]
    Validation(ValidationErrorResponse),
    #[error("{0}")]
    Simulation(#[from] SimulationError),
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "broadside-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Clone, Serialize)]
pub struct ShipTypeItem {
    pub name: &'static str,
    pub npc: bool,
}

pub fn ship_types_payload() -> Result<String, serde_json::Error> {
    let items: Vec<ShipTypeItem> = ShipType::ALL
        .iter()
        .map(|ship_type| ShipTypeItem {
            name: ship_type.as_str(),
            npc: ship_type.is_npc(),
        })
        .collect();
    serde_json::to_string_pretty(&items)
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulateResponse {
    pub status: &'static str,
    pub iterations: u32,
    pub seed: u64,
    pub duration_ms: u128,
    pub result: SimulationResult,
}

/// Runs a scenario posted as JSON. Missing `iterations` falls back to the server
/// default; anything above [`MAX_ITERATIONS`] is capped.
pub fn simulate_payload(body: &str, config: &ServerConfig) -> Result<String, SimulateError> {
    let scenario: ScenarioConfig = serde_json::from_str(body)?;
    let report = scenario.validate();
    if report.has_errors() {
        warn!(errors = report.count(ValidationSeverity::Error), "rejected scenario: {report}");
        return Err(SimulateError::Validation(ValidationErrorResponse::from(&report)));
    }

    let iterations = scenario
        .iterations
        .unwrap_or(config.default_iterations)
        .clamp(1, MAX_ITERATIONS);
    let seed = scenario.seed.unwrap_or_else(entropy_seed);

    let started = Instant::now();
    let result = simulate_parallel(&scenario.fleets, iterations, seed, &config.pool)?;
    let duration_ms = started.elapsed().as_millis();
    info!(
        fleets = scenario.fleets.len(),
        iterations,
        seed,
        duration_ms = duration_ms as u64,
        "simulate request served"
    );

    Ok(serde_json::to_string_pretty(&SimulateResponse {
        status: "ok",
        iterations,
        seed,
        duration_ms,
        result,
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_response_groups_by_context() {
        let mut report = ValidationReport::default();
        report.push(ValidationSeverity::Error, "fleets", "too few");
        report.push(ValidationSeverity::Warning, "fleets[0]", "ignored");
        report.push(ValidationSeverity::Error, "fleets", "still too few");
        let response = ValidationErrorResponse::from(&report);
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].messages.len(), 2);
    }

    #[test]
    fn ship_types_flag_npcs() {
        let body = ship_types_payload().expect("ship types serialize");
        let items: Vec<serde_json::Value> =
            serde_json::from_str(&body).expect("payload is a json array");
        assert_eq!(items.len(), ShipType::ALL.len());
        let gcds = items.iter().find(|item| item["name"] == "GCDS");
        assert_eq!(gcds.map(|item| item["npc"].clone()), Some(serde_json::json!(true)));
    }

    #[test]
    fn iterations_are_capped() {
        let body = r#"{
            "iterations": 500000,
            "seed": 3,
            "fleets": [
                { "name": "a", "ships": [ { "type": "Interceptor" } ] },
                { "name": "b", "ships": [ { "type": "Interceptor" } ] }
            ]
        }"#;
        let payload =
            simulate_payload(body, &ServerConfig::default()).expect("unarmed scenario simulates");
        let value: serde_json::Value = serde_json::from_str(&payload).expect("response is json");
        assert_eq!(value["iterations"], MAX_ITERATIONS);
        assert_eq!(value["result"]["victory_probability"]["b"], 1.0);
    }
}
