//! Scenario outcome reporting (text and JSON)

use anyhow::Result;
use serde::Serialize;
use std::fmt;

/// Output format for the scenario report
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Text => write!(f, "text"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

/// Result of one demo scenario run
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name (as accepted by --scenario)
    pub scenario: String,
    /// Number of dispatch passes performed
    pub dispatches: usize,
    /// Total delegate invocations observed
    pub invocations: usize,
    /// Human-readable lines describing what happened
    pub details: Vec<String>,
}

impl ScenarioOutcome {
    pub fn new(scenario: &str) -> Self {
        Self {
            scenario: scenario.to_string(),
            dispatches: 0,
            invocations: 0,
            details: Vec::new(),
        }
    }

    /// Append a detail line
    pub fn note(&mut self, line: impl Into<String>) {
        self.details.push(line.into());
    }
}

/// Print all outcomes in the requested format
pub fn print(outcomes: &[ScenarioOutcome], format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => {
            for outcome in outcomes {
                println!("───────────────────────────────────────────────");
                println!("Scenario: {}", outcome.scenario);
                println!(
                    "  dispatches: {}  invocations: {}",
                    outcome.dispatches, outcome.invocations
                );
                for line in &outcome.details {
                    println!("  {}", line);
                }
            }
            println!("───────────────────────────────────────────────");
            println!("{} scenario(s) completed", outcomes.len());
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(outcomes)?);
        }
    }
    Ok(())
}
