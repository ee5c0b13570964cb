//! Session reports with JSON persistence and summary statistics.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ExperimentConfig;
use crate::evaluator::Outcome;
use crate::scheduler::TrialRecord;

/// Everything recorded in one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Configuration the session ran with.
    pub config: ExperimentConfig,
    pub sets: Vec<TrialRecord>,
    pub summary: SessionSummary,
}

/// Totals over a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub per_set: Vec<SetSummary>,
    pub presented: usize,
    pub correct: usize,
    pub no_response: usize,
    /// Correct over responded problems.
    pub accuracy: f64,
    /// Mean reaction time over responded problems.
    pub mean_rt_ms: Option<f64>,
}

/// Statistics for one set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSummary {
    pub trial: i64,
    pub presented: usize,
    pub correct: usize,
    pub no_response: usize,
    pub accuracy: f64,
    pub mean_rt_ms: Option<f64>,
    pub rest_shown: bool,
    pub battery_exhausted: bool,
}

impl SessionReport {
    pub fn new(config: ExperimentConfig, sets: Vec<TrialRecord>) -> Self {
        let summary = summarize(&sets);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            config,
            sets,
            summary,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

/// Compute per-set and overall statistics.
pub fn summarize(sets: &[TrialRecord]) -> SessionSummary {
    let per_set: Vec<SetSummary> = sets
        .iter()
        .map(|record| {
            let stats = ResponseStats::collect(std::slice::from_ref(record));
            SetSummary {
                trial: record.trial,
                presented: record.presented,
                correct: record.correct,
                no_response: stats.no_response,
                accuracy: stats.accuracy(),
                mean_rt_ms: stats.mean_rt_ms(),
                rest_shown: record.rest_shown,
                battery_exhausted: record.battery_exhausted,
            }
        })
        .collect();

    let stats = ResponseStats::collect(sets);
    SessionSummary {
        presented: sets.iter().map(|s| s.presented).sum(),
        correct: sets.iter().map(|s| s.correct).sum(),
        no_response: stats.no_response,
        accuracy: stats.accuracy(),
        mean_rt_ms: stats.mean_rt_ms(),
        per_set,
    }
}

#[derive(Default)]
struct ResponseStats {
    responded: usize,
    correct: usize,
    no_response: usize,
    rt_total_ms: i64,
}

impl ResponseStats {
    fn collect(sets: &[TrialRecord]) -> Self {
        let mut stats = Self::default();
        for problem in sets.iter().flat_map(|s| &s.problems) {
            match problem.outcome {
                Outcome::NoResponse => stats.no_response += 1,
                Outcome::Correct { rt } | Outcome::Incorrect { rt } => {
                    stats.responded += 1;
                    stats.rt_total_ms += rt.delta_ms;
                    if problem.outcome.is_correct() {
                        stats.correct += 1;
                    }
                }
            }
        }
        stats
    }

    fn accuracy(&self) -> f64 {
        if self.responded == 0 {
            0.0
        } else {
            self.correct as f64 / self.responded as f64
        }
    }

    fn mean_rt_ms(&self) -> Option<f64> {
        (self.responded > 0).then(|| self.rt_total_ms as f64 / self.responded as f64)
    }
}
