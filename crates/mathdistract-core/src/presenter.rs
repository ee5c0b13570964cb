//! Presentation of a single problem and capture of its response.
//!
//! A problem is either shown all at once or revealed term by term. In both
//! cases the response wait starts at the onset of the last stimulus and is
//! bounded by the set deadline.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::ExperimentConfig;
use crate::evaluator::{Outcome, ResponseEvaluator};
use crate::model::{Problem, Timestamp};
use crate::record::{LogRecord, ScoredResponse};
use crate::traits::{Devices, Placement, ResponseRequest, Stimulus, StimulusId};

/// Marker shown after the last term in sequential mode.
pub const EQUALS_LABEL: &str = "=";

/// Display options for problems.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationSettings {
    pub sequential: bool,
    pub number_duration_ms: u64,
    pub number_isi_ms: u64,
    pub text_size: f32,
}

impl From<&ExperimentConfig> for PresentationSettings {
    fn from(config: &ExperimentConfig) -> Self {
        Self {
            sequential: config.timing.sequential,
            number_duration_ms: config.timing.number_duration_ms,
            number_isi_ms: config.timing.number_isi_ms,
            text_size: config.display.text_size,
        }
    }
}

/// Labels revealed one at a time in sequential mode: each term, then "=".
///
/// Operators are not shown; they are assumed constant across a session.
#[derive(Debug)]
pub struct TermSequence {
    labels: std::vec::IntoIter<String>,
}

impl TermSequence {
    pub fn new(problem: &Problem) -> Self {
        let mut labels: Vec<String> = problem.terms.iter().map(|t| t.to_string()).collect();
        labels.push(EQUALS_LABEL.to_string());
        Self {
            labels: labels.into_iter(),
        }
    }
}

impl Iterator for TermSequence {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.labels.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.labels.size_hint()
    }
}

/// Onset of one sequentially revealed label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermOnset {
    pub label: String,
    pub at: Timestamp,
}

/// What happened when a problem was shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentedProblem {
    /// Left-hand side text.
    pub problem: String,
    /// Proposed answer text (empty outside true/false mode).
    pub proposed: String,
    /// Onset of the final stimulus; reaction times are measured from here.
    pub onset: Timestamp,
    #[serde(default)]
    pub term_onsets: Vec<TermOnset>,
    pub outcome: Outcome,
}

/// Show `problem`, wait for a response until `deadline_ms` at the latest,
/// log it, and clear the screen.
pub async fn present_problem(
    devices: &Devices<'_>,
    problem: &Problem,
    settings: &PresentationSettings,
    evaluator: &ResponseEvaluator,
    deadline_ms: u64,
    trial: i64,
) -> Result<PresentedProblem> {
    let visual = devices.visual;
    let clock = devices.clock;
    let lhs = problem.lhs();
    let rhs = problem.rhs();
    let size = settings.text_size;

    let mut term_onsets = Vec::new();
    let (onset, shown) = if settings.sequential {
        let mut current: Option<StimulusId> = None;
        for label in TermSequence::new(problem) {
            if let Some(prev) = current.take() {
                blank_gap(devices, prev, settings.number_isi_ms).await;
            }
            let id = visual.show(&Stimulus::text(&label, size), Placement::Centered);
            let at = visual.update_screen(clock);
            tracing::trace!(trial, label = %label, at = at.ms, "term onset");
            term_onsets.push(TermOnset { label, at });
            clock.delay(settings.number_duration_ms, 0).await;
            current = Some(id);
        }
        if let Some(prev) = current {
            blank_gap(devices, prev, settings.number_isi_ms).await;
        }
        let rhs_id = visual.show(&Stimulus::text(&rhs, size), Placement::Centered);
        (visual.update_screen(clock), vec![rhs_id])
    } else {
        let lhs_id = visual.show(
            &Stimulus::text(&lhs, size),
            Placement::Proportional {
                x: 0.5 - size,
                y: 0.5,
            },
        );
        let rhs_id = visual.show(&Stimulus::text(&rhs, size), Placement::RightOf(lhs_id));
        (visual.update_screen(clock), vec![lhs_id, rhs_id])
    };

    let request = ResponseRequest {
        choices: evaluator.choices(),
        max_wait_ms: deadline_ms.saturating_sub(clock.now()),
    };
    let capture = devices.input.wait(&request, clock).await;

    for term in &term_onsets {
        devices.log.log(
            term.at,
            &LogRecord::Term {
                trial,
                label: term.label.clone(),
            },
        )?;
    }

    let outcome = evaluator.evaluate(problem, &capture, onset);
    let response = outcome.rt().map(|rt| ScoredResponse {
        correct: outcome.is_correct(),
        rt,
    });
    devices.log.log(
        onset,
        &LogRecord::Prob {
            trial,
            problem: lhs.clone(),
            proposed: rhs.clone(),
            response,
        },
    )?;

    for id in shown {
        visual.unshow(id);
    }
    visual.update_screen(clock);

    Ok(PresentedProblem {
        problem: lhs,
        proposed: rhs,
        onset,
        term_onsets,
        outcome,
    })
}

/// Remove the previous label and hold a blank screen for `isi_ms`.
async fn blank_gap(devices: &Devices<'_>, previous: StimulusId, isi_ms: u64) {
    devices.visual.unshow(previous);
    if isi_ms > 0 {
        devices.visual.update_screen(devices.clock);
        devices.clock.delay(isi_ms, 0).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Operator;

    #[test]
    fn term_sequence_ends_with_equals() {
        let problem = Problem {
            terms: vec![4, 7, 1],
            ops: vec![Operator::Add, Operator::Add],
            answer: 12,
            proposed: Some(12),
        };
        let sequence = TermSequence::new(&problem);
        assert_eq!(sequence.size_hint(), (4, Some(4)));
        let labels: Vec<String> = sequence.collect();
        assert_eq!(labels, vec!["4", "7", "1", "="]);
    }

    #[test]
    fn settings_follow_config() {
        let mut config = ExperimentConfig::default();
        config.timing.sequential = true;
        config.timing.number_isi_ms = 150;
        let settings = PresentationSettings::from(&config);
        assert!(settings.sequential);
        assert_eq!(settings.number_isi_ms, 150);
        assert_eq!(settings.number_duration_ms, 800);
    }
}
