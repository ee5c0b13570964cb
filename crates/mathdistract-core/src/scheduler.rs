//! Deadline-bounded scheduling of one distraction set.
//!
//! The scheduler presents problems from a battery until the next one could
//! no longer get its full response window, then fills whatever is left of
//! the budget with the rest indicator. A run always lasts exactly the
//! configured budget: time left over because the battery ran out goes to the
//! rest phase.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::{ExperimentConfig, FeedbackConfig, TimingConfig};
use crate::error::DistractError;
use crate::evaluator::{Outcome, ResponseEvaluator};
use crate::model::{Battery, Timestamp};
use crate::presenter::{present_problem, PresentationSettings, PresentedProblem};
use crate::record::LogRecord;
use crate::traits::{Devices, Placement, Stimulus, StimulusId};

/// Timing limits for one set, fixed when the set starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBudget {
    pub start_ms: u64,
    /// Absolute end of the set.
    pub deadline_ms: u64,
    /// Time that must remain for a new problem to start.
    pub min_problem_ms: u64,
    /// Display time plus minimum response time of one problem.
    pub window_ms: u64,
    pub problem_isi_ms: u64,
    pub problem_jitter_ms: u64,
    pub number_duration_ms: u64,
    pub number_isi_ms: u64,
    pub sequential: bool,
}

impl TimeBudget {
    /// Plan a set starting at `start_ms`.
    ///
    /// The minimum problem time grows by the sequential display time and, if
    /// at least one problem fits, by the worst-case inter-problem pause, so a
    /// problem never starts unless it can get its whole response window.
    pub fn plan(start_ms: u64, timing: &TimingConfig, term_count: usize) -> Self {
        let deadline_ms = start_ms + timing.budget_ms;
        let window_ms = timing.min_problem_ms + timing.sequential_overhead_ms(term_count);
        let mut min_problem_ms = window_ms;
        if timing.budget_ms > min_problem_ms + timing.max_problem_gap_ms() {
            min_problem_ms += timing.max_problem_gap_ms();
        }

        Self {
            start_ms,
            deadline_ms,
            min_problem_ms,
            window_ms,
            problem_isi_ms: timing.problem_isi_ms,
            problem_jitter_ms: timing.problem_jitter_ms,
            number_duration_ms: timing.number_duration_ms,
            number_isi_ms: timing.number_isi_ms,
            sequential: timing.sequential,
        }
    }

    pub fn remaining(&self, now_ms: u64) -> u64 {
        self.deadline_ms.saturating_sub(now_ms)
    }

    /// Whether a new problem may start at `now_ms`.
    pub fn may_start_problem(&self, now_ms: u64) -> bool {
        self.remaining(now_ms) > self.min_problem_ms
    }

    /// Whether a problem that follows another may start at `now_ms`. It
    /// must also fit the worst-case pause in front of it, which matters when
    /// the budget was too short for the pause to be added at planning time.
    pub fn may_start_after_gap(&self, now_ms: u64) -> bool {
        self.may_start_problem(now_ms)
            && self.remaining(now_ms) > self.window_ms + self.max_gap_ms()
    }

    pub fn max_gap_ms(&self) -> u64 {
        self.problem_isi_ms + self.problem_jitter_ms
    }
}

/// Scheduler phases, in the order a set moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Presenting,
    Feedback,
    Draining,
    Resting,
    Done,
}

impl Phase {
    /// Whether a set may move from `self` straight to `next`.
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Running, Presenting)
                | (Running, Draining)
                | (Presenting, Feedback)
                | (Feedback, Running)
                | (Draining, Resting)
                | (Draining, Done)
                | (Resting, Done)
        )
    }
}

/// Result of one distraction set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial: i64,
    pub start: Timestamp,
    pub end: Timestamp,
    pub problems: Vec<PresentedProblem>,
    pub presented: usize,
    pub correct: usize,
    pub rest_shown: bool,
    /// The battery ran out before the budget did.
    #[serde(default)]
    pub battery_exhausted: bool,
}

impl TrialRecord {
    /// Onset of every presented problem.
    pub fn onsets(&self) -> Vec<Timestamp> {
        self.problems.iter().map(|p| p.onset).collect()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.end.ms.saturating_sub(self.start.ms)
    }
}

/// A finished set plus the rest indicator left on screen, if any.
#[derive(Debug, Clone)]
pub struct ScheduledSet {
    pub record: TrialRecord,
    pub rest_stimulus: Option<StimulusId>,
}

/// Runs distraction sets against a fixed configuration.
#[derive(Debug, Clone)]
pub struct DistractorScheduler {
    timing: TimingConfig,
    presentation: PresentationSettings,
    feedback: FeedbackConfig,
    rest_indicator: Option<Stimulus>,
    evaluator: ResponseEvaluator,
}

impl DistractorScheduler {
    /// Fails with [`DistractError::UnsupportedResponseMode`] unless responses
    /// are true/false.
    pub fn new(config: &ExperimentConfig) -> Result<Self, DistractError> {
        let evaluator = ResponseEvaluator::from_config(&config.responses)?;
        let rest_indicator = (!config.display.rest_indicator.is_empty()).then(|| {
            Stimulus::text(config.display.rest_indicator.clone(), config.display.rest_size)
        });

        Ok(Self {
            timing: config.timing.clone(),
            presentation: PresentationSettings::from(config),
            feedback: config.feedback.clone(),
            rest_indicator,
            evaluator,
        })
    }

    /// Run one set of `battery` under the configured budget.
    pub async fn run(
        &self,
        devices: &Devices<'_>,
        battery: &Battery,
        trial: i64,
    ) -> Result<ScheduledSet> {
        let clock = devices.clock;
        let mut phase = Phase::Idle;

        let start = clock.timestamp();
        devices.log.log(start, &LogRecord::MathStart { trial })?;
        let budget = TimeBudget::plan(start.ms, &self.timing, battery.term_count());
        tracing::debug!(
            trial,
            deadline_ms = budget.deadline_ms,
            min_problem_ms = budget.min_problem_ms,
            "distraction set started"
        );
        advance(&mut phase, Phase::Running, trial);

        let mut problems: Vec<PresentedProblem> = Vec::new();
        let mut correct = 0usize;
        let mut battery_exhausted = false;

        loop {
            let now = clock.now();
            let may_start = if problems.is_empty() {
                budget.may_start_problem(now)
            } else {
                budget.may_start_after_gap(now)
            };
            if !may_start {
                break;
            }
            let Some(problem) = battery.get(problems.len()) else {
                tracing::warn!(
                    trial,
                    presented = problems.len(),
                    "insufficient problems for distraction period"
                );
                battery_exhausted = true;
                break;
            };

            if !problems.is_empty() {
                clock
                    .delay(budget.problem_isi_ms, budget.problem_jitter_ms)
                    .await;
            }

            advance(&mut phase, Phase::Presenting, trial);
            let shown = present_problem(
                devices,
                problem,
                &self.presentation,
                &self.evaluator,
                budget.deadline_ms,
                trial,
            )
            .await?;

            advance(&mut phase, Phase::Feedback, trial);
            self.give_feedback(devices, &shown.outcome);
            if shown.outcome.is_correct() {
                correct += 1;
            }
            problems.push(shown);
            advance(&mut phase, Phase::Running, trial);
        }

        advance(&mut phase, Phase::Draining, trial);
        // Keep the participant expecting another problem for one more pause
        // before the rest indicator appears.
        if self.rest_indicator.is_some() && budget.remaining(clock.now()) > budget.max_gap_ms() {
            clock
                .delay(budget.problem_isi_ms, budget.problem_jitter_ms)
                .await;
        }

        let mut rest_stimulus = None;
        if budget.remaining(clock.now()) > 0 {
            match &self.rest_indicator {
                Some(indicator) => {
                    advance(&mut phase, Phase::Resting, trial);
                    let id = devices.visual.show(indicator, Placement::Centered);
                    let onset = devices.visual.update_screen(clock);
                    clock.delay(budget.remaining(onset.ms), 0).await;
                    devices.log.log(onset, &LogRecord::Rest { trial })?;
                    rest_stimulus = Some(id);
                }
                None => clock.delay(budget.remaining(clock.now()), 0).await,
            }
        }

        advance(&mut phase, Phase::Done, trial);
        let end = clock.timestamp();
        devices.log.log(end, &LogRecord::MathEnd { trial })?;

        let record = TrialRecord {
            trial,
            start,
            end,
            presented: problems.len(),
            correct,
            problems,
            rest_shown: rest_stimulus.is_some(),
            battery_exhausted,
        };
        tracing::info!(
            trial,
            presented = record.presented,
            correct = record.correct,
            rest_shown = record.rest_shown,
            "distraction set finished"
        );

        Ok(ScheduledSet {
            record,
            rest_stimulus,
        })
    }

    fn give_feedback(&self, devices: &Devices<'_>, outcome: &Outcome) {
        let tone = match outcome {
            Outcome::Correct { .. } if self.feedback.beep_on_correct => &self.feedback.correct_tone,
            Outcome::Incorrect { .. } if self.feedback.beep_on_incorrect => {
                &self.feedback.incorrect_tone
            }
            _ => return,
        };
        devices.audio.play(tone, devices.clock);
    }
}

fn advance(phase: &mut Phase, next: Phase, trial: i64) {
    let from = *phase;
    debug_assert!(
        from.can_advance_to(next),
        "illegal scheduler transition {from:?} -> {next:?}"
    );
    tracing::trace!(trial, from = ?from, to = ?next, "scheduler phase");
    *phase = next;
}
