//! Experiment log records.
//!
//! Records are tab separated with a fixed number of fields per kind so that
//! analysis scripts can read every line with the same column layout. Field
//! order is part of the file format.

use std::fmt;

use crate::model::RtPair;

/// Scored part of a `PROB` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredResponse {
    pub correct: bool,
    pub rt: RtPair,
}

/// One line of the math or session log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRecord {
    /// Onset of one term (or the "=" marker) in sequential mode.
    Term { trial: i64, label: String },
    /// A presented problem; `response` is `None` when the participant did
    /// not answer in time.
    Prob {
        trial: i64,
        problem: String,
        proposed: String,
        response: Option<ScoredResponse>,
    },
    /// Onset of the rest indicator.
    Rest { trial: i64 },
    MathStart { trial: i64 },
    MathEnd { trial: i64 },
    /// Session summary of one set.
    Distractor {
        set: usize,
        presented: usize,
        correct: usize,
    },
    /// Onset of the marker shown between sets.
    Fix { set: usize },
    /// End of the whole session, after the last set.
    SessEnd,
}

impl LogRecord {
    /// Record kind as it appears in the first column.
    pub fn kind(&self) -> &'static str {
        match self {
            LogRecord::Term { .. } => "TERM",
            LogRecord::Prob { .. } => "PROB",
            LogRecord::Rest { .. } => "REST",
            LogRecord::MathStart { .. } => "MATH START",
            LogRecord::MathEnd { .. } => "MATH END",
            LogRecord::Distractor { .. } => "DISTRACTOR",
            LogRecord::Fix { .. } => "FIX",
            LogRecord::SessEnd => "SESS_END",
        }
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            LogRecord::Term { trial, label } => write!(f, "{kind}\t{trial}\t{label}\t\t\t\t"),
            LogRecord::Prob {
                trial,
                problem,
                proposed,
                response: Some(scored),
            } => write!(
                f,
                "{kind}\t{trial}\t'{problem}'\t'{proposed}'\t{}\t{}\t{}",
                u8::from(scored.correct),
                scored.rt.delta_ms,
                scored.rt.max_latency_ms
            ),
            LogRecord::Prob {
                trial,
                problem,
                proposed,
                response: None,
            } => write!(f, "{kind}\t{trial}\t'{problem}'\t'{proposed}'\t\t\t"),
            LogRecord::Rest { trial }
            | LogRecord::MathStart { trial }
            | LogRecord::MathEnd { trial } => write!(f, "{kind}\t{trial}\t\t\t\t\t"),
            LogRecord::Distractor {
                set,
                presented,
                correct,
            } => write!(f, "{kind}\t{set}\t{presented}\t{correct}"),
            LogRecord::Fix { set } => write!(f, "{kind}\t{set}\t\t"),
            LogRecord::SessEnd => write!(f, "{kind}\t\t\t"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_records_have_seven_columns() {
        let records = [
            LogRecord::Term {
                trial: 2,
                label: "7".into(),
            },
            LogRecord::Prob {
                trial: 2,
                problem: "3 + 5".into(),
                proposed: "8".into(),
                response: Some(ScoredResponse {
                    correct: true,
                    rt: RtPair {
                        delta_ms: 812,
                        max_latency_ms: 3,
                    },
                }),
            },
            LogRecord::Prob {
                trial: 2,
                problem: "3 + 5".into(),
                proposed: "9".into(),
                response: None,
            },
            LogRecord::Rest { trial: 2 },
            LogRecord::MathStart { trial: 2 },
            LogRecord::MathEnd { trial: 2 },
        ];
        for record in &records {
            assert_eq!(record.to_string().split('\t').count(), 7, "{record}");
        }
    }

    #[test]
    fn prob_fields_in_order() {
        let record = LogRecord::Prob {
            trial: -1,
            problem: "4 + 1 + 2".into(),
            proposed: "17".into(),
            response: Some(ScoredResponse {
                correct: false,
                rt: RtPair {
                    delta_ms: 1204,
                    max_latency_ms: 0,
                },
            }),
        };
        assert_eq!(record.to_string(), "PROB\t-1\t'4 + 1 + 2'\t'17'\t0\t1204\t0");
    }

    #[test]
    fn session_records() {
        assert_eq!(
            LogRecord::Distractor {
                set: 3,
                presented: 6,
                correct: 5
            }
            .to_string(),
            "DISTRACTOR\t3\t6\t5"
        );
        assert_eq!(LogRecord::Fix { set: 3 }.to_string(), "FIX\t3\t\t");
        assert_eq!(LogRecord::SessEnd.to_string(), "SESS_END\t\t\t");
        assert_eq!(LogRecord::MathEnd { trial: 0 }.kind(), "MATH END");
    }
}
