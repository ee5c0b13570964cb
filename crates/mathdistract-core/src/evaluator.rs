//! Response scoring for true/false problems.

use serde::{Deserialize, Serialize};

use crate::config::ResponseConfig;
use crate::error::DistractError;
use crate::model::{Problem, ResponseMode, RtPair, Timestamp};
use crate::traits::Capture;

/// How a presented problem ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Correct { rt: RtPair },
    Incorrect { rt: RtPair },
    /// The deadline passed without a response.
    NoResponse,
}

impl Outcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Correct { .. })
    }

    pub fn rt(&self) -> Option<RtPair> {
        match self {
            Outcome::Correct { rt } | Outcome::Incorrect { rt } => Some(*rt),
            Outcome::NoResponse => None,
        }
    }
}

/// Scores captured key presses against the proposed answer.
#[derive(Debug, Clone)]
pub struct ResponseEvaluator {
    true_key: String,
    false_key: String,
}

impl ResponseEvaluator {
    /// Only true/false responses can be scored; any other mode fails here,
    /// before a set starts.
    pub fn new(mode: ResponseMode, true_key: &str, false_key: &str) -> Result<Self, DistractError> {
        match mode {
            ResponseMode::TrueFalse => Ok(Self {
                true_key: true_key.to_string(),
                false_key: false_key.to_string(),
            }),
            other => Err(DistractError::UnsupportedResponseMode(other.to_string())),
        }
    }

    pub fn from_config(config: &ResponseConfig) -> Result<Self, DistractError> {
        Self::new(config.mode, &config.true_key, &config.false_key)
    }

    /// Keys accepted as a response.
    pub fn choices(&self) -> Vec<String> {
        vec![self.true_key.clone(), self.false_key.clone()]
    }

    /// Key a participant should press for this problem.
    pub fn expected_key(&self, problem: &Problem) -> &str {
        if problem.is_proposal_correct() == Some(true) {
            &self.true_key
        } else {
            &self.false_key
        }
    }

    pub fn evaluate(&self, problem: &Problem, capture: &Capture, onset: Timestamp) -> Outcome {
        match capture {
            Capture::Timeout => Outcome::NoResponse,
            Capture::Response(press) => {
                let rt = RtPair::between(onset, press.at);
                if press.key == self.expected_key(problem) {
                    Outcome::Correct { rt }
                } else {
                    Outcome::Incorrect { rt }
                }
            }
        }
    }
}
