//! Core data model types for mathdistract.
//!
//! Problems, batteries, timestamps, and the response modes a distraction
//! period can be configured with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An arithmetic operator between two adjacent terms.
///
/// The set is closed: the evaluator folds over these variants and never
/// interprets text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
}

impl Operator {
    /// The symbol shown to participants.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
        }
    }

    /// Combine the running value with the next term; `None` on overflow.
    pub fn apply(self, lhs: i64, rhs: i64) -> Option<i64> {
        match self {
            Operator::Add => lhs.checked_add(rhs),
            Operator::Subtract => lhs.checked_sub(rhs),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "+" => Ok(Operator::Add),
            "-" | "−" => Ok(Operator::Subtract),
            other => Err(format!("unknown operator: {other}")),
        }
    }
}

/// A single arithmetic problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    /// Left-hand-side terms, in display order.
    pub terms: Vec<i64>,
    /// `ops[i]` sits between `terms[i]` and `terms[i + 1]`.
    pub ops: Vec<Operator>,
    /// Left-to-right evaluation of `terms` and `ops`.
    pub answer: i64,
    /// Answer shown to the participant in true/false mode.
    #[serde(default)]
    pub proposed: Option<i64>,
}

impl Problem {
    /// Whether the proposed answer matches the real one (`None` outside
    /// true/false mode).
    pub fn is_proposal_correct(&self) -> Option<bool> {
        self.proposed.map(|p| p == self.answer)
    }

    /// Left-hand side as shown to participants, e.g. `"3 + 5 + 2"`.
    pub fn lhs(&self) -> String {
        let mut text = String::new();
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                text.push(' ');
                text.push(self.ops[i - 1].symbol());
                text.push(' ');
            }
            text.push_str(&term.to_string());
        }
        text
    }

    /// Right-hand side text: the proposed answer, or empty.
    pub fn rhs(&self) -> String {
        self.proposed.map(|p| p.to_string()).unwrap_or_default()
    }
}

/// The ordered problems available to one distraction set.
///
/// Built once by the generator; the scheduler only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Battery {
    problems: Vec<Problem>,
}

impl Battery {
    pub fn new(problems: Vec<Problem>) -> Self {
        Self { problems }
    }

    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    pub fn get(&self, index: usize) -> Option<&Problem> {
        self.problems.get(index)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Number of terms in the first problem (all problems share it).
    pub fn term_count(&self) -> usize {
        self.problems.first().map(|p| p.terms.len()).unwrap_or(0)
    }
}

/// A clock reading paired with the worst-case latency of that reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timestamp {
    pub ms: u64,
    #[serde(default)]
    pub max_latency_ms: u64,
}

impl Timestamp {
    pub fn at(ms: u64) -> Self {
        Self {
            ms,
            max_latency_ms: 0,
        }
    }
}

/// Reaction time as `(delta, max latency)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtPair {
    pub delta_ms: i64,
    pub max_latency_ms: u64,
}

impl RtPair {
    /// Reaction time from stimulus onset to response. Latencies of both
    /// readings add up.
    pub fn between(onset: Timestamp, response: Timestamp) -> Self {
        Self {
            delta_ms: response.ms as i64 - onset.ms as i64,
            max_latency_ms: response.max_latency_ms + onset.max_latency_ms,
        }
    }
}

/// How participants answer a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseMode {
    /// Judge whether the proposed answer is correct.
    #[default]
    TrueFalse,
    /// Type the answer on a keypad.
    Typed,
    /// Speak the answer.
    Vocal,
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseMode::TrueFalse => write!(f, "true-false"),
            ResponseMode::Typed => write!(f, "typed"),
            ResponseMode::Vocal => write!(f, "vocal"),
        }
    }
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "true-false" | "tf" | "truefalse" => Ok(ResponseMode::TrueFalse),
            "typed" | "keypad" => Ok(ResponseMode::Typed),
            "vocal" | "voice" => Ok(ResponseMode::Vocal),
            other => Err(format!("unknown response mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(terms: &[i64], ops: &[Operator], answer: i64, proposed: Option<i64>) -> Problem {
        Problem {
            terms: terms.to_vec(),
            ops: ops.to_vec(),
            answer,
            proposed,
        }
    }

    #[test]
    fn operator_symbols_and_parse() {
        assert_eq!(Operator::Add.to_string(), "+");
        assert_eq!(Operator::Subtract.to_string(), "-");
        assert_eq!("+".parse::<Operator>().unwrap(), Operator::Add);
        assert_eq!("-".parse::<Operator>().unwrap(), Operator::Subtract);
        assert!("*".parse::<Operator>().is_err());
        assert_eq!(Operator::Subtract.apply(3, 5), Some(-2));
        assert_eq!(Operator::Add.apply(i64::MAX, 1), None);
        assert_eq!(Operator::Subtract.apply(i64::MIN, 1), None);
    }

    #[test]
    fn lhs_and_rhs_text() {
        let p = problem(&[3, 5, 2], &[Operator::Add, Operator::Subtract], 6, Some(7));
        assert_eq!(p.lhs(), "3 + 5 - 2");
        assert_eq!(p.rhs(), "7");
        assert_eq!(p.is_proposal_correct(), Some(false));

        let q = problem(&[4], &[], 4, None);
        assert_eq!(q.lhs(), "4");
        assert_eq!(q.rhs(), "");
        assert_eq!(q.is_proposal_correct(), None);
    }

    #[test]
    fn rt_pair_adds_latencies() {
        let onset = Timestamp {
            ms: 1_000,
            max_latency_ms: 2,
        };
        let response = Timestamp {
            ms: 1_734,
            max_latency_ms: 1,
        };
        let rt = RtPair::between(onset, response);
        assert_eq!(rt.delta_ms, 734);
        assert_eq!(rt.max_latency_ms, 3);
    }

    #[test]
    fn response_mode_display_and_parse() {
        assert_eq!(ResponseMode::TrueFalse.to_string(), "true-false");
        assert_eq!("TF".parse::<ResponseMode>().unwrap(), ResponseMode::TrueFalse);
        assert_eq!("keypad".parse::<ResponseMode>().unwrap(), ResponseMode::Typed);
        assert!("mouse".parse::<ResponseMode>().is_err());
    }

    #[test]
    fn battery_serde_roundtrip() {
        let battery = Battery::new(vec![problem(&[1, 2], &[Operator::Add], 3, Some(4))]);
        let json = serde_json::to_string(&battery).unwrap();
        assert!(json.contains("\"+\""));
        let back: Battery = serde_json::from_str(&json).unwrap();
        assert_eq!(back, battery);
        assert_eq!(back.term_count(), 2);
    }
}
