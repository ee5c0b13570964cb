//! Random arithmetic problem generation.
//!
//! Builds batteries of problems with constrained term and operator sampling,
//! optional exclusion of adjacent repeated answers, and weighted deviations
//! for the proposed answers of true/false trials. Every retry loop is capped
//! and reports [`DistractError::GenerationFailure`] when the cap is hit.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{validate_config, validate_deviations, ExperimentConfig, MathConfig};
use crate::error::DistractError;
use crate::model::{Battery, Operator, Problem};

/// Candidate problems tried per battery slot before giving up.
pub const MAX_REGENERATION_ATTEMPTS: u32 = 1000;

/// Proposed answers tried per problem before giving up.
pub const MAX_PROPOSAL_ATTEMPTS: u32 = 1000;

/// Create the generator RNG: seeded for reproducible runs, otherwise from
/// OS entropy.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Sample the terms and operators of one problem.
///
/// Terms come from `term_range`, without replacement when `unique` is set.
/// Operators are drawn independently with replacement.
pub fn generate_problem(
    rng: &mut impl Rng,
    term_count: usize,
    term_range: &RangeInclusive<i64>,
    op_domain: &[Operator],
    unique: bool,
) -> Result<(Vec<i64>, Vec<Operator>), DistractError> {
    if term_range.is_empty() {
        return Err(DistractError::Configuration(
            "term domain is empty".into(),
        ));
    }
    if term_count > 1 && op_domain.is_empty() {
        return Err(DistractError::Configuration(
            "operator set is empty".into(),
        ));
    }

    let terms = if unique {
        let size = domain_len(term_range)?;
        if term_count > size {
            return Err(DistractError::Configuration(format!(
                "cannot draw {term_count} unique terms from {size} values"
            )));
        }
        let min = *term_range.start();
        rand::seq::index::sample(rng, size, term_count)
            .iter()
            .map(|i| {
                min.checked_add_unsigned(i as u64).ok_or_else(|| {
                    DistractError::Configuration(format!("term offset {i} is out of range"))
                })
            })
            .collect::<Result<_, _>>()?
    } else {
        (0..term_count)
            .map(|_| rng.random_range(term_range.clone()))
            .collect()
    };

    let ops = (0..term_count.saturating_sub(1))
        .map(|_| op_domain[rng.random_range(0..op_domain.len())])
        .collect();

    Ok((terms, ops))
}

/// Number of values in a non-empty range, as an index bound.
fn domain_len(range: &RangeInclusive<i64>) -> Result<usize, DistractError> {
    range
        .end()
        .abs_diff(*range.start())
        .checked_add(1)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| {
            DistractError::Configuration(format!(
                "term range {}..={} is too wide",
                range.start(),
                range.end()
            ))
        })
}

/// Evaluate a problem strictly left to right and build its display text.
pub fn evaluate(terms: &[i64], ops: &[Operator]) -> Result<(i64, String), DistractError> {
    let Some((&first, rest)) = terms.split_first() else {
        return Err(DistractError::InvalidProblem("problem has no terms".into()));
    };
    if ops.len() != rest.len() {
        return Err(DistractError::InvalidProblem(format!(
            "{} terms need {} operators, got {}",
            terms.len(),
            rest.len(),
            ops.len()
        )));
    }

    let mut answer = first;
    let mut display = first.to_string();
    for (op, &term) in ops.iter().zip(rest) {
        answer = op.apply(answer, term).ok_or_else(|| {
            DistractError::InvalidProblem(format!("{display} {op} {term} overflows"))
        })?;
        display.push(' ');
        display.push(op.symbol());
        display.push(' ');
        display.push_str(&term.to_string());
    }

    Ok((answer, display))
}

/// Parameters for one battery.
#[derive(Debug, Clone)]
pub struct BatterySpec {
    pub count: usize,
    pub term_count: usize,
    pub term_range: RangeInclusive<i64>,
    pub operators: Vec<Operator>,
    pub unique_terms: bool,
    pub exclude_repeats: bool,
}

impl From<&MathConfig> for BatterySpec {
    fn from(math: &MathConfig) -> Self {
        Self {
            count: math.max_problems,
            term_count: math.terms,
            term_range: math.term_range(),
            operators: math.operators(),
            unique_terms: math.unique_terms,
            exclude_repeats: math.exclude_repeats,
        }
    }
}

/// Generate a battery without proposed answers.
///
/// With `exclude_repeats`, a problem never has the same answer as the one
/// right before it. Repeats further apart are allowed.
pub fn generate_battery(rng: &mut impl Rng, spec: &BatterySpec) -> Result<Battery, DistractError> {
    generate_problems(rng, spec).map(Battery::new)
}

fn generate_problems(rng: &mut impl Rng, spec: &BatterySpec) -> Result<Vec<Problem>, DistractError> {
    let mut problems = Vec::with_capacity(spec.count);
    let mut prev_answer: Option<i64> = None;

    for slot in 0..spec.count {
        let mut accepted = None;
        for _ in 0..MAX_REGENERATION_ATTEMPTS {
            let (terms, ops) = generate_problem(
                rng,
                spec.term_count,
                &spec.term_range,
                &spec.operators,
                spec.unique_terms,
            )?;
            let (answer, _) = evaluate(&terms, &ops)?;
            if spec.exclude_repeats && prev_answer == Some(answer) {
                continue;
            }
            accepted = Some(Problem {
                terms,
                ops,
                answer,
                proposed: None,
            });
            break;
        }

        let Some(problem) = accepted else {
            return Err(DistractError::GenerationFailure {
                attempts: MAX_REGENERATION_ATTEMPTS,
                reason: format!(
                    "every candidate for problem {slot} repeated the previous answer {}",
                    prev_answer.unwrap_or_default()
                ),
            });
        };
        prev_answer = Some(problem.answer);
        problems.push(problem);
    }

    Ok(problems)
}

/// Deviation values with their cumulative selection probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviationTable {
    values: Vec<i64>,
    cumulative: Vec<f64>,
}

impl DeviationTable {
    /// Build a table; `None` weights select every value equally often.
    pub fn new(values: &[i64], weights: Option<&[f64]>) -> Result<Self, DistractError> {
        validate_deviations(values, weights)?;
        let uniform;
        let weights = match weights {
            Some(w) => w,
            None => {
                uniform = vec![1.0 / values.len() as f64; values.len()];
                &uniform
            }
        };

        let cumulative = weights
            .iter()
            .scan(0.0, |acc, w| {
                *acc += w;
                Some(*acc)
            })
            .collect();

        Ok(Self {
            values: values.to_vec(),
            cumulative,
        })
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Inverse-CDF lookup for a uniform draw in `[0, 1)`.
    pub fn index_for(&self, u: f64) -> usize {
        self.cumulative
            .iter()
            .position(|&c| c > u)
            .unwrap_or(self.values.len() - 1)
    }

    fn draw(&self, rng: &mut impl Rng) -> i64 {
        self.values[self.index_for(rng.random::<f64>())]
    }
}

/// Perturb `answer` by a weighted random deviation.
///
/// With `positive_only`, results `<= 0` are rejected and redrawn up to
/// [`MAX_PROPOSAL_ATTEMPTS`] times.
pub fn generate_proposed(
    rng: &mut impl Rng,
    answer: i64,
    deviations: &DeviationTable,
    positive_only: bool,
) -> Result<i64, DistractError> {
    for _ in 0..MAX_PROPOSAL_ATTEMPTS {
        let deviation = deviations.draw(rng);
        let proposed = answer.checked_add(deviation).ok_or_else(|| {
            DistractError::InvalidProblem(format!("{answer} + {deviation} overflows"))
        })?;
        if positive_only && proposed <= 0 {
            continue;
        }
        return Ok(proposed);
    }

    Err(DistractError::GenerationFailure {
        attempts: MAX_PROPOSAL_ATTEMPTS,
        reason: format!("no positive proposed answer for {answer}"),
    })
}

/// Generate one set's battery from the experiment configuration, attaching
/// proposed answers in true/false mode.
///
/// Proposed answers must be positive when only addition is used.
pub fn prepare_set(rng: &mut impl Rng, config: &ExperimentConfig) -> Result<Battery, DistractError> {
    let spec = BatterySpec::from(&config.math);
    let mut problems = generate_problems(rng, &spec)?;

    if config.responses.is_true_false() {
        let table = DeviationTable::new(
            &config.responses.deviations,
            config.responses.weights.as_deref(),
        )?;
        let positive_only = !config.math.plus_and_minus;
        for problem in &mut problems {
            problem.proposed = Some(generate_proposed(rng, problem.answer, &table, positive_only)?);
        }
    }

    Ok(Battery::new(problems))
}

/// Validate the configuration and generate every set's battery up front.
pub fn prepare_sets(config: &ExperimentConfig) -> Result<Vec<Battery>, DistractError> {
    validate_config(config)?;
    let mut rng = seeded_rng(config.math.seed);
    let batteries = (0..config.math.sets)
        .map(|_| prepare_set(&mut rng, config))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(
        sets = batteries.len(),
        problems_per_set = config.math.max_problems,
        "prepared batteries"
    );
    Ok(batteries)
}
