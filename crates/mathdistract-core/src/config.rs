//! Experiment configuration: loading, defaults, and validation.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::DistractError;
use crate::model::{Operator, ResponseMode};
use crate::traits::Tone;

/// Top-level configuration threaded through preparation and scheduling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub math: MathConfig,
    #[serde(default)]
    pub responses: ResponseConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

/// Problem generation options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MathConfig {
    /// Number of distraction sets in a session.
    #[serde(default = "default_sets")]
    pub sets: usize,
    /// Terms per problem.
    #[serde(default = "default_terms")]
    pub terms: usize,
    /// Smallest term value (inclusive).
    #[serde(default = "default_min_term")]
    pub min_term: i64,
    /// Largest term value (inclusive).
    #[serde(default = "default_max_term")]
    pub max_term: i64,
    /// Problems generated per set; the budget decides how many are shown.
    #[serde(default = "default_max_problems")]
    pub max_problems: usize,
    /// Allow subtraction as well as addition.
    #[serde(default)]
    pub plus_and_minus: bool,
    /// Sample terms without replacement within a problem.
    #[serde(default)]
    pub unique_terms: bool,
    /// Reject a problem whose answer equals the previous problem's answer.
    #[serde(default = "default_true")]
    pub exclude_repeats: bool,
    /// Seed for reproducible batteries (None draws from the OS).
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for MathConfig {
    fn default() -> Self {
        Self {
            sets: default_sets(),
            terms: default_terms(),
            min_term: default_min_term(),
            max_term: default_max_term(),
            max_problems: default_max_problems(),
            plus_and_minus: false,
            unique_terms: false,
            exclude_repeats: true,
            seed: None,
        }
    }
}

impl MathConfig {
    /// Values terms are drawn from.
    pub fn term_range(&self) -> RangeInclusive<i64> {
        self.min_term..=self.max_term
    }

    /// Number of values in the term range; `None` when it exceeds `u64`.
    pub fn term_domain_size(&self) -> Option<u64> {
        if self.min_term > self.max_term {
            return Some(0);
        }
        self.max_term.abs_diff(self.min_term).checked_add(1)
    }

    /// Operators problems are built from.
    pub fn operators(&self) -> Vec<Operator> {
        if self.plus_and_minus {
            vec![Operator::Add, Operator::Subtract]
        } else {
            vec![Operator::Add]
        }
    }
}

fn default_sets() -> usize {
    10
}
fn default_terms() -> usize {
    3
}
fn default_min_term() -> i64 {
    1
}
fn default_max_term() -> i64 {
    9
}
fn default_max_problems() -> usize {
    100
}
fn default_true() -> bool {
    true
}

/// Response collection and proposed-answer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseConfig {
    #[serde(default)]
    pub mode: ResponseMode,
    /// Key meaning "the proposed answer is correct".
    #[serde(default = "default_true_key")]
    pub true_key: String,
    /// Key meaning "the proposed answer is wrong".
    #[serde(default = "default_false_key")]
    pub false_key: String,
    /// Offsets added to the real answer to form a proposed answer.
    #[serde(default = "default_deviations")]
    pub deviations: Vec<i64>,
    /// Probability of each offset. Omitting it from a `[responses]` table
    /// means uniform; the built-in default favours the correct answer.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            mode: ResponseMode::TrueFalse,
            true_key: default_true_key(),
            false_key: default_false_key(),
            deviations: default_deviations(),
            weights: default_weights(),
        }
    }
}

impl ResponseConfig {
    pub fn is_true_false(&self) -> bool {
        self.mode == ResponseMode::TrueFalse
    }
}

fn default_true_key() -> String {
    "N".to_string()
}
fn default_false_key() -> String {
    "M".to_string()
}
fn default_deviations() -> Vec<i64> {
    vec![0, 1, -1, 10, -10]
}
fn default_weights() -> Option<Vec<f64>> {
    Some(vec![0.5, 0.125, 0.125, 0.125, 0.125])
}

/// Timing of problems within a set and of the gaps between sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Length of one distraction period.
    #[serde(default = "default_budget")]
    pub budget_ms: u64,
    /// Minimum response window once a problem is fully displayed.
    #[serde(default = "default_min_problem")]
    pub min_problem_ms: u64,
    /// Reveal terms one at a time instead of all at once.
    #[serde(default)]
    pub sequential: bool,
    /// Time each term stays on screen in sequential mode.
    #[serde(default = "default_number_duration")]
    pub number_duration_ms: u64,
    /// Blank gap between terms in sequential mode.
    #[serde(default)]
    pub number_isi_ms: u64,
    /// Pause between problems.
    #[serde(default = "default_problem_isi")]
    pub problem_isi_ms: u64,
    /// Maximum jitter added to the pause between problems.
    #[serde(default)]
    pub problem_jitter_ms: u64,
    /// Pause between sets.
    #[serde(default = "default_set_isi")]
    pub set_isi_ms: u64,
    /// Maximum jitter added to the pause between sets.
    #[serde(default)]
    pub set_jitter_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            budget_ms: default_budget(),
            min_problem_ms: default_min_problem(),
            sequential: false,
            number_duration_ms: default_number_duration(),
            number_isi_ms: 0,
            problem_isi_ms: default_problem_isi(),
            problem_jitter_ms: 0,
            set_isi_ms: default_set_isi(),
            set_jitter_ms: 0,
        }
    }
}

impl TimingConfig {
    /// Display time for the terms and the "=" marker in sequential mode.
    pub fn sequential_overhead_ms(&self, term_count: usize) -> u64 {
        if self.sequential {
            (self.number_duration_ms + self.number_isi_ms) * (term_count as u64 + 1)
        } else {
            0
        }
    }

    /// Worst-case pause between two problems.
    pub fn max_problem_gap_ms(&self) -> u64 {
        self.problem_isi_ms + self.problem_jitter_ms
    }
}

fn default_budget() -> u64 {
    10_000
}
fn default_min_problem() -> u64 {
    2_000
}
fn default_number_duration() -> u64 {
    800
}
fn default_problem_isi() -> u64 {
    500
}
fn default_set_isi() -> u64 {
    2_000
}

/// Stimulus text options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Problem text height as a fraction of the screen.
    #[serde(default = "default_text_size")]
    pub text_size: f32,
    /// Text shown while resting at the end of a set; empty disables it.
    #[serde(default = "default_rest_indicator")]
    pub rest_indicator: String,
    #[serde(default = "default_rest_size")]
    pub rest_size: f32,
    /// Text shown between sets.
    #[serde(default = "default_set_marker")]
    pub set_marker: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            text_size: default_text_size(),
            rest_indicator: default_rest_indicator(),
            rest_size: default_rest_size(),
            set_marker: default_set_marker(),
        }
    }
}

fn default_text_size() -> f32 {
    0.1
}
fn default_rest_indicator() -> String {
    "+".to_string()
}
fn default_rest_size() -> f32 {
    0.08
}
fn default_set_marker() -> String {
    "*".to_string()
}

/// Feedback tones after a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default)]
    pub beep_on_correct: bool,
    #[serde(default = "default_true")]
    pub beep_on_incorrect: bool,
    #[serde(default = "default_correct_tone")]
    pub correct_tone: Tone,
    #[serde(default = "default_incorrect_tone")]
    pub incorrect_tone: Tone,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            beep_on_correct: false,
            beep_on_incorrect: true,
            correct_tone: default_correct_tone(),
            incorrect_tone: default_incorrect_tone(),
        }
    }
}

fn default_correct_tone() -> Tone {
    Tone {
        frequency_hz: 400,
        duration_ms: 500,
        ramp_ms: 50,
    }
}
fn default_incorrect_tone() -> Tone {
    Tone {
        frequency_hz: 200,
        duration_ms: 500,
        ramp_ms: 50,
    }
}

/// Tolerance for the deviation weights summing to one.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Check the configuration for errors that make preparation impossible.
pub fn validate_config(config: &ExperimentConfig) -> Result<(), DistractError> {
    let math = &config.math;
    if math.terms == 0 {
        return Err(DistractError::Configuration(
            "terms must be at least 1".into(),
        ));
    }
    if math.min_term > math.max_term {
        return Err(DistractError::Configuration(format!(
            "min_term ({}) is greater than max_term ({})",
            math.min_term, math.max_term
        )));
    }
    if math.max_problems == 0 {
        return Err(DistractError::Configuration(
            "max_problems must be at least 1".into(),
        ));
    }
    let domain_size = math.term_domain_size().ok_or_else(|| {
        DistractError::Configuration(format!(
            "term range {}..={} is too wide",
            math.min_term, math.max_term
        ))
    })?;
    if math.unique_terms && math.terms as u64 > domain_size {
        return Err(DistractError::Configuration(format!(
            "unique_terms needs {} distinct values but only {} are in range",
            math.terms, domain_size
        )));
    }

    let responses = &config.responses;
    if responses.is_true_false() {
        if responses.true_key == responses.false_key {
            return Err(DistractError::Configuration(format!(
                "true_key and false_key are both '{}'",
                responses.true_key
            )));
        }
        validate_deviations(&responses.deviations, responses.weights.as_deref())?;
    }

    let fits = answer_bound(config).is_some_and(|bound| bound <= i64::MAX as u64);
    if !fits {
        return Err(DistractError::Configuration(format!(
            "{} terms from {}..={} can overflow a 64-bit answer",
            math.terms, math.min_term, math.max_term
        )));
    }

    Ok(())
}

/// Largest magnitude a running sum or proposed answer can reach.
fn answer_bound(config: &ExperimentConfig) -> Option<u64> {
    let math = &config.math;
    let magnitude = math.min_term.unsigned_abs().max(math.max_term.unsigned_abs());
    let deviation = if config.responses.is_true_false() {
        config
            .responses
            .deviations
            .iter()
            .map(|d| d.unsigned_abs())
            .max()
            .unwrap_or(0)
    } else {
        0
    };
    u64::try_from(math.terms)
        .ok()?
        .checked_mul(magnitude)?
        .checked_add(deviation)
}

/// Check deviation values against their weights.
pub fn validate_deviations(values: &[i64], weights: Option<&[f64]>) -> Result<(), DistractError> {
    if values.is_empty() {
        return Err(DistractError::Configuration(
            "deviations must not be empty".into(),
        ));
    }
    let Some(weights) = weights else {
        return Ok(());
    };
    if weights.len() != values.len() {
        return Err(DistractError::Configuration(format!(
            "deviations and weights must have the same length ({} vs {})",
            values.len(),
            weights.len()
        )));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(DistractError::Configuration(
            "weights must be finite and non-negative".into(),
        ));
    }
    let sum: f64 = weights.iter().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(DistractError::Configuration(format!(
            "weights must sum to 1.0 (got {sum})"
        )));
    }
    Ok(())
}

/// A non-fatal configuration issue.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Config section the warning is about.
    pub section: &'static str,
    pub message: String,
}

/// Flag settings that are legal but probably not what the experimenter
/// intended.
pub fn validate_warnings(config: &ExperimentConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let timing = &config.timing;

    if !config.responses.is_true_false() {
        warnings.push(ValidationWarning {
            section: "responses",
            message: format!(
                "response mode '{}' cannot be scored; running a set will fail",
                config.responses.mode
            ),
        });
    }

    let window = timing.min_problem_ms + timing.sequential_overhead_ms(config.math.terms);
    if timing.budget_ms <= window {
        warnings.push(ValidationWarning {
            section: "timing",
            message: format!(
                "budget_ms ({}) does not exceed one problem window ({window}ms); no problems will be shown",
                timing.budget_ms
            ),
        });
    } else {
        // Fastest possible pace: instant responses and no jitter.
        let per_problem = (timing.problem_isi_ms + timing.sequential_overhead_ms(config.math.terms)).max(1);
        let fit = 1 + (timing.budget_ms - window) / per_problem;
        if (config.math.max_problems as u64) < fit {
            warnings.push(ValidationWarning {
                section: "math",
                message: format!(
                    "max_problems ({}) may run out before the budget; fast responders could see up to {fit} problems",
                    config.math.max_problems
                ),
            });
        }
    }

    if !config.feedback.beep_on_correct && !config.feedback.beep_on_incorrect {
        warnings.push(ValidationWarning {
            section: "feedback",
            message: "all feedback tones are disabled".into(),
        });
    }

    warnings
}

/// Parse configuration from a TOML string.
pub fn parse_config_str(content: &str, source: &Path) -> Result<ExperimentConfig> {
    toml::from_str::<ExperimentConfig>(content)
        .with_context(|| format!("failed to parse config: {}", source.display()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mathdistract.toml` in the current directory
/// 2. `~/.config/mathdistract/config.toml`
///
/// `MATHDISTRACT_SEED` overrides `math.seed`.
pub fn load_config() -> Result<ExperimentConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExperimentConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mathdistract.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            parse_config_str(&content, &path)?
        }
        None => ExperimentConfig::default(),
    };

    if let Ok(seed) = std::env::var("MATHDISTRACT_SEED") {
        let seed = seed
            .trim()
            .parse::<u64>()
            .with_context(|| format!("MATHDISTRACT_SEED is not a number: {seed}"))?;
        config.math.seed = Some(seed);
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mathdistract"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ExperimentConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.math.term_range(), 1..=9);
        assert_eq!(config.math.term_domain_size(), Some(9));
        assert_eq!(config.math.operators(), vec![Operator::Add]);
        assert_eq!(config.responses.mode, ResponseMode::TrueFalse);
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[math]
sets = 4
terms = 2
plus_and_minus = true

[responses]
deviations = [0, 2, -2]
weights = [0.5, 0.25, 0.25]

[timing]
budget_ms = 8500
sequential = true
number_duration_ms = 500
"#;
        let config = parse_config_str(toml_str, Path::new("inline.toml")).unwrap();
        assert_eq!(config.math.sets, 4);
        assert_eq!(config.math.max_problems, 100);
        assert_eq!(config.math.operators().len(), 2);
        assert_eq!(config.timing.budget_ms, 8500);
        assert_eq!(config.timing.problem_isi_ms, 500);
        assert_eq!(config.timing.sequential_overhead_ms(2), 1500);
        assert_eq!(config.display.rest_indicator, "+");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn parse_response_mode() {
        let config = parse_config_str(
            "[responses]\nmode = \"typed\"\n",
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(config.responses.mode, ResponseMode::Typed);
        let warnings = validate_warnings(&config);
        assert!(warnings.iter().any(|w| w.section == "responses"));
    }

    #[test]
    fn weight_length_mismatch_is_rejected() {
        let err = validate_deviations(&[0, 1], Some(&[1.0])).unwrap_err();
        assert!(matches!(err, DistractError::Configuration(_)));
        assert!(err.to_string().contains("same length"));
    }

    #[test]
    fn weights_must_sum_to_one() {
        let err = validate_deviations(&[0, 1], Some(&[0.5, 0.4])).unwrap_err();
        assert!(err.to_string().contains("sum to 1.0"));
        assert!(validate_deviations(&[0, 1], None).is_ok());
    }

    #[test]
    fn unique_terms_need_enough_values() {
        let mut config = ExperimentConfig::default();
        config.math.unique_terms = true;
        config.math.terms = 4;
        config.math.min_term = 1;
        config.math.max_term = 3;
        assert!(matches!(
            validate_config(&config),
            Err(DistractError::Configuration(_))
        ));
    }

    #[test]
    fn full_i64_term_range_is_rejected() {
        let mut config = ExperimentConfig::default();
        config.math.min_term = i64::MIN;
        config.math.max_term = i64::MAX;
        assert_eq!(config.math.term_domain_size(), None);
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, DistractError::Configuration(_)));
        assert!(err.to_string().contains("too wide"));
    }

    #[test]
    fn overflowing_sums_are_rejected() {
        let mut config = ExperimentConfig::default();
        config.math.min_term = i64::MAX - 1;
        config.math.max_term = i64::MAX;
        config.math.terms = 2;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("overflow"));

        // A single term fits, but a deviation on top of it does not.
        config.math.terms = 1;
        assert!(validate_config(&config).is_err());
        config.responses.mode = ResponseMode::Typed;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn deviation_counts_towards_the_answer_bound() {
        let mut config = ExperimentConfig::default();
        config.math.min_term = 0;
        config.math.max_term = i64::MAX / 3;
        assert!(validate_config(&config).is_err());

        config.responses.deviations = vec![0, 1];
        config.responses.weights = None;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn wide_term_ranges_are_accepted() {
        let mut config = ExperimentConfig::default();
        config.math.max_term = 10_000_000_000;
        config.math.unique_terms = true;
        assert_eq!(config.math.term_domain_size(), Some(10_000_000_000));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn duplicate_response_keys_are_rejected() {
        let mut config = ExperimentConfig::default();
        config.responses.false_key = config.responses.true_key.clone();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn short_budget_warns() {
        let mut config = ExperimentConfig::default();
        config.timing.budget_ms = 1_000;
        let warnings = validate_warnings(&config);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("no problems will be shown")));
    }

    #[test]
    fn small_battery_warns() {
        let mut config = ExperimentConfig::default();
        config.math.max_problems = 2;
        let warnings = validate_warnings(&config);
        assert!(warnings.iter().any(|w| w.section == "math"));
    }

    #[test]
    fn missing_explicit_config_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/mathdistract.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("experiment.toml");
        std::fs::write(&path, "[math]\nmax_problems = 12\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.math.max_problems, 12);
    }
}
