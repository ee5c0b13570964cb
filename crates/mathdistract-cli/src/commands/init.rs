//! The `mathdistract init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("mathdistract.toml");
    if path.exists() {
        println!("mathdistract.toml already exists, skipping.");
    } else {
        std::fs::write(path, SAMPLE_CONFIG)?;
        println!("Created mathdistract.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit mathdistract.toml for your experiment");
    println!("  2. Run: mathdistract validate");
    println!("  3. Run: mathdistract simulate --seed 1");

    Ok(())
}

pub const SAMPLE_CONFIG: &str = r#"# mathdistract configuration

[math]
sets = 10
terms = 3
min_term = 1
max_term = 9
max_problems = 100
plus_and_minus = false
unique_terms = false
exclude_repeats = true
# seed = 42

[responses]
mode = "true-false"
true_key = "N"
false_key = "M"
deviations = [0, 1, -1, 10, -10]
weights = [0.5, 0.125, 0.125, 0.125, 0.125]

[timing]
budget_ms = 10000
min_problem_ms = 2000
sequential = false
number_duration_ms = 800
number_isi_ms = 0
problem_isi_ms = 500
problem_jitter_ms = 0
set_isi_ms = 2000
set_jitter_ms = 0

[display]
text_size = 0.1
rest_indicator = "+"
rest_size = 0.08
set_marker = "*"

[feedback]
beep_on_correct = false
beep_on_incorrect = true
correct_tone = { frequency_hz = 400, duration_ms = 500, ramp_ms = 50 }
incorrect_tone = { frequency_hz = 200, duration_ms = 500, ramp_ms = 50 }
"#;
