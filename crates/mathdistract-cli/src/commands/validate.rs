//! The `mathdistract validate` command.

use std::path::PathBuf;

use anyhow::Result;

use mathdistract_core::config::{load_config_from, validate_config, validate_warnings};

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    validate_config(&config)?;

    println!(
        "Config: {} sets x up to {} problems, {} terms in [{}, {}], {}ms per set",
        config.math.sets,
        config.math.max_problems,
        config.math.terms,
        config.math.min_term,
        config.math.max_term,
        config.timing.budget_ms
    );

    let warnings = validate_warnings(&config);
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.section, w.message);
    }

    if warnings.is_empty() {
        println!("Config valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
