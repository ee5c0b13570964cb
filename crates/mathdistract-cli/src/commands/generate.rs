//! The `mathdistract generate` command.

use std::path::PathBuf;

use anyhow::Result;

use mathdistract_core::config::load_config_from;
use mathdistract_core::generator::prepare_sets;
use mathdistract_core::model::Battery;

pub fn execute(config_path: Option<PathBuf>, set: Option<usize>, json: bool) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let batteries = prepare_sets(&config)?;

    let selected: Vec<(usize, &Battery)> = match set {
        Some(index) => {
            let battery = batteries.get(index).ok_or_else(|| {
                anyhow::anyhow!("set {index} out of range ({} sets)", batteries.len())
            })?;
            vec![(index, battery)]
        }
        None => batteries.iter().enumerate().collect(),
    };

    if json {
        let sets: Vec<&Battery> = selected.iter().map(|(_, b)| *b).collect();
        println!("{}", serde_json::to_string_pretty(&sets)?);
        return Ok(());
    }

    for (index, battery) in selected {
        println!("Set {index} ({} problems)", battery.len());
        for problem in battery.problems() {
            match problem.proposed {
                Some(proposed) => {
                    let mark = if proposed == problem.answer { "true" } else { "false" };
                    println!(
                        "  {} = {}  ({mark}, answer {})",
                        problem.lhs(),
                        proposed,
                        problem.answer
                    );
                }
                None => println!("  {} = {}", problem.lhs(), problem.answer),
            }
        }
    }

    Ok(())
}
