//! The `mathdistract simulate` command.

use std::path::PathBuf;

use anyhow::Result;

use mathdistract_core::config::{load_config_from, validate_warnings};
use mathdistract_core::generator::prepare_sets;
use mathdistract_core::session::Session;
use mathdistract_core::traits::{Clock, Devices};
use mathdistract_devices::{
    HeadlessDisplay, JitterSource, RandomResponder, TextLogFile, TokioClock, ToneRecorder,
    VirtualClock,
};

use super::summarize::print_summary;

/// Reaction times of the simulated participant.
const MIN_RT_MS: u64 = 350;
const MAX_RT_MS: u64 = 1_600;

pub async fn execute(
    config_path: Option<PathBuf>,
    output: PathBuf,
    realtime: bool,
    miss_rate: f64,
    seed: Option<u64>,
) -> Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&miss_rate),
        "miss rate must be between 0.0 and 1.0"
    );

    let mut config = load_config_from(config_path.as_deref())?;
    if seed.is_some() {
        config.math.seed = seed;
    }
    for w in validate_warnings(&config) {
        eprintln!("Warning: [{}] {}", w.section, w.message);
    }

    let batteries = prepare_sets(&config)?;
    let seed = config.math.seed;

    let clock: Box<dyn Clock> = if realtime {
        Box::new(TokioClock::new(JitterSource::seeded(seed)))
    } else {
        Box::new(VirtualClock::new(JitterSource::seeded(seed)))
    };
    let display = HeadlessDisplay::new();
    let audio = ToneRecorder::new();
    let participant = RandomResponder::new(seed, miss_rate, MIN_RT_MS, MAX_RT_MS);

    std::fs::create_dir_all(&output)?;
    let math_log = TextLogFile::create(&output.join("math.log"))?;
    let session_log = TextLogFile::create(&output.join("session.log"))?;

    let devices = Devices {
        visual: &display,
        audio: &audio,
        input: &participant,
        clock: clock.as_ref(),
        log: &math_log,
    };

    eprintln!(
        "mathdistract v{}: simulating {} sets of {}ms",
        env!("CARGO_PKG_VERSION"),
        batteries.len(),
        config.timing.budget_ms
    );

    let report = Session::new(devices, &session_log, &config)
        .run(&batteries)
        .await?;

    print_summary(&report);

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let report_path = output.join(format!("report-{timestamp}.json"));
    report.save_json(&report_path)?;
    eprintln!("Logs written to: {}", output.display());
    eprintln!("Report saved to: {}", report_path.display());
    tracing::debug!(tones = audio.played().len(), "feedback tones played");

    Ok(())
}
