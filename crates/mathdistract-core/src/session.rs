//! Running a whole session: every set back to back with a marker between
//! them.

use anyhow::{Context, Result};

use crate::config::ExperimentConfig;
use crate::model::Battery;
use crate::record::LogRecord;
use crate::report::SessionReport;
use crate::scheduler::DistractorScheduler;
use crate::traits::{Devices, Logger, Placement, Stimulus};

/// Runs prepared batteries one set after another.
pub struct Session<'a> {
    devices: Devices<'a>,
    session_log: &'a dyn Logger,
    config: &'a ExperimentConfig,
}

impl<'a> Session<'a> {
    pub fn new(devices: Devices<'a>, session_log: &'a dyn Logger, config: &'a ExperimentConfig) -> Self {
        Self {
            devices,
            session_log,
            config,
        }
    }

    /// Run one set per battery.
    ///
    /// Each set is followed by the set marker for the inter-set pause. It
    /// replaces the rest indicator when one is still on screen. `SESS_END`
    /// closes the session log after the last set.
    pub async fn run(&self, batteries: &[Battery]) -> Result<SessionReport> {
        let scheduler = DistractorScheduler::new(self.config)?;
        let visual = self.devices.visual;
        let clock = self.devices.clock;
        let marker = Stimulus::text(&self.config.display.set_marker, self.config.display.text_size);
        let mut records = Vec::with_capacity(batteries.len());

        for (set, battery) in batteries.iter().enumerate() {
            let scheduled = scheduler
                .run(&self.devices, battery, set as i64)
                .await
                .with_context(|| format!("distraction set {set} failed"))?;
            let record = scheduled.record;

            self.session_log.log(
                record.start,
                &LogRecord::Distractor {
                    set,
                    presented: record.presented,
                    correct: record.correct,
                },
            )?;

            let marker_id = match scheduled.rest_stimulus {
                Some(rest) => visual.replace(rest, &marker),
                None => visual.show(&marker, Placement::Centered),
            };
            let onset = visual.update_screen(clock);
            clock
                .delay(self.config.timing.set_isi_ms, self.config.timing.set_jitter_ms)
                .await;
            visual.unshow(marker_id);
            self.session_log.log(onset, &LogRecord::Fix { set })?;

            records.push(record);
        }

        let end = visual.update_screen(clock);
        self.session_log.log(end, &LogRecord::SessEnd)?;
        tracing::info!(sets = records.len(), "session finished");

        Ok(SessionReport::new(self.config.clone(), records))
    }
}
