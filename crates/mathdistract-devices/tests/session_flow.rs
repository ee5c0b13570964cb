//! Whole sessions: sets, set markers, and the session log.

use mathdistract_core::config::ExperimentConfig;
use mathdistract_core::generator::prepare_sets;
use mathdistract_core::model::{ResponseMode, Timestamp};
use mathdistract_core::record::LogRecord;
use mathdistract_core::session::Session;
use mathdistract_core::traits::{Clock, Devices};
use mathdistract_devices::{
    Frame, HeadlessDisplay, JitterSource, MemoryLog, RandomResponder, ScriptedResponder,
    TextLogFile, ToneRecorder, VirtualClock,
};

fn seeded_config(sets: usize) -> ExperimentConfig {
    let mut config = ExperimentConfig::default();
    config.math.sets = sets;
    config.math.seed = Some(4);
    config
}

#[tokio::test]
async fn sets_are_separated_by_the_marker() {
    let config = seeded_config(2);
    let batteries = prepare_sets(&config).unwrap();

    let clock = VirtualClock::new(JitterSource::Zero);
    let display = HeadlessDisplay::new();
    let audio = ToneRecorder::new();
    let input = ScriptedResponder::default();
    let math_log = MemoryLog::new();
    let session_log = MemoryLog::new();
    let devices = Devices {
        visual: &display,
        audio: &audio,
        input: &input,
        clock: &clock,
        log: &math_log,
    };

    let report = Session::new(devices, &session_log, &config)
        .run(&batteries)
        .await
        .unwrap();

    // Each set times out on its single problem and lasts the full budget,
    // followed by the 2000ms set pause.
    assert_eq!(report.sets.len(), 2);
    assert_eq!(report.sets[1].start, Timestamp::at(12_000));
    assert_eq!(clock.now(), 24_000);
    assert_eq!(
        session_log.entries(),
        vec![
            (
                Timestamp::at(0),
                LogRecord::Distractor {
                    set: 0,
                    presented: 1,
                    correct: 0
                }
            ),
            (Timestamp::at(10_000), LogRecord::Fix { set: 0 }),
            (
                Timestamp::at(12_000),
                LogRecord::Distractor {
                    set: 1,
                    presented: 1,
                    correct: 0
                }
            ),
            (Timestamp::at(22_000), LogRecord::Fix { set: 1 }),
            (Timestamp::at(24_000), LogRecord::SessEnd),
        ]
    );

    assert_eq!(math_log.of_kind("MATH START").len(), 2);
    assert_eq!(math_log.of_kind("MATH END").len(), 2);
    assert!(display.frames().iter().any(|f| f.contents == vec!["*"]));
    assert!(display.visible().is_empty());
    assert_eq!(report.summary.presented, 2);
    assert_eq!(report.summary.no_response, 2);
}

#[tokio::test]
async fn marker_replaces_the_rest_indicator() {
    let config = seeded_config(1);
    let batteries = prepare_sets(&config).unwrap();

    let clock = VirtualClock::default();
    let display = HeadlessDisplay::new();
    let audio = ToneRecorder::new();
    let input = RandomResponder::new(Some(4), 0.0, 200, 400);
    let log = MemoryLog::new();
    let devices = Devices {
        visual: &display,
        audio: &audio,
        input: &input,
        clock: &clock,
        log: &log,
    };

    let report = Session::new(devices, &log, &config)
        .run(&batteries)
        .await
        .unwrap();

    assert!(report.sets[0].rest_shown);
    let frames = display.frames();
    assert_eq!(
        frames[frames.len() - 2..],
        [
            Frame {
                at: Timestamp::at(10_000),
                contents: vec!["*".to_string()],
            },
            Frame {
                at: Timestamp::at(12_000),
                contents: vec![],
            },
        ]
    );
    assert_eq!(
        log.of_kind("FIX"),
        vec![(Timestamp::at(10_000), LogRecord::Fix { set: 0 })]
    );
    assert!(display.visible().is_empty());
}

#[tokio::test]
async fn unsupported_mode_fails_before_any_set() {
    let mut config = seeded_config(1);
    config.responses.mode = ResponseMode::Typed;
    let batteries = prepare_sets(&config).unwrap();

    let clock = VirtualClock::default();
    let display = HeadlessDisplay::new();
    let audio = ToneRecorder::new();
    let input = ScriptedResponder::default();
    let log = MemoryLog::new();
    let devices = Devices {
        visual: &display,
        audio: &audio,
        input: &input,
        clock: &clock,
        log: &log,
    };

    let err = Session::new(devices, &log, &config)
        .run(&batteries)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("typed"));
    assert!(log.entries().is_empty());
    assert_eq!(clock.now(), 0);
}

#[tokio::test]
async fn session_writes_log_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = seeded_config(1);
    let batteries = prepare_sets(&config).unwrap();

    let clock = VirtualClock::default();
    let display = HeadlessDisplay::new();
    let audio = ToneRecorder::new();
    let input = ScriptedResponder::default();
    let math_log = TextLogFile::create(&dir.path().join("math.log")).unwrap();
    let session_log = TextLogFile::create(&dir.path().join("session.log")).unwrap();
    let devices = Devices {
        visual: &display,
        audio: &audio,
        input: &input,
        clock: &clock,
        log: &math_log,
    };

    Session::new(devices, &session_log, &config)
        .run(&batteries)
        .await
        .unwrap();

    let math = std::fs::read_to_string(math_log.path()).unwrap();
    let lines: Vec<&str> = math.lines().collect();
    assert_eq!(lines.first(), Some(&"0\t0\tMATH START\t0\t\t\t\t\t"));
    assert_eq!(lines.last(), Some(&"10000\t0\tMATH END\t0\t\t\t\t\t"));
    assert!(lines.iter().all(|l| l.split('\t').count() == 9));

    let session = std::fs::read_to_string(session_log.path()).unwrap();
    assert_eq!(
        session,
        "0\t0\tDISTRACTOR\t0\t1\t0\n10000\t0\tFIX\t0\t\t\n12000\t0\tSESS_END\t\t\t\n"
    );
    assert!(session.lines().all(|l| l.split('\t').count() == 6));
}
