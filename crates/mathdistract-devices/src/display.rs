//! Headless visual and audio outputs that record what would have been
//! presented.

use std::sync::{Mutex, PoisonError};

use mathdistract_core::model::Timestamp;
use mathdistract_core::traits::{
    AudioOutput, Clock, Placement, Stimulus, StimulusId, Tone, VisualOutput,
};

/// Screen contents at one update.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub at: Timestamp,
    pub contents: Vec<String>,
}

#[derive(Debug, Default)]
struct Screen {
    next_id: u64,
    visible: Vec<(StimulusId, Stimulus, Placement)>,
    frames: Vec<Frame>,
}

impl Screen {
    fn allocate(&mut self) -> StimulusId {
        let id = StimulusId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// A display with no window. Every screen update is kept as a [`Frame`].
#[derive(Debug, Default)]
pub struct HeadlessDisplay {
    screen: Mutex<Screen>,
    /// Reported as the latency of each onset.
    frame_latency_ms: u64,
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `ms` of uncertainty on every onset, like a display refresh.
    pub fn with_frame_latency(ms: u64) -> Self {
        Self {
            frame_latency_ms: ms,
            ..Self::default()
        }
    }

    /// Text of every stimulus currently on screen.
    pub fn visible(&self) -> Vec<String> {
        let screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        screen
            .visible
            .iter()
            .map(|(_, s, _)| s.content().to_string())
            .collect()
    }

    pub fn frames(&self) -> Vec<Frame> {
        self.screen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .frames
            .clone()
    }
}

impl VisualOutput for HeadlessDisplay {
    fn show(&self, stimulus: &Stimulus, placement: Placement) -> StimulusId {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        let id = screen.allocate();
        screen.visible.push((id, stimulus.clone(), placement));
        id
    }

    fn replace(&self, old: StimulusId, stimulus: &Stimulus) -> StimulusId {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        let id = screen.allocate();
        match screen.visible.iter_mut().find(|(shown, _, _)| *shown == old) {
            Some(slot) => {
                slot.0 = id;
                slot.1 = stimulus.clone();
            }
            None => screen
                .visible
                .push((id, stimulus.clone(), Placement::Centered)),
        }
        id
    }

    fn unshow(&self, id: StimulusId) {
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        screen.visible.retain(|(shown, _, _)| *shown != id);
    }

    fn update_screen(&self, clock: &dyn Clock) -> Timestamp {
        let at = Timestamp {
            ms: clock.now(),
            max_latency_ms: self.frame_latency_ms,
        };
        let mut screen = self.screen.lock().unwrap_or_else(PoisonError::into_inner);
        let contents: Vec<String> = screen
            .visible
            .iter()
            .map(|(_, s, _)| s.content().to_string())
            .collect();
        tracing::debug!(at = at.ms, contents = ?contents, "screen update");
        screen.frames.push(Frame { at, contents });
        at
    }
}

/// A tone that was played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayedTone {
    pub tone: Tone,
    pub at: Timestamp,
}

/// Audio output that records tones instead of playing them.
#[derive(Debug, Default)]
pub struct ToneRecorder {
    played: Mutex<Vec<PlayedTone>>,
}

impl ToneRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<PlayedTone> {
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AudioOutput for ToneRecorder {
    fn play(&self, tone: &Tone, clock: &dyn Clock) {
        let at = clock.timestamp();
        tracing::debug!(at = at.ms, frequency_hz = tone.frequency_hz, "tone");
        self.played
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PlayedTone { tone: *tone, at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::VirtualClock;

    #[test]
    fn replace_keeps_position_and_issues_new_id() {
        let display = HeadlessDisplay::new();
        let first = display.show(&Stimulus::text("a", 0.1), Placement::Centered);
        display.show(&Stimulus::text("b", 0.1), Placement::RightOf(first));
        let swapped = display.replace(first, &Stimulus::text("*", 0.1));
        assert_ne!(swapped, first);
        assert_eq!(display.visible(), vec!["*", "b"]);

        display.unshow(first);
        assert_eq!(display.visible().len(), 2);
        display.unshow(swapped);
        assert_eq!(display.visible(), vec!["b"]);
    }

    #[test]
    fn update_records_frame_with_latency() {
        let clock = VirtualClock::default();
        clock.advance(42);
        let display = HeadlessDisplay::with_frame_latency(16);
        display.show(&Stimulus::text("7", 0.1), Placement::Centered);
        let at = display.update_screen(&clock);
        assert_eq!(at, Timestamp { ms: 42, max_latency_ms: 16 });
        assert_eq!(
            display.frames(),
            vec![Frame {
                at,
                contents: vec!["7".into()]
            }]
        );
    }

    #[test]
    fn recorder_keeps_tones() {
        let clock = VirtualClock::default();
        let recorder = ToneRecorder::new();
        let tone = Tone {
            frequency_hz: 200,
            duration_ms: 500,
            ramp_ms: 50,
        };
        recorder.play(&tone, &clock);
        assert_eq!(recorder.played(), vec![PlayedTone { tone, at: Timestamp::at(0) }]);
    }
}
