//! Collaborator traits for the presentation layer.
//!
//! Rendering, audio, input, timekeeping, and record logging live outside
//! this crate. The scheduler only sees them through these traits, bundled in
//! [`Devices`] and passed explicitly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::Timestamp;
use crate::record::LogRecord;

// ---------------------------------------------------------------------------
// Visual output
// ---------------------------------------------------------------------------

/// Handle to a stimulus currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StimulusId(pub u64);

/// Something that can be put on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stimulus {
    /// Text at a height given as a fraction of the screen.
    Text { content: String, size: f32 },
}

impl Stimulus {
    pub fn text(content: impl Into<String>, size: f32) -> Self {
        Stimulus::Text {
            content: content.into(),
            size,
        }
    }

    /// Text content, for logging and headless displays.
    pub fn content(&self) -> &str {
        match self {
            Stimulus::Text { content, .. } => content,
        }
    }
}

/// Where a stimulus is placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Placement {
    Centered,
    /// Fractions of screen width and height.
    Proportional { x: f32, y: f32 },
    /// Immediately to the right of another stimulus.
    RightOf(StimulusId),
}

/// A screen that stimuli are drawn on.
///
/// Changes are buffered until [`VisualOutput::update_screen`], which returns
/// the onset time of everything shown since the previous update.
pub trait VisualOutput: Send + Sync {
    fn show(&self, stimulus: &Stimulus, placement: Placement) -> StimulusId;

    /// Swap a shown stimulus for another in the same place.
    fn replace(&self, old: StimulusId, stimulus: &Stimulus) -> StimulusId;

    fn unshow(&self, id: StimulusId);

    fn update_screen(&self, clock: &dyn Clock) -> Timestamp;
}

// ---------------------------------------------------------------------------
// Audio output
// ---------------------------------------------------------------------------

/// A feedback beep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u64,
    /// Rise/fall ramp length.
    pub ramp_ms: u64,
}

/// Fire-and-forget audio playback.
pub trait AudioOutput: Send + Sync {
    fn play(&self, tone: &Tone, clock: &dyn Clock);
}

// ---------------------------------------------------------------------------
// Input capture
// ---------------------------------------------------------------------------

/// What the input device is asked to wait for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRequest {
    /// Keys that count as a response.
    pub choices: Vec<String>,
    /// Upper bound on the wait.
    pub max_wait_ms: u64,
}

/// A key press with its time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub at: Timestamp,
}

/// Result of a bounded wait for input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    Response(KeyPress),
    Timeout,
}

/// Bounded-wait button or key capture.
#[async_trait]
pub trait InputCapture: Send + Sync {
    /// Wait for one of `request.choices`, never longer than
    /// `request.max_wait_ms`.
    async fn wait(&self, request: &ResponseRequest, clock: &dyn Clock) -> Capture;
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// The presentation clock shared by every collaborator.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic milliseconds since the clock was created.
    fn now(&self) -> u64;

    /// Current reading as a timestamp.
    fn timestamp(&self) -> Timestamp {
        Timestamp::at(self.now())
    }

    /// Block for `duration_ms + uniform(0, jitter_ms)`.
    async fn delay(&self, duration_ms: u64, jitter_ms: u64);
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// Sink for timestamped experiment records.
pub trait Logger: Send + Sync {
    fn log(&self, at: Timestamp, record: &LogRecord) -> anyhow::Result<()>;
}

/// The collaborators one distraction set runs against.
#[derive(Clone, Copy)]
pub struct Devices<'a> {
    pub visual: &'a dyn VisualOutput,
    pub audio: &'a dyn AudioOutput,
    pub input: &'a dyn InputCapture,
    pub clock: &'a dyn Clock,
    pub log: &'a dyn Logger,
}
