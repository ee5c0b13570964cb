//! mathdistract-devices: collaborators for running distraction sets
//! without real hardware.
//!
//! Provides clocks, a headless display, a tone recorder, simulated
//! participants, and log sinks implementing the `mathdistract-core` traits.

pub mod clock;
pub mod display;
pub mod logfile;
pub mod participant;

pub use clock::{JitterSource, TokioClock, VirtualClock};
pub use display::{Frame, HeadlessDisplay, PlayedTone, ToneRecorder};
pub use logfile::{MemoryLog, TextLogFile};
pub use participant::{RandomResponder, ScriptedResponder, ScriptedResponse};
