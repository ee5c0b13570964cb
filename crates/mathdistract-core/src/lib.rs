//! mathdistract-core: problem generation, distractor scheduling, and scoring.
//!
//! This crate defines the data model, collaborator traits, and timing logic
//! for filling a fixed-duration distraction interval with arithmetic
//! verification trials.

pub mod config;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod model;
pub mod presenter;
pub mod record;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod traits;
