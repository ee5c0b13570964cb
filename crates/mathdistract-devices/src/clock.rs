//! Clocks: a virtual one for simulation and tests, and a wall-clock one
//! backed by tokio timers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mathdistract_core::traits::Clock;

/// How the random part of a delay is chosen.
#[derive(Debug)]
pub enum JitterSource {
    /// Uniform in `[0, jitter]`.
    Random(Mutex<StdRng>),
    /// Always the full jitter, for worst-case timing.
    Maximum,
    /// Never any jitter.
    Zero,
}

impl JitterSource {
    /// Uniform jitter, reproducible when a seed is given.
    pub fn seeded(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        JitterSource::Random(Mutex::new(rng))
    }

    pub fn sample(&self, jitter_ms: u64) -> u64 {
        if jitter_ms == 0 {
            return 0;
        }
        match self {
            JitterSource::Random(rng) => rng
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .random_range(0..=jitter_ms),
            JitterSource::Maximum => jitter_ms,
            JitterSource::Zero => 0,
        }
    }
}

/// A clock that only moves when someone waits on it.
///
/// Delays return immediately after advancing the reading, so a whole
/// session runs in no real time.
#[derive(Debug)]
pub struct VirtualClock {
    now_ms: AtomicU64,
    jitter: JitterSource,
}

impl VirtualClock {
    pub fn new(jitter: JitterSource) -> Self {
        Self::starting_at(0, jitter)
    }

    pub fn starting_at(ms: u64, jitter: JitterSource) -> Self {
        Self {
            now_ms: AtomicU64::new(ms),
            jitter,
        }
    }

    /// Move the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new(JitterSource::Zero)
    }
}

#[async_trait]
impl Clock for VirtualClock {
    fn now(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    async fn delay(&self, duration_ms: u64, jitter_ms: u64) {
        let total = duration_ms + self.jitter.sample(jitter_ms);
        self.advance(total);
    }
}

/// Wall-clock time on the tokio timer.
#[derive(Debug)]
pub struct TokioClock {
    start: tokio::time::Instant,
    jitter: JitterSource,
}

impl TokioClock {
    pub fn new(jitter: JitterSource) -> Self {
        Self {
            start: tokio::time::Instant::now(),
            jitter,
        }
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    async fn delay(&self, duration_ms: u64, jitter_ms: u64) {
        let total = duration_ms + self.jitter.sample(jitter_ms);
        if total > 0 {
            tokio::time::sleep(Duration::from_millis(total)).await;
        }
    }
}
