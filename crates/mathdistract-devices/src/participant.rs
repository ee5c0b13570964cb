//! Simulated participants.
//!
//! Responders wait on the shared clock for their reaction time, so the
//! timestamps they report line up with display onsets.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mathdistract_core::traits::{Capture, Clock, InputCapture, KeyPress, ResponseRequest};

/// One scripted reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedResponse {
    /// Press `key` after `rt_ms`.
    Press { key: String, rt_ms: u64 },
    /// Let the wait time out.
    Miss,
}

impl ScriptedResponse {
    pub fn press(key: impl Into<String>, rt_ms: u64) -> Self {
        ScriptedResponse::Press {
            key: key.into(),
            rt_ms,
        }
    }
}

/// Replays a fixed list of reactions, then times out on every request.
#[derive(Debug, Default)]
pub struct ScriptedResponder {
    script: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<ResponseRequest>>,
}

impl ScriptedResponder {
    pub fn new(script: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ResponseRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl InputCapture for ScriptedResponder {
    async fn wait(&self, request: &ResponseRequest, clock: &dyn Clock) -> Capture {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(ScriptedResponse::Press { key, rt_ms }) if rt_ms < request.max_wait_ms => {
                clock.delay(rt_ms, 0).await;
                Capture::Response(KeyPress {
                    key,
                    at: clock.timestamp(),
                })
            }
            _ => {
                clock.delay(request.max_wait_ms, 0).await;
                Capture::Timeout
            }
        }
    }
}

/// Answers with a random choice after a random reaction time, and misses
/// some problems entirely.
#[derive(Debug)]
pub struct RandomResponder {
    rng: Mutex<StdRng>,
    miss_rate: f64,
    min_rt_ms: u64,
    max_rt_ms: u64,
}

impl RandomResponder {
    pub fn new(seed: Option<u64>, miss_rate: f64, min_rt_ms: u64, max_rt_ms: u64) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
            miss_rate: miss_rate.clamp(0.0, 1.0),
            min_rt_ms,
            max_rt_ms: max_rt_ms.max(min_rt_ms),
        }
    }

    fn draw(&self, choices: &[String]) -> Option<(String, u64)> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        if choices.is_empty() || rng.random::<f64>() < self.miss_rate {
            return None;
        }
        let key = choices[rng.random_range(0..choices.len())].clone();
        let rt = rng.random_range(self.min_rt_ms..=self.max_rt_ms);
        Some((key, rt))
    }
}

#[async_trait]
impl InputCapture for RandomResponder {
    async fn wait(&self, request: &ResponseRequest, clock: &dyn Clock) -> Capture {
        match self.draw(&request.choices) {
            Some((key, rt)) if rt < request.max_wait_ms => {
                clock.delay(rt, 0).await;
                Capture::Response(KeyPress {
                    key,
                    at: clock.timestamp(),
                })
            }
            _ => {
                clock.delay(request.max_wait_ms, 0).await;
                Capture::Timeout
            }
        }
    }
}
