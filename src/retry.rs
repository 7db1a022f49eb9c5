//! Bounded retry with a constant backoff.
//!
//! Both API clients retry up to three times with a one second pause.
//! The pause goes through [`Sleeper`] so tests can count it instead of
//! waiting.

use std::fmt::Display;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{error, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// Blocks the calling thread.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
            sleeper: Arc::new(ThreadSleeper),
        }
    }
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff)
            .finish()
    }
}

impl RetryPolicy {
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Run `op` until it succeeds or `max_attempts` is reached.
    ///
    /// Sleeps `backoff` between attempts, never after the last one.
    /// Returns the last error when all attempts fail.
    pub fn run<T, E, F>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Result<T, E>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => {
                    error!("{label} failed, retries exhausted: {e}");
                    return Err(e);
                }
                Err(e) => {
                    warn!("{label} retry {attempt}/{attempts}: {e}");
                    self.sleeper.sleep(self.backoff);
                    attempt += 1;
                }
            }
        }
    }
}
