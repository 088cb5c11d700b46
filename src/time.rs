//! Timestamps, timers and timeouts

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};

use crate::errors::{PlexiglassError, Result};

/// UTC timestamp `offset` seconds away from `start` (or now)
pub fn timestamp(start: Option<DateTime<Utc>>, offset: i64) -> DateTime<Utc> {
    let start = start.unwrap_or_else(Utc::now);
    start + TimeDelta::seconds(offset)
}

/// Measures wall-clock time since it was started
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    started: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Run `f` and report how long it took
pub fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let watch = Stopwatch::start();
    let result = f();
    (result, watch.elapsed())
}

/// Run `f`, giving up after `seconds`
///
/// `None` runs `f` inline with no limit. A zero timeout is rejected. When the
/// limit is hit the worker thread is left to finish on its own and its result
/// is discarded.
pub fn with_timeout<T, F>(seconds: Option<u64>, f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let seconds = match seconds {
        Some(0) => {
            return Err(PlexiglassError::Config(
                "cannot create a timeout for 0 seconds".to_string(),
            ))
        }
        Some(seconds) => seconds,
        None => return Ok(f()),
    };

    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("plexiglass-timeout".to_string())
        .spawn(move || {
            let _ = tx.send(f());
        })?;

    match rx.recv_timeout(Duration::from_secs(seconds)) {
        Ok(value) => Ok(value),
        Err(RecvTimeoutError::Timeout) => Err(PlexiglassError::Timeout(seconds as f64)),
        Err(RecvTimeoutError::Disconnected) => Err(PlexiglassError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "timed task panicked",
        ))),
    }
}
