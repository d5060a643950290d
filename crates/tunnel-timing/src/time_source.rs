use std::cell::Cell;
use std::time::Instant;

/// Best current synchronous estimate of video playback time.
///
/// Returns `None` only when the time is genuinely unknown (player not ready),
/// never as a stand-in for zero. Repeated values are legitimate samples: the
/// player polls more coarsely than the frame rate.
pub trait VideoTimeSource {
    fn current_time_ms(&mut self) -> Option<f64>;
}

impl<F> VideoTimeSource for F
where
    F: FnMut() -> Option<f64>,
{
    fn current_time_ms(&mut self) -> Option<f64> {
        self()
    }
}

/// Abstraction over wall-clock time.
/// Implementations: SystemWallClock (production), MockWallClock (testing).
pub trait WallClock {
    /// Current time in milliseconds from an arbitrary epoch.
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by std::time::Instant.
pub struct SystemWallClock {
    start: Instant,
}

impl SystemWallClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemWallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for SystemWallClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Mock wall clock for deterministic testing.
pub struct MockWallClock {
    current_ms: Cell<f64>,
}

impl MockWallClock {
    pub fn new() -> Self {
        Self {
            current_ms: Cell::new(0.0),
        }
    }

    pub fn set_time(&self, ms: f64) {
        self.current_ms.set(ms);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.current_ms.set(self.current_ms.get() + delta_ms);
    }
}

impl Default for MockWallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WallClock for MockWallClock {
    fn now_ms(&self) -> f64 {
        self.current_ms.get()
    }
}

/// Simulated embedded video player.
///
/// Playback advances continuously, but the reported time only refreshes once
/// per poll interval, and nothing is reported until the player is ready.
#[derive(Debug, Clone)]
pub struct PollingVideoSource {
    playback_ms: f64,
    reported_ms: Option<f64>,
    since_poll_ms: f64,
    poll_interval_ms: f64,
    ready_after_ms: f64,
    elapsed_ms: f64,
}

impl PollingVideoSource {
    pub fn new(poll_interval_ms: f64) -> Self {
        Self {
            playback_ms: 0.0,
            reported_ms: None,
            since_poll_ms: 0.0,
            poll_interval_ms: poll_interval_ms.max(1.0),
            ready_after_ms: 0.0,
            elapsed_ms: 0.0,
        }
    }

    /// Report `None` until `ms` of wall time have passed. Playback does not
    /// advance before then.
    pub fn with_startup_delay(mut self, ms: f64) -> Self {
        self.ready_after_ms = ms.max(0.0);
        self
    }

    /// Advance wall time by `delta_ms`.
    pub fn advance(&mut self, delta_ms: f64) {
        let delta_ms = delta_ms.max(0.0);
        self.elapsed_ms += delta_ms;
        if self.elapsed_ms < self.ready_after_ms {
            return;
        }
        if self.reported_ms.is_none() {
            self.reported_ms = Some(self.playback_ms);
            self.since_poll_ms = 0.0;
            return;
        }
        self.playback_ms += delta_ms;
        self.since_poll_ms += delta_ms;
        if self.since_poll_ms >= self.poll_interval_ms {
            self.since_poll_ms %= self.poll_interval_ms;
            self.reported_ms = Some(self.playback_ms);
        }
    }

    /// True playback position, regardless of polling.
    pub fn playback_ms(&self) -> f64 {
        self.playback_ms
    }
}

impl VideoTimeSource for PollingVideoSource {
    fn current_time_ms(&mut self) -> Option<f64> {
        self.reported_ms
    }
}
