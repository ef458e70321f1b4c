//! Transport Clock for daw-shell
//!
//! A simulated playback clock. Nothing is rendered to an audio device: the
//! current time advances once per animation frame from wall-clock deltas.

use std::fmt;

use tracing::debug;

/// Transport states representing the current playback mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportState {
    /// Time is frozen (default state)
    #[default]
    Paused,
    /// Time advances on every frame
    Playing,
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportState::Paused => write!(f, "Paused"),
            TransportState::Playing => write!(f, "Playing"),
        }
    }
}

/// Play/pause/stop/scrub state plus the frame-driven current time.
///
/// While playing, the current time is
/// `paused_at + (frame_timestamp - frame_origin) / 1000`. The origin is
/// recorded on the first frame after `start()` and rebased on every seek.
#[derive(Debug, Clone, Default)]
pub struct TransportClock {
    /// Current transport state
    state: TransportState,

    /// Current time in seconds
    current: f64,

    /// Time at which the clock last started or was repositioned
    paused_at: f64,

    /// Frame timestamp (ms) matching `paused_at`
    frame_origin: Option<f64>,

    /// Most recent frame timestamp seen (ms)
    last_frame: Option<f64>,
}

impl TransportClock {
    /// Create a paused clock at time zero
    ///
    /// # Example
    /// ```
    /// use daw_shell::engine::TransportClock;
    /// let clock = TransportClock::new();
    /// assert!(clock.is_paused());
    /// assert_eq!(clock.current_time(), 0.0);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Transport Controls
    // ========================================================================

    /// Begin advancing from the current time
    ///
    /// # Example
    /// ```
    /// use daw_shell::engine::TransportClock;
    /// let mut clock = TransportClock::new();
    /// clock.start();
    /// clock.on_frame(1_000.0);
    /// clock.on_frame(3_500.0);
    /// assert_eq!(clock.current_time(), 2.5);
    /// ```
    pub fn start(&mut self) {
        if self.state == TransportState::Playing {
            debug!("already playing");
            return;
        }
        self.state = TransportState::Playing;
        self.paused_at = self.current;
        self.frame_origin = None;
        debug!(from = self.current, "play");
    }

    /// Freeze the current time
    pub fn pause(&mut self) {
        if self.state == TransportState::Paused {
            return;
        }
        self.state = TransportState::Paused;
        self.paused_at = self.current;
        self.frame_origin = None;
        debug!(at = self.current, "pause");
    }

    /// Play when paused, pause when playing
    pub fn toggle(&mut self) {
        match self.state {
            TransportState::Paused => self.start(),
            TransportState::Playing => self.pause(),
        }
    }

    /// Move the current time back to zero without changing state
    pub fn reset_to_zero(&mut self) {
        self.reposition(0.0);
        debug!("reset to zero");
    }

    /// Pause and return to zero
    ///
    /// # Example
    /// ```
    /// use daw_shell::engine::TransportClock;
    /// let mut clock = TransportClock::new();
    /// clock.start();
    /// clock.seek(10.0);
    /// clock.stop();
    /// assert!(clock.is_paused());
    /// assert_eq!(clock.current_time(), 0.0);
    /// ```
    pub fn stop(&mut self) {
        self.pause();
        self.reset_to_zero();
    }

    /// Scrub to `position` seconds (clamped to >= 0)
    pub fn seek(&mut self, position: f64) {
        let position = if position.is_nan() { 0.0 } else { position.max(0.0) };
        self.reposition(position);
        debug!(to = position, "seek");
    }

    fn reposition(&mut self, position: f64) {
        self.current = position;
        self.paused_at = position;
        if self.state == TransportState::Playing {
            self.frame_origin = self.last_frame;
        }
    }

    // ========================================================================
    // Frame Callback
    // ========================================================================

    /// Animation-frame callback; `timestamp_ms` is a monotonic frame time.
    ///
    /// Returns the current time after the update.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> f64 {
        self.last_frame = Some(timestamp_ms);
        if self.state != TransportState::Playing {
            return self.current;
        }
        match self.frame_origin {
            None => {
                self.frame_origin = Some(timestamp_ms);
            }
            Some(origin) => {
                let elapsed = (timestamp_ms - origin).max(0.0) / 1000.0;
                let next = self.paused_at + elapsed;
                if next > self.current {
                    self.current = next;
                }
            }
        }
        self.current
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    /// Current time in seconds
    pub fn current_time(&self) -> f64 {
        self.current
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.state == TransportState::Paused
    }
}

/// Render seconds as `MM:SS:mmm`.
///
/// # Example
/// ```
/// use daw_shell::engine::format_time;
/// assert_eq!(format_time(83.456), "01:23:456");
/// ```
pub fn format_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let minutes = total_ms / 60_000;
    let secs = (total_ms / 1000) % 60;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:03}", minutes, secs, millis)
}

// ============================================================================
// Unit Tests
// ============================================================================
