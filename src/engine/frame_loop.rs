//! Tokio frame loop driving the transport clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::engine::transport::TransportClock;

/// Clock shared between the studio and the frame loop.
pub type SharedClock = Arc<Mutex<TransportClock>>;

/// Handle to a running frame loop.
#[derive(Debug)]
pub struct FrameLoop {
    handle: JoinHandle<()>,
    time_rx: watch::Receiver<f64>,
    cancel: CancellationToken,
}

impl FrameLoop {
    /// Latest time published by the loop.
    pub fn current_time(&self) -> f64 {
        *self.time_rx.borrow()
    }

    /// A receiver that wakes on every published time.
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.time_rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the loop and wait for it to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "frame loop ended abnormally");
        }
    }
}

/// Spawn a task that calls [`TransportClock::on_frame`] every `period`.
///
/// Frame timestamps are milliseconds since the loop started. The loop exits
/// when `cancel` fires or the clock lock is poisoned.
pub fn spawn_frame_loop(clock: SharedClock, period: Duration, cancel: CancellationToken) -> FrameLoop {
    let initial = clock.lock().map(|c| c.current_time()).unwrap_or(0.0);
    let (time_tx, time_rx) = watch::channel(initial);
    let token = cancel.clone();

    let handle = tokio::spawn(async move {
        let started = Instant::now();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("frame loop shutting down");
                    break;
                }
                tick = ticker.tick() => {
                    let timestamp_ms = tick.duration_since(started).as_secs_f64() * 1000.0;
                    let now = match clock.lock() {
                        Ok(mut clock) => clock.on_frame(timestamp_ms),
                        Err(_) => {
                            tracing::error!("transport clock lock poisoned, stopping frame loop");
                            break;
                        }
                    };
                    time_tx.send_if_modified(|current| {
                        if *current != now {
                            *current = now;
                            true
                        } else {
                            false
                        }
                    });
                }
            }
        }
    });

    FrameLoop {
        handle,
        time_rx,
        cancel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_loop_advances_playing_clock() {
        let clock: SharedClock = Arc::new(Mutex::new(TransportClock::new()));
        clock.lock().unwrap().start();

        let frames = spawn_frame_loop(clock.clone(), Duration::from_millis(16), CancellationToken::new());
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        let published = frames.current_time();
        assert!(published > 0.9 && published <= 1.0, "published {}", published);
        assert_eq!(published, clock.lock().unwrap().current_time());
        frames.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_loop() {
        let clock: SharedClock = Arc::new(Mutex::new(TransportClock::new()));
        let cancel = CancellationToken::new();
        let frames = spawn_frame_loop(clock, Duration::from_millis(16), cancel.clone());

        cancel.cancel();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(frames.is_finished());
        assert_eq!(frames.current_time(), 0.0);
    }
}
