//! Playback Engine Module
//!
//! Simulated playback:
//! - Transport clock state machine
//! - Tokio frame loop that advances it

pub mod frame_loop;
pub mod transport;

pub use frame_loop::{spawn_frame_loop, FrameLoop, SharedClock};
pub use transport::{format_time, TransportClock, TransportState};
