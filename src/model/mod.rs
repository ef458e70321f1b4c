//! Project data model
//!
//! Tracks own ordered regions; everything here is plain data plus pure
//! helpers, so the store and renderer can share it freely.

pub mod project;
pub mod region;
pub mod track;

pub use project::{demo_tracks, ProjectStats, DEFAULT_BPM, DEFAULT_PROJECT_NAME};
pub use region::{Region, RegionId};
pub use track::{any_solo, is_effectively_muted, Track, TrackId, TrackType};
