//! Tracks and their mixer state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::region::Region;

/// Palette cycled through when new tracks are created.
pub const TRACK_COLORS: [&str; 5] = ["#ff4466", "#00e7ff", "#b967ff", "#ffaa00", "#00ff88"];

/// Volume given to tracks created from the add-track dialog.
pub const DEFAULT_TRACK_VOLUME: f32 = 0.8;

/// Stable track identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackId(pub u64);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What kind of source a track holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    #[default]
    Audio,
    Midi,
    Vocal,
    Drum,
    Synth,
    Sampler,
    Loop,
}

impl TrackType {
    pub const ALL: [TrackType; 7] = [
        TrackType::Audio,
        TrackType::Midi,
        TrackType::Vocal,
        TrackType::Drum,
        TrackType::Synth,
        TrackType::Sampler,
        TrackType::Loop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Midi => "midi",
            Self::Vocal => "vocal",
            Self::Drum => "drum",
            Self::Synth => "synth",
            Self::Sampler => "sampler",
            Self::Loop => "loop",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim().to_lowercase())
    }

    /// Label used by the add-track dialog.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Audio => "Audio Recording",
            Self::Midi => "MIDI Instrument",
            Self::Vocal => "AI Vocal Synth",
            Self::Drum => "Drum Machine",
            Self::Synth => "Synthesizer",
            Self::Sampler => "Sampler",
            Self::Loop => "Loop",
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    #[serde(rename = "type")]
    pub track_type: TrackType,
    pub color: String,
    pub muted: bool,
    pub solo: bool,
    /// 0.0 ..= 1.0
    pub volume: f32,
    /// -1.0 (left) ..= 1.0 (right)
    pub pan: f32,
    pub fx_enabled: bool,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl Track {
    pub fn new(id: TrackId, name: impl Into<String>, track_type: TrackType, color: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            track_type,
            color: color.into(),
            muted: false,
            solo: false,
            volume: DEFAULT_TRACK_VOLUME,
            pan: 0.0,
            fx_enabled: false,
            regions: Vec::new(),
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.set_volume(volume);
        self
    }

    pub fn with_regions(mut self, regions: Vec<Region>) -> Self {
        self.regions = regions;
        self
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    pub fn set_pan(&mut self, pan: f32) {
        self.pan = clamp_pan(pan);
    }

    pub fn region(&self, id: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// End of the last region on this track, in seconds.
    pub fn end_time(&self) -> f64 {
        self.regions.iter().map(Region::end).fold(0.0, f64::max)
    }
}

pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        return 0.0;
    }
    volume.clamp(0.0, 1.0)
}

pub fn clamp_pan(pan: f32) -> f32 {
    if pan.is_nan() {
        return 0.0;
    }
    pan.clamp(-1.0, 1.0)
}

/// True when any track in the set is soloed.
pub fn any_solo(tracks: &[Track]) -> bool {
    tracks.iter().any(|t| t.solo)
}

/// Mute state after accounting for solo on other tracks.
pub fn is_effectively_muted(track: &Track, any_solo: bool) -> bool {
    track.muted || (any_solo && !track.solo)
}

/// Color for the n-th track created.
pub fn color_for_index(index: usize) -> &'static str {
    TRACK_COLORS[index % TRACK_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: u64, muted: bool, solo: bool) -> Track {
        let mut t = Track::new(TrackId(id), format!("T{}", id), TrackType::Audio, "#ffffff");
        t.muted = muted;
        t.solo = solo;
        t
    }

    #[test]
    fn test_effectively_muted_all_combinations() {
        // Every mute/solo combination across a three-track set
        for mask in 0u32..64 {
            let tracks: Vec<Track> = (0..3)
                .map(|i| track(i, mask & (1 << i) != 0, mask & (1 << (i + 3)) != 0))
                .collect();
            let soloing = any_solo(&tracks);
            for t in &tracks {
                let expected = t.muted || (soloing && !t.solo);
                assert_eq!(is_effectively_muted(t, soloing), expected, "mask {mask:#08b}");
            }
        }
    }

    #[test]
    fn test_volume_and_pan_are_clamped() {
        let mut t = track(1, false, false);
        t.set_volume(1.7);
        assert_eq!(t.volume, 1.0);
        t.set_volume(-0.2);
        assert_eq!(t.volume, 0.0);
        t.set_pan(-3.0);
        assert_eq!(t.pan, -1.0);
        t.set_pan(f32::NAN);
        assert_eq!(t.pan, 0.0);
    }

    #[test]
    fn test_track_type_parsing() {
        assert_eq!(TrackType::from_str("Drum"), Some(TrackType::Drum));
        assert_eq!(TrackType::from_str(" loop "), Some(TrackType::Loop));
        assert_eq!(TrackType::from_str("kazoo"), None);
        assert_eq!(TrackType::Vocal.label(), "AI Vocal Synth");
    }

    #[test]
    fn test_color_cycle() {
        assert_eq!(color_for_index(0), "#ff4466");
        assert_eq!(color_for_index(5), "#ff4466");
        assert_eq!(color_for_index(3), "#ffaa00");
    }
}
