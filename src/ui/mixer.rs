//! Mixer view model.

use serde::Serialize;

use crate::model::{any_solo, is_effectively_muted, Track, TrackId};

/// One channel strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MixerStrip {
    pub track_id: TrackId,
    pub name: String,
    pub color: String,
    pub volume: f32,
    /// Volume as shown on the fader, 0..=100.
    pub volume_percent: u8,
    pub pan: f32,
    pub pan_label: String,
    pub muted: bool,
    pub solo: bool,
    /// Silent because of its own mute or another track's solo.
    pub effectively_muted: bool,
    pub fx_enabled: bool,
}

pub fn mixer_strips(tracks: &[Track]) -> Vec<MixerStrip> {
    let soloing = any_solo(tracks);
    tracks
        .iter()
        .map(|t| MixerStrip {
            track_id: t.id,
            name: t.name.clone(),
            color: t.color.clone(),
            volume: t.volume,
            volume_percent: (t.volume * 100.0).round().clamp(0.0, 100.0) as u8,
            pan: t.pan,
            pan_label: pan_label(t.pan),
            muted: t.muted,
            solo: t.solo,
            effectively_muted: is_effectively_muted(t, soloing),
            fx_enabled: t.fx_enabled,
        })
        .collect()
}

/// `C`, `L40` or `R100`.
pub fn pan_label(pan: f32) -> String {
    let amount = (pan.abs() * 100.0).round() as u32;
    if amount == 0 {
        "C".to_string()
    } else if pan < 0.0 {
        format!("L{}", amount)
    } else {
        format!("R{}", amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use crate::model::demo_tracks;

    #[test_case(0.0, "C" ; "centre")]
    #[test_case(0.001, "C" ; "rounds to centre")]
    #[test_case(-0.4, "L40" ; "left")]
    #[test_case(1.0, "R100" ; "hard right")]
    fn test_pan_labels(pan: f32, expected: &str) {
        assert_eq!(pan_label(pan), expected);
    }

    #[test]
    fn test_strips_reflect_solo() {
        let mut tracks = demo_tracks();
        tracks[1].solo = true;
        let strips = mixer_strips(&tracks);
        assert_eq!(strips.len(), 3);
        assert!(strips[0].effectively_muted);
        assert!(!strips[1].effectively_muted);
        assert!(strips[2].effectively_muted);
        assert_eq!(strips[1].volume_percent, 70);
    }
}
