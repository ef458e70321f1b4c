//! Music concept parameters and the structured result.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const GENRES: [&str; 14] = [
    "Electronic",
    "Hip Hop",
    "Rock",
    "Pop",
    "Jazz",
    "Classical",
    "Ambient",
    "Cinematic",
    "Lo-Fi",
    "R&B",
    "Techno",
    "House",
    "Trap",
    "Orchestral",
];

pub const MOODS: [&str; 12] = [
    "Energetic",
    "Chill",
    "Dark",
    "Happy",
    "Sad",
    "Romantic",
    "Aggressive",
    "Dreamy",
    "Focus",
    "Uplifting",
    "Melancholic",
    "Euphoric",
];

pub const TEMPOS: [&str; 5] = [
    "Slow (< 90 BPM)",
    "Medium (90-110 BPM)",
    "Upbeat (110-128 BPM)",
    "Fast (128+ BPM)",
    "Variable/Dynamic",
];

pub const KEYS: [&str; 13] = [
    "Auto", "C Major", "A Minor", "G Major", "E Minor", "F Major", "D Minor", "D Major", "B Minor",
    "Eb Major", "C Minor", "Bb Major", "G Minor",
];

/// Form values of the music concept generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MusicConceptParams {
    pub genre: String,
    pub mood: String,
    pub tempo: String,
    /// e.g. "4/4" or "6/8"; left to the model when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<String>,
    pub key: String,
    /// Free text, e.g. "Analog Synths, 808s".
    pub instrumentation: String,
    /// Desired section layout, e.g. "Intro, Verse, Drop, Outro".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrangement: Option<String>,
    pub description: String,
}

impl Default for MusicConceptParams {
    fn default() -> Self {
        Self {
            genre: GENRES[0].to_string(),
            mood: MOODS[0].to_string(),
            tempo: TEMPOS[1].to_string(),
            time_signature: None,
            key: KEYS[0].to_string(),
            instrumentation: String::new(),
            arrangement: None,
            description: String::new(),
        }
    }
}

/// What the model suggests for a track.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MusicConcept {
    pub concept_name: String,
    pub bpm: String,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<String>,
    pub instrumentation: Vec<String>,
    pub structure: Vec<String>,
    pub production_tips: Vec<String>,
}

impl MusicConcept {
    /// Parse model output. Empty output means no concept.
    pub fn from_model_text(text: &str) -> serde_json::Result<Option<Self>> {
        let trimmed = strip_code_fence(text.trim());
        if trimmed.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(trimmed).map(Some)
    }
}

/// Models occasionally wrap JSON in a markdown fence.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Response schema sent with the concept request.
pub fn response_schema() -> Value {
    let list = |description: &str| {
        json!({
            "type": "ARRAY",
            "items": { "type": "STRING" },
            "description": description
        })
    };
    json!({
        "type": "OBJECT",
        "properties": {
            "conceptName": { "type": "STRING", "description": "A creative title for the track concept" },
            "bpm": { "type": "STRING", "description": "Specific BPM suggestion (e.g. '124 BPM')" },
            "key": { "type": "STRING", "description": "Specific Key suggestion (e.g. 'C Minor')" },
            "timeSignature": { "type": "STRING", "description": "Time signature (e.g. '4/4')" },
            "instrumentation": list("List of specific instruments/sounds"),
            "structure": list("List of song sections in order (e.g. 'Intro', 'Verse 1')"),
            "productionTips": list("List of mixing or production tips")
        }
    })
}
