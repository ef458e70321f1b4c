//! CLI Module
//!
//! Command-line interface for driving the studio headlessly.

pub mod commands;
pub mod script;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// DAW Shell - headless browser-DAW studio
#[derive(Parser, Debug)]
#[command(name = "daw-shell")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Output format of a rendered timeline.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneFormat {
    #[default]
    Svg,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the timeline of the demo session (or a scripted one)
    #[command(name = "scene")]
    Scene {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = SceneFormat::Svg)]
        format: SceneFormat,

        /// Playhead position in seconds
        #[arg(short, long)]
        time: Option<f64>,

        /// Zoom in pixels per second
        #[arg(short, long)]
        zoom: Option<f64>,

        /// Script to run before rendering
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run a session script and print the resulting project
    #[command(name = "script")]
    Script {
        /// Path to the script
        path: PathBuf,
    },

    /// Generate song lyrics
    #[command(name = "lyrics")]
    Lyrics {
        /// Theme, mood or topic
        prompt: String,
    },

    /// Describe a voice profile
    #[command(name = "voice")]
    Voice {
        /// Desired voice characteristics
        description: String,
    },

    /// Generate a music concept
    #[command(name = "concept")]
    Concept {
        #[arg(long, default_value = "Electronic")]
        genre: String,

        #[arg(long, default_value = "Energetic")]
        mood: String,

        #[arg(long, default_value = "Medium (90-110 BPM)")]
        tempo: String,

        /// e.g. 4/4, 6/8
        #[arg(long)]
        time_signature: Option<String>,

        #[arg(long, default_value = "Auto")]
        key: String,

        /// Instruments to feature, e.g. "Analog Synths, 808s"
        #[arg(long, default_value = "")]
        instrumentation: String,

        /// Section layout, e.g. "Intro, Verse, Drop, Outro"
        #[arg(long)]
        arrangement: Option<String>,

        /// Additional details
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Print the computer-keyboard piano mapping
    #[command(name = "keys")]
    Keys {
        /// Octave of the lowest C
        #[arg(short, long)]
        octave: Option<u8>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scene_flags() {
        let cli = Cli::parse_from(["daw-shell", "-v", "scene", "--format", "json", "--time", "2.5"]);
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Scene { format, time, zoom, .. }) => {
                assert_eq!(format, SceneFormat::Json);
                assert_eq!(time, Some(2.5));
                assert_eq!(zoom, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_concept_defaults() {
        let cli = Cli::parse_from(["daw-shell", "concept", "--genre", "Jazz"]);
        match cli.command {
            Some(Commands::Concept { genre, mood, key, time_signature, arrangement, .. }) => {
                assert_eq!(genre, "Jazz");
                assert_eq!(mood, "Energetic");
                assert_eq!(key, "Auto");
                assert_eq!(time_signature, None);
                assert_eq!(arrangement, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_concept_optional_flags() {
        let cli = Cli::parse_from([
            "daw-shell",
            "concept",
            "--time-signature",
            "7/8",
            "--arrangement",
            "Intro, Build, Drop",
        ]);
        match cli.command {
            Some(Commands::Concept { time_signature, arrangement, .. }) => {
                assert_eq!(time_signature.as_deref(), Some("7/8"));
                assert_eq!(arrangement.as_deref(), Some("Intro, Build, Drop"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::parse_from(["daw-shell", "keys", "--config", "studio.json"]);
        assert_eq!(cli.config, Some(PathBuf::from("studio.json")));
    }
}
