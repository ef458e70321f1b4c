//! Chrome around the timeline: shell panels, mixer strips and the
//! virtual keyboard.

pub mod keyboard;
pub mod mixer;
pub mod shell;

pub use keyboard::{NoteOn, VirtualKeyboard};
pub use mixer::{mixer_strips, MixerStrip};
pub use shell::{AddTrackDialog, Shell, SidebarTab};
