//! Virtual piano keyboard.
//!
//! Two computer-keyboard rows play a little under an octave and a half:
//! the home row holds the white keys, the row above the black keys.

use std::collections::BTreeSet;

use serde::Serialize;

pub const DEFAULT_OCTAVE: u8 = 4;
pub const MIN_OCTAVE: u8 = 0;
pub const MAX_OCTAVE: u8 = 8;

pub const WHITE_KEY_WIDTH: f64 = 40.0;
pub const BLACK_KEY_WIDTH: f64 = 24.0;
pub const WHITE_KEY_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyColor {
    White,
    Black,
}

/// A playable key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PianoKey {
    /// Computer key that triggers it.
    pub trigger: char,
    pub note: &'static str,
    pub color: KeyColor,
    /// Position in white-key widths; black keys sit on the half steps.
    pub offset: f64,
    /// Semitones above the C of the current octave.
    pub semitone: u8,
}

const fn key(trigger: char, note: &'static str, color: KeyColor, offset: f64, semitone: u8) -> PianoKey {
    PianoKey {
        trigger,
        note,
        color,
        offset,
        semitone,
    }
}

pub static NOTE_MAP: [PianoKey; 17] = [
    key('a', "C", KeyColor::White, 0.0, 0),
    key('w', "C#", KeyColor::Black, 0.5, 1),
    key('s', "D", KeyColor::White, 1.0, 2),
    key('e', "D#", KeyColor::Black, 1.5, 3),
    key('d', "E", KeyColor::White, 2.0, 4),
    key('f', "F", KeyColor::White, 3.0, 5),
    key('t', "F#", KeyColor::Black, 3.5, 6),
    key('g', "G", KeyColor::White, 4.0, 7),
    key('y', "G#", KeyColor::Black, 4.5, 8),
    key('h', "A", KeyColor::White, 5.0, 9),
    key('u', "A#", KeyColor::Black, 5.5, 10),
    key('j', "B", KeyColor::White, 6.0, 11),
    key('k', "C", KeyColor::White, 7.0, 12),
    key('o', "C#", KeyColor::Black, 7.5, 13),
    key('l', "D", KeyColor::White, 8.0, 14),
    key('p', "D#", KeyColor::Black, 8.5, 15),
    key(';', "E", KeyColor::White, 9.0, 16),
];

pub fn lookup(trigger: char) -> Option<&'static PianoKey> {
    let trigger = trigger.to_ascii_lowercase();
    NOTE_MAP.iter().find(|k| k.trigger == trigger)
}

/// A note that started sounding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteOn {
    pub trigger: char,
    /// Note name with octave, e.g. "C#5".
    pub name: String,
    pub midi: u8,
    pub frequency: f64,
}

/// Where a key is drawn, in pixels from the left of the keyboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyLayout {
    pub trigger: char,
    pub color: KeyColor,
    pub x: f64,
    pub width: f64,
    pub active: bool,
}

#[derive(Debug, Clone)]
pub struct VirtualKeyboard {
    octave: u8,
    active: BTreeSet<char>,
}

impl Default for VirtualKeyboard {
    fn default() -> Self {
        Self {
            octave: DEFAULT_OCTAVE,
            active: BTreeSet::new(),
        }
    }
}

impl VirtualKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    pub fn octave_up(&mut self) -> u8 {
        self.octave = (self.octave + 1).min(MAX_OCTAVE);
        self.octave
    }

    pub fn octave_down(&mut self) -> u8 {
        self.octave = self.octave.saturating_sub(1).max(MIN_OCTAVE);
        self.octave
    }

    pub fn is_active(&self, trigger: char) -> bool {
        self.active.contains(&trigger.to_ascii_lowercase())
    }

    pub fn active_keys(&self) -> impl Iterator<Item = char> + '_ {
        self.active.iter().copied()
    }

    /// Press from the computer keyboard. Auto-repeat is ignored.
    pub fn key_down(&mut self, key: &str, repeat: bool) -> Option<NoteOn> {
        if repeat {
            return None;
        }
        let trigger = single_char(key)?;
        self.press(trigger)
    }

    /// Release from the computer keyboard. Returns true when a key was held.
    pub fn key_up(&mut self, key: &str) -> bool {
        single_char(key).map_or(false, |c| self.release(c))
    }

    /// Press by trigger character (pointer down on a key).
    pub fn press(&mut self, trigger: char) -> Option<NoteOn> {
        let piano_key = lookup(trigger)?;
        if !self.active.insert(piano_key.trigger) {
            return None;
        }
        Some(self.note_on(piano_key))
    }

    pub fn release(&mut self, trigger: char) -> bool {
        self.active.remove(&trigger.to_ascii_lowercase())
    }

    pub fn release_all(&mut self) {
        self.active.clear();
    }

    fn note_on(&self, piano_key: &PianoKey) -> NoteOn {
        let midi = midi_note(self.octave, piano_key.semitone);
        let octave = u16::from(self.octave) + u16::from(piano_key.semitone / 12);
        NoteOn {
            trigger: piano_key.trigger,
            name: format!("{}{}", piano_key.note, octave),
            midi,
            frequency: frequency(midi),
        }
    }

    /// White keys left to right, then black keys drawn on top.
    pub fn layout(&self) -> Vec<KeyLayout> {
        let whites = NOTE_MAP
            .iter()
            .filter(|k| k.color == KeyColor::White)
            .take(WHITE_KEY_COUNT)
            .map(|k| KeyLayout {
                trigger: k.trigger,
                color: KeyColor::White,
                x: k.offset * WHITE_KEY_WIDTH,
                width: WHITE_KEY_WIDTH,
                active: self.active.contains(&k.trigger),
            });
        let blacks = NOTE_MAP
            .iter()
            .filter(|k| k.color == KeyColor::Black)
            .map(|k| KeyLayout {
                trigger: k.trigger,
                color: KeyColor::Black,
                x: k.offset * WHITE_KEY_WIDTH - BLACK_KEY_WIDTH / 2.0,
                width: BLACK_KEY_WIDTH,
                active: self.active.contains(&k.trigger),
            });
        whites.chain(blacks).collect()
    }
}

fn single_char(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let c = chars.next()?;
    chars.next().is_none().then(|| c.to_ascii_lowercase())
}

/// MIDI note number, C4 = 60.
pub fn midi_note(octave: u8, semitone: u8) -> u8 {
    let n = (u16::from(octave) + 1) * 12 + u16::from(semitone);
    n.min(127) as u8
}

/// Equal-tempered frequency with A4 = 440 Hz.
pub fn frequency(midi: u8) -> f64 {
    440.0 * 2f64.powf((f64::from(midi) - 69.0) / 12.0)
}
