//! Application chrome: top bar, sidebar, add-track dialog and the
//! delete confirmation.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, StudioError};
use crate::model::{ProjectStats, Track, TrackId, TrackType};
use crate::state::{Action, ProjectStore};

/// Types offered by the add-track dialog.
pub const TRACK_TYPE_OPTIONS: [TrackType; 5] = [
    TrackType::Audio,
    TrackType::Midi,
    TrackType::Vocal,
    TrackType::Drum,
    TrackType::Synth,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarTab {
    #[default]
    Tracks,
    Library,
    Mixer,
}

impl SidebarTab {
    pub const ALL: [SidebarTab; 3] = [SidebarTab::Tracks, SidebarTab::Library, SidebarTab::Mixer];

    pub fn label(&self) -> &'static str {
        match self {
            SidebarTab::Tracks => "Tracks",
            SidebarTab::Library => "Library",
            SidebarTab::Mixer => "Mixer",
        }
    }
}

/// Form state of the add-track modal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddTrackDialog {
    pub open: bool,
    pub name: String,
    pub track_type: TrackType,
}

impl AddTrackDialog {
    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close without creating anything. The typed name is kept.
    pub fn cancel(&mut self) {
        self.open = false;
    }

    /// Close and produce the action to create the track.
    pub fn submit(&mut self) -> Option<Action> {
        if !self.open {
            return None;
        }
        let name = std::mem::take(&mut self.name);
        self.open = false;
        Some(Action::AddTrack {
            name: Some(name).filter(|n| !n.trim().is_empty()),
            track_type: self.track_type,
        })
    }
}

/// What the top bar shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopBarView {
    pub title: String,
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_hint: &'static str,
    pub redo_hint: &'static str,
}

/// One row of the sidebar track list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRow {
    pub id: TrackId,
    pub name: String,
    pub type_label: &'static str,
    pub color: String,
    pub muted: bool,
    pub solo: bool,
    pub volume: f32,
}

impl From<&Track> for TrackRow {
    fn from(t: &Track) -> Self {
        Self {
            id: t.id,
            name: t.name.clone(),
            type_label: t.track_type.label(),
            color: t.color.clone(),
            muted: t.muted,
            solo: t.solo,
            volume: t.volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarView {
    pub tab: SidebarTab,
    pub tracks: Vec<TrackRow>,
    pub stats: ProjectStats,
}

/// Panel visibility and modal state.
#[derive(Debug, Clone, PartialEq)]
pub struct Shell {
    pub sidebar_open: bool,
    pub sidebar_tab: SidebarTab,
    pub ai_panel_open: bool,
    pub keyboard_open: bool,
    pub add_track: AddTrackDialog,
    pending_delete: Option<TrackId>,
}

impl Default for Shell {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            sidebar_tab: SidebarTab::Tracks,
            ai_panel_open: false,
            keyboard_open: false,
            add_track: AddTrackDialog::default(),
            pending_delete: None,
        }
    }
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.sidebar_open = !self.sidebar_open;
        self.sidebar_open
    }

    pub fn toggle_ai_panel(&mut self) -> bool {
        self.ai_panel_open = !self.ai_panel_open;
        self.ai_panel_open
    }

    pub fn toggle_keyboard(&mut self) -> bool {
        self.keyboard_open = !self.keyboard_open;
        self.keyboard_open
    }

    pub fn select_tab(&mut self, tab: SidebarTab) {
        self.sidebar_tab = tab;
    }

    /// A modal is open and owns the keyboard.
    pub fn modal_open(&self) -> bool {
        self.add_track.open || self.pending_delete.is_some()
    }

    /// Escape closes whichever modal is open. Returns true when one was.
    pub fn dismiss_modal(&mut self) -> bool {
        if self.pending_delete.take().is_some() {
            return true;
        }
        if self.add_track.open {
            self.add_track.cancel();
            return true;
        }
        false
    }

    /// Ask for confirmation before deleting a track.
    pub fn request_delete(&mut self, track_id: TrackId) {
        self.pending_delete = Some(track_id);
    }

    pub fn pending_delete(&self) -> Option<TrackId> {
        self.pending_delete
    }

    /// Confirm the pending delete, producing the action to run.
    pub fn confirm_delete(&mut self) -> Option<Action> {
        self.pending_delete
            .take()
            .map(|track_id| Action::DeleteTrack { track_id })
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn top_bar(&self, store: &ProjectStore) -> TopBarView {
        TopBarView {
            title: store.name().to_string(),
            can_undo: store.can_undo(),
            can_redo: store.can_redo(),
            undo_hint: "Undo (Ctrl+Z)",
            redo_hint: "Redo (Ctrl+Y)",
        }
    }

    pub fn sidebar(&self, store: &ProjectStore) -> SidebarView {
        SidebarView {
            tab: self.sidebar_tab,
            tracks: store.tracks().iter().map(TrackRow::from).collect(),
            stats: store.stats(),
        }
    }

    /// Export has no backend yet.
    pub fn export(&self) -> Result<()> {
        info!("export requested");
        Err(StudioError::Unsupported {
            feature: "Export".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let shell = Shell::new();
        assert!(shell.sidebar_open);
        assert!(!shell.ai_panel_open);
        assert!(!shell.keyboard_open);
        assert_eq!(shell.sidebar_tab, SidebarTab::Tracks);
    }

    #[test]
    fn test_add_track_submit_resets_name() {
        let mut shell = Shell::new();
        shell.add_track.open();
        shell.add_track.name = "Lead Guitar".to_string();
        shell.add_track.track_type = TrackType::Audio;
        assert_eq!(
            shell.add_track.submit(),
            Some(Action::AddTrack {
                name: Some("Lead Guitar".to_string()),
                track_type: TrackType::Audio
            })
        );
        assert!(!shell.add_track.open);
        assert!(shell.add_track.name.is_empty());
        assert_eq!(shell.add_track.submit(), None);
    }

    #[test]
    fn test_blank_name_becomes_none() {
        let mut dialog = AddTrackDialog::default();
        dialog.open();
        dialog.name = "  ".to_string();
        match dialog.submit() {
            Some(Action::AddTrack { name, .. }) => assert!(name.is_none()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut shell = Shell::new();
        shell.request_delete(TrackId(2));
        assert!(shell.modal_open());
        shell.cancel_delete();
        assert_eq!(shell.confirm_delete(), None);

        shell.request_delete(TrackId(2));
        assert_eq!(
            shell.confirm_delete(),
            Some(Action::DeleteTrack { track_id: TrackId(2) })
        );
        assert!(!shell.modal_open());
    }

    #[test]
    fn test_views() {
        let store = ProjectStore::default();
        let shell = Shell::new();
        let top = shell.top_bar(&store);
        assert_eq!(top.title, "Untitled Project");
        assert!(!top.can_undo);

        let side = shell.sidebar(&store);
        assert_eq!(side.tracks.len(), 3);
        assert_eq!(side.tracks[0].type_label, "Drum Machine");
        assert_eq!(side.stats.track_count, 3);
    }

    #[test]
    fn test_export_unsupported() {
        let err = Shell::new().export().unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED");
    }
}
