//! Project state store.
//!
//! The single owner of the track list, tempo, project name and selection.
//! Every mutation goes through [`ProjectStore::dispatch`] (or one of the
//! selection/history entry points), after which subscribers are notified.

use std::fmt;

use tracing::{debug, info};

use crate::config::HistoryConfig;
use crate::error::{Result, StudioError};
use crate::model::project::{clamp_bpm, ProjectStats, DEFAULT_BPM, DEFAULT_PROJECT_NAME};
use crate::model::{demo_tracks, Region, RegionId, Track, TrackId};
use crate::state::history::{History, DEFAULT_MAX_UNDO_LEVELS};
use crate::state::reducer::{reduce, Action, Outcome};

/// The selected region, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub track_id: TrackId,
    pub region_id: RegionId,
}

/// What changed, sent to every subscriber after the change is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The track list changed. `recorded` tells whether an undo step was added.
    TracksChanged { label: String, recorded: bool },
    Undone { label: String },
    Redone { label: String },
    SelectionChanged { selection: Option<Selection> },
    TempoChanged { bpm: f64 },
    Renamed { name: String },
    Loaded { name: String },
}

pub type ListenerId = u64;

type Listener = Box<dyn FnMut(&StoreEvent) + Send>;

pub struct ProjectStore {
    name: String,
    history: History<Vec<Track>>,
    bpm: f64,
    selection: Option<Selection>,
    /// Snapshot taken when a region drag began.
    drag_origin: Option<Vec<Track>>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: ListenerId,
    revision: u64,
}

impl fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectStore")
            .field("name", &self.name)
            .field("tracks", &self.history.present().len())
            .field("bpm", &self.bpm)
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new(demo_tracks(), DEFAULT_MAX_UNDO_LEVELS)
    }
}

impl ProjectStore {
    pub fn new(tracks: Vec<Track>, max_levels: usize) -> Self {
        Self {
            name: DEFAULT_PROJECT_NAME.to_string(),
            history: History::with_max_levels(tracks, max_levels),
            bpm: DEFAULT_BPM,
            selection: None,
            drag_origin: None,
            listeners: Vec::new(),
            next_listener_id: 1,
            revision: 0,
        }
    }

    /// Demo session with history limits from configuration.
    pub fn from_config(config: &HistoryConfig) -> Self {
        Self::new(demo_tracks(), config.max_levels)
    }

    // ---- reads ----

    pub fn tracks(&self) -> &[Track] {
        self.history.present()
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks().iter().find(|t| t.id == id)
    }

    pub fn region(&self, track_id: TrackId, region_id: &str) -> Option<&Region> {
        self.track(track_id)?.region(region_id)
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn selected_region(&self) -> Option<&Region> {
        let sel = self.selection.as_ref()?;
        self.region(sel.track_id, &sel.region_id)
    }

    pub fn history(&self) -> &History<Vec<Track>> {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn stats(&self) -> ProjectStats {
        ProjectStats::from_tracks(self.tracks(), self.bpm)
    }

    /// Bumped on every notified change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    // ---- subscriptions ----

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        let id = self.next_listener_id;
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: StoreEvent) {
        self.revision += 1;
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    // ---- mutations ----

    /// Run an action through the reducer.
    ///
    /// Structural actions add an undo step; continuous controls replace the
    /// present in place. A structural action closes any open drag first so
    /// the move keeps its own undo step.
    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        let recorded = action.is_structural();
        if recorded {
            self.commit_drag();
        }
        let (next, outcome) = reduce(self.tracks(), &action)?;
        let label = action.label();

        if recorded {
            self.history.push(label, next);
        } else {
            self.history.replace_present(next);
        }
        debug!(action = label, recorded, "dispatched");

        self.notify(StoreEvent::TracksChanged {
            label: label.to_string(),
            recorded,
        });
        self.reconcile_selection();
        Ok(outcome)
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        let bpm = clamp_bpm(bpm);
        if bpm == self.bpm {
            return;
        }
        self.bpm = bpm;
        debug!(bpm, "tempo changed");
        self.notify(StoreEvent::TempoChanged { bpm });
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        let name = name.into();
        let name = if name.trim().is_empty() {
            DEFAULT_PROJECT_NAME.to_string()
        } else {
            name
        };
        self.name = name.clone();
        self.notify(StoreEvent::Renamed { name });
    }

    /// Select a region; fails when it does not exist.
    pub fn select(&mut self, track_id: TrackId, region_id: &str) -> Result<()> {
        if self.track(track_id).is_none() {
            return Err(StudioError::TrackNotFound { id: track_id.0 });
        }
        if self.region(track_id, region_id).is_none() {
            return Err(StudioError::RegionNotFound {
                id: region_id.to_string(),
            });
        }
        self.set_selection(Some(Selection {
            track_id,
            region_id: region_id.to_string(),
        }));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(None);
    }

    fn set_selection(&mut self, selection: Option<Selection>) {
        if self.selection == selection {
            return;
        }
        self.selection = selection.clone();
        self.notify(StoreEvent::SelectionChanged { selection });
    }

    /// Drop the selection when its region no longer exists.
    fn reconcile_selection(&mut self) {
        let stale = match &self.selection {
            Some(sel) => self.region(sel.track_id, &sel.region_id).is_none(),
            None => false,
        };
        if stale {
            self.set_selection(None);
        }
    }

    /// Delete the selected region.
    pub fn delete_selected(&mut self) -> Result<()> {
        let sel = self.selection.clone().ok_or(StudioError::NoSelection)?;
        self.dispatch(Action::DeleteRegion {
            track_id: sel.track_id,
            region_id: sel.region_id,
        })?;
        Ok(())
    }

    /// Duplicate the selected region and select the copy.
    pub fn duplicate_selected(&mut self) -> Result<RegionId> {
        let sel = self.selection.clone().ok_or(StudioError::NoSelection)?;
        let outcome = self.dispatch(Action::DuplicateRegion {
            track_id: sel.track_id,
            region_id: sel.region_id,
        })?;
        let copy_id = outcome.created_region.ok_or_else(|| StudioError::RegionNotFound {
            id: "duplicate".to_string(),
        })?;
        self.select(sel.track_id, &copy_id)?;
        Ok(copy_id)
    }

    // ---- drags ----

    /// Remember the pre-drag track list.
    pub fn begin_drag(&mut self) {
        if self.drag_origin.is_none() {
            self.drag_origin = Some(self.tracks().to_vec());
        }
    }

    /// Move a region without recording history.
    pub fn drag_region_to(&mut self, track_id: TrackId, region_id: &str, start: f64) -> Result<()> {
        self.dispatch(Action::MoveRegion {
            track_id,
            region_id: region_id.to_string(),
            start,
        })?;
        Ok(())
    }

    /// Finish a drag. Returns true when an undo step was recorded.
    pub fn commit_drag(&mut self) -> bool {
        let Some(before) = self.drag_origin.take() else {
            return false;
        };
        if before.as_slice() == self.tracks() {
            return false;
        }
        self.history.commit_from("Move region", before);
        debug!("drag committed");
        self.notify(StoreEvent::TracksChanged {
            label: "Move region".to_string(),
            recorded: true,
        });
        true
    }

    /// Abandon a drag, restoring the pre-drag track list.
    pub fn cancel_drag(&mut self) {
        if let Some(before) = self.drag_origin.take() {
            self.history.replace_present(before);
            self.notify(StoreEvent::TracksChanged {
                label: "Cancel drag".to_string(),
                recorded: false,
            });
        }
    }

    // ---- history ----

    pub fn undo(&mut self) -> bool {
        self.commit_drag();
        match self.history.undo() {
            Some(label) => {
                debug!(%label, "undo");
                self.notify(StoreEvent::Undone { label });
                self.reconcile_selection();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.commit_drag();
        match self.history.redo() {
            Some(label) => {
                debug!(%label, "redo");
                self.notify(StoreEvent::Redone { label });
                self.reconcile_selection();
                true
            }
            None => false,
        }
    }

    /// Replace the whole project. The previous track list stays undoable.
    pub fn load(&mut self, name: impl Into<String>, bpm: f64, tracks: Vec<Track>) {
        self.commit_drag();
        self.history.push("Load project", tracks);
        self.bpm = clamp_bpm(bpm);
        self.name = name.into();
        info!(name = %self.name, tracks = self.tracks().len(), "project loaded");
        let name = self.name.clone();
        self.notify(StoreEvent::Loaded { name });
        self.set_selection(None);
    }
}
