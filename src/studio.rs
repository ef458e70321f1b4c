//! Studio: owns every piece of state and routes input between them.
//!
//! Pointer and key events go through the timeline state machine, which
//! yields intents; the studio applies them to the store and the clock.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::ai::{AssistPanel, AssistService};
use crate::config::StudioConfig;
use crate::engine::{spawn_frame_loop, FrameLoop, SharedClock, TransportClock};
use crate::error::Result;
use crate::model::{ProjectStats, TrackId};
use crate::state::reducer::{Action, Outcome};
use crate::state::storage::{load_snapshot, save_snapshot, KeyValueStore, MemoryStore, ProjectSnapshot};
use crate::state::ProjectStore;
use crate::timeline::{render_scene, Intent, Interaction, KeyEvent, Scene, SceneInput, Viewport};
use crate::ui::keyboard::{self, NoteOn};
use crate::ui::{mixer_strips, MixerStrip, Shell, VirtualKeyboard};

/// What a key press ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    Intent(Intent),
    Note(NoteOn),
    /// Closed a modal.
    Dismissed,
    Ignored,
}

pub struct Studio {
    config: StudioConfig,
    store: ProjectStore,
    clock: SharedClock,
    viewport: Viewport,
    interaction: Interaction,
    keyboard: VirtualKeyboard,
    shell: Shell,
    panel: AssistPanel,
    storage: Box<dyn KeyValueStore>,
    frame_loop: Option<FrameLoop>,
}

impl std::fmt::Debug for Studio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Studio")
            .field("store", &self.store)
            .field("viewport", &self.viewport)
            .field("shell", &self.shell)
            .field("panel", &self.panel)
            .finish_non_exhaustive()
    }
}

impl Studio {
    /// Demo session, Gemini-backed assist and in-memory storage.
    pub fn new(config: StudioConfig) -> Result<Self> {
        let service = AssistService::from_config(&config.ai)?;
        Self::with_service(config, Arc::new(service))
    }

    pub fn with_service(config: StudioConfig, service: Arc<AssistService>) -> Result<Self> {
        config.validate()?;
        info!(max_undo = config.history.max_levels, "studio ready");
        Ok(Self {
            store: ProjectStore::from_config(&config.history),
            clock: Arc::new(Mutex::new(TransportClock::new())),
            viewport: Viewport::from_config(&config.timeline),
            interaction: Interaction::new(),
            keyboard: VirtualKeyboard::new(),
            shell: Shell::new(),
            panel: AssistPanel::new(service),
            storage: Box::new(MemoryStore::new()),
            frame_loop: None,
            config,
        })
    }

    pub fn with_storage(mut self, storage: Box<dyn KeyValueStore>) -> Self {
        self.storage = storage;
        self
    }

    // ---- accessors ----

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProjectStore {
        &mut self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn keyboard(&self) -> &VirtualKeyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut VirtualKeyboard {
        &mut self.keyboard
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut Shell {
        &mut self.shell
    }

    pub fn panel(&self) -> &AssistPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut AssistPanel {
        &mut self.panel
    }

    pub fn stats(&self) -> ProjectStats {
        self.store.stats()
    }

    pub fn mixer(&self) -> Vec<MixerStrip> {
        mixer_strips(self.store.tracks())
    }

    // ---- transport ----

    fn clock(&self) -> MutexGuard<'_, TransportClock> {
        // a panic while holding the lock leaves the clock itself consistent
        self.clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn current_time(&self) -> f64 {
        self.clock().current_time()
    }

    pub fn is_playing(&self) -> bool {
        self.clock().is_playing()
    }

    pub fn play(&mut self) {
        self.clock().start();
    }

    pub fn pause(&mut self) {
        self.clock().pause();
    }

    pub fn stop(&mut self) {
        self.clock().stop();
        self.viewport.scroll_to(0.0, self.viewport.scroll_top());
    }

    pub fn toggle_play(&mut self) {
        self.clock().toggle();
    }

    pub fn seek(&mut self, seconds: f64) {
        self.clock().seek(seconds);
    }

    /// Frame callback for hosts that drive their own animation loop.
    pub fn on_frame(&mut self, timestamp_ms: f64) -> f64 {
        let now = self.clock().on_frame(timestamp_ms);
        self.follow_playhead();
        now
    }

    /// Page the viewport after the clock moved.
    pub fn follow_playhead(&mut self) -> bool {
        let (now, playing) = {
            let clock = self.clock();
            (clock.current_time(), clock.is_playing())
        };
        self.viewport.follow(now, playing)
    }

    /// Drive the clock from a tokio interval. Must be called inside a runtime.
    pub fn start_frame_loop(&mut self) -> watch::Receiver<f64> {
        if let Some(existing) = &self.frame_loop {
            if !existing.is_finished() {
                return existing.subscribe();
            }
        }
        let period = Duration::from_millis(self.config.transport.frame_interval_ms);
        let frames = spawn_frame_loop(Arc::clone(&self.clock), period, CancellationToken::new());
        let rx = frames.subscribe();
        self.frame_loop = Some(frames);
        rx
    }

    pub async fn stop_frame_loop(&mut self) {
        if let Some(frames) = self.frame_loop.take() {
            frames.shutdown().await;
        }
    }

    // ---- pointer ----

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Vec<Intent> {
        let intents = self
            .interaction
            .pointer_down(self.store.tracks(), &self.viewport, x, y);
        self.apply_all(&intents);
        intents
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Vec<Intent> {
        let intents = self.interaction.pointer_move(&self.viewport, x, y);
        self.apply_all(&intents);
        intents
    }

    pub fn pointer_up(&mut self) -> Vec<Intent> {
        let intents = self.interaction.pointer_up();
        self.apply_all(&intents);
        intents
    }

    /// Zoom with the wheel, keeping the time under the pointer in place.
    pub fn wheel_zoom(&mut self, factor: f64, anchor_x: f64) {
        self.viewport.zoom_by(factor, anchor_x);
    }

    // ---- keyboard ----

    pub fn key_down(&mut self, event: &KeyEvent) -> KeyOutcome {
        if self.shell.modal_open() {
            if event.key == "Escape" && self.shell.dismiss_modal() {
                return KeyOutcome::Dismissed;
            }
            return KeyOutcome::Ignored;
        }

        if self.shell.keyboard_open && !event.command() && !event.alt && is_piano_key(&event.key) {
            return match self.keyboard.key_down(&event.key, event.repeat) {
                Some(note) => KeyOutcome::Note(note),
                None => KeyOutcome::Ignored,
            };
        }

        let has_selection = self.store.selection().is_some();
        match self.interaction.key_down(event, has_selection) {
            Some(intent) => {
                self.apply(&intent);
                KeyOutcome::Intent(intent)
            }
            None => KeyOutcome::Ignored,
        }
    }

    pub fn key_up(&mut self, event: &KeyEvent) -> bool {
        self.keyboard.key_up(&event.key)
    }

    // ---- intents ----

    fn apply_all(&mut self, intents: &[Intent]) {
        for intent in intents {
            self.apply(intent);
        }
    }

    /// Apply one intent. Failures are logged; they only happen when the
    /// target vanished between the event and its handling.
    pub fn apply(&mut self, intent: &Intent) {
        if let Err(e) = self.try_apply(intent) {
            warn!(?intent, error = %e, "intent not applied");
        }
    }

    fn try_apply(&mut self, intent: &Intent) -> Result<()> {
        debug!(?intent, "apply");
        match intent {
            Intent::Seek(t) => self.seek(*t),
            Intent::Select { track_id, region_id } => self.store.select(*track_id, region_id)?,
            Intent::ClearSelection => self.store.clear_selection(),
            Intent::BeginDrag => self.store.begin_drag(),
            Intent::MoveRegion {
                track_id,
                region_id,
                start,
            } => self.store.drag_region_to(*track_id, region_id, *start)?,
            Intent::CommitDrag => {
                self.store.commit_drag();
            }
            Intent::CancelDrag => self.store.cancel_drag(),
            Intent::DeleteSelected => self.store.delete_selected()?,
            Intent::DuplicateSelected => {
                self.store.duplicate_selected()?;
            }
            Intent::Undo => {
                self.store.undo();
            }
            Intent::Redo => {
                self.store.redo();
            }
            Intent::TogglePlay => self.toggle_play(),
        }
        Ok(())
    }

    // ---- project ----

    pub fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        self.store.dispatch(action)
    }

    pub fn set_bpm(&mut self, bpm: f64) {
        self.store.set_bpm(bpm);
    }

    /// Submit the add-track dialog.
    pub fn submit_add_track(&mut self) -> Result<Option<TrackId>> {
        match self.shell.add_track.submit() {
            Some(action) => Ok(self.store.dispatch(action)?.created_track),
            None => Ok(None),
        }
    }

    /// Confirm the pending track delete, if one is pending.
    pub fn confirm_delete_track(&mut self) -> Result<bool> {
        match self.shell.confirm_delete() {
            Some(action) => {
                self.store.dispatch(action)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn toggle_ai_panel(&mut self) -> bool {
        let open = self.shell.toggle_ai_panel();
        if open {
            self.panel.open();
        } else {
            self.panel.close();
        }
        open
    }

    pub fn toggle_keyboard(&mut self) -> bool {
        let open = self.shell.toggle_keyboard();
        if !open {
            self.keyboard.release_all();
        }
        open
    }

    pub fn export(&self) -> Result<()> {
        self.shell.export()
    }

    pub fn save(&mut self) -> Result<()> {
        let snapshot = ProjectSnapshot::new(self.store.name(), self.store.bpm(), self.store.tracks().to_vec());
        save_snapshot(self.storage.as_mut(), &snapshot)
    }

    /// Load the saved project. Returns false when nothing was saved.
    pub fn load(&mut self) -> Result<bool> {
        match load_snapshot(self.storage.as_ref())? {
            Some(snapshot) => {
                self.store.load(snapshot.name, snapshot.bpm, snapshot.tracks);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Draw the current frame. The viewport first catches up with a playhead
    /// the frame loop advanced since the last draw.
    pub fn scene(&mut self) -> Scene {
        self.follow_playhead();
        render_scene(&SceneInput {
            tracks: self.store.tracks(),
            current_time: self.current_time(),
            bpm: self.store.bpm(),
            selection: self.store.selection(),
            viewport: &self.viewport,
        })
    }
}

fn is_piano_key(key: &str) -> bool {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => keyboard::lookup(c).is_some(),
        _ => false,
    }
}
