//! Assist panel state and request lifecycle.
//!
//! Requests run as tokio tasks. A single loading flag covers all three
//! generators: while one request is outstanding, new ones are ignored.
//! Results come back over a channel and are applied by
//! [`AssistPanel::poll_completions`] or [`AssistPanel::next_completion`],
//! so panel state is only ever touched by its owner.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::ai::concept::{MusicConcept, MusicConceptParams};
use crate::ai::service::{AssistService, MISSING_KEY_MESSAGE};
use crate::error::{Result, StudioError};

/// Stems the separator would produce.
pub const STEMS: [&str; 4] = ["Drums", "Bass", "Vocals", "Other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generator {
    Lyrics,
    Voice,
    Concept,
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Generator::Lyrics => "lyrics",
            Generator::Voice => "voice profile",
            Generator::Concept => "music concept",
        };
        f.write_str(name)
    }
}

/// Collapsible sections of the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistSection {
    Voice,
    Lyrics,
    Stems,
    Music,
}

#[derive(Debug)]
enum Output {
    Lyrics(String),
    Voice(String),
    Concept(Option<MusicConcept>),
}

#[derive(Debug)]
struct Completion {
    request_id: u64,
    generator: Generator,
    result: Result<Output>,
}

#[derive(Debug)]
struct InFlight {
    request_id: u64,
    generator: Generator,
    handle: JoinHandle<()>,
}

pub struct AssistPanel {
    service: Arc<AssistService>,
    open: bool,
    section: Option<AssistSection>,

    pub lyrics_prompt: String,
    pub voice_description: String,
    pub concept_params: MusicConceptParams,

    lyrics: Option<String>,
    voice_profile: Option<String>,
    concept: Option<MusicConcept>,
    /// Inline notice shown in the music section.
    concept_notice: Option<String>,

    in_flight: Option<InFlight>,
    next_request_id: u64,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl fmt::Debug for AssistPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistPanel")
            .field("open", &self.open)
            .field("section", &self.section)
            .field("loading", &self.active_generator())
            .finish_non_exhaustive()
    }
}

impl AssistPanel {
    pub fn new(service: Arc<AssistService>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            service,
            open: false,
            section: Some(AssistSection::Lyrics),
            lyrics_prompt: String::new(),
            voice_description: String::new(),
            concept_params: MusicConceptParams::default(),
            lyrics: None,
            voice_profile: None,
            concept: None,
            concept_notice: None,
            in_flight: None,
            next_request_id: 1,
            tx,
            rx,
        }
    }

    // ---- visibility ----

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Hide the panel and abort any outstanding request.
    pub fn close(&mut self) {
        self.open = false;
        self.abort_in_flight();
    }

    pub fn section(&self) -> Option<AssistSection> {
        self.section
    }

    /// Expand `section`, or collapse it when it is already expanded.
    pub fn toggle_section(&mut self, section: AssistSection) {
        self.section = if self.section == Some(section) {
            None
        } else {
            Some(section)
        };
    }

    // ---- results ----

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn active_generator(&self) -> Option<Generator> {
        self.in_flight.as_ref().map(|f| f.generator)
    }

    pub fn lyrics(&self) -> Option<&str> {
        self.lyrics.as_deref()
    }

    pub fn voice_profile(&self) -> Option<&str> {
        self.voice_profile.as_deref()
    }

    pub fn concept(&self) -> Option<&MusicConcept> {
        self.concept.as_ref()
    }

    pub fn concept_notice(&self) -> Option<&str> {
        self.concept_notice.as_deref()
    }

    // ---- requests ----

    /// Start a lyrics request. Returns false when nothing was started.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_lyrics(&mut self) -> bool {
        let prompt = self.lyrics_prompt.trim().to_string();
        if prompt.is_empty() {
            return false;
        }
        self.spawn(Generator::Lyrics, move |service| async move {
            service.generate_lyrics(&prompt).await.map(Output::Lyrics)
        })
    }

    pub fn request_voice_profile(&mut self) -> bool {
        let description = self.voice_description.trim().to_string();
        if description.is_empty() {
            return false;
        }
        self.spawn(Generator::Voice, move |service| async move {
            service
                .generate_voice_profile_description(&description)
                .await
                .map(Output::Voice)
        })
    }

    /// Always allowed; empty fields fall back to the defaults in the form.
    pub fn request_concept(&mut self) -> bool {
        let params = self.concept_params.clone();
        self.spawn(Generator::Concept, move |service| async move {
            service.generate_music_concept(&params).await.map(Output::Concept)
        })
    }

    /// Stem separation has no backend yet.
    pub fn separate_stems(&self) -> Result<()> {
        Err(StudioError::Unsupported {
            feature: "Stem separation".to_string(),
        })
    }

    fn spawn<F, Fut>(&mut self, generator: Generator, run: F) -> bool
    where
        F: FnOnce(Arc<AssistService>) -> Fut,
        Fut: std::future::Future<Output = Result<Output>> + Send + 'static,
    {
        if let Some(active) = &self.in_flight {
            warn!(requested = %generator, active = %active.generator, "request ignored while another is in flight");
            return false;
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let tx = self.tx.clone();
        let fut = run(Arc::clone(&self.service));

        let handle = tokio::spawn(async move {
            let result = fut.await;
            // receiver only disappears with the panel
            let _ = tx.send(Completion {
                request_id,
                generator,
                result,
            });
        });
        debug!(%generator, request_id, "request started");

        self.in_flight = Some(InFlight {
            request_id,
            generator,
            handle,
        });
        true
    }

    fn abort_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
            debug!(generator = %in_flight.generator, "request aborted");
        }
    }

    /// Apply every completion that has arrived. Returns how many were applied.
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the outstanding request and apply it.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Generator> {
        while self.in_flight.is_some() {
            let completion = self.rx.recv().await?;
            let generator = completion.generator;
            if self.apply(completion) {
                return Some(generator);
            }
        }
        None
    }

    /// Returns false for completions of aborted requests.
    fn apply(&mut self, completion: Completion) -> bool {
        let current = self.in_flight.as_ref().map(|f| f.request_id);
        if current != Some(completion.request_id) {
            debug!(request_id = completion.request_id, "stale completion dropped");
            return false;
        }
        self.in_flight = None;

        match completion.result {
            Ok(Output::Lyrics(text)) => self.lyrics = Some(text),
            Ok(Output::Voice(text)) => self.voice_profile = Some(text),
            Ok(Output::Concept(concept)) => {
                self.concept_notice = None;
                if concept.is_some() {
                    self.concept = concept;
                }
            }
            Err(StudioError::MissingCredential) => match completion.generator {
                Generator::Lyrics => self.lyrics = Some(MISSING_KEY_MESSAGE.to_string()),
                Generator::Voice => self.voice_profile = Some(MISSING_KEY_MESSAGE.to_string()),
                Generator::Concept => self.concept_notice = Some(MISSING_KEY_MESSAGE.to_string()),
            },
            Err(e) => {
                error!(generator = %completion.generator, error = %e, "assist request failed");
            }
        }
        true
    }
}

impl Drop for AssistPanel {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::client::{GenerateRequest, GenerativeModel};
    use crate::ai::service::tests::FakeModel;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Blocks until released.
    struct GatedModel {
        gate: Notify,
        reply: String,
    }

    #[async_trait]
    impl GenerativeModel for GatedModel {
        async fn generate(&self, _request: GenerateRequest) -> Result<String> {
            self.gate.notified().await;
            Ok(self.reply.clone())
        }
    }

    struct FailingModel;

    #[async_trait]
    impl GenerativeModel for FailingModel {
        async fn generate(&self, _request: GenerateRequest) -> Result<String> {
            Err(StudioError::AiRequest {
                reason: "503".to_string(),
            })
        }
    }

    fn panel_with(model: Arc<dyn GenerativeModel>) -> AssistPanel {
        AssistPanel::new(Arc::new(AssistService::with_model(model)))
    }

    #[tokio::test]
    async fn test_lyrics_roundtrip() {
        let mut panel = panel_with(FakeModel::replying("Chorus: oh"));
        panel.lyrics_prompt = "heartbreak".to_string();
        assert!(panel.request_lyrics());
        assert!(panel.is_loading());
        assert_eq!(panel.active_generator(), Some(Generator::Lyrics));

        assert_eq!(panel.next_completion().await, Some(Generator::Lyrics));
        assert!(!panel.is_loading());
        assert_eq!(panel.lyrics(), Some("Chorus: oh"));
    }

    #[tokio::test]
    async fn test_empty_input_not_issued() {
        let mut panel = panel_with(FakeModel::replying("x"));
        panel.lyrics_prompt = "   ".to_string();
        assert!(!panel.request_lyrics());
        assert!(!panel.request_voice_profile());
        assert!(!panel.is_loading());
        assert_eq!(panel.next_completion().await, None);
    }

    #[tokio::test]
    async fn test_second_request_ignored_while_loading() {
        let model = Arc::new(GatedModel {
            gate: Notify::new(),
            reply: "done".to_string(),
        });
        let mut panel = panel_with(model.clone());
        panel.lyrics_prompt = "a".to_string();
        panel.voice_description = "b".to_string();

        assert!(panel.request_lyrics());
        assert!(!panel.request_voice_profile());
        assert!(!panel.request_concept());

        model.gate.notify_one();
        assert_eq!(panel.next_completion().await, Some(Generator::Lyrics));
        assert_eq!(panel.lyrics(), Some("done"));
        assert!(panel.voice_profile().is_none());
    }

    #[tokio::test]
    async fn test_failure_keeps_prior_result() {
        let mut panel = panel_with(FakeModel::replying("first"));
        panel.lyrics_prompt = "x".to_string();
        panel.request_lyrics();
        panel.next_completion().await;
        assert_eq!(panel.lyrics(), Some("first"));

        panel.service = Arc::new(AssistService::with_model(Arc::new(FailingModel)));
        panel.request_lyrics();
        assert_eq!(panel.next_completion().await, Some(Generator::Lyrics));
        assert_eq!(panel.lyrics(), Some("first"));
        assert!(!panel.is_loading());
    }

    #[tokio::test]
    async fn test_missing_key_shown_inline() {
        let mut panel = AssistPanel::new(Arc::new(AssistService::unconfigured()));
        panel.voice_description = "breathy".to_string();
        panel.request_voice_profile();
        panel.next_completion().await;
        assert_eq!(panel.voice_profile(), Some(MISSING_KEY_MESSAGE));

        panel.request_concept();
        panel.next_completion().await;
        assert!(panel.concept().is_none());
        assert_eq!(panel.concept_notice(), Some(MISSING_KEY_MESSAGE));
    }

    #[tokio::test]
    async fn test_close_aborts_request() {
        let model = Arc::new(GatedModel {
            gate: Notify::new(),
            reply: "late".to_string(),
        });
        let mut panel = panel_with(model.clone());
        panel.open();
        panel.lyrics_prompt = "x".to_string();
        panel.request_lyrics();

        panel.close();
        assert!(!panel.is_open());
        assert!(!panel.is_loading());

        model.gate.notify_one();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(panel.poll_completions(), 0);
        assert!(panel.lyrics().is_none());
    }

    #[test]
    fn test_sections_and_stems() {
        let mut panel = AssistPanel::new(Arc::new(AssistService::unconfigured()));
        assert_eq!(panel.section(), Some(AssistSection::Lyrics));
        panel.toggle_section(AssistSection::Lyrics);
        assert_eq!(panel.section(), None);
        panel.toggle_section(AssistSection::Stems);
        assert_eq!(panel.section(), Some(AssistSection::Stems));
        assert_eq!(panel.separate_stems().unwrap_err().error_code(), "UNSUPPORTED");
    }
}
