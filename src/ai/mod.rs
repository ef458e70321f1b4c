//! AI Assist Module
//!
//! Lyrics, music concept and voice profile generation through a
//! generative-AI HTTP API, plus the panel that owns request lifecycles.

pub mod client;
pub mod concept;
pub mod panel;
pub mod prompts;
pub mod service;

pub use client::{GeminiClient, GenerateRequest, GenerativeModel};
pub use concept::{MusicConcept, MusicConceptParams};
pub use panel::{AssistPanel, AssistSection, Generator};
pub use service::{AssistService, MISSING_KEY_MESSAGE};
