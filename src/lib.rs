//! DAW Shell
//!
//! Headless core of a browser DAW front end: a project store with undo
//! history, a transport clock, a timeline that renders to a draw list, the
//! panels around it and an AI assist panel backed by a generative model.
//!
//! [`Studio`] wires the pieces together the way a host page would.

pub mod ai;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod state;
pub mod studio;
pub mod timeline;
pub mod ui;

pub use config::StudioConfig;
pub use error::{Result, StudioError};
pub use studio::{KeyOutcome, Studio};
