//! Timeline Module
//!
//! Viewport math, hit testing, the pointer/keyboard state machine and the
//! scene renderer with its SVG backend.

pub mod hit;
pub mod interaction;
pub mod scene;
pub mod svg;
pub mod viewport;
pub mod waveform;

pub use hit::{hit_test, Hit, Rect};
pub use interaction::{Intent, Interaction, InteractionState, KeyEvent};
pub use scene::{render_scene, Color, DrawCommand, Scene, SceneInput};
pub use viewport::{Viewport, DEFAULT_ZOOM};
