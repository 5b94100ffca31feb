//! # Atom Renderer
//!
//! Frame-by-frame visualization: clears the canvas to a background color and
//! draws every atom as a filled circle.

pub mod renderer;

pub use renderer::*;
