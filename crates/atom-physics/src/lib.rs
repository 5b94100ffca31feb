//! # Atom Physics Engine
//!
//! Discrete-step simulation core for circular atoms bouncing inside a
//! rectangular canvas: non-overlapping placement, wall reflection, and
//! pairwise elastic collisions with area-proportional masses.

pub mod atom;
pub mod error;
pub mod params;
pub mod stepper;
pub mod store;

pub use atom::*;
pub use error::{Error, Result};
pub use params::*;
pub use stepper::*;
pub use store::*;
