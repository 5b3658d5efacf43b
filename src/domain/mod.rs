//! Domain logic and core data structures
//!
//! This module contains the pure geometry and projection math. Nothing here
//! knows about timers, pointer devices, or pixels.

pub mod core;
pub mod projection;
pub mod weights;

pub use self::core::{Rect, Triangle, TrianglePoint};
pub use self::weights::{Barycentric, Dosha, DoshaWeights};
