pub mod pointer;

pub use pointer::{to_triangle_space, PointerError, PointerEvent, TouchPoint};
