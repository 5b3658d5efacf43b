//! dosha-balance: interactive three-way balance triangle
//!
//! Converts three dosha weights (Vata, Pitta, Kapha) into a point inside an
//! equilateral triangle and pointer positions back into weights, behind a
//! small widget that suppresses change notifications until its entry
//! animation has settled.
//!
//! Layers:
//! - `domain`: geometry and the forward/inverse projections
//! - `app`: widget controller and settle state machine
//! - `input`: pointer event translation
//! - `config`: widget settings and JSON loading
//! - `ui`: layout and tiny-skia rendering

pub mod app;
pub mod config;
pub mod domain;
pub mod input;
pub mod ui;

pub use app::{DoshaBalanceWidget, WidgetError, WidgetState};
pub use config::{WidgetConfig, WidgetSize};
pub use domain::{Dosha, DoshaWeights, Triangle, TrianglePoint};
