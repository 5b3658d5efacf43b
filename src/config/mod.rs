//! Configuration module for dosha-balance
//!
//! Holds the widget settings shared between the CLI, the widget controller
//! and the renderer, plus JSON loading for them.

pub mod widget;

pub use widget::{ConfigError, WidgetConfig, WidgetSize};
