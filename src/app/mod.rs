//! Widget orchestration layer
//!
//! This module coordinates between input, domain and UI layers.
//! It owns the widget state machine and observer notification.

pub mod controller;
pub mod state;

pub use controller::{DoshaBalanceWidget, WeightsObserver, WidgetError};
pub use state::{SettleTimer, StateEvent, StateMachine, WidgetState};
