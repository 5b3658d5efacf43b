//! Dosha balance widget controller
//!
//! The controller owns one widget instance's weights, its projected point,
//! the settle state machine and the change observer. Weights only change
//! through the two projections: re-seeding (forward) and pointer moves
//! (inverse, then forward again for the point).

use std::fmt;
use std::time::Instant;

use thiserror::Error;
use tracing::{debug, trace};

use crate::app::state::{SettleTimer, StateEvent, StateMachine, WidgetState};
use crate::config::WidgetConfig;
use crate::domain::core::{Rect, Triangle, TrianglePoint};
use crate::domain::projection;
use crate::domain::weights::DoshaWeights;
use crate::input::pointer::{self, PointerError, PointerEvent};
use crate::ui::renderer::{DoshaLayout, RendererError};

/// Callback invoked with the new weights after each change
pub type WeightsObserver = Box<dyn FnMut(DoshaWeights)>;

/// Errors surfaced by widget operations
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Pointer error: {0}")]
    Pointer(#[from] PointerError),
    #[error("Renderer error: {0}")]
    Renderer(#[from] RendererError),
}

/// A single dosha balance widget
pub struct DoshaBalanceWidget {
    config: WidgetConfig,
    triangle: Triangle,
    weights: DoshaWeights,
    point: TrianglePoint,
    state: WidgetState,
    timer: SettleTimer,
    observer: Option<WeightsObserver>,
    torn_down: bool,
}

impl DoshaBalanceWidget {
    /// Mounts a widget now
    pub fn new(config: WidgetConfig, initial: DoshaWeights) -> Self {
        Self::mounted_at(config, initial, Instant::now())
    }

    /// Mounts a widget at an explicit instant; the settle timer counts from it
    pub fn mounted_at(config: WidgetConfig, initial: DoshaWeights, mounted: Instant) -> Self {
        let config = config.sanitized();
        let triangle = config.triangle();
        let point = projection::forward(&triangle, &initial);
        let timer = SettleTimer::arm(mounted, config.settle_delay());

        debug!(
            vata = initial.vata,
            pitta = initial.pitta,
            kapha = initial.kapha,
            interactive = config.interactive,
            settle_delay_ms = config.settle_delay_ms,
            "widget mounted"
        );

        Self {
            config,
            triangle,
            weights: initial,
            point,
            state: WidgetState::Animating,
            timer,
            observer: None,
            torn_down: false,
        }
    }

    /// Registers the change observer, replacing any previous one
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(DoshaWeights) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn weights(&self) -> DoshaWeights {
        self.weights
    }

    pub fn point(&self) -> TrianglePoint {
        self.point
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Polls the settle timer against the current time
    pub fn tick(&mut self) -> WidgetState {
        self.tick_at(Instant::now())
    }

    /// Polls the settle timer against `now`
    ///
    /// On the settling tick the observer receives the current weights once.
    pub fn tick_at(&mut self, now: Instant) -> WidgetState {
        if self.torn_down {
            return self.state;
        }

        if self.timer.poll(now) {
            self.state = StateMachine::process_event(self.state, StateEvent::SettleElapsed);
            self.notify();
        }
        self.state
    }

    /// Adopts caller-supplied weights immediately
    ///
    /// Overrides whatever a drag in progress produced.
    pub fn reseed(&mut self, weights: DoshaWeights) {
        self.reseed_at(weights, Instant::now());
    }

    /// Same as [`reseed`](Self::reseed), settling first if `now` is past the
    /// settle deadline
    pub fn reseed_at(&mut self, weights: DoshaWeights, now: Instant) {
        if self.torn_down {
            return;
        }
        self.tick_at(now);
        debug!(vata = weights.vata, pitta = weights.pitta, kapha = weights.kapha, "widget reseeded");
        self.apply(weights);
    }

    /// Handles a pointer-move event
    ///
    /// # Arguments
    /// * `event` - Mouse or touch event in client coordinates
    /// * `surface` - Client-space bounds of the rendered widget
    ///
    /// # Returns
    /// The new weights, `None` when the widget ignores the event (not
    /// interactive, or torn down), or an error for an unusable event.
    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        surface: &Rect,
    ) -> Result<Option<DoshaWeights>, WidgetError> {
        self.handle_pointer_at(event, surface, Instant::now())
    }

    /// Same as [`handle_pointer`](Self::handle_pointer), polling the settle
    /// timer against `now` before the move is applied
    pub fn handle_pointer_at(
        &mut self,
        event: &PointerEvent,
        surface: &Rect,
        now: Instant,
    ) -> Result<Option<DoshaWeights>, WidgetError> {
        if !self.config.interactive || self.torn_down {
            return Ok(None);
        }
        self.tick_at(now);

        let position = pointer::to_triangle_space(event, surface, self.triangle.side())?;
        let weights = projection::inverse(&self.triangle, &position);
        trace!(x = position.x, y = position.y, ?weights, "pointer move");
        self.apply(weights);
        Ok(Some(self.weights))
    }

    /// Geometry of everything the widget draws in its current state
    pub fn layout(&self) -> Result<DoshaLayout, WidgetError> {
        Ok(DoshaLayout::new(
            &self.triangle,
            &self.weights,
            self.state,
            self.config.size,
        )?)
    }

    /// Cancels the settle timer and drops the observer
    ///
    /// Every later call is a no-op. Also runs on drop.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.timer.cancel();
        self.observer = None;
        self.torn_down = true;
        debug!(state = ?self.state, "widget torn down");
    }

    fn apply(&mut self, weights: DoshaWeights) {
        // Identical inputs keep the memoised point and do not re-notify
        if weights == self.weights {
            return;
        }
        self.weights = weights;
        self.point = projection::forward(&self.triangle, &weights);
        self.notify();
    }

    fn notify(&mut self) {
        if !self.state.notifications_enabled() {
            return;
        }
        if let Some(observer) = self.observer.as_mut() {
            observer(self.weights);
        }
    }
}

impl fmt::Debug for DoshaBalanceWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DoshaBalanceWidget")
            .field("config", &self.config)
            .field("weights", &self.weights)
            .field("point", &self.point)
            .field("state", &self.state)
            .field("has_observer", &self.observer.is_some())
            .field("torn_down", &self.torn_down)
            .finish()
    }
}

impl Drop for DoshaBalanceWidget {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    fn interactive_config() -> WidgetConfig {
        WidgetConfig {
            interactive: true,
            ..WidgetConfig::default()
        }
    }

    fn recording_widget(
        config: WidgetConfig,
        initial: DoshaWeights,
        mounted: Instant,
    ) -> (DoshaBalanceWidget, Rc<RefCell<Vec<DoshaWeights>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let widget = DoshaBalanceWidget::mounted_at(config, initial, mounted)
            .with_observer(move |w| sink.borrow_mut().push(w));
        (widget, seen)
    }

    fn surface() -> Rect {
        Rect::new(0.0, 0.0, 200.0, 200.0)
    }

    #[test]
    fn initial_point_is_forward_projection() {
        let widget = DoshaBalanceWidget::new(WidgetConfig::default(), DoshaWeights::new(0.0, 100.0, 0.0));
        assert_eq!(widget.point(), widget.triangle().top());
        assert_eq!(widget.state(), WidgetState::Animating);
    }

    #[test]
    fn observer_silent_before_settle() {
        let start = Instant::now();
        let (mut widget, seen) = recording_widget(interactive_config(), DoshaWeights::new(30.0, 40.0, 30.0), start);

        widget.tick_at(start + Duration::from_millis(500));
        widget.handle_pointer(&PointerEvent::mouse(100.0, 0.0), &surface()).unwrap();
        widget.reseed(DoshaWeights::new(10.0, 10.0, 80.0));

        assert!(seen.borrow().is_empty());
        assert_eq!(widget.weights(), DoshaWeights::new(10.0, 10.0, 80.0));
    }

    #[test]
    fn settling_notifies_current_weights_once() {
        let start = Instant::now();
        let initial = DoshaWeights::new(30.0, 40.0, 30.0);
        let (mut widget, seen) = recording_widget(interactive_config(), initial, start);

        assert_eq!(widget.tick_at(start + Duration::from_secs(1)), WidgetState::Settled);
        widget.tick_at(start + Duration::from_secs(2));

        assert_eq!(*seen.borrow(), vec![initial]);
    }

    #[test]
    fn each_change_after_settle_notifies() {
        let start = Instant::now();
        let (mut widget, seen) = recording_widget(interactive_config(), DoshaWeights::new(30.0, 40.0, 30.0), start);
        widget.tick_at(start + Duration::from_secs(1));
        seen.borrow_mut().clear();

        let tri = *widget.triangle();
        let top = tri.top();
        let left = tri.left();
        widget.handle_pointer(&PointerEvent::mouse(top.x, top.y), &surface()).unwrap();
        widget.handle_pointer(&PointerEvent::mouse(left.x, left.y), &surface()).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![DoshaWeights::new(0.0, 100.0, 0.0), DoshaWeights::new(100.0, 0.0, 0.0)]
        );
        assert_eq!(widget.point(), left);
    }

    #[test]
    fn identical_weights_do_not_renotify() {
        let start = Instant::now();
        let (mut widget, seen) = recording_widget(interactive_config(), DoshaWeights::new(30.0, 40.0, 30.0), start);
        widget.tick_at(start + Duration::from_secs(1));
        seen.borrow_mut().clear();

        widget.handle_pointer(&PointerEvent::mouse(100.0, 0.0), &surface()).unwrap();
        widget.handle_pointer(&PointerEvent::mouse(100.0, -20.0), &surface()).unwrap();

        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn pointer_after_delay_settles_without_ticking() {
        let start = Instant::now();
        let initial = DoshaWeights::new(30.0, 40.0, 30.0);
        let (mut widget, seen) = recording_widget(interactive_config(), initial, start);

        let later = start + Duration::from_millis(1500);
        widget
            .handle_pointer_at(&PointerEvent::mouse(100.0, 0.0), &surface(), later)
            .unwrap();

        assert_eq!(widget.state(), WidgetState::Settled);
        assert_eq!(*seen.borrow(), vec![initial, DoshaWeights::new(0.0, 100.0, 0.0)]);
    }

    #[test]
    fn zero_delay_settles_on_first_pointer() {
        let config = WidgetConfig {
            settle_delay_ms: 0,
            ..interactive_config()
        };
        let (mut widget, seen) = recording_widget(config, DoshaWeights::new(30.0, 40.0, 30.0), Instant::now());

        widget.handle_pointer(&PointerEvent::mouse(100.0, 0.0), &surface()).unwrap();

        assert_eq!(widget.state(), WidgetState::Settled);
        assert_eq!(seen.borrow().last(), Some(&DoshaWeights::new(0.0, 100.0, 0.0)));
    }

    #[test]
    fn reseed_after_delay_settles_without_ticking() {
        let start = Instant::now();
        let (mut widget, seen) = recording_widget(WidgetConfig::default(), DoshaWeights::new(30.0, 40.0, 30.0), start);

        let seeded = DoshaWeights::new(10.0, 10.0, 80.0);
        widget.reseed_at(seeded, start + Duration::from_secs(2));

        assert_eq!(widget.state(), WidgetState::Settled);
        assert_eq!(seen.borrow().last(), Some(&seeded));
    }

    #[test]
    fn tick_settles_once_delay_has_passed() {
        let config = WidgetConfig {
            settle_delay_ms: 0,
            ..WidgetConfig::default()
        };
        let mut widget = DoshaBalanceWidget::new(config, DoshaWeights::new(1.0, 1.0, 1.0));
        assert_eq!(widget.tick(), WidgetState::Settled);
    }

    #[test]
    fn non_interactive_ignores_pointer() {
        let initial = DoshaWeights::new(30.0, 40.0, 30.0);
        let mut widget = DoshaBalanceWidget::new(WidgetConfig::default(), initial);
        let result = widget.handle_pointer(&PointerEvent::mouse(100.0, 0.0), &surface()).unwrap();
        assert!(result.is_none());
        assert_eq!(widget.weights(), initial);
    }

    #[test]
    fn reseed_overrides_drag() {
        let start = Instant::now();
        let (mut widget, seen) = recording_widget(interactive_config(), DoshaWeights::new(30.0, 40.0, 30.0), start);
        widget.tick_at(start + Duration::from_secs(1));

        widget.handle_pointer(&PointerEvent::mouse(100.0, 0.0), &surface()).unwrap();
        let seeded = DoshaWeights::new(0.0, 0.0, 100.0);
        widget.reseed(seeded);

        assert_eq!(widget.weights(), seeded);
        assert_eq!(widget.point(), widget.triangle().right());
        assert_eq!(seen.borrow().last(), Some(&seeded));
    }

    #[test]
    fn teardown_cancels_settle() {
        let start = Instant::now();
        let (mut widget, seen) = recording_widget(interactive_config(), DoshaWeights::new(30.0, 40.0, 30.0), start);

        widget.teardown();
        assert_eq!(widget.tick_at(start + Duration::from_secs(5)), WidgetState::Animating);
        assert!(widget.is_torn_down());
        assert!(seen.borrow().is_empty());

        let ignored = widget.handle_pointer(&PointerEvent::mouse(100.0, 0.0), &surface()).unwrap();
        assert!(ignored.is_none());
    }

    #[test]
    fn touch_without_contacts_is_reported() {
        let mut widget = DoshaBalanceWidget::new(interactive_config(), DoshaWeights::new(1.0, 1.0, 1.0));
        let err = widget
            .handle_pointer(&PointerEvent::Touch { touches: Vec::new() }, &surface())
            .unwrap_err();
        assert!(matches!(err, WidgetError::Pointer(PointerError::NoActiveTouch)));
    }

    #[test]
    fn zero_weights_render_at_centroid() {
        let widget = DoshaBalanceWidget::new(WidgetConfig::default(), DoshaWeights::new(0.0, 0.0, 0.0));
        let centroid = widget.triangle().centroid();
        assert!((widget.point().x - centroid.x).abs() < 1e-9);
        assert!((widget.point().y - centroid.y).abs() < 1e-9);
    }

    #[test]
    fn scaled_surface_maps_into_triangle() {
        let start = Instant::now();
        let config = WidgetConfig {
            interactive: true,
            triangle_side: 100.0,
            ..WidgetConfig::default()
        };
        let (mut widget, _) = recording_widget(config, DoshaWeights::new(1.0, 1.0, 1.0), start);
        // Surface rendered at 400px for a 100-unit view box; (200, 0) is the apex
        let weights = widget
            .handle_pointer(&PointerEvent::mouse(200.0, 0.0), &Rect::new(0.0, 0.0, 400.0, 400.0))
            .unwrap()
            .unwrap();
        assert_eq!(weights, DoshaWeights::new(0.0, 100.0, 0.0));
    }

    #[test]
    fn layout_follows_state() {
        let start = Instant::now();
        let (mut widget, _) = recording_widget(interactive_config(), DoshaWeights::new(1.0, 1.0, 1.0), start);
        assert!(!widget.layout().unwrap().indicator.visible());
        widget.tick_at(start + Duration::from_secs(1));
        assert!(widget.layout().unwrap().indicator.visible());
    }
}
