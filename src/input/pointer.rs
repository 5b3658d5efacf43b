//! Pointer event translation
//!
//! Converts mouse and touch positions in client coordinates into triangle
//! space. The surface may be rendered at any pixel size; positions are
//! scaled into view-box units before the inverse projection sees them.

use thiserror::Error;
use tracing::warn;

use crate::domain::core::{Rect, TrianglePoint};

/// A single active touch contact
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub client_x: f64,
    pub client_y: f64,
}

/// Pointer-move input delivered to the widget
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Mouse { client_x: f64, client_y: f64 },
    Touch { touches: Vec<TouchPoint> },
}

impl PointerEvent {
    pub fn mouse(client_x: f64, client_y: f64) -> Self {
        PointerEvent::Mouse { client_x, client_y }
    }

    pub fn touch(client_x: f64, client_y: f64) -> Self {
        PointerEvent::Touch {
            touches: vec![TouchPoint { client_x, client_y }],
        }
    }

    /// Client position of the event; touch uses its first contact
    pub fn client_position(&self) -> Result<(f64, f64), PointerError> {
        match self {
            PointerEvent::Mouse { client_x, client_y } => Ok((*client_x, *client_y)),
            PointerEvent::Touch { touches } => touches
                .first()
                .map(|t| (t.client_x, t.client_y))
                .ok_or(PointerError::NoActiveTouch),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum PointerError {
    #[error("Touch event carries no active touch points")]
    NoActiveTouch,
    #[error("Surface {width}x{height} cannot map pointer positions")]
    DegenerateSurface { width: f64, height: f64 },
}

/// Maps a pointer event on `surface` into triangle space
///
/// # Arguments
/// * `event` - Mouse or touch event in client coordinates
/// * `surface` - Client-space bounds of the square view box
/// * `view_box` - Edge length of the view box in triangle units
///
/// # Returns
/// The pointer position in triangle units, or an error when there is no
/// touch to follow or the surface has no area
pub fn to_triangle_space(
    event: &PointerEvent,
    surface: &Rect,
    view_box: f64,
) -> Result<TrianglePoint, PointerError> {
    if !surface.has_area() {
        warn!(width = surface.w, height = surface.h, "pointer on degenerate surface");
        return Err(PointerError::DegenerateSurface {
            width: surface.w,
            height: surface.h,
        });
    }

    let (client_x, client_y) = event.client_position()?;
    let scale_x = view_box / surface.w;
    let scale_y = view_box / surface.h;

    Ok(TrianglePoint::new(
        (client_x - surface.x) * scale_x,
        (client_y - surface.y) * scale_y,
    ))
}
