//! Dosha triangle rendering
//!
//! Implements widget visualization with tiny-skia. Layout calculation is kept
//! separate from rasterisation: `DoshaLayout` holds every shape in canvas
//! pixels, `DoshaRenderer` only paints it.

use std::path::Path;

use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::app::state::WidgetState;
use crate::config::WidgetSize;
use crate::domain::core::{Rect, Triangle, TrianglePoint};
use crate::domain::projection;
use crate::domain::weights::{Dosha, DoshaWeights};
use crate::ui::text::LabelFont;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create pixmap for rendering")]
    PixmapCreationFailed,

    #[error("Invalid canvas: triangle side {side}")]
    InvalidCanvas { side: f64 },

    #[error("PNG encoding failed: {0}")]
    PngEncoding(String),

    #[error("Failed to write {path}: {source}")]
    Io { path: String, source: std::io::Error },

    #[error("Invalid font data: {0}")]
    InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// Fraction of the triangle area kept free on each side for labels
const PADDING_RATIO: f32 = 0.15;
/// Height of the numeric readout band relative to the triangle area
const READOUT_RATIO: f32 = 0.3;
/// View-box units between a vertex and its label
const LABEL_OFFSET: f32 = 10.0;
const LABEL_FONT_UNITS: f32 = 14.0;
const INDICATOR_RADIUS_UNITS: f32 = 5.0;
const DASH_UNITS: f32 = 3.0;

/// Accent colour of a dosha, shared by its guide line and readout
pub fn dosha_color(dosha: Dosha) -> Color {
    match dosha {
        Dosha::Vata => Color::from_rgba8(0x21, 0x96, 0xF3, 255),
        Dosha::Pitta => Color::from_rgba8(0xFF, 0x98, 0x00, 255),
        Dosha::Kapha => Color::from_rgba8(0x4C, 0xAF, 0x50, 255),
    }
}

fn ink(alpha: u8) -> Color {
    Color::from_rgba8(0x1F, 0x29, 0x37, alpha)
}

fn with_alpha(mut color: Color, alpha: f32) -> Color {
    color.set_alpha(alpha);
    color
}

/// Horizontal alignment of a label relative to its anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

/// A text run positioned on its baseline
#[derive(Debug, Clone)]
pub struct Label {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    pub color: Color,
    pub anchor: TextAnchor,
}

/// A single line segment
#[derive(Debug, Clone)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub width: f32,
    pub color: Color,
    pub dash: Option<f32>,
}

/// The dot marking the current balance
#[derive(Debug, Clone)]
pub struct Indicator {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
}

impl Indicator {
    pub fn visible(&self) -> bool {
        self.color.alpha() > 0.0
    }
}

/// One column of the numeric readout
#[derive(Debug, Clone)]
pub struct ReadoutEntry {
    pub dosha: Dosha,
    pub percent: f64,
    pub name: Label,
    pub value: Label,
}

/// Pre-calculated layout for widget rendering
#[derive(Debug, Clone)]
pub struct DoshaLayout {
    /// Triangle vertices in draw order: top, left, right
    pub outline: [(f32, f32); 3],
    pub outline_color: Color,
    pub outline_width: f32,

    pub labels: Vec<Label>,

    /// Dashed lines from each vertex to the indicator
    pub guides: Vec<Line>,

    pub indicator: Indicator,

    pub readout: Vec<ReadoutEntry>,

    pub canvas_width: u32,
    pub canvas_height: u32,

    /// Pixels per view-box unit
    pub scale: f32,
    /// Canvas position of the view-box origin
    pub origin: (f32, f32),
    /// Edge length of the view box in triangle units
    pub view_box: f32,
}

impl DoshaLayout {
    /// Lays out the widget for the given weights and state
    ///
    /// # Arguments
    /// * `triangle` - Triangle in view-box units
    /// * `weights` - Weights shown by the indicator and readout
    /// * `state` - Widget state; the indicator is hidden while animating
    /// * `size` - Rendered size preset
    ///
    /// # Returns
    /// Canvas-space geometry, or `InvalidCanvas` for a degenerate triangle
    pub fn new(
        triangle: &Triangle,
        weights: &DoshaWeights,
        state: WidgetState,
        size: WidgetSize,
    ) -> Result<Self, RendererError> {
        let side = triangle.side();
        if !side.is_finite() || side <= 0.0 {
            return Err(RendererError::InvalidCanvas { side });
        }

        let area = size.pixels() as f32;
        let padding = area * PADDING_RATIO;
        let view_box = side as f32;
        let scale = (area - 2.0 * padding) / view_box;
        let origin = (padding, padding);
        let readout_height = area * READOUT_RATIO;

        let to_canvas = |p: TrianglePoint| -> (f32, f32) {
            (origin.0 + p.x as f32 * scale, origin.1 + p.y as f32 * scale)
        };

        let top = to_canvas(triangle.top());
        let left = to_canvas(triangle.left());
        let right = to_canvas(triangle.right());
        let point = to_canvas(projection::forward(triangle, weights));

        let line_width = scale.max(1.0);
        let font_size = LABEL_FONT_UNITS * scale;
        let offset = LABEL_OFFSET * scale;

        // Pitta sits above the apex; the base labels go under their corners
        let labels = vec![
            vertex_label(Dosha::Pitta, top.0, top.1 - offset, font_size, TextAnchor::Middle),
            vertex_label(Dosha::Vata, left.0, left.1 + offset + font_size, font_size, TextAnchor::Start),
            vertex_label(Dosha::Kapha, right.0, right.1 + offset + font_size, font_size, TextAnchor::End),
        ];

        let (dot_alpha, guide_alpha) = if state.indicator_visible() {
            (1.0, 0.7)
        } else {
            (0.0, 0.0)
        };

        let guides = [(Dosha::Pitta, top), (Dosha::Vata, left), (Dosha::Kapha, right)]
            .into_iter()
            .map(|(dosha, from)| Line {
                x1: from.0,
                y1: from.1,
                x2: point.0,
                y2: point.1,
                width: line_width,
                color: with_alpha(dosha_color(dosha), guide_alpha),
                dash: Some(DASH_UNITS * scale),
            })
            .collect();

        let indicator = Indicator {
            x: point.0,
            y: point.1,
            radius: INDICATOR_RADIUS_UNITS * scale,
            color: with_alpha(ink(255), dot_alpha),
        };

        let column = area / Dosha::ALL.len() as f32;
        let readout_top = area;
        let readout = Dosha::ALL
            .iter()
            .enumerate()
            .map(|(i, dosha)| {
                let x = column * (i as f32 + 0.5);
                let percent = weights.get(*dosha);
                ReadoutEntry {
                    dosha: *dosha,
                    percent,
                    name: Label {
                        text: dosha.name().to_string(),
                        x,
                        y: readout_top + readout_height * 0.4,
                        font_size,
                        color: dosha_color(*dosha),
                        anchor: TextAnchor::Middle,
                    },
                    value: Label {
                        text: format!("{}%", percent.round()),
                        x,
                        y: readout_top + readout_height * 0.8,
                        font_size,
                        color: ink(255),
                        anchor: TextAnchor::Middle,
                    },
                }
            })
            .collect();

        Ok(Self {
            outline: [top, left, right],
            outline_color: ink(51),
            outline_width: line_width,
            labels,
            guides,
            indicator,
            readout,
            canvas_width: size.pixels(),
            canvas_height: (area + readout_height).round() as u32,
            scale,
            origin,
            view_box,
        })
    }

    /// Client rectangle of the view box for a canvas placed at `(x, y)`
    ///
    /// This is the surface pointer events should be mapped against.
    pub fn view_box_rect(&self, x: f64, y: f64) -> Rect {
        let extent = (self.view_box * self.scale) as f64;
        Rect::new(
            x + self.origin.0 as f64,
            y + self.origin.1 as f64,
            extent,
            extent,
        )
    }
}

fn vertex_label(dosha: Dosha, x: f32, y: f32, font_size: f32, anchor: TextAnchor) -> Label {
    Label {
        text: format!("{} ({})", dosha.name(), dosha.element()),
        x,
        y,
        font_size,
        color: ink(255),
        anchor,
    }
}

/// Widget renderer using tiny-skia
///
/// Text is only drawn when a font has been supplied.
#[derive(Debug, Default)]
pub struct DoshaRenderer {
    font: Option<LabelFont>,
}

impl DoshaRenderer {
    /// Create a renderer without text support
    pub fn new() -> Self {
        Self { font: None }
    }

    pub fn with_font(font: LabelFont) -> Self {
        Self { font: Some(font) }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Render a layout to a pixmap
    pub fn render_layout(&self, layout: &DoshaLayout) -> Result<Pixmap, RendererError> {
        let mut pixmap = Pixmap::new(layout.canvas_width, layout.canvas_height)
            .ok_or(RendererError::PixmapCreationFailed)?;
        pixmap.fill(Color::WHITE);

        self.render_outline(&mut pixmap, layout);
        self.render_guides(&mut pixmap, &layout.guides);
        self.render_indicator(&mut pixmap, &layout.indicator);

        if let Some(font) = &self.font {
            for label in &layout.labels {
                font.draw(&mut pixmap, label);
            }
            for entry in &layout.readout {
                font.draw(&mut pixmap, &entry.name);
                font.draw(&mut pixmap, &entry.value);
            }
        }

        Ok(pixmap)
    }

    fn render_outline(&self, pixmap: &mut Pixmap, layout: &DoshaLayout) {
        let [top, left, right] = layout.outline;
        let mut path_builder = PathBuilder::new();
        path_builder.move_to(top.0, top.1);
        path_builder.line_to(left.0, left.1);
        path_builder.line_to(right.0, right.1);
        path_builder.close();

        if let Some(path) = path_builder.finish() {
            let mut paint = Paint::default();
            paint.set_color(layout.outline_color);
            paint.anti_alias = true;

            let stroke = Stroke {
                width: layout.outline_width,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn render_guides(&self, pixmap: &mut Pixmap, lines: &[Line]) {
        for line in lines {
            if line.color.alpha() == 0.0 {
                continue;
            }

            let mut path_builder = PathBuilder::new();
            path_builder.move_to(line.x1, line.y1);
            path_builder.line_to(line.x2, line.y2);

            // Zero-length guides (indicator on a vertex) produce no path
            if let Some(path) = path_builder.finish() {
                let mut paint = Paint::default();
                paint.set_color(line.color);
                paint.anti_alias = true;

                let stroke = Stroke {
                    width: line.width,
                    dash: line.dash.and_then(|d| StrokeDash::new(vec![d, d], 0.0)),
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
            }
        }
    }

    fn render_indicator(&self, pixmap: &mut Pixmap, indicator: &Indicator) {
        if !indicator.visible() {
            return;
        }
        if let Some(path) = PathBuilder::from_circle(indicator.x, indicator.y, indicator.radius) {
            let mut paint = Paint::default();
            paint.set_color(indicator.color);
            paint.anti_alias = true;
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    /// Encode a pixmap as PNG bytes
    pub fn encode_png(&self, pixmap: &Pixmap) -> Result<Vec<u8>, RendererError> {
        pixmap
            .encode_png()
            .map_err(|e| RendererError::PngEncoding(e.to_string()))
    }

    /// Write a pixmap to disk as PNG
    pub fn save_png(&self, pixmap: &Pixmap, path: &Path) -> Result<(), RendererError> {
        let bytes = self.encode_png(pixmap)?;
        std::fs::write(path, bytes).map_err(|source| RendererError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_for(weights: DoshaWeights, state: WidgetState) -> DoshaLayout {
        DoshaLayout::new(&Triangle::default(), &weights, state, WidgetSize::Md).unwrap()
    }

    #[test]
    fn layout_places_indicator_on_projection() {
        let layout = layout_for(DoshaWeights::new(0.0, 100.0, 0.0), WidgetState::Settled);
        let (top_x, top_y) = layout.outline[0];
        assert!((layout.indicator.x - top_x).abs() < 1e-3);
        assert!((layout.indicator.y - top_y).abs() < 1e-3);
    }

    #[test]
    fn animating_hides_indicator_and_guides() {
        let layout = layout_for(DoshaWeights::new(30.0, 40.0, 30.0), WidgetState::Animating);
        assert!(!layout.indicator.visible());
        assert!(layout.guides.iter().all(|g| g.color.alpha() == 0.0));

        let settled = layout_for(DoshaWeights::new(30.0, 40.0, 30.0), WidgetState::Settled);
        assert!(settled.indicator.visible());
        assert!(settled.guides.iter().all(|g| (g.color.alpha() - 0.7).abs() < 1e-6));
    }

    #[test]
    fn labels_and_readout() {
        let layout = layout_for(DoshaWeights::new(33.0, 33.0, 34.0), WidgetState::Settled);
        let texts: Vec<&str> = layout.labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["Pitta (Fire)", "Vata (Air)", "Kapha (Earth)"]);

        let values: Vec<&str> = layout.readout.iter().map(|e| e.value.text.as_str()).collect();
        assert_eq!(values, vec!["33%", "33%", "34%"]);
        assert_eq!(layout.readout[1].dosha, Dosha::Pitta);
    }

    #[test]
    fn canvas_scales_with_size() {
        let tri = Triangle::default();
        let weights = DoshaWeights::new(1.0, 1.0, 1.0);
        let small = DoshaLayout::new(&tri, &weights, WidgetState::Settled, WidgetSize::Sm).unwrap();
        let large = DoshaLayout::new(&tri, &weights, WidgetState::Settled, WidgetSize::Lg).unwrap();
        assert_eq!(small.canvas_width, 192);
        assert_eq!(large.canvas_width, 384);
        assert!(large.indicator.radius > small.indicator.radius);
    }

    #[test]
    fn invalid_side_is_rejected() {
        let result = DoshaLayout::new(
            &Triangle::equilateral(0.0),
            &DoshaWeights::new(1.0, 1.0, 1.0),
            WidgetState::Settled,
            WidgetSize::Md,
        );
        assert!(matches!(result, Err(RendererError::InvalidCanvas { .. })));
    }

    #[test]
    fn view_box_rect_matches_outline() {
        let layout = layout_for(DoshaWeights::new(1.0, 1.0, 1.0), WidgetState::Settled);
        let rect = layout.view_box_rect(10.0, 20.0);
        let (right_x, _) = layout.outline[2];
        assert!((rect.x + rect.w - 10.0 - right_x as f64).abs() < 1e-3);
        assert!((rect.x - 10.0 - layout.origin.0 as f64).abs() < 1e-9);
    }

    #[test]
    fn render_produces_canvas_sized_pixmap() {
        let renderer = DoshaRenderer::new();
        let layout = layout_for(DoshaWeights::new(20.0, 30.0, 50.0), WidgetState::Settled);
        let pixmap = renderer.render_layout(&layout).unwrap();
        assert_eq!(pixmap.width(), layout.canvas_width);
        assert_eq!(pixmap.height(), layout.canvas_height);
    }

    #[test]
    fn indicator_is_painted_only_when_settled() {
        let renderer = DoshaRenderer::new();
        let weights = DoshaWeights::new(1.0, 1.0, 1.0);

        let settled = layout_for(weights, WidgetState::Settled);
        let pixmap = renderer.render_layout(&settled).unwrap();
        let centre = pixmap
            .pixel(settled.indicator.x as u32, settled.indicator.y as u32)
            .unwrap();
        assert_ne!(centre.red(), 255);

        let animating = layout_for(weights, WidgetState::Animating);
        let pixmap = renderer.render_layout(&animating).unwrap();
        let centre = pixmap
            .pixel(animating.indicator.x as u32, animating.indicator.y as u32)
            .unwrap();
        assert_eq!(centre.red(), 255);
    }

    #[test]
    fn png_has_signature() {
        let renderer = DoshaRenderer::new();
        let layout = layout_for(DoshaWeights::new(1.0, 2.0, 3.0), WidgetState::Settled);
        let pixmap = renderer.render_layout(&layout).unwrap();
        let png = renderer.encode_png(&pixmap).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn renderer_without_font() {
        assert!(!DoshaRenderer::new().has_font());
    }
}
