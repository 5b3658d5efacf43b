//! Label text rasterisation
//!
//! Glyph outlines come from ab_glyph and are composited straight into the
//! tiny-skia pixmap, one coverage sample per pixel.

use std::fmt;
use std::path::Path;

use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use tiny_skia::{ColorU8, Pixmap, PremultipliedColorU8};

use crate::ui::renderer::{Label, RendererError, TextAnchor};

/// A loaded TrueType/OpenType font used for labels and the readout
pub struct LabelFont {
    font: FontVec,
}

impl LabelFont {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RendererError> {
        let font = FontVec::try_from_vec(data)?;
        Ok(Self { font })
    }

    pub fn load(path: &Path) -> Result<Self, RendererError> {
        let data = std::fs::read(path).map_err(|source| RendererError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(data)
    }

    /// Advance width of `text` at `font_size` pixels, without kerning
    pub fn measure(&self, text: &str, font_size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(font_size));
        text.chars()
            .map(|c| scaled.h_advance(scaled.glyph_id(c)))
            .sum()
    }

    /// Draws a label with its baseline at `label.y`
    pub fn draw(&self, pixmap: &mut Pixmap, label: &Label) {
        let scale = PxScale::from(label.font_size);
        let scaled = self.font.as_scaled(scale);
        let width = self.measure(&label.text, label.font_size);
        let color = label.color.to_color_u8();

        let mut caret = match label.anchor {
            TextAnchor::Start => label.x,
            TextAnchor::Middle => label.x - width / 2.0,
            TextAnchor::End => label.x - width,
        };

        for c in label.text.chars() {
            let id = scaled.glyph_id(c);
            let glyph = id.with_scale_and_position(scale, point(caret, label.y));
            caret += scaled.h_advance(id);

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let px = bounds.min.x as i32 + gx as i32;
                    let py = bounds.min.y as i32 + gy as i32;
                    blend_pixel(pixmap, px, py, color, coverage);
                });
            }
        }
    }
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

/// Source-over composite of `color` at `coverage` onto one pixel
fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: ColorU8, coverage: f32) {
    let width = pixmap.width() as i32;
    let height = pixmap.height() as i32;
    if x < 0 || y < 0 || x >= width || y >= height {
        return;
    }

    let idx = (y * width + x) as usize;
    let pixels = pixmap.pixels_mut();
    let dst = pixels[idx];

    let src_alpha = color.alpha() as f32 / 255.0 * coverage.clamp(0.0, 1.0);
    let keep = 1.0 - src_alpha;
    let mix = |src: u8, dst: u8| (src as f32 * src_alpha + dst as f32 * keep).round() as u8;

    let out = PremultipliedColorU8::from_rgba(
        mix(color.red(), dst.red()),
        mix(color.green(), dst.green()),
        mix(color.blue(), dst.blue()),
        mix(255, dst.alpha()),
    );
    if let Some(out) = out {
        pixels[idx] = out;
    }
}
