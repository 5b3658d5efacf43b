pub mod renderer;
pub mod text;

pub use renderer::{DoshaLayout, DoshaRenderer, RendererError};
pub use text::LabelFont;
