//! Screen-space textured quad drawn by UI objects.

use std::rc::Rc;

use super::renderer::{Color, Texture};

/// Textured rectangle of a UI object.
///
/// `source_width` is the visible slice of the texture; bars such as the
/// health meter shrink it while `original_width` stays fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct UiSprite {
    pub texture: Rc<Texture>,
    pub color: Color,
    pub source_width: u32,
    pub original_width: u32,
    pub position: [f32; 2],
}

impl UiSprite {
    pub fn new(texture: Rc<Texture>, position: [f32; 2]) -> Self {
        let width = texture.width;
        Self {
            texture,
            color: Color::WHITE,
            source_width: width,
            original_width: width,
            position,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Show `ratio` (clamped to 0..=1) of the original width.
    pub fn set_visible_ratio(&mut self, ratio: f32) {
        let ratio = ratio.clamp(0.0, 1.0);
        self.source_width = (ratio * self.original_width as f32).round() as u32;
    }
}
