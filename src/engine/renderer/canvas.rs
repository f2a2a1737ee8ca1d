// Drawing surface abstraction used by the game

use glam::Vec2;

use crate::core::Rect;

/// RGBA color with sRGB-encoded components in 0.0..=1.0, the way colors
/// are written on the web (`GREEN` is CSS `green`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 0.5, 0.0);
    pub const GRAY: Color = Color::rgb(0.35, 0.35, 0.35);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Decode to linear components, as an sRGB render target expects
    /// shader output. Alpha is already linear.
    pub fn to_linear(self) -> Self {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }

        Self {
            r: decode(self.r),
            g: decode(self.g),
            b: decode(self.b),
            a: self.a,
        }
    }
}

impl From<Color> for wgpu::Color {
    fn from(color: Color) -> Self {
        wgpu::Color {
            r: color.r as f64,
            g: color.g as f64,
            b: color.b as f64,
            a: color.a as f64,
        }
    }
}

/// The drawing operations the game needs from a render surface.
///
/// Coordinates are playfield pixels, origin top-left, y down.
pub trait Canvas {
    /// Clear the whole surface
    fn clear(&mut self, color: Color);

    /// Fill an axis-aligned rectangle
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw one line of `text`, `size` pixels tall, centered on `center`
    fn fill_text(&mut self, text: &str, center: Vec2, size: f32, color: Color);
}
