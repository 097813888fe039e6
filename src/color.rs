// src/color.rs
// 8-bit RGBA color and the renderer's additive compositing operator
// RELEVANT FILES: src/texture.rs, src/shaders/trace.wgsl

/// RGBA color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent black; the additive blend ignores samples
    /// with zero alpha.
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    /// Composite `sample` onto `self`. Brightness-preserving under the
    /// dominant light source: the existing color is attenuated by the
    /// sample's lightness `b = (max + min) / 2`, and the sample is
    /// added with a 255/205 gain. Alpha is forced opaque. The WGSL
    /// kernel carries the identical operator on normalized channels.
    pub fn add(self, sample: Color) -> Color {
        if sample.a == 0 {
            return self;
        }
        let max = sample.r.max(sample.g).max(sample.b) as f32;
        let min = sample.r.min(sample.g).min(sample.b) as f32;
        let b = (max + min) / (2.0 * 255.0);
        let channel = |c: u8, s: u8| -> u8 {
            ((1.0 - b) * c as f32 + s as f32 * 255.0 / 205.0).clamp(0.0, 255.0) as u8
        };
        Color {
            r: channel(self.r, sample.r),
            g: channel(self.g, sample.g),
            b: channel(self.b, sample.b),
            a: 255,
        }
    }
}

impl From<Color> for [u8; 4] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}
