//! RGB565 color handling
//!
//! The engine renders into 16-bit RGB565 frame buffers. Displays wired for
//! the opposite byte order receive byte-swapped pixels; the swap is applied
//! at draw time so buffers always hold ready-to-transmit data.

use serde::{Deserialize, Serialize};

/// 16-bit RGB565 color value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color(u16);

impl Color {
    /// Black (all bits clear)
    pub const BLACK: Color = Color(0x0000);
    /// White (all bits set)
    pub const WHITE: Color = Color(0xFFFF);

    /// Create a color from a raw RGB565 value
    pub fn from_raw(raw: u16) -> Self {
        Color(raw)
    }

    /// Create a color from 8-bit RGB components
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let r = (r as u16 >> 3) & 0x1F;
        let g = (g as u16 >> 2) & 0x3F;
        let b = (b as u16 >> 3) & 0x1F;
        Color((r << 11) | (g << 5) | b)
    }

    /// Create a color from a 24-bit `0xRRGGBB` value
    pub fn from_rgb888(hex: u32) -> Self {
        Color::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    /// Raw RGB565 value
    pub fn raw(&self) -> u16 {
        self.0
    }

    /// Byte-swapped copy for displays with swapped endianness
    pub fn swapped(&self) -> Color {
        Color(self.0.swap_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors() {
        assert_eq!(Color::from_rgb888(0xFF0000).raw(), 0xF800);
        assert_eq!(Color::from_rgb888(0x00FF00).raw(), 0x07E0);
        assert_eq!(Color::from_rgb888(0x0000FF).raw(), 0x001F);
    }

    #[test]
    fn test_black_and_white() {
        assert_eq!(Color::from_rgb888(0x000000), Color::BLACK);
        assert_eq!(Color::from_rgb888(0xFFFFFF), Color::WHITE);
    }

    #[test]
    fn test_component_truncation() {
        // Low bits of each component are discarded by the 565 packing
        assert_eq!(Color::from_rgb(0x07, 0x03, 0x07).raw(), 0x0000);
    }

    #[test]
    fn test_swapped() {
        let color = Color::from_raw(0x12F8);
        assert_eq!(color.swapped().raw(), 0xF812);
        assert_eq!(color.swapped().swapped(), color);
    }
}
