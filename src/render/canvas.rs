//! Band-local draw target
//!
//! A [`Canvas`] wraps the portion of the working buffer that covers one
//! render band. Drawing is expressed in screen coordinates; everything
//! outside the band window is clipped. When the byte-swap flag is set,
//! pixels are stored pre-swapped so the buffer can be transmitted as-is.

use crate::area::Area;
use crate::color::Color;

/// Draw target covering one band of the screen
pub struct Canvas<'a> {
    buf: &'a mut [u16],
    window: Area,
    stride: usize,
    swap: bool,
}

impl<'a> Canvas<'a> {
    /// Wrap `buf` as the pixels of `window`
    ///
    /// `buf` must hold exactly `window.size()` pixels in row-major order.
    pub(crate) fn new(buf: &'a mut [u16], window: Area, swap: bool) -> Self {
        debug_assert_eq!(buf.len(), window.size() as usize);
        let stride = window.width() as usize;
        Canvas {
            buf,
            window,
            stride,
            swap,
        }
    }

    /// Screen region this canvas covers
    pub fn window(&self) -> Area {
        self.window
    }

    /// Fill the whole band with one color
    pub fn fill(&mut self, color: Color) {
        let raw = if self.swap {
            color.swapped().raw()
        } else {
            color.raw()
        };
        self.buf.fill(raw);
    }

    /// Copy a raw RGB565 pixel block to screen position `(x, y)`
    ///
    /// `src_width` is the row stride of `pixels`; the block height follows
    /// from the slice length. The copy is opaque and clipped to the band.
    pub fn blit(&mut self, x: i32, y: i32, pixels: &[u16], src_width: u16) {
        let src_width = src_width as usize;
        if src_width == 0 || pixels.is_empty() {
            return;
        }
        let src_height = pixels.len() / src_width;
        let src_area = Area::from_size(x, y, src_width as u16, src_height as u16);

        let clipped = match self.window.intersect(&src_area) {
            Some(area) => area,
            None => return,
        };

        let src_x0 = (clipped.x1 - x) as usize;
        let src_y0 = (clipped.y1 - y) as usize;
        let dst_x0 = (clipped.x1 - self.window.x1) as usize;
        let dst_y0 = (clipped.y1 - self.window.y1) as usize;
        let rows = clipped.height() as usize;
        let cols = clipped.width() as usize;

        for row in 0..rows {
            let src_start = (src_y0 + row) * src_width + src_x0;
            let dst_start = (dst_y0 + row) * self.stride + dst_x0;
            let src_row = &pixels[src_start..src_start + cols];
            let dst_row = &mut self.buf[dst_start..dst_start + cols];
            if self.swap {
                for (dst, src) in dst_row.iter_mut().zip(src_row) {
                    *dst = src.swap_bytes();
                }
            } else {
                dst_row.copy_from_slice(src_row);
            }
        }
    }

    /// Fill a screen-space rectangle with one color, clipped to the band
    pub fn fill_rect(&mut self, rect: Area, color: Color) {
        let clipped = match self.window.intersect(&rect) {
            Some(area) => area,
            None => return,
        };
        let raw = if self.swap {
            color.swapped().raw()
        } else {
            color.raw()
        };

        let dst_x0 = (clipped.x1 - self.window.x1) as usize;
        let dst_y0 = (clipped.y1 - self.window.y1) as usize;
        let cols = clipped.width() as usize;

        for row in 0..clipped.height() as usize {
            let dst_start = (dst_y0 + row) * self.stride + dst_x0;
            self.buf[dst_start..dst_start + cols].fill(raw);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas_buf(window: Area) -> Vec<u16> {
        vec![0; window.size() as usize]
    }

    #[test]
    fn test_fill() {
        let window = Area::new(0, 0, 3, 1);
        let mut buf = canvas_buf(window);
        let mut canvas = Canvas::new(&mut buf, window, false);
        canvas.fill(Color::from_raw(0xABCD));
        assert!(buf.iter().all(|&px| px == 0xABCD));
    }

    #[test]
    fn test_fill_swapped() {
        let window = Area::new(0, 0, 1, 0);
        let mut buf = canvas_buf(window);
        let mut canvas = Canvas::new(&mut buf, window, true);
        canvas.fill(Color::from_raw(0x12F8));
        assert_eq!(buf, vec![0xF812, 0xF812]);
    }

    #[test]
    fn test_blit_inside_window() {
        let window = Area::new(0, 0, 3, 3);
        let mut buf = canvas_buf(window);
        let mut canvas = Canvas::new(&mut buf, window, false);
        // 2x2 block at (1, 1)
        canvas.blit(1, 1, &[1, 2, 3, 4], 2);
        assert_eq!(buf[1 * 4 + 1], 1);
        assert_eq!(buf[1 * 4 + 2], 2);
        assert_eq!(buf[2 * 4 + 1], 3);
        assert_eq!(buf[2 * 4 + 2], 4);
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn test_blit_clips_to_window() {
        // Band window offset into the screen
        let window = Area::new(2, 2, 5, 5);
        let mut buf = canvas_buf(window);
        let mut canvas = Canvas::new(&mut buf, window, false);
        // 4x4 block at (0, 0); only its bottom-right 2x2 corner is visible
        let pixels: Vec<u16> = (1..=16).collect();
        canvas.blit(0, 0, &pixels, 4);
        assert_eq!(buf[0], 11); // src (2,2)
        assert_eq!(buf[1], 12); // src (3,2)
        assert_eq!(buf[4], 15); // src (2,3)
        assert_eq!(buf[5], 16); // src (3,3)
        assert_eq!(buf[2], 0);
    }

    #[test]
    fn test_blit_outside_window() {
        let window = Area::new(0, 0, 3, 3);
        let mut buf = canvas_buf(window);
        let mut canvas = Canvas::new(&mut buf, window, false);
        canvas.blit(10, 10, &[1, 2, 3, 4], 2);
        assert!(buf.iter().all(|&px| px == 0));
    }

    #[test]
    fn test_fill_rect_clipped() {
        let window = Area::new(0, 0, 3, 3);
        let mut buf = canvas_buf(window);
        let mut canvas = Canvas::new(&mut buf, window, false);
        canvas.fill_rect(Area::new(2, 2, 10, 10), Color::WHITE);
        assert_eq!(buf[2 * 4 + 2], 0xFFFF);
        assert_eq!(buf[3 * 4 + 3], 0xFFFF);
        assert_eq!(buf[1 * 4 + 1], 0);
    }
}
