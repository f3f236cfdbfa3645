//! Dirty-area render pass
//!
//! Rendering works in bands: each dirty area is split into horizontal
//! chunks sized by the working buffer (`buf_pixels / area_width` rows per
//! chunk). Every band is background-filled, child objects draw their
//! intersection, and the result is handed to the flush callback. The loop
//! then waits for the display driver to signal `flush_ready` before
//! reusing (or swapping) the working buffer.

mod canvas;
mod damage;

pub use canvas::Canvas;

pub(crate) use damage::DamageTracker;

use crate::area::Area;
use crate::core::sync::SyncBits;
use crate::core::{CoreState, DisplayHandle, Inner};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// How long a render pass waits for the flush-done signal per band
pub(crate) const FLUSH_DONE_TIMEOUT: Duration = Duration::from_millis(20);

/// Render-loop statistics
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RenderStats {
    /// Render passes that produced at least one band
    pub frames_rendered: u64,
    /// Total bands handed to the flush callback
    pub flushes: u64,
    /// Achieved tick rate, sampled over a 100-tick window
    pub actual_fps: u32,
    /// Dirty screen coverage of the last pass, in percent
    pub last_dirty_percentage: f32,
}

/// Working buffers the render pass draws into
pub(crate) struct FrameBuffers {
    front: Vec<u16>,
    back: Option<Vec<u16>>,
    active_back: bool,
    pixels: usize,
}

impl FrameBuffers {
    pub(crate) fn new(pixels: usize, double: bool) -> Self {
        FrameBuffers {
            front: vec![0; pixels],
            back: double.then(|| vec![0; pixels]),
            active_back: false,
            pixels,
        }
    }

    pub(crate) fn pixels(&self) -> usize {
        self.pixels
    }

    pub(crate) fn is_double(&self) -> bool {
        self.back.is_some()
    }

    pub(crate) fn active(&self) -> &[u16] {
        match (&self.back, self.active_back) {
            (Some(back), true) => back,
            _ => &self.front,
        }
    }

    pub(crate) fn active_mut(&mut self) -> &mut [u16] {
        match (&mut self.back, self.active_back) {
            (Some(back), true) => back,
            _ => &mut self.front,
        }
    }

    /// Alternate the active buffer; no-op when single-buffered
    pub(crate) fn swap(&mut self) {
        if self.back.is_some() {
            self.active_back = !self.active_back;
        }
    }
}

/// Render all dirty areas of the screen
///
/// Returns `true` when at least one band was rendered. Called with the
/// engine state lock held.
pub(crate) fn render_pass(state: &mut CoreState, inner: &Arc<Inner>) -> bool {
    if state.damage.count() > 1 {
        state.damage.merge();
    }
    if state.damage.is_empty() {
        return false;
    }

    inner.sync.flushing_last.store(false, Ordering::Release);

    let areas: Vec<Area> = state.damage.live().copied().collect();
    let total_dirty = state.damage.total_pixels();
    let swap_bytes = inner.display.swap_bytes;
    let handle = DisplayHandle::new(Arc::clone(inner));

    let CoreState {
        objects,
        buffers,
        callbacks,
        bg_color,
        damage,
        stats,
        ..
    } = state;

    let mut bands = 0u64;
    let last_area = areas.len() - 1;

    for (idx, area) in areas.iter().enumerate() {
        let width = area.width() as usize;
        let rows_per_band = buffers.pixels() / width;
        if rows_per_band == 0 {
            error!(
                "dirty area [{}] width {} exceeds working buffer, skipping",
                idx, width
            );
            continue;
        }

        let mut y = area.y1;
        while y <= area.y2 {
            let y_end = (y + rows_per_band as i32 - 1).min(area.y2);
            let band = Area::new(area.x1, y, area.x2, y_end);
            let band_pixels = band.size() as usize;
            let is_last = idx == last_area && y_end == area.y2;

            {
                let buf = buffers.active_mut();
                let mut canvas = Canvas::new(&mut buf[..band_pixels], band, swap_bytes);
                canvas.fill(*bg_color);
                for obj in objects.iter_mut() {
                    if obj.visible && obj.bounds().overlaps(&band) {
                        let bounds = obj.bounds();
                        obj.content.draw(bounds, &mut canvas);
                    }
                }
            }

            if let Some(flush) = callbacks.flush.as_mut() {
                inner.sync.flags.clear(SyncBits::FLUSH_DONE);
                inner.sync.flushing_last.store(is_last, Ordering::Release);

                debug!(
                    "flush band ({},{})->({},{}) {}px",
                    band.x1,
                    band.y1,
                    band.x2,
                    band.y2,
                    band_pixels
                );
                flush(&handle, band, &buffers.active()[..band_pixels]);

                if !inner.sync.flags.wait(SyncBits::FLUSH_DONE, FLUSH_DONE_TIMEOUT) {
                    warn!(
                        "flush completion not signalled within {:?}",
                        FLUSH_DONE_TIMEOUT
                    );
                }
                if buffers.is_double() && inner.sync.swap_requested.swap(false, Ordering::AcqRel) {
                    buffers.swap();
                }
            }

            bands += 1;
            y = y_end + 1;
        }
    }

    damage.clear();
    for obj in objects.iter_mut() {
        obj.dirty = false;
    }

    let screen_pixels = (inner.display.h_res * inner.display.v_res) as f32;
    stats.frames_rendered += 1;
    stats.flushes += bands;
    stats.last_dirty_percentage = total_dirty as f32 * 100.0 / screen_pixels;
    debug!(
        "rendered {} bands, {}px ({:.1}% of screen)",
        bands, total_dirty, stats.last_dirty_percentage
    );

    true
}
