//! Raw RGB565 frame-sequence sprite
//!
//! The simplest drawable that exercises the full playback cycle: a list
//! of equally sized raw frames stepped by a [`Timeline`]. No decoding and
//! no blending; frames are blitted opaquely.

use super::{PlayerEvent, Timeline};
use crate::area::Area;
use crate::object::{Content, ContentUpdate};
use crate::render::Canvas;
use crate::{GfxError, Result};
use std::any::Any;
use std::time::Duration;

/// One raw RGB565 frame
#[derive(Debug, Clone)]
pub struct Frame {
    width: u16,
    height: u16,
    pixels: Vec<u16>,
}

impl Frame {
    /// Create a frame from row-major RGB565 pixels
    pub fn new(width: u16, height: u16, pixels: Vec<u16>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(GfxError::Content(format!(
                "frame pixel count {} does not match {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Frame {
            width,
            height,
            pixels,
        })
    }

    /// Create a frame filled with a single raw pixel value
    pub fn solid(width: u16, height: u16, raw: u16) -> Self {
        Frame {
            width,
            height,
            pixels: vec![raw; width as usize * height as usize],
        }
    }

    /// Frame size as `(width, height)`
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }
}

/// Frame-sequence drawable driven by a [`Timeline`]
pub struct Sprite {
    frames: Vec<Frame>,
    timeline: Timeline,
}

impl Sprite {
    /// Create a sprite playing `frames` at `fps`
    ///
    /// All frames must share the same size. The sprite starts stopped;
    /// use [`timeline_mut`](Self::timeline_mut) to start playback.
    pub fn new(frames: Vec<Frame>, fps: u32) -> Result<Self> {
        let first = frames
            .first()
            .ok_or_else(|| GfxError::Content("sprite needs at least one frame".into()))?;
        let size = first.size();
        if frames.iter().any(|frame| frame.size() != size) {
            return Err(GfxError::Content("sprite frames differ in size".into()));
        }

        let timeline = Timeline::new(frames.len() as u32, fps);
        Ok(Sprite { frames, timeline })
    }

    /// Playback timeline
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Mutable playback timeline for play/pause/segment control
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn current(&self) -> &Frame {
        let index = (self.timeline.current_frame() as usize).min(self.frames.len() - 1);
        &self.frames[index]
    }
}

impl Content for Sprite {
    fn size(&self) -> (u16, u16) {
        self.frames[0].size()
    }

    fn update(&mut self, elapsed: Duration) -> ContentUpdate {
        match self.timeline.tick(elapsed) {
            Some(event) => ContentUpdate {
                event: Some(event),
                dirty: true,
            },
            None => ContentUpdate::none(),
        }
    }

    fn draw(&mut self, bounds: Area, canvas: &mut Canvas<'_>) {
        let frame = self.current();
        canvas.blit(bounds.x1, bounds.y1, &frame.pixels, frame.width);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
