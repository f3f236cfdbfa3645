//! # Emote GFX
//!
//! A small animation player core for RGB565 displays.
//!
//! The engine owns a set of positioned drawable objects, tracks the
//! screen regions they dirty, and runs a background render loop at a
//! configurable frame rate. Each pass renders only the dirty regions,
//! in bands sized to a working buffer, and hands every band to a flush
//! callback together with an asynchronous completion handshake, so the
//! display transfer can overlap with drawing the next band.
//!
//! ## Features
//!
//! - Dirty-area tracking with clipping, cover elimination and merging
//! - Banded rendering through a bounded working buffer, with optional
//!   double buffering and byte swapping for the display endianness
//! - Frame-paced playback timelines reporting per-frame and
//!   end-of-sequence events through an update callback
//! - An object registry with position, visibility and typed content
//!   access
//!
//! ## Quick start
//!
//! ```no_run
//! use emote_gfx::{Callbacks, CoreConfig, EmoteGfx, Frame, Sprite};
//!
//! # fn main() -> emote_gfx::Result<()> {
//! let mut config = CoreConfig::new(240, 240);
//! config.buf_pixels = Some(240 * 20);
//!
//! let callbacks = Callbacks {
//!     flush: Some(Box::new(|handle, area, pixels| {
//!         // push `pixels` covering `area` to the display, then:
//!         handle.flush_ready(false);
//!     })),
//!     ..Callbacks::default()
//! };
//!
//! let gfx = EmoteGfx::init(config, callbacks)?;
//!
//! let frames = vec![Frame::solid(32, 32, 0xF800), Frame::solid(32, 32, 0x07E0)];
//! let sprite = Sprite::new(frames, 12)?;
//! let id = gfx.add_object(104, 104, Box::new(sprite));
//! gfx.with_content::<Sprite, _>(id, |sprite| sprite.timeline_mut().play())?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod anim;
pub mod area;
pub mod color;
pub mod core;
pub mod object;
pub mod render;

pub use anim::{Frame, PlayerEvent, Sprite, Timeline};
pub use area::Area;
pub use color::Color;
pub use self::core::{
    Callbacks, CoreConfig, CoreGuard, DisplayHandle, EmoteGfx, FlushCallback, ThreadConfig,
    UpdateCallback, DEFAULT_FPS,
};
pub use object::{Content, ContentUpdate, ObjectId};
pub use render::{Canvas, RenderStats};

use thiserror::Error;

/// Errors reported by the engine
#[derive(Error, Debug)]
pub enum GfxError {
    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation referenced an object that is not registered
    #[error("Object not found: {0:?}")]
    ObjectNotFound(ObjectId),

    /// Drawable content rejected its input
    #[error("Content error: {0}")]
    Content(String),

    /// I/O error, e.g. spawning the render thread
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for GfxError {
    fn from(s: String) -> Self {
        GfxError::Other(s)
    }
}

impl From<&str> for GfxError {
    fn from(s: &str) -> Self {
        GfxError::Other(s.to_string())
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, GfxError>;
