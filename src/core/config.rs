//! Engine configuration
//!
//! Plain data only; callbacks are passed separately at init. The default
//! mirrors the reference defaults for the render-thread settings while
//! leaving the resolution to the caller.

use crate::{GfxError, Result};
use serde::{Deserialize, Serialize};

/// Default target frame rate
pub const DEFAULT_FPS: u32 = 30;

/// Render-thread settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadConfig {
    /// Thread name, visible in debuggers and panics
    pub name: String,
    /// Stack size in bytes; `None` uses the platform default
    pub stack_size: Option<usize>,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        ThreadConfig {
            name: "gfx-core".to_string(),
            stack_size: None,
        }
    }
}

/// Player core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Horizontal resolution in pixels
    pub h_res: u32,
    /// Vertical resolution in pixels
    pub v_res: u32,
    /// Target frame rate of the render loop
    pub fps: u32,
    /// Byte-swap rendered pixels for displays with swapped endianness
    pub swap_bytes: bool,
    /// Allocate two working buffers and alternate between them
    pub double_buffer: bool,
    /// Working buffer capacity in pixels; `None` covers the full screen
    ///
    /// Smaller buffers trade memory for more flush chunks per pass. The
    /// buffer must hold at least one full screen row.
    pub buf_pixels: Option<usize>,
    /// Render-thread settings
    pub thread: ThreadConfig,
}

impl CoreConfig {
    /// Configuration for a `h_res` x `v_res` screen with default settings
    pub fn new(h_res: u32, v_res: u32) -> Self {
        CoreConfig {
            h_res,
            v_res,
            fps: DEFAULT_FPS,
            swap_bytes: false,
            double_buffer: false,
            buf_pixels: None,
            thread: ThreadConfig::default(),
        }
    }

    /// Working buffer capacity in pixels after applying the default
    pub fn effective_buf_pixels(&self) -> usize {
        self.buf_pixels
            .unwrap_or(self.h_res as usize * self.v_res as usize)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.h_res == 0 || self.v_res == 0 {
            return Err(GfxError::Config(format!(
                "resolution must be non-zero, got {}x{}",
                self.h_res, self.v_res
            )));
        }
        if self.fps == 0 {
            return Err(GfxError::Config("fps must be non-zero".into()));
        }
        if self.effective_buf_pixels() < self.h_res as usize {
            return Err(GfxError::Config(format!(
                "working buffer of {} pixels cannot hold one {}-pixel row",
                self.effective_buf_pixels(),
                self.h_res
            )));
        }
        Ok(())
    }
}

impl Default for CoreConfig {
    /// Default settings with an unset resolution
    ///
    /// The resolution must be filled in before [`validate`](Self::validate)
    /// passes.
    fn default() -> Self {
        CoreConfig::new(0, 0)
    }
}
