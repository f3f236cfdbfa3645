//! Player core facade
//!
//! [`EmoteGfx`] owns the engine state and a background render loop that
//! ticks at the configured frame rate. All state sits behind one mutex:
//! user operations and the render tick serialize on it, and
//! [`EmoteGfx::lock`] exposes the same lock as a guard for compound
//! operations (move several objects, then let one pass render the result).
//!
//! The flush handoff is asynchronous: the render loop delivers a band to
//! the flush callback and waits until [`flush_ready`](DisplayHandle::flush_ready)
//! is signalled, either from inside the callback or later from the
//! display driver's completion interrupt context.

pub mod config;
pub(crate) mod sync;
mod task;

pub use config::{CoreConfig, ThreadConfig, DEFAULT_FPS};

use crate::anim::PlayerEvent;
use crate::area::Area;
use crate::color::Color;
use crate::object::{Content, Object, ObjectId};
use crate::render::{DamageTracker, FrameBuffers, RenderStats};
use crate::{GfxError, Result};
use log::error;
use parking_lot::{Mutex, MutexGuard};
use std::any::Any;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;

use sync::{SyncBits, SyncState};

/// Flush callback: deliver one rendered band to the display
///
/// Receives the band's screen area and its RGB565 pixels. The render loop
/// blocks until [`DisplayHandle::flush_ready`] is called, so transfers may
/// complete asynchronously.
pub type FlushCallback = Box<dyn FnMut(&DisplayHandle, Area, &[u16]) + Send>;

/// Update callback: playback progress notification for one object
pub type UpdateCallback = Box<dyn FnMut(&DisplayHandle, PlayerEvent, ObjectId) + Send>;

/// Callback bundle passed to [`EmoteGfx::init`]
///
/// Callbacks run on the render thread while it holds the engine state
/// lock. Do not call [`EmoteGfx`] state operations from inside them; use
/// the [`DisplayHandle`] they receive, which only touches lock-free state.
#[derive(Default)]
pub struct Callbacks {
    /// Band delivery callback
    pub flush: Option<FlushCallback>,
    /// Playback progress callback
    pub update: Option<UpdateCallback>,
    /// Opaque per-instance data, retrievable via `user_data`
    pub user_data: Option<Arc<dyn Any + Send + Sync>>,
}

/// Installed callbacks, kept inside the state lock
pub(crate) struct CallbackSet {
    pub(crate) flush: Option<FlushCallback>,
    pub(crate) update: Option<UpdateCallback>,
}

/// Immutable display parameters
pub(crate) struct DisplayInfo {
    pub(crate) h_res: u32,
    pub(crate) v_res: u32,
    pub(crate) fps: u32,
    pub(crate) swap_bytes: bool,
}

/// Mutex-guarded engine state
pub(crate) struct CoreState {
    pub(crate) objects: Vec<Object>,
    pub(crate) next_id: u64,
    pub(crate) bg_color: Color,
    pub(crate) damage: DamageTracker,
    pub(crate) buffers: FrameBuffers,
    pub(crate) callbacks: CallbackSet,
    pub(crate) stats: RenderStats,
}

/// State shared between the handle, the render loop and callbacks
pub(crate) struct Inner {
    pub(crate) state: Mutex<CoreState>,
    pub(crate) sync: SyncState,
    pub(crate) display: DisplayInfo,
    pub(crate) user_data: Option<Arc<dyn Any + Send + Sync>>,
}

/// Lightweight handle passed to callbacks and display completion paths
///
/// Only touches lock-free state, so it is safe to use while a render pass
/// holds the engine state lock (the situation inside every callback) and
/// from other threads such as a transfer-complete interrupt handler.
#[derive(Clone)]
pub struct DisplayHandle {
    inner: Arc<Inner>,
}

impl DisplayHandle {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        DisplayHandle { inner }
    }

    /// Signal that the display consumed the flushed band
    ///
    /// `swap_active` requests an active-buffer swap before the next band;
    /// it only takes effect when double buffering is configured.
    pub fn flush_ready(&self, swap_active: bool) {
        self.inner
            .sync
            .swap_requested
            .store(swap_active, Ordering::Release);
        self.inner.sync.flags.set(SyncBits::FLUSH_DONE);
    }

    /// Whether the band being flushed is the final one of the render pass
    pub fn is_flushing_last(&self) -> bool {
        self.inner.sync.flushing_last.load(Ordering::Acquire)
    }

    /// Screen size as `(width, height)`
    pub fn screen_size(&self) -> (u32, u32) {
        (self.inner.display.h_res, self.inner.display.v_res)
    }

    /// Opaque per-instance data supplied at init
    pub fn user_data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.inner.user_data.clone()
    }
}

/// Handle to a running player core
///
/// Dropping the handle shuts the render loop down; [`deinit`](Self::deinit)
/// does the same explicitly.
pub struct EmoteGfx {
    inner: Arc<Inner>,
    thread: Option<JoinHandle<()>>,
}

impl EmoteGfx {
    /// Validate `config`, allocate buffers and start the render loop
    pub fn init(config: CoreConfig, callbacks: Callbacks) -> Result<Self> {
        config.validate()?;

        let Callbacks {
            flush,
            update,
            user_data,
        } = callbacks;

        let state = CoreState {
            objects: Vec::new(),
            next_id: 1,
            bg_color: Color::BLACK,
            damage: DamageTracker::new(config.h_res, config.v_res),
            buffers: FrameBuffers::new(config.effective_buf_pixels(), config.double_buffer),
            callbacks: CallbackSet { flush, update },
            stats: RenderStats::default(),
        };

        let inner = Arc::new(Inner {
            state: Mutex::new(state),
            sync: SyncState::new(),
            display: DisplayInfo {
                h_res: config.h_res,
                v_res: config.v_res,
                fps: config.fps,
                swap_bytes: config.swap_bytes,
            },
            user_data,
        });

        let mut builder = std::thread::Builder::new().name(config.thread.name.clone());
        if let Some(stack_size) = config.thread.stack_size {
            builder = builder.stack_size(stack_size);
        }
        let loop_inner = Arc::clone(&inner);
        let thread = builder.spawn(move || task::run(loop_inner))?;

        Ok(EmoteGfx {
            inner,
            thread: Some(thread),
        })
    }

    /// Stop the render loop and release the engine
    pub fn deinit(mut self) {
        self.shutdown();
    }

    /// Handle for callbacks and display completion paths
    pub fn handle(&self) -> DisplayHandle {
        DisplayHandle::new(Arc::clone(&self.inner))
    }

    /// Acquire the engine state lock for compound operations
    ///
    /// The render loop takes the same lock once per tick, so nothing
    /// renders while the guard is held.
    pub fn lock(&self) -> CoreGuard<'_> {
        CoreGuard {
            state: self.inner.state.lock(),
        }
    }

    /// Screen size as `(width, height)`
    pub fn screen_size(&self) -> (u32, u32) {
        (self.inner.display.h_res, self.inner.display.v_res)
    }

    /// Opaque per-instance data supplied at init
    pub fn user_data(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.inner.user_data.clone()
    }

    /// Signal flush completion; see [`DisplayHandle::flush_ready`]
    pub fn flush_ready(&self, swap_active: bool) {
        self.handle().flush_ready(swap_active)
    }

    /// Whether the band being flushed is the final one of the render pass
    pub fn is_flushing_last(&self) -> bool {
        self.handle().is_flushing_last()
    }

    /// Background color used for the next render pass
    pub fn set_bg_color(&self, color: Color) {
        self.lock().set_bg_color(color)
    }

    /// Register a drawable at screen position `(x, y)`
    ///
    /// The object takes its size from the content and starts visible.
    pub fn add_object(&self, x: i32, y: i32, content: Box<dyn Content>) -> ObjectId {
        self.lock().add_object(x, y, content)
    }

    /// Remove an object, invalidating the region it covered
    pub fn remove_object(&self, id: ObjectId) -> Result<()> {
        self.lock().remove_object(id)
    }

    /// Move an object, invalidating both the old and the new region
    pub fn set_position(&self, id: ObjectId, x: i32, y: i32) -> Result<()> {
        self.lock().set_position(id, x, y)
    }

    /// Show or hide an object
    pub fn set_visible(&self, id: ObjectId, visible: bool) -> Result<()> {
        self.lock().set_visible(id, visible)
    }

    /// Mutate an object's content with typed access
    ///
    /// The object is invalidated afterwards, so timeline control like
    /// starting playback takes effect on the next pass.
    pub fn with_content<C, R>(&self, id: ObjectId, f: impl FnOnce(&mut C) -> R) -> Result<R>
    where
        C: Content + 'static,
    {
        self.lock().with_content(id, f)
    }

    /// Mark a screen region dirty
    pub fn invalidate(&self, area: Area) {
        self.lock().invalidate(area)
    }

    /// Mark the whole screen dirty
    pub fn invalidate_all(&self) {
        self.lock().invalidate_all()
    }

    /// Snapshot of the render-loop statistics
    pub fn stats(&self) -> RenderStats {
        self.lock().stats()
    }

    fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.inner.sync.flags.set(SyncBits::SHUTDOWN);
            if thread.join().is_err() {
                error!("render loop panicked during shutdown");
            }
        }
    }
}

impl Drop for EmoteGfx {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Guard over the engine state lock
///
/// All object and screen mutations are available here; [`EmoteGfx`]
/// exposes per-call convenience wrappers that take the lock internally.
pub struct CoreGuard<'a> {
    state: MutexGuard<'a, CoreState>,
}

impl CoreGuard<'_> {
    /// Background color used for the next render pass
    pub fn set_bg_color(&mut self, color: Color) {
        self.state.bg_color = color;
    }

    /// Current background color
    pub fn bg_color(&self) -> Color {
        self.state.bg_color
    }

    /// Register a drawable at screen position `(x, y)`
    pub fn add_object(&mut self, x: i32, y: i32, content: Box<dyn Content>) -> ObjectId {
        let id = ObjectId(self.state.next_id);
        self.state.next_id += 1;

        let object = Object::new(id, x, y, content);
        let bounds = object.bounds();
        self.state.objects.push(object);
        self.state.damage.add(bounds);
        id
    }

    /// Remove an object, invalidating the region it covered
    pub fn remove_object(&mut self, id: ObjectId) -> Result<()> {
        let index = self
            .state
            .objects
            .iter()
            .position(|obj| obj.id == id)
            .ok_or(GfxError::ObjectNotFound(id))?;
        let object = self.state.objects.remove(index);
        self.state.damage.add(object.bounds());
        Ok(())
    }

    /// Move an object, invalidating both the old and the new region
    pub fn set_position(&mut self, id: ObjectId, x: i32, y: i32) -> Result<()> {
        let object = object_mut(&mut self.state.objects, id)?;
        let old_bounds = object.bounds();
        object.x = x;
        object.y = y;
        object.dirty = true;
        let new_bounds = object.bounds();
        self.state.damage.add(old_bounds);
        self.state.damage.add(new_bounds);
        Ok(())
    }

    /// Resize an object, invalidating both the old and the new region
    pub fn set_size(&mut self, id: ObjectId, width: u16, height: u16) -> Result<()> {
        let object = object_mut(&mut self.state.objects, id)?;
        let old_bounds = object.bounds();
        object.width = width;
        object.height = height;
        object.dirty = true;
        let new_bounds = object.bounds();
        self.state.damage.add(old_bounds);
        self.state.damage.add(new_bounds);
        Ok(())
    }

    /// Show or hide an object
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> Result<()> {
        let object = object_mut(&mut self.state.objects, id)?;
        object.visible = visible;
        object.dirty = true;
        let bounds = object.bounds();
        self.state.damage.add(bounds);
        Ok(())
    }

    /// Whether an object is visible
    pub fn is_visible(&self, id: ObjectId) -> Result<bool> {
        self.state
            .objects
            .iter()
            .find(|obj| obj.id == id)
            .map(|obj| obj.visible)
            .ok_or(GfxError::ObjectNotFound(id))
    }

    /// Object position as `(x, y)`
    pub fn position(&self, id: ObjectId) -> Result<(i32, i32)> {
        self.state
            .objects
            .iter()
            .find(|obj| obj.id == id)
            .map(|obj| (obj.x, obj.y))
            .ok_or(GfxError::ObjectNotFound(id))
    }

    /// Mutate an object's content with typed access
    pub fn with_content<C, R>(&mut self, id: ObjectId, f: impl FnOnce(&mut C) -> R) -> Result<R>
    where
        C: Content + 'static,
    {
        let object = object_mut(&mut self.state.objects, id)?;
        let content = object
            .content
            .as_any_mut()
            .downcast_mut::<C>()
            .ok_or_else(|| GfxError::Content("content type mismatch".into()))?;
        let result = f(content);
        object.dirty = true;
        let bounds = object.bounds();
        self.state.damage.add(bounds);
        Ok(result)
    }

    /// Mark a screen region dirty
    pub fn invalidate(&mut self, area: Area) {
        self.state.damage.add(area);
    }

    /// Mark the whole screen dirty
    pub fn invalidate_all(&mut self) {
        self.state.damage.add_all();
    }

    /// Snapshot of the render-loop statistics
    pub fn stats(&self) -> RenderStats {
        self.state.stats
    }
}

fn object_mut(objects: &mut [Object], id: ObjectId) -> Result<&mut Object> {
    objects
        .iter_mut()
        .find(|obj| obj.id == id)
        .ok_or(GfxError::ObjectNotFound(id))
}
