//! Drawable object registry types
//!
//! Objects are what the render loop draws: a screen position, a size, a
//! visibility flag and a [`Content`] implementation. The engine owns all
//! objects; callers keep an [`ObjectId`] and mutate through the engine so
//! every change goes through the shared state lock and invalidates the
//! affected screen region.

use crate::anim::PlayerEvent;
use crate::area::Area;
use crate::render::Canvas;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::time::Duration;

/// Identifier of an object registered with the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub(crate) u64);

/// Outcome of a content update tick
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentUpdate {
    /// Playback event to report through the update callback
    pub event: Option<PlayerEvent>,
    /// Content changed and its bounds must be redrawn
    pub dirty: bool,
}

impl ContentUpdate {
    /// An update with nothing to report
    pub fn none() -> Self {
        ContentUpdate::default()
    }
}

/// Content drawn by the engine within an object's bounds
///
/// Implementations supply the pixels; the engine handles dirty tracking,
/// band splitting and the flush handoff. `update` is called once per
/// engine tick while the object is visible, `draw` once per rendered band
/// that intersects the object.
pub trait Content: Send {
    /// Natural pixel size of the content
    fn size(&self) -> (u16, u16);

    /// Advance internal playback state by `elapsed` wall time
    fn update(&mut self, elapsed: Duration) -> ContentUpdate;

    /// Draw into `canvas`; `bounds` is the object's screen-space rectangle
    ///
    /// The canvas covers one band of the screen and clips automatically,
    /// so implementations can draw their full frame unconditionally.
    fn draw(&mut self, bounds: Area, canvas: &mut Canvas<'_>);

    /// Downcasting access for typed mutation through the engine
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// An object in the engine's draw list
pub(crate) struct Object {
    pub(crate) id: ObjectId,
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) visible: bool,
    pub(crate) dirty: bool,
    pub(crate) content: Box<dyn Content>,
}

impl Object {
    pub(crate) fn new(id: ObjectId, x: i32, y: i32, content: Box<dyn Content>) -> Self {
        let (width, height) = content.size();
        Object {
            id,
            x,
            y,
            width,
            height,
            visible: true,
            dirty: true,
            content,
        }
    }

    /// Screen-space bounding rectangle
    pub(crate) fn bounds(&self) -> Area {
        Area::from_size(self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Canvas;

    struct Fixed;

    impl Content for Fixed {
        fn size(&self) -> (u16, u16) {
            (8, 4)
        }

        fn update(&mut self, _elapsed: Duration) -> ContentUpdate {
            ContentUpdate::none()
        }

        fn draw(&mut self, _bounds: Area, _canvas: &mut Canvas<'_>) {}

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_object_takes_content_size() {
        let obj = Object::new(ObjectId(1), 10, 20, Box::new(Fixed));
        assert_eq!(obj.bounds(), Area::new(10, 20, 17, 23));
        assert!(obj.visible);
        assert!(obj.dirty);
    }
}
