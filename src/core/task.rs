//! Background render loop
//!
//! One tick per frame period: advance every visible object's content,
//! collect the dirty regions they report, dispatch playback events, then
//! run a render pass over the accumulated damage. The loop sleeps for the
//! remainder of the period, so a slow pass lowers the achieved rate
//! instead of queueing up ticks.

use super::{CoreState, DisplayHandle, Inner};
use crate::anim::PlayerEvent;
use crate::core::sync::SyncBits;
use crate::object::ObjectId;
use crate::render;
use log::debug;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Ticks per achieved-fps sampling window
const FPS_WINDOW_TICKS: u32 = 100;

/// Minimum sleep between ticks so a saturated loop still yields
const MIN_TICK_DELAY: Duration = Duration::from_millis(1);

pub(crate) fn run(inner: Arc<Inner>) {
    let period = Duration::from_millis(1000 / inner.display.fps.max(1) as u64).max(MIN_TICK_DELAY);
    debug!(
        "render loop started: {}x{} @ {} fps",
        inner.display.h_res, inner.display.v_res, inner.display.fps
    );

    // The first pass paints the background over the whole screen.
    inner.state.lock().damage.add_all();

    let mut last_tick = Instant::now();
    let mut window_ticks = 0u32;
    let mut window_elapsed = Duration::ZERO;

    loop {
        if inner.sync.flags.take(SyncBits::SHUTDOWN) {
            break;
        }

        let tick_start = Instant::now();
        let elapsed = tick_start - last_tick;
        last_tick = tick_start;

        {
            let mut state = inner.state.lock();
            tick_objects(&mut state, &inner, elapsed);
            render::render_pass(&mut state, &inner);

            window_ticks += 1;
            window_elapsed += elapsed;
            if window_ticks >= FPS_WINDOW_TICKS {
                let millis = window_elapsed.as_millis() as u64;
                if millis > 0 {
                    state.stats.actual_fps = (u64::from(window_ticks) * 1000 / millis) as u32;
                }
                window_ticks = 0;
                window_elapsed = Duration::ZERO;
            }
        }

        thread::sleep(tick_delay(period, tick_start.elapsed()));
    }

    debug!("render loop stopped");
}

/// Advance object contents and dispatch the playback events they emit
///
/// Events are dispatched after the update sweep so the callback observes
/// every object's post-tick state.
fn tick_objects(state: &mut CoreState, inner: &Arc<Inner>, elapsed: Duration) {
    let CoreState {
        objects,
        callbacks,
        damage,
        ..
    } = state;

    let mut events: Vec<(PlayerEvent, ObjectId)> = Vec::new();
    for obj in objects.iter_mut() {
        if !obj.visible {
            continue;
        }
        let update = obj.content.update(elapsed);
        if update.dirty {
            obj.dirty = true;
            damage.add(obj.bounds());
        }
        if let Some(event) = update.event {
            events.push((event, obj.id));
        }
    }

    if events.is_empty() {
        return;
    }
    if let Some(update_cb) = callbacks.update.as_mut() {
        let handle = DisplayHandle::new(Arc::clone(inner));
        for (event, id) in events {
            update_cb(&handle, event, id);
        }
    }
}

/// Sleep needed to keep the loop on `period`, never below the minimum
fn tick_delay(period: Duration, spent: Duration) -> Duration {
    period.saturating_sub(spent).max(MIN_TICK_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_delay_fills_remaining_period() {
        let delay = tick_delay(Duration::from_millis(33), Duration::from_millis(10));
        assert_eq!(delay, Duration::from_millis(23));
    }

    #[test]
    fn test_tick_delay_has_floor_when_overrun() {
        let delay = tick_delay(Duration::from_millis(33), Duration::from_millis(50));
        assert_eq!(delay, MIN_TICK_DELAY);
    }
}
