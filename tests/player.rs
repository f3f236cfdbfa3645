//! End-to-end player tests with a running render loop
//!
//! These drive a real engine instance against an in-memory "display":
//! the flush callback records every band it receives and immediately
//! signals completion, standing in for a display driver.

use emote_gfx::{
    Area, Callbacks, Color, CoreConfig, EmoteGfx, Frame, ObjectId, PlayerEvent, Sprite,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SCREEN: u32 = 16;

#[derive(Clone)]
struct FlushRecord {
    area: Area,
    pixels: Vec<u16>,
    last: bool,
}

#[derive(Default)]
struct Display {
    flushes: Mutex<Vec<FlushRecord>>,
    events: Mutex<Vec<(PlayerEvent, ObjectId)>>,
}

fn start_engine(display: &Arc<Display>) -> EmoteGfx {
    let _ = env_logger::builder().is_test(true).try_init();

    let flush_display = Arc::clone(display);
    let event_display = Arc::clone(display);
    let callbacks = Callbacks {
        flush: Some(Box::new(move |handle, area, pixels| {
            flush_display.flushes.lock().push(FlushRecord {
                area,
                pixels: pixels.to_vec(),
                last: handle.is_flushing_last(),
            });
            handle.flush_ready(false);
        })),
        update: Some(Box::new(move |_handle, event, id| {
            event_display.events.lock().push((event, id));
        })),
        ..Callbacks::default()
    };

    let mut config = CoreConfig::new(SCREEN, SCREEN);
    config.fps = 60;
    EmoteGfx::init(config, callbacks).unwrap()
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

fn solid_sprite(frame_values: &[u16], fps: u32) -> Sprite {
    let frames = frame_values
        .iter()
        .map(|&raw| Frame::solid(4, 4, raw))
        .collect();
    Sprite::new(frames, fps).unwrap()
}

#[test]
fn test_one_shot_playback_event_order() {
    let display = Arc::new(Display::default());
    let gfx = start_engine(&display);

    let id = gfx.add_object(0, 0, Box::new(solid_sprite(&[0x1111, 0x2222, 0x3333], 30)));
    gfx.with_content::<Sprite, _>(id, |sprite| sprite.timeline_mut().play())
        .unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        display
            .events
            .lock()
            .iter()
            .any(|(event, _)| *event == PlayerEvent::AllFrameDone)
    }));
    // Let a few more ticks pass; a stopped timeline must emit nothing.
    std::thread::sleep(Duration::from_millis(100));
    gfx.deinit();

    let events = display.events.lock();
    let expected = vec![
        (PlayerEvent::OneFrameDone, id),
        (PlayerEvent::OneFrameDone, id),
        (PlayerEvent::AllFrameDone, id),
    ];
    assert_eq!(*events, expected);
}

#[test]
fn test_repeat_playback_loops() {
    let display = Arc::new(Display::default());
    let gfx = start_engine(&display);

    let id = gfx.add_object(4, 4, Box::new(solid_sprite(&[0xAAAA, 0xBBBB], 50)));
    gfx.with_content::<Sprite, _>(id, |sprite| {
        sprite.timeline_mut().set_repeat(true);
        sprite.timeline_mut().play();
    })
    .unwrap();

    assert!(wait_until(Duration::from_secs(3), || {
        display
            .events
            .lock()
            .iter()
            .filter(|(event, _)| *event == PlayerEvent::AllFrameDone)
            .count()
            >= 2
    }));

    assert!(gfx
        .with_content::<Sprite, _>(id, |sprite| sprite.timeline().is_playing())
        .unwrap());
    gfx.deinit();

    let events = display.events.lock();
    assert_eq!(
        events[..3],
        [
            (PlayerEvent::OneFrameDone, id),
            (PlayerEvent::AllFrameDone, id),
            (PlayerEvent::OneFrameDone, id),
        ]
    );
}

#[test]
fn test_initial_pass_paints_background() {
    let display = Arc::new(Display::default());
    let gfx = start_engine(&display);

    // No objects and no invalidation; the engine paints on its own.
    assert!(wait_until(Duration::from_secs(2), || {
        !display.flushes.lock().is_empty()
    }));
    gfx.deinit();

    let flushes = display.flushes.lock();
    let first = &flushes[0];
    assert_eq!(first.area, Area::from_size(0, 0, SCREEN as u16, SCREEN as u16));
    assert!(first.pixels.iter().all(|&px| px == Color::BLACK.raw()));
    assert!(first.last);
}

#[test]
fn test_flush_delivers_bg_and_sprite_pixels() {
    let display = Arc::new(Display::default());
    let gfx = start_engine(&display);
    assert_eq!(gfx.screen_size(), (SCREEN, SCREEN));

    gfx.set_bg_color(Color::from_raw(0x1234));
    gfx.add_object(2, 3, Box::new(solid_sprite(&[0xABCD], 10)));
    gfx.invalidate_all();

    // The startup paint may predate the bg color and the sprite, so match
    // on content as well as coverage.
    let full_screen = Area::from_size(0, 0, SCREEN as u16, SCREEN as u16);
    let settled = |record: &FlushRecord| {
        record.area == full_screen
            && record.pixels[0] == 0x1234
            && record.pixels[3 * SCREEN as usize + 2] == 0xABCD
    };
    assert!(wait_until(Duration::from_secs(2), || {
        display.flushes.lock().iter().any(|record| settled(record))
    }));
    gfx.deinit();

    let flushes = display.flushes.lock();
    let record = flushes.iter().find(|record| settled(record)).unwrap();
    assert_eq!(record.pixels.len(), (SCREEN * SCREEN) as usize);
    // Sprite covers (2,3)..(5,6); everything else is background.
    assert_eq!(record.pixels[6 * SCREEN as usize + 5], 0xABCD);
    assert_eq!(record.pixels[(SCREEN * SCREEN - 1) as usize], 0x1234);
    // A single-band pass flags the band as the final one.
    assert!(record.last);
}

#[test]
fn test_banded_rendering_splits_large_areas() {
    let display = Arc::new(Display::default());

    let _ = env_logger::builder().is_test(true).try_init();
    let flush_display = Arc::clone(&display);
    let callbacks = Callbacks {
        flush: Some(Box::new(move |handle, area, pixels| {
            flush_display.flushes.lock().push(FlushRecord {
                area,
                pixels: pixels.to_vec(),
                last: handle.is_flushing_last(),
            });
            handle.flush_ready(false);
        })),
        ..Callbacks::default()
    };

    let mut config = CoreConfig::new(SCREEN, SCREEN);
    config.fps = 60;
    // Four rows per band forces a full-screen pass into four chunks.
    config.buf_pixels = Some((SCREEN * 4) as usize);
    let gfx = EmoteGfx::init(config, callbacks).unwrap();

    gfx.invalidate_all();
    assert!(wait_until(Duration::from_secs(2), || {
        display.flushes.lock().len() >= 4
    }));

    let stats = gfx.stats();
    assert!(stats.frames_rendered >= 1);
    assert!(stats.flushes >= 4);
    approx::assert_relative_eq!(stats.last_dirty_percentage, 100.0, epsilon = 0.01);
    gfx.deinit();

    let flushes = display.flushes.lock();
    let bands: Vec<&FlushRecord> = flushes.iter().take(4).collect();
    for (i, band) in bands.iter().enumerate() {
        assert_eq!(band.area.y1, i as i32 * 4);
        assert_eq!(band.area.y2, i as i32 * 4 + 3);
        assert_eq!(band.pixels.len(), (SCREEN * 4) as usize);
        assert_eq!(band.last, i == 3);
    }
}

#[test]
fn test_double_buffer_swaps_on_async_completion() {
    let _ = env_logger::builder().is_test(true).try_init();
    let display = Arc::new(Display::default());
    // Buffer addresses observed by the flush callback, to track which
    // working buffer each band came from.
    let buffer_ptrs = Arc::new(Mutex::new(Vec::new()));

    let flush_display = Arc::clone(&display);
    let flush_ptrs = Arc::clone(&buffer_ptrs);
    let callbacks = Callbacks {
        flush: Some(Box::new(move |handle, area, pixels| {
            flush_display.flushes.lock().push(FlushRecord {
                area,
                pixels: pixels.to_vec(),
                last: handle.is_flushing_last(),
            });
            flush_ptrs.lock().push(pixels.as_ptr() as usize);
            // Complete the transfer from another thread, the way a DMA
            // completion handler would, requesting a buffer swap.
            let completion = handle.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(2));
                completion.flush_ready(true);
            });
        })),
        ..Callbacks::default()
    };

    let mut config = CoreConfig::new(SCREEN, SCREEN);
    config.fps = 60;
    config.double_buffer = true;
    config.buf_pixels = Some((SCREEN * 4) as usize);
    let gfx = EmoteGfx::init(config, callbacks).unwrap();

    assert!(wait_until(Duration::from_secs(2), || {
        buffer_ptrs.lock().len() >= 4
    }));
    gfx.deinit();

    // A swap after every band alternates between the two working buffers.
    let ptrs = buffer_ptrs.lock();
    assert_ne!(ptrs[0], ptrs[1]);
    assert_eq!(ptrs[0], ptrs[2]);
    assert_eq!(ptrs[1], ptrs[3]);

    // Band content is unaffected by the swaps.
    let flushes = display.flushes.lock();
    for (i, band) in flushes.iter().take(4).enumerate() {
        assert_eq!(band.area.y1, i as i32 * 4);
        assert_eq!(band.pixels.len(), (SCREEN * 4) as usize);
        assert!(band.pixels.iter().all(|&px| px == Color::BLACK.raw()));
    }
}

#[test]
fn test_user_data_reaches_callbacks() {
    let _ = env_logger::builder().is_test(true).try_init();
    let seen = Arc::new(Mutex::new(None::<String>));
    let seen_in_cb = Arc::clone(&seen);

    let callbacks = Callbacks {
        flush: Some(Box::new(move |handle, _area, _pixels| {
            if let Some(data) = handle.user_data() {
                if let Some(tag) = data.downcast_ref::<String>() {
                    *seen_in_cb.lock() = Some(tag.clone());
                }
            }
            handle.flush_ready(false);
        })),
        user_data: Some(Arc::new("panel-0".to_string())),
        ..Callbacks::default()
    };

    let gfx = EmoteGfx::init(CoreConfig::new(8, 8), callbacks).unwrap();
    gfx.invalidate_all();
    assert!(wait_until(Duration::from_secs(2), || seen.lock().is_some()));
    gfx.deinit();

    assert_eq!(seen.lock().as_deref(), Some("panel-0"));
}
