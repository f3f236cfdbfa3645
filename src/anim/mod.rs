//! Animation playback state machine
//!
//! A [`Timeline`] steps a frame index through a segment of frames at its
//! own frame rate, independent of the engine tick rate. Progress is
//! reported as [`PlayerEvent`]s: every advance yields `OneFrameDone`, and
//! reaching the end of the segment yields `AllFrameDone` before the
//! timeline either rewinds (repeat mode) or stops.
//!
//! [`Sprite`] is a ready-made drawable that pairs a timeline with a raw
//! RGB565 frame sequence.

mod sprite;

pub use sprite::{Frame, Sprite};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback progress events reported through the update callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// No playback in progress
    Idle,
    /// A frame other than the last one finished
    OneFrameDone,
    /// The last frame of the segment finished
    AllFrameDone,
}

/// Frame-index playback state machine
///
/// The segment is a pair of inclusive frame indices. A tick advances at
/// most one frame, once the accumulated elapsed time reaches the frame
/// period.
#[derive(Debug, Clone)]
pub struct Timeline {
    start_frame: u32,
    end_frame: u32,
    current_frame: u32,
    repeat: bool,
    playing: bool,
    frame_period: Duration,
    elapsed: Duration,
    last_event: PlayerEvent,
}

impl Timeline {
    /// Create a timeline over `total_frames` frames stepping at `fps`
    ///
    /// The segment is initialized to the full range. The timeline starts
    /// out stopped; call [`play`](Self::play) to begin.
    pub fn new(total_frames: u32, fps: u32) -> Self {
        let end = total_frames.saturating_sub(1);
        Timeline {
            start_frame: 0,
            end_frame: end,
            current_frame: 0,
            repeat: false,
            playing: false,
            frame_period: Self::period_for(fps),
            elapsed: Duration::ZERO,
            last_event: PlayerEvent::Idle,
        }
    }

    fn period_for(fps: u32) -> Duration {
        Duration::from_millis(1000 / fps.max(1) as u64)
    }

    /// Restrict playback to the inclusive frame range `[start, end]`
    ///
    /// The current frame is clamped into the new segment.
    pub fn set_segment(&mut self, start: u32, end: u32) {
        self.start_frame = start.min(end);
        self.end_frame = end.max(start);
        self.current_frame = self.current_frame.clamp(self.start_frame, self.end_frame);
    }

    /// Set the frame rate at which the timeline advances
    pub fn set_fps(&mut self, fps: u32) {
        self.frame_period = Self::period_for(fps);
    }

    /// Enable or disable looping back to the segment start
    pub fn set_repeat(&mut self, repeat: bool) {
        self.repeat = repeat;
    }

    /// Start or resume playback
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Pause playback, keeping the current frame
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Stop playback and rewind to the segment start
    pub fn stop(&mut self) {
        self.playing = false;
        self.current_frame = self.start_frame;
        self.elapsed = Duration::ZERO;
        self.last_event = PlayerEvent::Idle;
    }

    /// Whether the timeline is currently advancing
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Current frame index
    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    /// Segment as an inclusive `(start, end)` pair
    pub fn segment(&self) -> (u32, u32) {
        (self.start_frame, self.end_frame)
    }

    /// Most recent playback event
    ///
    /// `Idle` before the first frame advance and after [`stop`](Self::stop);
    /// otherwise the event the last advance produced. Pausing keeps the
    /// last event. Use [`is_playing`](Self::is_playing) to query whether
    /// the timeline is advancing.
    pub fn state(&self) -> PlayerEvent {
        self.last_event
    }

    /// Advance the timeline by `elapsed` wall time
    ///
    /// Returns the progress event for this tick, or `None` when the frame
    /// period has not elapsed yet or the timeline is not playing.
    pub fn tick(&mut self, elapsed: Duration) -> Option<PlayerEvent> {
        if !self.playing {
            return None;
        }

        self.elapsed += elapsed;
        if self.elapsed < self.frame_period {
            return None;
        }
        self.elapsed -= self.frame_period;

        let event = if self.current_frame >= self.end_frame {
            if self.repeat {
                self.current_frame = self.start_frame;
            } else {
                self.playing = false;
            }
            PlayerEvent::AllFrameDone
        } else {
            self.current_frame += 1;
            PlayerEvent::OneFrameDone
        };
        self.last_event = event;
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(timeline: &mut Timeline) -> Option<PlayerEvent> {
        // One full frame period per tick
        timeline.tick(Duration::from_millis(1000 / 25))
    }

    #[test]
    fn test_timeline_stopped_by_default() {
        let mut timeline = Timeline::new(4, 25);
        assert!(!timeline.is_playing());
        assert_eq!(timeline.state(), PlayerEvent::Idle);
        assert_eq!(step(&mut timeline), None);
    }

    #[test]
    fn test_one_shot_event_order() {
        let mut timeline = Timeline::new(3, 25);
        timeline.play();

        assert_eq!(step(&mut timeline), Some(PlayerEvent::OneFrameDone));
        assert_eq!(step(&mut timeline), Some(PlayerEvent::OneFrameDone));
        assert_eq!(step(&mut timeline), Some(PlayerEvent::AllFrameDone));
        assert!(!timeline.is_playing());
        assert_eq!(step(&mut timeline), None);
    }

    #[test]
    fn test_repeat_rewinds_to_segment_start() {
        let mut timeline = Timeline::new(2, 25);
        timeline.set_repeat(true);
        timeline.play();

        assert_eq!(step(&mut timeline), Some(PlayerEvent::OneFrameDone));
        assert_eq!(step(&mut timeline), Some(PlayerEvent::AllFrameDone));
        assert_eq!(timeline.current_frame(), 0);
        assert!(timeline.is_playing());
        assert_eq!(step(&mut timeline), Some(PlayerEvent::OneFrameDone));
    }

    #[test]
    fn test_sub_period_ticks_accumulate() {
        let mut timeline = Timeline::new(2, 25); // 40ms frame period
        timeline.play();

        assert_eq!(timeline.tick(Duration::from_millis(15)), None);
        assert_eq!(timeline.tick(Duration::from_millis(15)), None);
        assert_eq!(
            timeline.tick(Duration::from_millis(15)),
            Some(PlayerEvent::OneFrameDone)
        );
    }

    #[test]
    fn test_segment_clamps_current_frame() {
        let mut timeline = Timeline::new(10, 25);
        timeline.play();
        for _ in 0..5 {
            step(&mut timeline);
        }
        assert_eq!(timeline.current_frame(), 5);

        timeline.set_segment(1, 3);
        assert_eq!(timeline.current_frame(), 3);
        assert_eq!(step(&mut timeline), Some(PlayerEvent::AllFrameDone));
    }

    #[test]
    fn test_stop_rewinds() {
        let mut timeline = Timeline::new(5, 25);
        timeline.play();
        step(&mut timeline);
        step(&mut timeline);
        assert_eq!(timeline.current_frame(), 2);

        timeline.stop();
        assert_eq!(timeline.current_frame(), 0);
        assert_eq!(timeline.state(), PlayerEvent::Idle);
    }

    #[test]
    fn test_state_tracks_last_event() {
        let mut timeline = Timeline::new(2, 25);
        timeline.play();
        // Playing but not yet advanced
        assert_eq!(timeline.state(), PlayerEvent::Idle);

        step(&mut timeline);
        assert_eq!(timeline.state(), PlayerEvent::OneFrameDone);

        timeline.pause();
        assert_eq!(timeline.state(), PlayerEvent::OneFrameDone);
        timeline.play();

        step(&mut timeline);
        assert_eq!(timeline.state(), PlayerEvent::AllFrameDone);

        timeline.stop();
        assert_eq!(timeline.state(), PlayerEvent::Idle);
    }

    #[test]
    fn test_single_frame_timeline() {
        let mut timeline = Timeline::new(1, 25);
        timeline.play();
        assert_eq!(step(&mut timeline), Some(PlayerEvent::AllFrameDone));
        assert!(!timeline.is_playing());
    }
}
