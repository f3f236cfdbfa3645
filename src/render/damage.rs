//! Dirty-area bookkeeping
//!
//! Tracks the screen regions that must be redrawn on the next render pass.
//! The list is bounded: once it overflows, the whole screen is marked
//! dirty instead. A merge pass joins overlapping areas, but only when the
//! bounding box covers fewer pixels than the two areas separately, so
//! merging never increases the amount of rendering done.

use crate::area::Area;
use log::{debug, warn};

/// Maximum number of simultaneously tracked dirty areas
pub(crate) const MAX_DIRTY_AREAS: usize = 16;

/// Bounded dirty-rectangle list for one screen
#[derive(Debug)]
pub(crate) struct DamageTracker {
    areas: Vec<Area>,
    merged: Vec<bool>,
    screen: Area,
}

impl DamageTracker {
    pub(crate) fn new(h_res: u32, v_res: u32) -> Self {
        DamageTracker {
            areas: Vec::with_capacity(MAX_DIRTY_AREAS),
            merged: vec![false; MAX_DIRTY_AREAS],
            screen: Area::new(0, 0, h_res as i32 - 1, v_res as i32 - 1),
        }
    }

    /// Record a dirty region, clipped to the screen
    ///
    /// Regions already covered by an existing entry are dropped. On
    /// overflow the whole list collapses into a single full-screen entry.
    pub(crate) fn add(&mut self, area: Area) {
        let clipped = match area.intersect(&self.screen) {
            Some(clipped) => clipped,
            None => {
                debug!("dirty area out of screen bounds: {:?}", area);
                return;
            }
        };

        if self.areas.iter().any(|existing| existing.contains(&clipped)) {
            return;
        }

        if self.areas.len() < MAX_DIRTY_AREAS {
            self.areas.push(clipped);
        } else {
            warn!("dirty area list full, marking entire screen dirty");
            self.areas.clear();
            self.areas.push(self.screen);
        }
    }

    /// Mark the whole screen dirty
    pub(crate) fn add_all(&mut self) {
        self.areas.clear();
        self.areas.push(self.screen);
        self.merged.iter_mut().for_each(|m| *m = false);
    }

    /// Drop all tracked regions
    pub(crate) fn clear(&mut self) {
        self.areas.clear();
        self.merged.iter_mut().for_each(|m| *m = false);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub(crate) fn count(&self) -> usize {
        self.areas.len()
    }

    /// Join overlapping areas when the union is smaller than the parts
    pub(crate) fn merge(&mut self) {
        self.merged.iter_mut().for_each(|m| *m = false);

        for dst in 0..self.areas.len() {
            if self.merged[dst] {
                continue;
            }

            for src in 0..self.areas.len() {
                if self.merged[src] || dst == src {
                    continue;
                }

                if !self.areas[dst].overlaps(&self.areas[src]) {
                    continue;
                }

                let joined = self.areas[dst].join(&self.areas[src]);
                let separate = self.areas[dst].size() + self.areas[src].size();

                if joined.size() < separate {
                    debug!(
                        "merged dirty area [{}] into [{}], saved {} pixels",
                        src,
                        dst,
                        separate - joined.size()
                    );
                    self.areas[dst] = joined;
                    self.merged[src] = true;
                }
            }
        }
    }

    /// Areas that survived the last merge pass
    pub(crate) fn live(&self) -> impl Iterator<Item = &Area> + '_ {
        self.areas
            .iter()
            .enumerate()
            .filter(move |(i, _)| !self.merged[*i])
            .map(|(_, area)| area)
    }

    /// Total pixels covered by the live areas
    pub(crate) fn total_pixels(&self) -> u32 {
        self.live().map(Area::size).sum()
    }
}
