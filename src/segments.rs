use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use libm::fabs;

use crate::gas::GasId;

/// Speeds closer than this (m/s) are reported as one leg.
const SPEED_TOLERANCE: f64 = 0.01;

/// One leg of the dive profile. Depths in meters, duration in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    pub start_depth: f64,
    pub end_depth: f64,
    pub gas: GasId,
    pub duration: u32,
}

impl Segment {
    pub fn new(start_depth: f64, end_depth: f64, gas: GasId, duration: u32) -> Self {
        Segment { start_depth, end_depth, gas, duration }
    }

    /// Depth change in m/s, positive when descending.
    pub fn speed(&self) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        (self.end_depth - self.start_depth) / self.duration as f64
    }

    pub fn average_depth(&self) -> f64 {
        (self.start_depth + self.end_depth) / 2.0
    }

    pub fn is_flat(&self) -> bool {
        self.start_depth == self.end_depth
    }

    /// Depth reached after `elapsed` seconds of this leg.
    pub fn depth_at(&self, elapsed: u32) -> f64 {
        if elapsed >= self.duration {
            return self.end_depth;
        }
        self.start_depth + self.speed() * elapsed as f64
    }

    fn continues_with(&self, other: &Segment) -> bool {
        self.gas == other.gas && fabs(self.speed() - other.speed()) < SPEED_TOLERANCE
    }
}

/// Ordered dive profile.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segments {
    items: Vec<Segment>,
}

impl Segments {
    pub fn new() -> Self {
        Segments { items: Vec::new() }
    }

    pub fn from_items(items: Vec<Segment>) -> Self {
        Segments { items }
    }

    pub fn add(&mut self, start_depth: f64, end_depth: f64, gas: GasId, duration: u32) -> Segment {
        let segment = Segment::new(start_depth, end_depth, gas, duration);
        self.items.push(segment);
        segment
    }

    /// Leg from the current depth to `end_depth`.
    pub fn add_change_to(&mut self, end_depth: f64, gas: GasId, duration: u32) -> Segment {
        self.add(self.current_depth(), end_depth, gas, duration)
    }

    pub fn add_flat(&mut self, depth: f64, gas: GasId, duration: u32) -> Segment {
        self.add(depth, depth, gas, duration)
    }

    /// Removes the leg and reconnects the following ones.
    pub fn remove(&mut self, index: usize) -> Option<Segment> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);
        self.fix_start_depths();
        Some(removed)
    }

    /// Each leg starts where the previous one ended, the first one at the surface.
    pub fn fix_start_depths(&mut self) {
        let mut last_end_depth = 0.0;
        for segment in self.items.iter_mut() {
            segment.start_depth = last_end_depth;
            last_end_depth = segment.end_depth;
        }
    }

    /// Cuts the tail, keeps first `len` legs.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    pub fn items(&self) -> &[Segment] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.items.last()
    }

    pub fn current_depth(&self) -> f64 {
        self.items.last().map_or(0.0, |s| s.end_depth)
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> u32 {
        self.items.iter().map(|s| s.duration).sum()
    }

    pub fn max_depth(&self) -> f64 {
        self.items
            .iter()
            .fold(0.0, |max, s| max.max(s.start_depth).max(s.end_depth))
    }

    /// Legs from the start up to the last one ending at the maximum depth.
    pub fn deepest_part(&self) -> &[Segment] {
        let max_depth = self.max_depth();
        let end = self
            .items
            .iter()
            .rposition(|s| s.end_depth == max_depth)
            .map_or(self.items.len(), |i| i + 1);
        &self.items[..end]
    }

    /// Time weighted average depth of the legs.
    pub fn average_depth(segments: &[Segment]) -> f64 {
        let duration: u32 = segments.iter().map(|s| s.duration).sum();
        if duration == 0 {
            return 0.0;
        }
        let weighted: f64 = segments.iter().map(|s| s.average_depth() * s.duration as f64).sum();
        weighted / duration as f64
    }

    /// Depth after `elapsed` seconds from the start of the profile.
    pub fn depth_at(&self, elapsed: u32) -> f64 {
        let mut remaining = elapsed;
        for segment in self.items.iter() {
            if remaining <= segment.duration {
                return segment.depth_at(remaining);
            }
            remaining -= segment.duration;
        }
        self.current_depth()
    }

    /// Copy for reporting, the first `start_index` legs are kept as they are,
    /// following legs with the same gas and speed are joined.
    pub fn merge_flat(&self, start_index: usize) -> Vec<Segment> {
        let split = start_index.min(self.items.len());
        let mut merged: Vec<Segment> = self.items[..split].to_vec();

        for segment in self.items[split..].iter() {
            if merged.len() > split {
                if let Some(last) = merged.last_mut() {
                    if last.continues_with(segment) {
                        last.end_depth = segment.end_depth;
                        last.duration += segment.duration;
                        continue;
                    }
                }
            }
            merged.push(*segment);
        }

        merged
    }
}
