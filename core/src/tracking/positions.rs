//! Hero position sampling.
//!
//! Entity updates arrive far more often than the analytics need. The
//! sampler keeps at most one sample per hero per sampling step of match
//! clock, append-only, so each hero's samples stay sorted by time and
//! "latest sample at or before t" is a binary search.

use hashbrown::HashMap;
use serde::Serialize;

use crate::events::MatchTime;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Arithmetic mean of a set of positions, `None` when empty.
    pub fn centroid<'a>(positions: impl IntoIterator<Item = &'a Position>) -> Option<Position> {
        let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
        for p in positions {
            sx += p.x;
            sy += p.y;
            n += 1;
        }
        (n > 0).then(|| Position::new(sx / n as f64, sy / n as f64))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    pub time: MatchTime,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct PositionSampler {
    step_secs: i64,
    samples: HashMap<String, Vec<PositionSample>>,
}

impl PositionSampler {
    pub fn new(step_secs: i64) -> Self {
        Self {
            step_secs,
            samples: HashMap::new(),
        }
    }

    /// Record `position` for `hero` at match clock `clock` unless the hero
    /// was sampled less than one step ago. Returns whether a sample was taken.
    pub fn observe(&mut self, hero: &str, clock: MatchTime, position: Position) -> bool {
        let samples = self.samples.entry_ref(hero).or_default();
        if let Some(last) = samples.last() {
            if clock - last.time < self.step_secs {
                return false;
            }
        }
        samples.push(PositionSample {
            time: clock,
            position,
        });
        true
    }

    /// Latest sample of `unit` taken at or before `time`.
    pub fn latest_at(&self, unit: &str, time: MatchTime) -> Option<Position> {
        let samples = self.samples.get(unit)?;
        let idx = samples.partition_point(|s| s.time <= time);
        idx.checked_sub(1).map(|i| samples[i].position)
    }

    pub fn samples(&self, hero: &str) -> &[PositionSample] {
        self.samples.get(hero).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sample_count(&self) -> usize {
        self.samples.values().map(Vec::len).sum()
    }
}
