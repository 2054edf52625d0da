//! Crowd-control interval tracking.
//!
//! A modifier add whose name matches a CC category opens an interval keyed
//! by (target, modifier). A later remove with the same key closes it and
//! emits a [`CcInterval`]. A second add for an open key restarts it; removes
//! with nothing open and intervals that never close are dropped silently.

use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::Serialize;

use crate::events::normalized::ModifierChange;
use crate::events::{EventHandler, EventKind, MatchTime, NormalizedEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CcCategory {
    Stun,
    Root,
    Silence,
    Hex,
    Other,
}

impl CcCategory {
    /// Category for a lowercased modifier name, checked stun → root → silence → hex.
    /// `None` for modifiers that are not crowd control.
    pub fn classify(modifier: &str) -> Option<Self> {
        if modifier.contains("stun") {
            Some(CcCategory::Stun)
        } else if modifier.contains("root") {
            Some(CcCategory::Root)
        } else if modifier.contains("silence") {
            Some(CcCategory::Silence)
        } else if modifier.contains("hex") {
            Some(CcCategory::Hex)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CcInterval {
    pub target: String,
    pub source: String,
    pub modifier: String,
    pub category: CcCategory,
    pub start: MatchTime,
    pub end: MatchTime,
    pub duration: i64,
}

#[derive(Debug, Clone)]
struct OpenInterval {
    start: MatchTime,
    source: String,
}

/// Seconds of CC per category.
pub type CcTotals = BTreeMap<CcCategory, i64>;

#[derive(Debug, Default)]
pub struct CcTracker {
    open: HashMap<(String, String), OpenInterval>,
    intervals: Vec<CcInterval>,
    by_target: BTreeMap<String, CcTotals>,
    by_source: BTreeMap<String, CcTotals>,
}

impl CcTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn open(&mut self, time: MatchTime, change: &ModifierChange) {
        if CcCategory::classify(&change.modifier).is_none() {
            return;
        }
        // Last add wins
        self.open.insert(
            (change.target.clone(), change.modifier.clone()),
            OpenInterval {
                start: time,
                source: change.source.clone(),
            },
        );
    }

    fn close(&mut self, time: MatchTime, change: &ModifierChange) {
        let Some(category) = CcCategory::classify(&change.modifier) else {
            return;
        };
        let key = (change.target.clone(), change.modifier.clone());
        let Some(open) = self.open.remove(&key) else {
            return;
        };

        let end = time.max(open.start);
        let duration = end - open.start;

        *self
            .by_target
            .entry(change.target.clone())
            .or_default()
            .entry(category)
            .or_default() += duration;
        if !open.source.is_empty() {
            *self
                .by_source
                .entry(open.source.clone())
                .or_default()
                .entry(category)
                .or_default() += duration;
        }

        let (target, modifier) = key;
        self.intervals.push(CcInterval {
            target,
            source: open.source,
            modifier,
            category,
            start: open.start,
            end,
            duration,
        });
    }

    pub fn intervals(&self) -> &[CcInterval] {
        &self.intervals
    }

    pub fn by_target(&self) -> &BTreeMap<String, CcTotals> {
        &self.by_target
    }

    pub fn by_source(&self) -> &BTreeMap<String, CcTotals> {
        &self.by_source
    }

    /// Intervals still open; these are never emitted.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

impl EventHandler for CcTracker {
    fn handle_event(&mut self, event: &NormalizedEvent) {
        if !event.has_time() {
            return;
        }
        match &event.kind {
            EventKind::ModifierAdd(change) => self.open(event.time, change),
            EventKind::ModifierRemove(change) => self.close(event.time, change),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(time: MatchTime, target: &str, source: &str, modifier: &str) -> NormalizedEvent {
        NormalizedEvent::new(
            time,
            EventKind::ModifierAdd(ModifierChange {
                target: target.into(),
                source: source.into(),
                modifier: modifier.into(),
            }),
        )
    }

    fn remove(time: MatchTime, target: &str, modifier: &str) -> NormalizedEvent {
        NormalizedEvent::new(
            time,
            EventKind::ModifierRemove(ModifierChange {
                target: target.into(),
                source: String::new(),
                modifier: modifier.into(),
            }),
        )
    }

    #[test]
    fn test_classify_order() {
        assert_eq!(CcCategory::classify("modifier_stunned"), Some(CcCategory::Stun));
        assert_eq!(CcCategory::classify("modifier_rooted"), Some(CcCategory::Root));
        assert_eq!(CcCategory::classify("modifier_silence"), Some(CcCategory::Silence));
        assert_eq!(CcCategory::classify("modifier_lion_voodoo_hex"), Some(CcCategory::Hex));
        // stun is checked before root
        assert_eq!(CcCategory::classify("modifier_stun_root"), Some(CcCategory::Stun));
        assert_eq!(CcCategory::classify("modifier_haste"), None);
    }

    #[test]
    fn test_interval_closes_on_matching_remove() {
        let mut tracker = CcTracker::new();
        tracker.handle_events(&[
            add(100, "lina", "lion", "modifier_stunned"),
            remove(103, "lina", "modifier_stunned"),
        ]);

        let interval = &tracker.intervals()[0];
        assert_eq!(interval.start, 100);
        assert_eq!(interval.end, 103);
        assert_eq!(interval.duration, 3);
        assert_eq!(interval.source, "lion");
        assert_eq!(tracker.by_target()["lina"][&CcCategory::Stun], 3);
        assert_eq!(tracker.by_source()["lion"][&CcCategory::Stun], 3);
    }

    #[test]
    fn test_last_add_wins() {
        let mut tracker = CcTracker::new();
        tracker.handle_events(&[
            add(100, "lina", "lion", "modifier_stunned"),
            add(102, "lina", "axe", "modifier_stunned"),
            remove(105, "lina", "modifier_stunned"),
        ]);

        assert_eq!(tracker.intervals().len(), 1);
        assert_eq!(tracker.intervals()[0].start, 102);
        assert_eq!(tracker.intervals()[0].source, "axe");
        assert!(!tracker.by_source().contains_key("lion"));
    }

    #[test]
    fn test_unmatched_and_non_cc_are_dropped() {
        let mut tracker = CcTracker::new();
        tracker.handle_events(&[
            remove(50, "lina", "modifier_stunned"),
            add(60, "lina", "lion", "modifier_haste"),
            remove(62, "lina", "modifier_haste"),
            add(70, "axe", "lion", "modifier_rooted"),
        ]);

        assert!(tracker.intervals().is_empty());
        assert!(tracker.by_target().is_empty());
        assert_eq!(tracker.open_count(), 1);
    }

    #[test]
    fn test_keys_are_per_target_and_modifier() {
        let mut tracker = CcTracker::new();
        tracker.handle_events(&[
            add(10, "lina", "lion", "modifier_stunned"),
            add(10, "axe", "lion", "modifier_stunned"),
            add(11, "lina", "lion", "modifier_silence"),
            remove(12, "axe", "modifier_stunned"),
            remove(14, "lina", "modifier_silence"),
        ]);

        assert_eq!(tracker.intervals().len(), 2);
        let lion = &tracker.by_source()["lion"];
        assert_eq!(lion[&CcCategory::Stun], 2);
        assert_eq!(lion[&CcCategory::Silence], 3);
    }

    #[test]
    fn test_anonymous_source_not_in_source_table() {
        let mut tracker = CcTracker::new();
        tracker.handle_events(&[
            add(10, "lina", "", "modifier_stunned"),
            remove(11, "lina", "modifier_stunned"),
        ]);
        assert_eq!(tracker.intervals().len(), 1);
        assert!(tracker.by_source().is_empty());
    }
}
