//! Time-gap fight segmentation.
//!
//! Damage, heal and death events are buffered. When the next event lands
//! more than `gap_secs` after the last buffered one, the buffer is flushed
//! into a [`Fight`] and a new buffer starts:
//!
//! ```text
//!   t: 10  12            40
//!      ●───●   (gap 28)   ●
//!      └fight 1┘          └fight 2┘
//! ```
//!
//! Whatever is buffered when the stream ends becomes the final fight.

use hashbrown::HashSet;
use serde::Serialize;

use super::enrich::FightEnrichment;
use crate::events::{EventHandler, EventKind, MatchTime, NormalizedEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FightEventKind {
    Damage,
    Heal,
    Death,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FightEvent {
    pub time: MatchTime,
    pub kind: FightEventKind,
    pub actor: String,
    pub target: String,
    pub inflictor: String,
    pub value: i64,
}

impl FightEvent {
    /// The combat-relevant view of a normalized event, if it is one.
    pub fn from_event(event: &NormalizedEvent) -> Option<Self> {
        let (kind, interaction) = match &event.kind {
            EventKind::Damage(i) => (FightEventKind::Damage, i),
            EventKind::Heal(i) => (FightEventKind::Heal, i),
            EventKind::Death(i) => (FightEventKind::Death, i),
            _ => return None,
        };
        Some(Self {
            time: event.time,
            kind,
            actor: interaction.actor.clone(),
            target: interaction.target.clone(),
            inflictor: interaction.inflictor.clone(),
            value: interaction.value,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fight {
    pub id: u32,
    pub start: MatchTime,
    pub end: MatchTime,
    pub duration: i64,
    /// Distinct non-empty actor and target names, in first-seen order.
    pub participants: Vec<String>,
    pub events: Vec<FightEvent>,
    #[serde(flatten)]
    pub enrichment: FightEnrichment,
}

impl Fight {
    fn from_events(id: u32, events: Vec<FightEvent>) -> Self {
        let start = events.iter().map(|e| e.time).min().unwrap_or_default();
        let end = events.iter().map(|e| e.time).max().unwrap_or_default();

        let participants = {
            let mut seen = HashSet::new();
            let mut participants = Vec::new();
            for name in events.iter().flat_map(|e| [&e.actor, &e.target]) {
                if !name.is_empty() && seen.insert(name.as_str()) {
                    participants.push(name.clone());
                }
            }
            participants
        };

        Self {
            id,
            start,
            end,
            duration: end - start,
            participants,
            events,
            enrichment: FightEnrichment::default(),
        }
    }

    /// Death events of this fight.
    pub fn deaths(&self) -> impl Iterator<Item = &FightEvent> {
        self.events.iter().filter(|e| e.kind == FightEventKind::Death)
    }
}

#[derive(Debug)]
pub struct FightSegmenter {
    gap_secs: i64,
    buffer: Vec<FightEvent>,
    last_time: Option<MatchTime>,
    fights: Vec<Fight>,
}

impl FightSegmenter {
    pub fn new(gap_secs: i64) -> Self {
        Self {
            gap_secs,
            buffer: Vec::new(),
            last_time: None,
            fights: Vec::new(),
        }
    }

    pub fn push(&mut self, event: FightEvent) {
        if let Some(last) = self.last_time {
            if event.time - last > self.gap_secs {
                self.flush();
            }
        }
        self.last_time = Some(event.time);
        self.buffer.push(event);
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let id = self.fights.len() as u32 + 1;
        let events = std::mem::take(&mut self.buffer);
        let fight = Fight::from_events(id, events);
        tracing::trace!(id, start = fight.start, end = fight.end, "Fight closed");
        self.fights.push(fight);
    }

    /// Completed fights so far; the open buffer is not included.
    pub fn fights(&self) -> &[Fight] {
        &self.fights
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Flush the open buffer and return every fight.
    pub fn finish(mut self) -> Vec<Fight> {
        self.flush();
        self.fights
    }
}

impl EventHandler for FightSegmenter {
    fn handle_event(&mut self, event: &NormalizedEvent) {
        if !event.has_time() {
            return;
        }
        if let Some(fight_event) = FightEvent::from_event(event) {
            self.push(fight_event);
        }
    }
}

/// Segment an already time-ordered list of combat events.
pub fn segment_fights(events: &[FightEvent], gap_secs: i64) -> Vec<Fight> {
    let mut segmenter = FightSegmenter::new(gap_secs);
    for event in events {
        segmenter.push(event.clone());
    }
    segmenter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(time: MatchTime, kind: FightEventKind, actor: &str, target: &str, value: i64) -> FightEvent {
        FightEvent {
            time,
            kind,
            actor: actor.into(),
            target: target.into(),
            inflictor: String::new(),
            value,
        }
    }

    #[test]
    fn test_gap_splits_fights() {
        let events = vec![
            ev(10, FightEventKind::Damage, "A", "B", 50),
            ev(12, FightEventKind::Death, "A", "B", 0),
            ev(40, FightEventKind::Damage, "C", "D", 30),
        ];
        let fights = segment_fights(&events, 20);

        assert_eq!(fights.len(), 2);
        assert_eq!((fights[0].start, fights[0].end), (10, 12));
        assert_eq!(fights[0].participants, vec!["A", "B"]);
        assert_eq!((fights[1].start, fights[1].end), (40, 40));
        assert_eq!(fights[1].participants, vec!["C", "D"]);
        assert_eq!(fights[1].duration, 0);
        assert_eq!(fights[1].id, 2);
    }

    #[test]
    fn test_gap_equal_to_threshold_does_not_split() {
        let events = vec![
            ev(10, FightEventKind::Damage, "A", "B", 1),
            ev(30, FightEventKind::Damage, "A", "B", 1),
            ev(51, FightEventKind::Damage, "A", "B", 1),
        ];
        let fights = segment_fights(&events, 20);
        assert_eq!(fights.len(), 2);
        assert_eq!((fights[0].start, fights[0].end), (10, 30));
    }

    #[test]
    fn test_segmentation_is_idempotent() {
        let events = vec![
            ev(5, FightEventKind::Damage, "A", "B", 1),
            ev(9, FightEventKind::Heal, "C", "A", 4),
            ev(70, FightEventKind::Damage, "D", "", 1),
            ev(100, FightEventKind::Death, "", "E", 0),
        ];
        let first = segment_fights(&events, 20);
        let second = segment_fights(&events, 20);
        assert_eq!(first, second);

        // Re-segmenting the flattened output gives the same boundaries
        let flattened: Vec<FightEvent> = first.iter().flat_map(|f| f.events.clone()).collect();
        let third = segment_fights(&flattened, 20);
        let bounds = |fs: &[Fight]| fs.iter().map(|f| (f.start, f.end)).collect::<Vec<_>>();
        assert_eq!(bounds(&first), bounds(&third));
    }

    #[test]
    fn test_participants_skip_empty_names() {
        let events = vec![
            ev(1, FightEventKind::Damage, "", "B", 1),
            ev(2, FightEventKind::Damage, "B", "", 1),
            ev(3, FightEventKind::Damage, "C", "B", 1),
        ];
        let fights = segment_fights(&events, 20);
        assert_eq!(fights[0].participants, vec!["B", "C"]);
    }

    #[test]
    fn test_handler_ignores_other_events_and_unknown_time() {
        use crate::events::normalized::Interaction;

        let mut segmenter = FightSegmenter::new(20);
        segmenter.handle_event(&NormalizedEvent::new(
            -1,
            EventKind::Damage(Interaction::default()),
        ));
        segmenter.handle_event(&NormalizedEvent::new(5, EventKind::Buyback { player: "A".into() }));
        assert_eq!(segmenter.buffered(), 0);
        assert!(segmenter.finish().is_empty());
    }
}
