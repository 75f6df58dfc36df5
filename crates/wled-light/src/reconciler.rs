//! Segment reconciliation
//!
//! Decides which entities to create when a snapshot arrives. Entities are
//! never removed: a segment that disappears keeps its entity, which then
//! reports unavailable.

use std::collections::BTreeSet;

use tracing::debug;
use wled_core::DeviceSnapshot;

/// An entity the platform should create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Creation {
    /// The main light, for controllers that grew a second segment
    Main,
    /// A light for a newly seen segment
    Segment(u32),
}

/// Segment ids already turned into entities
///
/// One tracker belongs to one platform setup and is fed every snapshot
/// notification in order, so ids accumulate across calls.
#[derive(Debug, Clone, Default)]
pub struct SegmentTracker {
    known_ids: BTreeSet<u32>,
}

impl SegmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segment ids seen so far
    pub fn known_ids(&self) -> &BTreeSet<u32> {
        &self.known_ids
    }

    /// Creation instructions for the light platform
    ///
    /// Emits [`Creation::Main`] first when the main light is not kept by
    /// configuration and the controller goes from fewer than two known
    /// segments to more than one live segment. Because the check looks at
    /// the known set, it fires once per tracker. New segments follow in
    /// ascending id order.
    pub fn reconcile(&mut self, snapshot: &DeviceSnapshot, keep_main_light: bool) -> Vec<Creation> {
        let live_ids = snapshot.segment_ids();
        let mut creations = Vec::new();

        if !keep_main_light && self.known_ids.len() < 2 && live_ids.len() > 1 {
            creations.push(Creation::Main);
        }

        creations.extend(self.track(&live_ids).into_iter().map(Creation::Segment));
        creations
    }

    /// Ids of segments not seen before, ascending; they become known
    pub fn new_segments(&mut self, snapshot: &DeviceSnapshot) -> Vec<u32> {
        self.track(&snapshot.segment_ids())
    }

    fn track(&mut self, live_ids: &BTreeSet<u32>) -> Vec<u32> {
        let new_ids: Vec<u32> = live_ids.difference(&self.known_ids).copied().collect();
        if !new_ids.is_empty() {
            debug!(?new_ids, known = self.known_ids.len(), "New segments");
        }
        self.known_ids.extend(new_ids.iter().copied());
        new_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(ids: &[u32]) -> DeviceSnapshot {
        let segments: serde_json::Map<String, serde_json::Value> = ids
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    json!({"segment_id": id, "on": true, "brightness": 255}),
                )
            })
            .collect();
        serde_json::from_value(json!({
            "info": {"name": "WLED", "mac_address": "aabbccddeeff"},
            "state": {"on": true, "brightness": 255, "segments": segments}
        }))
        .unwrap()
    }

    #[test]
    fn test_single_segment_has_no_main() {
        let mut tracker = SegmentTracker::new();
        assert_eq!(
            tracker.reconcile(&snapshot(&[0]), false),
            vec![Creation::Segment(0)]
        );
    }

    #[test]
    fn test_multiple_segments_add_main_first() {
        let mut tracker = SegmentTracker::new();
        assert_eq!(
            tracker.reconcile(&snapshot(&[2, 0, 1]), false),
            vec![
                Creation::Main,
                Creation::Segment(0),
                Creation::Segment(1),
                Creation::Segment(2)
            ]
        );
    }

    #[test]
    fn test_no_duplicates_across_calls() {
        let mut tracker = SegmentTracker::new();
        tracker.reconcile(&snapshot(&[0, 1]), false);

        assert!(tracker.reconcile(&snapshot(&[0, 1]), false).is_empty());
        assert_eq!(
            tracker.reconcile(&snapshot(&[0, 1, 3]), false),
            vec![Creation::Segment(3)]
        );
        assert!(tracker.reconcile(&snapshot(&[3]), false).is_empty());
    }

    #[test]
    fn test_main_created_once_on_growth() {
        let mut tracker = SegmentTracker::new();
        assert_eq!(
            tracker.reconcile(&snapshot(&[0]), false),
            vec![Creation::Segment(0)]
        );
        assert_eq!(
            tracker.reconcile(&snapshot(&[0, 1]), false),
            vec![Creation::Main, Creation::Segment(1)]
        );

        // Shrinking back and growing again never re-adds main
        assert!(tracker.reconcile(&snapshot(&[0]), false).is_empty());
        assert_eq!(
            tracker.reconcile(&snapshot(&[0, 1, 2]), false),
            vec![Creation::Segment(2)]
        );
    }

    #[test]
    fn test_kept_main_is_not_emitted() {
        let mut tracker = SegmentTracker::new();
        assert_eq!(
            tracker.reconcile(&snapshot(&[0, 1]), true),
            vec![Creation::Segment(0), Creation::Segment(1)]
        );
    }

    #[test]
    fn test_known_ids_superset_of_live() {
        let mut tracker = SegmentTracker::new();
        let cases: [&[u32]; 4] = [&[0, 1], &[1, 2], &[5], &[]];
        for ids in cases {
            tracker.reconcile(&snapshot(ids), false);
            let live = snapshot(ids).segment_ids();
            assert!(tracker.known_ids().is_superset(&live));
        }
        assert_eq!(tracker.known_ids(), &BTreeSet::from([0, 1, 2, 5]));
    }

    #[test]
    fn test_segments_without_id_ignored() {
        let snapshot: DeviceSnapshot = serde_json::from_value(json!({
            "info": {"name": "WLED", "mac_address": "aabbccddeeff"},
            "state": {"on": true, "brightness": 255, "segments": {
                "0": {"segment_id": 0, "on": true, "brightness": 255},
                "1": {"on": true, "brightness": 255}
            }}
        }))
        .unwrap();

        let mut tracker = SegmentTracker::new();
        assert_eq!(
            tracker.reconcile(&snapshot, false),
            vec![Creation::Segment(0)]
        );
    }

    #[test]
    fn test_new_segments_without_main_rule() {
        let mut tracker = SegmentTracker::new();
        assert_eq!(tracker.new_segments(&snapshot(&[1, 0])), vec![0, 1]);
        assert!(tracker.new_segments(&snapshot(&[0, 1])).is_empty());
    }
}
