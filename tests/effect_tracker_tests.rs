use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use skillcast::combat::{spawn_expiry_sweeper, ActiveEffect, Clock, EffectTracker};
use skillcast::data::EffectType;

fn buff(start_time: f64, duration: f32) -> ActiveEffect {
    ActiveEffect {
        id: 0,
        skill_id: 4,
        effect_type: EffectType::BuffStat,
        target_stat: "attackPower".to_string(),
        value: 8,
        start_time,
        duration,
        source_id: "p1".to_string(),
    }
}

#[test]
fn apply_assigns_monotonic_unique_ids() {
    let tracker = EffectTracker::new();
    let first = tracker.apply("t1", buff(0.0, 10.0));
    let second = tracker.apply("t1", buff(0.0, 10.0));
    let third = tracker.apply("t2", buff(0.0, 10.0));
    assert!(first < second && second < third);

    let ids: Vec<u64> = tracker.list_active("t1").iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![first, second]);
}

#[test]
fn identical_effects_coexist() {
    let tracker = EffectTracker::new();
    tracker.apply("t1", buff(0.0, 10.0));
    tracker.apply("t1", buff(0.0, 10.0));
    assert_eq!(tracker.list_active("t1").len(), 2);
}

#[test]
fn sweep_removes_exactly_at_expiry() {
    let tracker = EffectTracker::new();
    tracker.apply("t1", buff(10.0, 5.0));

    assert_eq!(tracker.sweep(14.999), 0);
    assert_eq!(tracker.list_active("t1").len(), 1);

    assert_eq!(tracker.sweep(15.0), 1);
    assert!(tracker.list_active("t1").is_empty());
}

#[test]
fn sweep_keeps_unexpired_effects_and_drops_empty_targets() {
    let tracker = EffectTracker::new();
    tracker.apply("t1", buff(0.0, 5.0));
    tracker.apply("t1", buff(0.0, 30.0));
    tracker.apply("t2", buff(0.0, 5.0));
    assert_eq!(tracker.tracked_targets(), 2);

    assert_eq!(tracker.sweep(10.0), 2);
    assert_eq!(tracker.list_active("t1").len(), 1);
    assert_eq!(tracker.tracked_targets(), 1);

    assert_eq!(tracker.sweep(30.0), 1);
    assert_eq!(tracker.tracked_targets(), 0);
}

#[test]
fn list_active_is_a_snapshot() {
    let tracker = EffectTracker::new();
    tracker.apply("t1", buff(0.0, 10.0));
    let snapshot = tracker.list_active("t1");
    tracker.apply("t1", buff(0.0, 10.0));
    assert_eq!(snapshot.len(), 1);
    assert_eq!(tracker.list_active("t1").len(), 2);
}

#[test]
fn unknown_target_has_no_effects() {
    let tracker = EffectTracker::new();
    assert!(tracker.list_active("nobody").is_empty());
}

#[test]
fn concurrent_applies_are_never_lost() {
    let tracker = Arc::new(EffectTracker::new());
    let mut handles = Vec::new();
    for _ in 0..8 {
        let tracker = Arc::clone(&tracker);
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                tracker.apply("boss", buff(0.0, 60.0));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let effects = tracker.list_active("boss");
    assert_eq!(effects.len(), 200);

    let mut ids: Vec<u64> = effects.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 200);
}

struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    fn set(&self, seconds: f64) {
        self.millis
            .store((seconds * 1000.0) as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.millis.load(Ordering::SeqCst) as f64 / 1000.0
    }
}

#[tokio::test]
async fn background_sweeper_drops_expired_effects() {
    let tracker = Arc::new(EffectTracker::new());
    let clock = Arc::new(ManualClock {
        millis: AtomicU64::new(0),
    });

    tracker.apply("t1", buff(0.0, 1.0));
    let handle = spawn_expiry_sweeper(
        Arc::clone(&tracker),
        Arc::clone(&clock) as Arc<dyn Clock>,
        Duration::from_millis(10),
    );

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(tracker.tracked_targets(), 1);

    clock.set(2.0);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(tracker.tracked_targets(), 0);

    handle.abort();
}
