//! Active effect registry: time-bounded buffs/debuffs keyed by target id.
//! Sharded map so applies against unrelated targets never contend; a periodic
//! background task sweeps expiry independent of request traffic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::data::skill::EffectType;

use super::clock::Clock;

/// Runtime instance of a buff/debuff on one target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    /// Process-wide unique, assigned by the tracker on apply.
    pub id: u64,
    pub skill_id: u32,
    pub effect_type: EffectType,
    pub target_stat: String,
    pub value: i32,
    pub start_time: f64,
    pub duration: f32,
    pub source_id: String,
}

impl ActiveEffect {
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.start_time + self.duration as f64
    }
}

/// Per-target registry of active effects. Instances of the same effect coexist;
/// aggregation ("strongest wins", refresh) is the stat layer's concern.
#[derive(Debug)]
pub struct EffectTracker {
    effects: DashMap<String, Vec<ActiveEffect>>,
    next_id: AtomicU64,
}

impl EffectTracker {
    pub fn new() -> Self {
        Self {
            effects: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register an effect on a target, assigning its unique id.
    pub fn apply(&self, target_id: &str, mut effect: ActiveEffect) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        effect.id = id;
        debug!(
            target_id,
            effect = ?effect.effect_type,
            stat = %effect.target_stat,
            value = effect.value,
            duration = effect.duration,
            "effect applied"
        );
        self.effects
            .entry(target_id.to_string())
            .or_default()
            .push(effect);
        id
    }

    /// Drop every effect whose duration has elapsed; targets with nothing left
    /// are forgotten entirely. Returns the number of effects removed.
    pub fn sweep(&self, now: f64) -> usize {
        let mut removed = 0;
        self.effects.retain(|_, list| {
            let before = list.len();
            list.retain(|effect| !effect.is_expired(now));
            removed += before - list.len();
            !list.is_empty()
        });
        removed
    }

    /// Snapshot of a target's active effects.
    pub fn list_active(&self, target_id: &str) -> Vec<ActiveEffect> {
        self.effects
            .get(target_id)
            .map(|list| list.value().clone())
            .unwrap_or_default()
    }

    /// Number of targets currently carrying at least one effect.
    pub fn tracked_targets(&self) -> usize {
        self.effects.len()
    }
}

impl Default for EffectTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic expiry sweep driven by the injected clock.
pub fn spawn_expiry_sweeper(
    tracker: Arc<EffectTracker>,
    clock: Arc<dyn Clock>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = tracker.sweep(clock.now());
            if removed > 0 {
                debug!(removed, "expired effects swept");
            }
        }
    })
}
