//! Skill templates: immutable shared definitions loaded from the catalog JSON.
//! Keys follow the server config schema (camelCase); unknown keys (client-side
//! icon/animation hints) are ignored.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    Active,
    Passive,
    Buff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DamageType {
    Physical,
    Magical,
    True,
}

/// Targeting mode dispatched on by the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Enemy,
    #[serde(rename = "self")]
    Caster,
    Ally,
    Area,
}

/// Known effect kinds plus an explicit catch-all: an unknown tag in config
/// deserializes to [`EffectType::Unrecognized`], never to a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectType {
    Stun,
    Slow,
    Dot,
    Hot,
    BuffStat,
    #[serde(other)]
    Unrecognized,
}

/// Per-level numbers for a skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillLevelData {
    pub level: u32,
    #[serde(default)]
    pub base_damage: i32,
    #[serde(default)]
    pub base_healing: i32,
    /// Fraction of the attacker's scaling stat added as damage/healing.
    #[serde(default = "default_damage_multiplier")]
    pub damage_multiplier: f32,
    #[serde(default)]
    pub crit_chance_bonus: f32,
    /// Cost to reach this level from the previous one.
    #[serde(default = "default_status_point_cost")]
    pub status_point_cost: i32,
}

/// Side effect a skill may apply on hit, rolled independently per target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEffect {
    pub effect_type: EffectType,
    #[serde(default)]
    pub target_stat: String,
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub duration: f32,
    #[serde(default = "default_chance")]
    pub chance: f32,
}

/// Immutable skill definition. Owned by the catalog, never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillTemplate {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub skill_type: SkillType,
    pub damage_type: DamageType,
    pub target_type: TargetKind,
    #[serde(default = "default_required_level")]
    pub required_level: u32,
    /// Empty means any class may learn the skill.
    #[serde(default)]
    pub required_class: String,
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    #[serde(default)]
    pub mana_cost: i32,
    #[serde(default)]
    pub health_cost: i32,
    /// Seconds between successive uses.
    #[serde(default)]
    pub cooldown: f32,
    /// Advisory only; the client shows a casting bar, the server resolves immediately.
    #[serde(default)]
    pub cast_time: f32,
    #[serde(default)]
    pub duration: f32,
    #[serde(default = "default_range")]
    pub range: f32,
    #[serde(default)]
    pub area_radius: f32,
    #[serde(default)]
    pub levels: Vec<SkillLevelData>,
    #[serde(default)]
    pub effects: Vec<SkillEffect>,
}

impl SkillTemplate {
    /// Numbers for one skill level, if the template defines it.
    pub fn level_data(&self, level: u32) -> Option<&SkillLevelData> {
        self.levels.iter().find(|data| data.level == level)
    }
}

/// Root of the skill config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillFile {
    pub skills: Vec<SkillTemplate>,
}

fn default_damage_multiplier() -> f32 {
    1.0
}

fn default_status_point_cost() -> i32 {
    1
}

fn default_chance() -> f32 {
    1.0
}

fn default_required_level() -> u32 {
    1
}

fn default_max_level() -> u32 {
    10
}

fn default_range() -> f32 {
    3.5
}
