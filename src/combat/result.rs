//! Request and result shapes for skill resolution. The protocol layer owns the
//! wire framing; the field sets here are the authoritative contract.

use serde::{Deserialize, Serialize};

use crate::data::skill::EffectType;

use super::combatant::{CombatantKind, Position};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UseSkillRequest {
    pub skill_id: u32,
    #[serde(default)]
    pub slot_number: u8,
    /// None for self-targeted and ground-targeted area skills.
    #[serde(default)]
    pub target_id: Option<String>,
    pub target_type: CombatantKind,
    /// Explicit center for ground-targeted area skills.
    #[serde(default)]
    pub target_position: Option<Position>,
}

/// Enumerated rejection codes for a use request, serialized as the wire constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UseFailure {
    SkillNotLearned,
    SkillNotFound,
    Cooldown,
    InvalidLevel,
    NoMana,
    NoHealth,
    OutOfRange,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl UseFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkillNotLearned => "SKILL_NOT_LEARNED",
            Self::SkillNotFound => "SKILL_NOT_FOUND",
            Self::Cooldown => "COOLDOWN",
            Self::InvalidLevel => "INVALID_LEVEL",
            Self::NoMana => "NO_MANA",
            Self::NoHealth => "NO_HEALTH",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

/// Effect that triggered on a target during resolution.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedEffect {
    pub effect_type: EffectType,
    pub value: i32,
    pub duration: f32,
}

/// Outcome for one combatant hit by the skill.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillTargetResult {
    pub target_id: String,
    pub target_name: String,
    pub target_type: CombatantKind,
    pub damage: i32,
    pub healing: i32,
    pub is_critical: bool,
    pub target_died: bool,
    pub remaining_health: i32,
    pub experience_gained: i32,
    pub leveled_up: bool,
    pub new_level: u32,
    pub applied_effects: Vec<AppliedEffect>,
}

impl SkillTargetResult {
    pub(crate) fn new(target_id: String, target_name: String, target_type: CombatantKind) -> Self {
        Self {
            target_id,
            target_name,
            target_type,
            damage: 0,
            healing: 0,
            is_critical: false,
            target_died: false,
            remaining_health: 0,
            experience_gained: 0,
            leveled_up: false,
            new_level: 0,
            applied_effects: Vec::new(),
        }
    }
}

/// Request-scoped outcome of one use-skill call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<UseFailure>,
    pub attacker_id: String,
    pub attacker_name: String,
    pub attacker_type: CombatantKind,
    pub mana_cost: i32,
    pub health_cost: i32,
    pub targets: Vec<SkillTargetResult>,
}

impl SkillResult {
    pub(crate) fn for_attacker(id: String, name: String, kind: CombatantKind) -> Self {
        Self {
            success: false,
            fail_reason: None,
            attacker_id: id,
            attacker_name: name,
            attacker_type: kind,
            mana_cost: 0,
            health_cost: 0,
            targets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_codes_serialize_to_wire_constants() {
        for (failure, code) in [
            (UseFailure::SkillNotLearned, "\"SKILL_NOT_LEARNED\""),
            (UseFailure::Cooldown, "\"COOLDOWN\""),
            (UseFailure::Internal, "\"INTERNAL_ERROR\""),
        ] {
            assert_eq!(serde_json::to_string(&failure).unwrap(), code);
            assert_eq!(format!("\"{}\"", failure.as_str()), code);
        }
    }
}
