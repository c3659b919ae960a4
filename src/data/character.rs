//! Authoritative character record: combat stats, progression currency, and the
//! learned-skill list with hotbar bindings. Mutated only by the request handler
//! serialized on this character; persisted through [`PersistenceSink`].

use serde::{Deserialize, Serialize};

use crate::combat::{Combatant, CombatantKind, Position};

/// Per-character progression record for one skill template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedSkill {
    pub skill_id: u32,
    pub current_level: u32,
    /// Hotbar slot 1..=9; 0 means learned but unbound.
    pub slot_number: u8,
    /// Millisecond timestamp of the last successful use.
    pub last_used_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub id: String,
    pub name: String,
    pub class_name: String,
    pub level: u32,
    pub experience: i64,
    pub health: i32,
    pub max_health: i32,
    pub mana: i32,
    pub max_mana: i32,
    pub attack_power: i32,
    pub magic_power: i32,
    pub dexterity: i32,
    pub defense: i32,
    /// Currency spent to raise skill levels.
    pub status_points: i32,
    pub position: Position,
    #[serde(default)]
    pub learned_skills: Vec<LearnedSkill>,
}

impl Character {
    pub fn learned_skill(&self, skill_id: u32) -> Option<&LearnedSkill> {
        self.learned_skills.iter().find(|s| s.skill_id == skill_id)
    }

    pub fn learned_skill_mut(&mut self, skill_id: u32) -> Option<&mut LearnedSkill> {
        self.learned_skills
            .iter_mut()
            .find(|s| s.skill_id == skill_id)
    }

    /// Occupant of a non-zero hotbar slot, if any.
    pub fn skill_in_slot_mut(&mut self, slot_number: u8) -> Option<&mut LearnedSkill> {
        if slot_number == 0 {
            return None;
        }
        self.learned_skills
            .iter_mut()
            .find(|s| s.slot_number == slot_number)
    }
}

impl Combatant for Character {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> CombatantKind {
        CombatantKind::Player
    }

    fn level(&self) -> u32 {
        self.level
    }

    fn position(&self) -> Position {
        self.position
    }

    fn health(&self) -> i32 {
        self.health
    }

    fn max_health(&self) -> i32 {
        self.max_health
    }

    fn mana(&self) -> i32 {
        self.mana
    }

    fn attack_power(&self) -> i32 {
        self.attack_power
    }

    fn magic_power(&self) -> i32 {
        self.magic_power
    }

    fn dexterity(&self) -> i32 {
        self.dexterity
    }

    fn defense(&self) -> i32 {
        self.defense
    }

    fn take_damage(&mut self, amount: i32) -> i32 {
        let applied = amount.min(self.health).max(0);
        self.health -= applied;
        applied
    }

    fn heal(&mut self, amount: i32) -> i32 {
        let restored = amount.min(self.max_health - self.health).max(0);
        self.health += restored;
        restored
    }
}

/// Storage collaborator. Called fire-and-continue after any mutating operation;
/// the in-memory result never waits on it.
pub trait PersistenceSink: Send + Sync {
    fn save(&self, character: &Character);
}
