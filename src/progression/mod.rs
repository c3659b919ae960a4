//! Learn and level-up gating against the catalog and a character's
//! progression. First failing rule wins; nothing is mutated on failure.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::data::catalog::SkillCatalog;
use crate::data::character::{Character, LearnedSkill, PersistenceSink};

pub const MIN_SLOT: u8 = 1;
pub const MAX_SLOT: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LearnError {
    #[error("skill does not exist")]
    SkillNotFound,
    #[error("character level below requirement")]
    LevelTooLow,
    #[error("skill restricted to another class")]
    WrongClass,
    #[error("skill already learned")]
    AlreadyLearned,
    #[error("hotbar slot outside 1..=9")]
    InvalidSlot,
}

impl LearnError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SkillNotFound => "SKILL_NOT_FOUND",
            Self::LevelTooLow => "LEVEL_TOO_LOW",
            Self::WrongClass => "WRONG_CLASS",
            Self::AlreadyLearned => "ALREADY_LEARNED",
            Self::InvalidSlot => "INVALID_SLOT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LevelUpError {
    #[error("skill not learned")]
    NotLearned,
    #[error("skill does not exist")]
    SkillNotFound,
    #[error("skill already at max level")]
    MaxLevel,
    #[error("no level data for the next level")]
    InvalidLevelData,
    #[error("not enough status points")]
    InsufficientPoints,
}

impl LevelUpError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotLearned => "NOT_LEARNED",
            Self::SkillNotFound => "SKILL_NOT_FOUND",
            Self::MaxLevel => "MAX_LEVEL",
            Self::InvalidLevelData => "INVALID_LEVEL_DATA",
            Self::InsufficientPoints => "INSUFFICIENT_POINTS",
        }
    }
}

/// Validates and applies learn and level-up requests.
pub struct ProgressionGate {
    catalog: Arc<SkillCatalog>,
    persistence: Arc<dyn PersistenceSink>,
}

impl ProgressionGate {
    pub fn new(catalog: Arc<SkillCatalog>, persistence: Arc<dyn PersistenceSink>) -> Self {
        Self {
            catalog,
            persistence,
        }
    }

    /// Learn a skill into a hotbar slot. Whatever previously occupied the slot
    /// is unbound (slot 0) but stays learned.
    pub fn learn_skill(
        &self,
        character: &mut Character,
        skill_id: u32,
        slot_number: u8,
    ) -> Result<(), LearnError> {
        let template = self
            .catalog
            .get(skill_id)
            .ok_or(LearnError::SkillNotFound)?;
        if character.level < template.required_level {
            return Err(LearnError::LevelTooLow);
        }
        if !template.required_class.is_empty() && template.required_class != character.class_name {
            return Err(LearnError::WrongClass);
        }
        if character.learned_skill(skill_id).is_some() {
            return Err(LearnError::AlreadyLearned);
        }
        if !(MIN_SLOT..=MAX_SLOT).contains(&slot_number) {
            return Err(LearnError::InvalidSlot);
        }

        if let Some(occupant) = character.skill_in_slot_mut(slot_number) {
            occupant.slot_number = 0;
        }
        character.learned_skills.push(LearnedSkill {
            skill_id,
            current_level: 1,
            slot_number,
            last_used_time: 0,
        });
        self.persistence.save(character);
        info!(
            character = %character.id,
            skill = skill_id,
            slot = slot_number,
            "skill learned"
        );
        Ok(())
    }

    /// Raise a learned skill by one level, spending status points. Returns the
    /// new level.
    pub fn level_up_skill(
        &self,
        character: &mut Character,
        skill_id: u32,
    ) -> Result<u32, LevelUpError> {
        let current_level = character
            .learned_skill(skill_id)
            .ok_or(LevelUpError::NotLearned)?
            .current_level;
        let template = self
            .catalog
            .get(skill_id)
            .ok_or(LevelUpError::SkillNotFound)?;
        if current_level >= template.max_level {
            return Err(LevelUpError::MaxLevel);
        }
        let cost = template
            .level_data(current_level + 1)
            .ok_or(LevelUpError::InvalidLevelData)?
            .status_point_cost;
        if character.status_points < cost {
            return Err(LevelUpError::InsufficientPoints);
        }

        character.status_points -= cost;
        let new_level = current_level + 1;
        if let Some(learned) = character.learned_skill_mut(skill_id) {
            learned.current_level = new_level;
        }
        self.persistence.save(character);
        info!(
            character = %character.id,
            skill = skill_id,
            level = new_level,
            "skill leveled up"
        );
        Ok(new_level)
    }
}
