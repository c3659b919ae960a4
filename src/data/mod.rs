pub mod catalog;
pub mod character;
pub mod skill;

pub use catalog::{CatalogError, SkillCatalog, DEFAULT_SKILLS_PATH};
pub use character::{Character, LearnedSkill, PersistenceSink};
pub use skill::{
    DamageType, EffectType, SkillEffect, SkillFile, SkillLevelData, SkillTemplate, SkillType,
    TargetKind,
};
