pub mod clock;
pub mod combatant;
pub mod effects;
pub mod engine;
pub mod result;
pub mod rng;

pub use clock::{Clock, SystemClock};
pub use combatant::{Combatant, CombatantKind, Position};
pub use effects::{spawn_expiry_sweeper, ActiveEffect, EffectTracker};
pub use engine::{
    crit_chance, defense_reduction, roll_damage, skill_healing, DamageRoll, ExperienceAwarder,
    SkillEngine,
};
pub use result::{AppliedEffect, SkillResult, SkillTargetResult, UseFailure, UseSkillRequest};
pub use rng::Rng;
