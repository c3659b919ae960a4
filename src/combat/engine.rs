//! Skill execution: validates a use request end to end, resolves targets,
//! rolls damage/healing and effects, and mutates authoritative combatant
//! state. Validation failures are reported results, never errors across the
//! public contract, and leave no partial mutation behind.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::data::catalog::SkillCatalog;
use crate::data::character::{Character, PersistenceSink};
use crate::data::skill::{DamageType, EffectType, SkillEffect, SkillLevelData, SkillTemplate, TargetKind};

use super::combatant::{Combatant, CombatantKind};
use super::effects::{ActiveEffect, EffectTracker};
use super::result::{AppliedEffect, SkillResult, SkillTargetResult, UseFailure, UseSkillRequest};
use super::rng::Rng;

/// Seam for the experience system: reward scaling and the level-up walk both
/// live outside this core.
pub trait ExperienceAwarder: Send + Sync {
    /// Experience granted for a kill, scaled from the target's base reward.
    fn experience_reward(&self, caster_level: u32, target_level: u32, base_reward: i32) -> i32;

    /// Credit experience to the character. Returns true when the character
    /// gained at least one level.
    fn award(&self, character: &mut Character, amount: i32) -> bool;
}

/// Post-mitigation multiplier from flat defense: `max(0.1, 1 - d/(d+100))`.
pub fn defense_reduction(defense: i32) -> f64 {
    let defense = defense.max(0) as f64;
    (1.0 - defense / (defense + 100.0)).max(0.1)
}

/// Crit probability: magical skills use a flat base, physical and true damage
/// scale with dexterity.
pub fn crit_chance(damage_type: DamageType, dexterity: i32, bonus: f32) -> f64 {
    let base = match damage_type {
        DamageType::Magical => 0.05,
        _ => 0.01 + dexterity as f64 * 0.003,
    };
    base + bonus as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRoll {
    pub damage: i32,
    pub is_critical: bool,
}

/// One damage roll: scaling stat by damage type, crit at 1.5x, defense
/// mitigation, floored at 1.
pub fn roll_damage(
    template: &SkillTemplate,
    level_data: &SkillLevelData,
    attack_power: i32,
    magic_power: i32,
    dexterity: i32,
    target_defense: i32,
    rng: &mut Rng,
) -> DamageRoll {
    let scaling_stat = if template.damage_type == DamageType::Magical {
        magic_power
    } else {
        attack_power
    };
    let raw = level_data.base_damage
        + (scaling_stat as f64 * level_data.damage_multiplier as f64).floor() as i32;

    let chance = crit_chance(template.damage_type, dexterity, level_data.crit_chance_bonus);
    let is_critical = rng.next_f64() < chance;
    let damage = if is_critical {
        (raw as f64 * 1.5).round() as i32
    } else {
        raw
    };

    let mitigated = (damage as f64 * defense_reduction(target_defense)).round() as i32;
    DamageRoll {
        damage: mitigated.max(1),
        is_critical,
    }
}

/// Healing scales from magic power only; no crit, no mitigation.
pub fn skill_healing(level_data: &SkillLevelData, magic_power: i32) -> i32 {
    level_data.base_healing
        + (magic_power as f64 * level_data.damage_multiplier as f64).floor() as i32
}

/// Constructed once per process and shared by reference into request handlers.
pub struct SkillEngine {
    catalog: Arc<SkillCatalog>,
    effects: Arc<EffectTracker>,
    experience: Arc<dyn ExperienceAwarder>,
    persistence: Arc<dyn PersistenceSink>,
    rng: Mutex<Rng>,
}

impl SkillEngine {
    pub fn new(
        catalog: Arc<SkillCatalog>,
        effects: Arc<EffectTracker>,
        experience: Arc<dyn ExperienceAwarder>,
        persistence: Arc<dyn PersistenceSink>,
        seed: u64,
    ) -> Self {
        Self {
            catalog,
            effects,
            experience,
            persistence,
            rng: Mutex::new(Rng::new(seed)),
        }
    }

    /// Resolve one use-skill request against the caster and the candidate
    /// target population the session layer supplies for the caster's zone.
    ///
    /// `now` is the injected clock reading in seconds.
    pub fn use_skill(
        &self,
        caster: &mut Character,
        targets: &mut [&mut dyn Combatant],
        request: &UseSkillRequest,
        now: f64,
    ) -> SkillResult {
        let result = SkillResult::for_attacker(
            caster.id.clone(),
            caster.name.clone(),
            CombatantKind::Player,
        );

        let Some(learned) = caster.learned_skill(request.skill_id) else {
            return reject(result, UseFailure::SkillNotLearned);
        };
        let current_level = learned.current_level;
        let last_used_time = learned.last_used_time;

        let Some(template) = self.catalog.get(request.skill_id) else {
            return reject(result, UseFailure::SkillNotFound);
        };

        if now - last_used_time as f64 / 1000.0 < template.cooldown as f64 {
            return reject(result, UseFailure::Cooldown);
        }

        let Some(level_data) = template.level_data(current_level) else {
            return reject(result, UseFailure::InvalidLevel);
        };

        if caster.mana < template.mana_cost {
            return reject(result, UseFailure::NoMana);
        }

        // Strictly greater: a skill must never drop its own caster to zero
        // through its cost.
        if caster.health <= template.health_cost {
            return reject(result, UseFailure::NoHealth);
        }

        if let (Some(target_id), TargetKind::Enemy) = (&request.target_id, template.target_type) {
            let in_range = target_index(targets, target_id)
                .map(|idx| caster.position.distance(targets[idx].position()) <= template.range)
                .unwrap_or(false);
            if !in_range {
                return reject(result, UseFailure::OutOfRange);
            }
        }

        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            // A handler that panicked mid-roll must not take the rest of the
            // server down with it.
            Err(_) => return reject(result, UseFailure::Internal),
        };

        let mut result = result;
        caster.mana -= template.mana_cost;
        caster.health -= template.health_cost;
        result.mana_cost = template.mana_cost;
        result.health_cost = template.health_cost;
        if let Some(learned) = caster.learned_skill_mut(request.skill_id) {
            learned.last_used_time = (now * 1000.0) as i64;
        }
        result.success = true;

        match template.target_type {
            TargetKind::Enemy => self.execute_single_target(
                caster,
                targets,
                &template,
                level_data,
                request,
                &mut result,
                now,
                &mut rng,
            ),
            TargetKind::Area => self.execute_area(
                caster,
                targets,
                &template,
                level_data,
                request,
                &mut result,
                now,
                &mut rng,
            ),
            // Ally resolves as self until a party system exists.
            // TODO: route ally targeting through group membership once parties land.
            TargetKind::Caster | TargetKind::Ally => {
                self.execute_self(caster, &template, level_data, &mut result, now, &mut rng)
            }
        }
        drop(rng);

        self.persistence.save(caster);
        debug!(
            caster = %caster.id,
            skill = template.id,
            targets = result.targets.len(),
            "skill resolved"
        );
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_single_target(
        &self,
        caster: &mut Character,
        targets: &mut [&mut dyn Combatant],
        template: &SkillTemplate,
        level_data: &SkillLevelData,
        request: &UseSkillRequest,
        result: &mut SkillResult,
        now: f64,
        rng: &mut Rng,
    ) {
        let Some(target_id) = request.target_id.as_deref() else {
            return;
        };
        let Some(idx) = target_index(targets, target_id) else {
            return;
        };
        let target: &mut dyn Combatant = &mut *targets[idx];
        if !target.is_alive() {
            return;
        }
        let target_result = self.strike(caster, target, template, level_data, now, rng);
        result.targets.push(target_result);
    }

    #[allow(clippy::too_many_arguments)]
    fn execute_area(
        &self,
        caster: &mut Character,
        targets: &mut [&mut dyn Combatant],
        template: &SkillTemplate,
        level_data: &SkillLevelData,
        request: &UseSkillRequest,
        result: &mut SkillResult,
        now: f64,
        rng: &mut Rng,
    ) {
        let center = request.target_position.unwrap_or(caster.position);
        for idx in 0..targets.len() {
            let eligible = {
                let target = &targets[idx];
                target.is_alive() && center.distance(target.position()) <= template.area_radius
            };
            if !eligible {
                continue;
            }
            let target: &mut dyn Combatant = &mut *targets[idx];
            let target_result = self.strike(caster, target, template, level_data, now, rng);
            result.targets.push(target_result);
        }
        debug!(skill = template.id, hit = result.targets.len(), "area skill resolved");
    }

    fn execute_self(
        &self,
        caster: &mut Character,
        template: &SkillTemplate,
        level_data: &SkillLevelData,
        result: &mut SkillResult,
        now: f64,
        rng: &mut Rng,
    ) {
        let mut target_result = SkillTargetResult::new(
            caster.id.clone(),
            caster.name.clone(),
            CombatantKind::Player,
        );

        if level_data.base_healing > 0 {
            let healing = skill_healing(level_data, caster.magic_power);
            caster.heal(healing);
            target_result.healing = healing;
            target_result.remaining_health = caster.health;
        }

        let caster_id = caster.id.clone();
        for effect in template
            .effects
            .iter()
            .filter(|e| e.effect_type == EffectType::BuffStat)
        {
            self.roll_effect(effect, &caster_id, &caster_id, template.id, &mut target_result, now, rng);
        }

        result.targets.push(target_result);
    }

    /// Single-target damage pipeline shared by enemy and area dispatch: roll,
    /// apply, award experience on a kill, then roll the template's effects.
    fn strike(
        &self,
        caster: &mut Character,
        target: &mut dyn Combatant,
        template: &SkillTemplate,
        level_data: &SkillLevelData,
        now: f64,
        rng: &mut Rng,
    ) -> SkillTargetResult {
        let mut target_result = SkillTargetResult::new(
            target.id().to_string(),
            target.name().to_string(),
            target.kind(),
        );

        let roll = roll_damage(
            template,
            level_data,
            caster.attack_power,
            caster.magic_power,
            caster.dexterity,
            target.defense(),
            rng,
        );
        target_result.damage = target.take_damage(roll.damage);
        target_result.is_critical = roll.is_critical;
        target_result.remaining_health = target.health();
        target_result.target_died = !target.is_alive();

        if target_result.target_died {
            let amount = self.experience.experience_reward(
                caster.level,
                target.level(),
                target.experience_reward(),
            );
            let leveled_up = self.experience.award(caster, amount);
            target_result.experience_gained = amount;
            target_result.leveled_up = leveled_up;
            target_result.new_level = caster.level;
            info!(
                caster = %caster.id,
                skill = template.id,
                target_id = %target_result.target_id,
                experience = amount,
                "target killed"
            );
        }

        let caster_id = caster.id.clone();
        let target_id = target_result.target_id.clone();
        for effect in &template.effects {
            self.roll_effect(
                effect,
                &caster_id,
                &target_id,
                template.id,
                &mut target_result,
                now,
                rng,
            );
        }

        target_result
    }

    /// One Bernoulli draw for one effect; on success registers it with the
    /// tracker and records it on the target result.
    #[allow(clippy::too_many_arguments)]
    fn roll_effect(
        &self,
        effect: &SkillEffect,
        source_id: &str,
        target_id: &str,
        skill_id: u32,
        target_result: &mut SkillTargetResult,
        now: f64,
        rng: &mut Rng,
    ) {
        if rng.next_f64() > effect.chance as f64 {
            return;
        }
        self.effects.apply(
            target_id,
            ActiveEffect {
                // Placeholder; the tracker assigns the real id.
                id: 0,
                skill_id,
                effect_type: effect.effect_type,
                target_stat: effect.target_stat.clone(),
                value: effect.value,
                start_time: now,
                duration: effect.duration,
                source_id: source_id.to_string(),
            },
        );
        target_result.applied_effects.push(AppliedEffect {
            effect_type: effect.effect_type,
            value: effect.value,
            duration: effect.duration,
        });
    }
}

fn reject(mut result: SkillResult, reason: UseFailure) -> SkillResult {
    result.fail_reason = Some(reason);
    result
}

fn target_index(targets: &[&mut dyn Combatant], target_id: &str) -> Option<usize> {
    targets.iter().position(|t| t.id() == target_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(damage_type: DamageType) -> SkillTemplate {
        serde_json::from_str(&format!(
            r#"{{
                "id": 1,
                "name": "Test",
                "skillType": "active",
                "damageType": "{}",
                "targetType": "enemy",
                "maxLevel": 1,
                "levels": [{{"level": 1, "baseDamage": 10, "damageMultiplier": 0.5}}]
            }}"#,
            match damage_type {
                DamageType::Physical => "physical",
                DamageType::Magical => "magical",
                DamageType::True => "true",
            }
        ))
        .unwrap()
    }

    #[test]
    fn defense_reduction_baseline_and_clamp() {
        assert_eq!(defense_reduction(0), 1.0);
        assert_eq!(defense_reduction(100), 0.5);
        assert_eq!(defense_reduction(10_000_000), 0.1);
        assert_eq!(defense_reduction(-50), 1.0);
    }

    #[test]
    fn crit_chance_scales_with_dexterity_for_physical() {
        assert_eq!(crit_chance(DamageType::Physical, 0, 0.0), 0.01);
        assert_eq!(crit_chance(DamageType::Physical, 100, 0.0), 0.01 + 0.3);
        assert_eq!(crit_chance(DamageType::Magical, 100, 0.0), 0.05);
    }

    #[test]
    fn roll_damage_uses_attack_power_for_physical() {
        let template = template(DamageType::Physical);
        let mut forced = template.level_data(1).unwrap().clone();
        forced.crit_chance_bonus = -1.0;
        let mut rng = Rng::new(1);
        let roll = roll_damage(&template, &forced, 40, 999, 0, 0, &mut rng);
        assert_eq!(roll.damage, 30);
        assert!(!roll.is_critical);
    }

    #[test]
    fn roll_damage_uses_magic_power_for_magical() {
        let mut template = template(DamageType::Magical);
        template.levels[0].crit_chance_bonus = -1.0;
        let level_data = template.level_data(1).unwrap().clone();
        let mut rng = Rng::new(1);
        let roll = roll_damage(&template, &level_data, 999, 40, 0, 0, &mut rng);
        assert_eq!(roll.damage, 30);
    }

    #[test]
    fn forced_crit_rounds_at_one_and_a_half() {
        let mut template = template(DamageType::Physical);
        template.levels[0].crit_chance_bonus = 1.0;
        let level_data = template.level_data(1).unwrap().clone();
        let mut rng = Rng::new(1);
        let roll = roll_damage(&template, &level_data, 40, 0, 0, 0, &mut rng);
        assert!(roll.is_critical);
        assert_eq!(roll.damage, 45);
    }

    #[test]
    fn damage_never_drops_below_one() {
        let mut template = template(DamageType::Physical);
        template.levels[0].base_damage = 1;
        template.levels[0].damage_multiplier = 0.0;
        template.levels[0].crit_chance_bonus = -1.0;
        let level_data = template.level_data(1).unwrap().clone();
        let mut rng = Rng::new(1);
        let roll = roll_damage(&template, &level_data, 0, 0, 0, 1_000_000, &mut rng);
        assert_eq!(roll.damage, 1);
    }

    #[test]
    fn healing_scales_from_magic_power() {
        let template = template(DamageType::Magical);
        let mut level_data = template.level_data(1).unwrap().clone();
        level_data.base_healing = 20;
        assert_eq!(skill_healing(&level_data, 30), 35);
        assert_eq!(skill_healing(&level_data, 0), 20);
    }
}
