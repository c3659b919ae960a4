//! Skill catalog: loads the skill config into an immutable id -> template map.
//! Load is all-or-nothing; reload swaps a fully built replacement map in one
//! store, so readers never observe a partial catalog.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use super::skill::{SkillFile, SkillTemplate};

pub const DEFAULT_SKILLS_PATH: &str = "data/skills.json";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read skill config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse skill config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate skill id {0}")]
    DuplicateSkillId(u32),
    #[error("skill {skill_id} is missing level data for level {level}")]
    MissingLevelData { skill_id: u32, level: u32 },
    #[error("skill {0} declares maxLevel 0")]
    InvalidMaxLevel(u32),
}

type TemplateMap = HashMap<u32, Arc<SkillTemplate>>;

/// Process-wide table of skill definitions. Read-only between reloads.
#[derive(Debug, Default)]
pub struct SkillCatalog {
    templates: RwLock<Arc<TemplateMap>>,
}

impl SkillCatalog {
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let catalog = Self::load_str(&raw)?;
        info!(count = catalog.len(), path = %path.display(), "skill catalog loaded");
        Ok(catalog)
    }

    pub fn load_str(raw: &str) -> Result<Self, CatalogError> {
        let map = build_templates(raw)?;
        Ok(Self {
            templates: RwLock::new(Arc::new(map)),
        })
    }

    /// Atomically replace the whole catalog from a config file. On error the
    /// previous catalog stays in place.
    pub fn reload_file(&self, path: impl AsRef<Path>) -> Result<usize, CatalogError> {
        let raw = fs::read_to_string(path.as_ref())?;
        self.reload_str(&raw)
    }

    pub fn reload_str(&self, raw: &str) -> Result<usize, CatalogError> {
        let map = build_templates(raw)?;
        let count = map.len();
        let mut guard = self
            .templates
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(map);
        drop(guard);
        info!(count, "skill catalog reloaded");
        Ok(count)
    }

    fn snapshot(&self) -> Arc<TemplateMap> {
        let guard = self
            .templates
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    pub fn get(&self, skill_id: u32) -> Option<Arc<SkillTemplate>> {
        self.snapshot().get(&skill_id).cloned()
    }

    /// Templates restricted to a class, sorted by (requiredLevel, id) ascending.
    pub fn list_by_class(&self, class_name: &str) -> Vec<Arc<SkillTemplate>> {
        let snapshot = self.snapshot();
        let mut skills: Vec<_> = snapshot
            .values()
            .filter(|t| t.required_class == class_name)
            .cloned()
            .collect();
        skills.sort_by_key(|t| (t.required_level, t.id));
        skills
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse and validate a config. Enforces the record invariant at the border:
/// every learnable level 1..=maxLevel must resolve to a levels entry.
fn build_templates(raw: &str) -> Result<TemplateMap, CatalogError> {
    let file: SkillFile = serde_json::from_str(raw)?;
    let mut map = TemplateMap::with_capacity(file.skills.len());
    for template in file.skills {
        let id = template.id;
        if template.max_level == 0 {
            return Err(CatalogError::InvalidMaxLevel(id));
        }
        for level in 1..=template.max_level {
            if template.level_data(level).is_none() {
                return Err(CatalogError::MissingLevelData { skill_id: id, level });
            }
        }
        if map.insert(id, Arc::new(template)).is_some() {
            return Err(CatalogError::DuplicateSkillId(id));
        }
    }
    Ok(map)
}
