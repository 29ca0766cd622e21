//! Read-only catalog snapshot and build selection.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::category::Category;
use super::component::Component;
use super::error::{EngineError, Result};
use crate::normalize::{normalize, RawComponent};

/// Immutable snapshot of the component catalog, indexed by id.
///
/// Passed explicitly into every entry point that needs candidates; nothing
/// in the engine holds a catalog of its own.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    by_id: HashMap<String, Component>,
}

impl Catalog {
    /// Build a snapshot from canonical components. Ids must be unique.
    pub fn from_components(components: impl IntoIterator<Item = Component>) -> Result<Self> {
        let mut by_id = HashMap::new();
        for component in components {
            if by_id.contains_key(&component.id) {
                return Err(EngineError::DuplicateComponent(component.id));
            }
            by_id.insert(component.id.clone(), component);
        }
        Ok(Self { by_id })
    }

    /// Normalize raw records and build a snapshot from them.
    pub fn from_raw(records: impl IntoIterator<Item = RawComponent>) -> Result<Self> {
        Self::from_components(records.into_iter().map(|r| normalize(&r)))
    }

    /// Parse a JSON array of raw records.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<RawComponent> = serde_json::from_str(json)?;
        Self::from_raw(records)
    }

    pub fn get(&self, id: &str) -> Option<&Component> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// All components in `category`, ordered by id.
    pub fn by_category(&self, category: &Category) -> Vec<&Component> {
        let mut out: Vec<&Component> = self
            .by_id
            .values()
            .filter(|c| &c.category == category)
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }

    /// Every component that can fill the build slot of `category`, ordered by
    /// id. Wheels and wheelsets are offered together.
    pub fn by_slot(&self, category: &Category) -> Vec<&Component> {
        let mut out: Vec<&Component> = self
            .by_id
            .values()
            .filter(|c| c.category.shares_slot(category))
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}

/// The parts a user has picked so far: at most one per category.
///
/// `Wheel` and `Wheelset` share a slot. Components of unknown categories are
/// never slotted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Build {
    parts: BTreeMap<Category, Component>,
}

impl Build {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `ids` against `catalog`. Unknown ids are an error; components
    /// of unknown categories are skipped.
    pub fn from_ids<S: AsRef<str>>(catalog: &Catalog, ids: &[S]) -> Result<Self> {
        let mut build = Self::new();
        for id in ids {
            let id = id.as_ref();
            let component = catalog
                .get(id)
                .ok_or_else(|| EngineError::ComponentNotFound(id.to_string()))?;
            build.select(component.clone());
        }
        Ok(build)
    }

    /// Put `component` in its slot, returning whatever it replaced.
    pub fn select(&mut self, component: Component) -> Option<Component> {
        if !component.category.is_known() {
            debug!(
                id = %component.id,
                category = %component.category,
                "skipping component of unknown category"
            );
            return None;
        }
        let slot = slot_for(&component.category);
        let previous = if slot == Category::Wheel {
            self.parts
                .remove(&Category::Wheel)
                .or_else(|| self.parts.remove(&Category::Wheelset))
        } else {
            None
        };
        let replaced = self.parts.insert(component.category.clone(), component);
        replaced.or(previous)
    }

    /// Builder form of [`Build::select`].
    pub fn with(mut self, component: Component) -> Self {
        self.select(component);
        self
    }

    pub fn get(&self, category: &Category) -> Option<&Component> {
        if category.is_wheel() {
            return self.wheel();
        }
        self.parts.get(category)
    }

    /// The selected wheel or wheelset.
    pub fn wheel(&self) -> Option<&Component> {
        self.parts
            .get(&Category::Wheel)
            .or_else(|| self.parts.get(&Category::Wheelset))
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.parts.values()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

fn slot_for(category: &Category) -> Category {
    if category.is_wheel() {
        Category::Wheel
    } else {
        category.clone()
    }
}
