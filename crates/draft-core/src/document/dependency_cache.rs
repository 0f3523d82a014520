//! Dependency edges derived from Reference Links
//!
//! Rebuilt lazily after any structural change (create, remove, rename, link
//! property change).

use std::collections::{BTreeMap, BTreeSet, HashMap};

use uuid::Uuid;

use crate::feature::Feature;

/// Cached dependency graph of a document
#[derive(Debug, Clone, Default)]
pub(crate) struct DependencyCache {
    /// Whether the cache is up to date
    pub valid: bool,
    /// feature -> features it references
    pub dependencies: HashMap<Uuid, BTreeSet<Uuid>>,
    /// feature -> features referencing it
    pub dependents: HashMap<Uuid, BTreeSet<Uuid>>,
}

impl DependencyCache {
    /// Mark the cache as invalid
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Rebuild edges from the current links. Links to missing features add no edge.
    pub fn rebuild(
        &mut self,
        features: &HashMap<Uuid, Feature>,
        name_index: &BTreeMap<String, Uuid>,
    ) {
        self.dependencies.clear();
        self.dependents.clear();

        for (id, feature) in features {
            for target in feature.link_targets() {
                if let Some(&target_id) = name_index.get(target) {
                    self.dependencies.entry(*id).or_default().insert(target_id);
                    self.dependents.entry(target_id).or_default().insert(*id);
                }
            }
        }

        self.valid = true;
    }

    pub fn dependencies_of(&self, id: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.dependencies.get(&id).into_iter().flatten().copied()
    }

    pub fn dependents_of(&self, id: Uuid) -> impl Iterator<Item = Uuid> + '_ {
        self.dependents.get(&id).into_iter().flatten().copied()
    }
}
