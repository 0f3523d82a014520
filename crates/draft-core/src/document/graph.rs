//! Graph operations for Document (create, remove, rename, touch)

use std::collections::{BTreeSet, HashSet};

use uuid::Uuid;

use super::{Document, DocumentError, DocumentResult};
use crate::feature::{Feature, FeatureKind};

impl Document {
    /// Create a feature of `kind` named `name`. The new feature starts Dirty.
    pub fn create_feature(&mut self, kind: FeatureKind, name: &str) -> DocumentResult<Uuid> {
        validate_name(name)?;
        if self.name_index.contains_key(name) {
            return Err(DocumentError::DuplicateName(name.to_string()));
        }

        let feature = Feature::new(kind, name, &self.config);
        let id = feature.id();
        self.name_index.insert(name.to_string(), id);
        self.features.insert(id, feature);
        self.invalidate_cache();

        // Links that were dangling on this name resolve now
        self.propagate_touch(id);

        tracing::info!("Created {} '{}'", kind, name);
        Ok(id)
    }

    /// Remove a feature.
    ///
    /// Links pointing at it are left in place; the referencing features are
    /// touched and fail with an unresolved reference on their next recompute.
    pub fn remove_feature(&mut self, name: &str) -> DocumentResult<Feature> {
        let id = self.id_of(name)?;

        self.ensure_cache_valid();
        let dependents: Vec<Uuid> = self
            .cache
            .borrow()
            .dependents_of(id)
            .filter(|dep| *dep != id)
            .collect();

        self.name_index.remove(name);
        let feature = self
            .features
            .remove(&id)
            .ok_or_else(|| DocumentError::UnknownFeature(name.to_string()))?;
        self.invalidate_cache();

        for dependent in dependents {
            self.propagate_touch(dependent);
        }

        tracing::info!("Removed {} '{}'", feature.kind(), name);
        Ok(feature)
    }

    /// Rename a feature. Links naming the old name are rewritten to follow it.
    pub fn rename_feature(&mut self, old: &str, new: &str) -> DocumentResult<()> {
        let id = self.id_of(old)?;
        if old == new {
            return Ok(());
        }
        validate_name(new)?;
        if self.name_index.contains_key(new) {
            return Err(DocumentError::DuplicateName(new.to_string()));
        }

        self.ensure_cache_valid();
        let before: BTreeSet<Uuid> = self.cache.borrow().dependents_of(id).collect();

        let mut rewritten = 0;
        for feature in self.features.values_mut() {
            rewritten += feature.retarget_links(old, new);
        }
        if let Some(feature) = self.features.get_mut(&id) {
            feature.set_name(new.to_string());
        }
        self.name_index.remove(old);
        self.name_index.insert(new.to_string(), id);
        self.invalidate_cache();

        // Links that were dangling on the new name now resolve to this feature
        self.ensure_cache_valid();
        let gained: Vec<Uuid> = self
            .cache
            .borrow()
            .dependents_of(id)
            .filter(|dep| !before.contains(dep))
            .collect();
        for dependent in gained {
            self.propagate_touch(dependent);
        }

        tracing::info!(
            "Renamed '{}' to '{}' ({} link(s) rewritten)",
            old,
            new,
            rewritten
        );
        Ok(())
    }

    /// First free name of the form `base`, `base001`, `base002`, ...
    pub fn unique_name(&self, base: &str) -> String {
        if !self.name_index.contains_key(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}{n:03}"))
            .find(|candidate| !self.name_index.contains_key(candidate))
            .unwrap_or_else(|| format!("{base}{}", self.features.len() + 1))
    }

    /// Mark a feature and everything depending on it Dirty
    pub fn touch(&mut self, name: &str) -> DocumentResult<()> {
        let id = self.id_of(name)?;
        self.propagate_touch(id);
        Ok(())
    }

    /// Touch `id`, then walk its dependents transitively. The walk stops at
    /// features that were already Dirty.
    pub(crate) fn propagate_touch(&mut self, id: Uuid) {
        self.ensure_cache_valid();
        let cache = self.cache.borrow();

        if let Some(feature) = self.features.get_mut(&id) {
            feature.touch();
        }

        let mut visited = HashSet::from([id]);
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            for dependent in cache.dependents_of(current) {
                if !visited.insert(dependent) {
                    continue;
                }
                if let Some(feature) = self.features.get_mut(&dependent)
                    && feature.touch()
                {
                    tracing::debug!("Touched dependent '{}'", feature.name());
                    stack.push(dependent);
                }
            }
        }
    }
}

fn validate_name(name: &str) -> DocumentResult<()> {
    if name.is_empty() || name.trim() != name || name.contains('.') {
        return Err(DocumentError::InvalidName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{LinkSub, PropertyValue};

    fn link(target: &str) -> PropertyValue {
        PropertyValue::Link(Some(LinkSub::new(target)))
    }

    #[test]
    fn test_create_duplicate() {
        let mut doc = Document::new("test");
        doc.create_feature(FeatureKind::Line, "L").unwrap();

        assert_eq!(
            doc.create_feature(FeatureKind::Circle, "L"),
            Err(DocumentError::DuplicateName("L".into()))
        );
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.feature("L").unwrap().kind(), FeatureKind::Line);
    }

    #[test]
    fn test_invalid_names() {
        let mut doc = Document::new("test");
        for name in ["", " L", "L.1"] {
            assert!(matches!(
                doc.create_feature(FeatureKind::Line, name),
                Err(DocumentError::InvalidName(_))
            ));
        }
    }

    #[test]
    fn test_unique_name() {
        let mut doc = Document::new("test");
        assert_eq!(doc.unique_name("Line"), "Line");
        doc.create_feature(FeatureKind::Line, "Line").unwrap();
        assert_eq!(doc.unique_name("Line"), "Line001");
        doc.create_feature(FeatureKind::Line, "Line001").unwrap();
        assert_eq!(doc.unique_name("Line"), "Line002");
    }

    #[test]
    fn test_touch_propagates_transitively() {
        let mut doc = Document::new("test");
        doc.create_feature(FeatureKind::Line, "A").unwrap();
        doc.create_feature(FeatureKind::Dimension, "B").unwrap();
        doc.create_feature(FeatureKind::Dimension, "C").unwrap();
        doc.create_feature(FeatureKind::Line, "Other").unwrap();
        doc.set_property("B", "First", link("A")).unwrap();
        doc.set_property("B", "Second", link("A")).unwrap();
        doc.set_property("C", "First", link("B")).unwrap();
        doc.set_property("C", "Second", link("B")).unwrap();
        doc.recompute_all();
        for name in ["A", "B", "C", "Other"] {
            assert!(doc.status(name).unwrap().is_valid(), "{name}");
        }

        doc.touch("A").unwrap();
        assert!(doc.status("A").unwrap().is_dirty());
        assert!(doc.status("B").unwrap().is_dirty());
        assert!(doc.status("C").unwrap().is_dirty());
        assert!(doc.status("Other").unwrap().is_valid());
    }

    #[test]
    fn test_touch_terminates_on_cycle() {
        let mut doc = Document::new("test");
        doc.create_feature(FeatureKind::Dimension, "A").unwrap();
        doc.create_feature(FeatureKind::Dimension, "B").unwrap();
        doc.set_property("A", "First", link("B")).unwrap();
        doc.set_property("B", "First", link("A")).unwrap();
        doc.recompute_all();

        doc.touch("A").unwrap();
        assert!(doc.status("A").unwrap().is_dirty());
        assert!(doc.status("B").unwrap().is_dirty());
    }

    #[test]
    fn test_dependency_queries() {
        let mut doc = Document::new("test");
        doc.create_feature(FeatureKind::Line, "L").unwrap();
        doc.create_feature(FeatureKind::Circle, "C").unwrap();
        doc.create_feature(FeatureKind::Dimension, "D").unwrap();
        doc.set_property("D", "First", link("L")).unwrap();
        doc.set_property("D", "Second", link("C")).unwrap();

        assert_eq!(doc.dependencies_of("D").unwrap(), vec!["C", "L"]);
        assert_eq!(doc.dependents_of("L").unwrap(), vec!["D"]);
        assert!(doc.dependents_of("D").unwrap().is_empty());
    }

    #[test]
    fn test_rename_rewrites_links() {
        let mut doc = Document::new("test");
        doc.create_feature(FeatureKind::Line, "L").unwrap();
        doc.create_feature(FeatureKind::Dimension, "D").unwrap();
        doc.set_property("D", "First", link("L")).unwrap();

        doc.rename_feature("L", "Edge").unwrap();

        assert!(doc.feature("L").is_none());
        assert_eq!(doc.feature("Edge").unwrap().name(), "Edge");
        assert_eq!(doc.get_property("D", "First").unwrap(), &link("Edge"));
        assert_eq!(doc.dependents_of("Edge").unwrap(), vec!["D"]);
    }

    #[test]
    fn test_rename_to_existing_fails() {
        let mut doc = Document::new("test");
        doc.create_feature(FeatureKind::Line, "A").unwrap();
        doc.create_feature(FeatureKind::Line, "B").unwrap();

        assert_eq!(
            doc.rename_feature("A", "B"),
            Err(DocumentError::DuplicateName("B".into()))
        );
        assert!(doc.contains("A"));
        assert!(matches!(
            doc.rename_feature("Missing", "C"),
            Err(DocumentError::UnknownFeature(_))
        ));
    }

    #[test]
    fn test_create_resolves_dangling_link() {
        let mut doc = Document::new("test");
        doc.create_feature(FeatureKind::Dimension, "D").unwrap();
        doc.set_property("D", "First", link("L")).unwrap();
        doc.set_property("D", "Second", link("L")).unwrap();
        doc.recompute_all();
        assert!(doc.status("D").unwrap().is_error());

        doc.create_feature(FeatureKind::Line, "L").unwrap();
        assert!(doc.status("D").unwrap().is_dirty());
        doc.recompute_all();
        assert!(doc.status("D").unwrap().is_valid());
    }
}
