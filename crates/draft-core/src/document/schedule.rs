//! Recompute scheduling
//!
//! A pass takes a set of features, orders them dependencies-first (ties
//! broken by name), fails every member of a dependency cycle, and runs the
//! rest in order. A failure only blocks the features downstream of it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use glam::DVec3;
use uuid::Uuid;

use super::{Document, DocumentError, DocumentResult};
use crate::feature::{Feature, FeatureStatus, RecomputeError, RecomputeResult, ReferenceResolver};
use crate::property::LinkSub;

/// Outcome of a recompute pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecomputeReport {
    /// Final status of every feature in the document, by name
    pub statuses: BTreeMap<String, FeatureStatus>,
    /// Features whose derivation ran, in execution order
    pub order: Vec<String>,
    /// Features left Dirty after the pass (touched by a changed output)
    pub pending: Vec<String>,
}

impl RecomputeReport {
    pub fn status(&self, name: &str) -> Option<&FeatureStatus> {
        self.statuses.get(name)
    }

    /// Features that ended in Error, by name
    pub fn failures(&self) -> impl Iterator<Item = (&str, &RecomputeError)> {
        self.statuses
            .iter()
            .filter_map(|(name, status)| status.error().map(|err| (name.as_str(), err)))
    }

    /// True when no feature failed and nothing is left pending
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none() && self.pending.is_empty()
    }
}

impl Document {
    /// Recompute every Dirty feature
    pub fn recompute_all(&mut self) -> RecomputeReport {
        let dirty: BTreeSet<Uuid> = self
            .features
            .values()
            .filter(|f| f.must_execute())
            .map(Feature::id)
            .collect();
        self.run_pass(dirty)
    }

    /// Recompute one feature, even if it is already Valid.
    ///
    /// Dirty (or failed) features it depends on are recomputed first in the
    /// same pass. Fails with [`DocumentError::Recompute`] when the feature
    /// itself ends in Error.
    pub fn recompute_feature(&mut self, name: &str) -> DocumentResult<RecomputeReport> {
        let id = self.id_of(name)?;
        self.ensure_cache_valid();

        let mut scheduled = BTreeSet::from([id]);
        let mut stack = vec![id];
        let mut visited = BTreeSet::from([id]);
        while let Some(current) = stack.pop() {
            let dependencies: Vec<Uuid> = self.cache.borrow().dependencies_of(current).collect();
            for dependency in dependencies {
                if !visited.insert(dependency) {
                    continue;
                }
                if self
                    .features
                    .get(&dependency)
                    .is_some_and(|f| !f.status().is_valid())
                {
                    scheduled.insert(dependency);
                }
                stack.push(dependency);
            }
        }

        for id in &scheduled {
            if let Some(feature) = self.features.get_mut(id) {
                feature.touch();
            }
        }

        let report = self.run_pass(scheduled);
        match report.status(name) {
            Some(FeatureStatus::Error(err)) => Err(DocumentError::Recompute {
                feature: name.to_string(),
                source: err.clone(),
            }),
            _ => Ok(report),
        }
    }

    fn run_pass(&mut self, scheduled: BTreeSet<Uuid>) -> RecomputeReport {
        self.ensure_cache_valid();

        let plan = {
            let cache = self.cache.borrow();
            let mut deps: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
            for id in &scheduled {
                let Some(feature) = self.features.get(id) else {
                    continue;
                };
                let inside: BTreeSet<String> = cache
                    .dependencies_of(*id)
                    .filter(|dep| scheduled.contains(dep))
                    .filter_map(|dep| self.features.get(&dep))
                    .map(|f| f.name().to_string())
                    .collect();
                deps.insert(feature.name().to_string(), inside);
            }
            plan(&deps)
        };

        for members in &plan.cycles {
            tracing::warn!("Dependency cycle: {}", members.join(" -> "));
            for member in members {
                if let Some(feature) = self.feature_mut(member) {
                    feature.set_status(FeatureStatus::Error(RecomputeError::DependencyCycle {
                        members: members.clone(),
                    }));
                }
            }
        }

        let mut report = RecomputeReport::default();
        for name in &plan.order {
            let Some(&id) = self.name_index.get(name) else {
                continue;
            };

            if let Some(source) = self.failed_upstream(id) {
                tracing::warn!("Skipping '{}': upstream '{}' failed", name, source);
                if let Some(feature) = self.features.get_mut(&id) {
                    feature.set_status(FeatureStatus::Error(RecomputeError::UpstreamError(
                        source,
                    )));
                }
                continue;
            }

            let derived = match self.features.get(&id) {
                Some(feature) => {
                    let lookup = FeatureLookup {
                        features: &self.features,
                        name_index: &self.name_index,
                    };
                    feature.derive(&lookup, &self.config)
                }
                None => continue,
            };
            report.order.push(name.clone());

            let Some(feature) = self.features.get_mut(&id) else {
                continue;
            };
            match derived.and_then(|values| feature.apply(values)) {
                Ok(changed) => {
                    tracing::debug!("Recomputed '{}'", name);
                    feature.set_status(FeatureStatus::Valid);
                    if changed {
                        self.touch_unscheduled_dependents(id, &scheduled);
                    }
                }
                Err(err) => {
                    tracing::warn!("Feature '{}' failed: {}", name, err);
                    feature.set_status(FeatureStatus::Error(err));
                }
            }
        }

        for feature in self.features() {
            report
                .statuses
                .insert(feature.name().to_string(), feature.status().clone());
            if feature.status().is_dirty() {
                report.pending.push(feature.name().to_string());
            }
        }

        tracing::info!(
            "Recompute pass: {} executed, {} failed, {} pending",
            report.order.len(),
            report.failures().count(),
            report.pending.len()
        );
        report
    }

    fn feature_mut(&mut self, name: &str) -> Option<&mut Feature> {
        let id = self.name_index.get(name)?;
        self.features.get_mut(id)
    }

    /// Name of the feature that caused a failed dependency of `id`, if any
    fn failed_upstream(&self, id: Uuid) -> Option<String> {
        let cache = self.cache.borrow();
        let mut failed: Vec<String> = cache
            .dependencies_of(id)
            .filter(|dep| *dep != id)
            .filter_map(|dep| self.features.get(&dep))
            .filter_map(|dep| match dep.status().error()? {
                RecomputeError::UpstreamError(source) => Some(source.clone()),
                _ => Some(dep.name().to_string()),
            })
            .collect();
        failed.sort();
        failed.into_iter().next()
    }

    /// A changed output invalidates dependents that this pass will not visit
    fn touch_unscheduled_dependents(&mut self, id: Uuid, scheduled: &BTreeSet<Uuid>) {
        let outside: Vec<Uuid> = self
            .cache
            .borrow()
            .dependents_of(id)
            .filter(|dep| !scheduled.contains(dep))
            .collect();
        for dependent in outside {
            self.propagate_touch(dependent);
        }
    }
}

/// Resolves links against the features of a document
struct FeatureLookup<'a> {
    features: &'a HashMap<Uuid, Feature>,
    name_index: &'a BTreeMap<String, Uuid>,
}

impl ReferenceResolver for FeatureLookup<'_> {
    fn resolve_point(
        &self,
        property: &str,
        link: Option<&LinkSub>,
        default_sub: &str,
    ) -> RecomputeResult<DVec3> {
        let unresolved = |reason: String| RecomputeError::UnresolvedReference {
            property: property.to_string(),
            reason,
        };

        let link = link.ok_or_else(|| unresolved(String::from("reference is not set")))?;
        let target = self
            .name_index
            .get(&link.target)
            .and_then(|id| self.features.get(id))
            .ok_or_else(|| unresolved(format!("feature '{}' does not exist", link.target)))?;

        match target.status() {
            FeatureStatus::Valid => {}
            FeatureStatus::Dirty => {
                return Err(unresolved(format!(
                    "feature '{}' is not up to date",
                    target.name()
                )));
            }
            FeatureStatus::Error(RecomputeError::UpstreamError(source)) => {
                return Err(RecomputeError::UpstreamError(source.clone()));
            }
            FeatureStatus::Error(_) => {
                return Err(RecomputeError::UpstreamError(target.name().to_string()));
            }
        }

        let sub = link.sub_or(default_sub);
        if let Some(index) = LinkSub::vertex_index(sub) {
            return target
                .polygon_points()
                .and_then(|points| points.get(index))
                .copied()
                .ok_or_else(|| unresolved(format!("'{}' has no vertex {index}", target.name())));
        }
        target
            .properties()
            .vector(sub)
            .ok_or_else(|| unresolved(format!("'{}' has no point '{sub}'", target.name())))
    }
}

/// Execution plan of a pass
#[derive(Debug, Default, PartialEq)]
struct Plan {
    /// Features to run, dependencies first
    order: Vec<String>,
    /// Strongly connected groups of features that form a cycle, each sorted
    cycles: Vec<Vec<String>>,
}

/// Plan a pass over `deps` (feature -> dependencies inside the pass)
fn plan(deps: &BTreeMap<String, BTreeSet<String>>) -> Plan {
    let (_, stuck) = topological_order(deps, &BTreeSet::new());

    let reach: BTreeMap<&str, BTreeSet<&str>> = stuck
        .iter()
        .map(|name| (name.as_str(), reachable(deps, name, &stuck)))
        .collect();

    let mut cycles = Vec::new();
    let mut excluded = BTreeSet::new();
    for (&name, reached) in &reach {
        if !reached.contains(name) || excluded.contains(name) {
            continue;
        }
        let members: Vec<String> = reached
            .iter()
            .filter(|other| reach.get(**other).is_some_and(|r| r.contains(name)))
            .map(|other| other.to_string())
            .collect();
        excluded.extend(members.iter().cloned());
        cycles.push(members);
    }

    let (order, _) = topological_order(deps, &excluded);
    Plan { order, cycles }
}

/// Kahn's algorithm with a lexically ordered ready set. Nodes in `excluded`
/// are dropped along with their edges. Returns the order and the nodes
/// that could not be placed.
fn topological_order(
    deps: &BTreeMap<String, BTreeSet<String>>,
    excluded: &BTreeSet<String>,
) -> (Vec<String>, BTreeSet<String>) {
    let mut waiting: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for (name, node_deps) in deps {
        if excluded.contains(name) {
            continue;
        }
        let mut count = 0;
        for dep in node_deps {
            if excluded.contains(dep) || !deps.contains_key(dep) {
                continue;
            }
            count += 1;
            dependents.entry(dep.as_str()).or_default().push(name.as_str());
        }
        waiting.insert(name.as_str(), count);
    }

    let mut ready: BTreeSet<&str> = waiting
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut order = Vec::new();

    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());
        for &dependent in dependents.get(name).into_iter().flatten() {
            if let Some(count) = waiting.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    let stuck = waiting
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(name, _)| name.to_string())
        .collect();
    (order, stuck)
}

/// Nodes reachable from `start` by following dependencies within `within`
fn reachable<'a>(
    deps: &'a BTreeMap<String, BTreeSet<String>>,
    start: &str,
    within: &BTreeSet<String>,
) -> BTreeSet<&'a str> {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<&str> = deps
        .get(start)
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect();

    while let Some(name) = stack.pop() {
        if !within.contains(name) || !seen.insert(name) {
            continue;
        }
        if let Some(next) = deps.get(name) {
            stack.extend(next.iter().map(String::as_str));
        }
    }
    seen
}
