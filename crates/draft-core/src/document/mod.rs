//! Document Graph
//!
//! The document owns every feature, indexes them by name and tracks the
//! dependency graph induced by Reference Links. Property changes touch the
//! owning feature and everything downstream of it; [`Document::recompute_all`]
//! then brings the dirty part of the graph up to date in dependency order.

mod builders;
mod dependency_cache;
mod graph;
mod schedule;

pub use schedule::RecomputeReport;

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use glam::DVec3;
use parking_lot::Mutex;
use thiserror::Error;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::feature::{Feature, FeatureKind, FeatureStatus, RecomputeError};
use crate::property::{PropertyError, PropertyValue};

use dependency_cache::DependencyCache;

/// Document-level errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DocumentError {
    #[error("a feature named '{0}' already exists")]
    DuplicateName(String),

    #[error("invalid feature name '{0}'")]
    InvalidName(String),

    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("feature '{feature}' has no property '{property}'")]
    UnknownProperty { feature: String, property: String },

    #[error(transparent)]
    Property(#[from] PropertyError),

    #[error("feature '{feature}' is a {actual}, expected a {expected}")]
    WrongKind {
        feature: String,
        expected: FeatureKind,
        actual: FeatureKind,
    },

    #[error("recompute of '{feature}' failed: {source}")]
    Recompute {
        feature: String,
        #[source]
        source: RecomputeError,
    },
}

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// A document behind the single lock required for multi-threaded use
pub type SharedDocument = Arc<Mutex<Document>>;

/// Wrap a document for sharing between threads
pub fn create_shared_document(document: Document) -> SharedDocument {
    Arc::new(Mutex::new(document))
}

/// Container of all features and their dependency graph
#[derive(Debug)]
pub struct Document {
    pub name: String,
    config: EngineConfig,
    /// All features, keyed by ID
    features: HashMap<Uuid, Feature>,
    /// Name to ID index; iteration order is lexical
    name_index: BTreeMap<String, Uuid>,
    /// Dependency edges (interior mutability for lazy rebuild)
    cache: RefCell<DependencyCache>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("Unnamed")
    }
}

impl Document {
    /// Create a new empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, EngineConfig::default())
    }

    /// Create a new empty document with the given engine settings
    pub fn with_config(name: impl Into<String>, config: EngineConfig) -> Self {
        Self {
            name: name.into(),
            config,
            features: HashMap::new(),
            name_index: BTreeMap::new(),
            cache: RefCell::new(DependencyCache::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the number of features
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Check if the document is empty
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_index.contains_key(name)
    }

    /// Features in lexical name order
    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.name_index
            .values()
            .filter_map(|id| self.features.get(id))
    }

    /// Get a feature by name
    pub fn feature(&self, name: &str) -> Option<&Feature> {
        self.name_index
            .get(name)
            .and_then(|id| self.features.get(id))
    }

    /// Get the ID of a feature by name
    pub fn id_of(&self, name: &str) -> DocumentResult<Uuid> {
        self.name_index
            .get(name)
            .copied()
            .ok_or_else(|| DocumentError::UnknownFeature(name.to_string()))
    }

    fn require(&self, name: &str) -> DocumentResult<&Feature> {
        self.feature(name)
            .ok_or_else(|| DocumentError::UnknownFeature(name.to_string()))
    }

    fn require_kind(&self, name: &str, expected: FeatureKind) -> DocumentResult<&Feature> {
        let feature = self.require(name)?;
        if feature.kind() != expected {
            return Err(DocumentError::WrongKind {
                feature: name.to_string(),
                expected,
                actual: feature.kind(),
            });
        }
        Ok(feature)
    }

    /// Status of a feature
    pub fn status(&self, name: &str) -> DocumentResult<&FeatureStatus> {
        Ok(self.require(name)?.status())
    }

    // ============== Properties ==============

    /// Get a property value
    pub fn get_property(&self, feature: &str, property: &str) -> DocumentResult<&PropertyValue> {
        self.require(feature)?
            .value(property)
            .ok_or_else(|| DocumentError::UnknownProperty {
                feature: feature.to_string(),
                property: property.to_string(),
            })
    }

    /// Set a property value.
    ///
    /// Fails without modifying anything on unknown names or a type mismatch.
    /// When the value changed, the feature and all its dependents become
    /// Dirty. Returns whether the value changed.
    pub fn set_property(
        &mut self,
        feature: &str,
        property: &str,
        value: PropertyValue,
    ) -> DocumentResult<bool> {
        let id = self.id_of(feature)?;
        let target = self
            .features
            .get_mut(&id)
            .ok_or_else(|| DocumentError::UnknownFeature(feature.to_string()))?;

        let is_link = matches!(value, PropertyValue::Link(_));
        let changed = target.set_property(property, value)?;
        if changed {
            tracing::debug!("{}.{} changed", feature, property);
            if is_link {
                self.invalidate_cache();
            }
            self.propagate_touch(id);
        }
        Ok(changed)
    }

    // ============== Dependency Cache ==============

    /// Invalidate the dependency cache (call after any structural change)
    pub(crate) fn invalidate_cache(&self) {
        self.cache.borrow_mut().invalidate();
    }

    /// Ensure the cache is valid, rebuilding if necessary
    pub(crate) fn ensure_cache_valid(&self) {
        let mut cache = self.cache.borrow_mut();
        if !cache.valid {
            cache.rebuild(&self.features, &self.name_index);
        }
    }

    fn names_of(&self, ids: impl Iterator<Item = Uuid>) -> Vec<String> {
        let mut names: Vec<String> = ids
            .filter_map(|id| self.features.get(&id))
            .map(|f| f.name().to_string())
            .collect();
        names.sort();
        names
    }

    /// Names of the features `name` references directly
    pub fn dependencies_of(&self, name: &str) -> DocumentResult<Vec<String>> {
        let id = self.id_of(name)?;
        self.ensure_cache_valid();
        let cache = self.cache.borrow();
        Ok(self.names_of(cache.dependencies_of(id)))
    }

    /// Names of the features referencing `name` directly
    pub fn dependents_of(&self, name: &str) -> DocumentResult<Vec<String>> {
        let id = self.id_of(name)?;
        self.ensure_cache_valid();
        let cache = self.cache.borrow();
        Ok(self.names_of(cache.dependents_of(id)))
    }

    // ============== Geometry Queries ==============
    //
    // Read-only: these never trigger a recompute.

    /// Direction of a line from StartPoint to EndPoint (zero vector when degenerate)
    pub fn line_direction(&self, name: &str) -> DocumentResult<DVec3> {
        let feature = self.require_kind(name, FeatureKind::Line)?;
        feature
            .line_direction()
            .ok_or_else(|| DocumentError::UnknownProperty {
                feature: name.to_string(),
                property: String::from("EndPoint"),
            })
    }

    /// Whether a circle's sweep is one full turn
    pub fn is_full_circle(&self, name: &str) -> DocumentResult<bool> {
        let feature = self.require_kind(name, FeatureKind::Circle)?;
        feature
            .is_full_circle(self.config.full_circle_tolerance)
            .ok_or_else(|| DocumentError::UnknownProperty {
                feature: name.to_string(),
                property: String::from("LastAngle"),
            })
    }

    /// Last computed distance of a dimension
    pub fn dimension_value(&self, name: &str) -> DocumentResult<f64> {
        let feature = self.require_kind(name, FeatureKind::Dimension)?;
        feature
            .properties()
            .float("Value")
            .ok_or_else(|| DocumentError::UnknownProperty {
                feature: name.to_string(),
                property: String::from("Value"),
            })
    }

    /// Last rendered text of a dimension
    pub fn dimension_text(&self, name: &str) -> DocumentResult<&str> {
        let feature = self.require_kind(name, FeatureKind::Dimension)?;
        feature
            .properties()
            .string("DimensionText")
            .ok_or_else(|| DocumentError::UnknownProperty {
                feature: name.to_string(),
                property: String::from("DimensionText"),
            })
    }

    /// Points of a polygon
    pub fn polygon_points(&self, name: &str) -> DocumentResult<&[DVec3]> {
        let feature = self.require_kind(name, FeatureKind::Polygon)?;
        feature
            .polygon_points()
            .ok_or_else(|| DocumentError::UnknownProperty {
                feature: name.to_string(),
                property: String::from("Points"),
            })
    }

    // ============== Polygon Editing ==============

    /// Append a point to a polygon
    pub fn add_polygon_point(&mut self, name: &str, point: DVec3) -> DocumentResult<()> {
        let mut points = self.polygon_points(name)?.to_vec();
        points.push(point);
        self.set_property(name, "Points", PropertyValue::VectorList(points))?;
        Ok(())
    }

    /// Remove the point at `index` from a polygon.
    ///
    /// An out-of-range index is a no-op and returns `Ok(false)`.
    pub fn remove_polygon_point(&mut self, name: &str, index: usize) -> DocumentResult<bool> {
        let mut points = self.polygon_points(name)?.to_vec();
        if index >= points.len() {
            tracing::debug!("{}: point index {} out of range, ignored", name, index);
            return Ok(false);
        }
        points.remove(index);
        self.set_property(name, "Points", PropertyValue::VectorList(points))
    }
}
