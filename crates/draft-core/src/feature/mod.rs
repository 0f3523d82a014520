//! Drawing Features
//!
//! A feature is a named node in a document: common fields plus a property
//! bag whose schema depends on its [`FeatureKind`]. Recomputing a feature
//! is split in two steps so the document can borrow other features while
//! deriving: [`Feature::derive`] reads inputs and produces output values,
//! [`Feature::apply`] writes them back.

mod kind;

pub use kind::*;

use std::fmt;

use glam::DVec3;
use thiserror::Error;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::document::{DocumentError, DocumentResult};
use crate::property::{LinkSub, Property, PropertyBag, PropertyValue};
use crate::shape::{self, ShapeError};

/// Errors raised while recomputing a feature
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecomputeError {
    #[error("unresolved reference '{property}': {reason}")]
    UnresolvedReference { property: String, reason: String },

    #[error("dependency cycle: {}", .members.join(" -> "))]
    DependencyCycle { members: Vec<String> },

    #[error("upstream feature '{0}' failed")]
    UpstreamError(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid format specification '{spec}': {reason}")]
    InvalidFormat { spec: String, reason: String },
}

impl From<ShapeError> for RecomputeError {
    fn from(err: ShapeError) -> Self {
        match err {
            ShapeError::InvalidGeometry(msg) => RecomputeError::InvalidGeometry(msg),
            ShapeError::InvalidFormat { spec, source } => RecomputeError::InvalidFormat {
                spec,
                reason: source.to_string(),
            },
        }
    }
}

/// Result type for recompute operations
pub type RecomputeResult<T> = Result<T, RecomputeError>;

/// Output values produced by a derivation, in write order
pub type DerivedValues = Vec<(&'static str, PropertyValue)>;

/// Recompute state of a feature
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeatureStatus {
    /// Outputs reflect the current inputs
    Valid,
    /// An input changed since the last successful recompute
    #[default]
    Dirty,
    /// The last recompute failed; stays until an input changes
    Error(RecomputeError),
}

impl FeatureStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, FeatureStatus::Valid)
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, FeatureStatus::Dirty)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FeatureStatus::Error(_))
    }

    pub fn error(&self) -> Option<&RecomputeError> {
        match self {
            FeatureStatus::Error(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureStatus::Valid => f.write_str("valid"),
            FeatureStatus::Dirty => f.write_str("dirty"),
            FeatureStatus::Error(err) => write!(f, "error: {err}"),
        }
    }
}

/// Resolves Reference Links to points on other features
pub trait ReferenceResolver {
    /// Resolve the point designated by `link`, using `default_sub` when the
    /// link carries no sub-element label. `property` names the link property
    /// for error messages.
    fn resolve_point(
        &self,
        property: &str,
        link: Option<&LinkSub>,
        default_sub: &str,
    ) -> RecomputeResult<DVec3>;
}

/// A parametric drawing feature
#[derive(Debug, Clone)]
pub struct Feature {
    id: Uuid,
    name: String,
    kind: FeatureKind,
    properties: PropertyBag,
    status: FeatureStatus,
}

impl Feature {
    /// Create a feature with the default properties of its kind. New features start Dirty.
    pub fn new(kind: FeatureKind, name: impl Into<String>, config: &EngineConfig) -> Self {
        let mut properties = PropertyBag::new();
        for property in FeatureKind::common_properties()
            .into_iter()
            .chain(kind.kind_properties(config))
        {
            properties.insert(property);
        }

        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            properties,
            status: FeatureStatus::Dirty,
        }
    }

    /// Get the unique ID of this feature
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the name of this feature
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FeatureKind {
        self.kind
    }

    /// Get the type name of this feature
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn status(&self) -> &FeatureStatus {
        &self.status
    }

    pub fn properties(&self) -> &PropertyBag {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Current value of a property
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.value(name)
    }

    /// Set a property value, touching the feature when it changed.
    ///
    /// Does not propagate to dependents; that is the document's job.
    pub fn set_property(&mut self, name: &str, value: PropertyValue) -> DocumentResult<bool> {
        let property =
            self.properties
                .get_mut(name)
                .ok_or_else(|| DocumentError::UnknownProperty {
                    feature: self.name.clone(),
                    property: name.to_string(),
                })?;

        let changed = property.set_value(value)?;
        if changed {
            self.touch();
        }
        Ok(changed)
    }

    /// Mark this feature Dirty. Returns `true` if it was not Dirty before.
    pub fn touch(&mut self) -> bool {
        if self.status.is_dirty() {
            return false;
        }
        self.status = FeatureStatus::Dirty;
        true
    }

    /// Whether the scheduler must run this feature
    pub fn must_execute(&self) -> bool {
        self.status.is_dirty()
    }

    /// Names of all features this one references
    pub fn link_targets(&self) -> impl Iterator<Item = &str> {
        self.properties.links().map(|(_, link)| link.target.as_str())
    }

    pub(crate) fn set_status(&mut self, status: FeatureStatus) {
        self.status = status;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn retarget_links(&mut self, old: &str, new: &str) -> usize {
        self.properties.retarget_links(old, new)
    }

    // ============== Derivation ==============

    /// Derive output values from the current inputs
    pub fn derive(
        &self,
        resolver: &dyn ReferenceResolver,
        config: &EngineConfig,
    ) -> RecomputeResult<DerivedValues> {
        let values = match self.kind {
            FeatureKind::Base => Vec::new(),

            FeatureKind::Line => {
                let start = self.input_vector("StartPoint")?;
                let end = shape::line::end_point(
                    start,
                    self.input_float("Length")?,
                    self.input_float("Angle")?,
                );
                vec![("EndPoint", PropertyValue::Vector(end))]
            }

            FeatureKind::Circle => {
                let params = shape::circle::CircleParams {
                    center: self.input_vector("Center")?,
                    radius: self.input_float("Radius")?,
                    first_angle: self.input_float("FirstAngle")?,
                    last_angle: self.input_float("LastAngle")?,
                };
                let (start, end) = shape::circle::arc_endpoints(&params)?;
                vec![
                    ("StartPoint", PropertyValue::Vector(start)),
                    ("EndPoint", PropertyValue::Vector(end)),
                ]
            }

            FeatureKind::Rectangle => {
                let end = shape::rectangle::end_point(
                    self.input_vector("StartPoint")?,
                    self.input_float("Width")?,
                    self.input_float("Height")?,
                )?;
                vec![("EndPoint", PropertyValue::Vector(end))]
            }

            FeatureKind::Polygon => {
                let points = self.input_points()?;
                // An empty polygon keeps its previous endpoints
                match shape::polygon::endpoints(points) {
                    Some((start, end)) => vec![
                        ("StartPoint", PropertyValue::Vector(start)),
                        ("EndPoint", PropertyValue::Vector(end)),
                    ],
                    None => Vec::new(),
                }
            }

            FeatureKind::Text => {
                let (start, end) = shape::text::anchor(self.input_vector("Position")?);
                vec![
                    ("StartPoint", PropertyValue::Vector(start)),
                    ("EndPoint", PropertyValue::Vector(end)),
                ]
            }

            FeatureKind::Dimension => {
                let first = resolver.resolve_point("First", self.input_link("First")?, "StartPoint")?;
                let second =
                    resolver.resolve_point("Second", self.input_link("Second")?, "EndPoint")?;
                let format_spec = self.input_string("FormatSpec")?;
                let measurement = shape::dimension::measure(&shape::dimension::DimensionParams {
                    first,
                    second,
                    format_spec,
                    show_units: self.input_bool("ShowUnits")?,
                    unit: &config.unit_suffix,
                })?;
                vec![
                    ("StartPoint", PropertyValue::Vector(first)),
                    ("EndPoint", PropertyValue::Vector(second)),
                    ("Value", PropertyValue::Float(measurement.value)),
                    ("DimensionText", PropertyValue::String(measurement.text)),
                ]
            }
        };

        if let Some((name, _)) = values.iter().find(|(_, value)| !value.is_finite()) {
            return Err(RecomputeError::InvalidGeometry(format!(
                "{name} is not finite"
            )));
        }
        Ok(values)
    }

    /// Write derived values into this feature's properties without touching it.
    /// Returns `true` if any output changed.
    pub fn apply(&mut self, values: DerivedValues) -> RecomputeResult<bool> {
        let mut changed = false;
        for (name, value) in values {
            let property = self.properties.get_mut(name).ok_or_else(|| {
                RecomputeError::InvalidGeometry(format!("no output property {name}"))
            })?;
            changed |= property
                .set_value(value)
                .map_err(|e| RecomputeError::InvalidGeometry(e.to_string()))?;
        }
        Ok(changed)
    }

    fn missing(&self, name: &str) -> RecomputeError {
        RecomputeError::InvalidGeometry(format!(
            "{} '{}' has no usable property {name}",
            self.type_name(),
            self.name
        ))
    }

    fn input_float(&self, name: &str) -> RecomputeResult<f64> {
        self.properties.float(name).ok_or_else(|| self.missing(name))
    }

    fn input_bool(&self, name: &str) -> RecomputeResult<bool> {
        self.properties.boolean(name).ok_or_else(|| self.missing(name))
    }

    fn input_string(&self, name: &str) -> RecomputeResult<&str> {
        self.properties.string(name).ok_or_else(|| self.missing(name))
    }

    fn input_vector(&self, name: &str) -> RecomputeResult<DVec3> {
        self.properties.vector(name).ok_or_else(|| self.missing(name))
    }

    fn input_points(&self) -> RecomputeResult<&[DVec3]> {
        self.properties
            .vector_list("Points")
            .ok_or_else(|| self.missing("Points"))
    }

    fn input_link(&self, name: &str) -> RecomputeResult<Option<&LinkSub>> {
        self.properties
            .value(name)
            .and_then(PropertyValue::as_link)
            .ok_or_else(|| self.missing(name))
    }

    // ============== Geometry Queries ==============

    /// Normalized StartPoint -> EndPoint direction of a line (zero when degenerate)
    pub fn line_direction(&self) -> Option<DVec3> {
        if self.kind != FeatureKind::Line {
            return None;
        }
        Some(shape::line::direction(
            self.properties.vector("StartPoint")?,
            self.properties.vector("EndPoint")?,
        ))
    }

    /// Whether a circle sweeps exactly one turn
    pub fn is_full_circle(&self, tolerance: f64) -> Option<bool> {
        if self.kind != FeatureKind::Circle {
            return None;
        }
        Some(shape::circle::is_full_circle(
            self.properties.float("FirstAngle")?,
            self.properties.float("LastAngle")?,
            tolerance,
        ))
    }

    /// Ordered points of a polygon
    pub fn polygon_points(&self) -> Option<&[DVec3]> {
        if self.kind != FeatureKind::Polygon {
            return None;
        }
        self.properties.vector_list("Points")
    }
}
