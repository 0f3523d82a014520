//! Typed Property Cells
//!
//! Every feature owns a [`PropertyBag`]: an ordered list of named, typed
//! value cells. Setting a value validates its type (and enum label) and
//! reports whether the stored value actually changed, so the owner can
//! decide whether to touch itself.

mod link;

pub use link::*;

use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Property-related errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    #[error("type mismatch for '{property}': expected {expected}, found {found}")]
    TypeMismatch {
        property: String,
        expected: PropertyType,
        found: PropertyType,
    },

    #[error("invalid value '{value}' for enumeration '{property}' (allowed: {allowed})")]
    InvalidEnumValue {
        property: String,
        value: String,
        allowed: String,
    },
}

/// Semantic type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    Float,
    Integer,
    Bool,
    String,
    Vector,
    VectorList,
    Color,
    Enum,
    Link,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyType::Float => "float",
            PropertyType::Integer => "integer",
            PropertyType::Bool => "bool",
            PropertyType::String => "string",
            PropertyType::Vector => "vector",
            PropertyType::VectorList => "vector list",
            PropertyType::Color => "color",
            PropertyType::Enum => "enumeration",
            PropertyType::Link => "link",
        };
        f.write_str(name)
    }
}

/// A property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Float(f64),
    Integer(i64),
    Bool(bool),
    String(String),
    Vector(DVec3),
    VectorList(Vec<DVec3>),
    /// RGBA, each channel in 0..=1
    Color([f32; 4]),
    /// Index into the property's label list
    Enum(usize),
    Link(Option<LinkSub>),
}

impl PropertyValue {
    /// Semantic type of this value
    pub fn property_type(&self) -> PropertyType {
        match self {
            PropertyValue::Float(_) => PropertyType::Float,
            PropertyValue::Integer(_) => PropertyType::Integer,
            PropertyValue::Bool(_) => PropertyType::Bool,
            PropertyValue::String(_) => PropertyType::String,
            PropertyValue::Vector(_) => PropertyType::Vector,
            PropertyValue::VectorList(_) => PropertyType::VectorList,
            PropertyValue::Color(_) => PropertyType::Color,
            PropertyValue::Enum(_) => PropertyType::Enum,
            PropertyValue::Link(_) => PropertyType::Link,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<DVec3> {
        match self {
            PropertyValue::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector_list(&self) -> Option<&[DVec3]> {
        match self {
            PropertyValue::VectorList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<Option<&LinkSub>> {
        match self {
            PropertyValue::Link(v) => Some(v.as_ref()),
            _ => None,
        }
    }

    /// Whether every number in the value is finite (non-numeric values always are)
    pub fn is_finite(&self) -> bool {
        match self {
            PropertyValue::Float(v) => v.is_finite(),
            PropertyValue::Vector(v) => v.is_finite(),
            PropertyValue::VectorList(list) => list.iter().all(|v| v.is_finite()),
            _ => true,
        }
    }
}

/// A named, typed value cell owned by a feature
#[derive(Debug, Clone)]
pub struct Property {
    name: &'static str,
    group: &'static str,
    doc: &'static str,
    value: PropertyValue,
    /// Allowed labels, only for enumerations
    labels: &'static [&'static str],
}

impl Property {
    /// Create a property with its initial value
    pub fn new(
        name: &'static str,
        group: &'static str,
        doc: &'static str,
        value: PropertyValue,
    ) -> Self {
        Self {
            name,
            group,
            doc,
            value,
            labels: &[],
        }
    }

    /// Create an enumeration property selecting `labels[index]`
    pub fn enumeration(
        name: &'static str,
        group: &'static str,
        doc: &'static str,
        labels: &'static [&'static str],
        index: usize,
    ) -> Self {
        Self {
            name,
            group,
            doc,
            value: PropertyValue::Enum(index),
            labels,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> &'static str {
        self.group
    }

    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// Declared semantic type
    pub fn property_type(&self) -> PropertyType {
        self.value.property_type()
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    /// Labels of an enumeration (empty for other types)
    pub fn labels(&self) -> &'static [&'static str] {
        self.labels
    }

    /// Current label of an enumeration
    pub fn label(&self) -> Option<&'static str> {
        match self.value {
            PropertyValue::Enum(index) => self.labels.get(index).copied(),
            _ => None,
        }
    }

    /// Replace the stored value.
    ///
    /// Enumerations also accept a `String` holding one of their labels.
    /// Returns `true` when the stored value changed. On error nothing is
    /// modified.
    pub fn set_value(&mut self, value: PropertyValue) -> Result<bool, PropertyError> {
        let value = self.validate(value)?;
        if value == self.value {
            return Ok(false);
        }
        self.value = value;
        Ok(true)
    }

    fn validate(&self, value: PropertyValue) -> Result<PropertyValue, PropertyError> {
        let expected = self.property_type();

        if expected == PropertyType::Enum {
            let index = match value {
                PropertyValue::Enum(index) => index,
                PropertyValue::String(ref label) => self
                    .labels
                    .iter()
                    .position(|l| *l == label.as_str())
                    .ok_or_else(|| self.invalid_enum(label))?,
                other => return Err(self.mismatch(other.property_type())),
            };
            if index >= self.labels.len() {
                return Err(self.invalid_enum(&index.to_string()));
            }
            return Ok(PropertyValue::Enum(index));
        }

        let found = value.property_type();
        if found != expected {
            return Err(self.mismatch(found));
        }
        Ok(value)
    }

    fn mismatch(&self, found: PropertyType) -> PropertyError {
        PropertyError::TypeMismatch {
            property: self.name.to_string(),
            expected: self.property_type(),
            found,
        }
    }

    fn invalid_enum(&self, value: &str) -> PropertyError {
        PropertyError::InvalidEnumValue {
            property: self.name.to_string(),
            value: value.to_string(),
            allowed: self.labels.join(", "),
        }
    }
}

/// Ordered collection of a feature's properties
#[derive(Debug, Clone, Default)]
pub struct PropertyBag {
    properties: Vec<Property>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property; a property with the same name is replaced
    pub fn insert(&mut self, property: Property) {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => *existing = property,
            None => self.properties.push(property),
        }
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    /// Value of a property by name
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.get(name).map(Property::value)
    }

    /// Iterate in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.value(name)?.as_float()
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.value(name)?.as_integer()
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.value(name)?.as_bool()
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.value(name)?.as_str()
    }

    pub fn vector(&self, name: &str) -> Option<DVec3> {
        self.value(name)?.as_vector()
    }

    pub fn vector_list(&self, name: &str) -> Option<&[DVec3]> {
        self.value(name)?.as_vector_list()
    }

    /// All link properties that currently hold a reference
    pub fn links(&self) -> impl Iterator<Item = (&'static str, &LinkSub)> {
        self.properties.iter().filter_map(|p| match &p.value {
            PropertyValue::Link(Some(link)) => Some((p.name, link)),
            _ => None,
        })
    }

    /// Point every link targeting `old` at `new` instead. Returns the number of links rewritten.
    pub(crate) fn retarget_links(&mut self, old: &str, new: &str) -> usize {
        let mut count = 0;
        for property in &mut self.properties {
            if let PropertyValue::Link(Some(link)) = &mut property.value
                && link.target == old
            {
                link.target = new.to_string();
                count += 1;
            }
        }
        count
    }
}
