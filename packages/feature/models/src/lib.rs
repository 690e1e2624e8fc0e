#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core data types shared across the wildfire rehab toolchain.
//!
//! A [`FeatureClass`] is an ordered collection of [`Feature`]s described by
//! a [`Schema`] (geometry kind, spatial reference and typed fields). The
//! rehab geodatabase, the field-collected inputs and the QA outputs are all
//! expressed with these types.

pub mod fire;

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use fire::{District, FireNumber, InvalidFireNumberError};

/// Name of the object id attribute carried by every persisted feature.
pub const OBJECT_ID_FIELD: &str = "OBJECTID";

/// Storage type of an attribute field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldType {
    Text,
    Integer,
    Double,
    Date,
}

/// A declared attribute field of a feature class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Maximum number of characters for text fields. `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
}

impl FieldDef {
    #[must_use]
    pub fn text(name: impl Into<String>, length: Option<usize>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Text,
            length,
        }
    }

    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Integer,
            length: None,
        }
    }

    #[must_use]
    pub fn double(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Double,
            length: None,
        }
    }

    #[must_use]
    pub fn date(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Date,
            length: None,
        }
    }

    /// Returns the declared width if this is a bounded text field.
    #[must_use]
    pub const fn text_width(&self) -> Option<usize> {
        match self.field_type {
            FieldType::Text => self.length,
            _ => None,
        }
    }
}

/// Geometry type stored by a feature class.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GeometryKind {
    Point,
    Polyline,
}

impl GeometryKind {
    /// Classifies a geometry. Returns `None` for polygons and collections.
    #[must_use]
    pub const fn of(geometry: &geo::Geometry<f64>) -> Option<Self> {
        match geometry {
            geo::Geometry::Point(_) | geo::Geometry::MultiPoint(_) => Some(Self::Point),
            geo::Geometry::Line(_)
            | geo::Geometry::LineString(_)
            | geo::Geometry::MultiLineString(_) => Some(Self::Polyline),
            _ => None,
        }
    }
}

/// A spatial reference identified by its EPSG code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpatialReference(pub u32);

impl SpatialReference {
    /// WGS 84 geographic coordinates.
    pub const WGS84: Self = Self(4326);
    /// NAD83 geographic coordinates.
    pub const NAD83: Self = Self(4269);
    /// NAD83 / BC Environment Albers, the projection of every rehab dataset.
    pub const BC_ALBERS: Self = Self(3005);
    /// WGS 84 / Pseudo-Mercator.
    pub const WEB_MERCATOR: Self = Self(3857);

    #[must_use]
    pub const fn epsg(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.0)
    }
}

/// Geometry kind, spatial reference and field list of a feature class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub geometry: GeometryKind,
    #[serde(rename = "epsg")]
    pub spatial_reference: SpatialReference,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl Schema {
    #[must_use]
    pub const fn new(geometry: GeometryKind, spatial_reference: SpatialReference) -> Self {
        Self {
            geometry,
            spatial_reference,
            fields: Vec::new(),
        }
    }

    /// Builder-style helper that appends a field definition.
    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.add_field(field);
        self
    }

    /// Appends a field unless one with the same name already exists.
    pub fn add_field(&mut self, field: FieldDef) {
        if !self.has_field(&field.name) {
            self.fields.push(field);
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    #[default]
    Null,
    Integer(i64),
    Double(f64),
    Text(String),
}

static NULL_VALUE: FieldValue = FieldValue::Null;

impl FieldValue {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// `true` for nulls and empty strings.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as trimmed, non-empty text, if any.
    ///
    /// Numbers are rendered with their `Display` form so numeric label
    /// columns can still be looked up.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let text = match self {
            Self::Null => return None,
            Self::Text(s) => s.trim().to_string(),
            Self::Integer(n) => n.to_string(),
            Self::Double(n) => n.to_string(),
        };
        if text.is_empty() { None } else { Some(text) }
    }

    /// Returns the value as text exactly as stored, `None` only for null or
    /// the empty string. Whitespace-only text is kept.
    #[must_use]
    pub fn raw_label(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(s) if s.is_empty() => None,
            Self::Text(s) => Some(s.clone()),
            Self::Integer(n) => Some(n.to_string()),
            Self::Double(n) => Some(n.to_string()),
        }
    }

    /// Interprets the value as an integer code.
    ///
    /// Text is parsed after trimming; doubles convert only when they have no
    /// fractional part.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Null => None,
            Self::Integer(n) => Some(*n),
            Self::Double(n) => (n.fract() == 0.0 && n.is_finite()).then_some(*n as i64),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Integer(n) => Some(*n as f64),
            Self::Double(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Character count of a text value; `0` for everything else.
    #[must_use]
    pub fn char_len(&self) -> usize {
        match self {
            Self::Text(s) => s.chars().count(),
            _ => 0,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Double(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

/// A single feature: object id, optional geometry and attribute values.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub object_id: i64,
    pub geometry: Option<geo::Geometry<f64>>,
    pub attributes: BTreeMap<String, FieldValue>,
}

impl Feature {
    #[must_use]
    pub const fn new(object_id: i64, geometry: Option<geo::Geometry<f64>>) -> Self {
        Self {
            object_id,
            geometry,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style helper that sets one attribute.
    #[must_use]
    pub fn with_attribute(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Returns the value of `field`, or [`FieldValue::Null`] when unset.
    #[must_use]
    pub fn get(&self, field: &str) -> &FieldValue {
        self.attributes.get(field).unwrap_or(&NULL_VALUE)
    }

    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) {
        self.attributes.insert(field.to_string(), value.into());
    }
}

/// A named, typed collection of features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureClass {
    pub name: String,
    pub schema: Schema,
    pub features: Vec<Feature>,
}

impl FeatureClass {
    #[must_use]
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            features: Vec::new(),
        }
    }

    /// Object id the next inserted feature will receive.
    #[must_use]
    pub fn next_object_id(&self) -> i64 {
        self.features
            .iter()
            .map(|f| f.object_id)
            .max()
            .unwrap_or(0)
            + 1
    }

    /// Appends a feature with a freshly assigned object id and returns it.
    pub fn insert(
        &mut self,
        geometry: Option<geo::Geometry<f64>>,
        attributes: BTreeMap<String, FieldValue>,
    ) -> i64 {
        let object_id = self.next_object_id();
        self.features.push(Feature {
            object_id,
            geometry,
            attributes,
        });
        object_id
    }

    #[must_use]
    pub fn feature(&self, object_id: i64) -> Option<&Feature> {
        self.features.iter().find(|f| f.object_id == object_id)
    }

    pub fn feature_mut(&mut self, object_id: i64) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.object_id == object_id)
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.schema.has_field(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Where a feature class lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Workspace {
    /// A file geodatabase directory.
    File { path: PathBuf },
    /// An enterprise geodatabase reached through a connection file.
    Enterprise {
        connection: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        database: Option<String>,
    },
}

impl fmt::Display for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File { path } => write!(f, "{}", path.display()),
            Self::Enterprise {
                connection,
                database: Some(database),
            } => write!(f, "{connection} ({database})"),
            Self::Enterprise {
                connection,
                database: None,
            } => f.write_str(connection),
        }
    }
}

/// Rehabilitation status values used by the `Status` field.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum RehabStatus {
    RehabCompleted,
    RehabFieldVerified,
    RehabObligationsTransferred,
    #[serde(rename = "RehabPFR/ArchCompleted")]
    #[strum(serialize = "RehabPFR/ArchCompleted")]
    RehabPfrArchCompleted,
    /// Placeholder status assigned before a feature has been checked.
    RehabRequiresFieldVerification,
    Retired,
}

impl RehabStatus {
    pub const ALL: &[Self] = &[
        Self::RehabCompleted,
        Self::RehabFieldVerified,
        Self::RehabObligationsTransferred,
        Self::RehabPfrArchCompleted,
        Self::RehabRequiresFieldVerification,
        Self::Retired,
    ];
}
