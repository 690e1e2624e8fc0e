//! `GeoJSON` persistence for feature classes.
//!
//! A class named `wildfireBC_rehabPoint` is stored as
//! `wildfireBC_rehabPoint.geojson` next to `wildfireBC_rehabPoint.schema.toml`.
//! The `GeoJSON` file holds the geometries and attributes, with the object id
//! in the `OBJECTID` property. The sidecar declares the geometry kind, EPSG
//! code and typed fields (including text widths).
//!
//! Field-collected inputs usually arrive without a sidecar; their schema is
//! inferred from the features and the legacy `crs` member of the collection.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};
use wildfire_rehab_feature_models::{
    Feature, FeatureClass, FieldDef, FieldType, FieldValue, GeometryKind, OBJECT_ID_FIELD, Schema,
    SpatialReference,
};

use crate::FeatureError;

/// File extension of feature class data files.
pub const DATA_EXTENSION: &str = "geojson";

/// Suffix of schema sidecar files.
pub const SCHEMA_SUFFIX: &str = ".schema.toml";

/// Returns the schema sidecar path for a data file.
#[must_use]
pub fn schema_path(data_path: &Path) -> PathBuf {
    let stem = data_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    data_path.with_file_name(format!("{stem}{SCHEMA_SUFFIX}"))
}

/// Reads a feature class from a `GeoJSON` file and its optional sidecar.
///
/// # Errors
///
/// Returns [`FeatureError`] if the file is missing, is not a feature
/// collection, contains unsupported geometries, or the sidecar is invalid.
pub fn read_feature_class(path: &Path) -> Result<FeatureClass, FeatureError> {
    if !path.is_file() {
        return Err(FeatureError::NotFound(path.to_path_buf()));
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let collection = match fs::read_to_string(path)?.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        },
        GeoJson::Geometry(_) => {
            return Err(FeatureError::Format {
                message: format!("{} holds a bare geometry, not features", path.display()),
            });
        }
    };

    let declared_crs = declared_spatial_reference(collection.foreign_members.as_ref());
    let features = decode_features(collection.features)?;

    let sidecar = schema_path(path);
    let schema = if sidecar.is_file() {
        toml::from_str(&fs::read_to_string(&sidecar)?)?
    } else {
        log::debug!("No schema sidecar for {}, inferring", path.display());
        infer_schema(&features, declared_crs.unwrap_or(SpatialReference::WGS84))
    };

    Ok(FeatureClass {
        name,
        schema,
        features,
    })
}

/// Writes a feature class and its schema sidecar.
///
/// Both files are written to a temporary sibling first and then renamed into
/// place, so readers never observe a half-written class.
///
/// # Errors
///
/// Returns [`FeatureError`] if serialization or any file operation fails.
pub fn write_feature_class(path: &Path, class: &FeatureClass) -> Result<(), FeatureError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let features = class.features.iter().map(encode_feature).collect();

    let collection = FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(crs_member(class.schema.spatial_reference)),
    };

    write_atomic(path, serde_json::to_string_pretty(&collection)?.as_bytes())?;
    write_atomic(
        &schema_path(path),
        toml::to_string_pretty(&class.schema)?.as_bytes(),
    )?;

    Ok(())
}

/// Deletes a feature class data file and its sidecar, if present.
///
/// # Errors
///
/// Returns an I/O error if an existing file cannot be removed.
pub fn delete_feature_class(path: &Path) -> Result<(), FeatureError> {
    for file in [path.to_path_buf(), schema_path(path)] {
        if file.exists() {
            fs::remove_file(&file)?;
        }
    }
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), FeatureError> {
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn decode_features(raw: Vec<geojson::Feature>) -> Result<Vec<Feature>, FeatureError> {
    let mut decoded = Vec::with_capacity(raw.len());
    let mut pending_ids = Vec::new();

    for feature in raw {
        let geometry = feature
            .geometry
            .map(geo::Geometry::<f64>::try_from)
            .transpose()?;

        let mut properties = feature.properties.unwrap_or_default();
        let object_id = properties
            .remove(OBJECT_ID_FIELD)
            .and_then(|v| v.as_i64());

        let attributes = properties
            .into_iter()
            .map(|(key, value)| (key, json_to_value(value)))
            .collect::<BTreeMap<_, _>>();

        if object_id.is_none() {
            pending_ids.push(decoded.len());
        }
        decoded.push(Feature {
            object_id: object_id.unwrap_or_default(),
            geometry,
            attributes,
        });
    }

    // Features without an OBJECTID are numbered after the highest stored id.
    let mut next = decoded
        .iter()
        .map(|f| f.object_id)
        .max()
        .unwrap_or(0)
        .max(0);
    for index in pending_ids {
        next += 1;
        decoded[index].object_id = next;
    }

    Ok(decoded)
}

fn encode_feature(feature: &Feature) -> geojson::Feature {
    let mut properties = JsonObject::new();
    properties.insert(
        OBJECT_ID_FIELD.to_string(),
        JsonValue::from(feature.object_id),
    );
    for (key, value) in &feature.attributes {
        properties.insert(key.clone(), value_to_json(value));
    }

    geojson::Feature {
        bbox: None,
        geometry: feature
            .geometry
            .as_ref()
            .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn json_to_value(value: JsonValue) -> FieldValue {
    match value {
        JsonValue::Null => FieldValue::Null,
        JsonValue::Bool(b) => FieldValue::Integer(i64::from(b)),
        JsonValue::Number(n) => n.as_i64().map_or_else(
            || n.as_f64().map_or(FieldValue::Null, FieldValue::Double),
            FieldValue::Integer,
        ),
        JsonValue::String(s) => FieldValue::Text(s),
        other @ (JsonValue::Array(_) | JsonValue::Object(_)) => FieldValue::Text(other.to_string()),
    }
}

fn value_to_json(value: &FieldValue) -> JsonValue {
    match value {
        FieldValue::Null => JsonValue::Null,
        FieldValue::Integer(n) => JsonValue::from(*n),
        FieldValue::Double(n) => {
            serde_json::Number::from_f64(*n).map_or(JsonValue::Null, JsonValue::Number)
        }
        FieldValue::Text(s) => JsonValue::String(s.clone()),
    }
}

/// Builds the legacy `crs` member naming an EPSG code.
fn crs_member(spatial_reference: SpatialReference) -> JsonObject {
    let mut member = JsonObject::new();
    member.insert(
        "crs".to_string(),
        serde_json::json!({
            "type": "name",
            "properties": {
                "name": format!("urn:ogc:def:crs:EPSG::{}", spatial_reference.epsg()),
            },
        }),
    );
    member
}

/// Reads the spatial reference named by a legacy `crs` member.
///
/// Accepts `EPSG:3005`, `urn:ogc:def:crs:EPSG::3005` and the OGC `CRS84`
/// alias for WGS 84.
fn declared_spatial_reference(members: Option<&JsonObject>) -> Option<SpatialReference> {
    let name = members?
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()?;

    if name.to_ascii_uppercase().ends_with("CRS84") {
        return Some(SpatialReference::WGS84);
    }

    name.rsplit(':')
        .next()
        .and_then(|code| code.trim().parse().ok())
        .map(SpatialReference)
}

/// Infers a schema from decoded features.
///
/// The geometry kind comes from the first classifiable geometry (points
/// when there is none). Each attribute becomes a field typed after its first
/// non-null value; text fields are left unbounded.
#[must_use]
pub fn infer_schema(features: &[Feature], spatial_reference: SpatialReference) -> Schema {
    let geometry = features
        .iter()
        .filter_map(|f| f.geometry.as_ref())
        .find_map(GeometryKind::of)
        .unwrap_or(GeometryKind::Point);

    let mut types: BTreeMap<&str, Option<FieldType>> = BTreeMap::new();
    for feature in features {
        for (name, value) in &feature.attributes {
            let slot = types.entry(name.as_str()).or_insert(None);
            if slot.is_none() {
                *slot = match value {
                    FieldValue::Null => None,
                    FieldValue::Integer(_) => Some(FieldType::Integer),
                    FieldValue::Double(_) => Some(FieldType::Double),
                    FieldValue::Text(_) => Some(FieldType::Text),
                };
            }
        }
    }

    let mut schema = Schema::new(geometry, spatial_reference);
    for (name, field_type) in types {
        schema.add_field(FieldDef {
            name: name.to_string(),
            field_type: field_type.unwrap_or(FieldType::Text),
            length: None,
        });
    }
    schema
}
