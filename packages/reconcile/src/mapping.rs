//! Discovery of the attribute fields copied from source to target.

use wildfire_rehab_feature::models::Schema;

use crate::FeatureKind;

/// Target field and its source candidates, in preference order.
type Candidates = (&'static str, &'static [&'static str]);

const POINT_CANDIDATES: &[Candidates] = &[
    ("CaptureDate", &["TimeStamp", "TimeWhen"]),
    ("Comments", &["desc", "Descr"]),
    ("Label", &["name", "Name"]),
    ("CritWork", &["CritWork"]),
    ("ProtValue", &["ProtValue"]),
];

const LINE_CANDIDATES: &[Candidates] = &[
    ("CaptureDate", &["TimeStamp", "TimeWhen"]),
    ("Comments", &["desc"]),
    ("Label", &["name", "Name"]),
    ("CritWork", &["CritWork"]),
    ("ProtValue", &["ProtValue"]),
];

/// Ordered `target <- source` field pairs resolved against two schemas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    pairs: Vec<(String, String)>,
}

impl FieldMapping {
    /// Picks, for every known target field present in `target`, the first
    /// candidate field present in `source`.
    #[must_use]
    pub fn discover(kind: FeatureKind, source: &Schema, target: &Schema) -> Self {
        let candidates = match kind {
            FeatureKind::Points => POINT_CANDIDATES,
            FeatureKind::Lines => LINE_CANDIDATES,
        };

        let pairs = candidates
            .iter()
            .filter(|(target_field, _)| target.has_field(target_field))
            .filter_map(|(target_field, sources)| {
                sources
                    .iter()
                    .find(|s| source.has_field(s))
                    .map(|s| ((*target_field).to_string(), (*s).to_string()))
            })
            .collect();

        Self { pairs }
    }

    /// Iterates `(target, source)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(t, s)| (t.as_str(), s.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl std::fmt::Display for FieldMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (target, source)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{target} <- {source}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use wildfire_rehab_feature::models::{FieldDef, GeometryKind, SpatialReference};

    use super::*;

    fn schema(fields: &[&str]) -> Schema {
        fields.iter().fold(
            Schema::new(GeometryKind::Point, SpatialReference::BC_ALBERS),
            |schema, name| schema.with_field(FieldDef::text(*name, Some(255))),
        )
    }

    #[test]
    fn prefers_first_candidate() {
        let source = schema(&["TimeStamp", "TimeWhen", "name", "Name"]);
        let target = schema(&["CaptureDate", "Label"]);
        let mapping = FieldMapping::discover(FeatureKind::Points, &source, &target);
        assert_eq!(mapping.to_string(), "CaptureDate <- TimeStamp, Label <- name");
    }

    #[test]
    fn falls_back_to_later_candidates() {
        let source = schema(&["TimeWhen", "Descr", "Name"]);
        let target = schema(&["CaptureDate", "Comments", "Label"]);
        let mapping = FieldMapping::discover(FeatureKind::Points, &source, &target);
        assert_eq!(
            mapping.to_string(),
            "CaptureDate <- TimeWhen, Comments <- Descr, Label <- Name"
        );
    }

    #[test]
    fn lines_do_not_read_descr() {
        let source = schema(&["Descr"]);
        let target = schema(&["Comments"]);
        assert!(FieldMapping::discover(FeatureKind::Lines, &source, &target).is_empty());
    }

    #[test]
    fn same_name_fields_need_both_sides() {
        let source = schema(&["CritWork", "ProtValue"]);
        let target = schema(&["CritWork"]);
        let mapping = FieldMapping::discover(FeatureKind::Lines, &source, &target);
        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![("CritWork", "CritWork")]);
    }

    #[test]
    fn missing_target_fields_are_not_mapped() {
        let source = schema(&["TimeStamp", "desc", "name"]);
        let target = schema(&["Status"]);
        assert!(FieldMapping::discover(FeatureKind::Points, &source, &target).is_empty());
    }
}
