//! Line intersection check.
//!
//! Finds places where a line crosses itself (`SELF`) or another line
//! (`CROSS`) and writes them to a point class for review. Candidate line
//! pairs come from an R-tree over line bounding boxes.

use std::sync::Arc;

use geo::algorithm::line_intersection::{LineIntersection, line_intersection};
use geo::{BoundingRect, Coord, Geometry, Line, Point};
use rstar::{AABB, RTree, RTreeObject};
use strum_macros::{AsRefStr, Display, EnumString};
use wildfire_rehab_feature::gdb::{ClassRef, Geodatabase};
use wildfire_rehab_feature::models::{FeatureClass, FieldDef, FieldValue, GeometryKind, Schema};
use wildfire_rehab_feature::progress::ProgressCallback;

use crate::{FeatureKind, ReconcileError, expect_geometry};

/// Default name of the output class.
pub const OUTPUT_CLASS: &str = "Self_Intersection_Points";

/// Width of the `Type` output field.
const TYPE_WIDTH: usize = 20;

/// Whether an intersection is within one line or between two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum IntersectionType {
    #[strum(serialize = "SELF")]
    SelfIntersection,
    #[strum(serialize = "CROSS")]
    Cross,
}

/// One intersection point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub point: Coord<f64>,
    pub line1: i64,
    pub line2: i64,
    pub kind: IntersectionType,
}

struct LineEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for LineEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

struct LineParts {
    object_id: i64,
    segments: Vec<Line<f64>>,
    /// First and last vertex of every part.
    boundary: Vec<Coord<f64>>,
    envelope: AABB<[f64; 2]>,
}

impl LineParts {
    fn from_geometry(object_id: i64, geometry: &Geometry<f64>) -> Option<Self> {
        let parts: Vec<&geo::LineString<f64>> = match geometry {
            Geometry::LineString(ls) => vec![ls],
            Geometry::MultiLineString(mls) => mls.0.iter().collect(),
            _ => return None,
        };

        let segments: Vec<Line<f64>> = parts.iter().flat_map(|ls| ls.lines()).collect();
        let boundary = parts
            .iter()
            .filter_map(|ls| Some([*ls.0.first()?, *ls.0.last()?]))
            .flatten()
            .collect();
        let rect = geometry.bounding_rect()?;

        Some(Self {
            object_id,
            segments,
            boundary,
            envelope: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
        })
    }

    fn on_boundary(&self, point: Coord<f64>) -> bool {
        self.boundary.contains(&point)
    }
}

fn push_unique(points: &mut Vec<Coord<f64>>, point: Coord<f64>) {
    if !points.contains(&point) {
        points.push(point);
    }
}

/// Intersection points of two segments.
///
/// The flag is `true` when the segments only touch: they meet at a single
/// point that is an endpoint of one of them.
fn segment_hits(a: Line<f64>, b: Line<f64>) -> Option<(Vec<Coord<f64>>, bool)> {
    match line_intersection(a, b)? {
        LineIntersection::SinglePoint {
            intersection,
            is_proper,
        } => Some((vec![intersection], !is_proper)),
        LineIntersection::Collinear { intersection } => {
            let mut points = vec![intersection.start];
            push_unique(&mut points, intersection.end);
            Some((points, false))
        }
    }
}

fn self_intersections(line: &LineParts, ignore_touches: bool, out: &mut Vec<Intersection>) {
    let segments = &line.segments;
    for i in 0..segments.len() {
        for j in (i + 2)..segments.len() {
            let Some((points, touch)) = segment_hits(segments[i], segments[j]) else {
                continue;
            };
            if ignore_touches && touch {
                continue;
            }
            out.extend(points.into_iter().map(|point| Intersection {
                point,
                line1: line.object_id,
                line2: line.object_id,
                kind: IntersectionType::SelfIntersection,
            }));
        }
    }
}

fn cross_intersections(
    a: &LineParts,
    b: &LineParts,
    ignore_touches: bool,
    out: &mut Vec<Intersection>,
) {
    let mut points = Vec::new();
    let mut overlaps = false;
    for sa in &a.segments {
        for sb in &b.segments {
            match line_intersection(*sa, *sb) {
                Some(LineIntersection::SinglePoint { intersection, .. }) => {
                    push_unique(&mut points, intersection);
                }
                Some(LineIntersection::Collinear { intersection }) => {
                    overlaps = true;
                    push_unique(&mut points, intersection.start);
                    push_unique(&mut points, intersection.end);
                }
                None => {}
            }
        }
    }
    if points.is_empty() {
        return;
    }

    let touches_only =
        !overlaps && points.iter().all(|p| a.on_boundary(*p) || b.on_boundary(*p));
    if ignore_touches && touches_only {
        return;
    }

    out.extend(points.into_iter().map(|point| Intersection {
        point,
        line1: a.object_id,
        line2: b.object_id,
        kind: IntersectionType::Cross,
    }));
}

/// Finds self-intersections and crossings in a line class.
///
/// Adjacent segments of one line are never compared. With `ignore_touches`,
/// segments meeting at an endpoint and lines meeting only at their
/// endpoints are not reported.
///
/// # Errors
///
/// Returns [`ReconcileError::GeometryMismatch`] if `lines` is not a line
/// class.
pub fn find_intersections(
    lines: &FeatureClass,
    ignore_touches: bool,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<Intersection>, ReconcileError> {
    expect_geometry(lines, FeatureKind::Lines)?;

    let parts: Vec<LineParts> = lines
        .features
        .iter()
        .filter_map(|f| LineParts::from_geometry(f.object_id, f.geometry.as_ref()?))
        .collect();
    log::info!("Loaded {} line feature(s) from {}", parts.len(), lines.name);

    let mut found = Vec::new();
    progress.set_total(2 * parts.len() as u64);

    for line in &parts {
        progress.inc(1);
        self_intersections(line, ignore_touches, &mut found);
    }

    let tree = RTree::bulk_load(
        parts
            .iter()
            .enumerate()
            .map(|(index, p)| LineEntry {
                index,
                envelope: p.envelope,
            })
            .collect(),
    );

    for (i, line) in parts.iter().enumerate() {
        progress.inc(1);
        let mut candidates: Vec<usize> = tree
            .locate_in_envelope_intersecting(&line.envelope)
            .map(|entry| entry.index)
            .filter(|&j| j > i)
            .collect();
        candidates.sort_unstable();
        for j in candidates {
            cross_intersections(line, &parts[j], ignore_touches, &mut found);
        }
    }
    progress.finish(format!("Found {} intersection(s)", found.len()));

    Ok(found)
}

/// Output schema: points in `lines`' reference with `Line1_OID`,
/// `Line2_OID` and `Type`.
#[must_use]
pub fn output_schema(lines: &FeatureClass) -> Schema {
    Schema::new(GeometryKind::Point, lines.schema.spatial_reference)
        .with_field(FieldDef::integer("Line1_OID"))
        .with_field(FieldDef::integer("Line2_OID"))
        .with_field(FieldDef::text("Type", Some(TYPE_WIDTH)))
}

/// Checks `input` and writes every intersection to a new point class at the
/// root of `gdb`, named `out_name` or the first free `out_name_N`.
///
/// Returns the output class and the number of points written.
///
/// # Errors
///
/// Returns [`ReconcileError`] if `input` cannot be read or is not a line
/// class, or the output cannot be written.
pub fn detect_intersections(
    gdb: &Geodatabase,
    input: &ClassRef,
    out_name: &str,
    ignore_touches: bool,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<(ClassRef, usize), ReconcileError> {
    let lines = gdb.read_class(input)?;
    let found = find_intersections(&lines, ignore_touches, progress)?;

    let name = gdb.unique_class_name(None, out_name);
    let mut output = gdb.create_class(None, &name, output_schema(&lines))?;
    for hit in &found {
        output.insert(
            Some(Geometry::Point(Point(hit.point))),
            [
                ("Line1_OID".to_string(), FieldValue::Integer(hit.line1)),
                ("Line2_OID".to_string(), FieldValue::Integer(hit.line2)),
                ("Type".to_string(), FieldValue::from(hit.kind.as_ref())),
            ]
            .into_iter()
            .collect(),
        );
    }
    gdb.write_class(None, &output)?;

    let class = ClassRef::new(None, &name);
    log::info!("Inserted {} intersection point(s) into {class}", found.len());
    Ok((class, found.len()))
}
