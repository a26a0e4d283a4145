//! Track segment geometry
//!
//! A [`TrackSegment`] covers one track vector section of a track (or road) node.
//! It is either straight, a circular arc, or an explicit degenerate placeholder
//! for sections whose shape could not be resolved. Segments are immutable; trimming,
//! clipping and reversing all produce new values.

use crate::info::{InfoMap, InformationProvider};
use crate::records::{TrackSections, TrackVectorSection};
use crate::tile::{Tile, TileCoordinate};
use crate::utils::{self, PROXIMITY_TOLERANCE};
use crate::{MapError, Result};
use geo::Point;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Slack (radians) when testing whether a point falls inside an arc's span
const ARC_SPAN_EPSILON: f64 = 1e-9;

/// What a segment represents on the map
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SegmentKind {
    #[default]
    Rail,
    Road,
    Platform,
}

/// Circular arc data of a curved segment, fixed at construction
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Curve {
    /// Radius in meters, always positive
    pub radius: f64,
    /// Signed angular size in radians, positive turning clockwise
    pub angle: f64,
    /// Centre of the circle
    pub center: Point<f64>,
    /// Bearing from the centre to the start point
    pub center_to_start: f64,
    /// Bearing from the centre to the end point
    pub center_to_end: f64,
}

impl Curve {
    #[inline]
    fn sign(&self) -> f64 {
        self.angle.signum()
    }

    /// Point on the circle at the given bearing from the centre
    #[inline]
    fn point_at_bearing(&self, bearing: f64) -> Point<f64> {
        self.center + utils::heading_vector(bearing) * self.radius
    }

    /// Unsigned angle swept from the start to the radial projection of `point`,
    /// in `[0, 2π)`
    #[inline]
    fn sweep_to(&self, point: Point<f64>) -> f64 {
        let bearing = utils::bearing(self.center, point);
        (self.sign() * (bearing - self.center_to_start)).rem_euclid(TAU)
    }
}

/// Shape of a segment
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Geometry {
    /// Placeholder for unresolvable section data: zero length, start == end
    Degenerate,
    Straight,
    Curved(Curve),
}

/// A single straight or curved piece of track
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackSegment {
    start: Point<f64>,
    end: Point<f64>,
    /// Heading at the start, radians in `(-π, π]`
    heading: f64,
    length: f64,
    width: f64,
    geometry: Geometry,
    kind: SegmentKind,
    node_index: usize,
    section_index: usize,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TrackSegment {
    /// Build the segment for one track vector section
    ///
    /// A section index missing from the table is a data problem, not a failure: it is
    /// logged and a degenerate segment at the section's location is returned.
    pub fn new(
        section: &TrackVectorSection,
        sections: &TrackSections,
        node_index: usize,
        section_index: usize,
        kind: SegmentKind,
    ) -> Self {
        let start = section.location.to_point();
        let heading = utils::wrap_angle(section.heading);

        let Some(shape) = sections.try_get(section.section_index) else {
            tracing::error!(
                "Track section {} not found in section table for section {} in track node {}",
                section.section_index,
                section_index,
                node_index
            );
            return Self::degenerate(start, heading, kind, node_index, section_index);
        };

        if shape.curved {
            match Self::curved(start, heading, shape.radius, shape.angle.to_radians(), kind) {
                Ok(segment) => segment
                    .with_width(shape.width)
                    .with_indices(node_index, section_index),
                Err(e) => {
                    tracing::warn!(
                        "Curved track section {} rejected (node {}, section {}): {}",
                        shape.index,
                        node_index,
                        section_index,
                        e
                    );
                    Self::degenerate(start, heading, kind, node_index, section_index)
                        .with_width(shape.width)
                }
            }
        } else {
            if shape.length <= 0.0 || !shape.length.is_finite() {
                tracing::warn!(
                    "Straight track section {} has invalid length {} (node {}, section {})",
                    shape.index,
                    shape.length,
                    node_index,
                    section_index
                );
                return Self::degenerate(start, heading, kind, node_index, section_index)
                    .with_width(shape.width);
            }
            let end = start + utils::heading_vector(heading) * shape.length;
            Self {
                start,
                end,
                heading,
                length: shape.length,
                width: shape.width,
                geometry: Geometry::Straight,
                kind,
                node_index,
                section_index,
            }
        }
    }

    /// Straight segment between two points
    pub fn from_points(start: Point<f64>, end: Point<f64>, kind: SegmentKind) -> Result<Self> {
        let length = utils::distance(start, end);
        if length <= 0.0 || !length.is_finite() {
            return Err(MapError::InvalidGeometry(format!(
                "segment from ({}, {}) to ({}, {}) has no length",
                start.x(),
                start.y(),
                end.x(),
                end.y()
            )));
        }
        Ok(Self {
            start,
            end,
            heading: utils::bearing(start, end),
            length,
            width: 0.0,
            geometry: Geometry::Straight,
            kind,
            node_index: 0,
            section_index: 0,
        })
    }

    /// Circular arc leaving `start` along `heading`, turning by `angle` radians
    ///
    /// The radius must be positive and the angle non-zero.
    pub fn curved(
        start: Point<f64>,
        heading: f64,
        radius: f64,
        angle: f64,
        kind: SegmentKind,
    ) -> Result<Self> {
        if !(radius > 0.0 && radius.is_finite()) || angle == 0.0 || !angle.is_finite() {
            return Err(MapError::InvalidGeometry(format!(
                "curve with radius {radius} and angle {angle} has no extent"
            )));
        }
        let heading = utils::wrap_angle(heading);
        let sign = angle.signum();
        let center = start + Point::new(heading.cos(), -heading.sin()) * (sign * radius);
        let center_to_start = utils::wrap_angle(heading - sign * FRAC_PI_2);
        let curve = Curve {
            radius,
            angle,
            center,
            center_to_start,
            center_to_end: utils::wrap_angle(center_to_start + angle),
        };
        Ok(Self {
            start,
            end: curve.point_at_bearing(center_to_start + angle),
            heading,
            length: radius * angle.abs(),
            width: 0.0,
            geometry: Geometry::Curved(curve),
            kind,
            node_index: 0,
            section_index: 0,
        })
    }

    fn degenerate(
        location: Point<f64>,
        heading: f64,
        kind: SegmentKind,
        node_index: usize,
        section_index: usize,
    ) -> Self {
        Self {
            start: location,
            end: location,
            heading,
            length: 0.0,
            width: 0.0,
            geometry: Geometry::Degenerate,
            kind,
            node_index,
            section_index,
        }
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_kind(mut self, kind: SegmentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_indices(mut self, node_index: usize, section_index: usize) -> Self {
        self.node_index = node_index;
        self.section_index = section_index;
        self
    }

    #[inline]
    pub fn start(&self) -> Point<f64> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Point<f64> {
        self.end
    }

    #[inline]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    #[inline]
    pub fn node_index(&self) -> usize {
        self.node_index
    }

    #[inline]
    pub fn section_index(&self) -> usize {
        self.section_index
    }

    #[inline]
    pub fn is_curved(&self) -> bool {
        matches!(self.geometry, Geometry::Curved(_))
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        matches!(self.geometry, Geometry::Degenerate)
    }

    /// Radius of a curved segment, 0 otherwise
    pub fn radius(&self) -> f64 {
        match self.geometry {
            Geometry::Curved(curve) => curve.radius,
            _ => 0.0,
        }
    }

    /// Signed angle of a curved segment in radians, 0 otherwise
    pub fn angle(&self) -> f64 {
        match self.geometry {
            Geometry::Curved(curve) => curve.angle,
            _ => 0.0,
        }
    }

    /// Squared distance from `point` to the closest point on the segment
    ///
    /// Returns `None` when the point does not project onto the segment: outside the
    /// extent of a straight, outside the angular span of a curve. Points within
    /// [`PROXIMITY_TOLERANCE`] of either end always match.
    pub fn distance_squared(&self, point: Point<f64>) -> Option<f64> {
        let to_start = utils::distance_squared(point, self.start);
        if to_start < PROXIMITY_TOLERANCE {
            return Some(to_start);
        }
        let to_end = utils::distance_squared(point, self.end);
        if to_end < PROXIMITY_TOLERANCE {
            return Some(to_end);
        }

        match self.geometry {
            Geometry::Degenerate => None,
            Geometry::Straight => {
                let direction = self.end - self.start;
                let t = (point - self.start).dot(direction) / direction.dot(direction);
                if !(0.0..=1.0).contains(&t) {
                    return None;
                }
                Some(utils::distance_squared(point, self.start + direction * t))
            }
            Geometry::Curved(curve) => {
                if curve.sweep_to(point) > curve.angle.abs() + ARC_SPAN_EPSILON {
                    return None;
                }
                let offset = utils::distance(curve.center, point) - curve.radius;
                Some(offset * offset)
            }
        }
    }

    /// Distance along the segment from its start to the point nearest to `point`
    pub fn distance_along(&self, point: Point<f64>) -> f64 {
        match self.geometry {
            Geometry::Degenerate => 0.0,
            Geometry::Straight => {
                let direction = self.end - self.start;
                let t = (point - self.start).dot(direction) / direction.dot(direction);
                t.clamp(0.0, 1.0) * self.length
            }
            Geometry::Curved(curve) => {
                let sweep = curve.sweep_to(point);
                let span = curve.angle.abs();
                if sweep <= span {
                    sweep * curve.radius
                } else if sweep - span < TAU - sweep {
                    self.length
                } else {
                    0.0
                }
            }
        }
    }

    /// Point at the given distance from the start, clamped to the segment
    pub fn point_at(&self, distance: f64) -> Point<f64> {
        let distance = distance.clamp(0.0, self.length);
        match self.geometry {
            Geometry::Degenerate => self.start,
            Geometry::Straight => self.start + (self.end - self.start) * (distance / self.length),
            Geometry::Curved(curve) => {
                curve.point_at_bearing(curve.center_to_start + curve.sign() * distance / curve.radius)
            }
        }
    }

    /// Tangent heading at the given distance from the start
    pub fn heading_at(&self, distance: f64) -> f64 {
        match self.geometry {
            Geometry::Curved(curve) => {
                let distance = distance.clamp(0.0, self.length);
                utils::wrap_angle(self.heading + curve.sign() * distance / curve.radius)
            }
            _ => self.heading,
        }
    }

    /// Tangent heading at the point of the segment nearest to `point`
    pub fn direction_at(&self, point: Point<f64>) -> f64 {
        self.heading_at(self.distance_along(point))
    }

    /// Heading when leaving the end of the segment
    pub fn end_heading(&self) -> f64 {
        self.heading_at(self.length)
    }

    /// The part of the segment between two distances from its start
    ///
    /// Distances are clamped; an empty range yields a degenerate segment at that spot.
    pub fn between(&self, from: f64, to: f64) -> Self {
        let from = from.clamp(0.0, self.length);
        let to = to.clamp(0.0, self.length);
        if from <= 0.0 && to >= self.length {
            return self.clone();
        }
        if to <= from {
            return Self::degenerate(
                self.point_at(from),
                self.heading_at(from),
                self.kind,
                self.node_index,
                self.section_index,
            )
            .with_width(self.width);
        }

        let geometry = match self.geometry {
            Geometry::Curved(curve) => {
                let sign = curve.sign();
                let center_to_start =
                    utils::wrap_angle(curve.center_to_start + sign * from / curve.radius);
                let angle = sign * (to - from) / curve.radius;
                Geometry::Curved(Curve {
                    radius: curve.radius,
                    angle,
                    center: curve.center,
                    center_to_start,
                    center_to_end: utils::wrap_angle(center_to_start + angle),
                })
            }
            other => other,
        };

        Self {
            start: self.point_at(from),
            end: self.point_at(to),
            heading: self.heading_at(from),
            length: to - from,
            width: self.width,
            geometry,
            kind: self.kind,
            node_index: self.node_index,
            section_index: self.section_index,
        }
    }

    /// A partial copy covering `remaining_length` meters
    ///
    /// Forward, the piece starts `start_offset` meters from the start. In reverse the
    /// piece ends `start_offset` meters from the start, or at the segment end when the
    /// offset is zero. The result keeps this segment's orientation.
    pub fn trim(&self, remaining_length: f64, start_offset: f64, reverse: bool) -> Self {
        let remaining_length = remaining_length.max(0.0);
        let start_offset = start_offset.max(0.0);
        if reverse {
            let to = if start_offset > 0.0 {
                start_offset
            } else {
                self.length
            };
            self.between(to - remaining_length, to)
        } else {
            self.between(start_offset, start_offset + remaining_length)
        }
    }

    /// The part of the segment bounded by the projections of two points
    ///
    /// The points may be given in either order; the result keeps this segment's
    /// orientation.
    pub fn clip(&self, start: Point<f64>, end: Point<f64>) -> Self {
        let mut from = self.distance_along(start);
        let mut to = self.distance_along(end);
        if from > to {
            std::mem::swap(&mut from, &mut to);
        }
        self.between(from, to)
    }

    /// The same piece of track, traversed the other way
    pub fn reversed(&self) -> Self {
        let geometry = match self.geometry {
            Geometry::Curved(curve) => Geometry::Curved(Curve {
                radius: curve.radius,
                angle: -curve.angle,
                center: curve.center,
                center_to_start: curve.center_to_end,
                center_to_end: curve.center_to_start,
            }),
            other => other,
        };
        Self {
            start: self.end,
            end: self.start,
            heading: utils::wrap_angle(self.end_heading() + PI),
            length: self.length,
            width: self.width,
            geometry,
            kind: self.kind,
            node_index: self.node_index,
            section_index: self.section_index,
        }
    }

    /// Midpoint along the segment
    pub fn mid_point(&self) -> Point<f64> {
        self.point_at(self.length / 2.0)
    }
}

impl TileCoordinate for TrackSegment {
    fn tile(&self) -> Tile {
        Tile::from_world(self.start)
    }
}

impl InformationProvider for TrackSegment {
    fn info(&self) -> InfoMap {
        let mut info = InfoMap::new();
        let label = match self.kind {
            SegmentKind::Rail => "Track Node",
            SegmentKind::Road => "Road Node",
            SegmentKind::Platform => "Platform Node",
        };
        info.insert(label.to_string(), self.node_index.to_string());
        info.insert("Section".to_string(), self.section_index.to_string());
        info.insert("Length".to_string(), format!("{:.1} m", self.length));
        info.insert(
            "Direction".to_string(),
            format!("{:.1}°", self.heading.to_degrees()),
        );
        match self.geometry {
            Geometry::Curved(curve) => {
                info.insert("Curve Radius".to_string(), format!("{:.1} m", curve.radius));
                info.insert(
                    "Curve Angle".to_string(),
                    format!("{:.2}°", curve.angle.to_degrees()),
                );
            }
            Geometry::Straight => {
                info.insert("Curve Radius".to_string(), "Straight".to_string());
            }
            Geometry::Degenerate => {
                info.insert("Curve Radius".to_string(), "Unknown".to_string());
            }
        }
        info
    }
}

/// First segment that `location` lies on, within [`PROXIMITY_TOLERANCE`]
pub fn segment_at<'a, I>(location: Point<f64>, segments: I) -> Option<&'a TrackSegment>
where
    I: IntoIterator<Item = &'a TrackSegment>,
{
    segments.into_iter().find(|segment| {
        segment
            .distance_squared(location)
            .is_some_and(|d| d <= PROXIMITY_TOLERANCE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{TrackSection, WorldLocation};

    const EPS: f64 = 1e-9;

    fn assert_point_eq(a: Point<f64>, b: Point<f64>) {
        assert!(
            utils::distance(a, b) < 1e-6,
            "({}, {}) != ({}, {})",
            a.x(),
            a.y(),
            b.x(),
            b.y()
        );
    }

    fn north_straight() -> TrackSegment {
        TrackSegment::from_points(Point::new(0.0, 0.0), Point::new(0.0, 100.0), SegmentKind::Rail)
            .unwrap()
    }

    fn right_quarter() -> TrackSegment {
        TrackSegment::curved(Point::new(0.0, 0.0), 0.0, 100.0, FRAC_PI_2, SegmentKind::Rail)
            .unwrap()
    }

    fn sections() -> TrackSections {
        let mut table = TrackSections::new();
        table.insert(TrackSection::straight(10, 1.5, 50.0));
        table.insert(TrackSection::curved(20, 1.5, 200.0, -30.0));
        table
    }

    #[test]
    fn test_straight_from_points() {
        let segment = north_straight();
        assert!((segment.length() - 100.0).abs() < EPS);
        assert!(segment.heading().abs() < EPS);

        let diagonal =
            TrackSegment::from_points(Point::new(1.0, 2.0), Point::new(4.0, 6.0), SegmentKind::Road)
                .unwrap();
        assert!((diagonal.length() - 5.0).abs() < EPS);
    }

    #[test]
    fn test_from_points_rejects_coincident_points() {
        let p = Point::new(3.0, 3.0);
        assert!(TrackSegment::from_points(p, p, SegmentKind::Rail).is_err());
    }

    #[test]
    fn test_straight_distance_squared() {
        let segment = north_straight();
        assert_eq!(segment.distance_squared(Point::new(0.0, 50.0)), Some(0.0));
        let d = segment.distance_squared(Point::new(10.0, 50.0)).unwrap();
        assert!((d - 100.0).abs() < EPS);
        assert!(segment.distance_squared(Point::new(0.0, 150.0)).is_none());
        assert!(segment.distance_squared(Point::new(5.0, -3.0)).is_none());
    }

    #[test]
    fn test_endpoint_tolerance() {
        let segment = north_straight();
        // Just past the end, but within tolerance of the endpoint
        let d = segment.distance_squared(Point::new(0.0, 100.5)).unwrap();
        assert!((d - 0.25).abs() < EPS);
    }

    #[test]
    fn test_construct_straight_from_section() {
        let section = TrackVectorSection {
            section_index: 10,
            location: WorldLocation::new(0, 0, 0.0, 0.0, 0.0),
            heading: FRAC_PI_2,
        };
        let segment = TrackSegment::new(&section, &sections(), 4, 2, SegmentKind::Rail);
        assert!((segment.length() - 50.0).abs() < EPS);
        assert_point_eq(segment.end(), Point::new(50.0, 0.0));
        assert_eq!(segment.node_index(), 4);
        assert_eq!(segment.section_index(), 2);
        assert!((segment.width() - 1.5).abs() < EPS);
    }

    #[test]
    fn test_construct_curve_from_section() {
        let section = TrackVectorSection {
            section_index: 20,
            location: WorldLocation::new(1, 1, 10.0, 0.0, 10.0),
            heading: 0.0,
        };
        let segment = TrackSegment::new(&section, &sections(), 0, 0, SegmentKind::Rail);
        assert!(segment.is_curved());
        assert!((segment.angle() + 30f64.to_radians()).abs() < EPS);
        assert!((segment.length() - 200.0 * 30f64.to_radians()).abs() < EPS);
        // Left turn: the centre is west of the start
        let Geometry::Curved(curve) = *segment.geometry() else {
            panic!("expected a curve");
        };
        assert_point_eq(curve.center, Point::new(2048.0 + 10.0 - 200.0, 2048.0 + 10.0));
    }

    #[test]
    fn test_missing_section_is_degenerate() {
        let section = TrackVectorSection {
            section_index: 999,
            location: WorldLocation::new(0, 0, 5.0, 0.0, 5.0),
            heading: 0.0,
        };
        let segment = TrackSegment::new(&section, &sections(), 1, 0, SegmentKind::Rail);
        assert!(segment.is_degenerate());
        assert_eq!(segment.length(), 0.0);
        assert_point_eq(segment.start(), segment.end());
        assert!(segment.distance_squared(Point::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_curve_end_point() {
        let right = right_quarter();
        assert_point_eq(right.end(), Point::new(100.0, 100.0));
        assert!((right.end_heading() - FRAC_PI_2).abs() < EPS);
        assert!((right.length() - 50.0 * PI).abs() < EPS);

        let left =
            TrackSegment::curved(Point::new(0.0, 0.0), 0.0, 100.0, -FRAC_PI_2, SegmentKind::Rail)
                .unwrap();
        assert_point_eq(left.end(), Point::new(-100.0, 100.0));
        assert!((left.end_heading() + FRAC_PI_2).abs() < EPS);
    }

    #[test]
    fn test_curve_reconstructs_end_from_center() {
        let segment =
            TrackSegment::curved(Point::new(12.0, -7.0), 2.3, 350.0, -0.4, SegmentKind::Rail)
                .unwrap();
        let Geometry::Curved(curve) = *segment.geometry() else {
            panic!("expected a curve");
        };
        let rotated = curve.center
            + utils::heading_vector(curve.center_to_start + curve.angle) * curve.radius;
        assert_point_eq(rotated, segment.end());
        assert!((utils::distance(curve.center, segment.start()) - 350.0).abs() < 1e-6);
    }

    #[test]
    fn test_curve_distance_squared() {
        let segment = right_quarter();
        let mid = segment.mid_point();
        assert!(segment.distance_squared(mid).unwrap() < 1e-9);

        let inside = segment.distance_squared(Point::new(10.0, 50.0)).unwrap();
        let expected = (((90.0f64).powi(2) + 50.0f64.powi(2)).sqrt() - 100.0).powi(2);
        assert!((inside - expected).abs() < 1e-6);

        assert!(segment.distance_squared(Point::new(200.0, 0.0)).is_none());
        assert!(segment.distance_squared(Point::new(50.0, -50.0)).is_none());
    }

    #[test]
    fn test_direction_at() {
        let straight = north_straight();
        assert!(straight.direction_at(Point::new(3.0, 40.0)).abs() < EPS);

        let curve = right_quarter();
        assert!((curve.direction_at(curve.mid_point()) - FRAC_PI_2 / 2.0).abs() < 1e-6);
        assert!((curve.direction_at(Point::new(100.0, 150.0)) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_full_trim_is_identity() {
        let straight = north_straight();
        assert_eq!(straight.trim(100.0, 0.0, false), straight);
        assert_eq!(straight.trim(500.0, 0.0, true), straight);

        let curve = right_quarter();
        assert_eq!(curve.trim(curve.length() + 1.0, 0.0, false), curve);
    }

    #[test]
    fn test_partial_trim_straight() {
        let segment = north_straight();
        let forward = segment.trim(30.0, 20.0, false);
        assert_point_eq(forward.start(), Point::new(0.0, 20.0));
        assert_point_eq(forward.end(), Point::new(0.0, 50.0));
        assert!((forward.length() - 30.0).abs() < EPS);

        // Reverse with an offset ends the piece at the offset
        let backward = segment.trim(30.0, 20.0, true);
        assert_point_eq(backward.start(), Point::new(0.0, 0.0));
        assert_point_eq(backward.end(), Point::new(0.0, 20.0));
        assert!((backward.length() - 20.0).abs() < EPS);

        let before_offset = segment.trim(30.0, 80.0, true);
        assert_point_eq(before_offset.start(), Point::new(0.0, 50.0));
        assert_point_eq(before_offset.end(), Point::new(0.0, 80.0));

        let tail = segment.trim(30.0, 0.0, true);
        assert_point_eq(tail.start(), Point::new(0.0, 70.0));
        assert_point_eq(tail.end(), Point::new(0.0, 100.0));

        let clamped = segment.trim(500.0, 90.0, false);
        assert!((clamped.length() - 10.0).abs() < EPS);
    }

    #[test]
    fn test_curved_rejects_empty_arcs() {
        let origin = Point::new(0.0, 0.0);
        assert!(matches!(
            TrackSegment::curved(origin, 0.0, -100.0, 0.5, SegmentKind::Rail),
            Err(MapError::InvalidGeometry(_))
        ));
        assert!(matches!(
            TrackSegment::curved(origin, 0.0, 100.0, 0.0, SegmentKind::Rail),
            Err(MapError::InvalidGeometry(_))
        ));
        assert!(TrackSegment::curved(origin, 0.0, f64::NAN, 0.5, SegmentKind::Rail).is_err());
    }

    #[test]
    fn test_partial_trim_curve() {
        let segment = right_quarter();
        let half = segment.trim(segment.length() / 2.0, 0.0, false);
        assert_point_eq(half.start(), segment.start());
        assert_point_eq(half.end(), segment.mid_point());
        assert!((half.angle() - FRAC_PI_2 / 2.0).abs() < EPS);

        let tail = segment.trim(segment.length() / 2.0, 0.0, true);
        assert_point_eq(tail.start(), segment.mid_point());
        assert_point_eq(tail.end(), segment.end());
        assert!((tail.heading() - FRAC_PI_2 / 2.0).abs() < EPS);
        // Distances still resolve against the shared centre
        assert!(tail.distance_squared(tail.mid_point()).unwrap() < 1e-9);
    }

    #[test]
    fn test_clip_keeps_orientation() {
        let segment = north_straight();
        let clipped = segment.clip(Point::new(1.0, 70.0), Point::new(0.0, 10.0));
        assert_point_eq(clipped.start(), Point::new(0.0, 10.0));
        assert_point_eq(clipped.end(), Point::new(0.0, 70.0));
        assert!((clipped.length() - 60.0).abs() < EPS);

        let curve = right_quarter();
        let clipped = curve.clip(curve.end(), curve.mid_point());
        assert_point_eq(clipped.start(), curve.mid_point());
        assert_point_eq(clipped.end(), curve.end());
    }

    #[test]
    fn test_reversed() {
        let curve = right_quarter();
        let reversed = curve.reversed();
        assert_point_eq(reversed.start(), curve.end());
        assert_point_eq(reversed.end(), curve.start());
        assert!((reversed.heading() + FRAC_PI_2).abs() < EPS);
        assert!(utils::wrap_angle(reversed.end_heading() - PI).abs() < EPS);
        assert!(reversed.distance_squared(curve.mid_point()).unwrap() < 1e-9);
        assert_point_eq(reversed.reversed().end(), curve.end());

        let straight = north_straight().reversed();
        assert!(utils::wrap_angle(straight.heading() - PI).abs() < EPS);
    }

    #[test]
    fn test_segment_at() {
        let segments = vec![north_straight(), right_quarter()];
        let found = segment_at(Point::new(0.5, 30.0), &segments).unwrap();
        assert!(!found.is_curved());
        assert!(segment_at(Point::new(500.0, 500.0), &segments).is_none());
    }

    #[test]
    fn test_info() {
        let info = right_quarter().with_indices(3, 1).info();
        assert_eq!(info.get("Track Node").map(String::as_str), Some("3"));
        assert_eq!(info.get("Curve Radius").map(String::as_str), Some("100.0 m"));
    }
}
