//! Polygon boolean operations by segment sweep.
//!
//! The pipeline has four stages, each exposed separately so callers can reuse
//! intermediate results (e.g. cut one cutter against many polygons):
//!
//! 1. [`PolyBool::segments`] upscales a polygon and resolves its own
//!    crossings, tagging every segment with the fill above and below it.
//! 2. [`PolyBool::combine`] sweeps two such lists together and tags every
//!    segment with the other operand's fill.
//! 3. [`PolyBool::select`] keeps the segments a [`BooleanOp`] needs.
//! 4. [`PolyBool::polygon`] chains the kept segments into regions and scales
//!    them back down.

mod chain;
mod intersecter;
mod list;
mod segment;
mod select;
mod shapes;

pub use chain::SegmentChainer;
pub use list::{LinkedList, Transition};
pub use segment::{Segment, SegmentFill};
pub use select::{BooleanOp, Keep};
pub use shapes::{group_shapes, nesting_depths, orient_regions, Shape};

use tracing::debug;

use crate::error::{BooleanError, Result};
use crate::math::{Epsilon, Point2, Vector2};

use intersecter::{Intersecter, Pass};

/// Parameters for the boolean engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsgParams {
    /// Coordinate multiplier applied before segmentation.
    pub upscale: f64,
    /// Decimal digits of precision; the tolerance is `10^-precision`.
    pub precision: i32,
    /// How far open cut lines are extended past their ends, in input units.
    pub cut_extent: f64,
}

impl Default for CsgParams {
    fn default() -> Self {
        Self {
            upscale: 1000.0,
            precision: 5,
            cut_extent: 1000.0,
        }
    }
}

impl CsgParams {
    /// The tolerance used for all coincidence tests.
    #[must_use]
    pub fn epsilon(&self) -> Epsilon {
        Epsilon::from_precision(self.precision)
    }

    /// Checks the parameters are in their supported ranges.
    ///
    /// # Errors
    ///
    /// Returns `BooleanError::InvalidParams` if `upscale` is below 1 or not
    /// finite, if `precision` is outside `2..=8`, or if `cut_extent` is not
    /// positive.
    pub fn validate(&self) -> std::result::Result<(), BooleanError> {
        if !self.upscale.is_finite() || self.upscale < 1.0 {
            return Err(BooleanError::InvalidParams(format!(
                "upscale must be at least 1, got {}",
                self.upscale
            )));
        }
        if !(2..=8).contains(&self.precision) {
            return Err(BooleanError::InvalidParams(format!(
                "precision must be within 2..=8, got {}",
                self.precision
            )));
        }
        if !(self.cut_extent.is_finite() && self.cut_extent > 0.0) {
            return Err(BooleanError::InvalidParams(format!(
                "cut extent must be positive, got {}",
                self.cut_extent
            )));
        }
        Ok(())
    }
}

/// A set of closed regions. Regions may overlap or nest; the engine reads
/// them with the even-odd rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon {
    pub regions: Vec<Vec<Point2>>,
}

impl Polygon {
    #[must_use]
    pub fn new(regions: Vec<Vec<Point2>>) -> Self {
        Self { regions }
    }

    /// A polygon with one region.
    #[must_use]
    pub fn from_region(region: Vec<Point2>) -> Self {
        Self {
            regions: vec![region],
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions grouped into outer boundaries with their holes.
    #[must_use]
    pub fn shapes(&self) -> Vec<Shape> {
        group_shapes(&self.regions)
    }

    /// Net area, holes subtracted.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.shapes().iter().map(Shape::area).sum()
    }
}

/// Segments of one operand, in upscaled coordinates, with their own fill
/// resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentList {
    segments: Vec<Segment>,
}

impl SegmentList {
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Segments of two operands swept together; `my_fill` refers to the primary
/// operand and `other_fill` to the secondary one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombinedSegments {
    segments: Vec<Segment>,
}

impl CombinedSegments {
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

/// The two sides of a cut.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CutResult {
    /// Part of the target covered by the cutter.
    pub inside: Polygon,
    /// Part of the target outside the cutter.
    pub outside: Polygon,
}

/// Boolean engine bound to one set of [`CsgParams`].
#[derive(Debug, Clone, Copy)]
pub struct PolyBool {
    params: CsgParams,
    eps: Epsilon,
}

impl PolyBool {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns `BooleanError::InvalidParams` if `params` fail validation.
    pub fn new(params: CsgParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            eps: params.epsilon(),
        })
    }

    #[must_use]
    pub fn params(&self) -> &CsgParams {
        &self.params
    }

    #[must_use]
    pub fn epsilon(&self) -> Epsilon {
        self.eps
    }

    /// Upscales and segments a polygon, resolving its self-intersections.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if the sweep hits an internal inconsistency,
    /// typically caused by an epsilon unsuited to the input scale.
    pub fn segments(&self, polygon: &Polygon) -> Result<SegmentList> {
        let scale = self.params.upscale;
        let mut sweep = Intersecter::new(Pass::SelfIntersection, self.eps);
        for region in &polygon.regions {
            let scaled: Vec<Point2> = region.iter().map(|p| Point2::from(p.coords * scale)).collect();
            sweep.add_region(&scaled);
        }
        let segments = sweep.calculate()?;
        Ok(SegmentList { segments })
    }

    /// Sweeps two segment lists together.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if the sweep hits an internal inconsistency.
    pub fn combine(&self, primary: &SegmentList, secondary: &SegmentList) -> Result<CombinedSegments> {
        let mut sweep = Intersecter::new(Pass::Combine, self.eps);
        for seg in &primary.segments {
            sweep.add_segment(Segment::copy_with(seg.start, seg.end, seg), true);
        }
        for seg in &secondary.segments {
            sweep.add_segment(Segment::copy_with(seg.start, seg.end, seg), false);
        }
        let segments = sweep.calculate()?;
        Ok(CombinedSegments { segments })
    }

    /// Keeps the segments bounding the result of `op`.
    ///
    /// # Errors
    ///
    /// Returns `BooleanError::UnresolvedFill` if a segment was never
    /// classified against the other operand.
    pub fn select(&self, combined: &CombinedSegments, op: BooleanOp) -> Result<SegmentList> {
        let segments = select::select(&combined.segments, op)?;
        Ok(SegmentList { segments })
    }

    /// Chains segments into oriented regions and scales them back down.
    ///
    /// Outer regions come back counter-clockwise, holes clockwise.
    #[must_use]
    pub fn polygon(&self, segments: &SegmentList) -> Polygon {
        let scale = self.params.upscale;
        let regions: Vec<Vec<Point2>> = SegmentChainer::new(self.eps)
            .chain(&segments.segments)
            .into_iter()
            .map(|region| region.into_iter().map(|p| Point2::from(p.coords / scale)).collect())
            .collect();
        Polygon::new(orient_regions(regions))
    }

    /// Runs the whole pipeline for one operation.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if any sweep fails.
    pub fn operate(&self, a: &Polygon, b: &Polygon, op: BooleanOp) -> Result<Polygon> {
        let seg_a = self.segments(a)?;
        let seg_b = self.segments(b)?;
        let combined = self.combine(&seg_a, &seg_b)?;
        let selected = self.select(&combined, op)?;
        let result = self.polygon(&selected);
        debug!(?op, regions = result.regions.len(), "boolean operation finished");
        Ok(result)
    }

    /// `a ∪ b`.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if any sweep fails.
    pub fn union(&self, a: &Polygon, b: &Polygon) -> Result<Polygon> {
        self.operate(a, b, BooleanOp::Union)
    }

    /// `a ∩ b`.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if any sweep fails.
    pub fn intersect(&self, a: &Polygon, b: &Polygon) -> Result<Polygon> {
        self.operate(a, b, BooleanOp::Intersect)
    }

    /// `a − b`.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if any sweep fails.
    pub fn difference(&self, a: &Polygon, b: &Polygon) -> Result<Polygon> {
        self.operate(a, b, BooleanOp::Difference)
    }

    /// `b − a`.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if any sweep fails.
    pub fn difference_rev(&self, a: &Polygon, b: &Polygon) -> Result<Polygon> {
        self.operate(a, b, BooleanOp::DifferenceRev)
    }

    /// Symmetric difference.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if any sweep fails.
    pub fn xor(&self, a: &Polygon, b: &Polygon) -> Result<Polygon> {
        self.operate(a, b, BooleanOp::Xor)
    }

    /// Splits `target` by a closed `cutter`: one combine, then intersect and
    /// difference selected from it.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if any sweep fails.
    pub fn cut(&self, target: &Polygon, cutter: &Polygon) -> Result<CutResult> {
        let cutter_segments = self.segments(cutter)?;
        self.cut_segments(target, &cutter_segments)
    }

    /// [`cut`](Self::cut) with a cutter already segmented, for cutting many
    /// targets with one cutter.
    ///
    /// # Errors
    ///
    /// Returns a `BooleanError` if any sweep fails.
    pub fn cut_segments(&self, target: &Polygon, cutter: &SegmentList) -> Result<CutResult> {
        let target_segments = self.segments(target)?;
        let combined = self.combine(&target_segments, cutter)?;
        let inside = self.select(&combined, BooleanOp::Intersect)?;
        let outside = self.select(&combined, BooleanOp::Difference)?;
        Ok(CutResult {
            inside: self.polygon(&inside),
            outside: self.polygon(&outside),
        })
    }

    /// Turns a cut line into a closed cutter region.
    ///
    /// A line whose ends meet is used as is. An open line is extended past
    /// both ends by `cut_extent` and closed around one side; when the end
    /// directions point more than 90° apart an extra corner keeps the
    /// closing edge off the line.
    #[must_use]
    pub fn cutter_from_line(&self, line: &[Point2]) -> Option<Polygon> {
        let n = line.len();
        if n < 2 {
            return None;
        }
        let (first, last) = (line[0], line[n - 1]);
        if (first - last).norm() <= f64::EPSILON {
            return (n > 3).then(|| Polygon::from_region(line[..n - 1].to_vec()));
        }

        let extent = self.params.cut_extent;
        let ext0 = direction(&line[1], &first)?;
        let ext1 = direction(&line[n - 2], &last)?;

        let start = first + ext0 * extent;
        let end = last + ext1 * extent;
        let mut points = Vec::with_capacity(n + 3);
        points.push(start);
        points.extend_from_slice(line);
        points.push(end);
        if ext0.dot(&ext1) < 0.0 {
            let mid = Point2::from((start.coords + end.coords) * 0.5);
            points.push(mid + Vector2::new(-ext0.y, ext0.x) * extent);
        }
        Some(Polygon::from_region(points))
    }

    /// Cuts `target` along a polyline.
    ///
    /// `inside` holds the pieces on the side the cutter closes around. A line
    /// that misses the target leaves it whole in `outside` and `inside` empty,
    /// whichever side the cutter was closed on.
    ///
    /// # Errors
    ///
    /// Returns `BooleanError::InvalidParams` if the line has fewer than two
    /// distinct points, or a `BooleanError` if any sweep fails.
    pub fn cut_with_line(&self, target: &Polygon, line: &[Point2]) -> Result<CutResult> {
        let cutter = self.cutter_from_line(line).ok_or_else(|| {
            BooleanError::InvalidParams("cut line needs at least two distinct points".into())
        })?;
        let mut result = self.cut(target, &cutter)?;
        if result.outside.is_empty() {
            std::mem::swap(&mut result.inside, &mut result.outside);
        }
        Ok(result)
    }
}

/// Unit vector from `from` to `to`.
fn direction(from: &Point2, to: &Point2) -> Option<Vector2> {
    let d = to - from;
    let len = d.norm();
    (len > f64::EPSILON).then(|| d / len)
}
