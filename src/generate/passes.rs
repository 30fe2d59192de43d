//! Refinement passes run on radial wedges: a lengthwise splinter and a row
//! of cross cuts.
//!
//! Both work on a piece's outline split into two chains that run outwards
//! from the point nearest the pattern origin.

use rand::rngs::StdRng;

use crate::boolean::Polygon;
use crate::math::{Point2, Vector2};

use super::radial::signed_angle;
use super::random::{jitter, randomize};

/// Outlines with this many edges or fewer are not splintered.
const SPLINTER_MIN_EDGES: usize = 8;

/// Outlines with this many edges or fewer are not cross cut.
const CROSS_CUT_MIN_EDGES: usize = 5;

/// Pattern-wide values shared by the passes.
#[derive(Debug, Clone, Copy)]
pub(super) struct Frame {
    pub origin: Point2,
    pub scale: Vector2,
    pub randomness: f64,
}

/// An outline split into two chains starting at its edge nearest the origin.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Chains {
    pub left: Vec<Point2>,
    pub right: Vec<Point2>,
    /// Unit direction from the origin towards the outline.
    pub ray_dir: Vector2,
    pub avg_left: f64,
    pub avg_right: f64,
}

impl Chains {
    /// Starts at the edge whose nearer end is closest to `origin` and grows
    /// both chains along the ring, always taking the frontier edge that is
    /// closer to `origin` (left on ties), until every edge is used.
    pub(super) fn split(ring: &[Point2], origin: Point2) -> Option<Self> {
        let n = ring.len();
        if n < 3 {
            return None;
        }
        let dist: Vec<f64> = ring.iter().map(|q| (q - origin).norm()).collect();
        // edge k runs from vertex k to vertex k + 1
        let key = |k: usize| dist[k].min(dist[(k + 1) % n]);
        let start = (0..n).min_by(|&a, &b| key(a).total_cmp(&key(b)))?;

        let (mut lf, mut rf) = (start, (start + 1) % n);
        let mut left = vec![ring[lf]];
        let mut right = vec![ring[rf]];
        for _ in 1..n {
            let left_edge = (lf + n - 1) % n;
            if key(left_edge) <= key(rf) {
                lf = left_edge;
                left.push(ring[lf]);
            } else {
                rf = (rf + 1) % n;
                right.push(ring[rf]);
            }
        }

        let ray_dir = ring
            .iter()
            .filter_map(|q| (q - origin).try_normalize(f64::EPSILON))
            .sum::<Vector2>()
            .try_normalize(f64::EPSILON)?;
        Some(Self {
            avg_left: average_step(&left),
            avg_right: average_step(&right),
            left,
            right,
            ray_dir,
        })
    }

    /// Swaps the chains so that `left` has at least as many points.
    pub(super) fn longer_left(mut self) -> Self {
        if self.right.len() > self.left.len() {
            std::mem::swap(&mut self.left, &mut self.right);
            std::mem::swap(&mut self.avg_left, &mut self.avg_right);
        }
        self
    }
}

#[allow(clippy::cast_precision_loss)]
fn average_step(chain: &[Point2]) -> f64 {
    let total: f64 = chain.windows(2).map(|w| (w[1] - w[0]).norm()).sum();
    total / chain.len() as f64
}

fn perpendicular(v: &Vector2) -> Vector2 {
    Vector2::new(-v.y, v.x)
}

/// Builds a narrow cutter that runs from a bend in the longer chain out past
/// the rim, drifting from the longer chain towards the middle of the piece.
///
/// Returns `None` when the outline is too simple or has no bend sharper than
/// `deviation` radians.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(super) fn splinter(
    rng: &mut StdRng,
    ring: &[Point2],
    frame: &Frame,
    max_distance: f64,
    deviation: f64,
) -> Option<Polygon> {
    if ring.len() <= SPLINTER_MIN_EDGES {
        return None;
    }
    let Chains {
        left, right, ray_dir, ..
    } = Chains::split(ring, frame.origin)?.longer_left();

    let first = 2 + randomize(rng, 0.0, 0.0, 4.0, frame.randomness) as usize;
    let bend = (first..left.len().saturating_sub(1)).find(|&i| {
        let before = signed_angle(&(left[i - 1] - left[i - 2]), &ray_dir);
        let after = signed_angle(&(left[i] - left[i - 1]), &ray_dir);
        (before - after).abs() > deviation
    })?;
    let cur = bend - 1;
    if cur + 4 >= right.len() {
        return None;
    }

    let mut points = Vec::with_capacity(right.len() + 2);
    points.push(left[cur]);
    points.push(left[cur]);
    let step = jitter(rng, 0.15, 0.1, frame.randomness);
    let mut toward_center = 0.5_f64;
    let mut width = 0.0;
    for i in cur + 1..right.len() - 1 {
        toward_center = (toward_center - step).clamp(0.0, 1.0);
        let (lp, rp) = (left[i], right[i]);
        width = (rp - lp).norm();
        points.push(lp + (rp - lp) * (0.7 - 0.6 * toward_center));
    }

    let end = frame.origin + ray_dir * max_distance;
    points.push(end);
    let mut perp = perpendicular(&ray_dir).component_mul(&frame.scale);
    if (right[cur] - left[cur]).dot(&perp) < 0.0 {
        perp = -perp;
    }
    points.push(end - perp * width);
    points[0] -= perp * width;
    Some(Polygon::from_region(points))
}

/// Builds up to `max_cuts` cutter regions across the piece, each spanning a
/// few points of the longer chain and closed either against the matching
/// points of the shorter chain or by a band perpendicular to the ray.
///
/// Returns `None` when the outline is too simple or no region fits.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub(super) fn cross_cuts(rng: &mut StdRng, ring: &[Point2], frame: &Frame, max_cuts: usize) -> Option<Polygon> {
    if max_cuts == 0 || ring.len() <= CROSS_CUT_MIN_EDGES {
        return None;
    }
    let Chains {
        left,
        right,
        ray_dir,
        avg_right,
        ..
    } = Chains::split(ring, frame.origin)?.longer_left();
    let perp = perpendicular(&ray_dir).component_mul(&frame.scale);
    let randomness = frame.randomness;

    let mut regions = Vec::new();
    let mut cur_right = 0;
    let mut cur_left = 1 + randomize(rng, 0.0, 0.0, 4.0, randomness) as usize;
    let mut widest = 0.0_f64;

    for num in 0..max_cuts {
        if cur_left >= left.len() {
            break;
        }
        let lp = left[cur_left];
        let left_dist = (frame.origin - lp).norm();
        let width = (randomize(rng, (1 + num % 2) as f64, 0.0, 3.0, randomness) as usize)
            .min(left.len() - cur_left - 1);
        if width + cur_left + 1 >= left.len() {
            break;
        }

        // walk the short chain out to the distance of the left point
        let mut across = true;
        while cur_right < right.len() {
            let rp = right[cur_right];
            let right_dist = (frame.origin - rp).norm();
            widest = widest.max((lp - rp).norm());
            let reached = right_dist > left_dist || (right_dist - left_dist).abs() < avg_right * 0.25;
            if reached && cur_right + width < right.len() {
                let span = (lp - rp).try_normalize(f64::EPSILON).unwrap_or_else(Vector2::zeros);
                across = span.dot(&ray_dir).abs() > 0.2;
                break;
            }
            cur_right += 1;
        }

        let mut region = left[cur_left..=cur_left + width].to_vec();
        if across {
            let flip = if signed_angle(&(lp - frame.origin), &ray_dir) < 0.0 { -1.0 } else { 1.0 };
            let offset = perp * (flip * widest * 2.0);
            region.push(left[cur_left + width] + offset);
            region.push(left[cur_left] + offset);
        } else {
            region.extend((0..=width).map(|i| right[cur_right + width - i]));
            cur_right += width;
        }
        if width > 0 && (!across || widest > f64::EPSILON) {
            regions.push(region);
        }

        cur_left += randomize(rng, (1 + width + num % 3) as f64, 0.0, 4.0, randomness) as usize;
    }

    (!regions.is_empty()).then(|| Polygon::new(regions))
}
