use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::boolean::{BooleanOp, PolyBool, Polygon, SegmentList};
use crate::error::Result;
use crate::math::{Point2, Vector2};

use super::passes::{self, Frame};
use super::random::{jitter, jitter_asymmetric, sample};

/// Parameters of the radial shatter pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialParams {
    /// Centre of the pattern in sprite rect space, clamped to `[-1, 2]²`.
    pub origin: Point2,
    /// Direction of the first cut, in degrees.
    pub angle: f64,
    /// 0 gives many narrow wedges, 100 gives few wide ones.
    pub spacing: f64,
    /// How often each cut changes direction between centre and rim.
    pub frequency: f64,
    /// 0 gives a regular pattern, 1 the most irregular one.
    pub randomness: f64,
    /// Seed for the random source; 0 draws one from the OS.
    pub seed: u64,
    /// Width over height of the sprite, used to keep wedges even on
    /// non-square sprites.
    pub aspect: f64,
    /// Splits every few wedges lengthwise with a narrow splinter.
    pub splinters: bool,
    /// Most cross cuts made across one piece; 0 turns the pass off.
    pub max_cross_cuts: usize,
}

impl Default for RadialParams {
    fn default() -> Self {
        Self {
            origin: Point2::new(0.5, 0.5),
            angle: 0.0,
            spacing: 50.0,
            frequency: 50.0,
            randomness: 0.5,
            seed: 0,
            aspect: 1.0,
            splinters: true,
            max_cross_cuts: 10,
        }
    }
}

/// Pieces whose outline leaves this rect are dropped.
const KEEP_MIN: f64 = -0.1;
const KEEP_MAX: f64 = 1.1;

/// A cut whose sides differ from the piece by more than this much area,
/// absolute plus relative to the piece, is rolled back.
const AREA_SLACK_ABS: f64 = 1e-7;
const AREA_SLACK_REL: f64 = 1e-5;

fn rotate(v: Vector2, rad: f64) -> Vector2 {
    let (sin, cos) = rad.sin_cos();
    Vector2::new(cos * v.x - sin * v.y, sin * v.x + cos * v.y)
}

pub(super) fn signed_angle(from: &Vector2, to: &Vector2) -> f64 {
    (from.x * to.y - from.y * to.x).atan2(from.dot(to))
}

/// Steps from `coord` along a randomly turned `direction`, keeping the result
/// within `rail` radians of `direction` as seen from `origin`.
struct Step {
    distance: f64,
    direction: Vector2,
    rail: f64,
}

impl Step {
    fn take(&self, rng: &mut StdRng, coord: Point2, origin: Point2, randomness: f64) -> Point2 {
        let r = sample(rng, -randomness, randomness);
        let turned = rotate(self.direction, r * sample(rng, -PI * 0.2, PI * 0.2));
        let distance = self.distance + r * sample(rng, -0.3, 0.3) * self.distance;
        let next = coord + turned * distance;

        let offset = next - origin;
        let angle = signed_angle(&self.direction, &offset);
        if angle.abs() > self.rail {
            let rail = self.rail * 0.9 * angle.signum();
            let rail_dir = rotate(self.direction, rail);
            if let Some(unit) = rail_dir.try_normalize(f64::EPSILON) {
                return origin + unit * offset.norm();
            }
        }
        next
    }
}

pub(super) struct Radial<'a> {
    params: &'a RadialParams,
    engine: &'a PolyBool,
    rng: StdRng,
}

impl<'a> Radial<'a> {
    pub(super) fn new(params: &'a RadialParams, engine: &'a PolyBool) -> Self {
        let rng = if params.seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(params.seed)
        };
        Self { params, engine, rng }
    }

    /// Shatters the subjects and returns the kept pieces.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub(super) fn run(mut self, subjects: &[Polygon]) -> Result<Vec<Polygon>> {
        let p = *self.params;
        let engine = self.engine;

        let scale = if p.aspect > 1.0 {
            Vector2::new(1.0 / p.aspect, 1.0)
        } else if p.aspect > 0.0 {
            Vector2::new(1.0, p.aspect)
        } else {
            Vector2::new(1.0, 1.0)
        };
        let center = Point2::new(p.origin.x.clamp(-1.0, 2.0), p.origin.y.clamp(-1.0, 2.0));
        let randomness = p.randomness.clamp(0.0, 1.0);

        let mut pieces: Vec<SegmentList> = subjects
            .iter()
            .map(|s| engine.segments(s))
            .collect::<Result<_>>()?;

        let spacing = jitter_asymmetric(&mut self.rng, 100.0 - p.spacing, 10.0, 10.0, randomness);
        let num_cuts = (2.0 + 20.0 * (0.01 * spacing).clamp(0.0, 1.0)).round() as usize;
        let cut_step = PI / num_cuts as f64;
        let max_zigs = (1 + (2.0 * (2.0 + 0.25 * p.frequency.max(0.0))).ceil() as usize) / 2;

        let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)];
        let max_distance = corners
            .iter()
            .map(|&(x, y)| (center - Point2::new(x, y)).norm())
            .fold(0.0, f64::max)
            / scale.x.min(scale.y);

        let mut angle = p.angle.to_radians();
        for cut in 0..num_cuts {
            let line = self.cut_line(center, angle, num_cuts, cut_step, max_zigs, max_distance, scale, randomness);
            match self.apply_cut(&pieces, &line) {
                Ok(next) => pieces = next,
                Err(e) => warn!(cut, error = %e, "radial cut skipped"),
            }
            angle += jitter_asymmetric(&mut self.rng, cut_step, -cut_step * 0.2, cut_step * 0.2, randomness);
        }

        let frame = Frame {
            origin: center,
            scale,
            randomness,
        };
        if p.splinters {
            let every = 1 + num_cuts / 3;
            let mut next = Vec::with_capacity(pieces.len() + pieces.len() / every);
            for (s, piece) in pieces.into_iter().enumerate() {
                let cutter = if s % every == 1 {
                    single_ring(engine, &piece)
                        .and_then(|ring| passes::splinter(&mut self.rng, &ring, &frame, max_distance, cut_step * 0.2))
                } else {
                    None
                };
                next.extend(self.refine(piece, cutter.as_ref(), "splinter"));
            }
            pieces = next;
        }
        if p.max_cross_cuts > 0 {
            let mut next = Vec::with_capacity(pieces.len() * 2);
            for piece in pieces {
                let cutter = single_ring(engine, &piece)
                    .and_then(|ring| passes::cross_cuts(&mut self.rng, &ring, &frame, p.max_cross_cuts));
                next.extend(self.refine(piece, cutter.as_ref(), "cross cut"));
            }
            pieces = next;
        }

        let kept: Vec<Polygon> = pieces
            .iter()
            .map(|s| engine.polygon(s))
            .flat_map(|poly| poly.shapes())
            .filter(|shape| {
                shape
                    .outer
                    .iter()
                    .all(|q| (KEEP_MIN..=KEEP_MAX).contains(&q.x) && (KEEP_MIN..=KEEP_MAX).contains(&q.y))
            })
            .map(|shape| {
                let mut regions = vec![shape.outer];
                regions.extend(shape.holes);
                Polygon::new(regions)
            })
            .collect();
        debug!(cuts = num_cuts, pieces = kept.len(), "radial pattern generated");
        Ok(kept)
    }

    /// Builds a closed zig-zag cutter through `center`: the cut line runs
    /// from rim to rim through the centre and is closed around one side.
    #[allow(
        clippy::too_many_arguments,
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    fn cut_line(
        &mut self,
        center: Point2,
        angle: f64,
        num_cuts: usize,
        cut_step: f64,
        max_zigs: usize,
        max_distance: f64,
        scale: Vector2,
        randomness: f64,
    ) -> Vec<Point2> {
        let freq = self.params.frequency.max(0.0);
        let zig_jitter = jitter(&mut self.rng, 0.01 * freq, 0.002 * freq, randomness);
        let num_zigs = (2 + (20.0 * zig_jitter.clamp(0.0, 1.0)).floor() as usize).min(max_zigs.max(2));
        let zig_step = max_distance / num_zigs as f64;

        let (sin, cos) = angle.sin_cos();
        let perp = Vector2::new(-sin, cos).component_mul(&scale);
        let dir = Vector2::new(cos, sin).component_mul(&scale);

        let mut left_side = Vec::with_capacity(num_zigs);
        let mut right_side = Vec::with_capacity(num_zigs);
        let (mut left, mut right) = (center, center);
        for zig in 0..num_zigs {
            if zig + 1 == num_zigs {
                left = center + dir * max_distance;
                right = center - dir * max_distance;
            } else {
                let from_center = zig as f64 / num_zigs as f64;
                let sign = if zig % 2 == 0 { -0.5 } else { 0.5 };
                let wobble = perp * sign * 0.1 / num_cuts as f64;
                let distance = zig_step * (0.7 + from_center);
                let rail = cut_step * 0.3;
                left = Step { distance, direction: dir, rail }.take(&mut self.rng, left + wobble, center, randomness);
                right = Step { distance, direction: -dir, rail }.take(&mut self.rng, right + wobble, center, randomness);
            }
            left_side.push(left);
            right_side.push(right);
        }

        let cap = perp * max_distance * 2.0;
        let mut line = Vec::with_capacity(2 * num_zigs + 3);
        line.push(left + cap);
        line.extend(left_side.iter().rev());
        line.push(center);
        line.extend(right_side);
        line.push(right + cap);
        line
    }

    /// Splits every piece by the cutter, keeping non-empty sides.
    fn apply_cut(&self, pieces: &[SegmentList], cutter: &[Point2]) -> Result<Vec<SegmentList>> {
        let cutter = self.engine.segments(&Polygon::from_region(cutter.to_vec()))?;
        let mut next = Vec::with_capacity(pieces.len() * 2);
        for piece in pieces {
            next.extend(self.split(piece, &cutter)?);
        }
        Ok(next)
    }

    /// Cuts one piece with an optional cutter. The piece is kept whole when
    /// there is no cutter or the cut fails.
    fn refine(&self, piece: SegmentList, cutter: Option<&Polygon>, pass: &str) -> Vec<SegmentList> {
        let Some(cutter) = cutter else {
            return vec![piece];
        };
        let sides = self
            .engine
            .segments(cutter)
            .and_then(|cutter| self.split(&piece, &cutter));
        match sides {
            Ok(sides) if !sides.is_empty() => sides,
            Ok(_) => vec![piece],
            Err(e) => {
                warn!(pass, error = %e, "piece left uncut");
                vec![piece]
            }
        }
    }

    /// Both sides of `piece` against `cutter`, dropping empty ones.
    ///
    /// When the sides do not add up to the piece's area the cut is rolled
    /// back and the piece is returned whole.
    fn split(&self, piece: &SegmentList, cutter: &SegmentList) -> Result<Vec<SegmentList>> {
        let engine = self.engine;
        let combined = engine.combine(piece, cutter)?;
        let mut sides = Vec::with_capacity(2);
        for op in [BooleanOp::Intersect, BooleanOp::Difference] {
            let side = engine.select(&combined, op)?;
            if !side.is_empty() {
                sides.push(side);
            }
        }

        let whole = engine.polygon(piece).area();
        let parts: f64 = sides.iter().map(|side| engine.polygon(side).area()).sum();
        if (parts - whole).abs() > AREA_SLACK_ABS + AREA_SLACK_REL * whole.abs() {
            warn!(whole, parts, "cut lost area, piece kept whole");
            return Ok(vec![piece.clone()]);
        }
        Ok(sides)
    }
}

/// The outline of a piece made of exactly one region.
fn single_ring(engine: &PolyBool, piece: &SegmentList) -> Option<Vec<Point2>> {
    let mut regions = engine.polygon(piece).regions;
    if regions.len() == 1 {
        regions.pop()
    } else {
        None
    }
}
