//! Procedural shard patterns.

mod passes;
mod radial;
mod random;

pub use radial::RadialParams;

use tracing::warn;

use crate::boolean::{CsgParams, PolyBool, Polygon};
use crate::error::Result;
use crate::shard::{ShardId, ShardPolygon, ShardSet, TriangulateOptions};

use radial::Radial;

/// A shard pattern generator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Generator {
    /// Randomised zig-zag cuts radiating from an origin.
    Radial(RadialParams),
}

impl Default for Generator {
    fn default() -> Self {
        Self::Radial(RadialParams::default())
    }
}

impl Generator {
    /// Replaces the shards of `set` with the generated pattern, cut out of the
    /// current shards (or out of a quad if the set is empty).
    ///
    /// Individual cuts that fail are skipped with a warning. Result shards
    /// that fail to triangulate are kept without a mesh.
    ///
    /// # Errors
    ///
    /// Returns `BooleanError::InvalidParams` for bad `csg` parameters or a
    /// `BooleanError` if a current shard cannot be segmented; the set is
    /// unchanged in both cases.
    pub fn generate(&self, set: &mut ShardSet, csg: &CsgParams, triangulate: bool) -> Result<Vec<ShardId>> {
        let engine = PolyBool::new(*csg)?;
        if set.is_empty() {
            set.init_as_quad();
        }
        let subjects: Vec<Polygon> = set
            .iter()
            .filter(|(_, shard)| !shard.edges().is_empty())
            .map(|(_, shard)| shard.to_polygon())
            .collect();

        let pieces = match self {
            Self::Radial(params) => Radial::new(params, &engine).run(&subjects)?,
        };

        set.clear();
        let ids = pieces
            .into_iter()
            .map(|piece| {
                let mut regions = piece.regions.into_iter();
                let outer = regions.next().unwrap_or_default();
                let mut shard = ShardPolygon::with_holes(outer, regions.collect());
                if triangulate {
                    if let Err(e) = shard.triangulate(TriangulateOptions::default()) {
                        warn!(error = %e, "generated shard left without mesh");
                    }
                }
                set.insert(shard)
            })
            .collect();
        Ok(ids)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn regular(spacing: f64) -> Generator {
        Generator::Radial(RadialParams {
            spacing,
            frequency: 0.0,
            randomness: 0.0,
            seed: 1,
            splinters: false,
            max_cross_cuts: 0,
            ..RadialParams::default()
        })
    }

    fn shatter(params: RadialParams) -> ShardSet {
        let mut set = ShardSet::new();
        set.init_as_quad();
        Generator::Radial(params)
            .generate(&mut set, &CsgParams::default(), false)
            .unwrap();
        set
    }

    #[test]
    fn two_regular_cuts_make_quarters() {
        let mut set = ShardSet::new();
        let ids = regular(100.0)
            .generate(&mut set, &CsgParams::default(), true)
            .unwrap();
        assert_eq!(ids.len(), 4);
        for id in &ids {
            let shard = set.get(*id).unwrap();
            assert!((shard.area() - 0.25).abs() < 0.05, "area {}", shard.area());
            assert!(shard.is_triangulated());
        }
        assert!((set.area() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn pieces_cover_the_quad() {
        let mut set = ShardSet::new();
        set.init_as_quad();
        let generator = Generator::Radial(RadialParams {
            seed: 42,
            ..RadialParams::default()
        });
        let ids = generator.generate(&mut set, &CsgParams::default(), false).unwrap();
        assert!(ids.len() >= 4);
        assert!((set.area() - 1.0).abs() < 1e-4, "area {}", set.area());
    }

    #[test]
    fn same_seed_same_pattern() {
        let generator = Generator::Radial(RadialParams {
            seed: 7,
            ..RadialParams::default()
        });
        let mut a = ShardSet::new();
        let mut b = ShardSet::new();
        generator.generate(&mut a, &CsgParams::default(), false).unwrap();
        generator.generate(&mut b, &CsgParams::default(), false).unwrap();
        assert_eq!(a.len(), b.len());
        let edges = |s: &ShardSet| s.iter().map(|(_, p)| p.edges().to_vec()).collect::<Vec<_>>();
        assert_eq!(edges(&a), edges(&b));
    }

    #[test]
    fn bad_params_leave_set_untouched() {
        let mut set = ShardSet::new();
        set.init_as_quad();
        let csg = CsgParams {
            upscale: 0.0,
            ..CsgParams::default()
        };
        assert!(Generator::default().generate(&mut set, &csg, true).is_err());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn narrow_slivers_keep_the_quad_covered() {
        let set = shatter(RadialParams {
            seed: 658,
            spacing: 93.8257,
            frequency: 32.86,
            ..RadialParams::default()
        });
        assert!((set.area() - 1.0).abs() < 1e-4, "area {}", set.area());
    }

    #[test]
    fn splinters_and_cross_cuts_add_pieces() {
        let wedges = RadialParams {
            seed: 42,
            splinters: false,
            max_cross_cuts: 0,
            ..RadialParams::default()
        };
        let plain = shatter(wedges);
        let refined = shatter(RadialParams {
            splinters: true,
            max_cross_cuts: 10,
            ..wedges
        });
        assert!(refined.len() > plain.len(), "{} vs {}", refined.len(), plain.len());
        assert!((plain.area() - 1.0).abs() < 1e-4, "area {}", plain.area());
        assert!((refined.area() - 1.0).abs() < 1e-4, "area {}", refined.area());
    }

    #[test]
    fn seeds_in_a_range_conserve_area() {
        for seed in 1..=8 {
            let set = shatter(RadialParams {
                seed,
                randomness: 1.0,
                ..RadialParams::default()
            });
            assert!((set.area() - 1.0).abs() < 1e-4, "seed {seed}: area {}", set.area());
        }
    }
}
