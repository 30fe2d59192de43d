use std::fmt;

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::boolean::group_shapes;
use crate::error::{OperationError, Result};

use super::outline::SpriteMesh;
use super::polygon::{ShardPolygon, TriangulateOptions};

slotmap::new_key_type! {
    /// Unique identifier for a shard in a [`ShardSet`].
    pub struct ShardId;
}

/// Arena owning every shard of one sprite.
///
/// Operations reference shards by [`ShardId`]; removed ids are never reused
/// for a different shard.
#[derive(Debug, Clone, Default)]
pub struct ShardSet {
    shards: SlotMap<ShardId, ShardPolygon>,
}

impl ShardSet {
    /// Creates a new, empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a shard and returns its ID.
    pub fn insert(&mut self, shard: ShardPolygon) -> ShardId {
        self.shards.insert(shard)
    }

    /// Removes a shard and returns it, if it was present.
    pub fn remove(&mut self, id: ShardId) -> Option<ShardPolygon> {
        self.shards.remove(id)
    }

    /// Returns a reference to the shard, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::ShardNotFound` if the id is stale.
    pub fn get(&self, id: ShardId) -> Result<&ShardPolygon> {
        Ok(self.shards.get(id).ok_or(OperationError::ShardNotFound)?)
    }

    /// Returns a mutable reference to the shard, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::ShardNotFound` if the id is stale.
    pub fn get_mut(&mut self, id: ShardId) -> Result<&mut ShardPolygon> {
        Ok(self
            .shards
            .get_mut(id)
            .ok_or(OperationError::ShardNotFound)?)
    }

    #[must_use]
    pub fn contains(&self, id: ShardId) -> bool {
        self.shards.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ShardId, &ShardPolygon)> {
        self.shards.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ShardId, &mut ShardPolygon)> {
        self.shards.iter_mut()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<ShardId> {
        self.shards.keys().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shards.is_empty()
    }

    pub fn clear(&mut self) {
        self.shards.clear();
    }

    /// Total area of all shards.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.shards.values().map(ShardPolygon::area).sum()
    }

    /// Replaces the contents with one quad covering the sprite rect.
    pub fn init_as_quad(&mut self) -> ShardId {
        self.shards.clear();
        self.shards.insert(ShardPolygon::quad())
    }

    /// Replaces the contents with the outline of a sprite mesh.
    ///
    /// Every outline loop of the mesh becomes a shard; loops nested inside
    /// another loop become holes of it. An empty mesh gives a single quad.
    /// Shards that fail to triangulate are kept without a mesh.
    pub fn populate_from_sprite(&mut self, sprite: &SpriteMesh) -> Vec<ShardId> {
        if sprite.is_empty() {
            return vec![self.init_as_quad()];
        }
        self.shards.clear();

        let mut ids = Vec::new();
        for shape in group_shapes(&sprite.outlines()) {
            let mut shard = ShardPolygon::with_holes(shape.outer, shape.holes);
            let options = TriangulateOptions {
                check_winding: false,
                reset_pivot: false,
            };
            if let Err(e) = shard.triangulate(options) {
                warn!(error = %e, "sprite outline could not be triangulated");
            }
            ids.push(self.shards.insert(shard));
        }
        debug!(shards = ids.len(), "populated from sprite outline");
        ids
    }
}

impl fmt::Display for ShardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShardSet: {} shard(s)", self.shards.len())?;
        for (i, shard) in self.shards.values().enumerate() {
            write!(f, "\nShard {}", i + 1)?;
            if !shard.name.is_empty() {
                write!(f, " \"{}\"", shard.name)?;
            }
            if !shard.tag.is_empty() {
                write!(f, " [{}]", shard.tag)?;
            }
            write!(f, "\n\tEdges: {}", shard.edges().len())?;
            for (j, p) in shard.edges().iter().enumerate() {
                write!(f, "\n\t\t{j}: ({:.1}, {:.1})", p.x, p.y)?;
            }
            if !shard.holes().is_empty() {
                write!(f, "\n\tHoles: {}", shard.holes().len())?;
            }
            if let Some(mesh) = shard.mesh() {
                write!(f, "\n\tVertices: {}", mesh.vertices.len())?;
                write!(f, "\n\tTriangles: {}", mesh.triangles.len())?;
                for (j, [a, b, c]) in mesh.triangles.iter().enumerate() {
                    write!(f, "\n\t\t{j}: {a} -> {b} -> {c}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::ShardError;
    use crate::math::{Point2, Vector2};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn ring_sprite() -> SpriteMesh {
        // outer square 0..4 and inner square 1..3 in pixels, triangulated as
        // four trapezoids split in two
        let vertices = vec![
            p(0.0, 0.0),
            p(4.0, 0.0),
            p(4.0, 4.0),
            p(0.0, 4.0),
            p(1.0, 1.0),
            p(3.0, 1.0),
            p(3.0, 3.0),
            p(1.0, 3.0),
        ];
        let triangles = vec![
            [0, 1, 5],
            [0, 5, 4],
            [1, 2, 6],
            [1, 6, 5],
            [2, 3, 7],
            [2, 7, 6],
            [3, 0, 4],
            [3, 4, 7],
        ];
        SpriteMesh {
            vertices,
            triangles,
            rect_size: Vector2::new(4.0, 4.0),
            pivot: Point2::origin(),
            pixels_per_unit: 1.0,
        }
    }

    #[test]
    fn quad_replaces_contents() {
        let mut set = ShardSet::new();
        set.insert(ShardPolygon::new(vec![p(0.0, 0.0), p(2.0, 0.0), p(0.0, 2.0)]));
        let id = set.init_as_quad();
        assert_eq!(set.len(), 1);
        assert!((set.get(id).unwrap().area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn stale_id_is_not_found() {
        let mut set = ShardSet::new();
        let id = set.insert(ShardPolygon::quad());
        assert!(set.remove(id).is_some());
        assert!(matches!(
            set.get(id),
            Err(ShardError::Operation(OperationError::ShardNotFound))
        ));
        assert!(set.get_mut(id).is_err());
    }

    #[test]
    fn ring_sprite_becomes_one_shard_with_hole() {
        let mut set = ShardSet::new();
        let ids = set.populate_from_sprite(&ring_sprite());
        assert_eq!(ids.len(), 1);
        let shard = set.get(ids[0]).unwrap();
        assert_eq!(shard.holes().len(), 1);
        assert!((shard.area() - 0.75).abs() < 1e-12);
        let mesh = shard.mesh().unwrap();
        assert!((mesh.area() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn empty_sprite_gives_quad() {
        let mut sprite = ring_sprite();
        sprite.triangles.clear();
        let mut set = ShardSet::new();
        let ids = set.populate_from_sprite(&sprite);
        assert_eq!(ids.len(), 1);
        assert_eq!(set.get(ids[0]).unwrap().edges().len(), 4);
    }

    #[test]
    fn display_lists_shards() {
        let mut set = ShardSet::new();
        let id = set.init_as_quad();
        set.get_mut(id).unwrap().name = "corner".into();
        let text = set.to_string();
        assert!(text.starts_with("ShardSet: 1 shard(s)"));
        assert!(text.contains("\"corner\""));
        assert!(text.contains("Triangles: 2"));
    }
}
