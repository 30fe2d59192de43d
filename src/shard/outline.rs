use std::collections::HashMap;

use crate::math::{Point2, Vector2};

/// The triangulated skinning mesh of a sprite, as the host engine reports it.
///
/// `vertices` are in world units relative to the sprite pivot; `rect_size`
/// and `pivot` are in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteMesh {
    pub vertices: Vec<Point2>,
    pub triangles: Vec<[u32; 3]>,
    pub rect_size: Vector2,
    pub pivot: Point2,
    pub pixels_per_unit: f64,
}

impl SpriteMesh {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty() || self.vertices.is_empty()
    }

    /// Maps a vertex into sprite rect space, where the rect spans `[0, 1]²`.
    #[must_use]
    pub fn to_rect_space(&self, v: &Point2) -> Point2 {
        let px = v.coords * self.pixels_per_unit + self.pivot.coords;
        Point2::new(px.x / self.rect_size.x, px.y / self.rect_size.y)
    }

    /// Outline loops of the mesh in rect space.
    #[must_use]
    pub fn outlines(&self) -> Vec<Vec<Point2>> {
        boundary_loops(&self.triangles)
            .into_iter()
            .map(|lp| {
                lp.iter()
                    .filter_map(|&i| self.vertices.get(i as usize))
                    .map(|v| self.to_rect_space(v))
                    .collect::<Vec<_>>()
            })
            .filter(|lp| lp.len() >= 3)
            .collect()
    }
}

/// Chains the edges used by exactly one triangle into closed loops of vertex
/// indices.
#[must_use]
pub fn boundary_loops(triangles: &[[u32; 3]]) -> Vec<Vec<u32>> {
    let mut uses: HashMap<(u32, u32), usize> = HashMap::new();
    let mut order: Vec<(u32, u32)> = Vec::new();
    for &[a, b, c] in triangles {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            let key = (u.min(v), u.max(v));
            let count = uses.entry(key).or_insert(0);
            if *count == 0 {
                order.push((u, v));
            }
            *count += 1;
        }
    }

    let mut border: Vec<(u32, u32)> = order
        .into_iter()
        .filter(|&(u, v)| uses.get(&(u.min(v), u.max(v))) == Some(&1))
        .collect();

    let mut loops = Vec::new();
    while let Some((start, mut current)) = border.first().copied() {
        border.swap_remove(0);
        let mut chain = vec![start];
        while current != start {
            chain.push(current);
            let Some(pos) = border.iter().position(|&(u, v)| u == current || v == current) else {
                break;
            };
            let (u, v) = border.swap_remove(pos);
            current = if u == current { v } else { u };
        }
        loops.push(chain);
    }
    loops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::polygon_2d::area;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    /// A 100x100 pixel sprite at 100 pixels per unit, pivot in the centre.
    fn sprite(vertices: Vec<Point2>, triangles: Vec<[u32; 3]>) -> SpriteMesh {
        SpriteMesh {
            vertices,
            triangles,
            rect_size: Vector2::new(100.0, 100.0),
            pivot: p(50.0, 50.0),
            pixels_per_unit: 100.0,
        }
    }

    #[test]
    fn quad_outline_maps_to_unit_rect() {
        let s = sprite(
            vec![p(-0.5, -0.5), p(0.5, -0.5), p(0.5, 0.5), p(-0.5, 0.5)],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let outlines = s.outlines();
        assert_eq!(outlines.len(), 1);
        assert_eq!(outlines[0].len(), 4);
        assert!((area(&outlines[0]) - 1.0).abs() < 1e-12);
        assert!(outlines[0].contains(&p(0.0, 0.0)));
        assert!(outlines[0].contains(&p(1.0, 1.0)));
    }

    #[test]
    fn inner_edges_are_not_boundary() {
        // fan of four triangles around a centre vertex
        let loops = boundary_loops(&[[0, 1, 4], [1, 2, 4], [2, 3, 4], [3, 0, 4]]);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 4);
        assert!(!loops[0].contains(&4));
    }

    #[test]
    fn separate_islands_give_separate_loops() {
        let loops = boundary_loops(&[[0, 1, 2], [3, 4, 5]]);
        assert_eq!(loops.len(), 2);
        assert!(loops.iter().all(|l| l.len() == 3));
    }
}
