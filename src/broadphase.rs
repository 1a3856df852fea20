//! Uniform-grid spatial hashing for broad-phase candidate generation.
//!
//! Each body's AABB is inserted into every grid cell it covers; any two
//! bodies sharing a cell become a candidate pair. Expected cost is roughly
//! linear in the body count plus the number of genuinely nearby pairs.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use crate::aabb::Aabb;

// ComplexField provides floor() for f32 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// Default edge length of a grid cell, in world units.
pub const DEFAULT_CELL_SIZE: f32 = 2.0;

/// Grid configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    pub cell_size: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

/// Packs 2D cell coordinates into one 64-bit key.
#[inline]
fn cell_key(cx: i32, cy: i32) -> u64 {
    ((cx as u32 as u64) << 32) | cy as u32 as u64
}

/// Packs a pair of body indices into an order-independent 64-bit key.
#[inline]
fn pair_key(a: usize, b: usize) -> u64 {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    ((lo as u32 as u64) << 32) | hi as u32 as u64
}

/// Cell coordinate covering the world coordinate `x`.
#[inline]
fn cell_coord(x: f32, cell_size: f32) -> i32 {
    (x / cell_size).floor() as i32
}

/// Builds candidate pairs from AABBs using the spatial hash.
///
/// Returns index pairs `(i, j)` with `i < j` into the input slice, each
/// unordered pair emitted at most once. Emission order is an implementation
/// detail; callers must not depend on it. Every pair of overlapping AABBs is
/// guaranteed to appear, since overlapping boxes always share a cell.
pub fn build_pairs(aabbs: &[Aabb], config: &GridConfig) -> Vec<(usize, usize)> {
    let mut buckets: BTreeMap<u64, Vec<usize>> = BTreeMap::new();

    for (i, b) in aabbs.iter().enumerate() {
        // Grid-cell range overlapped by this AABB, inclusive
        let x0 = cell_coord(b.min.x, config.cell_size);
        let x1 = cell_coord(b.max.x, config.cell_size);
        let y0 = cell_coord(b.min.y, config.cell_size);
        let y1 = cell_coord(b.max.y, config.cell_size);

        for cy in y0..=y1 {
            for cx in x0..=x1 {
                buckets.entry(cell_key(cx, cy)).or_insert_with(Vec::new).push(i);
            }
        }
    }

    let mut seen: BTreeSet<u64> = BTreeSet::new();
    let mut pairs = Vec::new();

    for ids in buckets.values() {
        if ids.len() < 2 {
            continue;
        }
        for a in 0..ids.len() {
            for b in (a + 1)..ids.len() {
                let i = ids[a].min(ids[b]);
                let j = ids[a].max(ids[b]);
                if seen.insert(pair_key(i, j)) {
                    pairs.push((i, j));
                }
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use nalgebra::Vector2;
    use std::vec::Vec as StdVec;

    fn aabb(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Aabb {
        Aabb {
            min: Vector2::new(min_x, min_y),
            max: Vector2::new(max_x, max_y),
        }
    }

    #[test]
    fn test_nearby_boxes_paired() {
        let aabbs = [
            aabb(0.0, 0.0, 1.0, 1.0),
            aabb(0.5, 0.5, 1.5, 1.5),
        ];
        let pairs = build_pairs(&aabbs, &GridConfig::default());
        assert_eq!(pairs, std::vec![(0, 1)]);
    }

    #[test]
    fn test_distant_boxes_not_paired() {
        let aabbs = [
            aabb(0.0, 0.0, 1.0, 1.0),
            aabb(50.0, 50.0, 51.0, 51.0),
        ];
        let pairs = build_pairs(&aabbs, &GridConfig::default());
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_pair_spanning_many_cells_emitted_once() {
        // Both boxes cover several cells, so the pair appears in many buckets
        let aabbs = [
            aabb(-5.0, -5.0, 5.0, 5.0),
            aabb(-4.0, -4.0, 6.0, 6.0),
        ];
        let pairs = build_pairs(&aabbs, &GridConfig::default());
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0], (0, 1));
    }

    #[test]
    fn test_negative_coordinates_hash_distinctly() {
        let aabbs = [
            aabb(-3.5, -3.5, -3.0, -3.0),
            aabb(3.0, 3.0, 3.5, 3.5),
        ];
        let pairs = build_pairs(&aabbs, &GridConfig::default());
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_superset_of_overlapping_pairs() {
        // A small cluster with a mix of overlapping and separated boxes
        let aabbs = [
            aabb(0.0, 0.0, 1.0, 1.0),
            aabb(0.8, 0.0, 1.8, 1.0),
            aabb(3.0, 0.0, 4.0, 1.0),
            aabb(0.0, 0.9, 1.0, 1.9),
            aabb(10.0, 10.0, 11.0, 11.0),
        ];
        let pairs = build_pairs(&aabbs, &GridConfig::default());

        let mut brute: StdVec<(usize, usize)> = StdVec::new();
        for i in 0..aabbs.len() {
            for j in (i + 1)..aabbs.len() {
                if aabbs[i].intersects(&aabbs[j]) {
                    brute.push((i, j));
                }
            }
        }

        for pair in &brute {
            assert!(
                pairs.contains(pair),
                "grid missed overlapping pair {:?}",
                pair
            );
        }
    }

    #[test]
    fn test_default_cell_size() {
        assert_eq!(GridConfig::default().cell_size, 2.0);
    }
}
