//! Axis-aligned bounding boxes over cached world-space vertices.

use nalgebra::Vector2;

/// The tightest axis-aligned rectangle enclosing a set of points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector2<f32>,
    pub max: Vector2<f32>,
}

impl Aabb {
    /// Computes the bounding box of `vertices`.
    ///
    /// The vertices are expected to be a body's freshly rebuilt world-space
    /// set; an empty slice yields a degenerate box at the origin.
    pub fn of(vertices: &[Vector2<f32>]) -> Self {
        let Some(first) = vertices.first() else {
            return Aabb {
                min: Vector2::zeros(),
                max: Vector2::zeros(),
            };
        };

        let mut min = *first;
        let mut max = *first;
        for v in &vertices[1..] {
            if v.x < min.x {
                min.x = v.x;
            }
            if v.y < min.y {
                min.y = v.y;
            }
            if v.x > max.x {
                max.x = v.x;
            }
            if v.y > max.y {
                max.y = v.y;
            }
        }

        Aabb { min, max }
    }

    /// Overlap test. Touching edges count as overlap.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        // One box completely to the left of the other
        if self.max.x < other.min.x || other.max.x < self.min.x {
            return false;
        }
        // One box completely above the other
        if self.max.y < other.min.y || other.max.y < self.min.y {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    fn unit_box_at(x: f32, y: f32) -> Aabb {
        Aabb {
            min: Vector2::new(x - 0.5, y - 0.5),
            max: Vector2::new(x + 0.5, y + 0.5),
        }
    }

    #[test]
    fn test_of_folds_min_and_max() {
        let vertices = [
            Vector2::new(1.0, -2.0),
            Vector2::new(-3.0, 4.0),
            Vector2::new(2.0, 0.5),
        ];
        let aabb = Aabb::of(&vertices);
        assert_eq!(aabb.min, Vector2::new(-3.0, -2.0));
        assert_eq!(aabb.max, Vector2::new(2.0, 4.0));
    }

    #[test]
    fn test_of_single_vertex() {
        let aabb = Aabb::of(&[Vector2::new(1.5, 2.5)]);
        assert_eq!(aabb.min, aabb.max);
    }

    #[test]
    fn test_intersects_is_symmetric() {
        let a = unit_box_at(0.0, 0.0);
        let b = unit_box_at(0.75, 0.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));

        let c = unit_box_at(5.0, 0.0);
        assert!(!a.intersects(&c));
        assert!(!c.intersects(&a));
    }

    #[test]
    fn test_intersects_self() {
        let a = unit_box_at(2.0, -3.0);
        assert!(a.intersects(&a));
    }

    #[test]
    fn test_touching_edges_count_as_overlap() {
        let a = unit_box_at(0.0, 0.0);
        let b = unit_box_at(1.0, 0.0);
        assert!(a.intersects(&b));

        let below = unit_box_at(0.0, -1.0);
        assert!(a.intersects(&below));
    }

    #[test]
    fn test_disjoint_on_either_axis() {
        let a = unit_box_at(0.0, 0.0);
        assert!(!a.intersects(&unit_box_at(1.01, 0.0)));
        assert!(!a.intersects(&unit_box_at(0.0, 1.01)));
    }
}
