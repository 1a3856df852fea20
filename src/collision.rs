//! Narrow phase: Separating Axis Theorem over convex polygons, plus contact
//! point extraction.
//!
//! A [`Manifold`] describes one collision for the lifetime of a single world
//! step. It carries stable indices into the world's body sequence rather
//! than references, so the resolver can take the whole body slice mutably.

use alloc::vec::Vec;

use log::error;
use nalgebra::Vector2;

use crate::body::RigidBody;
use crate::math;

/// Squared-distance tolerance for accepting additional contact points near
/// the closest feature pair.
pub const CONTACT_MERGE_TOLERANCE: f32 = 1e-4;

/// The outcome of one narrow-phase test.
///
/// Conventions:
/// - `normal` is unit length and points from body `a` toward body `b`
/// - `penetration` is the overlap depth along `normal` (>= 0 when colliding)
/// - `in_collision` holds exactly when at least one contact was found
#[derive(Debug, Clone)]
pub struct Manifold {
    pub a: usize,
    pub b: usize,
    pub normal: Vector2<f32>,
    pub contacts: heapless::Vec<Vector2<f32>, 2>,
    pub penetration: f32,
    pub in_collision: bool,
}

impl Manifold {
    fn separated(a: usize, b: usize) -> Self {
        Manifold {
            a,
            b,
            normal: Vector2::zeros(),
            contacts: heapless::Vec::new(),
            penetration: 0.0,
            in_collision: false,
        }
    }

    #[inline]
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }
}

/// Projects every vertex onto `axis` and returns the covered interval.
fn project_onto_axis(vertices: &[Vector2<f32>], axis: &Vector2<f32>) -> (f32, f32) {
    let mut min = vertices[0].dot(axis);
    let mut max = min;
    for v in &vertices[1..] {
        let projection = v.dot(axis);
        if projection < min {
            min = projection;
        }
        if projection > max {
            max = projection;
        }
    }
    (min, max)
}

/// Tests the edge normals of `p` as candidate separating axes against `q`.
///
/// Returns `false` as soon as a separating axis is found. While no axis
/// separates, tracks the smallest overlap depth and its axis in
/// `penetration`/`normal`.
fn sat_loop(
    p: &[Vector2<f32>],
    q: &[Vector2<f32>],
    penetration: &mut f32,
    normal: &mut Vector2<f32>,
) -> bool {
    for i in 0..p.len() {
        let va = p[i];
        let vb = p[(i + 1) % p.len()];
        let edge = vb - va;
        let axis = math::normalize_or_zero(Vector2::new(-edge.y, edge.x));

        let (min_a, max_a) = project_onto_axis(p, &axis);
        let (min_b, max_b) = project_onto_axis(q, &axis);

        if max_a <= min_b || max_b <= min_a {
            return false;
        }

        let axis_depth = (max_a - min_b).min(max_b - min_a);
        if axis_depth < *penetration {
            *penetration = axis_depth;
            *normal = axis;
        }
    }

    true
}

#[derive(Clone, Copy)]
struct ContactCandidate {
    point: Vector2<f32>,
    dist_sq: f32,
}

/// Pushes one candidate per (vertex of `p`, edge of `q`) pair: the closest
/// point on the edge and its squared distance.
fn gather_candidates(
    p: &[Vector2<f32>],
    q: &[Vector2<f32>],
    candidates: &mut Vec<ContactCandidate>,
) {
    for vp in p {
        for i in 0..q.len() {
            let q1 = q[i];
            let q2 = q[(i + 1) % q.len()];
            let (dist_sq, point) = math::point_segment_distance_sq(&q1, &q2, vp);
            candidates.push(ContactCandidate { point, dist_sq });
        }
    }
}

/// Extracts the contact points of two bodies already known to collide.
///
/// All vertex-vs-edge candidates within [`CONTACT_MERGE_TOLERANCE`] of the
/// global minimum squared distance are eligible; the first becomes the
/// primary contact and the first eligible point not closely equal to it
/// becomes the second. Flush faces therefore yield two contacts while
/// vertex-on-edge cases collapse to one.
fn contact_points(a: &RigidBody, b: &RigidBody) -> heapless::Vec<Vector2<f32>, 2> {
    let mut candidates =
        Vec::with_capacity(a.vertices_world.len() * b.vertices_world.len() * 2);
    gather_candidates(&a.vertices_world, &b.vertices_world, &mut candidates);
    gather_candidates(&b.vertices_world, &a.vertices_world, &mut candidates);

    let mut contacts = heapless::Vec::new();
    let Some(first_candidate) = candidates.first() else {
        return contacts;
    };

    let mut min_dist_sq = first_candidate.dist_sq;
    for c in &candidates[1..] {
        if c.dist_sq < min_dist_sq {
            min_dist_sq = c.dist_sq;
        }
    }

    let threshold = min_dist_sq + CONTACT_MERGE_TOLERANCE;

    for c in &candidates {
        if c.dist_sq <= threshold {
            let _ = contacts.push(c.point);
            break;
        }
    }

    if let Some(first) = contacts.first().copied() {
        for c in &candidates {
            if c.dist_sq <= threshold && !math::vec_closely_equal(&first, &c.point) {
                let _ = contacts.push(c.point);
                break;
            }
        }
    }

    contacts
}

/// Full narrow-phase test between `bodies[a]` and `bodies[b]`.
///
/// Precondition: both bodies' world-space caches are fresh. Bodies with
/// fewer than three vertices short-circuit to a non-collision.
pub fn sat_collision(bodies: &[RigidBody], a: usize, b: usize) -> Manifold {
    let body_a = &bodies[a];
    let body_b = &bodies[b];

    if body_a.vertices_world.len() < 3 || body_b.vertices_world.len() < 3 {
        error!("narrow phase needs at least 3 world-space vertices per body");
        return Manifold::separated(a, b);
    }

    let mut penetration = f32::INFINITY;
    let mut normal = Vector2::zeros();

    if !sat_loop(
        &body_a.vertices_world,
        &body_b.vertices_world,
        &mut penetration,
        &mut normal,
    ) || !sat_loop(
        &body_b.vertices_world,
        &body_a.vertices_world,
        &mut penetration,
        &mut normal,
    ) {
        return Manifold::separated(a, b);
    }

    // The loops leave the minimum-overlap axis; orient it from a toward b so
    // the resolver always pushes the bodies apart
    if normal.dot(&(body_b.position - body_a.position)) < 0.0 {
        normal = -normal;
    }

    let contacts = contact_points(body_a, body_b);
    let in_collision = !contacts.is_empty();

    Manifold {
        a,
        b,
        normal,
        contacts,
        penetration,
        in_collision,
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use std::vec::Vec as StdVec;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn box_at(x: f32, y: f32, width: f32, height: f32) -> RigidBody {
        let mut body = RigidBody::rectangle(width, height).with_mass(1.0);
        body.snap_to(Vector2::new(x, y));
        body.update_world_vertices();
        body
    }

    #[test]
    fn test_disjoint_boxes_do_not_collide() {
        let bodies = StdVec::from([box_at(0.0, 0.0, 1.0, 1.0), box_at(3.0, 0.0, 1.0, 1.0)]);
        let manifold = sat_collision(&bodies, 0, 1);
        assert!(!manifold.in_collision);
        assert_eq!(manifold.contact_count(), 0);
    }

    #[test]
    fn test_exactly_touching_boxes_do_not_collide() {
        let bodies = StdVec::from([box_at(0.0, 0.0, 1.0, 1.0), box_at(1.0, 0.0, 1.0, 1.0)]);
        let manifold = sat_collision(&bodies, 0, 1);
        assert!(!manifold.in_collision);
    }

    #[test]
    fn test_overlapping_boxes_manifold() {
        let bodies = StdVec::from([box_at(0.0, 0.0, 1.0, 1.0), box_at(0.9, 0.0, 1.0, 1.0)]);
        let manifold = sat_collision(&bodies, 0, 1);

        assert!(manifold.in_collision);
        assert!(approx_eq(manifold.penetration, 0.1));
        assert!(approx_eq(manifold.normal.norm(), 1.0));
        assert!(approx_eq(manifold.normal.x, 1.0));
        assert_eq!(manifold.contact_count(), 2);
    }

    #[test]
    fn test_normal_points_from_a_to_b() {
        let bodies = StdVec::from([box_at(0.0, 0.0, 1.0, 1.0), box_at(0.9, 0.0, 1.0, 1.0)]);

        let forward = sat_collision(&bodies, 0, 1);
        assert!(forward.normal.dot(&(bodies[1].position - bodies[0].position)) > 0.0);

        let reversed = sat_collision(&bodies, 1, 0);
        assert!(reversed.normal.dot(&(bodies[0].position - bodies[1].position)) > 0.0);
    }

    #[test]
    fn test_flush_faces_yield_two_contacts_on_overlap_boundary() {
        let bodies = StdVec::from([box_at(0.0, 0.0, 1.0, 1.0), box_at(0.9, 0.0, 1.0, 1.0)]);
        let manifold = sat_collision(&bodies, 0, 1);

        assert_eq!(manifold.contact_count(), 2);
        // Both contacts sit on the seam between the boxes
        for contact in &manifold.contacts {
            assert!(contact.x >= 0.4 - EPSILON);
            assert!(contact.x <= 0.5 + EPSILON);
            assert!(approx_eq(contact.y.abs(), 0.5));
        }
        // And they are distinct points
        assert!(!math::vec_closely_equal(&manifold.contacts[0], &manifold.contacts[1]));
    }

    #[test]
    fn test_vertex_on_face_yields_single_contact() {
        // Diamond (4-gon) tip poking into a box face
        let mut diamond = RigidBody::new(4, 1.0, 1.0);
        diamond.update_world_vertices();
        let boxy = box_at(1.4, 0.0, 1.0, 1.0);

        let bodies = StdVec::from([diamond, boxy]);
        let manifold = sat_collision(&bodies, 0, 1);

        assert!(manifold.in_collision);
        assert_eq!(manifold.contact_count(), 1);
        assert!(approx_eq(manifold.contacts[0].x, 0.9));
        assert!(approx_eq(manifold.contacts[0].y, 0.0));
    }

    #[test]
    fn test_manifold_invariants_when_colliding() {
        let bodies = StdVec::from([
            box_at(0.0, 0.0, 2.0, 1.0),
            box_at(0.7, 0.6, 1.0, 1.0),
        ]);
        let manifold = sat_collision(&bodies, 0, 1);

        assert!(manifold.in_collision);
        assert!(manifold.penetration >= 0.0);
        assert!(approx_eq(manifold.normal.norm(), 1.0));
        assert!(manifold.normal.dot(&(bodies[1].position - bodies[0].position)) >= 0.0);
        assert!(manifold.contact_count() >= 1 && manifold.contact_count() <= 2);
    }

    #[test]
    fn test_degenerate_body_short_circuits() {
        let mut empty = RigidBody::default();
        empty.update_world_vertices();
        let bodies = StdVec::from([empty, box_at(0.0, 0.0, 1.0, 1.0)]);

        let manifold = sat_collision(&bodies, 0, 1);
        assert!(!manifold.in_collision);
        assert_eq!(manifold.contact_count(), 0);
    }

    #[test]
    fn test_rotated_box_collides_on_diagonal() {
        let mut tilted = RigidBody::rectangle(1.0, 1.0).with_mass(1.0);
        tilted.snap_to(Vector2::new(1.1, 0.0));
        tilted.rotate_by(core::f32::consts::FRAC_PI_4);
        tilted.update_world_vertices();

        // Corner of the tilted box reaches x = 1.1 - sqrt(2)/2 ~ 0.393,
        // inside the axis-aligned box ending at x = 0.5
        let bodies = StdVec::from([box_at(0.0, 0.0, 1.0, 1.0), tilted]);
        let manifold = sat_collision(&bodies, 0, 1);

        assert!(manifold.in_collision);
        assert!(manifold.penetration > 0.0);
        assert!(manifold.normal.x > 0.0);
    }
}
