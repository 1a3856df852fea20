//! The simulation world: body ownership, integration, culling, and the
//! iterative collision solver.

use alloc::vec::Vec;

use log::debug;
use nalgebra::Vector2;

// ComplexField provides abs() for f32 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

use crate::aabb::Aabb;
use crate::body::RigidBody;
use crate::broadphase::{self, GridConfig};
use crate::collision::{self, Manifold};
use crate::math;
use crate::stats::WorldStats;

/// Default number of solver iterations per step.
pub const DEFAULT_SOLVER_ITERATIONS: u32 = 10;

/// Default lower y bound; bodies falling below `-y_bounds` are removed.
pub const DEFAULT_Y_BOUNDS: f32 = 100.0;

/// Fraction of the remaining penetration corrected per collision event.
const CORRECTION_PERCENT: f32 = 0.4;

/// Penetration depth tolerated without correction.
const CORRECTION_SLOP: f32 = 0.01;

/// One queued impulse with the contact lever arms it acts through.
struct QueuedImpulse {
    impulse: Vector2<f32>,
    ra: Vector2<f32>,
    rb: Vector2<f32>,
}

/// Owns and simulates all rigid bodies.
///
/// Bodies are stored by value in one ordered sequence. Appending is only
/// safe between steps; the culling phase inside [`step`](World::step) is the
/// one structural mutation the world performs itself.
///
/// `World` is not thread-safe; all access must occur from the simulation
/// thread.
///
/// # Example
/// ```
/// use impulse2d::{RigidBody, World};
/// use nalgebra::Vector2;
///
/// let mut world = World::new();
/// world.add_body(
///     RigidBody::new(6, 1.0, 2.0).with_position(Vector2::new(0.0, 5.0)),
/// );
///
/// world.step(1.0 / 60.0);
/// assert!(world.bodies()[0].position.y < 5.0);
/// ```
pub struct World {
    bodies: Vec<RigidBody>,
    gravity: Vector2<f32>,
    solver_iterations: u32,
    y_bounds: f32,
    grid: GridConfig,
    stats: WorldStats,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world with gravity `(0, -9.81)` and default solver
    /// settings.
    pub fn new() -> Self {
        World {
            bodies: Vec::new(),
            gravity: Vector2::new(0.0, -9.81),
            solver_iterations: DEFAULT_SOLVER_ITERATIONS,
            y_bounds: DEFAULT_Y_BOUNDS,
            grid: GridConfig::default(),
            stats: WorldStats::new(),
        }
    }

    /// Appends a body and returns its current index in the sequence.
    ///
    /// Indices are stable within a step but shift when culling removes
    /// earlier bodies.
    pub fn add_body(&mut self, body: RigidBody) -> usize {
        self.bodies.push(body);
        self.bodies.len() - 1
    }

    /// The ordered body sequence.
    pub fn bodies(&self) -> &[RigidBody] {
        &self.bodies
    }

    /// Mutable access to the bodies, for kinematic adjustments between steps.
    pub fn bodies_mut(&mut self) -> &mut [RigidBody] {
        &mut self.bodies
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn gravity(&self) -> Vector2<f32> {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vector2<f32>) {
        self.gravity = gravity;
    }

    pub fn set_solver_iterations(&mut self, iterations: u32) {
        self.solver_iterations = iterations;
    }

    pub fn set_y_bounds(&mut self, y_bounds: f32) {
        self.y_bounds = y_bounds;
    }

    pub fn set_cell_size(&mut self, cell_size: f32) {
        self.grid.cell_size = cell_size;
    }

    /// Pipeline counters accumulated since construction (or the last reset).
    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Integrates all dynamic bodies, culls out-of-bounds ones, then runs
    /// the collision pipeline `solver_iterations` times.
    pub fn step(&mut self, dt: f32) {
        self.integrate(dt);
        self.cull_out_of_bounds();

        for _ in 0..self.solver_iterations {
            self.solve_iteration();
        }

        self.stats.steps += 1;
    }

    /// Semi-implicit Euler: velocity from acceleration first, then position
    /// from the updated velocity. The force accumulator is consumed and
    /// cleared.
    fn integrate(&mut self, dt: f32) {
        let gravity = self.gravity;
        for body in &mut self.bodies {
            if body.is_static {
                continue;
            }

            body.linear_acceleration = gravity + body.force * body.inverse_mass;
            body.linear_velocity += body.linear_acceleration * dt;
            body.position += body.linear_velocity * dt;
            body.rotation += body.angular_velocity * dt;

            body.force = Vector2::zeros();
            body.dirty = true;
            self.stats.body_updates += 1;
        }
    }

    /// Removes bodies that fell below `-y_bounds`, preserving the order of
    /// the survivors.
    fn cull_out_of_bounds(&mut self) {
        let y_bounds = self.y_bounds;
        let before = self.bodies.len();
        self.bodies.retain(|body| body.position.y >= -y_bounds);

        let culled = before - self.bodies.len();
        if culled > 0 {
            debug!("culled {} bodies below y = {}", culled, -y_bounds);
        }
    }

    /// One pass of cache refresh, broad phase, narrow phase, and resolution.
    fn solve_iteration(&mut self) {
        let mut aabbs = Vec::with_capacity(self.bodies.len());
        for body in &mut self.bodies {
            body.update_world_vertices();
            aabbs.push(Aabb::of(&body.vertices_world));
        }

        let pairs = broadphase::build_pairs(&aabbs, &self.grid);
        self.stats.broad_checks += pairs.len() as u64;

        for (i, j) in pairs {
            if self.bodies[i].is_static && self.bodies[j].is_static {
                continue;
            }

            // The grid pairs bodies that merely share a cell; their boxes
            // may still be apart
            if !aabbs[i].intersects(&aabbs[j]) {
                continue;
            }

            self.stats.narrow_checks += 1;
            let manifold = collision::sat_collision(&self.bodies, i, j);
            if !manifold.in_collision {
                continue;
            }

            Self::resolve_collision(&mut self.bodies, &manifold);
            Self::positional_correction(&mut self.bodies, &manifold);
            self.stats.contacts_resolved += manifold.contact_count() as u64;
        }
    }

    /// Impulse response for one manifold: a normal impulse with restitution
    /// and a Coulomb friction impulse per contact point.
    ///
    /// Impulses are queued and applied only after every contact has been
    /// processed, so the two contacts of one manifold never see each other's
    /// velocity changes.
    fn resolve_collision(bodies: &mut [RigidBody], manifold: &Manifold) {
        let (ia, ib) = (manifold.a, manifold.b);
        let normal = manifold.normal;
        let contact_count = manifold.contact_count() as f32;

        let restitution = bodies[ia].restitution.min(bodies[ib].restitution);
        let static_friction = bodies[ia].static_friction.min(bodies[ib].static_friction);
        let dynamic_friction = bodies[ia].dynamic_friction.min(bodies[ib].dynamic_friction);

        let inv_mass_a = bodies[ia].inverse_mass;
        let inv_mass_b = bodies[ib].inverse_mass;
        let inv_inertia_a = bodies[ia].inverse_inertia;
        let inv_inertia_b = bodies[ib].inverse_inertia;

        let mut queued: heapless::Vec<QueuedImpulse, 4> = heapless::Vec::new();

        for contact in &manifold.contacts {
            let ra = contact - bodies[ia].position;
            let rb = contact - bodies[ib].position;
            let ra_perp = Vector2::new(-ra.y, ra.x);
            let rb_perp = Vector2::new(-rb.y, rb.x);

            let relative_velocity = (bodies[ib].linear_velocity
                + rb_perp * bodies[ib].angular_velocity)
                - (bodies[ia].linear_velocity + ra_perp * bodies[ia].angular_velocity);

            let velocity_along_normal = relative_velocity.dot(&normal);
            if velocity_along_normal > 0.0 {
                // Already separating; the contact resolves on its own
                continue;
            }

            let ra_perp_dot_n = ra_perp.dot(&normal);
            let rb_perp_dot_n = rb_perp.dot(&normal);
            let denominator = inv_mass_a
                + inv_mass_b
                + ra_perp_dot_n * ra_perp_dot_n * inv_inertia_a
                + rb_perp_dot_n * rb_perp_dot_n * inv_inertia_b;
            if denominator <= 0.0 {
                continue;
            }

            // Split the impulse evenly across the manifold's contacts
            let j = -(1.0 + restitution) * velocity_along_normal / denominator / contact_count;
            let _ = queued.push(QueuedImpulse {
                impulse: normal * j,
                ra,
                rb,
            });

            let tangential = relative_velocity - normal * velocity_along_normal;
            let Some(tangent) = tangential.try_normalize(math::CLOSELY_EQUAL_TOLERANCE) else {
                // Microsettling: no meaningful tangential motion at this contact
                continue;
            };

            let ra_perp_dot_t = ra_perp.dot(&tangent);
            let rb_perp_dot_t = rb_perp.dot(&tangent);
            let tangent_denominator = inv_mass_a
                + inv_mass_b
                + ra_perp_dot_t * ra_perp_dot_t * inv_inertia_a
                + rb_perp_dot_t * rb_perp_dot_t * inv_inertia_b;
            if tangent_denominator <= 0.0 {
                continue;
            }

            let jt = -relative_velocity.dot(&tangent) / tangent_denominator / contact_count;

            // Coulomb clamp: stick while within the static cone, otherwise
            // slide against the dynamic coefficient
            let friction_impulse = if jt.abs() <= j * static_friction {
                tangent * jt
            } else {
                tangent * (-j * dynamic_friction)
            };
            let _ = queued.push(QueuedImpulse {
                impulse: friction_impulse,
                ra,
                rb,
            });
        }

        for q in &queued {
            bodies[ia].linear_velocity -= q.impulse * inv_mass_a;
            bodies[ib].linear_velocity += q.impulse * inv_mass_b;
            bodies[ia].angular_velocity -= q.ra.perp(&q.impulse) * inv_inertia_a;
            bodies[ib].angular_velocity += q.rb.perp(&q.impulse) * inv_inertia_b;
        }
    }

    /// Nudges the bodies apart along the normal in proportion to their
    /// inverse masses, leaving [`CORRECTION_SLOP`] of penetration in place.
    /// Static bodies never move.
    fn positional_correction(bodies: &mut [RigidBody], manifold: &Manifold) {
        let inv_mass_a = bodies[manifold.a].inverse_mass;
        let inv_mass_b = bodies[manifold.b].inverse_mass;

        let inv_mass_sum = inv_mass_a + inv_mass_b;
        if inv_mass_sum <= 0.0 {
            return;
        }

        let magnitude =
            (manifold.penetration - CORRECTION_SLOP).max(0.0) / inv_mass_sum * CORRECTION_PERCENT;
        let correction = manifold.normal * magnitude;

        let a = &mut bodies[manifold.a];
        if !a.is_static {
            a.position -= correction * inv_mass_a;
            a.dirty = true;
        }
        let b = &mut bodies[manifold.b];
        if !b.is_static {
            b.position += correction * inv_mass_b;
            b.dirty = true;
        }
    }
}
