//! Rigid bodies: geometry, inertial parameters, and the world-space vertex
//! cache.
//!
//! A body owns its convex polygon as a counter-clockwise sequence of local
//! vertices relative to its centre of mass, plus a cached world-space copy.
//! Mutating position or rotation marks the cache dirty; every consumer of the
//! world-space set calls [`RigidBody::update_world_vertices`] first.

use alloc::vec::Vec;
use core::f32::consts::PI;

use embedded_graphics_core::pixelcolor::{Rgb565, WebColors};
use nalgebra::{Rotation2, Vector2};

// ComplexField provides sqrt()/cos()/sin() for f32 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// Default coefficient of static friction.
pub const DEFAULT_STATIC_FRICTION: f32 = 0.2;

/// Default coefficient of dynamic friction.
pub const DEFAULT_DYNAMIC_FRICTION: f32 = 0.8;

/// Side count used when a circle is realised as a regular polygon.
pub const CIRCLE_SEGMENTS: u32 = 16;

/// Descriptive shape tag.
///
/// The collision pipeline treats every body as a convex polygon; circles are
/// realised as many-sided regular polygons and the tag only records how the
/// body was built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Polygon,
}

/// Shape descriptor carried by each body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub sides: u32,
    pub radius: f32,
}

/// A convex rigid body owned by value by the world.
///
/// `Default` yields a fully zeroed body with no geometry and uninitialised
/// inertial fields; the caller populates it (see [`RigidBody::with_mass`] and
/// [`RigidBody::set_box_vertices`]). The n-gon constructor
/// [`RigidBody::new`] computes vertices, inertia, and the inverse terms.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub shape: Shape,

    pub position: Vector2<f32>,
    /// Radians; positive is counter-clockwise.
    pub rotation: f32,
    pub linear_velocity: Vector2<f32>,
    pub linear_acceleration: Vector2<f32>,
    pub angular_velocity: f32,
    pub angular_acceleration: f32,
    /// Accumulated force, consumed and cleared by integration each step.
    pub force: Vector2<f32>,

    pub mass: f32,
    pub inverse_mass: f32,
    pub inertia: f32,
    pub inverse_inertia: f32,
    pub density: f32,
    pub area: f32,
    /// Bounciness in `[0, 1]`; 1 is perfectly elastic.
    pub restitution: f32,
    pub static_friction: f32,
    pub dynamic_friction: f32,
    /// Immovable bodies keep zero inverse mass and inverse inertia.
    pub is_static: bool,

    /// Read by the renderer; the core ignores it.
    pub color: Rgb565,

    /// Counter-clockwise vertices relative to the centre of mass.
    pub vertices_local: Vec<Vector2<f32>>,
    /// Cached world-space transform of `vertices_local`.
    pub vertices_world: Vec<Vector2<f32>>,
    /// Whether `vertices_world` needs recomputing.
    pub dirty: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        RigidBody {
            shape: Shape {
                kind: ShapeKind::Polygon,
                sides: 0,
                radius: 0.0,
            },
            position: Vector2::zeros(),
            rotation: 0.0,
            linear_velocity: Vector2::zeros(),
            linear_acceleration: Vector2::zeros(),
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            force: Vector2::zeros(),
            mass: 0.0,
            inverse_mass: 0.0,
            inertia: 0.0,
            inverse_inertia: 0.0,
            density: 0.0,
            area: 0.0,
            restitution: 0.0,
            static_friction: DEFAULT_STATIC_FRICTION,
            dynamic_friction: DEFAULT_DYNAMIC_FRICTION,
            is_static: false,
            color: Rgb565::CSS_WHITE,
            vertices_local: Vec::new(),
            vertices_world: Vec::new(),
            dirty: true,
        }
    }
}

impl RigidBody {
    /// Creates a dynamic regular polygon with `sides` vertices at `radius`
    /// from the centre of mass.
    ///
    /// Computes local vertices, area, moment of inertia, and the inverse
    /// mass/inertia terms. `sides < 3` or `mass <= 0` yield zero inertia and
    /// zero inverse mass (the body will not respond to impulses).
    pub fn new(sides: u32, radius: f32, mass: f32) -> Self {
        let vertices_local = regular_polygon_vertices(sides, radius);
        let inertia = regular_polygon_inertia(sides, mass, radius);
        let area = regular_polygon_area(sides, radius);

        RigidBody {
            shape: Shape {
                kind: ShapeKind::Polygon,
                sides,
                radius,
            },
            mass,
            inverse_mass: inverse_mass(mass, false),
            inertia,
            inverse_inertia: if inertia > 0.0 { 1.0 / inertia } else { 0.0 },
            area,
            density: if area > 0.0 { mass / area } else { 0.0 },
            vertices_local,
            ..RigidBody::default()
        }
    }

    /// Creates a dynamic circle, realised as a [`CIRCLE_SEGMENTS`]-sided
    /// regular polygon.
    pub fn circle(radius: f32, mass: f32) -> Self {
        let mut body = RigidBody::new(CIRCLE_SEGMENTS, radius, mass);
        body.shape.kind = ShapeKind::Circle;
        body
    }

    /// Creates an axis-aligned box of the given dimensions with uninitialised
    /// inertial fields; chain [`with_mass`](Self::with_mass) or
    /// [`with_static`](Self::with_static) to finish it.
    pub fn rectangle(width: f32, height: f32) -> Self {
        let mut body = RigidBody::default();
        body.set_box_vertices(width, height);
        body
    }

    /// Replaces the local geometry with the four corners `(±w/2, ±h/2)` in
    /// counter-clockwise order and rebuilds the world-space cache immediately
    /// from the current position and rotation.
    pub fn set_box_vertices(&mut self, width: f32, height: f32) {
        let hw = width / 2.0;
        let hh = height / 2.0;

        self.vertices_local = Vec::from([
            Vector2::new(-hw, -hh),
            Vector2::new(hw, -hh),
            Vector2::new(hw, hh),
            Vector2::new(-hw, hh),
        ]);
        self.shape = Shape {
            kind: ShapeKind::Rectangle,
            sides: 4,
            radius: 0.0,
        };
        self.area = width * height;
        self.dirty = true;
        self.update_world_vertices();
    }

    /// Builder: set mass and the matching inverse mass.
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self.inverse_mass = inverse_mass(mass, self.is_static);
        self
    }

    /// Builder: mark the body immovable, zeroing inverse mass and inertia.
    pub fn with_static(mut self) -> Self {
        self.is_static = true;
        self.inverse_mass = 0.0;
        self.inverse_inertia = 0.0;
        self
    }

    /// Builder: set initial position.
    pub fn with_position(mut self, position: Vector2<f32>) -> Self {
        self.snap_to(position);
        self
    }

    /// Builder: set initial rotation in radians.
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self.dirty = true;
        self
    }

    /// Builder: set initial linear velocity.
    pub fn with_velocity(mut self, velocity: Vector2<f32>) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Builder: set initial angular velocity (radians per second).
    pub fn with_angular_velocity(mut self, angular_velocity: f32) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Builder: set restitution, clamped to `0.0..=1.0`.
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.clamp(0.0, 1.0);
        self
    }

    /// Builder: set the static and dynamic friction coefficients, clamped to
    /// be non-negative.
    pub fn with_friction(mut self, static_friction: f32, dynamic_friction: f32) -> Self {
        self.static_friction = static_friction.max(0.0);
        self.dynamic_friction = dynamic_friction.max(0.0);
        self
    }

    /// Builder: set the colour the renderer draws this body with.
    pub fn with_color(mut self, color: Rgb565) -> Self {
        self.color = color;
        self
    }

    /// Translates the body, invalidating the world-space cache.
    pub fn move_by(&mut self, amount: Vector2<f32>) {
        self.position += amount;
        self.dirty = true;
    }

    /// Rotates the body by `radians`, invalidating the world-space cache.
    pub fn rotate_by(&mut self, radians: f32) {
        self.rotation += radians;
        self.dirty = true;
    }

    /// Teleports the body, invalidating the world-space cache.
    pub fn snap_to(&mut self, position: Vector2<f32>) {
        self.position = position;
        self.dirty = true;
    }

    /// Accumulates a force, consumed by the next integration step.
    #[inline]
    pub fn apply_force(&mut self, force: Vector2<f32>) {
        self.force += force;
    }

    /// Applies an instantaneous impulse: `delta_v = impulse * inverse_mass`.
    /// Ignored for static bodies.
    #[inline]
    pub fn apply_impulse(&mut self, impulse: Vector2<f32>) {
        if !self.is_static {
            self.linear_velocity += impulse * self.inverse_mass;
        }
    }

    /// Magnitude of the linear velocity.
    #[inline]
    pub fn speed(&self) -> f32 {
        self.linear_velocity.norm()
    }

    /// Translational kinetic energy, `0.5 * m * v^2`.
    #[inline]
    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self.mass * self.linear_velocity.norm_squared()
    }

    /// Rotational kinetic energy, `0.5 * I * omega^2`.
    #[inline]
    pub fn rotational_energy(&self) -> f32 {
        0.5 * self.inertia * self.angular_velocity * self.angular_velocity
    }

    /// Rebuilds the cached world-space vertices from the local set and the
    /// current position/rotation.
    ///
    /// No-op when the cache is clean and non-empty.
    pub fn update_world_vertices(&mut self) {
        if !self.dirty && !self.vertices_world.is_empty() {
            return;
        }

        let rotation = Rotation2::new(self.rotation);
        let position = self.position;

        self.vertices_world.clear();
        self.vertices_world.reserve(self.vertices_local.len());
        for local in &self.vertices_local {
            self.vertices_world.push(rotation * local + position);
        }

        self.dirty = false;
    }
}

/// Inverse mass, zero for static or massless bodies.
#[inline]
fn inverse_mass(mass: f32, is_static: bool) -> f32 {
    if is_static || mass <= 0.0 {
        0.0
    } else {
        1.0 / mass
    }
}

/// Vertices of a regular polygon, counter-clockwise, at angles
/// `-pi/2 + i * 2*pi/sides`.
///
/// Returns an empty sequence for `sides < 3`.
pub fn regular_polygon_vertices(sides: u32, radius: f32) -> Vec<Vector2<f32>> {
    let mut vertices = Vec::new();
    if sides < 3 {
        return vertices;
    }
    vertices.reserve(sides as usize);

    let d_theta = 2.0 * PI / sides as f32;
    let start_angle = -PI / 2.0;

    for i in 0..sides {
        let theta = start_angle + i as f32 * d_theta;
        vertices.push(Vector2::new(radius * theta.cos(), radius * theta.sin()));
    }

    vertices
}

/// Moment of inertia of a regular polygon about its centre of mass:
/// `I = m * r^2 / 12 * (3 + cos(2*pi/n))`.
///
/// Zero for `mass <= 0` or `sides < 3`.
pub fn regular_polygon_inertia(sides: u32, mass: f32, radius: f32) -> f32 {
    if sides < 3 || mass <= 0.0 {
        return 0.0;
    }
    let angle = 2.0 * PI / sides as f32;
    (mass * radius * radius / 12.0) * (3.0 + angle.cos())
}

/// Area of a regular polygon, `n * r^2 * sin(2*pi/n) / 2`.
fn regular_polygon_area(sides: u32, radius: f32) -> f32 {
    if sides < 3 {
        return 0.0;
    }
    let angle = 2.0 * PI / sides as f32;
    0.5 * sides as f32 * radius * radius * angle.sin()
}
