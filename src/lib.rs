//! Impulse-based 2D rigid-body physics core.
//!
//! `impulse2d` simulates convex polygons (circles are realised as many-sided
//! regular polygons) under gravity, with semi-implicit Euler integration, a
//! uniform-grid broad phase, a Separating Axis Theorem narrow phase with
//! contact extraction, and impulse resolution with restitution, static and
//! dynamic Coulomb friction, and positional correction.
//!
//! # Features
//!
//! - **Value-owned bodies**: one ordered sequence, cache-friendly iteration
//! - **Spatial hashing**: broad-phase candidate pairs from a uniform grid
//! - **SAT narrow phase**: minimum translation vector and up to two contacts
//! - **Impulse solver**: restitution plus static/dynamic Coulomb friction
//! - **Observable**: pipeline counters via [`WorldStats`]
//! - **`no_std` compatible**: works in embedded and WASM environments
//!
//! # Example
//! ```
//! use impulse2d::{RigidBody, World};
//! use nalgebra::Vector2;
//!
//! let mut world = World::new();
//!
//! let floor = RigidBody::rectangle(30.0, 2.0)
//!     .with_position(Vector2::new(0.0, -5.0))
//!     .with_static();
//! world.add_body(floor);
//!
//! let ball = RigidBody::circle(0.5, 1.0)
//!     .with_position(Vector2::new(0.0, 4.0))
//!     .with_restitution(0.4);
//! world.add_body(ball);
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0);
//! }
//!
//! // The ball has come to rest on the floor instead of falling through
//! assert!(world.bodies()[1].position.y > -4.0);
//! ```

#![no_std]

extern crate alloc;

pub mod aabb;
pub mod body;
pub mod broadphase;
pub mod collision;
pub mod math;
pub mod stats;
pub mod world;

// Re-export primary API
pub use aabb::Aabb;
pub use body::{RigidBody, Shape, ShapeKind};
pub use broadphase::GridConfig;
pub use collision::Manifold;
pub use stats::WorldStats;
pub use world::World;
