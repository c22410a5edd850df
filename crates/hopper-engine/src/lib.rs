//! Obstacle-course game engine.
//!
//! This crate implements the reflex game that the trainer evolves policies for: a runner
//! stands on the floor while obstacles scroll towards it, and every tick it may stand,
//! jump or crouch.
//!
//! - [`Action`] - The three choices available each tick
//! - [`Runner`] - The controlled body and its stance state machine
//! - [`ObstacleCourse`] - Scrolling obstacles, scoring and collision
//! - [`Environment`] - The contract the trainer drives episodes through
//! - [`Seed`] - 128-bit seed for reproducible courses
//!
//! # Tick Order
//!
//! Each call to [`Environment::step`] performs, in order:
//!
//! 1. Apply the action to the runner's stance
//! 2. Retire the front obstacle if it has left the screen (awards 2 points) and spawn a new one
//! 3. Advance the runner (jump arc)
//! 4. Scroll every obstacle left
//! 5. Test collision against every obstacle
//!
//! # Example
//!
//! ```
//! use hopper_engine::{Action, Environment, ObstacleCourse, Seed};
//!
//! let mut course = ObstacleCourse::with_seed(Seed::from_bytes([7; 16]));
//! let observation = course.reset();
//! assert_eq!(observation[0], 900.0);
//!
//! let outcome = course.step(Action::Stand);
//! assert!(!outcome.terminated);
//! ```

pub use self::{action::*, course::*, environment::*, runner::*, seed::*};

mod action;
mod course;
mod environment;
mod runner;
mod seed;

/// Vertical position of the floor surface. Everything grounded has `y + height == FLOOR_Y`.
pub const FLOOR_Y: f32 = 400.0;
/// Downward acceleration applied every tick while airborne.
pub const GRAVITY: f32 = 0.05;
/// Initial upward speed of a jump.
pub const JUMP_FORCE: f32 = 5.0;
/// Horizontal distance every obstacle travels per tick.
pub const SCROLL_SPEED: f32 = 2.0;
