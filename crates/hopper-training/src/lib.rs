//! Evolutionary training of obstacle-course policies.
//!
//! This crate evolves small neural-network policies with a genetic algorithm. Every agent
//! owns a two-layer perceptron genome that maps what the runner sees to a preference over
//! the three actions.
//!
//! # How Training Works
//!
//! 1. **Population** - Create agents with randomly initialized genomes
//! 2. **Episode** - Each agent plays the obstacle course until it collides or reaches the
//!    score cap
//! 3. **Fitness** - The episode score becomes the agent's fitness
//! 4. **Reproduction** - The population produces the next generation with one of two
//!    strategies (see [`population`])
//! 5. **Repeat** - Continue for the configured number of generations
//!
//! # Architecture
//!
//! ```text
//! Trainer
//!     ↓ resets / steps
//! Environment (hopper-engine)
//!     ↓ observation
//! Genome (per agent)
//!     ↓ prediction → action
//! Environment
//!     ↓ score
//! Population
//!     ↓ reproduces
//! next generation
//! ```
//!
//! # Example
//!
//! ```
//! use hopper_engine::{ObstacleCourse, Seed};
//! use hopper_training::{
//!     config::TrainConfig,
//!     trainer::{NullVisualizer, Trainer},
//! };
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let config = TrainConfig {
//!     generations: 2,
//!     population_size: 3,
//!     ..TrainConfig::default()
//! };
//! let course = ObstacleCourse::with_seed(Seed::from_bytes([0; 16]));
//! let mut trainer = Trainer::new(config, course, NullVisualizer).unwrap();
//! let outcome = trainer.run(&mut Pcg32::seed_from_u64(0)).unwrap();
//! assert_eq!(outcome.report.generations.len(), 2);
//! ```
//!
//! # Current Limitations
//!
//! - **Single episode per agent**: Fitness comes from one run of the course, so a lucky
//!   obstacle sequence can promote a weak genome
//! - **Sequential**: Agents are evaluated one after another
//! - **No persistence**: Trained genomes are not saved between runs

pub mod agent;
pub mod config;
pub mod genome;
pub mod policy;
pub mod population;
pub mod report;
pub mod trainer;
