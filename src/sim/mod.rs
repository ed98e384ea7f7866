//! Live match simulation: probabilistic event generation and the
//! background tick driver.

pub mod generator;
pub mod scheduler;

pub use generator::{SimConfig, Simulation, EVENT_PROBABILITY, UNKNOWN_PLAYER};
pub use scheduler::{SchedulerHandle, TickScheduler};
