//! MatchForge concurrency services
//!
//! This crate provides the background execution facility everything else runs
//! on:
//! - [`ConcurrencyHandler`]: a lazily started, single-worker executor with
//!   bounded-time shutdown
//! - [`TaskHandle`]: blocking or awaitable handle on a submitted task
//! - [`SharedTask`]: a memoized handle usable as a builder [`Supplier`]
//!
//! [`Supplier`]: matchforge_core::Supplier

pub mod executor;
pub mod task;


pub use executor::ConcurrencyHandler;
pub use task::{SharedTask, TaskContext, TaskHandle};
