//! Generic serialized-state framework.
//!
//! This module provides the building blocks for state containers whose
//! transitions are applied one event at a time by a dedicated task.
//!
//! # Main Components
//!
//! - [`Reducer`] - Trait that state types implement to be driven by an actor
//! - [`StoreActor`] - Generic actor that owns the state and applies events
//! - [`StoreClient`] - Type-safe handle for dispatching and observing
//! - [`FrameworkError`] - Common error types

pub mod core;

pub use self::core::*;
