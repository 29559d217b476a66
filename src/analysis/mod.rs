//! Analysis modules.
//!
//! This module holds the pure statistics pass over a record batch.

pub mod aggregator;

pub use aggregator::*;
