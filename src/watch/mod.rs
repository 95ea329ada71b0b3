// src/watch/mod.rs

//! File watching and change delivery.
//!
//! This module turns filesystem events into per-category rebuild pings:
//! - [`watcher`] owns the single recursive `notify` watcher and the
//!   capacity-one subscription channels that coalesce event bursts.
//! - [`hash`] provides the aggregate content hash watch loops use to skip
//!   rebuilds whose inputs are unchanged.
//!
//! It knows nothing about tasks or transforms; it only routes changes.

pub mod hash;
pub mod watcher;

pub use hash::hash_inputs;
pub use watcher::WatchHub;
