//! K-prototypes superpixel clustering.
//!
//! Pixels are grouped by a mixed distance: a quadratic (or diagonal) form
//! over color and position, plus a penalty when the pixel's semantic label
//! disagrees with the cluster's label. Clusters are maintained incrementally
//! in an arena; both the allocation sweep and every reallocation sweep
//! mutate them only through `join` and `leave`.
//!
//! ## Core Types
//!
//! - [`Clusterer`] — Seeds, allocates, and reallocates pixels until the move count settles
//! - [`ClustererConfig`] — Mixing coefficient, convergence rule, distance flavors, seed
//! - [`ClusterStats`] — Per-run sweep/move/empty-cluster summary
mod clusterer;
mod config;
mod phase;
mod stats;

pub use clusterer::*;
pub use config::*;
pub use phase::*;
pub use stats::*;
