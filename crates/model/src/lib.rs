//! Data model for joint semantic labeling and superpixel clustering.
//!
//! Everything the energy, clustering, and inference layers share lives here.
//! Types in this crate carry arithmetic and bookkeeping only; no optimization
//! happens at this level.
//!
//! ## Core Types
//!
//! - [`Feature`] — Fixed-length per-pixel vector (color + normalized position)
//! - [`Grid`] — Row-major 2-D grid, specialized as [`LabelImage`] and [`ClusterImage`]
//! - [`Neighborhood`] — 4- or 8-connected grid topology
//! - [`FeatureSource`] — Capability `site → Feature`, implemented by [`FeatureImage`]
//! - [`Weights`] — Partitioned parameter vector with vector-space arithmetic
//! - [`Cluster`] — Incrementally maintained superpixel prototype
//!
//! ## Persistence
//!
//! - [`UnaryScores`] — Classifier scores in the `PROB` binary format
//! - [`Weights::save`] / [`Weights::load`] — Versionless weight vectors
//! - [`Grid::save`] / [`Grid::load`] — Labelings and superpixel maps
mod cluster;
mod distance;
mod feature;
mod grid;
mod neighborhood;
mod payload;
mod scores;
mod similarity;
mod source;
mod weights;

pub use cluster::*;
pub use distance::*;
pub use feature::*;
pub use grid::*;
pub use neighborhood::*;
pub use scores::*;
pub use similarity::*;
pub use source::*;
pub use weights::*;
