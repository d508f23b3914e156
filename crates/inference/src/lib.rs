//! Alternating inference over labelings and superpixels.
//!
//! A labeling step hands per-site costs to a [`Solver`] while the clustering
//! is held fixed; a clustering step re-runs the warm-started
//! [`hseg_clustering::Clusterer`] while the labeling is held fixed. The two
//! alternate until the energy stops improving.
//!
//! ## Core Types
//!
//! - [`Sample`] — Validated features, classifier scores, and optional ground truth
//! - [`InferenceIterator`] — The alternating minimization loop
//! - [`InferenceResult`] — Final labeling, clustering, and energy
//! - [`Solver`] / [`Icm`] — Discrete labeling given unary costs and a pairwise oracle
//! - [`Pool`] — Independent images on a fixed-size thread pool
mod config;
mod iterator;
mod pool;
mod result;
mod sample;
mod solver;
mod table;

pub use config::*;
pub use iterator::*;
pub use pool::*;
pub use result::*;
pub use sample::*;
pub use solver::*;
pub use table::*;
