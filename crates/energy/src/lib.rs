//! Energy evaluation for joint semantic labeling and superpixel clustering.
//!
//! The energy of a configuration (features, labeling, clustering) is a sum of
//! four families of terms, each linear in the [`Weights`](hseg_model::Weights):
//!
//! 1. **Unary** — one per valid pixel
//! 2. **Pairwise** — one per adjacent pair of valid pixels
//! 3. **Higher-order** — one per valid pixel and its assigned cluster
//! 4. **Feature** — quadratic distance between a valid pixel and its cluster mean
//!
//! ## Core Types
//!
//! - [`EnergyFunction`] — Cost oracle plus scalar and per-weight energy sums
//! - [`StandardEnergy`] — The plain model energy
//! - [`LossAugmentedEnergy`] — Margin-rescaled energy for structured training
//! - [`Breakdown`] — Per-family energy totals
mod augmented;
mod breakdown;
mod energy;
mod standard;
mod term;

pub use augmented::*;
pub use breakdown::*;
pub use energy::*;
pub use standard::*;
pub use term::*;
