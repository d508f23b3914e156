use hseg_core::*;
use hseg_model::*;

/// A single summand of the total energy.
///
/// Both the scalar energy and its per-weight decomposition are folds over
/// the same sequence of terms, which keeps them consistent by construction.
#[derive(Debug, Clone, Copy)]
pub enum Term {
    /// pixel site, its feature, its label
    Unary(SiteId, Feature, Label),
    /// features and labels of two adjacent pixels
    Pairwise(Feature, Feature, Label, Label),
    /// pixel feature, cluster mean, pixel label, cluster label
    HigherOrder(Feature, Feature, Label, Label),
    /// difference between a pixel feature and its cluster mean
    Similarity(Feature),
}
