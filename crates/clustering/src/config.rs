use hseg_core::*;

/// How color and position differences are weighed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FeatureMetric {
    /// full quadratic form `dᵀ M d` through the similarity matrix
    #[default]
    Quadratic,
    /// squared Euclidean distance weighted by the diagonal of the similarity matrix
    Euclidean,
}

/// How a disagreement between pixel and cluster labels is charged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LabelPenalty {
    /// every disagreement costs 1
    #[default]
    Fixed,
    /// a disagreement costs the class distance between the two labels
    ClassDistance,
}

/// Tuning knobs of a [`crate::Clusterer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClustererConfig {
    pub gamma: Cost,
    pub convergence: Cost,
    pub max_sweeps: usize,
    pub seed: u64,
    pub metric: FeatureMetric,
    pub penalty: LabelPenalty,
}

impl Default for ClustererConfig {
    fn default() -> Self {
        Self {
            gamma: CLUSTER_GAMMA,
            convergence: CLUSTER_CONVERGENCE,
            max_sweeps: CLUSTER_MAX_SWEEPS,
            seed: CLUSTER_SEED,
            metric: FeatureMetric::default(),
            penalty: LabelPenalty::default(),
        }
    }
}

impl ClustererConfig {
    /// largest change in move count between sweeps still counted as converged
    pub fn threshold(&self, pixels: usize) -> Cost {
        self.convergence * pixels as Cost
    }
}
