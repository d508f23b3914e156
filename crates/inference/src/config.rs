use hseg_clustering::*;
use hseg_core::*;

/// Tuning knobs of an [`crate::InferenceIterator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceConfig {
    /// stop once an iteration improves the energy by at most this much
    pub epsilon: Cost,
    pub max_iter: usize,
    /// superpixels per image
    pub clusters: usize,
    pub clusterer: ClustererConfig,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            epsilon: INFERENCE_EPSILON,
            max_iter: INFERENCE_ITERATIONS,
            clusters: CLUSTER_COUNT,
            clusterer: ClustererConfig::default(),
        }
    }
}
