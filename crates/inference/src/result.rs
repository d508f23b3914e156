use anyhow::Context;
use hseg_core::*;
use hseg_model::*;

/// Outcome of an [`crate::InferenceIterator`] run.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
    labeling: LabelImage,
    clustering: ClusterImage,
    clusters: Vec<Cluster>,
    iterations: usize,
    energy: Cost,
}

impl InferenceResult {
    pub(crate) fn new(
        labeling: LabelImage,
        clustering: ClusterImage,
        clusters: Vec<Cluster>,
        iterations: usize,
        energy: Cost,
    ) -> Self {
        Self {
            labeling,
            clustering,
            clusters,
            iterations,
            energy,
        }
    }
    pub fn labeling(&self) -> &LabelImage {
        &self.labeling
    }
    pub fn clustering(&self) -> &ClusterImage {
        &self.clustering
    }
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }
    pub fn iterations(&self) -> usize {
        self.iterations
    }
    pub fn energy(&self) -> Cost {
        self.energy
    }

    /// writes `<name>.labels` and `<name>.superpixels` grid files under `dir`
    pub fn save(&self, dir: &std::path::Path, name: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(dir).with_context(|| format!("create output directory {}", dir.display()))?;
        self.labeling.save(&dir.join(format!("{}.labels", name)))?;
        self.clustering.save(&dir.join(format!("{}.superpixels", name)))?;
        Ok(())
    }
}

impl std::fmt::Display for InferenceResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} iterations {:>4} superpixels {:>4} energy {:>14.4}",
            self.labeling.width(),
            self.labeling.height(),
            self.iterations,
            self.clusters.iter().filter(|c| !c.is_empty()).count(),
            self.energy
        )
    }
}
