use hseg_core::*;
use hseg_model::*;

/// One image ready for inference.
///
/// Construction checks that features, classifier scores, and ground truth
/// (when attached) describe the same image, so nothing downstream needs to.
#[derive(Debug, Clone)]
pub struct Sample<F> {
    features: F,
    scores: UnaryScores,
    truth: Option<LabelImage>,
}

impl<F> Sample<F>
where
    F: FeatureSource,
{
    pub fn new(features: F, scores: UnaryScores) -> anyhow::Result<Self> {
        scores.validate(features.width(), features.height(), scores.classes())?;
        anyhow::ensure!(scores.classes() > 0, "scores carry no classes");
        Ok(Self {
            features,
            scores,
            truth: None,
        })
    }
    pub fn with_truth(mut self, truth: LabelImage) -> anyhow::Result<Self> {
        anyhow::ensure!(
            self.features.aligned(&truth),
            "ground truth is {}x{} but image is {}x{}",
            truth.width(),
            truth.height(),
            self.features.width(),
            self.features.height()
        );
        self.truth = Some(truth);
        Ok(self)
    }
    /// checks the class count against the model about to consume this sample
    pub fn expect_classes(&self, classes: usize) -> anyhow::Result<()> {
        self.scores
            .validate(self.features.width(), self.features.height(), classes)
    }

    pub fn features(&self) -> &F {
        &self.features
    }
    pub fn scores(&self) -> &UnaryScores {
        &self.scores
    }
    pub fn truth(&self) -> Option<&LabelImage> {
        self.truth.as_ref()
    }
    pub fn classes(&self) -> usize {
        self.scores.classes()
    }
    pub fn width(&self) -> Coord {
        self.features.width()
    }
    pub fn height(&self) -> Coord {
        self.features.height()
    }
}
