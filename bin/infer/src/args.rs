use anyhow::Context;
use clap::Parser;
use hseg_clustering::*;
use hseg_core::*;
use hseg_energy::*;
use hseg_inference::*;
use hseg_model::*;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    /// joint inference from the classifier's labeling
    Infer,
    /// clustering only, labeling pinned to the ground truth
    Truth,
    /// loss-augmented inference against the ground truth
    Loss,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// text file naming one image per line
    #[arg(long, required = true)]
    list: PathBuf,
    /// directory of `<name>.feat` feature files
    #[arg(long, required = true)]
    features: PathBuf,
    /// directory of `<name>.prob` classifier scores
    #[arg(long, required = true)]
    scores: PathBuf,
    /// directory of `<name>.labels` ground-truth grids
    #[arg(long)]
    truth: Option<PathBuf>,
    /// learned weights file
    #[arg(long, required = true)]
    weights: PathBuf,
    /// class count for scalar weights when the weights file can't be read
    #[arg(long)]
    classes: Option<usize>,
    #[arg(long, default_value_t = 1.)]
    unary_weight: Cost,
    #[arg(long, default_value_t = 0.)]
    pairwise_weight: Cost,
    #[arg(long, default_value_t = 0.)]
    higher_weight: Cost,
    /// diagonal of the scalar feature similarity
    #[arg(long, default_value_t = 0.)]
    feature_weight: Cost,
    /// feature similarity file overriding the one in the weights
    #[arg(long)]
    similarity: Option<PathBuf>,
    /// output directory for labelings and superpixel maps
    #[arg(long, default_value = "out")]
    out: PathBuf,
    #[arg(long, value_enum, default_value_t = Mode::Infer)]
    mode: Mode,
    #[arg(long, default_value_t = CLUSTER_COUNT)]
    clusters: usize,
    #[arg(long, default_value_t = CLUSTER_GAMMA)]
    gamma: Cost,
    #[arg(long, default_value_t = INFERENCE_ITERATIONS)]
    max_iter: usize,
    #[arg(long, default_value_t = INFERENCE_EPSILON)]
    eps: Cost,
    /// charge label disagreement by class distance instead of a flat 1
    #[arg(long)]
    class_distance: bool,
    /// 8-connected pairwise neighborhood
    #[arg(long)]
    eight: bool,
    /// worker threads, 0 for one per core
    #[arg(long, default_value_t = 0)]
    threads: usize,
}

impl Args {
    pub fn run(self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.mode == Mode::Infer || self.truth.is_some(),
            "--mode {:?} needs --truth",
            self.mode
        );
        let weights = self.weights()?;
        let names = self.names()?;
        log::info!("{:<32}{:<32}", "images", names.len());
        log::info!("{:<32}{:<32}", "classes", weights.classes());
        let pool = Pool::new(self.threads)?;
        let results = pool.map(&names, |name| self.image(&weights, name));
        let failed = results.iter().filter(|r| r.is_err()).count();
        log::info!("{:<32}{:<32}", "images labeled", names.len() - failed);
        if failed > 0 {
            log::warn!("{:<32}{:<32}", "images skipped", failed);
        }
        Ok(())
    }

    fn config(&self) -> InferenceConfig {
        InferenceConfig {
            epsilon: self.eps,
            max_iter: self.max_iter,
            clusters: self.clusters,
            clusterer: ClustererConfig {
                gamma: self.gamma,
                penalty: match self.class_distance {
                    true => LabelPenalty::ClassDistance,
                    false => LabelPenalty::Fixed,
                },
                ..ClustererConfig::default()
            },
        }
    }

    fn neighborhood(&self) -> Neighborhood {
        match self.eight {
            true => Neighborhood::Eight,
            false => Neighborhood::Four,
        }
    }

    fn weights(&self) -> anyhow::Result<Weights> {
        let weights = match (Weights::load(&self.weights), self.classes) {
            (Ok(weights), _) => weights,
            (Err(e), Some(classes)) => {
                log::warn!("{:<32}{:<32}", "weights unreadable, using scalars", format!("{:#}", e));
                Weights::filled(
                    classes,
                    self.unary_weight,
                    self.pairwise_weight,
                    self.higher_weight,
                    self.feature_weight,
                )
            }
            (Err(e), None) => return Err(e),
        };
        match self.similarity {
            Some(ref path) => Ok(weights.with_similarity(SimilarityMatrix::load(path)?)),
            None => Ok(weights),
        }
    }

    fn names(&self) -> anyhow::Result<Vec<String>> {
        let list = std::fs::read_to_string(&self.list)
            .with_context(|| format!("read image list {}", self.list.display()))?;
        Ok(list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn sample(&self, name: &str) -> anyhow::Result<Sample<FeatureImage>> {
        let features = FeatureImage::load(&self.features.join(format!("{}.feat", name)))?;
        let scores = UnaryScores::load(&self.scores.join(format!("{}.prob", name)))?;
        let sample = Sample::new(features, scores)?;
        match self.truth {
            Some(ref dir) => sample.with_truth(LabelImage::load(&dir.join(format!("{}.labels", name)))?),
            None => Ok(sample),
        }
    }

    /// load, infer, and save one image
    fn image(&self, weights: &Weights, name: &str) -> anyhow::Result<()> {
        let sample = self.sample(name).with_context(|| format!("load image {}", name))?;
        sample.expect_classes(weights.classes())?;
        let ref solver = Icm::default();
        let config = self.config();
        let result = match (self.mode, sample.truth()) {
            (Mode::Infer, _) => {
                let ref energy = StandardEnergy::new(weights).with_neighborhood(self.neighborhood());
                InferenceIterator::new(energy, solver, &sample).with_config(config).run()
            }
            (Mode::Truth, Some(truth)) => {
                let ref energy = StandardEnergy::new(weights).with_neighborhood(self.neighborhood());
                InferenceIterator::new(energy, solver, &sample)
                    .with_config(config)
                    .run_on_ground_truth(truth)
            }
            (Mode::Loss, Some(truth)) => {
                let ref energy = LossAugmentedEnergy::new(weights, truth).with_neighborhood(self.neighborhood());
                InferenceIterator::new(energy, solver, &sample).with_config(config).run()
            }
            (_, None) => anyhow::bail!("image {} has no ground truth", name),
        };
        log::info!("{:<32}{:<32}", name, result);
        self.save(&result, name)
    }

    fn save(&self, result: &InferenceResult, name: &str) -> anyhow::Result<()> {
        result
            .save(&self.out, name)
            .with_context(|| format!("save image {}", name))
    }
}
