use super::*;
use hseg_clustering::*;
use hseg_core::*;
use hseg_energy::*;
use hseg_model::*;

/// Alternating minimization of labeling and clustering.
///
/// Starts from the classifier's arg-max labeling and an initial clustering,
/// then repeats a labeling step (clustering fixed) followed by a clustering
/// step (labeling fixed, warm-started) until one round improves the energy by
/// no more than `epsilon`, or `max_iter` rounds have run. The last state is
/// returned even if the final round made things worse.
pub struct InferenceIterator<'a, E, S, F> {
    energy: &'a E,
    solver: &'a S,
    sample: &'a Sample<F>,
    config: InferenceConfig,
}

impl<'a, E, S, F> InferenceIterator<'a, E, S, F>
where
    E: EnergyFunction,
    S: Solver,
    F: FeatureSource,
{
    pub fn new(energy: &'a E, solver: &'a S, sample: &'a Sample<F>) -> Self {
        Self {
            energy,
            solver,
            sample,
            config: InferenceConfig::default(),
        }
    }
    pub fn with_config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// joint inference from the classifier's best guess
    pub fn run(&self) -> InferenceResult {
        self.iterate(self.sample.scores().max_labeling(), true)
    }

    /// clustering only, with the labeling pinned to `truth`
    pub fn run_on_ground_truth(&self, truth: &LabelImage) -> InferenceResult {
        debug_assert!(self.sample.features().aligned(truth));
        self.iterate(truth.clone(), false)
    }
}

impl<E, S, F> InferenceIterator<'_, E, S, F>
where
    E: EnergyFunction,
    S: Solver,
    F: FeatureSource,
{
    fn iterate(&self, mut labeling: LabelImage, relabel: bool) -> InferenceResult {
        let features = self.sample.features();
        let classes = self.energy.classes();
        let k = self.config.clusters;
        let mut clusterer = Clusterer::with_config(self.energy.weights(), self.config.clusterer);
        clusterer.run(k, classes, features, &labeling);
        let mut energy = self.energy(&labeling, &clusterer);
        log::debug!("{:<32}{:<32}", "inference initial energy", energy);
        let mut iterations = 0;
        while iterations < self.config.max_iter {
            iterations += 1;
            if relabel {
                labeling = self.relabel(&labeling, &clusterer);
            }
            let stats = clusterer.run(k, classes, features, &labeling);
            let previous = std::mem::replace(&mut energy, self.energy(&labeling, &clusterer));
            log::debug!(
                "{:<32}{:<32}",
                format!("inference iteration {:3}", iterations),
                format!("{:.4} ({})", energy, stats)
            );
            if previous - energy <= self.config.epsilon {
                break;
            }
        }
        log::debug!("{:<32}{:<32}", "inference iterations", iterations);
        let (clustering, clusters) = clusterer.into_parts();
        InferenceResult::new(labeling, clustering, clusters, iterations, energy)
    }

    fn energy(&self, labeling: &LabelImage, clusterer: &Clusterer) -> Cost {
        self.energy.give_energy(
            self.sample.features(),
            labeling,
            clusterer.clustership(),
            clusterer.clusters(),
        )
    }

    /// solve for a new labeling with the clustering held fixed
    fn relabel(&self, labeling: &LabelImage, clusterer: &Clusterer) -> LabelImage {
        let features = self.sample.features();
        let clustering = clusterer.clustership();
        let classes = self.energy.classes();
        let mut unaries = UnaryTable::new(features.pixels(), classes);
        for site in 0..features.pixels() {
            let f = features.feature(site);
            let cluster = clusterer
                .clusters()
                .get(clustering.at(site) as usize)
                .filter(|c| !c.is_empty());
            for l in 0..classes as Label {
                let higher = cluster
                    .map(|c| self.energy.higher_order_cost(&f, c.mean(), l, c.label()))
                    .unwrap_or(0.);
                unaries.set(site, l, self.energy.unary_cost(site, &f, l) + higher);
            }
        }
        let pairwise = |a: SiteId, b: SiteId, la: Label, lb: Label| {
            self.energy
                .pairwise_cost(&features.feature(a), &features.feature(b), la, lb)
        };
        self.solver.solve(
            &unaries,
            &pairwise,
            self.energy.neighborhood(),
            features.width(),
            features.height(),
            labeling,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLASSES: usize = 3;

    /// 6x5 image: left half dark, right half bright, scores agreeing
    fn sample() -> Sample<FeatureImage> {
        let (w, h) = (6, 5);
        let color = (0..w * h)
            .map(|i| if i % w < w / 2 { [0.1, 0.1, 0.2] } else { [0.9, 0.8, 0.9] })
            .collect::<Vec<_>>();
        let features = FeatureImage::from_color(w, h, &color).unwrap();
        let mut scores = vec![0.; (w * h) as usize * CLASSES];
        for i in 0..(w * h) as usize {
            let class = if i as Coord % w < w / 2 { 0 } else { 2 };
            scores[i + class * (w * h) as usize] = 1.;
        }
        let scores = UnaryScores::from_vec(w, h, CLASSES, scores).unwrap();
        Sample::new(features, scores).unwrap()
    }

    fn config() -> InferenceConfig {
        InferenceConfig {
            clusters: 4,
            ..InferenceConfig::default()
        }
    }

    fn weights() -> Weights {
        Weights::zeros(CLASSES).with_similarity(SimilarityMatrix::identity())
    }

    #[test]
    fn flat_costs_keep_initial_labeling() {
        let ref sample = sample();
        let ref w = weights();
        let ref energy = StandardEnergy::new(w);
        let ref icm = Icm::default();
        let result = InferenceIterator::new(energy, icm, sample).with_config(config()).run();
        assert_eq!(result.labeling(), &sample.scores().max_labeling());
        assert!(result.iterations() >= 1);
        assert!(result.iterations() <= config().max_iter);
    }

    #[test]
    fn strong_bias_takes_over() {
        let ref sample = sample();
        let mut w = weights();
        w.unary_mut(1)[FEATURE_DIM] = -10.;
        let ref w = w;
        let ref energy = StandardEnergy::new(w);
        let ref icm = Icm::default();
        let result = InferenceIterator::new(energy, icm, sample).with_config(config()).run();
        assert!(result.labeling().iter().all(|l| l == 1));
    }

    #[test]
    fn reported_energy_matches_final_state() {
        let ref sample = sample();
        let ref w = Weights::filled(CLASSES, 0.1, -0.05, 0.02, 1.);
        let ref energy = StandardEnergy::new(w);
        let ref icm = Icm::default();
        let result = InferenceIterator::new(energy, icm, sample).with_config(config()).run();
        let recomputed = energy.give_energy(
            sample.features(),
            result.labeling(),
            result.clustering(),
            result.clusters(),
        );
        assert!((result.energy() - recomputed).abs() < 1e-3);
    }

    #[test]
    fn ground_truth_is_never_relabeled() {
        let ref sample = sample();
        let mut w = weights();
        w.unary_mut(1)[FEATURE_DIM] = -10.;
        let ref w = w;
        let ref energy = StandardEnergy::new(w);
        let ref icm = Icm::default();
        let ref truth = LabelImage::from_vec(6, 5, (0..30).map(|i| (i % 2) as Label * 2).collect()).unwrap();
        let result = InferenceIterator::new(energy, icm, sample)
            .with_config(config())
            .run_on_ground_truth(truth);
        assert_eq!(result.labeling(), truth);
        assert_eq!(result.clustering().pixels(), 30);
    }

    #[test]
    fn stalled_energy_stops_early() {
        let ref sample = sample();
        let ref w = Weights::zeros(CLASSES);
        let ref energy = StandardEnergy::new(w);
        let ref icm = Icm::default();
        let result = InferenceIterator::new(energy, icm, sample).with_config(config()).run();
        assert_eq!(result.energy(), 0.);
        assert_eq!(result.iterations(), 1);
        let config = InferenceConfig {
            epsilon: Cost::NEG_INFINITY,
            max_iter: 5,
            ..config()
        };
        let result = InferenceIterator::new(energy, icm, sample).with_config(config).run();
        assert_eq!(result.iterations(), 5);
    }

    #[test]
    fn zero_iterations_returns_initial_state() {
        let ref sample = sample();
        let ref w = weights();
        let ref energy = StandardEnergy::new(w);
        let ref icm = Icm::default();
        let config = InferenceConfig {
            max_iter: 0,
            ..config()
        };
        let result = InferenceIterator::new(energy, icm, sample).with_config(config).run();
        assert_eq!(result.iterations(), 0);
        assert_eq!(result.labeling(), &sample.scores().max_labeling());
    }

    #[test]
    fn loss_augmentation_pushes_away_from_truth() {
        let ref sample = sample();
        let ref w = weights();
        let ref truth = sample.scores().max_labeling();
        let ref energy = LossAugmentedEnergy::new(w, truth);
        let ref icm = Icm::default();
        let result = InferenceIterator::new(energy, icm, sample).with_config(config()).run();
        assert!(result.labeling().iter().zip(truth.iter()).all(|(a, b)| a != b));
    }
}
