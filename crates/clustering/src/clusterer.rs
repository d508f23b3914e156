use super::*;
use hseg_core::*;
use hseg_model::*;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// K-prototypes clustering of pixels into superpixels.
///
/// Owns the cluster arena and the pixel → cluster assignment between runs so
/// that successive calls warm-start: a cluster that had members keeps its
/// prototype, an empty one is reseeded at a random pixel.
///
/// A run is one allocation sweep (every pixel joins its nearest prototype)
/// followed by Lloyd-style reallocation sweeps in which a pixel whose nearest
/// cluster changed leaves the old one and joins the new one. Sweeps stop once
/// the number of moves changes by at most `convergence · pixels`, or after
/// `max_sweeps`.
pub struct Clusterer<'w> {
    weights: &'w Weights,
    config: ClustererConfig,
    clusters: Vec<Cluster>,
    clustership: ClusterImage,
    phase: Phase,
    rng: SmallRng,
}

impl<'w> Clusterer<'w> {
    pub fn new(weights: &'w Weights) -> Self {
        Self::with_config(weights, ClustererConfig::default())
    }
    pub fn with_config(weights: &'w Weights, config: ClustererConfig) -> Self {
        Self {
            weights,
            config,
            clusters: Vec::new(),
            clustership: ClusterImage::new(0, 0, 0),
            phase: Phase::default(),
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    pub fn config(&self) -> &ClustererConfig {
        &self.config
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }
    pub fn clustership(&self) -> &ClusterImage {
        &self.clustership
    }
    /// number of clusters without members
    pub fn empty(&self) -> usize {
        self.clusters.iter().filter(|c| c.is_empty()).count()
    }

    /// Cluster `features` into `k` superpixels, guided by `labels`.
    pub fn run<F>(&mut self, k: usize, classes: usize, features: &F, labels: &LabelImage) -> ClusterStats
    where
        F: FeatureSource,
    {
        debug_assert!(features.aligned(labels));
        debug_assert_eq!(classes, self.weights.classes());
        self.phase = Phase::Uninitialized;
        self.resize(k, classes);
        self.clustership = ClusterImage::new(features.width(), features.height(), 0);
        if k == 0 || features.pixels() == 0 {
            self.phase = Phase::Converged;
            return ClusterStats {
                empty: self.empty(),
                ..ClusterStats::default()
            };
        }
        self.init(features, labels);
        self.allocate(features, labels);
        let threshold = self.config.threshold(features.pixels());
        let mut sweeps = 0;
        let mut moves = 0;
        loop {
            self.phase = Phase::Iterating;
            let last = std::mem::replace(&mut moves, self.reallocate(features, labels));
            sweeps += 1;
            if log::log_enabled!(log::Level::Debug) {
                log::debug!(
                    "{:<32}{:<32}",
                    format!("sweep {:3} moves {}", sweeps, moves),
                    self.energy(features, labels)
                );
            }
            if (moves as Cost - last as Cost).abs() <= threshold {
                break;
            }
            if sweeps >= self.config.max_sweeps {
                log::warn!("{:<32}{:<32}", "clustering sweep cap reached", sweeps);
                break;
            }
        }
        self.phase = Phase::Converged;
        let stats = ClusterStats {
            sweeps,
            moves,
            empty: self.empty(),
            energy: self.energy(features, labels),
        };
        if stats.empty > 0 {
            log::debug!("{:<32}{:<32}", "empty clusters", stats.empty);
        }
        stats
    }

    /// Distance of a pixel with `feature` and `label` to cluster `k`.
    pub fn distance(&self, feature: &Feature, label: Label, k: ClusterId) -> Cost {
        self.measure(feature, label, &self.clusters[k as usize])
    }

    /// Nearest cluster to a pixel, first one on ties.
    pub fn nearest(&self, feature: &Feature, label: Label) -> (ClusterId, Cost) {
        self.clusters
            .iter()
            .enumerate()
            .map(|(k, cluster)| (k as ClusterId, self.measure(feature, label, cluster)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .unwrap_or((0, Cost::INFINITY))
    }

    /// Σ distance(pixel, assigned cluster)
    pub fn energy<F>(&self, features: &F, labels: &LabelImage) -> Cost
    where
        F: FeatureSource,
    {
        (0..features.pixels())
            .map(|site| {
                let k = self.clustership.at(site) as usize;
                self.measure(&features.feature(site), labels.at(site), &self.clusters[k])
            })
            .sum()
    }

    /// Consume the clusterer, keeping the assignment and the arena.
    pub fn into_parts(self) -> (ClusterImage, Vec<Cluster>) {
        (self.clustership, self.clusters)
    }
}

impl Clusterer<'_> {
    /// grow or shrink the arena to `k`. a change in class count
    /// invalidates every prototype.
    fn resize(&mut self, k: usize, classes: usize) {
        if self.clusters.iter().any(|c| c.classes() != classes) {
            self.clusters.clear();
        }
        self.clusters.truncate(k);
        self.clusters.resize(k, Cluster::new(classes));
    }

    /// clear members of warm clusters, reseed the rest
    fn init<F>(&mut self, features: &F, labels: &LabelImage)
    where
        F: FeatureSource,
    {
        let pixels = features.pixels();
        let mut seeded = 0;
        for k in 0..self.clusters.len() {
            if self.clusters[k].is_empty() {
                let site = self.rng.random_range(0..pixels);
                self.clusters[k].seed(features.feature(site), labels.at(site));
                seeded += 1;
            } else {
                self.clusters[k].reset();
            }
        }
        log::debug!("{:<32}{:<32}", "kprototypes seeded", seeded);
        self.phase = Phase::Initialized;
    }

    /// every pixel joins its nearest prototype
    fn allocate<F>(&mut self, features: &F, labels: &LabelImage)
    where
        F: FeatureSource,
    {
        let weights = self.weights;
        for site in 0..features.pixels() {
            let f = features.feature(site);
            let l = labels.at(site);
            let (k, _) = self.nearest(&f, l);
            self.clusters[k as usize].join(&f, l, weights.distance());
            self.clustership.set(site, k);
        }
        self.phase = Phase::Allocated;
    }

    /// move pixels whose nearest cluster changed. returns the move count.
    fn reallocate<F>(&mut self, features: &F, labels: &LabelImage) -> usize
    where
        F: FeatureSource,
    {
        let weights = self.weights;
        let mut moves = 0;
        for site in 0..features.pixels() {
            let f = features.feature(site);
            let l = labels.at(site);
            let old = self.clustership.at(site);
            let (new, _) = self.nearest(&f, l);
            if new != old {
                self.clusters[old as usize].leave(&f, l, weights.distance());
                self.clusters[new as usize].join(&f, l, weights.distance());
                self.clustership.set(site, new);
                moves += 1;
            }
        }
        moves
    }

    fn measure(&self, feature: &Feature, label: Label, cluster: &Cluster) -> Cost {
        let d = *feature - *cluster.mean();
        let m = self.weights.similarity();
        let spatial = match self.config.metric {
            FeatureMetric::Quadratic => m.quadratic(&d),
            FeatureMetric::Euclidean => (0..FEATURE_DIM).map(|i| m.get(i, i) * d[i] * d[i]).sum(),
        };
        spatial + self.config.gamma * self.mismatch(label, cluster.label())
    }

    /// label disagreement between a pixel and a cluster.
    /// ignored pixels never disagree; unlabeled clusters always do.
    fn mismatch(&self, pixel: Label, cluster: Label) -> Cost {
        let classes = self.weights.classes();
        if pixel == cluster || !valid(pixel, classes) {
            0.
        } else if !valid(cluster, classes) {
            1.
        } else {
            match self.config.penalty {
                LabelPenalty::Fixed => 1.,
                LabelPenalty::ClassDistance => self.weights.distance().get(pixel, cluster),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(classes: usize) -> Weights {
        Weights::zeros(classes).with_similarity(SimilarityMatrix::identity())
    }

    /// random features with labels drawn from `classes`, a few ignored
    fn image(classes: usize, seed: u64) -> (FeatureImage, LabelImage) {
        let ref mut rng = SmallRng::seed_from_u64(seed);
        let width = rng.random_range(4..24);
        let height = rng.random_range(4..24);
        let color = (0..width * height)
            .map(|_| std::array::from_fn(|_| rng.random::<Cost>()))
            .collect::<Vec<[Cost; COLOR_DIM]>>();
        let labels = (0..width * height)
            .map(|_| match rng.random_range(0..10) {
                0 => IGNORE,
                _ => rng.random_range(0..classes as Label),
            })
            .collect();
        (
            FeatureImage::from_color(width, height, &color).unwrap(),
            LabelImage::from_vec(width, height, labels).unwrap(),
        )
    }

    #[test]
    fn single_class_converges_in_one_round() {
        let ref w = weights(2);
        let color = [[0.1, 0.2, 0.3], [0.3, 0.2, 0.1], [0.5, 0.5, 0.5], [0.0, 0.9, 0.4]];
        let ref x = FeatureImage::from_color(2, 2, &color).unwrap();
        let ref l = LabelImage::new(2, 2, 1);
        let mut clusterer = Clusterer::new(w);
        let stats = clusterer.run(1, 2, x, l);
        assert_eq!(stats.sweeps, 1);
        assert_eq!(stats.moves, 0);
        assert_eq!(stats.empty, 0);
        assert_eq!(clusterer.phase(), Phase::Converged);
        assert_eq!(clusterer.clusters()[0].label(), 1);
        assert_eq!(clusterer.clusters()[0].size(), 4);
    }

    #[test]
    fn sweeps_preserve_totals() {
        let classes = 3;
        let ref w = weights(classes);
        for seed in 0..8 {
            let (ref x, ref l) = image(classes, seed);
            let mut clusterer = Clusterer::new(w);
            clusterer.run(7, classes, x, l);
            let clusters = clusterer.clusters();
            let size = clusters.iter().map(|c| c.size()).sum::<usize>();
            let accum = clusters.iter().map(|c| *c.accum()).sum::<Feature>();
            let total = x.features().sum::<Feature>();
            let voted = clusters.iter().flat_map(|c| c.frequencies()).sum::<usize>();
            assert_eq!(size, x.pixels());
            assert_eq!(voted, l.valid(classes));
            for i in 0..FEATURE_DIM {
                assert!((accum[i] - total[i]).abs() < 1e-2, "{} != {}", accum, total);
            }
            for (k, cluster) in clusters.iter().enumerate() {
                let members = clusterer.clustership().iter().filter(|&c| c as usize == k).count();
                assert_eq!(members, cluster.size());
            }
        }
    }

    #[test]
    fn sweep_cap_bounds_iteration() {
        let ref w = weights(3);
        let (ref x, ref l) = image(3, 42);
        let config = ClustererConfig {
            convergence: 0.,
            max_sweeps: 3,
            ..ClustererConfig::default()
        };
        let stats = Clusterer::with_config(w, config).run(12, 3, x, l);
        assert!(stats.sweeps >= 1);
        assert!(stats.sweeps <= 3);
        let stats = Clusterer::new(w).run(12, 3, x, l);
        assert!(stats.sweeps <= CLUSTER_MAX_SWEEPS);
    }

    #[test]
    fn same_seed_same_clustering() {
        let ref w = weights(4);
        let (ref x, ref l) = image(4, 7);
        let mut a = Clusterer::new(w);
        let mut b = Clusterer::new(w);
        assert_eq!(a.run(9, 4, x, l), b.run(9, 4, x, l));
        assert_eq!(a.clustership(), b.clustership());
    }

    #[test]
    fn warm_start_keeps_prototypes() {
        let ref w = weights(2);
        let (ref x, ref l) = image(2, 3);
        let mut clusterer = Clusterer::new(w);
        clusterer.run(6, 2, x, l);
        let before = clusterer.clusters().to_vec();
        clusterer.init(x, l);
        for (old, new) in before.iter().zip(clusterer.clusters()) {
            assert!(new.is_empty());
            assert_eq!(new.accum(), &Feature::zero());
            if !old.is_empty() {
                assert_eq!(old.mean(), new.mean());
                assert_eq!(old.label(), new.label());
            }
        }
    }

    #[test]
    fn rerun_keeps_label_of_populated_cluster() {
        let ref w = weights(2);
        let ref a = FeatureImage::from_color(2, 1, &[[0.2; COLOR_DIM], [0.4; COLOR_DIM]]).unwrap();
        let ref b = FeatureImage::from_color(1, 1, &[[5.; COLOR_DIM]]).unwrap();
        let mut clusterer = Clusterer::new(w);
        clusterer.run(1, 2, a, &LabelImage::new(2, 1, 1));
        assert_eq!(clusterer.clusters()[0].label(), 1);
        // unlabeled pixels never vote, so only a carried prototype keeps label 1
        clusterer.run(1, 2, b, &LabelImage::new(1, 1, IGNORE));
        let cluster = &clusterer.clusters()[0];
        assert_eq!(cluster.label(), 1);
        assert_eq!(cluster.size(), 1);
        assert_eq!(cluster.mean(), &b.feature(0));
    }

    #[test]
    fn rerun_reseeds_only_empty_clusters() {
        let ref w = weights(2);
        let ref a = FeatureImage::from_color(2, 1, &[[0.; COLOR_DIM], [1.; COLOR_DIM]]).unwrap();
        let ref b = FeatureImage::from_color(1, 1, &[[5.; COLOR_DIM]]).unwrap();
        let mut clusterer = Clusterer::new(w);
        clusterer.run(5, 2, a, &LabelImage::from_vec(2, 1, vec![0, 1]).unwrap());
        let before = clusterer.clusters().to_vec();
        assert!(before.iter().any(|c| c.is_empty()));
        clusterer.run(5, 2, b, &LabelImage::new(1, 1, IGNORE));
        for (old, new) in before.iter().zip(clusterer.clusters()) {
            if old.is_empty() {
                assert!(new.is_empty() || new.size() == 1);
                assert_eq!(new.mean(), &b.feature(0));
            } else {
                assert!(new.is_empty());
                assert_eq!(new.mean(), old.mean());
                assert_eq!(new.label(), old.label());
            }
        }
        assert_eq!(clusterer.clusters().iter().map(|c| c.size()).sum::<usize>(), 1);
    }

    #[test]
    fn surplus_clusters_stay_empty() {
        let ref w = weights(2);
        let ref x = FeatureImage::from_color(2, 1, &[[0.; COLOR_DIM], [1.; COLOR_DIM]]).unwrap();
        let ref l = LabelImage::from_vec(2, 1, vec![0, 1]).unwrap();
        let mut clusterer = Clusterer::new(w);
        let stats = clusterer.run(5, 2, x, l);
        assert!(stats.empty >= 3);
        assert_eq!(stats.empty, clusterer.empty());
        assert_eq!(clusterer.clusters().len(), 5);
    }

    #[test]
    fn empty_image_is_trivially_converged() {
        let ref w = weights(2);
        let ref x = FeatureImage::from_vec(0, 0, vec![]).unwrap();
        let ref l = LabelImage::new(0, 0, 0);
        let mut clusterer = Clusterer::new(w);
        let stats = clusterer.run(3, 2, x, l);
        assert_eq!(stats.sweeps, 0);
        assert_eq!(stats.empty, 3);
        assert_eq!(clusterer.phase(), Phase::Converged);
    }

    #[test]
    fn label_penalty_flavors() {
        let distance = ClassDistance::from_vec(3, vec![0., 0.5, 2., 0.5, 0., 1., 2., 1., 0.]).unwrap();
        let ref w = weights(3).with_distance(distance);
        let f = Feature::from([0.2, 0.4, 0.6, 0.5, 0.5]);
        let mut cluster = Cluster::new(3);
        cluster.seed(f, 0);
        let fixed = ClustererConfig {
            gamma: 10.,
            penalty: LabelPenalty::Fixed,
            ..ClustererConfig::default()
        };
        let scaled = ClustererConfig {
            penalty: LabelPenalty::ClassDistance,
            ..fixed
        };
        let mut a = Clusterer::with_config(w, fixed);
        let mut b = Clusterer::with_config(w, scaled);
        a.clusters = vec![cluster.clone()];
        b.clusters = vec![cluster.clone()];
        assert_eq!(a.distance(&f, 0, 0), 0.);
        assert_eq!(a.distance(&f, 2, 0), 10.);
        assert_eq!(b.distance(&f, 2, 0), 20.);
        assert_eq!(b.distance(&f, 1, 0), 5.);
        assert_eq!(a.distance(&f, IGNORE, 0), 0.);
        cluster.seed(f, IGNORE);
        b.clusters = vec![cluster];
        assert_eq!(b.distance(&f, 2, 0), 10.);
    }

    #[test]
    fn euclidean_ignores_off_diagonal() {
        let mut m = SimilarityMatrix::diagonal([1., 2., 3., 4., 5.]);
        m.set(0, 1, 7.);
        let ref w = Weights::zeros(2).with_similarity(m);
        let config = ClustererConfig {
            metric: FeatureMetric::Euclidean,
            ..ClustererConfig::default()
        };
        let mut clusterer = Clusterer::with_config(w, config);
        clusterer.clusters = vec![Cluster::new(2)];
        clusterer.clusters[0].seed(Feature::zero(), 0);
        let f = Feature::from([1.; FEATURE_DIM]);
        assert_eq!(clusterer.distance(&f, 0, 0), 15.);
        clusterer.config.metric = FeatureMetric::Quadratic;
        assert_eq!(clusterer.distance(&f, 0, 0), 29.);
    }

    #[test]
    fn cluster_label_minimizes_class_distance() {
        let distance = ClassDistance::from_vec(3, vec![0., 1., 10., 1., 0., 1., 10., 1., 0.]).unwrap();
        let ref w = Weights::zeros(3).with_distance(distance);
        let ref x = FeatureImage::from_color(2, 2, &[[0.5; COLOR_DIM]; 4]).unwrap();
        let ref l = LabelImage::from_vec(2, 2, vec![0, 0, 1, 2]).unwrap();
        let config = ClustererConfig {
            gamma: 0.,
            ..ClustererConfig::default()
        };
        let mut clusterer = Clusterer::with_config(w, config);
        clusterer.run(1, 3, x, l);
        assert_eq!(clusterer.clusters()[0].frequencies(), &[2, 1, 1]);
        assert_eq!(clusterer.clusters()[0].label(), 1);
    }
}
