use super::*;
use hseg_core::*;
use hseg_model::*;

/// Energy for margin-rescaled structured training.
///
/// Subtracts a margin from every unary cost whose label disagrees with the
/// ground truth, which steers inference toward the most violating labeling.
/// The per-pixel margin is a flat `LOSS_BUDGET / #valid ground-truth pixels`,
/// so the loss an image can contribute is bounded regardless of its size.
///
/// Pixels without a valid ground-truth label carry no margin.
#[derive(Debug, Clone, Copy)]
pub struct LossAugmentedEnergy<'w> {
    base: StandardEnergy<'w>,
    truth: &'w LabelImage,
    factor: Cost,
}

impl<'w> LossAugmentedEnergy<'w> {
    pub fn new(weights: &'w Weights, truth: &'w LabelImage) -> Self {
        Self::with_budget(weights, truth, LOSS_BUDGET)
    }
    pub fn with_budget(weights: &'w Weights, truth: &'w LabelImage, budget: Cost) -> Self {
        let count = truth.valid(weights.classes());
        let factor = if count > 0 { budget / count as Cost } else { 0. };
        log::debug!("{:<32}{:<32}", "loss factor", factor);
        Self {
            base: StandardEnergy::new(weights),
            truth,
            factor,
        }
    }
    pub fn with_neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.base = self.base.with_neighborhood(neighborhood);
        self
    }
    pub fn truth(&self) -> &LabelImage {
        self.truth
    }
    /// margin per disagreeing pixel
    pub fn factor(&self) -> Cost {
        self.factor
    }
    /// margin subtracted from the unary cost of label `l` at `site`
    pub fn margin(&self, site: SiteId, l: Label) -> Cost {
        let truth = self.truth.at(site);
        if truth == l || !self.valid(truth) || !self.valid(l) {
            0.
        } else {
            self.factor
        }
    }
    /// total margin of a labeling, i.e. its rescaled loss against the truth.
    /// `give_energy == weights · give_energy_by_weight - loss`.
    pub fn loss(&self, labeling: &LabelImage) -> Cost {
        debug_assert!(labeling.aligned(self.truth));
        labeling
            .iter()
            .enumerate()
            .map(|(site, l)| self.margin(site, l))
            .sum()
    }
}

impl EnergyFunction for LossAugmentedEnergy<'_> {
    fn weights(&self) -> &Weights {
        self.base.weights()
    }
    fn neighborhood(&self) -> Neighborhood {
        self.base.neighborhood()
    }
    fn unary_cost(&self, site: SiteId, f: &Feature, l: Label) -> Cost {
        self.base.unary_cost(site, f, l) - self.margin(site, l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> FeatureImage {
        let color = (0..4).map(|i| [i as Cost * 0.25, 0.5, 0.1]).collect::<Vec<_>>();
        FeatureImage::from_color(2, 2, &color).unwrap()
    }

    #[test]
    fn matching_truth_leaves_unary_unchanged() {
        let ref w = Weights::random();
        let ref truth = LabelImage::from_vec(2, 2, vec![0, 1, 0, IGNORE]).unwrap();
        let augmented = LossAugmentedEnergy::new(w, truth);
        let standard = StandardEnergy::new(w);
        let ref x = features();
        for site in 0..3 {
            let l = truth.at(site);
            let f = x.feature(site);
            assert_eq!(augmented.unary_cost(site, &f, l), standard.unary_cost(site, &f, l));
        }
        // ignored truth: no margin for any label
        for l in 0..w.classes() as Label {
            let f = x.feature(3);
            assert_eq!(augmented.unary_cost(3, &f, l), standard.unary_cost(3, &f, l));
        }
    }

    #[test]
    fn factor_spreads_budget_over_valid_pixels() {
        let ref w = Weights::zeros(2);
        let ref truth = LabelImage::from_vec(2, 2, vec![0, 1, IGNORE, 1]).unwrap();
        let augmented = LossAugmentedEnergy::with_budget(w, truth, 300.);
        assert_eq!(augmented.factor(), 100.);
        let ref labeling = LabelImage::from_vec(2, 2, vec![1, 0, 0, 1]).unwrap();
        assert_eq!(augmented.loss(labeling), 200.);
    }

    #[test]
    fn margin_ignores_class_distance() {
        let distance = ClassDistance::from_vec(3, vec![0., 3., 7., 3., 0., 5., 7., 5., 0.]).unwrap();
        let ref w = Weights::zeros(3).with_distance(distance);
        let ref truth = LabelImage::from_vec(2, 1, vec![0, 2]).unwrap();
        let augmented = LossAugmentedEnergy::with_budget(w, truth, 2.);
        assert_eq!(augmented.factor(), 1.);
        assert_eq!(augmented.margin(0, 1), 1.);
        assert_eq!(augmented.margin(0, 2), 1.);
        assert_eq!(augmented.margin(1, 0), 1.);
        assert_eq!(augmented.margin(1, 2), 0.);
        let ref labeling = LabelImage::from_vec(2, 1, vec![2, 1]).unwrap();
        assert_eq!(augmented.loss(labeling), 2.);
    }

    #[test]
    fn no_valid_truth_means_no_margin() {
        let ref w = Weights::zeros(2);
        let ref truth = LabelImage::new(2, 2, IGNORE);
        let augmented = LossAugmentedEnergy::new(w, truth);
        assert_eq!(augmented.factor(), 0.);
        assert_eq!(augmented.margin(0, 1), 0.);
    }

    #[test]
    fn energy_is_linear_energy_minus_loss() {
        let ref w = Weights::random();
        let ref x = features();
        let ref truth = LabelImage::from_vec(2, 2, vec![0, 1, 1, 0]).unwrap();
        let ref labeling = LabelImage::from_vec(2, 2, vec![0, 0, 1, 1]).unwrap();
        let ref clustering = ClusterImage::new(2, 2, 0);
        let mut cluster = Cluster::new(w.classes());
        (0..4).for_each(|i| cluster.join(&x.feature(i), labeling.at(i), w.distance()));
        let ref clusters = vec![cluster];
        let augmented = LossAugmentedEnergy::with_budget(w, truth, 8.);
        let phi = augmented.give_energy_by_weight(x, labeling, clustering, clusters);
        let scalar = augmented.give_energy(x, labeling, clustering, clusters);
        let expected = w.dot(&phi) - augmented.loss(labeling);
        assert_eq!(augmented.loss(labeling), 4.);
        assert!((scalar - expected).abs() < 1e-3, "{} != {}", scalar, expected);
    }

    #[test]
    fn swapped_truth_inverts_margin() {
        let ref w = Weights::filled(2, 0.3, -0.2, 0.1, 1.);
        let ref x = features();
        let ref a = LabelImage::from_vec(2, 2, vec![0, 1, 0, 1]).unwrap();
        let ref b = LabelImage::from_vec(2, 2, vec![1, 0, 1, 0]).unwrap();
        let ref clustering = ClusterImage::new(2, 2, 0);
        let ref clusters = vec![Cluster::new(2)];
        let ea = LossAugmentedEnergy::with_budget(w, a, 4.);
        let eb = LossAugmentedEnergy::with_budget(w, b, 4.);
        // the linear decomposition ignores the ground truth entirely
        let pa = ea.give_energy_by_weight(x, a, clustering, clusters);
        let pb = eb.give_energy_by_weight(x, a, clustering, clusters);
        assert_eq!(pa, pb);
        // exactly one of the two truths penalizes each candidate label
        let base = StandardEnergy::new(w);
        for site in 0..4 {
            let f = x.feature(site);
            for l in 0..2 {
                let da = ea.unary_cost(site, &f, l) - base.unary_cost(site, &f, l);
                let db = eb.unary_cost(site, &f, l) - base.unary_cost(site, &f, l);
                assert!(da == 0. || db == 0.);
                assert!((da.min(db) + ea.factor()).abs() < 1e-5);
            }
        }
    }
}
