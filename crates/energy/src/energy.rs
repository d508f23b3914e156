use super::*;
use hseg_core::*;
use hseg_model::*;

/// Evaluates and decomposes the energy of a (features, labeling, clustering)
/// configuration against borrowed [`Weights`].
///
/// Implementors supply the weights; everything else has a default. The one
/// intended override point is [`EnergyFunction::unary_cost`], which is what
/// the labeling solver and [`EnergyFunction::give_energy`] consult, so a
/// variant that reshapes the unary term (see [`LossAugmentedEnergy`]) changes
/// inference without touching the linear model.
///
/// Pixels whose label is not one of the weights' classes contribute nothing
/// to any term.
pub trait EnergyFunction: Sync {
    fn weights(&self) -> &Weights;

    fn neighborhood(&self) -> Neighborhood {
        Neighborhood::Four
    }
    fn classes(&self) -> usize {
        self.weights().classes()
    }
    fn valid(&self, l: Label) -> bool {
        valid(l, self.classes())
    }

    /// cost of assigning class `l` to pixel `site`
    fn unary_cost(&self, site: SiteId, f: &Feature, l: Label) -> Cost {
        let _ = site;
        self.linear_unary_cost(f, l)
    }
    /// `w_u[l]·f + b_u[l]`, the unary term of the linear model
    fn linear_unary_cost(&self, f: &Feature, l: Label) -> Cost {
        if self.valid(l) {
            Weights::affine(self.weights().unary(l), f)
        } else {
            0.
        }
    }
    /// cost of labels `l1`, `l2` on adjacent pixels
    fn pairwise_cost(&self, f1: &Feature, f2: &Feature, l1: Label, l2: Label) -> Cost {
        if self.valid(l1) && self.valid(l2) {
            Weights::bilinear(self.weights().pairwise(l1, l2), f1, f2)
        } else {
            0.
        }
    }
    /// cost of a pixel labeled `lp` belonging to a cluster labeled `lc`
    fn higher_order_cost(&self, fp: &Feature, fc: &Feature, lp: Label, lc: Label) -> Cost {
        if self.valid(lp) && self.valid(lc) {
            Weights::bilinear(self.weights().higher_order(lp, lc), fp, fc)
        } else {
            0.
        }
    }
    /// `(f1 - f2)ᵀ M (f1 - f2)`
    fn feature_cost(&self, f1: &Feature, f2: &Feature) -> Cost {
        self.weights().similarity().quadratic(&(*f1 - *f2))
    }

    /// Enumerate every energy term of a configuration.
    ///
    /// A pixel contributes a unary term if its label is valid, plus a
    /// higher-order term and a feature term against its cluster if that
    /// cluster is non-empty (the higher-order term also needs a valid cluster
    /// label). Each neighborhood edge between two valid pixels contributes a
    /// pairwise term.
    fn visit<F, V>(
        &self,
        features: &F,
        labeling: &LabelImage,
        clustering: &ClusterImage,
        clusters: &[Cluster],
        mut visitor: V,
    ) where
        F: FeatureSource,
        V: FnMut(Term),
    {
        debug_assert!(features.aligned(labeling));
        debug_assert!(features.aligned(clustering));
        for site in 0..features.pixels() {
            let l = labeling.at(site);
            if !self.valid(l) {
                continue;
            }
            let f = features.feature(site);
            visitor(Term::Unary(site, f, l));
            match clusters.get(clustering.at(site) as usize) {
                Some(cluster) if !cluster.is_empty() => {
                    let mean = *cluster.mean();
                    if self.valid(cluster.label()) {
                        visitor(Term::HigherOrder(f, mean, l, cluster.label()));
                    }
                    visitor(Term::Similarity(f - mean));
                }
                _ => {}
            }
        }
        for (a, b) in self.neighborhood().edges(features.width(), features.height()) {
            let la = labeling.at(a);
            let lb = labeling.at(b);
            if self.valid(la) && self.valid(lb) {
                visitor(Term::Pairwise(features.feature(a), features.feature(b), la, lb));
            }
        }
    }

    /// energy per term family
    fn give_breakdown<F>(
        &self,
        features: &F,
        labeling: &LabelImage,
        clustering: &ClusterImage,
        clusters: &[Cluster],
    ) -> Breakdown
    where
        F: FeatureSource,
    {
        let mut breakdown = Breakdown::default();
        self.visit(features, labeling, clustering, clusters, |term| match term {
            Term::Unary(site, f, l) => breakdown.unary += self.unary_cost(site, &f, l),
            Term::Pairwise(f1, f2, l1, l2) => breakdown.pairwise += self.pairwise_cost(&f1, &f2, l1, l2),
            Term::HigherOrder(fp, fc, lp, lc) => breakdown.higher += self.higher_order_cost(&fp, &fc, lp, lc),
            Term::Similarity(d) => breakdown.feature += self.weights().similarity().quadratic(&d),
        });
        breakdown
    }

    /// total energy of a configuration
    fn give_energy<F>(
        &self,
        features: &F,
        labeling: &LabelImage,
        clustering: &ClusterImage,
        clusters: &[Cluster],
    ) -> Cost
    where
        F: FeatureSource,
    {
        self.give_breakdown(features, labeling, clustering, clusters)
            .total()
    }

    /// Energy decomposed by weight: the returned φ satisfies
    /// `weights · φ == linear energy` of the configuration. This is the
    /// quantity a structured learner differentiates.
    fn give_energy_by_weight<F>(
        &self,
        features: &F,
        labeling: &LabelImage,
        clustering: &ClusterImage,
        clusters: &[Cluster],
    ) -> Weights
    where
        F: FeatureSource,
    {
        let mut phi = Weights::zeros(self.classes());
        self.visit(features, labeling, clustering, clusters, |term| match term {
            Term::Unary(_, f, l) => phi.add_unary(l, &f),
            Term::Pairwise(f1, f2, l1, l2) => phi.add_pairwise(l1, l2, &f1, &f2),
            Term::HigherOrder(fp, fc, lp, lc) => phi.add_higher_order(lp, lc, &fp, &fc),
            Term::Similarity(d) => phi.add_similarity(&d),
        });
        phi
    }
}
