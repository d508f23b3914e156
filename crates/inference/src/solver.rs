use super::*;
use hseg_core::*;
use hseg_model::*;

/// Pairwise cost of two adjacent sites `a < b` labeled `la` and `lb`.
pub type PairwiseOracle<'a> = dyn Fn(SiteId, SiteId, Label, Label) -> Cost + 'a;

/// Discrete labeling given unary costs and a pairwise oracle.
///
/// Any move-making or message-passing minimizer fits behind this trait; the
/// inference loop only needs a labeling no worse than `init` in practice.
/// Sites whose `init` label is not one of `unaries.classes()` are left as-is.
pub trait Solver: Sync {
    fn solve(
        &self,
        unaries: &UnaryTable,
        pairwise: &PairwiseOracle,
        neighborhood: Neighborhood,
        width: Coord,
        height: Coord,
        init: &LabelImage,
    ) -> LabelImage;
}

/// Iterated conditional modes.
///
/// Greedily relabels one site at a time to its cheapest label given its
/// neighbors, sweeping until a full pass changes nothing. Never increases the
/// energy, and is a local minimizer only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Icm {
    pub max_sweeps: usize,
}

impl Default for Icm {
    fn default() -> Self {
        Self {
            max_sweeps: ICM_MAX_SWEEPS,
        }
    }
}

impl Icm {
    /// cost of label `l` at `site` given the current labels of its neighbors
    fn local(
        &self,
        site: SiteId,
        l: Label,
        unaries: &UnaryTable,
        pairwise: &PairwiseOracle,
        neighborhood: Neighborhood,
        labeling: &LabelImage,
    ) -> Cost {
        unaries.get(site, l)
            + neighborhood
                .around(site, labeling.width(), labeling.height())
                .map(|n| match n < site {
                    true => pairwise(n, site, labeling.at(n), l),
                    false => pairwise(site, n, l, labeling.at(n)),
                })
                .sum::<Cost>()
    }
}

impl Solver for Icm {
    fn solve(
        &self,
        unaries: &UnaryTable,
        pairwise: &PairwiseOracle,
        neighborhood: Neighborhood,
        width: Coord,
        height: Coord,
        init: &LabelImage,
    ) -> LabelImage {
        debug_assert_eq!(init.width(), width);
        debug_assert_eq!(init.height(), height);
        debug_assert_eq!(init.pixels(), unaries.pixels());
        let classes = unaries.classes();
        let mut labeling = init.clone();
        for sweep in 0..self.max_sweeps {
            let mut changes = 0;
            for site in 0..labeling.pixels() {
                let current = labeling.at(site);
                if !valid(current, classes) {
                    continue;
                }
                let stay = self.local(site, current, unaries, pairwise, neighborhood, &labeling);
                let (best, cost) = (0..classes as Label)
                    .map(|l| (l, self.local(site, l, unaries, pairwise, neighborhood, &labeling)))
                    .min_by(|(_, a), (_, b)| a.total_cmp(b))
                    .unwrap_or((current, stay));
                // ties keep the current label
                if cost < stay {
                    labeling.set(site, best);
                    changes += 1;
                }
            }
            log::trace!("{:<32}{:<32}", format!("icm sweep {:3}", sweep), changes);
            if changes == 0 {
                break;
            }
        }
        labeling
    }
}
