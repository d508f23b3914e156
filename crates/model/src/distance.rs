use hseg_core::*;

/// Distance between semantic classes.
///
/// Drives the choice of a cluster's dominant label and scales the margin in
/// loss-augmented inference. Not necessarily symmetric; the diagonal is
/// expected to be zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistance {
    classes: usize,
    data: Vec<Cost>,
}

impl ClassDistance {
    /// 0 on the diagonal, 1 everywhere else
    pub fn potts(classes: usize) -> Self {
        Self {
            classes,
            data: (0..classes * classes)
                .map(|i| if i / classes == i % classes { 0. } else { 1. })
                .collect(),
        }
    }
    pub fn from_vec(classes: usize, data: Vec<Cost>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            data.len() == classes * classes,
            "class distance for {} classes needs {} entries, got {}",
            classes,
            classes * classes,
            data.len()
        );
        Ok(Self { classes, data })
    }
    pub fn classes(&self) -> usize {
        self.classes
    }
    pub fn get(&self, a: Label, b: Label) -> Cost {
        self.data[a as usize * self.classes + b as usize]
    }
    pub fn set(&mut self, a: Label, b: Label, value: Cost) {
        self.data[a as usize * self.classes + b as usize] = value;
    }
    /// the label closest on average to a class histogram:
    /// argmin_l Σ_{l' != l} frequencies[l'] · d(l, l').
    /// ties resolve to the smallest label.
    pub fn closest(&self, frequencies: &[usize]) -> Label {
        debug_assert!(frequencies.len() == self.classes);
        (0..self.classes as Label)
            .map(|l| (l, self.spread(l, frequencies)))
            .min_by(|(_, a), (_, b)| a.partial_cmp(b).expect("finite class distance"))
            .map(|(l, _)| l)
            .unwrap_or(IGNORE)
    }
    fn spread(&self, l: Label, frequencies: &[usize]) -> Cost {
        frequencies
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != l as usize)
            .map(|(other, n)| *n as Cost * self.get(l, other as Label))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn potts_closest_is_majority() {
        let d = ClassDistance::potts(4);
        assert_eq!(d.closest(&[1, 5, 2, 0]), 1);
    }

    #[test]
    fn closest_is_not_majority_under_skewed_distance() {
        // class 2 sits "between" 0 and 1: cheap to both
        let d = ClassDistance::from_vec(3, vec![
            0., 10., 1., //
            10., 0., 1., //
            1., 1., 0., //
        ])
        .unwrap();
        assert_eq!(d.closest(&[3, 3, 1]), 2);
    }

    #[test]
    fn closest_is_deterministic() {
        let d = ClassDistance::potts(5);
        let h = [2, 2, 0, 2, 1];
        assert_eq!(d.closest(&h), d.closest(&h));
        assert_eq!(d.closest(&h), 0);
    }
}
