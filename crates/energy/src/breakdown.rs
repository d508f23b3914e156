use hseg_core::*;

/// Energy totals per term family.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Breakdown {
    pub unary: Cost,
    pub pairwise: Cost,
    pub higher: Cost,
    pub feature: Cost,
}

impl Breakdown {
    pub fn total(&self) -> Cost {
        self.unary + self.pairwise + self.higher + self.feature
    }
}

impl std::fmt::Display for Breakdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "total {:>14.4} unary {:>14.4} pairwise {:>14.4} higher {:>14.4} feature {:>14.4}",
            self.total(),
            self.unary,
            self.pairwise,
            self.higher,
            self.feature
        )
    }
}
