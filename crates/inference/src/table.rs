use hseg_core::*;

/// Per-site, per-label costs handed to a [`crate::Solver`]. Site-major.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryTable {
    classes: usize,
    data: Vec<Cost>,
}

impl UnaryTable {
    pub fn new(pixels: usize, classes: usize) -> Self {
        Self {
            classes,
            data: vec![0.; pixels * classes],
        }
    }
    pub fn pixels(&self) -> usize {
        self.data.len() / self.classes.max(1)
    }
    pub fn classes(&self) -> usize {
        self.classes
    }
    pub fn get(&self, site: SiteId, l: Label) -> Cost {
        self.data[site * self.classes + l as usize]
    }
    pub fn set(&mut self, site: SiteId, l: Label, cost: Cost) {
        self.data[site * self.classes + l as usize] = cost;
    }
    /// costs of every label at `site`
    pub fn row(&self, site: SiteId) -> &[Cost] {
        &self.data[site * self.classes..(site + 1) * self.classes]
    }
    /// cheapest label at `site`, first one on ties
    pub fn argmin(&self, site: SiteId) -> Label {
        self.row(site)
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(l, _)| l as Label)
            .unwrap_or(IGNORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_major_layout() {
        let mut table = UnaryTable::new(3, 2);
        table.set(1, 0, 5.);
        table.set(1, 1, -1.);
        assert_eq!(table.pixels(), 3);
        assert_eq!(table.row(1), &[5., -1.]);
        assert_eq!(table.argmin(1), 1);
        assert_eq!(table.argmin(0), 0);
    }

    #[test]
    fn no_classes_means_no_label() {
        let table = UnaryTable::new(4, 0);
        assert_eq!(table.argmin(2), IGNORE);
    }
}
