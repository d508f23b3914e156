use super::*;
use hseg_model::*;

/// The plain linear model energy.
#[derive(Debug, Clone, Copy)]
pub struct StandardEnergy<'w> {
    weights: &'w Weights,
    neighborhood: Neighborhood,
}

impl<'w> StandardEnergy<'w> {
    pub fn new(weights: &'w Weights) -> Self {
        Self {
            weights,
            neighborhood: Neighborhood::default(),
        }
    }
    pub fn with_neighborhood(mut self, neighborhood: Neighborhood) -> Self {
        self.neighborhood = neighborhood;
        self
    }
}

impl<'w> From<&'w Weights> for StandardEnergy<'w> {
    fn from(weights: &'w Weights) -> Self {
        Self::new(weights)
    }
}

impl EnergyFunction for StandardEnergy<'_> {
    fn weights(&self) -> &Weights {
        self.weights
    }
    fn neighborhood(&self) -> Neighborhood {
        self.neighborhood
    }
}
