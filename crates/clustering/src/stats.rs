use hseg_core::*;

/// Outcome of one [`crate::Clusterer::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterStats {
    /// reallocation sweeps performed after the allocation sweep
    pub sweeps: usize,
    /// pixels that changed cluster during the last sweep
    pub moves: usize,
    /// clusters left without members
    pub empty: usize,
    /// clustering energy after the last sweep
    pub energy: Cost,
}

impl std::fmt::Display for ClusterStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "sweeps {:>4} moves {:>8} empty {:>4} energy {:>14.4}",
            self.sweeps, self.moves, self.empty, self.energy
        )
    }
}
