/// Lifecycle of a [`crate::Clusterer`] within one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    #[default]
    Uninitialized,
    /// prototypes seeded or carried over, no members yet
    Initialized,
    /// every pixel assigned by the allocation sweep
    Allocated,
    Iterating,
    Converged,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Initialized => write!(f, "initialized"),
            Self::Allocated => write!(f, "allocated"),
            Self::Iterating => write!(f, "iterating"),
            Self::Converged => write!(f, "converged"),
        }
    }
}
