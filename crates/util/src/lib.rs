//! Core type aliases, traits, and constants for hseg.
//!
//! This crate provides the foundational types and tuning parameters
//! used throughout the hseg workspace.

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Energies, distances, scores, and weights.
pub type Cost = f32;
/// Semantic class label. Any value `>= classes` is ignored by every energy term.
pub type Label = u16;
/// Superpixel index into a cluster arena.
pub type ClusterId = u32;
/// Linear pixel index, `x + y * width`.
pub type SiteId = usize;
/// Image coordinate.
pub type Coord = u32;

/// Canonical "ignore this pixel" label.
pub const IGNORE: Label = Label::MAX;

// ============================================================================
// TRAITS
// ============================================================================
/// Random instance generation for testing and benchmarking.
pub trait Arbitrary {
    /// Generate a uniformly random instance.
    fn random() -> Self;
}

// ============================================================================
// FEATURE SPACE
// ============================================================================
/// Feature dimension: three color channels followed by normalized (x, y).
pub const FEATURE_DIM: usize = 5;
/// Number of color channels at the head of every feature.
pub const COLOR_DIM: usize = 3;

// ============================================================================
// K-PROTOTYPES CLUSTERING
// Joint color/position/label superpixel clustering.
// ============================================================================
/// Mixing coefficient between feature distance and label disagreement.
pub const CLUSTER_GAMMA: Cost = 5000.;
/// Sweeps stop once the move count changes by at most this fraction of the pixels.
pub const CLUSTER_CONVERGENCE: Cost = 0.001;
/// Hard cap on reallocation sweeps per clustering run.
pub const CLUSTER_MAX_SWEEPS: usize = 256;
/// Default superpixel count per image.
pub const CLUSTER_COUNT: usize = 300;
/// Seed for prototype sampling.
pub const CLUSTER_SEED: u64 = 0x5EED;

// ============================================================================
// ALTERNATING INFERENCE
// ============================================================================
/// Maximum label-step/cluster-step rounds.
pub const INFERENCE_ITERATIONS: usize = 100;
/// Minimum energy improvement between rounds to keep iterating.
pub const INFERENCE_EPSILON: Cost = 1e-3;
/// Maximum sweeps of the reference ICM labeling solver.
pub const ICM_MAX_SWEEPS: usize = 64;

// ============================================================================
// LOSS AUGMENTATION
// Margin-rescaled structured training. The total loss an image can contribute
// is bounded by the budget, independent of its pixel count.
// ============================================================================
/// Total loss budget distributed across the valid ground-truth pixels.
pub const LOSS_BUDGET: Cost = 1e8;

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
#[cfg(feature = "server")]
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// True if the label addresses one of `classes` classes.
pub fn valid(label: Label, classes: usize) -> bool {
    (label as usize) < classes
}
