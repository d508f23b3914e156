use super::*;
use hseg_core::*;

/// A superpixel prototype maintained incrementally as pixels join and leave.
///
/// # Invariants
///
/// - `mean == accum / size` whenever `size > 0`
/// - `frequencies` sums to the number of members with a valid label
/// - `label` reflects the last [`Cluster::update_label`]
///
/// When the last member leaves, the accumulators return to exactly zero and
/// the mean is retained as the prototype, so the cluster can still attract
/// pixels in later sweeps.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    size: usize,
    accum: Feature,
    mean: Feature,
    frequencies: Vec<usize>,
    label: Label,
}

impl Cluster {
    pub fn new(classes: usize) -> Self {
        Self {
            size: 0,
            accum: Feature::zero(),
            mean: Feature::zero(),
            frequencies: vec![0; classes],
            label: IGNORE,
        }
    }
    pub fn size(&self) -> usize {
        self.size
    }
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
    pub fn accum(&self) -> &Feature {
        &self.accum
    }
    pub fn mean(&self) -> &Feature {
        &self.mean
    }
    pub fn frequencies(&self) -> &[usize] {
        &self.frequencies
    }
    pub fn label(&self) -> Label {
        self.label
    }
    pub fn classes(&self) -> usize {
        self.frequencies.len()
    }

    /// place an empty prototype at a sampled pixel
    pub fn seed(&mut self, feature: Feature, label: Label) {
        self.reset();
        self.mean = feature;
        self.label = label;
    }
    /// clear membership but keep the prototype (mean, label)
    pub fn reset(&mut self) {
        self.size = 0;
        self.accum = Feature::zero();
        self.frequencies.iter_mut().for_each(|n| *n = 0);
    }

    pub fn join(&mut self, feature: &Feature, label: Label, distance: &ClassDistance) {
        self.size += 1;
        self.accum += *feature;
        if valid(label, self.classes()) {
            self.frequencies[label as usize] += 1;
        }
        self.update_mean();
        self.update_label(distance);
    }
    pub fn leave(&mut self, feature: &Feature, label: Label, distance: &ClassDistance) {
        debug_assert!(self.size > 0, "leaving an empty cluster");
        self.size -= 1;
        self.accum -= *feature;
        if valid(label, self.classes()) {
            debug_assert!(self.frequencies[label as usize] > 0);
            self.frequencies[label as usize] -= 1;
        }
        if self.size == 0 {
            self.accum = Feature::zero();
        }
        self.update_mean();
        self.update_label(distance);
    }

    pub fn update_mean(&mut self) {
        if self.size > 0 {
            self.mean = self.accum / self.size as Cost;
        }
    }
    /// the class closest on average to the member label histogram,
    /// not the majority class. unchanged while no member has a valid label.
    pub fn update_label(&mut self, distance: &ClassDistance) {
        if self.frequencies.iter().any(|&n| n > 0) {
            self.label = distance.closest(&self.frequencies);
        }
    }
}
