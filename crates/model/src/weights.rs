use super::*;
use anyhow::Context;
use hseg_core::*;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Mul;
use std::ops::MulAssign;
use std::ops::Sub;
use std::ops::SubAssign;

/// Length of a unary row: one weight per feature entry plus a bias.
pub const UNARY_ROW: usize = FEATURE_DIM + 1;
/// Length of a pairwise or higher-order row: two concatenated features plus a bias.
pub const PAIR_ROW: usize = 2 * FEATURE_DIM + 1;

/// The partitioned parameter vector of the energy function.
///
/// # Blocks
///
/// - `unary` — per class, `w·f + b`
/// - `pairwise` — per (class, class) of adjacent pixels, `w·[f1; f2] + b`
/// - `higher` — per (pixel class, cluster class), `w·[fp; fc] + b`
/// - `similarity` — the quadratic feature-distance matrix M
/// - `distance` — class distances for cluster labels and loss scaling
///
/// # Linearity
///
/// The first four blocks form the learnable vector: every energy term is
/// linear in them, so an energy can be written `weights · φ` where φ is
/// another `Weights` produced by summing per-term partial derivatives.
/// Vector-space operations act on those four blocks; `distance` is
/// structural and is carried over from the left operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Weights {
    classes: usize,
    unary: Vec<Cost>,
    pairwise: Vec<Cost>,
    higher: Vec<Cost>,
    similarity: SimilarityMatrix,
    distance: ClassDistance,
}

impl Weights {
    /// all-zero parameters with a Potts class distance
    pub fn zeros(classes: usize) -> Self {
        Self {
            classes,
            unary: vec![0.; classes * UNARY_ROW],
            pairwise: vec![0.; classes * classes * PAIR_ROW],
            higher: vec![0.; classes * classes * PAIR_ROW],
            similarity: SimilarityMatrix::zero(),
            distance: ClassDistance::potts(classes),
        }
    }
    /// every entry of each block set to one scalar; the similarity
    /// matrix becomes `feature` times identity
    pub fn filled(classes: usize, unary: Cost, pairwise: Cost, higher: Cost, feature: Cost) -> Self {
        let mut weights = Self::zeros(classes);
        weights.unary.fill(unary);
        weights.pairwise.fill(pairwise);
        weights.higher.fill(higher);
        weights.similarity = SimilarityMatrix::diagonal([feature; FEATURE_DIM]);
        weights
    }
    pub fn classes(&self) -> usize {
        self.classes
    }
    /// number of learnable parameters
    pub fn len(&self) -> usize {
        self.unary.len() + self.pairwise.len() + self.higher.len() + FEATURE_DIM * FEATURE_DIM
    }
    pub fn is_empty(&self) -> bool {
        self.classes == 0
    }

    pub fn unary(&self, l: Label) -> &[Cost] {
        let i = l as usize * UNARY_ROW;
        &self.unary[i..i + UNARY_ROW]
    }
    pub fn pairwise(&self, l1: Label, l2: Label) -> &[Cost] {
        let i = self.pair(l1, l2);
        &self.pairwise[i..i + PAIR_ROW]
    }
    pub fn higher_order(&self, lp: Label, lc: Label) -> &[Cost] {
        let i = self.pair(lp, lc);
        &self.higher[i..i + PAIR_ROW]
    }
    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }
    pub fn distance(&self) -> &ClassDistance {
        &self.distance
    }
    pub fn unary_mut(&mut self, l: Label) -> &mut [Cost] {
        let i = l as usize * UNARY_ROW;
        &mut self.unary[i..i + UNARY_ROW]
    }
    pub fn pairwise_mut(&mut self, l1: Label, l2: Label) -> &mut [Cost] {
        let i = self.pair(l1, l2);
        &mut self.pairwise[i..i + PAIR_ROW]
    }
    pub fn higher_order_mut(&mut self, lp: Label, lc: Label) -> &mut [Cost] {
        let i = self.pair(lp, lc);
        &mut self.higher[i..i + PAIR_ROW]
    }
    pub fn with_similarity(mut self, similarity: SimilarityMatrix) -> Self {
        self.similarity = similarity;
        self
    }
    pub fn with_distance(mut self, distance: ClassDistance) -> Self {
        assert_eq!(distance.classes(), self.classes, "class distance size");
        self.distance = distance;
        self
    }
    fn pair(&self, a: Label, b: Label) -> usize {
        (a as usize * self.classes + b as usize) * PAIR_ROW
    }
}

/// evaluation of single rows
impl Weights {
    /// `w·f + b` over a unary row
    pub fn affine(row: &[Cost], f: &Feature) -> Cost {
        f.project(row) + row[FEATURE_DIM]
    }
    /// `w·[f1; f2] + b` over a pairwise or higher-order row
    pub fn bilinear(row: &[Cost], f1: &Feature, f2: &Feature) -> Cost {
        f1.project(&row[..FEATURE_DIM])
            + f2.project(&row[FEATURE_DIM..2 * FEATURE_DIM])
            + row[2 * FEATURE_DIM]
    }
}

/// accumulation of partial derivatives, used to build energy decompositions
impl Weights {
    pub fn add_unary(&mut self, l: Label, f: &Feature) {
        let row = self.unary_mut(l);
        row.iter_mut().zip(f.values()).for_each(|(w, x)| *w += x);
        row[FEATURE_DIM] += 1.;
    }
    pub fn add_pairwise(&mut self, l1: Label, l2: Label, f1: &Feature, f2: &Feature) {
        Self::accumulate(self.pairwise_mut(l1, l2), f1, f2);
    }
    pub fn add_higher_order(&mut self, lp: Label, lc: Label, fp: &Feature, fc: &Feature) {
        Self::accumulate(self.higher_order_mut(lp, lc), fp, fc);
    }
    pub fn add_similarity(&mut self, d: &Feature) {
        self.similarity.outer(d);
    }
    fn accumulate(row: &mut [Cost], f1: &Feature, f2: &Feature) {
        row[..FEATURE_DIM]
            .iter_mut()
            .zip(f1.values())
            .for_each(|(w, x)| *w += x);
        row[FEATURE_DIM..2 * FEATURE_DIM]
            .iter_mut()
            .zip(f2.values())
            .for_each(|(w, x)| *w += x);
        row[2 * FEATURE_DIM] += 1.;
    }
}

/// vector-space structure over the learnable blocks
impl Weights {
    pub fn dot(&self, other: &Self) -> Cost {
        assert_eq!(self.classes, other.classes, "mismatched weight classes");
        self.params().zip(other.params()).map(|(a, b)| a * b).sum()
    }
    pub fn norm2(&self) -> Cost {
        self.dot(self)
    }
    pub fn params(&self) -> impl Iterator<Item = Cost> + '_ {
        self.unary
            .iter()
            .chain(self.pairwise.iter())
            .chain(self.higher.iter())
            .copied()
            .chain(self.similarity.values())
    }
    fn params_mut(&mut self) -> impl Iterator<Item = &mut Cost> + '_ {
        self.unary
            .iter_mut()
            .chain(self.pairwise.iter_mut())
            .chain(self.higher.iter_mut())
            .chain(self.similarity.values_mut())
    }
    /// learnable parameter count for `classes`, None if it cannot be addressed
    fn count(classes: u64) -> Option<u64> {
        let pairs = classes.checked_mul(classes)?.checked_mul(PAIR_ROW as u64)?;
        classes
            .checked_mul(UNARY_ROW as u64)?
            .checked_add(pairs.checked_mul(2)?)?
            .checked_add((FEATURE_DIM * FEATURE_DIM) as u64)
            .filter(|&n| usize::try_from(n).is_ok())
    }
    fn zip_with(&mut self, other: &Self, f: impl Fn(Cost, Cost) -> Cost) {
        assert_eq!(self.classes, other.classes, "mismatched weight classes");
        self.params_mut()
            .zip(other.params())
            .for_each(|(a, b)| *a = f(*a, b));
    }
}

impl AddAssign<&Weights> for Weights {
    fn add_assign(&mut self, rhs: &Weights) {
        self.zip_with(rhs, |a, b| a + b);
    }
}
impl SubAssign<&Weights> for Weights {
    fn sub_assign(&mut self, rhs: &Weights) {
        self.zip_with(rhs, |a, b| a - b);
    }
}
impl MulAssign<Cost> for Weights {
    fn mul_assign(&mut self, rhs: Cost) {
        self.params_mut().for_each(|a| *a *= rhs);
    }
}
impl Add<&Weights> for Weights {
    type Output = Weights;
    fn add(mut self, rhs: &Weights) -> Weights {
        self += rhs;
        self
    }
}
impl Sub<&Weights> for Weights {
    type Output = Weights;
    fn sub(mut self, rhs: &Weights) -> Weights {
        self -= rhs;
        self
    }
}
impl Mul<Cost> for Weights {
    type Output = Weights;
    fn mul(mut self, rhs: Cost) -> Weights {
        self *= rhs;
        self
    }
}

/// binary persistence: `b"WGHT"`, u32 classes, u32 dim, then the learnable
/// blocks as f32 in unary, pairwise, higher-order, similarity order.
/// The class distance is not persisted.
impl Weights {
    const MAGIC: &'static [u8; 4] = b"WGHT";

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use byteorder::LittleEndian;
        use byteorder::WriteBytesExt;
        use std::io::Write;
        log::debug!("{:<32}{:<32}", "saving weights", path.display());
        let file = std::fs::File::create(path)
            .with_context(|| format!("create weights file {}", path.display()))?;
        let ref mut file = std::io::BufWriter::new(file);
        file.write_all(Self::MAGIC)?;
        file.write_u32::<LittleEndian>(self.classes as u32)?;
        file.write_u32::<LittleEndian>(FEATURE_DIM as u32)?;
        for value in self.params() {
            file.write_f32::<LittleEndian>(value)?;
        }
        file.flush()?;
        Ok(())
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use byteorder::LittleEndian;
        use byteorder::ReadBytesExt;
        use std::io::Read;
        log::debug!("{:<32}{:<32}", "loading weights", path.display());
        let file = std::fs::File::open(path)
            .with_context(|| format!("open weights file {}", path.display()))?;
        let ref mut file = std::io::BufReader::new(file);
        let ref mut magic = [0u8; 4];
        file.read_exact(magic)?;
        anyhow::ensure!(magic == Self::MAGIC, "bad weights magic in {}", path.display());
        let classes = file.read_u32::<LittleEndian>()? as usize;
        let dim = file.read_u32::<LittleEndian>()? as usize;
        anyhow::ensure!(dim == FEATURE_DIM, "weights for feature dim {} != {}", dim, FEATURE_DIM);
        crate::payload::ensure_payload(path, 12, Self::count(classes as u64), 4)?;
        let mut weights = Self::zeros(classes);
        for value in weights.params_mut() {
            *value = file
                .read_f32::<LittleEndian>()
                .with_context(|| format!("truncated weights file {}", path.display()))?;
        }
        anyhow::ensure!(
            weights.similarity.is_symmetric(),
            "similarity block in {} is not symmetric",
            path.display()
        );
        Ok(weights)
    }
}

impl Arbitrary for Weights {
    fn random() -> Self {
        use rand::Rng;
        let ref mut rng = rand::rng();
        let classes = rng.random_range(2..5);
        let mut weights = Self::zeros(classes);
        weights
            .unary
            .iter_mut()
            .chain(weights.pairwise.iter_mut())
            .chain(weights.higher.iter_mut())
            .for_each(|w| *w = rng.random_range(-1.0..1.0));
        weights.similarity = SimilarityMatrix::diagonal(std::array::from_fn(|_| rng.random_range(0.1..2.0)));
        weights
    }
}

impl std::fmt::Display for Weights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let norm = |xs: &[Cost]| xs.iter().map(|x| x * x).sum::<Cost>().sqrt();
        writeln!(f, "{:<16}{}", "classes", self.classes)?;
        writeln!(f, "{:<16}{:.6}", "|unary|", norm(&self.unary))?;
        writeln!(f, "{:<16}{:.6}", "|pairwise|", norm(&self.pairwise))?;
        writeln!(f, "{:<16}{:.6}", "|higher-order|", norm(&self.higher))?;
        write!(f, "{:<16}{:.6}", "|similarity|", self.similarity.dot(&self.similarity).sqrt())
    }
}
