use super::*;
use anyhow::Context;
use hseg_core::*;

/// Symmetric FEATURE_DIM x FEATURE_DIM matrix M defining the quadratic
/// feature distance `(f1 - f2)ᵀ M (f1 - f2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityMatrix([[Cost; FEATURE_DIM]; FEATURE_DIM]);

impl SimilarityMatrix {
    pub const fn zero() -> Self {
        Self([[0.; FEATURE_DIM]; FEATURE_DIM])
    }
    pub fn identity() -> Self {
        Self::diagonal([1.; FEATURE_DIM])
    }
    pub fn diagonal(diag: [Cost; FEATURE_DIM]) -> Self {
        Self(std::array::from_fn(|i| {
            std::array::from_fn(|j| if i == j { diag[i] } else { 0. })
        }))
    }
    pub fn get(&self, i: usize, j: usize) -> Cost {
        self.0[i][j]
    }
    /// sets both (i, j) and (j, i)
    pub fn set(&mut self, i: usize, j: usize, value: Cost) {
        self.0[i][j] = value;
        self.0[j][i] = value;
    }
    /// dᵀ M d
    pub fn quadratic(&self, d: &Feature) -> Cost {
        (0..FEATURE_DIM)
            .map(|i| d[i] * (0..FEATURE_DIM).map(|j| self.0[i][j] * d[j]).sum::<Cost>())
            .sum()
    }
    /// accumulate the outer product d dᵀ, the partial derivative of dᵀ M d by M
    pub fn outer(&mut self, d: &Feature) {
        for i in 0..FEATURE_DIM {
            for j in 0..FEATURE_DIM {
                self.0[i][j] += d[i] * d[j];
            }
        }
    }
    pub fn dot(&self, other: &Self) -> Cost {
        self.values().zip(other.values()).map(|(a, b)| a * b).sum()
    }
    pub fn values(&self) -> impl Iterator<Item = Cost> + '_ {
        self.0.iter().flat_map(|row| row.iter().copied())
    }
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut Cost> + '_ {
        self.0.iter_mut().flat_map(|row| row.iter_mut())
    }
    pub fn is_symmetric(&self) -> bool {
        (0..FEATURE_DIM).all(|i| (0..FEATURE_DIM).all(|j| self.0[i][j] == self.0[j][i]))
    }
}

impl Default for SimilarityMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// binary persistence: `b"FSIM"`, u32 dim, then dim x dim f32 row-major.
impl SimilarityMatrix {
    const MAGIC: &'static [u8; 4] = b"FSIM";

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use byteorder::LittleEndian;
        use byteorder::WriteBytesExt;
        use std::io::Write;
        let ref mut file = std::fs::File::create(path)
            .with_context(|| format!("create similarity file {}", path.display()))?;
        file.write_all(Self::MAGIC)?;
        file.write_u32::<LittleEndian>(FEATURE_DIM as u32)?;
        for value in self.values() {
            file.write_f32::<LittleEndian>(value)?;
        }
        Ok(())
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use byteorder::LittleEndian;
        use byteorder::ReadBytesExt;
        use std::io::Read;
        let file = std::fs::File::open(path)
            .with_context(|| format!("open similarity file {}", path.display()))?;
        let ref mut file = std::io::BufReader::new(file);
        let ref mut magic = [0u8; 4];
        file.read_exact(magic)?;
        anyhow::ensure!(magic == Self::MAGIC, "bad similarity magic in {}", path.display());
        let dim = file.read_u32::<LittleEndian>()? as usize;
        anyhow::ensure!(dim == FEATURE_DIM, "similarity matrix of dim {} != {}", dim, FEATURE_DIM);
        let mut matrix = Self::zero();
        for value in matrix.values_mut() {
            *value = file.read_f32::<LittleEndian>()?;
        }
        anyhow::ensure!(matrix.is_symmetric(), "similarity matrix is not symmetric");
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_quadratic_is_squared_norm() {
        let d = Feature::from([1., 2., 0., -1., 3.]);
        assert_eq!(SimilarityMatrix::identity().quadratic(&d), d.norm2());
    }

    #[test]
    fn quadratic_is_linear_in_matrix() {
        let d = Feature::random();
        let m = SimilarityMatrix::diagonal([2., 1., 3., 0.5, 4.]);
        let mut phi = SimilarityMatrix::zero();
        phi.outer(&d);
        assert!((m.quadratic(&d) - m.dot(&phi)).abs() < 1e-4);
    }

    #[test]
    fn set_keeps_symmetry() {
        let mut m = SimilarityMatrix::zero();
        m.set(0, 3, 2.);
        assert!(m.is_symmetric());
        assert_eq!(m.get(3, 0), 2.);
    }
}
