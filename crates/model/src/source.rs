use super::*;
use anyhow::Context;
use hseg_core::*;

/// Read access to dense per-pixel features.
///
/// Decouples energy evaluation and clustering from any particular pixel
/// container. Implementors must be cheap to query by site.
pub trait FeatureSource: Sync {
    fn width(&self) -> Coord;
    fn height(&self) -> Coord;
    fn feature(&self, site: SiteId) -> Feature;

    fn pixels(&self) -> usize {
        self.width() as usize * self.height() as usize
    }
    fn features(&self) -> impl Iterator<Item = Feature> + '_ {
        (0..self.pixels()).map(|i| self.feature(i))
    }
    /// true if the grid covers the same width and height
    fn aligned<T>(&self, grid: &Grid<T>) -> bool {
        self.width() == grid.width() && self.height() == grid.height()
    }
}

/// A dense, in-memory feature image.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureImage {
    width: Coord,
    height: Coord,
    data: Vec<Feature>,
}

impl FeatureImage {
    pub fn from_vec(width: Coord, height: Coord, data: Vec<Feature>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            data.len() == width as usize * height as usize,
            "feature image of {}x{} cannot hold {} features",
            width,
            height,
            data.len()
        );
        Ok(Self {
            width,
            height,
            data,
        })
    }
    /// builds features from already color-converted pixels, appending the
    /// position normalized to [0, 1] along each axis.
    pub fn from_color(width: Coord, height: Coord, color: &[[Cost; COLOR_DIM]]) -> anyhow::Result<Self> {
        anyhow::ensure!(
            color.len() == width as usize * height as usize,
            "color image of {}x{} cannot hold {} pixels",
            width,
            height,
            color.len()
        );
        let sx = (width.max(2) - 1) as Cost;
        let sy = (height.max(2) - 1) as Cost;
        let data = color
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let x = (i % width as usize) as Cost / sx;
                let y = (i / width as usize) as Cost / sy;
                Feature::from([c[0], c[1], c[2], x, y])
            })
            .collect();
        Self::from_vec(width, height, data)
    }
}

impl FeatureSource for FeatureImage {
    fn width(&self) -> Coord {
        self.width
    }
    fn height(&self) -> Coord {
        self.height
    }
    fn feature(&self, site: SiteId) -> Feature {
        self.data[site]
    }
}

/// binary persistence: `b"FEAT"`, u32 width, u32 height, u32 dim, then f32 features.
impl FeatureImage {
    const MAGIC: &'static [u8; 4] = b"FEAT";

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use byteorder::LittleEndian;
        use byteorder::WriteBytesExt;
        use std::io::Write;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create feature file {}", path.display()))?;
        let ref mut file = std::io::BufWriter::new(file);
        file.write_all(Self::MAGIC)?;
        file.write_u32::<LittleEndian>(self.width)?;
        file.write_u32::<LittleEndian>(self.height)?;
        file.write_u32::<LittleEndian>(FEATURE_DIM as u32)?;
        for feature in self.data.iter() {
            for value in feature.values() {
                file.write_f32::<LittleEndian>(*value)?;
            }
        }
        file.flush()?;
        Ok(())
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use byteorder::LittleEndian;
        use byteorder::ReadBytesExt;
        use std::io::Read;
        let file = std::fs::File::open(path)
            .with_context(|| format!("open feature file {}", path.display()))?;
        let ref mut file = std::io::BufReader::new(file);
        let ref mut magic = [0u8; 4];
        file.read_exact(magic)?;
        anyhow::ensure!(magic == Self::MAGIC, "bad feature magic in {}", path.display());
        let width = file.read_u32::<LittleEndian>()?;
        let height = file.read_u32::<LittleEndian>()?;
        let dim = file.read_u32::<LittleEndian>()? as usize;
        anyhow::ensure!(dim == FEATURE_DIM, "feature dim {} != {}", dim, FEATURE_DIM);
        let pixels = width as u64 * height as u64;
        crate::payload::ensure_payload(path, 16, pixels.checked_mul(dim as u64), 4)?;
        let mut data = Vec::with_capacity(pixels as usize);
        for _ in 0..width as usize * height as usize {
            let ref mut values = [0.; FEATURE_DIM];
            file.read_f32_into::<LittleEndian>(values)
                .with_context(|| format!("truncated feature file {}", path.display()))?;
            data.push(Feature::from(*values));
        }
        Self::from_vec(width, height, data)
    }
}

impl Arbitrary for FeatureImage {
    fn random() -> Self {
        use rand::Rng;
        let ref mut rng = rand::rng();
        let width = rng.random_range(2..16);
        let height = rng.random_range(2..16);
        let color = (0..width * height)
            .map(|_| std::array::from_fn(|_| rng.random::<Cost>()))
            .collect::<Vec<[Cost; COLOR_DIM]>>();
        Self::from_color(width, height, &color).expect("matching dimensions")
    }
}
