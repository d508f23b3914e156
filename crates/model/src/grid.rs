use anyhow::Context;
use hseg_core::*;

/// A row-major 2-D grid of per-pixel values. Site `i` lives at
/// `(i % width, i / width)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid<T> {
    width: Coord,
    height: Coord,
    data: Vec<T>,
}

/// One semantic class per pixel.
pub type LabelImage = Grid<Label>;
/// One superpixel index per pixel.
pub type ClusterImage = Grid<ClusterId>;

impl<T> Grid<T> {
    pub fn width(&self) -> Coord {
        self.width
    }
    pub fn height(&self) -> Coord {
        self.height
    }
    pub fn pixels(&self) -> usize {
        self.data.len()
    }
    /// true if both grids cover the same width and height
    pub fn aligned<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl<T: Copy> Grid<T> {
    pub fn new(width: Coord, height: Coord, fill: T) -> Self {
        Self {
            width,
            height,
            data: vec![fill; width as usize * height as usize],
        }
    }
    pub fn from_vec(width: Coord, height: Coord, data: Vec<T>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            data.len() == width as usize * height as usize,
            "grid of {}x{} cannot hold {} values",
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
    pub fn at(&self, site: SiteId) -> T {
        self.data[site]
    }
    pub fn at_xy(&self, x: Coord, y: Coord) -> T {
        self.data[self.site(x, y)]
    }
    pub fn set(&mut self, site: SiteId, value: T) {
        self.data[site] = value;
    }
    pub fn site(&self, x: Coord, y: Coord) -> SiteId {
        x as SiteId + y as SiteId * self.width as SiteId
    }
    pub fn coord(&self, site: SiteId) -> (Coord, Coord) {
        let w = self.width as SiteId;
        ((site % w) as Coord, (site / w) as Coord)
    }
    pub fn values(&self) -> &[T] {
        &self.data
    }
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.data.iter().copied()
    }
}

impl LabelImage {
    /// number of pixels whose label is one of `classes` classes
    pub fn valid(&self, classes: usize) -> usize {
        self.iter().filter(|&l| hseg_core::valid(l, classes)).count()
    }
}

/// binary persistence: `b"GRID"`, u32 width, u32 height, then u32 per site.
impl<T> Grid<T>
where
    T: Copy + Into<u32> + TryFrom<u32>,
{
    const MAGIC: &'static [u8; 4] = b"GRID";

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use byteorder::LittleEndian;
        use byteorder::WriteBytesExt;
        use std::io::Write;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create grid file {}", path.display()))?;
        let ref mut file = std::io::BufWriter::new(file);
        file.write_all(Self::MAGIC)?;
        file.write_u32::<LittleEndian>(self.width)?;
        file.write_u32::<LittleEndian>(self.height)?;
        for value in self.iter() {
            file.write_u32::<LittleEndian>(value.into())?;
        }
        file.flush()?;
        Ok(())
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use byteorder::LittleEndian;
        use byteorder::ReadBytesExt;
        use std::io::Read;
        let file = std::fs::File::open(path)
            .with_context(|| format!("open grid file {}", path.display()))?;
        let ref mut file = std::io::BufReader::new(file);
        let ref mut magic = [0u8; 4];
        file.read_exact(magic)?;
        anyhow::ensure!(magic == Self::MAGIC, "bad grid magic in {}", path.display());
        let width = file.read_u32::<LittleEndian>()?;
        let height = file.read_u32::<LittleEndian>()?;
        crate::payload::ensure_payload(path, 12, Some(width as u64 * height as u64), 4)?;
        let data = (0..width as usize * height as usize)
            .map(|_| file.read_u32::<LittleEndian>().map_err(anyhow::Error::from))
            .map(|raw| {
                raw.and_then(|v| {
                    T::try_from(v).map_err(|_| anyhow::anyhow!("grid value {} out of range", v))
                })
            })
            .collect::<anyhow::Result<Vec<T>>>()
            .with_context(|| format!("truncated grid file {}", path.display()))?;
        Self::from_vec(width, height, data)
    }
}
