use super::*;
use anyhow::Context;
use hseg_core::*;

/// Per-pixel, per-class scores from an external classifier.
///
/// Stored class-major: the score of class `c` at site `s` lives at
/// `s + c * width * height`. Higher is more likely.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryScores {
    width: Coord,
    height: Coord,
    classes: usize,
    data: Vec<Cost>,
}

impl UnaryScores {
    pub fn from_vec(width: Coord, height: Coord, classes: usize, data: Vec<Cost>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            data.len() == width as usize * height as usize * classes,
            "scores of {}x{}x{} cannot hold {} values",
            width,
            height,
            classes,
            data.len()
        );
        Ok(Self {
            width,
            height,
            classes,
            data,
        })
    }
    pub fn width(&self) -> Coord {
        self.width
    }
    pub fn height(&self) -> Coord {
        self.height
    }
    pub fn classes(&self) -> usize {
        self.classes
    }
    pub fn pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }
    pub fn at(&self, site: SiteId, class: Label) -> Cost {
        self.data[site + class as usize * self.pixels()]
    }
    /// highest-scoring class at a site; the first one on ties
    pub fn max_label(&self, site: SiteId) -> Label {
        (0..self.classes as Label)
            .map(|l| (l, self.at(site, l)))
            .fold(None, |best: Option<(Label, Cost)>, (l, s)| match best {
                Some((_, b)) if b >= s => best,
                _ => Some((l, s)),
            })
            .map(|(l, _)| l)
            .unwrap_or(IGNORE)
    }
    /// arg-max labeling over all sites
    pub fn max_labeling(&self) -> LabelImage {
        let labels = (0..self.pixels()).map(|s| self.max_label(s)).collect();
        LabelImage::from_vec(self.width, self.height, labels).expect("one label per site")
    }
    pub fn min_score(&self) -> Cost {
        self.data.iter().copied().fold(Cost::INFINITY, Cost::min)
    }
    pub fn max_score(&self) -> Cost {
        self.data.iter().copied().fold(Cost::NEG_INFINITY, Cost::max)
    }
    /// shift all scores so the smallest becomes zero
    pub fn make_positive_base_zero(&mut self) {
        let min = self.min_score();
        self.data.iter_mut().for_each(|s| *s -= min);
    }
    /// shift all scores so the largest becomes zero
    pub fn make_negative_base_zero(&mut self) {
        let max = self.max_score();
        self.data.iter_mut().for_each(|s| *s -= max);
    }
    /// checks that scores line up with an image of the given shape
    pub fn validate(&self, width: Coord, height: Coord, classes: usize) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.width == width && self.height == height,
            "scores are {}x{} but image is {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        anyhow::ensure!(
            self.classes == classes,
            "scores carry {} classes, expected {}",
            self.classes,
            classes
        );
        Ok(())
    }
}

/// binary persistence: `b"PROB"`, i32 height, i32 width, then f32 scores.
/// The class count is implied by the payload length.
impl UnaryScores {
    const MAGIC: &'static [u8; 4] = b"PROB";

    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use byteorder::LittleEndian;
        use byteorder::WriteBytesExt;
        use std::io::Write;
        let file = std::fs::File::create(path)
            .with_context(|| format!("create scores file {}", path.display()))?;
        let ref mut file = std::io::BufWriter::new(file);
        file.write_all(Self::MAGIC)?;
        file.write_i32::<LittleEndian>(self.height as i32)?;
        file.write_i32::<LittleEndian>(self.width as i32)?;
        for score in self.data.iter() {
            file.write_f32::<LittleEndian>(*score)?;
        }
        file.flush()?;
        Ok(())
    }

    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use byteorder::LittleEndian;
        use byteorder::ReadBytesExt;
        use std::io::Read;
        let bytes = std::fs::read(path).with_context(|| format!("read scores file {}", path.display()))?;
        anyhow::ensure!(bytes.len() >= 12, "scores file {} has no header", path.display());
        let ref mut cursor = std::io::Cursor::new(bytes.as_slice());
        let ref mut magic = [0u8; 4];
        cursor.read_exact(magic)?;
        anyhow::ensure!(magic == Self::MAGIC, "bad scores magic in {}", path.display());
        let height = cursor.read_i32::<LittleEndian>()?;
        let width = cursor.read_i32::<LittleEndian>()?;
        anyhow::ensure!(width > 0 && height > 0, "scores file {} is {}x{}", path.display(), width, height);
        let pixels = width as usize * height as usize;
        let floats = (bytes.len() - 12) / std::mem::size_of::<f32>();
        anyhow::ensure!(
            floats % pixels == 0,
            "scores file {} holds {} values, not a multiple of {} pixels",
            path.display(),
            floats,
            pixels
        );
        let mut data = vec![0.; floats];
        cursor.read_f32_into::<LittleEndian>(&mut data)?;
        Self::from_vec(width as Coord, height as Coord, floats / pixels, data)
    }
}
