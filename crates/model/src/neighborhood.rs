use hseg_core::*;

/// Grid topology for pairwise terms.
///
/// Each undirected adjacency is yielded once, as `(site, neighbor)` with
/// `neighbor` later in scan order than `site`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Neighborhood {
    #[default]
    Four,
    Eight,
}

impl Neighborhood {
    /// forward offsets (dx, dy) covering each adjacency exactly once
    fn offsets(&self) -> &'static [(i64, i64)] {
        match self {
            Neighborhood::Four => &[(1, 0), (0, 1)],
            Neighborhood::Eight => &[(1, 0), (0, 1), (1, 1), (-1, 1)],
        }
    }

    /// all adjacent site pairs of a `width` x `height` grid
    pub fn edges(&self, width: Coord, height: Coord) -> impl Iterator<Item = (SiteId, SiteId)> {
        let offsets = self.offsets();
        let w = width as i64;
        let h = height as i64;
        (0..h)
            .flat_map(move |y| (0..w).map(move |x| (x, y)))
            .flat_map(move |(x, y)| {
                offsets
                    .iter()
                    .map(move |(dx, dy)| (x + dx, y + dy))
                    .filter(move |(nx, ny)| *nx >= 0 && *nx < w && *ny < h)
                    .map(move |(nx, ny)| ((x + y * w) as SiteId, (nx + ny * w) as SiteId))
            })
    }

    /// sites adjacent to `site`, in either direction
    pub fn around(&self, site: SiteId, width: Coord, height: Coord) -> impl Iterator<Item = SiteId> {
        let w = width as i64;
        let h = height as i64;
        let x = site as i64 % w;
        let y = site as i64 / w;
        self.offsets()
            .iter()
            .flat_map(|(dx, dy)| [(*dx, *dy), (-*dx, -*dy)])
            .map(move |(dx, dy)| (x + dx, y + dy))
            .filter(move |(nx, ny)| *nx >= 0 && *nx < w && *ny >= 0 && *ny < h)
            .map(move |(nx, ny)| (nx + ny * w) as SiteId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_connected_edge_count() {
        // 3x2 grid: 2 horizontal per row * 2 rows + 3 vertical
        assert_eq!(Neighborhood::Four.edges(3, 2).count(), 7);
    }

    #[test]
    fn eight_connected_edge_count() {
        // 2x2 grid: 2 horizontal + 2 vertical + 2 diagonal
        assert_eq!(Neighborhood::Eight.edges(2, 2).count(), 6);
    }

    #[test]
    fn edges_are_forward() {
        for (a, b) in Neighborhood::Eight.edges(4, 4) {
            assert!(a < b);
        }
    }

    #[test]
    fn around_matches_edges() {
        let n = Neighborhood::Eight;
        let degree = n.edges(4, 3).filter(|(a, b)| *a == 5 || *b == 5).count();
        assert_eq!(n.around(5, 4, 3).count(), degree);
        assert_eq!(Neighborhood::Four.around(0, 4, 3).count(), 2);
    }
}
