//! Heightmap terrain used by the pathfinding benchmark. A grid of tiles is
//! backed by a 2D array of heights; each tile connects to its 8 neighbors,
//! and stepping costs the base move distance plus the height difference
//! scaled by the grid's height weight. Terrain can be generated from layered
//! gradient noise or built from an existing heightmap.

use std::f64::consts::SQRT_2;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;

use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::graph::{Edge, Node};

/// Parameters for layered gradient noise. The defaults are the ones the
/// benchmark was tuned with: 3 octaves at base frequency 0.35, heights
/// scaled to [0, 5].
#[derive(Debug, Clone)]
pub struct NoiseParams {
    pub octaves: u32,
    pub frequency: f64,
    pub amplitude: f64,
}

impl Default for NoiseParams {
    fn default() -> NoiseParams {
        NoiseParams {
            octaves: 3,
            frequency: 0.35,
            amplitude: 5.0,
        }
    }
}

/// Classic 2D gradient noise over a shuffled permutation table.
struct PerlinNoise {
    perm: Vec<usize>,
}

impl PerlinNoise {
    fn new<R: Rng>(rng: &mut R) -> PerlinNoise {
        let mut perm: Vec<usize> = (0..256).collect();
        perm.shuffle(rng);
        PerlinNoise { perm }
    }

    fn corner_hash(&self, x: i64, y: i64) -> usize {
        let xi = (x & 255) as usize;
        let yi = (y & 255) as usize;
        self.perm[(self.perm[xi] + yi) & 255]
    }

    fn gradient(hash: usize, dx: f64, dy: f64) -> f64 {
        match hash & 7 {
            0 => dx + dy,
            1 => dx - dy,
            2 => -dx + dy,
            3 => -dx - dy,
            4 => dx,
            5 => -dx,
            6 => dy,
            _ => -dy,
        }
    }

    fn fade(t: f64) -> f64 {
        t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
    }

    fn lerp(a: f64, b: f64, t: f64) -> f64 {
        a + t * (b - a)
    }

    /// One octave of noise, roughly in [-1, 1]. Zero at lattice points.
    fn noise(&self, x: f64, y: f64) -> f64 {
        let xf = x.floor();
        let yf = y.floor();
        let (xi, yi) = (xf as i64, yf as i64);
        let (dx, dy) = (x - xf, y - yf);

        let n00 = Self::gradient(self.corner_hash(xi, yi), dx, dy);
        let n10 = Self::gradient(self.corner_hash(xi + 1, yi), dx - 1.0, dy);
        let n01 = Self::gradient(self.corner_hash(xi, yi + 1), dx, dy - 1.0);
        let n11 = Self::gradient(self.corner_hash(xi + 1, yi + 1), dx - 1.0, dy - 1.0);

        let u = Self::fade(dx);
        let v = Self::fade(dy);
        Self::lerp(Self::lerp(n00, n10, u), Self::lerp(n01, n11, u), v)
    }

    /// Octave sum with doubling frequency and halving amplitude, normalized
    /// by the total amplitude so the result stays in roughly [-1, 1].
    fn sample(&self, x: f64, y: f64, octaves: u32, frequency: f64) -> f64 {
        let mut total = 0.0;
        let mut norm = 0.0;
        let mut freq = frequency;
        let mut amp = 1.0;
        for _ in 0..octaves.max(1) {
            total += self.noise(x * freq, y * freq) * amp;
            norm += amp;
            freq *= 2.0;
            amp *= 0.5;
        }
        total / norm
    }
}

/// A square heightmap whose tiles form the searched graph.
pub struct Grid {
    heights: Array2<f64>,
    height_weight: f64,
}

impl Grid {
    /// Wrap an existing heightmap. `height_weight` scales how much a height
    /// difference between two tiles adds to the cost of stepping between
    /// them.
    pub fn from_heights(heights: Array2<f64>, height_weight: f64) -> Grid {
        Grid {
            heights,
            height_weight,
        }
    }

    /// Generate a `tiles` x `tiles` terrain from layered gradient noise.
    /// Heights land in [0, amplitude].
    pub fn generate<R: Rng>(
        tiles: usize,
        height_weight: f64,
        params: &NoiseParams,
        rng: &mut R,
    ) -> Grid {
        let noise = PerlinNoise::new(rng);
        let heights = Array2::from_shape_fn((tiles, tiles), |(x, y)| {
            let sample = noise.sample(x as f64, y as f64, params.octaves, params.frequency);
            sample.abs() * params.amplitude
        });
        Grid::from_heights(heights, height_weight)
    }

    pub fn width(&self) -> usize {
        self.heights.nrows()
    }

    pub fn height(&self) -> usize {
        self.heights.ncols()
    }

    pub fn height_at(&self, x: usize, y: usize) -> f64 {
        self.heights[[x, y]]
    }

    pub fn height_weight(&self) -> f64 {
        self.height_weight
    }

    pub fn heights(&self) -> &Array2<f64> {
        &self.heights
    }

    /// Handle for the tile at `(x, y)`. Panics if out of bounds.
    pub fn node(&self, x: usize, y: usize) -> GridNode<'_> {
        assert!(
            x < self.width() && y < self.height(),
            "tile ({}, {}) is outside the {}x{} grid",
            x,
            y,
            self.width(),
            self.height()
        );
        GridNode { grid: self, x, y }
    }
}

/// Handle to one tile of a grid. Two handles are equal exactly when they
/// name the same tile of the same grid, which is what the search engine
/// uses to recognize its goal.
#[derive(Clone, Copy)]
pub struct GridNode<'g> {
    grid: &'g Grid,
    pub x: usize,
    pub y: usize,
}

impl<'g> GridNode<'g> {
    pub fn grid(&self) -> &'g Grid {
        self.grid
    }

    /// The cost of the edge from this tile to the given neighbor, or `None`
    /// if the tile is not actually a neighbor.
    pub fn cost_to(&self, neighbor: &GridNode<'g>) -> Option<f64> {
        self.edges()
            .into_iter()
            .find(|edge| edge.target() == neighbor)
            .map(|edge| edge.cost())
    }
}

// Cardinal steps cost 1 and diagonal steps sqrt(2) before height weighting.
const NEIGHBOR_OFFSETS: [(isize, isize, f64); 8] = [
    (1, 0, 1.0),
    (-1, 0, 1.0),
    (0, 1, 1.0),
    (0, -1, 1.0),
    (1, 1, SQRT_2),
    (-1, 1, SQRT_2),
    (-1, -1, SQRT_2),
    (1, -1, SQRT_2),
];

impl<'g> Node for GridNode<'g> {
    fn edges(&self) -> Vec<Edge<Self>> {
        let mut edges = Vec::with_capacity(8);
        let here = self.grid.height_at(self.x, self.y);

        for &(dx, dy, base) in NEIGHBOR_OFFSETS.iter() {
            let nx = self.x as isize + dx;
            let ny = self.y as isize + dy;
            if nx < 0
                || ny < 0
                || nx as usize >= self.grid.width()
                || ny as usize >= self.grid.height()
            {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let climb = (here - self.grid.height_at(nx, ny)).abs();
            edges.push(Edge::new(
                self.grid.node(nx, ny),
                climb * self.grid.height_weight + base,
            ));
        }

        edges
    }
}

impl PartialEq for GridNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.grid, other.grid) && self.x == other.x && self.y == other.y
    }
}

impl Eq for GridNode<'_> {}

impl Hash for GridNode<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

impl fmt::Debug for GridNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridNode")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astar::AStar;
    use crate::heuristic::null::NullHeuristic;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flat_grid(tiles: usize) -> Grid {
        Grid::from_heights(Array2::zeros((tiles, tiles)), 50.0)
    }

    #[test]
    fn edge_counts_by_position() {
        let grid = flat_grid(5);
        assert_eq!(grid.node(0, 0).edges().len(), 3);
        assert_eq!(grid.node(4, 0).edges().len(), 3);
        assert_eq!(grid.node(2, 0).edges().len(), 5);
        assert_eq!(grid.node(2, 2).edges().len(), 8);
    }

    #[test]
    fn flat_terrain_step_costs() {
        let grid = flat_grid(5);
        let node = grid.node(2, 2);

        assert_eq!(node.cost_to(&grid.node(3, 2)), Some(1.0));
        assert_eq!(node.cost_to(&grid.node(2, 1)), Some(1.0));
        assert_eq!(node.cost_to(&grid.node(3, 3)), Some(SQRT_2));
        // Not adjacent.
        assert_eq!(node.cost_to(&grid.node(4, 2)), None);
        assert_eq!(node.cost_to(&node), None);
    }

    #[test]
    fn climbing_raises_step_cost() {
        let mut heights = Array2::zeros((3, 3));
        heights[[1, 0]] = 0.5;
        let grid = Grid::from_heights(heights, 10.0);

        assert_eq!(grid.node(0, 0).cost_to(&grid.node(1, 0)), Some(6.0));
        // Descending costs the same as climbing.
        assert_eq!(grid.node(1, 0).cost_to(&grid.node(0, 0)), Some(6.0));
    }

    #[test]
    fn generated_terrain_is_bounded_and_varied() {
        let mut rng = StdRng::seed_from_u64(7);
        let params = NoiseParams::default();
        let grid = Grid::generate(32, 50.0, &params, &mut rng);

        let mut max = 0.0f64;
        for &h in grid.heights().iter() {
            assert!(h.is_finite());
            assert!(h >= 0.0);
            max = max.max(h);
        }
        assert!(max > 0.0, "noise should produce some relief");
    }

    #[test]
    fn search_crosses_generated_terrain() {
        let mut rng = StdRng::seed_from_u64(42);
        let grid = Grid::generate(16, 50.0, &NoiseParams::default(), &mut rng);

        let mut astar = AStar::new(grid.node(8, 8), NullHeuristic);
        let goal = grid.node(15, 15);
        astar.calculate(&goal);

        let data = astar.get_data(&goal).expect("grid is fully connected");
        assert!(data.cost_from_start() > 0.0);
        assert!(data.cost_from_start().is_finite());

        // Every step of the returned path must follow a real edge.
        let path = astar.get_path(&goal);
        assert!(!path.is_empty());
        for pair in path.windows(2) {
            assert!(pair[1].cost_to(&pair[0]).is_some());
        }
    }
}
