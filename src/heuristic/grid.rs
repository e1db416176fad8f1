//! Terrain-aware estimator for grid searches. Walks the straight line from
//! the query tile to the goal, summing the real step costs along it, and
//! blends that with the Euclidean distance. With terrain weighting the line
//! walk can overestimate a route that detours around a ridge, so this trades
//! strict admissibility for a much tighter estimate on rough terrain.

use crate::grid::GridNode;
use crate::heuristic::Heuristic;

pub struct GridHeuristic {
    cost_weight: f64,
    dist_weight: f64,
}

impl GridHeuristic {
    pub fn new(cost_weight: f64, dist_weight: f64) -> GridHeuristic {
        GridHeuristic {
            cost_weight,
            dist_weight,
        }
    }

    /// Parse arguments to create the heuristic. May exit.
    pub fn create(args: Vec<String>) -> GridHeuristic {
        let mut cost_weight = 0.5;
        let mut dist_weight = 0.5;
        {
            let mut ap = argparse::ArgumentParser::new();
            ap.set_description("Grid terrain heuristic");
            ap.refer(&mut cost_weight).metavar("COST_WEIGHT").add_option(
                &["-c", "--cost-weight"],
                argparse::Store,
                "Weight of the summed step costs along the straight line",
            );
            ap.refer(&mut dist_weight).metavar("DIST_WEIGHT").add_option(
                &["-d", "--dist-weight"],
                argparse::Store,
                "Weight of the Euclidean distance to the goal",
            );

            let res = ap.parse(args, &mut std::io::stdout(), &mut std::io::stderr());
            if let Err(code) = res {
                std::process::exit(code);
            }
        }
        GridHeuristic::new(cost_weight, dist_weight)
    }
}

impl<'g> Heuristic<GridNode<'g>> for GridHeuristic {
    fn approx_cost(&self, node: &GridNode<'g>, goal: &GridNode<'g>) -> f64 {
        let dx = goal.x as isize - node.x as isize;
        let dy = goal.y as isize - node.y as isize;
        let grid = node.grid();

        // Walk tile to tile along the straight line toward the goal,
        // stepping through whichever axis changes faster, and accumulate
        // the true cost of each step.
        let mut along = 0.0;
        if dx.abs() > dy.abs() {
            let step: isize = if node.x < goal.x { 1 } else { -1 };
            let slope = dy as f64 / dx as f64;
            let intercept = node.y as f64 - slope * node.x as f64;

            let mut current = *node;
            let mut x = node.x as isize;
            while x != goal.x as isize {
                let next_x = x + step;
                let next_y = (slope * next_x as f64 + intercept) as usize;
                let next = grid.node(next_x as usize, next_y);
                along += current.cost_to(&next).unwrap_or(0.0);
                current = next;
                x = next_x;
            }
        } else if dy != 0 {
            let step: isize = if node.y < goal.y { 1 } else { -1 };
            let slope = dx as f64 / dy as f64;
            let intercept = node.x as f64 - slope * node.y as f64;

            let mut current = *node;
            let mut y = node.y as isize;
            while y != goal.y as isize {
                let next_y = y + step;
                let next_x = (slope * next_y as f64 + intercept) as usize;
                let next = grid.node(next_x, next_y as usize);
                along += current.cost_to(&next).unwrap_or(0.0);
                current = next;
                y = next_y;
            }
        }

        self.cost_weight * along + self.dist_weight * ((dx * dx + dy * dy) as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astar::AStar;
    use crate::grid::Grid;

    use ndarray::Array2;

    fn flat_grid(tiles: usize) -> Grid {
        Grid::from_heights(Array2::zeros((tiles, tiles)), 50.0)
    }

    #[test]
    fn zero_at_the_goal() {
        let grid = flat_grid(5);
        let heuristic = GridHeuristic::new(0.5, 0.5);
        let node = grid.node(3, 1);
        assert_eq!(heuristic.approx_cost(&node, &node), 0.0);
    }

    #[test]
    fn follows_a_straight_row() {
        let mut heights = Array2::zeros((5, 5));
        heights[[1, 0]] = 0.2;
        heights[[2, 0]] = 0.6;
        heights[[3, 0]] = 0.1;
        let grid = Grid::from_heights(heights, 10.0);

        let mut expected_along = 0.0;
        for x in 0..4 {
            expected_along += grid
                .node(x, 0)
                .cost_to(&grid.node(x + 1, 0))
                .unwrap();
        }

        let heuristic = GridHeuristic::new(1.0, 0.0);
        let estimate = heuristic.approx_cost(&grid.node(0, 0), &grid.node(4, 0));
        assert!((estimate - expected_along).abs() < 1e-9);
    }

    #[test]
    fn flat_diagonal_estimate_matches_true_cost() {
        // On flat terrain the straight diagonal is the optimal path, so the
        // estimate (half step costs, half distance) equals the true cost.
        let grid = flat_grid(5);
        let heuristic = GridHeuristic::new(0.5, 0.5);

        let start = grid.node(0, 0);
        let goal = grid.node(4, 4);
        let estimate = heuristic.approx_cost(&start, &goal);

        let mut astar = AStar::new(start, GridHeuristic::new(0.5, 0.5));
        astar.calculate(&goal);
        let true_cost = astar.get_data(&goal).unwrap().cost_from_start();

        assert!((estimate - true_cost).abs() < 1e-9);
        assert!((true_cost - 4.0 * std::f64::consts::SQRT_2).abs() < 1e-9);
    }
}
