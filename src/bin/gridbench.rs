//! Pathfinding benchmark on heightmap terrain. Builds (or loads) a terrain,
//! fixes the search start at its center, then runs repeated queries against
//! randomly chosen goals and writes one CSV row of results per query.

use std::fs::File;

use argparse::ArgumentParser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use astar_search::astar::AStar;
use astar_search::grid::{Grid, GridNode};
use astar_search::heuristic::grid::GridHeuristic;
use astar_search::heuristic::null::NullHeuristic;
use astar_search::heuristic::Heuristic;
use astar_search::io::{self, BenchConfig};

/// One output row per query.
#[derive(Debug, Serialize)]
struct QueryRow {
    #[serde(rename = "goal-x")]
    goal_x: usize,
    #[serde(rename = "goal-y")]
    goal_y: usize,
    #[serde(rename = "reached")]
    reached: bool,
    #[serde(rename = "cost-from-start")]
    cost_from_start: Option<f64>,
    #[serde(rename = "path-nodes")]
    path_nodes: usize,
    #[serde(rename = "stat-nodes-expanded")]
    nodes_expanded: usize,
    #[serde(rename = "stat-nodes-generated")]
    nodes_generated: usize,
    #[serde(rename = "stat-edges-relaxed")]
    edges_relaxed: usize,
    #[serde(rename = "stat-stale-entries")]
    stale_entries: usize,
    #[serde(rename = "time-seconds")]
    time: f64,
}

fn main() {
    // Handle argument parsing
    // See: https://crates.io/crates/argparse
    let mut config_path = String::new();
    let mut output_path = String::from("results.csv");
    let mut heightmap_path = String::new();
    let mut save_heightmap_path = String::new();
    let mut seed = 13u64;
    let mut heuristic_name = String::from("null");
    let mut heuristic_args = Vec::<String>::new();
    {
        let mut ap = ArgumentParser::new();
        ap.set_description("Pathfinding benchmark on generated heightmap terrain");
        ap.refer(&mut config_path).metavar("CONFIG").add_option(
            &["-c", "--config"],
            argparse::Store,
            "Path to the YAML configuration file",
        );
        ap.refer(&mut output_path).metavar("OUTPUT").add_option(
            &["-o", "--output"],
            argparse::Store,
            "Path to the output file",
        );
        ap.refer(&mut seed).metavar("SEED").add_option(
            &["-s", "--seed"],
            argparse::Store,
            "Seed for terrain generation and goal selection",
        );
        ap.refer(&mut heightmap_path).metavar("HEIGHTMAP").add_option(
            &["--heightmap"],
            argparse::Store,
            "Load the terrain from this .npy file instead of generating it",
        );
        ap.refer(&mut save_heightmap_path).metavar("SAVE").add_option(
            &["--save-heightmap"],
            argparse::Store,
            "Write the terrain heights to this .npy file",
        );
        ap.refer(&mut heuristic_name)
            .metavar("HEURISTIC")
            .required()
            .add_argument("heuristic-name", argparse::Store, "Which heuristic to use");
        ap.refer(&mut heuristic_args)
            .metavar("HEURISTIC_ARGS")
            .add_argument(
                "heuristic-args",
                argparse::List,
                "Arguments for the heuristic",
            );
        ap.stop_on_first_argument(true);
        ap.parse_args_or_exit();
    }
    heuristic_args.insert(0, heuristic_name.clone());

    let config = if config_path.is_empty() {
        BenchConfig::default()
    } else {
        BenchConfig::load(&config_path)
    };

    let mut rng = StdRng::seed_from_u64(seed);

    let grid = if heightmap_path.is_empty() {
        Grid::generate(config.tiles, config.height_weight, &config.noise, &mut rng)
    } else {
        Grid::from_heights(io::load_heights(&heightmap_path), config.height_weight)
    };
    if !save_heightmap_path.is_empty() {
        io::save_heights(&save_heightmap_path, grid.heights());
    }

    let heuristic: Box<dyn Heuristic<GridNode>> = match heuristic_name.as_str() {
        "null" => Box::new(NullHeuristic::create(heuristic_args)),
        "grid" => Box::new(GridHeuristic::create(heuristic_args)),
        _ => {
            eprintln!("Unknown heuristic: {}", heuristic_name);
            std::process::exit(1);
        }
    };

    // The engine is reused for every query, searching out from the center.
    let start = grid.node(grid.width() / 2, grid.height() / 2);
    let mut astar = AStar::new(start, heuristic);

    // Create a CSV writer for the output
    let output = File::create(output_path).expect("Could not create output file");
    let mut output = csv::Writer::from_writer(output);

    eprintln!("Running {} queries...", config.queries);
    for i in 0..config.queries {
        let goal = grid.node(
            rng.gen_range(0..grid.width()),
            rng.gen_range(0..grid.height()),
        );

        let stats = astar.calculate(&goal);
        let data = astar.get_data(&goal);
        let row = QueryRow {
            goal_x: goal.x,
            goal_y: goal.y,
            reached: data.is_some(),
            cost_from_start: data.map(|d| d.cost_from_start()),
            path_nodes: astar.get_path(&goal).len(),
            nodes_expanded: stats.nodes_expanded,
            nodes_generated: stats.nodes_generated,
            edges_relaxed: stats.edges_relaxed,
            stale_entries: stats.stale_entries,
            time: stats.time,
        };
        output.serialize(row).expect("Could not write result");
        println!("Processed query {}", i + 1);
    }
}
