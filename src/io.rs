//! Structures that we read from and write to files: the benchmark's YAML
//! configuration and `.npy` heightmaps. Loaders follow the benchmark's
//! convention of exiting on unusable input rather than propagating errors.

use std::fs;

use ndarray::Array2;
use ndarray_npy::{read_npy, write_npy};
use yaml_rust::{Yaml, YamlLoader};

use crate::grid::NoiseParams;

/// Configuration for the terrain benchmark. Every key is optional; missing
/// keys keep the defaults the original demo ran with: a 200x200 terrain,
/// 3 octaves of noise at base frequency 0.35 and amplitude 5, and height
/// differences weighted 50x into step costs.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub tiles: usize,
    pub height_weight: f64,
    pub noise: NoiseParams,
    pub queries: usize,
}

impl Default for BenchConfig {
    fn default() -> BenchConfig {
        BenchConfig {
            tiles: 200,
            height_weight: 50.0,
            noise: NoiseParams::default(),
            queries: 100,
        }
    }
}

impl BenchConfig {
    /// Parse configuration from YAML text. Unknown keys are ignored.
    pub fn parse(text: &str) -> BenchConfig {
        let docs = YamlLoader::load_from_str(text).expect("Could not parse config");
        let mut config = BenchConfig::default();

        let Some(doc) = docs.first() else {
            return config;
        };
        if let Some(tiles) = doc["tiles"].as_i64() {
            config.tiles = tiles as usize;
        }
        if let Some(weight) = as_f64(&doc["height-weight"]) {
            config.height_weight = weight;
        }
        if let Some(octaves) = doc["octaves"].as_i64() {
            config.noise.octaves = octaves as u32;
        }
        if let Some(frequency) = as_f64(&doc["frequency"]) {
            config.noise.frequency = frequency;
        }
        if let Some(amplitude) = as_f64(&doc["amplitude"]) {
            config.noise.amplitude = amplitude;
        }
        if let Some(queries) = doc["queries"].as_i64() {
            config.queries = queries as usize;
        }

        config
    }

    pub fn load(path: &str) -> BenchConfig {
        let text = fs::read_to_string(path).expect("Could not read config file");
        BenchConfig::parse(&text)
    }
}

// YAML parses "50" as an integer and "50.0" as a real; accept both.
fn as_f64(value: &Yaml) -> Option<f64> {
    value.as_f64().or_else(|| value.as_i64().map(|v| v as f64))
}

pub fn load_heights(path: &str) -> Array2<f64> {
    read_npy(path).expect("Could not read heightmap")
}

pub fn save_heights(path: &str, heights: &Array2<f64>) {
    write_npy(path, heights).expect("Could not write heightmap")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_defaults() {
        let config = BenchConfig::parse("");
        assert_eq!(config.tiles, 200);
        assert_eq!(config.height_weight, 50.0);
        assert_eq!(config.noise.octaves, 3);
        assert_eq!(config.queries, 100);
    }

    #[test]
    fn overrides_apply_and_integers_coerce() {
        let config = BenchConfig::parse(
            "tiles: 64\nheight-weight: 10\nfrequency: 0.5\nqueries: 7\n",
        );
        assert_eq!(config.tiles, 64);
        assert_eq!(config.height_weight, 10.0);
        assert_eq!(config.noise.frequency, 0.5);
        assert_eq!(config.queries, 7);
        // Untouched keys keep their defaults.
        assert_eq!(config.noise.amplitude, 5.0);
    }
}
