use crate::error::{GpResult, GridPickError};
use crate::grid::Kernel;
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    #[command(flatten)]
    pub fusion: FusionParams,
    #[command(flatten)]
    pub search: SearchParams,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionParams {
    // === CLASS KERNELS (row-major 3x3) ===
    // Film rewards clustering
    #[arg(long, default_value = "2,2,2,2,5,2,2,2,2", allow_hyphen_values = true)]
    pub film_kernel: String,
    #[arg(long, default_value = "-1,-1,-1,-1,-2,-1,-1,-1,-1", allow_hyphen_values = true)]
    pub aggregate_kernel: String,
    #[arg(long, default_value = "-2,-2,-2,-2,-5,-2,-2,-2,-2", allow_hyphen_values = true)]
    pub ice_kernel: String,
    // Carbon only penalises its own cell
    #[arg(long, default_value = "0,0,0,0,-2,0,0,0,0", allow_hyphen_values = true)]
    pub carbon_kernel: String,

    // === FOCUS CANDIDATES ===
    #[arg(long, default_value_t = 0.8)]
    pub carbon_threshold: f64,
    // Non-integer so no cell sits at distance zero
    #[arg(long, default_value_t = 6.5)]
    pub center_offset: f64,
}

impl Default for FusionParams {
    fn default() -> Self {
        Self {
            film_kernel: "2,2,2,2,5,2,2,2,2".to_string(),
            aggregate_kernel: "-1,-1,-1,-1,-2,-1,-1,-1,-1".to_string(),
            ice_kernel: "-2,-2,-2,-2,-5,-2,-2,-2,-2".to_string(),
            carbon_kernel: "0,0,0,0,-2,0,0,0,0".to_string(),
            carbon_threshold: 0.8,
            center_offset: 6.5,
        }
    }
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    #[arg(long, default_value_t = 5000, allow_negative_numbers = true)]
    pub trials: i64,
    #[arg(long, default_value_t = 5)]
    pub shortlist_size: usize,
    // Focus point included
    #[arg(long, default_value_t = 16)]
    pub max_points: usize,
    #[arg(long, default_value_t = 0.1)]
    pub gain_cutoff: f64,
    #[arg(long, default_value_t = -100.0, allow_negative_numbers = true)]
    pub burn_value: f64,
    #[arg(long, default_value_t = 500)]
    pub batch_size: usize,
    // 0 = rayon's global pool
    #[arg(long, default_value_t = 0)]
    pub threads: usize,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            trials: 5000,
            shortlist_size: 5,
            max_points: 16,
            gain_cutoff: 0.1,
            burn_value: -100.0,
            batch_size: 500,
            threads: 0,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> GpResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            GridPickError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrites fields with values the user typed on the command line.
    /// Defaults filled in by clap never override file values.
    pub fn merge_from_cli(&mut self, cli: &Config, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($section:ident . $field:ident) => {
                if matches.value_source(stringify!($field)) == Some(ValueSource::CommandLine) {
                    self.$section.$field = cli.$section.$field.clone();
                }
            };
        }

        update_if_present!(fusion.film_kernel);
        update_if_present!(fusion.aggregate_kernel);
        update_if_present!(fusion.ice_kernel);
        update_if_present!(fusion.carbon_kernel);
        update_if_present!(fusion.carbon_threshold);
        update_if_present!(fusion.center_offset);

        update_if_present!(search.trials);
        update_if_present!(search.shortlist_size);
        update_if_present!(search.max_points);
        update_if_present!(search.gain_cutoff);
        update_if_present!(search.burn_value);
        update_if_present!(search.batch_size);
        update_if_present!(search.threads);
    }
}

impl FusionParams {
    pub fn get_film_kernel(&self) -> GpResult<Kernel> {
        parse_kernel(&self.film_kernel, "film_kernel")
    }

    pub fn get_aggregate_kernel(&self) -> GpResult<Kernel> {
        parse_kernel(&self.aggregate_kernel, "aggregate_kernel")
    }

    pub fn get_ice_kernel(&self) -> GpResult<Kernel> {
        parse_kernel(&self.ice_kernel, "ice_kernel")
    }

    pub fn get_carbon_kernel(&self) -> GpResult<Kernel> {
        parse_kernel(&self.carbon_kernel, "carbon_kernel")
    }
}

fn parse_kernel(s: &str, name: &str) -> GpResult<Kernel> {
    let flat = parse_f64_array::<9>(s, name)?;
    let mut kernel = [[0.0; 3]; 3];
    for (i, v) in flat.into_iter().enumerate() {
        kernel[i / 3][i % 3] = v;
    }
    Ok(kernel)
}

fn parse_f64_array<const N: usize>(s: &str, name: &str) -> GpResult<[f64; N]> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != N {
        return Err(GridPickError::Config(format!(
            "--{} requires {} values, got {}",
            name.replace('_', "-"),
            N,
            parts.len()
        )));
    }
    let mut arr = [0.0f64; N];
    for (i, p) in parts.iter().enumerate() {
        arr[i] = p.trim().parse().map_err(|_| {
            GridPickError::Config(format!("Invalid number '{}' in {}", p.trim(), name))
        })?;
        if !arr[i].is_finite() {
            return Err(GridPickError::Config(format!(
                "Non-finite value '{}' in {}",
                p.trim(),
                name
            )));
        }
    }
    Ok(arr)
}
