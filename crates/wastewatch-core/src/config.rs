use serde::{Deserialize, Serialize};

/// Engine configuration. All fields have defaults matching the weekly
/// national wastewater index: one seasonal cycle of 52 weeks, a 52-week
/// horizon, and a 500-path simulation for the 50% interval band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Seasonal cycle length in observations.
    #[serde(default = "default_season_length")]
    pub season_length: usize,

    /// Number of future steps to forecast.
    #[serde(default = "default_horizon")]
    pub horizon: usize,

    /// Number of Monte-Carlo sample paths.
    #[serde(default = "default_simulation_paths")]
    pub simulation_paths: usize,

    /// Lower interval quantile, in (0, 1).
    #[serde(default = "default_lower_quantile")]
    pub lower_quantile: f64,

    /// Upper interval quantile, in (0, 1).
    #[serde(default = "default_upper_quantile")]
    pub upper_quantile: f64,

    /// Iteration cap for the parameter optimizer.
    #[serde(default = "default_max_optimizer_iterations")]
    pub max_optimizer_iterations: usize,

    /// Relative convergence tolerance for the parameter optimizer.
    #[serde(default = "default_optimizer_tolerance")]
    pub optimizer_tolerance: f64,

    /// Seed for the simulation RNG. Unset means a fresh seed per call.
    #[serde(default)]
    pub simulation_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            season_length: default_season_length(),
            horizon: default_horizon(),
            simulation_paths: default_simulation_paths(),
            lower_quantile: default_lower_quantile(),
            upper_quantile: default_upper_quantile(),
            max_optimizer_iterations: default_max_optimizer_iterations(),
            optimizer_tolerance: default_optimizer_tolerance(),
            simulation_seed: None,
        }
    }
}

fn default_season_length() -> usize {
    52
}
fn default_horizon() -> usize {
    52
}
fn default_simulation_paths() -> usize {
    500
}
fn default_lower_quantile() -> f64 {
    0.25
}
fn default_upper_quantile() -> f64 {
    0.75
}
fn default_max_optimizer_iterations() -> usize {
    50_000
}
fn default_optimizer_tolerance() -> f64 {
    1e-6
}
