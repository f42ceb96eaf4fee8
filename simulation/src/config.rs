//! Tunable parameters of a simulation run, optionally read from a JSON file.

use crate::controls::ControlType;
use crate::error::{SimResult, SimulationError};
use crate::sensor::{DEFAULT_RAY_COUNT, DEFAULT_RAY_LENGTH, DEFAULT_RAY_SPREAD};
use crate::traffic::TrafficPreset;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The file name the front end looks for next to the executable.
pub const CONFIG_FILE: &str = "SimConfig.json";

/// Every field has a default, so a config file only needs to list what it changes.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Who drives the cars under test. `Dummy` is not allowed here.
    pub control_mode: ControlType,
    pub lane_count: usize,
    /// Width of the road view in world units, the road is centered in it.
    pub road_view_width: f32,
    /// Share of the view covered by the road.
    pub road_width_ratio: f32,
    /// The lane the cars under test start on.
    pub start_lane: usize,
    pub start_y: f32,
    pub car_width: f32,
    pub car_height: f32,
    pub max_speed: f32,
    pub traffic: TrafficPreset,
    pub traffic_max_speed: f32,
    /// Amount of network driven cars per generation.
    pub population: usize,
    /// How far the copies of a stored brain are blended towards random, 0..=1.
    pub mutation_amount: f32,
    pub hidden_neurons: usize,
    pub ray_count: usize,
    pub ray_length: f32,
    pub ray_spread: f32,
    /// Seconds without progress of the best car before a generation counts as stalled.
    pub stall_timeout: f32,
    /// Start the next generation on its own once the current one crashed or stalled.
    pub auto_evolve: bool,
    /// Seed for all randomness, `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            control_mode: ControlType::Ai,
            lane_count: 3,
            road_view_width: 200.0,
            road_width_ratio: 0.9,
            start_lane: 1,
            start_y: 100.0,
            car_width: 30.0,
            car_height: 50.0,
            max_speed: 3.0,
            traffic: TrafficPreset::Standard,
            traffic_max_speed: 2.0,
            population: 100,
            mutation_amount: 0.1,
            hidden_neurons: 6,
            ray_count: DEFAULT_RAY_COUNT,
            ray_length: DEFAULT_RAY_LENGTH,
            ray_spread: DEFAULT_RAY_SPREAD,
            stall_timeout: 10.0,
            auto_evolve: false,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// The setup of the plain keyboard demo: one player car behind a single slower car.
    pub fn keyboard_demo() -> Self {
        SimulationConfig {
            control_mode: ControlType::Keys,
            car_width: 25.0,
            car_height: 47.0,
            traffic: TrafficPreset::Single,
            traffic_max_speed: 2.7,
            population: 1,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a config file. A missing file yields the defaults, a broken one is an error.
    pub fn load(path: &Path) -> SimResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No config file, using defaults.");
                Ok(Self::default())
            }
            Err(error) => Err(SimulationError::InvalidConfig(format!(
                "failed to read {}: {error}",
                path.display()
            ))),
        }
    }

    /// Rejects settings that would make the simulation meaningless.
    pub fn validate(&self) -> SimResult<()> {
        let fail = |message: &str| Err(SimulationError::InvalidConfig(message.to_string()));
        if self.control_mode == ControlType::Dummy {
            return fail("control_mode must be Keys or Ai");
        }
        if self.lane_count == 0 {
            return fail("lane_count must be positive");
        }
        if self.population == 0 {
            return fail("population must be positive");
        }
        if self.ray_count == 0 || self.hidden_neurons == 0 {
            return fail("ray_count and hidden_neurons must be positive");
        }
        if self.ray_length <= 0.0 || self.car_width <= 0.0 || self.car_height <= 0.0 {
            return fail("lengths must be positive");
        }
        if self.max_speed <= 0.0 || self.traffic_max_speed < 0.0 {
            return fail("speeds must not be negative");
        }
        if !(0.0..=1.0).contains(&self.mutation_amount) {
            return fail("mutation_amount must be within 0..=1");
        }
        if !(0.0..=1.0).contains(&self.road_width_ratio) || self.road_width_ratio == 0.0 {
            return fail("road_width_ratio must be within (0, 1]");
        }
        if self.stall_timeout <= 0.0 {
            return fail("stall_timeout must be positive");
        }
        Ok(())
    }

    /// Layer sizes of a brain: one input per ray, four outputs.
    pub fn brain_topology(&self) -> [usize; 3] {
        [
            self.ray_count,
            self.hidden_neurons,
            crate::car::NETWORK_OUTPUTS,
        ]
    }

    pub fn rng(&self) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        }
    }
}
