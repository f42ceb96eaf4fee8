//! The world ties road, traffic and the cars under test together and advances them per frame.

use crate::car::Car;
use crate::config::SimulationConfig;
use crate::controls::{ControlType, KeyState};
use crate::error::SimResult;
use crate::geometry::Point;
use crate::network::NeuralNetwork;
use crate::road::Road;
use crate::sensor::Sensor;
use crate::traffic::spawn_traffic;

/// Progress smaller than this does not reset the stall watch.
const STALL_PROGRESS_EPSILON: f32 = 0.5;

/// The share of the view height above the best car.
pub const CAMERA_ANCHOR: f32 = 0.7;

/// Watches the best car for lack of progress.
#[derive(Debug, Clone)]
struct StallWatch {
    /// The furthest point reached so far (smallest y).
    furthest_y: f32,
    idle_time: f32,
}

impl StallWatch {
    fn new(start_y: f32) -> Self {
        StallWatch {
            furthest_y: start_y,
            idle_time: 0.0,
        }
    }

    fn update(&mut self, best_y: f32, delta_time: f32) {
        if best_y < self.furthest_y - STALL_PROGRESS_EPSILON {
            self.furthest_y = best_y;
            self.idle_time = 0.0;
        } else {
            self.idle_time += delta_time;
        }
    }
}

pub struct World {
    pub config: SimulationConfig,
    pub road: Road,
    pub traffic: Vec<Car>,
    /// The cars under test, never empty.
    pub cars: Vec<Car>,
    /// Starts at 1 and counts up with every restart.
    pub generation: u32,
    best_index: usize,
    stall_watch: StallWatch,
    rng: fastrand::Rng,
}

impl World {
    /// Sets up the first generation. With a `seed_brain` the first car drives it unchanged and
    /// all others drive mutated copies, otherwise every car gets a random brain.
    ///
    /// # Errors
    /// Fails on an invalid configuration.
    pub fn new(config: SimulationConfig, seed_brain: Option<NeuralNetwork>) -> SimResult<Self> {
        config.validate()?;
        let rng = config.rng();
        let road = Road::new(
            config.road_view_width / 2.0,
            config.road_view_width * config.road_width_ratio,
            config.lane_count,
        );
        let mut world = World {
            stall_watch: StallWatch::new(config.start_y),
            config,
            road,
            traffic: Vec::new(),
            cars: Vec::new(),
            generation: 0,
            best_index: 0,
            rng,
        };
        world.next_generation(seed_brain)?;
        Ok(world)
    }

    /// Throws away all cars and traffic and starts over from the given brain.
    pub fn next_generation(&mut self, seed_brain: Option<NeuralNetwork>) -> SimResult<()> {
        let topology = self.config.brain_topology();
        let seed_brain = seed_brain.filter(|brain| {
            let fits = brain.topology() == topology;
            if !fits {
                tracing::warn!(
                    stored = ?brain.topology(),
                    expected = ?topology,
                    "Stored brain does not fit the configuration, starting from random brains."
                );
            }
            fits
        });

        let slots = self
            .config
            .traffic
            .slots(self.road.lane_count, &mut self.rng);
        self.traffic = spawn_traffic(
            &self.road,
            &slots,
            (self.config.car_width, self.config.car_height),
            self.config.traffic_max_speed,
            &mut self.rng,
        );

        let count = match self.config.control_mode {
            ControlType::Ai => self.config.population,
            _ => 1,
        };
        let mut cars = Vec::with_capacity(count);
        for index in 0..count {
            let brain = match &seed_brain {
                Some(brain) if index == 0 => brain.clone(),
                Some(brain) => brain.mutated(self.config.mutation_amount, &mut self.rng),
                None => NeuralNetwork::new(&topology, &mut self.rng)?,
            };
            cars.push(self.car_under_test(brain)?);
        }
        self.cars = cars;

        self.best_index = 0;
        self.stall_watch = StallWatch::new(self.config.start_y);
        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            cars = self.cars.len(),
            traffic = self.traffic.len(),
            seeded = seed_brain.is_some(),
            "Started generation."
        );
        Ok(())
    }

    fn car_under_test(&self, brain: NeuralNetwork) -> SimResult<Car> {
        let config = &self.config;
        let sensor = Sensor::new(config.ray_count, config.ray_length, config.ray_spread);
        Car::new(
            self.road.lane_center(config.start_lane),
            config.start_y,
            config.car_width,
            config.car_height,
            config.control_mode,
            config.max_speed,
        )
        .with_brain(sensor, brain)
    }

    /// Advances everything by one frame. Traffic only sees the road, the cars under test see
    /// the road and the traffic but not each other.
    pub fn step(&mut self, keys: KeyState, delta_time: f32) -> SimResult<()> {
        for car in self.traffic.iter_mut() {
            car.update(&self.road.borders, &[])?;
        }

        let obstacles: Vec<&[Point]> = self
            .traffic
            .iter()
            .map(|car| car.polygon.as_slice())
            .collect();
        for car in self.cars.iter_mut() {
            car.apply_keys(keys);
            car.update(&self.road.borders, &obstacles)?;
        }

        self.best_index = Self::furthest_ahead(&self.cars);
        self.stall_watch.update(self.best_car().y, delta_time);
        Ok(())
    }

    /// Index of the car with the smallest y, the first one wins a tie.
    fn furthest_ahead(cars: &[Car]) -> usize {
        cars.iter()
            .enumerate()
            .fold((0, f32::INFINITY), |(best, best_y), (index, car)| {
                if car.y < best_y {
                    (index, car.y)
                } else {
                    (best, best_y)
                }
            })
            .0
    }

    /// The car the camera follows and whose brain is shown and saved.
    pub fn best_car(&self) -> &Car {
        &self.cars[self.best_index]
    }

    pub fn best_brain(&self) -> Option<&NeuralNetwork> {
        self.best_car().brain.as_ref()
    }

    /// The vertical translation that puts the best car at 70 % of the view height.
    pub fn camera_offset(&self, view_height: f32) -> f32 {
        -self.best_car().y + view_height * CAMERA_ANCHOR
    }

    /// Distance the best car made up the road since the start.
    pub fn progress(&self) -> f32 {
        self.config.start_y - self.best_car().y
    }

    pub fn intact_count(&self) -> usize {
        self.cars.iter().filter(|car| !car.damaged).count()
    }

    pub fn all_damaged(&self) -> bool {
        self.intact_count() == 0
    }

    /// The best car made no progress for the configured timeout.
    pub fn is_stalled(&self) -> bool {
        self.stall_watch.idle_time >= self.config.stall_timeout
    }

    /// Only network driven generations evolve on their own.
    pub fn should_evolve(&self) -> bool {
        self.config.auto_evolve
            && self.config.control_mode == ControlType::Ai
            && (self.all_damaged() || self.is_stalled())
    }
}
