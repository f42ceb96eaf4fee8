//! The car: kinematics, hull polygon, damage assessment and the sense-think-act step.

use crate::controls::{ControlType, Controls, KeyState};
use crate::error::{SimResult, SimulationError};
use crate::geometry::{Point, polygons_intersect};
use crate::network::NeuralNetwork;
use crate::road::Border;
use crate::sensor::Sensor;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Speed gained or lost per frame while pushing forward or reverse.
pub const ACCELERATION: f32 = 0.2;
/// Speed lost per frame when rolling.
pub const FRICTION: f32 = 0.05;
/// Heading change per frame while steering.
pub const STEERING_RATE: f32 = 0.03;
/// Top speed used when nothing else is requested.
pub const DEFAULT_MAX_SPEED: f32 = 3.0;
/// The network decides on forward, left, right and reverse.
pub const NETWORK_OUTPUTS: usize = 4;

/// A plain color, independent of any rendering backend. Channels are in 0..=1.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLUE: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 1.0,
    };
}

#[derive(Debug, Clone)]
pub struct Car {
    /// Center of the car.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub max_speed: f32,
    /// Heading in radians, 0 drives up the road, positive turns left.
    pub angle: f32,
    /// Set once the hull touched a border or another car. Damaged cars stop moving.
    pub damaged: bool,
    /// The four hull corners.
    pub polygon: Vec<Point>,
    pub control_type: ControlType,
    pub controls: Controls,
    pub sensor: Option<Sensor>,
    pub brain: Option<NeuralNetwork>,
    pub color: Rgb,
}

impl Car {
    /// Creates a car without sensor and brain, as used for traffic.
    pub fn new(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        control_type: ControlType,
        max_speed: f32,
    ) -> Self {
        let mut car = Car {
            x,
            y,
            width,
            height,
            speed: 0.0,
            max_speed,
            angle: 0.0,
            damaged: false,
            polygon: Vec::with_capacity(4),
            control_type,
            controls: Controls::new(control_type),
            sensor: None,
            brain: None,
            color: Rgb::BLUE,
        };
        car.polygon = car.create_polygon();
        car
    }

    /// Equips the car with a sensor and the brain that reads it.
    ///
    /// # Errors
    /// The brain must take one input per ray and produce [`NETWORK_OUTPUTS`] outputs.
    pub fn with_brain(mut self, sensor: Sensor, brain: NeuralNetwork) -> SimResult<Self> {
        let topology = brain.topology();
        if topology.first() != Some(&sensor.ray_count) || topology.last() != Some(&NETWORK_OUTPUTS)
        {
            return Err(SimulationError::InvalidTopology(format!(
                "brain {topology:?} does not fit {} rays and {NETWORK_OUTPUTS} outputs",
                sensor.ray_count
            )));
        }
        self.sensor = Some(sensor);
        self.brain = Some(brain);
        Ok(self)
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Hands the keyboard to a player controlled car, other cars ignore it.
    pub fn apply_keys(&mut self, keys: KeyState) {
        if self.control_type == ControlType::Keys {
            self.controls.apply_keys(keys);
        }
    }

    /// Advances the car by one frame.
    ///
    /// An intact car moves and checks for damage first. A car with a sensor then reads it,
    /// and a network driven car lets its brain decide the controls for the next frame.
    pub fn update(&mut self, borders: &[Border], obstacles: &[&[Point]]) -> SimResult<()> {
        if !self.damaged {
            self.move_car();
            self.polygon = self.create_polygon();
            self.damaged = self.assess_damage(borders, obstacles);
        }

        let origin = self.position();
        let angle = self.angle;
        if let Some(sensor) = self.sensor.as_mut() {
            sensor.update(origin, angle, borders, obstacles);
            let offsets = sensor.offsets();
            if let Some(brain) = self.brain.as_mut() {
                let outputs = brain.feed_forward(&offsets)?;
                if self.control_type == ControlType::Ai {
                    self.controls.apply_network_outputs(&outputs);
                }
            }
        }
        Ok(())
    }

    fn assess_damage(&self, borders: &[Border], obstacles: &[&[Point]]) -> bool {
        borders
            .iter()
            .any(|border| polygons_intersect(&self.polygon, border))
            || obstacles
                .iter()
                .any(|polygon| polygons_intersect(&self.polygon, polygon))
    }

    fn create_polygon(&self) -> Vec<Point> {
        let radius = self.width.hypot(self.height) / 2.0;
        let alpha = self.width.atan2(self.height);
        [
            self.angle - alpha,
            self.angle + alpha,
            PI + self.angle - alpha,
            PI + self.angle + alpha,
        ]
        .iter()
        .map(|corner_angle| {
            Point::new(
                self.x - corner_angle.sin() * radius,
                self.y - corner_angle.cos() * radius,
            )
        })
        .collect()
    }

    fn move_car(&mut self) {
        if self.controls.forward {
            self.speed += ACCELERATION;
        }
        if self.controls.reverse {
            self.speed -= ACCELERATION;
        }

        self.speed = self.speed.clamp(-self.max_speed / 2.0, self.max_speed);

        if self.speed > 0.0 {
            self.speed -= FRICTION;
        }
        if self.speed < 0.0 {
            self.speed += FRICTION;
        }
        if self.speed.abs() < FRICTION {
            self.speed = 0.0;
        }

        if self.speed != 0.0 {
            let flip = if self.speed > 0.0 { 1.0 } else { -1.0 };
            if self.controls.left {
                self.angle += STEERING_RATE * flip;
            }
            if self.controls.right {
                self.angle -= STEERING_RATE * flip;
            }
        }

        self.x -= self.angle.sin() * self.speed;
        self.y -= self.angle.cos() * self.speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::Road;

    fn player() -> Car {
        Car::new(100.0, 100.0, 30.0, 50.0, ControlType::Keys, DEFAULT_MAX_SPEED)
    }

    fn press(car: &mut Car, up: bool, down: bool, left: bool, right: bool) {
        car.apply_keys(KeyState {
            up,
            down,
            left,
            right,
        });
    }

    #[test]
    fn polygon_spans_car_size() {
        let car = player();
        let min_x = car.polygon.iter().map(|p| p.x).fold(f32::MAX, f32::min);
        let max_x = car.polygon.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let min_y = car.polygon.iter().map(|p| p.y).fold(f32::MAX, f32::min);
        let max_y = car.polygon.iter().map(|p| p.y).fold(f32::MIN, f32::max);
        assert!((max_x - min_x - 30.0).abs() < 1e-3);
        assert!((max_y - min_y - 50.0).abs() < 1e-3);
    }

    #[test]
    fn forward_accelerates_up_the_road_to_top_speed() {
        let mut car = player();
        press(&mut car, true, false, false, false);
        for _ in 0..100 {
            car.update(&[], &[]).unwrap();
        }
        assert!(car.y < 100.0);
        assert!((car.speed - (DEFAULT_MAX_SPEED - FRICTION)).abs() < 1e-4);
        assert_eq!(car.x, 100.0);
    }

    #[test]
    fn reverse_is_capped_at_half_speed() {
        let mut car = player();
        press(&mut car, false, true, false, false);
        for _ in 0..100 {
            car.update(&[], &[]).unwrap();
        }
        assert!(car.y > 100.0);
        assert!((car.speed + DEFAULT_MAX_SPEED / 2.0 - FRICTION).abs() < 1e-4);
    }

    #[test]
    fn friction_brings_car_to_rest() {
        let mut car = player();
        press(&mut car, true, false, false, false);
        for _ in 0..10 {
            car.update(&[], &[]).unwrap();
        }
        press(&mut car, false, false, false, false);
        for _ in 0..200 {
            car.update(&[], &[]).unwrap();
        }
        assert_eq!(car.speed, 0.0);
    }

    #[test]
    fn steering_needs_motion() {
        let mut car = player();
        press(&mut car, false, false, true, false);
        car.update(&[], &[]).unwrap();
        assert_eq!(car.angle, 0.0);

        press(&mut car, true, false, true, false);
        car.update(&[], &[]).unwrap();
        assert!(car.angle > 0.0);
    }

    #[test]
    fn steering_flips_when_reversing() {
        let mut car = player();
        press(&mut car, false, true, true, false);
        car.update(&[], &[]).unwrap();
        car.update(&[], &[]).unwrap();
        assert!(car.angle < 0.0);
    }

    #[test]
    fn keys_are_ignored_by_other_cars() {
        let mut car = Car::new(0.0, 0.0, 30.0, 50.0, ControlType::Ai, 3.0);
        press(&mut car, true, false, false, false);
        assert!(!car.controls.forward);
    }

    #[test]
    fn hitting_the_border_damages_and_freezes() {
        let road = Road::new(100.0, 180.0, 3);
        let mut car = Car::new(road.left + 5.0, 0.0, 30.0, 50.0, ControlType::Dummy, 3.0);
        car.update(&road.borders, &[]).unwrap();
        assert!(car.damaged);
        let frozen = (car.x, car.y);
        car.update(&road.borders, &[]).unwrap();
        assert_eq!((car.x, car.y), frozen);
    }

    #[test]
    fn overlapping_traffic_damages() {
        let blocker = Car::new(110.0, 80.0, 30.0, 50.0, ControlType::Dummy, 2.0);
        let mut car = player();
        car.update(&[], &[&blocker.polygon]).unwrap();
        assert!(car.damaged);
    }

    #[test]
    fn brain_must_fit_sensor() {
        let mut rng = fastrand::Rng::with_seed(5);
        let sensor = Sensor::default();
        let wrong = NeuralNetwork::new(&[3, 6, 4], &mut rng).unwrap();
        assert!(player().with_brain(sensor.clone(), wrong).is_err());

        let fitting = NeuralNetwork::new(&[sensor.ray_count, 6, NETWORK_OUTPUTS], &mut rng).unwrap();
        let car = player().with_brain(sensor, fitting).unwrap();
        assert!(car.sensor.is_some() && car.brain.is_some());
    }

    #[test]
    fn network_drives_ai_car() {
        let mut rng = fastrand::Rng::with_seed(5);
        let sensor = Sensor::default();
        let mut brain = NeuralNetwork::new(&[sensor.ray_count, NETWORK_OUTPUTS], &mut rng).unwrap();
        // Forward always fires, everything else never does.
        for row in brain.levels[0].weights.iter_mut() {
            row.fill(0.0);
        }
        brain.levels[0].biases = vec![-1.0, 1.0, 1.0, 1.0];

        let mut car = Car::new(100.0, 100.0, 30.0, 50.0, ControlType::Ai, 3.0)
            .with_brain(sensor, brain)
            .unwrap();
        car.update(&[], &[]).unwrap();
        assert!(car.controls.forward);
        assert!(!car.controls.left && !car.controls.right && !car.controls.reverse);
        car.update(&[], &[]).unwrap();
        assert!(car.y < 100.0);
    }
}
