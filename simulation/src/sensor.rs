//! Distance sensor of a car, a fan of rays cast forward.

use crate::geometry::{Point, Touch, lerp, polygon_edges, segment_intersection};
use crate::road::Border;
use std::f32::consts::PI;

/// The default amount of rays.
pub const DEFAULT_RAY_COUNT: usize = 5;
/// The default reach of a ray in world units.
pub const DEFAULT_RAY_LENGTH: f32 = 150.0;
/// The default opening angle of the whole fan.
pub const DEFAULT_RAY_SPREAD: f32 = PI / 2.0;

/// A single ray from the car center outwards.
pub type Ray = [Point; 2];

#[derive(Debug, Clone)]
pub struct Sensor {
    pub ray_count: usize,
    pub ray_length: f32,
    pub ray_spread: f32,
    /// The rays of the last update.
    pub rays: Vec<Ray>,
    /// The closest hit per ray of the last update, `None` when the ray hit nothing.
    pub readings: Vec<Option<Touch>>,
}

impl Default for Sensor {
    fn default() -> Self {
        Sensor::new(DEFAULT_RAY_COUNT, DEFAULT_RAY_LENGTH, DEFAULT_RAY_SPREAD)
    }
}

impl Sensor {
    pub fn new(ray_count: usize, ray_length: f32, ray_spread: f32) -> Self {
        Sensor {
            ray_count,
            ray_length,
            ray_spread,
            rays: Vec::with_capacity(ray_count),
            readings: Vec::with_capacity(ray_count),
        }
    }

    /// Recasts the rays from the car pose and measures the closest obstacle for each of them.
    ///
    /// # Arguments
    /// * `origin`: The center of the car.
    /// * `angle`: The heading of the car, 0 points up the road.
    /// * `borders`: The road borders.
    /// * `obstacles`: The polygons of all other cars that can be seen.
    pub fn update(&mut self, origin: Point, angle: f32, borders: &[Border], obstacles: &[&[Point]]) {
        self.cast_rays(origin, angle);
        self.readings = self
            .rays
            .iter()
            .map(|ray| Self::reading(ray, borders, obstacles))
            .collect();
    }

    /// The network inputs: 0 for nothing in sight, approaching 1 the closer the hit is.
    pub fn offsets(&self) -> Vec<f32> {
        self.readings
            .iter()
            .map(|reading| reading.map_or(0.0, |touch| 1.0 - touch.offset))
            .collect()
    }

    fn cast_rays(&mut self, origin: Point, angle: f32) {
        let half_spread = self.ray_spread / 2.0;
        let ray_count = self.ray_count;
        let ray_length = self.ray_length;
        self.rays = (0..ray_count)
            .map(|i| {
                let t = if ray_count == 1 {
                    0.5
                } else {
                    i as f32 / (ray_count - 1) as f32
                };
                let ray_angle = lerp(half_spread, -half_spread, t) + angle;
                let end = Point::new(
                    origin.x - ray_angle.sin() * ray_length,
                    origin.y - ray_angle.cos() * ray_length,
                );
                [origin, end]
            })
            .collect();
    }

    fn reading(ray: &Ray, borders: &[Border], obstacles: &[&[Point]]) -> Option<Touch> {
        let border_touches = borders
            .iter()
            .filter_map(|border| segment_intersection(ray[0], ray[1], border[0], border[1]));
        let obstacle_touches = obstacles.iter().flat_map(|polygon| {
            polygon_edges(polygon).filter_map(|(a, b)| segment_intersection(ray[0], ray[1], a, b))
        });

        border_touches
            .chain(obstacle_touches)
            .min_by(|first, second| first.offset.total_cmp(&second.offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_at(y: f32) -> Border {
        [Point::new(-1000.0, y), Point::new(1000.0, y)]
    }

    #[test]
    fn rays_fan_from_left_to_right() {
        let mut sensor = Sensor::default();
        sensor.update(Point::new(0.0, 0.0), 0.0, &[], &[]);
        assert_eq!(sensor.rays.len(), DEFAULT_RAY_COUNT);
        // First ray leans left, the middle one points straight up.
        assert!(sensor.rays[0][1].x < 0.0);
        assert!(sensor.rays[2][1].x.abs() < 1e-4);
        assert!((sensor.rays[2][1].y + DEFAULT_RAY_LENGTH).abs() < 1e-3);
        assert!(sensor.rays[4][1].x > 0.0);
    }

    #[test]
    fn single_ray_points_along_heading() {
        let mut sensor = Sensor::new(1, 100.0, PI / 2.0);
        sensor.update(Point::new(0.0, 0.0), 0.0, &[], &[]);
        assert!(sensor.rays[0][1].x.abs() < 1e-4);
        assert!((sensor.rays[0][1].y + 100.0).abs() < 1e-3);
    }

    #[test]
    fn nothing_in_sight_reads_zero() {
        let mut sensor = Sensor::default();
        sensor.update(Point::new(0.0, 0.0), 0.0, &[], &[]);
        assert!(sensor.readings.iter().all(Option::is_none));
        assert_eq!(sensor.offsets(), vec![0.0; DEFAULT_RAY_COUNT]);
    }

    #[test]
    fn closest_hit_wins() {
        let mut sensor = Sensor::new(1, 100.0, 0.0);
        sensor.update(
            Point::new(0.0, 0.0),
            0.0,
            &[wall_at(-80.0), wall_at(-25.0)],
            &[],
        );
        let touch = sensor.readings[0].expect("wall in sight");
        assert!((touch.offset - 0.25).abs() < 1e-5);
        assert!((sensor.offsets()[0] - 0.75).abs() < 1e-5);
    }

    #[test]
    fn traffic_polygons_are_seen() {
        let obstacle = [
            Point::new(-10.0, -60.0),
            Point::new(10.0, -60.0),
            Point::new(10.0, -40.0),
            Point::new(-10.0, -40.0),
        ];
        let mut sensor = Sensor::new(1, 100.0, 0.0);
        sensor.update(Point::new(0.0, 0.0), 0.0, &[], &[&obstacle]);
        let touch = sensor.readings[0].expect("car in sight");
        assert!((touch.point.y + 40.0).abs() < 1e-4);
    }
}
