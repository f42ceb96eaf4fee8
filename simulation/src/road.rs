//! The multi-lane road the cars drive on.

use crate::geometry::{Point, lerp};

/// Stand-in for an endless road in both directions.
const ROAD_INFINITY: f32 = 1_000_000.0;

/// A border is a single segment the cars must not cross.
pub type Border = [Point; 2];

/// A straight vertical road centered on `center_x`.
#[derive(Debug, Clone)]
pub struct Road {
    pub center_x: f32,
    pub width: f32,
    pub lane_count: usize,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    /// Left and right border in this order.
    pub borders: Vec<Border>,
}

impl Road {
    /// Creates a road. A lane count of zero is treated as a single lane.
    pub fn new(center_x: f32, width: f32, lane_count: usize) -> Self {
        let lane_count = lane_count.max(1);
        let left = center_x - width / 2.0;
        let right = center_x + width / 2.0;
        let top = -ROAD_INFINITY;
        let bottom = ROAD_INFINITY;

        let top_left = Point::new(left, top);
        let top_right = Point::new(right, top);
        let bottom_left = Point::new(left, bottom);
        let bottom_right = Point::new(right, bottom);

        Road {
            center_x,
            width,
            lane_count,
            left,
            right,
            top,
            bottom,
            borders: vec![[top_left, bottom_left], [top_right, bottom_right]],
        }
    }

    pub fn lane_width(&self) -> f32 {
        self.width / self.lane_count as f32
    }

    /// The x coordinate of the center of a lane. Indices past the last lane snap to it.
    pub fn lane_center(&self, lane_index: usize) -> f32 {
        let lane_width = self.lane_width();
        self.left + lane_width / 2.0 + lane_index.min(self.lane_count - 1) as f32 * lane_width
    }

    /// The x coordinates of the dashed markings between lanes.
    pub fn lane_divider_xs(&self) -> Vec<f32> {
        (1..self.lane_count)
            .map(|i| lerp(self.left, self.right, i as f32 / self.lane_count as f32))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_centers_split_road_evenly() {
        let road = Road::new(100.0, 180.0, 3);
        assert_eq!(road.lane_center(0), 40.0);
        assert_eq!(road.lane_center(1), 100.0);
        assert_eq!(road.lane_center(2), 160.0);
    }

    #[test]
    fn lane_index_past_end_snaps_to_last_lane() {
        let road = Road::new(100.0, 180.0, 3);
        assert_eq!(road.lane_center(7), road.lane_center(2));
    }

    #[test]
    fn borders_follow_road_edges() {
        let road = Road::new(100.0, 180.0, 3);
        assert_eq!(road.borders.len(), 2);
        assert_eq!(road.borders[0][0].x, 10.0);
        assert_eq!(road.borders[1][1].x, 190.0);
        assert!(road.borders[0][0].y < road.borders[0][1].y);
    }

    #[test]
    fn dividers_sit_between_lanes() {
        let road = Road::new(100.0, 180.0, 3);
        assert_eq!(road.lane_divider_xs(), vec![70.0, 130.0]);
        assert!(Road::new(100.0, 180.0, 1).lane_divider_xs().is_empty());
    }
}
