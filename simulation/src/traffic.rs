//! Placement and coloring of the traffic cars.

use crate::car::{Car, Rgb};
use crate::controls::ControlType;
use crate::road::Road;
use serde::{Deserialize, Serialize};

/// One traffic car waiting on a lane at a given height.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrafficSlot {
    pub lane: usize,
    pub y: f32,
}

/// The named traffic arrangements selectable in the configuration.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub enum TrafficPreset {
    /// A single car straight ahead in the middle lane.
    Single,
    /// Seven cars in four rows on three lanes. Narrower roads lose the cars that would block
    /// a row completely.
    #[default]
    Standard,
    /// Rows of one or two cars at random lanes.
    Random { rows: usize, spacing: f32 },
    /// Explicit slots.
    Custom(Vec<TrafficSlot>),
}

impl TrafficPreset {
    /// Resolves the preset into concrete slots for a road with `lane_count` lanes.
    pub fn slots(&self, lane_count: usize, rng: &mut fastrand::Rng) -> Vec<TrafficSlot> {
        let slot = |lane, y| TrafficSlot { lane, y };
        match self {
            TrafficPreset::Single => vec![slot(1, -100.0)],
            TrafficPreset::Standard => fit_to_road(
                vec![
                    slot(1, -100.0),
                    slot(0, -300.0),
                    slot(2, -300.0),
                    slot(0, -500.0),
                    slot(1, -500.0),
                    slot(1, -700.0),
                    slot(2, -700.0),
                ],
                lane_count,
            ),
            TrafficPreset::Random { rows, spacing } => {
                random_rows(*rows, *spacing, lane_count.max(1), rng)
            }
            TrafficPreset::Custom(slots) => slots.clone(),
        }
    }
}

/// Drops slots beyond the last lane and caps every row so one lane stays open, as long as
/// the road has more than one.
fn fit_to_road(slots: Vec<TrafficSlot>, lane_count: usize) -> Vec<TrafficSlot> {
    let max_per_row = lane_count.saturating_sub(1).max(1);
    let mut kept: Vec<TrafficSlot> = Vec::with_capacity(slots.len());
    for slot in slots.into_iter().filter(|slot| slot.lane < lane_count) {
        let in_row = kept.iter().filter(|other| other.y == slot.y).count();
        if in_row < max_per_row {
            kept.push(slot);
        }
    }
    kept
}

/// Every row starts `spacing` further up the road. A row blocks one or two lanes and
/// leaves one open whenever the road has more than one.
fn random_rows(
    rows: usize,
    spacing: f32,
    lane_count: usize,
    rng: &mut fastrand::Rng,
) -> Vec<TrafficSlot> {
    let max_blocked = (lane_count - 1).clamp(1, 2);
    let mut result = Vec::new();
    for row in 0..rows {
        let y = -100.0 - row as f32 * spacing;
        let blocked = rng.usize(1..=max_blocked);
        let mut lanes: Vec<usize> = (0..lane_count).collect();
        rng.shuffle(&mut lanes);
        result.extend(
            lanes
                .into_iter()
                .take(blocked)
                .map(|lane| TrafficSlot { lane, y }),
        );
    }
    result
}

/// Converts HSL (hue in degrees, saturation and lightness in 0..=1) to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb {
    let hue = hue.rem_euclid(360.0);
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue / 60.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma / 2.0;
    Rgb {
        r: r + m,
        g: g + m,
        b: b + m,
    }
}

/// A saturated traffic color. The hue range skips blue so traffic never looks like the
/// cars under test.
pub fn random_traffic_color(rng: &mut fastrand::Rng) -> Rgb {
    let hue = 290.0 + rng.f32() * 260.0;
    hsl_to_rgb(hue, 1.0, 0.6)
}

/// Builds the traffic cars on the given road.
pub fn spawn_traffic(
    road: &Road,
    slots: &[TrafficSlot],
    car_size: (f32, f32),
    max_speed: f32,
    rng: &mut fastrand::Rng,
) -> Vec<Car> {
    slots
        .iter()
        .map(|slot| {
            Car::new(
                road.lane_center(slot.lane),
                slot.y,
                car_size.0,
                car_size.1,
                ControlType::Dummy,
                max_speed,
            )
            .with_color(random_traffic_color(rng))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Rgb, b: Rgb) -> bool {
        (a.r - b.r).abs() < 1e-4 && (a.g - b.g).abs() < 1e-4 && (a.b - b.b).abs() < 1e-4
    }

    #[test]
    fn hsl_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), Rgb { r: 1.0, g: 0.0, b: 0.0 }));
        assert!(close(hsl_to_rgb(120.0, 1.0, 0.5), Rgb { r: 0.0, g: 1.0, b: 0.0 }));
        assert!(close(hsl_to_rgb(240.0, 1.0, 0.5), Rgb { r: 0.0, g: 0.0, b: 1.0 }));
        assert!(close(hsl_to_rgb(360.0, 1.0, 0.5), Rgb { r: 1.0, g: 0.0, b: 0.0 }));
    }

    #[test]
    fn standard_layout_keeps_a_lane_open_per_row() {
        let mut rng = fastrand::Rng::with_seed(1);
        let slots = TrafficPreset::Standard.slots(3, &mut rng);
        assert_eq!(slots.len(), 7);
        for y in [-100.0, -300.0, -500.0, -700.0] {
            assert!(slots.iter().filter(|slot| slot.y == y).count() < 3);
        }
    }

    #[test]
    fn standard_layout_shrinks_with_the_road() {
        let mut rng = fastrand::Rng::with_seed(1);
        let road = Road::new(100.0, 180.0, 2);
        let slots = TrafficPreset::Standard.slots(2, &mut rng);
        assert_eq!(slots.len(), 4);
        for y in [-100.0, -300.0, -500.0, -700.0] {
            let mut centers: Vec<f32> = slots
                .iter()
                .filter(|slot| slot.y == y)
                .map(|slot| road.lane_center(slot.lane))
                .collect();
            centers.dedup();
            assert_eq!(centers.len(), 1, "row {y} blocks every lane");
        }
        assert!(slots.iter().all(|slot| slot.lane < 2));
    }

    #[test]
    fn random_rows_never_block_the_road() {
        let mut rng = fastrand::Rng::with_seed(42);
        let slots = TrafficPreset::Random {
            rows: 50,
            spacing: 200.0,
        }
        .slots(3, &mut rng);
        for row in 0..50 {
            let y = -100.0 - row as f32 * 200.0;
            let in_row: Vec<_> = slots.iter().filter(|slot| slot.y == y).collect();
            assert!(!in_row.is_empty() && in_row.len() <= 2);
            assert!(in_row.iter().all(|slot| slot.lane < 3));
        }
    }

    #[test]
    fn traffic_drives_forward_in_lane() {
        let mut rng = fastrand::Rng::with_seed(3);
        let road = Road::new(100.0, 180.0, 3);
        let traffic = spawn_traffic(
            &road,
            &TrafficPreset::Single.slots(3, &mut rng),
            (30.0, 50.0),
            2.0,
            &mut rng,
        );
        assert_eq!(traffic.len(), 1);
        assert_eq!(traffic[0].x, road.lane_center(1));
        assert!(traffic[0].controls.forward);
        assert!(traffic[0].sensor.is_none());
    }
}
