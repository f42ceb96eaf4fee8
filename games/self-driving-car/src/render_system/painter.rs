//! Draws the road view: lane markings, traffic, the cars under test and the sensor rays.

use macroquad::prelude::*;
use simulation::car::{Car, Rgb};
use simulation::geometry::Point;
use simulation::world::World;

/// The background of the road view.
const ROAD_COLOR: Color = LIGHTGRAY;
/// Width of lane markings and borders.
const MARKING_WIDTH: f32 = 5.0;
/// Dash and gap length of the lane markings.
const LANE_DASH: f32 = 20.0;
/// Opacity of the cars that are not the best one.
const FOLLOWER_ALPHA: f32 = 0.2;
/// Width of a sensor ray.
const RAY_WIDTH: f32 = 2.0;

/// A rectangular area of the window. Origin is in the upper left corner, y grows downwards.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Panel {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Panel {
    pub fn fill(&self, color: Color) {
        draw_rectangle(self.left, self.top, self.width, self.height, color);
    }

    /// The strips above, below, left and right of the panel up to the screen border. Filling
    /// them hides whatever got drawn past the panel edges.
    pub fn surroundings(&self, screen_width: f32, screen_height: f32) -> [Panel; 4] {
        let right = self.left + self.width;
        let bottom = self.top + self.height;
        [
            Panel {
                left: 0.0,
                top: 0.0,
                width: screen_width,
                height: self.top,
            },
            Panel {
                left: 0.0,
                top: bottom,
                width: screen_width,
                height: (screen_height - bottom).max(0.0),
            },
            Panel {
                left: 0.0,
                top: self.top,
                width: self.left,
                height: self.height,
            },
            Panel {
                left: right,
                top: self.top,
                width: (screen_width - right).max(0.0),
                height: self.height,
            },
        ]
    }
}

/// Converts a backend independent color.
pub fn to_color(rgb: Rgb, alpha: f32) -> Color {
    Color::new(rgb.r, rgb.g, rgb.b, alpha)
}

/// Draws a dashed line. `phase` shifts the dash pattern along the line, which lets markings
/// stay attached to the world while only a part of the line is drawn.
pub fn draw_dashed_line(
    from: Vec2,
    to: Vec2,
    dash: f32,
    gap: f32,
    phase: f32,
    thickness: f32,
    color: Color,
) {
    let length = from.distance(to);
    if length <= f32::EPSILON {
        return;
    }
    let direction = (to - from) / length;
    let period = dash + gap;
    let mut position = -phase.rem_euclid(period);
    while position < length {
        let start = position.max(0.0);
        let end = (position + dash).min(length);
        if end > start {
            let a = from + direction * start;
            let b = from + direction * end;
            draw_line(a.x, a.y, b.x, b.y, thickness, color);
        }
        position += period;
    }
}

/// Translates world points into the road panel, following the best car.
pub struct Painter {
    panel: Panel,
    /// Vertical translation of the world.
    offset_y: f32,
}

impl Painter {
    pub fn new(panel: Panel, world: &World) -> Self {
        Painter {
            panel,
            offset_y: world.camera_offset(panel.height),
        }
    }

    fn to_screen(&self, point: Point) -> Vec2 {
        vec2(
            self.panel.left + point.x,
            self.panel.top + point.y + self.offset_y,
        )
    }

    /// The world y range currently visible in the panel.
    fn visible_range(&self) -> (f32, f32) {
        (-self.offset_y, self.panel.height - self.offset_y)
    }

    /// Renders the complete road view.
    pub fn draw_world(&self, world: &World) {
        self.panel.fill(ROAD_COLOR);
        self.draw_road(world);

        for car in world.traffic.iter() {
            self.draw_car(car, 1.0);
        }
        let best = world.best_car();
        for car in world.cars.iter() {
            if !std::ptr::eq(car, best) {
                self.draw_car(car, FOLLOWER_ALPHA);
            }
        }
        self.draw_car(best, 1.0);
        self.draw_sensor(best);
    }

    fn draw_road(&self, world: &World) {
        let road = &world.road;
        let (visible_top, visible_bottom) = self.visible_range();
        let top = visible_top.max(road.top);
        let bottom = visible_bottom.min(road.bottom);

        for x in road.lane_divider_xs() {
            // Dashes are anchored at world y = 0 so they scroll with the road.
            draw_dashed_line(
                self.to_screen(Point::new(x, top)),
                self.to_screen(Point::new(x, bottom)),
                LANE_DASH,
                LANE_DASH,
                top,
                MARKING_WIDTH,
                WHITE,
            );
        }

        for border in road.borders.iter() {
            let from = self.to_screen(Point::new(border[0].x, top));
            let to = self.to_screen(Point::new(border[1].x, bottom));
            draw_line(from.x, from.y, to.x, to.y, MARKING_WIDTH, WHITE);
        }
    }

    fn draw_car(&self, car: &Car, alpha: f32) {
        let color = if car.damaged {
            Color { a: alpha, ..GRAY }
        } else {
            to_color(car.color, alpha)
        };
        if let [a, b, c, d] = car.polygon.as_slice() {
            let (a, b, c, d) = (
                self.to_screen(*a),
                self.to_screen(*b),
                self.to_screen(*c),
                self.to_screen(*d),
            );
            draw_triangle(a, b, c, color);
            draw_triangle(a, c, d, color);
        }
    }

    /// Yellow up to the closest hit, black for the part of the ray beyond it.
    fn draw_sensor(&self, car: &Car) {
        let Some(sensor) = car.sensor.as_ref() else {
            return;
        };
        for (ray, reading) in sensor.rays.iter().zip(sensor.readings.iter()) {
            let start = self.to_screen(ray[0]);
            let ray_end = self.to_screen(ray[1]);
            let end = reading.map_or(ray_end, |touch| self.to_screen(touch.point));

            draw_line(start.x, start.y, end.x, end.y, RAY_WIDTH, YELLOW);
            draw_line(ray_end.x, ray_end.y, end.x, end.y, RAY_WIDTH, BLACK);
        }
    }
}
