//! Shows the inner state of a network: one row of nodes per layer, links colored by weight.
//!
//! Positive values are drawn green, the others red, and the opacity follows the magnitude.
//! A bright link therefore means a strong influence of its input on the node above, a faint
//! one barely matters.

use crate::render_system::painter::{Panel, draw_dashed_line};
use macroquad::prelude::*;
use simulation::geometry::lerp;
use simulation::network::{Level, NeuralNetwork};
use std::f32::consts::PI;

/// Free space around the drawing.
const MARGIN: f32 = 50.0;
const NODE_RADIUS: f32 = 18.0;
const LINK_WIDTH: f32 = 2.0;
/// Dash pattern of the links.
const LINK_DASH: f32 = 7.0;
const LINK_GAP: f32 = 3.0;
/// Dash pattern of the bias ring.
const BIAS_DASH: f32 = 3.0;
/// Speed of the running dashes in pixels per second.
const DASH_SPEED: f32 = 20.0;

/// The outputs of the last layer stand for these directions.
#[derive(Clone, Copy)]
enum Arrow {
    Up,
    Left,
    Right,
    Down,
}

const OUTPUT_LABELS: [Arrow; 4] = [Arrow::Up, Arrow::Left, Arrow::Right, Arrow::Down];

/// Green for positive values, red otherwise, opacity by magnitude.
pub fn value_color(value: f32) -> Color {
    let alpha = value.abs().min(1.0);
    if value > 0.0 {
        Color::new(0.0, 1.0, 0.0, alpha)
    } else {
        Color::new(1.0, 0.0, 0.0, alpha)
    }
}

/// Horizontal position of node `index` out of `count`, a single node sits in the middle.
fn node_x(count: usize, index: usize, left: f32, right: f32) -> f32 {
    let t = if count == 1 {
        0.5
    } else {
        index as f32 / (count - 1) as f32
    };
    lerp(left, right, t)
}

/// Draws the whole network into the panel. `time` in seconds drives the dash animation.
pub fn draw_network(panel: Panel, network: &NeuralNetwork, time: f32) {
    let left = panel.left + MARGIN;
    let top = panel.top + MARGIN;
    let width = panel.width - MARGIN * 2.0;
    let height = panel.height - MARGIN * 2.0;
    let level_count = network.levels.len();
    if level_count == 0 || width <= 0.0 || height <= 0.0 {
        return;
    }

    let level_height = height / level_count as f32;
    let phase = -time * DASH_SPEED;

    for (index, level) in network.levels.iter().enumerate().rev() {
        let t = if level_count == 1 {
            0.5
        } else {
            index as f32 / (level_count - 1) as f32
        };
        let level_top = top + lerp(height - level_height, 0.0, t);
        let labels: &[Arrow] = if index == level_count - 1 {
            &OUTPUT_LABELS
        } else {
            &[]
        };
        draw_level(level, left, level_top, width, level_height, labels, phase);
    }
}

fn draw_level(
    level: &Level,
    left: f32,
    top: f32,
    width: f32,
    height: f32,
    labels: &[Arrow],
    phase: f32,
) {
    let right = left + width;
    let bottom = top + height;
    let input_count = level.inputs.len();
    let output_count = level.outputs.len();

    for (i, weights) in level.weights.iter().enumerate() {
        for (j, weight) in weights.iter().enumerate() {
            draw_dashed_line(
                vec2(node_x(input_count, i, left, right), bottom),
                vec2(node_x(output_count, j, left, right), top),
                LINK_DASH,
                LINK_GAP,
                phase,
                LINK_WIDTH,
                value_color(*weight),
            );
        }
    }

    for (i, input) in level.inputs.iter().enumerate() {
        draw_node(node_x(input_count, i, left, right), bottom, *input);
    }

    for (j, output) in level.outputs.iter().enumerate() {
        let x = node_x(output_count, j, left, right);
        draw_node(x, top, *output);
        if let Some(bias) = level.biases.get(j) {
            draw_dashed_ring(x, top, NODE_RADIUS * 0.8, value_color(*bias), phase);
        }
        if let Some(arrow) = labels.get(j) {
            draw_arrow(*arrow, x, top, NODE_RADIUS * 0.75);
        }
    }
}

/// A black disc with an inner disc showing the value.
fn draw_node(x: f32, y: f32, value: f32) {
    draw_circle(x, y, NODE_RADIUS, BLACK);
    draw_circle(x, y, NODE_RADIUS * 0.6, value_color(value));
}

/// Draws a dashed circle from short chords.
fn draw_dashed_ring(x: f32, y: f32, radius: f32, color: Color, phase: f32) {
    let circumference = 2.0 * PI * radius;
    let dash_count = (circumference / (BIAS_DASH * 2.0)).floor().max(1.0) as usize;
    let step = 2.0 * PI / dash_count as f32;
    let rotation = phase / radius;
    for dash in 0..dash_count {
        let start = rotation + dash as f32 * step;
        let end = start + step / 2.0;
        draw_line(
            x + start.cos() * radius,
            y + start.sin() * radius,
            x + end.cos() * radius,
            y + end.sin() * radius,
            LINK_WIDTH,
            color,
        );
    }
}

/// Paints a direction label as a white arrow with black outline.
fn draw_arrow(arrow: Arrow, x: f32, y: f32, size: f32) {
    let direction = match arrow {
        Arrow::Up => vec2(0.0, -1.0),
        Arrow::Down => vec2(0.0, 1.0),
        Arrow::Left => vec2(-1.0, 0.0),
        Arrow::Right => vec2(1.0, 0.0),
    };
    let normal = vec2(-direction.y, direction.x);
    let center = vec2(x, y);
    let tip = center + direction * size;
    let base = center + direction * (size * 0.1);
    let tail = center - direction * size;

    draw_line(tail.x, tail.y, base.x, base.y, size * 0.35, BLACK);
    draw_line(tail.x, tail.y, base.x, base.y, size * 0.2, WHITE);
    let head_left = base + normal * (size * 0.55);
    let head_right = base - normal * (size * 0.55);
    draw_triangle(tip, head_left, head_right, WHITE);
    draw_triangle_lines(tip, head_left, head_right, 1.0, BLACK);
}
