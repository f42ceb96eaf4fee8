//! A population of cars learns to drive through traffic on a multi-lane road.
//!
//! Left is the road with the best car in focus, next to it the network steering that car.
//! Start with `--keys` to drive a single car with the arrow keys instead.

#![windows_subsystem = "windows"]

mod global_sim;
mod render_system;
mod storage;

use crate::global_sim::{BACKGROUND, GlobalData, NETWORK_VIEW_WIDTH};
use crate::render_system::gui::gui_setup;
use macroquad::prelude::{Conf, clear_background, get_frame_time, get_time, next_frame};
use simulation::config::SimulationConfig;

/// Width of the window, leaves room for the control panel.
const WINDOW_WIDTH: i32 = 900;
/// Height of the window.
const WINDOW_HEIGHT: i32 = 800;

/// Sets the windows name and the required size.
fn window_conf() -> Conf {
    Conf {
        window_title: "Self-driving car".to_owned(),
        window_width: WINDOW_WIDTH,
        window_height: WINDOW_HEIGHT,
        ..Default::default()
    }
}

/// Logs to stdout, the filter can be overwritten with `RUST_LOG`.
#[cfg(not(target_arch = "wasm32"))]
fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=debug,simulation=info", env!("CARGO_CRATE_NAME")).into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true),
        )
        .init();
}

/// The settings shipped with the game, also used by the browser build.
const BUNDLED_CONFIG: &str = include_str!("../SimConfig.json");

fn bundled_config() -> SimulationConfig {
    SimulationConfig::from_json(BUNDLED_CONFIG).unwrap_or_else(|error| {
        tracing::warn!(%error, "Bundled config not usable, falling back to defaults.");
        SimulationConfig::default()
    })
}

/// Reads `SimConfig.json` from the working directory, without one the bundled settings apply.
/// `--keys` switches to the keyboard demo.
#[cfg(not(target_arch = "wasm32"))]
fn load_config() -> SimulationConfig {
    if std::env::args().any(|arg| arg == "--keys") {
        return SimulationConfig::keyboard_demo();
    }
    let path = std::path::Path::new(simulation::config::CONFIG_FILE);
    if !path.exists() {
        tracing::info!("No config file in the working directory, using the bundled one.");
        return bundled_config();
    }
    SimulationConfig::load(path).unwrap_or_else(|error| {
        tracing::warn!(%error, "Config not usable, falling back to the bundled one.");
        bundled_config()
    })
}

/// The browser has no config file. Without a fixed seed the clock provides one, as there is
/// no other entropy source without wasm-bindgen.
#[cfg(target_arch = "wasm32")]
fn load_config() -> SimulationConfig {
    let mut config = bundled_config();
    if config.seed.is_none() {
        config.seed = Some((macroquad::miniquad::date::now() * 1000.0) as u64);
    }
    config
}

#[macroquad::main(window_conf)]
async fn main() {
    //! Initializes the system and runs the core loop.
    //!
    //! # Panic
    //! Panics if even the default settings can not build a world.
    #[cfg(not(target_arch = "wasm32"))]
    init_tracing();

    let config = load_config();
    if config.road_view_width + NETWORK_VIEW_WIDTH > WINDOW_WIDTH as f32 {
        tracing::warn!(
            road_view_width = config.road_view_width,
            "Road view is too wide for the window, the network view gets cut off."
        );
    }

    let seed = config.seed;
    let mut global_data = match GlobalData::new(config, storage::platform_store()) {
        Ok(data) => data,
        Err(error) => {
            tracing::error!(%error, "Initial setup failed, retrying with defaults.");
            let fallback = SimulationConfig {
                seed,
                ..Default::default()
            };
            match GlobalData::new(fallback, storage::platform_store()) {
                Ok(data) => data,
                Err(error) => panic!("Initial setup error: {error}"),
            }
        }
    };

    gui_setup();
    loop {
        let delta_time = get_frame_time();
        global_data.update(delta_time);

        clear_background(BACKGROUND);
        global_data.render(get_time() as f32);
        global_data.handle_gui();

        next_frame().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_is_used_as_shipped() {
        let config = SimulationConfig::from_json(BUNDLED_CONFIG).unwrap();
        assert_eq!(bundled_config(), config);
        assert!(config.auto_evolve);
        assert_ne!(config, SimulationConfig::default());
    }
}
