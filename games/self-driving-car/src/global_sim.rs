//! Contains the per-frame logic except for the main function.

use crate::render_system::gui::{ControlPanel, PanelAction, RunStatus};
use crate::render_system::painter::{Painter, Panel};
use crate::render_system::visualizer::draw_network;
use macroquad::color::{BLACK, Color, DARKGRAY};
use macroquad::input::{KeyCode, is_key_down};
use macroquad::window::{screen_height, screen_width};
use simulation::brain_store::BrainStore;
use simulation::config::SimulationConfig;
use simulation::controls::{ControlType, KeyState};
use simulation::error::SimResult;
use simulation::network::NeuralNetwork;
use simulation::world::World;

/// Space between the window border and the panels.
const PANEL_GAP: f32 = 10.0;
/// Window color around the panels.
pub const BACKGROUND: Color = DARKGRAY;
/// Width of the network view.
pub const NETWORK_VIEW_WIDTH: f32 = 300.0;

/// Contains the complete state of the running program.
pub struct GlobalData {
    /// The simulation proper.
    pub world: World,
    /// The settings panel on the right.
    control_panel: ControlPanel,
    /// Where the best brain gets saved to.
    brain_store: Box<dyn BrainStore>,
    /// Set when the store holds a brain, so the panel can show it.
    has_stored_brain: bool,
    /// The last error worth showing to the user.
    error_message: Option<String>,
    paused: bool,
}

impl GlobalData {
    /// Reads a stored brain if there is one and builds the first generation from it.
    pub fn new(config: SimulationConfig, mut brain_store: Box<dyn BrainStore>) -> SimResult<Self> {
        let mut error_message = None;
        let stored_brain = match brain_store.load() {
            Ok(brain) => brain,
            Err(error) => {
                tracing::warn!(%error, "Ignoring unreadable stored brain.");
                error_message = Some(format!("Stored brain ignored: {error}"));
                None
            }
        };
        let has_stored_brain = stored_brain.is_some();
        let control_panel = ControlPanel::new(
            config.control_mode,
            config.population,
            config.mutation_amount,
            config.auto_evolve,
        );

        Ok(GlobalData {
            world: World::new(config, stored_brain)?,
            control_panel,
            brain_store,
            has_stored_brain,
            error_message,
            paused: false,
        })
    }

    /// Reads the arrow keys.
    fn key_state() -> KeyState {
        KeyState {
            up: is_key_down(KeyCode::Up),
            down: is_key_down(KeyCode::Down),
            left: is_key_down(KeyCode::Left),
            right: is_key_down(KeyCode::Right),
        }
    }

    /// Advances the world by a frame and starts a new generation when the current one is over.
    pub fn update(&mut self, delta_time: f32) {
        if self.paused {
            return;
        }
        self.world.config.mutation_amount = self.control_panel.mutation_amount;
        self.world.config.auto_evolve = self.control_panel.auto_evolve;

        if let Err(error) = self.world.step(Self::key_state(), delta_time) {
            tracing::error!(%error, "Simulation step failed.");
            self.error_message = Some(error.to_string());
            self.paused = true;
            return;
        }

        if self.world.should_evolve() {
            tracing::info!(
                generation = self.world.generation,
                progress = self.world.progress(),
                "Generation is over, evolving."
            );
            self.save_best_brain();
            let seed = self.world.best_brain().cloned();
            self.restart_generation(seed);
        }
    }

    /// Draws the road view on the left and the network of the best car next to it.
    pub fn render(&self, time: f32) {
        let height = screen_height() - 2.0 * PANEL_GAP;
        let road_panel = Panel {
            left: PANEL_GAP,
            top: PANEL_GAP,
            width: self.world.config.road_view_width,
            height,
        };
        let network_panel = Panel {
            left: road_panel.left + road_panel.width + PANEL_GAP,
            top: PANEL_GAP,
            width: NETWORK_VIEW_WIDTH,
            height,
        };

        Painter::new(road_panel, &self.world).draw_world(&self.world);
        for strip in road_panel.surroundings(screen_width(), screen_height()) {
            strip.fill(BACKGROUND);
        }

        network_panel.fill(BLACK);
        if let Some(brain) = self.world.best_brain() {
            draw_network(network_panel, brain, time);
        }
    }

    /// Shows the control panel and carries out what got clicked.
    pub fn handle_gui(&mut self) {
        let status = RunStatus {
            generation: self.world.generation,
            intact_cars: self.world.intact_count(),
            total_cars: self.world.cars.len(),
            progress: self.world.progress(),
            has_stored_brain: self.has_stored_brain,
            paused: self.paused,
        };

        match self.control_panel.handle_panel(&status, &self.error_message) {
            PanelAction::Pending => {} // Nothing to do here.
            PanelAction::SaveBrain => self.save_best_brain(),
            PanelAction::DiscardBrain => self.discard_brain(),
            PanelAction::NextGeneration => {
                let seed = self.stored_brain();
                self.restart_generation(seed);
            }
            PanelAction::TogglePause => self.paused = !self.paused,
            PanelAction::Restart {
                control_mode,
                population,
            } => self.restart_with(control_mode, population),
        }
    }

    fn save_best_brain(&mut self) {
        let Some(brain) = self.world.best_brain() else {
            return;
        };
        match self.brain_store.save(brain) {
            Ok(()) => {
                self.has_stored_brain = true;
                self.error_message = None;
            }
            Err(error) => {
                tracing::error!(%error, "Saving the brain failed.");
                self.error_message = Some(error.to_string());
            }
        }
    }

    fn discard_brain(&mut self) {
        match self.brain_store.discard() {
            Ok(()) => {
                self.has_stored_brain = false;
                self.error_message = None;
            }
            Err(error) => {
                tracing::error!(%error, "Discarding the brain failed.");
                self.error_message = Some(error.to_string());
            }
        }
    }

    fn stored_brain(&mut self) -> Option<NeuralNetwork> {
        self.brain_store.load().unwrap_or_else(|error| {
            tracing::warn!(%error, "Ignoring unreadable stored brain.");
            self.error_message = Some(error.to_string());
            None
        })
    }

    fn restart_generation(&mut self, seed: Option<NeuralNetwork>) {
        if let Err(error) = self.world.next_generation(seed) {
            tracing::error!(%error, "Starting the next generation failed.");
            self.error_message = Some(error.to_string());
        }
    }

    /// Builds a fresh world, the new settings have to pass validation first.
    fn restart_with(&mut self, control_mode: ControlType, population: usize) {
        let config = SimulationConfig {
            control_mode,
            population,
            mutation_amount: self.control_panel.mutation_amount,
            auto_evolve: self.control_panel.auto_evolve,
            ..self.world.config.clone()
        };
        let seed = self.stored_brain();
        match World::new(config, seed) {
            Ok(world) => {
                self.world = world;
                self.paused = false;
            }
            Err(error) => {
                tracing::error!(%error, "Restart failed.");
                self.error_message = Some(error.to_string());
            }
        }
    }
}
