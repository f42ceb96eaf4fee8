//! The egui control panel: brain persistence, generation handling and run settings.

use egui_macroquad::egui;
use simulation::controls::ControlType;

/// Limits of the population slider.
const MAX_POPULATION: usize = 500;

/// Defines the global style for the GUI, mostly sets font sizes.
pub fn gui_setup() {
    egui_macroquad::ui(|egui_ctx| {
        let mut style = (*egui_ctx.style()).clone();

        style.text_styles = [
            (egui::TextStyle::Body, egui::FontId::proportional(16.0)),
            (egui::TextStyle::Button, egui::FontId::proportional(16.0)),
            (egui::TextStyle::Heading, egui::FontId::proportional(20.0)),
            (egui::TextStyle::Monospace, egui::FontId::monospace(14.0)),
            (egui::TextStyle::Small, egui::FontId::proportional(12.0)),
        ]
        .into();

        style.visuals.override_text_color = Some(egui::Color32::WHITE);
        egui_ctx.set_style(style);
    });
    egui_macroquad::draw();
}

/// The numbers shown in the status part of the panel.
pub struct RunStatus {
    pub generation: u32,
    pub intact_cars: usize,
    pub total_cars: usize,
    pub progress: f32,
    pub has_stored_brain: bool,
    pub paused: bool,
}

/// What the user asked for in this frame.
#[derive(PartialEq, Debug)]
pub enum PanelAction {
    /// Nothing was clicked.
    Pending,
    /// Store the brain of the best car.
    SaveBrain,
    /// Forget the stored brain.
    DiscardBrain,
    /// Start over with the stored brain as seed.
    NextGeneration,
    /// Toggle the simulation.
    TogglePause,
    /// Rebuild the world with the settings of the panel.
    Restart {
        control_mode: ControlType,
        population: usize,
    },
}

/// The editable settings of the panel. Mutation amount and auto evolution apply on the fly,
/// mode and population only on restart.
pub struct ControlPanel {
    pub control_mode: ControlType,
    pub population: usize,
    pub mutation_amount: f32,
    pub auto_evolve: bool,
}

impl ControlPanel {
    pub fn new(
        control_mode: ControlType,
        population: usize,
        mutation_amount: f32,
        auto_evolve: bool,
    ) -> Self {
        ControlPanel {
            control_mode,
            population,
            mutation_amount,
            auto_evolve,
        }
    }

    /// Shows the panel anchored at the upper right corner. An error that should be displayed
    /// is handed over if necessary.
    pub fn handle_panel(&mut self, status: &RunStatus, error: &Option<String>) -> PanelAction {
        let mut result = PanelAction::Pending;

        egui_macroquad::ui(|egui_ctx| {
            egui::Window::new("Self-driving car")
                .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
                .resizable(false)
                .show(egui_ctx, |ui| {
                    ui.label(format!("Generation: {}", status.generation));
                    ui.label(format!(
                        "Intact cars: {} / {}",
                        status.intact_cars, status.total_cars
                    ));
                    ui.label(format!("Distance: {:.0}", status.progress));
                    ui.label(if status.has_stored_brain {
                        "A brain is stored."
                    } else {
                        "No brain stored."
                    });
                    ui.separator();

                    ui.horizontal(|ui| {
                        if ui.button("Save brain").clicked() {
                            result = PanelAction::SaveBrain;
                        }
                        if ui.button("Discard brain").clicked() {
                            result = PanelAction::DiscardBrain;
                        }
                    });
                    ui.horizontal(|ui| {
                        if ui.button("Next generation").clicked() {
                            result = PanelAction::NextGeneration;
                        }
                        let pause_text = if status.paused { "Resume" } else { "Pause" };
                        if ui.button(pause_text).clicked() {
                            result = PanelAction::TogglePause;
                        }
                    });
                    ui.separator();

                    ui.add(
                        egui::Slider::new(&mut self.mutation_amount, 0.0..=1.0)
                            .text("Mutation"),
                    );
                    ui.checkbox(&mut self.auto_evolve, "Evolve on crash or stall");
                    ui.separator();

                    ui.horizontal(|ui| {
                        ui.label("Driver:");
                        ui.radio_value(&mut self.control_mode, ControlType::Ai, "network");
                        ui.radio_value(&mut self.control_mode, ControlType::Keys, "keyboard");
                    });
                    ui.add_enabled(
                        self.control_mode == ControlType::Ai,
                        egui::Slider::new(&mut self.population, 1..=MAX_POPULATION)
                            .text("Cars"),
                    );
                    if ui.button("Restart").clicked() {
                        result = PanelAction::Restart {
                            control_mode: self.control_mode,
                            population: self.population,
                        };
                    }

                    if let Some(error_str) = error {
                        ui.separator();
                        ui.label(egui::RichText::new(error_str).color(egui::Color32::RED));
                    }
                });
        });
        egui_macroquad::draw();
        result
    }
}
