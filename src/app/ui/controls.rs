use std::ops::RangeInclusive;

use eframe::egui::{self, RichText, Ui};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::layout::LayoutState;

use super::super::ViewModel;

fn tuning_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    label: &str,
    hint: &str,
) -> bool {
    ui.add(
        egui::Slider::new(value, range)
            .text(label)
            .clamping(egui::SliderClamping::Always),
    )
    .on_hover_text(hint)
    .changed()
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout");
        ui.add_space(4.0);

        ui.checkbox(&mut self.live_physics, "Live physics simulation")
            .on_hover_text("Keep stepping layout forces while the graph is visible.");

        let mut layout = self.config.layout;
        let mut changed = false;

        ui.collapsing("Physics tuning", |ui| {
            changed |= tuning_slider(
                ui,
                &mut layout.link_distance,
                20.0..=400.0,
                "Link distance",
                "Rest length of relation springs.",
            );
            changed |= tuning_slider(
                ui,
                &mut layout.charge_strength,
                -1000.0..=0.0,
                "Charge",
                "Many-body strength; more negative pushes models further apart.",
            );
            changed |= tuning_slider(
                ui,
                &mut layout.collision_padding,
                0.0..=80.0,
                "Collision padding",
                "Extra clearance kept around every model.",
            );
            changed |= tuning_slider(
                ui,
                &mut layout.velocity_decay,
                0.05..=0.9,
                "Velocity decay",
                "Fraction of velocity lost on each tick.",
            );

            if ui.button("Reset to defaults").clicked() {
                layout = LayoutConfig::default();
                changed = true;
            }
        });

        if changed {
            self.apply_layout_config(layout);
        }

        let simulation = self.graph_view.simulation();
        let status = match simulation.state() {
            LayoutState::Idle => "idle".to_owned(),
            LayoutState::Initializing => "starting".to_owned(),
            LayoutState::Simulating => format!("running, alpha {:.3}", simulation.alpha()),
            LayoutState::Settled => format!("settled after {} ticks", simulation.ticks()),
        };
        ui.label(RichText::new(format!("Layout {status}")).small());
    }

    pub(in crate::app) fn apply_layout_config(&mut self, layout: LayoutConfig) {
        debug!(?layout, "layout tuning changed");
        self.config.layout = layout;
        self.graph_view.set_layout_config(layout);
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::config::ExplorerConfig;
    use crate::schema::{Model, Schema};

    use super::*;

    #[test]
    fn tuning_reheats_settled_layout() {
        let schema = Schema {
            models: vec![
                Model {
                    name: "A".to_owned(),
                    ..Model::default()
                },
                Model {
                    name: "B".to_owned(),
                    ..Model::default()
                },
            ],
        };
        let mut model = ViewModel::new(schema, ExplorerConfig::default());
        model.graph_view.observe_size(vec2(800.0, 600.0));
        model
            .graph_view
            .sync(&model.schema, model.revision, model.selected.as_deref());
        while model.graph_view.simulation().is_active() {
            model.graph_view.step();
        }

        let layout = LayoutConfig {
            link_distance: 120.0,
            ..LayoutConfig::default()
        };
        model.apply_layout_config(layout);

        assert_eq!(model.config.layout.link_distance, 120.0);
        assert_eq!(model.graph_view.simulation().config().link_distance, 120.0);
        assert_eq!(model.graph_view.simulation().state(), LayoutState::Simulating);
    }
}
