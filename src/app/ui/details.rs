use eframe::egui::{self, Color32, RichText, Ui};

use crate::schema::{Field, Model, TypeClass};

use super::super::render_utils::type_class_color;
use super::super::{DetailTab, ViewModel};

fn badge(ui: &mut Ui, text: &str, color: Color32) {
    ui.label(RichText::new(text).small().strong().color(color));
}

impl ViewModel {
    pub(in crate::app) fn draw_overview(&mut self, ui: &mut Ui) {
        ui.heading("Schema Overview");
        ui.add_space(6.0);
        ui.horizontal(|ui| {
            ui.label(format!("Models: {}", self.schema.models.len()));
            ui.separator();
            ui.label(format!("Fields: {}", self.schema.field_count()));
            ui.separator();
            ui.label(format!("Relations: {}", self.schema.relation_count()));
        });
        ui.separator();

        let Some(model) = self.selected_model() else {
            ui.label("Select a model to view details");
            return;
        };

        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(model.name.as_str()).heading().strong());
            ui.add_space(4.0);
            ui.label(model.overview());
        });

        ui.add_space(8.0);
        ui.label(RichText::new("Quick summary").strong());
        egui::Grid::new("quick_summary")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                ui.label("Fields");
                ui.label(model.fields.len().to_string());
                ui.end_row();
                ui.label("Relations");
                ui.label(model.relations.len().to_string());
                ui.end_row();
                ui.label("Primary key");
                ui.monospace(model.primary_key());
                ui.end_row();
            });
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        let dark_mode = self.dark_mode;
        let Some(model) = self.selected_model() else {
            ui.label("Select a model to view details");
            return;
        };

        egui::ScrollArea::vertical()
            .id_salt("details_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(format!("{} fields", model.name));
                draw_fields(ui, model, dark_mode);

                ui.add_space(10.0);
                ui.heading("Relations");
                draw_relations(ui, model);

                ui.add_space(10.0);
                ui.heading("Unique constraints");
                if model.unique_constraints.is_empty() {
                    ui.weak("No compound unique constraints.");
                }
                for constraint in &model.unique_constraints {
                    ui.monospace(format!("[{}]", constraint.join(", ")));
                }
            });
    }

    pub(in crate::app) fn draw_diagrams(&mut self, ui: &mut Ui) {
        let Some(model) = self.selected_model() else {
            ui.label("Select a model to view diagrams");
            return;
        };

        for diagram in model.diagrams_or_default() {
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(diagram.title).strong());
                ui.label(diagram.description);
            });
            ui.add_space(6.0);
        }

        ui.separator();
        ui.label(RichText::new("Schema visualization").strong());
        ui.label("The live relation graph of every model is drawn in the Graph tab.");
        if ui.button("Open graph").clicked() {
            self.tab = DetailTab::Graph;
        }
    }
}

fn draw_fields(ui: &mut Ui, model: &Model, dark_mode: bool) {
    if model.fields.is_empty() {
        ui.weak("No fields declared.");
        return;
    }

    egui::Grid::new("fields_table")
        .num_columns(3)
        .striped(true)
        .spacing([14.0, 4.0])
        .show(ui, |ui| {
            ui.label(RichText::new("Name").strong());
            ui.label(RichText::new("Type").strong());
            ui.label(RichText::new("Attributes").strong());
            ui.end_row();

            for field in &model.fields {
                draw_field_row(ui, field, dark_mode);
                ui.end_row();
            }
        });
}

/// A primary key is implicitly unique, so it only carries the PK badge.
fn field_badge(field: &Field) -> Option<(&'static str, Color32)> {
    if field.is_primary_key() {
        Some(("PK", Color32::from_rgb(234, 179, 8)))
    } else if field.is_unique() {
        Some(("Unique", Color32::from_rgb(14, 165, 233)))
    } else {
        None
    }
}

fn draw_field_row(ui: &mut Ui, field: &Field, dark_mode: bool) {
    ui.horizontal(|ui| {
        ui.monospace(field.name.as_str());
        if let Some((text, color)) = field_badge(field) {
            badge(ui, text, color);
        }
    });

    let color = type_class_color(TypeClass::of(&field.ty), dark_mode);
    ui.label(RichText::new(field.ty.as_str()).monospace().color(color));
    ui.label(field.attributes.join(" "));
}

fn draw_relations(ui: &mut Ui, model: &Model) {
    if model.relations.is_empty() {
        ui.weak("No relations declared.");
        return;
    }

    egui::Grid::new("relations_table")
        .num_columns(4)
        .striped(true)
        .spacing([14.0, 4.0])
        .show(ui, |ui| {
            for header in ["Name", "Target", "Cardinality", "Attribute"] {
                ui.label(RichText::new(header).strong());
            }
            ui.end_row();

            for relation in &model.relations {
                ui.monospace(relation.name.as_str());
                ui.label(relation.target());
                ui.label(relation.cardinality().label());
                ui.label(RichText::new(relation.attribute.as_str()).small());
                ui.end_row();
            }
        });
}
