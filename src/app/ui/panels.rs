use eframe::egui::{self, Align, Context, Layout, Ui, Visuals};
use tracing::debug;

use crate::config::ExplorerConfig;
use crate::schema::{Model, Schema, SchemaSource};

use super::super::graph::GraphView;
use super::super::render_utils::GraphPalette;
use super::super::{DetailTab, ViewModel};

impl ViewModel {
    pub(in crate::app) const MIN_SEARCH_CHARS: usize = 2;

    pub(in crate::app) fn new(schema: Schema, config: ExplorerConfig) -> Self {
        let selected = schema.models.first().map(|model| model.name.clone());

        Self {
            graph_view: GraphView::new(&config),
            schema,
            revision: 0,
            selected,
            search: String::new(),
            dark_mode: true,
            tab: DetailTab::Overview,
            config,
            live_physics: true,
        }
    }

    /// Swaps in a freshly loaded schema, keeping the selection when the model
    /// still exists.
    pub(in crate::app) fn replace_schema(&mut self, schema: Schema) {
        let keep = self
            .selected
            .as_deref()
            .is_some_and(|name| schema.contains(name));
        if !keep {
            self.selected = schema.models.first().map(|model| model.name.clone());
        }

        self.schema = schema;
        self.revision += 1;
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        debug!(selected = ?selected, "selection changed");
        self.selected = selected;
    }

    pub(in crate::app) fn selected_model(&self) -> Option<&Model> {
        self.selected
            .as_deref()
            .and_then(|name| self.schema.model(name))
    }

    /// Model names for the search dropdown; empty until the query is long
    /// enough.
    pub(in crate::app) fn search_results(&self) -> Vec<String> {
        let query = self.search.trim();
        if query.chars().count() < Self::MIN_SEARCH_CHARS {
            return Vec::new();
        }

        self.schema
            .search(query)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &SchemaSource,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        ctx.set_visuals(if self.dark_mode {
            Visuals::dark()
        } else {
            Visuals::light()
        });
        self.graph_view
            .sync(&self.schema, self.revision, self.selected.as_deref());

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("schemascope");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    let graph = self.graph_view.graph();
                    ui.label(format!(
                        "graph: {} models, {} relations",
                        graph.nodes.len(),
                        graph.edges.len()
                    ));
                    ui.separator();
                    self.draw_search(ui);
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let theme_label = if self.dark_mode { "Light mode" } else { "Dark mode" };
                        if ui.button(theme_label).clicked() {
                            self.dark_mode = !self.dark_mode;
                        }
                        let reload_button =
                            ui.add_enabled(!is_reloading, egui::Button::new("Reload schema"));
                        if reload_button.clicked() {
                            *reload_requested = true;
                        }
                        if is_reloading {
                            ui.spinner();
                        }
                    });
                });
            });

        egui::SidePanel::left("models")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                self.draw_model_list(ui);
                ui.separator();
                self.draw_controls(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (tab, label) in DetailTab::ALL {
                    ui.selectable_value(&mut self.tab, tab, label);
                }
            });
            ui.separator();

            match self.tab {
                DetailTab::Overview => self.draw_overview(ui),
                DetailTab::Details => self.draw_details(ui),
                DetailTab::Diagrams => self.draw_diagrams(ui),
                DetailTab::Graph => {
                    let palette = GraphPalette::for_theme(self.dark_mode);
                    let clicked =
                        self.graph_view
                            .show(ui, &palette, self.live_physics, &self.search);
                    if clicked.is_some() {
                        self.set_selected(clicked);
                    }
                }
            }
        });
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        let response = ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("Search models and fields")
                .desired_width(240.0),
        );

        if self.search.trim().chars().count() < Self::MIN_SEARCH_CHARS {
            return;
        }

        let results = self.search_results();
        let mut picked: Option<String> = None;
        egui::Area::new(response.id.with("search_results"))
            .order(egui::Order::Foreground)
            .fixed_pos(response.rect.left_bottom())
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_min_width(response.rect.width());
                    if results.is_empty() {
                        ui.weak("No matching models");
                    }
                    for name in &results {
                        ui.selectable_value(&mut picked, Some(name.clone()), name.as_str());
                    }
                });
            });

        if picked.is_some() {
            self.set_selected(picked);
            self.search.clear();
        }
    }

    fn draw_model_list(&mut self, ui: &mut Ui) {
        ui.heading("Models");
        ui.add_space(4.0);

        if self.schema.models.is_empty() {
            ui.label("This schema declares no models.");
            return;
        }

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("model_list_scroll")
            .max_height(ui.available_height() * 0.55)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for model in &self.schema.models {
                    let is_selected = self.selected.as_deref() == Some(model.name.as_str());
                    let response = ui
                        .selectable_label(is_selected, model.name.as_str())
                        .on_hover_text(format!(
                            "{} fields, {} relations",
                            model.fields.len(),
                            model.relations.len()
                        ));
                    if response.clicked() {
                        picked = Some(model.name.clone());
                    }
                }
            });

        if picked.is_some() {
            self.set_selected(picked);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    fn model(name: &str, fields: &[&str]) -> Model {
        Model {
            name: name.to_owned(),
            fields: fields
                .iter()
                .map(|field| Field {
                    name: (*field).to_owned(),
                    ty: "String".to_owned(),
                    attributes: Vec::new(),
                })
                .collect(),
            ..Model::default()
        }
    }

    fn view_model() -> ViewModel {
        let schema = Schema {
            models: vec![
                model("Employee", &["firstName", "branchId"]),
                model("Branch", &["name"]),
                model("Department", &["title"]),
            ],
        };
        ViewModel::new(schema, ExplorerConfig::default())
    }

    #[test]
    fn first_model_is_selected_initially() {
        let model = view_model();
        assert_eq!(model.selected.as_deref(), Some("Employee"));
        assert_eq!(model.selected_model().map(|m| m.name.as_str()), Some("Employee"));

        let empty = ViewModel::new(Schema::default(), ExplorerConfig::default());
        assert!(empty.selected.is_none());
    }

    #[test]
    fn search_needs_two_characters() {
        let mut model = view_model();
        model.search = "b".to_owned();
        assert!(model.search_results().is_empty());

        model.search = "BR".to_owned();
        assert_eq!(model.search_results(), vec!["Employee", "Branch"]);
    }

    #[test]
    fn reload_keeps_surviving_selection() {
        let mut model = view_model();
        model.set_selected(Some("Branch".to_owned()));

        model.replace_schema(Schema {
            models: vec![self::model("Branch", &[]), self::model("Region", &[])],
        });
        assert_eq!(model.selected.as_deref(), Some("Branch"));
        assert_eq!(model.revision, 1);

        model.replace_schema(Schema {
            models: vec![self::model("Region", &[])],
        });
        assert_eq!(model.selected.as_deref(), Some("Region"));
        assert_eq!(model.revision, 2);
    }

    #[test]
    fn unknown_selection_has_no_model() {
        let mut model = view_model();
        model.set_selected(Some("Ghost".to_owned()));
        assert!(model.selected_model().is_none());
    }
}
