use std::collections::HashSet;

use eframe::egui::{self, Align2, FontId, Rect, Sense, Shape, Stroke, Ui, Vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::debug;

use crate::config::{ExplorerConfig, LayoutConfig};
use crate::graph::SchemaGraph;
use crate::layout::Simulation;
use crate::schema::Schema;

use super::super::render_utils::{
    GraphPalette, blend_color, circle_visible, draw_background, segment_visible,
};
use super::frame::RenderFrame;
use super::interaction::{InteractionController, PointerEvent};

const TOOLTIP_OFFSET: Vec2 = Vec2::new(10.0, 10.0);
const DASH_LENGTH: f32 = 5.0;
const GAP_LENGTH: f32 = 5.0;

fn fuzzy_matches(graph: &SchemaGraph, query: &str) -> HashSet<String> {
    let query = query.trim();
    if query.is_empty() {
        return HashSet::new();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    graph
        .nodes
        .iter()
        .filter(|node| matcher.fuzzy_match(&node.id, query).is_some())
        .map(|node| node.id.clone())
        .collect()
}

/// Owns the relation graph, its layout simulation and the pointer state for
/// the graph canvas.
pub(in crate::app) struct GraphView {
    graph: SchemaGraph,
    simulation: Simulation,
    controller: InteractionController,
    viewport: Vec2,
    revision: Option<u64>,
    pointer_inside: bool,
}

impl GraphView {
    pub(in crate::app) fn new(config: &ExplorerConfig) -> Self {
        Self {
            graph: SchemaGraph::default(),
            simulation: Simulation::new(config.layout),
            controller: InteractionController::new(config.interaction),
            viewport: Vec2::ZERO,
            revision: None,
            pointer_inside: false,
        }
    }

    /// Brings the graph in line with `schema`. A structural change restarts
    /// the layout; a selection change only updates node flags.
    pub(in crate::app) fn sync(&mut self, schema: &Schema, revision: u64, selected: Option<&str>) {
        if self.revision == Some(revision) {
            if self.graph.selected().map(|node| node.id.as_str()) != selected {
                self.graph.select(selected);
            }
            return;
        }

        let graph = SchemaGraph::from_schema(schema, selected);
        if self.revision.is_none() || !graph.same_structure(&self.graph) {
            self.simulation.stop();
            self.simulation.rebuild(&graph);
            self.controller.reset();
        } else {
            debug!(revision, "schema structure unchanged, keeping layout");
        }
        self.graph = graph;
        self.revision = Some(revision);
    }

    /// Forwards canvas size changes to the simulation.
    pub(in crate::app) fn observe_size(&mut self, size: Vec2) {
        if size == self.viewport {
            return;
        }
        self.viewport = size;
        self.simulation.resize(size);
    }

    pub(in crate::app) fn set_layout_config(&mut self, config: LayoutConfig) {
        self.simulation.set_config(config);
    }

    /// Advances the layout by one tick.
    pub(in crate::app) fn step(&mut self) -> bool {
        self.simulation.tick()
    }

    pub(in crate::app) fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    pub(in crate::app) fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Frames keep coming only while something on the canvas can move.
    fn needs_repaint(&self, live_physics: bool) -> bool {
        (live_physics && self.simulation.is_active()) || self.controller.is_busy()
    }

    fn pointer_events(&mut self, ui: &Ui, rect: Rect, hovered: bool) -> Vec<PointerEvent> {
        let busy = self.controller.is_busy();
        let mut events = Vec::new();

        ui.input(|input| {
            let pointer = input.pointer.latest_pos().filter(|pos| rect.contains(*pos));
            let inside = pointer.is_some() && (hovered || busy);

            if self.pointer_inside && !inside {
                events.push(PointerEvent::Left);
            }
            self.pointer_inside = inside;

            let Some(pos) = pointer.filter(|_| inside) else {
                return;
            };
            let screen = pos - rect.min;

            events.push(PointerEvent::Moved { screen });
            if input.pointer.primary_pressed() {
                events.push(PointerEvent::Pressed { screen });
            }
            if input.pointer.primary_released() {
                events.push(PointerEvent::Released { screen });
            }
            let scroll = input.raw_scroll_delta.y;
            if scroll.abs() > f32::EPSILON {
                events.push(PointerEvent::Scrolled {
                    screen,
                    delta: scroll,
                });
            }
        });

        events
    }

    /// Steps the simulation once, then paints the canvas. Returns the id of
    /// a clicked node.
    pub(in crate::app) fn show(
        &mut self,
        ui: &mut Ui,
        palette: &GraphPalette,
        live_physics: bool,
        search: &str,
    ) -> Option<String> {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let transform = *self.controller.transform();
        draw_background(&painter, rect, palette, transform.translate, transform.scale);

        if self.graph.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "This schema has no models to graph.",
                FontId::proportional(15.0),
                palette.tooltip_text,
            );
            return None;
        }

        self.observe_size(rect.size());

        let mut clicked = None;
        for event in self.pointer_events(ui, rect, response.hovered()) {
            if let Some(id) = self.controller.handle(event, &mut self.simulation) {
                clicked = Some(id);
            }
        }

        if live_physics || self.controller.is_dragging() {
            self.step();
        }

        let transform = *self.controller.transform();
        let frame = RenderFrame::build(&self.graph, &self.simulation, &transform);
        let origin = rect.min.to_vec2();
        let search_hits = fuzzy_matches(&self.graph, search);
        let tooltip = self.controller.tooltip();
        let hovered_id = tooltip.visible.then_some(tooltip.label.as_str());

        let edge_stroke = Stroke::new((1.5 * transform.scale.sqrt()).clamp(0.75, 3.0), palette.edge);
        for edge in &frame.edges {
            let from = (edge.from + origin).to_pos2();
            let to = (edge.to + origin).to_pos2();
            if !segment_visible(rect, from, to) {
                continue;
            }
            if edge.to_many {
                painter.extend(Shape::dashed_line(&[from, to], edge_stroke, DASH_LENGTH, GAP_LENGTH));
            } else {
                painter.line_segment([from, to], edge_stroke);
            }
        }

        for node in &frame.nodes {
            let center = (node.center + origin).to_pos2();
            if !circle_visible(rect, center, node.radius) {
                continue;
            }

            let mut fill = if node.selected {
                palette.node_selected
            } else {
                palette.node
            };
            if hovered_id == Some(node.id.as_str()) {
                fill = blend_color(fill, palette.node_selected, 0.5);
            }

            painter.circle_filled(center, node.radius, fill);
            let stroke = if search_hits.contains(&node.id) {
                Stroke::new(3.0, palette.search_match)
            } else if node.selected {
                Stroke::new(2.5, palette.node_stroke)
            } else {
                Stroke::new(1.5, palette.node_stroke)
            };
            painter.circle_stroke(center, node.radius, stroke);

            painter.text(
                center,
                Align2::CENTER_CENTER,
                node.id.as_str(),
                FontId::proportional((12.0 * transform.scale).clamp(7.0, 22.0)),
                palette.label,
            );
        }

        if tooltip.visible {
            let anchor = (tooltip.screen_pos + origin + TOOLTIP_OFFSET).to_pos2();
            let galley = painter.layout_no_wrap(
                tooltip.label.clone(),
                FontId::proportional(13.0),
                palette.tooltip_text,
            );
            let background = Rect::from_min_size(anchor, galley.size()).expand(4.0);
            painter.rect_filled(background, 4.0, palette.tooltip_fill);
            painter.galley(anchor, galley, palette.tooltip_text);
        }

        if tooltip.visible && !self.controller.is_busy() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        if self.needs_repaint(live_physics) {
            ui.ctx().request_repaint();
        }

        clicked
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::layout::LayoutState;
    use crate::schema::{Model, Relation};

    fn schema(names: &[&str]) -> Schema {
        Schema {
            models: names
                .iter()
                .enumerate()
                .map(|(index, name)| Model {
                    name: (*name).to_owned(),
                    relations: names
                        .get(index + 1)
                        .map(|next| Relation {
                            name: next.to_lowercase(),
                            ty: (*next).to_owned(),
                            attribute: "@relation".to_owned(),
                        })
                        .into_iter()
                        .collect(),
                    ..Model::default()
                })
                .collect(),
        }
    }

    fn settle(view: &mut GraphView) {
        let mut ticks = 0;
        while view.step() {
            ticks += 1;
            assert!(ticks < 5_000);
        }
    }

    fn positions(view: &GraphView) -> Vec<Vec2> {
        view.simulation().nodes().iter().map(|node| node.pos).collect()
    }

    #[test]
    fn selection_change_keeps_layout() {
        let mut view = GraphView::new(&ExplorerConfig::default());
        let schema = schema(&["A", "B", "C"]);
        view.observe_size(vec2(800.0, 600.0));
        view.sync(&schema, 1, Some("A"));
        settle(&mut view);
        let before = positions(&view);

        view.sync(&schema, 1, Some("C"));
        assert_eq!(view.graph().selected().map(|n| n.id.as_str()), Some("C"));
        assert_eq!(positions(&view), before);
        assert_eq!(view.simulation().state(), LayoutState::Settled);
    }

    #[test]
    fn reload_with_same_structure_keeps_layout() {
        let mut view = GraphView::new(&ExplorerConfig::default());
        view.observe_size(vec2(800.0, 600.0));
        view.sync(&schema(&["A", "B"]), 1, None);
        settle(&mut view);
        let before = positions(&view);

        view.sync(&schema(&["A", "B"]), 2, None);
        assert_eq!(positions(&view), before);
    }

    #[test]
    fn structural_change_restarts_layout() {
        let mut view = GraphView::new(&ExplorerConfig::default());
        view.observe_size(vec2(800.0, 600.0));
        view.sync(&schema(&["A", "B"]), 1, None);
        settle(&mut view);

        view.sync(&schema(&["A", "B", "C"]), 2, Some("C"));
        assert_eq!(view.simulation().state(), LayoutState::Initializing);
        assert_eq!(view.simulation().nodes().len(), 3);
        assert_eq!(view.graph().selected().map(|n| n.id.as_str()), Some("C"));
    }

    #[test]
    fn resize_after_settling_moves_nodes() {
        let mut view = GraphView::new(&ExplorerConfig::default());
        view.observe_size(vec2(800.0, 600.0));
        view.sync(&schema(&["A", "B", "C"]), 1, None);
        settle(&mut view);
        let before = positions(&view);

        view.observe_size(vec2(1200.0, 900.0));
        assert!(view.step());
        assert_ne!(positions(&view), before);
    }

    #[test]
    fn same_size_does_not_reheat() {
        let mut view = GraphView::new(&ExplorerConfig::default());
        view.observe_size(vec2(800.0, 600.0));
        view.sync(&schema(&["A", "B"]), 1, None);
        settle(&mut view);

        view.observe_size(vec2(800.0, 600.0));
        assert_eq!(view.simulation().state(), LayoutState::Settled);
    }

    #[test]
    fn paused_physics_stops_repainting() {
        let mut view = GraphView::new(&ExplorerConfig::default());
        view.observe_size(vec2(800.0, 600.0));
        view.sync(&schema(&["A", "B"]), 1, None);

        assert!(view.simulation().is_active());
        assert!(view.needs_repaint(true));
        assert!(!view.needs_repaint(false));

        settle(&mut view);
        assert!(!view.needs_repaint(true));
    }

    #[test]
    fn search_highlights_fuzzy_matches() {
        let graph = SchemaGraph::from_schema(&schema(&["Employee", "EmployeeProfile", "Branch"]), None);
        let matches = fuzzy_matches(&graph, "emp");
        assert!(matches.contains("Employee"));
        assert!(matches.contains("EmployeeProfile"));
        assert!(!matches.contains("Branch"));
        assert!(fuzzy_matches(&graph, "  ").is_empty());
    }
}
