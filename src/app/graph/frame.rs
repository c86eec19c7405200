use eframe::egui::Vec2;

use crate::graph::SchemaGraph;
use crate::layout::Simulation;

use super::interaction::ViewTransform;

#[derive(Clone, Debug, PartialEq)]
pub struct NodePrimitive {
    pub id: String,
    pub center: Vec2,
    pub radius: f32,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgePrimitive {
    pub from: Vec2,
    pub to: Vec2,
    pub to_many: bool,
    pub name: String,
}

/// Everything needed to paint one frame of the graph, in canvas-local
/// screen coordinates.
#[derive(Clone, Debug, Default)]
pub struct RenderFrame {
    pub nodes: Vec<NodePrimitive>,
    pub edges: Vec<EdgePrimitive>,
}

impl RenderFrame {
    pub fn build(graph: &SchemaGraph, simulation: &Simulation, transform: &ViewTransform) -> Self {
        let nodes = graph
            .nodes
            .iter()
            .filter_map(|node| {
                let sim_node = simulation.node(simulation.index_of(&node.id)?)?;
                Some(NodePrimitive {
                    id: node.id.clone(),
                    center: transform.world_to_screen(sim_node.pos),
                    radius: sim_node.radius * transform.scale,
                    selected: node.selected,
                })
            })
            .collect();

        let edges = graph
            .edges
            .iter()
            .filter_map(|edge| {
                let source = simulation.node(simulation.index_of(&edge.source)?)?;
                let target = simulation.node(simulation.index_of(&edge.target)?)?;
                Some(EdgePrimitive {
                    from: transform.world_to_screen(source.pos),
                    to: transform.world_to_screen(target.pos),
                    to_many: edge.cardinality.is_to_many(),
                    name: edge.name.clone(),
                })
            })
            .collect();

        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::schema::{Model, Relation, Schema};

    fn chain() -> Schema {
        let relation = |name: &str, ty: &str| Relation {
            name: name.to_owned(),
            ty: ty.to_owned(),
            attribute: "@relation".to_owned(),
        };
        Schema {
            models: vec![
                Model {
                    name: "A".to_owned(),
                    relations: vec![relation("b", "B")],
                    ..Model::default()
                },
                Model {
                    name: "B".to_owned(),
                    relations: vec![relation("cs", "C[]")],
                    ..Model::default()
                },
                Model {
                    name: "C".to_owned(),
                    ..Model::default()
                },
            ],
        }
    }

    #[test]
    fn primitives_follow_transform_and_selection() {
        let graph = SchemaGraph::from_schema(&chain(), Some("B"));
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.resize(vec2(800.0, 600.0));
        simulation.rebuild(&graph);

        let transform = ViewTransform {
            translate: vec2(10.0, -20.0),
            scale: 2.0,
        };
        let frame = RenderFrame::build(&graph, &simulation, &transform);

        assert_eq!(frame.nodes.len(), 3);
        for (primitive, node) in frame.nodes.iter().zip(simulation.nodes()) {
            assert_eq!(primitive.center, vec2(10.0, -20.0) + node.pos * 2.0);
            assert_eq!(primitive.radius, node.radius * 2.0);
        }
        let selected = frame
            .nodes
            .iter()
            .filter(|node| node.selected)
            .map(|node| node.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(selected, vec!["B"]);

        let flags = frame
            .edges
            .iter()
            .map(|edge| (edge.name.as_str(), edge.to_many))
            .collect::<Vec<_>>();
        assert_eq!(flags, vec![("b", false), ("cs", true)]);
        assert_eq!(frame.edges[0].from, frame.nodes[0].center);
        assert_eq!(frame.edges[0].to, frame.nodes[1].center);
    }

    #[test]
    fn stale_simulation_yields_no_primitives() {
        let graph = SchemaGraph::from_schema(&chain(), None);
        let simulation = Simulation::new(LayoutConfig::default());

        let frame = RenderFrame::build(&graph, &simulation, &ViewTransform::default());
        assert!(frame.nodes.is_empty());
        assert!(frame.edges.is_empty());
    }
}
