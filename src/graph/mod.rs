mod extract;

use std::collections::HashSet;

use crate::schema::{Cardinality, Schema};

pub use extract::extract_edges;

pub const MIN_NODE_RADIUS: f32 = 30.0;
const RADIUS_PER_CHAR: f32 = 4.0;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub radius: f32,
    pub selected: bool,
}

impl GraphNode {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            radius: node_radius(id),
            selected: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub cardinality: Cardinality,
    pub name: String,
}

pub fn node_radius(id: &str) -> f32 {
    (id.chars().count() as f32 * RADIUS_PER_CHAR).max(MIN_NODE_RADIUS)
}

/// Node and edge sets derived from one schema.
#[derive(Clone, Debug, Default)]
pub struct SchemaGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl SchemaGraph {
    pub fn from_schema(schema: &Schema, selected: Option<&str>) -> Self {
        let mut seen = HashSet::with_capacity(schema.models.len());
        let nodes = schema
            .models
            .iter()
            .filter(|model| seen.insert(model.name.as_str()))
            .map(|model| GraphNode::new(&model.name))
            .collect();

        let mut graph = Self {
            nodes,
            edges: extract_edges(schema),
        };
        graph.select(selected);
        graph
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Recomputes the `selected` flags; unknown names clear the selection.
    pub fn select(&mut self, selected: Option<&str>) {
        for node in &mut self.nodes {
            node.selected = selected == Some(node.id.as_str());
        }
    }

    pub fn selected(&self) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.selected)
    }

    /// True when both graphs have the same node ids and edges, so an existing
    /// layout can be kept.
    pub fn same_structure(&self, other: &Self) -> bool {
        self.edges == other.edges
            && self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .zip(&other.nodes)
                .all(|(a, b)| a.id == b.id)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::schema::{Model, Relation};

    fn model(name: &str, relations: &[(&str, &str)]) -> Model {
        Model {
            name: name.to_owned(),
            relations: relations
                .iter()
                .map(|(name, ty)| Relation {
                    name: (*name).to_owned(),
                    ty: (*ty).to_owned(),
                    attribute: "@relation".to_owned(),
                })
                .collect(),
            ..Model::default()
        }
    }

    #[test]
    fn radius_has_a_floor() {
        assert_eq!(node_radius("A"), 30.0);
        assert_eq!(node_radius("EmployeeEducationalBackground"), 116.0);
    }

    #[test]
    fn dangling_target_is_not_a_node() {
        let schema = Schema {
            models: vec![model("D", &[("ghost", "Ghost")])],
        };
        let graph = SchemaGraph::from_schema(&schema, None);

        let ids = graph.nodes.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["D"]);
        assert!(graph.edges.iter().all(|edge| edge.target != "Ghost"));
    }

    #[test]
    fn unknown_selection_selects_nothing() {
        let schema = Schema {
            models: vec![model("A", &[]), model("B", &[])],
        };
        let mut graph = SchemaGraph::from_schema(&schema, Some("B"));
        assert_eq!(graph.selected().map(|n| n.id.as_str()), Some("B"));

        graph.select(Some("Nope"));
        assert!(graph.selected().is_none());
    }

    #[test]
    fn structure_ignores_selection() {
        let schema = Schema {
            models: vec![model("A", &[("b", "B")]), model("B", &[])],
        };
        let first = SchemaGraph::from_schema(&schema, Some("A"));
        let second = SchemaGraph::from_schema(&schema, Some("B"));
        assert!(first.same_structure(&second));

        let grown = Schema {
            models: vec![model("A", &[("b", "B")]), model("B", &[]), model("C", &[])],
        };
        assert!(!first.same_structure(&SchemaGraph::from_schema(&grown, None)));
    }

    fn arb_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[A-E]{1,2}", 0..10)
    }

    proptest! {
        #[test]
        fn node_set_is_distinct_model_names(names in arb_names()) {
            let schema = Schema {
                models: names.iter().map(|name| model(name, &[])).collect(),
            };
            let graph = SchemaGraph::from_schema(&schema, None);

            let ids = graph.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();
            let unique = ids.iter().cloned().collect::<HashSet<_>>();
            let expected = names.into_iter().collect::<HashSet<_>>();
            prop_assert_eq!(ids.len(), unique.len());
            prop_assert_eq!(unique, expected);
        }

        #[test]
        fn exactly_the_named_node_is_selected(names in arb_names(), pick in "[A-E]{1,2}") {
            let schema = Schema {
                models: names.iter().map(|name| model(name, &[])).collect(),
            };
            let graph = SchemaGraph::from_schema(&schema, Some(&pick));

            let selected = graph.nodes.iter().filter(|n| n.selected).collect::<Vec<_>>();
            if names.contains(&pick) {
                prop_assert_eq!(selected.len(), 1);
                prop_assert_eq!(&selected[0].id, &pick);
            } else {
                prop_assert!(selected.is_empty());
            }
        }
    }
}
