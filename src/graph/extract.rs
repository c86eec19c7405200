use std::collections::HashSet;

use tracing::debug;

use crate::schema::Schema;

use super::GraphEdge;

/// Edges for every `@relation`-marked relation whose target is a declared model,
/// in model order then relation order.
pub fn extract_edges(schema: &Schema) -> Vec<GraphEdge> {
    let model_names = schema
        .models
        .iter()
        .map(|model| model.name.as_str())
        .collect::<HashSet<_>>();

    let mut edges = Vec::new();
    for model in &schema.models {
        for relation in model.relations.iter().filter(|r| r.is_graph_relation()) {
            let target = relation.target();
            if !model_names.contains(target.as_str()) {
                debug!(
                    model = %model.name,
                    relation = %relation.name,
                    target = %target,
                    "dropping relation to unknown model"
                );
                continue;
            }

            edges.push(GraphEdge {
                source: model.name.clone(),
                target,
                cardinality: relation.cardinality(),
                name: relation.name.clone(),
            });
        }
    }
    edges
}
