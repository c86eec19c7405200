use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::SimNode;
use super::quadtree::QuadNode;

const JITTER: f32 = 1.0e-6;

/// Tiny deterministic offset used when two points coincide.
fn jitter(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214 + 0.11) * TAU;
    vec2(angle.cos(), angle.sin()) * JITTER
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Link {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
    /// Share of the correction applied to the target.
    pub(super) bias: f32,
}

impl Link {
    pub(super) fn with_degrees(source: usize, target: usize, degree: &[usize]) -> Self {
        let source_degree = degree[source].max(1) as f32;
        let target_degree = degree[target].max(1) as f32;
        Self {
            source,
            target,
            strength: 1.0 / source_degree.min(target_degree),
            bias: source_degree / (source_degree + target_degree),
        }
    }
}

pub(super) fn apply_link(nodes: &mut [SimNode], links: &[Link], distance: f32, alpha: f32) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target {
            continue;
        }

        let mut delta = (nodes[target].pos + nodes[target].velocity)
            - (nodes[source].pos + nodes[source].velocity);
        if delta == Vec2::ZERO {
            delta = jitter(source, target);
        }
        let length = delta.length();
        let pull = delta * ((length - distance) / length * alpha * link.strength);

        nodes[target].velocity -= pull * link.bias;
        nodes[source].velocity += pull * (1.0 - link.bias);
    }
}

fn softened(distance_sq: f32) -> f32 {
    if distance_sq < 1.0 {
        distance_sq.sqrt()
    } else {
        distance_sq
    }
}

/// Sum over other nodes of `(other - self) * mass / distance²`, with far cells
/// collapsed to their center of mass.
fn accumulate_charge(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    theta: f32,
    pull: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.indices {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            if delta == Vec2::ZERO {
                delta = jitter(index, other);
            }
            *pull += delta / softened(delta.length_sq());
        }
        return;
    }

    let delta = cell.center_of_mass - point;
    let distance_sq = delta.length_sq();
    let side = cell.bounds.side_length();
    if !cell.bounds.contains(point) && side * side < theta * theta * distance_sq {
        *pull += delta * (cell.mass / softened(distance_sq));
        return;
    }

    for child in cell.children() {
        accumulate_charge(child, index, positions, theta, pull);
    }
}

pub(super) fn apply_charge(
    nodes: &mut [SimNode],
    tree: &QuadNode,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    alpha: f32,
) {
    for (index, node) in nodes.iter_mut().enumerate() {
        let mut pull = Vec2::ZERO;
        accumulate_charge(tree, index, positions, theta, &mut pull);
        node.velocity += pull * (strength * alpha);
    }
}

pub(super) fn apply_center(nodes: &mut [SimNode], center: Vec2) {
    if nodes.is_empty() {
        return;
    }

    let mean = nodes
        .iter()
        .fold(Vec2::ZERO, |sum, node| sum + node.pos)
        / nodes.len() as f32;
    let shift = mean - center;
    for node in nodes {
        node.pos -= shift;
    }
}

fn resolve_overlap(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let mut delta = predicted[from] - predicted[to];
    let mut distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }
    if delta == Vec2::ZERO {
        delta = jitter(from, to);
        distance_sq = delta.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = delta * ((reach - distance) / distance * strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let share = to_sq / (from_sq + to_sq);

    deltas[from] += push * share;
    deltas[to] -= push * (1.0 - share);
}

/// Visits every pair of cells that may hold overlapping circles.
pub(super) fn accumulate_collisions(
    cell_a: &QuadNode,
    cell_b: &QuadNode,
    same_cell: bool,
    predicted: &[Vec2],
    radii: &[f32],
    strength: f32,
    deltas: &mut [Vec2],
) {
    if cell_a.bounds.gap_to(cell_b.bounds) > cell_a.max_radius + cell_b.max_radius {
        return;
    }

    if cell_a.is_leaf() && cell_b.is_leaf() {
        if same_cell {
            for (offset, &from) in cell_a.indices.iter().enumerate() {
                for &to in &cell_a.indices[offset + 1..] {
                    resolve_overlap(from, to, predicted, radii, strength, deltas);
                }
            }
        } else {
            for &from in &cell_a.indices {
                for &to in &cell_b.indices {
                    resolve_overlap(from, to, predicted, radii, strength, deltas);
                }
            }
        }
        return;
    }

    if same_cell {
        let children = cell_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collisions(child_a, child_a, true, predicted, radii, strength, deltas);
            for child_b in &children[offset + 1..] {
                accumulate_collisions(child_a, child_b, false, predicted, radii, strength, deltas);
            }
        }
        return;
    }

    let split_a = if cell_a.is_leaf() {
        false
    } else if cell_b.is_leaf() {
        true
    } else {
        cell_a.bounds.half_extent >= cell_b.bounds.half_extent
    };

    if split_a {
        for child in cell_a.children() {
            accumulate_collisions(child, cell_b, false, predicted, radii, strength, deltas);
        }
    } else {
        for child in cell_b.children() {
            accumulate_collisions(cell_a, child, false, predicted, radii, strength, deltas);
        }
    }
}
