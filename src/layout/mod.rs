//! Force-directed layout of the schema graph.
//!
//! The simulation is stepped explicitly, one [`Simulation::tick`] per frame.
//! Each tick cools `alpha`, applies link, charge, centering and collision
//! forces to node velocities, then integrates positions. Pinned nodes are
//! held at their pin.

mod forces;
mod quadtree;

use std::collections::HashMap;
use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::graph::SchemaGraph;
use forces::{Link, accumulate_collisions, apply_center, apply_charge, apply_link};
use quadtree::QuadNode;

/// Smallest viewport side that still defines a usable center.
pub const MIN_VIEWPORT_EXTENT: f32 = 1.0;

const INITIAL_SPACING: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutState {
    Idle,
    Initializing,
    Simulating,
    Settled,
}

#[derive(Clone, Debug)]
pub struct SimNode {
    pub id: String,
    pub radius: f32,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub pin: Option<Vec2>,
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    collide_radii: Vec<f32>,
    deltas: Vec<Vec2>,
}

pub struct Simulation {
    config: LayoutConfig,
    nodes: Vec<SimNode>,
    links: Vec<Link>,
    index_by_id: HashMap<String, usize>,
    center: Vec2,
    alpha: f32,
    alpha_target: f32,
    state: LayoutState,
    ticks: u64,
    scratch: Scratch,
}

fn phyllotaxis(center: Vec2, index: usize) -> Vec2 {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let radius = INITIAL_SPACING * (0.5 + index as f32).sqrt();
    let angle = index as f32 * golden_angle;
    center + vec2(angle.cos(), angle.sin()) * radius
}

impl Simulation {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            links: Vec::new(),
            index_by_id: HashMap::new(),
            center: Vec2::ZERO,
            alpha: 0.0,
            alpha_target: 0.0,
            state: LayoutState::Idle,
            ticks: 0,
            scratch: Scratch::default(),
        }
    }

    /// Replaces every node and link, discarding previous positions.
    pub fn rebuild(&mut self, graph: &SchemaGraph) {
        self.nodes = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| SimNode {
                id: node.id.clone(),
                radius: node.radius,
                pos: phyllotaxis(self.center, index),
                velocity: Vec2::ZERO,
                pin: None,
            })
            .collect();

        self.index_by_id = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();

        let endpoints = graph
            .edges
            .iter()
            .filter_map(|edge| {
                Some((
                    *self.index_by_id.get(&edge.source)?,
                    *self.index_by_id.get(&edge.target)?,
                ))
            })
            .collect::<Vec<_>>();

        let mut degree = vec![0usize; self.nodes.len()];
        for &(source, target) in &endpoints {
            degree[source] += 1;
            degree[target] += 1;
        }
        self.links = endpoints
            .into_iter()
            .map(|(source, target)| Link::with_degrees(source, target, &degree))
            .collect();

        self.alpha = 1.0;
        self.alpha_target = 0.0;
        self.ticks = 0;
        self.state = if self.nodes.is_empty() {
            LayoutState::Idle
        } else {
            LayoutState::Initializing
        };

        info!(
            nodes = self.nodes.len(),
            links = self.links.len(),
            "layout rebuilt"
        );
    }

    /// Advances the simulation by one step. Returns `false` without touching
    /// any position when there is nothing to simulate.
    pub fn tick(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.state = LayoutState::Simulating;

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;

        apply_link(
            &mut self.nodes,
            &self.links,
            self.config.link_distance,
            alpha,
        );

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.collide_radii.clear();
        for node in &self.nodes {
            scratch.positions.push(node.pos);
            scratch
                .collide_radii
                .push(node.radius + self.config.collision_padding);
        }

        if let Some(tree) = QuadNode::build(&scratch.positions, &scratch.collide_radii) {
            apply_charge(
                &mut self.nodes,
                &tree,
                &scratch.positions,
                self.config.charge_strength,
                self.config.charge_theta,
                alpha,
            );
        }

        apply_center(&mut self.nodes, self.center);

        scratch.predicted.clear();
        scratch
            .predicted
            .extend(self.nodes.iter().map(|node| node.pos + node.velocity));
        scratch.deltas.clear();
        scratch.deltas.resize(self.nodes.len(), Vec2::ZERO);
        if let Some(tree) = QuadNode::build(&scratch.predicted, &scratch.collide_radii) {
            accumulate_collisions(
                &tree,
                &tree,
                true,
                &scratch.predicted,
                &scratch.collide_radii,
                self.config.collision_strength,
                &mut scratch.deltas,
            );
        }

        let retained = 1.0 - self.config.velocity_decay;
        for (node, delta) in self.nodes.iter_mut().zip(&scratch.deltas) {
            if let Some(pin) = node.pin {
                node.pos = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }
            node.velocity = (node.velocity + *delta) * retained;
            node.pos += node.velocity;
        }

        self.ticks += 1;
        if self.alpha < self.config.alpha_min {
            self.state = LayoutState::Settled;
            debug!(ticks = self.ticks, "layout settled");
        }
        true
    }

    /// Moves the centering target to the middle of `size` and reheats.
    /// Degenerate sizes are ignored until a usable one arrives.
    pub fn resize(&mut self, size: Vec2) -> bool {
        if !(size.x >= MIN_VIEWPORT_EXTENT && size.y >= MIN_VIEWPORT_EXTENT) {
            warn!(width = size.x, height = size.y, "ignoring degenerate viewport");
            return false;
        }

        self.center = size * 0.5;
        debug!(width = size.x, height = size.y, "viewport resized");
        self.reheat();
        true
    }

    /// Raises alpha to at least the reheat level and resumes ticking.
    pub fn reheat(&mut self) {
        if self.state == LayoutState::Idle {
            return;
        }
        self.alpha = self.alpha.max(self.config.reheat_alpha);
        self.wake();
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
        if self.alpha_target > 0.0 {
            self.wake();
        }
    }

    fn wake(&mut self) {
        if matches!(self.state, LayoutState::Settled) {
            debug!(alpha = self.alpha, "layout reheated");
            self.state = LayoutState::Simulating;
        }
    }

    /// Halts ticking until the next reheat or rebuild.
    pub fn stop(&mut self) {
        if self.is_active() {
            self.state = LayoutState::Settled;
        }
        self.alpha_target = 0.0;
    }

    pub fn pin(&mut self, index: usize, position: Vec2) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = Some(position);
        }
    }

    pub fn release(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.pin = None;
        }
    }

    pub fn set_config(&mut self, config: LayoutConfig) {
        if self.config == config {
            return;
        }
        self.config = config;
        self.reheat();
    }

    /// Node under `world`, nearest center first.
    pub fn node_at(&self, world: Vec2) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let distance = (node.pos - world).length();
                (distance <= node.radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&SimNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self.state,
            LayoutState::Initializing | LayoutState::Simulating
        )
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
