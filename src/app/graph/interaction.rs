use eframe::egui::Vec2;

use crate::config::InteractionConfig;
use crate::layout::Simulation;

/// Pointer input in canvas-local screen coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    Moved { screen: Vec2 },
    Pressed { screen: Vec2 },
    Released { screen: Vec2 },
    Left,
    Scrolled { screen: Vec2, delta: f32 },
}

/// Maps world coordinates onto the canvas: `screen = translate + world * scale`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.translate + world * self.scale
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.translate) / self.scale
    }

    /// Scales around `anchor` so the world point under it stays put.
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f32, min_scale: f32, max_scale: f32) {
        let world = self.screen_to_world(anchor);
        self.scale = (self.scale * factor).max(min_scale).min(max_scale);
        self.translate = anchor - world * self.scale;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
    pub visible: bool,
    pub label: String,
    pub screen_pos: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Gesture {
    Idle,
    Dragging {
        node: usize,
        grab_offset: Vec2,
        press: Vec2,
        moved: bool,
    },
    Panning {
        last: Vec2,
    },
}

pub struct InteractionController {
    config: InteractionConfig,
    transform: ViewTransform,
    gesture: Gesture,
    tooltip: Tooltip,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            transform: ViewTransform::default(),
            gesture: Gesture::Idle,
            tooltip: Tooltip::default(),
        }
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    /// A drag or pan is in progress.
    pub fn is_busy(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Drops any gesture without touching the simulation. Used when the
    /// simulation has been rebuilt and old node indices are meaningless.
    pub fn reset(&mut self) {
        self.gesture = Gesture::Idle;
        self.tooltip = Tooltip::default();
    }

    /// Applies one pointer event. Returns the id of a clicked node.
    pub fn handle(&mut self, event: PointerEvent, simulation: &mut Simulation) -> Option<String> {
        match event {
            PointerEvent::Moved { screen } => {
                self.pointer_moved(screen, simulation);
                None
            }
            PointerEvent::Pressed { screen } => {
                self.pointer_pressed(screen, simulation);
                None
            }
            PointerEvent::Released { screen } => self.pointer_released(screen, simulation),
            PointerEvent::Left => {
                self.end_gesture(simulation);
                self.tooltip.visible = false;
                None
            }
            PointerEvent::Scrolled { screen, delta } => {
                let factor = (1.0 + delta * self.config.scroll_zoom_rate).clamp(0.85, 1.15);
                self.transform.zoom_at(
                    screen,
                    factor,
                    self.config.min_zoom,
                    self.config.max_zoom,
                );
                None
            }
        }
    }

    fn pointer_moved(&mut self, screen: Vec2, simulation: &mut Simulation) {
        match &mut self.gesture {
            Gesture::Dragging {
                node,
                grab_offset,
                press,
                moved,
            } => {
                if !*moved && (screen - *press).length() > self.config.drag_threshold {
                    *moved = true;
                }
                let world = self.transform.screen_to_world(screen);
                simulation.pin(*node, world + *grab_offset);
                self.tooltip.screen_pos = screen;
            }
            Gesture::Panning { last } => {
                self.transform.translate += screen - *last;
                *last = screen;
            }
            Gesture::Idle => self.update_hover(screen, simulation),
        }
    }

    fn pointer_pressed(&mut self, screen: Vec2, simulation: &mut Simulation) {
        self.end_gesture(simulation);

        let world = self.transform.screen_to_world(screen);
        let Some(index) = simulation.node_at(world) else {
            self.gesture = Gesture::Panning { last: screen };
            return;
        };
        let Some(position) = simulation.node(index).map(|node| node.pos) else {
            return;
        };

        simulation.set_alpha_target(simulation.config().reheat_alpha);
        simulation.pin(index, position);
        self.gesture = Gesture::Dragging {
            node: index,
            grab_offset: position - world,
            press: screen,
            moved: false,
        };
    }

    fn pointer_released(&mut self, screen: Vec2, simulation: &mut Simulation) -> Option<String> {
        let gesture = self.end_gesture(simulation);
        self.update_hover(screen, simulation);

        match gesture {
            Gesture::Dragging {
                node, moved: false, ..
            } => simulation.node(node).map(|node| node.id.clone()),
            _ => None,
        }
    }

    fn end_gesture(&mut self, simulation: &mut Simulation) -> Gesture {
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        if let Gesture::Dragging { node, .. } = gesture {
            simulation.release(node);
            simulation.set_alpha_target(0.0);
        }
        gesture
    }

    fn update_hover(&mut self, screen: Vec2, simulation: &Simulation) {
        let world = self.transform.screen_to_world(screen);
        match simulation
            .node_at(world)
            .and_then(|index| simulation.node(index))
        {
            Some(node) => {
                self.tooltip = Tooltip {
                    visible: true,
                    label: node.id.clone(),
                    screen_pos: screen,
                };
            }
            None => self.tooltip.visible = false,
        }
    }
}
