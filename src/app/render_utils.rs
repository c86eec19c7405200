use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use crate::schema::TypeClass;

/// Colors used to paint the relation graph under one theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct GraphPalette {
    pub(super) background: Color32,
    pub(super) grid: Color32,
    pub(super) edge: Color32,
    pub(super) node: Color32,
    pub(super) node_selected: Color32,
    pub(super) node_stroke: Color32,
    pub(super) search_match: Color32,
    pub(super) label: Color32,
    pub(super) tooltip_fill: Color32,
    pub(super) tooltip_text: Color32,
}

impl GraphPalette {
    pub(super) fn for_theme(dark_mode: bool) -> Self {
        let node = Color32::from_rgb(0x5d, 0x5c, 0xde);
        let node_selected = Color32::from_rgb(0x77, 0x75, 0xe6);

        if dark_mode {
            Self {
                background: Color32::from_rgb(17, 24, 39),
                grid: Color32::from_rgba_unmultiplied(75, 85, 99, 60),
                edge: Color32::from_rgb(0x37, 0x41, 0x51),
                node,
                node_selected,
                node_stroke: Color32::from_rgb(31, 41, 55),
                search_match: Color32::from_rgb(250, 204, 21),
                label: Color32::WHITE,
                tooltip_fill: Color32::from_rgba_unmultiplied(31, 41, 55, 235),
                tooltip_text: Color32::from_gray(240),
            }
        } else {
            Self {
                background: Color32::from_rgb(249, 250, 251),
                grid: Color32::from_rgba_unmultiplied(209, 213, 219, 90),
                edge: Color32::from_rgb(0xe5, 0xe7, 0xeb),
                node,
                node_selected,
                node_stroke: Color32::WHITE,
                search_match: Color32::from_rgb(217, 119, 6),
                label: Color32::WHITE,
                tooltip_fill: Color32::from_rgba_unmultiplied(255, 255, 255, 240),
                tooltip_text: Color32::from_gray(30),
            }
        }
    }
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * amount).round() as u8;

    Color32::from_rgba_unmultiplied(
        mix(base.r(), overlay.r()),
        mix(base.g(), overlay.g()),
        mix(base.b(), overlay.b()),
        mix(base.a(), overlay.a()),
    )
}

/// Badge color for a field type family.
pub(super) fn type_class_color(class: TypeClass, dark_mode: bool) -> Color32 {
    let (r, g, b) = match class {
        TypeClass::Text => (59, 130, 246),
        TypeClass::Numeric => (16, 185, 129),
        TypeClass::Temporal => (245, 158, 11),
        TypeClass::Boolean => (239, 68, 68),
        TypeClass::Enumeration => (168, 85, 247),
        TypeClass::List => (236, 72, 153),
        TypeClass::Other => (107, 114, 128),
    };
    let color = Color32::from_rgb(r, g, b);

    if dark_mode {
        blend_color(color, Color32::WHITE, 0.25)
    } else {
        color
    }
}

pub(super) fn draw_background(
    painter: &Painter,
    rect: Rect,
    palette: &GraphPalette,
    translate: Vec2,
    scale: f32,
) {
    painter.rect_filled(rect, 0.0, palette.background);

    let step = (56.0 * scale.clamp(0.6, 1.8)).max(20.0);
    let stroke = Stroke::new(1.0, palette.grid);
    let origin = rect.min + translate;

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    Rect::from_two_pos(start, end).intersects(rect)
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn edge_color_follows_theme() {
        assert_eq!(GraphPalette::for_theme(true).edge, Color32::from_rgb(55, 65, 81));
        assert_eq!(
            GraphPalette::for_theme(false).edge,
            Color32::from_rgb(229, 231, 235)
        );
        assert_eq!(
            GraphPalette::for_theme(true).node,
            GraphPalette::for_theme(false).node
        );
    }

    #[test]
    fn blend_endpoints() {
        let a = Color32::from_rgb(0, 0, 0);
        let b = Color32::from_rgb(200, 100, 50);
        assert_eq!(blend_color(a, b, 0.0), a);
        assert_eq!(blend_color(a, b, 1.0), b);
        assert_eq!(blend_color(a, b, 0.5), Color32::from_rgb(100, 50, 25));
    }

    #[test]
    fn culling() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(circle_visible(rect, pos2(-10.0, 50.0), 15.0));
        assert!(!circle_visible(rect, pos2(-20.0, 50.0), 15.0));
        assert!(segment_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0)));
        assert!(!segment_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, -5.0)));
    }
}
