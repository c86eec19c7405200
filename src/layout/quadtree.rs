use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 10;

#[derive(Clone, Copy)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    /// Smallest square around `points`, padded by a unit margin. `None` for an
    /// empty set or when any coordinate is non-finite.
    fn from_points(points: &[Vec2]) -> Option<Self> {
        let (&first, rest) = points.split_first()?;
        let (lo, hi) = rest.iter().try_fold((first, first), |(lo, hi), &point| {
            point.is_finite().then(|| (lo.min(point), hi.max(point)))
        })?;
        if !first.is_finite() {
            return None;
        }

        let side = (hi - lo).max(Vec2::splat(1.0)).max_elem();
        Some(Self {
            center: lo + (hi - lo) * 0.5,
            half_extent: side * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        (point - self.center).abs().max_elem() <= self.half_extent
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        match (point.x >= self.center.x, point.y >= self.center.y) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Gap between two boxes, zero when they overlap.
    pub(super) fn gap_to(self, other: Self) -> f32 {
        let reach = self.half_extent + other.half_extent;
        let dx = ((self.center.x - other.center.x).abs() - reach).max(0.0);
        let dy = ((self.center.y - other.center.y).abs() - reach).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }
}

/// Region quadtree over node positions. Each cell tracks its point count as
/// mass, the mean position, and the largest radius it holds.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    pub(super) max_radius: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let bounds = QuadBounds::from_points(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_node(bounds, indices, positions, radii, 0))
    }

    fn build_node(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        radii: &[f32],
        depth: usize,
    ) -> Self {
        let mut center_of_mass = Vec2::ZERO;
        let mut max_radius = 0.0_f32;
        for &index in &indices {
            center_of_mass += positions[index];
            max_radius = max_radius.max(radii.get(index).copied().unwrap_or(0.0));
        }

        let mass = indices.len() as f32;
        if mass > 0.0 {
            center_of_mass /= mass;
        }

        let mut node = Self {
            bounds,
            center_of_mass,
            mass,
            max_radius,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || node.indices.len() <= LEAF_CAPACITY {
            return node;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &node.indices {
            buckets[bounds.quadrant_for(positions[index])].push(index);
        }

        // Coincident points would otherwise split forever.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return node;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            node.children[quadrant] = Some(Box::new(Self::build_node(
                bounds.child(quadrant),
                bucket,
                positions,
                radii,
                depth + 1,
            )));
        }
        node.indices.clear();
        node
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(|child| child.is_none())
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadNode> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_builds_nothing() {
        assert!(QuadNode::build(&[], &[]).is_none());
    }

    #[test]
    fn non_finite_positions_build_nothing() {
        assert!(QuadNode::build(&[vec2(f32::NAN, 0.0)], &[1.0]).is_none());
    }

    #[test]
    fn one_bad_position_spoils_the_bounds() {
        let positions = [vec2(0.0, 0.0), vec2(f32::NAN, 3.0), vec2(10.0, 10.0)];
        assert!(QuadBounds::from_points(&positions).is_none());
    }

    #[test]
    fn bounds_cover_every_point() {
        let positions = [vec2(-40.0, 2.0), vec2(60.0, -8.0), vec2(0.0, 30.0)];
        let bounds = QuadBounds::from_points(&positions).expect("finite points");

        assert!(positions.iter().all(|&point| bounds.contains(point)));
        assert!(!bounds.contains(vec2(200.0, 0.0)));
        assert_eq!(bounds.center, vec2(10.0, 11.0));
        assert_eq!(bounds.half_extent, 51.0);
    }

    #[test]
    fn splits_and_keeps_totals() {
        let positions = (0..40)
            .map(|index| vec2((index % 8) as f32 * 50.0, (index / 8) as f32 * 50.0))
            .collect::<Vec<_>>();
        let radii = (0..40).map(|index| index as f32).collect::<Vec<_>>();

        let tree = QuadNode::build(&positions, &radii).expect("tree builds");
        assert!(!tree.is_leaf());
        assert_eq!(tree.mass, 40.0);
        assert_eq!(tree.max_radius, 39.0);

        let child_mass = tree.children().map(|child| child.mass).sum::<f32>();
        assert_eq!(child_mass, 40.0);
        for position in &positions {
            assert!(tree.bounds.contains(*position));
        }
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(5.0, 5.0); 20];
        let tree = QuadNode::build(&positions, &[1.0; 20]).expect("tree builds");
        assert!(tree.is_leaf());
        assert_eq!(tree.indices.len(), 20);
    }

    #[test]
    fn gap_between_boxes() {
        let a = QuadBounds {
            center: vec2(0.0, 0.0),
            half_extent: 1.0,
        };
        let b = QuadBounds {
            center: vec2(5.0, 0.0),
            half_extent: 1.0,
        };
        assert_eq!(a.gap_to(b), 3.0);
        assert_eq!(a.gap_to(a), 0.0);
    }
}
