//! Surface-area-heuristic branch builder.
//!
//! Centroids are binned along the major axis of the centroid bounds;
//! the split minimizing `c_trav + (A_L·n_L + A_R·n_R) / A_parent ·
//! c_isect` wins. Leaves hold exactly one primitive. Nodes land in a
//! dense array with both children of an interior node adjacent, so a
//! node token needs only the first child index.

use glam::Vec3;

use crate::accel::{BvhNode, Token};
use crate::math::Aabb;

const BIN_COUNT: usize = 12;
const TRAVERSAL_COST: f32 = 1.0;
const INTERSECT_COST: f32 = 2.0;

struct BuildItem {
    bounds: Aabb,
    centroid: Vec3,
    token: Token,
}

pub(super) struct Builder {
    nodes: Vec<BvhNode>,
    max_depth: u32,
}

impl Builder {
    pub(super) fn build(aabbs: &[Aabb], tokens: &[Token]) -> (Vec<BvhNode>, u32) {
        assert_eq!(aabbs.len(), tokens.len());
        if aabbs.is_empty() {
            return (Vec::new(), 0);
        }
        let mut items: Vec<BuildItem> = aabbs
            .iter()
            .zip(tokens)
            .map(|(bounds, &token)| {
                debug_assert!(token.is_geometry());
                BuildItem {
                    bounds: *bounds,
                    centroid: bounds.center(),
                    token,
                }
            })
            .collect();

        let mut builder = Self {
            // A binary tree with one primitive per leaf has 2n - 1 nodes.
            nodes: Vec::with_capacity(2 * aabbs.len() - 1),
            max_depth: 0,
        };
        builder.nodes.push(BvhNode::new(&Aabb::EMPTY, Token::NONE));
        builder.subdivide(0, &mut items, 1);
        (builder.nodes, builder.max_depth)
    }

    fn subdivide(&mut self, slot: usize, items: &mut [BuildItem], depth: u32) {
        self.max_depth = self.max_depth.max(depth);

        let mut bounds = Aabb::EMPTY;
        for item in items.iter() {
            bounds.encapsulate_box(&item.bounds);
        }

        if let [single] = items {
            self.nodes[slot] = BvhNode::new(&bounds, single.token);
            return;
        }

        let mid = split_index(items, &bounds);
        let first_child = self.nodes.len();
        self.nodes.push(BvhNode::new(&Aabb::EMPTY, Token::NONE));
        self.nodes.push(BvhNode::new(&Aabb::EMPTY, Token::NONE));
        self.nodes[slot] = BvhNode::new(&bounds, Token::node(first_child));

        let (left, right) = items.split_at_mut(mid);
        self.subdivide(first_child, left, depth + 1);
        self.subdivide(first_child + 1, right, depth + 1);
    }
}

/// Picks the split position within `items`, reordering them so the left
/// child takes `items[..mid]`. Falls back to a median split when the
/// centroids cannot be separated.
fn split_index(items: &mut [BuildItem], bounds: &Aabb) -> usize {
    let mut centroid_bounds = Aabb::EMPTY;
    for item in items.iter() {
        centroid_bounds.encapsulate(item.centroid);
    }
    let axis = centroid_bounds.major_axis();
    let origin = centroid_bounds.min[axis];
    let extent = centroid_bounds.extent()[axis];
    if extent <= f32::EPSILON {
        return items.len() / 2;
    }

    let bin_of = |item: &BuildItem| -> usize {
        let normalized = (item.centroid[axis] - origin) / extent;
        ((normalized * BIN_COUNT as f32) as usize).min(BIN_COUNT - 1)
    };

    let mut bin_bounds = [Aabb::EMPTY; BIN_COUNT];
    let mut bin_counts = [0usize; BIN_COUNT];
    for item in items.iter() {
        let bin = bin_of(item);
        bin_bounds[bin].encapsulate_box(&item.bounds);
        bin_counts[bin] += 1;
    }

    // Sweep the candidate planes from both sides.
    let mut left_area = [0.0_f32; BIN_COUNT];
    let mut left_count = [0usize; BIN_COUNT];
    let mut accum = Aabb::EMPTY;
    let mut count = 0;
    for i in 0..BIN_COUNT - 1 {
        accum.encapsulate_box(&bin_bounds[i]);
        count += bin_counts[i];
        left_area[i] = accum.half_area();
        left_count[i] = count;
    }
    let mut best_split = None;
    let mut best_cost = f32::INFINITY;
    let parent_area = bounds.half_area().max(f32::EPSILON);
    accum = Aabb::EMPTY;
    count = 0;
    for i in (1..BIN_COUNT).rev() {
        accum.encapsulate_box(&bin_bounds[i]);
        count += bin_counts[i];
        let (n_l, n_r) = (left_count[i - 1], count);
        if n_l == 0 || n_r == 0 {
            continue;
        }
        let cost = TRAVERSAL_COST
            + (left_area[i - 1] * n_l as f32 + accum.half_area() * n_r as f32) / parent_area
                * INTERSECT_COST;
        if cost < best_cost {
            best_cost = cost;
            best_split = Some(i);
        }
    }

    match best_split {
        Some(split) => partition(items, |item| bin_of(item) < split),
        None => {
            // Every centroid fell into one bin; order by centroid and
            // cut in half.
            let mid = items.len() / 2;
            items.select_nth_unstable_by(mid, |a, b| {
                a.centroid[axis].total_cmp(&b.centroid[axis])
            });
            mid
        }
    }
}

fn partition<F: Fn(&BuildItem) -> bool>(items: &mut [BuildItem], pred: F) -> usize {
    let mut first = 0;
    for i in 0..items.len() {
        if pred(&items[i]) {
            items.swap(first, i);
            first += 1;
        }
    }
    first
}
