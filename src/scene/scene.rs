use glam::Affine3A;

use crate::errors::{PrismError, Result};
use crate::scene::Node;

/// The root of the source scene tree.
///
/// A `Scene` stays mutable for as long as the caller likes; pressing it
/// into a [`crate::prepared::PreparedScene`] walks the tree once and
/// never keeps references into it.
pub struct Scene {
    pub root: Node,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new("root"),
        }
    }

    /// Adds a node under the root and returns a handle to it.
    pub fn add(&mut self, node: Node) -> &mut Node {
        self.root.add_child(node)
    }

    /// Depth-first traversal with accumulated world transforms.
    pub fn visit<F: FnMut(&Node, &Affine3A)>(&self, mut f: F) {
        fn walk<F: FnMut(&Node, &Affine3A)>(node: &Node, parent: &Affine3A, f: &mut F) {
            let world = *parent * node.transform.local_matrix();
            f(node, &world);
            for child in &node.children {
                walk(child, &world, f);
            }
        }
        walk(&self.root, &Affine3A::IDENTITY, &mut f);
    }

    /// Validates every transform in the tree. Non-positive scales and
    /// non-unit rotations cannot be pressed into a renderable form.
    pub fn validate(&self) -> Result<()> {
        let mut error = None;
        self.visit(|node, _| {
            if error.is_some() {
                return;
            }
            let t = &node.transform;
            if t.scale.cmple(glam::Vec3::ZERO).any() {
                error = Some(format!(
                    "node `{}` has non-positive scale {:?}",
                    node.name, t.scale
                ));
            } else if !t.has_unit_rotation() {
                error = Some(format!(
                    "node `{}` has a non-unit rotation quaternion",
                    node.name
                ));
            } else if !t.position.is_finite() || !t.scale.is_finite() {
                error = Some(format!("node `{}` has a non-finite transform", node.name));
            }
        });
        match error {
            Some(message) => Err(PrismError::InvalidScene(message)),
            None => Ok(()),
        }
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
