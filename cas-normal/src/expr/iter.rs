//! Post-order traversal of a subtree.

use super::{Context, ExprId};

/// An iterator that visits the nodes of a subtree in post-order: every child before its parent.
#[derive(Clone, Debug)]
pub struct ExprIter<'a> {
    ctx: &'a Context,

    /// Nodes still to be visited, with whether their children have already been pushed.
    stack: Vec<(ExprId, bool)>,
}

impl<'a> ExprIter<'a> {
    /// Creates a new iterator over the subtree rooted at `root`.
    pub fn new(ctx: &'a Context, root: ExprId) -> Self {
        Self { ctx, stack: vec![(root, false)] }
    }
}

impl Iterator for ExprIter<'_> {
    type Item = ExprId;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (id, expanded) = self.stack.pop()?;
            if expanded {
                return Some(id);
            }

            self.stack.push((id, true));
            for &child in self.ctx.children(id).iter().rev() {
                self.stack.push((child, false));
            }
        }
    }
}
