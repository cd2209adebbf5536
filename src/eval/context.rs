use crate::parse::CommandNode;

/// Where in the tree a node is being evaluated.
///
/// Carried down the recursion for diagnostics only; it never changes an outcome.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    /// Depth below the root (the root is 0).
    pub level: usize,
    /// The compound node whose child is being evaluated, if any.
    pub parent: Option<&'a CommandNode>,
}

impl<'a> EvalContext<'a> {
    /// Context for the root of a tree.
    pub fn root() -> Self {
        Self {
            level: 0,
            parent: None,
        }
    }

    /// Context for the children of `node`.
    pub fn descend(self, node: &'a CommandNode) -> Self {
        Self {
            level: self.level + 1,
            parent: Some(node),
        }
    }

    /// Syntax of the parent's operator, or `-` at the root.
    pub fn parent_op(&self) -> &'static str {
        self.parent
            .and_then(CommandNode::operator)
            .map_or("-", |op| op.as_str())
    }
}
