//! Node colors, kept outside the syntax tree.

/// Index of a markable node: a top-level statement, an import or export
/// specifier, or a class member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reachability state of a node. Colors only ever advance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeColor {
    /// Not reached.
    #[default]
    White,
    /// Reached, but only some of its parts are kept: a class whose members
    /// are still being decided, or an import list with unused specifiers.
    Gray,
    /// Kept in full.
    Black,
}

/// Dense `NodeId -> NodeColor` map.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    colors: Vec<NodeColor>,
}

impl ColorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new white node.
    pub fn alloc(&mut self) -> NodeId {
        let id = NodeId(self.colors.len() as u32);
        self.colors.push(NodeColor::White);
        id
    }

    pub fn get(&self, node: NodeId) -> NodeColor {
        self.colors
            .get(node.index())
            .copied()
            .unwrap_or_default()
    }

    /// Move `node` to `color` unless it is already there or further.
    ///
    /// Returns `true` if the color changed.
    pub fn advance(&mut self, node: NodeId, color: NodeColor) -> bool {
        match self.colors.get_mut(node.index()) {
            Some(current) if *current < color => {
                *current = color;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Number of nodes with exactly `color`.
    pub fn count(&self, color: NodeColor) -> usize {
        self.colors.iter().filter(|c| **c == color).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_never_regress() {
        let mut colors = ColorMap::new();
        let node = colors.alloc();
        assert_eq!(colors.get(node), NodeColor::White);

        assert!(colors.advance(node, NodeColor::Black));
        assert!(!colors.advance(node, NodeColor::Gray));
        assert!(!colors.advance(node, NodeColor::Black));
        assert_eq!(colors.get(node), NodeColor::Black);
    }

    #[test]
    fn gray_can_become_black() {
        let mut colors = ColorMap::new();
        let first = colors.alloc();
        let second = colors.alloc();
        assert!(colors.advance(second, NodeColor::Gray));
        assert!(colors.advance(second, NodeColor::Black));
        assert_eq!(colors.get(first), NodeColor::White);
        assert_eq!(colors.count(NodeColor::Black), 1);
        assert_eq!(colors.len(), 2);
    }
}
