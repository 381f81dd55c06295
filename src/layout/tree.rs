//! Hierarchical coordinate resolution over the positioned box tree
//!
//! Node and port coordinates are relative to the parent node. These helpers
//! walk the tree from the root and accumulate offsets, so callers never keep
//! absolute positions around as shared state.

use super::types::{BoundingBox, Point, Port, PortSide, PositionedNode};

/// A node found in the tree together with its absolute origin
#[derive(Debug, Clone, Copy)]
pub struct LocatedNode<'a> {
    pub node: &'a PositionedNode,
    /// Absolute top-left corner of the node
    pub origin: Point,
    /// Absolute origin of the parent's coordinate frame (the root's origin for top-level nodes)
    pub parent_origin: Point,
    pub depth: usize,
}

impl LocatedNode<'_> {
    /// Absolute bounding box of the node
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(
            self.origin.x,
            self.origin.y,
            self.node.width,
            self.node.height,
        )
    }
}

/// A port found in the tree, in absolute coordinates
#[derive(Debug, Clone, Copy)]
pub struct LocatedPort<'a> {
    pub port: &'a Port,
    pub owner: LocatedNode<'a>,
    pub point: Point,
    pub side: PortSide,
}

/// Find a node by id and compute its absolute origin
pub fn locate_node<'a>(root: &'a PositionedNode, id: &str) -> Option<LocatedNode<'a>> {
    fn walk<'a>(
        node: &'a PositionedNode,
        parent_origin: Point,
        depth: usize,
        id: &str,
    ) -> Option<LocatedNode<'a>> {
        let origin = parent_origin.offset(Point::new(node.x, node.y));
        if node.id == id {
            return Some(LocatedNode {
                node,
                origin,
                parent_origin,
                depth,
            });
        }
        node.children
            .iter()
            .find_map(|child| walk(child, origin, depth + 1, id))
    }

    walk(root, Point::default(), 0, id)
}

/// Absolute offset of a node's coordinate frame
pub fn absolute_offset(root: &PositionedNode, id: &str) -> Option<Point> {
    locate_node(root, id).map(|located| located.origin)
}

/// Find a port by id anywhere in the tree
pub fn locate_port<'a>(root: &'a PositionedNode, port_id: &str) -> Option<LocatedPort<'a>> {
    fn walk<'a>(
        node: &'a PositionedNode,
        parent_origin: Point,
        depth: usize,
        port_id: &str,
    ) -> Option<LocatedPort<'a>> {
        let origin = parent_origin.offset(Point::new(node.x, node.y));
        if let Some(port) = node.ports.iter().find(|p| p.id == port_id) {
            let owner = LocatedNode {
                node,
                origin,
                parent_origin,
                depth,
            };
            return Some(LocatedPort {
                port,
                owner,
                point: origin.offset(port.anchor()),
                side: port.resolved_side(node.width, node.height),
            });
        }
        node.children
            .iter()
            .find_map(|child| walk(child, origin, depth + 1, port_id))
    }

    walk(root, Point::default(), 0, port_id)
}

/// Ids from the root down to and including `id`
pub fn ancestor_path<'a>(root: &'a PositionedNode, id: &str) -> Option<Vec<&'a str>> {
    fn walk<'a>(node: &'a PositionedNode, id: &str, path: &mut Vec<&'a str>) -> bool {
        path.push(&node.id);
        if node.id == id {
            return true;
        }
        for child in &node.children {
            if walk(child, id, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    let mut path = Vec::new();
    walk(root, id, &mut path).then_some(path)
}

/// Deepest node containing both endpoint nodes, used as the frame of
/// layout-engine edge geometry.
///
/// When one endpoint is an ancestor of the other, that ancestor is the
/// container. An edge from a node to itself lives in the node's parent.
pub fn nearest_common_ancestor<'a>(
    root: &'a PositionedNode,
    a: &str,
    b: &str,
) -> Option<LocatedNode<'a>> {
    let path_a = ancestor_path(root, a)?;
    let path_b = ancestor_path(root, b)?;

    let mut common = path_a
        .iter()
        .zip(path_b.iter())
        .take_while(|(x, y)| x == y)
        .count();
    if a == b && common > 1 {
        common -= 1;
    }

    let id = path_a.get(common.checked_sub(1)?)?;
    locate_node(root, id)
}

/// Visit every node with its absolute origin, parents before children
pub fn walk_nodes<'a>(root: &'a PositionedNode, mut visit: impl FnMut(LocatedNode<'a>)) {
    fn walk<'a>(
        node: &'a PositionedNode,
        parent_origin: Point,
        depth: usize,
        visit: &mut dyn FnMut(LocatedNode<'a>),
    ) {
        let origin = parent_origin.offset(Point::new(node.x, node.y));
        visit(LocatedNode {
            node,
            origin,
            parent_origin,
            depth,
        });
        for child in &node.children {
            walk(child, origin, depth + 1, visit);
        }
    }

    walk(root, Point::default(), 0, &mut visit);
}
