//! Obstacle index: padded device rectangles for local collision checks

use serde::Serialize;

use super::config::RoutingConfig;
use super::tree::walk_nodes;
use super::types::{BoundingBox, Point, PositionedNode};

/// A padded, absolute rectangle standing in for one device box
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Obstacle {
    pub id: String,
    pub bounds: BoundingBox,
}

/// Flat list of obstacles for one render pass.
///
/// Built once from the box tree and shared read-only by every edge routed in
/// that pass. Rebuild it whenever the tree changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObstacleIndex {
    obstacles: Vec<Obstacle>,
}

impl ObstacleIndex {
    /// One obstacle per leaf node, inflated by `obstacle_padding`.
    /// Containers and zero-size leaves contribute nothing.
    pub fn build(root: &PositionedNode, config: &RoutingConfig) -> Self {
        let mut obstacles = Vec::new();
        walk_nodes(root, |located| {
            // The root is the diagram canvas, never a device
            if located.depth == 0 || !located.node.is_device() {
                return;
            }
            let bounds = located.bounds();
            if bounds.is_degenerate() {
                tracing::debug!(node = %located.node.id, "skipping zero-size device");
                return;
            }
            obstacles.push(Obstacle {
                id: located.node.id.clone(),
                bounds: bounds.inflate(config.obstacle_padding),
            });
        });
        tracing::debug!(count = obstacles.len(), "built obstacle index");
        Self { obstacles }
    }

    /// Wrap an explicit obstacle list
    pub fn from_obstacles(obstacles: Vec<Obstacle>) -> Self {
        Self { obstacles }
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Obstacles near `center`, skipping the excluded node ids
    pub fn nearby(&self, center: Point, radius: f64, excluded: &[&str]) -> Vec<&Obstacle> {
        filter_local(center, radius, &self.obstacles, excluded)
    }
}

/// Keep obstacles whose rectangle center is strictly closer than `radius` to
/// `center` and whose id is not excluded. Order is preserved.
pub fn filter_local<'a>(
    center: Point,
    radius: f64,
    obstacles: &'a [Obstacle],
    excluded: &[&str],
) -> Vec<&'a Obstacle> {
    obstacles
        .iter()
        .filter(|o| !excluded.contains(&o.id.as_str()))
        .filter(|o| o.bounds.center().distance(center) < radius)
        .collect()
}
