//! Edge routing over a laid-out box tree
//!
//! This module takes an ELK-style positioned node tree and produces one
//! absolute orthogonal polyline per edge, avoiding the device boxes near
//! each port.

pub mod config;
pub mod error;
pub mod geometry;
pub mod lint;
pub mod obstacles;
pub mod routing;
pub mod tree;
pub mod types;

pub use config::{ConfigError, RoutingConfig};
pub use error::{Endpoint, RouteError};
pub use obstacles::{filter_local, Obstacle, ObstacleIndex};
pub use routing::{
    collect_edges, compute_route, route_edges, route_local, CollisionHit, RouteSource,
    RoutedEdge, RoutingReport,
};
pub use tree::{absolute_offset, locate_node, locate_port, nearest_common_ancestor, walk_nodes};
pub use types::*;
