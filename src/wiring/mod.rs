//! Wiring descriptions and their conversion to layout input

pub mod convert;
pub mod direction;
pub mod model;
pub mod sizing;
pub mod validate;

pub use convert::{convert, convert_with, port_id};
pub use direction::LayoutDirection;
pub use model::{Area, Cable, DeviceNode, DevicePort, LayoutSettings, PortAlignment, WiringGraph};
pub use sizing::NodeSizer;
pub use validate::{validate, WiringError};
