//! Core types for the positioned box tree and routed edges

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ELK property carrying the side of a port
pub const PORT_SIDE_PROPERTY: &str = "org.eclipse.elk.portSide";

/// `area` or `device`
pub const TYPE_PROPERTY: &str = "hwMeta.type";

/// Signal category of a device or cable (`Audio`, `Video`, ...)
pub const CATEGORY_PROPERTY: &str = "hwMeta.category";

/// Installation status of a device or cable (`Regular`, `Existing`, `Defect`)
pub const STATUS_PROPERTY: &str = "hwMeta.status";

/// A 2D point in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate this point by an offset
    pub fn offset(self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A bounding box representing the spatial extent of an element
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// True when the box has no area
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Grow the box by `amount` on all four sides
    pub fn inflate(&self, amount: f64) -> BoundingBox {
        BoundingBox::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Check if this bounding box intersects another (touching edges do not count)
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Expand this bounding box to include a point
    pub fn expand_to_include(&self, point: Point) -> BoundingBox {
        let x = self.x.min(point.x);
        let y = self.y.min(point.y);
        let right = self.right().max(point.x);
        let bottom = self.bottom().max(point.y);
        BoundingBox::new(x, y, right - x, bottom - y)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// The face of a device a cable leaves from or enters through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortSide {
    North,
    South,
    East,
    West,
}

impl PortSide {
    /// Unit vector pointing away from the device
    pub fn outward(self) -> Point {
        match self {
            PortSide::East => Point::new(1.0, 0.0),
            PortSide::West => Point::new(-1.0, 0.0),
            PortSide::North => Point::new(0.0, -1.0),
            PortSide::South => Point::new(0.0, 1.0),
        }
    }

    /// East and West ports leave horizontally
    pub fn is_horizontal(self) -> bool {
        matches!(self, PortSide::East | PortSide::West)
    }

    /// Parse the ELK spelling (`"EAST"`, `"WEST"`, ...), case-insensitive
    pub fn parse(value: &str) -> Option<PortSide> {
        match value.to_ascii_uppercase().as_str() {
            "NORTH" => Some(PortSide::North),
            "SOUTH" => Some(PortSide::South),
            "EAST" => Some(PortSide::East),
            "WEST" => Some(PortSide::West),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PortSide::North => "NORTH",
            PortSide::South => "SOUTH",
            PortSide::East => "EAST",
            PortSide::West => "WEST",
        }
    }
}

/// A text label attached to a node, port or edge
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub text: String,
}

/// Free-form ELK properties (`hwMeta.*`, `org.eclipse.elk.*`)
pub type Properties = BTreeMap<String, Value>;

/// A port on a device, positioned relative to its owning node
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub width: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<PortSide>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl Port {
    /// Anchor point relative to the owning node (the port center)
    pub fn anchor(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Resolve the side: explicit field, then the ELK property, then the
    /// boundary of `node` the port sits on.
    pub fn resolved_side(&self, node_width: f64, node_height: f64) -> PortSide {
        if let Some(side) = self.side {
            return side;
        }
        if let Some(side) = self
            .properties
            .get(PORT_SIDE_PROPERTY)
            .and_then(Value::as_str)
            .and_then(PortSide::parse)
        {
            return side;
        }

        let anchor = self.anchor();
        let distances = [
            (PortSide::West, anchor.x.abs()),
            (PortSide::East, (node_width - anchor.x).abs()),
            (PortSide::North, anchor.y.abs()),
            (PortSide::South, (node_height - anchor.y).abs()),
        ];
        distances
            .iter()
            .fold(distances[0], |best, &candidate| {
                if candidate.1 < best.1 {
                    candidate
                } else {
                    best
                }
            })
            .0
    }
}

/// A routed-geometry record supplied by the layout engine, in the frame of
/// the edge's container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start_point: Point,
    pub end_point: Point,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bend_points: Vec<Point>,
}

impl EdgeSection {
    /// Start, bends, end
    pub fn points(&self) -> Vec<Point> {
        let mut points = Vec::with_capacity(self.bend_points.len() + 2);
        points.push(self.start_point);
        points.extend(self.bend_points.iter().copied());
        points.push(self.end_point);
        points
    }
}

/// An edge (cable) between two ports or nodes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<EdgeSection>,
    /// Id of the node whose coordinate frame `sections` use
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
}

impl LayoutEdge {
    pub fn source(&self) -> Option<&str> {
        self.sources.first().map(String::as_str)
    }

    pub fn target(&self) -> Option<&str> {
        self.targets.first().map(String::as_str)
    }

    /// Read a string property such as `hwMeta.category`
    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// A laid-out box. Devices are leaves, areas are containers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionedNode {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PositionedNode>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<LayoutEdge>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: Properties,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub layout_options: Properties,
}

impl PositionedNode {
    pub fn is_device(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_container(&self) -> bool {
        !self.children.is_empty()
    }

    /// First label text, or the node id
    pub fn display_label(&self) -> &str {
        self.labels
            .first()
            .map(|l| l.text.as_str())
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.id)
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

/// Root of one laid-out diagram (the ELK root node)
pub type LayoutGraph = PositionedNode;

/// Ordered waypoints in absolute coordinates
pub type RoutePath = Vec<Point>;

/// Absolute position and side of one resolved edge endpoint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortAnchor<'a> {
    pub point: Point,
    pub side: PortSide,
    pub node_id: &'a str,
}

/// One edge's routing inputs. The endpoint nodes never count as obstacles.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingRequest<'a> {
    pub source: PortAnchor<'a>,
    pub target: PortAnchor<'a>,
}

impl<'a> RoutingRequest<'a> {
    pub fn new(source: PortAnchor<'a>, target: PortAnchor<'a>) -> Self {
        Self { source, target }
    }

    /// Node ids excluded from this edge's obstacle set
    pub fn excluded(&self) -> [&'a str; 2] {
        [self.source.node_id, self.target.node_id]
    }
}

fn is_zero(value: &f64) -> bool {
    *value == 0.0
}
