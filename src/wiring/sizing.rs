//! Device box sizing from port counts

use serde::Deserialize;

use super::direction::LayoutDirection;
use crate::layout::PortSide;

/// Size parameters for device boxes
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeSizer {
    /// Width of every device box
    pub fixed_width: f64,
    /// Height each port row adds
    pub port_height: f64,
    /// Gap between neighbouring ports along a side
    pub port_spacing: f64,
    pub port_size: f64,
    /// Free space at both ends of a side
    pub port_padding: f64,
    pub label_height: f64,
    pub label_padding: f64,
}

impl Default for NodeSizer {
    fn default() -> Self {
        Self {
            fixed_width: 125.0,
            port_height: 20.0,
            port_spacing: 20.0,
            port_size: 10.0,
            port_padding: 15.0,
            label_height: 16.0,
            label_padding: 10.0,
        }
    }
}

impl NodeSizer {
    /// Length a side needs to hold `port_count` ports; zero for an empty side
    pub fn side_length(&self, port_count: usize) -> f64 {
        if port_count == 0 {
            return 0.0;
        }
        let n = port_count as f64;
        n * self.port_size + (n - 1.0) * self.port_spacing + 2.0 * self.port_padding
    }

    /// Width and height for a device whose ports sit on `sides`.
    ///
    /// Height grows with the busier of the two flow sides (at least one row).
    /// In top-to-bottom diagrams the flow sides run along the width, so the
    /// width grows past `fixed_width` when they need more room.
    pub fn size(&self, sides: &[PortSide], direction: LayoutDirection) -> (f64, f64) {
        let count = |side: PortSide| sides.iter().filter(|s| **s == side).count();
        let (input, output) = direction.flow_sides();
        let busiest = count(input).max(count(output));

        let rows = busiest.max(1) as f64;
        let height = (rows * self.port_height + self.label_height + self.label_padding).round();

        let width = match direction {
            LayoutDirection::Right => self.fixed_width,
            LayoutDirection::Down => self.fixed_width.max(self.side_length(busiest)),
        };
        (width.round(), height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_length() {
        let sizer = NodeSizer::default();
        assert_eq!(sizer.side_length(0), 0.0);
        assert_eq!(sizer.side_length(1), 40.0);
        assert_eq!(sizer.side_length(3), 100.0);
    }

    #[test]
    fn test_no_ports_gets_one_row() {
        let sizer = NodeSizer::default();
        assert_eq!(sizer.size(&[], LayoutDirection::Right), (125.0, 46.0));
    }

    #[test]
    fn test_height_follows_busier_side() {
        let sizer = NodeSizer::default();
        let sides = [
            PortSide::West,
            PortSide::East,
            PortSide::East,
            PortSide::East,
        ];
        assert_eq!(sizer.size(&sides, LayoutDirection::Right), (125.0, 86.0));
    }

    #[test]
    fn test_top_down_widens_crowded_nodes() {
        let sizer = NodeSizer::default();
        let sides = vec![PortSide::South; 5];
        // 5 * 10 + 4 * 20 + 2 * 15 = 160
        assert_eq!(sizer.size(&sides, LayoutDirection::Down), (160.0, 126.0));
        assert_eq!(sizer.size(&sides[..2], LayoutDirection::Down).0, 125.0);
    }

    #[test]
    fn test_partial_toml_override() {
        let sizer: NodeSizer = toml::from_str("fixed_width = 150.0").unwrap();
        assert_eq!(sizer.fixed_width, 150.0);
        assert_eq!(sizer.port_height, 20.0);
    }
}
