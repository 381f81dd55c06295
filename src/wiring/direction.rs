//! Signal-flow direction: diagram orientation, port sides, and inference for
//! bidirectional ports

use super::model::{Cable, PortAlignment};
use crate::layout::PortSide;

/// Main flow direction of the layered layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    /// Left to right (`"LR"`), the default
    #[default]
    Right,
    /// Top to bottom (`"TB"`)
    Down,
}

impl LayoutDirection {
    /// Only `"TB"` selects top-to-bottom; anything else is left-to-right
    pub fn from_setting(setting: Option<&str>) -> Self {
        match setting {
            Some(d) if d.eq_ignore_ascii_case("TB") => LayoutDirection::Down,
            _ => LayoutDirection::Right,
        }
    }

    /// Value of `org.eclipse.elk.direction`
    pub fn as_elk(self) -> &'static str {
        match self {
            LayoutDirection::Right => "RIGHT",
            LayoutDirection::Down => "DOWN",
        }
    }

    /// Sides ports sit on in this direction: (inputs, outputs)
    pub fn flow_sides(self) -> (PortSide, PortSide) {
        match self {
            LayoutDirection::Right => (PortSide::West, PortSide::East),
            LayoutDirection::Down => (PortSide::North, PortSide::South),
        }
    }
}

/// Side for a port: inputs face upstream, everything else downstream
pub fn port_side(alignment: PortAlignment, direction: LayoutDirection) -> PortSide {
    let (input, output) = direction.flow_sides();
    match alignment {
        PortAlignment::In => input,
        PortAlignment::Out | PortAlignment::Bidirectional => output,
    }
}

/// Count cables leaving and entering a port
pub fn port_usage(node_id: &str, port_key: &str, cables: &[Cable]) -> (usize, usize) {
    let outgoing = cables
        .iter()
        .filter(|c| c.source == node_id && c.source_port_key.as_deref() == Some(port_key))
        .count();
    let incoming = cables
        .iter()
        .filter(|c| c.target == node_id && c.target_port_key.as_deref() == Some(port_key))
        .count();
    (outgoing, incoming)
}

/// Effective alignment of a port.
///
/// Declared `In` and `Out` are kept. A bidirectional (or unset) port follows the
/// majority of its cables and stays bidirectional on a tie.
pub fn resolve_alignment(
    declared: Option<PortAlignment>,
    node_id: &str,
    port_key: &str,
    cables: &[Cable],
) -> PortAlignment {
    match declared.unwrap_or_default() {
        PortAlignment::Bidirectional => {
            let (outgoing, incoming) = port_usage(node_id, port_key, cables);
            match outgoing.cmp(&incoming) {
                std::cmp::Ordering::Greater => PortAlignment::Out,
                std::cmp::Ordering::Less => PortAlignment::In,
                std::cmp::Ordering::Equal => PortAlignment::Bidirectional,
            }
        }
        fixed => fixed,
    }
}
