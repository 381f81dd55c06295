//! Error types for edge routing

use thiserror::Error;

/// Which end of an edge failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Source => write!(f, "source"),
            Endpoint::Target => write!(f, "target"),
        }
    }
}

/// Errors that skip a single edge. None of them abort a render pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// The edge names no source or no target
    #[error("edge '{edge}' has no {endpoint}")]
    MissingEndpoint { edge: String, endpoint: Endpoint },

    /// A referenced port or node does not exist in the box tree
    #[error("edge '{edge}': {endpoint} '{reference}' not found in layout")]
    UnresolvedPort {
        edge: String,
        endpoint: Endpoint,
        reference: String,
    },

    /// A referenced container does not exist in the box tree
    #[error("edge '{edge}': container '{container}' not found in layout")]
    UnresolvedContainer { edge: String, container: String },
}

impl RouteError {
    /// Create a missing endpoint error
    pub fn missing(edge: impl Into<String>, endpoint: Endpoint) -> Self {
        Self::MissingEndpoint {
            edge: edge.into(),
            endpoint,
        }
    }

    /// Create an unresolved port error
    pub fn unresolved(
        edge: impl Into<String>,
        endpoint: Endpoint,
        reference: impl Into<String>,
    ) -> Self {
        Self::UnresolvedPort {
            edge: edge.into(),
            endpoint,
            reference: reference.into(),
        }
    }

    /// Create an unresolved container error
    pub fn unresolved_container(edge: impl Into<String>, container: impl Into<String>) -> Self {
        Self::UnresolvedContainer {
            edge: edge.into(),
            container: container.into(),
        }
    }

    /// Id of the edge that was skipped
    pub fn edge_id(&self) -> &str {
        match self {
            Self::MissingEndpoint { edge, .. }
            | Self::UnresolvedPort { edge, .. }
            | Self::UnresolvedContainer { edge, .. } => edge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_display() {
        let err = RouteError::unresolved("e1", Endpoint::Target, "amp/in1");
        assert_eq!(
            err.to_string(),
            "edge 'e1': target 'amp/in1' not found in layout"
        );
        assert_eq!(err.edge_id(), "e1");
    }

    #[test]
    fn test_missing_display() {
        let err = RouteError::missing("e2", Endpoint::Source);
        assert!(err.to_string().contains("no source"));
    }
}
