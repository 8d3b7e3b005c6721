use pkg_types::graph::{GraphSnapshot, Node, NodeData};
use thiserror::Error;

/// The kind of rule a new edge between two nodes represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    PodToPod,
    EgressToNamespace,
    IngressFromNamespace,
}

impl ConnectionKind {
    /// Human description stored as the new edge's display label.
    pub fn describe(&self, source: &Node, target: &Node) -> String {
        let (s, t) = (source.display_name(), target.display_name());
        match self {
            ConnectionKind::PodToPod => format!("rule from {} to {}", s, t),
            ConnectionKind::EgressToNamespace => format!("egress from {} to namespace {}", s, t),
            ConnectionKind::IngressFromNamespace => {
                format!("ingress to {} from namespace {}", t, s)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionRefusal {
    #[error("source or target node not found")]
    NodeNotFound,
    #[error("a node cannot be connected to itself")]
    SelfConnection,
    #[error("a namespace cannot be connected directly to another namespace")]
    NamespaceToNamespace,
    #[error("a connection between these elements is not allowed")]
    Unsupported,
}

/// Decide whether a rule edge from `source` to `target` may be drawn.
pub fn check_connection(
    snapshot: &GraphSnapshot,
    source: &str,
    target: &str,
) -> Result<ConnectionKind, ConnectionRefusal> {
    let (Some(s), Some(t)) = (snapshot.node(source), snapshot.node(target)) else {
        return Err(ConnectionRefusal::NodeNotFound);
    };
    if source == target {
        return Err(ConnectionRefusal::SelfConnection);
    }
    match (&s.data, &t.data) {
        (NodeData::PodGroup(_), NodeData::PodGroup(_)) => Ok(ConnectionKind::PodToPod),
        (NodeData::PodGroup(_), NodeData::Namespace(_)) => Ok(ConnectionKind::EgressToNamespace),
        (NodeData::Namespace(_), NodeData::PodGroup(_)) => {
            Ok(ConnectionKind::IngressFromNamespace)
        }
        (NodeData::Namespace(_), NodeData::Namespace(_)) => {
            Err(ConnectionRefusal::NamespaceToNamespace)
        }
        _ => Err(ConnectionRefusal::Unsupported),
    }
}
