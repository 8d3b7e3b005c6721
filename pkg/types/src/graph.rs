use anyhow::Context;
use pkg_constants::policy::SHORT_ID_LEN;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label map of a pod group. Ordered so every derived output is deterministic.
pub type Labels = BTreeMap<String, String>;

/// Default-deny switches of a pod group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    #[serde(default)]
    pub deny_ingress_by_default: bool,
    #[serde(default)]
    pub deny_egress_by_default: bool,
}

/// A set of workloads selected by `labels` inside `namespace`.
///
/// `namespace` is free-form and independent of which namespace node the
/// pod group is drawn inside.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub labels: Labels,
    #[serde(default)]
    pub policy_config: PolicyConfig,
}

/// A Kubernetes namespace. Empty `name` means "not named yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    #[serde(default)]
    pub name: String,
}

/// Kind-specific node attributes, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeData {
    Namespace(Namespace),
    PodGroup(PodGroup),
    /// Any kind this crate does not know about. Ignored by validation,
    /// never usable as a policy peer.
    #[serde(other)]
    Unknown,
}

/// A graph node as handed over by the owning store.
///
/// Serialized flat (`kind` next to the kind's own fields). Deserialized
/// through [`NodeRecord`] so plain YAML scalars such as `version: 2` still
/// load as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NodeRecord")]
pub struct Node {
    pub id: String,
    /// Visual containment (display only, never used to infer a namespace).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(flatten)]
    pub data: NodeData,
}

/// Flat, non-buffered form of a node document.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    id: String,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    labels: Labels,
    #[serde(default)]
    policy_config: PolicyConfig,
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        let data = match record.kind.as_str() {
            "namespace" => NodeData::Namespace(Namespace { name: record.name }),
            "podGroup" => NodeData::PodGroup(PodGroup {
                name: record.name,
                namespace: record.namespace,
                labels: record.labels,
                policy_config: record.policy_config,
            }),
            _ => NodeData::Unknown,
        };
        Self {
            id: record.id,
            parent: record.parent,
            data,
        }
    }
}

impl Node {
    pub fn pod_group(id: impl Into<String>, pod_group: PodGroup) -> Self {
        Self {
            id: id.into(),
            parent: None,
            data: NodeData::PodGroup(pod_group),
        }
    }

    pub fn namespace(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent: None,
            data: NodeData::Namespace(Namespace { name: name.into() }),
        }
    }

    /// Place this node inside a namespace node.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn as_pod_group(&self) -> Option<&PodGroup> {
        match &self.data {
            NodeData::PodGroup(pg) => Some(pg),
            _ => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match &self.data {
            NodeData::Namespace(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn is_pod_group(&self) -> bool {
        self.as_pod_group().is_some()
    }

    pub fn is_namespace(&self) -> bool {
        self.as_namespace().is_some()
    }

    /// The node's own name, falling back to its id while it is still unnamed.
    pub fn display_name(&self) -> &str {
        let name = match &self.data {
            NodeData::PodGroup(pg) => pg.name.as_str(),
            NodeData::Namespace(ns) => ns.name.as_str(),
            NodeData::Unknown => "",
        };
        if name.is_empty() { &self.id } else { name }
    }
}

/// Protocol selected for one port entry of a rule edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
    Icmp,
    Any,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Sctp => "SCTP",
            Protocol::Icmp => "ICMP",
            Protocol::Any => "ANY",
        }
    }

    /// ICMP and ANY have no notion of a specific port number.
    pub fn ignores_port(&self) -> bool {
        matches!(self, Protocol::Icmp | Protocol::Any)
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One port/protocol pair on a rule edge.
///
/// `port` is kept exactly as typed: a number, `any`, a named port, or a
/// `start-end` range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortEntry {
    pub id: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub protocol: Protocol,
}

impl PortEntry {
    pub fn new(id: impl Into<String>, port: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            id: id.into(),
            port: port.into(),
            protocol,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// "Traffic is allowed from source to target."
    #[default]
    Rule,
    /// Edges drawn by the canvas for other purposes; never compiled.
    #[serde(other)]
    Unknown,
}

/// A directed edge between two node ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    #[serde(default)]
    pub kind: EdgeKind,
    /// Empty when missing; reported as a dangling endpoint by validation.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub target: String,
    /// Insertion order is preserved in the generated manifest.
    #[serde(default)]
    pub ports: Vec<PortEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    pub fn rule(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: EdgeKind::Rule,
            source: source.into(),
            target: target.into(),
            ports: Vec::new(),
            label: None,
        }
    }

    pub fn with_port(mut self, entry: PortEntry) -> Self {
        self.ports.push(entry);
        self
    }

    pub fn is_rule(&self) -> bool {
        self.kind == EdgeKind::Rule
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Immutable view of the graph handed to the validator and compiler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Rule edges whose source or target is `node_id`.
    pub fn edges_touching<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges
            .iter()
            .filter(move |e| e.is_rule() && e.touches(node_id))
    }

    /// True when at least one pod group is drawn inside the namespace node.
    pub fn has_children(&self, namespace_id: &str) -> bool {
        self.nodes
            .iter()
            .any(|n| n.is_pod_group() && n.parent.as_deref() == Some(namespace_id))
    }

    /// Parse a snapshot document. YAML is a superset of JSON, so both work.
    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        let snapshot: Self = serde_yaml::from_str(text)?;
        Ok(snapshot)
    }
}

/// The last few characters of an id, for messages and fallback names.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().rev().nth(SHORT_ID_LEN - 1) {
        Some((idx, _)) => &id[idx..],
        None => id,
    }
}

/// Load a snapshot document from disk.
pub fn load_snapshot_file(path: &str) -> anyhow::Result<GraphSnapshot> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read graph file {}", path))?;
    GraphSnapshot::from_yaml_str(&content).with_context(|| format!("parse graph file {}", path))
}
