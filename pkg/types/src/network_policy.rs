use crate::graph::Labels;
use pkg_constants::policy::{NETWORK_POLICY_API_VERSION, NETWORK_POLICY_KIND};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kubernetes `networking.k8s.io/v1` NetworkPolicy.
///
/// Field declaration order is the key order of the rendered manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicy {
    pub api_version: String,
    pub kind: String,
    pub metadata: PolicyMetadata,
    pub spec: NetworkPolicySpec,
}

impl NetworkPolicy {
    /// A policy selecting `pod_selector` in `namespace` with no rules yet.
    pub fn new(name: String, namespace: String, pod_selector: Labels) -> Self {
        Self {
            api_version: NETWORK_POLICY_API_VERSION.to_string(),
            kind: NETWORK_POLICY_KIND.to_string(),
            metadata: PolicyMetadata { name, namespace },
            spec: NetworkPolicySpec {
                pod_selector: LabelSelector::new(pod_selector),
                policy_types: Vec::new(),
                ingress: None,
                egress: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMetadata {
    pub name: String,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicySpec {
    /// Pods this policy applies to. An empty map selects every pod in the namespace.
    pub pod_selector: LabelSelector,
    /// Which traffic directions this policy controls
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub policy_types: Vec<PolicyType>,
    /// `Some(vec![])` means "deny all ingress".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress: Option<Vec<IngressRule>>,
    /// `Some(vec![])` means "deny all egress".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub egress: Option<Vec<EgressRule>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: Labels,
}

impl LabelSelector {
    pub fn new(match_labels: Labels) -> Self {
        Self { match_labels }
    }
}

/// Variants are declared in label order so the derived `Ord` sorts like the labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PolicyType {
    Egress,
    Ingress,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Egress => "Egress",
            PolicyType::Ingress => "Ingress",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound traffic rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressRule {
    /// Source peers allowed
    #[serde(default)]
    pub from: Vec<NetworkPolicyPeer>,
    /// Ports allowed; empty means all ports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<NetworkPolicyPort>,
}

/// Outbound traffic rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EgressRule {
    /// Destination peers allowed
    #[serde(default)]
    pub to: Vec<NetworkPolicyPeer>,
    /// Ports allowed; empty means all ports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<NetworkPolicyPort>,
}

/// A peer in a network policy (pod selector and/or namespace selector).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkPolicyPeer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_selector: Option<LabelSelector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,
}

/// Protocols the manifest format accepts on a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortProtocol {
    Tcp,
    Udp,
    Sctp,
}

/// Numeric ports render as integers, named ports as strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u16),
    Name(String),
}

/// A port in a network policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPolicyPort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<PortProtocol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortValue>,
}

impl NetworkPolicyPort {
    pub fn is_empty(&self) -> bool {
        self.protocol.is_none() && self.port.is_none()
    }
}
