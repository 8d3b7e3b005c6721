use pkg_constants::policy::NAMESPACE_NAME_LABEL;
use pkg_types::graph::{Labels, Node, NodeData};
use pkg_types::network_policy::{LabelSelector, NetworkPolicyPeer};

/// Selector matching a namespace by its well-known name label.
fn namespace_selector(name: &str) -> LabelSelector {
    let mut labels = Labels::new();
    labels.insert(NAMESPACE_NAME_LABEL.to_string(), name.to_string());
    LabelSelector::new(labels)
}

/// Turn the node on the other end of a rule edge into a policy peer.
///
/// Pod groups select their pods, plus their namespace when it differs from
/// `policy_namespace`. Named namespaces select the whole namespace. Anything
/// else (unnamed namespaces, unknown kinds) yields `None` and the edge is
/// skipped.
pub fn resolve_peer(node: &Node, policy_namespace: &str) -> Option<NetworkPolicyPeer> {
    match &node.data {
        NodeData::PodGroup(pg) => {
            let namespace_selector = if !pg.namespace.is_empty() && pg.namespace != policy_namespace
            {
                Some(namespace_selector(&pg.namespace))
            } else {
                None
            };
            Some(NetworkPolicyPeer {
                pod_selector: Some(LabelSelector::new(pg.labels.clone())),
                namespace_selector,
            })
        }
        NodeData::Namespace(ns) if !ns.name.is_empty() => Some(NetworkPolicyPeer {
            pod_selector: None,
            namespace_selector: Some(namespace_selector(&ns.name)),
        }),
        _ => None,
    }
}
