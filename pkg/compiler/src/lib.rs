//! Graph-to-NetworkPolicy compiler.
//!
//! Given a snapshot and the id of one pod group, builds the policy that
//! governs that pod group: one ingress rule per incoming rule edge, one
//! egress rule per outgoing rule edge, plus default-deny sections driven by
//! the pod group's policy config. Edges whose peer cannot be expressed are
//! skipped; they are already reported by the validator.

pub mod error;
pub mod peer;
pub mod port;
pub mod render;

pub use error::CompileRefusal;
pub use peer::resolve_peer;
pub use port::{map_port, map_ports};
pub use render::render;

use pkg_constants::policy::POLICY_NAME_PREFIX;
use pkg_types::graph::{Edge, GraphSnapshot, Node, short_id};
use pkg_types::network_policy::{
    EgressRule, IngressRule, NetworkPolicy, NetworkPolicyPeer, NetworkPolicyPort, PolicyType,
};
use std::collections::BTreeSet;
use tracing::debug;

/// Compile the policy for `target_id`, or `None` when it cannot be anchored.
pub fn compile(target_id: &str, nodes: &[Node], edges: &[Edge]) -> Option<NetworkPolicy> {
    compile_checked(target_id, nodes, edges).ok()
}

/// Like [`compile`], but says why no policy was produced.
pub fn compile_checked(
    target_id: &str,
    nodes: &[Node],
    edges: &[Edge],
) -> Result<NetworkPolicy, CompileRefusal> {
    let target = find_node(nodes, target_id).ok_or_else(|| CompileRefusal::TargetNotFound {
        id: target_id.to_string(),
    })?;
    let pg = target
        .as_pod_group()
        .ok_or_else(|| CompileRefusal::NotAPodGroup {
            id: target_id.to_string(),
        })?;
    if pg.namespace.is_empty() {
        return Err(CompileRefusal::MissingNamespace {
            id: target_id.to_string(),
            name: target.display_name().to_string(),
        });
    }

    let name = if pg.name.is_empty() {
        short_id(target_id)
    } else {
        pg.name.as_str()
    };
    let mut policy = NetworkPolicy::new(
        format!("{}{}", POLICY_NAME_PREFIX, name),
        pg.namespace.clone(),
        pg.labels.clone(),
    );

    let ingress: Vec<IngressRule> = edges
        .iter()
        .filter(|e| e.is_rule() && e.target == target_id)
        .filter_map(|e| build_rule(e, &e.source, nodes, &pg.namespace))
        .map(|(peer, ports)| IngressRule {
            from: vec![peer],
            ports,
        })
        .collect();

    let egress: Vec<EgressRule> = edges
        .iter()
        .filter(|e| e.is_rule() && e.source == target_id)
        .filter_map(|e| build_rule(e, &e.target, nodes, &pg.namespace))
        .map(|(peer, ports)| EgressRule { to: vec![peer], ports })
        .collect();

    let mut policy_types = BTreeSet::new();

    let has_ingress_rules = !ingress.is_empty();
    let deny_ingress = pg.policy_config.deny_ingress_by_default;
    if has_ingress_rules || deny_ingress {
        policy_types.insert(PolicyType::Ingress);
        policy.spec.ingress = Some(ingress);
    }

    let has_egress_rules = !egress.is_empty();
    let deny_egress = pg.policy_config.deny_egress_by_default;
    if has_egress_rules || deny_egress {
        policy_types.insert(PolicyType::Egress);
        policy.spec.egress = Some(egress);
    }

    policy.spec.policy_types = policy_types.into_iter().collect();

    debug!(
        "Compiled {} in {} ({} policy types)",
        policy.metadata.name,
        policy.metadata.namespace,
        policy.spec.policy_types.len()
    );
    Ok(policy)
}

/// Snapshot convenience for [`compile`].
pub fn compile_snapshot(target_id: &str, snapshot: &GraphSnapshot) -> Option<NetworkPolicy> {
    compile(target_id, &snapshot.nodes, &snapshot.edges)
}

fn find_node<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    nodes.iter().find(|n| n.id == id)
}

/// Resolve the peer on the far side of `edge` and map its ports.
fn build_rule(
    edge: &Edge,
    peer_id: &str,
    nodes: &[Node],
    policy_namespace: &str,
) -> Option<(NetworkPolicyPeer, Vec<NetworkPolicyPort>)> {
    let Some(peer_node) = find_node(nodes, peer_id) else {
        debug!("Skipping rule {}: peer node {} not found", edge.id, peer_id);
        return None;
    };
    let Some(peer) = resolve_peer(peer_node, policy_namespace) else {
        debug!(
            "Skipping rule {}: node {} cannot be used as a peer",
            edge.id, peer_id
        );
        return None;
    };
    Some((peer, map_ports(&edge.ports)))
}
