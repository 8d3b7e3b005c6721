use pkg_constants::limits::{MAX_DNS1123_LABEL_LEN, MAX_PORT, MIN_PORT};
use pkg_constants::policy::ANY_PORT;
use pkg_types::graph::{Edge, Node, PortEntry, short_id};
use pkg_types::issue::Issue;
use pkg_types::validate::{PortSyntax, classify_port};

pub(crate) const FIELD_SOURCE: &str = "source";
pub(crate) const FIELD_TARGET: &str = "target";

/// Field key of one port entry: `ports[<entryId>].port`.
pub(crate) fn port_field(entry_id: &str) -> String {
    format!("ports[{}].port", entry_id)
}

pub(crate) fn check_edge(edge: &Edge, nodes: &[Node], issues: &mut Vec<Issue>) {
    if !edge.is_rule() {
        return;
    }

    let exists = |id: &str| nodes.iter().any(|n| n.id == id);
    if !exists(&edge.source) {
        issues.push(Issue::error(
            format!(
                "Source node '{}' of rule {} does not exist",
                edge.source,
                short_id(&edge.id)
            ),
            &edge.id,
            FIELD_SOURCE,
        ));
    }
    if !exists(&edge.target) {
        issues.push(Issue::error(
            format!(
                "Target node '{}' of rule {} does not exist",
                edge.target,
                short_id(&edge.id)
            ),
            &edge.id,
            FIELD_TARGET,
        ));
    }

    for entry in &edge.ports {
        if let Some(issue) = check_port_format(entry, &edge.id) {
            issues.push(issue);
        }
        if let Some(issue) = check_protocol_port(entry, &edge.id) {
            issues.push(issue);
        }
    }
}

fn check_port_format(entry: &PortEntry, edge_id: &str) -> Option<Issue> {
    let field = port_field(&entry.id);
    let port = &entry.port;
    match classify_port(port) {
        PortSyntax::Empty => Some(Issue::error("Port cannot be empty", edge_id, field)),
        PortSyntax::Any | PortSyntax::Number(_) | PortSyntax::Named => None,
        PortSyntax::NumberOutOfRange => Some(Issue::error(
            format!(
                "Port number '{}' must be within {}-{}",
                port, MIN_PORT, MAX_PORT
            ),
            edge_id,
            field,
        )),
        PortSyntax::Range(..) | PortSyntax::RangeOutOfBounds => Some(Issue::warning(
            format!(
                "Port range '{}' is not supported by NetworkPolicy and will be dropped at generation time",
                port
            ),
            edge_id,
            field,
        )),
        PortSyntax::Invalid => Some(Issue::error(
            format!(
                "Invalid port format '{}': expected a number, '{}', or a DNS-1123 port name (max {} characters)",
                port, ANY_PORT, MAX_DNS1123_LABEL_LEN
            ),
            edge_id,
            field,
        )),
    }
}

fn check_protocol_port(entry: &PortEntry, edge_id: &str) -> Option<Issue> {
    if !entry.protocol.ignores_port()
        || entry.port.is_empty()
        || entry.port.eq_ignore_ascii_case(ANY_PORT)
    {
        return None;
    }
    Some(Issue::warning(
        format!(
            "Protocol {} (rule {}) ignores specific ports; port '{}' has no effect",
            entry.protocol,
            short_id(edge_id),
            entry.port
        ),
        edge_id,
        port_field(&entry.id),
    ))
}
