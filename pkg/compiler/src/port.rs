use pkg_types::graph::{PortEntry, Protocol};
use pkg_types::network_policy::{NetworkPolicyPort, PortProtocol, PortValue};
use pkg_types::validate::{PortSyntax, classify_port};
use tracing::debug;

/// Translate one port entry of a rule edge into a manifest port.
///
/// Returns `None` when the entry cannot be expressed (ICMP with a specific
/// port, ranges, out-of-range numbers, malformed names) or when it carries
/// neither a protocol nor a port.
pub fn map_port(entry: &PortEntry) -> Option<NetworkPolicyPort> {
    let syntax = classify_port(&entry.port);
    let explicit_port = !matches!(syntax, PortSyntax::Empty | PortSyntax::Any);

    if entry.protocol == Protocol::Icmp && explicit_port {
        return None;
    }

    let protocol = match entry.protocol {
        Protocol::Tcp => Some(PortProtocol::Tcp),
        Protocol::Udp => Some(PortProtocol::Udp),
        Protocol::Sctp => Some(PortProtocol::Sctp),
        Protocol::Icmp | Protocol::Any => None,
    };

    let port = match syntax {
        PortSyntax::Empty | PortSyntax::Any => None,
        PortSyntax::Number(n) => Some(PortValue::Number(n)),
        PortSyntax::Named => Some(PortValue::Name(entry.port.clone())),
        PortSyntax::NumberOutOfRange
        | PortSyntax::Range(..)
        | PortSyntax::RangeOutOfBounds
        | PortSyntax::Invalid => return None,
    };

    let mapped = NetworkPolicyPort { protocol, port };
    if mapped.is_empty() { None } else { Some(mapped) }
}

/// Map every entry in order, dropping the ones `map_port` rejects.
/// An empty result means "all ports".
pub fn map_ports(entries: &[PortEntry]) -> Vec<NetworkPolicyPort> {
    entries
        .iter()
        .filter_map(|entry| {
            let mapped = map_port(entry);
            if mapped.is_none() {
                debug!(
                    "Dropping port entry {} ({} {:?})",
                    entry.id, entry.protocol, entry.port
                );
            }
            mapped
        })
        .collect()
}
