//! Semantic validation of a workload graph snapshot.
//!
//! Every call re-derives the full issue list from the snapshot it is given;
//! no state survives between calls. Nodes are checked first, in snapshot
//! order, then rule edges, so the output order is stable for a given input.

mod edge;
mod node;

use pkg_types::graph::{Edge, GraphSnapshot, Node};
use pkg_types::issue::Issue;
use tracing::debug;

/// Validate every node and rule edge.
pub fn validate(nodes: &[Node], edges: &[Edge]) -> Vec<Issue> {
    let mut issues = Vec::new();
    for n in nodes {
        node::check_node(n, &mut issues);
    }
    for e in edges {
        edge::check_edge(e, nodes, &mut issues);
    }

    debug!(
        "Validated {} nodes / {} edges: {} errors, {} warnings",
        nodes.len(),
        edges.len(),
        issues.iter().filter(|i| i.is_error()).count(),
        issues.iter().filter(|i| i.is_warning()).count()
    );
    issues
}

pub fn validate_snapshot(snapshot: &GraphSnapshot) -> Vec<Issue> {
    validate(&snapshot.nodes, &snapshot.edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::graph::{Labels, PodGroup, PortEntry, Protocol};
    use pkg_types::issue::Severity;

    fn labels(pairs: &[(&str, &str)]) -> Labels {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn pod_group(id: &str, name: &str, namespace: &str, l: &[(&str, &str)]) -> Node {
        Node::pod_group(
            id,
            PodGroup {
                name: name.to_string(),
                namespace: namespace.to_string(),
                labels: labels(l),
                ..Default::default()
            },
        )
    }

    fn field_keys(issues: &[Issue]) -> Vec<&str> {
        issues
            .iter()
            .map(|i| i.field_key.as_deref().unwrap_or(""))
            .collect()
    }

    fn port_issues(port: &str, protocol: Protocol) -> Vec<Issue> {
        let nodes = vec![
            pod_group("a", "a", "default", &[("app", "a")]),
            pod_group("b", "b", "default", &[("app", "b")]),
        ];
        let edges = vec![Edge::rule("e1", "a", "b").with_port(PortEntry::new("p1", port, protocol))];
        validate(&nodes, &edges)
    }

    #[test]
    fn valid_graph_has_no_issues() {
        let nodes = vec![
            Node::namespace("ns", "monitoring"),
            pod_group("a", "frontend", "web", &[("app", "frontend"), ("tier", "")]),
            pod_group("b", "backend", "web", &[("app", "backend")]),
        ];
        let edges = vec![
            Edge::rule("e1", "a", "b").with_port(PortEntry::new("p1", "8080", Protocol::Tcp)),
            Edge::rule("e2", "ns", "b").with_port(PortEntry::new("p1", "metrics", Protocol::Tcp)),
        ];
        assert!(validate(&nodes, &edges).is_empty());
    }

    #[test]
    fn pod_group_name_and_namespace_errors() {
        let nodes = vec![pod_group("pg1", "Bad_Name", "", &[("app", "x")])];
        let issues = validate(&nodes, &[]);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.is_error() && i.concerns("pg1")));
        assert_eq!(field_keys(&issues), vec!["metadata.name", "metadata.namespace"]);
    }

    #[test]
    fn namespace_node_uses_label_field() {
        let issues = validate(&[Node::namespace("ns1", "")], &[]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert_eq!(issues[0].field_key.as_deref(), Some("label"));
    }

    #[test]
    fn empty_labels_warn() {
        let issues = validate(&[pod_group("pg1", "api", "default", &[])], &[]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
        assert_eq!(issues[0].field_key.as_deref(), Some("labels"));
    }

    #[test]
    fn label_syntax_errors_are_keyed_per_label() {
        let nodes = vec![pod_group(
            "pg1",
            "api",
            "default",
            &[("good", "ok"), ("-bad", "x"), ("app", "bad value"), ("  ", "v")],
        )];
        let issues = validate(&nodes, &[]);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(Issue::is_error));
        let keys = field_keys(&issues);
        assert!(keys.contains(&"labels.\"-bad\""));
        assert!(keys.contains(&"labels.\"app\""));
        assert!(keys.contains(&"labels.\"  \""));
    }

    #[test]
    fn dangling_endpoints_are_errors() {
        let nodes = vec![pod_group("a", "a", "default", &[("app", "a")])];
        let edges = vec![Edge::rule("edge-xyz", "a", "ghost"), Edge::rule("e2", "nope", "gone")];
        let issues = validate(&nodes, &edges);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(Issue::is_error));
        assert!(issues[0].concerns("edge-xyz"));
        assert_eq!(field_keys(&issues), vec!["target", "source", "target"]);
    }

    #[test]
    fn non_rule_edges_are_ignored() {
        let mut edge = Edge::rule("e1", "ghost", "ghost");
        edge.kind = pkg_types::graph::EdgeKind::Unknown;
        assert!(validate(&[], &[edge]).is_empty());
    }

    #[test]
    fn port_grammar() {
        assert!(port_issues("80", Protocol::Tcp).is_empty());
        assert!(port_issues("any", Protocol::Tcp).is_empty());
        assert!(port_issues("Any", Protocol::Udp).is_empty());
        assert!(port_issues("http", Protocol::Tcp).is_empty());

        let empty = port_issues("", Protocol::Tcp);
        assert_eq!(empty.len(), 1);
        assert!(empty[0].is_error());
        assert_eq!(empty[0].message, "Port cannot be empty");
        assert_eq!(empty[0].field_key.as_deref(), Some("ports[p1].port"));

        for bad in ["0", "65536", "HTTP", "web_port"] {
            let issues = port_issues(bad, Protocol::Tcp);
            assert_eq!(issues.len(), 1, "port {:?}", bad);
            assert!(issues[0].is_error(), "port {:?}", bad);
        }
    }

    #[test]
    fn port_range_is_only_a_warning() {
        let issues = port_issues("100-200", Protocol::Tcp);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_warning());
        assert!(issues[0].message.contains("dropped"));
    }

    #[test]
    fn out_of_bounds_range_is_still_only_a_warning() {
        for range in ["0-200", "0-10", "70000-80000", "10-99999999"] {
            let issues = port_issues(range, Protocol::Tcp);
            assert_eq!(issues.len(), 1, "port {:?}", range);
            assert!(issues[0].is_warning(), "port {:?}", range);
            assert_eq!(issues[0].field_key.as_deref(), Some("ports[p1].port"));
        }
    }

    #[test]
    fn icmp_and_any_with_specific_port_warn() {
        let icmp = port_issues("123", Protocol::Icmp);
        assert_eq!(icmp.len(), 1);
        assert!(icmp[0].is_warning());

        let any = port_issues("http", Protocol::Any);
        assert_eq!(any.len(), 1);
        assert!(any[0].is_warning());

        assert!(port_issues("any", Protocol::Icmp).is_empty());
    }

    #[test]
    fn empty_port_with_icmp_is_only_the_empty_error() {
        let issues = port_issues("", Protocol::Icmp);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }

    #[test]
    fn in_progress_state_does_not_panic() {
        let nodes = vec![
            Node::pod_group("pg1", PodGroup::default()),
            Node::namespace("ns1", ""),
        ];
        let edges = vec![Edge::rule("e1", "", "").with_port(PortEntry::new("p1", "", Protocol::Any))];
        let issues = validate(&nodes, &edges);
        assert!(issues.iter().any(|i| i.concerns("pg1")));
        assert!(issues.iter().any(|i| i.concerns("ns1")));
        assert!(issues.iter().any(|i| i.concerns("e1")));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn only(issues: &[Issue], field: &str) -> Vec<Issue> {
            issues
                .iter()
                .filter(|i| i.field_key.as_deref() == Some(field))
                .cloned()
                .collect()
        }

        proptest! {
            #[test]
            fn overlong_names_yield_exactly_one_error(name in "[a-z]{64,80}") {
                let nodes = vec![
                    pod_group("pg", &name, "default", &[("app", "x")]),
                    pod_group("pg2", "ok", &name, &[("app", "x")]),
                    Node::namespace("ns", name.clone()),
                ];
                let issues = validate(&nodes, &[]);
                let names = only(&issues, "metadata.name");
                let namespaces = only(&issues, "metadata.namespace");
                let ns_labels = only(&issues, "label");
                prop_assert_eq!(names.len(), 1);
                prop_assert!(names[0].is_error() && names[0].concerns("pg"));
                prop_assert_eq!(namespaces.len(), 1);
                prop_assert!(namespaces[0].is_error() && namespaces[0].concerns("pg2"));
                prop_assert_eq!(ns_labels.len(), 1);
                prop_assert!(ns_labels[0].is_error());
            }

            #[test]
            fn non_dns1123_names_yield_exactly_one_error(name in "[A-Z_.!][a-zA-Z0-9_.!-]{0,20}") {
                let nodes = vec![pod_group("pg", &name, "default", &[("app", "x")])];
                let issues = validate(&nodes, &[]);
                prop_assert_eq!(issues.len(), 1);
                prop_assert!(issues[0].is_error());
                prop_assert_eq!(issues[0].field_key.as_deref(), Some("metadata.name"));
            }

            #[test]
            fn empty_labels_yield_exactly_one_warning(name in "[a-z][a-z0-9]{0,10}") {
                let nodes = vec![pod_group("pg", &name, "default", &[])];
                let issues = validate(&nodes, &[]);
                let warnings = only(&issues, "labels");
                prop_assert_eq!(warnings.len(), 1);
                prop_assert!(warnings[0].is_warning());
            }

            #[test]
            fn validation_is_idempotent(
                name in "[a-zA-Z0-9-]{0,70}",
                port in "[a-z0-9-]{0,8}",
            ) {
                let nodes = vec![
                    pod_group("pg", &name, &name, &[("app", name.as_str())]),
                    Node::namespace("ns", name.clone()),
                ];
                let edges = vec![
                    Edge::rule("e", "ns", "pg").with_port(PortEntry::new("p", port.clone(), Protocol::Tcp)),
                    Edge::rule("f", "pg", "missing").with_port(PortEntry::new("p", port, Protocol::Icmp)),
                ];
                prop_assert_eq!(validate(&nodes, &edges), validate(&nodes, &edges));
            }
        }
    }
}
