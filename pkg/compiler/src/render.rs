use pkg_types::network_policy::NetworkPolicy;
use serde::Serialize;
use tracing::warn;

/// Serialize a policy as YAML (declaration-order keys, 2-space indentation).
///
/// Never fails: a serialization fault becomes a comment block describing it.
pub fn render(policy: &NetworkPolicy) -> String {
    render_yaml(policy)
}

pub(crate) fn render_yaml<T: Serialize>(value: &T) -> String {
    match serde_yaml::to_string(value) {
        Ok(yaml) => yaml,
        Err(e) => {
            warn!("Failed to render NetworkPolicy: {}", e);
            let mut out = String::new();
            for line in format!("failed to render NetworkPolicy: {}", e).lines() {
                out.push_str("# ");
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("# check the log for details\n");
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::graph::Labels;
    use pkg_types::network_policy::{
        IngressRule, LabelSelector, NetworkPolicyPeer, NetworkPolicyPort, PolicyType,
        PortProtocol, PortValue,
    };

    struct Unserializable(&'static str);

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom(self.0))
        }
    }

    fn sample() -> NetworkPolicy {
        let mut labels = Labels::new();
        labels.insert("app".to_string(), "backend".to_string());
        let mut peer_labels = Labels::new();
        peer_labels.insert("app".to_string(), "frontend".to_string());

        let mut policy = NetworkPolicy::new("netpol-backend".into(), "ns1".into(), labels);
        policy.spec.policy_types = vec![PolicyType::Ingress];
        policy.spec.ingress = Some(vec![IngressRule {
            from: vec![NetworkPolicyPeer {
                pod_selector: Some(LabelSelector::new(peer_labels)),
                namespace_selector: None,
            }],
            ports: vec![
                NetworkPolicyPort {
                    protocol: Some(PortProtocol::Tcp),
                    port: Some(PortValue::Number(8080)),
                },
                NetworkPolicyPort {
                    protocol: None,
                    port: Some(PortValue::Name("metrics".to_string())),
                },
            ],
        }]);
        policy
    }

    #[test]
    fn keys_follow_declaration_order() {
        let yaml = render(&sample());
        let pos = |needle: &str| yaml.find(needle).unwrap_or_else(|| panic!("{needle} missing"));
        assert!(yaml.starts_with("apiVersion: networking.k8s.io/v1\nkind: NetworkPolicy\n"));
        assert!(pos("metadata:") < pos("spec:"));
        assert!(pos("podSelector:") < pos("policyTypes:"));
        assert!(pos("policyTypes:") < pos("ingress:"));
        assert!(pos("from:") < pos("ports:"));
        assert!(pos("protocol: TCP") < pos("port: 8080"));
        assert!(!yaml.contains("egress"));
    }

    #[test]
    fn numbers_are_integers_and_names_are_strings() {
        let yaml = render(&sample());
        assert!(yaml.contains("port: 8080\n"));
        assert!(yaml.contains("port: metrics\n"));
        let parsed: NetworkPolicy = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(render(&sample()), render(&sample()));
    }

    #[test]
    fn failure_becomes_comment() {
        let out = render_yaml(&Unserializable("boom"));
        assert!(out.starts_with("# failed to render NetworkPolicy: "));
        assert!(out.contains("boom"));
        assert!(out.lines().all(|l| l.starts_with('#')));
        assert!(out.ends_with("# check the log for details\n"));
    }

    #[test]
    fn multi_line_failure_stays_commented() {
        let out = render_yaml(&Unserializable("first line\nsecond: line\n- third"));
        assert_eq!(out.lines().count(), 4);
        assert!(out.lines().all(|l| l.starts_with("# ")));
        assert!(out.contains("# second: line\n"));
        assert!(out.contains("# - third\n"));
    }
}
