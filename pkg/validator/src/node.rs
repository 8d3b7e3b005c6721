use pkg_types::graph::{Node, NodeData, PodGroup};
use pkg_types::issue::Issue;
use pkg_types::validate::{validate_dns1123_label, validate_label_part};

pub(crate) const FIELD_NAME: &str = "metadata.name";
pub(crate) const FIELD_NAMESPACE: &str = "metadata.namespace";
pub(crate) const FIELD_NAMESPACE_LABEL: &str = "label";
pub(crate) const FIELD_LABELS: &str = "labels";

/// Field key of a single label entry: `labels."<key>"`.
pub(crate) fn label_field(key: &str) -> String {
    format!("{}.\"{}\"", FIELD_LABELS, key)
}

pub(crate) fn check_node(node: &Node, issues: &mut Vec<Issue>) {
    match &node.data {
        NodeData::PodGroup(pg) => check_pod_group(node, pg, issues),
        NodeData::Namespace(ns) => {
            let element = format!("Namespace '{}'", node.display_name());
            check_dns1123(
                &ns.name,
                "Name",
                &element,
                &node.id,
                FIELD_NAMESPACE_LABEL,
                issues,
            );
        }
        NodeData::Unknown => {}
    }
}

fn check_pod_group(node: &Node, pg: &PodGroup, issues: &mut Vec<Issue>) {
    let element = format!("PodGroup '{}'", node.display_name());

    check_dns1123(&pg.name, "Name", &element, &node.id, FIELD_NAME, issues);
    check_dns1123(
        &pg.namespace,
        "Namespace",
        &element,
        &node.id,
        FIELD_NAMESPACE,
        issues,
    );

    if pg.labels.is_empty() {
        issues.push(Issue::warning(
            format!(
                "{} has no labels; an empty podSelector matches every pod in its namespace",
                element
            ),
            &node.id,
            FIELD_LABELS,
        ));
        return;
    }

    for (key, value) in &pg.labels {
        let field = label_field(key);
        if key.trim().is_empty() {
            issues.push(Issue::error(
                format!("{}: label key must not be empty", element),
                &node.id,
                field,
            ));
            continue;
        }
        if let Err(e) = validate_label_part(key) {
            issues.push(Issue::error(
                format!("{}: label key {}", element, e),
                &node.id,
                field.clone(),
            ));
        }
        // An empty value is legal.
        if !value.is_empty() {
            if let Err(e) = validate_label_part(value) {
                issues.push(Issue::error(
                    format!("{}: value of label '{}' {}", element, key, e),
                    &node.id,
                    field,
                ));
            }
        }
    }
}

fn check_dns1123(
    value: &str,
    what: &str,
    element: &str,
    element_id: &str,
    field: &str,
    issues: &mut Vec<Issue>,
) {
    if let Err(e) = validate_dns1123_label(value) {
        issues.push(Issue::error(
            format!("{} of {} is not a valid DNS-1123 label: {}", what, element, e),
            element_id,
            field,
        ));
    }
}
