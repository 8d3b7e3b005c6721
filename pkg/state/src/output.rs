use pkg_compiler::{CompileRefusal, compile_checked, render};
use pkg_constants::paths::{DEFAULT_MANIFEST_STEM, MANIFEST_EXTENSION};
use pkg_types::graph::{GraphSnapshot, Node};
use pkg_types::issue::Issue;
use pkg_types::network_policy::NetworkPolicy;

/// Result of asking for the policy of one selected node.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    NoSelection,
    NotAPodGroup { id: String },
    /// Errors on the target or its edges prevent generation.
    Blocked { target: String, errors: Vec<Issue> },
    Refused(CompileRefusal),
    Rendered(Generated),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub target_name: String,
    pub file_name: String,
    pub policy: NetworkPolicy,
    pub yaml: String,
    pub warnings: Vec<Issue>,
}

impl Generated {
    /// YAML preceded by a comment header listing any relevant warnings.
    pub fn text(&self) -> String {
        let mut out = String::new();
        if self.warnings.is_empty() {
            out.push_str(&format!("# generated for: {}\n---\n", self.target_name));
        } else {
            for w in &self.warnings {
                out.push_str(&format!("# WARNING: {}{}\n", w.message, location(w)));
            }
            out.push_str("# --- generated despite the warnings above ---\n");
        }
        out.push_str(&self.yaml);
        out
    }
}

impl GenerationOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, GenerationOutcome::Rendered(_))
    }

    /// Text shown in place of the YAML pane.
    pub fn text(&self) -> String {
        match self {
            GenerationOutcome::NoSelection => {
                "# Select a PodGroup to generate its NetworkPolicy.\n".to_string()
            }
            GenerationOutcome::NotAPodGroup { id } => format!(
                "# Node '{}' is not a PodGroup; policies are generated for PodGroups only.\n",
                id
            ),
            GenerationOutcome::Blocked { target, errors } => {
                let mut out = format!(
                    "# Cannot generate NetworkPolicy for {}: fix the errors below.\n",
                    target
                );
                for e in errors {
                    out.push_str(&format!("# ERROR: {}{}\n", e.message, location(e)));
                }
                out
            }
            GenerationOutcome::Refused(reason) => {
                format!("# No NetworkPolicy generated: {}\n", reason)
            }
            GenerationOutcome::Rendered(generated) => generated.text(),
        }
    }
}

fn location(issue: &Issue) -> String {
    match &issue.field_key {
        Some(field) => format!(" (field: {})", field),
        None => String::new(),
    }
}

/// Issues on the target itself or on any edge touching it.
pub fn relevant_issues<'a>(
    target_id: &str,
    snapshot: &GraphSnapshot,
    issues: &'a [Issue],
) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|issue| match issue.element_id.as_deref() {
            Some(id) if id == target_id => true,
            Some(id) => snapshot.edge(id).is_some_and(|e| e.touches(target_id)),
            None => false,
        })
        .collect()
}

/// Gate generation on the current issues, then compile and render.
pub fn generate(target: Option<&str>, snapshot: &GraphSnapshot, issues: &[Issue]) -> GenerationOutcome {
    let Some(target_id) = target else {
        return GenerationOutcome::NoSelection;
    };
    let Some(node) = snapshot.node(target_id) else {
        return GenerationOutcome::Refused(CompileRefusal::TargetNotFound {
            id: target_id.to_string(),
        });
    };
    if !node.is_pod_group() {
        return GenerationOutcome::NotAPodGroup {
            id: target_id.to_string(),
        };
    }

    let relevant = relevant_issues(target_id, snapshot, issues);
    let (errors, warnings): (Vec<Issue>, Vec<Issue>) =
        relevant.into_iter().cloned().partition(Issue::is_error);
    if !errors.is_empty() {
        return GenerationOutcome::Blocked {
            target: node.display_name().to_string(),
            errors,
        };
    }

    match compile_checked(target_id, &snapshot.nodes, &snapshot.edges) {
        Ok(policy) => {
            let yaml = render(&policy);
            GenerationOutcome::Rendered(Generated {
                target_name: node.display_name().to_string(),
                file_name: suggested_file_name(node),
                policy,
                yaml,
                warnings,
            })
        }
        Err(reason) => GenerationOutcome::Refused(reason),
    }
}

/// Lowercased display name with anything outside `[a-z0-9_.-]` replaced by `_`.
pub fn suggested_file_name(node: &Node) -> String {
    let stem: String = node
        .display_name()
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let stem = if stem.is_empty() {
        DEFAULT_MANIFEST_STEM
    } else {
        stem.as_str()
    };
    format!("{}.{}", stem, MANIFEST_EXTENSION)
}
