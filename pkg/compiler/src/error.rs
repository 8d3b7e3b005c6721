//! Reasons the compiler declines to produce a policy.

use thiserror::Error;

/// Why no policy could be anchored on the requested target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileRefusal {
    /// The target id is not in the snapshot.
    #[error("node '{id}' does not exist")]
    TargetNotFound { id: String },

    /// The target is a namespace (or an unknown kind); only pod groups are policy subjects.
    #[error("node '{id}' is not a PodGroup; policies are generated only for pod groups")]
    NotAPodGroup { id: String },

    /// The pod group has no namespace to place the policy in.
    #[error("PodGroup '{name}' has no namespace; set one before generating a policy")]
    MissingNamespace { id: String, name: String },
}
