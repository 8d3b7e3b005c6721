//! NetworkPolicy manifest constants.

/// `apiVersion` of every generated manifest.
pub const NETWORK_POLICY_API_VERSION: &str = "networking.k8s.io/v1";

/// `kind` of every generated manifest.
pub const NETWORK_POLICY_KIND: &str = "NetworkPolicy";

/// Prefix of the generated `metadata.name`.
pub const POLICY_NAME_PREFIX: &str = "netpol-";

/// Number of trailing id characters used as a short display form of a node
/// or edge (unnamed policy names, validation messages).
pub const SHORT_ID_LEN: usize = 6;

/// Well-known label every namespace carries, used to select a namespace by name.
pub const NAMESPACE_NAME_LABEL: &str = "kubernetes.io/metadata.name";

/// Literal port token meaning "every port".
pub const ANY_PORT: &str = "any";
