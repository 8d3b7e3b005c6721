//! Identifier grammar limits.

/// Maximum length of a DNS-1123 label (names, namespaces, named ports).
pub const MAX_DNS1123_LABEL_LEN: usize = 63;

/// Maximum length of a Kubernetes label key or value part.
pub const MAX_LABEL_PART_LEN: usize = 63;

/// Lowest valid port number.
pub const MIN_PORT: u16 = 1;

/// Highest valid port number.
pub const MAX_PORT: u16 = 65535;
